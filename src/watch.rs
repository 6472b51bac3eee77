//! Source tree layout, scanning and change polling for the command-line front end.
//!
//! A [`Layout`] decides which files under a root are sources and where their translations
//! go: `<root>/<out_dir>/<relative path>` with the `js` extension. Dotfiles, anything inside
//! a dot-directory and anything already inside the output folder are skipped.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::info;
use walkdir::WalkDir;

use crate::Translator;

/// First line of every written output file
pub const HEADER: &str = "#pragma strict";

pub const OUTPUT_EXTENSION: &str = "js";
pub const DEFAULT_SOURCE_EXTENSION: &str = "ul";
pub const DEFAULT_OUT_DIR: &str = "compiled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    /// Output folder, relative to `root`
    pub out_dir: PathBuf,
    /// Source extensions, without the leading dot
    pub extensions: Vec<String>,
}

impl Layout {
    /// A layout with the default output folder and source extension
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Layout {
            root: root.into(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            extensions: vec![DEFAULT_SOURCE_EXTENSION.to_owned()],
        }
    }

    /// Check if `path` is a source file of this layout
    pub fn is_source(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let hidden = relative
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));
        let extension = path.extension().and_then(|s| s.to_str());

        !hidden
            && !path.starts_with(self.root.join(&self.out_dir))
            && extension.is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Where the translation of `source` is written
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let relative = match source.strip_prefix(&self.root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => source.file_name().map(PathBuf::from).unwrap_or_default(),
        };
        self.root
            .join(&self.out_dir)
            .join(relative)
            .with_extension(OUTPUT_EXTENSION)
    }

    /// All source files under the root, in file-name order
    pub fn scan(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_source(e.path()))
            .map(walkdir::DirEntry::into_path)
            .collect()
    }
}

/// Tracks modification times between polls
#[derive(Debug, Default)]
pub struct Poller {
    seen: HashMap<PathBuf, SystemTime>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files whose modification time differs from the previous poll.
    ///
    /// Every file is reported on the first poll. Files that can no longer be read are
    /// skipped and forgotten.
    pub fn changed(&mut self, files: &[PathBuf]) -> Vec<PathBuf> {
        let mut changed = Vec::new();
        for path in files {
            let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) else {
                continue;
            };
            if self.seen.insert(path.clone(), modified) != Some(modified) {
                changed.push(path.clone());
            }
        }

        let present: HashSet<&PathBuf> = files.iter().collect();
        self.seen.retain(|path, _| present.contains(path));
        changed
    }
}

/// Write `translated` to `path` behind the output header, creating parent folders
pub fn write_output(path: &Path, translated: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{HEADER}\n{translated}\n"))
}

/// Translate one source file of `layout` and write the result; returns the output path.
///
/// A parse failure is not an error here: the failure comment is written as the output.
pub fn translate_file(
    translator: &mut Translator,
    layout: &Layout,
    source: &Path,
) -> io::Result<PathBuf> {
    let text = fs::read_to_string(source)?;
    let translated = translator.translate(&text);
    let output = layout.output_path(source);
    write_output(&output, &translated)?;
    info!(
        source = %source.display(),
        output = %output.display(),
        diagnostics = translator.diagnostics().len(),
        "wrote translation"
    );
    Ok(output)
}
