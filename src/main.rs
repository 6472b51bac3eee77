//! Command-line front end: translate one file, a whole tree, or keep a tree translated.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use unilisp::watch::{DEFAULT_OUT_DIR, DEFAULT_SOURCE_EXTENSION, Layout, Poller, translate_file};
use unilisp::{RenderConfig, Translator};

#[derive(Parser)]
#[command(name = "unilisp")]
#[command(version)]
#[command(about = "Translate Lisp sources into UnityScript")]
struct Cli {
    /// Spaces per indentation level
    #[arg(long, global = true, default_value_t = 4)]
    indent: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TreeArgs {
    /// Root of the source tree
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Output folder, relative to the root
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    /// Source file extension (repeatable)
    #[arg(long = "ext", value_name = "EXT", default_value = DEFAULT_SOURCE_EXTENSION)]
    extensions: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the translation of one file
    Translate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Translate every source file under a root once
    Build(TreeArgs),

    /// Re-translate source files under a root whenever they change
    Watch {
        #[command(flatten)]
        tree: TreeArgs,

        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    // One session for the whole run, so macros carry over between files
    let mut translator = Translator::with_config(RenderConfig::with_indent_width(cli.indent));

    match cli.command {
        Commands::Translate { file } => {
            let source = fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            println!("{}", translator.translate(&source));
        }
        Commands::Build(tree) => build(&mut translator, &layout(tree)?)?,
        Commands::Watch { tree, interval_ms } => watch(
            &mut translator,
            &layout(tree)?,
            Duration::from_millis(interval_ms),
        ),
    }
    Ok(())
}

fn layout(tree: TreeArgs) -> Result<Layout> {
    if !tree.root.is_dir() {
        bail!("{} is not a directory", tree.root.display());
    }
    Ok(Layout {
        root: tree.root,
        out_dir: tree.out_dir,
        extensions: tree.extensions,
    })
}

fn build(translator: &mut Translator, layout: &Layout) -> Result<()> {
    let files = layout.scan();
    info!(root = %layout.root.display(), files = files.len(), "building");
    for file in &files {
        translate_file(translator, layout, file)
            .with_context(|| format!("cannot translate {}", file.display()))?;
    }
    Ok(())
}

fn watch(translator: &mut Translator, layout: &Layout, interval: Duration) -> ! {
    let mut poller = Poller::new();
    info!(root = %layout.root.display(), ?interval, "watching");
    loop {
        for file in poller.changed(&layout.scan()) {
            if let Err(err) = translate_file(translator, layout, &file) {
                warn!(file = %file.display(), error = %err, "translation failed");
            }
        }
        thread::sleep(interval);
    }
}
