//! Form dispatch and the translation session.
//!
//! A [`Translator`] owns the macro registry and rendering configuration for a run. Every
//! form renders to a target fragment; a form the renderer cannot match becomes an inline
//! diagnostic comment instead of failing the translation, so only the parser can reject a
//! program.
//!
//! Special-form renderers live here and are registered in the table in `forms`. They take
//! the arguments after the head and return `None` when the shapes do not fit, which the
//! dispatcher reports as an unmatched form.

use tracing::{debug, warn};

use crate::ast::{Form, body_yields};
use crate::bridge::{self, BodyMode, COROUTINE_TYPE, VOID_TYPE};
use crate::forms::{find_special_form, head_id};
use crate::literals::{
    IMPLICIT_PARAM, mangle, render_hint, render_keyword, render_string, render_word,
};
use crate::macros::MacroRegistry;
use crate::operators::{function_ref, infix_text};
use crate::parser::parse_program;
use crate::{Diagnostic, Error, MAX_EXPANSION_DEPTH, MAX_EXPANSIONS, MAX_RENDER_DEPTH};

/// Output layout settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// One level of block indentation
    pub indent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::with_indent_width(4)
    }
}

impl RenderConfig {
    /// Indent with `width` spaces per level
    pub fn with_indent_width(width: usize) -> Self {
        RenderConfig {
            indent: " ".repeat(width),
        }
    }
}

/// A translation session.
///
/// Macro definitions made while translating one input stay visible to every later input
/// translated by the same session, until [`Translator::reset_macros`].
///
/// ```
/// use unilisp::Translator;
///
/// let mut translator = Translator::new();
/// assert_eq!(translator.translate("(def x 5)"), "var x = 5;");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Translator {
    macros: MacroRegistry,
    config: RenderConfig,
    diagnostics: Vec<Diagnostic>,
    /// Macro expansions currently in progress
    expanding: usize,
    /// Expansions spent on the current top-level form
    expansions: usize,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Translator {
            macros: MacroRegistry::new(),
            config,
            diagnostics: Vec::new(),
            expanding: 0,
            expansions: 0,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn macros(&self) -> &MacroRegistry {
        &self.macros
    }

    /// Drop every user macro and restore the built-in ones
    pub fn reset_macros(&mut self) {
        self.macros.reset();
    }

    /// Diagnostics emitted inline by the most recent translation
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Translate a whole program, rendering a parse failure as the entire output
    pub fn translate(&mut self, source: &str) -> String {
        match self.try_translate(source) {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, "parse failed, emitting failure comment");
                bridge::comment(&err.to_string())
            }
        }
    }

    /// Translate a whole program, returning the parse failure if there is one
    pub fn try_translate(&mut self, source: &str) -> Result<String, Error> {
        self.diagnostics.clear();
        let forms = parse_program(source)?;
        Ok(self.render_program(&forms))
    }

    /// Render top-level forms, each terminated by `;` and separated by a blank line
    pub fn render_program(&mut self, forms: &[Form]) -> String {
        self.diagnostics.clear();
        let fragments: Vec<String> = forms
            .iter()
            .map(|form| format!("{};", self.render(form)))
            .collect();
        debug!(
            forms = forms.len(),
            diagnostics = self.diagnostics.len(),
            "rendered program"
        );
        fragments.join("\n\n")
    }

    /// Render a single form as an expression fragment
    pub fn render(&mut self, form: &Form) -> String {
        self.expanding = 0;
        self.expansions = 0;
        self.render_at(form, 0)
    }

    /// Render a form; `depth` counts the forms enclosing it, expanded macro bodies included
    fn render_at(&mut self, form: &Form, depth: usize) -> String {
        if depth >= MAX_RENDER_DEPTH {
            return self.diagnose(Diagnostic::NestingLimit);
        }
        let depth = depth + 1;
        match form {
            Form::Word(name) => render_word(name),
            Form::Number(literal) => literal.clone(),
            Form::Str(text) => render_string(text),
            Form::Keyword(name) => render_keyword(name),
            Form::InfixOperator(symbol) => function_ref(symbol).to_owned(),
            Form::Accessor(field) => bridge::lambda(
                Some(IMPLICIT_PARAM),
                &[format!("return {IMPLICIT_PARAM}.{}", mangle(field))],
                &self.config.indent,
            ),
            Form::Method(name) => bridge::lambda(
                Some(IMPLICIT_PARAM),
                &[format!("return {IMPLICIT_PARAM}.{}()", mangle(name))],
                &self.config.indent,
            ),
            Form::Hint { type_name, name } => self.hint(type_name, name),
            Form::Yield => "yield".to_owned(),
            Form::PercentArg => IMPLICIT_PARAM.to_owned(),
            Form::SugarLambda(body) => self.render_sugar_lambda(body, depth),
            Form::List(items) => self.render_list(form, items, depth),
            Form::Vector(items) => format!("[{}]", self.render_all(items, depth).join(", ")),
            Form::Map(items) => self.render_map(form, items, depth),
        }
    }

    fn render_all(&mut self, forms: &[Form], depth: usize) -> Vec<String> {
        forms.iter().map(|form| self.render_at(form, depth)).collect()
    }

    /// Record a diagnostic and return its inline fragment
    fn diagnose(&mut self, diagnostic: Diagnostic) -> String {
        warn!(%diagnostic, "inline diagnostic");
        let fragment = diagnostic.to_fragment();
        self.diagnostics.push(diagnostic);
        fragment
    }

    fn unmatched(&mut self, form: &Form) -> String {
        self.diagnose(Diagnostic::UnmatchedForm(form.to_string()))
    }

    fn hint(&mut self, type_name: &str, name: &str) -> String {
        render_hint(type_name, name).unwrap_or_else(|diagnostic| self.diagnose(diagnostic))
    }

    /// A declared name: a plain word, or a hint carrying its type
    fn binding(&mut self, form: &Form) -> Option<String> {
        match form {
            Form::Word(name) => Some(mangle(name)),
            Form::Hint { type_name, name } => Some(self.hint(type_name, name)),
            _ => None,
        }
    }

    /// Comma-separated parameter list from a vector of bindings
    fn params(&mut self, form: &Form) -> Option<String> {
        let Form::Vector(items) = form else {
            return None;
        };
        if !items.iter().all(is_binding) {
            return None;
        }
        let params = items
            .iter()
            .map(|item| self.binding(item))
            .collect::<Option<Vec<_>>>()?;
        Some(params.join(", "))
    }

    fn render_map(&mut self, form: &Form, items: &[Form], depth: usize) -> String {
        if items.len() % 2 != 0 {
            return self.diagnose(Diagnostic::OddMap(form.to_string()));
        }
        let rendered = self.render_all(items, depth);
        let pairs: Vec<String> = rendered.chunks_exact(2).map(|pair| pair.join(": ")).collect();
        format!("{{{}}}", pairs.join(", "))
    }

    fn render_sugar_lambda(&mut self, body: &Form, depth: usize) -> String {
        let param = body.contains_percent().then_some(IMPLICIT_PARAM);
        let signature = format!("function({})", param.unwrap_or_default());
        self.function(
            &signature,
            None,
            std::slice::from_ref(body),
            BodyMode::Return,
            depth,
        )
    }

    /// Assemble a function, switching to a statement-mode coroutine if the body yields
    fn function(
        &mut self,
        signature: &str,
        declared: Option<&str>,
        body: &[Form],
        mode: BodyMode,
        depth: usize,
    ) -> String {
        let (return_type, mode) = if body_yields(body) {
            (Some(COROUTINE_TYPE), BodyMode::Statement)
        } else {
            (declared, mode)
        };
        let rendered = self.render_all(body, depth);
        bridge::function(
            signature,
            return_type,
            &bridge::statements(rendered, mode),
            &self.config.indent,
        )
    }

    /// `name [params] body...` after a definition head
    fn named_function(
        &mut self,
        prefix: &str,
        args: &[Form],
        forced_type: Option<&str>,
        mode: BodyMode,
        depth: usize,
    ) -> Option<String> {
        let [name, params, body @ ..] = args else {
            return None;
        };
        let (name, declared) = match name {
            Form::Word(name) => (mangle(name), None),
            Form::Hint { type_name, name } => match render_hint(type_name, name) {
                Ok(_) => (mangle(name), Some(type_name.clone())),
                Err(diagnostic) => (self.diagnose(diagnostic), None),
            },
            _ => return None,
        };
        let params = self.params(params)?;
        let declared = forced_type.or(declared.as_deref());
        Some(self.function(
            &format!("{prefix}{name}({params})"),
            declared,
            body,
            mode,
            depth,
        ))
    }

    /// `keyword name = value`, `keyword name : T = value` or `keyword name : T`
    fn declaration(&mut self, keyword: &str, args: &[Form], depth: usize) -> Option<String> {
        match args {
            [Form::Word(name)] => Some(self.diagnose(Diagnostic::MissingTypeHint(name.clone()))),
            [hint @ Form::Hint { .. }] => {
                let declared = self.binding(hint)?;
                Some(format!("{keyword} {declared}"))
            }
            [target, value] => {
                let declared = self.binding(target)?;
                let value = self.render_at(value, depth);
                Some(format!("{keyword} {declared} = {value}"))
            }
            _ => None,
        }
    }

    /// Wrap rendered statements so they can stand where an expression is expected
    fn wrapped(&mut self, body: &[Form], depth: usize) -> String {
        let rendered = self.render_all(body, depth);
        bridge::iife(
            &bridge::statements(rendered, BodyMode::Return),
            &self.config.indent,
        )
    }

    fn render_list(&mut self, form: &Form, items: &[Form], depth: usize) -> String {
        let Some((head, args)) = items.split_first() else {
            return self.unmatched(form);
        };

        if let Some(id) = head_id(head)
            && let Some(special) = find_special_form(id)
        {
            if special.arity.accepts(args.len())
                && let Some(rendered) = (special.render)(self, args, depth)
            {
                return rendered;
            }
            return self.unmatched(form);
        }

        match (head, args) {
            (Form::Method(name), [target, rest @ ..]) => {
                let target = self.render_at(target, depth);
                let rest = self.render_all(rest, depth);
                format!("{target}.{}({})", mangle(name), rest.join(", "))
            }
            (Form::Accessor(field), [target]) => {
                let target = self.render_at(target, depth);
                format!("{target}.{}", mangle(field))
            }
            (Form::InfixOperator(symbol), [lhs, rhs]) => {
                let lhs = self.render_at(lhs, depth);
                let rhs = self.render_at(rhs, depth);
                format!("({lhs} {} {rhs})", infix_text(symbol))
            }
            (Form::Keyword(key), [target]) => {
                let target = self.render_at(target, depth);
                format!("{target}[{}]", render_keyword(key))
            }
            (Form::Word(name), _) => {
                match self.macros.lookup(name).map(|def| def.body.clone()) {
                    Some(body) => self.expand_macro(name, &body, depth),
                    None => self.call(head, args, depth),
                }
            }
            (
                Form::PercentArg | Form::List(_) | Form::SugarLambda(_) | Form::InfixOperator(_),
                _,
            ) => self.call(head, args, depth),
            _ => self.unmatched(form),
        }
    }

    fn expand_macro(&mut self, name: &str, body: &Form, depth: usize) -> String {
        if self.expanding >= MAX_EXPANSION_DEPTH {
            return self.diagnose(Diagnostic::ExpansionLimit(name.to_owned()));
        }
        if self.expansions >= MAX_EXPANSIONS {
            return self.diagnose(Diagnostic::ExpansionBudget(name.to_owned()));
        }
        self.expansions += 1;
        self.expanding += 1;
        debug!(name, depth, expanding = self.expanding, "expanding macro");
        let rendered = self.render_at(body, depth);
        self.expanding -= 1;
        rendered
    }

    /// Render a callee, parenthesized unless it is a plain name
    fn callee(&mut self, form: &Form, depth: usize) -> String {
        let rendered = self.render_at(form, depth);
        match form {
            Form::Word(_) | Form::PercentArg | Form::InfixOperator(_) => rendered,
            _ => format!("({rendered})"),
        }
    }

    fn call(&mut self, head: &Form, args: &[Form], depth: usize) -> String {
        let callee = self.callee(head, depth);
        let args = self.render_all(args, depth);
        format!("{callee}({})", args.join(", "))
    }
}

fn is_binding(form: &Form) -> bool {
    matches!(form, Form::Word(_) | Form::Hint { .. })
}

//
// Special form renderers
//

/// Render def special form
pub(crate) fn render_def(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    t.declaration("var", args, depth)
}

/// Render def-static special form
pub(crate) fn render_def_static(
    t: &mut Translator,
    args: &[Form],
    depth: usize,
) -> Option<String> {
    t.declaration("static var", args, depth)
}

/// Render set! special form
pub(crate) fn render_set(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let [target, value] = args else {
        return None;
    };
    let target = t.render_at(target, depth);
    let value = t.render_at(value, depth);
    Some(format!("{target} = {value}"))
}

/// Render import special form
pub(crate) fn render_import(_t: &mut Translator, args: &[Form], _depth: usize) -> Option<String> {
    match args {
        [Form::Word(name)] => Some(format!("import {}", mangle(name))),
        _ => None,
    }
}

/// Render not special form
pub(crate) fn render_not(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let [operand] = args else {
        return None;
    };
    Some(format!("!({})", t.render_at(operand, depth)))
}

/// Render yield special form
pub(crate) fn render_yield(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let [value] = args else {
        return None;
    };
    Some(format!("yield {}", t.render_at(value, depth)))
}

/// Render update! special form: `target = f(target)`
pub(crate) fn render_update(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let [target, function] = args else {
        return None;
    };
    let target = t.render_at(target, depth);
    let callee = t.callee(function, depth);
    Some(format!("{target} = {callee}({target})"))
}

/// Render nth special form
pub(crate) fn render_nth(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let [seq, index] = args else {
        return None;
    };
    let seq = t.render_at(seq, depth);
    let index = t.render_at(index, depth);
    Some(format!("{seq}[{index}]"))
}

/// Render new special form
pub(crate) fn render_new(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let [class @ Form::Word(_), rest @ ..] = args else {
        return None;
    };
    let class = t.render_at(class, depth);
    let rest = t.render_all(rest, depth);
    Some(format!("new {class}({})", rest.join(", ")))
}

/// Render do special form
pub(crate) fn render_do(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    Some(t.wrapped(args, depth))
}

/// Render let special form
pub(crate) fn render_let(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let [Form::Vector(bindings), body @ ..] = args else {
        return None;
    };
    if bindings.len() % 2 != 0 || !bindings.iter().step_by(2).all(is_binding) {
        return None;
    }

    let mut statements = Vec::with_capacity(bindings.len() / 2 + body.len());
    for pair in bindings.chunks_exact(2) {
        let [name, value] = pair else {
            return None;
        };
        let name = t.binding(name)?;
        let value = t.render_at(value, depth);
        statements.push(format!("var {name} = {value}"));
    }
    let rendered = t.render_all(body, depth);
    statements.extend(bridge::statements(rendered, BodyMode::Return));
    Some(bridge::iife(&statements, &t.config.indent))
}

/// Render if special form as a conditional expression
pub(crate) fn render_if(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let [condition, then_form, else_form] = args else {
        return None;
    };
    let condition = t.render_at(condition, depth);
    let then_text = t.render_at(then_form, depth);
    let else_text = t.render_at(else_form, depth);
    Some(format!("({condition} ? {then_text} : {else_text})"))
}

/// Render do-if special form: a statement `if` evaluating to null
pub(crate) fn render_do_if(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let (condition, then_form, else_form) = match args {
        [condition, then_form] => (condition, then_form, None),
        [condition, then_form, else_form] => (condition, then_form, Some(else_form)),
        _ => return None,
    };
    let condition = t.render_at(condition, depth);
    let then_branch = vec![t.render_at(then_form, depth)];
    let else_branch: Vec<String> = else_form
        .map(|form| t.render_at(form, depth))
        .into_iter()
        .collect();

    let unit = &t.config.indent;
    let statement = format!(
        "if ({condition}) {} else {}",
        bridge::block(&then_branch, unit),
        bridge::block(&else_branch, unit)
    );
    Some(bridge::void_iife(vec![statement], unit))
}

/// Render while special form: a statement loop evaluating to null
pub(crate) fn render_while(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let [condition, body @ ..] = args else {
        return None;
    };
    let condition = t.render_at(condition, depth);
    let body = t.render_all(body, depth);

    let unit = &t.config.indent;
    let statement = format!("while ({condition}) {}", bridge::block(&body, unit));
    Some(bridge::void_iife(vec![statement], unit))
}

/// Render deftype special form as a class with member declarations
pub(crate) fn render_deftype(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let [name, Form::Vector(members), body @ ..] = args else {
        return None;
    };
    let header = match name {
        Form::Word(name) => format!("class {}", mangle(name)),
        Form::Hint { type_name, name } => format!("class {} extends {type_name}", mangle(name)),
        _ => return None,
    };
    if !members.iter().all(is_binding) {
        return None;
    }

    let mut statements = Vec::with_capacity(members.len() + body.len());
    for member in members {
        let member = t.binding(member)?;
        statements.push(format!("var {member}"));
    }
    statements.extend(t.render_all(body, depth));
    Some(bridge::function(&header, None, &statements, &t.config.indent))
}

/// Render fn special form as an anonymous function
pub(crate) fn render_fn(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    let [params, body @ ..] = args else {
        return None;
    };
    let params = t.params(params)?;
    Some(t.function(
        &format!("function({params})"),
        None,
        body,
        BodyMode::Return,
        depth,
    ))
}

/// Render defn special form as a static function
pub(crate) fn render_defn(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    t.named_function("static function ", args, None, BodyMode::Return, depth)
}

/// Render defmethod special form as an instance function
pub(crate) fn render_defmethod(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    t.named_function("function ", args, None, BodyMode::Return, depth)
}

/// Render defvoid special form as a function without a return value
pub(crate) fn render_defvoid(t: &mut Translator, args: &[Form], depth: usize) -> Option<String> {
    t.named_function(
        "function ",
        args,
        Some(VOID_TYPE),
        BodyMode::Statement,
        depth,
    )
}

/// Register a macro; the definition itself renders as a placeholder comment
pub(crate) fn render_defmacro(t: &mut Translator, args: &[Form], _depth: usize) -> Option<String> {
    let [name, Form::Vector(params), body] = args else {
        return None;
    };
    let name = name.as_word()?;
    let params = params.iter().map(Form::to_string).collect();
    Some(t.macros.register(name, params, body.clone()))
}
