use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, tag, take_while},
    character::complete::{char, digit1, multispace1, none_of, satisfy},
    combinator::{cut, not, opt, peek, recognize, value},
    error::ErrorKind,
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};

use crate::ast::Form;
use crate::literals::{is_word_char, is_word_start};
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};

/// Convert a nom failure into a structured parse error for the whole program
fn to_parse_error(input: &str, error: nom::Err<nom::error::Error<&str>>) -> ParseError {
    let is_failure = matches!(error, nom::Err::Failure(_));
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = input.len().saturating_sub(e.input.len());
            let found = e
                .input
                .split_whitespace()
                .next()
                .map(|token| token.chars().take(20).collect::<String>());
            let top_level_closer = !is_failure && e.input.starts_with([')', ']', '}']);

            let (kind, message) = if e.code == ErrorKind::TooLarge {
                (
                    ParseErrorKind::TooDeeplyNested,
                    format!("Form nested too deeply (max depth: {MAX_PARSE_DEPTH})"),
                )
            } else if e.input.is_empty() {
                (
                    ParseErrorKind::Incomplete,
                    "Unexpected end of input (unclosed delimiter or string)".to_owned(),
                )
            } else if top_level_closer {
                (
                    ParseErrorKind::TrailingContent,
                    "Unexpected closing delimiter with nothing to close".to_owned(),
                )
            } else {
                let near: String = e.input.chars().take(10).collect();
                (
                    ParseErrorKind::InvalidSyntax,
                    format!("Invalid syntax near '{near}'"),
                )
            };

            ParseError::with_context_and_found(kind, message, input, offset, found)
        }
        nom::Err::Incomplete(_) => {
            ParseError::new(ParseErrorKind::Incomplete, "Incomplete input", None, None)
        }
    }
}

/// Parse a line comment (`;` to end of line)
fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char(';'), take_while(|c: char| c != '\n'))).parse(input)
}

/// Skip optional whitespace and comments
fn ws0(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, comment)))).parse(input)
}

/// Skip mandatory whitespace and comments
fn ws1(input: &str) -> IResult<&str, ()> {
    value((), many1(alt((multispace1, comment)))).parse(input)
}

/// Recognize identifier text
fn word_text(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_word_start), take_while(is_word_char))).parse(input)
}

/// Parse a word; `yield` is its own token
fn parse_word(input: &str) -> IResult<&str, Form> {
    let (input, text) = word_text(input)?;
    let form = if text == "yield" {
        Form::Yield
    } else {
        Form::Word(text.to_owned())
    };
    Ok((input, form))
}

/// Parse a decimal number with an optional sign and fractional part
fn parse_number(input: &str) -> IResult<&str, Form> {
    let (input, literal) = terminated(
        recognize((opt(char('-')), digit1, opt(pair(char('.'), digit1)))),
        not(satisfy(is_word_char)),
    )
    .parse(input)?;
    Ok((input, Form::Number(literal.to_owned())))
}

/// Parse a string literal, keeping its text (escapes included) as written
fn parse_string(input: &str) -> IResult<&str, Form> {
    let (input, _) = char('"').parse(input)?;
    let (input, text) = cut(terminated(
        recognize(many0(alt((
            is_not("\"\\\n"),
            recognize(pair(char('\\'), none_of("\n"))),
        )))),
        char('"'),
    ))
    .parse(input)?;
    Ok((input, Form::Str(text.to_owned())))
}

/// Parse an infix operator; only valid when whitespace follows
fn parse_infix(input: &str) -> IResult<&str, Form> {
    let (input, symbol) = terminated(
        alt((
            tag("<="),
            tag(">="),
            tag("=="),
            tag("!="),
            tag("and"),
            tag("is"),
            tag("as"),
            tag("+"),
            tag("-"),
            tag("*"),
            tag("/"),
            tag("<"),
            tag(">"),
        )),
        peek(multispace1),
    )
    .parse(input)?;
    Ok((input, Form::InfixOperator(symbol.to_owned())))
}

/// Parse a bare `%`
fn parse_percent(input: &str) -> IResult<&str, Form> {
    value(
        Form::PercentArg,
        terminated(char('%'), not(satisfy(is_word_char))),
    )
    .parse(input)
}

/// Parse `:name`
fn parse_keyword(input: &str) -> IResult<&str, Form> {
    let (input, name) = preceded(char(':'), word_text).parse(input)?;
    Ok((input, Form::Keyword(name.to_owned())))
}

/// Parse `.-field`
fn parse_accessor(input: &str) -> IResult<&str, Form> {
    let (input, field) = preceded(tag(".-"), word_text).parse(input)?;
    Ok((input, Form::Accessor(field.to_owned())))
}

/// Parse `.method`
fn parse_method(input: &str) -> IResult<&str, Form> {
    let (input, name) = preceded(char('.'), word_text).parse(input)?;
    Ok((input, Form::Method(name.to_owned())))
}

/// Parse `^Type name`
fn parse_hint(input: &str) -> IResult<&str, Form> {
    let (input, (_, type_name, _, name)) =
        (char('^'), word_text, multispace1, word_text).parse(input)?;
    Ok((
        input,
        Form::Hint {
            type_name: type_name.to_owned(),
            name: name.to_owned(),
        },
    ))
}

/// Parse `~token`, shorthand for an accessor function over the implicit parameter
fn parse_accessor_fn(input: &str) -> IResult<&str, Form> {
    let (input, _) = char('~').parse(input)?;
    let (input, target) =
        alt((parse_keyword, parse_accessor, parse_method, parse_bare_field)).parse(input)?;
    Ok((
        input,
        Form::SugarLambda(Box::new(Form::List(vec![target, Form::PercentArg]))),
    ))
}

/// A plain word naming a field, as in `~name`
fn parse_bare_field(input: &str) -> IResult<&str, Form> {
    let (input, field) = word_text(input)?;
    Ok((input, Form::Accessor(field.to_owned())))
}

/// Parse `#( ... )`
fn parse_sugar_lambda(input: &str, depth: usize) -> IResult<&str, Form> {
    let (input, _) = char('#').parse(input)?;
    let (input, body) = parse_list(input, depth)?;
    Ok((input, Form::SugarLambda(Box::new(body))))
}

/// Parse a list; whitespace between items is optional
fn parse_list(input: &str, depth: usize) -> IResult<&str, Form> {
    let (input, _) = char('(').parse(input)?;
    let (input, items) = cut(delimited(
        ws0,
        many0(terminated(|i| parse_form(i, depth + 1), ws0)),
        char(')'),
    ))
    .parse(input)?;
    Ok((input, Form::List(items)))
}

/// Parse the items of a vector or map; whitespace between items is mandatory
fn parse_delimited_items(
    input: &str,
    open: char,
    close: char,
    depth: usize,
) -> IResult<&str, Vec<Form>> {
    let (input, _) = char(open).parse(input)?;
    cut(delimited(
        ws0,
        separated_list0(ws1, |i| parse_form(i, depth + 1)),
        pair(ws0, char(close)),
    ))
    .parse(input)
}

fn parse_vector(input: &str, depth: usize) -> IResult<&str, Form> {
    let (input, items) = parse_delimited_items(input, '[', ']', depth)?;
    Ok((input, Form::Vector(items)))
}

fn parse_map(input: &str, depth: usize) -> IResult<&str, Form> {
    let (input, items) = parse_delimited_items(input, '{', '}', depth)?;
    Ok((input, Form::Map(items)))
}

/// Parse a single form
fn parse_form(input: &str, depth: usize) -> IResult<&str, Form> {
    if depth >= MAX_PARSE_DEPTH {
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::TooLarge,
        )));
    }
    alt((
        |i| parse_list(i, depth),
        |i| parse_vector(i, depth),
        |i| parse_map(i, depth),
        |i| parse_sugar_lambda(i, depth),
        parse_accessor_fn,
        parse_string,
        parse_hint,
        parse_number,
        parse_infix,
        parse_percent,
        parse_keyword,
        parse_accessor,
        parse_method,
        parse_word,
    ))
    .parse(input)
}

fn skip_ws(input: &str) -> &str {
    match ws0(input) {
        Ok((rest, ())) => rest,
        Err(_) => input,
    }
}

/// Parse a whole program: zero or more top-level forms separated by whitespace or comments.
pub fn parse_program(input: &str) -> Result<Vec<Form>, Error> {
    let mut forms = Vec::new();
    let mut remaining = skip_ws(input);

    while !remaining.is_empty() {
        match parse_form(remaining, 0) {
            Ok((rest, form)) => {
                forms.push(form);
                remaining = skip_ws(rest);
            }
            Err(e) => {
                let error = to_parse_error(input, e);
                tracing::debug!(kind = ?error.kind, message = %error.message, "parse failed");
                return Err(Error::ParseError(error));
            }
        }
    }

    Ok(forms)
}

/// Parse exactly one form.
pub fn parse_single(input: &str) -> Result<Form, Error> {
    let mut forms = parse_program(input)?;
    match (forms.pop(), forms.is_empty()) {
        (Some(form), true) => Ok(form),
        (None, _) => Err(Error::ParseError(ParseError::new(
            ParseErrorKind::Incomplete,
            "Expected a form, found empty input",
            None,
            None,
        ))),
        (Some(_), false) => Err(Error::ParseError(ParseError::new(
            ParseErrorKind::TrailingContent,
            format!("Expected exactly one form, found {}", forms.len() + 1),
            None,
            None,
        ))),
    }
}
