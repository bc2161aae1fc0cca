//! Recursive-descent parser from program text to [`Value`]s.

use tracing::debug;

use crate::ast::Value;
use crate::reader::Reader;
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};

/// Parser configuration options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseConfig {
    /// Skip `;` line comments between tokens
    pub handle_comments: bool,
}

/// Parse every top-level expression in `text`.
pub fn parse_program(text: &str) -> Result<Vec<Value>, Error> {
    parse_program_with_config(text, ParseConfig::default())
}

/// Parse every top-level expression in `text` with explicit configuration.
pub fn parse_program_with_config(text: &str, config: ParseConfig) -> Result<Vec<Value>, Error> {
    let mut reader = Reader::new(text).with_comments(config.handle_comments);
    let mut forms = Vec::new();

    loop {
        reader.skip_whitespace();
        if reader.size() == 0 {
            break;
        }
        forms.push(parse_expression(&mut reader, 0)?);
    }

    debug!(forms = forms.len(), "parsed program");
    Ok(forms)
}

/// Parse one expression starting at the reader's position.
pub fn parse_expression(reader: &mut Reader<'_>, depth: usize) -> Result<Value, ParseError> {
    reader.skip_whitespace();

    match reader.peek() {
        Some('(') => parse_list(reader, depth),
        Some(')') => Err(reader.error(ParseErrorKind::UnexpectedCloseParen, "unexpected ')'")),
        _ => {
            if let Some(number) = reader.next_number()? {
                return Ok(Value::Number(number));
            }
            match reader.next_word() {
                Some(word) => Ok(Value::Symbol(word.to_owned())),
                None => Err(reader.error(ParseErrorKind::ExpectedExpression, "expected symbol")),
            }
        }
    }
}

/// Parse `( expr* )`, the reader positioned on the opening parenthesis.
fn parse_list(reader: &mut Reader<'_>, depth: usize) -> Result<Value, ParseError> {
    if depth >= MAX_PARSE_DEPTH {
        return Err(reader.error(
            ParseErrorKind::TooDeeplyNested,
            format!("expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"),
        ));
    }
    reader.advance();

    let mut elements = Vec::new();
    loop {
        reader.skip_whitespace();
        match reader.peek() {
            None => return Err(reader.error(ParseErrorKind::UnterminatedList, "expected ')'")),
            Some(')') => break,
            Some(_) => elements.push(parse_expression(reader, depth + 1)?),
        }
    }
    reader.advance();

    Ok(Value::list(elements))
}
