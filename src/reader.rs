//! Character-level scanner over program text.
//!
//! The reader hands out the primitive tokens the parser needs (integers,
//! bare words and single parenthesis characters) and remembers how far it
//! has read so errors can be reported by line and column.

use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::digit1,
};

use crate::ast::NumberType;
use crate::{ParseError, ParseErrorKind};

/// Characters skipped between tokens.
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

pub struct Reader<'a> {
    input: &'a str,
    /// Byte offset of the next unread character
    position: usize,
    handle_comments: bool,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Reader {
            input,
            position: 0,
            handle_comments: false,
        }
    }

    /// Treat `;` up to the end of the line as whitespace.
    pub fn with_comments(mut self, handle_comments: bool) -> Self {
        self.handle_comments = handle_comments;
        self
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn is_delimiter(&self, c: char) -> bool {
        is_whitespace(c) || c == '(' || c == ')' || (self.handle_comments && c == ';')
    }

    /// Current character, or `None` at end of input.
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.position += c.len_utf8();
        }
    }

    /// Undo one [`Reader::advance`].
    pub fn retreat(&mut self) {
        if let Some(c) = self.input[..self.position].chars().next_back() {
            self.position -= c.len_utf8();
        }
    }

    /// Consume `expected` if it is the current character.
    pub fn compare_advance(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if is_whitespace(c) {
                self.advance();
            } else if self.handle_comments && c == ';' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Read an integer literal: an optional `-` followed by at least one
    /// digit. Returns `Ok(None)` with the position unchanged when no digit
    /// follows, so a lone `-` can still be read as a word.
    pub fn next_number(&mut self) -> Result<Option<NumberType>, ParseError> {
        let start = self.position;
        let negative = self.compare_advance('-');

        let digits: IResult<&str, &str> = digit1.parse(self.remaining());
        let Ok((_, digits)) = digits else {
            if negative {
                self.retreat();
            }
            return Ok(None);
        };
        self.position += digits.len();

        let literal = &self.input[start..self.position];
        match literal.parse::<NumberType>() {
            Ok(n) => Ok(Some(n)),
            Err(_) => {
                self.position = start;
                Err(self.error(
                    ParseErrorKind::NumberOutOfRange,
                    format!("integer literal '{literal}' does not fit in 64 bits"),
                ))
            }
        }
    }

    /// Read a maximal run of characters that are neither whitespace nor
    /// parentheses. Returns `None` if no character was consumed.
    pub fn next_word(&mut self) -> Option<&'a str> {
        let word: IResult<&str, &str> =
            take_while1(|c: char| !self.is_delimiter(c)).parse(self.remaining());
        let (_, word) = word.ok()?;
        self.position += word.len();
        Some(word)
    }

    /// Bytes of input left to read.
    pub fn size(&self) -> usize {
        self.input.len() - self.position
    }

    /// 1-based line and column of the byte `offset`.
    pub fn locate(&self, offset: usize) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        for c in self.input[..offset.min(self.input.len())].chars() {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }

    /// Build a [`ParseError`] located at the current position.
    pub fn error(&self, kind: ParseErrorKind, message: impl Into<String>) -> ParseError {
        let (line, column) = self.locate(self.position);
        ParseError::new(kind, message, line, column)
    }
}
