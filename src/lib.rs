//! dynlisp - a small Lisp front end and tree-walking evaluator
//!
//! This crate reads, parses and evaluates short Lisp programs whose only
//! observable effect is the text they print. Source code and runtime data
//! share one representation, [`ast::Value`], built from symbols, integers and
//! cons cells.
//!
//! ```text
//! (defun double (x) (+ x x))
//! (print (double 7))        ; prints 14
//! ```
//!
//! ## Pipeline
//!
//! source text → [`reader`] → [`parser`] → `Vec<Value>` → ([`binder`]) →
//! [`evaluator`] against an [`environment::Environment`], writing to a
//! [`screen::Screen`].
//!
//! ## Two scoping disciplines
//!
//! The evaluator itself is dynamically scoped: a variable resolves to the
//! nearest binding on the frame stack, which follows the call chain. Running the
//! [`binder`] first renames every declared variable and parameter to a fresh,
//! unique name, so the same evaluator then behaves as if it were lexically
//! scoped. [`Scoping`] picks between the two in [`run_program`].
//!
//! ## Modules
//!
//! - `ast`: the value model and its textual rendering
//! - `reader`: character-level scanning with line/column tracking
//! - `parser`: recursive-descent construction of values from text
//! - `environment`: the block-structured binding stack
//! - `binder`: alpha-renaming pass that yields static scope
//! - `builtinops`: registry of special forms and their arities
//! - `evaluator`: evaluation of programs and user-defined functions
//! - `screen`: the output sink used by `print`

use std::fmt;

use crate::builtinops::Arity;

/// Maximum list nesting accepted by the parser before it reports
/// [`ParseErrorKind::TooDeeplyNested`] instead of recursing further.
pub const MAX_PARSE_DEPTH: usize = 256;

/// Default evaluation nesting limit, see [`evaluator::EvalConfig`].
/// Every nested expression and every user function call counts one level.
/// One level above [`MAX_PARSE_DEPTH`] so the atoms inside the deepest list the
/// parser accepts can still be evaluated.
pub const DEFAULT_MAX_EVAL_DEPTH: usize = MAX_PARSE_DEPTH + 1;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    /// Input ended before a `(` found its matching `)`
    UnterminatedList,
    /// A `)` appeared with no open list
    UnexpectedCloseParen,
    /// Nothing that could start an expression was found
    ExpectedExpression,
    /// List nesting exceeded [`MAX_PARSE_DEPTH`]
    TooDeeplyNested,
    /// Integer literal does not fit in 64 bits
    NumberOutOfRange,
}

/// A syntax error annotated with the 1-based position where it was detected.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, line: usize, column: usize) -> Self {
        ParseError {
            kind,
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "line {}, character {}: {}",
            self.line, self.column, self.message
        )
    }
}

/// Error types for the interpreter
///
/// Every error is fatal to the evaluation that raised it. Frames pushed by
/// user function calls are popped before the error reaches the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Parse(ParseError),
    /// Read or assignment of a name with no binding
    UnknownSymbol(String),
    /// Call of a name that is not bound to a function definition
    UndefinedFunction(String),
    /// Static binder found a reference with no visible declaration
    UndefinedVariable(String),
    /// Special form called with the wrong number of arguments
    ArityError {
        form: String,
        expected: Arity,
        got: usize,
    },
    /// User function called with the wrong number of arguments
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },
    MalformedFunction(String),
    BadParameter {
        function: String,
        parameter: String,
    },
    NotCallable(String),
    InvalidArguments(String),
    TypeError(String),
    DivisionByZero(String),
    Overflow(String),
    /// Static binder met a form it has no rewriting rule for
    UnexpectedForm(String),
    DepthExceeded {
        limit: usize,
    },
    /// Failure raised while running the body of the named user function
    InFunction {
        function: String,
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the name of the user function being executed. Only the
    /// innermost function is recorded; an already annotated error is kept.
    pub(crate) fn in_function(self, function: &str) -> Self {
        match self {
            Error::InFunction { .. } => self,
            other => Error::InFunction {
                function: function.to_owned(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying failure with any function context stripped.
    pub fn root(&self) -> &Error {
        match self {
            Error::InFunction { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "ParseError: {e}"),
            Error::UnknownSymbol(name) => write!(f, "unknown symbol {name}"),
            Error::UndefinedFunction(name) => write!(f, "undefined function {name}"),
            Error::UndefinedVariable(name) => write!(f, "undefined variable {name}"),
            Error::ArityError {
                form,
                expected,
                got,
            } => write!(
                f,
                "ArityError: {form} needs {expected} arguments, but was called with {got}"
            ),
            Error::ArityMismatch {
                function,
                expected,
                got,
            } => write!(
                f,
                "ArityError: function {function} expected {expected} arguments but got {got}"
            ),
            Error::MalformedFunction(name) => write!(f, "malformed function definition for {name}"),
            Error::BadParameter {
                function,
                parameter,
            } => write!(
                f,
                "function {function} has parameter '{parameter}' which is not a symbol"
            ),
            Error::NotCallable(head) => write!(
                f,
                "can't perform function application using '{head}' as a function"
            ),
            Error::InvalidArguments(args) => write!(
                f,
                "can't perform function application using '{args}' as arguments"
            ),
            Error::TypeError(msg) => write!(f, "Type error: {msg}"),
            Error::DivisionByZero(expr) => write!(f, "division by zero in {expr}"),
            Error::Overflow(form) => write!(f, "integer overflow in {form}"),
            Error::UnexpectedForm(expr) => write!(f, "unexpected form {expr}"),
            Error::DepthExceeded { limit } => {
                write!(f, "evaluation depth limit exceeded (max: {limit})")
            }
            Error::InFunction { function, source } => write!(f, "{source}\n  In function: {function}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InFunction { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Selects the scoping discipline used by [`run_program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scoping {
    /// Evaluate the parsed program directly against the frame stack
    #[default]
    Dynamic,
    /// Rename every declaration with [`binder::bind_to_static_scope`] first
    Static,
}

/// Parse, optionally bind, and evaluate `source` in a fresh environment.
/// Returns the value of the last top-level form.
pub fn run_program(
    source: &str,
    scoping: Scoping,
    screen: &mut dyn screen::Screen,
) -> Result<ast::Value, Error> {
    let mut forms = parser::parse_program(source)?;
    if scoping == Scoping::Static {
        forms = binder::bind_to_static_scope(&forms)?;
    }
    let mut env = environment::Environment::new();
    evaluator::eval_program(&forms, &mut env, screen)
}

pub mod ast;
pub mod binder;
pub mod builtinops;
pub mod environment;
pub mod evaluator;
pub mod parser;
pub mod reader;
pub mod screen;
