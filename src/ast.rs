//! The value model shared by syntax and data.
//!
//! A program is parsed into [`Value`]s and evaluates to [`Value`]s: there is
//! no separate syntax tree. Lists are singly linked cons cells whose `rest`
//! may be any value, so `(cons 1 2)`-style improper pairs can be represented
//! even though the evaluator's `cons` refuses to build them. Helper functions
//! such as [`sym`], [`val`], [`nil`] and [`cons`] keep construction in code and
//! tests short, and `From` conversions turn Rust integers, arrays and vectors
//! into values.

use crate::Error;

/// Type alias for number values in interpreter
pub type NumberType = i64;

/// Core value type of the interpreter
///
/// Values are immutable once built. Program state changes by rebinding
/// symbols in an [`Environment`](crate::environment::Environment), never by
/// mutating a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Identifiers, compared by name
    Symbol(String),
    /// Signed 64-bit integers
    Number(NumberType),
    /// The list terminator `()`
    EmptyList,
    /// A cons cell of `first` and `rest`
    NonEmptyList(Box<Value>, Box<Value>),
}

impl Value {
    /// Build a proper list from `items` by right-folding cons cells onto
    /// [`Value::EmptyList`].
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(Value::EmptyList, |rest, first| cons(first, rest))
    }

    /// True for both list variants.
    pub fn is_list(&self) -> bool {
        matches!(self, Value::EmptyList | Value::NonEmptyList(..))
    }

    /// Walk the list left to right.
    ///
    /// The walk ends at [`Value::EmptyList`]. If the chain of `rest` cells
    /// ends in anything else, that value is yielded as the final element.
    /// Iterating an atom therefore yields the atom itself.
    pub fn iter(&self) -> ListIter<'_> {
        ListIter { next: Some(self) }
    }

    /// Collect the elements produced by [`Value::iter`].
    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().cloned().collect()
    }
}

/// Iterator over the elements of a list, see [`Value::iter`].
#[derive(Debug, Clone)]
pub struct ListIter<'a> {
    next: Option<&'a Value>,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        match self.next.take()? {
            Value::EmptyList => None,
            Value::NonEmptyList(first, rest) => {
                self.next = Some(rest.as_ref());
                Some(first.as_ref())
            }
            tail => Some(tail),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Symbol(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Symbol(s)
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Number(NumberType::from(n))
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(NumberType);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v.into_iter().map(Into::into))
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::list(arr.into_iter().map(Into::into))
    }
}

impl TryFrom<&Value> for NumberType {
    type Error = Error;

    fn try_from(value: &Value) -> Result<NumberType, Error> {
        if let Value::Number(n) = value {
            Ok(*n)
        } else {
            Err(Error::TypeError(format!("expected number, got {value}")))
        }
    }
}

/// Helper function for creating symbols
pub fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating Values from anything convertible.
/// Strings become symbols: the language has no string type.
pub fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Helper function for creating the empty list
pub fn nil() -> Value {
    Value::EmptyList
}

/// Helper function for creating a cons cell
pub fn cons(first: Value, rest: Value) -> Value {
    Value::NonEmptyList(Box::new(first), Box::new(rest))
}

/// Renders the raw cons structure: `(first rest)`, recursively. A two
/// element list prints as `(1 (2 ()))`, not `(1 2)`.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::EmptyList => write!(f, "()"),
            Value::NonEmptyList(first, rest) => write!(f, "({first} {rest})"),
        }
    }
}
