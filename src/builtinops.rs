//! Registry of the built-in forms.
//!
//! Every name in this registry is dispatched before user functions are
//! looked up, so programs cannot redefine them.
//!
//! ## Functions vs Special Forms
//!
//! - **Functions** receive their arguments already evaluated, left to right
//!   (`+`, `-`, `*`, `/`, `cons`, `list`)
//! - **Special Forms** receive the unevaluated argument expressions and decide
//!   what to evaluate (`defun`, `let`, `=`, `print`). Their implementations
//!   live in the evaluator since they need the environment and the screen.
//!
//! Arity is checked against the registry before any argument is evaluated.
//!
//! ## Arithmetic
//!
//! All arithmetic is on 64-bit signed integers with overflow detection.
//! `+` and `*` accept zero arguments and return their identities 0 and 1.
//! `-` folds from its first argument, so `(- 5)` is 5. `/` takes exactly two
//! arguments and rounds toward negative infinity.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::Error;
use crate::ast::{NumberType, Value, cons};
use crate::evaluator::{Evaluator, eval_assign, eval_defun, eval_let, eval_print};

/// Number of arguments a built-in form accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Any,
}

impl Arity {
    pub(crate) fn validate(&self, form: &str, arg_count: usize) -> Result<(), Error> {
        let ok = match *self {
            Arity::Exact(n) => arg_count == n,
            Arity::AtLeast(n) => arg_count >= n,
            Arity::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::ArityError {
                form: form.to_owned(),
                expected: *self,
                got: arg_count,
            })
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Any => write!(f, "any number of"),
        }
    }
}

/// Signature of special forms: unevaluated arguments, the running evaluator
/// and the current nesting depth.
pub type SpecialFormFn = fn(&[Value], &mut Evaluator<'_>, usize) -> Result<Value, Error>;

/// Represents the implementation of a built-in form
#[derive(Clone, Copy)]
pub enum OpKind {
    /// Takes evaluated arguments
    Function(fn(&[Value]) -> Result<Value, Error>),
    /// Takes unevaluated arguments
    SpecialForm(SpecialFormFn),
}

impl fmt::Debug for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Function(_) => write!(f, "Function(<fn>)"),
            OpKind::SpecialForm(_) => write!(f, "SpecialForm(<fn>)"),
        }
    }
}

/// Definition of a built-in form
#[derive(Debug, Clone)]
pub struct BuiltinOp {
    pub id: &'static str,
    pub op_kind: OpKind,
    pub arity: Arity,
}

impl BuiltinOp {
    pub fn is_special_form(&self) -> bool {
        matches!(self.op_kind, OpKind::SpecialForm(_))
    }

    pub(crate) fn validate_arity(&self, arg_count: usize) -> Result<(), Error> {
        self.arity.validate(self.id, arg_count)
    }
}

//
// Builtin Function Implementations
//

fn numbers(op: &str, args: &[Value]) -> Result<Vec<NumberType>, Error> {
    args.iter()
        .map(|arg| {
            NumberType::try_from(arg).map_err(|_| {
                Error::TypeError(format!("'{op}' requires number arguments, got {arg}"))
            })
        })
        .collect()
}

fn builtin_add(args: &[Value]) -> Result<Value, Error> {
    let mut sum: NumberType = 0;
    for n in numbers("+", args)? {
        sum = sum
            .checked_add(n)
            .ok_or_else(|| Error::Overflow("+".into()))?;
    }
    Ok(Value::Number(sum))
}

fn builtin_sub(args: &[Value]) -> Result<Value, Error> {
    let nums = numbers("-", args)?;
    let Some((first, rest)) = nums.split_first() else {
        return Err(Error::ArityError {
            form: "-".into(),
            expected: Arity::AtLeast(1),
            got: 0,
        });
    };

    let mut result = *first;
    for n in rest {
        result = result
            .checked_sub(*n)
            .ok_or_else(|| Error::Overflow("-".into()))?;
    }
    Ok(Value::Number(result))
}

fn builtin_mul(args: &[Value]) -> Result<Value, Error> {
    let mut product: NumberType = 1;
    for n in numbers("*", args)? {
        product = product
            .checked_mul(n)
            .ok_or_else(|| Error::Overflow("*".into()))?;
    }
    Ok(Value::Number(product))
}

fn builtin_div(args: &[Value]) -> Result<Value, Error> {
    let nums = numbers("/", args)?;
    let &[a, b] = nums.as_slice() else {
        return Err(Error::ArityError {
            form: "/".into(),
            expected: Arity::Exact(2),
            got: args.len(),
        });
    };
    if b == 0 {
        return Err(Error::DivisionByZero(format!("(/ {a} {b})")));
    }

    let quotient = a.checked_div(b).ok_or_else(|| Error::Overflow("/".into()))?;
    let remainder = a.checked_rem(b).ok_or_else(|| Error::Overflow("/".into()))?;
    // Truncation rounds toward zero; step down when the exact result is negative
    if remainder != 0 && (a < 0) != (b < 0) {
        Ok(Value::Number(quotient - 1))
    } else {
        Ok(Value::Number(quotient))
    }
}

fn builtin_cons(args: &[Value]) -> Result<Value, Error> {
    match args {
        [first, rest] if rest.is_list() => Ok(cons(first.clone(), rest.clone())),
        [_, rest] => Err(Error::TypeError(format!(
            "cons needs a list as its second argument, got {rest}"
        ))),
        _ => Err(Error::ArityError {
            form: "cons".into(),
            expected: Arity::Exact(2),
            got: args.len(),
        }),
    }
}

fn builtin_list(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::list(args.to_vec()))
}

static BUILTIN_OPS: [BuiltinOp; 10] = [
    BuiltinOp {
        id: "+",
        op_kind: OpKind::Function(builtin_add),
        arity: Arity::Any,
    },
    BuiltinOp {
        id: "-",
        op_kind: OpKind::Function(builtin_sub),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        id: "*",
        op_kind: OpKind::Function(builtin_mul),
        arity: Arity::Any,
    },
    BuiltinOp {
        id: "/",
        op_kind: OpKind::Function(builtin_div),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        id: "cons",
        op_kind: OpKind::Function(builtin_cons),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        id: "list",
        op_kind: OpKind::Function(builtin_list),
        arity: Arity::Any,
    },
    BuiltinOp {
        id: "defun",
        op_kind: OpKind::SpecialForm(eval_defun),
        arity: Arity::AtLeast(3),
    },
    BuiltinOp {
        id: "let",
        op_kind: OpKind::SpecialForm(eval_let),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        id: "=",
        op_kind: OpKind::SpecialForm(eval_assign),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        id: "print",
        op_kind: OpKind::SpecialForm(eval_print),
        arity: Arity::Any,
    },
];

static BUILTIN_BY_ID: LazyLock<HashMap<&'static str, &'static BuiltinOp>> =
    LazyLock::new(|| BUILTIN_OPS.iter().map(|op| (op.id, op)).collect());

pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    &BUILTIN_OPS
}

pub fn find_builtin_op(id: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_BY_ID.get(id).copied()
}
