//! Static scoping by alpha-renaming.
//!
//! The evaluator resolves names dynamically. This pass rewrites a program so
//! that every variable introduced by `let` and every function parameter gets a
//! fresh name (`x` becomes `x_0`, `x_1`, ...) at its declaration and at each
//! use inside its lexical extent. Once no two declarations share a name, the
//! dynamic lookup can only ever find the declaration that was lexically
//! visible, so the rewritten program behaves as if statically scoped.
//!
//! References that have no visible declaration are rejected here with
//! [`Error::UndefinedVariable`], before anything is evaluated.
//!
//! ```text
//! (let x 1)                       (let x_0 1)
//! (defun show () (print x))  =>   (defun show () (print x_0))
//! (defun wrap (x) (show))         (defun wrap (x_1) (show))
//! ```

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::Error;
use crate::ast::{Value, sym};
use crate::builtinops::find_builtin_op;
use crate::environment::{BindingKind, Environment};

/// Rename every declaration in `forms` using a fresh [`StaticBinder`].
pub fn bind_to_static_scope(forms: &[Value]) -> Result<Vec<Value>, Error> {
    StaticBinder::new().bind_program(forms)
}

/// Renaming state for one compilation.
///
/// The naming scope maps source names to generated names using the same
/// frame discipline as the runtime [`Environment`]: `defun` opens a frame for
/// its parameters and body, and a call to a user function opens one for its
/// arguments, which the evaluator binds inside the callee's frame.
///
/// The counter belongs to the binder, so separate binders never influence
/// each other's names. Reusing one binder for several programs keeps its
/// global declarations and keeps numbering from where it stopped. Generated
/// names skip every symbol already seen in the source, so a renamed variable
/// can never shadow a function that happens to be called `x_0`.
#[derive(Debug, Default)]
pub struct StaticBinder {
    counter: usize,
    scope: Environment,
    reserved: HashSet<String>,
}

impl StaticBinder {
    pub fn new() -> Self {
        StaticBinder {
            counter: 0,
            scope: Environment::new(),
            reserved: HashSet::new(),
        }
    }

    pub fn bind_program(&mut self, forms: &[Value]) -> Result<Vec<Value>, Error> {
        for form in forms {
            self.reserve_symbols(form);
        }
        let bound = forms
            .iter()
            .map(|form| self.rewrite(form))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(forms = bound.len(), generated = self.counter, "bound program to static scope");
        Ok(bound)
    }

    /// Rewrite a single expression.
    pub fn bind(&mut self, expr: &Value) -> Result<Value, Error> {
        self.reserve_symbols(expr);
        self.rewrite(expr)
    }

    fn reserve_symbols(&mut self, expr: &Value) {
        match expr {
            Value::Symbol(name) => {
                self.reserved.insert(name.clone());
            }
            Value::NonEmptyList(..) => {
                for item in expr.iter() {
                    self.reserve_symbols(item);
                }
            }
            Value::Number(_) | Value::EmptyList => {}
        }
    }

    fn rewrite(&mut self, expr: &Value) -> Result<Value, Error> {
        match expr {
            Value::Number(_) | Value::EmptyList => Ok(expr.clone()),

            Value::Symbol(name) => self
                .scope
                .read_symbol(name)
                .cloned()
                .ok_or_else(|| Error::UndefinedVariable(name.clone())),

            Value::NonEmptyList(first, rest) => {
                let Value::Symbol(head) = first.as_ref() else {
                    return Err(Error::UnexpectedForm(expr.to_string()));
                };
                if !rest.is_list() {
                    return Err(Error::UnexpectedForm(expr.to_string()));
                }
                let args = rest.to_vec();

                match head.as_str() {
                    "let" => self.bind_let(&args, expr),
                    "defun" => self.bind_defun(&args, expr),
                    _ if find_builtin_op(head).is_some() => self.bind_application(head, &args),
                    _ => {
                        // User calls evaluate their arguments in the callee's frame
                        self.scope.begin_block();
                        let result = self.bind_application(head, &args);
                        self.scope.end_block();
                        result
                    }
                }
            }
        }
    }

    fn bind_application(&mut self, head: &str, args: &[Value]) -> Result<Value, Error> {
        let mut rewritten = vec![sym(head)];
        for arg in args {
            rewritten.push(self.rewrite(arg)?);
        }
        Ok(Value::list(rewritten))
    }

    fn fresh_name(&mut self, name: &str) -> String {
        loop {
            let candidate = format!("{name}_{}", self.counter);
            self.counter += 1;
            if self.reserved.insert(candidate.clone()) {
                trace!(name, fresh = candidate.as_str(), "renamed");
                return candidate;
            }
        }
    }

    /// Record a new declaration of `name` in the innermost naming frame.
    fn declare(&mut self, name: &str) -> String {
        let fresh = self.fresh_name(name);
        self.scope.create_symbol(name, sym(&fresh), BindingKind::Variable);
        fresh
    }

    fn bind_let(&mut self, args: &[Value], form: &Value) -> Result<Value, Error> {
        let [Value::Symbol(name), value_expr] = args else {
            return Err(Error::UnexpectedForm(form.to_string()));
        };

        // The initializer cannot see the variable it defines
        let value = self.rewrite(value_expr)?;
        let fresh = self.declare(name);
        Ok(Value::list([sym("let"), sym(fresh), value]))
    }

    fn bind_defun(&mut self, args: &[Value], form: &Value) -> Result<Value, Error> {
        let [Value::Symbol(name), params, body @ ..] = args else {
            return Err(Error::UnexpectedForm(form.to_string()));
        };
        if body.is_empty() || !params.is_list() {
            return Err(Error::UnexpectedForm(form.to_string()));
        }

        self.scope.begin_block();
        let result = self.bind_function(name, params, body, form);
        self.scope.end_block();
        result
    }

    fn bind_function(
        &mut self,
        name: &str,
        params: &Value,
        body: &[Value],
        form: &Value,
    ) -> Result<Value, Error> {
        let mut fresh_params = Vec::new();
        for param in params.iter() {
            let Value::Symbol(param_name) = param else {
                return Err(Error::UnexpectedForm(form.to_string()));
            };
            fresh_params.push(sym(self.declare(param_name)));
        }

        let mut rewritten = vec![sym("defun"), sym(name), Value::list(fresh_params)];
        for expr in body {
            rewritten.push(self.rewrite(expr)?);
        }
        Ok(Value::list(rewritten))
    }
}
