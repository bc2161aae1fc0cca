use tracing::{debug, trace};

use crate::ast::Value;
use crate::builtinops::{Arity, OpKind, find_builtin_op};
use crate::environment::{BindingKind, Environment};
use crate::screen::Screen;
use crate::{DEFAULT_MAX_EVAL_DEPTH, Error};

/// Evaluator configuration options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Nesting limit for expressions and user function calls. Programs have no
    /// conditionals, so any recursive function eventually reaches this limit.
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: DEFAULT_MAX_EVAL_DEPTH,
        }
    }
}

/// Evaluate `forms` in order against `env`, returning the last value.
pub fn eval_program(
    forms: &[Value],
    env: &mut Environment,
    screen: &mut dyn Screen,
) -> Result<Value, Error> {
    Evaluator::new(env, screen).eval_program(forms)
}

/// Tree-walking evaluator over an environment and an output screen.
pub struct Evaluator<'a> {
    env: &'a mut Environment,
    screen: &'a mut dyn Screen,
    config: EvalConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(env: &'a mut Environment, screen: &'a mut dyn Screen) -> Self {
        Self::with_config(env, screen, EvalConfig::default())
    }

    pub fn with_config(
        env: &'a mut Environment,
        screen: &'a mut dyn Screen,
        config: EvalConfig,
    ) -> Self {
        Evaluator {
            env,
            screen,
            config,
        }
    }

    /// Evaluate top-level forms in order. An empty program yields `()`.
    pub fn eval_program(&mut self, forms: &[Value]) -> Result<Value, Error> {
        let result = self.eval_sequence(forms, 0);
        debug!(forms = forms.len(), ok = result.is_ok(), "evaluated program");
        result
    }

    /// Evaluate a single expression.
    pub fn eval(&mut self, expr: &Value) -> Result<Value, Error> {
        self.eval_with_depth_tracking(expr, 0)
    }

    fn eval_sequence(&mut self, forms: &[Value], depth: usize) -> Result<Value, Error> {
        let mut last = Value::EmptyList;
        for form in forms {
            last = self.eval_with_depth_tracking(form, depth)?;
        }
        Ok(last)
    }

    pub(crate) fn eval_with_depth_tracking(
        &mut self,
        expr: &Value,
        depth: usize,
    ) -> Result<Value, Error> {
        if depth >= self.config.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        match expr {
            Value::Number(_) | Value::EmptyList => Ok(expr.clone()),

            Value::Symbol(name) => self
                .env
                .read_symbol(name)
                .cloned()
                .ok_or_else(|| Error::UnknownSymbol(name.clone())),

            Value::NonEmptyList(first, rest) => {
                let Value::Symbol(name) = first.as_ref() else {
                    return Err(Error::NotCallable(first.to_string()));
                };
                if !rest.is_list() {
                    return Err(Error::InvalidArguments(rest.to_string()));
                }
                let args = rest.to_vec();
                self.eval_application(name, &args, depth)
            }
        }
    }

    fn eval_application(&mut self, name: &str, args: &[Value], depth: usize) -> Result<Value, Error> {
        let Some(op) = find_builtin_op(name) else {
            return self.apply_user_function(name, args, depth);
        };

        op.validate_arity(args.len())?;
        match op.op_kind {
            OpKind::Function(func) => {
                let evaluated = args
                    .iter()
                    .map(|arg| self.eval_with_depth_tracking(arg, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                func(&evaluated)
            }
            OpKind::SpecialForm(special_form) => special_form(args, self, depth),
        }
    }

    /// Call the function stored under `name` as `((params...) body...)`.
    ///
    /// A frame is pushed before the arguments are evaluated and popped after
    /// the body finishes, whether it succeeded or not. Each argument is
    /// evaluated and then immediately bound to its parameter, so later
    /// arguments can observe earlier parameters.
    fn apply_user_function(&mut self, name: &str, args: &[Value], depth: usize) -> Result<Value, Error> {
        let definition = match self.env.read_symbol(name) {
            Some(value) if value.is_list() => value.clone(),
            _ => return Err(Error::UndefinedFunction(name.to_owned())),
        };
        let Value::NonEmptyList(params, body) = definition else {
            return Err(Error::MalformedFunction(name.to_owned()));
        };
        if !params.is_list() {
            return Err(Error::MalformedFunction(name.to_owned()));
        }

        let params = params.to_vec();
        if params.len() != args.len() {
            return Err(Error::ArityMismatch {
                function: name.to_owned(),
                expected: params.len(),
                got: args.len(),
            });
        }

        trace!(function = name, depth, "call");
        self.env.begin_block();
        let result = self.bind_and_run(name, &params, args, &body.to_vec(), depth);
        self.env.end_block();
        trace!(function = name, ok = result.is_ok(), "return");
        result
    }

    fn bind_and_run(
        &mut self,
        name: &str,
        params: &[Value],
        args: &[Value],
        body: &[Value],
        depth: usize,
    ) -> Result<Value, Error> {
        for (param, arg) in params.iter().zip(args) {
            let Value::Symbol(param_name) = param else {
                return Err(Error::BadParameter {
                    function: name.to_owned(),
                    parameter: param.to_string(),
                });
            };
            let value = self.eval_with_depth_tracking(arg, depth + 1)?;
            self.env.create_symbol(param_name, value, BindingKind::Variable);
        }

        self.eval_sequence(body, depth + 1)
            .map_err(|err| err.in_function(name))
    }
}

/// Evaluate defun special form
pub(crate) fn eval_defun(
    args: &[Value],
    evaluator: &mut Evaluator<'_>,
    _depth: usize,
) -> Result<Value, Error> {
    match args {
        [Value::Symbol(name), definition @ ..] => {
            evaluator.env.create_symbol(
                name,
                Value::list(definition.to_vec()),
                BindingKind::Function,
            );
            Ok(Value::EmptyList)
        }
        [other, ..] => Err(Error::TypeError(format!(
            "defun needs a symbol as the function name, got {other}"
        ))),
        [] => Err(Error::TypeError("defun needs a function name".to_owned())),
    }
}

/// Evaluate let special form
pub(crate) fn eval_let(
    args: &[Value],
    evaluator: &mut Evaluator<'_>,
    depth: usize,
) -> Result<Value, Error> {
    let (name, expr) = attribution_target("let", args)?;
    let value = evaluator.eval_with_depth_tracking(expr, depth + 1)?;
    evaluator
        .env
        .create_symbol(name, value.clone(), BindingKind::Variable);
    Ok(value)
}

/// Evaluate = special form
pub(crate) fn eval_assign(
    args: &[Value],
    evaluator: &mut Evaluator<'_>,
    depth: usize,
) -> Result<Value, Error> {
    let (name, expr) = attribution_target("=", args)?;
    let value = evaluator.eval_with_depth_tracking(expr, depth + 1)?;
    evaluator
        .env
        .set_symbol(name, value.clone(), BindingKind::Variable)?;
    Ok(value)
}

fn attribution_target<'v>(form: &str, args: &'v [Value]) -> Result<(&'v str, &'v Value), Error> {
    match args {
        [Value::Symbol(name), expr] => Ok((name, expr)),
        [other, _] => Err(Error::TypeError(format!(
            "{form} can't perform attribution using '{other}' as a variable"
        ))),
        _ => Err(Error::ArityError {
            form: form.to_owned(),
            expected: Arity::Exact(2),
            got: args.len(),
        }),
    }
}

/// Evaluate print special form
pub(crate) fn eval_print(
    args: &[Value],
    evaluator: &mut Evaluator<'_>,
    depth: usize,
) -> Result<Value, Error> {
    for arg in args {
        let value = evaluator.eval_with_depth_tracking(arg, depth + 1)?;
        evaluator.screen.print(&value.to_string());
    }
    Ok(Value::EmptyList)
}
