//! Higher-order procedures that force thunks immediately via
//! `complete_apply`, because a builtin must hand a finished value back to
//! host code: `map filter reduce apply eval`.

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{complete_apply, evaluate};
use crate::value::Value;
use std::rc::Rc;

fn require_procedure(value: &Value, op: &str) -> Result<(), EvalError> {
    if value.is_callable() {
        Ok(())
    } else {
        Err(EvalError::type_error(
            op,
            format!("expected a procedure, found a {}", value.type_name()),
        ))
    }
}

pub fn map(args: &[Value], env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    let (proc_val, list) = match args {
        [f, s] => (f, s),
        _ => return Err(EvalError::arity("map", "2", args.len())),
    };
    require_procedure(proc_val, "map")?;
    let env = env.expect("map registered with wants_env");
    let items = list.list_to_vec()?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(complete_apply(proc_val, &[item], env)?);
    }
    Ok(Value::list_from_vec(out))
}

pub fn filter(args: &[Value], env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    let (proc_val, list) = match args {
        [f, s] => (f, s),
        _ => return Err(EvalError::arity("filter", "2", args.len())),
    };
    require_procedure(proc_val, "filter")?;
    let env = env.expect("filter registered with wants_env");
    let items = list.list_to_vec()?;
    let mut out = Vec::new();
    for item in items {
        if complete_apply(proc_val, &[item.clone()], env)?.is_truthy() {
            out.push(item);
        }
    }
    Ok(Value::list_from_vec(out))
}

pub fn reduce(args: &[Value], env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    let (proc_val, list) = match args {
        [f, s] => (f, s),
        _ => return Err(EvalError::arity("reduce", "2", args.len())),
    };
    require_procedure(proc_val, "reduce")?;
    let env = env.expect("reduce registered with wants_env");
    let items = list.list_to_vec()?;
    let (first, rest) = items
        .split_first()
        .ok_or_else(|| EvalError::type_error("reduce", "expected a non-empty list"))?;
    let mut acc = first.clone();
    for item in rest {
        acc = complete_apply(proc_val, &[acc, item.clone()], env)?;
    }
    Ok(acc)
}

pub fn apply(args: &[Value], env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    let (proc_val, arg_list) = match args {
        [f, rest] => (f, rest),
        _ => return Err(EvalError::arity("apply", "2", args.len())),
    };
    require_procedure(proc_val, "apply")?;
    let env = env.expect("apply registered with wants_env");
    let call_args = arg_list.list_to_vec()?;
    complete_apply(proc_val, &call_args, env)
}

pub fn eval_builtin(args: &[Value], env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [expr] => evaluate(expr, env.expect("eval registered with wants_env")),
        _ => Err(EvalError::arity("eval", "1", args.len())),
    }
}

pub fn register(env: &Rc<Environment>) {
    super::register(env, &["map"], map, true);
    super::register(env, &["filter"], filter, true);
    super::register(env, &["reduce"], reduce, true);
    super::register(env, &["apply"], apply, true);
    super::register(env, &["eval"], eval_builtin, true);
}
