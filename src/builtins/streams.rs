//! The promise/stream layer's external surface: `force`, `stream-car`, and
//! `stream-cdr` (kept under its original-source alias `cdr-stream` too).

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::evaluate;
use crate::value::{PromiseState, Value};
use std::rc::Rc;

/// Forces a promise: memoized promises return their
/// cached value; otherwise the captured expression is evaluated in its
/// captured environment, the result is required to be Nil or a Pair, and
/// the promise mutates to its forced form.
pub fn force(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    let promise = match args {
        [Value::Promise(p)] => p,
        [other] => {
            return Err(EvalError::type_error(
                "force",
                format!("expected a promise, found a {}", other.type_name()),
            ))
        }
        _ => return Err(EvalError::arity("force", "1", args.len())),
    };

    if let PromiseState::Forced(value) = &*promise.borrow() {
        return Ok(value.clone());
    }

    let (expr, env) = match &*promise.borrow() {
        PromiseState::Unforced { expr, env } => (expr.clone(), Rc::clone(env)),
        PromiseState::Forced(_) => unreachable!("checked above"),
    };

    let result = evaluate(&expr, &env)?;
    if !matches!(result, Value::Nil | Value::Pair(_)) {
        return Err(EvalError::PromiseResultError(result.type_name().to_string()));
    }

    *promise.borrow_mut() = PromiseState::Forced(result.clone());
    Ok(result)
}

pub fn stream_car(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [Value::Pair(cell)] => Ok(cell.borrow().0.clone()),
        [other] => Err(EvalError::type_error(
            "stream-car",
            format!("expected a pair, found a {}", other.type_name()),
        )),
        _ => Err(EvalError::arity("stream-car", "1", args.len())),
    }
}

/// Requires `p` to be a Pair whose cdr is a Promise, and returns its forced
/// value.
pub fn stream_cdr(args: &[Value], env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [Value::Pair(cell)] => {
            let tail = cell.borrow().1.clone();
            force(&[tail], env)
        }
        [other] => Err(EvalError::type_error(
            "stream-cdr",
            format!("expected a pair, found a {}", other.type_name()),
        )),
        _ => Err(EvalError::arity("stream-cdr", "1", args.len())),
    }
}

pub fn register(env: &Rc<Environment>) {
    super::register(env, &["force"], force, false);
    super::register(env, &["stream-car"], stream_car, false);
    super::register(env, &["stream-cdr", "cdr-stream"], stream_cdr, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment as Env;

    #[test]
    fn forcing_a_non_promise_errors() {
        assert!(force(&[Value::Integer(1)], None).is_err());
    }

    #[test]
    fn forcing_twice_returns_the_memoized_value() {
        let env = Env::new();
        let promise = Value::Promise(Rc::new(std::cell::RefCell::new(PromiseState::Unforced {
            expr: Value::Nil,
            env: env.clone(),
        })));
        let first = force(&[promise.clone()], None).unwrap();
        let second = force(&[promise], None).unwrap();
        assert!(matches!(first, Value::Nil));
        assert!(matches!(second, Value::Nil));
    }
}
