//! List construction and access: `cons car cdr set-car! set-cdr! list
//! length append`

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

fn as_pair_cell(value: &Value, op: &str) -> Result<&crate::value::PairCell, EvalError> {
    match value {
        Value::Pair(cell) => Ok(cell),
        other => Err(EvalError::type_error(
            op,
            format!("expected a pair, found a {}", other.type_name()),
        )),
    }
}

/// `set-cdr!` only accepts a cdr that is a Pair, Nil, or Promise; `cons`
/// itself is unrestricted.
fn check_cdr_shape(value: &Value, op: &str) -> Result<(), EvalError> {
    match value {
        Value::Pair(_) | Value::Nil | Value::Promise(_) => Ok(()),
        other => Err(EvalError::type_error(
            op,
            format!("cdr must be a pair, nil, or promise, found a {}", other.type_name()),
        )),
    }
}

pub fn cons(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [a, b] => Ok(Value::cons(a.clone(), b.clone())),
        _ => Err(EvalError::arity("cons", "2", args.len())),
    }
}

pub fn car(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [x] => Ok(as_pair_cell(x, "car")?.borrow().0.clone()),
        _ => Err(EvalError::arity("car", "1", args.len())),
    }
}

pub fn cdr(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [x] => Ok(as_pair_cell(x, "cdr")?.borrow().1.clone()),
        _ => Err(EvalError::arity("cdr", "1", args.len())),
    }
}

pub fn set_car(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [pair, value] => {
            as_pair_cell(pair, "set-car!")?.borrow_mut().0 = value.clone();
            Ok(Value::Undefined)
        }
        _ => Err(EvalError::arity("set-car!", "2", args.len())),
    }
}

pub fn set_cdr(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [pair, value] => {
            check_cdr_shape(value, "set-cdr!")?;
            as_pair_cell(pair, "set-cdr!")?.borrow_mut().1 = value.clone();
            Ok(Value::Undefined)
        }
        _ => Err(EvalError::arity("set-cdr!", "2", args.len())),
    }
}

pub fn list(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    Ok(Value::list_from_vec(args.to_vec()))
}

pub fn length(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [x] => Ok(Value::Integer(x.list_to_vec()?.len() as i64)),
        _ => Err(EvalError::arity("length", "1", args.len())),
    }
}

pub fn append(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    let Some((last, init)) = args.split_last() else {
        return Ok(Value::Nil);
    };
    let mut result = last.clone();
    for list in init.iter().rev() {
        let items = list.list_to_vec()?;
        for item in items.into_iter().rev() {
            result = Value::cons(item, result);
        }
    }
    Ok(result)
}

pub fn register(env: &Rc<Environment>) {
    super::register(env, &["cons"], cons, false);
    super::register(env, &["car"], car, false);
    super::register(env, &["cdr"], cdr, false);
    super::register(env, &["set-car!"], set_car, false);
    super::register(env, &["set-cdr!"], set_cdr, false);
    super::register(env, &["list"], list, false);
    super::register(env, &["length"], length, false);
    super::register(env, &["append"], append, false);
}
