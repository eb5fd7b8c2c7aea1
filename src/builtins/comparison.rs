//! Numeric comparisons: `= < > <= >=` and the `zero? even? odd?` predicates.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

fn as_f64(value: &Value, op: &str) -> Result<f64, EvalError> {
    match value {
        Value::Integer(i) => Ok(*i as f64),
        Value::Real(r) => Ok(*r),
        other => Err(EvalError::type_error(
            op,
            format!("expected a number, found a {}", other.type_name()),
        )),
    }
}

fn chain(args: &[Value], op: &str, pred: impl Fn(f64, f64) -> bool) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity(op, "at least 2", args.len()));
    }
    let mut nums = Vec::with_capacity(args.len());
    for arg in args {
        nums.push(as_f64(arg, op)?);
    }
    Ok(Value::Bool(nums.windows(2).all(|pair| pred(pair[0], pair[1]))))
}

pub fn eq_num(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    chain(args, "=", |a, b| a == b)
}

pub fn lt(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    chain(args, "<", |a, b| a < b)
}

pub fn gt(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    chain(args, ">", |a, b| a > b)
}

pub fn le(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    chain(args, "<=", |a, b| a <= b)
}

pub fn ge(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    chain(args, ">=", |a, b| a >= b)
}

pub fn is_zero(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [x] => Ok(Value::Bool(as_f64(x, "zero?")? == 0.0)),
        _ => Err(EvalError::arity("zero?", "1", args.len())),
    }
}

pub fn is_even(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [Value::Integer(i)] => Ok(Value::Bool(i % 2 == 0)),
        [other] => Err(EvalError::type_error(
            "even?",
            format!("expected an integer, found a {}", other.type_name()),
        )),
        _ => Err(EvalError::arity("even?", "1", args.len())),
    }
}

pub fn is_odd(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [Value::Integer(i)] => Ok(Value::Bool(i % 2 != 0)),
        [other] => Err(EvalError::type_error(
            "odd?",
            format!("expected an integer, found a {}", other.type_name()),
        )),
        _ => Err(EvalError::arity("odd?", "1", args.len())),
    }
}

pub fn register(env: &Rc<Environment>) {
    super::register(env, &["="], eq_num, false);
    super::register(env, &["<"], lt, false);
    super::register(env, &[">"], gt, false);
    super::register(env, &["<="], le, false);
    super::register(env, &[">="], ge, false);
    super::register(env, &["zero?"], is_zero, false);
    super::register(env, &["even?"], is_even, false);
    super::register(env, &["odd?"], is_odd, false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_num_chains_across_many_arguments() {
        let result = eq_num(&[Value::Integer(1), Value::Integer(1), Value::Integer(1)], None).unwrap();
        assert!(matches!(result, Value::Bool(true)));
    }

    #[test]
    fn lt_detects_a_broken_chain() {
        let result = lt(&[Value::Integer(1), Value::Integer(3), Value::Integer(2)], None).unwrap();
        assert!(matches!(result, Value::Bool(false)));
    }

    #[test]
    fn odd_and_even_partition_integers() {
        assert!(matches!(is_odd(&[Value::Integer(3)], None), Ok(Value::Bool(true))));
        assert!(matches!(is_even(&[Value::Integer(4)], None), Ok(Value::Bool(true))));
    }
}
