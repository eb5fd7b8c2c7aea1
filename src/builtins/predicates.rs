//! Type predicates: `boolean? number? integer? symbol? string? pair? null?
//! list? procedure? promise?`

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

fn one(args: &[Value], name: &str) -> Result<&Value, EvalError> {
    match args {
        [x] => Ok(x),
        _ => Err(EvalError::arity(name, "1", args.len())),
    }
}

pub fn is_boolean(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one(args, "boolean?")?, Value::Bool(_))))
}

pub fn is_number(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(
        one(args, "number?")?,
        Value::Integer(_) | Value::Real(_)
    )))
}

pub fn is_integer(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    let truthy = match one(args, "integer?")? {
        Value::Integer(_) => true,
        Value::Real(r) => r.is_finite() && r.fract() == 0.0,
        _ => false,
    };
    Ok(Value::Bool(truthy))
}

pub fn is_symbol(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one(args, "symbol?")?, Value::Symbol(_))))
}

pub fn is_string(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one(args, "string?")?, Value::Str(_))))
}

pub fn is_pair(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    Ok(Value::Bool(one(args, "pair?")?.is_pair()))
}

pub fn is_null(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    Ok(Value::Bool(one(args, "null?")?.is_nil()))
}

pub fn is_list(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    let mut cur = one(args, "list?")?.clone();
    loop {
        match cur {
            Value::Nil => return Ok(Value::Bool(true)),
            Value::Pair(cell) => cur = cell.borrow().1.clone(),
            _ => return Ok(Value::Bool(false)),
        }
    }
}

pub fn is_procedure(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    Ok(Value::Bool(one(args, "procedure?")?.is_callable()))
}

pub fn is_promise(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one(args, "promise?")?, Value::Promise(_))))
}

pub fn register(env: &Rc<Environment>) {
    super::register(env, &["boolean?"], is_boolean, false);
    super::register(env, &["number?"], is_number, false);
    super::register(env, &["integer?"], is_integer, false);
    super::register(env, &["symbol?"], is_symbol, false);
    super::register(env, &["string?"], is_string, false);
    super::register(env, &["pair?"], is_pair, false);
    super::register(env, &["null?"], is_null, false);
    super::register(env, &["list?"], is_list, false);
    super::register(env, &["procedure?"], is_procedure, false);
    super::register(env, &["promise?"], is_promise, false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_predicate_requires_a_nil_terminated_chain() {
        let proper = Value::list_from_vec(vec![Value::Integer(1)]);
        assert!(matches!(is_list(&[proper], None), Ok(Value::Bool(true))));

        let dotted = Value::cons(Value::Integer(1), Value::Integer(2));
        assert!(matches!(is_list(&[dotted], None), Ok(Value::Bool(false))));
    }

    #[test]
    fn integer_predicate_accepts_integral_reals() {
        assert!(matches!(is_integer(&[Value::Real(4.0)], None), Ok(Value::Bool(true))));
        assert!(matches!(is_integer(&[Value::Real(4.5)], None), Ok(Value::Bool(false))));
    }
}
