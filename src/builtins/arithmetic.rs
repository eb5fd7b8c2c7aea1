//! Arithmetic operations: `+ - * / quotient modulo remainder abs expt`
//!
//! Numbers are either `Integer` or `Real`. Operations stay
//! in exact integer arithmetic when every operand is an `Integer`, and
//! otherwise fall back to floating point, normalizing a mathematically
//! integral float result back to `Integer`.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

enum Num {
    Int(i64),
    Real(f64),
}

impl Num {
    fn as_f64(&self) -> f64 {
        match self {
            Num::Int(i) => *i as f64,
            Num::Real(r) => *r,
        }
    }
}

fn to_num(value: &Value, op: &str) -> Result<Num, EvalError> {
    match value {
        Value::Integer(i) => Ok(Num::Int(*i)),
        Value::Real(r) => Ok(Num::Real(*r)),
        other => Err(EvalError::type_error(
            op,
            format!("expected a number, found a {}", other.type_name()),
        )),
    }
}

fn to_int(value: &Value, op: &str) -> Result<i64, EvalError> {
    match value {
        Value::Integer(i) => Ok(*i),
        other => Err(EvalError::type_error(
            op,
            format!("expected an integer, found a {}", other.type_name()),
        )),
    }
}

fn normalize(r: f64) -> Value {
    if r.is_finite() && r.fract() == 0.0 && r.abs() < 9.0e18 {
        Value::Integer(r as i64)
    } else {
        Value::Real(r)
    }
}

pub fn add(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    let mut all_int = true;
    let mut int_acc: i64 = 0;
    let mut real_acc: f64 = 0.0;
    for arg in args {
        match to_num(arg, "+")? {
            Num::Int(i) => {
                int_acc = int_acc.wrapping_add(i);
                real_acc += i as f64;
            }
            Num::Real(r) => {
                all_int = false;
                real_acc += r;
            }
        }
    }
    Ok(if all_int { Value::Integer(int_acc) } else { normalize(real_acc) })
}

pub fn sub(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity("-", "at least 1", 0));
    }
    let first = to_num(&args[0], "-")?;
    if args.len() == 1 {
        return Ok(match first {
            Num::Int(i) => Value::Integer(-i),
            Num::Real(r) => normalize(-r),
        });
    }
    let mut all_int = matches!(first, Num::Int(_));
    let mut int_acc = match first {
        Num::Int(i) => i,
        Num::Real(_) => 0,
    };
    let mut real_acc = first.as_f64();
    for arg in &args[1..] {
        match to_num(arg, "-")? {
            Num::Int(i) => {
                int_acc = int_acc.wrapping_sub(i);
                real_acc -= i as f64;
            }
            Num::Real(r) => {
                all_int = false;
                real_acc -= r;
            }
        }
    }
    Ok(if all_int { Value::Integer(int_acc) } else { normalize(real_acc) })
}

pub fn mul(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    let mut all_int = true;
    let mut int_acc: i64 = 1;
    let mut real_acc: f64 = 1.0;
    for arg in args {
        match to_num(arg, "*")? {
            Num::Int(i) => {
                int_acc = int_acc.wrapping_mul(i);
                real_acc *= i as f64;
            }
            Num::Real(r) => {
                all_int = false;
                real_acc *= r;
            }
        }
    }
    Ok(if all_int { Value::Integer(int_acc) } else { normalize(real_acc) })
}

pub fn div(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity("/", "at least 1", 0));
    }
    let first = to_num(&args[0], "/")?.as_f64();
    if args.len() == 1 {
        if first == 0.0 {
            return Err(EvalError::arithmetic("/", "division by zero"));
        }
        return Ok(normalize(1.0 / first));
    }
    let mut acc = first;
    for arg in &args[1..] {
        let divisor = to_num(arg, "/")?.as_f64();
        if divisor == 0.0 {
            return Err(EvalError::arithmetic("/", "division by zero"));
        }
        acc /= divisor;
    }
    Ok(normalize(acc))
}

pub fn quotient(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [a, b] => {
            let (a, b) = (to_int(a, "quotient")?, to_int(b, "quotient")?);
            if b == 0 {
                return Err(EvalError::arithmetic("quotient", "division by zero"));
            }
            Ok(Value::Integer(a / b))
        }
        _ => Err(EvalError::arity("quotient", "2", args.len())),
    }
}

/// Result takes the sign of the divisor (floored division).
pub fn modulo(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [a, b] => {
            let (a, b) = (to_int(a, "modulo")?, to_int(b, "modulo")?);
            if b == 0 {
                return Err(EvalError::arithmetic("modulo", "division by zero"));
            }
            let r = a % b;
            Ok(Value::Integer(if r != 0 && (r < 0) != (b < 0) { r + b } else { r }))
        }
        _ => Err(EvalError::arity("modulo", "2", args.len())),
    }
}

/// Result takes the sign of the dividend.
pub fn remainder(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [a, b] => {
            let (a, b) = (to_int(a, "remainder")?, to_int(b, "remainder")?);
            if b == 0 {
                return Err(EvalError::arithmetic("remainder", "division by zero"));
            }
            Ok(Value::Integer(a % b))
        }
        _ => Err(EvalError::arity("remainder", "2", args.len())),
    }
}

pub fn abs(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [Value::Integer(i)] => Ok(Value::Integer(i.abs())),
        [Value::Real(r)] => Ok(Value::Real(r.abs())),
        [other] => Err(EvalError::type_error(
            "abs",
            format!("expected a number, found a {}", other.type_name()),
        )),
        _ => Err(EvalError::arity("abs", "1", args.len())),
    }
}

pub fn expt(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [base, exponent] => {
            if let (Value::Integer(b), Value::Integer(e)) = (base, exponent) {
                if *e >= 0 {
                    return b
                        .checked_pow(*e as u32)
                        .map(Value::Integer)
                        .ok_or_else(|| EvalError::arithmetic("expt", "result overflows an integer"));
                }
            }
            let base = to_num(base, "expt")?.as_f64();
            let exponent = to_num(exponent, "expt")?.as_f64();
            Ok(normalize(base.powf(exponent)))
        }
        _ => Err(EvalError::arity("expt", "2", args.len())),
    }
}

pub fn register(env: &Rc<Environment>) {
    super::register(env, &["+"], add, false);
    super::register(env, &["-"], sub, false);
    super::register(env, &["*"], mul, false);
    super::register(env, &["/"], div, false);
    super::register(env, &["quotient"], quotient, false);
    super::register(env, &["modulo"], modulo, false);
    super::register(env, &["remainder"], remainder, false);
    super::register(env, &["abs"], abs, false);
    super::register(env, &["expt"], expt, false);
}
