//! Thin, host-effecting I/O built-ins, explicitly outside the core:
//! `display print newline error exit`.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::io::Write;
use std::rc::Rc;

/// Prints a value without surrounding quotes on strings.
pub fn display(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [Value::Str(s)] => print!("{}", s),
        [other] => print!("{}", other),
        _ => return Err(EvalError::arity("display", "1", args.len())),
    }
    let _ = std::io::stdout().flush();
    Ok(Value::Undefined)
}

/// Prints a value using its full textual representation, including quotes
/// on strings, followed by a newline.
pub fn print(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    match args {
        [value] => println!("{}", value),
        _ => return Err(EvalError::arity("print", "1", args.len())),
    }
    Ok(Value::Undefined)
}

pub fn newline(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity("newline", "0", args.len()));
    }
    println!();
    let _ = std::io::stdout().flush();
    Ok(Value::Undefined)
}

/// Raises a user-level error carrying the given message, or an empty one.
pub fn error(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    let message = match args {
        [] => String::new(),
        [value] => value.to_string(),
        _ => return Err(EvalError::arity("error", "0 or 1", args.len())),
    };
    Err(EvalError::UserError(message))
}

/// Terminates the process. A bounded host effect, not an evaluator error.
pub fn exit(args: &[Value], _env: Option<&Rc<Environment>>) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity("exit", "0", args.len()));
    }
    std::process::exit(0);
}

pub fn register(env: &Rc<Environment>) {
    super::register(env, &["display"], display, false);
    super::register(env, &["print"], print, false);
    super::register(env, &["newline"], newline, false);
    super::register(env, &["error"], error, false);
    super::register(env, &["exit"], exit, false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_without_a_message_is_still_an_error() {
        assert!(matches!(error(&[], None), Err(EvalError::UserError(_))));
    }

    #[test]
    fn error_carries_its_message_text() {
        let result = error(&[Value::string("boom")], None);
        match result {
            Err(EvalError::UserError(msg)) => assert_eq!(msg, "\"boom\""),
            other => panic!("unexpected {:?}", other),
        }
    }
}
