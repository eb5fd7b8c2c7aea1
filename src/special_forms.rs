// ABOUTME: The fixed special-form dispatch table

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{self, eval_quasiquote, eval_sequence, tail_eval, EvalOutcome, Handler};
use crate::value::{Closure, DynamicLambda, PromiseState, Value};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Looks up the handler for a special-form head symbol. Returns `None` for
/// any symbol not in the fixed table, in which case the combination is an
/// ordinary procedure call.
pub fn lookup(name: &str) -> Option<Handler> {
    match name {
        "quote" => Some(sf_quote),
        "if" => Some(sf_if),
        "and" => Some(sf_and),
        "or" => Some(sf_or),
        "cond" => Some(sf_cond),
        "begin" => Some(sf_begin),
        "let" => Some(sf_let),
        "lambda" => Some(sf_lambda),
        "mu" => Some(sf_mu),
        "define" => Some(sf_define),
        "define-macro" => Some(sf_define_macro),
        "quasiquote" => Some(sf_quasiquote),
        "unquote" => Some(sf_unquote),
        "delay" => Some(sf_delay),
        "cons-stream" => Some(sf_cons_stream),
        _ => None,
    }
}

fn symbols_from_slice(items: &[Value]) -> Result<Vec<String>, EvalError> {
    let mut names = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Symbol(s) => names.push(s.to_string()),
            other => {
                return Err(EvalError::malformed(
                    "formals",
                    format!("every formal must be a symbol, found a {}", other.type_name()),
                ))
            }
        }
    }
    let mut seen = HashSet::new();
    for name in &names {
        if !seen.insert(name.clone()) {
            return Err(EvalError::malformed("formals", format!("duplicate formal: {}", name)));
        }
    }
    Ok(names)
}

fn parse_formals(expr: &Value) -> Result<Vec<String>, EvalError> {
    let items = expr
        .list_to_vec()
        .map_err(|_| EvalError::malformed("formals", "must be a proper list"))?;
    symbols_from_slice(&items)
}

fn sf_quote(operands: &[Value], _env: &Rc<Environment>, _tail: bool) -> Result<EvalOutcome, EvalError> {
    match operands {
        [x] => Ok(EvalOutcome::Value(x.clone())),
        _ => Err(EvalError::malformed("quote", "expected exactly one operand")),
    }
}

fn sf_if(operands: &[Value], env: &Rc<Environment>, tail: bool) -> Result<EvalOutcome, EvalError> {
    if operands.len() != 2 && operands.len() != 3 {
        return Err(EvalError::malformed("if", "expected (if cond then [else])"));
    }
    let cond = eval::evaluate(&operands[0], env)?;
    if cond.is_truthy() {
        tail_eval(&operands[1], env, tail)
    } else if operands.len() == 3 {
        tail_eval(&operands[2], env, tail)
    } else {
        Ok(EvalOutcome::Value(Value::Undefined))
    }
}

fn sf_and(operands: &[Value], env: &Rc<Environment>, tail: bool) -> Result<EvalOutcome, EvalError> {
    if operands.is_empty() {
        return Ok(EvalOutcome::Value(Value::Bool(true)));
    }
    let (last, init) = operands.split_last().expect("checked non-empty above");
    for expr in init {
        let value = eval::evaluate(expr, env)?;
        if !value.is_truthy() {
            return Ok(EvalOutcome::Value(Value::Bool(false)));
        }
    }
    tail_eval(last, env, tail)
}

fn sf_or(operands: &[Value], env: &Rc<Environment>, tail: bool) -> Result<EvalOutcome, EvalError> {
    if operands.is_empty() {
        return Ok(EvalOutcome::Value(Value::Bool(false)));
    }
    let (last, init) = operands.split_last().expect("checked non-empty above");
    for expr in init {
        let value = eval::evaluate(expr, env)?;
        if value.is_truthy() {
            return Ok(EvalOutcome::Value(value));
        }
    }
    tail_eval(last, env, tail)
}

fn sf_cond(operands: &[Value], env: &Rc<Environment>, tail: bool) -> Result<EvalOutcome, EvalError> {
    let last_index = operands.len().saturating_sub(1);
    for (i, clause) in operands.iter().enumerate() {
        let parts = clause
            .list_to_vec()
            .map_err(|_| EvalError::malformed("cond", "each clause must be (test body...)"))?;
        let (test_expr, body) = parts
            .split_first()
            .ok_or_else(|| EvalError::malformed("cond", "clause must have a test"))?;

        let is_else = matches!(test_expr, Value::Symbol(s) if &**s == "else");
        if is_else && i != last_index {
            return Err(EvalError::malformed("cond", "else clause must be last"));
        }

        let test_value = if is_else {
            Value::Bool(true)
        } else {
            eval::evaluate(test_expr, env)?
        };

        if test_value.is_truthy() {
            if body.is_empty() {
                return Ok(EvalOutcome::Value(test_value));
            }
            return eval_sequence(body, env, tail);
        }
    }
    Ok(EvalOutcome::Value(Value::Undefined))
}

fn sf_begin(operands: &[Value], env: &Rc<Environment>, tail: bool) -> Result<EvalOutcome, EvalError> {
    eval_sequence(operands, env, tail)
}

fn sf_let(operands: &[Value], env: &Rc<Environment>, tail: bool) -> Result<EvalOutcome, EvalError> {
    let (bindings_expr, body) = operands
        .split_first()
        .ok_or_else(|| EvalError::malformed("let", "expected (let ((v e)...) body...)"))?;
    let bindings = bindings_expr
        .list_to_vec()
        .map_err(|_| EvalError::malformed("let", "bindings must be a proper list"))?;

    let mut names = Vec::with_capacity(bindings.len());
    let mut values = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        let pair = binding
            .list_to_vec()
            .map_err(|_| EvalError::malformed("let", "each binding must be (name expr)"))?;
        if pair.len() != 2 {
            return Err(EvalError::malformed("let", "each binding must be (name expr)"));
        }
        let name = match &pair[0] {
            Value::Symbol(s) => s.to_string(),
            other => {
                return Err(EvalError::malformed(
                    "let",
                    format!("binding name must be a symbol, found a {}", other.type_name()),
                ))
            }
        };
        names.push(name);
        values.push(eval::evaluate(&pair[1], env)?);
    }
    symbols_from_slice(
        &names
            .iter()
            .map(|n| Value::symbol(n.as_str()))
            .collect::<Vec<_>>(),
    )?;

    let child = Environment::with_parent(Rc::clone(env));
    for (name, value) in names.into_iter().zip(values) {
        child.define(name, value);
    }
    eval_sequence(body, &child, tail)
}

fn sf_lambda(operands: &[Value], env: &Rc<Environment>, _tail: bool) -> Result<EvalOutcome, EvalError> {
    let (formals_expr, body) = operands
        .split_first()
        .ok_or_else(|| EvalError::malformed("lambda", "expected (lambda formals body...)"))?;
    let formals = parse_formals(formals_expr)?;
    if body.is_empty() {
        return Err(EvalError::malformed("lambda", "body must be non-empty"));
    }
    Ok(EvalOutcome::Value(Value::LexicalProc(Rc::new(Closure {
        formals,
        body: body.to_vec(),
        env: Rc::clone(env),
    }))))
}

fn sf_mu(operands: &[Value], _env: &Rc<Environment>, _tail: bool) -> Result<EvalOutcome, EvalError> {
    let (formals_expr, body) = operands
        .split_first()
        .ok_or_else(|| EvalError::malformed("mu", "expected (mu formals body...)"))?;
    let formals = parse_formals(formals_expr)?;
    if body.is_empty() {
        return Err(EvalError::malformed("mu", "body must be non-empty"));
    }
    Ok(EvalOutcome::Value(Value::DynamicProc(Rc::new(DynamicLambda {
        formals,
        body: body.to_vec(),
    }))))
}

fn sf_define(operands: &[Value], env: &Rc<Environment>, _tail: bool) -> Result<EvalOutcome, EvalError> {
    let head = operands
        .first()
        .ok_or_else(|| EvalError::malformed("define", "expected (define sym expr) or (define (name f...) body...)"))?;

    match head {
        Value::Symbol(name) => {
            if operands.len() != 2 {
                return Err(EvalError::malformed("define", "expected (define sym expr)"));
            }
            let value = eval::evaluate(&operands[1], env)?;
            env.define(name.to_string(), value);
            Ok(EvalOutcome::Value(Value::Symbol(Rc::clone(name))))
        }
        Value::Pair(_) => {
            let header = head
                .list_to_vec()
                .map_err(|_| EvalError::malformed("define", "malformed procedure header"))?;
            let (name_val, formal_exprs) = header
                .split_first()
                .ok_or_else(|| EvalError::malformed("define", "procedure header needs a name"))?;
            let name = match name_val {
                Value::Symbol(s) => Rc::clone(s),
                other => {
                    return Err(EvalError::malformed(
                        "define",
                        format!("procedure name must be a symbol, found a {}", other.type_name()),
                    ))
                }
            };
            let body = &operands[1..];
            if body.is_empty() {
                return Err(EvalError::malformed("define", "body must be non-empty"));
            }
            let formals = symbols_from_slice(formal_exprs)?;
            let closure = Closure {
                formals,
                body: body.to_vec(),
                env: Rc::clone(env),
            };
            env.define(name.to_string(), Value::LexicalProc(Rc::new(closure)));
            Ok(EvalOutcome::Value(Value::Symbol(name)))
        }
        other => Err(EvalError::malformed(
            "define",
            format!("expected a symbol or procedure header, found a {}", other.type_name()),
        )),
    }
}

fn sf_define_macro(operands: &[Value], env: &Rc<Environment>, _tail: bool) -> Result<EvalOutcome, EvalError> {
    let (header, body) = operands
        .split_first()
        .ok_or_else(|| EvalError::malformed("define-macro", "expected (define-macro (name f...) body...)"))?;
    let header_items = header
        .list_to_vec()
        .map_err(|_| EvalError::malformed("define-macro", "malformed macro header"))?;
    let (name_val, formal_exprs) = header_items
        .split_first()
        .ok_or_else(|| EvalError::malformed("define-macro", "macro header needs a name"))?;
    let name = match name_val {
        Value::Symbol(s) => Rc::clone(s),
        other => {
            return Err(EvalError::malformed(
                "define-macro",
                format!("macro name must be a symbol, found a {}", other.type_name()),
            ))
        }
    };
    if body.is_empty() {
        return Err(EvalError::malformed("define-macro", "body must be non-empty"));
    }
    let formals = symbols_from_slice(formal_exprs)?;
    let mac = Closure {
        formals,
        body: body.to_vec(),
        env: Rc::clone(env),
    };
    env.define(name.to_string(), Value::Macro(Rc::new(mac)));
    Ok(EvalOutcome::Value(Value::Symbol(name)))
}

fn sf_quasiquote(operands: &[Value], env: &Rc<Environment>, _tail: bool) -> Result<EvalOutcome, EvalError> {
    match operands {
        [x] => Ok(EvalOutcome::Value(eval_quasiquote(x, env, 1)?)),
        _ => Err(EvalError::malformed("quasiquote", "expected exactly one operand")),
    }
}

fn sf_unquote(_operands: &[Value], _env: &Rc<Environment>, _tail: bool) -> Result<EvalOutcome, EvalError> {
    Err(EvalError::malformed("unquote", "not valid outside quasiquote"))
}

fn sf_delay(operands: &[Value], env: &Rc<Environment>, _tail: bool) -> Result<EvalOutcome, EvalError> {
    match operands {
        [x] => Ok(EvalOutcome::Value(Value::Promise(Rc::new(RefCell::new(
            PromiseState::Unforced {
                expr: x.clone(),
                env: Rc::clone(env),
            },
        ))))),
        _ => Err(EvalError::malformed("delay", "expected exactly one operand")),
    }
}

fn sf_cons_stream(operands: &[Value], env: &Rc<Environment>, _tail: bool) -> Result<EvalOutcome, EvalError> {
    match operands {
        [a, b] => {
            let head = eval::evaluate(a, env)?;
            let promise = Value::Promise(Rc::new(RefCell::new(PromiseState::Unforced {
                expr: b.clone(),
                env: Rc::clone(env),
            })));
            Ok(EvalOutcome::Value(Value::cons(head, promise)))
        }
        _ => Err(EvalError::malformed("cons-stream", "expected (cons-stream a b)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;
    use crate::eval::evaluate;
    use crate::parser::parse_all;

    fn run(source: &str) -> Value {
        let env = Environment::new();
        builtins::register_all(&env);
        let exprs = parse_all(source).unwrap();
        let mut last = Value::Undefined;
        for expr in exprs {
            last = evaluate(&expr, &env).unwrap();
        }
        last
    }

    #[test]
    fn cond_with_else_clause() {
        let result = run("(cond (#f 1) (else 2))");
        assert!(matches!(result, Value::Integer(2)));
    }

    #[test]
    fn let_binds_in_parallel_using_outer_values() {
        let result = run("(define x 1) (let ((x 2) (y x)) y)");
        assert!(matches!(result, Value::Integer(1)));
    }

    #[test]
    fn duplicate_formals_are_rejected() {
        let env = Environment::new();
        builtins::register_all(&env);
        let exprs = parse_all("(lambda (a a) a)").unwrap();
        assert!(evaluate(&exprs[0], &env).is_err());
    }

    #[test]
    fn stream_tail_is_lazy() {
        let result = run("(define s (cons-stream 1 (/ 1 0))) (car s)");
        assert!(matches!(result, Value::Integer(1)));
    }

    #[test]
    fn unquote_outside_quasiquote_errors() {
        let env = Environment::new();
        builtins::register_all(&env);
        let exprs = parse_all("(unquote 1)").unwrap();
        assert!(evaluate(&exprs[0], &env).is_err());
    }
}
