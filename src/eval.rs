// ABOUTME: The eval/apply core and tail-call trampoline

use crate::env::Environment;
use crate::error::EvalError;
use crate::special_forms;
use crate::value::{Closure, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// A deferred (expression, environment) pair threaded through the trampoline
/// instead of recursing on the host stack.
#[derive(Debug)]
pub struct Thunk {
    pub expr: Value,
    pub env: Rc<Environment>,
}

/// The result of a single evaluation step: either a finished value, or a
/// tail-position thunk for the trampoline to drive further.
pub enum EvalOutcome {
    Value(Value),
    Thunk(Thunk),
}

/// A special-form handler receives the unevaluated operand list (the cdr of
/// the combination), the current environment, and whether the combination
/// itself occupies a tail position.
pub type Handler = fn(&[Value], &Rc<Environment>, bool) -> Result<EvalOutcome, EvalError>;

thread_local! {
    static DEPTH: RefCell<usize> = RefCell::new(0);
}

/// Bounds non-tail recursion so a deep recursive program fails with a
/// reported error instead of overflowing the host stack.
const MAX_RECURSION_DEPTH: usize = 10_000;

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<DepthGuard, EvalError> {
        let exceeded = DEPTH.with(|d| {
            let mut d = d.borrow_mut();
            *d += 1;
            *d > MAX_RECURSION_DEPTH
        });
        if exceeded {
            DEPTH.with(|d| *d.borrow_mut() -= 1);
            return Err(EvalError::RecursionLimit);
        }
        Ok(DepthGuard)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| *d.borrow_mut() -= 1);
    }
}

/// Evaluates `expr` in `env` to a finished value, driving the tail-call
/// trampoline until it bottoms out. This is the crate's single public entry
/// point: every non-tail subexpression is evaluated by a fresh, depth-guarded
/// call to this function, while tail positions are handed to the trampoline
/// as thunks and never grow the host stack.
pub fn evaluate(expr: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let _guard = DepthGuard::enter()?;
    let mut expr = expr.clone();
    let mut env = Rc::clone(env);
    loop {
        match eval_step(&expr, &env, true)? {
            EvalOutcome::Value(v) => return Ok(v),
            EvalOutcome::Thunk(t) => {
                expr = t.expr;
                env = t.env;
            }
        }
    }
}

/// The primitive evaluator. Atoms resolve immediately; combinations dispatch
/// to a special form or fall through to a procedure call. Never recurses on
/// the host stack for a tail-position result: those come back as thunks for
/// `evaluate`'s trampoline to drive.
pub fn eval_step(expr: &Value, env: &Rc<Environment>, tail: bool) -> Result<EvalOutcome, EvalError> {
    match expr {
        Value::Symbol(s) => Ok(EvalOutcome::Value(env.lookup(s)?)),
        Value::Bool(_)
        | Value::Integer(_)
        | Value::Real(_)
        | Value::Str(_)
        | Value::Nil
        | Value::Undefined => Ok(EvalOutcome::Value(expr.clone())),
        Value::Pair(_) => eval_combination(expr, env, tail),
        other => Err(EvalError::type_error(
            "eval",
            format!("cannot evaluate a {}", other.type_name()),
        )),
    }
}

fn eval_combination(expr: &Value, env: &Rc<Environment>, tail: bool) -> Result<EvalOutcome, EvalError> {
    let items = expr
        .list_to_vec()
        .map_err(|_| EvalError::malformed("combination", "expected a proper list"))?;
    let (head, operands) = items
        .split_first()
        .ok_or_else(|| EvalError::malformed("combination", "empty combination ()"))?;

    if let Value::Symbol(name) = head {
        if let Some(handler) = special_forms::lookup(name) {
            return handler(operands, env, tail);
        }
    }

    let proc_val = evaluate(head, env)?;

    if proc_val.is_macro() {
        let operand_list = Value::list_from_vec(operands.to_vec());
        let expanded = apply_macro(&proc_val, operand_list)?;
        return tail_eval(&expanded, env, tail);
    }

    let mut args = Vec::with_capacity(operands.len());
    for operand in operands {
        args.push(evaluate(operand, env)?);
    }
    apply(&proc_val, &args, env, tail)
}

/// Evaluates `expr` in tail position: if `tail` is set, defers it as a thunk
/// for the trampoline; otherwise evaluates it to completion right away.
pub fn tail_eval(expr: &Value, env: &Rc<Environment>, tail: bool) -> Result<EvalOutcome, EvalError> {
    if tail {
        Ok(EvalOutcome::Thunk(Thunk {
            expr: expr.clone(),
            env: Rc::clone(env),
        }))
    } else {
        Ok(EvalOutcome::Value(evaluate(expr, env)?))
    }
}

/// Evaluates a non-empty implicit sequence: every expression but the last is
/// evaluated for effect, and the last is evaluated in tail position.
pub fn eval_sequence(body: &[Value], env: &Rc<Environment>, tail: bool) -> Result<EvalOutcome, EvalError> {
    if body.is_empty() {
        return Ok(EvalOutcome::Value(Value::Undefined));
    }
    let (last, init) = body.split_last().expect("checked non-empty above");
    for expr in init {
        evaluate(expr, env)?;
    }
    tail_eval(last, env, tail)
}

/// Applies a procedure to already-evaluated arguments. Built-ins always
/// produce a finished value; lexical and dynamic procedures
/// evaluate their body as an implicit sequence honoring `tail`.
pub fn apply(
    proc_val: &Value,
    args: &[Value],
    calling_env: &Rc<Environment>,
    tail: bool,
) -> Result<EvalOutcome, EvalError> {
    match proc_val {
        Value::BuiltinProc(b) => {
            let env_arg = if b.wants_env { Some(calling_env) } else { None };
            let result = (b.func)(args, env_arg)?;
            Ok(EvalOutcome::Value(result))
        }
        Value::LexicalProc(c) => {
            let child = Environment::make_child(&c.env, "lambda", &c.formals, args)?;
            eval_sequence(&c.body, &child, tail)
        }
        Value::DynamicProc(d) => {
            let child = Environment::make_child(calling_env, "mu", &d.formals, args)?;
            eval_sequence(&d.body, &child, tail)
        }
        other => Err(EvalError::NotCallable(other.to_string())),
    }
}

/// The variant used by higher-order built-ins (`map`, `filter`, `reduce`,
/// `apply`, `eval`) that need a finished value to hand back to host code
/// instead of a thunk.
pub fn complete_apply(proc_val: &Value, args: &[Value], calling_env: &Rc<Environment>) -> Result<Value, EvalError> {
    match apply(proc_val, args, calling_env, false)? {
        EvalOutcome::Value(v) => Ok(v),
        EvalOutcome::Thunk(t) => evaluate(&t.expr, &t.env),
    }
}

fn apply_macro(proc_val: &Value, operands: Value) -> Result<Value, EvalError> {
    let mac: &Rc<Closure> = match proc_val {
        Value::Macro(c) => c,
        _ => return Err(EvalError::NotCallable(proc_val.to_string())),
    };
    let args = operands.list_to_vec()?;
    let child = Environment::make_child(&mac.env, "macro", &mac.formals, &args)?;
    match eval_sequence(&mac.body, &child, false)? {
        EvalOutcome::Value(v) => Ok(v),
        EvalOutcome::Thunk(t) => evaluate(&t.expr, &t.env),
    }
}

/// Tree-copies `expr`, replacing `(unquote e)` at the matching nesting depth
/// with the evaluation of `e`, and splicing `(unquote-splicing e)` list
/// elements at depth 1. Nested `quasiquote` increments the required depth.
pub fn eval_quasiquote(expr: &Value, env: &Rc<Environment>, depth: usize) -> Result<Value, EvalError> {
    if let Some((head, rest)) = as_head_rest(expr) {
        if let Value::Symbol(s) = &head {
            if &**s == "unquote" {
                let args = rest.list_to_vec()?;
                if args.len() != 1 {
                    return Err(EvalError::malformed("unquote", "expected exactly one operand"));
                }
                return if depth == 1 {
                    evaluate(&args[0], env)
                } else {
                    let inner = eval_quasiquote(&args[0], env, depth - 1)?;
                    Ok(Value::list_from_vec(vec![Value::symbol("unquote"), inner]))
                };
            }
            if &**s == "quasiquote" {
                let args = rest.list_to_vec()?;
                if args.len() != 1 {
                    return Err(EvalError::malformed("quasiquote", "expected exactly one operand"));
                }
                let inner = eval_quasiquote(&args[0], env, depth + 1)?;
                return Ok(Value::list_from_vec(vec![Value::symbol("quasiquote"), inner]));
            }
        }
    }
    match expr {
        Value::Pair(_) => build_quasi_list(expr, env, depth),
        other => Ok(other.clone()),
    }
}

fn build_quasi_list(expr: &Value, env: &Rc<Environment>, depth: usize) -> Result<Value, EvalError> {
    match expr {
        Value::Nil => Ok(Value::Nil),
        Value::Pair(cell) => {
            let (car, cdr) = {
                let borrowed = cell.borrow();
                (borrowed.0.clone(), borrowed.1.clone())
            };

            if depth == 1 {
                if let Some((h, rest)) = as_head_rest(&car) {
                    if matches!(&h, Value::Symbol(s) if &**s == "unquote-splicing") {
                        let args = rest.list_to_vec()?;
                        if args.len() != 1 {
                            return Err(EvalError::malformed(
                                "unquote-splicing",
                                "expected exactly one operand",
                            ));
                        }
                        let spliced = evaluate(&args[0], env)?;
                        let spliced_items = spliced.list_to_vec()?;
                        let tail = build_quasi_list(&cdr, env, depth)?;
                        let mut result = tail;
                        for item in spliced_items.into_iter().rev() {
                            result = Value::cons(item, result);
                        }
                        return Ok(result);
                    }
                }
            }

            let new_car = eval_quasiquote(&car, env, depth)?;
            let new_cdr = match &cdr {
                Value::Pair(_) | Value::Nil => build_quasi_list(&cdr, env, depth)?,
                other => eval_quasiquote(other, env, depth)?,
            };
            Ok(Value::cons(new_car, new_cdr))
        }
        other => eval_quasiquote(other, env, depth),
    }
}

fn as_head_rest(expr: &Value) -> Option<(Value, Value)> {
    match expr {
        Value::Pair(cell) => {
            let borrowed = cell.borrow();
            Some((borrowed.0.clone(), borrowed.1.clone()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;
    use crate::parser::parse_all;

    fn run(source: &str) -> Value {
        let env = Environment::new();
        builtins::register_all(&env);
        let exprs = parse_all(source).expect("parse error");
        let mut last = Value::Undefined;
        for expr in exprs {
            last = evaluate(&expr, &env).expect("eval error");
        }
        last
    }

    #[test]
    fn lexical_scope_resolves_by_name_at_call_time() {
        let result = run("(define x 1) (define f (lambda () x)) (define x 2) (f)");
        assert!(matches!(result, Value::Integer(2)));
    }

    #[test]
    fn nested_lambdas_capture_their_own_environment() {
        let result = run("((lambda (x) ((lambda (y) x) 2)) 1)");
        assert!(matches!(result, Value::Integer(1)));
    }

    #[test]
    fn dynamic_scope_resolves_in_the_caller() {
        let result = run("(define m (mu () x)) (define f (lambda (x) (m))) (f 7)");
        assert!(matches!(result, Value::Integer(7)));
    }

    #[test]
    fn tail_recursion_does_not_overflow_the_host_stack() {
        let result = run(
            "(define (loop n acc) (if (= n 0) acc (loop (- n 1) (+ acc 1))))
             (loop 100000 0)",
        );
        assert!(matches!(result, Value::Integer(100000)));
    }

    #[test]
    fn and_short_circuits_without_evaluating_the_rest() {
        let result = run("(and 1 #f (/ 1 0))");
        assert!(matches!(result, Value::Bool(false)));
    }

    #[test]
    fn or_returns_the_first_truthy_value() {
        let result = run("(or #f 0 (/ 1 0))");
        assert!(matches!(result, Value::Integer(0)));
    }

    #[test]
    fn quasiquote_evaluates_unquoted_subexpressions() {
        let result = run("`(1 ,(+ 2 3) 4)");
        assert_eq!(result.list_to_vec().unwrap().len(), 3);
    }

    #[test]
    fn macros_are_unhygienic_by_design() {
        let result = run("(define-macro (m x) (list 'quote x)) (m (+ 1 2))");
        let items = result.list_to_vec().unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let env = Environment::new();
        builtins::register_all(&env);
        let exprs = parse_all("((lambda (a b) a) 1)").unwrap();
        let result = evaluate(&exprs[0], &env);
        assert!(matches!(result, Err(EvalError::ArityError { .. })));
    }
}
