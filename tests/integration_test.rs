// ABOUTME: Integration tests exercising the evaluator's testable properties end to end

use scheme_core::env::Environment;
use scheme_core::error::EvalError;
use scheme_core::eval::evaluate;
use scheme_core::parser::parse_all;
use scheme_core::value::Value;
use scheme_core::{builtins, env};
use std::rc::Rc;

fn setup() -> Rc<Environment> {
    let env = env::Environment::new();
    builtins::register_all(&env);
    env
}

fn run_all(env: &Rc<Environment>, source: &str) -> Result<Value, EvalError> {
    let exprs = parse_all(source).expect("source should parse");
    let mut last = Value::Undefined;
    for expr in &exprs {
        last = evaluate(expr, env)?;
    }
    Ok(last)
}

#[test]
fn lexical_scope_is_resolved_by_name_at_call_time() {
    let env = setup();
    let result = run_all(&env, "((lambda (x) ((lambda (y) x) 2)) 1)").unwrap();
    assert!(matches!(result, Value::Integer(1)));

    let env = setup();
    let result = run_all(
        &env,
        "(define x 1) (define f (lambda () x)) (define x 2) (f)",
    )
    .unwrap();
    assert!(matches!(result, Value::Integer(2)));
}

#[test]
fn dynamic_scope_is_resolved_in_the_caller() {
    let env = setup();
    let result = run_all(
        &env,
        "(define m (mu () x)) (define f (lambda (x) (m))) (f 7)",
    )
    .unwrap();
    assert!(matches!(result, Value::Integer(7)));
}

#[test]
fn tail_calls_do_not_grow_the_host_stack() {
    let env = setup();
    let source = r#"
        (define (count-to n acc)
          (if (> acc n) acc (count-to n (+ acc 1))))
        (count-to 100000 0)
    "#;
    let result = run_all(&env, source).unwrap();
    assert!(matches!(result, Value::Integer(100000)));
}

#[test]
fn non_tail_recursion_of_comparable_depth_hits_the_recursion_limit() {
    let env = setup();
    let source = r#"
        (define (sum-to n)
          (if (= n 0) 0 (+ n (sum-to (- n 1)))))
        (sum-to 100000)
    "#;
    let result = run_all(&env, source);
    assert!(matches!(result, Err(EvalError::RecursionLimit)));
}

#[test]
fn and_or_short_circuit_without_evaluating_unneeded_operands() {
    let env = setup();
    assert!(matches!(
        run_all(&env, "(and 1 2 3)").unwrap(),
        Value::Integer(3)
    ));
    assert!(matches!(
        run_all(&env, "(and 1 #f (/ 1 0))").unwrap(),
        Value::Bool(false)
    ));
    assert!(matches!(
        run_all(&env, "(or #f 0 (/ 1 0))").unwrap(),
        Value::Integer(0)
    ));
}

#[test]
fn quasiquote_evaluates_unquoted_expressions_at_the_matching_depth() {
    let env = setup();
    let result = run_all(&env, "`(1 ,(+ 2 3) 4)").unwrap();
    let items = result.list_to_vec().unwrap();
    assert!(matches!(items[0], Value::Integer(1)));
    assert!(matches!(items[1], Value::Integer(5)));
    assert!(matches!(items[2], Value::Integer(4)));
}

#[test]
fn streams_defer_evaluation_of_their_tail() {
    let env = setup();
    let result = run_all(&env, "(define s (cons-stream 1 (/ 1 0))) (car s)").unwrap();
    assert!(matches!(result, Value::Integer(1)));

    let err = run_all(&env, "(stream-cdr s)").unwrap_err();
    assert!(matches!(err, EvalError::ArithmeticError { .. }));
}

#[test]
fn forcing_a_promise_twice_does_not_repeat_the_side_effect() {
    let env = setup();
    let source = r#"
        (define counter (cons 0 '()))
        (define (bump) (set-car! counter (+ (car counter) 1)) counter)
        (define p (delay (bump)))
        (force p)
        (force p)
        (car (force p))
    "#;
    let result = run_all(&env, source).unwrap();
    assert!(matches!(result, Value::Integer(1)));
}

#[test]
fn macros_are_unhygienic_by_design() {
    let env = setup();
    let source = r#"
        (define-macro (m x) (list 'quote x))
        (m (+ 1 2))
    "#;
    let result = run_all(&env, source).unwrap();
    let items = result.list_to_vec().unwrap();
    assert!(matches!(&items[0], Value::Symbol(s) if &**s == "+"));
}

#[test]
fn equal_is_structural_and_eq_is_identity() {
    let env = setup();
    assert!(matches!(
        run_all(&env, "(equal? (list 1 2) (list 1 2))").unwrap(),
        Value::Bool(true)
    ));
    assert!(matches!(
        run_all(&env, "(define x (list 1)) (eq? x x)").unwrap(),
        Value::Bool(true)
    ));
    assert!(matches!(
        run_all(&env, "(eq? (list 1) (list 1))").unwrap(),
        Value::Bool(false)
    ));
}

#[test]
fn list_length_and_append_round_trip() {
    let env = setup();
    assert!(matches!(
        run_all(&env, "(length (list 1 2 3))").unwrap(),
        Value::Integer(3)
    ));
    assert!(matches!(
        run_all(&env, "(equal? (list 1 2 3) (append (list 1 2 3) '()))").unwrap(),
        Value::Bool(true)
    ));
}

#[test]
fn lambda_arity_is_enforced() {
    let env = setup();
    let too_few = run_all(&env, "((lambda (a b) a) 1)");
    assert!(matches!(too_few, Err(EvalError::ArityError { .. })));

    let too_many = run_all(&env, "((lambda (a) a) 1 2)");
    assert!(matches!(too_many, Err(EvalError::ArityError { .. })));
}

#[test]
fn factorial_program_runs_end_to_end() {
    let env = setup();
    let source = r#"
        (define (factorial n)
          (if (<= n 1) 1 (* n (factorial (- n 1)))))
        (factorial 10)
    "#;
    let result = run_all(&env, source).unwrap();
    assert!(matches!(result, Value::Integer(3628800)));
}
