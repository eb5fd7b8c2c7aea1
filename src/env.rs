// ABOUTME: Environment module implementing the frame chain

use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new empty child environment.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Creates a child frame binding each formal to the corresponding value
    /// by position. Fails with an arity error if the counts disagree.
    pub fn make_child(
        parent: &Rc<Environment>,
        procedure: &str,
        formals: &[String],
        values: &[Value],
    ) -> Result<Rc<Environment>, EvalError> {
        if formals.len() != values.len() {
            return Err(EvalError::arity(procedure, formals.len().to_string(), values.len()));
        }
        let child = Environment::with_parent(Rc::clone(parent));
        for (formal, value) in formals.iter().zip(values.iter()) {
            child.define(formal.clone(), value.clone());
        }
        Ok(child)
    }

    /// Binds or rebinds a symbol in **this** frame only.
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up a symbol in this frame and, failing that, each ancestor.
    pub fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Ok(value.clone());
        }
        if let Some(ref parent) = self.parent {
            return parent.lookup(name);
        }
        Err(EvalError::UnboundIdentifier(name.to_string()))
    }

    /// Looks up without allocating an error; used by predicates like
    /// `procedure?`'s helpers and the REPL's tab completion.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let env = Environment::new();
        env.define("x".to_string(), Value::Integer(42));
        match env.lookup("x") {
            Ok(Value::Integer(n)) => assert_eq!(n, 42),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unbound_identifier_errors() {
        let env = Environment::new();
        assert!(matches!(
            env.lookup("nope"),
            Err(EvalError::UnboundIdentifier(_))
        ));
    }

    #[test]
    fn shadowing() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Integer(1));
        let child = Environment::with_parent(parent);
        child.define("x".to_string(), Value::Integer(2));
        assert!(matches!(child.lookup("x"), Ok(Value::Integer(2))));
    }

    #[test]
    fn ancestor_lookup() {
        let grandparent = Environment::new();
        grandparent.define("a".to_string(), Value::Integer(1));
        let parent = Environment::with_parent(grandparent);
        parent.define("b".to_string(), Value::Integer(2));
        let child = Environment::with_parent(parent);
        child.define("c".to_string(), Value::Integer(3));

        assert!(matches!(child.lookup("a"), Ok(Value::Integer(1))));
        assert!(matches!(child.lookup("b"), Ok(Value::Integer(2))));
        assert!(matches!(child.lookup("c"), Ok(Value::Integer(3))));
    }

    #[test]
    fn make_child_checks_arity() {
        let env = Environment::new();
        let formals = vec!["a".to_string(), "b".to_string()];
        let values = vec![Value::Integer(1)];
        assert!(Environment::make_child(&env, "f", &formals, &values).is_err());
    }
}
