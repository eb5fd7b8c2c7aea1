// ABOUTME: Value types representing the evaluator's runtime data and expressions

use crate::env::Environment;
use crate::error::EvalError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A built-in procedure: a host function plus the display name it was
/// registered under and whether it wants the calling environment appended
/// as a trailing argument.
pub struct Builtin {
    pub name: String,
    pub func: BuiltinFn,
    pub wants_env: bool,
}

/// Host callables take the already-evaluated argument list and, when
/// `wants_env` was set at registration, the calling environment.
pub type BuiltinFn = fn(&[Value], Option<&Rc<Environment>>) -> Result<Value, EvalError>;

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

/// The shared shape of lexical procedures and macros: formals, an implicit
/// body sequence, and the environment captured at definition time.
#[derive(Debug)]
pub struct Closure {
    pub formals: Vec<String>,
    pub body: Vec<Value>,
    pub env: Rc<Environment>,
}

/// Dynamic-scoped procedures (`mu`) capture no environment; their body is
/// evaluated in a child of the *caller's* environment.
#[derive(Debug)]
pub struct DynamicLambda {
    pub formals: Vec<String>,
    pub body: Vec<Value>,
}

/// The state of a promise: unforced (expression + capturing environment) or
/// forced (the memoized value). Forcing mutates this in place and drops the
/// expression/environment.
#[derive(Debug)]
pub enum PromiseState {
    Unforced { expr: Value, env: Rc<Environment> },
    Forced(Value),
}

/// A mutable cons cell. Shared via `Rc<RefCell<..>>` so `set-car!`/`set-cdr!`
/// are visible through every alias, and so cyclic structures built with
/// `set-cdr!` are representable.
pub type PairCell = Rc<RefCell<(Value, Value)>>;

/// The tagged universe of runtime values.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Real(f64),
    Symbol(Rc<str>),
    Str(Rc<String>),
    Nil,
    Pair(PairCell),
    BuiltinProc(Rc<Builtin>),
    LexicalProc(Rc<Closure>),
    DynamicProc(Rc<DynamicLambda>),
    Macro(Rc<Closure>),
    Promise(Rc<RefCell<PromiseState>>),
    /// The distinguished self-evaluating value returned where a result is
    /// otherwise unspecified (e.g. a missing `if` else-branch).
    Undefined,
}

impl Value {
    pub fn symbol(name: impl Into<Rc<str>>) -> Value {
        Value::Symbol(name.into())
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::Str(Rc::new(s.into()))
    }

    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Pair(Rc::new(RefCell::new((car, cdr))))
    }

    /// Everything but `#f` is truthy, including `0`, `()`, and `""`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Value::Pair(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::BuiltinProc(_) | Value::LexicalProc(_) | Value::DynamicProc(_)
        )
    }

    pub fn is_macro(&self) -> bool {
        matches!(self, Value::Macro(_))
    }

    /// A lowercase name for this value's type, used in type-error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Symbol(_) => "symbol",
            Value::Str(_) => "string",
            Value::Nil => "nil",
            Value::Pair(_) => "pair",
            Value::BuiltinProc(_) | Value::LexicalProc(_) | Value::DynamicProc(_) => "procedure",
            Value::Macro(_) => "macro",
            Value::Promise(_) => "promise",
            Value::Undefined => "undefined",
        }
    }

    /// Builds a proper list out of a Rust vector, terminated by Nil.
    pub fn list_from_vec(items: Vec<Value>) -> Value {
        let mut result = Value::Nil;
        for item in items.into_iter().rev() {
            result = Value::cons(item, result);
        }
        result
    }

    /// Collects a proper list into a Rust vector. Fails if the chain is not
    /// Nil-terminated (a dotted or cyclic structure).
    pub fn list_to_vec(&self) -> Result<Vec<Value>, EvalError> {
        let mut out = Vec::new();
        let mut cur = self.clone();
        loop {
            match cur {
                Value::Nil => return Ok(out),
                Value::Pair(cell) => {
                    let (car, cdr) = (cell.borrow().0.clone(), cell.borrow().1.clone());
                    out.push(car);
                    cur = cdr;
                }
                _ => {
                    return Err(EvalError::type_error(
                        "list",
                        "expected a proper list, found a dotted tail",
                    ))
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Nil => write!(f, "()"),
            Value::Pair(cell) => {
                write!(f, "(")?;
                let (car, cdr) = (cell.borrow().0.clone(), cell.borrow().1.clone());
                write!(f, "{}", car)?;
                let mut rest = cdr;
                loop {
                    match rest {
                        Value::Nil => break,
                        Value::Pair(next) => {
                            let (car, cdr) = (next.borrow().0.clone(), next.borrow().1.clone());
                            write!(f, " {}", car)?;
                            rest = cdr;
                        }
                        other => {
                            write!(f, " . {}", other)?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Value::BuiltinProc(b) => write!(f, "#[{}]", b.name),
            Value::LexicalProc(_) => write!(f, "#[lambda]"),
            Value::DynamicProc(_) => write!(f, "#[mu]"),
            Value::Macro(_) => write!(f, "#[macro]"),
            Value::Promise(p) => match &*p.borrow() {
                PromiseState::Forced(_) => write!(f, "#[promise (forced)]"),
                PromiseState::Unforced { .. } => write!(f, "#[promise (not forced)]"),
            },
            Value::Undefined => write!(f, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_real_display() {
        assert_eq!(format!("{}", Value::Integer(42)), "42");
        assert_eq!(format!("{}", Value::Real(2.5)), "2.5");
        assert_eq!(format!("{}", Value::Real(3.0)), "3.0");
    }

    #[test]
    fn bool_display() {
        assert_eq!(format!("{}", Value::Bool(true)), "#t");
        assert_eq!(format!("{}", Value::Bool(false)), "#f");
    }

    #[test]
    fn nil_and_symbol_and_string_display() {
        assert_eq!(format!("{}", Value::Nil), "()");
        assert_eq!(format!("{}", Value::symbol("foo")), "foo");
        assert_eq!(format!("{}", Value::string("hi")), "\"hi\"");
    }

    #[test]
    fn proper_list_display() {
        let list = Value::list_from_vec(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
        ]);
        assert_eq!(format!("{}", list), "(1 2 3)");
    }

    #[test]
    fn dotted_pair_display() {
        let pair = Value::cons(Value::Integer(1), Value::Integer(2));
        assert_eq!(format!("{}", pair), "(1 . 2)");
    }

    #[test]
    fn list_round_trip() {
        let items = vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)];
        let list = Value::list_from_vec(items.clone());
        let back = list.list_to_vec().unwrap();
        assert_eq!(back.len(), items.len());
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::Nil.is_truthy());
        assert!(Value::string("").is_truthy());
    }
}
