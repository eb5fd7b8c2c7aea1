//! Built-in procedures registered into the global frame.
//!
//! These are ordinary external collaborators: each module registers a small
//! family of `BuiltinProc` values under one or more names. None of this is
//! part of the evaluator core; the core only needs the single registration
//! operation exposed here.

use crate::env::Environment;
use crate::value::{Builtin, BuiltinFn, Value};
use std::rc::Rc;

pub mod arithmetic;
pub mod comparison;
pub mod equality;
pub mod higher_order;
pub mod io;
pub mod lists;
pub mod predicates;
pub mod streams;

/// Installs a `BuiltinProc` under every name in `names`, sharing one display
/// name (the first) across all aliases.
pub fn register(env: &Rc<Environment>, names: &[&str], func: BuiltinFn, wants_env: bool) {
    let builtin = Rc::new(Builtin {
        name: names[0].to_string(),
        func,
        wants_env,
    });
    for name in names {
        env.define(name.to_string(), Value::BuiltinProc(Rc::clone(&builtin)));
    }
}

/// Registers every built-in category into `env`'s global frame.
pub fn register_all(env: &Rc<Environment>) {
    arithmetic::register(env);
    comparison::register(env);
    predicates::register(env);
    lists::register(env);
    equality::register(env);
    higher_order::register(env);
    streams::register(env);
    io::register(env);
}
