// ABOUTME: Version and welcome-banner constants for the interpreter

pub const VERSION: &str = "0.1.0";
pub const WELCOME_MESSAGE: &str = "Scheme-core v0.1.0";
pub const WELCOME_SUBTITLE: &str = "A tail-recursive Scheme dialect evaluator";
