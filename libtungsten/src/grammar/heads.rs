//! Meta-symbol and common-value singletons.
//!
//! The head of every terminal expression is one of these singletons, shared by reference across
//! the whole process and never cloned structurally. `Symbol` is deliberately its own head: the
//! head chain of any expression bottoms out here.

use super::{Expr, ExprRef};

use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    static ref SYMBOL: ExprRef = Arc::new(Expr::Symbol("Symbol".into()));
    static ref NUMBER: ExprRef = Arc::new(Expr::Symbol("Number".into()));
    static ref STRING: ExprRef = Arc::new(Expr::Symbol("String".into()));
    static ref BOOLEAN: ExprRef = Arc::new(Expr::Symbol("Boolean".into()));
    static ref NULL: ExprRef = Arc::new(Expr::Symbol("Null".into()));
    static ref TRUE: ExprRef = Arc::new(Expr::Boolean(true));
    static ref FALSE: ExprRef = Arc::new(Expr::Boolean(false));
}

/// The `Symbol` meta-symbol: the head of every symbol, including itself.
pub fn symbol() -> ExprRef {
    SYMBOL.clone()
}

/// The head of number terminals.
pub fn number() -> ExprRef {
    NUMBER.clone()
}

/// The head of string terminals.
pub fn string() -> ExprRef {
    STRING.clone()
}

/// The head of boolean terminals.
pub fn boolean() -> ExprRef {
    BOOLEAN.clone()
}

/// The `Null` symbol, the value of statements evaluated for effect.
pub fn null() -> ExprRef {
    NULL.clone()
}

pub fn true_value() -> ExprRef {
    TRUE.clone()
}

pub fn false_value() -> ExprRef {
    FALSE.clone()
}
