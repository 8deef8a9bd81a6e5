//! # libtungsten
//!
//! libtungsten is the core of tungsten, an interactive symbolic expression evaluator. Inputs
//! flow through a fixed pipeline: the [scanner] resolves characters into tokens by longest
//! prefix match, the [LL(1) parser](parse_statements) expands tokens into one parse tree per
//! statement under the process-wide [predict table](syntax), the [translator](translate) reduces
//! parse trees into `head[children...]` [expression trees](grammar), and the
//! [evaluator](Evaluator) rewrites expressions to normal form under pattern-matching
//! definitions. The [session layer](SessionRegistry) runs one pipeline per topic and restores
//! submission order over out-of-order completions.

pub mod common;
pub mod diagnostics;

pub mod scanner;
pub use scanner::{scan, strip};

pub mod syntax;

mod parser;
pub use parser::{parse_statements, Expected, ParseError, Parser};

mod translator;
pub use translator::{translate, InternalError};

pub mod grammar;

mod emit;
pub use emit::{Emit, EmitFormat};

pub mod eval;
pub use eval::{EvalError, EvalOptions, Evaluator};

mod session;
pub use session::{
    EvalOutput, OutputKind, ReorderBuffer, SessionHandle, SessionRegistry, SESSION_STEP_BUDGET,
};

mod utils;
