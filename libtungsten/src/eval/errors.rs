//! Diagnostic errors produced by the evaluator.

use crate::diagnostics::{DiagnosticRecord, DiagnosticRegistry};

macro_rules! define_errors {
    ($($(#[doc = $doc:expr])+ $code:ident: $error:ident $gen_macro:tt)*) => {$(
        $(#[doc = $doc])+
        pub(crate) struct $error;

        impl DiagnosticRecord for $error {
            const CODE: &'static str = stringify!($code);
            const EXPLANATION: &'static str = concat!($($doc, "\n"),+);
        })*

        /// Diagnostic errors produced by the evaluator.
        pub struct EvalErrors;

        impl DiagnosticRegistry for EvalErrors {
            fn codes_with_explanations() -> Vec<(&'static str, &'static str)> {
                let mut vec = Vec::new();
                $(vec.push(($error::CODE, $error::EXPLANATION));)*
                vec
            }
        }

        $(
            macro_rules! $error $gen_macro
        )*
    };
}

define_errors! {
    ///The expression was still being rewritten when the evaluation step budget ran out.
    ///
    ///User definitions may legally diverge (`loop := loop` has no normal form), so evaluations
    ///running under a step budget stop after a fixed number of rewrite steps instead of spinning
    ///forever. Remove the divergent definition with `ClearAssign` or `ClearDelayedAssign`, or
    ///evaluate with a larger budget.
    E0001: EvaluationBudgetExceeded {
        ($budget:expr) => {{
            use crate::diagnostics::*;

            Diagnostic::span_err(
                (0, 0),
                "Evaluation did not reach a normal form",
                EvaluationBudgetExceeded::CODE,
                format!("stopped after {} rewrite steps", $budget),
            )
            .with_help("a definition may rewrite itself forever; ClearAssign it or raise the step budget")
        }}
    }
}
