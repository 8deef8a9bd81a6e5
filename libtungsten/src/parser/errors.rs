//! Diagnostic errors produced by the parser.

use crate::diagnostics::{DiagnosticRecord, DiagnosticRegistry};

macro_rules! define_errors {
    ($($(#[doc = $doc:expr])+ $code:ident: $error:ident $gen_macro:tt)*) => {$(
        $(#[doc = $doc])+
        pub(crate) struct $error;

        impl DiagnosticRecord for $error {
            const CODE: &'static str = stringify!($code);
            const EXPLANATION: &'static str = concat!($($doc, "\n"),+);
        })*

        /// Diagnostic errors produced by the parser.
        pub struct ParseErrors;

        impl DiagnosticRegistry for ParseErrors {
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
    ///No grammar rule continues the current statement at the offending token. The token may be
    ///misplaced (`1 + * 2`), or a construct may be incomplete (`f[1,]`).
    ///
    ///The statement containing the offending token is abandoned; parsing resumes at the next
    ///statement boundary (`;`). Other statements in the input are unaffected.
    P0001: UnexpectedToken {
        ($span:expr, $found:expr, $expected:expr) => {{
            use crate::diagnostics::*;

            Diagnostic::span_err(
                $span,
                format!("Unexpected {}", $found),
                UnexpectedToken::CODE,
                format!("expected {}", $expected),
            )
        }}
    }

    ///The input ended in the middle of a statement, for example `1 +` or `f[1, 2`.
    ///
    ///Every statement must be complete before the end of the input; add the missing operand or
    ///closing delimiter.
    P0002: UnexpectedEof {
        ($span:expr, $expected:expr) => {{
            use crate::diagnostics::*;

            Diagnostic::span_err(
                $span,
                "Unexpected end of input",
                UnexpectedEof::CODE,
                format!("expected {}", $expected),
            )
            .with_note("the statement before this point is incomplete")
        }}
    }
}
