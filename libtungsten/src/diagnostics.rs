//! Diagnostics emitted by the tungsten pipeline.
//!
//! Diagnostics are coded, span-annotated records produced by the parser, translator, and
//! evaluator. They are plain data; presentation (color, snippets, paging) is the concern of a
//! front-end like the `tungsten` CLI.

use crate::common::Span;

use std::collections::HashMap;

/// The kind of a tungsten diagnostic.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DiagnosticKind {
    /// An error diagnostic. Generally, this diagnostic should be emitted for unrecoverable
    /// errors. In other cases, a warning or a note may be more applicable.
    Error,
    /// A warning diagnostic describes something legal but likely unintended.
    Warning,
    /// A note diagnostic is a generic annotation with no specific connotation like `error`. It
    /// can be particularly useful as an associated diagnostic, for example in expanding on a
    /// primary error.
    Note,
    /// A help diagnostic should instruct the user how their input can be changed to work
    /// correctly with tungsten.
    Help,
}

/// A secondary diagnostic associated with a primary [Diagnostic].
#[derive(Clone, Debug)]
pub struct AssociatedDiagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub msg: String,
}

/// A diagnostic for a tungsten program.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub title: String,
    pub code: Option<&'static str>,
    pub msg: Option<String>,
    pub associated_diagnostics: Vec<AssociatedDiagnostic>,
    pub unspanned_associated_diagnostics: Vec<AssociatedDiagnostic>,
}

impl Diagnostic {
    /// Creates an error diagnostic at a span.
    pub(crate) fn span_err<S, M, C, N>(span: S, title: M, code: C, err: N) -> Diagnostic
    where
        S: Into<Span>,
        M: Into<String>,
        C: Into<Option<&'static str>>,
        N: Into<Option<String>>,
    {
        Diagnostic {
            kind: DiagnosticKind::Error,
            span: span.into(),
            title: title.into(),
            code: code.into(),
            msg: err.into(),
            associated_diagnostics: Vec::with_capacity(2),
            unspanned_associated_diagnostics: Vec::with_capacity(2),
        }
    }

    /// Adds a note to the diagnostic.
    pub(crate) fn with_note<M>(mut self, note: M) -> Diagnostic
    where
        M: Into<String>,
    {
        self.unspanned_associated_diagnostics
            .push(AssociatedDiagnostic {
                kind: DiagnosticKind::Note,
                span: self.span,
                msg: note.into(),
            });
        self
    }

    /// Adds a help message to the diagnostic.
    pub(crate) fn with_help<M>(mut self, help: M) -> Diagnostic
    where
        M: Into<String>,
    {
        self.unspanned_associated_diagnostics
            .push(AssociatedDiagnostic {
                kind: DiagnosticKind::Help,
                span: self.span,
                msg: help.into(),
            });
        self
    }

    /// Adds a help message to the diagnostic at a particular span.
    #[allow(unused)]
    pub(crate) fn with_spanned_help<S, M>(mut self, span: S, help: M) -> Diagnostic
    where
        S: Into<Span>,
        M: Into<String>,
    {
        self.associated_diagnostics.push(AssociatedDiagnostic {
            kind: DiagnosticKind::Help,
            span: span.into(),
            msg: help.into(),
        });
        self
    }

    /// All diagnostic codes tungsten can produce, with their detailed explanations.
    pub fn all_codes_with_explanations() -> HashMap<&'static str, &'static str> {
        let mut map = HashMap::new();
        for (code, explanation) in crate::parser::ParseErrors::codes_with_explanations()
            .into_iter()
            .chain(crate::translator::TranslatorErrors::codes_with_explanations())
            .chain(crate::eval::EvalErrors::codes_with_explanations())
        {
            map.insert(code, explanation);
        }
        map
    }
}

/// A diagnostic representable by a static code.
pub trait DiagnosticRecord {
    const CODE: &'static str;
    const EXPLANATION: &'static str;
}

/// A registry of diagnostics a module can produce.
pub trait DiagnosticRegistry {
    fn codes_with_explanations() -> Vec<(&'static str, &'static str)>;
}
