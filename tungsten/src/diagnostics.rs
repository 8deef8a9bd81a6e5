//! User-facing tungsten diagnostics.
//!
//! Demarshalls [libtungsten diagnostics][libtungsten::diagnostics] into annotated source
//! snippets pleasant for terminal output.

use libtungsten::diagnostics::{AssociatedDiagnostic, Diagnostic, DiagnosticKind};

use annotate_snippets::display_list::{DisplayList, FormatOptions};
use annotate_snippets::snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation};

/// Pads the source so diagnostics pointing just past its end (unexpected EOF) still have a
/// column to annotate.
pub fn sanitize_source_for_diagnostics(source: &str) -> String {
    let mut source = source.to_owned();
    source.push(' ');
    source
}

/// Renders diagnostics over their (sanitized) source, one annotated snippet each.
pub fn emit_tungsten_diagnostics(
    file: Option<&str>,
    source: &str,
    diagnostics: &[Diagnostic],
    color: bool,
) -> String {
    let mut emitted = String::new();
    for (i, diagnostic) in diagnostics.iter().enumerate() {
        emitted.push_str(&render_diagnostic(file, source, diagnostic, color));
        emitted.push('\n');
        if i + 1 != diagnostics.len() {
            emitted.push('\n');
        }
    }
    emitted
}

fn render_diagnostic(
    file: Option<&str>,
    source: &str,
    diagnostic: &Diagnostic,
    color: bool,
) -> String {
    let annotation_type = convert_kind(&diagnostic.kind);

    // The first annotation always points at the code that produced the diagnostic; spanned
    // associated diagnostics follow it on the same slice.
    let label = diagnostic.msg.clone().unwrap_or_default();
    let mut annotations = vec![SourceAnnotation {
        label: &label,
        annotation_type,
        range: diagnostic.span.into(),
    }];
    for associated in diagnostic.associated_diagnostics.iter() {
        annotations.push(SourceAnnotation {
            label: &associated.msg,
            annotation_type: convert_kind(&associated.kind),
            range: associated.span.into(),
        });
    }

    // Unspanned associated diagnostics become the snippet footer.
    let footer = diagnostic
        .unspanned_associated_diagnostics
        .iter()
        .map(convert_associated)
        .collect();

    let snippet = Snippet {
        title: Some(Annotation {
            label: Some(&diagnostic.title),
            id: diagnostic.code,
            annotation_type,
        }),
        footer,
        slices: vec![Slice {
            source,
            line_start: 1,
            origin: file,
            fold: true,
            annotations,
        }],
        opt: FormatOptions {
            color,
            ..Default::default()
        },
    };
    DisplayList::from(snippet).to_string()
}

fn convert_associated(diagnostic: &AssociatedDiagnostic) -> Annotation<'_> {
    Annotation {
        label: Some(&diagnostic.msg),
        id: None,
        annotation_type: convert_kind(&diagnostic.kind),
    }
}

fn convert_kind(kind: &DiagnosticKind) -> AnnotationType {
    match kind {
        DiagnosticKind::Error => AnnotationType::Error,
        DiagnosticKind::Warning => AnnotationType::Warning,
        DiagnosticKind::Note => AnnotationType::Note,
        DiagnosticKind::Help => AnnotationType::Help,
    }
}
