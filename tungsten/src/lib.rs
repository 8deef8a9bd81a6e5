//! The tungsten app. For an overview of tungsten's design, see
//! [libtungsten's documentation](libtungsten).

#![deny(warnings)]
#![deny(missing_docs)]

mod diagnostics;
use diagnostics::{emit_tungsten_diagnostics, sanitize_source_for_diagnostics};

use libtungsten::diagnostics::Diagnostic;
use libtungsten::{
    parse_statements, scan, strip, translate, Emit, EmitFormat, EvalOptions, Evaluator,
    SESSION_STEP_BUDGET,
};

/// Options to run tungsten with.
pub struct Opts {
    /// Tungsten program.
    pub program: String,
    /// How results of tungsten's execution should be emitted.
    pub emit_format: String,
    /// When true, tungsten will stop after parsing and translation, emitting the unevaluated
    /// expression trees.
    pub parse_only: bool,
    /// When [Some](Option::Some) diagnostic code, will explain that code.
    pub explain_diagnostic: Option<String>,
    /// When true, the binary runs a session-backed interactive loop instead of a one-shot
    /// evaluation. `program` is ignored in that mode.
    pub interactive: bool,
    /// When true, tungsten emit will be colored.
    pub color: bool,
}

/// Output of a tungsten execution.
#[derive(Default)]
pub struct TungstenResult {
    /// Exit code
    pub code: i32,
    /// Emit for stdout
    pub stdout: String,
    /// Emit for stderr
    pub stderr: String,
    /// Whether the stdout should be emit as paged
    pub page: bool,
}

/// Builds a [TungstenResult](self::TungstenResult).
struct TungstenResultBuilder<'a> {
    /// File the program is defined in. [None](Option::None) if the program comes from a side
    /// channel like stdin.
    file: Option<&'a str>,
    /// Program source code sanitized for diagnostic emission.
    sanitized_program: String,
    emit_format: EmitFormat,
    color: bool,
    stdout: String,
    stderr: String,
    page: bool,
}

impl<'a> TungstenResultBuilder<'a> {
    fn new(file: Option<&'a str>, program: &str, emit_format: impl Into<EmitFormat>, color: bool) -> Self {
        Self {
            file,
            sanitized_program: sanitize_source_for_diagnostics(program),
            emit_format: emit_format.into(),
            color,
            stdout: String::new(),
            stderr: String::new(),
            page: false,
        }
    }

    fn emit(&mut self, obj: &dyn Emit) {
        self.stdout.push_str(&obj.emit(self.emit_format));
        self.stdout.push('\n');
    }

    fn err(&mut self, diagnostics: &[Diagnostic]) {
        self.stderr.push_str(&emit_tungsten_diagnostics(
            self.file,
            &self.sanitized_program,
            diagnostics,
            self.color,
        ));
    }

    fn page(&mut self, page: bool) {
        self.page = page;
    }

    fn ok(self) -> TungstenResult {
        TungstenResult {
            code: 0,
            stdout: self.stdout,
            stderr: self.stderr,
            page: self.page,
        }
    }

    fn failed(self) -> TungstenResult {
        TungstenResult {
            code: 1,
            stdout: self.stdout,
            stderr: self.stderr,
            page: self.page,
        }
    }
}

/// Runs tungsten end-to-end over one program: scan, parse, translate, and evaluate every
/// statement, emitting one result per statement.
pub fn run_tungsten(opts: Opts) -> TungstenResult {
    let mut result = TungstenResultBuilder::new(
        None, // file: currently programs can only be read from the command line
        &opts.program,
        &*opts.emit_format,
        opts.color,
    );

    if let Some(diag_code) = opts.explain_diagnostic {
        let codes = Diagnostic::all_codes_with_explanations();
        return match codes.get::<str>(&diag_code) {
            Some(explanation) => {
                result.stdout.push_str(explanation);
                result.page(true);
                result.ok()
            }
            None => {
                result
                    .stderr
                    .push_str(&format!("{} is not a diagnostic code", diag_code));
                result.failed()
            }
        };
    }

    let (trees, diagnostics) = parse_statements(strip(scan(&*opts.program)));
    if !diagnostics.is_empty() {
        result.err(&diagnostics);
        return result.failed();
    }

    let mut exprs = Vec::with_capacity(trees.len());
    for tree in &trees {
        match translate(tree) {
            Ok(expr) => exprs.push(expr),
            Err(internal) => {
                result.err(&[internal.diagnostic()]);
                return result.failed();
            }
        }
    }

    if opts.parse_only {
        for expr in &exprs {
            result.emit(expr);
        }
        return result.ok();
    }

    let mut evaluator = Evaluator::with_options(EvalOptions {
        step_budget: Some(SESSION_STEP_BUDGET),
    });
    for expr in &exprs {
        match evaluator.evaluate(expr) {
            Ok(value) => result.emit(&value),
            Err(err) => {
                result.err(&[err.diagnostic()]);
                return result.failed();
            }
        }
    }
    result.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(program: &str) -> Opts {
        Opts {
            program: program.into(),
            emit_format: "fullform".into(),
            parse_only: false,
            explain_diagnostic: None,
            interactive: false,
            color: false,
        }
    }

    fn run(program: &str) -> TungstenResult {
        run_tungsten(opts(program))
    }

    #[test]
    fn evaluates_one_statement() {
        let result = run("1 + 2 * 3");
        assert_eq!(result.code, 0);
        assert_eq!(result.stdout, "7\n");
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn emits_one_result_per_statement() {
        let result = run("x = 5; x + 1");
        assert_eq!(result.stdout, "5\n6\n");
    }

    #[test]
    fn symbolic_results_emit_in_full_form() {
        let result = run("x + 1");
        assert_eq!(result.stdout, "Plus[x, 1]\n");
    }

    #[test]
    fn parse_errors_fail_with_a_rendered_diagnostic() {
        let result = run("1 + * 2");
        assert_eq!(result.code, 1);
        assert!(result.stdout.is_empty());
        assert!(result.stderr.contains("P0001"), "{}", result.stderr);
    }

    #[test]
    fn parse_only_emits_unevaluated_trees() {
        let mut o = opts("1 + 2 * 3");
        o.parse_only = true;
        let result = run_tungsten(o);
        assert_eq!(result.stdout, "Plus[1, Times[2, 3]]\n");
    }

    #[test]
    fn debug_format_is_not_full_form() {
        let mut o = opts("1 + 2");
        o.emit_format = "debug".into();
        let result = run_tungsten(o);
        assert_ne!(result.stdout, "3\n");
    }

    #[test]
    fn explains_known_diagnostic_codes() {
        let mut o = opts("");
        o.explain_diagnostic = Some("P0001".into());
        let result = run_tungsten(o);
        assert_eq!(result.code, 0);
        assert!(result.page);
        assert!(!result.stdout.is_empty());
    }

    #[test]
    fn rejects_unknown_diagnostic_codes() {
        let mut o = opts("");
        o.explain_diagnostic = Some("Z9999".into());
        let result = run_tungsten(o);
        assert_eq!(result.code, 1);
        assert!(result.stderr.contains("not a diagnostic code"));
    }

    #[test]
    fn divergent_programs_fail_with_budget_diagnostic() {
        let result = run("loop := loop; loop");
        assert_eq!(result.code, 1);
        assert!(result.stderr.contains("E0001"), "{}", result.stderr);
    }
}
