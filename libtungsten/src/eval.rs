//! The term-rewriting evaluator.
//!
//! Evaluation rewrites an expression to normal form under ordered definitions. At every step the
//! evaluator looks for the first definition whose pattern matches the expression, trying the
//! context chain innermost-first — argument bindings, then `:=` definitions, then `=`
//! definitions at each context — and finally the process-wide builtin table. An expression no
//! definition matches is its own normal form: an unbound symbol or an unmatched function form
//! evaluates to itself.
//!
//! Rewriting is Turing-complete through recursive user definitions, so termination is not
//! guaranteed. An optional step budget turns divergence into an [EvalError] instead of a hang.

#[macro_use]
mod errors;
mod builtins;
pub mod context;
mod matcher;

pub use context::{Action, ContextArena, CtxId, DefClass, Definition};
pub use errors::EvalErrors;
pub use matcher::{match_seq, Bindings};

use errors::*;

use crate::diagnostics::Diagnostic;
use crate::grammar::ExprRef;
use builtins::BUILTINS;

use core::fmt;
use std::slice;

/// A native builtin action: receives the matched expression, the evaluator, and the context the
/// match occurred in, and returns the finished form.
pub type BuiltinFn = fn(&ExprRef, &mut Evaluator, CtxId) -> Result<ExprRef, EvalError>;

/// Options governing evaluation.
#[derive(Clone, Debug, Default)]
pub struct EvalOptions {
    /// Rewrite steps allowed per top-level evaluation. `None` is unbounded, which is faithful to
    /// the rewriting model but lets a divergent definition spin forever; callers serving
    /// interactive sessions should set a budget.
    pub step_budget: Option<usize>,
}

/// A failure of an evaluation as a whole. Pattern-match failures are not errors (they drive
/// definition fall-through); this surfaces only when evaluation cannot produce any result.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalError {
    /// The step budget ran out before a normal form was reached.
    BudgetExceeded {
        /// The budget that was exhausted.
        budget: usize,
    },
}

impl EvalError {
    /// This error as a user-facing diagnostic.
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            EvalError::BudgetExceeded { budget } => EvaluationBudgetExceeded!(budget),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::BudgetExceeded { budget } => {
                write!(f, "evaluation exceeded its budget of {} rewrite steps", budget)
            }
        }
    }
}

/// The evaluator for one session: a context arena and the options evaluation runs under.
///
/// The builtin definition table is process-wide and shared; everything else here is owned by the
/// session, so distinct evaluators never observe each other's assignments.
pub struct Evaluator {
    contexts: ContextArena,
    options: EvalOptions,
    steps_left: Option<usize>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// An evaluator with default (unbounded) options.
    pub fn new() -> Evaluator {
        Self::with_options(EvalOptions::default())
    }

    pub fn with_options(options: EvalOptions) -> Evaluator {
        Evaluator {
            contexts: ContextArena::new(),
            options,
            steps_left: None,
        }
    }

    /// The root context, where assignments install their definitions.
    pub fn root(&self) -> CtxId {
        self.contexts.root()
    }

    /// Evaluates `expr` to normal form in the root context.
    ///
    /// Each call starts a fresh step budget; definitions installed by the expression (through
    /// `=` and `:=`) persist into later calls.
    pub fn evaluate(&mut self, expr: &ExprRef) -> Result<ExprRef, EvalError> {
        let root = self.contexts.root();
        self.evaluate_in(expr, root)
    }

    /// Evaluates `expr` to normal form in `ctx`.
    pub fn evaluate_in(&mut self, expr: &ExprRef, ctx: CtxId) -> Result<ExprRef, EvalError> {
        self.steps_left = self.options.step_budget;
        self.eval(expr, ctx)
    }

    /// Evaluation steps for one expression: find the first matching definition and apply it.
    /// Rewrite actions loop here rather than recursing, so an arbitrarily long rewrite chain
    /// costs no stack; builtin actions reduce their own sub-parts by calling back in.
    pub(crate) fn eval(&mut self, expr: &ExprRef, ctx: CtxId) -> Result<ExprRef, EvalError> {
        let mut current = expr.clone();
        loop {
            self.consume_step()?;
            match self.find_match(&current, ctx) {
                Some((Action::Rewrite(template), bindings)) => {
                    current = bindings.apply(&template);
                }
                Some((Action::Builtin(f), _)) => return f(&current, self, ctx),
                None => return Ok(current),
            }
        }
    }

    /// The first definition matching `expr`: argument bindings, `:=`, then `=` definitions at
    /// each context walking the chain innermost-first, then the builtin table.
    fn find_match(&self, expr: &ExprRef, ctx: CtxId) -> Option<(Action, Bindings)> {
        let mut cursor = Some(ctx);
        while let Some(cur) = cursor {
            for &class in DefClass::ALL.iter() {
                for def in self.contexts.definitions(cur, class) {
                    if let Some(bindings) =
                        match_seq(slice::from_ref(expr), slice::from_ref(&def.pattern))
                    {
                        return Some((def.action.clone(), bindings));
                    }
                }
            }
            cursor = self.contexts.parent(cur);
        }

        for def in BUILTINS.iter() {
            if let Some(bindings) = match_seq(slice::from_ref(expr), slice::from_ref(&def.pattern))
            {
                return Some((def.action.clone(), bindings));
            }
        }
        None
    }

    fn consume_step(&mut self) -> Result<(), EvalError> {
        if let Some(left) = &mut self.steps_left {
            if *left == 0 {
                return Err(EvalError::BudgetExceeded {
                    budget: self.options.step_budget.unwrap_or(0),
                });
            }
            *left -= 1;
        }
        Ok(())
    }

    pub(crate) fn fork(&mut self, parent: CtxId) -> CtxId {
        self.contexts.fork(parent)
    }

    pub(crate) fn install(&mut self, ctx: CtxId, class: DefClass, def: Definition) {
        self.contexts.install(ctx, class, def);
    }

    pub(crate) fn remove_definitions(
        &mut self,
        ctx: CtxId,
        class: DefClass,
        pattern: &ExprRef,
    ) -> usize {
        self.contexts.remove_matching(ctx, class, pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Emit;
    use crate::parser::parse_statements;
    use crate::scanner::{scan, strip};
    use crate::translator::translate;

    fn eval_program(ev: &mut Evaluator, program: &str) -> Result<ExprRef, EvalError> {
        let (trees, diagnostics) = parse_statements(strip(scan(program)));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let mut result = crate::grammar::heads::null();
        for tree in &trees {
            let expr = translate(tree).unwrap();
            result = ev.evaluate(&expr)?;
        }
        Ok(result)
    }

    fn eval_str(program: &str) -> String {
        let mut ev = Evaluator::new();
        eval_program(&mut ev, program).unwrap().emit_fullform()
    }

    macro_rules! evaluator_tests {
        ($($name:ident: $program:expr, $result:expr)*) => {
        $(
            #[test]
            fn $name() {
                assert_eq!(eval_str($program), $result);
            }
        )*
        }
    }

    evaluator_tests! {
        number: "2", "2"
        string: "\"hi\"", "hi"
        boolean: "True", "True"
        unbound_symbol: "y", "y"

        arithmetic: "1+2*3", "7"
        parens: "(1+2)*3", "9"
        subtract_chain: "10-4-2", "4"
        divide: "8/4/2", "1"
        modulo: "10 % 3", "1"
        power: "2^10", "1024"
        power_right_assoc: "2^3^2", "512"
        unary_minus: "-(1+2)", "-3"
        float_arith: "1.5 * 2", "3"
        divide_by_zero_unevaluated: "1/0", "Divide[1, 0]"
        mod_by_zero_unevaluated: "1 % 0", "Mod[1, 0]"

        symbolic_left_intact: "x+1", "Plus[x, 1]"
        partial_fold: "1+2+x", "Plus[3, x]"
        symbolic_compare: "1 < x", "Less[1, x]"

        assignment_returns_value: "x = 5", "5"
        assignment_persists: "x = 5; x + 1", "6"
        reassignment_overwrites: "x = 1; x = 2; x", "2"
        assignment_rhs_evaluates_at_install: "x = 1 + 2; x", "3"
        delayed_returns_null: "f := 1", "Null"
        delayed_takes_precedence_over_fixed: "x = 1; x := 2; x", "2"
        clear_assign: "x = 5; ClearAssign[x]; x + 1", "Plus[x, 1]"
        clear_delayed: "f := 1; ClearDelayedAssign[f]; f", "f"
        function_definition: "f[x_] = x + 1; f[5]", "6"
        delayed_function: "g[x_] := x * x; g[4]", "16"
        recursive_function: "fact[n_] := If[n == 0, 1, n * fact[n - 1]]; fact[5]", "120"
        head_restricted_parameter: "h[x_Number] := x + 1; h[5]", "6"
        head_restricted_rejects: "h[x_Number] := x + 1; h[y]", "h[y]"

        lambda: "Function[x, x + 1][5]", "6"
        lambda_two_params: "Function[x, y, x * y][3, 4]", "12"
        lambda_sequence_param: "Function[xs__, Length[{xs}]][1, 2, 3]", "3"
        named_lambda: "f = Function[x, x + 1]; f[5]", "6"
        lambda_body_held_at_assign: "x = 5; g = Function[x, x]; g[7]", "7"
        argument_binding_shadows_assignment: "x = 10; Function[x, x + 1][1]", "2"
        lambda_rejecting_args_left_unevaluated:
            "Function[x_Number, x][y]", "Function[Pattern[x, Blank[Number]], x][y]"

        head_of_call: "Head[f[1]]", "f"
        head_of_number: "Head[5]", "Number"
        head_of_symbol: "Head[x]", "Symbol"
        length_of_list: "Length[{1, 2, 3}]", "3"
        length_of_terminal: "Length[5]", "0"
        first_of_list: "First[{1, 2}]", "1"
        first_of_number_unevaluated: "First[5]", "First[5]"
        rest_of_list: "RestPart[{1, 2, 3}]", "List[2, 3]"
        list_children_evaluate: "{1 + 1, 2 * 2}", "List[2, 4]"

        match_q_sequence: "MatchQ[{1, 2, 3}, {1, __, 3}]", "True"
        match_q_sequence_fail: "MatchQ[{1, 2}, {1, __, 3}]", "False"
        match_q_null_sequence: "MatchQ[{}, {___}]", "True"
        match_q_head: "MatchQ[5, _Number]", "True"
        match_q_head_fail: "MatchQ[x, _Number]", "False"
        match_q_bound_pattern: "MatchQ[{1, 1}, {n_, n_}]", "True"
        match_q_bound_conflict: "MatchQ[{1, 2}, {n_, n_}]", "False"
        match_q_alternatives: "MatchQ[2, Alternatives[1, 2]]", "True"
        match_q_verbatim: "MatchQ[_, Verbatim[_]]", "True"
        match_q_verbatim_rejects_value: "MatchQ[5, Verbatim[_]]", "False"
        match_q_subject_evaluates: "MatchQ[1 + 1, 2]", "True"

        equal_after_eval: "1 + 1 == 2", "True"
        equal_structural: "{1, 2} == {1, 2}", "True"
        same_q: "{1, 2} === {1, 2}", "True"
        unequal: "1 != 2", "True"
        less: "1 < 2", "True"
        greater_equal: "1 >= 2", "False"

        or_true: "False || True", "True"
        or_all_false: "False || False", "False"
        and_false: "True && False", "False"
        and_all_true: "True && True", "True"
        not_true: "!True", "False"
        or_symbolic_residue: "False || x", "x"
        if_true: "If[1 < 2, 10, 20]", "10"
        if_false: "If[1 > 2, 10, 20]", "20"
        if_two_arg_false: "If[False, 10]", "Null"
        if_symbolic_condition: "If[x, 1, 2]", "If[x, 1, 2]"

        sequence_splices_into_call: "f[Sequence[1, 2]]", "f[1, 2]"
        nested_sequence_splices: "f[Sequence[1, Sequence[2, 3]]]", "f[1, 2, 3]"
        unknown_call_evaluates_children: "foo[1 + 1]", "foo[2]"
    }

    #[test]
    fn normal_forms_are_idempotent() {
        for program in ["7", "x", "Plus[x, 1]", "{1, 2}", "f[y]"].iter() {
            let once = eval_str(program);
            assert_eq!(eval_str(&once), once, "{} is not a fixed point", program);
        }
    }

    #[test]
    fn sessions_do_not_share_assignments() {
        let mut a = Evaluator::new();
        let mut b = Evaluator::new();
        eval_program(&mut a, "x = 1").unwrap();
        let in_b = eval_program(&mut b, "x + 1").unwrap();
        assert_eq!(in_b.emit_fullform(), "Plus[x, 1]");
    }

    mod budget {
        use super::*;

        fn bounded(steps: usize) -> Evaluator {
            Evaluator::with_options(EvalOptions {
                step_budget: Some(steps),
            })
        }

        #[test]
        fn divergent_definition_exceeds_budget() {
            let mut ev = bounded(1_000);
            let err = eval_program(&mut ev, "loop := loop; loop").unwrap_err();
            assert_eq!(err, EvalError::BudgetExceeded { budget: 1_000 });
        }

        #[test]
        fn budget_resets_between_evaluations() {
            let mut ev = bounded(1_000);
            for _ in 0..10 {
                // Well under budget individually; fails only if steps leak across calls.
                assert!(eval_program(&mut ev, "1 + 2 * 3").is_ok());
            }
        }

        #[test]
        fn if_does_not_evaluate_the_untaken_branch() {
            let mut ev = bounded(1_000);
            let result = eval_program(&mut ev, "loop := loop; If[True, 1, loop]").unwrap();
            assert_eq!(result.emit_fullform(), "1");
        }

        #[test]
        fn or_short_circuits_past_divergence() {
            let mut ev = bounded(1_000);
            let result = eval_program(&mut ev, "loop := loop; True || loop").unwrap();
            assert_eq!(result.emit_fullform(), "True");
        }

        #[test]
        fn and_short_circuits_past_divergence() {
            let mut ev = bounded(1_000);
            let result = eval_program(&mut ev, "loop := loop; False && loop").unwrap();
            assert_eq!(result.emit_fullform(), "False");
        }

        #[test]
        fn budget_error_renders_as_diagnostic() {
            let err = EvalError::BudgetExceeded { budget: 50 };
            let diagnostic = err.diagnostic();
            assert_eq!(diagnostic.code, Some("E0001"));
        }
    }
}
