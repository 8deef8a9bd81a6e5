//! The builtin definition table.
//!
//! Builtins are an ordered list: the first definition whose pattern matches wins. Held forms and
//! `Sequence` splicing sit first so every later rule sees normalized arguments; the structural
//! catch-all that reduces a compound's head and children sits last, so a form no builtin claims
//! still has its parts evaluated.

use super::context::{DefClass, Definition};
use super::matcher::{match_seq, Bindings};
use super::{BuiltinFn, CtxId, EvalError, Evaluator};
use crate::emit::Emit;
use crate::grammar::{heads, raw_eq, Expr, ExprRef};

use lazy_static::lazy_static;
use num_traits::{Float, Zero};
use std::slice;

lazy_static! {
    /// The process-wide builtin definitions, read-only and shared by every session.
    pub(super) static ref BUILTINS: Vec<Definition> = builtin_definitions();
}

type EvalResult = Result<ExprRef, EvalError>;

fn blank() -> ExprRef {
    Expr::call("Blank", vec![])
}

fn blank_of(head: &str) -> ExprRef {
    Expr::call("Blank", vec![Expr::symbol(head)])
}

fn any_args() -> ExprRef {
    Expr::call("BlankNullSequence", vec![])
}

fn unary(head: &str) -> ExprRef {
    Expr::call(head, vec![blank()])
}

fn binary(head: &str) -> ExprRef {
    Expr::call(head, vec![blank(), blank()])
}

fn variadic(head: &str) -> ExprRef {
    Expr::call(head, vec![any_args()])
}

/// Heads whose contents must not be rewritten: evaluating `x_` or a lambda would otherwise
/// substitute assigned values into the pattern or the body.
fn held_heads() -> ExprRef {
    let heads = [
        "Pattern",
        "Blank",
        "BlankSequence",
        "BlankNullSequence",
        "Verbatim",
        "Alternatives",
        "Function",
    ];
    Expr::call(
        "Alternatives",
        heads.iter().map(|h| Expr::symbol(*h)).collect(),
    )
}

fn builtin_definitions() -> Vec<Definition> {
    fn def(name: &str, pattern: ExprRef, f: BuiltinFn) -> Definition {
        Definition::builtin(name, pattern, f)
    }

    vec![
        def(
            "held form",
            Expr::compound(held_heads(), vec![any_args()]),
            held,
        ),
        // `f[a, Sequence[b, c], d]` flattens to `f[a, b, c, d]` before any other rule looks at
        // the argument list.
        def(
            "sequence splicing",
            Expr::compound(blank(), vec![any_args(), blank_of("Sequence"), any_args()]),
            splice_sequences,
        ),
        def("Length", unary("Length"), length),
        def("First", unary("First"), first),
        def("RestPart", unary("RestPart"), rest_part),
        def("Head", unary("Head"), head_of),
        def("MatchQ", binary("MatchQ"), match_q),
        def(
            "If",
            Expr::call("If", vec![blank(), Expr::call("BlankSequence", vec![])]),
            if_form,
        ),
        def("Or", variadic("Or"), or_form),
        def("And", variadic("And"), and_form),
        def("Not", unary("Not"), not_form),
        def("EqualQ", binary("EqualQ"), equal_q),
        def("SameQ", binary("SameQ"), equal_q),
        def("Unequal", binary("Unequal"), unequal),
        def("Less", binary("Less"), less),
        def("LessEqual", binary("LessEqual"), less_equal),
        def("Greater", binary("Greater"), greater),
        def("GreaterEqual", binary("GreaterEqual"), greater_equal),
        def("Plus", binary("Plus"), plus),
        def("Subtract", binary("Subtract"), subtract),
        def("Times", binary("Times"), times),
        def("Divide", binary("Divide"), divide),
        def("Mod", binary("Mod"), modulo),
        def("Power", binary("Power"), power),
        def("Minus", unary("Minus"), minus),
        def("Assign", binary("Assign"), assign),
        def("AssignDelayed", binary("AssignDelayed"), assign_delayed),
        def("ClearAssign", unary("ClearAssign"), clear_assign),
        def(
            "ClearDelayedAssign",
            unary("ClearDelayedAssign"),
            clear_delayed_assign,
        ),
        def(
            "function application",
            Expr::compound(variadic("Function"), vec![any_args()]),
            apply_function,
        ),
        def(
            "structural evaluation",
            Expr::compound(blank(), vec![any_args()]),
            eval_parts,
        ),
    ]
}

/// Evaluates every child of `expr`, in order.
fn eval_args(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> Result<Vec<ExprRef>, EvalError> {
    let children = match expr.as_compound() {
        Some(c) => c.children.clone(),
        None => return Ok(vec![]),
    };
    let mut args = Vec::with_capacity(children.len());
    for child in &children {
        args.push(ev.eval(child, ctx)?);
    }
    Ok(args)
}

/// `expr` itself if `children` are structurally unchanged, else a fresh node with the same head.
fn rebuild(expr: &ExprRef, children: Vec<ExprRef>) -> ExprRef {
    match expr.as_compound() {
        Some(c) => {
            let unchanged = c.children.len() == children.len()
                && c.children.iter().zip(children.iter()).all(|(a, b)| raw_eq(a, b));
            if unchanged {
                expr.clone()
            } else {
                Expr::compound(c.head.clone(), children)
            }
        }
        None => expr.clone(),
    }
}

fn held(expr: &ExprRef, _ev: &mut Evaluator, _ctx: CtxId) -> EvalResult {
    Ok(expr.clone())
}

fn splice_sequences(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let c = match expr.as_compound() {
        Some(c) => c,
        None => return Ok(expr.clone()),
    };
    let mut children = Vec::with_capacity(c.children.len());
    for child in &c.children {
        match child.compound_named("Sequence") {
            Some(inner) => children.extend(inner.iter().cloned()),
            None => children.push(child.clone()),
        }
    }
    ev.eval(&Expr::compound(c.head.clone(), children), ctx)
}

fn length(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let args = eval_args(expr, ev, ctx)?;
    match args.first().and_then(|a| a.as_compound()) {
        Some(c) => Ok(Expr::number(c.children.len() as f64)),
        None => Ok(Expr::number(0.0)),
    }
}

fn first(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let args = eval_args(expr, ev, ctx)?;
    match args.first().and_then(|a| a.as_compound()) {
        Some(c) if !c.children.is_empty() => Ok(c.children[0].clone()),
        _ => Ok(rebuild(expr, args)),
    }
}

fn rest_part(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let args = eval_args(expr, ev, ctx)?;
    match args.first().and_then(|a| a.as_compound()) {
        Some(c) if !c.children.is_empty() => Ok(Expr::compound(
            c.head.clone(),
            c.children[1..].to_vec(),
        )),
        _ => Ok(rebuild(expr, args)),
    }
}

fn head_of(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let args = eval_args(expr, ev, ctx)?;
    match args.first() {
        Some(a) => Ok(a.head()),
        None => Ok(expr.clone()),
    }
}

fn match_q(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let args = eval_args(expr, ev, ctx)?;
    if args.len() != 2 {
        return Ok(rebuild(expr, args));
    }
    let passes = match_seq(slice::from_ref(&args[0]), slice::from_ref(&args[1])).is_some();
    Ok(Expr::boolean(passes))
}

/// `If[cond, then]` / `If[cond, then, else]`. Only the condition and the selected branch are
/// evaluated.
fn if_form(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let c = match expr.as_compound() {
        Some(c) => c,
        None => return Ok(expr.clone()),
    };
    if c.children.len() > 3 {
        return eval_parts(expr, ev, ctx);
    }
    let cond = ev.eval(&c.children[0], ctx)?;
    match cond.as_boolean() {
        Some(true) => ev.eval(&c.children[1], ctx),
        Some(false) => match c.children.get(2) {
            Some(alt) => ev.eval(alt, ctx),
            None => Ok(heads::null()),
        },
        None => {
            let mut children = c.children.clone();
            children[0] = cond;
            Ok(rebuild(expr, children))
        }
    }
}

fn or_form(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let c = match expr.as_compound() {
        Some(c) => c,
        None => return Ok(expr.clone()),
    };
    let mut residue = Vec::new();
    for child in &c.children {
        let v = ev.eval(child, ctx)?;
        match v.as_boolean() {
            // Short-circuit: operands past the first True are never evaluated.
            Some(true) => return Ok(Expr::boolean(true)),
            Some(false) => {}
            None => residue.push(v),
        }
    }
    if residue.is_empty() {
        Ok(Expr::boolean(false))
    } else if residue.len() == 1 {
        Ok(residue.remove(0))
    } else {
        Ok(rebuild(expr, residue))
    }
}

fn and_form(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let c = match expr.as_compound() {
        Some(c) => c,
        None => return Ok(expr.clone()),
    };
    let mut residue = Vec::new();
    for child in &c.children {
        let v = ev.eval(child, ctx)?;
        match v.as_boolean() {
            Some(false) => return Ok(Expr::boolean(false)),
            Some(true) => {}
            None => residue.push(v),
        }
    }
    if residue.is_empty() {
        Ok(Expr::boolean(true))
    } else if residue.len() == 1 {
        Ok(residue.remove(0))
    } else {
        Ok(rebuild(expr, residue))
    }
}

fn not_form(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let args = eval_args(expr, ev, ctx)?;
    match args.first().and_then(|a| a.as_boolean()) {
        Some(b) => Ok(Expr::boolean(!b)),
        None => Ok(rebuild(expr, args)),
    }
}

fn equal_q(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    structural_equality(expr, ev, ctx, false)
}

fn unequal(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    structural_equality(expr, ev, ctx, true)
}

/// Structural equality of both sides after evaluating each.
fn structural_equality(
    expr: &ExprRef,
    ev: &mut Evaluator,
    ctx: CtxId,
    negate: bool,
) -> EvalResult {
    let args = eval_args(expr, ev, ctx)?;
    if args.len() != 2 {
        return Ok(rebuild(expr, args));
    }
    Ok(Expr::boolean(raw_eq(&args[0], &args[1]) != negate))
}

fn less(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    compare(expr, ev, ctx, |a, b| a < b)
}

fn less_equal(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    compare(expr, ev, ctx, |a, b| a <= b)
}

fn greater(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    compare(expr, ev, ctx, |a, b| a > b)
}

fn greater_equal(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    compare(expr, ev, ctx, |a, b| a >= b)
}

fn compare(
    expr: &ExprRef,
    ev: &mut Evaluator,
    ctx: CtxId,
    cmp: fn(f64, f64) -> bool,
) -> EvalResult {
    let args = eval_args(expr, ev, ctx)?;
    if args.len() != 2 {
        return Ok(rebuild(expr, args));
    }
    match (args[0].as_number(), args[1].as_number()) {
        (Some(a), Some(b)) => Ok(Expr::boolean(cmp(a, b))),
        _ => Ok(rebuild(expr, args)),
    }
}

fn plus(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    fold_binary(expr, ev, ctx, |a, b| Some(a + b))
}

fn subtract(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    fold_binary(expr, ev, ctx, |a, b| Some(a - b))
}

fn times(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    fold_binary(expr, ev, ctx, |a, b| Some(a * b))
}

fn divide(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    fold_binary(expr, ev, ctx, |a, b| if b.is_zero() { None } else { Some(a / b) })
}

fn modulo(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    fold_binary(expr, ev, ctx, |a, b| if b.is_zero() { None } else { Some(a % b) })
}

fn power(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    fold_binary(expr, ev, ctx, |a, b| Some(Float::powf(a, b)))
}

/// Folds a binary arithmetic form once both operands reduce to numbers; otherwise rebuilds it
/// around the evaluated operands. Folds producing non-finite values are left unevaluated.
fn fold_binary(
    expr: &ExprRef,
    ev: &mut Evaluator,
    ctx: CtxId,
    op: fn(f64, f64) -> Option<f64>,
) -> EvalResult {
    let args = eval_args(expr, ev, ctx)?;
    if args.len() != 2 {
        return Ok(rebuild(expr, args));
    }
    match (args[0].as_number(), args[1].as_number()) {
        (Some(a), Some(b)) => match op(a, b) {
            Some(f) if Float::is_finite(f) => Ok(Expr::number(f)),
            _ => Ok(rebuild(expr, args)),
        },
        _ => Ok(rebuild(expr, args)),
    }
}

fn minus(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let args = eval_args(expr, ev, ctx)?;
    match args.first().and_then(|a| a.as_number()) {
        Some(f) => Ok(Expr::number(-f)),
        None => Ok(rebuild(expr, args)),
    }
}

/// The raw (unevaluated) children of a binary form.
fn two_raw(expr: &ExprRef) -> Option<(ExprRef, ExprRef)> {
    match expr.as_compound() {
        Some(c) if c.children.len() == 2 => Some((c.children[0].clone(), c.children[1].clone())),
        _ => None,
    }
}

/// `lhs = rhs`: evaluates `rhs` now, installs `lhs -> value` as a fixed definition, and returns
/// the value. The left-hand side is used as a pattern, never evaluated.
fn assign(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let (lhs, rhs) = match two_raw(expr) {
        Some(parts) => parts,
        None => return Ok(expr.clone()),
    };
    let value = ev.eval(&rhs, ctx)?;
    let root = ev.root();
    let name = lhs.emit_fullform();
    ev.install(root, DefClass::FixedAssign, Definition::rewrite(name, lhs, value.clone()));
    Ok(value)
}

/// `lhs := rhs`: installs `lhs -> rhs` with the right-hand side held for evaluation at each use.
fn assign_delayed(expr: &ExprRef, ev: &mut Evaluator, _ctx: CtxId) -> EvalResult {
    let (lhs, rhs) = match two_raw(expr) {
        Some(parts) => parts,
        None => return Ok(expr.clone()),
    };
    let root = ev.root();
    let name = lhs.emit_fullform();
    ev.install(root, DefClass::DelayedAssign, Definition::rewrite(name, lhs, rhs));
    Ok(heads::null())
}

fn clear_assign(expr: &ExprRef, ev: &mut Evaluator, _ctx: CtxId) -> EvalResult {
    clear(expr, ev, DefClass::FixedAssign)
}

fn clear_delayed_assign(expr: &ExprRef, ev: &mut Evaluator, _ctx: CtxId) -> EvalResult {
    clear(expr, ev, DefClass::DelayedAssign)
}

fn clear(expr: &ExprRef, ev: &mut Evaluator, class: DefClass) -> EvalResult {
    let c = match expr.as_compound() {
        Some(c) if c.children.len() == 1 => c,
        _ => return Ok(expr.clone()),
    };
    let root = ev.root();
    ev.remove_definitions(root, class, &c.children[0]);
    Ok(heads::null())
}

/// A bare-symbol lambda parameter binds a single argument, like an explicit `x_`. Parameters
/// already written as patterns are used as-is.
fn param_pattern(param: &ExprRef) -> ExprRef {
    match param.symbol_name() {
        Some(name) => Expr::call("Pattern", vec![Expr::symbol(name), blank()]),
        None => param.clone(),
    }
}

/// `Function[params..., body][args...]`: matches the evaluated arguments against the parameter
/// patterns, forks a child context holding one argument binding per captured name, and evaluates
/// the body there. Arguments a parameter list rejects leave the call unevaluated.
fn apply_function(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let c = match expr.as_compound() {
        Some(c) => c,
        None => return Ok(expr.clone()),
    };
    let f = match c.head.as_compound() {
        Some(f) => f,
        None => return Ok(expr.clone()),
    };
    let (body, params) = match f.children.split_last() {
        Some(parts) => parts,
        // A bodyless Function has nothing to apply.
        None => return Ok(expr.clone()),
    };
    let params: Vec<ExprRef> = params.iter().map(param_pattern).collect();

    let args = eval_args(expr, ev, ctx)?;
    let bindings = match match_seq(&args, &params) {
        Some(b) => b,
        None => return Ok(rebuild(expr, args)),
    };

    let callee = ev.fork(ctx);
    for (name, seq) in bindings.iter() {
        ev.install(
            callee,
            DefClass::ArgumentBinding,
            Definition::rewrite(name, Expr::symbol(name), Bindings::sequence_value(seq)),
        );
    }
    ev.eval(body, callee)
}

/// The structural catch-all: evaluates the head and every child. If nothing changed the
/// expression is its own normal form; otherwise the reduced form is evaluated again, since the
/// reduction may expose a definition the original form did not match.
fn eval_parts(expr: &ExprRef, ev: &mut Evaluator, ctx: CtxId) -> EvalResult {
    let c = match expr.as_compound() {
        Some(c) => c,
        None => return Ok(expr.clone()),
    };
    let head = ev.eval(&c.head, ctx)?;
    let mut changed = !raw_eq(&head, &c.head);
    let mut children = Vec::with_capacity(c.children.len());
    for child in &c.children {
        let v = ev.eval(child, ctx)?;
        changed = changed || !raw_eq(&v, child);
        children.push(v);
    }
    if !changed {
        return Ok(expr.clone());
    }
    ev.eval(&Expr::compound(head, children), ctx)
}
