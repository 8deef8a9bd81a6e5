//! Raw structural equality over expressions.

use super::{Expr, ExprRef};

/// Structural, non-evaluating equality.
///
/// Runs over an explicit worklist rather than native recursion, so arbitrarily deep expressions
/// cannot overflow the stack. Terminals compare by kind and value; compounds compare heads and
/// children pairwise. Correctness never depends on reference identity.
pub fn raw_eq(a: &ExprRef, b: &ExprRef) -> bool {
    let mut work: Vec<(ExprRef, ExprRef)> = vec![(a.clone(), b.clone())];
    while let Some((a, b)) = work.pop() {
        match (a.as_ref(), b.as_ref()) {
            (Expr::Symbol(x), Expr::Symbol(y)) => {
                if x != y {
                    return false;
                }
            }
            (Expr::Number(x), Expr::Number(y)) => {
                if x != y {
                    return false;
                }
            }
            (Expr::Str(x), Expr::Str(y)) => {
                if x != y {
                    return false;
                }
            }
            (Expr::Boolean(x), Expr::Boolean(y)) => {
                if x != y {
                    return false;
                }
            }
            (Expr::Compound(x), Expr::Compound(y)) => {
                if x.children.len() != y.children.len() {
                    return false;
                }
                work.push((x.head.clone(), y.head.clone()));
                for (cx, cy) in x.children.iter().zip(y.children.iter()) {
                    work.push((cx.clone(), cy.clone()));
                }
            }
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Expr;

    fn sample_exprs() -> Vec<ExprRef> {
        vec![
            Expr::symbol("x"),
            Expr::number(2.0),
            Expr::string("hi"),
            Expr::boolean(true),
            Expr::call("Plus", vec![Expr::number(1.0), Expr::symbol("x")]),
            Expr::call(
                "List",
                vec![Expr::call("Blank", vec![]), Expr::number(3.0)],
            ),
        ]
    }

    #[test]
    fn reflexive() {
        for e in sample_exprs() {
            assert!(raw_eq(&e, &e), "{:?} != itself", e);
        }
    }

    #[test]
    fn equal_without_shared_structure() {
        let a = Expr::call("Plus", vec![Expr::number(1.0), Expr::symbol("x")]);
        let b = Expr::call("Plus", vec![Expr::number(1.0), Expr::symbol("x")]);
        assert!(raw_eq(&a, &b));
    }

    #[test]
    fn differs_on_any_change() {
        let base = Expr::call("Plus", vec![Expr::number(1.0), Expr::symbol("x")]);
        let head_changed = Expr::call("Times", vec![Expr::number(1.0), Expr::symbol("x")]);
        let child_changed = Expr::call("Plus", vec![Expr::number(2.0), Expr::symbol("x")]);
        let arity_changed = Expr::call("Plus", vec![Expr::number(1.0)]);
        assert!(!raw_eq(&base, &head_changed));
        assert!(!raw_eq(&base, &child_changed));
        assert!(!raw_eq(&base, &arity_changed));
    }

    #[test]
    fn kind_mismatch() {
        assert!(!raw_eq(&Expr::symbol("True"), &Expr::boolean(true)));
        assert!(!raw_eq(&Expr::number(1.0), &Expr::string("1")));
    }

    #[test]
    fn deep_expression() {
        let mut e = Expr::number(0.0);
        for _ in 0..10_000 {
            e = Expr::call("Minus", vec![e]);
        }
        assert!(raw_eq(&e, &e));
    }
}
