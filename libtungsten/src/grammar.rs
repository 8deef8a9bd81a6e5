//! The tungsten expression IR.
//!
//! Every value flowing through the evaluator is an [Expr]: a terminal (symbol, number, string,
//! boolean) or a compound `head[children...]` node. Every expression has a head expression
//! describing its "function symbol"; the head of a terminal is one of a handful of meta-symbol
//! singletons, and the `Symbol` meta-symbol is its own head, terminating the chain.
//!
//! Expressions are immutable and shared through [ExprRef]. Rewriting never edits a node in
//! place: structural changes build fresh nodes and share unchanged subtrees.

pub mod compare;
pub mod heads;

pub use compare::raw_eq;

use std::sync::Arc;

/// A shared, immutable expression. `Arc` rather than `Rc` because the builtin definition table
/// (which stores pattern expressions) is shared across session threads.
pub type ExprRef = Arc<Expr>;

/// An expression tree node.
#[derive(Debug)]
pub enum Expr {
    /// A symbol, like `x` or `Plus`.
    Symbol(String),
    /// A double-precision number.
    Number(f64),
    /// A string.
    Str(String),
    /// `True` or `False`.
    Boolean(bool),
    /// A compound `head[children...]` node.
    Compound(Compound),
}

/// The interior of a compound expression.
#[derive(Debug)]
pub struct Compound {
    pub head: ExprRef,
    pub children: Vec<ExprRef>,
}

impl Expr {
    pub fn symbol<S: Into<String>>(name: S) -> ExprRef {
        Arc::new(Expr::Symbol(name.into()))
    }

    pub fn number(f: f64) -> ExprRef {
        Arc::new(Expr::Number(f))
    }

    pub fn string<S: Into<String>>(s: S) -> ExprRef {
        Arc::new(Expr::Str(s.into()))
    }

    pub fn boolean(b: bool) -> ExprRef {
        if b {
            heads::true_value()
        } else {
            heads::false_value()
        }
    }

    pub fn compound(head: ExprRef, children: Vec<ExprRef>) -> ExprRef {
        Arc::new(Expr::Compound(Compound { head, children }))
    }

    /// Builds `head[children...]` with a plain symbol head.
    pub fn call<S: Into<String>>(head: S, children: Vec<ExprRef>) -> ExprRef {
        Self::compound(Self::symbol(head), children)
    }

    /// The head of this expression.
    ///
    /// Terminal heads are meta-symbol singletons shared by reference; the `Symbol` meta-symbol
    /// answers itself, so head chains always terminate.
    pub fn head(&self) -> ExprRef {
        match self {
            Expr::Symbol(_) => heads::symbol(),
            Expr::Number(_) => heads::number(),
            Expr::Str(_) => heads::string(),
            Expr::Boolean(_) => heads::boolean(),
            Expr::Compound(c) => c.head.clone(),
        }
    }

    pub fn symbol_name(&self) -> Option<&str> {
        match self {
            Expr::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Expr::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Expr::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// Whether this expression is the symbol `name`.
    pub fn is_symbol(&self, name: &str) -> bool {
        self.symbol_name() == Some(name)
    }

    /// The children of a compound whose head is the symbol `head_name`.
    ///
    /// This is the shape test for meta-forms like `Blank[...]` or `Pattern[...]`.
    pub fn compound_named(&self, head_name: &str) -> Option<&[ExprRef]> {
        match self {
            Expr::Compound(c) if c.head.is_symbol(head_name) => Some(&c.children),
            _ => None,
        }
    }

    /// A copy of compound `expr` with `child` appended. Shares all existing children.
    pub(crate) fn appended(expr: &ExprRef, child: ExprRef) -> Option<ExprRef> {
        let c = expr.as_compound()?;
        let mut children = c.children.clone();
        children.push(child);
        Some(Expr::compound(c.head.clone(), children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_meta_symbol_is_its_own_head() {
        let sym = Expr::symbol("x");
        let head = sym.head();
        assert!(head.is_symbol("Symbol"));
        // The chain terminates: the head of the head is the same singleton.
        assert!(Arc::ptr_eq(&head.head(), &head));
    }

    #[test]
    fn terminal_heads() {
        assert!(Expr::number(1.0).head().is_symbol("Number"));
        assert!(Expr::string("s").head().is_symbol("String"));
        assert!(Expr::boolean(true).head().is_symbol("Boolean"));
    }

    #[test]
    fn compound_head_is_shared() {
        let head = Expr::symbol("f");
        let call = Expr::compound(head.clone(), vec![Expr::number(1.0)]);
        assert!(Arc::ptr_eq(&call.head(), &head));
    }

    #[test]
    fn compound_named_matches_shape() {
        let blank = Expr::call("Blank", vec![]);
        assert!(blank.compound_named("Blank").is_some());
        assert!(blank.compound_named("Pattern").is_none());
        assert!(Expr::symbol("Blank").compound_named("Blank").is_none());
    }

    #[test]
    fn appended_shares_existing_children() {
        let one = Expr::number(1.0);
        let list = Expr::call("List", vec![one.clone()]);
        let longer = Expr::appended(&list, Expr::number(2.0)).unwrap();
        let c = longer.as_compound().unwrap();
        assert_eq!(c.children.len(), 2);
        assert!(Arc::ptr_eq(&c.children[0], &one));
        // The original is untouched.
        assert_eq!(list.as_compound().unwrap().children.len(), 1);
    }
}
