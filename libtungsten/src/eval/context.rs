//! Evaluation contexts and definitions.
//!
//! Contexts form a tree through parent indices into an arena: forking a context allocates one
//! new record pointing at its parent, and a child never mutates a parent's definitions. The
//! arena lives for the whole session; transient lambda contexts are simply never referenced
//! again after the call returns.

use crate::grammar::{raw_eq, Expr, ExprRef};

/// Index of a context record in a [ContextArena].
pub type CtxId = usize;

/// The provenance class of a definition. Classes are tried in declaration order, so the variant
/// order here is the lookup priority (builtins live in a separate, process-wide table tried
/// after all of these).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DefClass {
    /// A transient lambda-parameter binding.
    ArgumentBinding = 0,
    /// A user `:=` definition.
    DelayedAssign = 1,
    /// A user `=` definition.
    FixedAssign = 2,
}

impl DefClass {
    pub const ALL: [DefClass; 3] = [
        DefClass::ArgumentBinding,
        DefClass::DelayedAssign,
        DefClass::FixedAssign,
    ];
}

/// What applying a definition does with the matched expression.
#[derive(Clone)]
pub enum Action {
    /// Substitute the captured bindings into this template, then evaluate the result.
    Rewrite(ExprRef),
    /// Invoke a native builtin.
    Builtin(crate::eval::BuiltinFn),
}

/// A rewrite definition: a pattern and the action taken when it matches.
#[derive(Clone)]
pub struct Definition {
    pub pattern: ExprRef,
    pub action: Action,
    pub display_name: String,
}

impl Definition {
    pub fn rewrite<S: Into<String>>(name: S, pattern: ExprRef, template: ExprRef) -> Definition {
        Definition {
            pattern,
            action: Action::Rewrite(template),
            display_name: name.into(),
        }
    }

    pub fn builtin<S: Into<String>>(
        name: S,
        pattern: ExprRef,
        f: crate::eval::BuiltinFn,
    ) -> Definition {
        Definition {
            pattern,
            action: Action::Builtin(f),
            display_name: name.into(),
        }
    }
}

struct ContextRecord {
    parent: Option<CtxId>,
    definitions: [Vec<Definition>; 3],
}

/// The arena of context records for one session.
pub struct ContextArena {
    records: Vec<ContextRecord>,
}

impl ContextArena {
    /// Creates an arena holding a fresh root context.
    pub fn new() -> ContextArena {
        ContextArena {
            records: vec![ContextRecord {
                parent: None,
                definitions: Default::default(),
            }],
        }
    }

    /// The root context.
    pub fn root(&self) -> CtxId {
        0
    }

    /// Allocates a child of `parent`. The parent's definitions are shared, not copied.
    pub fn fork(&mut self, parent: CtxId) -> CtxId {
        self.records.push(ContextRecord {
            parent: Some(parent),
            definitions: Default::default(),
        });
        self.records.len() - 1
    }

    pub fn parent(&self, ctx: CtxId) -> Option<CtxId> {
        self.records[ctx].parent
    }

    /// The definitions of `class` installed directly on `ctx`, in installation order.
    pub fn definitions(&self, ctx: CtxId, class: DefClass) -> &[Definition] {
        &self.records[ctx].definitions[class as usize]
    }

    /// Installs a definition on `ctx`. Later installations of an identical pattern replace the
    /// earlier one, so reassignment behaves like assignment.
    pub fn install(&mut self, ctx: CtxId, class: DefClass, def: Definition) {
        let defs = &mut self.records[ctx].definitions[class as usize];
        if let Some(existing) = defs.iter_mut().find(|d| raw_eq(&d.pattern, &def.pattern)) {
            *existing = def;
            return;
        }
        defs.push(def);
    }

    /// Removes every definition of `class` on `ctx` whose pattern is structurally `pattern`.
    /// Returns how many were removed.
    pub fn remove_matching(&mut self, ctx: CtxId, class: DefClass, pattern: &ExprRef) -> usize {
        let defs = &mut self.records[ctx].definitions[class as usize];
        let before = defs.len();
        defs.retain(|d| !raw_eq(&d.pattern, pattern));
        before - defs.len()
    }
}

impl Default for ContextArena {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(unused)]
fn _assert_sync()
where
    ExprRef: Send + Sync,
    Expr: Send + Sync,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Expr;

    fn dummy(pattern: ExprRef, value: f64) -> Definition {
        Definition::rewrite("dummy", pattern, Expr::number(value))
    }

    #[test]
    fn fork_points_at_parent_without_copying() {
        let mut arena = ContextArena::new();
        let root = arena.root();
        arena.install(root, DefClass::FixedAssign, dummy(Expr::symbol("x"), 1.0));

        let child = arena.fork(root);
        assert_eq!(arena.parent(child), Some(root));
        assert!(arena.definitions(child, DefClass::FixedAssign).is_empty());
        assert_eq!(arena.definitions(root, DefClass::FixedAssign).len(), 1);
    }

    #[test]
    fn reinstall_replaces_same_pattern() {
        let mut arena = ContextArena::new();
        let root = arena.root();
        arena.install(root, DefClass::FixedAssign, dummy(Expr::symbol("x"), 1.0));
        arena.install(root, DefClass::FixedAssign, dummy(Expr::symbol("x"), 2.0));

        let defs = arena.definitions(root, DefClass::FixedAssign);
        assert_eq!(defs.len(), 1);
        match &defs[0].action {
            Action::Rewrite(t) => assert_eq!(t.as_number(), Some(2.0)),
            _ => panic!("expected a rewrite"),
        }
    }

    #[test]
    fn remove_matching_removes_only_that_pattern() {
        let mut arena = ContextArena::new();
        let root = arena.root();
        arena.install(root, DefClass::FixedAssign, dummy(Expr::symbol("x"), 1.0));
        arena.install(root, DefClass::FixedAssign, dummy(Expr::symbol("y"), 2.0));

        assert_eq!(arena.remove_matching(root, DefClass::FixedAssign, &Expr::symbol("x")), 1);
        let defs = arena.definitions(root, DefClass::FixedAssign);
        assert_eq!(defs.len(), 1);
        assert!(raw_eq(&defs[0].pattern, &Expr::symbol("y")));
    }
}
