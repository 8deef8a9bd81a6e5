//! Emit strategies for the tungsten expression IR.

use crate::grammar::*;
use crate::utils::display_float;

use core::fmt;

/// The format in which an expression should be emitted.
#[derive(Copy, Clone)]
pub enum EmitFormat {
    /// Canonical full form: every compound as `Head[child1, child2, ...]`.
    /// For example, `1 + 2` is emitted as `Plus[1, 2]`.
    FullForm,
    /// Tungsten internal debug form.
    /// NB: this form is not stable, and no assumptions should be made about it.
    Debug,
}

impl From<&str> for EmitFormat {
    fn from(s: &str) -> Self {
        match s {
            "debug" => EmitFormat::Debug,
            _ => EmitFormat::FullForm,
        }
    }
}

/// Implements the emission of a type in an [EmitFormat].
pub trait Emit
where
    Self: fmt::Debug,
{
    /// Emit `self` with the given [EmitFormat].
    fn emit(&self, form: EmitFormat) -> String {
        match form {
            EmitFormat::FullForm => self.emit_fullform(),
            EmitFormat::Debug => self.emit_debug(),
        }
    }

    /// Emit `self` in [full form][EmitFormat::FullForm].
    fn emit_fullform(&self) -> String;

    /// Emit `self` in [debug form][EmitFormat::Debug].
    fn emit_debug(&self) -> String {
        format!("{:#?}", self)
    }
}

/// Implements `core::fmt::Display` for a type implementing `Emit`.
macro_rules! fmt_emit_impl {
    ($S:path) => {
        impl core::fmt::Display for $S {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.emit_fullform())
            }
        }
    };
}

fmt_emit_impl!(Expr);
impl Emit for Expr {
    fn emit_fullform(&self) -> String {
        match self {
            Expr::Symbol(name) => name.clone(),
            Expr::Number(num) => display_float(*num),
            Expr::Str(s) => s.clone(),
            Expr::Boolean(true) => "True".into(),
            Expr::Boolean(false) => "False".into(),
            Expr::Compound(Compound { head, children }) => {
                let children = children
                    .iter()
                    .map(|c| c.emit_fullform())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}[{}]", head.emit_fullform(), children)
            }
        }
    }
}

impl Emit for ExprRef {
    fn emit_fullform(&self) -> String {
        self.as_ref().emit_fullform()
    }

    fn emit_debug(&self) -> String {
        self.as_ref().emit_debug()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! emit_tests {
        ($($name:ident: $expr:expr, $fullform:expr)*) => {
        $(
            #[test]
            fn $name() {
                let expr: ExprRef = $expr;
                assert_eq!(expr.emit_fullform(), $fullform);
            }
        )*
        }
    }

    emit_tests! {
        symbol: Expr::symbol("x"), "x"
        number: Expr::number(7.0), "7"
        fractional_number: Expr::number(1.5), "1.5"
        string_raw: Expr::string("hi"), "hi"
        true_form: Expr::boolean(true), "True"
        false_form: Expr::boolean(false), "False"
        null: crate::grammar::heads::null(), "Null"
        flat_call: Expr::call("Plus", vec![Expr::number(2.0), Expr::number(3.0)]), "Plus[2, 3]"
        nested_call:
            Expr::call(
                "Plus",
                vec![
                    Expr::number(1.0),
                    Expr::call("Times", vec![Expr::number(2.0), Expr::number(3.0)]),
                ],
            ),
            "Plus[1, Times[2, 3]]"
        empty_args: Expr::call("List", vec![]), "List[]"
        compound_head:
            Expr::compound(
                Expr::call("Function", vec![Expr::symbol("x"), Expr::symbol("x")]),
                vec![Expr::number(1.0)],
            ),
            "Function[x, x][1]"
    }
}
