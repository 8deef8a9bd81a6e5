//! The grammar specification consumed by the predict-table builder and the LL(1) parser.
//!
//! Symbols and production names are closed enums, so a production with no translator handler or a
//! nonterminal with no rules is a compile error rather than a runtime lookup failure.

pub mod language;
pub mod predict;

pub use language::{GRAMMAR, PREDICT};
pub use predict::{FirstSet, PredictTable};

use crate::scanner::types::TokenClass;

use core::fmt;
use std::collections::HashMap;

/// A nonterminal symbol of the tungsten grammar.
///
/// The `*Tail` nonterminals are the right-recursive halves of left-associative operator chains;
/// `Unary` sits between multiplication and exponentiation so `-2^2` parses as `-(2^2)` and
/// `2^-3` keeps the signed exponent.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash, Debug)]
pub enum Nonterminal {
    Stmt,
    Expr,
    AssignTail,
    Disj,
    DisjTail,
    Conj,
    ConjTail,
    Cmp,
    CmpTail,
    Sum,
    SumTail,
    Term,
    TermTail,
    Unary,
    Power,
    PowerTail,
    Apply,
    ApplyTail,
    Primary,
    PatternRest,
    BlankHead,
    Args,
    ArgsTail,
}

impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The name of a production, unique across the grammar.
///
/// Production names key both predict-set lookup and translator dispatch.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash, Debug)]
pub enum ProdName {
    StmtExpr,
    ExprAssign,
    AssignFixed,
    AssignDelayed,
    AssignEmpty,
    DisjChain,
    DisjOr,
    DisjEmpty,
    ConjChain,
    ConjAnd,
    ConjEmpty,
    CmpChain,
    CmpEq,
    CmpSame,
    CmpNeq,
    CmpLt,
    CmpLe,
    CmpGt,
    CmpGe,
    CmpEmpty,
    SumChain,
    SumPlus,
    SumMinus,
    SumEmpty,
    TermChain,
    TermTimes,
    TermDiv,
    TermMod,
    TermEmpty,
    UnaryMinus,
    UnaryPlus,
    UnaryNot,
    UnaryPower,
    PowerChain,
    PowerExp,
    PowerEmpty,
    ApplyChain,
    ApplyCall,
    ApplyEmpty,
    PrimaryNumber,
    PrimaryString,
    PrimaryIdent,
    PrimaryBlank,
    PrimaryBlankSeq,
    PrimaryBlankNull,
    PrimaryParen,
    PrimaryList,
    PatternBlank,
    PatternBlankSeq,
    PatternBlankNull,
    PatternEmpty,
    BlankHeadIdent,
    BlankHeadEmpty,
    ArgsList,
    ArgsEmpty,
    ArgsMore,
    ArgsTailEmpty,
}

/// A grammar symbol: a terminal token class or a nonterminal.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
pub enum GrammarSym {
    Terminal(TokenClass),
    Nonterminal(Nonterminal),
}

/// A production rule `lhs -> rhs`. An ε-production has an empty rhs.
#[derive(Clone, Debug)]
pub struct Production {
    pub name: ProdName,
    pub lhs: Nonterminal,
    pub rhs: Vec<GrammarSym>,
}

/// The full rule set of a grammar, with designated start and end symbols.
///
/// Immutable once constructed; shared by reference across every session.
pub struct GrammarSpec {
    productions: Vec<Production>,
    by_lhs: HashMap<Nonterminal, Vec<usize>>,
    by_name: HashMap<ProdName, usize>,
    start: Nonterminal,
    end: TokenClass,
}

impl GrammarSpec {
    pub fn new(productions: Vec<Production>, start: Nonterminal, end: TokenClass) -> GrammarSpec {
        let mut by_lhs: HashMap<Nonterminal, Vec<usize>> = HashMap::new();
        let mut by_name = HashMap::new();
        for (i, prod) in productions.iter().enumerate() {
            by_lhs.entry(prod.lhs).or_insert_with(Vec::new).push(i);
            by_name.insert(prod.name, i);
        }
        GrammarSpec {
            productions,
            by_lhs,
            by_name,
            start,
            end,
        }
    }

    pub fn start(&self) -> Nonterminal {
        self.start
    }

    pub fn end(&self) -> TokenClass {
        self.end
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// The productions of `nt`, in declaration order.
    pub fn productions_of(&self, nt: Nonterminal) -> impl Iterator<Item = &Production> {
        self.by_lhs
            .get(&nt)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.productions[i])
    }

    /// The production named `name`.
    pub fn production(&self, name: ProdName) -> &Production {
        // Every ProdName is declared exactly once in the language table.
        &self.productions[self.by_name[&name]]
    }
}
