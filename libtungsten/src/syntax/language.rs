//! The tungsten language grammar: one production table, built once per process.
//!
//! Precedence is encoded structurally, loosest first: assignment, `||`, `&&`, comparisons,
//! additive, multiplicative, unary sign/negation, `^` (right-associative), function application,
//! primaries. Operator chains use right-recursive `*Tail` productions; the translator reduces
//! them left-associatively.

use super::{GrammarSpec, GrammarSym, Nonterminal, ProdName, Production};
use crate::scanner::types::TokenClass;
use crate::syntax::predict::PredictTable;

use lazy_static::lazy_static;

lazy_static! {
    /// The language grammar. Read-only after initialization; shared by all sessions.
    pub static ref GRAMMAR: GrammarSpec = language_grammar();
    /// The predict table derived from [GRAMMAR].
    pub static ref PREDICT: PredictTable = PredictTable::build(&GRAMMAR);
}

fn language_grammar() -> GrammarSpec {
    use GrammarSym::{Nonterminal as N, Terminal as T};
    use Nonterminal::*;
    use ProdName::*;
    use TokenClass as Tk;

    macro_rules! productions {
        ($($name:ident: $lhs:ident -> [$($sym:expr),*];)*) => {
            vec![$(Production {
                name: $name,
                lhs: $lhs,
                rhs: vec![$($sym),*],
            }),*]
        };
    }

    let productions = productions! {
        StmtExpr:         Stmt -> [N(Expr), T(Tk::EndOfStatement)];

        ExprAssign:       Expr -> [N(Disj), N(AssignTail)];
        AssignFixed:      AssignTail -> [T(Tk::Equal), N(Expr)];
        AssignDelayed:    AssignTail -> [T(Tk::ColonEqual), N(Expr)];
        AssignEmpty:      AssignTail -> [];

        DisjChain:        Disj -> [N(Conj), N(DisjTail)];
        DisjOr:           DisjTail -> [T(Tk::OrOr), N(Conj), N(DisjTail)];
        DisjEmpty:        DisjTail -> [];

        ConjChain:        Conj -> [N(Cmp), N(ConjTail)];
        ConjAnd:          ConjTail -> [T(Tk::AndAnd), N(Cmp), N(ConjTail)];
        ConjEmpty:        ConjTail -> [];

        CmpChain:         Cmp -> [N(Sum), N(CmpTail)];
        CmpEq:            CmpTail -> [T(Tk::DoubleEqual), N(Sum), N(CmpTail)];
        CmpSame:          CmpTail -> [T(Tk::TripleEqual), N(Sum), N(CmpTail)];
        CmpNeq:           CmpTail -> [T(Tk::BangEqual), N(Sum), N(CmpTail)];
        CmpLt:            CmpTail -> [T(Tk::Less), N(Sum), N(CmpTail)];
        CmpLe:            CmpTail -> [T(Tk::LessEqual), N(Sum), N(CmpTail)];
        CmpGt:            CmpTail -> [T(Tk::Greater), N(Sum), N(CmpTail)];
        CmpGe:            CmpTail -> [T(Tk::GreaterEqual), N(Sum), N(CmpTail)];
        CmpEmpty:         CmpTail -> [];

        SumChain:         Sum -> [N(Term), N(SumTail)];
        SumPlus:          SumTail -> [T(Tk::Plus), N(Term), N(SumTail)];
        SumMinus:         SumTail -> [T(Tk::Minus), N(Term), N(SumTail)];
        SumEmpty:         SumTail -> [];

        TermChain:        Term -> [N(Unary), N(TermTail)];
        TermTimes:        TermTail -> [T(Tk::Times), N(Unary), N(TermTail)];
        TermDiv:          TermTail -> [T(Tk::Div), N(Unary), N(TermTail)];
        TermMod:          TermTail -> [T(Tk::Mod), N(Unary), N(TermTail)];
        TermEmpty:        TermTail -> [];

        UnaryMinus:       Unary -> [T(Tk::Minus), N(Unary)];
        UnaryPlus:        Unary -> [T(Tk::Plus), N(Unary)];
        UnaryNot:         Unary -> [T(Tk::Bang), N(Unary)];
        UnaryPower:       Unary -> [N(Power)];

        PowerChain:       Power -> [N(Apply), N(PowerTail)];
        PowerExp:         PowerTail -> [T(Tk::Caret), N(Unary)];
        PowerEmpty:       PowerTail -> [];

        ApplyChain:       Apply -> [N(Primary), N(ApplyTail)];
        ApplyCall:        ApplyTail -> [T(Tk::OpenBracket), N(Args), T(Tk::CloseBracket), N(ApplyTail)];
        ApplyEmpty:       ApplyTail -> [];

        PrimaryNumber:    Primary -> [T(Tk::Number)];
        PrimaryString:    Primary -> [T(Tk::Str)];
        PrimaryIdent:     Primary -> [T(Tk::Ident), N(PatternRest)];
        PrimaryBlank:     Primary -> [T(Tk::Under), N(BlankHead)];
        PrimaryBlankSeq:  Primary -> [T(Tk::DoubleUnder), N(BlankHead)];
        PrimaryBlankNull: Primary -> [T(Tk::TripleUnder), N(BlankHead)];
        PrimaryParen:     Primary -> [T(Tk::OpenParen), N(Expr), T(Tk::CloseParen)];
        PrimaryList:      Primary -> [T(Tk::OpenBrace), N(Args), T(Tk::CloseBrace)];

        PatternBlank:     PatternRest -> [T(Tk::Under), N(BlankHead)];
        PatternBlankSeq:  PatternRest -> [T(Tk::DoubleUnder), N(BlankHead)];
        PatternBlankNull: PatternRest -> [T(Tk::TripleUnder), N(BlankHead)];
        PatternEmpty:     PatternRest -> [];

        BlankHeadIdent:   BlankHead -> [T(Tk::Ident)];
        BlankHeadEmpty:   BlankHead -> [];

        ArgsList:         Args -> [N(Expr), N(ArgsTail)];
        ArgsEmpty:        Args -> [];
        ArgsMore:         ArgsTail -> [T(Tk::Comma), N(Expr), N(ArgsTail)];
        ArgsTailEmpty:    ArgsTail -> [];
    };

    GrammarSpec::new(productions, Stmt, Tk::Eof)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_production_name_is_unique() {
        use std::collections::HashSet;
        let mut names = HashSet::new();
        for prod in GRAMMAR.productions() {
            assert!(names.insert(prod.name), "duplicate {:?}", prod.name);
        }
    }

    #[test]
    fn start_symbol_and_end_token() {
        assert_eq!(GRAMMAR.start(), Nonterminal::Stmt);
        assert_eq!(GRAMMAR.end(), TokenClass::Eof);
    }

    #[test]
    fn production_lookup_by_name() {
        let prod = GRAMMAR.production(ProdName::PowerExp);
        assert_eq!(prod.lhs, Nonterminal::PowerTail);
        assert_eq!(prod.rhs.len(), 2);
    }
}
