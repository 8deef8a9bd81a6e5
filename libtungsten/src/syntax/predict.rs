//! FIRST/FOLLOW computation and the predict table driving the LL(1) parser.
//!
//! FIRST sets carry an explicit nullability marker; FOLLOW is a fixed-point iteration over all
//! productions. The predict set of a production is `FIRST(rhs)` plus `FOLLOW(lhs)` when the rhs
//! is nullable. Predict sets of competing productions are not checked for disjointness: the
//! first-declared production wins, which is the grammar's ambiguity-resolution policy.

use super::{GrammarSpec, GrammarSym, Nonterminal, ProdName};
use crate::scanner::types::TokenClass;

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The set of token classes that can begin a symbol sequence, and whether the sequence can
/// derive the empty sequence.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct FirstSet {
    pub tokens: BTreeSet<TokenClass>,
    pub nullable: bool,
}

impl FirstSet {
    /// Unions `other` into `self`, returning whether anything was added.
    fn union(&mut self, other: &FirstSet) -> bool {
        let before = (self.tokens.len(), self.nullable);
        self.tokens.extend(other.tokens.iter().cloned());
        self.nullable = self.nullable || other.nullable;
        before != (self.tokens.len(), self.nullable)
    }
}

/// The derived, read-only prediction data for a [GrammarSpec].
pub struct PredictTable {
    first: HashMap<Nonterminal, FirstSet>,
    follow: HashMap<Nonterminal, BTreeSet<TokenClass>>,
    predict: BTreeMap<ProdName, BTreeSet<TokenClass>>,
    expanding: HashMap<(Nonterminal, TokenClass), ProdName>,
}

impl PredictTable {
    pub fn build(grammar: &GrammarSpec) -> PredictTable {
        let first = first_sets(grammar);
        let follow = follow_sets(grammar, &first);

        let mut predict = BTreeMap::new();
        let mut expanding = HashMap::new();
        for prod in grammar.productions() {
            let rhs_first = first_of_seq(&prod.rhs, &first);
            let mut set = rhs_first.tokens;
            if rhs_first.nullable {
                set.extend(follow[&prod.lhs].iter().cloned());
            }
            for &tok in &set {
                // First-declared production wins on overlapping predict sets.
                expanding.entry((prod.lhs, tok)).or_insert(prod.name);
            }
            predict.insert(prod.name, set);
        }

        PredictTable {
            first,
            follow,
            predict,
            expanding,
        }
    }

    /// The FIRST set of a nonterminal.
    pub fn first(&self, nt: Nonterminal) -> &FirstSet {
        &self.first[&nt]
    }

    /// The FOLLOW set of a nonterminal.
    pub fn follow(&self, nt: Nonterminal) -> &BTreeSet<TokenClass> {
        &self.follow[&nt]
    }

    /// The predict set of a production.
    pub fn predict(&self, name: ProdName) -> &BTreeSet<TokenClass> {
        &self.predict[&name]
    }

    /// The production to expand `nt` with on lookahead `tok`, if any.
    pub fn expanding_production(&self, nt: Nonterminal, tok: TokenClass) -> Option<ProdName> {
        self.expanding.get(&(nt, tok)).copied()
    }

    /// The token classes that can legally begin an expansion of `nt`. Used for diagnostics.
    pub fn expected_tokens(&self, nt: Nonterminal) -> Vec<TokenClass> {
        let mut toks: Vec<_> = self
            .expanding
            .keys()
            .filter(|(n, _)| *n == nt)
            .map(|&(_, t)| t)
            .collect();
        toks.sort();
        toks
    }
}

/// The FIRST set of a symbol sequence, given per-nonterminal FIRST sets.
fn first_of_seq(seq: &[GrammarSym], first: &HashMap<Nonterminal, FirstSet>) -> FirstSet {
    let mut out = FirstSet::default();
    for sym in seq {
        match sym {
            GrammarSym::Terminal(t) => {
                out.tokens.insert(*t);
                return out;
            }
            GrammarSym::Nonterminal(nt) => {
                let fs = &first[nt];
                out.tokens.extend(fs.tokens.iter().cloned());
                if !fs.nullable {
                    return out;
                }
            }
        }
    }
    // Every symbol (or none at all) was nullable.
    out.nullable = true;
    out
}

/// Computes FIRST sets for every nonterminal by fixed-point iteration.
fn first_sets(grammar: &GrammarSpec) -> HashMap<Nonterminal, FirstSet> {
    let mut first: HashMap<Nonterminal, FirstSet> = HashMap::new();
    for prod in grammar.productions() {
        first.entry(prod.lhs).or_insert_with(FirstSet::default);
    }

    loop {
        let mut changed = false;
        for prod in grammar.productions() {
            let rhs_first = first_of_seq(&prod.rhs, &first);
            changed |= first.get_mut(&prod.lhs).unwrap().union(&rhs_first);
        }
        if !changed {
            break;
        }
    }
    first
}

/// Computes FOLLOW sets by fixed-point iteration.
///
/// `FOLLOW(start)` is seeded with the end symbol. Every occurrence of a nonterminal `B` in a rhs
/// with suffix `β` contributes `FIRST(β)` to `FOLLOW(B)`, and `FOLLOW(lhs)` as well when `β` is
/// empty or nullable.
fn follow_sets(
    grammar: &GrammarSpec,
    first: &HashMap<Nonterminal, FirstSet>,
) -> HashMap<Nonterminal, BTreeSet<TokenClass>> {
    let mut follow: HashMap<Nonterminal, BTreeSet<TokenClass>> = HashMap::new();
    for prod in grammar.productions() {
        follow.entry(prod.lhs).or_insert_with(BTreeSet::new);
    }
    follow.get_mut(&grammar.start()).unwrap().insert(grammar.end());

    loop {
        let mut changed = false;
        for prod in grammar.productions() {
            for (i, sym) in prod.rhs.iter().enumerate() {
                let nt = match sym {
                    GrammarSym::Nonterminal(nt) => *nt,
                    GrammarSym::Terminal(_) => continue,
                };
                let suffix_first = first_of_seq(&prod.rhs[i + 1..], first);

                let mut additions: BTreeSet<TokenClass> = suffix_first.tokens;
                if suffix_first.nullable {
                    additions.extend(follow[&prod.lhs].iter().cloned());
                }

                let target = follow.get_mut(&nt).unwrap();
                let before = target.len();
                target.extend(additions);
                changed |= target.len() != before;
            }
        }
        if !changed {
            break;
        }
    }
    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::types::TokenClass as Tk;
    use GrammarSym::{Nonterminal as N, Terminal as T};
    use Nonterminal::*;
    use ProdName::*;

    /// The classic arithmetic grammar
    ///   E  -> T E'
    ///   E' -> '+' T E' | ε
    ///   T  -> number | identifier | '(' E ')'
    /// expressed with the language's symbol enums.
    fn mini_grammar() -> GrammarSpec {
        GrammarSpec::new(
            vec![
                Production {
                    name: SumChain,
                    lhs: Sum,
                    rhs: vec![N(Term), N(SumTail)],
                },
                Production {
                    name: SumPlus,
                    lhs: SumTail,
                    rhs: vec![T(Tk::Plus), N(Term), N(SumTail)],
                },
                Production {
                    name: SumEmpty,
                    lhs: SumTail,
                    rhs: vec![],
                },
                Production {
                    name: PrimaryNumber,
                    lhs: Term,
                    rhs: vec![T(Tk::Number)],
                },
                Production {
                    name: PrimaryIdent,
                    lhs: Term,
                    rhs: vec![T(Tk::Ident)],
                },
                Production {
                    name: PrimaryParen,
                    lhs: Term,
                    rhs: vec![T(Tk::OpenParen), N(Sum), T(Tk::CloseParen)],
                },
            ],
            Sum,
            Tk::Eof,
        )
    }

    fn set(toks: &[Tk]) -> BTreeSet<Tk> {
        toks.iter().cloned().collect()
    }

    #[test]
    fn first_of_term_is_its_leading_terminals() {
        let table = PredictTable::build(&mini_grammar());
        let first = table.first(Term);
        assert_eq!(first.tokens, set(&[Tk::Number, Tk::Ident, Tk::OpenParen]));
        assert!(!first.nullable);
    }

    #[test]
    fn tail_is_nullable_and_chain_is_not() {
        let table = PredictTable::build(&mini_grammar());
        assert!(table.first(SumTail).nullable);
        assert!(!table.first(Sum).nullable);
    }

    #[test]
    fn follow_of_tail_equals_follow_of_owner_and_has_end() {
        let table = PredictTable::build(&mini_grammar());
        assert_eq!(table.follow(SumTail), table.follow(Sum));
        assert!(table.follow(SumTail).contains(&Tk::Eof));
        assert_eq!(table.follow(Sum), &set(&[Tk::Eof, Tk::CloseParen]));
    }

    #[test]
    fn predict_of_nullable_production_is_follow() {
        let table = PredictTable::build(&mini_grammar());
        assert_eq!(table.predict(SumEmpty), table.follow(SumTail));
        assert_eq!(table.predict(SumPlus), &set(&[Tk::Plus]));
    }

    #[test]
    fn expanding_production_dispatches_on_lookahead() {
        let table = PredictTable::build(&mini_grammar());
        assert_eq!(
            table.expanding_production(Term, Tk::Number),
            Some(PrimaryNumber)
        );
        assert_eq!(
            table.expanding_production(SumTail, Tk::CloseParen),
            Some(SumEmpty)
        );
        assert_eq!(table.expanding_production(Term, Tk::Plus), None);
    }

    mod language {
        use super::*;
        use crate::syntax::{GRAMMAR, PREDICT};

        #[test]
        fn every_tail_follow_matches_its_owner() {
            for (tail, owner) in [
                (DisjTail, Disj),
                (ConjTail, Conj),
                (CmpTail, Cmp),
                (SumTail, Sum),
                (TermTail, Term),
            ]
            .iter()
            {
                assert_eq!(PREDICT.follow(*tail), PREDICT.follow(*owner));
            }
        }

        #[test]
        fn statements_end_at_the_statement_boundary() {
            assert!(PREDICT.follow(Expr).contains(&Tk::EndOfStatement));
            assert!(PREDICT.follow(Sum).contains(&Tk::EndOfStatement));
        }

        #[test]
        fn primary_first_set() {
            let first = PREDICT.first(Primary);
            for tok in [
                Tk::Number,
                Tk::Str,
                Tk::Ident,
                Tk::Under,
                Tk::DoubleUnder,
                Tk::TripleUnder,
                Tk::OpenParen,
                Tk::OpenBrace,
            ]
            .iter()
            {
                assert!(first.tokens.contains(tok), "missing {:?}", tok);
            }
            assert!(!first.nullable);
        }

        #[test]
        fn competing_predict_sets_are_disjoint() {
            // The language grammar is LL(1): for every nonterminal, the predict sets of its
            // productions are pairwise disjoint.
            use std::collections::HashMap;
            let mut seen: HashMap<(Nonterminal, Tk), ProdName> = HashMap::new();
            for prod in GRAMMAR.productions() {
                for &tok in PREDICT.predict(prod.name) {
                    if let Some(other) = seen.insert((prod.lhs, tok), prod.name) {
                        panic!(
                            "predict conflict on {:?} between {:?} and {:?}",
                            (prod.lhs, tok),
                            other,
                            prod.name
                        );
                    }
                }
            }
        }
    }
}
