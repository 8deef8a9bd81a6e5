//! Structural pattern matching over expression sequences.
//!
//! Matching is sequence-against-sequence rather than term-against-term: variadic pattern forms
//! (`BlankSequence`, `BlankNullSequence`) consume a variable number of subject elements, so a
//! single pattern element may cover zero, one, or many subjects. Variadic forms are greedy,
//! trying the longest admissible prefix first and backtracking to shorter ones when the rest of
//! the pattern cannot be satisfied.
//!
//! A single expression matches a single pattern via `match_seq(&[subject], &[pattern])`.

use crate::grammar::{raw_eq, Expr, ExprRef};

use std::collections::HashMap;
use std::slice;
use std::sync::Arc;

/// Named captures of a successful match: pattern name → the subject sequence it consumed.
///
/// Bindings of the same name must capture structurally equal sequences; a merge that would
/// rebind a name to a different sequence fails, and with it the whole match.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    map: HashMap<String, Vec<ExprRef>>,
}

impl Bindings {
    /// The sequence captured under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&[ExprRef]> {
        self.map.get(name).map(|seq| seq.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over all (name, captured sequence) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ExprRef])> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Binds `name` to `seq`. Returns false if `name` is already bound to a different sequence.
    fn bind(&mut self, name: &str, seq: Vec<ExprRef>) -> bool {
        match self.map.get(name) {
            Some(existing) => seq_eq(existing, &seq),
            None => {
                self.map.insert(name.into(), seq);
                true
            }
        }
    }

    /// Merges `other` into `self`, conflict-checked per name.
    fn merge(mut self, other: Bindings) -> Option<Bindings> {
        for (name, seq) in other.map {
            if !self.bind(&name, seq) {
                return None;
            }
        }
        Some(self)
    }

    /// Substitutes the captured bindings into `template`, copy-on-write.
    ///
    /// A bound symbol is replaced by its [sequence value](Bindings::sequence_value); unchanged
    /// subtrees are shared with the template, never copied.
    pub fn apply(&self, template: &ExprRef) -> ExprRef {
        if self.map.is_empty() {
            return template.clone();
        }
        self.apply_inner(template)
    }

    fn apply_inner(&self, expr: &ExprRef) -> ExprRef {
        match expr.as_ref() {
            Expr::Symbol(name) => match self.map.get(name) {
                Some(seq) => Self::sequence_value(seq),
                None => expr.clone(),
            },
            Expr::Compound(c) => {
                let head = self.apply_inner(&c.head);
                let children: Vec<ExprRef> = c.children.iter().map(|ch| self.apply_inner(ch)).collect();
                let unchanged = Arc::ptr_eq(&head, &c.head)
                    && children
                        .iter()
                        .zip(c.children.iter())
                        .all(|(a, b)| Arc::ptr_eq(a, b));
                if unchanged {
                    expr.clone()
                } else {
                    Expr::compound(head, children)
                }
            }
            _ => expr.clone(),
        }
    }

    /// A captured sequence as a single expression: the element itself for singleton captures,
    /// `Sequence[...]` otherwise. `Sequence` nodes splice into surrounding argument lists during
    /// evaluation.
    pub fn sequence_value(seq: &[ExprRef]) -> ExprRef {
        match seq {
            [one] => one.clone(),
            _ => Expr::call("Sequence", seq.to_vec()),
        }
    }
}

fn seq_eq(a: &[ExprRef], b: &[ExprRef]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| raw_eq(x, y))
}

/// Matches a sequence of subjects against a sequence of patterns.
pub fn match_seq(subjects: &[ExprRef], patterns: &[ExprRef]) -> Option<Bindings> {
    match patterns.split_first() {
        None => {
            if subjects.is_empty() {
                Some(Bindings::default())
            } else {
                None
            }
        }
        Some((pat, rest)) => match_first(pat, subjects, rest),
    }
}

/// How the matcher treats the leading pattern element.
enum PatForm<'a> {
    /// `Pattern[name, sub]`: match `sub`, bind `name` to what it consumed.
    Named(&'a str, &'a ExprRef),
    /// `Blank[]` / `Blank[h]`: exactly one element, optionally head-restricted.
    Single(Option<&'a ExprRef>),
    /// `BlankSequence[]` / `BlankSequence[h]`: one or more elements.
    Sequence1(Option<&'a ExprRef>),
    /// `BlankNullSequence[]` / `BlankNullSequence[h]`: zero or more elements.
    Sequence0(Option<&'a ExprRef>),
    /// `Verbatim[x]`: structural equality with `x`, bypassing any meaning `x` carries.
    Verbatim(&'a ExprRef),
    /// `Alternatives[p1, ..., pn]`: the first alternative admitting a full match wins.
    Alternatives(&'a [ExprRef]),
    /// Anything else: structural comparison of one subject element.
    Structural,
}

fn classify(pat: &ExprRef) -> PatForm<'_> {
    if let Some(args) = pat.compound_named("Pattern") {
        if let [name, sub] = args {
            if let Some(name) = name.symbol_name() {
                return PatForm::Named(name, sub);
            }
        }
    }
    if let Some(args) = pat.compound_named("Blank") {
        match args {
            [] => return PatForm::Single(None),
            [h] => return PatForm::Single(Some(h)),
            _ => {}
        }
    }
    if let Some(args) = pat.compound_named("BlankSequence") {
        match args {
            [] => return PatForm::Sequence1(None),
            [h] => return PatForm::Sequence1(Some(h)),
            _ => {}
        }
    }
    if let Some(args) = pat.compound_named("BlankNullSequence") {
        match args {
            [] => return PatForm::Sequence0(None),
            [h] => return PatForm::Sequence0(Some(h)),
            _ => {}
        }
    }
    if let Some(args) = pat.compound_named("Verbatim") {
        if let [inner] = args {
            return PatForm::Verbatim(inner);
        }
    }
    if let Some(args) = pat.compound_named("Alternatives") {
        return PatForm::Alternatives(args);
    }
    PatForm::Structural
}

fn match_first(pat: &ExprRef, subjects: &[ExprRef], rest: &[ExprRef]) -> Option<Bindings> {
    match classify(pat) {
        PatForm::Named(name, sub) => {
            // Longest consumable prefix first, like the variadic forms the sub-pattern may be.
            for k in (0..=subjects.len()).rev() {
                let sub_b = match match_seq(&subjects[..k], slice::from_ref(sub)) {
                    Some(b) => b,
                    None => continue,
                };
                let rest_b = match match_seq(&subjects[k..], rest) {
                    Some(b) => b,
                    None => continue,
                };
                let mut all = match sub_b.merge(rest_b) {
                    Some(b) => b,
                    None => continue,
                };
                if all.bind(name, subjects[..k].to_vec()) {
                    return Some(all);
                }
            }
            None
        }
        PatForm::Single(head) => {
            let (first, tail) = subjects.split_first()?;
            let head_b = match head {
                Some(h) => match_head(first, h)?,
                None => Bindings::default(),
            };
            let rest_b = match_seq(tail, rest)?;
            head_b.merge(rest_b)
        }
        PatForm::Sequence1(head) => match_variadic(1, head, subjects, rest),
        PatForm::Sequence0(head) => match_variadic(0, head, subjects, rest),
        PatForm::Verbatim(inner) => {
            let (first, tail) = subjects.split_first()?;
            if !raw_eq(first, inner) {
                return None;
            }
            match_seq(tail, rest)
        }
        PatForm::Alternatives(alts) => {
            for alt in alts {
                if let Some(b) = match_first(alt, subjects, rest) {
                    return Some(b);
                }
            }
            None
        }
        PatForm::Structural => {
            let (first, tail) = subjects.split_first()?;
            let first_b = match_one(first, pat)?;
            let rest_b = match_seq(tail, rest)?;
            first_b.merge(rest_b)
        }
    }
}

/// Matches a variadic pattern consuming at least `min` elements, greedily longest-first.
fn match_variadic(
    min: usize,
    head: Option<&ExprRef>,
    subjects: &[ExprRef],
    rest: &[ExprRef],
) -> Option<Bindings> {
    'prefix: for k in (min..=subjects.len()).rev() {
        let mut b = Bindings::default();
        if let Some(h) = head {
            for elem in &subjects[..k] {
                let hb = match match_head(elem, h) {
                    Some(hb) => hb,
                    None => continue 'prefix,
                };
                b = match b.merge(hb) {
                    Some(b) => b,
                    None => continue 'prefix,
                };
            }
        }
        let rest_b = match match_seq(&subjects[k..], rest) {
            Some(rb) => rb,
            None => continue,
        };
        if let Some(all) = b.merge(rest_b) {
            return Some(all);
        }
    }
    None
}

fn match_head(elem: &ExprRef, head_pat: &ExprRef) -> Option<Bindings> {
    let head = [elem.head()];
    match_seq(&head, slice::from_ref(head_pat))
}

/// Matches one subject element against one structural (non-meta) pattern.
fn match_one(subject: &ExprRef, pat: &ExprRef) -> Option<Bindings> {
    match (subject.as_ref(), pat.as_ref()) {
        (Expr::Compound(sc), Expr::Compound(pc)) => {
            let sh = [sc.head.clone()];
            let ph = [pc.head.clone()];
            let head_b = match_seq(&sh, &ph)?;
            let children_b = match_seq(&sc.children, &pc.children)?;
            head_b.merge(children_b)
        }
        _ => {
            if raw_eq(subject, pat) {
                Some(Bindings::default())
            } else {
                None
            }
        }
    }
}
