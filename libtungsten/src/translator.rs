//! The tree translator: a parse tree in, an expression tree out.
//!
//! Translation is table-driven over [ProdName] with an explicit value stack. Operator-chain
//! productions pop the accumulated left operand, translate the next operand, and push the
//! combined compound — reducing the grammar's right-recursive tails into left-associative
//! expression trees. Argument-list productions append into the open compound on the stack top.
//!
//! A parse-tree shape the table cannot handle is a grammar/translator mismatch: a programming
//! error surfaced as a typed [InternalError], never a process abort.

use crate::diagnostics::{Diagnostic, DiagnosticRegistry};
use crate::grammar::{Expr, ExprRef};
use crate::parser::{NodeId, ParseNode, ParseTree};
use crate::scanner::types::{Token, TokenType};
use crate::syntax::ProdName;

use core::fmt;

/// A grammar/translator consistency violation. Not a user error: if one of these surfaces, the
/// production table and the translator disagree about a tree shape.
#[derive(Clone, Debug)]
pub struct InternalError {
    detail: String,
}

impl InternalError {
    fn new<S: Into<String>>(detail: S) -> InternalError {
        InternalError {
            detail: detail.into(),
        }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::span_err(
            (0, 0),
            "Internal translation error",
            TranslatorErrors::CODE,
            self.detail.clone(),
        )
        .with_note("this is a bug in tungsten, not in the input")
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal translation error: {}", self.detail)
    }
}

/// Diagnostic errors produced by the translator.
pub struct TranslatorErrors;

impl TranslatorErrors {
    const CODE: &'static str = "T0001";
}

impl DiagnosticRegistry for TranslatorErrors {
    fn codes_with_explanations() -> Vec<(&'static str, &'static str)> {
        vec![(
            Self::CODE,
            "An internal consistency violation between the grammar's production table and the \
             tree translator, for example a production with no translation handler or a terminal \
             node translated as a nonterminal.\n\
             This is always a tungsten bug; the offending statement is abandoned but the process \
             and other sessions continue.\n",
        )]
    }
}

/// Translates a completed parse tree into an expression.
pub fn translate(tree: &ParseTree) -> Result<ExprRef, InternalError> {
    let mut translator = Translator {
        tree,
        stack: Vec::new(),
    };
    translator.eval_node(tree.root())?;
    let result = translator
        .stack
        .pop()
        .ok_or_else(|| InternalError::new("translation produced no value"))?;
    if !translator.stack.is_empty() {
        return Err(InternalError::new("translation left operands on the stack"));
    }
    Ok(result)
}

struct Translator<'t> {
    tree: &'t ParseTree,
    stack: Vec<ExprRef>,
}

impl<'t> Translator<'t> {
    fn eval_node(&mut self, id: NodeId) -> Result<(), InternalError> {
        let prod = match self.tree.node(id) {
            ParseNode::Terminal { class, .. } => {
                return Err(InternalError::new(format!(
                    "terminal node ({}) evaluated as a nonterminal",
                    class
                )))
            }
            ParseNode::NonTerminal { prod: None, nt, .. } => {
                return Err(InternalError::new(format!("unexpanded nonterminal {}", nt)))
            }
            ParseNode::NonTerminal {
                prod: Some(prod), ..
            } => *prod,
        };

        use ProdName::*;
        match prod {
            // A statement is its expression; the trailing boundary token carries no value.
            StmtExpr => self.eval_child(id, 0),

            // Chain heads evaluate their operand, then let the tail reduce onto it.
            ExprAssign | DisjChain | ConjChain | CmpChain | SumChain | TermChain | PowerChain
            | ApplyChain => {
                self.eval_child(id, 0)?;
                self.eval_child(id, 1)
            }

            AssignEmpty | DisjEmpty | ConjEmpty | CmpEmpty | SumEmpty | TermEmpty | PowerEmpty
            | ApplyEmpty | PatternEmpty => Ok(()),

            AssignFixed => self.reduce_binary(id, "Assign"),
            AssignDelayed => self.reduce_binary(id, "AssignDelayed"),

            DisjOr => self.reduce_chain(id, "Or"),
            ConjAnd => self.reduce_chain(id, "And"),
            CmpEq => self.reduce_chain(id, "EqualQ"),
            CmpSame => self.reduce_chain(id, "SameQ"),
            CmpNeq => self.reduce_chain(id, "Unequal"),
            CmpLt => self.reduce_chain(id, "Less"),
            CmpLe => self.reduce_chain(id, "LessEqual"),
            CmpGt => self.reduce_chain(id, "Greater"),
            CmpGe => self.reduce_chain(id, "GreaterEqual"),
            SumPlus => self.reduce_chain(id, "Plus"),
            SumMinus => self.reduce_chain(id, "Subtract"),
            TermTimes => self.reduce_chain(id, "Times"),
            TermDiv => self.reduce_chain(id, "Divide"),
            TermMod => self.reduce_chain(id, "Mod"),

            UnaryMinus => self.reduce_unary(id, "Minus"),
            UnaryNot => self.reduce_unary(id, "Not"),
            // Sign-positive is the identity.
            UnaryPlus => self.eval_child(id, 1),
            UnaryPower => self.eval_child(id, 0),

            // Exponentiation is right-associative: the base is already on the stack, the
            // exponent subtree recurses through Unary.
            PowerExp => {
                let base = self.pop()?;
                self.eval_child(id, 1)?;
                let exp = self.pop()?;
                self.stack.push(Expr::call("Power", vec![base, exp]));
                Ok(())
            }

            // `head[args...]`: open a compound with the popped head, let Args append into it,
            // then translate any chained call.
            ApplyCall => {
                let head = self.pop()?;
                self.stack.push(Expr::compound(head, vec![]));
                self.eval_child(id, 1)?;
                self.eval_child(id, 3)
            }

            PrimaryNumber => {
                let f = match &self.token(id, 0)?.ty {
                    TokenType::Number(f) => *f,
                    other => {
                        return Err(InternalError::new(format!(
                            "number production holds {}",
                            other
                        )))
                    }
                };
                self.stack.push(Expr::number(f));
                Ok(())
            }
            PrimaryString => {
                let s = match &self.token(id, 0)?.ty {
                    TokenType::Str(s) => s.clone(),
                    other => {
                        return Err(InternalError::new(format!(
                            "string production holds {}",
                            other
                        )))
                    }
                };
                self.stack.push(Expr::string(s));
                Ok(())
            }
            PrimaryIdent => {
                let name = self.ident(id, 0)?;
                let expr = match name.as_str() {
                    "True" => Expr::boolean(true),
                    "False" => Expr::boolean(false),
                    _ => Expr::symbol(name),
                };
                self.stack.push(expr);
                self.eval_child(id, 1)
            }

            PrimaryBlank => self.push_blank(id, "Blank"),
            PrimaryBlankSeq => self.push_blank(id, "BlankSequence"),
            PrimaryBlankNull => self.push_blank(id, "BlankNullSequence"),

            // `name_head` wraps the already-pushed name: Pattern[name, Blank[head]].
            PatternBlank => self.wrap_pattern(id, "Blank"),
            PatternBlankSeq => self.wrap_pattern(id, "BlankSequence"),
            PatternBlankNull => self.wrap_pattern(id, "BlankNullSequence"),

            PrimaryParen => self.eval_child(id, 1),
            PrimaryList => {
                self.stack.push(Expr::call("List", vec![]));
                self.eval_child(id, 1)
            }

            ArgsList => self.append_arg(id, 0, 1),
            ArgsMore => self.append_arg(id, 1, 2),
            ArgsEmpty | ArgsTailEmpty => Ok(()),

            // Blank heads are read in place by `blank`, never translated on their own.
            BlankHeadIdent | BlankHeadEmpty => {
                Err(InternalError::new("blank head translated as a value"))
            }
        }
    }

    fn eval_child(&mut self, id: NodeId, i: usize) -> Result<(), InternalError> {
        let child = self.child(id, i)?;
        self.eval_node(child)
    }

    fn child(&self, id: NodeId, i: usize) -> Result<NodeId, InternalError> {
        self.tree
            .children(id)
            .get(i)
            .copied()
            .ok_or_else(|| InternalError::new(format!("missing child {} of node {}", i, id)))
    }

    fn token(&self, id: NodeId, i: usize) -> Result<&Token, InternalError> {
        let child = self.child(id, i)?;
        self.tree
            .token(child)
            .ok_or_else(|| InternalError::new("terminal node without an attached token"))
    }

    fn ident(&self, id: NodeId, i: usize) -> Result<String, InternalError> {
        match &self.token(id, i)?.ty {
            TokenType::Ident(name) => Ok(name.clone()),
            other => Err(InternalError::new(format!(
                "identifier production holds {}",
                other
            ))),
        }
    }

    fn pop(&mut self) -> Result<ExprRef, InternalError> {
        self.stack
            .pop()
            .ok_or_else(|| InternalError::new("value stack underflow"))
    }

    /// Reduces a chain-tail production `[op, operand, tail]`: `prev op operand`, then the tail.
    fn reduce_chain(&mut self, id: NodeId, head: &str) -> Result<(), InternalError> {
        let prev = self.pop()?;
        self.eval_child(id, 1)?;
        let current = self.pop()?;
        self.stack.push(Expr::call(head, vec![prev, current]));
        self.eval_child(id, 2)
    }

    /// Reduces an assignment tail `[op, rhs]` against the popped lhs.
    fn reduce_binary(&mut self, id: NodeId, head: &str) -> Result<(), InternalError> {
        let lhs = self.pop()?;
        self.eval_child(id, 1)?;
        let rhs = self.pop()?;
        self.stack.push(Expr::call(head, vec![lhs, rhs]));
        Ok(())
    }

    fn reduce_unary(&mut self, id: NodeId, head: &str) -> Result<(), InternalError> {
        self.eval_child(id, 1)?;
        let operand = self.pop()?;
        self.stack.push(Expr::call(head, vec![operand]));
        Ok(())
    }

    /// Translates an argument production: evaluate the expression child, append it to the open
    /// compound below it on the stack, continue with the tail.
    fn append_arg(
        &mut self,
        id: NodeId,
        expr_idx: usize,
        tail_idx: usize,
    ) -> Result<(), InternalError> {
        self.eval_child(id, expr_idx)?;
        let value = self.pop()?;
        let open = self.pop()?;
        let appended = Expr::appended(&open, value)
            .ok_or_else(|| InternalError::new("argument appended to a non-compound"))?;
        self.stack.push(appended);
        self.eval_child(id, tail_idx)
    }

    /// Builds `kind[]` or `kind[head]` from the blank-head child at index 1.
    fn blank(&mut self, id: NodeId, kind: &str) -> Result<ExprRef, InternalError> {
        let head_node = self.child(id, 1)?;
        match self.tree.prod(head_node) {
            Some(ProdName::BlankHeadIdent) => {
                let name = self.ident(head_node, 0)?;
                Ok(Expr::call(kind, vec![Expr::symbol(name)]))
            }
            Some(ProdName::BlankHeadEmpty) => Ok(Expr::call(kind, vec![])),
            _ => Err(InternalError::new("malformed blank head")),
        }
    }

    fn push_blank(&mut self, id: NodeId, kind: &str) -> Result<(), InternalError> {
        let blank = self.blank(id, kind)?;
        self.stack.push(blank);
        Ok(())
    }

    fn wrap_pattern(&mut self, id: NodeId, kind: &str) -> Result<(), InternalError> {
        let blank = self.blank(id, kind)?;
        let name = self.pop()?;
        self.stack
            .push(Expr::call("Pattern", vec![name, blank]));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Emit;
    use crate::parser::parse_statements;
    use crate::scanner::{scan, strip};

    fn translate_one(program: &str) -> ExprRef {
        let (trees, diagnostics) = parse_statements(strip(scan(program)));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(trees.len(), 1);
        translate(&trees[0]).unwrap()
    }

    macro_rules! translator_tests {
        ($($name:ident: $program:expr, $fullform:expr)*) => {
        $(
            #[test]
            fn $name() {
                assert_eq!(translate_one($program).emit_fullform(), $fullform);
            }
        )*
        }
    }

    translator_tests! {
        number: "2", "2"
        float: "2.5", "2.5"
        string: "\"hi\"", "hi"
        symbol: "x", "x"
        true_literal: "True", "True"
        false_literal: "False", "False"

        precedence: "1+2*3", "Plus[1, Times[2, 3]]"
        parens: "(1+2)*3", "Times[Plus[1, 2], 3]"
        left_assoc_subtract: "1-2-3", "Subtract[Subtract[1, 2], 3]"
        left_assoc_divide: "8/4/2", "Divide[Divide[8, 4], 2]"
        power_right_assoc: "2^3^2", "Power[2, Power[3, 2]]"
        signed_exponent: "2^-3", "Power[2, Minus[3]]"
        minus_binds_looser_than_power: "-2^2", "Minus[Power[2, 2]]"
        modulo: "8 % 3", "Mod[8, 3]"
        unary_minus: "-x", "Minus[x]"
        unary_plus_is_identity: "+x", "x"
        double_negation: "1 - -2", "Subtract[1, Minus[2]]"
        not: "!x", "Not[x]"

        comparison: "1 <= 2", "LessEqual[1, 2]"
        equality: "x == y", "EqualQ[x, y]"
        same: "x === y", "SameQ[x, y]"
        unequal: "x != y", "Unequal[x, y]"
        logic_precedence: "a || b && c", "Or[a, And[b, c]]"
        or_chain: "a || b || c", "Or[Or[a, b], c]"
        compare_binds_tighter_than_logic: "1 < 2 && x", "And[Less[1, 2], x]"

        call: "f[1, x]", "f[1, x]"
        call_no_args: "f[]", "f[]"
        chained_call: "f[1][2]", "f[1][2]"
        nested_call: "f[g[1], 2]", "f[g[1], 2]"
        list: "{1, 2}", "List[1, 2]"
        empty_list: "{}", "List[]"
        nested_list: "{1, {2, 3}}", "List[1, List[2, 3]]"

        assign: "x = 5", "Assign[x, 5]"
        assign_expr: "x = 1 + 2", "Assign[x, Plus[1, 2]]"
        assign_delayed: "f := x + 1", "AssignDelayed[f, Plus[x, 1]]"
        assign_nested: "x = y = 5", "Assign[x, Assign[y, 5]]"
        assign_pattern_lhs: "f[x_] = x", "Assign[f[Pattern[x, Blank[]]], x]"

        blank: "_", "Blank[]"
        blank_with_head: "_Number", "Blank[Number]"
        blank_sequence: "__", "BlankSequence[]"
        blank_null_sequence: "___", "BlankNullSequence[]"
        blank_null_with_head: "___List", "BlankNullSequence[List]"
        named_pattern: "x_", "Pattern[x, Blank[]]"
        named_pattern_with_head: "x_Number", "Pattern[x, Blank[Number]]"
        named_sequence: "xs__", "Pattern[xs, BlankSequence[]]"
        pattern_in_list: "{1, __, 3}", "List[1, BlankSequence[], 3]"
        match_q_form: "MatchQ[{1, 2}, {1, _}]", "MatchQ[List[1, 2], List[1, Blank[]]]"

        function_call: "Function[x, x + 1][5]", "Function[x, Plus[x, 1]][5]"
    }

    #[test]
    fn multiple_statements_translate_independently() {
        let (trees, _) = parse_statements(strip(scan("1 + 1; x = 2")));
        let exprs: Vec<String> = trees
            .iter()
            .map(|t| translate(t).unwrap().emit_fullform())
            .collect();
        assert_eq!(exprs, vec!["Plus[1, 1]", "Assign[x, 2]"]);
    }
}
