//! The LL(1) predictive parser.
//!
//! The parser holds a single explicit stack of parse-tree nodes. Nonterminal tops are expanded
//! through the predict table (recording the chosen production and appending child nodes);
//! terminal tops consume one token each. When the stack empties, a statement is complete and its
//! tree is emitted. There is no backtracking.
//!
//! A token for which no production exists aborts only the current statement: the parser surfaces
//! a [ParseError] and can be reset to the next statement boundary by the caller.

#[macro_use]
mod errors;
mod tree;

pub use errors::ParseErrors;
pub use tree::{NodeId, ParseNode, ParseTree};

use errors::*;

use crate::diagnostics::Diagnostic;
use crate::scanner::types::{Token, TokenClass};
use crate::syntax::{GrammarSym, Nonterminal, GRAMMAR, PREDICT};

use core::fmt;

/// What the parser was prepared to accept when it hit an offending token.
#[derive(Clone, Debug)]
pub enum Expected {
    /// A specific terminal was on the stack top.
    Class(TokenClass),
    /// A nonterminal was on the stack top and no production of it predicts the token.
    Expansion(Nonterminal),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Class(class) => write!(f, "{}", class),
            Expected::Expansion(nt) => {
                let toks = PREDICT.expected_tokens(*nt);
                let mut names: Vec<String> = toks.iter().map(|t| t.to_string()).collect();
                names.dedup();
                write!(f, "one of {}", names.join(", "))
            }
        }
    }
}

/// A recoverable parse failure: the symbol the parser needed, and the token it found.
#[derive(Clone, Debug)]
pub struct ParseError {
    pub expected: Expected,
    pub found: Token,
}

impl ParseError {
    pub fn diagnostic(&self) -> Diagnostic {
        if self.found.ty.class() == TokenClass::Eof {
            UnexpectedEof!(self.found.span, self.expected)
        } else {
            UnexpectedToken!(self.found.span, self.found, self.expected)
        }
    }
}

/// The predictive parser for one session. Feed tokens with [push_token](Parser::push_token);
/// completed statement trees pop out at statement boundaries.
pub struct Parser {
    nodes: Vec<ParseNode>,
    stack: Vec<NodeId>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Parser {
        let mut parser = Parser {
            nodes: Vec::new(),
            stack: Vec::new(),
        };
        parser.reset_statement();
        parser
    }

    /// Discards any partial statement and prepares for a fresh one.
    pub fn reset_statement(&mut self) {
        self.nodes = vec![ParseNode::NonTerminal {
            nt: GRAMMAR.start(),
            prod: None,
            children: Vec::new(),
        }];
        self.stack = vec![0];
    }

    /// Whether any token of the current statement has been consumed.
    pub fn is_mid_statement(&self) -> bool {
        self.nodes.len() > 1
    }

    /// Advances the parse with one token.
    ///
    /// Returns `Ok(Some(tree))` when the token completed a statement, `Ok(None)` when more
    /// tokens are needed, and a [ParseError] when the token fits no rule. After an error the
    /// parser must be [reset](Parser::reset_statement) before further use.
    pub fn push_token(&mut self, token: Token) -> Result<Option<ParseTree>, ParseError> {
        let class = token.ty.class();
        if class == TokenClass::Eof {
            if self.is_mid_statement() {
                let expected = self.expected_at_top();
                return Err(ParseError {
                    expected,
                    found: token,
                });
            }
            return Ok(None);
        }

        loop {
            let top = *self.stack.last().expect("fresh parser always has a root");
            match &self.nodes[top] {
                ParseNode::NonTerminal { nt, prod: None, .. } => {
                    let nt = *nt;
                    let name = match PREDICT.expanding_production(nt, class) {
                        Some(name) => name,
                        None => {
                            return Err(ParseError {
                                expected: Expected::Expansion(nt),
                                found: token,
                            })
                        }
                    };
                    self.expand(top, name);
                }
                ParseNode::NonTerminal { .. } => {
                    unreachable!("expanded nonterminal left on the stack")
                }
                ParseNode::Terminal {
                    class: want,
                    token: _,
                } => {
                    let want = *want;
                    if want != class {
                        return Err(ParseError {
                            expected: Expected::Class(want),
                            found: token,
                        });
                    }
                    if let ParseNode::Terminal { token: slot, .. } = &mut self.nodes[top] {
                        *slot = Some(token);
                    }
                    self.stack.pop();
                    if self.stack.is_empty() {
                        return Ok(Some(self.take_tree()));
                    }
                    return Ok(None);
                }
            }
        }
    }

    /// Expands nonterminal node `id` with production `name`: records the production, allocates
    /// one child node per rhs symbol, and pushes the children in reverse so the first rhs symbol
    /// is handled next.
    fn expand(&mut self, id: NodeId, name: crate::syntax::ProdName) {
        let prod = GRAMMAR.production(name);
        let mut child_ids = Vec::with_capacity(prod.rhs.len());
        for sym in &prod.rhs {
            let node = match sym {
                GrammarSym::Terminal(class) => ParseNode::Terminal {
                    class: *class,
                    token: None,
                },
                GrammarSym::Nonterminal(nt) => ParseNode::NonTerminal {
                    nt: *nt,
                    prod: None,
                    children: Vec::new(),
                },
            };
            self.nodes.push(node);
            child_ids.push(self.nodes.len() - 1);
        }

        self.stack.pop();
        for &child in child_ids.iter().rev() {
            self.stack.push(child);
        }

        if let ParseNode::NonTerminal { prod, children, .. } = &mut self.nodes[id] {
            *prod = Some(name);
            *children = child_ids;
        }
    }

    fn expected_at_top(&self) -> Expected {
        match &self.nodes[*self.stack.last().unwrap()] {
            ParseNode::Terminal { class, .. } => Expected::Class(*class),
            ParseNode::NonTerminal { nt, .. } => Expected::Expansion(*nt),
        }
    }

    fn take_tree(&mut self) -> ParseTree {
        let nodes = std::mem::take(&mut self.nodes);
        let tree = ParseTree::new(nodes, 0);
        self.reset_statement();
        tree
    }
}

/// Parses a whole token stream, recovering from errors at statement boundaries.
///
/// Returns the trees of all well-formed statements and a diagnostic per malformed one.
pub fn parse_statements(tokens: Vec<Token>) -> (Vec<ParseTree>, Vec<Diagnostic>) {
    let mut parser = Parser::new();
    let mut trees = Vec::new();
    let mut diagnostics = Vec::new();
    let mut skipping = false;

    for token in tokens {
        let class = token.ty.class();
        if skipping {
            // Drop the remainder of a malformed statement.
            if class == TokenClass::EndOfStatement {
                skipping = false;
            }
            continue;
        }
        match parser.push_token(token) {
            Ok(Some(tree)) => trees.push(tree),
            Ok(None) => {}
            Err(err) => {
                diagnostics.push(err.diagnostic());
                parser.reset_statement();
                if !matches!(class, TokenClass::EndOfStatement | TokenClass::Eof) {
                    skipping = true;
                }
            }
        }
    }

    (trees, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{scan, strip};
    use crate::syntax::ProdName;

    fn parse(program: &str) -> (Vec<ParseTree>, Vec<Diagnostic>) {
        parse_statements(strip(scan(program)))
    }

    macro_rules! parser_tests {
        ($($name:ident: $program:expr, $stmts:expr, $errors:expr)*) => {
        $(
            #[test]
            fn $name() {
                let (trees, diagnostics) = parse($program);
                assert_eq!(trees.len(), $stmts, "statement count");
                assert_eq!(diagnostics.len(), $errors, "diagnostic count");
            }
        )*
        }
    }

    parser_tests! {
        number: "1", 1, 0
        arith: "1 + 2 * 3", 1, 0
        parens: "(1 + 2) * 3", 1, 0
        call: "f[1, 2]", 1, 0
        nested_call: "f[g[1], {2, 3}]", 1, 0
        chained_call: "f[1][2]", 1, 0
        assignment: "x = 5", 1, 0
        delayed_assignment: "f := x + 1", 1, 0
        patterns: "f[x_, y__Number, ___]", 1, 0
        comparisons: "1 < 2 == 3 >= 4", 1, 0
        logical: "a && b || !c", 1, 0
        signed_exponent: "2 ^ -3", 1, 0
        multiple_statements: "1; 2; 3", 3, 0
        empty_list: "{}", 1, 0

        empty_input: "", 0, 0
        dangling_operator: "1 +", 0, 1
        misplaced_operator: "1 + * 2", 0, 1
        unclosed_call: "f[1, 2", 0, 1
        error_then_recovery: "1 + * 2; 5", 1, 1
        two_errors: "*; )", 0, 2
    }

    #[test]
    fn statement_root_records_its_production() {
        let (trees, diagnostics) = parse("1 + 2");
        assert!(diagnostics.is_empty());
        let tree = &trees[0];
        assert_eq!(tree.prod(tree.root()), Some(ProdName::StmtExpr));
    }

    #[test]
    fn children_match_production_arity() {
        let (trees, _) = parse("1");
        let tree = &trees[0];
        // Stmt -> Expr eos
        assert_eq!(tree.children(tree.root()).len(), 2);
        let expr = tree.children(tree.root())[0];
        // Expr -> Disj AssignTail
        assert_eq!(tree.prod(expr), Some(ProdName::ExprAssign));
        assert_eq!(tree.children(expr).len(), 2);
    }

    #[test]
    fn parse_error_carries_expected_and_found() {
        let tokens = strip(scan("1 + *"));
        let mut parser = Parser::new();
        let mut err = None;
        for tok in tokens {
            if let Err(e) = parser.push_token(tok) {
                err = Some(e);
                break;
            }
        }
        let err = err.expect("expected a parse error");
        assert_eq!(err.found.ty.class(), TokenClass::Times);
        assert!(matches!(err.expected, Expected::Expansion(_)));
    }
}
