//! Parse-tree storage.
//!
//! Nodes live in a flat arena owned by the parser while a statement is in flight; a completed
//! statement's arena is handed off wholesale to the translator.

use crate::scanner::types::{Token, TokenClass};
use crate::syntax::{Nonterminal, ProdName};

pub type NodeId = usize;

/// A node of a parse tree.
#[derive(Clone, Debug)]
pub enum ParseNode {
    /// A terminal node. `token` is attached when the matching token arrives.
    Terminal {
        class: TokenClass,
        token: Option<Token>,
    },
    /// A nonterminal node. `prod` and `children` are fixed at expansion time; the children list
    /// is never resized afterwards.
    NonTerminal {
        nt: Nonterminal,
        prod: Option<ProdName>,
        children: Vec<NodeId>,
    },
}

/// A completed parse tree for one statement.
#[derive(Clone, Debug)]
pub struct ParseTree {
    nodes: Vec<ParseNode>,
    root: NodeId,
}

impl ParseTree {
    pub(super) fn new(nodes: Vec<ParseNode>, root: NodeId) -> ParseTree {
        ParseTree { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &ParseNode {
        &self.nodes[id]
    }

    /// The children of `id`; empty for terminal nodes.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id] {
            ParseNode::NonTerminal { children, .. } => children,
            ParseNode::Terminal { .. } => &[],
        }
    }

    /// The production chosen for nonterminal `id`, if it was expanded.
    pub fn prod(&self, id: NodeId) -> Option<ProdName> {
        match &self.nodes[id] {
            ParseNode::NonTerminal { prod, .. } => *prod,
            ParseNode::Terminal { .. } => None,
        }
    }

    /// The token attached to terminal `id`, if any.
    pub fn token(&self, id: NodeId) -> Option<&Token> {
        match &self.nodes[id] {
            ParseNode::Terminal { token, .. } => token.as_ref(),
            ParseNode::NonTerminal { .. } => None,
        }
    }
}
