//! Incremental builder for the immutable syntax tree.

use text_size::TextRange;

use crate::syntax::{Child, NodeData, TokenData};
use crate::{SyntaxKind, SyntaxTree, Trivia};

#[derive(Debug, Clone, Copy)]
struct Opened {
    kind: SyntaxKind,
    first_child: usize,
    first_token: u32,
}

/// Builds a [`SyntaxTree`] from a stream of start/token/finish calls.
///
/// Nodes are materialized when they are finished, so a node's children are
/// stored contiguously and ids are handed out in post-order.
pub struct Builder {
    text: Box<str>,
    nodes: Vec<NodeData>,
    tokens: Vec<TokenData>,
    children: Vec<Child>,
    pending: Vec<Child>,
    opened: Vec<Opened>,
    root: Option<u32>,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 128;
const DEFAULT_TREE_SIZE: usize = 1024;

impl Builder {
    /// Creates a new builder for `text`.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.into(),
            nodes: Vec::with_capacity(DEFAULT_TREE_SIZE),
            tokens: Vec::with_capacity(DEFAULT_TREE_SIZE),
            children: Vec::with_capacity(DEFAULT_TREE_SIZE * 2),
            pending: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            root: None,
        }
    }

    /// Opens a node of `kind`; every following token or node becomes its child
    /// until the matching [`Builder::finish_node`].
    pub fn start_node(&mut self, kind: SyntaxKind) {
        debug_assert!(kind.is_node(), "{kind:?} is not a node kind");
        self.opened.push(Opened {
            kind,
            first_child: self.pending.len(),
            first_token: self.tokens.len() as u32,
        });
    }

    /// Appends a token to the innermost open node.
    ///
    /// `range` excludes trivia; the trivia lengths extend it on either side.
    pub fn token(&mut self, kind: SyntaxKind, range: TextRange, leading: Trivia, trailing: Trivia) {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        let id = self.tokens.len() as u32;
        self.tokens.push(TokenData { kind, range, leading, trailing, parent: u32::MAX });
        self.pending.push(Child::Token(id));
    }

    pub fn finish_node(&mut self) {
        let Some(opened) = self.opened.pop() else {
            panic!("`finish_node` called without a matching `start_node`");
        };

        let id = self.nodes.len() as u32;
        let start = self.children.len() as u32;
        for child in self.pending.drain(opened.first_child..) {
            match child {
                Child::Node(node) => self.nodes[node as usize].parent = Some(id),
                Child::Token(token) => self.tokens[token as usize].parent = id,
            }
            self.children.push(child);
        }
        let end = self.children.len() as u32;

        self.nodes.push(NodeData {
            kind: opened.kind,
            parent: None,
            children: (start, end),
            tokens: (opened.first_token, self.tokens.len() as u32),
        });

        if self.opened.is_empty() {
            self.root = Some(id);
        } else {
            self.pending.push(Child::Node(id));
        }
    }

    /// Completes the tree.
    ///
    /// Input that never opened a node is wrapped in an `ERROR` root so the
    /// result is always a tree.
    pub fn finish(mut self) -> SyntaxTree {
        assert!(self.opened.is_empty(), "unfinished nodes: {:?}", self.opened);

        let root = match self.root.take() {
            Some(root) if self.pending.is_empty() => root,
            previous => {
                if let Some(previous) = previous {
                    self.pending.insert(0, Child::Node(previous));
                }
                self.opened.push(Opened { kind: SyntaxKind::ERROR, first_child: 0, first_token: 0 });
                self.finish_node();
                self.nodes.len() as u32 - 1
            }
        };

        SyntaxTree::from_parts(
            std::mem::take(&mut self.text),
            std::mem::take(&mut self.nodes).into_boxed_slice(),
            std::mem::take(&mut self.tokens).into_boxed_slice(),
            std::mem::take(&mut self.children).into_boxed_slice(),
            root,
        )
    }
}
