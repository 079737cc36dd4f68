//! Public syntax tree API: an owned arena plus copyable, lifetime-bound handles.

use std::fmt;
use std::ops::Range;

use text_size::{TextRange, TextSize};

use crate::cursor::{Preorder, PreorderWithTokens};
use crate::{SyntaxKind, Trivia};

pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) parent: Option<u32>,
    /// Range into `SyntaxTree::children`.
    pub(crate) children: (u32, u32),
    /// Range of token indices covered by the node.
    pub(crate) tokens: (u32, u32),
}

pub(crate) struct TokenData {
    pub(crate) kind: SyntaxKind,
    pub(crate) range: TextRange,
    pub(crate) leading: Trivia,
    pub(crate) trailing: Trivia,
    pub(crate) parent: u32,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Child {
    Node(u32),
    Token(u32),
}

/// Owned, immutable syntax tree for a single source text.
///
/// Every descendant is owned by the tree; handles only borrow it.
pub struct SyntaxTree {
    text: Box<str>,
    nodes: Box<[NodeData]>,
    tokens: Box<[TokenData]>,
    children: Box<[Child]>,
    root: u32,
}

impl SyntaxTree {
    pub(crate) fn from_parts(
        text: Box<str>,
        nodes: Box<[NodeData]>,
        tokens: Box<[TokenData]>,
        children: Box<[Child]>,
        root: u32,
    ) -> Self {
        Self { text, nodes, tokens, children, root }
    }

    /// Returns the root syntax node.
    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, id: self.root }
    }

    /// Returns the full source text for this tree.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Returns the token at `index` in source order.
    pub fn token(&self, index: usize) -> Option<SyntaxToken<'_>> {
        (index < self.tokens.len()).then_some(SyntaxToken { tree: self, id: index as u32 })
    }

    /// Iterates all tokens in source order.
    pub fn tokens(&self) -> impl DoubleEndedIterator<Item = SyntaxToken<'_>> + '_ {
        (0..self.tokens.len() as u32).map(move |id| SyntaxToken { tree: self, id })
    }

    fn node(&self, id: u32) -> &NodeData {
        &self.nodes[id as usize]
    }

    fn token_data(&self, id: u32) -> &TokenData {
        &self.tokens[id as usize]
    }

    pub(crate) fn children_of(&self, id: u32) -> &[Child] {
        let (start, end) = self.node(id).children;
        &self.children[start as usize..end as usize]
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("text_len", &self.text.len())
            .field("nodes", &self.nodes.len())
            .field("tokens", &self.tokens.len())
            .finish_non_exhaustive()
    }
}

/// Either a node or a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

pub type SyntaxElement<'a> = NodeOrToken<SyntaxNode<'a>, SyntaxToken<'a>>;

impl<N, T> NodeOrToken<N, T> {
    #[inline]
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    #[inline]
    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }

    #[inline]
    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    #[inline]
    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

impl<'a> SyntaxElement<'a> {
    pub fn kind(self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_range(self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }
}

/// Token handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxToken<'a> {
    tree: &'a SyntaxTree,
    id: u32,
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxToken<'_> {}

impl std::hash::Hash for SyntaxToken<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<'a> SyntaxToken<'a> {
    fn data(self) -> &'a TokenData {
        self.tree.token_data(self.id)
    }

    /// Returns this token's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.data().kind
    }

    /// Position of the token in the token sequence.
    #[inline]
    pub fn index(self) -> usize {
        self.id as usize
    }

    /// Returns the token text range excluding trivia.
    #[inline]
    pub fn text_range(self) -> TextRange {
        self.data().range
    }

    /// Returns the token text range including attached trivia.
    pub fn full_range(self) -> TextRange {
        let data = self.data();
        TextRange::new(data.range.start() - data.leading.len(), data.range.end() + data.trailing.len())
    }

    /// Returns the token text excluding trivia.
    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns the token text including trivia.
    #[inline]
    pub fn full_text(self) -> &'a str {
        &self.tree.text[self.full_range()]
    }

    #[inline]
    pub fn leading_trivia(self) -> &'a Trivia {
        &self.data().leading
    }

    #[inline]
    pub fn trailing_trivia(self) -> &'a Trivia {
        &self.data().trailing
    }

    /// Returns the parent node.
    #[inline]
    pub fn parent(self) -> SyntaxNode<'a> {
        SyntaxNode { tree: self.tree, id: self.data().parent }
    }

    /// Returns an iterator of parent nodes, starting from the immediate parent.
    pub fn parent_ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        self.parent().ancestors()
    }

    pub fn prev_token(self) -> Option<Self> {
        self.id.checked_sub(1).map(|id| Self { tree: self.tree, id })
    }

    pub fn next_token(self) -> Option<Self> {
        self.tree.token(self.id as usize + 1)
    }
}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.text_range(), self.text())
    }
}

impl fmt::Display for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Node handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    tree: &'a SyntaxTree,
    id: u32,
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl std::hash::Hash for SyntaxNode<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<'a> SyntaxNode<'a> {
    fn data(self) -> &'a NodeData {
        self.tree.node(self.id)
    }

    pub(crate) fn tree(self) -> &'a SyntaxTree {
        self.tree
    }

    pub(crate) fn id(self) -> u32 {
        self.id
    }

    pub(crate) fn from_id(tree: &'a SyntaxTree, id: u32) -> Self {
        Self { tree, id }
    }

    /// Returns this node's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.data().kind
    }

    /// Token indices covered by this node.
    #[inline]
    pub fn token_range(self) -> Range<usize> {
        let (start, end) = self.data().tokens;
        start as usize..end as usize
    }

    /// Returns the first token spanned by this node.
    pub fn first_token(self) -> Option<SyntaxToken<'a>> {
        let range = self.token_range();
        (!range.is_empty()).then(|| SyntaxToken { tree: self.tree, id: range.start as u32 })
    }

    /// Returns the last token spanned by this node.
    pub fn last_token(self) -> Option<SyntaxToken<'a>> {
        let range = self.token_range();
        (!range.is_empty()).then(|| SyntaxToken { tree: self.tree, id: range.end as u32 - 1 })
    }

    /// Returns the range from the first to the last token, without the outer
    /// trivia. Empty nodes sit at the start of the token that follows them.
    pub fn text_range(self) -> TextRange {
        match (self.first_token(), self.last_token()) {
            (Some(first), Some(last)) => {
                TextRange::new(first.text_range().start(), last.text_range().end())
            }
            _ => {
                let offset = self
                    .tree
                    .token(self.token_range().start)
                    .map_or_else(|| TextSize::of(self.tree.text()), |next| next.text_range().start());
                TextRange::empty(offset)
            }
        }
    }

    /// Returns the range including leading trivia of the first token and
    /// trailing trivia of the last one.
    pub fn full_range(self) -> TextRange {
        match (self.first_token(), self.last_token()) {
            (Some(first), Some(last)) => {
                TextRange::new(first.full_range().start(), last.full_range().end())
            }
            _ => self.text_range(),
        }
    }

    /// Returns the node text without its outer trivia.
    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    #[inline]
    pub fn full_text(self) -> &'a str {
        &self.tree.text[self.full_range()]
    }

    /// Returns the parent node.
    #[inline]
    pub fn parent(self) -> Option<Self> {
        self.data().parent.map(|id| Self { tree: self.tree, id })
    }

    /// Returns an iterator over this node and its ancestors.
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        std::iter::successors(Some(self), |node| node.parent())
    }

    /// Iterates all direct children, nodes and tokens alike.
    pub fn children_with_tokens(self) -> impl DoubleEndedIterator<Item = SyntaxElement<'a>> + Clone {
        let tree = self.tree;
        tree.children_of(self.id).iter().map(move |child| match *child {
            Child::Node(id) => NodeOrToken::Node(SyntaxNode { tree, id }),
            Child::Token(id) => NodeOrToken::Token(SyntaxToken { tree, id }),
        })
    }

    /// Iterates the direct child nodes.
    pub fn children(self) -> impl DoubleEndedIterator<Item = SyntaxNode<'a>> + Clone {
        self.children_with_tokens().filter_map(NodeOrToken::into_node)
    }

    /// Iterates the direct child tokens.
    pub fn child_tokens(self) -> impl DoubleEndedIterator<Item = SyntaxToken<'a>> + Clone {
        self.children_with_tokens().filter_map(NodeOrToken::into_token)
    }

    pub fn first_child(self) -> Option<Self> {
        self.children().next()
    }

    pub fn child_of_kind(self, kind: SyntaxKind) -> Option<Self> {
        self.children().find(|child| child.kind() == kind)
    }

    pub fn token_of_kind(self, kind: SyntaxKind) -> Option<SyntaxToken<'a>> {
        self.child_tokens().find(|token| token.kind() == kind)
    }

    /// Depth-first, pre-order enter/leave events over nodes.
    pub fn preorder(self) -> Preorder<'a> {
        Preorder::new(self)
    }

    /// Depth-first, pre-order enter/leave events over nodes and tokens.
    pub fn preorder_with_tokens(self) -> PreorderWithTokens<'a> {
        PreorderWithTokens::new(self)
    }

    /// This node and every node below it, in pre-order.
    pub fn descendants(self) -> impl Iterator<Item = SyntaxNode<'a>> {
        self.preorder().filter_map(|event| match event {
            crate::WalkEvent::Enter(node) => Some(node),
            crate::WalkEvent::Leave(_) => None,
        })
    }

    /// Every token below this node, in source order.
    pub fn descendant_tokens(self) -> impl DoubleEndedIterator<Item = SyntaxToken<'a>> + 'a {
        let tree = self.tree;
        self.token_range().map(move |id| SyntaxToken { tree, id: id as u32 })
    }

    /// Indented one-line-per-element rendering used by snapshot tests.
    pub fn debug_tree(self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;

        for event in self.preorder_with_tokens() {
            match event {
                crate::WalkEvent::Enter(element) => {
                    out.push_str(&"  ".repeat(depth));
                    match element {
                        NodeOrToken::Node(node) => {
                            out.push_str(node.kind().name());
                            depth += 1;
                        }
                        NodeOrToken::Token(token) => {
                            out.push_str(token.kind().name());
                            out.push(' ');
                            out.push_str(&format!("{:?}", token.text()));
                        }
                    }
                    out.push('\n');
                }
                crate::WalkEvent::Leave(NodeOrToken::Node(_)) => depth -= 1,
                crate::WalkEvent::Leave(NodeOrToken::Token(_)) => {}
            }
        }

        out
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Display for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
