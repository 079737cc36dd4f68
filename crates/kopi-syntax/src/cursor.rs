//! Depth-first traversal with matched enter/leave events.

use crate::syntax::Child;
use crate::{NodeOrToken, SyntaxElement, SyntaxNode, SyntaxToken, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent<T> {
    Enter(T),
    Leave(T),
}

impl<T> WalkEvent<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WalkEvent<U> {
        match self {
            WalkEvent::Enter(value) => WalkEvent::Enter(f(value)),
            WalkEvent::Leave(value) => WalkEvent::Leave(f(value)),
        }
    }
}

/// Pre-order walk over nodes and tokens.
///
/// Every `Enter` is followed by exactly one matching `Leave`, tokens included.
pub struct PreorderWithTokens<'a> {
    tree: &'a SyntaxTree,
    start: Option<u32>,
    /// Open nodes paired with the position of their next unvisited child.
    stack: Vec<(u32, usize)>,
    leave_token: Option<u32>,
    skip_subtree: bool,
}

impl<'a> PreorderWithTokens<'a> {
    pub(crate) fn new(start: SyntaxNode<'a>) -> Self {
        Self {
            tree: start.tree(),
            start: Some(start.id()),
            stack: Vec::new(),
            leave_token: None,
            skip_subtree: false,
        }
    }

    /// Skips the children of the node entered last; its `Leave` still fires.
    pub fn skip_subtree(&mut self) {
        self.skip_subtree = true;
    }

    fn token(&self, id: u32) -> SyntaxToken<'a> {
        match self.tree.token(id as usize) {
            Some(token) => token,
            None => unreachable!("child token {id} is out of bounds"),
        }
    }
}

impl<'a> Iterator for PreorderWithTokens<'a> {
    type Item = WalkEvent<SyntaxElement<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(id) = self.leave_token.take() {
            return Some(WalkEvent::Leave(NodeOrToken::Token(self.token(id))));
        }

        if let Some(id) = self.start.take() {
            self.stack.push((id, 0));
            return Some(WalkEvent::Enter(NodeOrToken::Node(SyntaxNode::from_id(self.tree, id))));
        }

        if std::mem::take(&mut self.skip_subtree) {
            if let Some((id, cursor)) = self.stack.last_mut() {
                *cursor = self.tree.children_of(*id).len();
            }
        }

        let (id, cursor) = self.stack.last_mut()?;
        let children = self.tree.children_of(*id);

        match children.get(*cursor).copied() {
            Some(Child::Node(child)) => {
                *cursor += 1;
                self.stack.push((child, 0));
                Some(WalkEvent::Enter(NodeOrToken::Node(SyntaxNode::from_id(self.tree, child))))
            }
            Some(Child::Token(child)) => {
                *cursor += 1;
                self.leave_token = Some(child);
                Some(WalkEvent::Enter(NodeOrToken::Token(self.token(child))))
            }
            None => {
                let id = *id;
                self.stack.pop();
                Some(WalkEvent::Leave(NodeOrToken::Node(SyntaxNode::from_id(self.tree, id))))
            }
        }
    }
}

/// Pre-order walk over nodes only.
pub struct Preorder<'a> {
    inner: PreorderWithTokens<'a>,
}

impl<'a> Preorder<'a> {
    pub(crate) fn new(start: SyntaxNode<'a>) -> Self {
        Self { inner: PreorderWithTokens::new(start) }
    }

    pub fn skip_subtree(&mut self) {
        self.inner.skip_subtree();
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = WalkEvent<SyntaxNode<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                WalkEvent::Enter(NodeOrToken::Node(node)) => return Some(WalkEvent::Enter(node)),
                WalkEvent::Leave(NodeOrToken::Node(node)) => return Some(WalkEvent::Leave(node)),
                WalkEvent::Enter(NodeOrToken::Token(_)) | WalkEvent::Leave(NodeOrToken::Token(_)) => {}
            }
        }
    }
}
