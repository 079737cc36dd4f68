//! Push-style traversal.

use crate::{NodeOrToken, SyntaxNode, SyntaxToken, WalkEvent};

/// Receives matched `enter`/`exit` callbacks in depth-first order.
pub trait SyntaxListener<'a> {
    fn enter(&mut self, _node: SyntaxNode<'a>) {}

    fn exit(&mut self, _node: SyntaxNode<'a>) {}

    fn token(&mut self, _token: SyntaxToken<'a>) {}
}

/// Streams `root` and its descendants into `listener`.
pub fn walk<'a, L>(root: SyntaxNode<'a>, listener: &mut L)
where
    L: SyntaxListener<'a> + ?Sized,
{
    for event in root.preorder_with_tokens() {
        match event {
            WalkEvent::Enter(NodeOrToken::Node(node)) => listener.enter(node),
            WalkEvent::Leave(NodeOrToken::Node(node)) => listener.exit(node),
            WalkEvent::Enter(NodeOrToken::Token(token)) => listener.token(token),
            WalkEvent::Leave(NodeOrToken::Token(_)) => {}
        }
    }
}
