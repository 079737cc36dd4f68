//! Lossless, immutable concrete syntax tree for the kopi parser.
//!
//! The tree is built once from parser events and then navigated through
//! copyable handles that borrow it. Trivia is attached to tokens so the
//! original text can always be reproduced.

/// Typed AST wrappers around the raw syntax tree.
pub mod ast;
mod builder;
mod cursor;
mod listener;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod trivia;

/// Incremental builder for constructing a `SyntaxTree`.
pub use builder::Builder;
/// Traversal primitives.
pub use cursor::{Preorder, PreorderWithTokens, WalkEvent};
pub use listener::{SyntaxListener, walk};
/// Primary syntax tree API types.
pub use syntax::{NodeOrToken, SyntaxElement, SyntaxNode, SyntaxToken, SyntaxTree};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::{SyntaxKind, Visitor};
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
/// Trivia pieces attached to tokens.
pub use trivia::{Trivia, TriviaPiece, TriviaPieceKind};
pub use text_size::{TextRange, TextSize};
