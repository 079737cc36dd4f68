use kopi_syntax::SyntaxKind;
use kopi_tokenizer::Token;
use text_size::{TextRange, TextSize};

/// Peekable, rewindable cursor over a lexed token stream.
///
/// Peeking never mutates anything, so looking at the same position twice
/// always gives the same answer. The stream always ends with an `EOF` token
/// and the cursor never moves past it.
pub struct TokenSource<'t> {
    text: &'t str,
    tokens: Vec<Token>,
    pos: usize,
}

/// Saved cursor position, see [`TokenSource::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl<'t> TokenSource<'t> {
    /// Wraps `tokens`, appending an `EOF` token when the caller did not.
    pub fn new(text: &'t str, mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|token| token.kind != SyntaxKind::EOF) {
            let end = TextSize::of(text);
            tokens.push(Token {
                leading: Default::default(),
                kind: SyntaxKind::EOF,
                range: TextRange::empty(end),
                trailing: Default::default(),
            });
        }
        Self { text, tokens, pos: 0 }
    }

    pub fn lex(text: &'t str) -> Self {
        Self::new(text, kopi_tokenizer::tokenize(text))
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Index of the current token.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn index(&self, n: usize) -> usize {
        (self.pos + n).min(self.tokens.len() - 1)
    }

    /// Kind of the token `n` positions ahead; `EOF` past the end.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens[self.index(n)].kind
    }

    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub fn nth_token(&self, n: usize) -> &Token {
        &self.tokens[self.index(n)]
    }

    /// Source text of the token `n` positions ahead, without trivia.
    pub fn nth_text(&self, n: usize) -> &'t str {
        &self.text[self.nth_token(n).range]
    }

    /// Whether the tokens at `n` and `n + 1` touch with nothing in between.
    pub fn is_joint(&self, n: usize) -> bool {
        let (first, second) = (self.index(n), self.index(n + 1));
        first != second && self.tokens[first].range.end() == self.tokens[second].range.start()
    }

    /// Consumes `n` raw tokens.
    pub fn bump(&mut self, n: usize) {
        self.pos = self.index(n);
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0;
    }

    /// Raw token by absolute index.
    pub fn token(&self, index: usize) -> &Token {
        &self.tokens[index.min(self.tokens.len() - 1)]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use kopi_syntax::SyntaxKind::*;

    use super::*;

    #[test]
    fn peeking_is_pure() {
        let source = TokenSource::lex("a >> b");
        assert_eq!(source.nth(1), GT);
        assert_eq!(source.nth(1), GT);
        assert!(source.is_joint(1));
        assert!(!source.is_joint(0));
        assert_eq!(source.nth(10), EOF);
        assert_eq!(source.nth_text(3), "b");
    }

    #[test]
    fn rewind_restores_cursor() {
        let mut source = TokenSource::lex("x y z");
        let checkpoint = source.checkpoint();
        source.bump(2);
        assert_eq!(source.nth_text(0), "z");
        source.rewind(checkpoint);
        assert_eq!(source.position(), 0);
        assert_eq!(source.nth_text(0), "x");
    }

    #[test]
    fn cursor_stops_at_eof() {
        let mut source = TokenSource::lex("x");
        source.bump(5);
        assert_eq!(source.current(), EOF);
        assert_eq!(source.position(), 1);
        assert!(!source.is_joint(0));
    }

    #[test]
    fn missing_eof_is_appended() {
        let tokens = kopi_tokenizer::tokenize("x")
            .into_iter()
            .filter(|token| token.kind != EOF)
            .collect::<Vec<_>>();
        let source = TokenSource::new("x", tokens);
        assert_eq!(source.len(), 2);
        assert_eq!(source.nth(1), EOF);
        assert!(!source.is_empty());
    }
}
