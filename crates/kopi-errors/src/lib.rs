use std::fmt;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
use kopi_syntax::SyntaxSet;
pub use text_size::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// No alternative of a rule matched the current token.
    Syntax,
    /// A cast, generic or lambda decision ran out of lookahead.
    Ambiguity,
    /// The nesting bound was exceeded.
    NestingTooDeep,
    /// Recovery reached the end of input without finding a sync token.
    Abandoned,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Syntax => "syntax error",
            Self::Ambiguity => "ambiguous construct",
            Self::NestingTooDeep => "nesting too deep",
            Self::Abandoned => "parse abandoned",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    message: String,
    range: TextRange,
    token_index: usize,
    expected: SyntaxSet,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, range: TextRange, token_index: usize) -> Self {
        Self { kind, message: message.into(), range, token_index, expected: SyntaxSet::EMPTY }
    }

    pub fn error(message: impl Into<String>, range: TextRange, token_index: usize) -> Self {
        Self::new(DiagnosticKind::Syntax, message, range, token_index)
    }

    #[must_use]
    pub fn with_expected(mut self, expected: SyntaxSet) -> Self {
        self.expected = expected;
        self
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Index of the offending token in the token stream.
    pub fn token_index(&self) -> usize {
        self.token_index
    }

    /// Token kinds that would have been accepted at the failure point.
    pub fn expected(&self) -> &SyntaxSet {
        &self.expected
    }

    pub fn render(&self, renderer: &Renderer, path: &str, text: &str) -> String {
        let expected = (!self.expected.is_empty()).then(|| format!("expected {}", self.expected));
        let title = format!("{}: {}", self.kind, self.message);

        let mut message = Level::Error.title(&title).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label("here"))
                .fold(true),
        );
        if let Some(expected) = &expected {
            message = message.footer(Level::Note.title(expected));
        }
        renderer.render(message).to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.range, self.message)
    }
}

#[cfg(test)]
mod tests {
    use kopi_syntax::SyntaxKind;
    use text_size::TextSize;

    use super::*;

    #[test]
    fn renders_message_and_expected_set() {
        let text = "class A { int x }\n";
        let range = TextRange::at(TextSize::new(16), TextSize::new(1));
        let diagnostic = Diagnostic::error("unexpected `}`", range, 6)
            .with_expected(SyntaxSet::new([SyntaxKind::SEMICOLON, SyntaxKind::COMMA]));

        let rendered = diagnostic.render(&Renderer::plain(), "A.java", text);
        assert!(rendered.contains("error: syntax error: unexpected `}`"), "{rendered}");
        assert!(rendered.contains("A.java"), "{rendered}");
        assert!(rendered.contains("here"), "{rendered}");
        assert!(rendered.contains("expected `;` or `,`"), "{rendered}");
    }

    #[test]
    fn empty_expected_set_has_no_footer() {
        let range = TextRange::empty(TextSize::new(0));
        let diagnostic = Diagnostic::new(DiagnosticKind::NestingTooDeep, "too deep", range, 0);
        let rendered = diagnostic.render(&Renderer::plain(), "A.java", "x");
        assert!(!rendered.contains("expected"), "{rendered}");
        assert_eq!(diagnostic.kind(), DiagnosticKind::NestingTooDeep);
        assert_eq!(diagnostic.to_string(), "0..0: too deep");
    }
}
