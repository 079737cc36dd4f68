//! Recursive-descent parser producing a lossless syntax tree for Java-family
//! source text.
//!
//! Parsing never fails outright: every entry point returns a [`Parse`] with a
//! tree (possibly containing `ERROR` nodes) and the diagnostics collected on
//! the way. [`Parse::into_result`] turns that into a `Result` for callers that
//! only want clean input.

use kopi_syntax::{SyntaxNode, SyntaxTree};
use kopi_tokenizer::Token;

mod grammar;
mod parser;
mod token_source;

pub use kopi_errors::{Diagnostic, DiagnosticKind};
pub use token_source::{Checkpoint, TokenSource};

/// How the parser reacts to the first error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Recover and keep going; all diagnostics are returned with the tree.
    #[default]
    Lenient,
    /// Stop at the first error. The rest of the input ends up in an `ERROR`
    /// node and [`Parse::into_result`] reports that error.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub mode: ParseMode,
    /// Maximum nesting of recursive rules before the parse is abandoned.
    pub max_depth: u32,
    /// Maximum number of tokens an ambiguity decision may look ahead.
    pub lookahead_limit: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { mode: ParseMode::Lenient, max_depth: 256, lookahead_limit: 1024 }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_lookahead_limit(mut self, lookahead_limit: usize) -> Self {
        self.lookahead_limit = lookahead_limit;
        self
    }
}

/// State of the error recovery controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecoveryState {
    #[default]
    Normal,
    /// An error was reported and tokens are being skipped.
    Recovering,
    /// Resynchronization ran out of input, the nesting bound tripped, or
    /// strict mode hit an error. Nothing after that point was parsed.
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{0}")]
    Syntax(Diagnostic),
    #[error("input has {} syntax error(s)", diagnostics.len())]
    Invalid { diagnostics: Vec<Diagnostic> },
    #[error("parse abandoned after {} error(s)", diagnostics.len())]
    Abandoned { diagnostics: Vec<Diagnostic> },
}

/// Result of a parse: the tree plus everything that went wrong building it.
pub struct Parse {
    tree: SyntaxTree,
    diagnostics: Vec<Diagnostic>,
    state: RecoveryState,
    mode: ParseMode,
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        self.tree.root()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// `Normal` unless the parse was abandoned.
    pub fn recovery_state(&self) -> RecoveryState {
        self.state
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn into_result(self) -> Result<SyntaxTree, ParseError> {
        let Self { tree, mut diagnostics, state, mode } = self;
        if diagnostics.is_empty() {
            return Ok(tree);
        }
        Err(match (mode, state) {
            (ParseMode::Strict, _) => ParseError::Syntax(diagnostics.swap_remove(0)),
            (ParseMode::Lenient, RecoveryState::Abandoned) => ParseError::Abandoned { diagnostics },
            (ParseMode::Lenient, _) => ParseError::Invalid { diagnostics },
        })
    }

    /// Tree dump followed by the diagnostics, one per line.
    pub fn debug_dump(&self) -> String {
        let mut out = self.root().debug_tree();
        out.push_str("Errors:\n");
        for diagnostic in &self.diagnostics {
            out.push_str(&format!("  {}\n", diagnostic));
        }
        out
    }
}

impl std::fmt::Debug for Parse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parse")
            .field("root", &self.root())
            .field("diagnostics", &self.diagnostics)
            .field("state", &self.state)
            .finish()
    }
}

/// Parses a compilation unit with default options.
pub fn parse(text: &str) -> Parse {
    parse_with(text, &ParseOptions::default())
}

pub fn parse_with(text: &str, options: &ParseOptions) -> Parse {
    parse_tokens(text, kopi_tokenizer::tokenize(text), options)
}

/// Parses a compilation unit from a caller-supplied token stream.
///
/// Token ranges must index into `text` in ascending order. A missing final
/// `EOF` token is added.
pub fn parse_tokens(text: &str, tokens: Vec<Token>, options: &ParseOptions) -> Parse {
    let _span = tracing::debug_span!("parse", len = text.len(), mode = ?options.mode).entered();
    run(TokenSource::new(text, tokens), options, grammar::compilation_unit)
}

/// Parses a single expression.
///
/// The root is the expression node itself; input left over after it is
/// reported and wrapped together with the expression in an `ERROR` root.
/// The end-of-input token is not part of the tree.
pub fn parse_expression(text: &str) -> Parse {
    parse_expression_with(text, &ParseOptions::default())
}

pub fn parse_expression_with(text: &str, options: &ParseOptions) -> Parse {
    let _span = tracing::debug_span!("parse_expression", len = text.len()).entered();
    run(TokenSource::lex(text), options, grammar::expression_root)
}

fn run(source: TokenSource<'_>, options: &ParseOptions, entry: fn(&mut parser::Parser<'_>)) -> Parse {
    let mut parser = parser::Parser::new(source, *options);
    entry(&mut parser);
    let (tree, diagnostics, state) = parser.build_tree();
    tracing::debug!(errors = diagnostics.len(), ?state, "parsed");
    Parse { tree, diagnostics, state, mode: options.mode }
}
