//! Lexer producing the classified token stream the parser consumes.
//!
//! Whitespace, line breaks and comments never become tokens; they are kept as
//! trivia on the neighbouring token so the stream stays lossless.

mod cursor;

use cursor::Cursor;
pub use kopi_syntax::SyntaxKind;
use kopi_syntax::SyntaxKind::*;
use kopi_syntax::{Trivia, TriviaPiece, TriviaPieceKind};
use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub leading: Trivia,
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub trailing: Trivia,
}

impl Token {
    const EOF: Self = Self {
        kind: EOF,
        range: TextRange::empty(TextSize::new(0)),
        leading: Trivia::empty(),
        trailing: Trivia::empty(),
    };

    /// Range including leading and trailing trivia.
    pub fn full_range(&self) -> TextRange {
        TextRange::new(self.range.start() - self.leading.len(), self.range.end() + self.trailing.len())
    }
}

/// Lexes `text` into tokens, ending with exactly one `EOF` token.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(text);
    let mut tokens = Vec::with_capacity(text.len() / 4 + 1);
    loop {
        let token = tokenizer.next_token();
        let kind = token.kind;
        tokens.push(token);
        if kind == EOF {
            return tokens;
        }
    }
}

pub struct Tokenizer<'a> {
    text: &'a str,
    cursor: Cursor<'a>,
    current: Token,
    trivia_pieces: Vec<TriviaPiece>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut tokenizer = Self {
            text,
            cursor: Cursor::new(text),
            current: Token::EOF,
            trivia_pieces: Vec::with_capacity(4),
        };
        tokenizer.next_token();
        tokenizer
    }

    pub fn peek(&self) -> &Token {
        &self.current
    }

    fn offset(&self) -> TextSize {
        TextSize::new(self.text.len() as u32) - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let end = self.offset();
        TextRange::new(end - self.cursor.pos_within_token(), end)
    }

    fn text(&self) -> &'a str {
        &self.text[self.range()]
    }

    /// Returns the current token and lexes the next one. Once the input is
    /// exhausted every call yields an `EOF` token.
    pub fn next_token(&mut self) -> Token {
        self.trivia(false);
        let trailing_start = self.trivia_pieces.len();
        let (kind, range) = self.syntax_kind();
        if kind != EOF {
            self.trivia(true);
        }

        let (leading, trailing) = self.trivia_pieces.split_at(trailing_start);
        let leading = Trivia::new(leading);
        let trailing = Trivia::new(trailing);

        self.trivia_pieces.clear();
        std::mem::replace(&mut self.current, Token { leading, kind, range, trailing })
    }

    /// Collects trivia pieces. Trailing trivia ends before the first line
    /// break so that a line's comments lead the token on the next line.
    fn trivia(&mut self, trailing: bool) {
        loop {
            let kind = match self.cursor.peek() {
                _ if self.cursor.is_eof() => break,
                '\n' | '\r' => {
                    if trailing {
                        break;
                    }
                    if self.cursor.advance() == '\r' {
                        self.cursor.eat('\n');
                    }
                    TriviaPieceKind::Newline
                }
                '/' if self.cursor.second() == '/' => {
                    self.cursor.advance_while(|c| c != '\n' && c != '\r');
                    TriviaPieceKind::SingleLineComment
                }
                '/' if self.cursor.second() == '*' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    while !self.cursor.is_eof() {
                        if self.cursor.advance() == '*' && self.cursor.eat('/') {
                            break;
                        }
                    }
                    TriviaPieceKind::MultiLineComment
                }
                c if is_whitespace(c) => {
                    self.cursor.advance_while(is_whitespace);
                    TriviaPieceKind::Whitespace
                }
                _ => break,
            };

            self.trivia_pieces.push(TriviaPiece::new(kind, self.cursor.pos_within_token()));
            self.cursor.reset_pos_within_token();
        }
    }

    fn syntax_kind(&mut self) -> (SyntaxKind, TextRange) {
        if self.cursor.is_eof() {
            return (EOF, self.range());
        }

        let kind = match self.cursor.advance() {
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            ';' => SEMICOLON,
            ',' => COMMA,
            '@' => AT,
            '?' => QUESTION,
            '~' => TILDE,
            '.' => {
                if self.cursor.peek().is_ascii_digit() {
                    self.fraction()
                } else if self.cursor.peek() == '.' && self.cursor.second() == '.' {
                    self.cursor.advance();
                    self.cursor.advance();
                    ELLIPSIS
                } else {
                    DOT
                }
            }
            ':' => {
                if self.cursor.eat(':') {
                    COLON_COLON
                } else {
                    COLON
                }
            }
            '=' => self.with_eq(EQ, EQ_EQ),
            '!' => self.with_eq(BANG, BANG_EQ),
            '*' => self.with_eq(STAR, STAR_EQ),
            '/' => self.with_eq(SLASH, SLASH_EQ),
            '%' => self.with_eq(PERCENT, PERCENT_EQ),
            '^' => self.with_eq(CARET, CARET_EQ),
            '+' => {
                if self.cursor.eat('+') {
                    PLUS_PLUS
                } else {
                    self.with_eq(PLUS, PLUS_EQ)
                }
            }
            '-' => {
                if self.cursor.eat('-') {
                    MINUS_MINUS
                } else if self.cursor.eat('>') {
                    ARROW
                } else {
                    self.with_eq(MINUS, MINUS_EQ)
                }
            }
            '&' => {
                if self.cursor.eat('&') {
                    AMP_AMP
                } else {
                    self.with_eq(AMP, AMP_EQ)
                }
            }
            '|' => {
                if self.cursor.eat('|') {
                    PIPE_PIPE
                } else {
                    self.with_eq(PIPE, PIPE_EQ)
                }
            }
            '<' => {
                if self.cursor.eat('<') {
                    self.with_eq(SHL, SHL_EQ)
                } else {
                    self.with_eq(LT, LT_EQ)
                }
            }
            // `>` never combines here: closing nested type arguments needs the
            // single form, so the parser joins adjacent `>` tokens itself.
            '>' => GT,
            '\'' => self.char_literal(),
            '"' => self.string_literal(),
            first_char @ '0'..='9' => self.number(first_char),
            c if is_ident_start(c) => {
                self.cursor.advance_while(is_ident_continue);
                SyntaxKind::from_keyword(self.text()).unwrap_or(NAME)
            }
            _ => UNKNOWN,
        };

        let range = self.range();
        self.cursor.reset_pos_within_token();

        (kind, range)
    }

    fn with_eq(&mut self, plain: SyntaxKind, assign: SyntaxKind) -> SyntaxKind {
        if self.cursor.eat('=') { assign } else { plain }
    }

    fn char_literal(&mut self) -> SyntaxKind {
        if self.quoted('\'') { CHAR_LITERAL } else { UNKNOWN }
    }

    fn string_literal(&mut self) -> SyntaxKind {
        if self.cursor.peek() == '"' && self.cursor.second() == '"' {
            self.cursor.advance();
            self.cursor.advance();
            return self.text_block();
        }
        if self.quoted('"') { STRING_LITERAL } else { UNKNOWN }
    }

    /// Consumes the rest of a single-line quoted literal. Returns `false` when
    /// the line or the input ends before the closing quote.
    fn quoted(&mut self, quote: char) -> bool {
        loop {
            match self.cursor.peek() {
                _ if self.cursor.is_eof() => return false,
                '\n' | '\r' => return false,
                '\\' => {
                    self.cursor.advance();
                    if !self.cursor.is_eof() {
                        self.cursor.advance();
                    }
                }
                c => {
                    self.cursor.advance();
                    if c == quote {
                        return true;
                    }
                }
            }
        }
    }

    /// `"""` was consumed; the opening delimiter must be followed by a line
    /// break before the content starts.
    fn text_block(&mut self) -> SyntaxKind {
        self.cursor.advance_while(|c| c == ' ' || c == '\t' || c == '\u{c}');
        if !matches!(self.cursor.peek(), '\n' | '\r') || self.cursor.is_eof() {
            return UNKNOWN;
        }

        while !self.cursor.is_eof() {
            match self.cursor.advance() {
                '\\' => {
                    self.cursor.advance();
                }
                '"' if self.cursor.peek() == '"' && self.cursor.second() == '"' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    return TEXT_BLOCK;
                }
                _ => {}
            }
        }
        UNKNOWN
    }

    fn number(&mut self, c: char) -> SyntaxKind {
        if c == '0' {
            match self.cursor.peek() {
                'x' | 'X' => {
                    self.cursor.advance();
                    return self.hex_number();
                }
                'b' | 'B' => {
                    self.cursor.advance();
                    self.digits(false);
                    return self.int_suffix();
                }
                _ => {}
            }
        }

        self.digits(false);

        if self.cursor.matches('.') && self.cursor.second() != '.' && !is_ident_start(self.cursor.second())
        {
            self.cursor.advance();
            return self.fraction();
        }

        if matches!(self.cursor.peek(), 'e' | 'E') {
            self.exponent();
            return self.float_suffix();
        }

        if matches!(self.cursor.peek(), 'f' | 'F' | 'd' | 'D') {
            self.cursor.advance();
            return FLOAT_LITERAL;
        }

        self.int_suffix()
    }

    /// Digits after the decimal point, an optional exponent and suffix.
    fn fraction(&mut self) -> SyntaxKind {
        self.digits(false);
        self.exponent();
        self.float_suffix()
    }

    fn hex_number(&mut self) -> SyntaxKind {
        self.digits(true);
        let mut float = false;
        if self.cursor.matches('.') {
            self.cursor.advance();
            self.digits(true);
            float = true;
        }
        if matches!(self.cursor.peek(), 'p' | 'P') {
            self.cursor.advance();
            if matches!(self.cursor.peek(), '+' | '-') {
                self.cursor.advance();
            }
            self.digits(false);
            float = true;
        }
        if float { self.float_suffix() } else { self.int_suffix() }
    }

    fn digits(&mut self, allow_hex: bool) {
        loop {
            match self.cursor.peek() {
                '_' | '0'..='9' => {
                    self.cursor.advance();
                }
                'a'..='f' | 'A'..='F' if allow_hex => {
                    self.cursor.advance();
                }
                _ => return,
            }
        }
    }

    fn exponent(&mut self) {
        if matches!(self.cursor.peek(), 'e' | 'E') {
            self.cursor.advance();
            if matches!(self.cursor.peek(), '+' | '-') {
                self.cursor.advance();
            }
            self.digits(false);
        }
    }

    fn int_suffix(&mut self) -> SyntaxKind {
        if matches!(self.cursor.peek(), 'l' | 'L') {
            self.cursor.advance();
        }
        INT_LITERAL
    }

    fn float_suffix(&mut self) -> SyntaxKind {
        if matches!(self.cursor.peek(), 'f' | 'F' | 'd' | 'D') {
            self.cursor.advance();
        }
        FLOAT_LITERAL
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}
