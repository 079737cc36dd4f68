//! Lookahead decisions for the places where the grammar is not LL(1).
//!
//! Every decision scans the token stream with a [`Scanner`] that never moves
//! the cursor and gives up after `lookahead_limit` tokens. A scan that hits
//! the limit is reported as an ambiguity and falls back to the plain
//! expression reading.

use kopi_errors::DiagnosticKind;
use kopi_syntax::SyntaxKind::{self, *};
use tracing::trace;

use super::modifiers::MODIFIER_KEYWORDS;
use crate::parser::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParenKind {
    Lambda,
    Cast,
    Paren,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternKind {
    Type,
    Record,
}

struct Scanner<'a, 't> {
    p: &'a Parser<'t>,
    limit: usize,
    exhausted: bool,
}

impl<'a, 't> Scanner<'a, 't> {
    fn new(p: &'a Parser<'t>) -> Self {
        Self { limit: p.options().lookahead_limit, p, exhausted: false }
    }

    fn nth(&mut self, n: usize) -> SyntaxKind {
        if n >= self.limit {
            self.exhausted = true;
            return EOF;
        }
        self.p.nth(n)
    }

    fn nth_at_contextual(&mut self, n: usize, keyword: SyntaxKind) -> bool {
        self.nth(n) == NAME && self.p.nth_at_contextual(n, keyword)
    }

    /// Index of the bracket closing the one at `n`.
    fn balanced(&mut self, n: usize) -> Option<usize> {
        let open = self.nth(n);
        let close = match open {
            LEFT_PAREN => RIGHT_PAREN,
            LEFT_BRACKET => RIGHT_BRACKET,
            LEFT_BRACE => RIGHT_BRACE,
            _ => return None,
        };

        let mut depth = 0usize;
        let mut i = n;
        loop {
            match self.nth(i) {
                EOF => return None,
                kind if kind == open => depth += 1,
                kind if kind == close => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }

    fn qualified_name(&mut self, mut n: usize) -> Option<usize> {
        if self.nth(n) != NAME {
            return None;
        }
        n += 1;
        while self.nth(n) == DOT && self.nth(n + 1) == NAME {
            n += 2;
        }
        Some(n)
    }

    fn annotations(&mut self, mut n: usize) -> Option<usize> {
        while self.nth(n) == AT && self.nth(n + 1) != INTERFACE_KW {
            n = self.qualified_name(n + 1)?;
            if self.nth(n) == LEFT_PAREN {
                n = self.balanced(n)? + 1;
            }
        }
        Some(n)
    }

    /// Skips `final` and annotations, the modifiers allowed on locals.
    fn local_modifiers(&mut self, mut n: usize) -> Option<usize> {
        loop {
            n = self.annotations(n)?;
            if self.nth(n) != FINAL_KW {
                return Some(n);
            }
            n += 1;
        }
    }

    fn modifiers(&mut self, mut n: usize) -> Option<usize> {
        loop {
            n = self.annotations(n)?;
            let kind = self.nth(n);
            let contextual = self.nth_at_contextual(n, SEALED_KW);
            if !MODIFIER_KEYWORDS.contains(kind) && !contextual {
                return Some(n);
            }
            n += 1;
        }
    }

    /// Index just past a type starting at `n`, array dimensions included.
    fn type_(&mut self, n: usize) -> Option<usize> {
        let mut n = self.annotations(n)?;
        match self.nth(n) {
            kind if kind.is_primitive_type() => n += 1,
            NAME => {
                n += 1;
                loop {
                    if self.nth(n) == LT {
                        n = self.type_args(n)?;
                    }
                    if self.nth(n) == DOT {
                        let after = self.annotations(n + 1)?;
                        if self.nth(after) == NAME {
                            n = after + 1;
                            continue;
                        }
                    }
                    break;
                }
            }
            _ => return None,
        }
        Some(self.dims(n))
    }

    fn dims(&mut self, mut n: usize) -> usize {
        while self.nth(n) == LEFT_BRACKET && self.nth(n + 1) == RIGHT_BRACKET {
            n += 2;
        }
        n
    }

    /// `<` at `n`. Each `>` is its own token, so nested lists close one by one.
    fn type_args(&mut self, n: usize) -> Option<usize> {
        let mut n = n + 1;
        if self.nth(n) == GT {
            return Some(n + 1);
        }
        loop {
            n = self.annotations(n)?;
            if self.nth(n) == QUESTION {
                n += 1;
                if matches!(self.nth(n), EXTENDS_KW | SUPER_KW) {
                    n = self.type_(n + 1)?;
                }
            } else {
                n = self.type_(n)?;
            }
            match self.nth(n) {
                COMMA => n += 1,
                GT => return Some(n + 1),
                _ => return None,
            }
        }
    }

    fn cast_type(&mut self, n: usize) -> Option<usize> {
        let mut n = self.type_(n)?;
        while self.nth(n) == AMP {
            n = self.type_(n + 1)?;
        }
        Some(n)
    }

    fn paren_kind(&mut self) -> ParenKind {
        if !self.p.restrictions().no_lambda
            && self.lambda_params(1).is_some_and(|close| self.nth(close + 1) == ARROW)
        {
            return ParenKind::Lambda;
        }

        let close = match self.cast_type(1) {
            Some(close) if self.nth(close) == RIGHT_PAREN => close,
            _ => return ParenKind::Paren,
        };

        let primitive = self.annotations(1).is_some_and(|first| self.nth(first).is_primitive_type());
        if primitive || self.starts_cast_operand(close + 1) {
            ParenKind::Cast
        } else {
            ParenKind::Paren
        }
    }

    /// Index of the `)` ending a lambda parameter list whose first parameter
    /// is at `n`: nothing, bare names, or typed parameters.
    fn lambda_params(&mut self, mut n: usize) -> Option<usize> {
        if self.nth(n) == RIGHT_PAREN {
            return Some(n);
        }

        if self.nth(n) == NAME && matches!(self.nth(n + 1), COMMA | RIGHT_PAREN) {
            loop {
                match (self.nth(n), self.nth(n + 1)) {
                    (NAME, COMMA) => n += 2,
                    (NAME, RIGHT_PAREN) => return Some(n + 1),
                    _ => return None,
                }
            }
        }

        loop {
            n = self.local_modifiers(n)?;
            n = self.type_(n)?;
            n = self.annotations(n)?;
            if self.nth(n) == ELLIPSIS {
                n += 1;
            }
            if self.nth(n) != NAME {
                return None;
            }
            n = self.dims(n + 1);
            match self.nth(n) {
                COMMA => n += 1,
                RIGHT_PAREN => return Some(n),
                _ => return None,
            }
        }
    }

    /// Whether a reference-type cast may be followed by the token at `n`.
    ///
    /// `+` and `-` count, so `(Foo) -1` is a cast. `++`/`--` only count
    /// when an operand follows, otherwise `(i)++` is an increment.
    fn starts_cast_operand(&mut self, n: usize) -> bool {
        match self.nth(n) {
            PLUS | MINUS | BANG | TILDE => true,
            PLUS_PLUS | MINUS_MINUS => starts_primary(self.nth(n + 1)),
            kind => starts_primary(kind),
        }
    }

    fn pattern_kind(&mut self, n: usize) -> Option<PatternKind> {
        if self.nth(n) == LEFT_PAREN {
            return self.pattern_kind(n + 1);
        }
        let n = self.local_modifiers(n)?;
        let end = self.type_(n)?;
        match self.nth(end) {
            NAME => Some(PatternKind::Type),
            LEFT_PAREN => Some(PatternKind::Record),
            _ => None,
        }
    }
}

fn starts_primary(kind: SyntaxKind) -> bool {
    kind.is_literal()
        || kind.is_primitive_type()
        || matches!(
            kind,
            NAME | LEFT_PAREN | THIS_KW | SUPER_KW | NEW_KW | SWITCH_KW | VOID_KW
        )
}

fn decide<T: std::fmt::Debug>(
    p: &mut Parser<'_>,
    what: &'static str,
    scan: impl FnOnce(&mut Scanner<'_, '_>) -> T,
) -> T {
    let (decision, exhausted) = {
        let mut scanner = Scanner::new(p);
        let decision = scan(&mut scanner);
        (decision, scanner.exhausted)
    };
    trace!(what, ?decision, exhausted, "resolved");

    if exhausted {
        let limit = p.options().lookahead_limit;
        p.report(
            DiagnosticKind::Ambiguity,
            format!("cannot resolve {what} within {limit} tokens of lookahead"),
        );
    }
    decision
}

/// Decides what the `(` at the cursor opens. Lambda wins over cast, cast
/// over a parenthesized expression.
pub(crate) fn paren_kind(p: &mut Parser<'_>) -> ParenKind {
    decide(p, "cast, lambda or parenthesized expression", |s| s.paren_kind())
}

/// A type followed by a name: `int x`, `List<String> names`, `var v`.
pub(crate) fn at_local_var_decl(p: &mut Parser<'_>) -> bool {
    decide(p, "declaration or expression", |s| {
        s.local_modifiers(0).and_then(|n| s.type_(n)).is_some_and(|end| s.nth(end) == NAME)
    })
}

/// Modifiers followed by `class`, `interface`, `enum` or `record Name`.
pub(crate) fn at_local_type_decl(p: &mut Parser<'_>) -> bool {
    decide(p, "local type declaration", |s| {
        s.modifiers(0).is_some_and(|n| match s.nth(n) {
            CLASS_KW | INTERFACE_KW | ENUM_KW => true,
            AT => s.nth(n + 1) == INTERFACE_KW,
            _ => s.nth_at_contextual(n, RECORD_KW) && s.nth(n + 1) == NAME,
        })
    })
}

/// `Type name :` after `for (`.
pub(crate) fn at_foreach(p: &mut Parser<'_>) -> bool {
    decide(p, "enhanced for header", |s| {
        s.local_modifiers(0)
            .and_then(|n| s.type_(n))
            .is_some_and(|end| s.nth(end) == NAME && s.nth(end + 1) == COLON)
    })
}

/// A type pattern (`Type name`) or record pattern (`Type(...)`), possibly
/// parenthesized.
pub(crate) fn pattern_kind(p: &mut Parser<'_>) -> Option<PatternKind> {
    decide(p, "pattern or expression", |s| s.pattern_kind(0))
}

/// `Name[]...` followed by `.class` or `::`.
pub(crate) fn at_array_type_literal(p: &mut Parser<'_>) -> bool {
    decide(p, "array type literal", |s| {
        let Some(n) = s.qualified_name(0) else {
            return false;
        };
        if s.nth(n) != LEFT_BRACKET || s.nth(n + 1) != RIGHT_BRACKET {
            return false;
        }
        let end = s.dims(n);
        matches!((s.nth(end), s.nth(end + 1)), (DOT, CLASS_KW) | (COLON_COLON, _))
    })
}
