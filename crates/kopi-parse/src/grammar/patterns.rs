//! Switch blocks and patterns.
//!
//! A switch block holds either `case ...:` groups or `case ... ->` rules.
//! Each label's own terminator decides which node it lands in; the first
//! label fixes the form of the block and later labels using the other one
//! are reported where their terminator appears.

use kopi_syntax::SyntaxKind::{self, *};
use kopi_syntax::SyntaxSet;

use super::resolver;
use super::{delimited, exprs, modifiers, stmts, types};
use crate::parser::{CompletedMarker, Parser, Restrictions};

const SWITCH_RECOVERY: SyntaxSet = SyntaxSet::new([CASE_KW, DEFAULT_KW]);

const PATTERN_FIRST: SyntaxSet = types::TYPE_FIRST.union(&SyntaxSet::new([FINAL_KW, LEFT_PAREN]));

pub(crate) fn switch_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.bump(SWITCH_KW);
    stmts::condition(p);
    switch_block(p);
    m.complete(p, SWITCH_EXPR)
}

pub(crate) fn switch_block(p: &mut Parser<'_>) {
    if !p.at(LEFT_BRACE) {
        p.error(format!("expected `{{`, found {}", p.current()));
        return;
    }

    let m = p.start();
    p.bump(LEFT_BRACE);
    let mut form = None;
    super::list_until(p, RIGHT_BRACE, |p| {
        if p.at(CASE_KW) || p.at(DEFAULT_KW) {
            switch_entry(p, &mut form);
        } else {
            p.error_recover(format!("expected `case` or `default`, found {}", p.current()), SWITCH_RECOVERY);
        }
    });
    p.expect(RIGHT_BRACE);
    m.complete(p, SWITCH_BLOCK);
}

fn switch_entry(p: &mut Parser<'_>, form: &mut Option<SyntaxKind>) {
    let m = p.start();
    if switch_label(p, form) == ARROW {
        match p.current() {
            LEFT_BRACE => stmts::block(p),
            THROW_KW => stmts::statement(p),
            _ => stmts::expr_stmt(p),
        }
        m.complete(p, SWITCH_RULE);
        return;
    }

    while p.at(CASE_KW) || p.at(DEFAULT_KW) {
        switch_label(p, form);
    }
    while !p.at(CASE_KW) && !p.at(DEFAULT_KW) && !p.at(RIGHT_BRACE) && !p.at(EOF) {
        let before = p.position();
        stmts::statement(p);
        if p.position() == before {
            break;
        }
    }
    m.complete(p, SWITCH_GROUP);
}

/// Parses one label and returns its terminator, `:` when it is missing.
fn switch_label(p: &mut Parser<'_>, form: &mut Option<SyntaxKind>) -> SyntaxKind {
    let m = p.start();
    if p.at(DEFAULT_KW) {
        p.bump(DEFAULT_KW);
    } else {
        p.bump(CASE_KW);
        p.with_restrictions(Restrictions { no_lambda: true }, |p| {
            loop {
                case_item(p);
                if !p.eat(COMMA) {
                    break;
                }
            }
            if p.at_contextual(WHEN_KW) {
                guard(p);
            }
        });
    }

    let terminator = if p.at(COLON) || p.at(ARROW) {
        let kind = p.current();
        match *form {
            None => *form = Some(kind),
            Some(established) if established != kind => {
                p.error(format!("{kind} label in a switch that uses {established} labels"));
            }
            Some(_) => {}
        }
        p.bump(kind);
        kind
    } else {
        p.error(format!("expected `:` or `->`, found {}", p.current()));
        form.unwrap_or(COLON)
    };

    m.complete(p, SWITCH_LABEL);
    terminator
}

fn case_item(p: &mut Parser<'_>) {
    // `case null, default`
    if p.at(DEFAULT_KW) {
        p.bump(DEFAULT_KW);
        return;
    }

    if resolver::pattern_kind(p).is_some() {
        if let Some(pattern) = pattern(p) {
            guarded_pattern(p, pattern);
        }
        return;
    }
    exprs::conditional_expr(p);
}

/// `Type t && cond`, only accepted in labels.
fn guarded_pattern(p: &mut Parser<'_>, pattern: CompletedMarker) {
    if !p.at(AMP_AMP) {
        return;
    }
    let m = pattern.precede(p);
    p.bump(AMP_AMP);
    exprs::expr_bp(p, exprs::AND);
    m.complete(p, GUARDED_PATTERN);
}

fn guard(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump_remap(WHEN_KW);
    exprs::expr(p);
    m.complete(p, GUARD);
}

/// A type, record or parenthesized pattern.
pub(crate) fn pattern(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    p.nested(|p| {
        if p.at(LEFT_PAREN) {
            let m = p.start();
            p.bump(LEFT_PAREN);
            pattern(p);
            p.expect(RIGHT_PAREN);
            return m.complete(p, PAREN_PATTERN).into();
        }

        let m = p.start();
        modifiers::modifiers(p);
        if types::type_(p).is_none() {
            m.abandon(p);
            return None;
        }

        if p.at(LEFT_PAREN) {
            let list = p.start();
            delimited(p, LEFT_PAREN, RIGHT_PAREN, COMMA, "expected pattern", PATTERN_FIRST, |p| {
                pattern(p).is_some()
            });
            list.complete(p, PATTERN_LIST);
            return m.complete(p, RECORD_PATTERN).into();
        }

        p.expect(NAME);
        m.complete(p, TYPE_PATTERN).into()
    })
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use crate::tests::{check_expr, check_stmts};

    #[test]
    fn arrow_rules_with_patterns_and_guards() {
        check_expr(
            "switch (o) { case Point(int x, int y) when x > 0 -> x; case null, default -> 0; }",
            expect![[r#"
                SWITCH_EXPR
                  SWITCH_KW "switch"
                  CONDITION
                    LEFT_PAREN "("
                    NAME_EXPR
                      NAME "o"
                    RIGHT_PAREN ")"
                  SWITCH_BLOCK
                    LEFT_BRACE "{"
                    SWITCH_RULE
                      SWITCH_LABEL
                        CASE_KW "case"
                        RECORD_PATTERN
                          CLASS_TYPE
                            NAME "Point"
                          PATTERN_LIST
                            LEFT_PAREN "("
                            TYPE_PATTERN
                              PRIMITIVE_TYPE
                                INT_KW "int"
                              NAME "x"
                            COMMA ","
                            TYPE_PATTERN
                              PRIMITIVE_TYPE
                                INT_KW "int"
                              NAME "y"
                            RIGHT_PAREN ")"
                        GUARD
                          WHEN_KW "when"
                          BINARY_EXPR
                            NAME_EXPR
                              NAME "x"
                            GT ">"
                            LITERAL
                              INT_LITERAL "0"
                        ARROW "->"
                      EXPR_STMT
                        NAME_EXPR
                          NAME "x"
                        SEMICOLON ";"
                    SWITCH_RULE
                      SWITCH_LABEL
                        CASE_KW "case"
                        LITERAL
                          NULL_KW "null"
                        COMMA ","
                        DEFAULT_KW "default"
                        ARROW "->"
                      EXPR_STMT
                        LITERAL
                          INT_LITERAL "0"
                        SEMICOLON ";"
                    RIGHT_BRACE "}"
                Errors:
            "#]],
        );
    }

    #[test]
    fn colon_groups_share_statements() {
        check_stmts(
            "switch (k) { case A: case B: f(); break; default: yield 1; }",
            expect![[r#"
                SWITCH_STMT
                  SWITCH_KW "switch"
                  CONDITION
                    LEFT_PAREN "("
                    NAME_EXPR
                      NAME "k"
                    RIGHT_PAREN ")"
                  SWITCH_BLOCK
                    LEFT_BRACE "{"
                    SWITCH_GROUP
                      SWITCH_LABEL
                        CASE_KW "case"
                        NAME_EXPR
                          NAME "A"
                        COLON ":"
                      SWITCH_LABEL
                        CASE_KW "case"
                        NAME_EXPR
                          NAME "B"
                        COLON ":"
                      EXPR_STMT
                        METHOD_CALL
                          NAME "f"
                          ARG_LIST
                            LEFT_PAREN "("
                            RIGHT_PAREN ")"
                        SEMICOLON ";"
                      BREAK_STMT
                        BREAK_KW "break"
                        SEMICOLON ";"
                    SWITCH_GROUP
                      SWITCH_LABEL
                        DEFAULT_KW "default"
                        COLON ":"
                      YIELD_STMT
                        YIELD_KW "yield"
                        LITERAL
                          INT_LITERAL "1"
                        SEMICOLON ";"
                    RIGHT_BRACE "}"
                Errors:
            "#]],
        );
    }

    #[test]
    fn mixed_label_forms_are_reported_at_the_terminator() {
        check_stmts(
            "switch (k) { case 1 -> f(); case 2: g(); }",
            expect![[r#"
                SWITCH_STMT
                  SWITCH_KW "switch"
                  CONDITION
                    LEFT_PAREN "("
                    NAME_EXPR
                      NAME "k"
                    RIGHT_PAREN ")"
                  SWITCH_BLOCK
                    LEFT_BRACE "{"
                    SWITCH_RULE
                      SWITCH_LABEL
                        CASE_KW "case"
                        LITERAL
                          INT_LITERAL "1"
                        ARROW "->"
                      EXPR_STMT
                        METHOD_CALL
                          NAME "f"
                          ARG_LIST
                            LEFT_PAREN "("
                            RIGHT_PAREN ")"
                        SEMICOLON ";"
                    SWITCH_GROUP
                      SWITCH_LABEL
                        CASE_KW "case"
                        LITERAL
                          INT_LITERAL "2"
                        COLON ":"
                      EXPR_STMT
                        METHOD_CALL
                          NAME "g"
                          ARG_LIST
                            LEFT_PAREN "("
                            RIGHT_PAREN ")"
                        SEMICOLON ";"
                    RIGHT_BRACE "}"
                Errors:
                  34..35: `:` label in a switch that uses `->` labels
            "#]],
        );
    }
}
