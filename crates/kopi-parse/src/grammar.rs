use kopi_syntax::SyntaxKind::{self, *};
use kopi_syntax::SyntaxSet;

use crate::parser::Parser;

mod exprs;
mod items;
mod modifiers;
mod modules;
mod patterns;
mod resolver;
mod stmts;
mod types;

pub(crate) fn compilation_unit(p: &mut Parser<'_>) {
    items::compilation_unit(p);
}

/// A lone expression. Trailing input is reported and the whole parse is
/// wrapped in an `ERROR` root.
pub(crate) fn expression_root(p: &mut Parser<'_>) {
    let m = p.start();
    let expr = exprs::expr(p);
    if expr.is_some() && p.at(EOF) {
        m.abandon(p);
        return;
    }

    if !p.at(EOF) {
        p.error(format!("expected end of input, found {}", p.current()));
        while !p.at(EOF) {
            p.bump_any();
        }
    }
    m.complete(p, ERROR);
}

pub(crate) fn delimited(
    p: &mut Parser<'_>,
    bra: SyntaxKind,
    ket: SyntaxKind,
    delim: SyntaxKind,
    unexpected_delim_message: &'static str,
    first_set: SyntaxSet,
    mut parser: impl FnMut(&mut Parser<'_>) -> bool,
) {
    p.bump(bra);

    while !p.at(ket) && !p.at(EOF) {
        if p.at(delim) {
            p.err_and_bump(unexpected_delim_message);
            continue;
        }

        if !parser(p) {
            break;
        }

        if !p.eat(delim) {
            if p.at_ts(first_set) {
                p.expect(delim);
            } else {
                break;
            }
        }
    }

    p.expect(ket);
}

/// Expects the `;` closing a declaration or statement, skipping to
/// `recovery` when it is missing.
pub(crate) fn semicolon(p: &mut Parser<'_>, recovery: SyntaxSet) {
    if !p.expect(SEMICOLON) {
        p.recover(recovery);
        p.eat(SEMICOLON);
    }
}

/// `a = 1, b[] = {2}` in fields and locals.
pub(crate) fn variable_declarators(p: &mut Parser<'_>) {
    loop {
        let m = p.start();
        p.expect(NAME);
        types::opt_dims(p);
        if p.eat(EQ) {
            exprs::variable_initializer(p);
        }
        m.complete(p, VARIABLE_DECLARATOR);

        if !p.eat(COMMA) {
            break;
        }
    }
}

/// Runs `rule` until `ket`, forcing progress when it consumes nothing.
pub(crate) fn list_until(p: &mut Parser<'_>, ket: SyntaxKind, mut rule: impl FnMut(&mut Parser<'_>)) {
    while !p.at(ket) && !p.at(EOF) {
        let before = p.position();
        rule(p);
        if p.position() == before {
            p.err_and_bump(format!("unexpected {}", p.current()));
        }
    }
}

/// Statements up to the end of input, wrapped in a `BLOCK`.
#[cfg(test)]
pub(crate) fn statements_root(p: &mut Parser<'_>) {
    let m = p.start();
    list_until(p, EOF, stmts::statement);
    m.complete(p, BLOCK);
}
