//! Module declarations from `module-info` files. Every directive keyword
//! is contextual and only recognized inside the module body.

use kopi_syntax::SyntaxKind::*;
use kopi_syntax::SyntaxSet;

use super::{list_until, modifiers, semicolon};
use crate::parser::{Marker, Parser};

const DIRECTIVE_RECOVERY: SyntaxSet = SyntaxSet::new([SEMICOLON]);

/// `module a.b {` or `open module a.b {`.
pub(crate) fn at_module_decl(p: &Parser<'_>) -> bool {
    let n = usize::from(p.nth_at_contextual(0, OPEN_KW));
    p.nth_at_contextual(n, MODULE_KW) && p.nth_at(n + 1, NAME)
}

pub(crate) fn module_decl(p: &mut Parser<'_>, m: Marker) {
    if p.at_contextual(OPEN_KW) {
        p.bump_remap(OPEN_KW);
    }
    p.bump_remap(MODULE_KW);
    modifiers::qualified_name(p);
    module_body(p);
    m.complete(p, MODULE_DECL);
}

fn module_body(p: &mut Parser<'_>) {
    if !p.at(LEFT_BRACE) {
        p.error(format!("expected `{{`, found {}", p.current()));
        return;
    }
    let m = p.start();
    p.bump(LEFT_BRACE);
    list_until(p, RIGHT_BRACE, directive);
    p.expect(RIGHT_BRACE);
    m.complete(p, MODULE_BODY);
}

fn directive(p: &mut Parser<'_>) {
    let m = p.start();
    let kind = if p.at_contextual(REQUIRES_KW) {
        p.bump_remap(REQUIRES_KW);
        requires_modifiers(p);
        modifiers::qualified_name(p);
        REQUIRES_DIRECTIVE
    } else if p.at_contextual(EXPORTS_KW) || p.at_contextual(OPENS_KW) {
        let (keyword, kind) = if p.nth_at_contextual(0, EXPORTS_KW) {
            (EXPORTS_KW, EXPORTS_DIRECTIVE)
        } else {
            (OPENS_KW, OPENS_DIRECTIVE)
        };
        p.bump_remap(keyword);
        modifiers::qualified_name(p);
        if p.at_contextual(TO_KW) {
            p.bump_remap(TO_KW);
            name_list(p);
        }
        kind
    } else if p.at_contextual(USES_KW) {
        p.bump_remap(USES_KW);
        modifiers::qualified_name(p);
        USES_DIRECTIVE
    } else if p.at_contextual(PROVIDES_KW) {
        p.bump_remap(PROVIDES_KW);
        modifiers::qualified_name(p);
        if p.at_contextual(WITH_KW) {
            p.bump_remap(WITH_KW);
            name_list(p);
        } else {
            p.error(format!("expected `with`, found {}", p.current()));
        }
        PROVIDES_DIRECTIVE
    } else {
        p.error_recover(format!("expected a module directive, found {}", p.current()), DIRECTIVE_RECOVERY);
        p.eat(SEMICOLON);
        m.abandon(p);
        return;
    };

    semicolon(p, DIRECTIVE_RECOVERY);
    m.complete(p, kind);
}

/// `transitive` and `static`; `requires transitive;` names a module.
fn requires_modifiers(p: &mut Parser<'_>) {
    loop {
        if p.at(STATIC_KW) {
            p.bump(STATIC_KW);
        } else if p.nth_at_contextual(0, TRANSITIVE_KW) && p.nth_at(1, NAME) {
            p.bump_remap(TRANSITIVE_KW);
        } else {
            break;
        }
    }
}

fn name_list(p: &mut Parser<'_>) {
    loop {
        modifiers::qualified_name(p);
        if !p.eat(COMMA) {
            break;
        }
    }
}
