use kopi_syntax::SyntaxKind::{self, *};
use kopi_syntax::SyntaxSet;

use super::{exprs, items, list_until, modifiers, patterns, resolver, semicolon, types};
use crate::parser::{Marker, Parser, Restrictions};

/// Keywords that begin a statement or close off one.
pub(crate) const STMT_KEYWORDS: SyntaxSet = SyntaxSet::new([
    IF_KW,
    ELSE_KW,
    WHILE_KW,
    DO_KW,
    FOR_KW,
    TRY_KW,
    CATCH_KW,
    FINALLY_KW,
    SWITCH_KW,
    CASE_KW,
    DEFAULT_KW,
    RETURN_KW,
    THROW_KW,
    BREAK_KW,
    CONTINUE_KW,
    SYNCHRONIZED_KW,
    ASSERT_KW,
    CLASS_KW,
    INTERFACE_KW,
    ENUM_KW,
    FINAL_KW,
]);

pub(crate) const STMT_RECOVERY: SyntaxSet = STMT_KEYWORDS.with(SEMICOLON);

pub(crate) fn block(p: &mut Parser<'_>) {
    if !p.at(LEFT_BRACE) {
        p.error(format!("expected `{{`, found {}", p.current()));
        return;
    }

    p.nested(|p| {
        let m = p.start();
        p.bump(LEFT_BRACE);
        list_until(p, RIGHT_BRACE, statement);
        p.expect(RIGHT_BRACE);
        m.complete(p, BLOCK);
    });
}

pub(crate) fn statement(p: &mut Parser<'_>) {
    p.nested(|p| match p.current() {
        LEFT_BRACE => block(p),
        SEMICOLON => {
            let m = p.start();
            p.bump(SEMICOLON);
            m.complete(p, EMPTY_STMT);
        }
        IF_KW => if_stmt(p),
        WHILE_KW => while_stmt(p),
        DO_KW => do_while_stmt(p),
        FOR_KW => for_stmt(p),
        TRY_KW => try_stmt(p),
        SWITCH_KW => {
            let m = p.start();
            p.bump(SWITCH_KW);
            condition(p);
            patterns::switch_block(p);
            m.complete(p, SWITCH_STMT);
        }
        RETURN_KW => {
            let m = p.start();
            p.bump(RETURN_KW);
            if !p.at(SEMICOLON) {
                exprs::expr(p);
            }
            semicolon(p, STMT_RECOVERY);
            m.complete(p, RETURN_STMT);
        }
        THROW_KW => {
            let m = p.start();
            p.bump(THROW_KW);
            exprs::expr(p);
            semicolon(p, STMT_RECOVERY);
            m.complete(p, THROW_STMT);
        }
        BREAK_KW | CONTINUE_KW => {
            let kind = if p.at(BREAK_KW) { BREAK_STMT } else { CONTINUE_STMT };
            let m = p.start();
            p.bump_any();
            p.eat(NAME);
            semicolon(p, STMT_RECOVERY);
            m.complete(p, kind);
        }
        ASSERT_KW => {
            let m = p.start();
            p.bump(ASSERT_KW);
            exprs::expr(p);
            if p.eat(COLON) {
                exprs::expr(p);
            }
            semicolon(p, STMT_RECOVERY);
            m.complete(p, ASSERT_STMT);
        }
        SYNCHRONIZED_KW if p.nth_at(1, LEFT_PAREN) => {
            let m = p.start();
            p.bump(SYNCHRONIZED_KW);
            condition(p);
            block(p);
            m.complete(p, SYNCHRONIZED_STMT);
        }
        NAME if p.nth_at(1, COLON) => {
            let m = p.start();
            p.bump(NAME);
            p.bump(COLON);
            statement(p);
            m.complete(p, LABELED_STMT);
        }
        NAME if at_yield_stmt(p) => {
            let m = p.start();
            p.bump_remap(YIELD_KW);
            exprs::expr(p);
            semicolon(p, STMT_RECOVERY);
            m.complete(p, YIELD_STMT);
        }
        NAME if p.nth_at_contextual(0, RECORD_KW) && p.nth_at(1, NAME) => local_type_decl(p),
        CLASS_KW | INTERFACE_KW | ENUM_KW | ABSTRACT_KW | STATIC_KW | STRICTFP_KW | FINAL_KW | AT
            if resolver::at_local_type_decl(p) =>
        {
            local_type_decl(p);
        }
        kind if (kind == NAME || kind == FINAL_KW || kind == AT || kind.is_primitive_type())
            && resolver::at_local_var_decl(p) =>
        {
            local_var_decl(p, true);
        }
        _ => expr_stmt(p),
    });
}

/// `yield` starts a statement unless it is used as a plain name, as in
/// `yield = 1` or `yield.next()`.
fn at_yield_stmt(p: &Parser<'_>) -> bool {
    if !p.nth_at_contextual(0, YIELD_KW) {
        return false;
    }
    match p.nth(1) {
        EQ | PLUS_EQ | MINUS_EQ | STAR_EQ | SLASH_EQ | PERCENT_EQ | AMP_EQ | PIPE_EQ | CARET_EQ
        | SHL_EQ | GT | DOT | LEFT_BRACKET | SEMICOLON | COLON | COLON_COLON | ARROW | EOF => false,
        PLUS_PLUS | MINUS_MINUS => !p.nth_at(2, SEMICOLON),
        _ => true,
    }
}

fn local_type_decl(p: &mut Parser<'_>) {
    let m = p.start();
    items::type_decl(p);
    m.complete(p, LOCAL_TYPE_DECL);
}

fn local_var_decl(p: &mut Parser<'_>, with_semicolon: bool) {
    let m = p.start();
    modifiers::modifiers(p);
    types::type_(p);
    super::variable_declarators(p);
    if with_semicolon {
        semicolon(p, STMT_RECOVERY);
    }
    m.complete(p, LOCAL_VAR_DECL);
}

pub(crate) fn expr_stmt(p: &mut Parser<'_>) {
    let start = p.position();
    let m = p.start();
    if exprs::expr(p).is_some() {
        semicolon(p, STMT_RECOVERY);
    } else {
        p.recover(STMT_RECOVERY);
        p.eat(SEMICOLON);
    }

    if p.position() == start {
        m.abandon(p);
    } else {
        m.complete(p, EXPR_STMT);
    }
}

/// `( expr )` after `if`, `while`, `switch` and `synchronized`.
pub(crate) fn condition(p: &mut Parser<'_>) {
    let m = p.start();
    p.expect(LEFT_PAREN);
    p.with_restrictions(Restrictions::default(), exprs::expr);
    p.expect(RIGHT_PAREN);
    m.complete(p, CONDITION);
}

/// `else if` chains are parsed in a loop so a long chain does not count
/// against the nesting bound. The tree still nests each `if` in the
/// preceding `ELSE_BRANCH`.
fn if_stmt(p: &mut Parser<'_>) {
    let mut open: Vec<(Marker, Option<Marker>)> = Vec::new();
    loop {
        let m = p.start();
        p.bump(IF_KW);
        condition(p);
        statement(p);
        if !p.at(ELSE_KW) {
            open.push((m, None));
            break;
        }

        let branch = p.start();
        p.bump(ELSE_KW);
        if p.at(IF_KW) {
            open.push((m, Some(branch)));
            continue;
        }
        statement(p);
        branch.complete(p, ELSE_BRANCH);
        open.push((m, None));
        break;
    }

    while let Some((m, branch)) = open.pop() {
        if let Some(branch) = branch {
            branch.complete(p, ELSE_BRANCH);
        }
        m.complete(p, IF_STMT);
    }
}

fn while_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump(WHILE_KW);
    condition(p);
    statement(p);
    m.complete(p, WHILE_STMT);
}

fn do_while_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump(DO_KW);
    statement(p);
    p.expect(WHILE_KW);
    condition(p);
    semicolon(p, STMT_RECOVERY);
    m.complete(p, DO_WHILE_STMT);
}

fn for_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump(FOR_KW);
    p.expect(LEFT_PAREN);
    let kind = p.with_restrictions(Restrictions::default(), for_header);
    p.expect(RIGHT_PAREN);
    statement(p);
    m.complete(p, kind);
}

/// The part between the parentheses; decides between the two `for` forms.
fn for_header(p: &mut Parser<'_>) -> SyntaxKind {
    if resolver::at_foreach(p) {
        modifiers::modifiers(p);
        types::type_(p);
        p.expect(NAME);
        p.expect(COLON);
        exprs::expr(p);
        return FOREACH_STMT;
    }

    if !p.at(SEMICOLON) {
        let init = p.start();
        if resolver::at_local_var_decl(p) {
            local_var_decl(p, false);
        } else {
            expr_list(p);
        }
        init.complete(p, FOR_INIT);
    }
    p.expect(SEMICOLON);
    if !p.at(SEMICOLON) {
        exprs::expr(p);
    }
    p.expect(SEMICOLON);
    if !p.at(RIGHT_PAREN) {
        let update = p.start();
        expr_list(p);
        update.complete(p, FOR_UPDATE);
    }
    FOR_STMT
}

fn expr_list(p: &mut Parser<'_>) {
    loop {
        exprs::expr(p);
        if !p.eat(COMMA) {
            break;
        }
    }
}

fn try_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump(TRY_KW);
    let has_resources = p.at(LEFT_PAREN);
    if has_resources {
        resource_spec(p);
    }
    block(p);

    let mut handlers = 0;
    while p.at(CATCH_KW) {
        catch_clause(p);
        handlers += 1;
    }
    if p.at(FINALLY_KW) {
        let finally = p.start();
        p.bump(FINALLY_KW);
        block(p);
        finally.complete(p, FINALLY_CLAUSE);
        handlers += 1;
    }

    if handlers == 0 && !has_resources {
        p.error(format!("expected `catch` or `finally`, found {}", p.current()));
    }
    m.complete(p, TRY_STMT);
}

fn resource_spec(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump(LEFT_PAREN);
    p.with_restrictions(Restrictions::default(), |p| {
        while !p.at(RIGHT_PAREN) && !p.at(EOF) {
            let start = p.position();
            let resource = p.start();
            if resolver::at_local_var_decl(p) {
                modifiers::modifiers(p);
                types::type_(p);
                p.expect(NAME);
                p.expect(EQ);
            }
            exprs::expr(p);

            if p.position() == start {
                resource.abandon(p);
                break;
            }
            resource.complete(p, RESOURCE);
            if !p.eat(SEMICOLON) {
                break;
            }
        }
    });
    p.expect(RIGHT_PAREN);
    m.complete(p, RESOURCE_SPEC);
}

fn catch_clause(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump(CATCH_KW);
    p.expect(LEFT_PAREN);
    let param = p.start();
    modifiers::modifiers(p);
    types::union_type(p);
    p.expect(NAME);
    param.complete(p, CATCH_PARAM);
    p.expect(RIGHT_PAREN);
    block(p);
    m.complete(p, CATCH_CLAUSE);
}
