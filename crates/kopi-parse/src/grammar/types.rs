use kopi_syntax::SyntaxKind::{self, *};
use kopi_syntax::SyntaxSet;

use super::modifiers;
use crate::parser::{CompletedMarker, Parser};

pub(crate) const PRIMITIVE_TYPES: SyntaxSet = SyntaxSet::new([
    BOOLEAN_KW, BYTE_KW, CHAR_KW, SHORT_KW, INT_KW, LONG_KW, FLOAT_KW, DOUBLE_KW,
]);

pub(crate) const TYPE_FIRST: SyntaxSet = PRIMITIVE_TYPES.union(&SyntaxSet::new([NAME, AT]));

pub(crate) fn type_(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    p.nested(|p| {
        let ty = non_array_type(p)?;
        Some(array_suffix(p, ty))
    })
}

/// A primitive or class type without trailing `[]`, as after `new`.
pub(crate) fn non_array_type(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let m = p.start();
    let annotated = modifiers::type_annotations(p);

    if p.at_ts(PRIMITIVE_TYPES) {
        p.bump_any();
        return m.complete(p, PRIMITIVE_TYPE).into();
    }

    if p.at(NAME) {
        class_type_segments(p);
        return m.complete(p, CLASS_TYPE).into();
    }

    p.error(format!("expected type, found {}", p.current()));
    if annotated {
        m.complete(p, ERROR);
    } else {
        m.abandon(p);
    }
    None
}

/// `Outer<A>.@Ann Inner<B>`, kept flat inside one `CLASS_TYPE`.
fn class_type_segments(p: &mut Parser<'_>) {
    p.bump(NAME);
    loop {
        if p.at(LT) {
            type_args(p);
        }
        let annotated_segment = p.nth_at(1, AT) && !p.nth_at(2, INTERFACE_KW);
        if p.at(DOT) && (p.nth_at(1, NAME) || annotated_segment) {
            p.bump(DOT);
            modifiers::type_annotations(p);
            if !p.eat(NAME) {
                p.error(format!("expected identifier, found {}", p.current()));
                break;
            }
            continue;
        }
        break;
    }
}

pub(crate) fn array_suffix(p: &mut Parser<'_>, mut ty: CompletedMarker) -> CompletedMarker {
    while p.at(LEFT_BRACKET) && p.nth_at(1, RIGHT_BRACKET) {
        let m = ty.precede(p);
        p.bump(LEFT_BRACKET);
        p.bump(RIGHT_BRACKET);
        ty = m.complete(p, ARRAY_TYPE);
    }
    ty
}

/// Declarator dimensions, as in `int x[][]`.
pub(crate) fn opt_dims(p: &mut Parser<'_>) {
    if !(p.at(LEFT_BRACKET) && p.nth_at(1, RIGHT_BRACKET)) {
        return;
    }
    let m = p.start();
    while p.at(LEFT_BRACKET) && p.nth_at(1, RIGHT_BRACKET) {
        p.bump(LEFT_BRACKET);
        p.bump(RIGHT_BRACKET);
    }
    m.complete(p, DIMS);
}

/// `void` or a type.
pub(crate) fn result_type(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    if p.at(VOID_KW) {
        let m = p.start();
        p.bump(VOID_KW);
        return m.complete(p, VOID_TYPE).into();
    }
    type_(p)
}

pub(crate) fn type_args(p: &mut Parser<'_>) {
    let m = p.start();
    if p.nth_at(1, GT) {
        p.bump(LT);
        p.bump(GT);
        m.complete(p, TYPE_ARG_LIST);
        return;
    }
    super::delimited(p, LT, GT, COMMA, "expected type argument", TYPE_FIRST.with(QUESTION), type_arg);
    m.complete(p, TYPE_ARG_LIST);
}

fn type_arg(p: &mut Parser<'_>) -> bool {
    let wildcard = p.at(QUESTION) || (p.at(AT) && type_annotations_then(p, QUESTION));
    if !wildcard {
        return type_(p).is_some();
    }

    let m = p.start();
    modifiers::type_annotations(p);
    p.bump(QUESTION);
    if p.at(EXTENDS_KW) || p.at(SUPER_KW) {
        p.bump_any();
        type_(p);
    }
    m.complete(p, WILDCARD_TYPE);
    true
}

/// Whether the annotations at the cursor are followed by `kind`.
fn type_annotations_then(p: &Parser<'_>, kind: SyntaxKind) -> bool {
    let mut n = 0;
    while p.nth_at(n, AT) {
        n += 2;
        while p.nth_at(n, DOT) && p.nth_at(n + 1, NAME) {
            n += 2;
        }
        if p.nth_at(n, LEFT_PAREN) {
            let mut depth = 0usize;
            loop {
                match p.nth(n) {
                    LEFT_PAREN => depth += 1,
                    RIGHT_PAREN => depth -= 1,
                    EOF => return false,
                    _ => {}
                }
                n += 1;
                if depth == 0 {
                    break;
                }
            }
        }
    }
    p.nth_at(n, kind)
}

pub(crate) fn type_params(p: &mut Parser<'_>) {
    let m = p.start();
    super::delimited(p, LT, GT, COMMA, "expected type parameter", TYPE_FIRST, type_param);
    m.complete(p, TYPE_PARAM_LIST);
}

fn type_param(p: &mut Parser<'_>) -> bool {
    let m = p.start();
    modifiers::type_annotations(p);
    if !p.at(NAME) {
        p.error(format!("expected type parameter, found {}", p.current()));
        m.abandon(p);
        return false;
    }
    p.bump(NAME);

    if p.at(EXTENDS_KW) {
        let bound = p.start();
        p.bump(EXTENDS_KW);
        type_(p);
        while p.eat(AMP) {
            type_(p);
        }
        bound.complete(p, TYPE_BOUND);
    }
    m.complete(p, TYPE_PARAM);
    true
}

/// `extends A, B`, `implements I`, `permits X, Y` or `throws E`.
pub(crate) fn clause(p: &mut Parser<'_>, keyword: SyntaxKind, kind: SyntaxKind) {
    let m = p.start();
    if keyword.is_contextual_keyword() {
        p.bump_remap(keyword);
    } else {
        p.bump(keyword);
    }
    loop {
        type_(p);
        if !p.eat(COMMA) {
            break;
        }
    }
    m.complete(p, kind);
}

/// `A & B` in a cast.
pub(crate) fn intersection_type(p: &mut Parser<'_>) {
    let Some(ty) = type_(p) else {
        return;
    };
    if p.at(AMP) {
        let m = ty.precede(p);
        while p.eat(AMP) {
            type_(p);
        }
        m.complete(p, INTERSECTION_TYPE);
    }
}

/// `A | B` in a catch parameter.
pub(crate) fn union_type(p: &mut Parser<'_>) {
    let Some(ty) = type_(p) else {
        return;
    };
    if p.at(PIPE) {
        let m = ty.precede(p);
        while p.eat(PIPE) {
            type_(p);
        }
        m.complete(p, UNION_TYPE);
    }
}
