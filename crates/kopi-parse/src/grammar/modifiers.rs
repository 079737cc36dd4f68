use kopi_syntax::SyntaxKind::*;
use kopi_syntax::SyntaxSet;

use super::exprs;
use crate::parser::Parser;

pub(crate) const MODIFIER_KEYWORDS: SyntaxSet = SyntaxSet::new([
    PUBLIC_KW,
    PROTECTED_KW,
    PRIVATE_KW,
    STATIC_KW,
    ABSTRACT_KW,
    FINAL_KW,
    NATIVE_KW,
    SYNCHRONIZED_KW,
    TRANSIENT_KW,
    VOLATILE_KW,
    STRICTFP_KW,
    DEFAULT_KW,
]);

/// Parses a `MODIFIER_LIST` if any modifier or annotation is present.
pub(crate) fn modifiers(p: &mut Parser<'_>) -> bool {
    let m = p.start();
    let mut any = false;
    loop {
        if at_annotation(p) {
            annotation(p);
        } else if MODIFIER_KEYWORDS.contains(p.current()) {
            p.bump_any();
        } else if at_sealed(p) {
            p.bump_remap(SEALED_KW);
        } else if at_non_sealed(p) {
            p.bump_composite(NON_SEALED_KW, 3);
        } else {
            break;
        }
        any = true;
    }

    if any {
        m.complete(p, MODIFIER_LIST);
    } else {
        m.abandon(p);
    }
    any
}

/// Annotations in type position, attached directly to the type node.
pub(crate) fn type_annotations(p: &mut Parser<'_>) -> bool {
    let mut any = false;
    while at_annotation(p) {
        annotation(p);
        any = true;
    }
    any
}

fn at_annotation(p: &mut Parser<'_>) -> bool {
    p.at(AT) && !p.nth_at(1, INTERFACE_KW)
}

/// `sealed` is only a modifier when another modifier or the declaration
/// keyword follows.
fn at_sealed(p: &Parser<'_>) -> bool {
    if !p.nth_at_contextual(0, SEALED_KW) {
        return false;
    }
    let next = p.nth(1);
    MODIFIER_KEYWORDS.contains(next)
        || matches!(next, CLASS_KW | INTERFACE_KW | AT)
        || (next == NAME && p.nth_text(1) == "non")
}

/// `non-sealed` arrives as three joint tokens.
fn at_non_sealed(p: &Parser<'_>) -> bool {
    p.current() == NAME
        && p.nth_text(0) == "non"
        && p.nth_at(1, MINUS)
        && p.nth_at_contextual(2, SEALED_KW)
        && p.is_joint(0)
        && p.is_joint(1)
}

pub(crate) fn annotation(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump(AT);
    qualified_name(p);
    if p.at(LEFT_PAREN) {
        annotation_args(p);
    }
    m.complete(p, ANNOTATION);
}

fn annotation_args(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump(LEFT_PAREN);
    p.with_restrictions(Default::default(), |p| {
        if p.at(RIGHT_PAREN) {
            return;
        }
        if p.at(NAME) && p.nth_at(1, EQ) {
            loop {
                element_value_pair(p);
                if !p.eat(COMMA) {
                    break;
                }
            }
        } else {
            element_value(p);
        }
    });
    p.expect(RIGHT_PAREN);
    m.complete(p, ANNOTATION_ARG_LIST);
}

fn element_value_pair(p: &mut Parser<'_>) {
    let m = p.start();
    p.expect(NAME);
    p.expect(EQ);
    element_value(p);
    m.complete(p, ELEMENT_VALUE_PAIR);
}

pub(crate) fn element_value(p: &mut Parser<'_>) -> bool {
    if at_annotation(p) {
        annotation(p);
        return true;
    }
    if !p.at(LEFT_BRACE) {
        return exprs::conditional_expr(p).is_some();
    }

    p.nested(|p| {
        let m = p.start();
        super::delimited(
            p,
            LEFT_BRACE,
            RIGHT_BRACE,
            COMMA,
            "expected element value",
            exprs::EXPR_FIRST.union(&SyntaxSet::new([AT, LEFT_BRACE])),
            element_value,
        );
        m.complete(p, ELEMENT_VALUE_ARRAY);
        true
    })
}

/// `a.b.c` as one `QUALIFIED_NAME`.
pub(crate) fn qualified_name(p: &mut Parser<'_>) {
    if !p.at(NAME) {
        p.error(format!("expected identifier, found {}", p.current()));
        return;
    }
    let m = p.start();
    p.bump(NAME);
    while p.at(DOT) && p.nth_at(1, NAME) {
        p.bump(DOT);
        p.bump(NAME);
    }
    m.complete(p, QUALIFIED_NAME);
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use crate::tests::check;

    #[test]
    fn sealed_hierarchy_modifiers() {
        check(
            "public sealed interface S permits A {} non-sealed class A implements S {}",
            expect![[r#"
                COMPILATION_UNIT
                  INTERFACE_DECL
                    MODIFIER_LIST
                      PUBLIC_KW "public"
                      SEALED_KW "sealed"
                    INTERFACE_KW "interface"
                    NAME "S"
                    PERMITS_CLAUSE
                      PERMITS_KW "permits"
                      CLASS_TYPE
                        NAME "A"
                    INTERFACE_BODY
                      LEFT_BRACE "{"
                      RIGHT_BRACE "}"
                  CLASS_DECL
                    MODIFIER_LIST
                      NON_SEALED_KW "non-sealed"
                    CLASS_KW "class"
                    NAME "A"
                    IMPLEMENTS_CLAUSE
                      IMPLEMENTS_KW "implements"
                      CLASS_TYPE
                        NAME "S"
                    CLASS_BODY
                      LEFT_BRACE "{"
                      RIGHT_BRACE "}"
                  EOF ""
                Errors:
            "#]],
        );
    }

    #[test]
    fn annotation_arguments() {
        check(
            "@Retention(value = RUNTIME) @A({1, 2}) class C {}",
            expect![[r#"
                COMPILATION_UNIT
                  CLASS_DECL
                    MODIFIER_LIST
                      ANNOTATION
                        AT "@"
                        QUALIFIED_NAME
                          NAME "Retention"
                        ANNOTATION_ARG_LIST
                          LEFT_PAREN "("
                          ELEMENT_VALUE_PAIR
                            NAME "value"
                            EQ "="
                            NAME_EXPR
                              NAME "RUNTIME"
                          RIGHT_PAREN ")"
                      ANNOTATION
                        AT "@"
                        QUALIFIED_NAME
                          NAME "A"
                        ANNOTATION_ARG_LIST
                          LEFT_PAREN "("
                          ELEMENT_VALUE_ARRAY
                            LEFT_BRACE "{"
                            LITERAL
                              INT_LITERAL "1"
                            COMMA ","
                            LITERAL
                              INT_LITERAL "2"
                            RIGHT_BRACE "}"
                          RIGHT_PAREN ")"
                    CLASS_KW "class"
                    NAME "C"
                    CLASS_BODY
                      LEFT_BRACE "{"
                      RIGHT_BRACE "}"
                  EOF ""
                Errors:
            "#]],
        );
    }
}
