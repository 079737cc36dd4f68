use kopi_syntax::SyntaxKind::{self, *};
use kopi_syntax::SyntaxSet;

use super::resolver::{self, ParenKind, PatternKind};
use super::{delimited, modifiers, patterns, stmts, types};
use crate::parser::{CompletedMarker, Marker, Parser, Restrictions};

pub(crate) const EXPR_FIRST: SyntaxSet = SyntaxSet::new([
    INT_LITERAL,
    FLOAT_LITERAL,
    CHAR_LITERAL,
    STRING_LITERAL,
    TEXT_BLOCK,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,
    NAME,
    LEFT_PAREN,
    BANG,
    TILDE,
    PLUS,
    MINUS,
    PLUS_PLUS,
    MINUS_MINUS,
    THIS_KW,
    SUPER_KW,
    NEW_KW,
    SWITCH_KW,
])
.union(&types::PRIMITIVE_TYPES)
.with(VOID_KW);

/// Tokens a missing expression is not allowed to swallow.
const EXPR_RECOVERY: SyntaxSet = SyntaxSet::new([
    SEMICOLON,
    COMMA,
    COLON,
    ARROW,
    RIGHT_PAREN,
    RIGHT_BRACKET,
    LEFT_BRACE,
    RIGHT_BRACE,
])
.union(&stmts::STMT_KEYWORDS);

// Binding powers, loosest first.
const ASSIGN: u8 = 1;
const TERNARY: u8 = 2;
const OR: u8 = 3;
pub(crate) const AND: u8 = 4;
const BIT_OR: u8 = 5;
const BIT_XOR: u8 = 6;
const BIT_AND: u8 = 7;
const EQUALITY: u8 = 8;
const RELATIONAL: u8 = 9;
const SHIFT: u8 = 10;
const ADDITIVE: u8 = 11;
const MULTIPLICATIVE: u8 = 12;

pub(crate) fn expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    expr_bp(p, ASSIGN)
}

/// Everything except assignment: annotation values and switch labels.
pub(crate) fn conditional_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    expr_bp(p, TERNARY)
}

pub(crate) fn expr_bp(p: &mut Parser<'_>, min_bp: u8) -> Option<CompletedMarker> {
    p.nested(|p| {
        let mut lhs = unary_expr(p)?;

        while let Some((op, n_raw, bp)) = current_op(p) {
            if bp < min_bp {
                break;
            }

            let m = lhs.precede(p);
            lhs = match op {
                INSTANCEOF_KW => {
                    p.bump(INSTANCEOF_KW);
                    instanceof_target(p);
                    m.complete(p, INSTANCEOF_EXPR)
                }
                QUESTION => {
                    p.bump(QUESTION);
                    expr(p);
                    p.expect(COLON);
                    expr_bp(p, TERNARY);
                    m.complete(p, CONDITIONAL_EXPR)
                }
                _ if bp == ASSIGN => {
                    p.bump_composite(op, n_raw);
                    expr_bp(p, ASSIGN);
                    m.complete(p, ASSIGN_EXPR)
                }
                _ => {
                    p.bump_composite(op, n_raw);
                    expr_bp(p, bp + 1);
                    m.complete(p, BINARY_EXPR)
                }
            };
        }

        Some(lhs)
    })
}

/// The operator at the cursor: its kind, how many raw tokens it spans and
/// its binding power.
fn current_op(p: &Parser<'_>) -> Option<(SyntaxKind, u8, u8)> {
    let kind = p.current();
    let bp = match kind {
        GT => return Some(angle_op(p)),
        EQ | PLUS_EQ | MINUS_EQ | STAR_EQ | SLASH_EQ | PERCENT_EQ | AMP_EQ | PIPE_EQ | CARET_EQ
        | SHL_EQ | SHR_EQ | USHR_EQ => ASSIGN,
        QUESTION => TERNARY,
        PIPE_PIPE => OR,
        AMP_AMP => AND,
        PIPE => BIT_OR,
        CARET => BIT_XOR,
        AMP => BIT_AND,
        EQ_EQ | BANG_EQ => EQUALITY,
        LT | LT_EQ | GT_EQ | INSTANCEOF_KW => RELATIONAL,
        SHL | SHR | USHR => SHIFT,
        PLUS | MINUS => ADDITIVE,
        STAR | SLASH | PERCENT => MULTIPLICATIVE,
        _ => return None,
    };
    Some((kind, 1, bp))
}

/// The tokenizer never merges `>`, so `>>`, `>>>`, `>=`, `>>=` and `>>>=`
/// are assembled here from joint tokens.
fn angle_op(p: &Parser<'_>) -> (SyntaxKind, u8, u8) {
    let joint = |n: usize, kind: SyntaxKind| p.nth_at(n, kind) && p.is_joint(n - 1);

    if joint(1, GT) {
        if joint(2, GT) {
            if joint(3, EQ) {
                return (USHR_EQ, 4, ASSIGN);
            }
            return (USHR, 3, SHIFT);
        }
        if joint(2, EQ) {
            return (SHR_EQ, 3, ASSIGN);
        }
        return (SHR, 2, SHIFT);
    }
    if joint(1, EQ) {
        return (GT_EQ, 2, RELATIONAL);
    }
    (GT, 1, RELATIONAL)
}

fn instanceof_target(p: &mut Parser<'_>) {
    match resolver::pattern_kind(p) {
        Some(PatternKind::Type | PatternKind::Record) => {
            patterns::pattern(p);
        }
        None => {
            if p.at(FINAL_KW) {
                p.error("`final` requires a pattern binding");
            }
            types::type_(p);
        }
    }
}

fn unary_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.current() {
        PLUS | MINUS | PLUS_PLUS | MINUS_MINUS | BANG | TILDE => {
            let m = p.start();
            p.bump_any();
            p.nested(unary_expr);
            m.complete(p, PREFIX_EXPR).into()
        }
        LEFT_PAREN => match resolver::paren_kind(p) {
            ParenKind::Lambda => lambda_expr(p).into(),
            ParenKind::Cast => cast_expr(p).into(),
            ParenKind::Paren => {
                let paren = paren_expr(p);
                postfix_expr(p, paren).into()
            }
        },
        _ => {
            let primary = primary_expr(p)?;
            if primary.kind() == LAMBDA_EXPR {
                return primary.into();
            }
            postfix_expr(p, primary).into()
        }
    }
}

fn cast_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.bump(LEFT_PAREN);
    types::intersection_type(p);
    p.expect(RIGHT_PAREN);
    p.nested(unary_expr);
    m.complete(p, CAST_EXPR)
}

fn paren_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.bump(LEFT_PAREN);
    p.with_restrictions(Restrictions::default(), expr);
    p.expect(RIGHT_PAREN);
    m.complete(p, PAREN_EXPR)
}

fn postfix_expr(p: &mut Parser<'_>, mut lhs: CompletedMarker) -> CompletedMarker {
    loop {
        lhs = match p.current() {
            DOT => dot_suffix(p, lhs),
            LEFT_BRACKET => {
                let m = lhs.precede(p);
                p.bump(LEFT_BRACKET);
                p.with_restrictions(Restrictions::default(), expr);
                p.expect(RIGHT_BRACKET);
                m.complete(p, ARRAY_ACCESS)
            }
            COLON_COLON => method_ref(p, lhs),
            _ => break,
        };
    }

    // Nothing but further `++`/`--` may follow a postfix operator.
    while matches!(p.current(), PLUS_PLUS | MINUS_MINUS) {
        let m = lhs.precede(p);
        p.bump_any();
        lhs = m.complete(p, POSTFIX_EXPR);
    }
    lhs
}

fn dot_suffix(p: &mut Parser<'_>, lhs: CompletedMarker) -> CompletedMarker {
    let m = lhs.precede(p);
    p.bump(DOT);
    match p.current() {
        NAME => {
            p.bump(NAME);
            if p.at(LEFT_PAREN) {
                arg_list(p);
                return m.complete(p, METHOD_CALL);
            }
            m.complete(p, FIELD_ACCESS)
        }
        LT => {
            types::type_args(p);
            if matches!(p.current(), NAME | THIS_KW | SUPER_KW) {
                p.bump_any();
            } else {
                p.error(format!("expected method name, found {}", p.current()));
            }
            if p.at(LEFT_PAREN) {
                arg_list(p);
            } else {
                p.error(format!("expected `(`, found {}", p.current()));
            }
            m.complete(p, METHOD_CALL)
        }
        THIS_KW => {
            p.bump(THIS_KW);
            m.complete(p, THIS_EXPR)
        }
        SUPER_KW => {
            p.bump(SUPER_KW);
            if p.at(LEFT_PAREN) {
                arg_list(p);
                return m.complete(p, METHOD_CALL);
            }
            m.complete(p, SUPER_EXPR)
        }
        NEW_KW => new_expr(p, m),
        CLASS_KW => {
            p.bump(CLASS_KW);
            m.complete(p, CLASS_LITERAL)
        }
        _ => {
            p.error(format!("expected identifier after `.`, found {}", p.current()));
            m.complete(p, FIELD_ACCESS)
        }
    }
}

/// `recv::name`, `Type::new`, `recv::<T>name`.
fn method_ref(p: &mut Parser<'_>, lhs: CompletedMarker) -> CompletedMarker {
    let m = lhs.precede(p);
    p.bump(COLON_COLON);
    if p.at(LT) {
        types::type_args(p);
    }
    if p.at(NAME) || p.at(NEW_KW) {
        p.bump_any();
    } else {
        p.error(format!("expected method name or `new`, found {}", p.current()));
    }
    m.complete(p, METHOD_REF)
}

pub(crate) fn arg_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.with_restrictions(Restrictions::default(), |p| {
        delimited(p, LEFT_PAREN, RIGHT_PAREN, COMMA, "expected argument", EXPR_FIRST, |p| {
            expr(p).is_some()
        });
    });
    m.complete(p, ARG_LIST);
}

fn primary_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.current() {
        kind if kind.is_literal() => {
            let m = p.start();
            p.bump_any();
            m.complete(p, LITERAL).into()
        }
        NAME => name_expr(p),
        THIS_KW | SUPER_KW => {
            let kind = p.current();
            let m = p.start();
            p.bump(kind);
            if p.at(LEFT_PAREN) {
                arg_list(p);
                return m.complete(p, METHOD_CALL).into();
            }
            let node = if kind == THIS_KW { THIS_EXPR } else { SUPER_EXPR };
            m.complete(p, node).into()
        }
        LEFT_PAREN => paren_expr(p).into(),
        NEW_KW => {
            let m = p.start();
            new_expr(p, m).into()
        }
        SWITCH_KW => patterns::switch_expr(p).into(),
        // `<T>this(...)` in a constructor body.
        LT => {
            let m = p.start();
            types::type_args(p);
            if p.at(THIS_KW) || p.at(SUPER_KW) {
                p.bump_any();
            } else {
                p.error(format!("expected `this` or `super`, found {}", p.current()));
            }
            if p.at(LEFT_PAREN) {
                arg_list(p);
            }
            m.complete(p, METHOD_CALL).into()
        }
        kind if kind == VOID_KW || kind.is_primitive_type() => {
            let ty = types::result_type(p)?;
            type_literal_suffix(p, ty).into()
        }
        _ => {
            p.expect_any(EXPR_FIRST);
            let message = format!("expected expression, found {}", p.current());
            if p.at(EOF) || EXPR_RECOVERY.contains(p.current()) {
                p.error(message);
            } else {
                p.err_and_bump(message);
            }
            None
        }
    }
}

fn name_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    if p.nth_at(1, ARROW) && !p.restrictions().no_lambda {
        return lambda_expr(p).into();
    }

    if p.nth_at(1, LT) {
        let generic = p.speculate("generic method reference", |p| {
            let ty = types::type_(p)?;
            p.at(COLON_COLON).then_some(ty)
        });
        if let Some(ty) = generic {
            return method_ref(p, ty).into();
        }
    }

    if (p.nth_at(1, LEFT_BRACKET) || p.nth_at(1, DOT)) && resolver::at_array_type_literal(p) {
        let ty = types::type_(p)?;
        return type_literal_suffix(p, ty).into();
    }

    let m = p.start();
    p.bump(NAME);
    if p.at(LEFT_PAREN) {
        arg_list(p);
        return m.complete(p, METHOD_CALL).into();
    }
    m.complete(p, NAME_EXPR).into()
}

/// `int.class`, `String[].class`, `int[]::new`.
fn type_literal_suffix(p: &mut Parser<'_>, ty: CompletedMarker) -> CompletedMarker {
    if p.at(DOT) && p.nth_at(1, CLASS_KW) {
        let m = ty.precede(p);
        p.bump(DOT);
        p.bump(CLASS_KW);
        return m.complete(p, CLASS_LITERAL);
    }
    if p.at(COLON_COLON) {
        return method_ref(p, ty);
    }
    p.error(format!("expected `.class` or `::`, found {}", p.current()));
    ty
}

/// `new` with an already started marker, so `outer.new Inner()` can share it.
fn new_expr(p: &mut Parser<'_>, m: Marker) -> CompletedMarker {
    p.bump(NEW_KW);
    if p.at(LT) {
        types::type_args(p);
    }
    if types::non_array_type(p).is_none() {
        return m.complete(p, NEW_EXPR);
    }

    if p.at(LEFT_BRACKET) {
        while p.at(LEFT_BRACKET) && !p.nth_at(1, RIGHT_BRACKET) {
            let dim = p.start();
            p.bump(LEFT_BRACKET);
            p.with_restrictions(Restrictions::default(), expr);
            p.expect(RIGHT_BRACKET);
            dim.complete(p, DIM_EXPR);
        }
        types::opt_dims(p);
        if p.at(LEFT_BRACE) {
            array_initializer(p);
        }
        return m.complete(p, ARRAY_CREATION);
    }

    if p.at(LEFT_PAREN) {
        arg_list(p);
    } else {
        p.error(format!("expected `(` or `[`, found {}", p.current()));
    }
    if p.at(LEFT_BRACE) {
        super::items::class_body(p, CLASS_BODY);
    }
    m.complete(p, NEW_EXPR)
}

pub(crate) fn variable_initializer(p: &mut Parser<'_>) -> bool {
    if p.at(LEFT_BRACE) {
        array_initializer(p);
        return true;
    }
    expr(p).is_some()
}

pub(crate) fn array_initializer(p: &mut Parser<'_>) {
    p.nested(|p| {
        let m = p.start();
        p.with_restrictions(Restrictions::default(), |p| {
            delimited(
                p,
                LEFT_BRACE,
                RIGHT_BRACE,
                COMMA,
                "expected initializer",
                EXPR_FIRST.with(LEFT_BRACE),
                variable_initializer,
            );
        });
        m.complete(p, ARRAY_INITIALIZER);
    });
}

fn lambda_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    if p.at(LEFT_PAREN) {
        lambda_param_list(p);
    } else {
        let param = p.start();
        p.bump(NAME);
        param.complete(p, LAMBDA_PARAM);
    }

    p.expect(ARROW);
    if p.at(LEFT_BRACE) {
        stmts::block(p);
    } else {
        expr(p);
    }
    m.complete(p, LAMBDA_EXPR)
}

fn lambda_param_list(p: &mut Parser<'_>) {
    let m = p.start();
    delimited(p, LEFT_PAREN, RIGHT_PAREN, COMMA, "expected lambda parameter", types::TYPE_FIRST, |p| {
        lambda_param(p);
        true
    });
    m.complete(p, LAMBDA_PARAM_LIST);
}

/// `x`, `var x`, `final String x` or `int... xs`.
fn lambda_param(p: &mut Parser<'_>) {
    let m = p.start();
    if p.at(NAME) && matches!(p.nth(1), COMMA | RIGHT_PAREN) {
        p.bump(NAME);
    } else {
        modifiers::modifiers(p);
        types::type_(p);
        p.eat(ELLIPSIS);
        p.expect(NAME);
    }
    m.complete(p, LAMBDA_PARAM);
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use crate::tests::check_expr;

    #[test]
    fn precedence_and_associativity() {
        check_expr(
            "a = b - c - d * e",
            expect![[r#"
                ASSIGN_EXPR
                  NAME_EXPR
                    NAME "a"
                  EQ "="
                  BINARY_EXPR
                    BINARY_EXPR
                      NAME_EXPR
                        NAME "b"
                      MINUS "-"
                      NAME_EXPR
                        NAME "c"
                    MINUS "-"
                    BINARY_EXPR
                      NAME_EXPR
                        NAME "d"
                      STAR "*"
                      NAME_EXPR
                        NAME "e"
                Errors:
            "#]],
        );
    }

    #[test]
    fn shift_operators_from_joint_angles() {
        check_expr(
            "x >>>= y >> 2",
            expect![[r#"
                ASSIGN_EXPR
                  NAME_EXPR
                    NAME "x"
                  USHR_EQ ">>>="
                  BINARY_EXPR
                    NAME_EXPR
                      NAME "y"
                    SHR ">>"
                    LITERAL
                      INT_LITERAL "2"
                Errors:
            "#]],
        );
    }

    #[test]
    fn separated_angles_are_not_shifts() {
        check_expr(
            "a > > b",
            expect![[r#"
                ERROR
                  BINARY_EXPR
                    NAME_EXPR
                      NAME "a"
                    GT ">"
                    ERROR
                      GT ">"
                  NAME "b"
                Errors:
                  4..5: expected expression, found `>`
                  6..7: expected end of input, found identifier
            "#]],
        );
    }

    #[test]
    fn conditional_is_right_associative() {
        check_expr(
            "a ? b : c ? d : e",
            expect![[r#"
                CONDITIONAL_EXPR
                  NAME_EXPR
                    NAME "a"
                  QUESTION "?"
                  NAME_EXPR
                    NAME "b"
                  COLON ":"
                  CONDITIONAL_EXPR
                    NAME_EXPR
                      NAME "c"
                    QUESTION "?"
                    NAME_EXPR
                      NAME "d"
                    COLON ":"
                    NAME_EXPR
                      NAME "e"
                Errors:
            "#]],
        );
    }

    #[test]
    fn cast_versus_parenthesized() {
        check_expr(
            "(int) x + (a) - b",
            expect![[r#"
                BINARY_EXPR
                  CAST_EXPR
                    LEFT_PAREN "("
                    PRIMITIVE_TYPE
                      INT_KW "int"
                    RIGHT_PAREN ")"
                    NAME_EXPR
                      NAME "x"
                  PLUS "+"
                  CAST_EXPR
                    LEFT_PAREN "("
                    CLASS_TYPE
                      NAME "a"
                    RIGHT_PAREN ")"
                    PREFIX_EXPR
                      MINUS "-"
                      NAME_EXPR
                        NAME "b"
                Errors:
            "#]],
        );
    }

    #[test]
    fn lambdas() {
        check_expr(
            "(a, b) -> x -> a",
            expect![[r#"
                LAMBDA_EXPR
                  LAMBDA_PARAM_LIST
                    LEFT_PAREN "("
                    LAMBDA_PARAM
                      NAME "a"
                    COMMA ","
                    LAMBDA_PARAM
                      NAME "b"
                    RIGHT_PAREN ")"
                  ARROW "->"
                  LAMBDA_EXPR
                    LAMBDA_PARAM
                      NAME "x"
                    ARROW "->"
                    NAME_EXPR
                      NAME "a"
                Errors:
            "#]],
        );
    }

    #[test]
    fn postfix_chain() {
        check_expr(
            "a.b(1)[0].<T>c()::d",
            expect![[r#"
                METHOD_REF
                  METHOD_CALL
                    ARRAY_ACCESS
                      METHOD_CALL
                        NAME_EXPR
                          NAME "a"
                        DOT "."
                        NAME "b"
                        ARG_LIST
                          LEFT_PAREN "("
                          LITERAL
                            INT_LITERAL "1"
                          RIGHT_PAREN ")"
                      LEFT_BRACKET "["
                      LITERAL
                        INT_LITERAL "0"
                      RIGHT_BRACKET "]"
                    DOT "."
                    TYPE_ARG_LIST
                      LT "<"
                      CLASS_TYPE
                        NAME "T"
                      GT ">"
                    NAME "c"
                    ARG_LIST
                      LEFT_PAREN "("
                      RIGHT_PAREN ")"
                  COLON_COLON "::"
                  NAME "d"
                Errors:
            "#]],
        );
    }

    #[test]
    fn generic_method_reference_and_class_literals() {
        check_expr(
            "f(List<String>::new, int[].class, a < b)",
            expect![[r#"
                METHOD_CALL
                  NAME "f"
                  ARG_LIST
                    LEFT_PAREN "("
                    METHOD_REF
                      CLASS_TYPE
                        NAME "List"
                        TYPE_ARG_LIST
                          LT "<"
                          CLASS_TYPE
                            NAME "String"
                          GT ">"
                      COLON_COLON "::"
                      NEW_KW "new"
                    COMMA ","
                    CLASS_LITERAL
                      ARRAY_TYPE
                        PRIMITIVE_TYPE
                          INT_KW "int"
                        LEFT_BRACKET "["
                        RIGHT_BRACKET "]"
                      DOT "."
                      CLASS_KW "class"
                    COMMA ","
                    BINARY_EXPR
                      NAME_EXPR
                        NAME "a"
                      LT "<"
                      NAME_EXPR
                        NAME "b"
                    RIGHT_PAREN ")"
                Errors:
            "#]],
        );
    }

    #[test]
    fn object_and_array_creation() {
        check_expr(
            "new int[n][] ",
            expect![[r#"
                ARRAY_CREATION
                  NEW_KW "new"
                  PRIMITIVE_TYPE
                    INT_KW "int"
                  DIM_EXPR
                    LEFT_BRACKET "["
                    NAME_EXPR
                      NAME "n"
                    RIGHT_BRACKET "]"
                  DIMS
                    LEFT_BRACKET "["
                    RIGHT_BRACKET "]"
                Errors:
            "#]],
        );
        check_expr(
            "outer.new Inner<>() { }",
            expect![[r#"
                NEW_EXPR
                  NAME_EXPR
                    NAME "outer"
                  DOT "."
                  NEW_KW "new"
                  CLASS_TYPE
                    NAME "Inner"
                    TYPE_ARG_LIST
                      LT "<"
                      GT ">"
                  ARG_LIST
                    LEFT_PAREN "("
                    RIGHT_PAREN ")"
                  CLASS_BODY
                    LEFT_BRACE "{"
                    RIGHT_BRACE "}"
                Errors:
            "#]],
        );
    }

    #[test]
    fn instanceof_with_patterns() {
        check_expr(
            "o instanceof Point(int x, var y) && o instanceof String s",
            expect![[r#"
                BINARY_EXPR
                  INSTANCEOF_EXPR
                    NAME_EXPR
                      NAME "o"
                    INSTANCEOF_KW "instanceof"
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
                          CLASS_TYPE
                            NAME "var"
                          NAME "y"
                        RIGHT_PAREN ")"
                  AMP_AMP "&&"
                  INSTANCEOF_EXPR
                    NAME_EXPR
                      NAME "o"
                    INSTANCEOF_KW "instanceof"
                    TYPE_PATTERN
                      CLASS_TYPE
                        NAME "String"
                      NAME "s"
                Errors:
            "#]],
        );
    }

    #[test]
    fn missing_operand_is_reported_once() {
        check_expr(
            "a + ",
            expect![[r#"
                BINARY_EXPR
                  NAME_EXPR
                    NAME "a"
                  PLUS "+"
                Errors:
                  4..4: expected expression, found end of input
            "#]],
        );
    }

    #[test]
    fn empty_and_comment_only_input() {
        check_expr(
            "",
            expect![[r#"
                ERROR
                Errors:
                  0..0: expected expression, found end of input
            "#]],
        );
        check_expr(
            "  // c",
            expect![[r#"
                ERROR
                Errors:
                  6..6: expected expression, found end of input
            "#]],
        );
    }
}
