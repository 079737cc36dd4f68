use kopi_syntax::SyntaxKind::{self, *};
use kopi_syntax::SyntaxSet;

use super::{delimited, exprs, list_until, modifiers, modules, semicolon, stmts, types};
use crate::parser::{Marker, Parser};

const ITEM_RECOVERY: SyntaxSet = modifiers::MODIFIER_KEYWORDS.union(&SyntaxSet::new([
    CLASS_KW,
    INTERFACE_KW,
    ENUM_KW,
    AT,
    IMPORT_KW,
    PACKAGE_KW,
    SEMICOLON,
]));

const MEMBER_RECOVERY: SyntaxSet = modifiers::MODIFIER_KEYWORDS
    .union(&types::PRIMITIVE_TYPES)
    .union(&SyntaxSet::new([VOID_KW, CLASS_KW, INTERFACE_KW, ENUM_KW, AT, SEMICOLON, LT]));

const PARAM_FIRST: SyntaxSet = types::TYPE_FIRST.with(FINAL_KW);

pub(crate) fn compilation_unit(p: &mut Parser<'_>) {
    let m = p.start();
    while !p.at(EOF) {
        let before = p.position();
        top_level_item(p);
        if p.position() == before {
            p.err_and_bump(format!("expected a declaration, found {}", p.current()));
        }
    }
    p.bump(EOF);
    m.complete(p, COMPILATION_UNIT);
}

fn top_level_item(p: &mut Parser<'_>) {
    let m = p.start();
    let has_modifiers = modifiers::modifiers(p);
    match p.current() {
        PACKAGE_KW => package_decl(p, m),
        IMPORT_KW if !has_modifiers => import_decl(p, m),
        SEMICOLON if !has_modifiers => {
            p.bump(SEMICOLON);
            m.complete(p, EMPTY_DECL);
        }
        _ if modules::at_module_decl(p) => modules::module_decl(p, m),
        _ => type_decl_rest(p, m),
    }
}

fn package_decl(p: &mut Parser<'_>, m: Marker) {
    p.bump(PACKAGE_KW);
    modifiers::qualified_name(p);
    semicolon(p, ITEM_RECOVERY);
    m.complete(p, PACKAGE_DECL);
}

/// `import a.b.C;`, `import a.b.*;` and their `static` forms.
fn import_decl(p: &mut Parser<'_>, m: Marker) {
    p.bump(IMPORT_KW);
    p.eat(STATIC_KW);
    modifiers::qualified_name(p);
    if p.at(DOT) && p.nth_at(1, STAR) {
        p.bump(DOT);
        p.bump(STAR);
    }
    semicolon(p, ITEM_RECOVERY);
    m.complete(p, IMPORT_DECL);
}

/// A class, interface, enum, record or annotation type declaration with
/// its modifiers. Also used for local and member type declarations.
pub(crate) fn type_decl(p: &mut Parser<'_>) {
    let m = p.start();
    modifiers::modifiers(p);
    type_decl_rest(p, m);
}

fn type_decl_rest(p: &mut Parser<'_>, m: Marker) {
    match p.current() {
        CLASS_KW => class_decl(p, m),
        INTERFACE_KW => interface_decl(p, m),
        ENUM_KW => enum_decl(p, m),
        AT if p.nth_at(1, INTERFACE_KW) => annotation_type_decl(p, m),
        NAME if at_record_decl(p) => record_decl(p, m),
        _ => {
            p.error_recover(
                format!(
                    "expected a class, interface, enum or record declaration, found {}",
                    p.current()
                ),
                ITEM_RECOVERY,
            );
            m.abandon(p);
        }
    }
}

/// `record` only starts a declaration when a name and a header follow.
fn at_record_decl(p: &Parser<'_>) -> bool {
    p.nth_at_contextual(0, RECORD_KW) && p.nth_at(1, NAME) && matches!(p.nth(2), LEFT_PAREN | LT)
}

fn at_type_decl(p: &Parser<'_>) -> bool {
    match p.current() {
        CLASS_KW | INTERFACE_KW | ENUM_KW => true,
        AT => p.nth_at(1, INTERFACE_KW),
        NAME => at_record_decl(p),
        _ => false,
    }
}

/// Optional `extends`, `implements` and `permits` clauses. A clause out of
/// the given order, or repeated, is reported but still gets its own node.
fn clauses(p: &mut Parser<'_>, allowed: &[(SyntaxKind, SyntaxKind)]) {
    let mut last = None;
    while let Some(index) = allowed.iter().position(|&(keyword, _)| at_clause(p, keyword)) {
        let (keyword, kind) = allowed[index];
        if last.is_some_and(|last| index <= last) {
            p.error(format!("{keyword} clause is out of order"));
        }
        types::clause(p, keyword, kind);
        last = last.max(Some(index));
    }
}

fn at_clause(p: &mut Parser<'_>, keyword: SyntaxKind) -> bool {
    if keyword.is_contextual_keyword() { p.at_contextual(keyword) } else { p.at(keyword) }
}

fn opt_type_params(p: &mut Parser<'_>) {
    if p.at(LT) {
        types::type_params(p);
    }
}

fn class_decl(p: &mut Parser<'_>, m: Marker) {
    p.bump(CLASS_KW);
    p.expect(NAME);
    opt_type_params(p);
    clauses(
        p,
        &[
            (EXTENDS_KW, EXTENDS_CLAUSE),
            (IMPLEMENTS_KW, IMPLEMENTS_CLAUSE),
            (PERMITS_KW, PERMITS_CLAUSE),
        ],
    );
    class_body(p, CLASS_BODY);
    m.complete(p, CLASS_DECL);
}

fn interface_decl(p: &mut Parser<'_>, m: Marker) {
    p.bump(INTERFACE_KW);
    p.expect(NAME);
    opt_type_params(p);
    clauses(p, &[(EXTENDS_KW, EXTENDS_CLAUSE), (PERMITS_KW, PERMITS_CLAUSE)]);
    class_body(p, INTERFACE_BODY);
    m.complete(p, INTERFACE_DECL);
}

fn enum_decl(p: &mut Parser<'_>, m: Marker) {
    p.bump(ENUM_KW);
    p.expect(NAME);
    clauses(p, &[(IMPLEMENTS_KW, IMPLEMENTS_CLAUSE)]);
    class_body(p, ENUM_BODY);
    m.complete(p, ENUM_DECL);
}

fn record_decl(p: &mut Parser<'_>, m: Marker) {
    p.bump_remap(RECORD_KW);
    p.expect(NAME);
    opt_type_params(p);
    if p.at(LEFT_PAREN) {
        let header = p.start();
        delimited(
            p,
            LEFT_PAREN,
            RIGHT_PAREN,
            COMMA,
            "expected record component",
            PARAM_FIRST,
            |p| formal_param(p, RECORD_COMPONENT),
        );
        header.complete(p, RECORD_HEADER);
    } else {
        p.error(format!("expected record header, found {}", p.current()));
    }
    clauses(p, &[(IMPLEMENTS_KW, IMPLEMENTS_CLAUSE)]);
    class_body(p, CLASS_BODY);
    m.complete(p, RECORD_DECL);
}

fn annotation_type_decl(p: &mut Parser<'_>, m: Marker) {
    p.bump(AT);
    p.bump(INTERFACE_KW);
    p.expect(NAME);
    class_body(p, ANNOTATION_TYPE_BODY);
    m.complete(p, ANNOTATION_TYPE_DECL);
}

/// The braced body of a type declaration or anonymous class; `kind` picks
/// the body node and decides which members are allowed.
pub(crate) fn class_body(p: &mut Parser<'_>, kind: SyntaxKind) {
    if !p.at(LEFT_BRACE) {
        p.error_recover(format!("expected `{{`, found {}", p.current()), ITEM_RECOVERY.with(LEFT_BRACE));
        if !p.at(LEFT_BRACE) {
            return;
        }
    }

    p.nested(|p| {
        let m = p.start();
        p.bump(LEFT_BRACE);
        if kind == ENUM_BODY {
            enum_constants(p);
        }
        list_until(p, RIGHT_BRACE, |p| member(p, kind));
        p.expect(RIGHT_BRACE);
        m.complete(p, kind);
    });
}

fn enum_constants(p: &mut Parser<'_>) {
    while p.at(NAME) || p.at(AT) {
        enum_constant(p);
        if !p.eat(COMMA) {
            break;
        }
    }
    if !p.at(RIGHT_BRACE) {
        p.expect(SEMICOLON);
    }
}

fn enum_constant(p: &mut Parser<'_>) {
    let m = p.start();
    modifiers::modifiers(p);
    p.expect(NAME);
    if p.at(LEFT_PAREN) {
        exprs::arg_list(p);
    }
    if p.at(LEFT_BRACE) {
        class_body(p, CLASS_BODY);
    }
    m.complete(p, ENUM_CONSTANT);
}

fn member(p: &mut Parser<'_>, body: SyntaxKind) {
    if p.at(SEMICOLON) {
        let m = p.start();
        p.bump(SEMICOLON);
        m.complete(p, EMPTY_DECL);
        return;
    }
    if p.at(LEFT_BRACE) || (p.at(STATIC_KW) && p.nth_at(1, LEFT_BRACE)) {
        let m = p.start();
        p.eat(STATIC_KW);
        stmts::block(p);
        m.complete(p, INITIALIZER_BLOCK);
        return;
    }

    let m = p.start();
    modifiers::modifiers(p);
    match p.current() {
        _ if at_type_decl(p) => type_decl_rest(p, m),
        LT => {
            types::type_params(p);
            if p.at(NAME) && p.nth_at(1, LEFT_PAREN) {
                constructor_decl(p, m);
            } else {
                types::result_type(p);
                p.expect(NAME);
                method_rest(p, m, body);
            }
        }
        NAME if p.nth_at(1, LEFT_PAREN) => constructor_decl(p, m),
        NAME if p.nth_at(1, LEFT_BRACE) => {
            p.bump(NAME);
            stmts::block(p);
            m.complete(p, COMPACT_CONSTRUCTOR_DECL);
        }
        kind if kind == VOID_KW || types::TYPE_FIRST.contains(kind) => method_or_field(p, m, body),
        _ => {
            p.error_recover(
                format!("expected a member declaration, found {}", p.current()),
                MEMBER_RECOVERY,
            );
            m.abandon(p);
        }
    }
}

fn method_or_field(p: &mut Parser<'_>, m: Marker, body: SyntaxKind) {
    types::result_type(p);
    if p.at(NAME) && p.nth_at(1, LEFT_PAREN) {
        p.bump(NAME);
        method_rest(p, m, body);
        return;
    }

    super::variable_declarators(p);
    semicolon(p, MEMBER_RECOVERY);
    m.complete(p, FIELD_DECL);
}

/// Everything after the method name.
fn method_rest(p: &mut Parser<'_>, m: Marker, body: SyntaxKind) {
    param_list(p);
    types::opt_dims(p);
    clauses(p, &[(THROWS_KW, THROWS_CLAUSE)]);

    let kind = if body == ANNOTATION_TYPE_BODY {
        if p.at(DEFAULT_KW) {
            let default = p.start();
            p.bump(DEFAULT_KW);
            modifiers::element_value(p);
            default.complete(p, DEFAULT_VALUE);
        }
        ANNOTATION_METHOD_DECL
    } else {
        METHOD_DECL
    };

    if p.at(LEFT_BRACE) {
        stmts::block(p);
    } else if !p.eat(SEMICOLON) {
        p.error_recover(format!("expected method body or `;`, found {}", p.current()), MEMBER_RECOVERY);
    }
    m.complete(p, kind);
}

fn constructor_decl(p: &mut Parser<'_>, m: Marker) {
    p.bump(NAME);
    param_list(p);
    clauses(p, &[(THROWS_KW, THROWS_CLAUSE)]);
    stmts::block(p);
    m.complete(p, CONSTRUCTOR_DECL);
}

fn param_list(p: &mut Parser<'_>) {
    if !p.at(LEFT_PAREN) {
        p.error(format!("expected `(`, found {}", p.current()));
        return;
    }
    let m = p.start();
    delimited(p, LEFT_PAREN, RIGHT_PAREN, COMMA, "expected parameter", PARAM_FIRST, |p| {
        formal_param(p, PARAM)
    });
    m.complete(p, PARAM_LIST);
}

/// A method parameter, receiver parameter or record component.
fn formal_param(p: &mut Parser<'_>, kind: SyntaxKind) -> bool {
    let m = p.start();
    modifiers::modifiers(p);
    if types::type_(p).is_none() {
        m.abandon(p);
        return false;
    }

    if kind == PARAM {
        if p.at(THIS_KW) {
            p.bump(THIS_KW);
            m.complete(p, RECEIVER_PARAM);
            return true;
        }
        if p.at(NAME) && p.nth_at(1, DOT) && p.nth_at(2, THIS_KW) {
            p.bump(NAME);
            p.bump(DOT);
            p.bump(THIS_KW);
            m.complete(p, RECEIVER_PARAM);
            return true;
        }
    }

    // `String @NonNull ... rest`
    if p.at(AT) || p.at(ELLIPSIS) {
        modifiers::type_annotations(p);
        p.expect(ELLIPSIS);
    }
    p.expect(NAME);
    types::opt_dims(p);
    m.complete(p, kind);
    true
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use crate::tests::check;

    #[test]
    fn package_imports_and_empty_declarations() {
        check(
            "package a.b; import static java.util.Map.*; import x.Y;;",
            expect![[r#"
                COMPILATION_UNIT
                  PACKAGE_DECL
                    PACKAGE_KW "package"
                    QUALIFIED_NAME
                      NAME "a"
                      DOT "."
                      NAME "b"
                    SEMICOLON ";"
                  IMPORT_DECL
                    IMPORT_KW "import"
                    STATIC_KW "static"
                    QUALIFIED_NAME
                      NAME "java"
                      DOT "."
                      NAME "util"
                      DOT "."
                      NAME "Map"
                    DOT "."
                    STAR "*"
                    SEMICOLON ";"
                  IMPORT_DECL
                    IMPORT_KW "import"
                    QUALIFIED_NAME
                      NAME "x"
                      DOT "."
                      NAME "Y"
                    SEMICOLON ";"
                  EMPTY_DECL
                    SEMICOLON ";"
                  EOF ""
                Errors:
            "#]],
        );
    }

    #[test]
    fn class_members() {
        check(
            "class C<T> extends B { static { } int x, y[]; C(int a) {} <U> void m(U... us) throws E; }",
            expect![[r#"
                COMPILATION_UNIT
                  CLASS_DECL
                    CLASS_KW "class"
                    NAME "C"
                    TYPE_PARAM_LIST
                      LT "<"
                      TYPE_PARAM
                        NAME "T"
                      GT ">"
                    EXTENDS_CLAUSE
                      EXTENDS_KW "extends"
                      CLASS_TYPE
                        NAME "B"
                    CLASS_BODY
                      LEFT_BRACE "{"
                      INITIALIZER_BLOCK
                        STATIC_KW "static"
                        BLOCK
                          LEFT_BRACE "{"
                          RIGHT_BRACE "}"
                      FIELD_DECL
                        PRIMITIVE_TYPE
                          INT_KW "int"
                        VARIABLE_DECLARATOR
                          NAME "x"
                        COMMA ","
                        VARIABLE_DECLARATOR
                          NAME "y"
                          DIMS
                            LEFT_BRACKET "["
                            RIGHT_BRACKET "]"
                        SEMICOLON ";"
                      CONSTRUCTOR_DECL
                        NAME "C"
                        PARAM_LIST
                          LEFT_PAREN "("
                          PARAM
                            PRIMITIVE_TYPE
                              INT_KW "int"
                            NAME "a"
                          RIGHT_PAREN ")"
                        BLOCK
                          LEFT_BRACE "{"
                          RIGHT_BRACE "}"
                      METHOD_DECL
                        TYPE_PARAM_LIST
                          LT "<"
                          TYPE_PARAM
                            NAME "U"
                          GT ">"
                        VOID_TYPE
                          VOID_KW "void"
                        NAME "m"
                        PARAM_LIST
                          LEFT_PAREN "("
                          PARAM
                            CLASS_TYPE
                              NAME "U"
                            ELLIPSIS "..."
                            NAME "us"
                          RIGHT_PAREN ")"
                        THROWS_CLAUSE
                          THROWS_KW "throws"
                          CLASS_TYPE
                            NAME "E"
                        SEMICOLON ";"
                      RIGHT_BRACE "}"
                  EOF ""
                Errors:
            "#]],
        );
    }

    #[test]
    fn enums_records_and_annotation_types() {
        check(
            "enum E { A(1), B { }; } record P(int x) { P { } } @interface N { int v() default 1; }",
            expect![[r#"
                COMPILATION_UNIT
                  ENUM_DECL
                    ENUM_KW "enum"
                    NAME "E"
                    ENUM_BODY
                      LEFT_BRACE "{"
                      ENUM_CONSTANT
                        NAME "A"
                        ARG_LIST
                          LEFT_PAREN "("
                          LITERAL
                            INT_LITERAL "1"
                          RIGHT_PAREN ")"
                      COMMA ","
                      ENUM_CONSTANT
                        NAME "B"
                        CLASS_BODY
                          LEFT_BRACE "{"
                          RIGHT_BRACE "}"
                      SEMICOLON ";"
                      RIGHT_BRACE "}"
                  RECORD_DECL
                    RECORD_KW "record"
                    NAME "P"
                    RECORD_HEADER
                      LEFT_PAREN "("
                      RECORD_COMPONENT
                        PRIMITIVE_TYPE
                          INT_KW "int"
                        NAME "x"
                      RIGHT_PAREN ")"
                    CLASS_BODY
                      LEFT_BRACE "{"
                      COMPACT_CONSTRUCTOR_DECL
                        NAME "P"
                        BLOCK
                          LEFT_BRACE "{"
                          RIGHT_BRACE "}"
                      RIGHT_BRACE "}"
                  ANNOTATION_TYPE_DECL
                    AT "@"
                    INTERFACE_KW "interface"
                    NAME "N"
                    ANNOTATION_TYPE_BODY
                      LEFT_BRACE "{"
                      ANNOTATION_METHOD_DECL
                        PRIMITIVE_TYPE
                          INT_KW "int"
                        NAME "v"
                        PARAM_LIST
                          LEFT_PAREN "("
                          RIGHT_PAREN ")"
                        DEFAULT_VALUE
                          DEFAULT_KW "default"
                          LITERAL
                            INT_LITERAL "1"
                        SEMICOLON ";"
                      RIGHT_BRACE "}"
                  EOF ""
                Errors:
            "#]],
        );
    }

    #[test]
    fn missing_field_semicolon_is_reported_at_the_brace() {
        check(
            "class A { int x }",
            expect![[r#"
                COMPILATION_UNIT
                  CLASS_DECL
                    CLASS_KW "class"
                    NAME "A"
                    CLASS_BODY
                      LEFT_BRACE "{"
                      FIELD_DECL
                        PRIMITIVE_TYPE
                          INT_KW "int"
                        VARIABLE_DECLARATOR
                          NAME "x"
                      RIGHT_BRACE "}"
                  EOF ""
                Errors:
                  16..17: expected `;`, found `}`
            "#]],
        );
    }

    #[test]
    fn garbage_between_members_is_skipped() {
        check(
            "class A { int x; + - void f() {} }",
            expect![[r#"
                COMPILATION_UNIT
                  CLASS_DECL
                    CLASS_KW "class"
                    NAME "A"
                    CLASS_BODY
                      LEFT_BRACE "{"
                      FIELD_DECL
                        PRIMITIVE_TYPE
                          INT_KW "int"
                        VARIABLE_DECLARATOR
                          NAME "x"
                        SEMICOLON ";"
                      ERROR
                        PLUS "+"
                        MINUS "-"
                      METHOD_DECL
                        VOID_TYPE
                          VOID_KW "void"
                        NAME "f"
                        PARAM_LIST
                          LEFT_PAREN "("
                          RIGHT_PAREN ")"
                        BLOCK
                          LEFT_BRACE "{"
                          RIGHT_BRACE "}"
                      RIGHT_BRACE "}"
                  EOF ""
                Errors:
                  17..18: expected a member declaration, found `+`
            "#]],
        );
    }
}
