use kopi_parse::{DiagnosticKind, Parse, parse, parse_expression, parse_tokens};
use kopi_syntax::SyntaxKind::{self, *};
use kopi_syntax::ast::{AssignExpr, AstNode, BinaryExpr, CastExpr, Expr, LocalVarDecl, SwitchBlock};
use kopi_syntax::{SyntaxListener, SyntaxNode, SyntaxToken, walk};

const VALID: &[&str] = &[
    "class A {}",
    "interface I<T> extends J<T>, K { default void m() {} static <U> U id(U u) { return u; } }",
    "enum Color implements Paint { RED, GREEN { @Override void f() {} }; abstract void f(); }",
    "record Point(int x, int y) { Point { assert x >= 0 : \"negative\"; } }",
    "@interface Tag { String[] value() default {}; }",
    "module app { requires static lombok; uses Service; }",
    "class G { void f() { label: while (true) { do { break label; } while (x); } } }",
    "class H { Object f(Object o) { return o instanceof Point(var x, var y) && x > y ? x : y; } }",
    "class J { void f() { synchronized (this) { int[] a = {1, 2}; a[0] += a[1] << 2; } } }",
    "class K { Supplier<List<String>> s = ArrayList<String>::new; Class<?> c = String[].class; }",
    "class L { void f() { Outer.Inner i = outer.new Inner(); this.<T>g(); super.h(); } }",
    "class M { String s = \"\"\"\n    text\n    block\"\"\"; char c = '\\n'; }",
];

fn assert_clean(text: &str) -> Parse {
    let parse = parse(text);
    assert!(!parse.has_errors(), "unexpected errors in {text:?}:\n{}", parse.debug_dump());
    parse
}

fn assert_expr_clean(text: &str) -> Parse {
    let parse = parse_expression(text);
    assert!(!parse.has_errors(), "unexpected errors in {text:?}:\n{}", parse.debug_dump());
    parse
}

/// Raw tokens merged away by composite tokens such as `>>=` or `non-sealed`.
fn merged_raw_tokens(tree_tokens: &[SyntaxToken<'_>]) -> usize {
    tree_tokens
        .iter()
        .map(|token| kopi_tokenizer::tokenize(token.text()).len().saturating_sub(2))
        .sum()
}

#[test_log::test]
fn valid_inputs_have_no_diagnostics_and_cover_every_token() {
    for text in VALID {
        let parse = assert_clean(text);
        let tokens = kopi_tokenizer::tokenize(text);
        let tree_tokens: Vec<_> = parse.tree().tokens().collect();

        let root = parse.root().text_range();
        let first = tokens.first().map(|token| token.range.start());
        let eof = tokens.last().map(|token| token.range.end());
        assert_eq!(Some(root.start()), first, "{text:?}");
        assert_eq!(Some(root.end()), eof, "{text:?}");

        let last = tokens.iter().rev().find(|token| token.kind != EOF).map(|token| token.range.end());
        let tree_last =
            tree_tokens.iter().rev().find(|token| token.kind() != EOF).map(|token| token.text_range().end());
        assert_eq!(tree_last, last, "{text:?}");

        assert_eq!(tree_tokens.len(), tokens.len() - merged_raw_tokens(&tree_tokens), "{text:?}");
    }
}

#[test]
fn composites_account_for_their_raw_tokens() {
    let text = "sealed interface S permits T {} non-sealed class T implements S { void f() { x >>>= 1; } }";
    let parse = assert_clean(text);
    let tree_tokens: Vec<_> = parse.tree().tokens().collect();
    assert_eq!(merged_raw_tokens(&tree_tokens), 5);
    assert_eq!(tree_tokens.len(), kopi_tokenizer::tokenize(text).len() - 5);
}

#[test_log::test]
fn leaves_reproduce_the_token_sequence() {
    for text in VALID {
        let parse = assert_clean(text);
        let lexed: String = kopi_tokenizer::tokenize(text)
            .iter()
            .map(|token| &text[token.range])
            .collect();
        let leaves: String = parse.tree().tokens().map(SyntaxToken::text).collect();
        assert_eq!(leaves, lexed, "{text:?}");
        assert_eq!(parse.root().full_text(), *text);
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let parse = assert_expr_clean("a + b * c");
    let add = BinaryExpr::cast(parse.root()).expect("binary root");
    assert_eq!(add.op_kind(), Some(PLUS));

    let mul = add.rhs().and_then(Expr::as_binary);
    assert_eq!(mul.and_then(BinaryExpr::op_kind), Some(STAR));
    assert_eq!(mul.map(|mul| mul.syntax().text()), Some("b * c"));
}

#[test]
fn assignment_is_right_and_subtraction_left_associative() {
    let parse = assert_expr_clean("a = b = c");
    let assign = AssignExpr::cast(parse.root());
    let inner = assign.and_then(AssignExpr::rhs).and_then(Expr::as_assign);
    assert_eq!(inner.map(|inner| inner.syntax().text()), Some("b = c"));

    let parse = assert_expr_clean("a - b - c");
    let sub = BinaryExpr::cast(parse.root());
    let lhs = sub.and_then(BinaryExpr::lhs).and_then(Expr::as_binary);
    assert_eq!(lhs.map(|lhs| lhs.syntax().text()), Some("a - b"));
}

#[test]
fn reference_cast_of_a_negated_literal() {
    let parse = assert_expr_clean("(Foo) -1");
    let cast = CastExpr::cast(parse.root());
    let operand = cast.and_then(CastExpr::expr).map(Expr::kind);
    assert_eq!(operand, Some(PREFIX_EXPR));
    assert_eq!(cast.and_then(CastExpr::ty).map(|ty| ty.syntax().text()), Some("Foo"));
}

#[test]
fn parenthesized_name_before_semicolon_is_not_a_cast() {
    let parse = assert_clean("class A { void f() { (Foo); } }");
    let kinds: Vec<SyntaxKind> = parse.root().descendants().map(SyntaxNode::kind).collect();
    assert!(kinds.contains(&PAREN_EXPR));
    assert!(!kinds.contains(&CAST_EXPR));
}

#[test]
fn type_arguments_versus_less_than() {
    let parse = assert_clean("class A { void f() { List<String> l; a < b; } }");
    let root = parse.root();

    let decl = root.descendants().find_map(LocalVarDecl::cast);
    let ty = decl.and_then(LocalVarDecl::ty).map(|ty| ty.syntax());
    assert!(ty.is_some_and(|ty| ty.child_of_kind(TYPE_ARG_LIST).is_some()));

    let compare = root.descendants().find_map(BinaryExpr::cast);
    assert_eq!(compare.and_then(BinaryExpr::op_kind), Some(LT));
}

#[test_log::test]
fn missing_terminator_reports_once_and_keeps_going() {
    let parse = parse("class A { int x }\nclass B { void f() {} }");
    let diagnostics = parse.diagnostics();
    assert_eq!(diagnostics.len(), 1, "{}", parse.debug_dump());
    assert_eq!(diagnostics[0].kind(), DiagnosticKind::Syntax);
    assert_eq!(u32::from(diagnostics[0].range().start()), 16);
    assert!(diagnostics[0].expected().contains(SEMICOLON));

    let classes: Vec<_> = parse
        .root()
        .children()
        .filter(|node| node.kind() == CLASS_DECL)
        .map(|node| node.token_of_kind(NAME).map(SyntaxToken::text))
        .collect();
    assert_eq!(classes, [Some("A"), Some("B")]);
}

#[test]
fn mixed_switch_labels_are_rejected() {
    let text = "class A { void f(int k) { switch (k) { case 1: g(); case 2 -> h(); } } }";
    let parse = parse(text);
    let [diagnostic] = parse.diagnostics() else {
        panic!("expected one diagnostic:\n{}", parse.debug_dump());
    };
    assert_eq!(&text[diagnostic.range()], "->");
    assert!(diagnostic.message().contains("`->` label"));

    let block = parse.root().descendants().find_map(SwitchBlock::cast);
    assert!(block.is_some_and(|block| block.groups().count() == 1 && block.rules().count() == 1));
}

#[test]
fn caller_supplied_tokens_without_eof() {
    let text = "class A {}";
    let mut tokens = kopi_tokenizer::tokenize(text);
    tokens.pop();
    let parse = parse_tokens(text, tokens, &Default::default());
    assert!(!parse.has_errors());
    assert_eq!(parse.root().kind(), COMPILATION_UNIT);
}

#[derive(Default)]
struct Depth {
    current: usize,
    max: usize,
    balanced: bool,
    tokens: usize,
}

impl<'a> SyntaxListener<'a> for Depth {
    fn enter(&mut self, _node: SyntaxNode<'a>) {
        self.current += 1;
        self.max = self.max.max(self.current);
    }

    fn exit(&mut self, _node: SyntaxNode<'a>) {
        self.current -= 1;
        self.balanced = self.current == 0;
    }

    fn token(&mut self, _token: SyntaxToken<'a>) {
        self.tokens += 1;
    }
}

#[test]
fn listener_sees_matched_enter_and_exit() {
    let parse = assert_clean("class A { int f() { return (1 + 2) * 3; } }");
    let mut depth = Depth::default();
    walk(parse.root(), &mut depth);

    assert!(depth.balanced);
    assert!(depth.max > 5);
    assert_eq!(depth.tokens, parse.tree().token_count());
}
