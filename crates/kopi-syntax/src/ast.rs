use crate::SyntaxKind::{self, *};
use crate::{SyntaxNode, SyntaxToken};

pub trait AstNode<'a>: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;

    fn cast(syntax: SyntaxNode<'a>) -> Option<Self>;

    fn syntax(self) -> SyntaxNode<'a>;
}

fn child<'a, N: AstNode<'a>>(parent: SyntaxNode<'a>) -> Option<N> {
    parent.children().find_map(N::cast)
}

fn children<'a, N: AstNode<'a> + 'a>(parent: SyntaxNode<'a>) -> impl Iterator<Item = N> + 'a {
    parent.children().filter_map(N::cast)
}

fn name_token(parent: SyntaxNode<'_>) -> Option<SyntaxToken<'_>> {
    parent.token_of_kind(NAME)
}

macro_rules! ast_nodes {
    ($($name:ident => $kind:ident,)*) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name<'a>(SyntaxNode<'a>);

            impl<'a> AstNode<'a> for $name<'a> {
                fn can_cast(kind: SyntaxKind) -> bool {
                    kind == $kind
                }

                fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
                    Self::can_cast(syntax.kind()).then_some(Self(syntax))
                }

                fn syntax(self) -> SyntaxNode<'a> {
                    self.0
                }
            }
        )*
    };
}

ast_nodes! {
    CompilationUnit => COMPILATION_UNIT,
    PackageDecl => PACKAGE_DECL,
    ImportDecl => IMPORT_DECL,
    ModuleDecl => MODULE_DECL,
    QualifiedName => QUALIFIED_NAME,
    ModifierList => MODIFIER_LIST,
    Annotation => ANNOTATION,
    ClassDecl => CLASS_DECL,
    InterfaceDecl => INTERFACE_DECL,
    EnumDecl => ENUM_DECL,
    RecordDecl => RECORD_DECL,
    TypeParamList => TYPE_PARAM_LIST,
    ExtendsClause => EXTENDS_CLAUSE,
    ImplementsClause => IMPLEMENTS_CLAUSE,
    PermitsClause => PERMITS_CLAUSE,
    ThrowsClause => THROWS_CLAUSE,
    ClassBody => CLASS_BODY,
    EnumConstant => ENUM_CONSTANT,
    RecordComponent => RECORD_COMPONENT,
    FieldDecl => FIELD_DECL,
    MethodDecl => METHOD_DECL,
    ConstructorDecl => CONSTRUCTOR_DECL,
    ParamList => PARAM_LIST,
    Param => PARAM,
    VariableDeclarator => VARIABLE_DECLARATOR,
    Block => BLOCK,
    LocalVarDecl => LOCAL_VAR_DECL,
    IfStmt => IF_STMT,
    SwitchBlock => SWITCH_BLOCK,
    SwitchGroup => SWITCH_GROUP,
    SwitchRule => SWITCH_RULE,
    SwitchLabel => SWITCH_LABEL,
    Guard => GUARD,
    TypePattern => TYPE_PATTERN,
    RecordPattern => RECORD_PATTERN,
    GuardedPattern => GUARDED_PATTERN,
    Literal => LITERAL,
    NameExpr => NAME_EXPR,
    ParenExpr => PAREN_EXPR,
    FieldAccess => FIELD_ACCESS,
    MethodCall => METHOD_CALL,
    ArgList => ARG_LIST,
    CastExpr => CAST_EXPR,
    PrefixExpr => PREFIX_EXPR,
    PostfixExpr => POSTFIX_EXPR,
    BinaryExpr => BINARY_EXPR,
    AssignExpr => ASSIGN_EXPR,
    ConditionalExpr => CONDITIONAL_EXPR,
    InstanceofExpr => INSTANCEOF_EXPR,
    LambdaExpr => LAMBDA_EXPR,
    SwitchExpr => SWITCH_EXPR,
    TypeArgList => TYPE_ARG_LIST,
    ClassType => CLASS_TYPE,
    PrimitiveType => PRIMITIVE_TYPE,
    ArrayType => ARRAY_TYPE,
}

impl<'a> CompilationUnit<'a> {
    pub fn package(self) -> Option<PackageDecl<'a>> {
        child(self.0)
    }

    pub fn imports(self) -> impl Iterator<Item = ImportDecl<'a>> + 'a {
        children(self.0)
    }

    pub fn module(self) -> Option<ModuleDecl<'a>> {
        child(self.0)
    }

    /// Top-level class, interface, enum, record and annotation type declarations.
    pub fn type_decls(self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        self.0.children().filter(|node| is_type_decl(node.kind()))
    }
}

pub fn is_type_decl(kind: SyntaxKind) -> bool {
    matches!(kind, CLASS_DECL | INTERFACE_DECL | ENUM_DECL | RECORD_DECL | ANNOTATION_TYPE_DECL)
}

impl<'a> PackageDecl<'a> {
    pub fn name(self) -> Option<QualifiedName<'a>> {
        child(self.0)
    }
}

impl<'a> ImportDecl<'a> {
    pub fn name(self) -> Option<QualifiedName<'a>> {
        child(self.0)
    }

    pub fn is_static(self) -> bool {
        self.0.token_of_kind(STATIC_KW).is_some()
    }

    /// `import a.b.*;`
    pub fn is_on_demand(self) -> bool {
        self.0.token_of_kind(STAR).is_some()
    }
}

impl<'a> ModuleDecl<'a> {
    pub fn name(self) -> Option<QualifiedName<'a>> {
        child(self.0)
    }

    pub fn is_open(self) -> bool {
        self.0.token_of_kind(OPEN_KW).is_some()
    }
}

impl<'a> QualifiedName<'a> {
    pub fn segments(self) -> impl Iterator<Item = SyntaxToken<'a>> + 'a {
        self.0.child_tokens().filter(|token| token.kind() == NAME)
    }

    /// The dotted name without trivia.
    pub fn to_dotted(self) -> String {
        self.segments().map(SyntaxToken::text).collect::<Vec<_>>().join(".")
    }
}

impl<'a> ModifierList<'a> {
    pub fn keywords(self) -> impl Iterator<Item = SyntaxKind> + 'a {
        self.0.child_tokens().map(SyntaxToken::kind)
    }

    pub fn annotations(self) -> impl Iterator<Item = Annotation<'a>> + 'a {
        children(self.0)
    }

    pub fn has(self, keyword: SyntaxKind) -> bool {
        self.keywords().any(|kind| kind == keyword)
    }
}

impl<'a> Annotation<'a> {
    pub fn name(self) -> Option<QualifiedName<'a>> {
        child(self.0)
    }
}

macro_rules! type_decl_accessors {
    ($($name:ident),*) => {
        $(
            impl<'a> $name<'a> {
                pub fn modifiers(self) -> Option<ModifierList<'a>> {
                    child(self.0)
                }

                pub fn name(self) -> Option<SyntaxToken<'a>> {
                    name_token(self.0)
                }

                pub fn type_params(self) -> Option<TypeParamList<'a>> {
                    child(self.0)
                }

                pub fn extends(self) -> Option<ExtendsClause<'a>> {
                    child(self.0)
                }

                pub fn implements(self) -> Option<ImplementsClause<'a>> {
                    child(self.0)
                }

                pub fn permits(self) -> Option<PermitsClause<'a>> {
                    child(self.0)
                }
            }
        )*
    };
}

type_decl_accessors!(ClassDecl, InterfaceDecl, EnumDecl, RecordDecl);

impl<'a> ClassDecl<'a> {
    pub fn body(self) -> Option<ClassBody<'a>> {
        child(self.0)
    }
}

impl<'a> EnumDecl<'a> {
    pub fn constants(self) -> impl Iterator<Item = EnumConstant<'a>> + 'a {
        self.0.child_of_kind(ENUM_BODY).into_iter().flat_map(|body| children(body))
    }
}

impl<'a> EnumConstant<'a> {
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        name_token(self.0)
    }
}

impl<'a> RecordDecl<'a> {
    pub fn components(self) -> impl Iterator<Item = RecordComponent<'a>> + 'a {
        self.0.child_of_kind(RECORD_HEADER).into_iter().flat_map(|header| children(header))
    }

    pub fn body(self) -> Option<ClassBody<'a>> {
        child(self.0)
    }
}

impl<'a> RecordComponent<'a> {
    pub fn ty(self) -> Option<Type<'a>> {
        child(self.0)
    }

    pub fn name(self) -> Option<SyntaxToken<'a>> {
        name_token(self.0)
    }
}

macro_rules! type_list_accessors {
    ($($name:ident),*) => {
        $(
            impl<'a> $name<'a> {
                pub fn types(self) -> impl Iterator<Item = Type<'a>> + 'a {
                    children(self.0)
                }
            }
        )*
    };
}

type_list_accessors!(ExtendsClause, ImplementsClause, PermitsClause, ThrowsClause, TypeArgList);

impl<'a> TypeParamList<'a> {
    pub fn names(self) -> impl Iterator<Item = SyntaxToken<'a>> + 'a {
        self.0.children().filter(|node| node.kind() == TYPE_PARAM).filter_map(name_token)
    }
}

impl<'a> ClassBody<'a> {
    pub fn members(self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        self.0.children()
    }

    pub fn methods(self) -> impl Iterator<Item = MethodDecl<'a>> + 'a {
        children(self.0)
    }

    pub fn fields(self) -> impl Iterator<Item = FieldDecl<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> FieldDecl<'a> {
    pub fn ty(self) -> Option<Type<'a>> {
        child(self.0)
    }

    pub fn declarators(self) -> impl Iterator<Item = VariableDeclarator<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> LocalVarDecl<'a> {
    pub fn ty(self) -> Option<Type<'a>> {
        child(self.0)
    }

    pub fn declarators(self) -> impl Iterator<Item = VariableDeclarator<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> VariableDeclarator<'a> {
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        name_token(self.0)
    }

    pub fn initializer(self) -> Option<SyntaxNode<'a>> {
        self.0.children().find(|node| node.kind() == ARRAY_INITIALIZER || Expr::can_cast(node.kind()))
    }
}

impl<'a> MethodDecl<'a> {
    pub fn modifiers(self) -> Option<ModifierList<'a>> {
        child(self.0)
    }

    pub fn type_params(self) -> Option<TypeParamList<'a>> {
        child(self.0)
    }

    pub fn return_type(self) -> Option<Type<'a>> {
        child(self.0)
    }

    pub fn name(self) -> Option<SyntaxToken<'a>> {
        name_token(self.0)
    }

    pub fn params(self) -> Option<ParamList<'a>> {
        child(self.0)
    }

    pub fn throws(self) -> Option<ThrowsClause<'a>> {
        child(self.0)
    }

    pub fn body(self) -> Option<Block<'a>> {
        child(self.0)
    }
}

impl<'a> ConstructorDecl<'a> {
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        name_token(self.0)
    }

    pub fn params(self) -> Option<ParamList<'a>> {
        child(self.0)
    }

    pub fn body(self) -> Option<Block<'a>> {
        child(self.0)
    }
}

impl<'a> ParamList<'a> {
    pub fn params(self) -> impl Iterator<Item = Param<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> Param<'a> {
    pub fn ty(self) -> Option<Type<'a>> {
        child(self.0)
    }

    pub fn name(self) -> Option<SyntaxToken<'a>> {
        name_token(self.0)
    }

    pub fn is_varargs(self) -> bool {
        self.0.token_of_kind(ELLIPSIS).is_some()
    }
}

impl<'a> Block<'a> {
    pub fn statements(self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        self.0.children()
    }
}

impl<'a> IfStmt<'a> {
    pub fn condition(self) -> Option<Expr<'a>> {
        self.0.child_of_kind(CONDITION).and_then(child)
    }

    pub fn then_branch(self) -> Option<SyntaxNode<'a>> {
        self.0.children().find(|node| !matches!(node.kind(), CONDITION | ELSE_BRANCH))
    }

    pub fn else_branch(self) -> Option<SyntaxNode<'a>> {
        self.0.child_of_kind(ELSE_BRANCH).and_then(|branch| branch.first_child())
    }
}

impl<'a> SwitchBlock<'a> {
    pub fn groups(self) -> impl Iterator<Item = SwitchGroup<'a>> + 'a {
        children(self.0)
    }

    pub fn rules(self) -> impl Iterator<Item = SwitchRule<'a>> + 'a {
        children(self.0)
    }

    /// `true` for the arrow form, `false` for colon-terminated groups.
    pub fn is_arrow_form(self) -> bool {
        self.rules().next().is_some()
    }
}

impl<'a> SwitchGroup<'a> {
    pub fn labels(self) -> impl Iterator<Item = SwitchLabel<'a>> + 'a {
        children(self.0)
    }

    pub fn statements(self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        self.0.children().filter(|node| node.kind() != SWITCH_LABEL)
    }
}

impl<'a> SwitchRule<'a> {
    pub fn label(self) -> Option<SwitchLabel<'a>> {
        child(self.0)
    }

    /// Expression statement, block or `throw` statement after the arrow.
    pub fn body(self) -> Option<SyntaxNode<'a>> {
        self.0.children().find(|node| node.kind() != SWITCH_LABEL)
    }
}

impl<'a> SwitchLabel<'a> {
    pub fn is_default(self) -> bool {
        self.0.token_of_kind(DEFAULT_KW).is_some()
    }

    /// Constants and patterns listed after `case`.
    pub fn items(self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        self.0.children().filter(|node| node.kind() != GUARD)
    }

    pub fn guard(self) -> Option<Guard<'a>> {
        child(self.0)
    }

    pub fn terminator(self) -> Option<SyntaxToken<'a>> {
        self.0.child_tokens().find(|token| matches!(token.kind(), COLON | ARROW))
    }
}

impl<'a> Guard<'a> {
    pub fn condition(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> TypePattern<'a> {
    pub fn ty(self) -> Option<Type<'a>> {
        child(self.0)
    }

    pub fn binding(self) -> Option<SyntaxToken<'a>> {
        name_token(self.0)
    }
}

impl<'a> RecordPattern<'a> {
    pub fn ty(self) -> Option<Type<'a>> {
        child(self.0)
    }

    pub fn components(self) -> impl Iterator<Item = Pattern<'a>> + 'a {
        self.0.child_of_kind(PATTERN_LIST).into_iter().flat_map(|list| children(list))
    }
}

impl<'a> GuardedPattern<'a> {
    pub fn pattern(self) -> Option<Pattern<'a>> {
        child(self.0)
    }

    pub fn guard(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> Literal<'a> {
    pub fn token(self) -> Option<SyntaxToken<'a>> {
        self.0.child_tokens().next()
    }
}

impl<'a> NameExpr<'a> {
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        name_token(self.0)
    }
}

impl<'a> ParenExpr<'a> {
    pub fn expr(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> FieldAccess<'a> {
    pub fn receiver(self) -> Option<Expr<'a>> {
        child(self.0)
    }

    pub fn name(self) -> Option<SyntaxToken<'a>> {
        name_token(self.0)
    }
}

impl<'a> MethodCall<'a> {
    /// The expression before the `.`, absent for unqualified calls.
    pub fn receiver(self) -> Option<Expr<'a>> {
        child(self.0)
    }

    pub fn name(self) -> Option<SyntaxToken<'a>> {
        self.0.child_tokens().find(|token| matches!(token.kind(), NAME | THIS_KW | SUPER_KW))
    }

    pub fn type_args(self) -> Option<TypeArgList<'a>> {
        child(self.0)
    }

    pub fn args(self) -> Option<ArgList<'a>> {
        child(self.0)
    }
}

impl<'a> ArgList<'a> {
    pub fn args(self) -> impl Iterator<Item = Expr<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> CastExpr<'a> {
    pub fn ty(self) -> Option<Type<'a>> {
        child(self.0)
    }

    pub fn expr(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> PrefixExpr<'a> {
    pub fn op(self) -> Option<SyntaxToken<'a>> {
        self.0.child_tokens().next()
    }

    pub fn expr(self) -> Option<Expr<'a>> {
        child(self.0)
    }
}

impl<'a> PostfixExpr<'a> {
    pub fn expr(self) -> Option<Expr<'a>> {
        child(self.0)
    }

    pub fn op(self) -> Option<SyntaxToken<'a>> {
        self.0.child_tokens().next()
    }
}

macro_rules! binary_accessors {
    ($($name:ident),*) => {
        $(
            impl<'a> $name<'a> {
                pub fn lhs(self) -> Option<Expr<'a>> {
                    children(self.0).next()
                }

                pub fn op(self) -> Option<SyntaxToken<'a>> {
                    self.0.child_tokens().next()
                }

                pub fn op_kind(self) -> Option<SyntaxKind> {
                    self.op().map(SyntaxToken::kind)
                }

                pub fn rhs(self) -> Option<Expr<'a>> {
                    children(self.0).nth(1)
                }
            }
        )*
    };
}

binary_accessors!(BinaryExpr, AssignExpr);

impl<'a> ConditionalExpr<'a> {
    pub fn condition(self) -> Option<Expr<'a>> {
        children(self.0).next()
    }

    pub fn then_expr(self) -> Option<Expr<'a>> {
        children(self.0).nth(1)
    }

    pub fn else_expr(self) -> Option<Expr<'a>> {
        children(self.0).nth(2)
    }
}

impl<'a> InstanceofExpr<'a> {
    pub fn expr(self) -> Option<Expr<'a>> {
        child(self.0)
    }

    /// The bare type operand, when no pattern is used.
    pub fn ty(self) -> Option<Type<'a>> {
        child(self.0)
    }

    pub fn pattern(self) -> Option<Pattern<'a>> {
        child(self.0)
    }
}

impl<'a> LambdaExpr<'a> {
    pub fn param_names(self) -> impl Iterator<Item = SyntaxToken<'a>> + 'a {
        self.0.descendants().filter(|node| node.kind() == LAMBDA_PARAM).filter_map(name_token)
    }

    pub fn body(self) -> Option<SyntaxNode<'a>> {
        self.0.children().find(|node| !matches!(node.kind(), LAMBDA_PARAM | LAMBDA_PARAM_LIST))
    }
}

impl<'a> SwitchExpr<'a> {
    pub fn selector(self) -> Option<Expr<'a>> {
        self.0.child_of_kind(CONDITION).and_then(child)
    }

    pub fn block(self) -> Option<SwitchBlock<'a>> {
        child(self.0)
    }
}

impl<'a> ClassType<'a> {
    pub fn segments(self) -> impl Iterator<Item = SyntaxToken<'a>> + 'a {
        self.0.child_tokens().filter(|token| token.kind() == NAME)
    }

    pub fn type_args(self) -> impl Iterator<Item = TypeArgList<'a>> + 'a {
        children(self.0)
    }
}

impl<'a> PrimitiveType<'a> {
    pub fn keyword(self) -> Option<SyntaxKind> {
        self.0.child_tokens().map(SyntaxToken::kind).find(|kind| kind.is_primitive_type())
    }
}

impl<'a> ArrayType<'a> {
    pub fn element(self) -> Option<Type<'a>> {
        child(self.0)
    }
}

macro_rules! ast_enum {
    ($name:ident { $($variant:ident => $kind:ident,)* }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name<'a> {
            $($variant(SyntaxNode<'a>),)*
        }

        impl<'a> AstNode<'a> for $name<'a> {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $($kind)|*)
            }

            fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
                match syntax.kind() {
                    $($kind => Some(Self::$variant(syntax)),)*
                    _ => None,
                }
            }

            fn syntax(self) -> SyntaxNode<'a> {
                match self {
                    $(Self::$variant(syntax) => syntax,)*
                }
            }
        }
    };
}

ast_enum!(Expr {
    Literal => LITERAL,
    Name => NAME_EXPR,
    Paren => PAREN_EXPR,
    This => THIS_EXPR,
    Super => SUPER_EXPR,
    ClassLiteral => CLASS_LITERAL,
    FieldAccess => FIELD_ACCESS,
    MethodCall => METHOD_CALL,
    ArrayAccess => ARRAY_ACCESS,
    New => NEW_EXPR,
    ArrayCreation => ARRAY_CREATION,
    MethodRef => METHOD_REF,
    Lambda => LAMBDA_EXPR,
    Cast => CAST_EXPR,
    Prefix => PREFIX_EXPR,
    Postfix => POSTFIX_EXPR,
    Binary => BINARY_EXPR,
    Assign => ASSIGN_EXPR,
    Conditional => CONDITIONAL_EXPR,
    Instanceof => INSTANCEOF_EXPR,
    Switch => SWITCH_EXPR,
});

ast_enum!(Type {
    Primitive => PRIMITIVE_TYPE,
    Void => VOID_TYPE,
    Class => CLASS_TYPE,
    Array => ARRAY_TYPE,
    Wildcard => WILDCARD_TYPE,
    Intersection => INTERSECTION_TYPE,
    Union => UNION_TYPE,
});

ast_enum!(Pattern {
    Type => TYPE_PATTERN,
    Record => RECORD_PATTERN,
    Guarded => GUARDED_PATTERN,
    Paren => PAREN_PATTERN,
});

impl<'a> Expr<'a> {
    pub fn kind(self) -> SyntaxKind {
        self.syntax().kind()
    }

    pub fn as_binary(self) -> Option<BinaryExpr<'a>> {
        BinaryExpr::cast(self.syntax())
    }

    pub fn as_assign(self) -> Option<AssignExpr<'a>> {
        AssignExpr::cast(self.syntax())
    }
}

impl<'a> Type<'a> {
    pub fn kind(self) -> SyntaxKind {
        self.syntax().kind()
    }
}
