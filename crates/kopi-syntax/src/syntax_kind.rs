//! The closed set of token and node kinds.
//!
//! Everything is declared once in the `syntax_kinds!` table below: the enum,
//! the static name/text lookup tables and the per-kind [`Visitor`] methods are
//! all generated from it, so adding a node kind without a visit method cannot
//! compile.

use crate::SyntaxNode;

macro_rules! syntax_kinds {
    (
        tokens { $($token:ident $(= $text:literal)?,)* }
        nodes { $($node:ident => $visit:ident,)* }
    ) => {
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
        #[repr(u16)]
        pub enum SyntaxKind {
            $($token,)*
            $($node,)*
            TOMBSTONE,
        }

        impl SyntaxKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [SyntaxKind] =
                &[$(SyntaxKind::$token,)* $(SyntaxKind::$node,)* SyntaxKind::TOMBSTONE];

            const NAMES: &'static [&'static str] =
                &[$(stringify!($token),)* $(stringify!($node),)* "TOMBSTONE"];

            const TEXTS: &'static [Option<&'static str>] =
                &[$(syntax_kinds!(@text $($text)?),)* $(syntax_kinds!(@none $node),)* None];

            const TOKEN_COUNT: u16 = [$(stringify!($token)),*].len() as u16;
        }

        /// Pull-style traversal: one method per node kind.
        ///
        /// Every `visit_*` method defaults to [`Visitor::visit_children`], so an
        /// implementation only overrides the kinds it cares about and decides
        /// how child results compose through `visit_children`.
        pub trait Visitor<'a> {
            type Output;

            fn visit_children(&mut self, node: SyntaxNode<'a>) -> Self::Output;

            fn visit(&mut self, node: SyntaxNode<'a>) -> Self::Output {
                match node.kind() {
                    $(SyntaxKind::$node => self.$visit(node),)*
                    _ => self.visit_children(node),
                }
            }

            $(
                fn $visit(&mut self, node: SyntaxNode<'a>) -> Self::Output {
                    self.visit_children(node)
                }
            )*
        }
    };
    (@text $text:literal) => { Some($text) };
    (@text) => { None };
    (@none $node:ident) => { None };
}

syntax_kinds! {
    tokens {
        LEFT_PAREN = "(",
        RIGHT_PAREN = ")",
        LEFT_BRACE = "{",
        RIGHT_BRACE = "}",
        LEFT_BRACKET = "[",
        RIGHT_BRACKET = "]",
        SEMICOLON = ";",
        COMMA = ",",
        DOT = ".",
        ELLIPSIS = "...",
        AT = "@",
        COLON_COLON = "::",
        COLON = ":",
        QUESTION = "?",
        ARROW = "->",
        EQ = "=",
        EQ_EQ = "==",
        BANG = "!",
        BANG_EQ = "!=",
        TILDE = "~",
        LT = "<",
        LT_EQ = "<=",
        GT = ">",
        GT_EQ = ">=",
        SHL = "<<",
        SHR = ">>",
        USHR = ">>>",
        PLUS = "+",
        MINUS = "-",
        STAR = "*",
        SLASH = "/",
        PERCENT = "%",
        AMP = "&",
        PIPE = "|",
        CARET = "^",
        AMP_AMP = "&&",
        PIPE_PIPE = "||",
        PLUS_PLUS = "++",
        MINUS_MINUS = "--",
        PLUS_EQ = "+=",
        MINUS_EQ = "-=",
        STAR_EQ = "*=",
        SLASH_EQ = "/=",
        PERCENT_EQ = "%=",
        AMP_EQ = "&=",
        PIPE_EQ = "|=",
        CARET_EQ = "^=",
        SHL_EQ = "<<=",
        SHR_EQ = ">>=",
        USHR_EQ = ">>>=",

        ABSTRACT_KW = "abstract",
        ASSERT_KW = "assert",
        BOOLEAN_KW = "boolean",
        BREAK_KW = "break",
        BYTE_KW = "byte",
        CASE_KW = "case",
        CATCH_KW = "catch",
        CHAR_KW = "char",
        CLASS_KW = "class",
        CONST_KW = "const",
        CONTINUE_KW = "continue",
        DEFAULT_KW = "default",
        DO_KW = "do",
        DOUBLE_KW = "double",
        ELSE_KW = "else",
        ENUM_KW = "enum",
        EXTENDS_KW = "extends",
        FINAL_KW = "final",
        FINALLY_KW = "finally",
        FLOAT_KW = "float",
        FOR_KW = "for",
        GOTO_KW = "goto",
        IF_KW = "if",
        IMPLEMENTS_KW = "implements",
        IMPORT_KW = "import",
        INSTANCEOF_KW = "instanceof",
        INT_KW = "int",
        INTERFACE_KW = "interface",
        LONG_KW = "long",
        NATIVE_KW = "native",
        NEW_KW = "new",
        PACKAGE_KW = "package",
        PRIVATE_KW = "private",
        PROTECTED_KW = "protected",
        PUBLIC_KW = "public",
        RETURN_KW = "return",
        SHORT_KW = "short",
        STATIC_KW = "static",
        STRICTFP_KW = "strictfp",
        SUPER_KW = "super",
        SWITCH_KW = "switch",
        SYNCHRONIZED_KW = "synchronized",
        THIS_KW = "this",
        THROW_KW = "throw",
        THROWS_KW = "throws",
        TRANSIENT_KW = "transient",
        TRY_KW = "try",
        VOID_KW = "void",
        VOLATILE_KW = "volatile",
        WHILE_KW = "while",
        TRUE_KW = "true",
        FALSE_KW = "false",
        NULL_KW = "null",

        EXPORTS_KW = "exports",
        MODULE_KW = "module",
        NON_SEALED_KW = "non-sealed",
        OPEN_KW = "open",
        OPENS_KW = "opens",
        PERMITS_KW = "permits",
        PROVIDES_KW = "provides",
        RECORD_KW = "record",
        REQUIRES_KW = "requires",
        SEALED_KW = "sealed",
        TO_KW = "to",
        TRANSITIVE_KW = "transitive",
        USES_KW = "uses",
        WHEN_KW = "when",
        WITH_KW = "with",
        YIELD_KW = "yield",

        INT_LITERAL,
        FLOAT_LITERAL,
        CHAR_LITERAL,
        STRING_LITERAL,
        TEXT_BLOCK,
        NAME,
        UNKNOWN,
        EOF,
    }
    nodes {
        COMPILATION_UNIT => visit_compilation_unit,
        PACKAGE_DECL => visit_package_decl,
        IMPORT_DECL => visit_import_decl,
        MODULE_DECL => visit_module_decl,
        MODULE_BODY => visit_module_body,
        REQUIRES_DIRECTIVE => visit_requires_directive,
        EXPORTS_DIRECTIVE => visit_exports_directive,
        OPENS_DIRECTIVE => visit_opens_directive,
        USES_DIRECTIVE => visit_uses_directive,
        PROVIDES_DIRECTIVE => visit_provides_directive,
        QUALIFIED_NAME => visit_qualified_name,
        MODIFIER_LIST => visit_modifier_list,
        ANNOTATION => visit_annotation,
        ANNOTATION_ARG_LIST => visit_annotation_arg_list,
        ELEMENT_VALUE_PAIR => visit_element_value_pair,
        ELEMENT_VALUE_ARRAY => visit_element_value_array,

        CLASS_DECL => visit_class_decl,
        INTERFACE_DECL => visit_interface_decl,
        ENUM_DECL => visit_enum_decl,
        RECORD_DECL => visit_record_decl,
        ANNOTATION_TYPE_DECL => visit_annotation_type_decl,
        TYPE_PARAM_LIST => visit_type_param_list,
        TYPE_PARAM => visit_type_param,
        TYPE_BOUND => visit_type_bound,
        EXTENDS_CLAUSE => visit_extends_clause,
        IMPLEMENTS_CLAUSE => visit_implements_clause,
        PERMITS_CLAUSE => visit_permits_clause,
        THROWS_CLAUSE => visit_throws_clause,
        CLASS_BODY => visit_class_body,
        INTERFACE_BODY => visit_interface_body,
        ENUM_BODY => visit_enum_body,
        ANNOTATION_TYPE_BODY => visit_annotation_type_body,
        ENUM_CONSTANT => visit_enum_constant,
        RECORD_HEADER => visit_record_header,
        RECORD_COMPONENT => visit_record_component,

        FIELD_DECL => visit_field_decl,
        METHOD_DECL => visit_method_decl,
        CONSTRUCTOR_DECL => visit_constructor_decl,
        COMPACT_CONSTRUCTOR_DECL => visit_compact_constructor_decl,
        ANNOTATION_METHOD_DECL => visit_annotation_method_decl,
        DEFAULT_VALUE => visit_default_value,
        INITIALIZER_BLOCK => visit_initializer_block,
        EMPTY_DECL => visit_empty_decl,
        PARAM_LIST => visit_param_list,
        PARAM => visit_param,
        RECEIVER_PARAM => visit_receiver_param,
        VARIABLE_DECLARATOR => visit_variable_declarator,
        DIMS => visit_dims,
        ARRAY_INITIALIZER => visit_array_initializer,

        PRIMITIVE_TYPE => visit_primitive_type,
        VOID_TYPE => visit_void_type,
        CLASS_TYPE => visit_class_type,
        ARRAY_TYPE => visit_array_type,
        TYPE_ARG_LIST => visit_type_arg_list,
        WILDCARD_TYPE => visit_wildcard_type,
        INTERSECTION_TYPE => visit_intersection_type,
        UNION_TYPE => visit_union_type,

        BLOCK => visit_block,
        LOCAL_VAR_DECL => visit_local_var_decl,
        LOCAL_TYPE_DECL => visit_local_type_decl,
        EXPR_STMT => visit_expr_stmt,
        EMPTY_STMT => visit_empty_stmt,
        LABELED_STMT => visit_labeled_stmt,
        IF_STMT => visit_if_stmt,
        ELSE_BRANCH => visit_else_branch,
        CONDITION => visit_condition,
        ASSERT_STMT => visit_assert_stmt,
        WHILE_STMT => visit_while_stmt,
        DO_WHILE_STMT => visit_do_while_stmt,
        FOR_STMT => visit_for_stmt,
        FOR_INIT => visit_for_init,
        FOR_UPDATE => visit_for_update,
        FOREACH_STMT => visit_foreach_stmt,
        TRY_STMT => visit_try_stmt,
        RESOURCE_SPEC => visit_resource_spec,
        RESOURCE => visit_resource,
        CATCH_CLAUSE => visit_catch_clause,
        CATCH_PARAM => visit_catch_param,
        FINALLY_CLAUSE => visit_finally_clause,
        SWITCH_STMT => visit_switch_stmt,
        RETURN_STMT => visit_return_stmt,
        THROW_STMT => visit_throw_stmt,
        BREAK_STMT => visit_break_stmt,
        CONTINUE_STMT => visit_continue_stmt,
        YIELD_STMT => visit_yield_stmt,
        SYNCHRONIZED_STMT => visit_synchronized_stmt,

        SWITCH_BLOCK => visit_switch_block,
        SWITCH_GROUP => visit_switch_group,
        SWITCH_RULE => visit_switch_rule,
        SWITCH_LABEL => visit_switch_label,
        GUARD => visit_guard,
        TYPE_PATTERN => visit_type_pattern,
        RECORD_PATTERN => visit_record_pattern,
        PATTERN_LIST => visit_pattern_list,
        GUARDED_PATTERN => visit_guarded_pattern,
        PAREN_PATTERN => visit_paren_pattern,
        SWITCH_EXPR => visit_switch_expr,

        LITERAL => visit_literal,
        NAME_EXPR => visit_name_expr,
        PAREN_EXPR => visit_paren_expr,
        THIS_EXPR => visit_this_expr,
        SUPER_EXPR => visit_super_expr,
        CLASS_LITERAL => visit_class_literal,
        FIELD_ACCESS => visit_field_access,
        METHOD_CALL => visit_method_call,
        ARG_LIST => visit_arg_list,
        ARRAY_ACCESS => visit_array_access,
        NEW_EXPR => visit_new_expr,
        ARRAY_CREATION => visit_array_creation,
        DIM_EXPR => visit_dim_expr,
        METHOD_REF => visit_method_ref,
        LAMBDA_EXPR => visit_lambda_expr,
        LAMBDA_PARAM_LIST => visit_lambda_param_list,
        LAMBDA_PARAM => visit_lambda_param,
        CAST_EXPR => visit_cast_expr,
        PREFIX_EXPR => visit_prefix_expr,
        POSTFIX_EXPR => visit_postfix_expr,
        BINARY_EXPR => visit_binary_expr,
        ASSIGN_EXPR => visit_assign_expr,
        CONDITIONAL_EXPR => visit_conditional_expr,
        INSTANCEOF_EXPR => visit_instanceof_expr,

        ERROR => visit_error,
    }
}

impl SyntaxKind {
    /// The upper-case name this kind was declared with.
    pub const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    /// Fixed source text for punctuation and keywords.
    pub const fn text(self) -> Option<&'static str> {
        Self::TEXTS[self as usize]
    }

    pub const fn from_raw(raw: u16) -> Option<Self> {
        if (raw as usize) < Self::ALL.len() { Some(Self::ALL[raw as usize]) } else { None }
    }

    pub const fn is_token(self) -> bool {
        (self as u16) < Self::TOKEN_COUNT
    }

    pub const fn is_node(self) -> bool {
        !self.is_token() && !matches!(self, SyntaxKind::TOMBSTONE)
    }

    pub const fn is_keyword(self) -> bool {
        matches!(self as u16, x if x >= SyntaxKind::ABSTRACT_KW as u16 && x <= SyntaxKind::YIELD_KW as u16)
    }

    /// Keywords that the tokenizer hands out as [`SyntaxKind::NAME`] and the
    /// parser only promotes when the grammar position calls for it.
    pub const fn is_contextual_keyword(self) -> bool {
        matches!(self as u16, x if x >= SyntaxKind::EXPORTS_KW as u16 && x <= SyntaxKind::YIELD_KW as u16)
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::INT_LITERAL
                | SyntaxKind::FLOAT_LITERAL
                | SyntaxKind::CHAR_LITERAL
                | SyntaxKind::STRING_LITERAL
                | SyntaxKind::TEXT_BLOCK
                | SyntaxKind::TRUE_KW
                | SyntaxKind::FALSE_KW
                | SyntaxKind::NULL_KW
        )
    }

    pub const fn is_primitive_type(self) -> bool {
        matches!(
            self,
            SyntaxKind::BOOLEAN_KW
                | SyntaxKind::BYTE_KW
                | SyntaxKind::CHAR_KW
                | SyntaxKind::SHORT_KW
                | SyntaxKind::INT_KW
                | SyntaxKind::LONG_KW
                | SyntaxKind::FLOAT_KW
                | SyntaxKind::DOUBLE_KW
        )
    }

    /// Resolves a reserved word. Contextual keywords are not included.
    pub fn from_keyword(ident: &str) -> Option<Self> {
        let first = SyntaxKind::ABSTRACT_KW as usize;
        let last = SyntaxKind::NULL_KW as usize;
        Self::ALL[first..=last].iter().copied().find(|kind| kind.text() == Some(ident))
    }

    /// Resolves a restricted identifier such as `record` or `yield`.
    pub fn from_contextual_keyword(ident: &str) -> Option<Self> {
        let first = SyntaxKind::EXPORTS_KW as usize;
        let last = SyntaxKind::YIELD_KW as usize;
        Self::ALL[first..=last].iter().copied().find(|kind| kind.text() == Some(ident))
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.text() {
            Some(text) => write!(f, "`{text}`"),
            None => match self {
                SyntaxKind::NAME => f.write_str("identifier"),
                SyntaxKind::INT_LITERAL => f.write_str("integer literal"),
                SyntaxKind::FLOAT_LITERAL => f.write_str("floating-point literal"),
                SyntaxKind::CHAR_LITERAL => f.write_str("character literal"),
                SyntaxKind::STRING_LITERAL => f.write_str("string literal"),
                SyntaxKind::TEXT_BLOCK => f.write_str("text block"),
                SyntaxKind::EOF => f.write_str("end of input"),
                _ => f.write_str(self.name()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SyntaxKind;

    #[test]
    fn kinds_round_trip_through_raw() {
        for (index, kind) in SyntaxKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, index);
            assert_eq!(SyntaxKind::from_raw(index as u16), Some(*kind));
        }
        assert_eq!(SyntaxKind::from_raw(SyntaxKind::ALL.len() as u16), None);
    }

    #[test]
    fn token_and_node_partition() {
        assert!(SyntaxKind::EOF.is_token());
        assert!(!SyntaxKind::EOF.is_node());
        assert!(SyntaxKind::COMPILATION_UNIT.is_node());
        assert!(SyntaxKind::ERROR.is_node());
        assert!(!SyntaxKind::TOMBSTONE.is_node());
        assert!(!SyntaxKind::TOMBSTONE.is_token());
    }

    #[test]
    fn keyword_lookup() {
        assert_eq!(SyntaxKind::from_keyword("class"), Some(SyntaxKind::CLASS_KW));
        assert_eq!(SyntaxKind::from_keyword("null"), Some(SyntaxKind::NULL_KW));
        assert_eq!(SyntaxKind::from_keyword("record"), None);
        assert_eq!(SyntaxKind::from_contextual_keyword("record"), Some(SyntaxKind::RECORD_KW));
        assert_eq!(SyntaxKind::from_contextual_keyword("non-sealed"), Some(SyntaxKind::NON_SEALED_KW));
        assert!(SyntaxKind::WHEN_KW.is_contextual_keyword());
        assert!(!SyntaxKind::WHILE_KW.is_contextual_keyword());
        assert!(SyntaxKind::WHILE_KW.is_keyword());
    }

    #[test]
    fn display_uses_source_text() {
        assert_eq!(SyntaxKind::SEMICOLON.to_string(), "`;`");
        assert_eq!(SyntaxKind::NAME.to_string(), "identifier");
        assert_eq!(SyntaxKind::CLASS_DECL.name(), "CLASS_DECL");
    }
}
