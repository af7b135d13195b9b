//! Construct classification table.
//!
//! Every syntactic form the tagger can meet is a [`ConstructKind`]. The table
//! answers two questions about a kind:
//!
//! - is it **line-significant**, i.e. does visiting it record a tag snapshot
//!   for its line?
//! - is it **compound**, i.e. does it own a body (or is it the body)?
//!
//! Both answers are exhaustive `match`es, so a kind without an entry cannot
//! be compiled. The only place an unmapped kind can still show up is the
//! grammar boundary: [`ConstructKind::from_grammar`] returns `None` for a
//! grammar node kind the table does not know, which the tagger turns into a
//! fatal [`ClassificationError`](crate::tagging::ClassificationError).

use std::fmt;

/// Syntactic forms recognized by the tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstructKind {
    // === Structure ===
    Module,
    Body,
    Decorated,
    Decorator,
    Parameters,
    Parameter,
    ArgumentList,
    Keyword,
    Annotation,

    // === Definitions ===
    FunctionDef,
    ClassDef,
    Lambda,

    // === Simple statements ===
    Expr,
    Assign,
    AugAssign,
    Return,
    Pass,
    Break,
    Continue,
    Delete,
    Global,
    Nonlocal,
    Raise,
    Assert,
    Import,
    ImportFrom,
    Alias,
    Print,
    Chevron,
    Exec,
    TypeAlias,

    // === Compound statements ===
    If,
    Elif,
    Else,
    For,
    While,
    With,
    WithItem,
    Try,
    ExceptHandler,
    Finally,
    Match,
    Case,
    Pattern,

    // === Expressions ===
    BinOp,
    BoolOp,
    UnaryOp,
    Compare,
    IfExp,
    NamedExpr,
    Call,
    Attribute,
    Subscript,
    Slice,
    Starred,
    Await,
    Yield,
    Paren,
    Tuple,
    List,
    Set,
    Dict,
    ListComp,
    SetComp,
    DictComp,
    GeneratorExp,
    Comprehension,
    Name,
    Num,
    Str,
    FormattedValue,
    Constant,
    Ellipsis,
}

impl ConstructKind {
    /// Maps a tree-sitter-python node kind onto its construct kind.
    ///
    /// Returns `None` for kinds absent from the table.
    pub fn from_grammar(kind: &str) -> Option<Self> {
        use ConstructKind::*;

        let construct = match kind {
            "module" => Module,
            "block" => Body,
            "decorated_definition" => Decorated,
            "decorator" => Decorator,
            "parameters" | "lambda_parameters" => Parameters,
            "default_parameter"
            | "typed_parameter"
            | "typed_default_parameter"
            | "list_splat_pattern"
            | "dictionary_splat_pattern"
            | "keyword_separator"
            | "positional_separator" => Parameter,
            "argument_list" => ArgumentList,
            "keyword_argument" => Keyword,
            "type" | "generic_type" | "union_type" | "constrained_type" | "member_type"
            | "splat_type" | "type_parameter" => Annotation,

            "function_definition" => FunctionDef,
            "class_definition" => ClassDef,
            "lambda" => Lambda,

            "expression_statement" => Expr,
            "assignment" => Assign,
            "augmented_assignment" => AugAssign,
            "return_statement" => Return,
            "pass_statement" => Pass,
            "break_statement" => Break,
            "continue_statement" => Continue,
            "delete_statement" => Delete,
            "global_statement" => Global,
            "nonlocal_statement" => Nonlocal,
            "raise_statement" => Raise,
            "assert_statement" => Assert,
            "import_statement" | "future_import_statement" => Import,
            "import_from_statement" => ImportFrom,
            "aliased_import" | "dotted_name" | "relative_import" | "import_prefix"
            | "wildcard_import" => Alias,
            "print_statement" => Print,
            "chevron" => Chevron,
            "exec_statement" => Exec,
            "type_alias_statement" => TypeAlias,

            "if_statement" => If,
            "elif_clause" => Elif,
            "else_clause" => Else,
            "for_statement" => For,
            "while_statement" => While,
            "with_statement" => With,
            "with_clause" | "with_item" => WithItem,
            "try_statement" => Try,
            "except_clause" | "except_group_clause" => ExceptHandler,
            "finally_clause" => Finally,
            "match_statement" => Match,
            "case_clause" => Case,
            "case_pattern" | "class_pattern" | "complex_pattern" | "dict_pattern"
            | "keyword_pattern" | "splat_pattern" | "union_pattern" | "as_pattern"
            | "as_pattern_target" | "list_pattern" | "tuple_pattern" => Pattern,

            "binary_operator" => BinOp,
            "boolean_operator" => BoolOp,
            "unary_operator" | "not_operator" => UnaryOp,
            "comparison_operator" => Compare,
            "conditional_expression" => IfExp,
            "named_expression" => NamedExpr,
            "call" => Call,
            "attribute" => Attribute,
            "subscript" => Subscript,
            "slice" => Slice,
            "list_splat" | "dictionary_splat" | "parenthesized_list_splat" => Starred,
            "await" => Await,
            "yield" => Yield,
            "parenthesized_expression" => Paren,
            "tuple" | "expression_list" | "pattern_list" => Tuple,
            "list" => List,
            "set" => Set,
            "dictionary" | "pair" => Dict,
            "list_comprehension" => ListComp,
            "set_comprehension" => SetComp,
            "dictionary_comprehension" => DictComp,
            "generator_expression" => GeneratorExp,
            "for_in_clause" | "if_clause" => Comprehension,
            "identifier" | "keyword_identifier" => Name,
            "integer" | "float" => Num,
            "string" | "concatenated_string" | "string_start" | "string_content"
            | "string_end" | "escape_sequence" | "escape_interpolation" => Str,
            "interpolation" | "format_expression" | "format_specifier" | "type_conversion" => {
                FormattedValue
            }
            "true" | "false" | "none" => Constant,
            "ellipsis" => Ellipsis,

            _ => return None,
        };

        Some(construct)
    }

    /// Whether visiting this kind records a tag snapshot for its line.
    pub const fn is_line_significant(self) -> bool {
        use ConstructKind::*;

        match self {
            ClassDef | FunctionDef | Assign | Body | Expr | For | If | Import | ImportFrom
            | Pass | Print | Return | While | With => true,

            Module | Decorated | Decorator | Parameters | Parameter | ArgumentList | Keyword
            | Annotation | Lambda | AugAssign | Break | Continue | Delete | Global | Nonlocal
            | Raise | Assert | Alias | Chevron | Exec | TypeAlias | Elif | Else | WithItem
            | Try | ExceptHandler | Finally | Match | Case | Pattern | BinOp | BoolOp
            | UnaryOp | Compare | IfExp | NamedExpr | Call | Attribute | Subscript | Slice
            | Starred | Await | Yield | Paren | Tuple | List | Set | Dict | ListComp
            | SetComp | DictComp | GeneratorExp | Comprehension | Name | Num | Str
            | FormattedValue | Constant | Ellipsis => false,
        }
    }

    /// Whether this kind owns a body and therefore opens a nesting level.
    pub const fn is_compound(self) -> bool {
        use ConstructKind::*;

        matches!(
            self,
            Module
                | Body
                | Decorated
                | FunctionDef
                | ClassDef
                | If
                | Elif
                | Else
                | For
                | While
                | With
                | Try
                | ExceptHandler
                | Finally
                | Match
                | Case
        )
    }

    /// Lowercase name used in diagnostics and tag dumps.
    pub const fn name(self) -> &'static str {
        use ConstructKind::*;

        match self {
            Module => "module",
            Body => "body",
            Decorated => "decorated",
            Decorator => "decorator",
            Parameters => "parameters",
            Parameter => "parameter",
            ArgumentList => "argument_list",
            Keyword => "keyword",
            Annotation => "annotation",
            FunctionDef => "functiondef",
            ClassDef => "classdef",
            Lambda => "lambda",
            Expr => "expr",
            Assign => "assign",
            AugAssign => "augassign",
            Return => "return",
            Pass => "pass",
            Break => "break",
            Continue => "continue",
            Delete => "delete",
            Global => "global",
            Nonlocal => "nonlocal",
            Raise => "raise",
            Assert => "assert",
            Import => "import",
            ImportFrom => "importfrom",
            Alias => "alias",
            Print => "print",
            Chevron => "chevron",
            Exec => "exec",
            TypeAlias => "typealias",
            If => "if",
            Elif => "elif",
            Else => "else",
            For => "for",
            While => "while",
            With => "with",
            WithItem => "withitem",
            Try => "try",
            ExceptHandler => "excepthandler",
            Finally => "finally",
            Match => "match",
            Case => "case",
            Pattern => "pattern",
            BinOp => "binop",
            BoolOp => "boolop",
            UnaryOp => "unaryop",
            Compare => "compare",
            IfExp => "ifexp",
            NamedExpr => "namedexpr",
            Call => "call",
            Attribute => "attribute",
            Subscript => "subscript",
            Slice => "slice",
            Starred => "starred",
            Await => "await",
            Yield => "yield",
            Paren => "paren",
            Tuple => "tuple",
            List => "list",
            Set => "set",
            Dict => "dict",
            ListComp => "listcomp",
            SetComp => "setcomp",
            DictComp => "dictcomp",
            GeneratorExp => "generatorexp",
            Comprehension => "comprehension",
            Name => "name",
            Num => "num",
            Str => "str",
            FormattedValue => "formattedvalue",
            Constant => "constant",
            Ellipsis => "ellipsis",
        }
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
