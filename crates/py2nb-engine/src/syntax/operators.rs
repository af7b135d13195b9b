//! Operator symbol tables.
//!
//! Binary, boolean, comparison and unary operators each have a fixed symbol
//! set. Augmented assignments (`+=`, `<<=`, ...) resolve through the binary
//! table once the trailing `=` is removed.

/// Binary arithmetic and bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

/// Short-circuiting boolean operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// Comparison operators, including the two-word forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Invert,
    Not,
    UAdd,
    USub,
}

/// Any operator attached to a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Binary(BinOp),
    Bool(BoolOp),
    Compare(CmpOp),
    Unary(UnaryOp),
    /// Augmented assignment, carrying the underlying binary operator.
    Augmented(BinOp),
}

const BINOP_SYMBOLS: &[(&str, BinOp)] = &[
    ("+", BinOp::Add),
    ("-", BinOp::Sub),
    ("*", BinOp::Mult),
    ("@", BinOp::MatMult),
    ("/", BinOp::Div),
    ("%", BinOp::Mod),
    ("**", BinOp::Pow),
    ("<<", BinOp::LShift),
    (">>", BinOp::RShift),
    ("|", BinOp::BitOr),
    ("^", BinOp::BitXor),
    ("&", BinOp::BitAnd),
    ("//", BinOp::FloorDiv),
];

const BOOLOP_SYMBOLS: &[(&str, BoolOp)] = &[("and", BoolOp::And), ("or", BoolOp::Or)];

const CMPOP_SYMBOLS: &[(&str, CmpOp)] = &[
    ("==", CmpOp::Eq),
    ("!=", CmpOp::NotEq),
    ("<>", CmpOp::NotEq),
    ("<", CmpOp::Lt),
    ("<=", CmpOp::LtE),
    (">", CmpOp::Gt),
    (">=", CmpOp::GtE),
    ("is", CmpOp::Is),
    ("is not", CmpOp::IsNot),
    ("in", CmpOp::In),
    ("not in", CmpOp::NotIn),
];

const UNARYOP_SYMBOLS: &[(&str, UnaryOp)] = &[
    ("~", UnaryOp::Invert),
    ("not", UnaryOp::Not),
    ("+", UnaryOp::UAdd),
    ("-", UnaryOp::USub),
];

fn lookup<T: Copy>(table: &[(&str, T)], symbol: &str) -> Option<T> {
    table
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, op)| *op)
}

/// Which operator table a symbol is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Binary,
    Bool,
    Compare,
    Unary,
    Augmented,
}

impl OperatorClass {
    /// The table used for operator tokens found under a grammar node kind.
    pub fn of_grammar(kind: &str) -> Option<Self> {
        match kind {
            "binary_operator" => Some(Self::Binary),
            "boolean_operator" => Some(Self::Bool),
            "comparison_operator" => Some(Self::Compare),
            "unary_operator" | "not_operator" => Some(Self::Unary),
            "augmented_assignment" => Some(Self::Augmented),
            _ => None,
        }
    }
}

impl Operator {
    /// Resolves `symbol` in the table for `class`.
    pub fn from_symbol(class: OperatorClass, symbol: &str) -> Option<Self> {
        match class {
            OperatorClass::Binary => lookup(BINOP_SYMBOLS, symbol).map(Operator::Binary),
            OperatorClass::Bool => lookup(BOOLOP_SYMBOLS, symbol).map(Operator::Bool),
            OperatorClass::Compare => lookup(CMPOP_SYMBOLS, symbol).map(Operator::Compare),
            OperatorClass::Unary => lookup(UNARYOP_SYMBOLS, symbol).map(Operator::Unary),
            OperatorClass::Augmented => symbol
                .strip_suffix('=')
                .and_then(|base| lookup(BINOP_SYMBOLS, base))
                .map(Operator::Augmented),
        }
    }
}
