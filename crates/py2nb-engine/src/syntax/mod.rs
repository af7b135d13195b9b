//! # Syntax
//!
//! The parser front end. Source text goes through tree-sitter-python and the
//! resulting concrete syntax tree is lowered into a small owned [`SyntaxNode`]
//! tree that the tagger walks:
//!
//! ```text
//! source text → tree-sitter CST → lower → SyntaxNode tree → tagger
//! ```
//!
//! Lowering keeps only what tagging needs: the grammar kind of every named
//! node, an optional 1-based source line, and the operator tokens of
//! operator-bearing expressions. Comments are dropped, like Python's own AST
//! drops them.
//!
//! - **`kinds`**: the construct classification table
//! - **`operators`**: operator symbol tables
//! - **`lower`**: CST → [`SyntaxNode`] conversion

pub mod kinds;
pub mod lower;
pub mod operators;

pub use kinds::ConstructKind;
pub use operators::{Operator, OperatorClass};

use tree_sitter::Parser;

/// A node of the lowered syntax tree.
///
/// `kind` is the grammar's node kind; it is classified into a
/// [`ConstructKind`] by the tagger, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: &'static str,
    /// 1-based source line, or `None` for synthetic/structural nodes.
    pub line: Option<usize>,
    /// Raw operator symbols (`+`, `not in`, `<<=`, ...), in source order.
    pub operators: Vec<&'static str>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: &'static str, line: Option<usize>) -> Self {
        Self {
            kind,
            line,
            operators: Vec::new(),
            children: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    #[cfg(test)]
    pub fn with_operator(mut self, symbol: &'static str) -> Self {
        self.operators.push(symbol);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to load the Python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("Parser produced no syntax tree")]
    NoTree,
    #[error("Invalid syntax at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
    #[error("Nesting too deep at line {line}")]
    TooDeep { line: usize },
}

/// tree-sitter parser loaded with the Python grammar.
///
/// One instance can parse any number of sources; each call builds a fresh
/// tree.
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Parse `text` and lower it into a [`SyntaxNode`] tree.
    ///
    /// Fails with [`ParseError::Syntax`] at the first error or missing node
    /// if the source does not parse cleanly, and with [`ParseError::TooDeep`]
    /// if it nests deeper than [`lower::MAX_NESTING`].
    pub fn parse(&mut self, text: &str) -> Result<SyntaxNode, ParseError> {
        let tree = self.parser.parse(text, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();

        if root.has_error() {
            let (line, column) = lower::first_error_position(root).unwrap_or((1, 1));
            log::debug!("syntax error at {line}:{column}");
            return Err(ParseError::Syntax { line, column });
        }

        lower::lower(root)
    }
}
