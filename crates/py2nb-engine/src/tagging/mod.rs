//! # Tagging
//!
//! A depth-first walk over the [`SyntaxNode`] tree that records, for every
//! source line hosting a line-significant construct, which flags were active
//! at that point.
//!
//! ## Flag lifecycle
//!
//! - compound line-significant constructs (`if`, `for`, a body, a definition)
//!   stay present from entry until their subtree is done;
//! - every other line-significant construct is present only while its own
//!   subtree is visited;
//! - `func_enter`/`class_enter` are set on entering a definition and cleared
//!   once its body has recorded its snapshot;
//! - `func_exit`/`class_exit` are set for the single snapshot recorded when a
//!   definition is left. A class whose last visited node is a function exit
//!   records both.
//!
//! Snapshots are keyed by 0-based line. When several significant constructs
//! share a line, the last one visited overwrites the earlier ones.

pub mod state;

pub use state::{ActiveStateSet, Flag, TagSnapshot};

use std::collections::BTreeMap;
use std::fmt;

use crate::syntax::{ConstructKind, Operator, OperatorClass, SyntaxNode};

/// A syntax tree contained something the classification table has no entry
/// for. This is a defect in the table, never a problem with the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("Unknown construct kind '{kind}' at line {line}")]
    UnknownConstruct { kind: String, line: usize },
    #[error("Unknown operator '{symbol}' in {kind} at line {line}")]
    UnknownOperator {
        symbol: String,
        kind: String,
        line: usize,
    },
}

/// Tag snapshots keyed by 0-based source line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTagMap {
    lines: BTreeMap<usize, TagSnapshot>,
}

impl LineTagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `snapshot` for `line`, replacing whatever was there.
    pub fn record(&mut self, line: usize, snapshot: TagSnapshot) {
        self.lines.insert(line, snapshot);
    }

    pub fn get(&self, line: usize) -> Option<&TagSnapshot> {
        self.lines.get(&line)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TagSnapshot)> {
        self.lines.iter().map(|(line, snapshot)| (*line, snapshot))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for LineTagMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (line, snapshot) in self.iter() {
            writeln!(f, "{line:4} {snapshot}")?;
        }
        Ok(())
    }
}

/// Tag every line of `root`.
pub fn tag(root: &SyntaxNode) -> Result<LineTagMap, ClassificationError> {
    Tagger::new().tag(root)
}

/// Traversal state for one file. Build a fresh one per tree.
#[derive(Debug, Default)]
pub struct Tagger {
    state: ActiveStateSet,
    stack: Vec<ConstructKind>,
    cursor: usize,
    open_classes: usize,
    open_functions: usize,
    /// The most recently finished node was a function definition.
    trailing_func_exit: bool,
    lines: LineTagMap,
}

impl Tagger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, root: &SyntaxNode) -> Result<LineTagMap, ClassificationError> {
        self.visit(root)?;

        debug_assert!(self.stack.is_empty(), "unbalanced nesting stack");
        debug_assert!(self.state.is_empty(), "flags left open after traversal");
        debug_assert_eq!((self.open_classes, self.open_functions), (0, 0));

        log::debug!("tagged {} lines", self.lines.len());
        Ok(self.lines)
    }

    fn visit(&mut self, node: &SyntaxNode) -> Result<(), ClassificationError> {
        self.trailing_func_exit = false;
        if let Some(line) = node.line {
            self.cursor = line.saturating_sub(1);
        }

        let kind = self.classify(node)?;
        self.check_operators(node)?;

        match kind {
            ConstructKind::FunctionDef | ConstructKind::ClassDef => self.visit_definition(kind, node),
            ConstructKind::Body => self.visit_body(node),
            kind if kind.is_compound() => self.visit_compound(kind, node),
            kind => self.visit_simple(kind, node),
        }
    }

    fn visit_definition(
        &mut self,
        kind: ConstructKind,
        node: &SyntaxNode,
    ) -> Result<(), ClassificationError> {
        let (enter, exit) = match kind {
            ConstructKind::ClassDef => {
                self.open_classes += 1;
                (Flag::ClassEnter, Flag::ClassExit)
            }
            _ => {
                self.open_functions += 1;
                (Flag::FuncEnter, Flag::FuncExit)
            }
        };

        self.stack.push(kind);
        self.state.insert(Flag::Construct(kind));
        self.state.insert(enter);
        self.record(kind);

        self.visit_children(node)?;

        // Nothing has been visited since the last method was left.
        let carries_func_exit = kind == ConstructKind::ClassDef && self.trailing_func_exit;

        self.state.insert(exit);
        if carries_func_exit {
            self.state.insert(Flag::FuncExit);
        }
        self.record(kind);
        self.state.remove(exit);
        self.state.remove(Flag::FuncExit);
        self.state.remove(Flag::Construct(kind));
        self.stack.pop();

        match kind {
            ConstructKind::ClassDef => self.open_classes -= 1,
            _ => self.open_functions -= 1,
        }

        self.trailing_func_exit = kind == ConstructKind::FunctionDef;
        Ok(())
    }

    fn visit_body(&mut self, node: &SyntaxNode) -> Result<(), ClassificationError> {
        let flag = Flag::Construct(ConstructKind::Body);

        self.stack.push(ConstructKind::Body);
        self.state.insert(flag);
        self.record(ConstructKind::Body);

        // The body snapshot above is the last one to see the enter flags.
        self.state.remove(Flag::ClassEnter);
        self.state.remove(Flag::FuncEnter);

        for child in &node.children {
            self.visit(child)?;
        }

        self.state.remove(flag);
        self.stack.pop();
        Ok(())
    }

    fn visit_compound(
        &mut self,
        kind: ConstructKind,
        node: &SyntaxNode,
    ) -> Result<(), ClassificationError> {
        self.stack.push(kind);
        self.visit_flagged(kind, node)?;
        self.stack.pop();
        Ok(())
    }

    fn visit_simple(
        &mut self,
        kind: ConstructKind,
        node: &SyntaxNode,
    ) -> Result<(), ClassificationError> {
        self.visit_flagged(kind, node)
    }

    /// Keep `kind`'s flag present for the whole subtree when it is significant.
    fn visit_flagged(
        &mut self,
        kind: ConstructKind,
        node: &SyntaxNode,
    ) -> Result<(), ClassificationError> {
        let significant = kind.is_line_significant();
        if significant {
            self.state.insert(Flag::Construct(kind));
            self.record(kind);
        }

        self.visit_children(node)?;

        if significant {
            self.state.remove(Flag::Construct(kind));
        }
        Ok(())
    }

    fn visit_children(&mut self, node: &SyntaxNode) -> Result<(), ClassificationError> {
        for child in &node.children {
            self.visit(child)?;
        }
        Ok(())
    }

    fn record(&mut self, kind: ConstructKind) {
        if !kind.is_line_significant() {
            return;
        }

        let snapshot = TagSnapshot {
            flags: self.state.significant(),
            open_class_count: self.open_classes,
            open_func_count: self.open_functions,
        };
        log::trace!("line {}: {kind} {snapshot}", self.cursor);
        self.lines.record(self.cursor, snapshot);
    }

    fn classify(&self, node: &SyntaxNode) -> Result<ConstructKind, ClassificationError> {
        ConstructKind::from_grammar(node.kind).ok_or_else(|| {
            ClassificationError::UnknownConstruct {
                kind: node.kind.to_string(),
                line: self.cursor + 1,
            }
        })
    }

    fn check_operators(&self, node: &SyntaxNode) -> Result<(), ClassificationError> {
        if node.operators.is_empty() {
            return Ok(());
        }

        let class = OperatorClass::of_grammar(node.kind);
        for symbol in &node.operators {
            if class.and_then(|class| Operator::from_symbol(class, symbol)).is_none() {
                return Err(ClassificationError::UnknownOperator {
                    symbol: symbol.to_string(),
                    kind: node.kind.to_string(),
                    line: self.cursor + 1,
                });
            }
        }
        Ok(())
    }
}
