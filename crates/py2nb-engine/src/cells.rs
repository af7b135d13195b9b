//! # Cell segmentation
//!
//! Turns source lines plus their tag snapshots into a stream of
//! [`CellEvent`]s: one per line, saying whether the line starts a new cell
//! and whether that cell is code or markdown, then a single
//! [`CellEvent::End`].
//!
//! Class and function depth are rebuilt from the enter/exit tags alone. A
//! line opening a definition counts as inside it; a line closing one still
//! counts as inside it and the depth drops only after the line is emitted.
//!
//! A line stays in the current cell when:
//!
//! 1. it is inside a class and the previous line was too (a class is always
//!    one cell, whatever its methods do), or
//! 2. the function depth and cell type are unchanged.
//!
//! The first line always opens a cell.

use std::fmt;
use std::iter::FusedIterator;

use crate::source::SourceLines;
use crate::tagging::LineTagMap;

/// Bare delimiters of a documentation block.
const DOC_DELIMITERS: &[&str] = &["\"\"\"", "'''"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    Code,
    Markdown,
}

impl CellType {
    /// The notebook `cell_type` value.
    pub fn as_str(self) -> &'static str {
        match self {
            CellType::Code => "code",
            CellType::Markdown => "markdown",
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segmentation decision for one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEvent<'a> {
    /// 0-based line number.
    pub line: usize,
    pub text: &'a str,
    pub is_new_cell: bool,
    pub cell_type: CellType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEvent<'a> {
    Line(LineEvent<'a>),
    /// No more lines follow.
    End,
}

/// Lazy segmentation over one file. Yields every line once, then `End`,
/// then nothing.
#[derive(Debug)]
pub struct Segmenter<'a> {
    source: &'a SourceLines,
    tags: &'a LineTagMap,
    next_line: usize,
    finished: bool,
    class_depth: usize,
    func_depth: usize,
    last_class_depth: usize,
    last_func_depth: usize,
    last_cell_type: CellType,
}

impl<'a> Segmenter<'a> {
    pub fn new(source: &'a SourceLines, tags: &'a LineTagMap) -> Self {
        Self {
            source,
            tags,
            next_line: 0,
            finished: false,
            class_depth: 0,
            func_depth: 0,
            last_class_depth: 0,
            last_func_depth: 0,
            last_cell_type: CellType::Markdown,
        }
    }

    fn segment_line(&mut self, line: usize, text: &'a str) -> LineEvent<'a> {
        let tags = self.tags.get(line);

        let mut cell_type = match tags {
            Some(_) if DOC_DELIMITERS.contains(&text.trim()) => CellType::Markdown,
            Some(_) => CellType::Code,
            None => CellType::Markdown,
        };

        if let Some(tags) = tags {
            if tags.enters_class() {
                self.class_depth += 1;
            }
            if tags.enters_function() {
                self.func_depth += 1;
            }
        }

        if self.class_depth > 0 || self.func_depth > 0 {
            cell_type = CellType::Code;
        }

        let is_new_cell = if line == 0 {
            true
        } else if self.class_depth > 0 && self.last_class_depth != 0 {
            false
        } else {
            !(self.func_depth == self.last_func_depth && cell_type == self.last_cell_type)
        };

        log::trace!(
            "line {line}: new={is_new_cell} type={cell_type} class={} func={}",
            self.class_depth,
            self.func_depth
        );

        LineEvent {
            line,
            text,
            is_new_cell,
            cell_type,
        }
    }

    /// Apply this line's exits once its event has been handed out.
    fn close_line(&mut self, event: &LineEvent<'_>) {
        if let Some(tags) = self.tags.get(event.line) {
            if tags.exits_class() {
                self.class_depth = decrement(self.class_depth, "class", event.line);
            }
            if tags.exits_function() {
                self.func_depth = decrement(self.func_depth, "function", event.line);
            }
        }

        self.last_class_depth = self.class_depth;
        self.last_func_depth = self.func_depth;
        self.last_cell_type = event.cell_type;
    }
}

fn decrement(depth: usize, what: &str, line: usize) -> usize {
    if depth == 0 {
        log::debug!("line {line}: {what} exit without a matching enter");
    }
    depth.saturating_sub(1)
}

impl<'a> Iterator for Segmenter<'a> {
    type Item = CellEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let line = self.next_line;
        match self.source.get(line) {
            Some(text) => {
                let event = self.segment_line(line, text);
                self.close_line(&event);
                self.next_line += 1;
                Some(CellEvent::Line(event))
            }
            None => {
                self.finished = true;
                Some(CellEvent::End)
            }
        }
    }
}

impl FusedIterator for Segmenter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ConstructKind;
    use crate::tagging::{Flag, TagSnapshot};
    use pretty_assertions::assert_eq;

    fn snapshot(flags: &[Flag]) -> TagSnapshot {
        TagSnapshot {
            flags: flags.iter().copied().collect(),
            ..TagSnapshot::default()
        }
    }

    fn stmt() -> TagSnapshot {
        snapshot(&[Flag::Construct(ConstructKind::Expr)])
    }

    fn tag_map(entries: Vec<(usize, TagSnapshot)>) -> LineTagMap {
        let mut map = LineTagMap::new();
        for (line, snapshot) in entries {
            map.record(line, snapshot);
        }
        map
    }

    /// `(is_new_cell, cell_type)` per line, checking the stream ends once.
    fn decisions(source: &SourceLines, tags: &LineTagMap) -> Vec<(bool, CellType)> {
        let events: Vec<_> = Segmenter::new(source, tags).collect();
        assert_eq!(events.last(), Some(&CellEvent::End));
        assert_eq!(events.len(), source.len() + 1);

        events
            .iter()
            .filter_map(|event| match event {
                CellEvent::Line(e) => Some((e.is_new_cell, e.cell_type)),
                CellEvent::End => None,
            })
            .collect()
    }

    #[test]
    fn test_single_statement_is_one_code_cell() {
        let source = SourceLines::from_text("x = 1\n");
        let tags = tag_map(vec![(0, stmt())]);

        assert_eq!(decisions(&source, &tags), vec![(true, CellType::Code)]);
    }

    #[test]
    fn test_delimiter_then_function() {
        // Given a bare delimiter line followed by a function
        let source = SourceLines::from_text("\"\"\"\ndef f():\n    return 1\n");
        let tags = tag_map(vec![
            (0, stmt()),
            (1, snapshot(&[Flag::FuncEnter])),
            (2, snapshot(&[Flag::FuncExit])),
        ]);

        // Then the delimiter is markdown and the function one code cell
        assert_eq!(
            decisions(&source, &tags),
            vec![
                (true, CellType::Markdown),
                (true, CellType::Code),
                (false, CellType::Code),
            ]
        );
    }

    #[test]
    fn test_empty_source_yields_only_end() {
        let source = SourceLines::from_text("");
        let tags = LineTagMap::new();

        let events: Vec<_> = Segmenter::new(&source, &tags).collect();
        assert_eq!(events, vec![CellEvent::End]);
    }

    #[test]
    fn test_iterator_is_fused_after_end() {
        let source = SourceLines::from_text("x\n");
        let tags = LineTagMap::new();
        let mut segmenter = Segmenter::new(&source, &tags);

        assert!(matches!(segmenter.next(), Some(CellEvent::Line(_))));
        assert_eq!(segmenter.next(), Some(CellEvent::End));
        assert_eq!(segmenter.next(), None);
        assert_eq!(segmenter.next(), None);
    }

    #[test]
    fn test_class_with_two_methods_is_one_cell() {
        let source = SourceLines::from_text(
            "class A:\n    def a(self):\n        pass\n\n    def b(self):\n        return 2\n",
        );
        let tags = tag_map(vec![
            (0, snapshot(&[Flag::ClassEnter])),
            (1, snapshot(&[Flag::FuncEnter])),
            (2, snapshot(&[Flag::FuncExit])),
            (4, snapshot(&[Flag::FuncEnter])),
            (5, snapshot(&[Flag::FuncExit, Flag::ClassExit])),
        ]);

        let result = decisions(&source, &tags);
        assert_eq!(result[0], (true, CellType::Code));
        assert!(result[1..].iter().all(|d| *d == (false, CellType::Code)));
    }

    #[test]
    fn test_untagged_lines_are_markdown() {
        let source = SourceLines::from_text("x = 1\n\n# note\ny = 2\n");
        let tags = tag_map(vec![(0, stmt()), (3, stmt())]);

        assert_eq!(
            decisions(&source, &tags),
            vec![
                (true, CellType::Code),
                (true, CellType::Markdown),
                (false, CellType::Markdown),
                (true, CellType::Code),
            ]
        );
    }

    #[test]
    fn test_blank_line_inside_function_stays_code() {
        let source = SourceLines::from_text("def f():\n\n    return 1\n");
        let tags = tag_map(vec![
            (0, snapshot(&[Flag::FuncEnter])),
            (2, snapshot(&[Flag::FuncExit])),
        ]);

        assert_eq!(
            decisions(&source, &tags),
            vec![
                (true, CellType::Code),
                (false, CellType::Code),
                (false, CellType::Code),
            ]
        );
    }

    #[test]
    fn test_consecutive_functions_split_cells() {
        let source = SourceLines::from_text("def f():\n    pass\ndef g():\n    pass\n");
        let tags = tag_map(vec![
            (0, snapshot(&[Flag::FuncEnter])),
            (1, snapshot(&[Flag::FuncExit])),
            (2, snapshot(&[Flag::FuncEnter])),
            (3, snapshot(&[Flag::FuncExit])),
        ]);

        let new_cells: Vec<bool> = decisions(&source, &tags).iter().map(|d| d.0).collect();
        assert_eq!(new_cells, vec![true, false, true, false]);
    }

    #[test]
    fn test_code_right_after_function_joins_its_cell() {
        // Depth is back to zero after the exit line and the type is still
        // code, so nothing marks a boundary.
        let source = SourceLines::from_text("def f():\n    pass\nx = f()\n\ny = 2\n");
        let tags = tag_map(vec![
            (0, snapshot(&[Flag::FuncEnter])),
            (1, snapshot(&[Flag::FuncExit])),
            (2, stmt()),
            (4, stmt()),
        ]);

        let new_cells: Vec<bool> = decisions(&source, &tags).iter().map(|d| d.0).collect();
        assert_eq!(new_cells, vec![true, false, false, true, true]);
    }

    #[test]
    fn test_unmatched_exit_saturates_at_zero() {
        let source = SourceLines::from_text("x = 1\ny = 2\n\n");
        let tags = tag_map(vec![
            (0, snapshot(&[Flag::FuncExit, Flag::ClassExit])),
            (1, stmt()),
        ]);

        // The stray exit leaves both depths at zero, so line 1 continues line 0
        // and the blank line is top-level markdown again.
        assert_eq!(
            decisions(&source, &tags),
            vec![
                (true, CellType::Code),
                (false, CellType::Code),
                (true, CellType::Markdown),
            ]
        );
    }

    #[test]
    fn test_continuation_outside_class_keeps_type() {
        let source = SourceLines::from_text(
            "import os\n\"\"\"\nText\n\"\"\"\ndef f():\n    return 1\n\nx = 1\n",
        );
        let tags = tag_map(vec![
            (0, stmt()),
            (1, stmt()),
            (4, snapshot(&[Flag::FuncEnter])),
            (5, snapshot(&[Flag::FuncExit])),
            (7, stmt()),
        ]);

        let events: Vec<LineEvent<'_>> = Segmenter::new(&source, &tags)
            .filter_map(|event| match event {
                CellEvent::Line(e) => Some(e),
                CellEvent::End => None,
            })
            .collect();

        for pair in events.windows(2) {
            if !pair[1].is_new_cell {
                assert_eq!(pair[0].cell_type, pair[1].cell_type, "line {}", pair[1].line);
            }
        }
    }

    #[test]
    fn test_events_carry_line_text() {
        let source = SourceLines::from_text("a = 1  \nb = 2\n");
        let tags = tag_map(vec![(0, stmt()), (1, stmt())]);

        let texts: Vec<&str> = Segmenter::new(&source, &tags)
            .filter_map(|event| match event {
                CellEvent::Line(e) => Some(e.text),
                CellEvent::End => None,
            })
            .collect();
        assert_eq!(texts, vec!["a = 1", "b = 2"]);
    }
}
