//! # Notebook serialization
//!
//! [`NotebookWriter`] is a push-based sink for [`CellEvent`]s. It writes the
//! notebook document as the events arrive and keeps nothing but the type of
//! the currently open cell, so documents of any length stream straight to
//! the output.
//!
//! The last source string of the open cell is left unterminated until the
//! next event says whether the cell continues (the string gets its `\n` and a
//! sibling follows) or ends (the string and the cell are closed).
//!
//! Layout follows nbformat's own one-space indentation.

use std::io::{self, Write};

use crate::cells::{CellEvent, CellType, LineEvent};

const PREAMBLE: &str = "{\n \"cells\": [";

const CODE_CELL_HEAD: &str = "\n  {\n   \"cell_type\": \"code\",\n   \"execution_count\": 2,\n   \"metadata\": {\n    \"collapsed\": false\n   },\n   \"outputs\": [],\n   \"source\": [\n    ";

const MARKDOWN_CELL_HEAD: &str =
    "\n  {\n   \"cell_type\": \"markdown\",\n   \"metadata\": {},\n   \"source\": [\n    ";

const SOURCE_SEPARATOR: &str = "\\n\",\n    ";

const CELL_TAIL: &str = "\"\n   ]\n  }";

/// Fixed kernel and format metadata closing every document.
const POSTAMBLE: &str = r#"
 ],
 "metadata": {
  "anaconda-cloud": {},
  "kernelspec": {
   "display_name": "python3",
   "language": "python",
   "name": "python3"
  },
  "language_info": {
   "codemirror_mode": {
    "name": "ipython",
    "version": 3
   },
   "file_extension": ".py",
   "mimetype": "text/x-python",
   "name": "python",
   "nbconvert_exporter": "python",
   "pygments_lexer": "ipython3",
   "version": "3.4.2"
  }
 },
 "nbformat": 4,
 "nbformat_minor": 0
}
"#;

#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    #[error("Failed to write notebook: {0}")]
    Io(#[from] io::Error),
    #[error("Line {line} continues a cell but no cell is open")]
    NoOpenCell { line: usize },
    #[error("Event received after the end of the document")]
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    NotStarted,
    Writing,
    Finished,
}

/// Streams a notebook document into `W`.
pub struct NotebookWriter<W: Write> {
    out: W,
    progress: Progress,
    open_cell: Option<CellType>,
    cells_written: usize,
}

impl<W: Write> NotebookWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            progress: Progress::NotStarted,
            open_cell: None,
            cells_written: 0,
        }
    }

    /// Consume one event.
    pub fn push(&mut self, event: CellEvent<'_>) -> Result<(), NotebookError> {
        match self.progress {
            Progress::Finished => return Err(NotebookError::Finished),
            Progress::NotStarted => {
                self.out.write_all(PREAMBLE.as_bytes())?;
                self.progress = Progress::Writing;
            }
            Progress::Writing => {}
        }

        match event {
            CellEvent::Line(line) => self.write_line(line),
            CellEvent::End => self.finish(),
        }
    }

    /// Push every event of `events`, stopping at the first error.
    pub fn write_events<'a, I>(&mut self, events: I) -> Result<(), NotebookError>
    where
        I: IntoIterator<Item = CellEvent<'a>>,
    {
        events.into_iter().try_for_each(|event| self.push(event))
    }

    /// Number of cells opened so far.
    pub fn cells_written(&self) -> usize {
        self.cells_written
    }

    pub fn is_finished(&self) -> bool {
        self.progress == Progress::Finished
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, event: LineEvent<'_>) -> Result<(), NotebookError> {
        if event.is_new_cell {
            self.close_cell()?;
            self.open_cell(event.cell_type)?;
        } else if self.open_cell.is_some() {
            self.out.write_all(SOURCE_SEPARATOR.as_bytes())?;
        } else {
            return Err(NotebookError::NoOpenCell { line: event.line });
        }

        // Cell type of a continuation line is the open cell's.
        let text = match (self.open_cell, event.text) {
            (Some(CellType::Markdown), "") => " ",
            (_, text) => text,
        };
        self.write_open_string(text)
    }

    fn open_cell(&mut self, cell_type: CellType) -> Result<(), NotebookError> {
        if self.cells_written > 0 {
            self.out.write_all(b",")?;
        }

        let head = match cell_type {
            CellType::Code => CODE_CELL_HEAD,
            CellType::Markdown => MARKDOWN_CELL_HEAD,
        };
        self.out.write_all(head.as_bytes())?;

        self.open_cell = Some(cell_type);
        self.cells_written += 1;
        Ok(())
    }

    fn close_cell(&mut self) -> Result<(), NotebookError> {
        if self.open_cell.take().is_some() {
            self.out.write_all(CELL_TAIL.as_bytes())?;
        }
        Ok(())
    }

    /// Write `text` as a JSON string minus its closing quote.
    fn write_open_string(&mut self, text: &str) -> Result<(), NotebookError> {
        let quoted = serde_json::to_string(text).map_err(io::Error::from)?;
        let open = quoted.strip_suffix('"').unwrap_or(&quoted);
        self.out.write_all(open.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), NotebookError> {
        self.close_cell()?;
        self.out.write_all(POSTAMBLE.as_bytes())?;
        self.out.flush()?;
        self.progress = Progress::Finished;

        log::debug!("notebook finished with {} cells", self.cells_written);
        Ok(())
    }
}
