//! Python source to Jupyter notebook conversion.
//!
//! ```text
//! SourceLines → PythonParser → SyntaxNode → Tagger → LineTagMap
//!             → Segmenter → CellEvent* → NotebookWriter
//! ```
//!
//! [`Converter`] runs the whole pipeline for one file.

pub mod cells;
pub mod convert;
pub mod io;
pub mod notebook;
pub mod source;
pub mod syntax;
pub mod tagging;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use cells::{CellEvent, CellType, LineEvent, Segmenter};
pub use convert::{Analysis, ConvertError, Converter, OutputTarget};
pub use io::*;
pub use notebook::{NotebookError, NotebookWriter};
pub use source::SourceLines;
pub use syntax::{ConstructKind, ParseError, PythonParser, SyntaxNode};
pub use tagging::{ClassificationError, Flag, LineTagMap, TagSnapshot, Tagger};
