//! # Conversion pipeline
//!
//! One file at a time, strictly in sequence:
//!
//! ```text
//! read → normalize → parse → tag → segment → serialize
//! ```
//!
//! The serializer pulls lazily from the segmenter. File outputs are written
//! into a temporary file next to the destination and renamed into place only
//! once the document is complete, so a failed conversion leaves nothing
//! behind.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

use crate::cells::Segmenter;
use crate::io::{IoError, notebook_path_for, read_source};
use crate::notebook::{NotebookError, NotebookWriter};
use crate::source::SourceLines;
use crate::syntax::{ParseError, PythonParser};
use crate::tagging::{self, ClassificationError, LineTagMap};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: IoError },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error(transparent)]
    Write(#[from] NotebookError),
    #[error("Failed to write {path}: {source}")]
    Output { path: PathBuf, source: io::Error },
}

/// Where a converted notebook goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    /// Next to the source, with an `.ipynb` extension.
    Derived,
    Path(PathBuf),
}

impl OutputTarget {
    /// The file this target writes for `source`, if it writes a file.
    pub fn resolve(&self, source: &Path) -> Option<PathBuf> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::Derived => Some(notebook_path_for(source)),
            OutputTarget::Path(path) => Some(path.clone()),
        }
    }
}

/// A source file after normalization and tagging.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub source: SourceLines,
    pub tags: LineTagMap,
}

impl Analysis {
    pub fn segments(&self) -> Segmenter<'_> {
        Segmenter::new(&self.source, &self.tags)
    }
}

/// Converts Python sources to notebooks, reusing one parser.
pub struct Converter {
    parser: PythonParser,
}

impl Converter {
    pub fn new() -> Result<Self, ConvertError> {
        Ok(Self {
            parser: PythonParser::new()?,
        })
    }

    /// Normalize, parse and tag `text`.
    pub fn analyze(&mut self, text: &str) -> Result<Analysis, ConvertError> {
        let source = SourceLines::from_text(text);
        let tree = self.parser.parse(&source.text())?;
        let tags = tagging::tag(&tree)?;
        log::debug!("{} lines, {} tagged", source.len(), tags.len());

        Ok(Analysis { source, tags })
    }

    /// Parse and tag only. Nothing is written.
    pub fn check_text(&mut self, text: &str) -> Result<(), ConvertError> {
        self.analyze(text).map(|_| ())
    }

    /// Convert `text` and write the notebook into `out`. Returns the number
    /// of cells written.
    pub fn convert_text<W: Write>(&mut self, text: &str, out: W) -> Result<usize, ConvertError> {
        let analysis = self.analyze(text)?;
        write_notebook(&analysis, out)
    }

    /// Read `path`, convert it and write the result to `target`. Returns the
    /// written file, if any.
    pub fn convert_file(
        &mut self,
        path: &Path,
        target: &OutputTarget,
    ) -> Result<Option<PathBuf>, ConvertError> {
        let text = read_source(path).map_err(|source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let analysis = self.analyze(&text)?;

        match target.resolve(path) {
            None => {
                let stdout = io::stdout();
                let cells = write_notebook(&analysis, stdout.lock())?;
                log::info!("{}: {cells} cells", path.display());
                Ok(None)
            }
            Some(destination) => {
                let cells = write_notebook_file(&analysis, &destination)?;
                log::info!(
                    "{} -> {}: {cells} cells",
                    path.display(),
                    destination.display()
                );
                Ok(Some(destination))
            }
        }
    }
}

fn write_notebook<W: Write>(analysis: &Analysis, out: W) -> Result<usize, ConvertError> {
    let mut writer = NotebookWriter::new(BufWriter::new(out));
    writer.write_events(analysis.segments())?;
    Ok(writer.cells_written())
}

/// Write through a temp file in the destination directory; it is removed on
/// drop unless persisted.
fn write_notebook_file(analysis: &Analysis, destination: &Path) -> Result<usize, ConvertError> {
    let output_error = |source: io::Error| ConvertError::Output {
        path: destination.to_path_buf(),
        source,
    };

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = create_temp_file(dir, destination).map_err(output_error)?;

    let cells = write_notebook(analysis, temp.as_file_mut())?;

    temp.persist(destination).map_err(|e| output_error(e.error))?;
    Ok(cells)
}

/// A temp file that ends up with the permissions a plain write would give:
/// those of the file being replaced, or `0o666` less the umask.
#[cfg(unix)]
fn create_temp_file(dir: &Path, destination: &Path) -> io::Result<NamedTempFile> {
    use std::fs::{self, Permissions};
    use std::os::unix::fs::PermissionsExt;

    let temp = Builder::new()
        .permissions(Permissions::from_mode(0o666))
        .tempfile_in(dir)?;

    if let Ok(existing) = fs::metadata(destination) {
        temp.as_file().set_permissions(existing.permissions())?;
    }
    Ok(temp)
}

#[cfg(not(unix))]
fn create_temp_file(dir: &Path, _destination: &Path) -> io::Result<NamedTempFile> {
    Builder::new().tempfile_in(dir)
}
