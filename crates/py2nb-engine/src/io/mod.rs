use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid source directory: {0}")]
    InvalidSourceDir(String),
}

/// Read a source file and return its content
pub fn read_source(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Scan `root` recursively for files with the given extension.
///
/// Paths for which `skip` returns true are left out; a skipped directory is
/// not descended into. The result is sorted.
pub fn scan_source_files<F>(root: &Path, extension: &str, skip: F) -> Result<Vec<PathBuf>, IoError>
where
    F: Fn(&Path) -> bool,
{
    validate_source_dir(root)?;

    let mut files = Vec::new();
    scan_directory_recursive(root, extension, &skip, &mut files)?;
    files.sort();
    log::debug!("found {} .{extension} files under {}", files.len(), root.display());
    Ok(files)
}

fn scan_directory_recursive(
    dir: &Path,
    extension: &str,
    skip: &dyn Fn(&Path) -> bool,
    files: &mut Vec<PathBuf>,
) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if skip(&path) {
            log::trace!("skipping {}", path.display());
            continue;
        }

        if path.is_dir() {
            scan_directory_recursive(&path, extension, skip, files)?;
        } else if let Some(ext) = path.extension()
            && ext == extension
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_source_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidSourceDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    Ok(())
}

/// `foo/bar.py` → `foo/bar.ipynb`
pub fn notebook_path_for(source: &Path) -> PathBuf {
    source.with_extension("ipynb")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_dir, create_test_file};

    #[test]
    fn test_scan_finds_sources_sorted() {
        // Given a directory with python files
        let dir = create_test_dir();
        create_test_file(&dir, "b.py", "x = 1\n");
        create_test_file(&dir, "a.py", "y = 2\n");

        // When scanning for files
        let files = scan_source_files(dir.path(), "py", |_| false).unwrap();

        // Then we find both, in path order
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.py", "b.py"]);
    }

    #[test]
    fn test_scan_nested_directories() {
        let dir = create_test_dir();
        create_test_file(&dir, "root.py", "pass\n");
        create_test_file(&dir, "pkg/sub/nested.py", "pass\n");

        let files = scan_source_files(dir.path(), "py", |_| false).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.ends_with("pkg/sub/nested.py")));
    }

    #[test]
    fn test_ignore_other_extensions() {
        let dir = create_test_dir();
        create_test_file(&dir, "module.py", "pass\n");
        create_test_file(&dir, "notes.md", "# Notes");
        create_test_file(&dir, "module.ipynb", "{}");
        create_test_file(&dir, "py", "no extension");

        let files = scan_source_files(dir.path(), "py", |_| false).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name().unwrap(), "module.py");
    }

    #[test]
    fn test_skipped_directories_are_not_descended() {
        let dir = create_test_dir();
        create_test_file(&dir, "keep.py", "pass\n");
        create_test_file(&dir, "build/generated.py", "pass\n");

        let files =
            scan_source_files(dir.path(), "py", |p| p.file_name().unwrap() == "build").unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.py"));
    }

    #[test]
    fn test_scan_invalid_directory() {
        let result = scan_source_files(Path::new("/this/path/does/not/exist"), "py", |_| false);

        assert!(matches!(result, Err(IoError::InvalidSourceDir(_))));
    }

    #[test]
    fn test_read_source_not_found() {
        let dir = create_test_dir();
        let result = read_source(&dir.path().join("missing.py"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_read_source_success() {
        let dir = create_test_dir();
        let path = create_test_file(&dir, "m.py", "x = 1\n");
        assert_eq!(read_source(&path).unwrap(), "x = 1\n");
    }

    #[test]
    fn test_notebook_path_replaces_extension() {
        assert_eq!(
            notebook_path_for(Path::new("src/demo.py")),
            PathBuf::from("src/demo.ipynb")
        );
    }
}
