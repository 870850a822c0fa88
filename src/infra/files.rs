//! File-system helpers used by the CLI front end.

use std::{
    fs,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::{application::error::ConversionError, domain::types::OutputFormat};

pub fn read_markup(path: &Path) -> Result<Vec<u8>, ConversionError> {
    fs::read(path).map_err(|err| ConversionError::io(path, err))
}

/// Write `contents` to `path`, creating missing parent directories.
pub fn write_output(path: &Path, contents: &[u8]) -> Result<(), ConversionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| ConversionError::io(parent, err))?;
    }
    fs::write(path, contents).map_err(|err| ConversionError::io(path, err))
}

/// `notes/today.md` → `notes/today.html` (or `.pdf`).
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// One file discovered for a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub path: PathBuf,
    /// Location mirrored under the output directory: the path below the
    /// walked directory, or the bare file name for explicit files.
    pub relative: PathBuf,
}

impl BatchInput {
    fn explicit(path: PathBuf) -> Self {
        let relative = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("document"));
        Self { path, relative }
    }
}

/// Output location for one batch input: `<output_dir>/<relative>.html`.
pub fn batch_output_path(output_dir: &Path, input: &BatchInput) -> PathBuf {
    output_dir
        .join(&input.relative)
        .with_extension(OutputFormat::Html.extension())
}

pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Every `.md` file below `dir`, sorted by path.
pub fn collect_markdown_files(dir: &Path) -> Result<Vec<PathBuf>, ConversionError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            let source = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("file system loop detected"));
            ConversionError::io(path, source)
        })?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Expand batch inputs: files are kept as given, directories are walked and
/// keep their layout relative to the walked root.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<BatchInput>, ConversionError> {
    let mut files = Vec::new();
    for input in inputs {
        let metadata = fs::metadata(input).map_err(|err| ConversionError::io(input, err))?;
        if !metadata.is_dir() {
            files.push(BatchInput::explicit(input.clone()));
            continue;
        }
        for path in collect_markdown_files(input)? {
            let relative = match path.strip_prefix(input) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => BatchInput::explicit(path.clone()).relative,
            };
            files.push(BatchInput { path, relative });
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_paths_follow_input_names() {
        assert_eq!(
            default_output_path(Path::new("notes/today.md"), OutputFormat::Pdf),
            PathBuf::from("notes/today.pdf")
        );
        assert_eq!(
            default_output_path(Path::new("README"), OutputFormat::Html),
            PathBuf::from("README.html")
        );
        let explicit = BatchInput::explicit(PathBuf::from("docs/guide/intro.MD"));
        assert_eq!(
            batch_output_path(Path::new("out"), &explicit),
            PathBuf::from("out/intro.html")
        );
        let walked = BatchInput {
            path: PathBuf::from("docs/guide/intro.md"),
            relative: PathBuf::from("guide/intro.md"),
        };
        assert_eq!(
            batch_output_path(Path::new("out"), &walked),
            PathBuf::from("out/guide/intro.html")
        );
    }

    #[test]
    fn write_output_creates_parent_directories() {
        let dir = TempDir::new().expect("temp dir");
        let target = dir.path().join("nested/deeper/doc.html");

        write_output(&target, b"<html></html>").expect("written");
        assert_eq!(fs::read(&target).expect("read back"), b"<html></html>");
    }

    #[test]
    fn missing_input_reports_path() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("absent.md");

        let err = read_markup(&missing).expect_err("missing file");
        assert_eq!(err.category(), "io_failure");
        assert!(err.to_string().contains("absent.md"));
    }

    #[test]
    fn collects_markdown_recursively_in_order() {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join("b/nested")).expect("dirs");
        fs::write(dir.path().join("b/nested/deep.md"), "# deep").expect("write");
        fs::write(dir.path().join("a.md"), "# a").expect("write");
        fs::write(dir.path().join("UPPER.MD"), "# upper").expect("write");
        fs::write(dir.path().join("notes.txt"), "skip").expect("write");

        let files = collect_markdown_files(dir.path()).expect("walk");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).expect("prefix").to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("UPPER.MD"),
                PathBuf::from("a.md"),
                PathBuf::from("b/nested/deep.md"),
            ]
        );
    }

    #[test]
    fn collect_inputs_mixes_files_and_directories() {
        let dir = TempDir::new().expect("temp dir");
        let single = dir.path().join("single.txt");
        fs::write(&single, "explicit files are kept").expect("write");
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).expect("dir");
        fs::write(docs.join("one.md"), "# one").expect("write");

        let files = collect_inputs(&[single.clone(), docs.clone()]).expect("collect");
        assert_eq!(
            files,
            vec![
                BatchInput {
                    path: single,
                    relative: PathBuf::from("single.txt"),
                },
                BatchInput {
                    path: docs.join("one.md"),
                    relative: PathBuf::from("one.md"),
                },
            ]
        );
    }

    #[test]
    fn same_named_files_in_sibling_directories_get_distinct_outputs() {
        let dir = TempDir::new().expect("temp dir");
        let docs = dir.path().join("docs");
        fs::create_dir_all(docs.join("a")).expect("dir");
        fs::create_dir_all(docs.join("b")).expect("dir");
        fs::write(docs.join("a/intro.md"), "# Alpha").expect("write");
        fs::write(docs.join("b/intro.md"), "# Beta").expect("write");

        let files = collect_inputs(&[docs]).expect("collect");
        let outputs: Vec<_> = files
            .iter()
            .map(|input| batch_output_path(Path::new("out"), input))
            .collect();

        assert_eq!(
            outputs,
            vec![
                PathBuf::from("out/a/intro.html"),
                PathBuf::from("out/b/intro.html"),
            ]
        );
    }
}
