use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::NotebookError;
use crate::schema::{Notebook, NBFORMAT};

/// Reads and validates a notebook file.
pub fn read_notebook(path: &Path) -> Result<Notebook, NotebookError> {
    let text = fs::read_to_string(path)
        .map_err(|source| NotebookError::io("reading notebook file", path, source))?;
    let notebook = serde_json::from_str::<Notebook>(&text)
        .map_err(|source| NotebookError::json_parse(path, source))?;
    validate_version(&notebook)?;
    Ok(notebook)
}

/// Parses and validates notebook JSON held in memory.
pub fn parse_notebook(text: &str) -> Result<Notebook, NotebookError> {
    let notebook = serde_json::from_str::<Notebook>(text).map_err(NotebookError::Json)?;
    validate_version(&notebook)?;
    Ok(notebook)
}

/// Writes `notebook` to `path`, replacing any existing file.
pub fn write_notebook(path: &Path, notebook: &Notebook) -> Result<(), NotebookError> {
    let text =
        render(notebook).map_err(|source| NotebookError::json_serialize(path, source))?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| {
            NotebookError::io("creating notebook parent directory", parent, source)
        })?;
    }

    fs::write(path, text).map_err(|source| NotebookError::io("writing notebook file", path, source))
}

/// Renders `notebook` the way it is written to disk.
pub fn notebook_to_string(notebook: &Notebook) -> Result<String, NotebookError> {
    render(notebook).map_err(NotebookError::Json)
}

pub(crate) fn validate_version(notebook: &Notebook) -> Result<(), NotebookError> {
    if notebook.nbformat != NBFORMAT {
        return Err(NotebookError::UnsupportedVersion {
            found: notebook.nbformat,
        });
    }

    Ok(())
}

// One-space indentation and a trailing newline, matching Jupyter's writer.
fn render(notebook: &Notebook) -> Result<String, serde_json::Error> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b" "));
    notebook.serialize(&mut serializer)?;

    let mut text = String::from_utf8_lossy(&buffer).into_owned();
    text.push('\n');
    Ok(text)
}
