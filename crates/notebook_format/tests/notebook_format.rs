use std::fs;
use std::path::PathBuf;

use notebook_format::{
    notebook_to_string, parse_notebook, read_notebook, write_notebook, Cell, Notebook,
    NotebookError, Output, StreamName,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn write_notebook_text(text: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("chat.ipynb");
    fs::write(&path, text).expect("notebook file should be written");
    (dir, path)
}

#[test]
fn read_accepts_jupyter_written_notebook() {
    let (_dir, path) = write_notebook_text(
        &json!({
            "cells": [
                {
                    "cell_type": "markdown",
                    "id": "a1b2c3d4",
                    "metadata": {},
                    "source": ["##### User:\n", "hi"]
                },
                {
                    "cell_type": "code",
                    "execution_count": 3,
                    "id": "e5f6a7b8",
                    "metadata": {"tags": []},
                    "outputs": [
                        {"name": "stdout", "output_type": "stream", "text": ["1\n"]},
                        {"output_type": "error", "ename": "E", "evalue": "boom", "traceback": []}
                    ],
                    "source": "print(1)"
                }
            ],
            "metadata": {"kernelspec": {"name": "python3"}},
            "nbformat": 4,
            "nbformat_minor": 5
        })
        .to_string(),
    );

    let notebook = read_notebook(&path).expect("notebook should parse");

    assert_eq!(notebook.cells.len(), 2);
    assert_eq!(notebook.cells[0].cell_type(), "markdown");
    assert_eq!(notebook.cells[0].source(), "##### User:\nhi");
    let Cell::Code(code) = &notebook.cells[1] else {
        panic!("second cell should be code");
    };
    assert_eq!(code.source.as_str(), "print(1)");
    assert_eq!(code.execution_count, Some(3));
    assert_eq!(code.outputs[0].stream_text(), Some("1\n"));
    assert!(matches!(code.outputs[1], Output::Error { .. }));
    assert_eq!(notebook.metadata["kernelspec"]["name"], "python3");
}

#[test]
fn read_without_cells_yields_empty_notebook() {
    let (_dir, path) = write_notebook_text(r#"{"nbformat": 4, "metadata": {}}"#);

    let notebook = read_notebook(&path).expect("cell-less notebook is readable");
    assert!(notebook.cells.is_empty());
    assert_eq!(notebook.nbformat_minor, 0);
}

#[test]
fn read_rejects_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("absent.ipynb");

    let error = read_notebook(&path).expect_err("missing file must fail");
    assert!(matches!(
        error,
        NotebookError::Io {
            operation: "reading notebook file",
            ..
        }
    ));
}

#[test]
fn read_rejects_malformed_json_with_path_context() {
    let (_dir, path) = write_notebook_text("{ not json");

    let error = read_notebook(&path).expect_err("malformed json must fail");
    assert!(matches!(error, NotebookError::JsonParse { .. }));
    assert!(error.to_string().contains("chat.ipynb"));
}

#[test]
fn read_rejects_unsupported_major_version() {
    let (_dir, path) = write_notebook_text(r#"{"nbformat": 3, "nbformat_minor": 0, "worksheets": []}"#);

    let error = read_notebook(&path).expect_err("nbformat 3 must fail");
    assert!(matches!(error, NotebookError::UnsupportedVersion { found: 3 }));
}

#[test]
fn parse_rejects_unknown_cell_type() {
    let error = parse_notebook(
        r#"{"nbformat": 4, "nbformat_minor": 5, "cells": [{"cell_type": "heading", "source": "x"}]}"#,
    )
    .expect_err("unknown cell type must fail");

    assert!(matches!(error, NotebookError::Json(_)));
}

#[test]
fn write_then_read_preserves_cells_and_outputs() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("nested").join("out.ipynb");

    let mut notebook = Notebook::new();
    notebook.push(Cell::markdown("##### User:\nhi"));
    notebook.push(Cell::code(
        "##### Assistant:\nprint(1)",
        vec![Output::stdout("1\n")],
    ));

    write_notebook(&path, &notebook).expect("notebook should be written");
    let reread = read_notebook(&path).expect("written notebook should parse");

    assert_eq!(reread, notebook);
}

#[test]
fn rendered_notebook_uses_one_space_indent_and_line_lists() {
    let mut notebook = Notebook::new();
    notebook.push(Cell::code("a\nb", vec![Output::stdout("x\n")]));

    let text = notebook_to_string(&notebook).expect("render");

    assert!(text.starts_with("{\n \"cells\": [\n"));
    assert!(text.ends_with("}\n"));

    let value: serde_json::Value = serde_json::from_str(&text).expect("rendered json parses");
    assert_eq!(value["nbformat"], 4);
    assert_eq!(value["nbformat_minor"], 5);
    assert_eq!(value["cells"][0]["source"], json!(["a\n", "b"]));
    assert_eq!(value["cells"][0]["outputs"][0]["name"], "stdout");
}

#[test]
fn stderr_stream_names_round_trip() {
    let notebook = parse_notebook(
        r#"{"nbformat": 4, "nbformat_minor": 4, "cells": [
            {"cell_type": "code", "metadata": {}, "execution_count": null, "source": [],
             "outputs": [{"output_type": "stream", "name": "stderr", "text": "warn\n"}]}
        ]}"#,
    )
    .expect("notebook parses");

    let Cell::Code(code) = &notebook.cells[0] else {
        panic!("expected code cell");
    };
    assert!(matches!(
        code.outputs[0],
        Output::Stream {
            name: StreamName::Stderr,
            ..
        }
    ));
    assert_eq!(code.id, None);
    assert_eq!(notebook.cells[0].source(), "");
}
