//! Jupyter notebook (nbformat 4) documents: schema, file I/O, and export naming.

mod error;
mod io;
mod paths;
mod schema;

pub use error::NotebookError;
pub use io::{notebook_to_string, parse_notebook, read_notebook, write_notebook};
pub use paths::{default_export_path, export_root, notebook_file_name};
pub use schema::{
    new_cell_id, Cell, CodeCell, Metadata, MultilineString, Notebook, Output, StreamName,
    TextCell, NBFORMAT, NBFORMAT_MINOR,
};
