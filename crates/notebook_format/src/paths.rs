use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::NotebookError;

pub const EXPORT_DIR: [&str; 2] = [".chat_notebook", "exports"];

#[must_use]
pub fn export_root(cwd: &Path) -> PathBuf {
    cwd.join(EXPORT_DIR[0]).join(EXPORT_DIR[1])
}

#[must_use]
pub fn sanitize_timestamp_for_filename(timestamp: &str) -> String {
    timestamp
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' => '-',
            _ => c,
        })
        .collect()
}

#[must_use]
pub fn notebook_file_name(created_at: &str, notebook_id: &str) -> String {
    format!(
        "{}_{}.ipynb",
        sanitize_timestamp_for_filename(created_at),
        notebook_id
    )
}

/// Fresh export path under [`export_root`], stamped with the current UTC time.
pub fn default_export_path(cwd: &Path) -> Result<PathBuf, NotebookError> {
    let created_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(NotebookError::ClockFormat)?;
    let notebook_id = Uuid::new_v4().to_string();

    Ok(export_root(cwd).join(notebook_file_name(&created_at, &notebook_id)))
}
