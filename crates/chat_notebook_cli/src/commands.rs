use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use agent_session::{AgentMessage, Session};
use anyhow::{Context, Result};
use chat_notebook::{load_notebook, save_notebook, EnvConfig, ImportOutcome};
use notebook_format::default_export_path;

use crate::executors::factory_from_env;

/// Exports the JSON chat log at `log` and returns where the notebook was written.
pub fn export(log: &Path, out: Option<&Path>) -> Result<PathBuf> {
    let messages = read_log(log)?;

    let path = match out {
        Some(path) => path.to_path_buf(),
        None => {
            let cwd = env::current_dir().context("failed to resolve working directory")?;
            default_export_path(&cwd)?
        }
    };

    save_notebook(&messages, &path)
        .with_context(|| format!("failed to export chat log to {}", path.display()))?;
    Ok(path)
}

/// Replays `notebook` into a fresh session built from the configured executor backend.
pub fn import(
    config: &EnvConfig,
    notebook: &Path,
    log_out: Option<&Path>,
) -> Result<ImportOutcome> {
    let factory = factory_from_env(config).map_err(anyhow::Error::msg)?;
    let mut session = Session::new(factory).context("failed to start executors")?;

    let mut updates = 0usize;
    let outcome = load_notebook(&mut session, notebook, &mut |_| updates += 1)
        .with_context(|| format!("failed to import notebook {}", notebook.display()))?;
    tracing::debug!(updates, "transcript updates during replay");

    if let Some(path) = log_out {
        write_log(path, session.messages())?;
    }

    Ok(outcome)
}

fn read_log(path: &Path) -> Result<Vec<AgentMessage>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read chat log {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse chat log {}", path.display()))
}

fn write_log(path: &Path, messages: &[AgentMessage]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let mut json = serde_json::to_string_pretty(messages).context("failed to encode chat log")?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("failed to write chat log {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use agent_session::AgentMessage;
    use chat_notebook::{EnvConfig, NOTEBOOK_PLACEHOLDER};
    use notebook_format::read_notebook;
    use pretty_assertions::assert_eq;

    use super::{export, import, read_log};

    fn mock_config() -> EnvConfig {
        EnvConfig {
            executor: Some("mock".to_string()),
            ..EnvConfig::default()
        }
    }

    #[test]
    fn export_writes_notebook_to_requested_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("log.json");
        fs::write(
            &log,
            r#"[{"role":"user","message":"hi"},{"role":"assistant","message":"","language":"python","code":"print(1)","output":"1\n"}]"#,
        )
        .expect("write log");
        let out = dir.path().join("nested").join("chat.ipynb");

        let written = export(&log, Some(&out)).expect("export");

        assert_eq!(written, out);
        let notebook = read_notebook(&out).expect("read back");
        assert_eq!(notebook.cells.len(), 2);
        assert_eq!(notebook.cells[0].source(), "##### User:\nhi");
    }

    #[test]
    fn export_rejects_malformed_log() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("log.json");
        fs::write(&log, r#"{"role":"user"}"#).expect("write log");

        let error = export(&log, Some(&dir.path().join("out.ipynb"))).expect_err("not an array");
        assert!(error.to_string().contains("failed to parse chat log"));
    }

    #[test]
    fn import_with_mock_backend_writes_reconstructed_log() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("log.json");
        fs::write(
            &log,
            r#"[{"role":"user","message":"hi"},{"role":"assistant","language":"python","code":"!echo hi","output":"hi\n"}]"#,
        )
        .expect("write log");
        let notebook = export(&log, Some(&dir.path().join("chat.ipynb"))).expect("export");
        let log_out = dir.path().join("replayed").join("log.json");

        let outcome = import(&mock_config(), &notebook, Some(&log_out)).expect("import");

        let expected = vec![
            AgentMessage::user(NOTEBOOK_PLACEHOLDER),
            AgentMessage::user("hi"),
            AgentMessage::code("python", "!echo hi", "echo hi\n"),
        ];
        assert_eq!(outcome.messages, expected);
        assert_eq!(read_log(&log_out).expect("read replayed log"), expected);
    }

    #[test]
    fn import_rejects_unknown_backend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = EnvConfig {
            executor: Some("remote".to_string()),
            ..EnvConfig::default()
        };

        let error = import(&config, &dir.path().join("chat.ipynb"), None).expect_err("bad backend");
        assert!(error.to_string().contains("Unsupported executor 'remote'"));
    }

    #[test]
    fn import_reports_missing_notebook() {
        let dir = tempfile::tempdir().expect("tempdir");

        let error =
            import(&mock_config(), &dir.path().join("missing.ipynb"), None).expect_err("missing");
        assert!(error.to_string().contains("failed to import notebook"));
    }
}
