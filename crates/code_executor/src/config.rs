use std::path::PathBuf;
use std::time::Duration;

use agent_session::ExecutorKind;

pub const DEFAULT_SHELL_PROGRAM: &str = "bash";
pub const DEFAULT_PYTHON_PROGRAM: &str = "python3";
pub const DEFAULT_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 100 * 1024;

/// Settings shared by every process executor a factory creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    pub shell_program: String,
    pub python_program: String,
    /// Upper bound for one run, from writing the code to reading its sentinel.
    pub timeout: Duration,
    /// Output bytes kept per run before the rest is dropped.
    pub max_output_bytes: usize,
    pub cwd: Option<PathBuf>,
}

impl ProcessConfig {
    #[must_use]
    pub fn program_for(&self, kind: ExecutorKind) -> &str {
        match kind {
            ExecutorKind::Shell => &self.shell_program,
            ExecutorKind::Python => &self.python_program,
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            shell_program: DEFAULT_SHELL_PROGRAM.to_string(),
            python_program: DEFAULT_PYTHON_PROGRAM.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SEC),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            cwd: None,
        }
    }
}
