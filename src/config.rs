//! Environment configuration.

use std::env;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub log_filter: Option<String>,
    pub log_file: Option<String>,
    pub debug: bool,
    pub executor: Option<String>,
    pub python_program: Option<String>,
    pub shell_program: Option<String>,
    pub exec_timeout_sec: Option<u64>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_filter: env_string_opt("CHAT_NOTEBOOK_LOG"),
            log_file: env_string_opt("CHAT_NOTEBOOK_LOG_FILE"),
            debug: env_flag("CHAT_NOTEBOOK_DEBUG"),
            executor: env_string_opt("CHAT_NOTEBOOK_EXECUTOR"),
            python_program: env_string_opt("CHAT_NOTEBOOK_PYTHON"),
            shell_program: env_string_opt("CHAT_NOTEBOOK_SHELL"),
            exec_timeout_sec: env_u64_opt("CHAT_NOTEBOOK_EXEC_TIMEOUT_SEC"),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

// Zero and unparseable values are treated as unset.
fn env_u64_opt(key: &str) -> Option<u64> {
    env_string_opt(key)
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}
