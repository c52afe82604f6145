//! Process-backed executors for the `agent_session` contract.
//!
//! `shell` code goes to a long-lived shell reading commands from stdin, with
//! stderr merged into stdout. `python` code goes to a long-lived interpreter
//! running a small driver that executes each block in one shared namespace.
//! Both mark the end of a run with a per-process sentinel line.
//!
//! Code that reads from stdin competes with the driver protocol and is not
//! supported.

mod config;
mod process;

pub use config::{
    ProcessConfig, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_PYTHON_PROGRAM, DEFAULT_SHELL_PROGRAM,
    DEFAULT_TIMEOUT_SEC,
};
pub use process::{ProcessExecutor, ProcessExecutorFactory};

/// Stable backend identifier used for explicit startup selection.
pub const PROCESS_EXECUTOR_ID: &str = "process";
