//! Deterministic mock implementation of the `agent_session` executor contract.
//!
//! Executors answer from a fixed [`Script`] and record every creation, run,
//! and termination into a shared [`ExecutorTrace`], so tests can assert how a
//! session routed its code without spawning processes.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use agent_session::{ExecStep, ExecSteps, Executor, ExecutorError, ExecutorFactory, ExecutorKind};

/// Stable backend identifier used for explicit startup selection.
pub const MOCK_EXECUTOR_ID: &str = "mock";

/// One observable interaction with a mock executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorCall {
    Created(ExecutorKind),
    Ran { kind: ExecutorKind, code: String },
    Terminated(ExecutorKind),
}

#[derive(Debug, Default)]
pub struct ExecutorTrace {
    pub calls: Vec<ExecutorCall>,
}

impl ExecutorTrace {
    /// Code passed to `run`, in call order.
    #[must_use]
    pub fn runs(&self) -> Vec<(ExecutorKind, String)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ExecutorCall::Ran { kind, code } => Some((*kind, code.clone())),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn created(&self) -> Vec<ExecutorKind> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ExecutorCall::Created(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn terminated(&self) -> Vec<ExecutorKind> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ExecutorCall::Terminated(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }
}

pub type SharedTrace = Arc<Mutex<ExecutorTrace>>;

/// Canned answers keyed by the exact code text an executor receives.
#[derive(Debug, Clone, Default)]
pub struct Script {
    responses: HashMap<String, Vec<ExecStep>>,
    start_failures: HashSet<String>,
    echo_unscripted: bool,
}

impl Script {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `code` with one output step per fragment.
    #[must_use]
    pub fn respond(mut self, code: impl Into<String>, fragments: &[&str]) -> Self {
        let steps = fragments
            .iter()
            .map(|fragment| ExecStep::Output((*fragment).to_string()))
            .collect();
        self.responses.insert(code.into(), steps);
        self
    }

    /// Answers `code` with explicit steps, faults included.
    #[must_use]
    pub fn respond_steps(mut self, code: impl Into<String>, steps: Vec<ExecStep>) -> Self {
        self.responses.insert(code.into(), steps);
        self
    }

    /// Makes `run` fail before producing any step for `code`.
    #[must_use]
    pub fn fail_to_start(mut self, code: impl Into<String>) -> Self {
        self.start_failures.insert(code.into());
        self
    }

    /// Unscripted code is echoed back as its own output instead of producing nothing.
    #[must_use]
    pub fn with_echo_fallback(mut self) -> Self {
        self.echo_unscripted = true;
        self
    }

    fn steps_for(&self, code: &str) -> Vec<ExecStep> {
        match self.responses.get(code) {
            Some(steps) => steps.clone(),
            None if self.echo_unscripted => vec![ExecStep::Output(format!("{code}\n"))],
            None => Vec::new(),
        }
    }
}

/// Mock executor answering from a [`Script`].
#[derive(Debug)]
pub struct ScriptedExecutor {
    kind: ExecutorKind,
    script: Arc<Script>,
    trace: SharedTrace,
    running: bool,
}

impl ScriptedExecutor {
    #[must_use]
    pub fn new(kind: ExecutorKind, script: Arc<Script>, trace: SharedTrace) -> Self {
        Self {
            kind,
            script,
            trace,
            running: false,
        }
    }
}

impl Executor for ScriptedExecutor {
    fn kind(&self) -> ExecutorKind {
        self.kind
    }

    fn run(&mut self, code: &str) -> Result<ExecSteps<'_>, ExecutorError> {
        lock_unpoisoned(&self.trace).calls.push(ExecutorCall::Ran {
            kind: self.kind,
            code: code.to_string(),
        });

        if self.script.start_failures.contains(code) {
            return Err(ExecutorError::io(
                self.kind,
                "writing code to the process",
                io::Error::new(io::ErrorKind::BrokenPipe, "scripted start failure"),
            ));
        }

        self.running = true;
        Ok(Box::new(self.script.steps_for(code).into_iter()))
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn terminate(&mut self) {
        if !self.running {
            return;
        }

        self.running = false;
        lock_unpoisoned(&self.trace)
            .calls
            .push(ExecutorCall::Terminated(self.kind));
    }
}

/// Factory handing out [`ScriptedExecutor`]s that share one script and trace.
#[derive(Debug, Clone)]
pub struct MockExecutorFactory {
    script: Arc<Script>,
    trace: SharedTrace,
}

impl MockExecutorFactory {
    #[must_use]
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(script),
            trace: Arc::new(Mutex::new(ExecutorTrace::default())),
        }
    }

    /// Handle to the trace every executor from this factory writes to.
    #[must_use]
    pub fn trace(&self) -> SharedTrace {
        Arc::clone(&self.trace)
    }
}

impl Default for MockExecutorFactory {
    fn default() -> Self {
        Self::new(Script::new().with_echo_fallback())
    }
}

impl ExecutorFactory for MockExecutorFactory {
    fn create(&self, kind: ExecutorKind) -> Result<Box<dyn Executor>, ExecutorError> {
        lock_unpoisoned(&self.trace)
            .calls
            .push(ExecutorCall::Created(kind));
        Ok(Box::new(ScriptedExecutor::new(
            kind,
            Arc::clone(&self.script),
            Arc::clone(&self.trace),
        )))
    }
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
