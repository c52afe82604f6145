use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use agent_session::{ExecStep, ExecSteps, Executor, ExecutorError, ExecutorFactory, ExecutorKind};
use uuid::Uuid;
use wait_timeout::ChildExt;

use crate::config::ProcessConfig;

const TERMINATE_GRACE: Duration = Duration::from_millis(500);
const TRUNCATION_MARKER: &str = "\n[truncated]";

// Reads one JSON-encoded code string per line, runs it in a namespace that
// survives between runs, and prints the sentinel from argv when done.
const PYTHON_DRIVER: &str = r#"import json, sys, traceback
sentinel = sys.argv[1]
sys.stderr = sys.stdout
namespace = {"__name__": "__main__"}
for line in sys.stdin:
    try:
        exec(compile(json.loads(line), "<cell>", "exec"), namespace)
    except SystemExit:
        pass
    except BaseException:
        traceback.print_exc()
    sys.stdout.write(sentinel + "\n")
    sys.stdout.flush()
"#;

/// Child process kept alive across runs, with its stdout forwarded line by line.
struct LiveProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: Receiver<io::Result<String>>,
    sentinel: String,
}

impl LiveProcess {
    fn spawn(kind: ExecutorKind, config: &ProcessConfig) -> Result<Self, ExecutorError> {
        let sentinel = format!("__CHAT_NOTEBOOK_DONE_{}__", Uuid::new_v4().simple());
        let program = config.program_for(kind);

        let mut command = Command::new(program);
        if kind == ExecutorKind::Python {
            command
                .arg("-u")
                .arg("-c")
                .arg(PYTHON_DRIVER)
                .arg(&sentinel);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(cwd) = &config.cwd {
            command.current_dir(cwd);
        }

        let mut child = command
            .spawn()
            .map_err(|source| ExecutorError::spawn(kind, source))?;
        let stdin = child.stdin.take();
        let Some(stdout) = child.stdout.take() else {
            kill_and_reap(&mut child);
            return Err(ExecutorError::io(
                kind,
                "capturing process stdout",
                io::Error::other("stdout was not piped"),
            ));
        };

        let (sender, lines) = mpsc::channel();
        let reader = thread::Builder::new()
            .name(format!("{kind}-executor-stdout"))
            .spawn(move || forward_lines(stdout, sender));
        if let Err(source) = reader {
            kill_and_reap(&mut child);
            return Err(ExecutorError::io(
                kind,
                "starting the stdout reader",
                source,
            ));
        }

        tracing::info!(%kind, program, pid = child.id(), "executor process started");

        let mut process = Self {
            child,
            stdin,
            lines,
            sentinel,
        };
        if kind == ExecutorKind::Shell {
            if let Err(error) = process.send(kind, "exec 2>&1\n") {
                process.shutdown(Duration::ZERO);
                return Err(error);
            }
        }

        Ok(process)
    }

    fn send(&mut self, kind: ExecutorKind, payload: &str) -> Result<(), ExecutorError> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ExecutorError::io(
                kind,
                "writing code to the process",
                io::Error::new(io::ErrorKind::BrokenPipe, "stdin is closed"),
            ));
        };

        stdin
            .write_all(payload.as_bytes())
            .and_then(|()| stdin.flush())
            .map_err(|source| ExecutorError::io(kind, "writing code to the process", source))
    }

    fn has_exited(&mut self) -> bool {
        !matches!(self.child.try_wait(), Ok(None))
    }

    /// Closes stdin, waits up to `grace` for a clean exit, then kills.
    ///
    /// The stdout reader thread is left to finish on its own once the pipe closes.
    fn shutdown(mut self, grace: Duration) -> Option<ExitStatus> {
        drop(self.stdin.take());

        match self.child.wait_timeout(grace) {
            Ok(Some(status)) => Some(status),
            Ok(None) | Err(_) => {
                let _ = self.child.kill();
                self.child.wait().ok()
            }
        }
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn forward_lines(stdout: ChildStdout, sender: Sender<io::Result<String>>) {
    let mut reader = BufReader::new(stdout);
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) => return,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buffer).into_owned();
                if sender.send(Ok(line)).is_err() {
                    return;
                }
            }
            Err(error) => {
                let _ = sender.send(Err(error));
                return;
            }
        }
    }
}

fn encode_payload(kind: ExecutorKind, code: &str, sentinel: &str) -> Result<String, ExecutorError> {
    match kind {
        ExecutorKind::Shell => {
            let mut payload = String::with_capacity(code.len() + sentinel.len() + 24);
            payload.push_str(code);
            if !code.ends_with('\n') {
                payload.push('\n');
            }
            payload.push_str(&format!("printf '%s\\n' '{sentinel}'\n"));
            Ok(payload)
        }
        ExecutorKind::Python => {
            let mut payload = serde_json::to_string(code).map_err(|error| {
                ExecutorError::io(
                    kind,
                    "encoding code for the driver",
                    io::Error::other(error),
                )
            })?;
            payload.push('\n');
            Ok(payload)
        }
    }
}

fn format_exit_status(status: Option<ExitStatus>) -> String {
    match status.and_then(|status| status.code()) {
        Some(code) => format!("exit_code={code}"),
        None => "exit_code=terminated_by_signal".to_string(),
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Executor backed by one long-lived shell or python process.
///
/// The process is spawned on the first run and reused, so variables and the
/// working directory carry over between runs. A process that exits, times
/// out, or is abandoned mid-run is replaced on the next run.
pub struct ProcessExecutor {
    kind: ExecutorKind,
    config: ProcessConfig,
    process: Option<LiveProcess>,
}

impl ProcessExecutor {
    #[must_use]
    pub fn new(kind: ExecutorKind, config: ProcessConfig) -> Self {
        Self {
            kind,
            config,
            process: None,
        }
    }

    fn ensure_process(&mut self) -> Result<&mut LiveProcess, ExecutorError> {
        let exited = self.process.as_mut().is_some_and(LiveProcess::has_exited);
        if exited {
            tracing::info!(kind = %self.kind, "executor process exited; respawning");
            if let Some(process) = self.process.take() {
                process.shutdown(Duration::ZERO);
            }
        }

        if self.process.is_none() {
            self.process = Some(LiveProcess::spawn(self.kind, &self.config)?);
        }

        self.process
            .as_mut()
            .ok_or(ExecutorError::Unavailable { kind: self.kind })
    }
}

impl Executor for ProcessExecutor {
    fn kind(&self) -> ExecutorKind {
        self.kind
    }

    fn run(&mut self, code: &str) -> Result<ExecSteps<'_>, ExecutorError> {
        let kind = self.kind;
        let process = self.ensure_process()?;
        let payload = encode_payload(kind, code, &process.sentinel)?;

        if let Err(error) = process.send(kind, &payload) {
            if let Some(process) = self.process.take() {
                process.shutdown(Duration::ZERO);
            }
            return Err(error);
        }

        tracing::debug!(%kind, bytes = code.len(), "running code");

        Ok(Box::new(RunSteps {
            kind,
            process: &mut self.process,
            timeout: self.config.timeout,
            deadline: Instant::now() + self.config.timeout,
            max_output_bytes: self.config.max_output_bytes,
            emitted_bytes: 0,
            truncated: false,
            finished: false,
        }))
    }

    fn is_running(&self) -> bool {
        self.process.is_some()
    }

    fn terminate(&mut self) {
        if let Some(process) = self.process.take() {
            let status = process.shutdown(TERMINATE_GRACE);
            tracing::info!(
                kind = %self.kind,
                status = %format_exit_status(status),
                "executor process terminated"
            );
        }
    }
}

impl Drop for ProcessExecutor {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Steps of one run; ends at the sentinel line or at the first fault.
struct RunSteps<'a> {
    kind: ExecutorKind,
    process: &'a mut Option<LiveProcess>,
    timeout: Duration,
    deadline: Instant,
    max_output_bytes: usize,
    emitted_bytes: usize,
    truncated: bool,
    finished: bool,
}

impl RunSteps<'_> {
    fn abandon(&mut self, grace: Duration) -> Option<ExitStatus> {
        self.finished = true;
        self.process
            .take()
            .and_then(|process| process.shutdown(grace))
    }

    fn limit(&mut self, text: &str) -> Option<ExecStep> {
        if text.is_empty() || self.truncated {
            return None;
        }

        let remaining = self.max_output_bytes.saturating_sub(self.emitted_bytes);
        if text.len() <= remaining {
            self.emitted_bytes += text.len();
            return Some(ExecStep::Output(text.to_string()));
        }

        let mut cutoff = remaining;
        while cutoff > 0 && !text.is_char_boundary(cutoff) {
            cutoff -= 1;
        }

        self.truncated = true;
        self.emitted_bytes = self.max_output_bytes;
        Some(ExecStep::Output(format!(
            "{}{TRUNCATION_MARKER}",
            &text[..cutoff]
        )))
    }
}

impl Iterator for RunSteps<'_> {
    type Item = ExecStep;

    fn next(&mut self) -> Option<ExecStep> {
        while !self.finished {
            let Some(process) = self.process.as_mut() else {
                self.finished = true;
                return None;
            };

            let wait = self.deadline.saturating_duration_since(Instant::now());
            match process.lines.recv_timeout(wait) {
                Ok(Ok(line)) => {
                    let body = line.strip_suffix('\n').unwrap_or(&line);
                    let text = match body.strip_suffix(process.sentinel.as_str()) {
                        Some(prefix) => {
                            self.finished = true;
                            prefix.to_string()
                        }
                        None => line.clone(),
                    };

                    if let Some(step) = self.limit(&text) {
                        return Some(step);
                    }
                }
                Ok(Err(error)) => {
                    let kind = self.kind;
                    self.abandon(Duration::ZERO);
                    return Some(ExecStep::Fault(format!(
                        "\nfailed reading {kind} output: {error}\n"
                    )));
                }
                Err(RecvTimeoutError::Timeout) => {
                    let timeout = format_duration(self.timeout);
                    tracing::warn!(kind = %self.kind, %timeout, "execution timed out; killing process");
                    self.abandon(Duration::ZERO);
                    return Some(ExecStep::Fault(format!(
                        "\nexecution timed out after {timeout}\n"
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    let kind = self.kind;
                    let status = format_exit_status(self.abandon(TERMINATE_GRACE));
                    tracing::warn!(%kind, %status, "executor process exited mid-run");
                    return Some(ExecStep::Fault(format!(
                        "\n{kind} process exited ({status})\n"
                    )));
                }
            }
        }

        None
    }
}

impl Drop for RunSteps<'_> {
    fn drop(&mut self) {
        // A partially read run leaves unread output in the pipe.
        if !self.finished && self.process.is_some() {
            tracing::debug!(kind = %self.kind, "run dropped before completion; discarding process");
            self.abandon(Duration::ZERO);
        }
    }
}

/// Creates [`ProcessExecutor`]s sharing one [`ProcessConfig`].
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutorFactory {
    config: ProcessConfig,
}

impl ProcessExecutorFactory {
    #[must_use]
    pub fn new(config: ProcessConfig) -> Self {
        Self { config }
    }
}

impl ExecutorFactory for ProcessExecutorFactory {
    fn create(&self, kind: ExecutorKind) -> Result<Box<dyn Executor>, ExecutorError> {
        Ok(Box::new(ProcessExecutor::new(kind, self.config.clone())))
    }
}
