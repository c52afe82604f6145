//! Minimal contract shared by the chat loop, the notebook transcoder, and
//! executor backends.
//!
//! This crate defines the conversation log model, the streamed chat event
//! type, the executor contract, and the [`Session`] that owns both the log and
//! the live executors. It contains no process, model, or file-format logic.

mod event;
mod executor;
mod message;
mod session;

pub use event::{ChatEvent, ExecStep};
pub use executor::{ExecSteps, Executor, ExecutorError, ExecutorFactory, ExecutorKind};
pub use message::{AgentMessage, Role};
pub use session::Session;
