use std::collections::BTreeMap;

use crate::executor::{Executor, ExecutorError, ExecutorFactory, ExecutorKind};
use crate::message::AgentMessage;

/// Conversation state shared by the chat loop and the notebook transcoder.
///
/// Owns the append-only message log and one live executor per kind.
pub struct Session {
    messages: Vec<AgentMessage>,
    executors: BTreeMap<ExecutorKind, Box<dyn Executor>>,
    factory: Box<dyn ExecutorFactory>,
}

impl Session {
    /// Creates an empty session with one fresh executor per kind.
    pub fn new(factory: Box<dyn ExecutorFactory>) -> Result<Self, ExecutorError> {
        let mut session = Self {
            messages: Vec::new(),
            executors: BTreeMap::new(),
            factory,
        };
        session.recreate_executors()?;
        Ok(session)
    }

    #[must_use]
    pub fn messages(&self) -> &[AgentMessage] {
        &self.messages
    }

    pub fn push(&mut self, message: AgentMessage) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = AgentMessage>) {
        self.messages.extend(messages);
    }

    /// Returns the executor registered for `kind`.
    pub fn executor_mut(
        &mut self,
        kind: ExecutorKind,
    ) -> Result<&mut (dyn Executor + 'static), ExecutorError> {
        self.executors
            .get_mut(&kind)
            .map(|executor| executor.as_mut())
            .ok_or(ExecutorError::Unavailable { kind })
    }

    /// Clears the log and replaces every executor with a fresh one.
    ///
    /// Executors still holding a live process are terminated first.
    pub fn reset(&mut self) -> Result<(), ExecutorError> {
        self.messages.clear();

        for (kind, executor) in &mut self.executors {
            if executor.is_running() {
                tracing::debug!(%kind, "terminating executor before reset");
                executor.terminate();
            }
        }

        self.recreate_executors()
    }

    fn recreate_executors(&mut self) -> Result<(), ExecutorError> {
        for kind in ExecutorKind::ALL {
            let executor = self.factory.create(kind)?;
            self.executors.insert(kind, executor);
        }

        Ok(())
    }
}
