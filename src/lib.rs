//! Chat-log ⇄ Jupyter-notebook transcoding for interpreter sessions.
//!
//! - [`export_log`] turns a conversation log into notebook cells, one cell per
//!   narration or code block, with the speaker kept as a leading heading.
//! - [`import_notebook`] and [`load_notebook`] go the other way: markdown cells
//!   become narration, and code cells are re-executed through the session's
//!   executors so the rebuilt log carries fresh output.
//! - [`Transcript`] renders the display history shared by streamed replies and
//!   notebook replays.
//!
//! All state lives in an explicit [`agent_session::Session`]; this crate keeps
//! no globals besides the optional tracing subscriber from [`logging`].

pub mod config;
pub mod headings;
pub mod logging;

mod error;
mod export;
mod import;
mod transcript;

pub use crate::config::EnvConfig;
pub use crate::error::TranscodeError;
pub use crate::export::{export_log, save_notebook};
pub use crate::import::{
    import_notebook, load_notebook, route_code, ImportOutcome, NOTEBOOK_PLACEHOLDER,
    REPLAY_LANGUAGE,
};
pub use crate::logging::{init_logging, LoggingError};
pub use crate::transcript::{Transcript, TranscriptTurn};
