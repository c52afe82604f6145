use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "chat-notebook")]
#[command(about = "Convert chat logs to Jupyter notebooks and replay notebooks as chats")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging unless CHAT_NOTEBOOK_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Export a JSON chat log to a notebook
    Export {
        /// JSON array of chat messages
        log: PathBuf,

        /// Notebook path (defaults to .chat_notebook/exports/ under the working directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Replay a notebook into a fresh session and print the transcript
    Import {
        /// Notebook to replay
        notebook: PathBuf,

        /// Write the reconstructed chat log here as JSON
        #[arg(long)]
        log_out: Option<PathBuf>,
    },
}
