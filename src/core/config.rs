use std::path::PathBuf;

use clap::Parser;

use crate::core::store::DEFAULT_STORE_FILE;

#[derive(Debug, Parser)]
#[command(name = "notes-manager", version, about = "Keep a list of short notes in a JSON file")]
pub struct Config {
    /// JSON file holding the notes array
    #[arg(long, env = "NOTES_FILE", default_value = DEFAULT_STORE_FILE)]
    pub file: PathBuf,

    /// Where diagnostics are written; the terminal belongs to the UI
    #[arg(long, env = "NOTES_LOG", default_value = "notes.log")]
    pub log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}
