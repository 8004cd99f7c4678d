use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "tasktrack", version, about = "Track checkbox tasks across Markdown notes")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Notes directory to index.
    #[arg(long, short = 'C', default_value = ".", global = true)]
    pub root: PathBuf,

    /// Overrides `indexing.window_size` from the config.
    #[arg(long, global = true)]
    pub window_size: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct IndexArgs {
    /// Hide the progress bar even on a terminal.
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    /// Search terms, e.g. `is:open file:work report`.
    #[arg(trailing_var_arg = true)]
    pub query: Vec<String>,
}

/// Task fields settable from the command line.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TaskFields {
    #[arg(long)]
    pub title: Option<String>,

    /// Status name: none, planned, in-progress, review, abandoned, closed.
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub priority: Option<String>,

    /// Replace the description. An empty string removes it.
    #[arg(long)]
    pub description: Option<String>,

    /// Due date as YYYY-MM-DD, kept in the title as `due: YYYY-MM-DD`.
    /// An empty string removes it.
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct EditArgs {
    /// Task id as printed by `list`.
    pub id: String,

    #[command(flatten)]
    pub fields: TaskFields,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct AddArgs {
    /// Document to append to, relative to the notes directory.
    pub path: String,

    #[command(flatten)]
    pub fields: TaskFields,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index every document once and print a summary.
    Index(IndexArgs),
    /// Index, then keep the index current as files change.
    Watch(IndexArgs),
    /// Index, then print the tasks matching a query.
    List(ListArgs),
    /// Change one task and write it back to its document.
    Edit(EditArgs),
    /// Append a new task to the end of a document.
    Add(AddArgs),
}
