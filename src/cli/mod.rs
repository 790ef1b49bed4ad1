//! Command-line interface for todos
//!
//! This module defines the CLI structure using clap derive macros. Running
//! without a subcommand opens the terminal UI; the remaining subcommands
//! drive the same task store non-interactively.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{self, Config};
use crate::error::Result;
use crate::output::OutputOptions;
use crate::storage::FileSlot;

mod task;

/// todos - a terminal task list
///
/// Add, edit, complete, delete and filter short tasks. State lives in a
/// single local JSON slot and survives restarts.
#[derive(Parser, Debug)]
#[command(name = "todos")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "TODOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the task slot (overrides storage.dir)
    #[arg(long, global = true, env = "TODOS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive task list (default)
    Tui,

    /// Add a task
    Add {
        /// Task text (words are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// List tasks
    List {
        /// Which tasks to show: all, active, completed
        #[arg(short, long, default_value = "all")]
        filter: String,
    },

    /// Flip a task between active and completed
    Toggle {
        /// Task id (or a unique prefix)
        id: String,
    },

    /// Replace a task's text; empty text deletes the task
    Edit {
        /// Task id (or a unique prefix)
        id: String,

        /// New text (words are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Delete a task
    Delete {
        /// Task id (or a unique prefix)
        id: String,
    },

    /// Complete every task, or reopen all when all are completed
    ToggleAll,

    /// Remove completed tasks
    ClearCompleted,

    /// Print how many tasks are left
    Count,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Tui => "tui",
            Commands::Add { .. } => "add",
            Commands::List { .. } => "list",
            Commands::Toggle { .. } => "toggle",
            Commands::Edit { .. } => "edit",
            Commands::Delete { .. } => "delete",
            Commands::ToggleAll => "toggle-all",
            Commands::ClearCompleted => "clear-completed",
            Commands::Count => "count",
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let slot = match self.data_dir {
            Some(dir) => FileSlot::new(dir, config.storage.key.clone()),
            None => config.slot(),
        };
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        tracing::debug!(slot = %slot.path().display(), "resolved slot");

        match self.command.unwrap_or(Commands::Tui) {
            Commands::Tui => crate::ui::todo_viewer::run(slot, config.ui),
            Commands::Add { text } => task::run_add(slot, &text.join(" "), options),
            Commands::List { filter } => task::run_list(slot, &filter, options),
            Commands::Toggle { id } => task::run_toggle(slot, &id, options),
            Commands::Edit { id, text } => task::run_edit(slot, &id, &text.join(" "), options),
            Commands::Delete { id } => task::run_delete(slot, &id, options),
            Commands::ToggleAll => task::run_toggle_all(slot, options),
            Commands::ClearCompleted => task::run_clear_completed(slot, options),
            Commands::Count => task::run_count(slot, options),
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path);
    }
    match config::default_config_path() {
        Some(path) => Config::load_or_default(&path),
        None => Ok(Config::default()),
    }
}
