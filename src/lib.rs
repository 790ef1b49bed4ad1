//! todos - Terminal Task List Library
//!
//! This library provides the core functionality for the todos CLI: a small
//! task list that lives in one local JSON slot, driven either by an
//! interactive terminal UI or by scripting subcommands.
//!
//! # Core Concepts
//!
//! - **Task Store**: ordered task records plus the active filter
//! - **Slot**: a single named key holding the serialized task list
//! - **Session**: command, new state, persist, then redraw
//! - **View Model**: a pure projection of the store for rendering
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `todos.toml`
//! - `error`: Error types and result aliases
//! - `output`: Human and JSON output envelopes
//! - `session`: Command dispatch and persistence
//! - `storage`: Durable slot and snapshot load/save
//! - `task`: Task records, filters and the task store
//! - `ui`: Interactive terminal UI

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod session;
pub mod storage;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
