//! todos task command implementations.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::session::Session;
use crate::storage::FileSlot;
use crate::task::{items_left_label, Command, Filter, TaskRecord, TaskStore};

#[derive(Serialize)]
struct AddReport<'a> {
    added: bool,
    task: Option<&'a TaskRecord>,
}

#[derive(Serialize)]
struct ListReport<'a> {
    filter: Filter,
    tasks: Vec<&'a TaskRecord>,
    counts: Counts,
}

#[derive(Serialize)]
struct Counts {
    total: usize,
    active: usize,
    completed: usize,
    label: String,
}

impl Counts {
    fn of(store: &TaskStore) -> Self {
        let active = store.active_count();
        Self {
            total: store.len(),
            active,
            completed: store.completed_count(),
            label: items_left_label(active),
        }
    }
}

#[derive(Serialize)]
struct ChangeReport<'a> {
    id: &'a str,
    changed: bool,
    /// Task after the change; `None` when it was removed
    task: Option<&'a TaskRecord>,
}

#[derive(Serialize)]
struct BulkReport {
    changed: bool,
    affected: usize,
    counts: Counts,
}

pub fn run_add(slot: FileSlot, text: &str, options: OutputOptions) -> Result<()> {
    let mut session = Session::open(slot);
    let outcome = session.dispatch(Command::Add(text.to_string()))?;
    let task = outcome
        .task_id
        .as_deref()
        .and_then(|id| session.store().find(id));

    let human = match task {
        Some(task) => HumanOutput::new(format!("Added {}: {}", task.id, task.text)),
        None => HumanOutput::new("Nothing to add: task text is empty"),
    };
    let report = AddReport {
        added: task.is_some(),
        task,
    };
    emit_success(options, "add", &report, Some(&human))
}

pub fn run_list(slot: FileSlot, filter: &str, options: OutputOptions) -> Result<()> {
    let filter: Filter = filter.parse()?;
    let mut session = Session::open(slot);
    session.dispatch(Command::SetFilter(filter))?;
    let store = session.store();
    let tasks = store.visible_tasks();

    let mut human = HumanOutput::new("");
    if tasks.is_empty() {
        human.push_line(if store.is_empty() {
            "No tasks"
        } else {
            "No matches"
        });
    }
    for task in &tasks {
        human.push_line(format_task_line(task));
    }
    if !store.is_empty() {
        human.push_line("");
        human.push_line(items_left_label(store.active_count()));
    }

    let report = ListReport {
        filter,
        tasks,
        counts: Counts::of(store),
    };
    emit_success(options, "list", &report, Some(&human))
}

pub fn run_toggle(slot: FileSlot, id: &str, options: OutputOptions) -> Result<()> {
    let mut session = Session::open(slot);
    let id = resolve_id(session.store(), id)?;
    let outcome = session.dispatch(Command::Toggle(id.clone()))?;
    let task = session.store().find(&id);

    let human = match task {
        Some(task) => HumanOutput::new(format_task_line(task)),
        None => HumanOutput::new(format!("Task {id} unchanged")),
    };
    let report = ChangeReport {
        id: &id,
        changed: outcome.changed,
        task,
    };
    emit_success(options, "toggle", &report, Some(&human))
}

pub fn run_edit(slot: FileSlot, id: &str, text: &str, options: OutputOptions) -> Result<()> {
    let mut session = Session::open(slot);
    let id = resolve_id(session.store(), id)?;
    let outcome = session.dispatch(Command::Edit {
        id: id.clone(),
        text: text.to_string(),
    })?;
    let task = session.store().find(&id);

    let human = match task {
        Some(task) if outcome.changed => HumanOutput::new(format!("Edited {}", format_task_line(task))),
        Some(task) => HumanOutput::new(format!("Unchanged {}", format_task_line(task))),
        None => HumanOutput::new(format!("Deleted {id} (empty text)")),
    };
    let report = ChangeReport {
        id: &id,
        changed: outcome.changed,
        task,
    };
    emit_success(options, "edit", &report, Some(&human))
}

pub fn run_delete(slot: FileSlot, id: &str, options: OutputOptions) -> Result<()> {
    let mut session = Session::open(slot);
    let id = resolve_id(session.store(), id)?;
    let outcome = session.dispatch(Command::Delete(id.clone()))?;

    let human = HumanOutput::new(format!("Deleted {id}"));
    let report = ChangeReport {
        id: &id,
        changed: outcome.changed,
        task: None,
    };
    emit_success(options, "delete", &report, Some(&human))
}

pub fn run_toggle_all(slot: FileSlot, options: OutputOptions) -> Result<()> {
    let mut session = Session::open(slot);
    let outcome = session.dispatch(Command::ToggleAll)?;
    let store = session.store();

    let header = if !outcome.changed {
        "No tasks".to_string()
    } else if store.active_count() == 0 {
        format!("Completed all {} tasks", store.len())
    } else {
        format!("Reopened all {} tasks", store.len())
    };
    let mut human = HumanOutput::new(header);
    human.push_line(items_left_label(store.active_count()));
    if !outcome.changed {
        human.push_warning("nothing to toggle");
    }
    let report = BulkReport {
        changed: outcome.changed,
        affected: if outcome.changed { store.len() } else { 0 },
        counts: Counts::of(store),
    };
    emit_success(options, "toggle-all", &report, Some(&human))
}

pub fn run_clear_completed(slot: FileSlot, options: OutputOptions) -> Result<()> {
    let mut session = Session::open(slot);
    let before = session.store().len();
    let outcome = session.dispatch(Command::ClearCompleted)?;
    let store = session.store();
    let removed = before - store.len();

    let mut human = HumanOutput::new(format!("Cleared {removed} completed"));
    human.push_line(items_left_label(store.active_count()));
    if removed == 0 {
        human.push_warning("no completed tasks");
    }
    let report = BulkReport {
        changed: outcome.changed,
        affected: removed,
        counts: Counts::of(store),
    };
    emit_success(options, "clear-completed", &report, Some(&human))
}

pub fn run_count(slot: FileSlot, options: OutputOptions) -> Result<()> {
    let session = Session::open(slot);
    let counts = Counts::of(session.store());
    let human = HumanOutput::new(counts.label.clone());
    emit_success(options, "count", &counts, Some(&human))
}

fn format_task_line(task: &TaskRecord) -> String {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    format!("{mark} {}  {}", task.id, task.text)
}

/// Resolve an exact id or a unique, case-insensitive id prefix
fn resolve_id(store: &TaskStore, input: &str) -> Result<String> {
    let needle = input.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
    }
    if store.contains(&needle) {
        return Ok(needle);
    }

    let matches: Vec<&str> = store
        .tasks()
        .iter()
        .map(|task| task.id.as_str())
        .filter(|id| id.to_ascii_lowercase().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [only] => Ok((*only).to_string()),
        [] => Err(Error::TaskNotFound(input.trim().to_string())),
        _ => Err(Error::InvalidArgument(format!(
            "task id '{}' is ambiguous ({} matches)",
            input.trim(),
            matches.len()
        ))),
    }
}
