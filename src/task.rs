//! Task records and the in-memory task store
//!
//! The store owns the ordered task list and the active filter. It performs no
//! I/O: every mutation is a [`Command`] applied to the store, which reports
//! whether state changed. Persisting and redrawing are the caller's job (see
//! [`crate::session`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::Error;

/// A single to-do entry as stored in the durable slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

/// View-level predicate selecting which tasks are displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// Filters in the order their controls are shown
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    pub fn matches(&self, task: &TaskRecord) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            _ => Err(Error::UnknownFilter(s.to_string())),
        }
    }
}

/// A discrete state transition on the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Toggle(String),
    Delete(String),
    Edit { id: String, text: String },
    ToggleAll,
    ClearCompleted,
    SetFilter(Filter),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add(_) => "add",
            Command::Toggle(_) => "toggle",
            Command::Delete(_) => "delete",
            Command::Edit { .. } => "edit",
            Command::ToggleAll => "toggle-all",
            Command::ClearCompleted => "clear-completed",
            Command::SetFilter(_) => "set-filter",
        }
    }

    /// Whether a change made by this command touches the persisted list.
    /// The filter lives only in memory.
    pub fn touches_list(&self) -> bool {
        !matches!(self, Command::SetFilter(_))
    }
}

/// Result of applying a [`Command`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub changed: bool,
    /// Id of the task created by an add
    pub task_id: Option<String>,
}

impl Outcome {
    fn changed(changed: bool) -> Self {
        Self {
            changed,
            task_id: None,
        }
    }
}

/// Ordered task list plus the active filter
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<TaskRecord>,
    filter: Filter,
}

impl TaskStore {
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        Self {
            tasks,
            filter: Filter::All,
        }
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.len() - self.active_count()
    }

    /// Tasks matching the current filter, in list order
    pub fn visible_tasks(&self) -> Vec<&TaskRecord> {
        self.tasks
            .iter()
            .filter(|task| self.filter.matches(task))
            .collect()
    }

    pub fn apply(&mut self, command: Command) -> Outcome {
        match command {
            Command::Add(text) => {
                let task_id = self.add(&text);
                Outcome {
                    changed: task_id.is_some(),
                    task_id,
                }
            }
            Command::Toggle(id) => Outcome::changed(self.toggle(&id)),
            Command::Delete(id) => Outcome::changed(self.delete(&id)),
            Command::Edit { id, text } => Outcome::changed(self.edit(&id, &text)),
            Command::ToggleAll => Outcome::changed(self.toggle_all()),
            Command::ClearCompleted => Outcome::changed(self.clear_completed() > 0),
            Command::SetFilter(filter) => Outcome::changed(self.set_filter(filter)),
        }
    }

    /// Append a task; returns its id, or `None` when the trimmed text is empty
    pub fn add(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.fresh_id();
        self.tasks.push(TaskRecord {
            id: id.clone(),
            text: text.to_string(),
            completed: false,
        });
        Some(id)
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    /// Replace a task's text; an empty trimmed text deletes the task
    pub fn edit(&mut self, id: &str, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return self.delete(id);
        }
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) if task.text != text => {
                task.text = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Complete every task, or un-complete all of them when all are already
    /// completed
    pub fn toggle_all(&mut self) -> bool {
        if self.tasks.is_empty() {
            return false;
        }
        let target = !self.tasks.iter().all(|task| task.completed);
        for task in &mut self.tasks {
            task.completed = target;
        }
        true
    }

    /// Remove completed tasks; returns how many were removed
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        before - self.tasks.len()
    }

    pub fn set_filter(&mut self, filter: Filter) -> bool {
        let changed = self.filter != filter;
        self.filter = filter;
        changed
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Ulid::new().to_string().to_ascii_lowercase();
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

/// Counter text: "1 item left" for exactly one, "N items left" otherwise
pub fn items_left_label(active: usize) -> String {
    if active == 1 {
        "1 item left".to_string()
    } else {
        format!("{active} items left")
    }
}
