//! Command pipeline binding one task store to one durable slot
//!
//! `dispatch` applies a command to the store and, when the task list changed,
//! writes the full snapshot back to the slot. Callers redraw afterwards.

use crate::error::Result;
use crate::storage::{self, Slot};
use crate::task::{Command, Outcome, TaskStore};

pub struct Session<S: Slot> {
    store: TaskStore,
    slot: S,
}

impl<S: Slot> Session<S> {
    /// Load the slot (recovering to an empty list) and start a session on it
    pub fn open(slot: S) -> Self {
        let tasks = storage::load(&slot);
        Self {
            store: TaskStore::new(tasks),
            slot,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Apply a command and persist the resulting list.
    ///
    /// Unchanged outcomes and filter changes skip the write. A failed write
    /// leaves the in-memory state updated.
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        let name = command.name();
        let touches_list = command.touches_list();
        let outcome = self.store.apply(command);
        tracing::debug!(command = name, changed = outcome.changed, "applied command");

        if outcome.changed && touches_list {
            storage::save(&self.slot, self.store.tasks())?;
        }
        Ok(outcome)
    }
}
