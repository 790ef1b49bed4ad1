//! Presentation model: a pure projection of store and interaction state into
//! everything the screen shows.

use crate::task::{items_left_label, Filter, TaskStore};

use super::editor::{ItemEditor, TextField};

/// Which input currently receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Entry,
    List,
}

/// Interaction state that is not part of the store
#[derive(Debug, Clone, Copy)]
pub struct Interaction<'a> {
    pub entry: &'a TextField,
    pub focus: Focus,
    pub selected: Option<&'a str>,
    pub editor: Option<&'a ItemEditor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub value: String,
    pub cursor: usize,
}

impl FieldView {
    fn of(field: &TextField) -> Self {
        Self {
            value: field.value().to_string(),
            cursor: field.cursor(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub selected: bool,
    /// Present while the item is in edit mode
    pub editing: Option<FieldView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterView {
    pub filter: Filter,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub entry: FieldView,
    pub entry_focused: bool,
    pub main_visible: bool,
    pub footer_visible: bool,
    pub toggle_all_checked: bool,
    pub active_count: usize,
    pub completed_count: usize,
    pub counter: String,
    pub clear_completed_visible: bool,
    pub filters: Vec<FilterView>,
    pub items: Vec<ItemView>,
}

impl ViewModel {
    pub fn project(store: &TaskStore, interaction: Interaction<'_>) -> Self {
        let active_count = store.active_count();
        let completed_count = store.completed_count();
        let has_tasks = !store.is_empty();
        let current = store.filter();

        let items = store
            .visible_tasks()
            .into_iter()
            .map(|task| {
                let editing = interaction
                    .editor
                    .filter(|editor| editor.task_id() == task.id)
                    .map(|editor| FieldView::of(editor.field()));
                ItemView {
                    id: task.id.clone(),
                    text: task.text.clone(),
                    completed: task.completed,
                    selected: interaction.focus == Focus::List
                        && interaction.selected == Some(task.id.as_str()),
                    editing,
                }
            })
            .collect();

        Self {
            entry: FieldView::of(interaction.entry),
            entry_focused: interaction.focus == Focus::Entry && interaction.editor.is_none(),
            main_visible: has_tasks,
            footer_visible: has_tasks,
            toggle_all_checked: has_tasks && active_count == 0,
            active_count,
            completed_count,
            counter: items_left_label(active_count),
            clear_completed_visible: completed_count > 0,
            filters: Filter::ALL
                .iter()
                .map(|filter| FilterView {
                    filter: *filter,
                    active: *filter == current,
                })
                .collect(),
            items,
        }
    }
}
