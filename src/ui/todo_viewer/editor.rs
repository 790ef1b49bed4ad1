use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::task::{Command, TaskRecord};

/// What a key press asked the owner of a text field to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAction {
    None,
    Submit,
    Cancel,
    Blur,
}

/// Single-line text input with a caret, measured in chars
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    /// Field pre-filled with `value`, caret at the end
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Replace the content and put the caret at the end
    pub fn set_value(&mut self, value: &str) {
        *self = Self::with_value(value);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FieldAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('u') => self.clear(),
                KeyCode::Char('a') => self.cursor = 0,
                KeyCode::Char('e') => self.cursor = self.len(),
                _ => {}
            }
            return FieldAction::None;
        }

        match key.code {
            KeyCode::Enter => return FieldAction::Submit,
            KeyCode::Esc => return FieldAction::Cancel,
            KeyCode::Tab | KeyCode::BackTab => return FieldAction::Blur,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        FieldAction::None
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len())
    }

    fn remove_at(&mut self, char_index: usize) {
        let at = self.byte_index(char_index);
        if at < self.value.len() {
            self.value.remove(at);
        }
    }
}

/// In-place edit of one task's text
#[derive(Debug, Clone)]
pub struct ItemEditor {
    task_id: String,
    original: String,
    field: TextField,
}

impl ItemEditor {
    pub fn new(task: &TaskRecord) -> Self {
        Self {
            task_id: task.id.clone(),
            original: task.text.clone(),
            field: TextField::with_value(&task.text),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn field(&self) -> &TextField {
        &self.field
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FieldAction {
        self.field.handle_key(key)
    }

    /// Put the task's original text back into the field
    pub fn restore(&mut self) {
        self.field.set_value(&self.original);
    }

    /// The edit that commits the field's current value
    pub fn into_command(self) -> Command {
        Command::Edit {
            id: self.task_id,
            text: self.field.value,
        }
    }
}
