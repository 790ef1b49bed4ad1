use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::UiConfig;
use crate::error::Result;
use crate::session::Session;
use crate::storage::{FileSlot, Slot};
use crate::task::{Command, Filter};

use super::editor::{FieldAction, ItemEditor, TextField};
use super::model::{Focus, Interaction, ViewModel};
use super::view::{self, Hitboxes, Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Error,
    Info,
}

/// Whether the event loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct AppState<S: Slot> {
    session: Session<S>,
    entry: TextField,
    focus: Focus,
    selected: Option<String>,
    editor: Option<ItemEditor>,
    status: Option<(String, StatusKind)>,
    hitboxes: Hitboxes,
    last_click: Option<(String, Instant)>,
    double_click: Duration,
}

impl<S: Slot> AppState<S> {
    pub fn new(session: Session<S>, ui: &UiConfig) -> Self {
        let selected = session.store().tasks().first().map(|task| task.id.clone());
        Self {
            session,
            entry: TextField::default(),
            focus: Focus::Entry,
            selected,
            editor: None,
            status: None,
            hitboxes: Hitboxes::default(),
            last_click: None,
            double_click: Duration::from_millis(ui.double_click_ms),
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn entry(&self) -> &TextField {
        &self.entry
    }

    pub fn editor(&self) -> Option<&ItemEditor> {
        self.editor.as_ref()
    }

    pub fn view_model(&self) -> ViewModel {
        ViewModel::project(
            self.session.store(),
            Interaction {
                entry: &self.entry,
                focus: self.focus,
                selected: self.selected.as_deref(),
                editor: self.editor.as_ref(),
            },
        )
    }

    /// Position of the selected task among the visible items
    pub(crate) fn selected_position(&self, model: &ViewModel) -> Option<usize> {
        let selected = self.selected.as_deref()?;
        model.items.iter().position(|item| item.id == selected)
    }

    pub(crate) fn set_hitboxes(&mut self, hitboxes: Hitboxes) {
        self.hitboxes = hitboxes;
    }

    pub fn status_line(&self) -> Option<(String, StatusKind)> {
        self.status.clone()
    }

    pub fn footer_hint(&self) -> String {
        if self.editor.is_some() {
            return "enter save  esc cancel  tab done".to_string();
        }
        match self.focus {
            Focus::Entry => "enter add  tab list  esc list  ctrl-c quit".to_string(),
            Focus::List => {
                "j/k move  space toggle  e edit  d delete  a all  1/2/3 filter  c clear  tab new  q quit"
                    .to_string()
            }
        }
    }

    fn set_error(&mut self, message: String) {
        self.status = Some((message, StatusKind::Error));
    }

    fn set_info(&mut self, message: String) {
        self.status = Some((message, StatusKind::Info));
    }

    /// Apply a command through the session, then keep the selection on a
    /// visible task
    fn dispatch(&mut self, command: Command) {
        let previous = self.selected_visible_index();
        match self.session.dispatch(command) {
            Ok(outcome) => {
                if let Some(task_id) = outcome.task_id {
                    if self.is_visible(&task_id) {
                        self.selected = Some(task_id);
                    }
                }
                self.status = None;
            }
            Err(err) => self.set_error(format!("save failed: {err}")),
        }
        self.reconcile_selection(previous);
    }

    fn visible_ids(&self) -> Vec<String> {
        self.session
            .store()
            .visible_tasks()
            .into_iter()
            .map(|task| task.id.clone())
            .collect()
    }

    fn is_visible(&self, id: &str) -> bool {
        self.session
            .store()
            .find(id)
            .is_some_and(|task| self.session.store().filter().matches(task))
    }

    fn selected_visible_index(&self) -> Option<usize> {
        let selected = self.selected.as_deref()?;
        self.visible_ids().iter().position(|id| id == selected)
    }

    fn reconcile_selection(&mut self, previous: Option<usize>) {
        if self.selected.as_deref().is_some_and(|id| self.is_visible(id)) {
            return;
        }
        let ids = self.visible_ids();
        self.selected = match previous {
            Some(idx) if !ids.is_empty() => Some(ids[idx.min(ids.len() - 1)].clone()),
            _ => ids.first().cloned(),
        };
    }

    fn move_selection(&mut self, delta: isize) {
        let ids = self.visible_ids();
        if ids.is_empty() {
            self.selected = None;
            return;
        }
        let current = self.selected_visible_index().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, ids.len() as isize - 1) as usize;
        self.selected = Some(ids[next].clone());
    }

    fn start_editing(&mut self, id: &str) {
        let Some(task) = self.session.store().find(id) else {
            return;
        };
        self.editor = Some(ItemEditor::new(task));
        self.selected = Some(id.to_string());
        self.focus = Focus::List;
        self.last_click = None;
    }

    /// Leave edit mode by committing the field's current value
    fn commit_edit(&mut self) {
        if let Some(editor) = self.editor.take() {
            self.dispatch(editor.into_command());
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.commit_edit();
            return Flow::Quit;
        }

        if let Some(editor) = self.editor.as_mut() {
            match editor.handle_key(key) {
                FieldAction::None => {}
                FieldAction::Submit | FieldAction::Blur => self.commit_edit(),
                FieldAction::Cancel => {
                    editor.restore();
                    self.commit_edit();
                }
            }
            return Flow::Continue;
        }

        match self.focus {
            Focus::Entry => self.handle_entry_key(key),
            Focus::List => self.handle_list_key(key),
        }
    }

    fn handle_entry_key(&mut self, key: KeyEvent) -> Flow {
        match self.entry.handle_key(key) {
            FieldAction::None => {}
            FieldAction::Submit => {
                let text = self.entry.value().to_string();
                self.dispatch(Command::Add(text));
                self.entry.clear();
            }
            FieldAction::Cancel | FieldAction::Blur => {
                self.focus = Focus::List;
            }
        }
        Flow::Continue
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Flow {
        let selected = self.selected.clone();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('n') | KeyCode::Char('i') => {
                self.focus = Focus::Entry;
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Home | KeyCode::Char('g') => self.move_selection(isize::MIN / 2),
            KeyCode::End | KeyCode::Char('G') => self.move_selection(isize::MAX / 2),
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = selected {
                    self.dispatch(Command::Toggle(id));
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(id) = selected {
                    self.start_editing(&id);
                }
            }
            KeyCode::Delete | KeyCode::Char('d') => {
                if let Some(id) = selected {
                    self.dispatch(Command::Delete(id));
                }
            }
            KeyCode::Char('a') => self.dispatch(Command::ToggleAll),
            KeyCode::Char('c') => self.clear_completed(),
            KeyCode::Char('1') => self.dispatch(Command::SetFilter(Filter::All)),
            KeyCode::Char('2') => self.dispatch(Command::SetFilter(Filter::Active)),
            KeyCode::Char('3') => self.dispatch(Command::SetFilter(Filter::Completed)),
            _ => {}
        }
        Flow::Continue
    }

    fn clear_completed(&mut self) {
        let removed = self.session.store().completed_count();
        self.dispatch(Command::ClearCompleted);
        if removed > 0 && !matches!(self.status, Some((_, StatusKind::Error))) {
            self.set_info(format!("cleared {removed} completed"));
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let target = self.hitboxes.hit(mouse.column, mouse.row);

        // A click outside the field being edited blurs it; the click is consumed.
        if let Some(editor) = self.editor.as_ref() {
            let inside = matches!(&target, Some(Target::Text(id)) if id == editor.task_id());
            if !inside {
                self.commit_edit();
            }
            return;
        }

        match target {
            Some(Target::Entry) => self.focus = Focus::Entry,
            Some(Target::ToggleAll) => self.dispatch(Command::ToggleAll),
            Some(Target::Checkbox(id)) => {
                self.focus = Focus::List;
                self.selected = Some(id.clone());
                self.dispatch(Command::Toggle(id));
            }
            Some(Target::Delete(id)) => {
                self.focus = Focus::List;
                self.dispatch(Command::Delete(id));
            }
            Some(Target::Text(id)) => self.click_text(id, now),
            Some(Target::Filter(filter)) => self.dispatch(Command::SetFilter(filter)),
            Some(Target::ClearCompleted) => self.clear_completed(),
            None => {}
        }
    }

    fn click_text(&mut self, id: String, now: Instant) {
        let double = self.last_click.as_ref().is_some_and(|(last_id, at)| {
            *last_id == id && now.saturating_duration_since(*at) <= self.double_click
        });
        if double {
            self.start_editing(&id);
            return;
        }
        self.focus = Focus::List;
        self.selected = Some(id.clone());
        self.last_click = Some((id, now));
    }

    /// Terminal lost focus: an open edit commits, like a blurred field
    pub fn handle_focus_lost(&mut self) {
        self.commit_edit();
    }
}

pub fn run(slot: FileSlot, ui: UiConfig) -> Result<()> {
    let session = Session::open(slot);
    let mut app = AppState::new(session, &ui);
    run_terminal(&mut app, &ui)
}

fn run_terminal(app: &mut AppState<FileSlot>, ui: &UiConfig) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    if ui.mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    if ui.mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<FileSlot>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| view::render(frame, app))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if app.handle_key(key) == Flow::Quit {
                    break;
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
            Event::FocusLost => app.handle_focus_lost(),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{self, MemorySlot};
    use crate::task::TaskRecord;
    use crossterm::event::KeyEventState;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;

    fn test_app(tasks: &[(&str, &str, bool)]) -> AppState<MemorySlot> {
        let slot = MemorySlot::new();
        let records: Vec<TaskRecord> = tasks
            .iter()
            .map(|(id, text, completed)| TaskRecord {
                id: id.to_string(),
                text: text.to_string(),
                completed: *completed,
            })
            .collect();
        if !records.is_empty() {
            storage::save(&slot, &records).expect("seed");
        }
        AppState::new(Session::open(slot), &UiConfig::default())
    }

    fn press<S: Slot>(app: &mut AppState<S>, code: KeyCode) -> Flow {
        app.handle_key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_str<S: Slot>(app: &mut AppState<S>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn texts(app: &AppState<MemorySlot>) -> Vec<String> {
        app.session()
            .store()
            .visible_tasks()
            .iter()
            .map(|task| task.text.clone())
            .collect()
    }

    fn persisted(app: &AppState<MemorySlot>) -> Vec<TaskRecord> {
        storage::load(app.session().slot())
    }

    fn click(app: &mut AppState<MemorySlot>, column: u16, row: u16, now: Instant) {
        app.handle_mouse(
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            },
            now,
        );
    }

    fn draw(app: &mut AppState<MemorySlot>) {
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).expect("terminal");
        terminal
            .draw(|frame| view::render(frame, app))
            .expect("draw");
    }

    fn row_hitbox(app: &AppState<MemorySlot>, id: &str) -> (Rect, Rect, Rect) {
        let row = app
            .hitboxes
            .rows
            .iter()
            .find(|row| row.id == id)
            .expect("row");
        (row.checkbox, row.text, row.delete)
    }

    #[test]
    fn submit_adds_and_clears_entry() {
        let mut app = test_app(&[]);
        assert_eq!(app.focus(), Focus::Entry);
        type_str(&mut app, "  buy milk ");
        press(&mut app, KeyCode::Enter);

        assert_eq!(texts(&app), vec!["buy milk"]);
        assert!(app.entry().is_empty());
        assert_eq!(persisted(&app).len(), 1);
    }

    #[test]
    fn blank_submit_is_noop() {
        let mut app = test_app(&[]);
        type_str(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert!(app.session().store().is_empty());
        assert!(app.session().slot().content().is_none());
        assert!(app.entry().is_empty());
    }

    #[test]
    fn list_keys_toggle_delete_and_filter() {
        let mut app = test_app(&[("a", "buy milk", false), ("b", "walk dog", false)]);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus(), Focus::List);
        assert_eq!(app.selected(), Some("a"));

        press(&mut app, KeyCode::Char(' '));
        assert!(persisted(&app)[0].completed);

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(texts(&app), vec!["walk dog"]);
        assert_eq!(app.selected(), Some("b"));

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(texts(&app), vec!["buy milk"]);

        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(persisted(&app).len(), 1);
    }

    #[test]
    fn toggle_all_and_clear_completed_keys() {
        let mut app = test_app(&[("a", "one", true), ("b", "two", false)]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('a'));
        assert!(persisted(&app).iter().all(|task| task.completed));
        press(&mut app, KeyCode::Char('a'));
        assert!(persisted(&app).iter().all(|task| !task.completed));

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(texts(&app), vec!["two"]);
        assert_eq!(app.selected(), Some("b"));
        assert_eq!(
            app.status_line(),
            Some(("cleared 1 completed".to_string(), StatusKind::Info))
        );
    }

    #[test]
    fn enter_edits_and_commits() {
        let mut app = test_app(&[("a", "buy milk", false)]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));
        assert!(app.editor().is_some());
        type_str(&mut app, " now");
        press(&mut app, KeyCode::Enter);

        assert!(app.editor().is_none());
        assert_eq!(persisted(&app)[0].text, "buy milk now");
    }

    #[test]
    fn escape_restores_without_writing() {
        let mut app = test_app(&[("a", "buy milk", false)]);
        let before = app.session().slot().content();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "zzz");
        press(&mut app, KeyCode::Esc);

        assert!(app.editor().is_none());
        assert_eq!(texts(&app), vec!["buy milk"]);
        assert_eq!(app.session().slot().content(), before);
        // Esc only left edit mode; the app is still running
        assert_eq!(app.focus(), Focus::List);
    }

    #[test]
    fn escape_on_untrimmed_stored_text_writes_nothing() {
        let raw = r#"[{"id":"a","text":"  x  ","completed":false}]"#;
        let slot = MemorySlot::with_content(raw);
        let mut app = AppState::new(Session::open(slot), &UiConfig::default());
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Esc);

        assert!(app.editor().is_none());
        assert_eq!(texts(&app), vec!["x"]);
        assert_eq!(app.session().slot().content().as_deref(), Some(raw));
    }

    #[test]
    fn ctrl_c_commits_open_edit_before_quitting() {
        let mut app = test_app(&[("a", "milk", false)]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, "!");

        let flow = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(flow, Flow::Quit);
        assert!(app.editor().is_none());
        assert_eq!(persisted(&app)[0].text, "milk!");
    }

    #[test]
    fn emptied_edit_deletes_task() {
        let mut app = test_app(&[("a", "buy milk", false), ("b", "walk dog", false)]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));
        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        press(&mut app, KeyCode::Tab);

        assert_eq!(texts(&app), vec!["walk dog"]);
        assert_eq!(app.selected(), Some("b"));
    }

    #[test]
    fn focus_lost_commits_edit() {
        let mut app = test_app(&[("a", "buy milk", false)]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, "!");
        app.handle_focus_lost();
        assert!(app.editor().is_none());
        assert_eq!(persisted(&app)[0].text, "buy milk!");
    }

    #[test]
    fn quit_keys() {
        let mut app = test_app(&[]);
        type_str(&mut app, "q");
        assert_eq!(app.entry().value(), "q");
        let ctrl_c = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(ctrl_c, Flow::Quit);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus(), Focus::List);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Flow::Quit);
    }

    #[test]
    fn mouse_checkbox_delete_and_filters() {
        let mut app = test_app(&[("a", "buy milk", false), ("b", "walk dog", false)]);
        draw(&mut app);
        let now = Instant::now();

        let (checkbox, _, _) = row_hitbox(&app, "a");
        click(&mut app, checkbox.x, checkbox.y, now);
        assert!(persisted(&app)[0].completed);

        draw(&mut app);
        let (filter, rect) = app.hitboxes.filters[1];
        assert_eq!(filter, Filter::Active);
        click(&mut app, rect.x, rect.y, now);
        assert_eq!(texts(&app), vec!["walk dog"]);

        draw(&mut app);
        let (_, _, delete) = row_hitbox(&app, "b");
        click(&mut app, delete.x, delete.y, now);
        assert_eq!(persisted(&app).len(), 1);

        draw(&mut app);
        let clear = app.hitboxes.clear_completed.expect("clear visible");
        click(&mut app, clear.x, clear.y, now);
        assert!(app.session().store().is_empty());
    }

    #[test]
    fn double_click_enters_edit_and_outside_click_commits() {
        let mut app = test_app(&[("a", "buy milk", false)]);
        draw(&mut app);
        let (_, text, _) = row_hitbox(&app, "a");
        let now = Instant::now();

        click(&mut app, text.x + 1, text.y, now);
        assert!(app.editor().is_none());
        click(&mut app, text.x + 1, text.y, now + Duration::from_millis(100));
        assert_eq!(app.editor().map(|editor| editor.field().cursor()), Some(8));

        type_str(&mut app, "!");
        draw(&mut app);
        let toggle = app.hitboxes.toggle_all.expect("toggle all");
        click(&mut app, toggle.x, toggle.y, now + Duration::from_millis(200));

        assert!(app.editor().is_none());
        let saved = persisted(&app);
        assert_eq!(saved[0].text, "buy milk!");
        // the blurring click is consumed
        assert!(!saved[0].completed);
    }

    #[test]
    fn slow_clicks_do_not_edit() {
        let mut app = test_app(&[("a", "buy milk", false)]);
        draw(&mut app);
        let (_, text, _) = row_hitbox(&app, "a");
        let now = Instant::now();
        click(&mut app, text.x, text.y, now);
        click(&mut app, text.x, text.y, now + Duration::from_secs(2));
        assert!(app.editor().is_none());
        assert_eq!(app.selected(), Some("a"));
    }

    #[test]
    fn save_failure_is_reported_in_status() {
        struct FailingSlot;
        impl Slot for FailingSlot {
            fn read(&self) -> Result<Option<String>> {
                Ok(None)
            }
            fn write(&self, _content: &str) -> Result<()> {
                Err(crate::error::Error::OperationFailed("disk full".to_string()))
            }
            fn location(&self) -> String {
                "failing".to_string()
            }
        }

        let mut app = AppState::new(Session::open(FailingSlot), &UiConfig::default());
        type_str(&mut app, "task");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.session().store().len(), 1);
        let (message, kind) = app.status_line().expect("status");
        assert_eq!(kind, StatusKind::Error);
        assert!(message.contains("disk full"));
    }
}
