use todos::session::Session;
use todos::storage::{self, FileSlot, MemorySlot, DEFAULT_KEY};
use todos::task::{Command, Filter, TaskRecord, TaskStore};
use todos::ui::todo_viewer::editor::TextField;
use todos::ui::todo_viewer::model::{Focus, Interaction, ViewModel};

fn texts(store: &TaskStore) -> Vec<&str> {
    store
        .visible_tasks()
        .iter()
        .map(|task| task.text.as_str())
        .collect()
}

fn id_of(store: &TaskStore, text: &str) -> String {
    store
        .tasks()
        .iter()
        .find(|task| task.text == text)
        .map(|task| task.id.clone())
        .expect("task present")
}

fn record(id: &str, text: &str, completed: bool) -> TaskRecord {
    TaskRecord {
        id: id.to_string(),
        text: text.to_string(),
        completed,
    }
}

#[test]
fn add_complete_and_filter_scenario() {
    let slot = MemorySlot::new();
    let mut session = Session::open(&slot);
    session
        .dispatch(Command::Add("buy milk".to_string()))
        .expect("add");
    session
        .dispatch(Command::Add("walk dog".to_string()))
        .expect("add");
    let milk = id_of(session.store(), "buy milk");
    session.dispatch(Command::Toggle(milk)).expect("toggle");

    session
        .dispatch(Command::SetFilter(Filter::Active))
        .expect("filter");
    assert_eq!(texts(session.store()), vec!["walk dog"]);

    session
        .dispatch(Command::SetFilter(Filter::Completed))
        .expect("filter");
    assert_eq!(texts(session.store()), vec!["buy milk"]);
}

#[test]
fn one_active_two_completed_scenario() {
    let slot = MemorySlot::new();
    storage::save(
        &slot,
        &[
            record("a", "one", false),
            record("b", "two", true),
            record("c", "three", true),
        ],
    )
    .expect("seed");
    let mut session = Session::open(&slot);

    let entry = TextField::default();
    let project = |store: &TaskStore| {
        ViewModel::project(
            store,
            Interaction {
                entry: &entry,
                focus: Focus::Entry,
                selected: None,
                editor: None,
            },
        )
    };

    let model = project(session.store());
    assert_eq!(model.counter, "1 item left");
    assert!(model.clear_completed_visible);

    session.dispatch(Command::ClearCompleted).expect("clear");
    assert_eq!(session.store().len(), 1);
    assert!(!project(session.store()).clear_completed_visible);
    assert_eq!(storage::load(&slot).len(), 1);
}

#[test]
fn toggle_twice_restores_flag() {
    let mut store = TaskStore::new(vec![record("a", "one", true)]);
    store.apply(Command::Toggle("a".to_string()));
    store.apply(Command::Toggle("a".to_string()));
    assert!(store.tasks()[0].completed);
}

#[test]
fn edit_trims_and_empty_edit_removes() {
    let mut store = TaskStore::new(vec![record("a", "one", false), record("b", "two", false)]);
    store.apply(Command::Edit {
        id: "a".to_string(),
        text: "  x  ".to_string(),
    });
    assert_eq!(store.tasks()[0].text, "x");

    store.apply(Command::Edit {
        id: "b".to_string(),
        text: String::new(),
    });
    assert!(!store.contains("b"));
    assert_eq!(store.len(), 1);
}

#[test]
fn clear_completed_keeps_relative_order() {
    let mut store = TaskStore::new(vec![
        record("a", "1", false),
        record("b", "2", true),
        record("c", "3", false),
        record("d", "4", true),
        record("e", "5", false),
    ]);
    store.apply(Command::ClearCompleted);
    let ids: Vec<&str> = store.tasks().iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "e"]);
}

#[test]
fn file_slot_round_trips_and_survives_restart() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let slot = FileSlot::new(dir.path(), DEFAULT_KEY);
    let tasks = vec![
        record("01a", "caf\u{e9} \u{2615}", true),
        record("01b", "quote \" and \\ slash", false),
    ];
    storage::save(&slot, &tasks)?;
    assert_eq!(storage::load(&slot), tasks);

    let mut session = Session::open(slot.clone());
    session.dispatch(Command::ToggleAll)?;
    drop(session);

    let reopened = Session::open(slot);
    assert!(reopened.store().tasks().iter().all(|task| task.completed));
    assert_eq!(reopened.store().filter(), Filter::All);
    Ok(())
}
