pub mod todo_viewer;
