//! Single-screen todo list: a UUID-keyed record store committed to a
//! bincode file, list and edit presenters, and a ratatui front end.

pub mod app;
pub mod config;
pub mod entities;
pub mod input;
pub mod logging;
pub mod presenter;
pub mod store;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use entities::{Todo, TodoId};
pub use store::{RecordStore, SortField, StoreError, TodoStore};
