//! Record store over the single `Todo` entity.
//!
//! Records live in memory in creation order. `create`, `delete` and
//! mutations through `get_mut` are pending until `save` hands the live set
//! to the backend. Fetches always see the live set.

pub mod backend;
#[cfg(test)]
mod memory;

use std::{
    collections::HashSet,
    fmt,
    io,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{Todo, TodoId};

pub use backend::{Backend, FileBackend};
#[cfg(test)]
pub(crate) use memory::MemoryBackend;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode or decode todos: {0}")]
    Codec(#[from] bincode::Error),
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Field a fetch is ordered by, ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    #[serde(alias = "deadline")]
    Date,
    #[serde(alias = "name")]
    Title,
    #[serde(alias = "done")]
    Status,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Date, SortField::Title, SortField::Status];

    pub fn label(self) -> &'static str {
        match self {
            SortField::Date => "Date",
            SortField::Title => "Title",
            SortField::Status => "Status",
        }
    }

    /// Stable sort; `None` sorts before any value, `false` before `true`.
    pub fn sort(self, records: impl IntoIterator<Item = Todo>) -> Vec<Todo> {
        let records = records.into_iter();
        match self {
            SortField::Date => records.sorted_by_key(|t| t.deadline()).collect(),
            SortField::Title => records
                .sorted_by(|a, b| a.name().cmp(&b.name()))
                .collect(),
            SortField::Status => records.sorted_by_key(|t| t.is_done()).collect(),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the presenters need from persistence.
pub trait RecordStore {
    /// Inserts a new, uncommitted record.
    fn create(&mut self) -> &mut Todo;
    /// Marks a record for removal. Returns false for unknown ids.
    fn delete(&mut self, id: TodoId) -> bool;
    fn get(&self, id: TodoId) -> Option<&Todo>;
    fn get_mut(&mut self, id: TodoId) -> Option<&mut Todo>;
    /// Commits every pending create, mutation and delete.
    fn save(&mut self) -> StoreResult<()>;
    fn fetch_sorted(&self, field: SortField) -> StoreResult<Vec<Todo>>;
    fn has_changes(&self) -> bool;
}

pub struct TodoStore<B: Backend> {
    backend: B,
    records: Vec<Todo>,
    deleted: HashSet<TodoId>,
    dirty: bool,
}

impl TodoStore<FileBackend> {
    pub fn open_file(path: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::open(FileBackend::new(path))
    }
}

impl<B: Backend> TodoStore<B> {
    pub fn open(backend: B) -> StoreResult<Self> {
        let records = backend.load()?;
        info!(records = records.len(), "todo store opened");
        Ok(Self {
            backend,
            records,
            deleted: HashSet::new(),
            dirty: false,
        })
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    fn position(&self, id: TodoId) -> Option<usize> {
        self.records
            .iter()
            .position(|t| t.id == id && !self.deleted.contains(&t.id))
    }
}

impl<B: Backend> RecordStore for TodoStore<B> {
    fn create(&mut self) -> &mut Todo {
        let todo = Todo::new(Uuid::new_v4());
        debug!(id = %todo.id, "todo created");
        self.dirty = true;
        self.records.push(todo);
        let last = self.records.len() - 1;
        &mut self.records[last]
    }

    fn delete(&mut self, id: TodoId) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        debug!(%id, "todo marked for deletion");
        self.deleted.insert(id);
        self.dirty = true;
        true
    }

    fn get(&self, id: TodoId) -> Option<&Todo> {
        self.position(id).map(|i| &self.records[i])
    }

    fn get_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        let i = self.position(id)?;
        // handing out a mutable record counts as a pending change
        self.dirty = true;
        Some(&mut self.records[i])
    }

    fn save(&mut self) -> StoreResult<()> {
        if !self.dirty {
            return Ok(());
        }
        let live: Vec<Todo> = self
            .records
            .iter()
            .filter(|t| !self.deleted.contains(&t.id))
            .cloned()
            .collect();
        self.backend.persist(&live)?;

        info!(records = live.len(), removed = self.deleted.len(), "todo store committed");
        self.records = live;
        self.deleted.clear();
        self.dirty = false;
        Ok(())
    }

    fn fetch_sorted(&self, field: SortField) -> StoreResult<Vec<Todo>> {
        let live = self
            .records
            .iter()
            .filter(|t| !self.deleted.contains(&t.id))
            .cloned();
        let sorted = field.sort(live);
        debug!(sort = %field, records = sorted.len(), "fetched todos");
        Ok(sorted)
    }

    fn has_changes(&self) -> bool {
        self.dirty
    }
}
