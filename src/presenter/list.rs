//! List screen view-model.
//!
//! Holds the last fetched snapshot and turns it into the flat list and the
//! Undone/Done outline on every render pass.

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::entities::{Todo, TodoId};
use crate::store::{RecordStore, SortField};

pub const DEADLINE_FORMAT: &str = "%Y/%m/%d";
pub const UNDONE_HEADER: &str = "Undone";
pub const DONE_HEADER: &str = "Done";

/// What happens to the snapshot after a completion toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToggleResort {
    /// Re-fetch, so the row moves, but only while sorted by status.
    #[default]
    WhenSortedByStatus,
    /// Patch the row in place and keep its position.
    Never,
}

/// Render-only projection of a todo.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayItem {
    pub id: TodoId,
    pub label: Option<String>,
    pub deadline: Option<String>,
    pub is_done: bool,
}

impl From<&Todo> for DisplayItem {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            label: todo.name().map(str::to_owned),
            deadline: todo
                .deadline()
                .map(|d| d.format(DEADLINE_FORMAT).to_string()),
            is_done: todo.is_done(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineGroup {
    pub title: &'static str,
    /// Folded groups keep their items; only the header is drawn.
    pub collapsed: bool,
    pub items: Vec<DisplayItem>,
}

/// Always exactly two groups, Undone first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline {
    pub groups: [OutlineGroup; 2],
}

impl Outline {
    pub fn undone(&self) -> &[DisplayItem] {
        &self.groups[0].items
    }

    pub fn done(&self) -> &[DisplayItem] {
        &self.groups[1].items
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOption {
    pub field: SortField,
    pub title: &'static str,
    pub selected: bool,
}

/// A delete the user has asked for but not yet confirmed.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct PendingDelete {
    id: TodoId,
}

#[derive(Debug, Default)]
pub struct ListPresenter {
    sort: SortField,
    toggle_resort: ToggleResort,
    snapshot: Vec<Todo>,
    collapsed: [bool; 2],
}

impl ListPresenter {
    pub fn new(sort: SortField, toggle_resort: ToggleResort) -> Self {
        Self {
            sort,
            toggle_resort,
            snapshot: Vec::new(),
            collapsed: [false; 2],
        }
    }

    pub fn sort(&self) -> SortField {
        self.sort
    }

    /// Folds or unfolds outline group `group` (0 = Undone, 1 = Done).
    pub fn toggle_collapsed(&mut self, group: usize) {
        if let Some(flag) = self.collapsed.get_mut(group) {
            *flag = !*flag;
            debug!(group, collapsed = *flag, "outline group folded");
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Id of the row at `index` in the flat list.
    pub fn id_at(&self, index: usize) -> Option<TodoId> {
        self.snapshot.get(index).map(|t| t.id)
    }

    pub fn index_of(&self, id: TodoId) -> Option<usize> {
        self.snapshot.iter().position(|t| t.id == id)
    }

    /// Re-fetches with the current sort. On failure the previous snapshot
    /// stays and false is returned.
    pub fn reload(&mut self, store: &impl RecordStore) -> bool {
        match store.fetch_sorted(self.sort) {
            Ok(records) => {
                self.snapshot = records;
                true
            }
            Err(err) => {
                error!(error = %err, sort = %self.sort, "fetch failed, skipping render pass");
                false
            }
        }
    }

    pub fn flat(&self) -> Vec<DisplayItem> {
        self.snapshot.iter().map(DisplayItem::from).collect()
    }

    pub fn outline(&self) -> Outline {
        let (done, undone): (Vec<DisplayItem>, Vec<DisplayItem>) = self
            .snapshot
            .iter()
            .map(DisplayItem::from)
            .partition(|item| item.is_done);
        Outline {
            groups: [
                OutlineGroup {
                    title: UNDONE_HEADER,
                    collapsed: self.collapsed[0],
                    items: undone,
                },
                OutlineGroup {
                    title: DONE_HEADER,
                    collapsed: self.collapsed[1],
                    items: done,
                },
            ],
        }
    }

    pub fn sort_menu(&self) -> [SortOption; 3] {
        SortField::ALL.map(|field| SortOption {
            field,
            title: field.label(),
            selected: field == self.sort,
        })
    }

    pub fn select_sort(&mut self, field: SortField, store: &impl RecordStore) -> bool {
        info!(from = %self.sort, to = %field, "sort changed");
        self.sort = field;
        self.reload(store)
    }

    /// Flips completion and commits right away.
    pub fn toggle(&mut self, id: TodoId, store: &mut impl RecordStore) -> bool {
        let Some(todo) = store.get_mut(id) else {
            warn!(%id, "toggle on unknown todo");
            return false;
        };
        todo.toggle_done();
        let is_done = todo.is_done();
        info!(%id, is_done, updated_at = todo.updated_at(), "todo toggled");
        commit(store);

        match self.toggle_resort {
            ToggleResort::WhenSortedByStatus if self.sort == SortField::Status => {
                self.reload(store);
            }
            _ => {
                if let Some(cached) = self.snapshot.iter_mut().find(|t| t.id == id) {
                    if cached.is_done() != is_done {
                        cached.toggle_done();
                    }
                }
            }
        }
        true
    }

    pub fn request_delete(&self, id: TodoId) -> Option<PendingDelete> {
        self.index_of(id).map(|_| PendingDelete { id })
    }

    pub fn confirm_delete(&mut self, pending: PendingDelete, store: &mut impl RecordStore) {
        if store.delete(pending.id) {
            info!(id = %pending.id, "todo deleted");
            commit(store);
        }
        self.reload(store);
    }

    pub fn cancel_delete(&self, pending: PendingDelete) {
        info!(id = %pending.id, "delete cancelled");
    }
}

/// Commit failures are logged, never shown.
pub(crate) fn commit(store: &mut impl RecordStore) -> bool {
    match store.save() {
        Ok(()) => true,
        Err(err) => {
            error!(error = %err, "failed to save todos");
            false
        }
    }
}
