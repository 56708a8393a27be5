//! Edit screen for a single todo.
//!
//! `New` or `Existing` until saved, then `Committed` or `Updated` while the
//! confirmation is up, then `Dismissed`.

use chrono::{DateTime, Days, Local, Months};
use tracing::{info, warn};

use crate::entities::TodoId;
use crate::input::TextInput;
use crate::store::RecordStore;

use super::list::{commit, DEADLINE_FORMAT};

pub const SAVED_TITLE: &str = "Saved";
pub const SAVED_MESSAGE: &str = "Saved todo.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    New,
    Existing(TodoId),
    Committed(TodoId),
    Updated(TodoId),
    Dismissed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditField {
    #[default]
    Label,
    Date,
}

#[derive(Debug)]
pub struct EditPresenter {
    state: EditState,
    label: TextInput,
    date: DateTime<Local>,
    focus: EditField,
}

impl EditPresenter {
    /// Blank form; the date starts at now.
    pub fn new() -> Self {
        Self {
            state: EditState::New,
            label: TextInput::default(),
            date: Local::now(),
            focus: EditField::Label,
        }
    }

    /// Form pre-filled from `id`. Unknown ids fall back to a blank form.
    pub fn open(id: TodoId, store: &impl RecordStore) -> Self {
        let Some(todo) = store.get(id) else {
            warn!(%id, "edit requested for unknown todo");
            return Self::new();
        };
        Self {
            state: EditState::Existing(id),
            label: TextInput::new(todo.name().unwrap_or_default()),
            date: todo.deadline().unwrap_or_else(Local::now),
            focus: EditField::Label,
        }
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn title(&self) -> &'static str {
        match self.state {
            EditState::New | EditState::Committed(_) => "New todo",
            _ => "Edit todo",
        }
    }

    pub fn label(&self) -> &TextInput {
        &self.label
    }

    pub fn label_mut(&mut self) -> &mut TextInput {
        &mut self.label
    }

    pub fn date(&self) -> DateTime<Local> {
        self.date
    }

    pub fn date_text(&self) -> String {
        self.date.format(DEADLINE_FORMAT).to_string()
    }

    pub fn focus(&self) -> EditField {
        self.focus
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            EditField::Label => EditField::Date,
            EditField::Date => EditField::Label,
        };
    }

    pub fn set_date(&mut self, date: DateTime<Local>) {
        self.date = date;
    }

    pub fn shift_days(&mut self, days: i64) {
        let step = Days::new(days.unsigned_abs());
        let shifted = if days >= 0 {
            self.date.checked_add_days(step)
        } else {
            self.date.checked_sub_days(step)
        };
        if let Some(date) = shifted {
            self.date = date;
        }
    }

    pub fn shift_months(&mut self, months: i32) {
        let step = Months::new(months.unsigned_abs());
        let shifted = if months >= 0 {
            self.date.checked_add_months(step)
        } else {
            self.date.checked_sub_months(step)
        };
        if let Some(date) = shifted {
            self.date = date;
        }
    }

    /// Whether the "Saved" confirmation is waiting for acknowledgment.
    pub fn is_confirming(&self) -> bool {
        matches!(self.state, EditState::Committed(_) | EditState::Updated(_))
    }

    /// Writes the form into the store and commits. Returns the saved id.
    pub fn save(&mut self, store: &mut impl RecordStore) -> Option<TodoId> {
        let (id, created) = match self.state {
            EditState::New => (store.create().id, true),
            EditState::Existing(id) => (id, false),
            EditState::Committed(_) | EditState::Updated(_) | EditState::Dismissed => {
                return None;
            }
        };
        let Some(todo) = store.get_mut(id) else {
            warn!(%id, "todo vanished before save");
            return None;
        };
        todo.set_name(Some(self.label.value().to_string()));
        todo.set_deadline(Some(self.date));
        let created_at = todo.created_at();
        commit(store);

        self.state = if created {
            EditState::Committed(id)
        } else {
            EditState::Updated(id)
        };
        info!(%id, state = ?self.state, created_at, "todo saved");
        Some(id)
    }

    /// Acknowledges the confirmation; the form is done afterwards.
    pub fn dismiss(&mut self) {
        if self.is_confirming() {
            self.state = EditState::Dismissed;
        }
    }
}

impl Default for EditPresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryBackend, SortField, TodoStore};
    use chrono::TimeZone;

    fn type_text(edit: &mut EditPresenter, text: &str) {
        text.chars().for_each(|c| edit.label_mut().enter_char(c));
    }

    #[test]
    fn new_form_is_blank_and_dated_now() {
        let before = Local::now();
        let edit = EditPresenter::new();
        assert_eq!(edit.state(), EditState::New);
        assert_eq!(edit.label().value(), "");
        assert!(edit.date() >= before);
    }

    #[test]
    fn saving_new_entry_creates_exactly_one_undone_record() {
        let mut store = TodoStore::open(MemoryBackend::new()).unwrap();
        let mut edit = EditPresenter::new();
        let deadline = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let label = fakeit::words::sentence(3);
        type_text(&mut edit, &label);
        edit.set_date(deadline);

        let id = edit.save(&mut store).unwrap();
        assert_eq!(edit.state(), EditState::Committed(id));
        assert!(edit.is_confirming());

        let committed = store.backend().committed();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].id, id);
        assert_eq!(committed[0].name(), Some(label.as_str()));
        assert_eq!(committed[0].deadline(), Some(deadline));
        assert!(!committed[0].is_done());

        assert_eq!(edit.save(&mut store), None);
        assert_eq!(store.fetch_sorted(SortField::Date).unwrap().len(), 1);

        edit.dismiss();
        assert_eq!(edit.state(), EditState::Dismissed);
    }

    #[test]
    fn existing_record_is_prefilled_and_updated() {
        let mut store = TodoStore::open(MemoryBackend::new()).unwrap();
        let todo = store.create();
        todo.set_name(Some("draft".into()));
        let id = todo.id;
        store.save().unwrap();

        let mut edit = EditPresenter::open(id, &store);
        assert_eq!(edit.state(), EditState::Existing(id));
        assert_eq!(edit.label().value(), "draft");
        assert_eq!(edit.title(), "Edit todo");

        type_text(&mut edit, "ed");
        edit.shift_days(1);
        let expected_date = edit.date();
        assert_eq!(edit.save(&mut store), Some(id));
        assert_eq!(edit.state(), EditState::Updated(id));

        let committed = store.backend().committed();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].name(), Some("drafted"));
        assert_eq!(committed[0].deadline(), Some(expected_date));
    }

    #[test]
    fn existing_deadline_is_used_for_the_date_field() {
        let mut store = TodoStore::open(MemoryBackend::new()).unwrap();
        let deadline = Local.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap();
        let todo = store.create();
        todo.set_deadline(Some(deadline));
        let id = todo.id;

        let edit = EditPresenter::open(id, &store);
        assert_eq!(edit.date(), deadline);
        assert_eq!(edit.date_text(), "2023/06/15");
    }

    #[test]
    fn empty_label_is_accepted() {
        let mut store = TodoStore::open(MemoryBackend::new()).unwrap();
        let mut edit = EditPresenter::new();
        let id = edit.save(&mut store).unwrap();
        assert_eq!(store.get(id).unwrap().name(), None);
    }

    #[test]
    fn date_shifts_by_day_and_month() {
        let mut edit = EditPresenter::new();
        edit.set_date(Local.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap());
        edit.shift_months(1);
        assert_eq!(edit.date_text(), "2024/02/29");
        edit.shift_days(-29);
        assert_eq!(edit.date_text(), "2024/01/31");
        edit.next_field();
        assert_eq!(edit.focus(), EditField::Date);
    }

    #[test]
    fn dismiss_before_save_does_nothing() {
        let mut edit = EditPresenter::new();
        edit.dismiss();
        assert_eq!(edit.state(), EditState::New);
    }
}
