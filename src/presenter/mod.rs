pub mod edit;
pub mod list;

pub use edit::{EditField, EditPresenter, EditState};
pub use list::{DisplayItem, ListPresenter, Outline, PendingDelete, SortOption, ToggleResort};
