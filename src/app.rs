use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    widgets::{ScrollbarState, TableState},
    DefaultTerminal,
};
use tracing::{debug, info};

use crate::config::Config;
use crate::entities::TodoId;
use crate::presenter::{
    list::commit, EditField, EditPresenter, EditState, ListPresenter, PendingDelete,
};
use crate::store::{RecordStore, SortField};
use crate::ui::TableColors;

pub const ITEM_HEIGHT: usize = 1;

/// Which screen or prompt owns the keyboard.
#[derive(Debug)]
pub enum Mode {
    List,
    SortMenu { cursor: usize },
    ConfirmDelete(PendingDelete),
    Edit(EditPresenter),
}

pub struct App<S: RecordStore> {
    pub(crate) store: S,
    pub(crate) list: ListPresenter,
    pub(crate) mode: Mode,
    pub(crate) state: TableState,
    pub(crate) scroll_state: ScrollbarState,
    pub(crate) colors: TableColors,
    quit: bool,
}

impl<S: RecordStore> App<S> {
    pub fn new(store: S, config: &Config) -> Self {
        let list = ListPresenter::new(config.list.sort, config.list.toggle_resort);
        let mut app = Self {
            store,
            list,
            mode: Mode::List,
            state: TableState::default().with_selected(0),
            scroll_state: ScrollbarState::new(0),
            colors: TableColors::default(),
            quit: false,
        };
        app.refresh(None);
        app
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn list(&self) -> &ListPresenter {
        &self.list
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn selected_id(&self) -> Option<TodoId> {
        self.state.selected().and_then(|i| self.list.id_at(i))
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.quit {
            terminal.draw(|frame| self.draw(frame))?;

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        if self.store.has_changes() {
            commit(&mut self.store);
        }
        info!("app exited");
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match std::mem::replace(&mut self.mode, Mode::List) {
            Mode::List => self.on_list_key(key),
            Mode::SortMenu { cursor } => self.on_sort_menu_key(key, cursor),
            Mode::ConfirmDelete(pending) => self.on_confirm_key(key, pending),
            Mode::Edit(edit) => self.on_edit_key(key, edit),
        }
    }

    fn on_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.next_row(),
            KeyCode::Char('k') | KeyCode::Up => self.previous_row(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    self.list.toggle(id, &mut self.store);
                    self.select_id(Some(id));
                }
            }
            KeyCode::Char('a') => self.mode = Mode::Edit(EditPresenter::new()),
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    self.mode = Mode::Edit(EditPresenter::open(id, &self.store));
                }
            }
            KeyCode::Char('d') => {
                let pending = self
                    .selected_id()
                    .and_then(|id| self.list.request_delete(id));
                if let Some(pending) = pending {
                    self.mode = Mode::ConfirmDelete(pending);
                }
            }
            KeyCode::Char('[') => self.list.toggle_collapsed(0),
            KeyCode::Char(']') => self.list.toggle_collapsed(1),
            KeyCode::Char('s') => {
                let cursor = SortField::ALL
                    .iter()
                    .position(|f| *f == self.list.sort())
                    .unwrap_or(0);
                self.mode = Mode::SortMenu { cursor };
            }
            _ => {}
        }
    }

    fn on_sort_menu_key(&mut self, key: KeyEvent, cursor: usize) {
        let last = SortField::ALL.len() - 1;
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {}
            KeyCode::Char('j') | KeyCode::Down => {
                self.mode = Mode::SortMenu {
                    cursor: if cursor >= last { 0 } else { cursor + 1 },
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.mode = Mode::SortMenu {
                    cursor: if cursor == 0 { last } else { cursor - 1 },
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let selected = self.selected_id();
                self.list.select_sort(SortField::ALL[cursor], &self.store);
                self.select_id(selected);
            }
            _ => self.mode = Mode::SortMenu { cursor },
        }
    }

    fn on_confirm_key(&mut self, key: KeyEvent, pending: PendingDelete) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let index = self.state.selected();
                self.list.confirm_delete(pending, &mut self.store);
                self.clamp_selection(index);
            }
            KeyCode::Char('n') | KeyCode::Esc => self.list.cancel_delete(pending),
            _ => self.mode = Mode::ConfirmDelete(pending),
        }
    }

    fn on_edit_key(&mut self, key: KeyEvent, mut edit: EditPresenter) {
        if edit.is_confirming() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                let saved = match edit.state() {
                    EditState::Committed(id) | EditState::Updated(id) => Some(id),
                    _ => None,
                };
                edit.dismiss();
                self.refresh(saved);
            } else {
                self.mode = Mode::Edit(edit);
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                debug!("edit abandoned");
                return;
            }
            KeyCode::Enter => {
                edit.save(&mut self.store);
            }
            KeyCode::Char('s') if ctrl => {
                edit.save(&mut self.store);
            }
            KeyCode::Tab | KeyCode::BackTab => edit.next_field(),
            code => match edit.focus() {
                EditField::Label => match code {
                    KeyCode::Char(c) => edit.label_mut().enter_char(c),
                    KeyCode::Backspace => edit.label_mut().delete_char(),
                    KeyCode::Left => edit.label_mut().move_cursor_left(),
                    KeyCode::Right => edit.label_mut().move_cursor_right(),
                    _ => {}
                },
                EditField::Date => match code {
                    KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('k') => edit.shift_days(1),
                    KeyCode::Down | KeyCode::Char('-') | KeyCode::Char('j') => edit.shift_days(-1),
                    KeyCode::PageUp | KeyCode::Char('K') => edit.shift_months(1),
                    KeyCode::PageDown | KeyCode::Char('J') => edit.shift_months(-1),
                    _ => {}
                },
            },
        }
        self.mode = Mode::Edit(edit);
    }

    pub fn next_row(&mut self) {
        if self.list.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.list.len() => i + 1,
            _ => 0,
        };
        self.select_index(i);
    }

    pub fn previous_row(&mut self) {
        if self.list.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.list.len() - 1,
            Some(i) => i - 1,
        };
        self.select_index(i);
    }

    /// Re-fetches and keeps `keep` selected when it is still listed.
    fn refresh(&mut self, keep: Option<TodoId>) {
        let keep = keep.or_else(|| self.selected_id());
        self.list.reload(&self.store);
        self.scroll_state = self.scroll_state.content_length(self.list.len() * ITEM_HEIGHT);
        self.select_id(keep);
    }

    fn select_id(&mut self, id: Option<TodoId>) {
        match id.and_then(|id| self.list.index_of(id)) {
            Some(i) => self.select_index(i),
            None => self.clamp_selection(self.state.selected()),
        }
    }

    fn clamp_selection(&mut self, index: Option<usize>) {
        self.scroll_state = self.scroll_state.content_length(self.list.len() * ITEM_HEIGHT);
        if self.list.is_empty() {
            self.state.select(None);
            return;
        }
        let i = index.unwrap_or(0).min(self.list.len() - 1);
        self.select_index(i);
    }

    fn select_index(&mut self, i: usize) {
        self.state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i * ITEM_HEIGHT);
    }
}
