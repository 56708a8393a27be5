use ratatui::{
    layout::{Constraint, Flex, Layout, Margin, Position, Rect},
    style::{self, Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, BorderType, Cell, Clear, HighlightSpacing, List, ListItem, Paragraph, Row,
        Scrollbar, ScrollbarOrientation, Table, Wrap,
    },
    Frame,
};
use style::palette::tailwind;

use crate::app::{App, Mode};
use crate::presenter::edit::{SAVED_MESSAGE, SAVED_TITLE};
use crate::presenter::{DisplayItem, EditField, EditPresenter};
use crate::store::RecordStore;

const PALETTE: tailwind::Palette = tailwind::BLUE;
const INFO_TEXT: [&str; 2] = [
    "Quit: q | Move: j/k | Done: <space> | Sort: s",
    "Add: a | Edit: e | Delete: d | Fold: [ ]",
];
const EDIT_INFO: &str = "Next field: <tab> | Date: +/- day, K/J month | Save: <enter> | Back: <esc>";
const LABEL_PREFIX: &str = "Title: ";
const DATE_PREFIX: &str = "Date:  ";
const CHECKMARK: &str = "✓";
const EXPANDED: &str = "▾ ";
const COLLAPSED: &str = "▸ ";

pub struct TableColors {
    buffer_bg: Color,
    header_bg: Color,
    row_fg: Color,
    done_fg: Color,
    selected_row_style_fg: Color,
    footer_border_color: Color,
}

impl TableColors {
    pub const fn new(color: &tailwind::Palette) -> Self {
        Self {
            buffer_bg: tailwind::SLATE.c950,
            header_bg: color.c900,
            row_fg: tailwind::SLATE.c200,
            done_fg: color.c400,
            selected_row_style_fg: color.c400,
            footer_border_color: color.c400,
        }
    }
}

impl Default for TableColors {
    fn default() -> Self {
        Self::new(&PALETTE)
    }
}

fn done_text(is_done: bool) -> &'static str {
    if is_done {
        "[x]"
    } else {
        "[ ]"
    }
}

/// `area` shrunk to a centered box `percent_x` by `percent_y` of its size.
fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Item rows for the two outline groups given `rows` free lines. Each group
/// is guaranteed half the space when both want more than that.
fn split_rows(rows: usize, wants: [usize; 2]) -> [usize; 2] {
    let fair = [rows - rows / 2, rows / 2];
    if wants[0] <= fair[0] {
        [wants[0], wants[1].min(rows - wants[0])]
    } else if wants[1] <= fair[1] {
        [wants[0].min(rows - wants[1]), wants[1]]
    } else {
        fair
    }
}

impl<S: RecordStore> App<S> {
    pub fn draw(&mut self, frame: &mut Frame) {
        let main_vertical =
            Layout::vertical([Constraint::Min(4), Constraint::Length(4)]).split(frame.area());

        let horizontal_layout =
            Layout::horizontal([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
                .split(main_vertical[0]);

        self.render_outline(frame, horizontal_layout[0]);
        self.render_table(frame, horizontal_layout[1]);
        self.render_scrollbar(frame, horizontal_layout[1]);
        self.render_footer(frame, main_vertical[1]);

        match &self.mode {
            Mode::List => {}
            Mode::SortMenu { cursor } => self.render_sort_menu(frame, *cursor),
            Mode::ConfirmDelete(_) => self.render_confirm_delete(frame),
            Mode::Edit(edit) if edit.is_confirming() => self.render_saved(frame),
            Mode::Edit(edit) => self.render_edit(frame, edit),
        }
    }

    fn render_outline(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("[1] Outline")
            .bg(self.colors.buffer_bg)
            .fg(self.colors.header_bg);

        let outline = self.list.outline();
        // both headers always get a line; items share what is left
        let free = usize::from(block.inner(area).height).saturating_sub(outline.groups.len());
        let wants = outline
            .groups
            .each_ref()
            .map(|g| if g.collapsed { 0 } else { g.items.len() });
        let rows = split_rows(free, wants);

        let mut items = Vec::new();
        for (group, rows) in outline.groups.iter().zip(rows) {
            let glyph = if group.collapsed { COLLAPSED } else { EXPANDED };
            items.push(ListItem::new(Line::from(vec![
                Span::raw(glyph),
                Span::raw(group.title).add_modifier(Modifier::BOLD),
                Span::raw(format!(" ({})", group.items.len())),
            ])));
            if group.collapsed || rows == 0 {
                continue;
            }
            let shown = if rows < group.items.len() { rows - 1 } else { rows };
            items.extend(group.items.iter().take(shown).map(|item| {
                let mut spans = vec![Span::raw("  "), Span::raw(item_label(item))];
                if let Some(deadline) = &item.deadline {
                    spans.push(Span::raw(format!("  {deadline}")).fg(Color::DarkGray));
                }
                if item.is_done {
                    spans.push(Span::raw(format!(" {CHECKMARK}")));
                }
                ListItem::new(Line::from(spans)).fg(self.colors.row_fg)
            }));
            if shown < group.items.len() {
                let hidden = group.items.len() - shown;
                items.push(ListItem::new(format!("  … {hidden} more")).fg(Color::DarkGray));
            }
        }

        frame.render_widget(List::new(items).block(block), area);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .style(Style::default().fg(self.colors.header_bg))
            .title(format!("[2] Todo List · sorted by {}", self.list.sort()));
        let selected_row_style = Style::default()
            .add_modifier(Modifier::REVERSED)
            .fg(self.colors.selected_row_style_fg);

        let rows = self.list.flat().into_iter().map(|item| {
            Row::new(vec![
                Cell::from(done_text(item.is_done)),
                Cell::from(item_label(&item)),
                Cell::from(item.deadline.clone().unwrap_or_default()),
            ])
            .fg(match item.is_done {
                true => self.colors.done_fg,
                false => self.colors.row_fg,
            })
            .height(1)
        });
        let t = Table::new(
            rows,
            [Constraint::Length(4), Constraint::Min(1), Constraint::Length(10)],
        )
        .block(block)
        .row_highlight_style(selected_row_style)
        .bg(self.colors.buffer_bg)
        .highlight_spacing(HighlightSpacing::Always);
        frame.render_stateful_widget(t, area, &mut self.state);
    }

    fn render_scrollbar(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_stateful_widget(
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.scroll_state,
        );
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let text = match self.mode {
            Mode::Edit(_) => Text::from(EDIT_INFO),
            _ => Text::from_iter(INFO_TEXT),
        };
        let info_footer = Paragraph::new(text)
            .style(
                Style::new()
                    .fg(self.colors.row_fg)
                    .bg(self.colors.buffer_bg),
            )
            .centered()
            .block(
                Block::bordered()
                    .border_type(BorderType::Double)
                    .border_style(Style::new().fg(self.colors.footer_border_color)),
            );
        frame.render_widget(info_footer, area);
    }

    fn render_sort_menu(&self, frame: &mut Frame, cursor: usize) {
        let area = popup_area(frame.area(), 30, 30);
        let lines: Vec<Line> = self
            .list
            .sort_menu()
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let mark = if option.selected { CHECKMARK } else { " " };
                let line = Line::from(format!(" {mark} {}", option.title));
                if i == cursor {
                    line.add_modifier(Modifier::REVERSED)
                } else {
                    line
                }
            })
            .collect();
        let menu = Paragraph::new(lines).block(
            Block::bordered()
                .title("Sort")
                .fg(Color::Blue)
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(Clear, area);
        frame.render_widget(menu, area);
    }

    fn render_confirm_delete(&self, frame: &mut Frame) {
        let area = popup_area(frame.area(), 40, 30);
        let prompt = Paragraph::new(Text::from(vec![
            Line::from("Do you delete this todo?"),
            Line::from(""),
            Line::from("[y] Delete   [n] Cancel").fg(Color::Red),
        ]))
        .centered()
        .wrap(Wrap { trim: true })
        .block(
            Block::bordered()
                .title("Delete")
                .fg(Color::Red)
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(Clear, area);
        frame.render_widget(prompt, area);
    }

    fn render_saved(&self, frame: &mut Frame) {
        let area = popup_area(frame.area(), 30, 25);
        let alert = Paragraph::new(Text::from(vec![
            Line::from(SAVED_MESSAGE),
            Line::from(""),
            Line::from("[enter] OK").fg(Color::Gray),
        ]))
        .centered()
        .block(
            Block::bordered()
                .title(SAVED_TITLE)
                .fg(Color::Blue)
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(Clear, area);
        frame.render_widget(alert, area);
    }

    fn render_edit(&self, frame: &mut Frame, edit: &EditPresenter) {
        let area = popup_area(frame.area(), 50, 33);
        let focused = |field: EditField| {
            if edit.focus() == field {
                Style::new().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::new().fg(Color::Gray)
            }
        };
        let form = Paragraph::new(Text::from(vec![
            Line::from(vec![
                Span::raw(LABEL_PREFIX),
                Span::raw(edit.label().value()),
            ])
            .style(focused(EditField::Label)),
            Line::from(vec![Span::raw(DATE_PREFIX), Span::raw(edit.date_text())])
                .style(focused(EditField::Date)),
        ]))
        .block(
            Block::bordered()
                .title(edit.title())
                .fg(Color::Blue)
                .border_type(BorderType::Rounded),
        );

        frame.render_widget(Clear, area);
        frame.render_widget(form, area);
        if edit.focus() == EditField::Label {
            // one in from the border, past the prefix, never on the border
            let x = (area.x + 1 + LABEL_PREFIX.len() as u16)
                .saturating_add(edit.label().cursor_column())
                .min(area.right().saturating_sub(2));
            frame.set_cursor_position(Position::new(x, area.y + 1));
        }
    }
}

fn item_label(item: &DisplayItem) -> String {
    item.label.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{MemoryBackend, TodoStore};
    use chrono::{Local, TimeZone};
    use ratatui::{backend::TestBackend, Terminal};

    fn terminal(app: &mut App<TodoStore<MemoryBackend>>) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
    }

    fn screen(app: &mut App<TodoStore<MemoryBackend>>) -> String {
        terminal(app)
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn crowded_app(undone: usize, done: usize) -> App<TodoStore<MemoryBackend>> {
        let mut store = TodoStore::open(MemoryBackend::new()).unwrap();
        for i in 0..undone + done {
            let todo = store.create();
            todo.set_name(Some(format!("task {i:02}")));
            if i >= undone {
                todo.toggle_done();
            }
        }
        store.save().unwrap();
        let dir = tempfile::tempdir().unwrap();
        App::new(store, &Config::load_from(dir.path()).unwrap())
    }

    fn milk_app() -> App<TodoStore<MemoryBackend>> {
        let mut store = TodoStore::open(MemoryBackend::new()).unwrap();
        let todo = store.create();
        todo.set_name(Some("Buy milk".into()));
        todo.set_deadline(Some(Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        store.save().unwrap();
        let dir = tempfile::tempdir().unwrap();
        App::new(store, &Config::load_from(dir.path()).unwrap())
    }

    #[test]
    fn renders_both_layouts() {
        let mut app = milk_app();
        let text = screen(&mut app);
        assert!(text.contains("Undone (1)"));
        assert!(text.contains("Done (0)"));
        assert!(text.contains("Buy milk"));
        assert!(text.contains("2024/01/01"));
        assert!(text.contains("[ ]"));
        assert!(text.contains("sorted by Date"));
    }

    #[test]
    fn sort_menu_shows_three_options_with_one_check() {
        let mut app = milk_app();
        app.mode = Mode::SortMenu { cursor: 0 };
        let text = screen(&mut app);
        for title in ["Date", "Title", "Status"] {
            assert!(text.contains(title));
        }
        assert!(text.contains("✓ Date"));
    }

    #[test]
    fn edit_popup_shows_prefilled_form() {
        let mut app = milk_app();
        let id = app.selected_id().unwrap();
        app.mode = Mode::Edit(EditPresenter::open(id, app.store()));
        let text = screen(&mut app);
        assert!(text.contains("Edit todo"));
        assert!(text.contains("Title: Buy milk"));
        assert!(text.contains("Date:  2024/01/01"));
    }

    #[test]
    fn both_outline_headers_survive_a_long_undone_list() {
        let mut app = crowded_app(30, 1);
        let text = screen(&mut app);
        assert!(text.contains("Undone (30)"));
        assert!(text.contains("Done (1)"));
        assert!(text.contains("task 30 ✓"));
        assert!(text.contains("more"));
    }

    #[test]
    fn collapsed_group_shows_only_its_header() {
        let mut app = crowded_app(3, 1);
        app.list.toggle_collapsed(0);
        let text = screen(&mut app);
        assert!(text.contains("▸ Undone (3)"));
        assert!(text.contains("▾ Done (1)"));
        // the table still lists everything; the outline only the Done row
        assert_eq!(text.matches("task 00").count(), 1);
        assert_eq!(text.matches("task 03").count(), 2);
    }

    #[test]
    fn split_rows_shares_space_fairly() {
        assert_eq!(split_rows(16, [30, 1]), [15, 1]);
        assert_eq!(split_rows(16, [2, 30]), [2, 14]);
        assert_eq!(split_rows(16, [30, 30]), [8, 8]);
        assert_eq!(split_rows(16, [3, 4]), [3, 4]);
        assert_eq!(split_rows(0, [3, 4]), [0, 0]);
    }

    #[test]
    fn popup_area_handles_wide_terminals() {
        let area = popup_area(Rect::new(0, 0, 2000, 10), 50, 50);
        assert_eq!(area.width, 1000);
        assert_eq!(area.x, 500);
        assert_eq!(area.height, 5);
    }

    #[test]
    fn edit_cursor_stays_inside_the_popup() {
        let mut app = milk_app();
        let mut edit = EditPresenter::new();
        "x".repeat(80)
            .chars()
            .for_each(|c| edit.label_mut().enter_char(c));
        app.mode = Mode::Edit(edit);

        let mut terminal = terminal(&mut app);
        let popup = popup_area(Rect::new(0, 0, 100, 24), 50, 33);
        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!(cursor.x, popup.right() - 2);
        assert_eq!(cursor.y, popup.y + 1);
    }
}
