//! Single-line text input with a char-indexed cursor.

use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    character_index: usize,
}

impl TextInput {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            character_index: value.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Terminal columns between the start of the text and the cursor.
    pub fn cursor_column(&self) -> u16 {
        let before: String = self.value.chars().take(self.character_index).collect();
        u16::try_from(before.width()).unwrap_or(u16::MAX)
    }

    pub fn move_cursor_left(&mut self) {
        let cursor_moved_left = self.character_index.saturating_sub(1);
        self.character_index = self.clamp_cursor(cursor_moved_left);
    }

    pub fn move_cursor_right(&mut self) {
        let cursor_moved_right = self.character_index.saturating_add(1);
        self.character_index = self.clamp_cursor(cursor_moved_right);
    }

    pub fn enter_char(&mut self, new_char: char) {
        let index = self.byte_index();
        self.value.insert(index, new_char);
        self.move_cursor_right();
    }

    /// Removes the char left of the cursor.
    pub fn delete_char(&mut self) {
        if self.character_index == 0 {
            return;
        }
        // rebuild from chars; String::remove works on bytes
        let current_index = self.character_index;
        let before = self.value.chars().take(current_index - 1);
        let after = self.value.chars().skip(current_index);
        self.value = before.chain(after).collect();
        self.move_cursor_left();
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.character_index)
            .unwrap_or(self.value.len())
    }

    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.value.chars().count())
    }
}
