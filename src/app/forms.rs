//! Text fields and forms edited in place

/// Single-line input with a byte-offset cursor kept on char boundaries
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextField {
    pub label: &'static str,
    pub value: String,
    pub cursor: usize,
    pub masked: bool,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        TextField {
            label,
            ..Default::default()
        }
    }

    pub fn masked(label: &'static str) -> Self {
        TextField {
            label,
            masked: true,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set(value);
        self
    }

    /// Replace the content and move the cursor to the end
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    pub fn insert(&mut self, c: char) {
        if self.cursor <= self.value.len() {
            self.value.insert(self.cursor, c);
            self.cursor += c.len_utf8();
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.value[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.value.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.value[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.len() {
            self.cursor = self.value[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.value.len());
        }
    }

    /// Text as shown on screen
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Cursor position in displayed columns
    pub fn display_cursor(&self) -> usize {
        self.value[..self.cursor].chars().count()
    }
}

/// Ordered set of fields with one focused
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Form {
    pub fields: Vec<TextField>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<TextField>) -> Self {
        Form { fields, focus: 0 }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = self.focus.checked_sub(1).unwrap_or(self.fields.len() - 1);
        }
    }

    pub fn focused_mut(&mut self) -> Option<&mut TextField> {
        self.fields.get_mut(self.focus)
    }

    pub fn value(&self, idx: usize) -> &str {
        self.fields.get(idx).map(|f| f.trimmed()).unwrap_or("")
    }

    pub fn field_mut(&mut self, idx: usize) -> Option<&mut TextField> {
        self.fields.get_mut(idx)
    }

    /// Empty every field and refocus the first one
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.clear();
        }
        self.focus = 0;
    }

    pub fn clear_masked(&mut self) {
        for field in self.fields.iter_mut().filter(|f| f.masked) {
            field.clear();
        }
    }
}
