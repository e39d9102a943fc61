//! Cursor movement and editing over a multi-line `String`.
//!
//! The cursor is a byte offset that always sits on a char boundary. Columns
//! are counted in chars.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    offset: usize,
}

impl Cursor {
    pub fn at_end(text: &str) -> Self {
        Self { offset: text.len() }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Pull the cursor back inside `text` after the text was replaced.
    pub fn clamp(&mut self, text: &str) {
        self.offset = self.offset.min(text.len());
        while !text.is_char_boundary(self.offset) {
            self.offset -= 1;
        }
    }

    pub fn insert(&mut self, text: &mut String, c: char) {
        self.clamp(text);
        text.insert(self.offset, c);
        self.offset += c.len_utf8();
    }

    pub fn backspace(&mut self, text: &mut String) {
        self.clamp(text);
        if let Some(prev) = text[..self.offset].chars().next_back() {
            self.offset -= prev.len_utf8();
            text.remove(self.offset);
        }
    }

    pub fn delete(&mut self, text: &mut String) {
        self.clamp(text);
        if self.offset < text.len() {
            text.remove(self.offset);
        }
    }

    pub fn left(&mut self, text: &str) {
        self.clamp(text);
        if let Some(prev) = text[..self.offset].chars().next_back() {
            self.offset -= prev.len_utf8();
        }
    }

    pub fn right(&mut self, text: &str) {
        self.clamp(text);
        if let Some(next) = text[self.offset..].chars().next() {
            self.offset += next.len_utf8();
        }
    }

    pub fn home(&mut self, text: &str) {
        self.clamp(text);
        self.offset = line_start(text, self.offset);
    }

    pub fn end(&mut self, text: &str) {
        self.clamp(text);
        self.offset = line_end(text, self.offset);
    }

    pub fn up(&mut self, text: &str) {
        self.clamp(text);
        let start = line_start(text, self.offset);
        if start == 0 {
            self.offset = 0;
            return;
        }
        let col = text[start..self.offset].chars().count();
        let prev_start = line_start(text, start - 1);
        self.offset = offset_at_col(text, prev_start, col);
    }

    pub fn down(&mut self, text: &str) {
        self.clamp(text);
        let end = line_end(text, self.offset);
        if end == text.len() {
            self.offset = end;
            return;
        }
        let col = text[line_start(text, self.offset)..self.offset].chars().count();
        self.offset = offset_at_col(text, end + 1, col);
    }

    /// Zero-based (line, column) of the cursor.
    pub fn line_col(&self, text: &str) -> (usize, usize) {
        let offset = self.offset.min(text.len());
        let before = text.get(..offset).unwrap_or(text);
        let line = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|l| l.chars().count())
            .unwrap_or(0);
        (line, col)
    }
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn line_end(text: &str, offset: usize) -> usize {
    text[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(text.len())
}

fn offset_at_col(text: &str, start: usize, col: usize) -> usize {
    let end = line_end(text, start);
    text[start..end]
        .char_indices()
        .nth(col)
        .map(|(i, _)| start + i)
        .unwrap_or(end)
}
