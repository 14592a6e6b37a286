use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use unicode_width::UnicodeWidthChar;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineInputAction {
    None,
    Changed,
    Submitted(String),
    Cancelled,
}

/// Single-line text input used for header filters and cell editors.
#[derive(Clone, Debug, Default)]
pub struct LineInput {
    text: String,
    cursor: usize, // char index
}

impl LineInput {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display column of the cursor.
    pub fn cursor_x(&self) -> usize {
        self.text
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    pub fn input(&mut self, event: InputEvent) -> LineInputAction {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Paste(s) => {
                let s: String = s.chars().filter(|c| *c != '\n' && *c != '\r').collect();
                if s.is_empty() {
                    return LineInputAction::None;
                }
                for ch in s.chars() {
                    self.insert_char(ch);
                }
                LineInputAction::Changed
            }
            InputEvent::Mouse(_) => LineInputAction::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> LineInputAction {
        match key.code {
            KeyCode::Enter => LineInputAction::Submitted(self.text.clone()),
            KeyCode::Esc => LineInputAction::Cancelled,
            KeyCode::Backspace => {
                if self.backspace() {
                    LineInputAction::Changed
                } else {
                    LineInputAction::None
                }
            }
            KeyCode::Delete => {
                if self.delete() {
                    LineInputAction::Changed
                } else {
                    LineInputAction::None
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                LineInputAction::None
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                LineInputAction::None
            }
            KeyCode::Home => {
                self.cursor = 0;
                LineInputAction::None
            }
            KeyCode::End => {
                self.cursor = self.char_len();
                LineInputAction::None
            }
            _ => match key.text_char() {
                Some(ch) => {
                    self.insert_char(ch);
                    LineInputAction::Changed
                }
                None => LineInputAction::None,
            },
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn insert_char(&mut self, ch: char) {
        let at = byte_index(&self.text, self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let at = byte_index(&self.text, self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
        true
    }

    fn delete(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        let at = byte_index(&self.text, self.cursor);
        self.text.remove(at);
        true
    }
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
