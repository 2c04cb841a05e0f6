//! Editor host: a multi-line code buffer tagged with a language and theme.
//!
//! The buffer is plain text; the language only matters to the judge and to
//! the header shown above the editor. Cursor columns are counted in chars.

pub mod language;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub use language::{Language, Palette, Theme};

const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone)]
pub struct Editor {
    lines: Vec<String>,
    row: usize,
    col: usize,
    scroll: usize,
    col_offset: usize,
    language: Language,
    theme: Theme,
}

impl Editor {
    pub fn new(language: Language, theme: Theme) -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            scroll: 0,
            col_offset: 0,
            language,
            theme,
        }
    }

    pub fn with_text(language: Language, theme: Theme, text: &str) -> Self {
        let mut editor = Self::new(language, theme);
        editor.set_text(text);
        editor
    }

    /// Current buffer contents, lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replaces the buffer. Tabs and a trailing newline survive `text()`;
    /// CRLF line endings become LF.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        self.row = 0;
        self.col = 0;
        self.scroll = 0;
        self.col_offset = 0;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// First visible column, in chars.
    pub fn col_offset(&self) -> usize {
        self.col_offset
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Re-tags the buffer; the text is left untouched.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Applies an editing or navigation key. Returns true when the key was
    /// consumed by the editor.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }

        match key.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Enter => self.insert_newline(),
            KeyCode::Tab => self.insert_tab(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.col = self.line_len(self.row),
            _ => return false,
        }
        true
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.row, self.col);
        self.lines[self.row].insert(at, c);
        self.col += 1;
    }

    /// Splits the line at the cursor, carrying the current indentation over.
    pub fn insert_newline(&mut self) {
        let at = self.byte_index(self.row, self.col);
        let rest = self.lines[self.row].split_off(at);
        let indent: String = self.lines[self.row]
            .chars()
            .take_while(|c| *c == ' ')
            .collect();
        self.col = indent.chars().count();
        self.row += 1;
        self.lines.insert(self.row, indent + &rest);
    }

    pub fn insert_tab(&mut self) {
        let pad = TAB_WIDTH - (self.col % TAB_WIDTH);
        for _ in 0..pad {
            self.insert_char(' ');
        }
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            self.col -= 1;
            let at = self.byte_index(self.row, self.col);
            self.lines[self.row].remove(at);
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&line);
        }
    }

    pub fn delete(&mut self) {
        if self.col < self.line_len(self.row) {
            let at = self.byte_index(self.row, self.col);
            self.lines[self.row].remove(at);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    /// Adjusts the first visible line and column so the cursor fits in a
    /// `height` x `width` viewport.
    pub fn scroll_into_view(&mut self, height: usize, width: usize) {
        if height > 0 {
            if self.row < self.scroll {
                self.scroll = self.row;
            } else if self.row >= self.scroll + height {
                self.scroll = self.row + 1 - height;
            }
        }
        if width > 0 {
            if self.col < self.col_offset {
                self.col_offset = self.col;
            } else if self.col >= self.col_offset + width {
                self.col_offset = self.col + 1 - width;
            }
        }
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn byte_index(&self, row: usize, col: usize) -> usize {
        self.lines[row]
            .char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(self.lines[row].len())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Language::default(), Theme::default())
    }
}
