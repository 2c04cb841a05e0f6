use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::editor::Editor;

const TAB: &str = "    ";

fn gutter_width(editor: &Editor) -> u16 {
    editor.lines().len().to_string().len() as u16 + 1
}

/// Columns left for text once the gutter is drawn.
pub fn text_width(editor: &Editor, area: Rect) -> usize {
    area.width.saturating_sub(gutter_width(editor)) as usize
}

/// Visible slice of a line: `skip` chars dropped, tabs drawn as spaces.
fn visible(text: &str, skip: usize, take: usize) -> String {
    text.chars()
        .skip(skip)
        .take(take)
        .map(|c| if c == '\t' { TAB.to_string() } else { c.to_string() })
        .collect()
}

/// Line numbers on, no current-line highlight.
impl Widget for &Editor {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = self.theme().palette();
        let base = Style::default().bg(palette.background).fg(palette.foreground);
        let gutter_style = Style::default().bg(palette.background).fg(palette.gutter);
        let gutter = gutter_width(self) as usize;
        let width = text_width(self, area);

        buf.set_style(area, base);

        let lines: Vec<Line> = self
            .lines()
            .iter()
            .enumerate()
            .skip(self.scroll())
            .take(area.height as usize)
            .map(|(idx, text)| {
                Line::from(vec![
                    Span::styled(format!("{:>w$} ", idx + 1, w = gutter - 1), gutter_style),
                    Span::styled(visible(text, self.col_offset(), width), base),
                ])
            })
            .collect();

        Paragraph::new(lines).style(base).render(area, buf);
    }
}

/// Terminal position of the editor cursor inside `area`, if visible.
pub fn cursor_position(editor: &Editor, area: Rect) -> Option<Position> {
    let (row, col) = editor.cursor();
    if row < editor.scroll() || row >= editor.scroll() + area.height as usize {
        return None;
    }
    if col < editor.col_offset() {
        return None;
    }

    let before = visible(&editor.lines()[row], editor.col_offset(), col - editor.col_offset());
    let x = area.x + gutter_width(editor) + before.width() as u16;
    let y = area.y + (row - editor.scroll()) as u16;
    Some(Position::new(x.min(area.right().saturating_sub(1)), y))
}
