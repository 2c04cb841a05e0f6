use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::profile::{FormField, ProfileForm};

const MODAL_WIDTH: u16 = 56;
const MODAL_HEIGHT: u16 = 11;

/// Rectangle of the given size centred in `area`, clipped to it.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let value_style = if focused {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default()
    };
    let marker = if focused { "> " } else { "  " };
    Line::from(vec![
        Span::raw(marker),
        Span::styled(label, Style::default().fg(Color::Cyan)),
        Span::styled(value, value_style),
        Span::styled(if focused { "_" } else { "" }, value_style),
    ])
}

impl Widget for &ProfileForm {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let modal = centered(area, MODAL_WIDTH, MODAL_HEIGHT);
        Clear.render(modal, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Complete Your Profile")
            .title_alignment(Alignment::Center);
        let inner = block.inner(modal);
        block.render(modal, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // student id
                Constraint::Length(1), // photo
                Constraint::Length(1), // padding
                Constraint::Length(2), // status / error
                Constraint::Min(0),    // hint
            ])
            .split(inner);

        field_line(
            "Student ID: ",
            &self.student_id,
            self.focus == FormField::StudentId,
        )
        .render(chunks[0], buf);
        field_line(
            "Photo file: ",
            &self.photo_path,
            self.focus == FormField::Photo,
        )
        .render(chunks[1], buf);

        let status = if self.submitting {
            Some(Span::styled("Uploading...", Style::default().fg(Color::Yellow)))
        } else {
            self.error
                .as_deref()
                .map(|e| Span::styled(e, Style::default().fg(Color::Red)))
        };
        if let Some(status) = status {
            Paragraph::new(Line::from(status))
                .wrap(Wrap { trim: true })
                .render(chunks[3], buf);
        }

        Paragraph::new(Span::styled(
            "Tab switch field · Enter submit · Ctrl+Q quit",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(form: &ProfileForm) -> String {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        form.render(area, &mut buffer);
        buffer
            .content
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn shows_title_and_fields() {
        let form = ProfileForm {
            student_id: "S-42".into(),
            ..ProfileForm::new()
        };
        let text = render(&form);
        assert!(text.contains("Complete Your Profile"));
        assert!(text.contains("Student ID: S-42"));
        assert!(text.contains("Photo file:"));
    }

    #[test]
    fn shows_error_and_upload_state() {
        let mut form = ProfileForm::new();
        form.fail("Student ID is required.");
        assert!(render(&form).contains("Student ID is required."));
        form.begin_submit();
        assert!(render(&form).contains("Uploading..."));
    }

    #[test]
    fn centered_rect_clips_to_area() {
        let r = centered(Rect::new(0, 0, 40, 8), MODAL_WIDTH, MODAL_HEIGHT);
        assert_eq!(r, Rect::new(0, 0, 40, 8));
        let r = centered(Rect::new(0, 0, 100, 31), 50, 11);
        assert_eq!(r, Rect::new(25, 10, 50, 11));
    }
}
