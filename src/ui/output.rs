use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::app::Output;
use crate::verdict::{PanelKind, ResultPanel};

fn kind_style(kind: PanelKind) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match kind {
        PanelKind::Error => bold.fg(Color::Red),
        PanelKind::Accepted => bold.fg(Color::Green),
        PanelKind::Other => bold.fg(Color::Yellow),
    }
}

fn result_lines(panel: &ResultPanel) -> Vec<Line<'_>> {
    let label = Style::default().add_modifier(Modifier::DIM);
    let mut lines = vec![Line::from(Span::styled(panel.summary(), kind_style(panel.kind)))];

    let sections = [
        ("Stdout", &panel.stdout),
        ("Stderr", &panel.stderr),
        ("Compile output", &panel.compile_output),
    ];
    for (name, body) in sections {
        if let Some(body) = body {
            lines.push(Line::from(Span::styled(format!("{name}:"), label)));
            lines.extend(body.lines().map(Line::raw));
        }
    }
    lines
}

impl Widget for &Output {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Output");

        let lines = match self {
            Output::Empty => vec![Line::from(Span::styled(
                "Press Ctrl+S to submit your code.",
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            ))],
            Output::Message(message) => vec![Line::raw(message.as_str())],
            Output::Error(message) => vec![Line::from(Span::styled(
                message.as_str(),
                Style::default().fg(Color::Red),
            ))],
            Output::Result(panel) => result_lines(panel),
        };

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::status;

    fn text_of(output: &Output) -> (String, Buffer) {
        let area = Rect::new(0, 0, 70, 10);
        let mut buffer = Buffer::empty(area);
        output.render(area, &mut buffer);
        let text = buffer
            .content
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        (text, buffer)
    }

    #[test]
    fn accepted_result_is_green() {
        let mut s = status(3, "Accepted");
        s.time = Some(12.0);
        s.memory = Some(1024.0);
        let (text, buffer) = text_of(&Output::Result(ResultPanel::from_status(&s)));
        assert!(text.contains("Status: Accepted | Time: 12s | Memory: 1024KB"));
        // first character of the summary sits inside the border
        assert_eq!(buffer[(1, 1)].fg, Color::Green);
    }

    #[test]
    fn stderr_result_is_red_and_shows_stderr() {
        let mut s = status(11, "Runtime Error (NZEC)");
        s.stderr = Some("ZeroDivisionError".into());
        let (text, buffer) = text_of(&Output::Result(ResultPanel::from_status(&s)));
        assert!(text.contains("Stderr:"));
        assert!(text.contains("ZeroDivisionError"));
        assert_eq!(buffer[(1, 1)].fg, Color::Red);
    }

    #[test]
    fn other_terminal_result_is_yellow() {
        let (_, buffer) = text_of(&Output::Result(ResultPanel::from_status(&status(
            4,
            "Wrong Answer",
        ))));
        assert_eq!(buffer[(1, 1)].fg, Color::Yellow);
    }

    #[test]
    fn plain_messages_render() {
        let (text, _) = text_of(&Output::Message("Submitting code...".into()));
        assert!(text.contains("Submitting code..."));
        let (text, _) = text_of(&Output::Empty);
        assert!(text.contains("Ctrl+S"));
    }
}
