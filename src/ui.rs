pub mod editor_view;
pub mod output;
pub mod profile_modal;
pub mod screen;

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, SubmitControl};

/// Narrower terminals get a notice instead of the editor.
pub const MIN_WIDTH: u16 = 60;
const OUTPUT_HEIGHT: u16 = 9;

/// Entry point used by the draw loop.
pub fn draw(app: &mut App, f: &mut Frame) {
    screen::current_screen(app, f.area()).render(app, f);
}

fn submit_label(control: SubmitControl, now: Instant) -> Span<'static> {
    match control {
        SubmitControl::Enabled => Span::styled(
            " Submit (Ctrl+S) ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        SubmitControl::Busy => Span::styled(
            " Judging... ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        SubmitControl::CoolingDown { until } => Span::styled(
            format!(
                " Submit in {}s ",
                until.saturating_duration_since(now).as_secs_f64().ceil()
            ),
            Style::default().add_modifier(Modifier::DIM),
        ),
    }
}

pub(crate) fn render_workspace(app: &mut App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // header
            Constraint::Min(3),                // editor
            Constraint::Length(OUTPUT_HEIGHT), // output
            Constraint::Length(1),             // notice / legend
        ])
        .split(f.area());

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let header = Line::from(vec![
        Span::styled(" judgeterm ", bold_style.fg(Color::Cyan)),
        Span::styled("│ problem: ", dim_style),
        Span::styled(app.problem_id.clone(), bold_style),
        Span::styled(" │ ", dim_style),
        Span::raw(app.editor.language().label()),
        Span::styled(" │ ", dim_style),
        Span::raw(app.editor.theme().to_string()),
        Span::styled(" │ ", dim_style),
        submit_label(app.control, Instant::now()),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    let palette = app.editor.theme().palette();
    let editor_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .style(Style::default().bg(palette.background));
    let editor_area = editor_block.inner(chunks[1]);
    f.render_widget(editor_block, chunks[1]);

    app.editor.scroll_into_view(
        editor_area.height as usize,
        editor_view::text_width(&app.editor, editor_area),
    );
    f.render_widget(&app.editor, editor_area);
    if app.modal.is_none() {
        if let Some(pos) = editor_view::cursor_position(&app.editor, editor_area) {
            f.set_cursor_position(pos);
        }
    }

    f.render_widget(&app.output, chunks[2]);

    let footer = match &app.notice {
        Some(notice) => Span::styled(
            notice.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        ),
        None => Span::styled(
            "Ctrl+S submit · F2 language · F3 theme · Esc quit",
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ),
    };
    f.render_widget(Paragraph::new(footer), chunks[3]);
}

pub(crate) fn render_too_narrow(f: &mut Frame) {
    let area = f.area();
    let message = Paragraph::new(Span::styled(
        "Use a wider terminal to open the editor.",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    let top = area.height / 2;
    let line_area = Rect::new(area.x, area.y + top, area.width, area.height - top);
    f.render_widget(message, line_area);
}
