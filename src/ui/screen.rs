use ratatui::{layout::Rect, Frame};

use crate::{
    app::App,
    ui::{render_too_narrow, render_workspace, MIN_WIDTH},
};

/// A UI Screen boundary: responsible for rendering one application state
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

/// Editor, output panel and status lines
pub struct WorkspaceScreen;

impl Screen for WorkspaceScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_workspace(app, f);
    }
}

/// Workspace with the blocking profile form on top
pub struct ProfileGateScreen;

impl Screen for ProfileGateScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_workspace(app, f);
        if let Some(form) = &app.modal {
            f.render_widget(form, f.area());
        }
    }
}

/// Shown instead of the editor when the terminal is too narrow to code in
pub struct TooNarrowScreen;

impl Screen for TooNarrowScreen {
    fn render(&self, _app: &mut App, f: &mut Frame) {
        render_too_narrow(f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(app: &App, area: Rect) -> Box<dyn Screen> {
    if area.width < MIN_WIDTH {
        Box::new(TooNarrowScreen)
    } else if app.modal.is_some() {
        Box::new(ProfileGateScreen)
    } else {
        Box::new(WorkspaceScreen)
    }
}
