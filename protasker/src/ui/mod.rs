//! Terminal UI rendering.

pub mod board;
pub mod layout;
pub mod modal;
pub mod projects;
pub mod status_bar;
pub mod theme;

use ratatui::Frame;

use crate::app::{App, View};

/// Main draw function for the entire UI.
///
/// Geometry comes from [`layout`], the same functions the app uses to
/// resolve mouse positions.
pub fn draw(frame: &mut Frame, app: &App) {
    let (content_area, status_area) = layout::screen(frame.area());

    if !app.auth.is_authenticated() {
        projects::render_logged_out(frame, content_area);
    } else {
        match app.view {
            View::Projects => projects::render(frame, content_area, app),
            View::Board => board::render(frame, content_area, app),
        }
    }

    status_bar::render(frame, status_area, app);
    modal::render(frame, frame.area(), app);
}
