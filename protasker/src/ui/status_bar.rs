//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, Modal, View};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match (&app.modal, app.view) {
        _ if !app.auth.is_authenticated() => "q: quit",
        (Modal::NewProject(_) | Modal::NewTask(_), _) => {
            "Tab: next field | Space: priority | Enter: save | Esc: cancel"
        }
        (Modal::ConfirmDelete(_), _) => "y: delete | n: keep",
        (Modal::Search, _) => "type to filter | Enter: keep | Esc: clear",
        (Modal::Notice(_), _) => "Enter: dismiss",
        (Modal::None, View::Projects) => {
            "↑↓/jk: select | Enter: open | n: new | d: delete | r: refresh | L: logout | q: quit"
        }
        (Modal::None, View::Board) => {
            "←→↑↓: select | </>: move | drag: move | n: new | d: delete | /: search | Esc: back"
        }
    };

    let (dot_color, status_text) = if !app.auth.is_authenticated() {
        (theme::MUTED, "Logged out".to_string())
    } else if app.reconciler.in_flight() > 0 || app.loading {
        (theme::WARNING, "Syncing...".to_string())
    } else {
        (
            theme::SUCCESS,
            app.status.clone().unwrap_or_else(|| "Ready".to_string()),
        )
    };

    let status_line = Line::from(vec![
        Span::styled(concat!("ProTasker v", env!("CARGO_PKG_VERSION")), theme::bold()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(format!(" {status_text}")),
        Span::raw(" | "),
        Span::styled(help_text, theme::dimmed()),
    ]);

    let paragraph = Paragraph::new(status_line).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
