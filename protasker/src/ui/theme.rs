//! Theme and styling constants for the TUI.

use protasker_proto::task::{Priority, TaskStatus};
use ratatui::style::{Color, Modifier, Style};

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Success indicator color.
pub const SUCCESS: Color = Color::Green;

/// Warning indicator color.
pub const WARNING: Color = Color::Yellow;

/// Error indicator color.
pub const ERROR: Color = Color::Red;

/// Muted color for inactive indicators.
pub const MUTED: Color = Color::DarkGray;

/// Column title colors, in status order.
pub const COLUMN_COLORS: [Color; 4] = [Color::Blue, Color::Yellow, Color::Magenta, Color::Green];

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (metadata).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted style (focused borders, drop target).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Selected item style (in lists).
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// The card left behind while its copy is being dragged.
#[must_use]
pub fn drag_source() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::DIM)
}

/// The floating copy of a dragged card.
#[must_use]
pub fn drag_ghost() -> Style {
    Style::default()
        .fg(FG_PRIMARY)
        .bg(Color::Rgb(40, 40, 70))
        .add_modifier(Modifier::BOLD)
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Title color of a status column.
#[must_use]
pub const fn column_color(status: TaskStatus) -> Color {
    COLUMN_COLORS[status.index()]
}

/// Indicator color of a priority.
#[must_use]
pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => SUCCESS,
        Priority::Medium => WARNING,
        Priority::High => ERROR,
    }
}
