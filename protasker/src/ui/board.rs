//! Kanban board rendering: four status columns and the dragged card.

use std::fmt::Write as _;

use protasker_proto::task::Task;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::layout::{self, BoardLayout};
use super::theme;
use crate::app::App;

/// Render the open board inside `area`.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let geometry = layout::board_layout(area, &app.board);
    render_header(frame, &geometry, app);

    let hovered = app.drag.hovered_column();
    let dragged = app.drag.dragged_task();
    for (idx, column) in app.board.columns().iter().enumerate() {
        let mut title = vec![Span::styled(
            format!(" {} ", column.status.label()),
            theme::panel_title(theme::column_color(column.status)),
        )];
        title.push(Span::styled(format!("({}) ", column.len()), theme::dimmed()));
        let border = if hovered == Some(column.status) {
            theme::highlighted()
        } else {
            theme::normal()
        };
        let mut block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_style(border);
        if geometry.hidden[idx] > 0 {
            block = block.title_bottom(Span::styled(
                format!(" +{} more ", geometry.hidden[idx]),
                theme::dimmed(),
            ));
        }
        frame.render_widget(block, geometry.columns[idx]);
    }

    for slot in &geometry.cards {
        let Some(task) = app.board.get(&slot.task_id) else {
            continue;
        };
        let style = if dragged == Some(&slot.task_id) {
            theme::drag_source()
        } else if app.selected_task.as_ref() == Some(&slot.task_id) {
            theme::highlighted()
        } else {
            theme::normal()
        };
        render_card(frame, slot.rect, task, style, &app.date_format);
    }

    if let (Some(id), Some(ghost)) = (dragged, app.drag.dragged_card())
        && let Some(task) = app.board.get(id)
    {
        let rect = layout::from_drag_rect(ghost, area);
        if rect.width > 2 && rect.height > 2 {
            frame.render_widget(Clear, rect);
            render_card(frame, rect, task, theme::drag_ghost(), &app.date_format);
        }
    }
}

fn render_header(frame: &mut Frame, geometry: &BoardLayout, app: &App) {
    let title = app.open_project().map_or("Board", |p| p.title.as_str());
    let mut spans = vec![Span::styled(title.to_string(), theme::bold())];
    if app.loading {
        spans.push(Span::styled("  loading...", theme::dimmed()));
    }
    if !app.board.filter().is_empty() {
        spans.push(Span::styled(
            format!("  filter: \"{}\"", app.board.filter()),
            theme::normal().fg(theme::WARNING),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), geometry.header);
}

fn render_card(frame: &mut Frame, area: Rect, task: &Task, style: Style, date_format: &str) {
    let mut meta = vec![
        Span::styled("● ", Style::default().fg(theme::priority_color(task.priority))),
        Span::styled(task.priority.as_str(), theme::dimmed()),
    ];
    if let Some(due) = task.due_date.and_then(|ms| format_date(ms, date_format)) {
        meta.push(Span::styled(format!("  due {due}"), theme::dimmed()));
    }
    let lines = vec![
        Line::from(Span::styled(task.title.clone(), style)),
        Line::from(meta),
    ];
    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(style),
    );
    frame.render_widget(card, area);
}

/// Formats a millisecond timestamp, falling back to ISO dates on a bad
/// format string.
fn format_date(ms: u64, format: &str) -> Option<String> {
    let dt = chrono::DateTime::from_timestamp_millis(i64::try_from(ms).ok()?)?;
    let mut out = String::new();
    if write!(out, "{}", dt.format(format)).is_err() {
        out = dt.format("%Y-%m-%d").to_string();
    }
    Some(out)
}
