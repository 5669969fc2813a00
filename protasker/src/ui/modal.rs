//! Overlays: forms, delete confirmation, search input, notices.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::theme;
use crate::app::{App, DeleteTarget, FormField, Modal, ProjectForm, TaskForm};

/// Render the active overlay, if any, over `area`.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    match &app.modal {
        Modal::None => {}
        Modal::NewProject(form) => render_project_form(frame, area, form),
        Modal::NewTask(form) => render_task_form(frame, area, form),
        Modal::ConfirmDelete(target) => render_confirm(frame, area, target),
        Modal::Search => render_search(frame, area, &app.search),
        Modal::Notice(msg) => render_notice(frame, area, msg),
    }
}

/// A rectangle of at most `width` x `height` centered in `area`.
#[must_use]
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

fn popup(frame: &mut Frame, area: Rect, title: &str, border: Style, lines: Vec<Line<'_>>) {
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(Span::styled(format!(" {title} "), theme::bold()))
                .borders(Borders::ALL)
                .border_style(border),
        );
    frame.render_widget(paragraph, area);
}

fn field_line<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
    let (marker, style) = if focused {
        ("> ", theme::highlighted())
    } else {
        ("  ", theme::normal())
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(marker, style),
        Span::styled(format!("{label:<12}"), theme::dimmed()),
        Span::styled(format!("{value}{cursor}"), style),
    ])
}

fn error_line(error: Option<&str>) -> Line<'_> {
    error.map_or_else(Line::default, |e| {
        Line::from(Span::styled(e, Style::default().fg(theme::ERROR)))
    })
}

fn render_project_form(frame: &mut Frame, area: Rect, form: &ProjectForm) {
    let lines = vec![
        field_line("Title", &form.title, form.field == FormField::Title),
        field_line(
            "Description",
            &form.description,
            form.field == FormField::Description,
        ),
        Line::default(),
        error_line(form.error.as_deref()),
    ];
    popup(frame, centered(area, 60, 7), "New Project", theme::highlighted(), lines);
}

fn render_task_form(frame: &mut Frame, area: Rect, form: &TaskForm) {
    let priority_focused = form.field == FormField::Priority;
    let priority = Line::from(vec![
        Span::styled(
            if priority_focused { "> " } else { "  " },
            theme::highlighted(),
        ),
        Span::styled(format!("{:<12}", "Priority"), theme::dimmed()),
        Span::styled(
            format!("● {}", form.priority),
            Style::default().fg(theme::priority_color(form.priority)),
        ),
    ]);
    let lines = vec![
        field_line("Title", &form.title, form.field == FormField::Title),
        field_line(
            "Description",
            &form.description,
            form.field == FormField::Description,
        ),
        priority,
        Line::default(),
        error_line(form.error.as_deref()),
    ];
    popup(frame, centered(area, 60, 8), "New Task", theme::highlighted(), lines);
}

fn render_confirm(frame: &mut Frame, area: Rect, target: &DeleteTarget) {
    let name = match target {
        DeleteTarget::Project { title, .. } | DeleteTarget::Task { title, .. } => title,
    };
    let lines = vec![
        Line::from(Span::styled(target.prompt(), theme::bold())),
        Line::from(Span::styled(name.clone(), theme::dimmed())),
        Line::default(),
        Line::from("y: delete    n: keep").alignment(Alignment::Center),
    ];
    popup(
        frame,
        centered(area, 48, 6),
        "Confirm",
        Style::default().fg(theme::WARNING),
        lines,
    );
}

fn render_search(frame: &mut Frame, area: Rect, query: &str) {
    let rect = Rect::new(area.x, area.y, area.width.min(50), 3.min(area.height));
    let lines = vec![Line::from(vec![
        Span::styled("/ ", theme::dimmed()),
        Span::styled(format!("{query}_"), theme::normal()),
    ])];
    popup(frame, rect, "Search", theme::highlighted(), lines);
}

fn render_notice(frame: &mut Frame, area: Rect, msg: &str) {
    let lines = vec![
        Line::from(msg.to_string()),
        Line::default(),
        Line::from(Span::styled("Enter: dismiss", theme::dimmed())).alignment(Alignment::Center),
    ];
    popup(
        frame,
        centered(area, 60, 7),
        "Notice",
        Style::default().fg(theme::ERROR),
        lines,
    );
}
