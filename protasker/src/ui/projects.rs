//! Project list and logged-out screen.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::theme;
use crate::app::App;

/// Render the caller's projects.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(" Projects ({}) ", app.projects.len());
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::HIGHLIGHT)))
        .borders(Borders::ALL)
        .border_style(theme::normal());

    if app.projects.is_empty() {
        let text = if app.loading {
            "Loading projects..."
        } else {
            "No projects yet. Press n to create one."
        };
        let paragraph = Paragraph::new(Span::styled(text, theme::dimmed()))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .projects
        .iter()
        .map(|p| {
            let members = format!("  {} member(s)", p.members.len());
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(p.title.clone(), theme::bold()),
                    Span::styled(members, theme::dimmed()),
                ]),
                Line::from(Span::styled(
                    p.description.clone().unwrap_or_default(),
                    theme::dimmed(),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::selected());
    let mut state = ListState::default().with_selected(Some(app.selected_project));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the screen shown without a session.
pub fn render_logged_out(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled("Not logged in", theme::bold())),
        Line::default(),
        Line::from(Span::styled(
            "Start with --token <TOKEN> or set PROTASKER_TOKEN.",
            theme::dimmed(),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" ProTasker "));
    frame.render_widget(paragraph, area);
}
