//! Screen geometry shared by rendering and mouse hit-testing.
//!
//! Every function here is pure: the same area and board always produce the
//! same rectangles, so a click can be resolved against what was drawn.

use protasker_proto::task::{TaskId, TaskStatus};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::board::BoardState;
use crate::drag;

/// Rows taken by one card (border, title, meta line, border).
pub const CARD_HEIGHT: u16 = 4;

/// Rows taken by one project entry.
pub const PROJECT_ROW_HEIGHT: u16 = 2;

/// Splits the terminal into content and the one-line status bar.
#[must_use]
pub fn screen(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// A card's position on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSlot {
    /// The task drawn here.
    pub task_id: TaskId,
    /// Column the card sits in.
    pub status: TaskStatus,
    /// Outer card rectangle.
    pub rect: Rect,
}

/// Geometry of the board view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    /// Title and filter line.
    pub header: Rect,
    /// Column blocks in status order.
    pub columns: [Rect; 4],
    /// Visible cards, column by column, top to bottom.
    pub cards: Vec<CardSlot>,
    /// Cards per column that did not fit.
    pub hidden: [usize; 4],
}

impl BoardLayout {
    /// The card under a cell.
    #[must_use]
    pub fn card_at(&self, x: u16, y: u16) -> Option<&CardSlot> {
        self.cards.iter().find(|slot| contains(slot.rect, x, y))
    }

    /// Where a task's card is drawn.
    #[must_use]
    pub fn card_rect(&self, id: &TaskId) -> Option<Rect> {
        self.cards.iter().find(|s| s.task_id == *id).map(|s| s.rect)
    }
}

/// Lays out the board inside `content`.
#[must_use]
pub fn board_layout(content: Rect, board: &BoardState) -> BoardLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(content);
    let header = rows[0];
    let split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[1]);
    let columns = [split[0], split[1], split[2], split[3]];

    let mut cards = Vec::new();
    let mut hidden = [0; 4];
    for (idx, column) in board.columns().iter().enumerate() {
        let body = inner(columns[idx]);
        let fits = usize::from(body.height / CARD_HEIGHT);
        for (row, task) in column.tasks.iter().enumerate() {
            if row >= fits {
                hidden[idx] = column.len() - fits;
                break;
            }
            let y = body.y + CARD_HEIGHT * u16::try_from(row).unwrap_or(u16::MAX);
            cards.push(CardSlot {
                task_id: task.id.clone(),
                status: column.status,
                rect: Rect::new(body.x, y, body.width, CARD_HEIGHT),
            });
        }
    }

    BoardLayout {
        header,
        columns,
        cards,
        hidden,
    }
}

/// Index of the project entry under a cell in the project list.
#[must_use]
pub fn project_at(content: Rect, count: usize, x: u16, y: u16) -> Option<usize> {
    let list = inner(content);
    if !contains(list, x, y) {
        return None;
    }
    let idx = usize::from((y - list.y) / PROJECT_ROW_HEIGHT);
    (idx < count).then_some(idx)
}

/// The area inside a bordered block.
#[must_use]
pub fn inner(area: Rect) -> Rect {
    Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    )
}

/// A cell rectangle in drag-controller coordinates.
#[must_use]
pub fn to_drag_rect(r: Rect) -> drag::Rect {
    drag::Rect::new(
        f64::from(r.x),
        f64::from(r.y),
        f64::from(r.width),
        f64::from(r.height),
    )
}

/// A drag rectangle snapped back to cells and clipped to `bounds`.
#[must_use]
pub fn from_drag_rect(r: drag::Rect, bounds: Rect) -> Rect {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamp = |v: f64, lo: u16, hi: u16| v.round().clamp(f64::from(lo), f64::from(hi)) as u16;
    let right = bounds.x.saturating_add(bounds.width);
    let bottom = bounds.y.saturating_add(bounds.height);
    let x = clamp(r.x, bounds.x, right);
    let y = clamp(r.y, bounds.y, bottom);
    let x2 = clamp(r.x + r.width, bounds.x, right);
    let y2 = clamp(r.y + r.height, bounds.y, bottom);
    Rect::new(x, y, x2.saturating_sub(x), y2.saturating_sub(y))
}

const fn contains(r: Rect, x: u16, y: u16) -> bool {
    x >= r.x
        && x < r.x.saturating_add(r.width)
        && y >= r.y
        && y < r.y.saturating_add(r.height)
}
