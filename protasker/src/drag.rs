//! Pointer-driven drag and drop of task cards between columns.
//!
//! The gesture is a three-state machine held in one [`DragState`] value:
//!
//! ```text
//! Idle ──pointer_down──▶ Armed ──moved ≥ threshold──▶ Dragging
//!   ▲                      │                             │
//!   └──── pointer_up / cancel (Clicked or nothing) ◀─────┘ pointer_up (Moved | Dropped)
//! ```
//!
//! Coordinates are plain `f64` cells so the controller does not depend on
//! the rendering backend.

use protasker_proto::task::{TaskId, TaskStatus};

/// Default pointer travel before a press turns into a drag.
pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 8.0;

/// A position on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_sq(other).sqrt()
    }

    fn distance_sq(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The center point.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `p` lies inside (edges inclusive on the top-left only).
    #[must_use]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// The same rectangle moved by `(dx, dy)`.
    #[must_use]
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// A request to move a task to another column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    /// The dragged task.
    pub task_id: TaskId,
    /// Column the drag started in.
    pub from: TaskStatus,
    /// Column it was dropped on.
    pub to: TaskStatus,
}

/// The gesture in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    /// No pointer interaction.
    Idle,
    /// Pointer is down on a card but has not moved far enough.
    Armed {
        /// Card under the press.
        task_id: TaskId,
        /// Its column at press time.
        source: TaskStatus,
        /// Where the press happened.
        origin: Point,
        /// Card bounds at press time.
        card: Rect,
    },
    /// The card follows the pointer.
    Dragging {
        /// Card being dragged.
        task_id: TaskId,
        /// Its column when the drag started.
        source: TaskStatus,
        /// Where the press happened.
        origin: Point,
        /// Card bounds at press time.
        card: Rect,
        /// Latest pointer position.
        pointer: Point,
        /// Column the card would land in if released now.
        over: Option<TaskStatus>,
    },
}

/// What a pointer release produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Dropped on another column.
    Moved(MoveIntent),
    /// Released before the activation threshold: a plain click on the card.
    Clicked(TaskId),
    /// A drag ended without a column change.
    Dropped,
    /// Nothing was being dragged.
    Ignored,
}

/// Tracks one drag gesture at a time.
#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    regions: [Option<Rect>; 4],
    activation_distance: f64,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

impl DragController {
    /// Creates an idle controller. Negative or NaN distances fall back to 0.
    #[must_use]
    pub fn new(activation_distance: f64) -> Self {
        Self {
            state: DragState::Idle,
            regions: [None; 4],
            activation_distance: activation_distance.max(0.0),
        }
    }

    /// Pointer travel needed before a press becomes a drag.
    #[must_use]
    pub const fn activation_distance(&self) -> f64 {
        self.activation_distance
    }

    /// Registers the hit region of a column.
    pub const fn set_region(&mut self, status: TaskStatus, rect: Rect) {
        self.regions[status.index()] = Some(rect);
    }

    /// Forgets every column region (e.g. the board was closed).
    pub fn clear_regions(&mut self) {
        self.regions = [None; 4];
    }

    /// The registered region of a column.
    #[must_use]
    pub const fn region(&self, status: TaskStatus) -> Option<Rect> {
        self.regions[status.index()]
    }

    /// The column whose region contains `p`, if any.
    #[must_use]
    pub fn column_at(&self, p: Point) -> Option<TaskStatus> {
        TaskStatus::ALL
            .into_iter()
            .find(|s| self.regions[s.index()].is_some_and(|r| r.contains(p)))
    }

    /// The current gesture state.
    #[must_use]
    pub const fn state(&self) -> &DragState {
        &self.state
    }

    /// Whether a card is following the pointer.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The card being dragged.
    #[must_use]
    pub const fn dragged_task(&self) -> Option<&TaskId> {
        match &self.state {
            DragState::Dragging { task_id, .. } => Some(task_id),
            _ => None,
        }
    }

    /// The column currently highlighted as drop target.
    #[must_use]
    pub const fn hovered_column(&self) -> Option<TaskStatus> {
        match &self.state {
            DragState::Dragging { over, .. } => *over,
            _ => None,
        }
    }

    /// Where the dragged card is drawn right now.
    #[must_use]
    pub fn dragged_card(&self) -> Option<Rect> {
        match &self.state {
            DragState::Dragging {
                origin,
                card,
                pointer,
                ..
            } => Some(card.translate(pointer.x - origin.x, pointer.y - origin.y)),
            _ => None,
        }
    }

    /// Column whose region center is closest to `card`'s center.
    ///
    /// Equidistant columns resolve to the earlier status.
    #[must_use]
    pub fn closest_column(&self, card: Rect) -> Option<TaskStatus> {
        let center = card.center();
        let mut best: Option<(TaskStatus, f64)> = None;
        for status in TaskStatus::ALL {
            let Some(region) = self.regions[status.index()] else {
                continue;
            };
            let d = region.center().distance_sq(center);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((status, d));
            }
        }
        best.map(|(s, _)| s)
    }

    /// Press on a card. Only starts a gesture from `Idle`.
    ///
    /// Returns whether the controller armed.
    pub fn pointer_down(
        &mut self,
        task_id: TaskId,
        source: TaskStatus,
        card: Rect,
        at: Point,
    ) -> bool {
        if !matches!(self.state, DragState::Idle) {
            return false;
        }
        self.state = DragState::Armed {
            task_id,
            source,
            origin: at,
            card,
        };
        true
    }

    /// Pointer moved.
    pub fn pointer_move(&mut self, at: Point) {
        let next = match &self.state {
            DragState::Idle => return,
            DragState::Armed {
                task_id,
                source,
                origin,
                card,
            } => {
                if origin.distance(at) < self.activation_distance {
                    return;
                }
                tracing::debug!(task_id = %task_id, "drag activated");
                let moved = card.translate(at.x - origin.x, at.y - origin.y);
                DragState::Dragging {
                    task_id: task_id.clone(),
                    source: *source,
                    origin: *origin,
                    card: *card,
                    pointer: at,
                    over: self.closest_column(moved),
                }
            }
            DragState::Dragging {
                task_id,
                source,
                origin,
                card,
                ..
            } => {
                let moved = card.translate(at.x - origin.x, at.y - origin.y);
                DragState::Dragging {
                    task_id: task_id.clone(),
                    source: *source,
                    origin: *origin,
                    card: *card,
                    pointer: at,
                    over: self.closest_column(moved),
                }
            }
        };
        self.state = next;
    }

    /// Pointer released. Always returns the controller to `Idle`.
    pub fn pointer_up(&mut self, at: Point) -> DragOutcome {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => DragOutcome::Ignored,
            DragState::Armed { task_id, .. } => DragOutcome::Clicked(task_id),
            DragState::Dragging {
                task_id,
                source,
                origin,
                card,
                ..
            } => {
                let moved = card.translate(at.x - origin.x, at.y - origin.y);
                match self.closest_column(moved) {
                    Some(target) if target != source => DragOutcome::Moved(MoveIntent {
                        task_id,
                        from: source,
                        to: target,
                    }),
                    _ => DragOutcome::Dropped,
                }
            }
        }
    }

    /// Abandons any gesture. Returns whether one was in progress.
    pub fn cancel(&mut self) -> bool {
        let active = !matches!(self.state, DragState::Idle);
        if active {
            tracing::debug!("drag cancelled");
        }
        self.state = DragState::Idle;
        active
    }
}
