//! Polygon drawing engine
//!
//! The interactive state machine behind the map editor: incremental
//! polygon construction from canvas clicks, close-gesture detection, and
//! vertex-drag sessions on persisted regions. Transitions are pure over
//! the machine state; persistence is the controller's job.
//!
//! Exactly one of drawing or dragging may be active at a time. Starting
//! one while the other runs is rejected with a typed error and leaves
//! the active session untouched.

use shared::error::{AppError, AppResult};
use shared::geometry::{Point, Polygon};

/// Clicks closer than this to the first vertex finish the polygon,
/// in percentage units
pub const CLOSE_THRESHOLD: f64 = 2.0;

/// What an in-progress draw session will become
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Region,
    PlayingArea,
}

/// Drawing engine state
#[derive(Debug, Clone, PartialEq)]
pub enum DrawState {
    Idle,
    Drawing {
        mode: DrawMode,
        points: Vec<Point>,
    },
    Dragging {
        region_id: String,
        vertex_index: usize,
    },
}

/// Result of feeding a canvas click to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// No draw session active; the click belongs to someone else
    Ignored,
    /// The click was appended as a new vertex
    Appended,
    /// Close gesture: the session completed with this polygon
    Closed { mode: DrawMode, polygon: Polygon },
}

/// Draw/drag state machine
#[derive(Debug)]
pub struct DrawEngine {
    state: DrawState,
    close_threshold: f64,
}

impl Default for DrawEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawEngine {
    pub fn new() -> Self {
        Self::with_close_threshold(CLOSE_THRESHOLD)
    }

    /// Engine with a non-default close tolerance, in percentage units
    pub fn with_close_threshold(close_threshold: f64) -> Self {
        Self {
            state: DrawState::Idle,
            close_threshold,
        }
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DrawState::Idle
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    /// Points accumulated by the active draw session, if any
    pub fn drawing_points(&self) -> Option<&[Point]> {
        match &self.state {
            DrawState::Drawing { points, .. } => Some(points),
            _ => None,
        }
    }

    /// Start a draw session; only legal from `Idle`
    pub fn begin(&mut self, mode: DrawMode) -> AppResult<()> {
        match &self.state {
            DrawState::Idle => {
                self.state = DrawState::Drawing {
                    mode,
                    points: Vec::new(),
                };
                Ok(())
            }
            DrawState::Drawing { .. } => Err(AppError::draw_busy()),
            DrawState::Dragging { .. } => Err(AppError::drag_busy()),
        }
    }

    /// Feed a normalized canvas click to the machine
    ///
    /// While drawing: a click within [`CLOSE_THRESHOLD`] of the first
    /// vertex with at least three points accumulated completes the
    /// polygon; anything else appends. Clicks never close a polygon
    /// below three vertices; near the first vertex they still append.
    pub fn click(&mut self, p: Point) -> ClickOutcome {
        match &mut self.state {
            DrawState::Drawing { mode, points } => {
                if points.len() >= 3 && p.distance(points[0]) < self.close_threshold {
                    let mode = *mode;
                    let polygon = Polygon::new(std::mem::take(points));
                    self.state = DrawState::Idle;
                    tracing::debug!(vertices = polygon.len(), "draw session closed");
                    ClickOutcome::Closed { mode, polygon }
                } else {
                    points.push(p);
                    ClickOutcome::Appended
                }
            }
            _ => ClickOutcome::Ignored,
        }
    }

    /// Advisory close-gesture feedback for pointer moves
    ///
    /// True when a click at `p` would complete the polygon. Purely for
    /// UI emphasis; does not touch the machine.
    pub fn hover(&self, p: Point) -> bool {
        match &self.state {
            DrawState::Drawing { points, .. } => {
                points.len() >= 3 && p.distance(points[0]) < self.close_threshold
            }
            _ => false,
        }
    }

    /// Discard the active draw session, if any
    ///
    /// Dragging is deliberately unaffected: a drag has no abort: the
    /// pointer-up finalizes whatever position was reached.
    pub fn cancel(&mut self) {
        if let DrawState::Drawing { .. } = self.state {
            tracing::debug!("draw session cancelled");
            self.state = DrawState::Idle;
        }
    }

    /// Start relocating vertex `vertex_index` of a persisted region;
    /// only legal from `Idle`
    pub fn begin_drag(&mut self, region_id: impl Into<String>, vertex_index: usize) -> AppResult<()> {
        match &self.state {
            DrawState::Idle => {
                self.state = DrawState::Dragging {
                    region_id: region_id.into(),
                    vertex_index,
                };
                Ok(())
            }
            DrawState::Drawing { .. } => Err(AppError::draw_busy()),
            DrawState::Dragging { .. } => Err(AppError::drag_busy()),
        }
    }

    /// The drag target, while a drag is active
    pub fn active_drag(&self) -> Option<(&str, usize)> {
        match &self.state {
            DrawState::Dragging {
                region_id,
                vertex_index,
            } => Some((region_id, *vertex_index)),
            _ => None,
        }
    }

    /// Pointer-up: finalize the drag and return its target
    ///
    /// Returns `None` when no drag was active (spurious pointer-up).
    pub fn end_drag(&mut self) -> Option<(String, usize)> {
        match std::mem::replace(&mut self.state, DrawState::Idle) {
            DrawState::Dragging {
                region_id,
                vertex_index,
            } => Some((region_id, vertex_index)),
            other => {
                self.state = other;
                None
            }
        }
    }
}
