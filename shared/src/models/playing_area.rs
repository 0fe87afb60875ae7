//! Playing Area Model

use crate::geometry::Polygon;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The singleton playing-area boundary
///
/// At most one exists at a time; absence means every map point is legal.
/// Redrawing replaces the polygon atomically, never merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayingArea {
    pub polygon: Polygon,
    pub updated_at: DateTime<Utc>,
}
