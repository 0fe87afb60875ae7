//! Region Model

use crate::error::{AppError, AppResult};
use crate::geometry::Polygon;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Region entity: a named, floor-tagged polygon on the floor plan
///
/// `floors` is never empty once persisted; `BTreeSet` keeps it sorted
/// ascending for display. Regions may geometrically overlap; overlap
/// resolution is the query layer's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub polygon: Polygon,
    pub floors: BTreeSet<i32>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create region payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionCreate {
    pub name: String,
    pub polygon: Polygon,
    pub floors: BTreeSet<i32>,
    pub color: Option<String>,
}

impl RegionCreate {
    /// Reject invalid geometry and empty floor sets before any store call
    pub fn validate(&self) -> AppResult<()> {
        if !self.polygon.is_closed_shape() {
            return Err(AppError::polygon_too_small(self.polygon.len()));
        }
        if self.floors.is_empty() {
            return Err(AppError::empty_floor_set());
        }
        if self.name.trim().is_empty() {
            return Err(AppError::validation("region name must not be empty"));
        }
        Ok(())
    }
}

/// Update region payload
///
/// All fields optional; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionUpdate {
    pub name: Option<String>,
    pub polygon: Option<Polygon>,
    pub floors: Option<BTreeSet<i32>>,
    pub color: Option<String>,
}

impl RegionUpdate {
    /// Same invariants as [`RegionCreate::validate`], applied to the
    /// fields actually present
    pub fn validate(&self) -> AppResult<()> {
        if let Some(polygon) = &self.polygon {
            if !polygon.is_closed_shape() {
                return Err(AppError::polygon_too_small(polygon.len()));
            }
        }
        if let Some(floors) = &self.floors {
            if floors.is_empty() {
                return Err(AppError::empty_floor_set());
            }
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("region name must not be empty"));
            }
        }
        Ok(())
    }
}
