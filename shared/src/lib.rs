//! Shared types for the map tooling
//!
//! Domain layer used by the engine crate and any UI shell embedding it:
//! geometry kernel, region/playing-area models, error types, and small
//! utilities. No I/O and no async: everything here is plain data and
//! pure functions.

pub mod error;
pub mod geometry;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use geometry::{ImageBounds, PixelPoint, Point, Polygon};
pub use models::{PlayingArea, Region, RegionCreate, RegionUpdate};
