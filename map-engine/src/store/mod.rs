//! Persistent store adapter
//!
//! The document store holding regions and the playing area is an
//! external collaborator. This module defines the contract the engine
//! programs against: CRUD mutations plus a push-style subscription that
//! echoes the authoritative state after every remote or local change.

pub mod memory;

pub use memory::MemoryMapStore;

use async_trait::async_trait;
use shared::error::AppError;
use shared::geometry::Polygon;
use shared::models::{PlayingArea, Region, RegionCreate, RegionUpdate};
use thiserror::Error;
use tokio::sync::broadcast;

/// Store error types
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(resource) => AppError::not_found(resource),
            StoreError::Validation(msg) => AppError::validation(msg),
            StoreError::Storage(msg) => AppError::storage(msg),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Change notification pushed to subscribers
///
/// Every event carries the full authoritative collection, not a delta;
/// consumers replace their local copy wholesale. Regions always arrive
/// in creation order (ascending `created_at`, tie-broken by id), which
/// is what makes first-match overlap resolution reproducible.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    RegionsChanged(Vec<Region>),
    PlayingAreaChanged(Option<PlayingArea>),
}

/// Contract for the region / playing-area document store
///
/// Implementations must echo every successful mutation to all
/// subscribers. A rejected mutation must leave the stored state
/// untouched and emit nothing.
#[async_trait]
pub trait MapStore: Send + Sync {
    /// All regions, in creation order
    async fn load_regions(&self) -> StoreResult<Vec<Region>>;

    /// The singleton playing area, if one is set
    async fn load_playing_area(&self) -> StoreResult<Option<PlayingArea>>;

    async fn create_region(&self, data: RegionCreate) -> StoreResult<Region>;

    /// Partial update; absent fields keep their stored value
    async fn update_region(&self, id: &str, data: RegionUpdate) -> StoreResult<Region>;

    async fn delete_region(&self, id: &str) -> StoreResult<()>;

    /// Replace the playing area atomically (creates it if absent)
    async fn set_playing_area(&self, polygon: Polygon) -> StoreResult<PlayingArea>;

    /// Clear the playing-area restriction entirely
    async fn delete_playing_area(&self) -> StoreResult<()>;

    /// Subscribe to authoritative state changes
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
