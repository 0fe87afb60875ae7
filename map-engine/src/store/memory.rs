//! In-memory store
//!
//! Reference implementation of [`MapStore`]: backs the integration tests
//! and any embedding that does not need durable persistence. Mutations
//! validate, apply under a write lock, then echo the full authoritative
//! state to subscribers, the same order a remote document store's
//! listener would observe.

use super::{MapStore, StoreError, StoreEvent, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use shared::geometry::Polygon;
use shared::models::{PlayingArea, Region, RegionCreate, RegionUpdate};
use shared::util::snowflake_id;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Broadcast channel capacity, enough to buffer a burst of edits
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct MemoryState {
    /// Creation order; never re-sorted in place
    regions: Vec<Region>,
    playing_area: Option<PlayingArea>,
}

/// In-memory [`MapStore`] with failure injection for tests
pub struct MemoryMapStore {
    state: RwLock<MemoryState>,
    tx: broadcast::Sender<StoreEvent>,
    fail_next: AtomicBool,
}

impl Default for MemoryMapStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMapStore {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(MemoryState::default()),
            tx,
            fail_next: AtomicBool::new(false),
        }
    }

    /// Make the next mutation fail with a storage error, changing nothing
    pub fn fail_next_mutation(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check_injected_failure(&self) -> StoreResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Storage("injected mutation failure".into()));
        }
        Ok(())
    }

    fn emit_regions(&self, state: &MemoryState) {
        // No subscribers is fine; send only fails when all receivers dropped.
        let _ = self
            .tx
            .send(StoreEvent::RegionsChanged(state.regions.clone()));
    }

    fn emit_playing_area(&self, state: &MemoryState) {
        let _ = self
            .tx
            .send(StoreEvent::PlayingAreaChanged(state.playing_area.clone()));
    }
}

#[async_trait]
impl MapStore for MemoryMapStore {
    async fn load_regions(&self) -> StoreResult<Vec<Region>> {
        Ok(self.state.read().regions.clone())
    }

    async fn load_playing_area(&self) -> StoreResult<Option<PlayingArea>> {
        Ok(self.state.read().playing_area.clone())
    }

    async fn create_region(&self, data: RegionCreate) -> StoreResult<Region> {
        self.check_injected_failure()?;
        data.validate()
            .map_err(|e| StoreError::Validation(e.message))?;

        let now = Utc::now();
        let region = Region {
            id: format!("region:{}", snowflake_id()),
            name: data.name,
            polygon: data.polygon,
            floors: data.floors,
            color: data.color,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write();
        state.regions.push(region.clone());
        tracing::info!(id = %region.id, name = %region.name, "region created");
        self.emit_regions(&state);
        Ok(region)
    }

    async fn update_region(&self, id: &str, data: RegionUpdate) -> StoreResult<Region> {
        self.check_injected_failure()?;
        data.validate()
            .map_err(|e| StoreError::Validation(e.message))?;

        let mut state = self.state.write();
        let region = state
            .regions
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Region {id}")))?;

        if let Some(name) = data.name {
            region.name = name;
        }
        if let Some(polygon) = data.polygon {
            region.polygon = polygon;
        }
        if let Some(floors) = data.floors {
            region.floors = floors;
        }
        if let Some(color) = data.color {
            region.color = Some(color);
        }
        region.updated_at = Utc::now();

        let updated = region.clone();
        tracing::debug!(id = %updated.id, "region updated");
        self.emit_regions(&state);
        Ok(updated)
    }

    async fn delete_region(&self, id: &str) -> StoreResult<()> {
        self.check_injected_failure()?;

        let mut state = self.state.write();
        let before = state.regions.len();
        state.regions.retain(|r| r.id != id);
        if state.regions.len() == before {
            return Err(StoreError::NotFound(format!("Region {id}")));
        }
        tracing::info!(id = %id, "region deleted");
        self.emit_regions(&state);
        Ok(())
    }

    async fn set_playing_area(&self, polygon: Polygon) -> StoreResult<PlayingArea> {
        self.check_injected_failure()?;
        if !polygon.is_closed_shape() {
            return Err(StoreError::Validation(
                "playing area needs at least three vertices".into(),
            ));
        }

        let area = PlayingArea {
            polygon,
            updated_at: Utc::now(),
        };
        let mut state = self.state.write();
        state.playing_area = Some(area.clone());
        tracing::info!("playing area replaced");
        self.emit_playing_area(&state);
        Ok(area)
    }

    async fn delete_playing_area(&self) -> StoreResult<()> {
        self.check_injected_failure()?;

        let mut state = self.state.write();
        if state.playing_area.take().is_some() {
            tracing::info!("playing area removed");
            self.emit_playing_area(&state);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::geometry::Point;
    use std::collections::BTreeSet;

    fn triangle() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(0.0, 50.0),
        ])
    }

    fn create_payload(name: &str) -> RegionCreate {
        RegionCreate {
            name: name.into(),
            polygon: triangle(),
            floors: BTreeSet::from([1]),
            color: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_echoes() {
        let store = MemoryMapStore::new();
        let mut rx = store.subscribe();

        let region = store.create_region(create_payload("A")).await.unwrap();
        assert!(region.id.starts_with("region:"));

        match rx.recv().await.unwrap() {
            StoreEvent::RegionsChanged(regions) => {
                assert_eq!(regions.len(), 1);
                assert_eq!(regions[0].id, region.id);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_regions_keep_creation_order() {
        let store = MemoryMapStore::new();
        let a = store.create_region(create_payload("A")).await.unwrap();
        let b = store.create_region(create_payload("B")).await.unwrap();

        let regions = store.load_regions().await.unwrap();
        assert_eq!(regions[0].id, a.id);
        assert_eq!(regions[1].id, b.id);
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let store = MemoryMapStore::new();
        let region = store.create_region(create_payload("A")).await.unwrap();

        let updated = store
            .update_region(
                &region.id,
                RegionUpdate {
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.polygon, region.polygon);
        assert_eq!(updated.floors, region.floors);
        assert!(updated.updated_at >= region.updated_at);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_floor_set() {
        let store = MemoryMapStore::new();
        let region = store.create_region(create_payload("A")).await.unwrap();

        let err = store
            .update_region(
                &region.id,
                RegionUpdate {
                    floors: Some(BTreeSet::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        // Stored floors unchanged and still non-empty.
        let regions = store.load_regions().await.unwrap();
        assert_eq!(regions[0].floors, BTreeSet::from([1]));
    }

    #[tokio::test]
    async fn test_delete_missing_region() {
        let store = MemoryMapStore::new();
        let err = store.delete_region("region:999").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_playing_area_replaces() {
        let store = MemoryMapStore::new();
        store.set_playing_area(triangle()).await.unwrap();

        let replacement = Polygon::new(vec![
            Point::new(10.0, 10.0),
            Point::new(90.0, 10.0),
            Point::new(90.0, 90.0),
            Point::new(10.0, 90.0),
        ]);
        store.set_playing_area(replacement.clone()).await.unwrap();

        let area = store.load_playing_area().await.unwrap().unwrap();
        assert_eq!(area.polygon, replacement);
    }

    #[tokio::test]
    async fn test_set_playing_area_rejects_open_polygon() {
        let store = MemoryMapStore::new();
        let open = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert!(store.set_playing_area(open).await.is_err());
        assert!(store.load_playing_area().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_playing_area_clears_restriction() {
        let store = MemoryMapStore::new();
        store.set_playing_area(triangle()).await.unwrap();
        store.delete_playing_area().await.unwrap();
        assert!(store.load_playing_area().await.unwrap().is_none());

        // Deleting when absent is a no-op, not an error.
        store.delete_playing_area().await.unwrap();
    }

    #[tokio::test]
    async fn test_injected_failure_changes_nothing_and_emits_nothing() {
        let store = MemoryMapStore::new();
        let mut rx = store.subscribe();

        store.fail_next_mutation();
        let err = store.create_region(create_payload("A")).await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert!(store.load_regions().await.unwrap().is_empty());
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        // The failure only applies once.
        store.create_region(create_payload("A")).await.unwrap();
    }
}
