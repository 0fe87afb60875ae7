//! Map administration controller
//!
//! Wires the pieces together for the UI shell: owns the store handle,
//! the subscription-fed cache, the draw/drag state machine, region
//! selection, and the delete-confirmation gate. Persistence failures
//! surface as dismissible notices; local state always re-derives from
//! the next subscription echo rather than assuming a mutation applied.

use crate::cache::MapCache;
use crate::confirm::{ConfirmGate, ConfirmOutcome};
use crate::draw::{ClickOutcome, DrawEngine, DrawMode};
use crate::store::MapStore;
use crate::submission::{SubmissionDecision, SubmissionPolicy};
use parking_lot::RwLock;
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::geometry::{ImageBounds, PixelPoint, Point, Polygon};
use shared::models::palette;
use shared::models::{PlayingArea, Region, RegionCreate, RegionUpdate};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Notice channel capacity, enough to buffer a burst of failures
const NOTICE_CAPACITY: usize = 32;

/// Severity of an operator notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Operator-visible, dismissible message
///
/// The id gives the shell a stable handle for dismissal tracking.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Map administration controller
///
/// Methods are cooperative and expect to run on the UI shell's single
/// logical event loop (a current-thread tokio runtime is enough). The
/// only background work is the subscription task and fire-and-forget
/// drag persistence.
pub struct MapController {
    store: Arc<dyn MapStore>,
    cache: Arc<RwLock<MapCache>>,
    draw: DrawEngine,
    confirm: ConfirmGate,
    bounds: Option<ImageBounds>,
    selected: Option<String>,
    created_count: usize,
    notice_tx: broadcast::Sender<Notice>,
    subscription: Option<JoinHandle<()>>,
}

impl MapController {
    pub fn new(store: Arc<dyn MapStore>) -> Self {
        let (notice_tx, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            store,
            cache: Arc::new(RwLock::new(MapCache::new())),
            draw: DrawEngine::new(),
            confirm: ConfirmGate::new(),
            bounds: None,
            selected: None,
            created_count: 0,
            notice_tx,
            subscription: None,
        }
    }

    /// Prime the cache and start the subscription task
    ///
    /// The subscription task is the sole cache writer from here on. A
    /// lagged receiver resynchronizes with a full reload from the store.
    pub async fn start(&mut self) -> AppResult<()> {
        if self.subscription.is_some() {
            return Err(AppError::invalid_request("controller already started"));
        }

        let regions = self.store.load_regions().await.map_err(AppError::from)?;
        let playing_area = self
            .store
            .load_playing_area()
            .await
            .map_err(AppError::from)?;
        self.cache.write().prime(regions, playing_area);

        let mut rx = self.store.subscribe();
        let cache = Arc::clone(&self.cache);
        let store = Arc::clone(&self.store);
        let notice_tx = self.notice_tx.clone();
        let handle = tokio::spawn(async move {
            tracing::debug!("store subscription task started");
            loop {
                match rx.recv().await {
                    Ok(event) => cache.write().apply(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "store subscription lagged, resynchronizing");
                        match (store.load_regions().await, store.load_playing_area().await) {
                            (Ok(regions), Ok(area)) => cache.write().prime(regions, area),
                            (regions, area) => {
                                tracing::error!(
                                    regions_err = regions.is_err(),
                                    area_err = area.is_err(),
                                    "resynchronization after lag failed"
                                );
                                let _ = notice_tx
                                    .send(Notice::error("Failed to resynchronize map state"));
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("store subscription closed");
                        break;
                    }
                }
            }
        });
        self.subscription = Some(handle);
        Ok(())
    }

    /// Subscribe to operator notices
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notice_tx.subscribe()
    }

    /// Shared cache handle, for read-side consumers (submission form)
    pub fn cache(&self) -> Arc<RwLock<MapCache>> {
        Arc::clone(&self.cache)
    }

    // =========================================================================
    // Image surface
    // =========================================================================

    /// Update the floor-plan image bounding box
    ///
    /// Must be called on every image load and resize; conversions always
    /// use the latest snapshot.
    pub fn set_image_bounds(&mut self, bounds: ImageBounds) {
        self.bounds = Some(bounds);
    }

    fn bounds(&self) -> AppResult<ImageBounds> {
        self.bounds
            .ok_or_else(|| AppError::invalid_request("image bounds not set"))
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selected_region(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select a persisted region (drag handles attach to the selection)
    pub fn select_region(&mut self, id: &str) -> AppResult<()> {
        if self.cache.read().region(id).is_none() {
            return Err(AppError::not_found(format!("Region {id}")));
        }
        self.selected = Some(id.to_string());
        self.confirm.blur();
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.confirm.blur();
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    pub fn is_drawing(&self) -> bool {
        self.draw.is_drawing()
    }

    /// Points of the in-progress draw session, for rendering
    pub fn drawing_points(&self) -> Option<Vec<Point>> {
        self.draw.drawing_points().map(|p| p.to_vec())
    }

    /// Start drawing a new region; clears any selection
    pub fn begin_region_draw(&mut self) -> AppResult<()> {
        self.draw.begin(DrawMode::Region)?;
        self.selected = None;
        self.confirm.blur();
        Ok(())
    }

    /// Start drawing the playing area; clears any selection
    ///
    /// The existing playing area, if any, stays in force until the new
    /// polygon completes; completion replaces it atomically.
    pub fn begin_playing_area_draw(&mut self) -> AppResult<()> {
        self.draw.begin(DrawMode::PlayingArea)?;
        self.selected = None;
        self.confirm.blur();
        Ok(())
    }

    /// Redraw the playing area from scratch (alias used by the panel)
    pub fn redraw_playing_area(&mut self) -> AppResult<()> {
        self.begin_playing_area_draw()
    }

    /// Discard the in-progress draw session, if any
    pub fn cancel_draw(&mut self) {
        self.draw.cancel();
    }

    /// Escape key: cancel drawing and disarm any pending confirmation
    pub fn escape(&mut self) {
        self.draw.cancel();
        self.confirm.blur();
    }

    /// Canvas click in pixel space
    ///
    /// Converts through the current image bounds and feeds the draw
    /// machine. A close gesture persists the finished polygon; the
    /// session is discarded whether or not persistence succeeds.
    pub async fn canvas_click(&mut self, pos: PixelPoint) -> AppResult<ClickOutcome> {
        let bounds = self.bounds()?;
        let point = bounds.to_percent(pos);
        let outcome = self.draw.click(point);

        if let ClickOutcome::Closed { mode, polygon } = &outcome {
            match mode {
                DrawMode::Region => {
                    self.persist_new_region(polygon.clone()).await?;
                }
                DrawMode::PlayingArea => {
                    self.persist_playing_area(polygon.clone()).await?;
                }
            }
        }
        Ok(outcome)
    }

    /// Close-gesture emphasis for pointer moves over the canvas
    pub fn canvas_hover(&self, pos: PixelPoint) -> bool {
        match self.bounds {
            Some(bounds) => self.draw.hover(bounds.to_percent(pos)),
            None => false,
        }
    }

    async fn persist_new_region(&mut self, polygon: Polygon) -> AppResult<Region> {
        let data = RegionCreate {
            name: format!("Region {}", self.created_count + 1),
            polygon,
            floors: BTreeSet::from([1]),
            color: Some(palette::color_at(self.created_count).to_string()),
        };
        data.validate()?;

        match self.store.create_region(data).await {
            Ok(region) => {
                self.created_count += 1;
                tracing::info!(id = %region.id, "region persisted");
                Ok(region)
            }
            Err(err) => {
                let app: AppError = err.into();
                self.notify_error(format!("Failed to save region: {}", app.message));
                Err(app)
            }
        }
    }

    async fn persist_playing_area(&mut self, polygon: Polygon) -> AppResult<PlayingArea> {
        match self.store.set_playing_area(polygon).await {
            Ok(area) => {
                tracing::info!("playing area persisted");
                Ok(area)
            }
            Err(err) => {
                let app: AppError = err.into();
                self.notify_error(format!("Failed to save playing area: {}", app.message));
                Err(app)
            }
        }
    }

    // =========================================================================
    // Vertex dragging
    // =========================================================================

    /// Pointer-down on a rendered vertex handle
    ///
    /// Only the selected region's handles are draggable, and only while
    /// nothing is being drawn.
    pub fn vertex_pointer_down(&mut self, region_id: &str, vertex_index: usize) -> AppResult<()> {
        if self.selected.as_deref() != Some(region_id) {
            return Err(AppError::new(ErrorCode::RegionNotSelected));
        }
        {
            let cache = self.cache.read();
            let region = cache
                .region(region_id)
                .ok_or_else(|| AppError::not_found(format!("Region {region_id}")))?;
            if vertex_index >= region.polygon.len() {
                return Err(
                    AppError::new(ErrorCode::VertexOutOfRange).with_detail("index", vertex_index)
                );
            }
        }
        self.draw.begin_drag(region_id, vertex_index)
    }

    /// Pointer-move while dragging a vertex
    ///
    /// Recomputes the vertex in percentage space and immediately issues
    /// persistence of the whole polygon. Fire-and-forget: a failed save
    /// becomes an error notice and the cache stays on the last
    /// subscribed state. Moves while no drag is active are no-ops.
    pub fn drag_pointer_move(&mut self, pos: PixelPoint) -> AppResult<()> {
        let Some((region_id, vertex_index)) = self
            .draw
            .active_drag()
            .map(|(id, i)| (id.to_string(), i))
        else {
            return Ok(());
        };
        let bounds = self.bounds()?;
        let point = bounds.to_percent(pos);

        let mut moved: Option<Polygon> = None;
        {
            let cache = self.cache.read();
            if let Some(region) = cache.region(&region_id) {
                if vertex_index < region.polygon.len() {
                    let mut polygon = region.polygon.clone();
                    polygon.points[vertex_index] = point;
                    moved = Some(polygon);
                }
            }
        }
        let Some(polygon) = moved else {
            // Target deleted remotely mid-drag; nothing left to move.
            tracing::warn!(region = %region_id, "drag target vanished, ending drag");
            self.draw.end_drag();
            return Ok(());
        };

        let store = Arc::clone(&self.store);
        let notice_tx = self.notice_tx.clone();
        tokio::spawn(async move {
            let update = RegionUpdate {
                polygon: Some(polygon),
                ..Default::default()
            };
            if let Err(err) = store.update_region(&region_id, update).await {
                tracing::error!(region = %region_id, error = %err, "vertex move failed to save");
                let _ = notice_tx.send(Notice::error(format!("Failed to save vertex move: {err}")));
            }
        });
        Ok(())
    }

    /// Pointer-up: the drag finalizes at whatever position was reached
    pub fn drag_pointer_up(&mut self) {
        if self.draw.end_drag().is_some() {
            tracing::debug!("vertex drag finished");
        }
    }

    // =========================================================================
    // Region management panel
    // =========================================================================

    /// Regions in creation order, from the last subscribed state
    pub fn regions(&self) -> Vec<Region> {
        self.cache.read().regions().to_vec()
    }

    pub fn playing_area(&self) -> Option<PlayingArea> {
        self.cache.read().playing_area().cloned()
    }

    pub async fn rename_region(&self, id: &str, name: impl Into<String>) -> AppResult<Region> {
        let update = RegionUpdate {
            name: Some(name.into()),
            ..Default::default()
        };
        self.apply_region_update(id, update).await
    }

    /// Replace a region's floor set; an empty set is rejected before
    /// any store call
    pub async fn set_region_floors(&self, id: &str, floors: BTreeSet<i32>) -> AppResult<Region> {
        if floors.is_empty() {
            return Err(AppError::empty_floor_set());
        }
        let update = RegionUpdate {
            floors: Some(floors),
            ..Default::default()
        };
        self.apply_region_update(id, update).await
    }

    /// Toggle one floor on or off; removing the last floor is rejected
    /// and leaves the stored set untouched
    pub async fn toggle_region_floor(&self, id: &str, floor: i32) -> AppResult<Region> {
        let mut floors = {
            let cache = self.cache.read();
            cache
                .region(id)
                .ok_or_else(|| AppError::not_found(format!("Region {id}")))?
                .floors
                .clone()
        };
        if !floors.remove(&floor) {
            floors.insert(floor);
        }
        if floors.is_empty() {
            return Err(AppError::empty_floor_set());
        }
        let update = RegionUpdate {
            floors: Some(floors),
            ..Default::default()
        };
        self.apply_region_update(id, update).await
    }

    pub async fn set_region_color(&self, id: &str, color: impl Into<String>) -> AppResult<Region> {
        let update = RegionUpdate {
            color: Some(color.into()),
            ..Default::default()
        };
        self.apply_region_update(id, update).await
    }

    async fn apply_region_update(&self, id: &str, update: RegionUpdate) -> AppResult<Region> {
        update.validate()?;
        match self.store.update_region(id, update).await {
            Ok(region) => Ok(region),
            Err(err) => {
                let app: AppError = err.into();
                self.notify_error(format!("Failed to save region edit: {}", app.message));
                Err(app)
            }
        }
    }

    /// Two-step region delete: first call arms, second call inside the
    /// window executes
    pub async fn request_delete_region(&mut self, id: &str) -> AppResult<ConfirmOutcome> {
        if self.cache.read().region(id).is_none() {
            return Err(AppError::not_found(format!("Region {id}")));
        }
        match self.confirm.request(&format!("region/{id}")) {
            ConfirmOutcome::Armed => Ok(ConfirmOutcome::Armed),
            ConfirmOutcome::Fired => match self.store.delete_region(id).await {
                Ok(()) => {
                    if self.selected.as_deref() == Some(id) {
                        self.selected = None;
                    }
                    Ok(ConfirmOutcome::Fired)
                }
                Err(err) => {
                    let app: AppError = err.into();
                    self.notify_error(format!("Failed to delete region: {}", app.message));
                    Err(app)
                }
            },
        }
    }

    /// Two-step playing-area removal, same confirm pattern as regions
    pub async fn request_remove_playing_area(&mut self) -> AppResult<ConfirmOutcome> {
        match self.confirm.request("playing-area") {
            ConfirmOutcome::Armed => Ok(ConfirmOutcome::Armed),
            ConfirmOutcome::Fired => match self.store.delete_playing_area().await {
                Ok(()) => Ok(ConfirmOutcome::Fired),
                Err(err) => {
                    let app: AppError = err.into();
                    self.notify_error(format!("Failed to remove playing area: {}", app.message));
                    Err(app)
                }
            },
        }
    }

    /// Focus loss disarms any pending delete confirmation
    pub fn blur(&mut self) {
        self.confirm.blur();
    }

    /// Whether a delete for this region is armed (for button emphasis)
    pub fn is_delete_armed(&self, id: &str) -> bool {
        self.confirm.is_armed_for(&format!("region/{id}"))
    }

    // =========================================================================
    // Submission queries
    // =========================================================================

    /// Validate a submission click in pixel space
    pub fn evaluate_submission(
        &self,
        pos: PixelPoint,
        override_checks: bool,
    ) -> AppResult<SubmissionDecision> {
        let bounds = self.bounds()?;
        let point = bounds.to_percent(pos);
        let policy = SubmissionPolicy::with_override(override_checks);
        Ok(policy.evaluate(point, &self.cache.read()))
    }

    fn notify_error(&self, message: String) {
        tracing::error!(%message, "operator notice");
        let _ = self.notice_tx.send(Notice::error(message));
    }
}

impl Drop for MapController {
    fn drop(&mut self) {
        if let Some(handle) = self.subscription.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMapStore;

    fn controller() -> MapController {
        MapController::new(Arc::new(MemoryMapStore::new()))
    }

    fn full_view_bounds() -> ImageBounds {
        // 1000x1000 image at the origin: pixel / 10 == percent.
        ImageBounds::new(0.0, 0.0, 1000.0, 1000.0)
    }

    #[tokio::test]
    async fn test_canvas_click_requires_bounds() {
        let mut ctl = controller();
        let err = ctl.canvas_click(PixelPoint::new(10.0, 10.0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_click_without_session_is_ignored() {
        let mut ctl = controller();
        ctl.set_image_bounds(full_view_bounds());
        let outcome = ctl.canvas_click(PixelPoint::new(10.0, 10.0)).await.unwrap();
        assert_eq!(outcome, ClickOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_begin_draw_clears_selection() {
        let store = Arc::new(MemoryMapStore::new());
        let region = store
            .create_region(RegionCreate {
                name: "A".into(),
                polygon: Polygon::new(vec![
                    Point::new(0.0, 0.0),
                    Point::new(10.0, 0.0),
                    Point::new(0.0, 10.0),
                ]),
                floors: BTreeSet::from([1]),
                color: None,
            })
            .await
            .unwrap();

        let mut ctl = MapController::new(store);
        ctl.start().await.unwrap();
        ctl.select_region(&region.id).unwrap();
        assert_eq!(ctl.selected_region(), Some(region.id.as_str()));

        ctl.begin_region_draw().unwrap();
        assert_eq!(ctl.selected_region(), None);
    }

    #[tokio::test]
    async fn test_select_unknown_region_rejected() {
        let mut ctl = controller();
        let err = ctl.select_region("region:404").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_vertex_drag_requires_selection() {
        let mut ctl = controller();
        let err = ctl.vertex_pointer_down("region:1", 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::RegionNotSelected);
    }

    #[tokio::test]
    async fn test_drag_move_without_drag_is_noop() {
        let mut ctl = controller();
        ctl.set_image_bounds(full_view_bounds());
        assert!(ctl.drag_pointer_move(PixelPoint::new(5.0, 5.0)).is_ok());
    }

    #[tokio::test]
    async fn test_set_floors_rejects_empty_before_store() {
        let ctl = controller();
        let err = ctl
            .set_region_floors("region:1", BTreeSet::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyFloorSet);
    }

    #[tokio::test]
    async fn test_double_start_rejected() {
        let mut ctl = controller();
        ctl.start().await.unwrap();
        assert!(ctl.start().await.is_err());
    }
}
