//! Subscription-fed state cache
//!
//! The engine's one authoritative local copy of store state. UI code
//! never mutates it in place: edits go out through the store adapter and
//! only take visible effect when the subscription echoes them back.
//! That keeps "what I think is saved" and "what is saved" from drifting.

use crate::store::StoreEvent;
use shared::models::{PlayingArea, Region};
use std::collections::BTreeSet;

/// Owned cache of regions and the playing area
///
/// The subscription task is the sole writer after priming. Regions are
/// kept exactly in the order delivered by the store (creation order).
#[derive(Debug, Default)]
pub struct MapCache {
    regions: Vec<Region>,
    playing_area: Option<PlayingArea>,
    primed: bool,
}

impl MapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial load from the store, before the subscription takes over
    pub fn prime(&mut self, regions: Vec<Region>, playing_area: Option<PlayingArea>) {
        self.regions = regions;
        self.playing_area = playing_area;
        self.primed = true;
        tracing::debug!(regions = self.regions.len(), "cache primed");
    }

    /// Apply a store event, replacing the affected collection wholesale
    pub fn apply(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::RegionsChanged(regions) => {
                tracing::debug!(count = regions.len(), "regions refreshed");
                self.regions = regions;
            }
            StoreEvent::PlayingAreaChanged(area) => {
                tracing::debug!(present = area.is_some(), "playing area refreshed");
                self.playing_area = area;
            }
        }
    }

    /// Whether the initial load has completed
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Regions in creation order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn playing_area(&self) -> Option<&PlayingArea> {
        self.playing_area.as_ref()
    }

    /// Union of every known region's floors, the override path's
    /// substitute for a point lookup
    pub fn all_floors(&self) -> BTreeSet<i32> {
        self.regions
            .iter()
            .flat_map(|r| r.floors.iter().copied())
            .collect()
    }
}
