//! Submission-time validation
//!
//! The photo-submission form asks two questions about a user-selected
//! map point: is it inside the playing area at all, and which floors are
//! legal there. An operator override bypasses both for testing, turning
//! the answer into "anywhere, any known floor".

use crate::cache::MapCache;
use crate::query::{OverlapPolicy, OverlapResolution, is_point_in_playing_area};
use shared::geometry::Point;
use std::collections::BTreeSet;

/// Outcome of validating a submission point
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionDecision {
    /// Point accepted; `floors` populates the floor selector, `None`
    /// hides it (no floor constraint known at this point)
    Accepted { floors: Option<BTreeSet<i32>> },
    /// Point is outside the playing area: show the rejection pulse,
    /// record nothing
    RejectedOutsideArea,
}

/// Submission validation policy
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionPolicy {
    /// Operator testing override: skip the playing-area check and offer
    /// every known floor
    pub override_checks: bool,
    resolution: OverlapResolution,
}

impl SubmissionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(override_checks: bool) -> Self {
        Self {
            override_checks,
            ..Self::default()
        }
    }

    /// Validate a map point against the currently loaded state
    pub fn evaluate(&self, point: Point, cache: &MapCache) -> SubmissionDecision {
        if self.override_checks {
            let all = cache.all_floors();
            return SubmissionDecision::Accepted {
                floors: if all.is_empty() { None } else { Some(all) },
            };
        }

        if !is_point_in_playing_area(point, cache.playing_area()) {
            return SubmissionDecision::RejectedOutsideArea;
        }

        SubmissionDecision::Accepted {
            floors: self.resolution.floors_for_point(point, cache.regions()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreEvent;
    use chrono::Utc;
    use shared::geometry::Polygon;
    use shared::models::{PlayingArea, Region};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }

    fn region(id: &str, polygon: Polygon, floors: &[i32]) -> Region {
        Region {
            id: id.into(),
            name: id.into(),
            polygon,
            floors: floors.iter().copied().collect(),
            color: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cache_with(regions: Vec<Region>, playing_area: Option<PlayingArea>) -> MapCache {
        let mut cache = MapCache::new();
        cache.prime(regions, playing_area);
        cache
    }

    #[test]
    fn test_accepts_anywhere_without_playing_area() {
        let cache = cache_with(vec![], None);
        let decision = SubmissionPolicy::new().evaluate(Point::new(75.0, 75.0), &cache);
        assert_eq!(decision, SubmissionDecision::Accepted { floors: None });
    }

    #[test]
    fn test_rejects_outside_playing_area() {
        let area = PlayingArea {
            polygon: rect(0.0, 0.0, 50.0, 100.0),
            updated_at: Utc::now(),
        };
        let cache = cache_with(vec![], Some(area));

        let policy = SubmissionPolicy::new();
        assert_eq!(
            policy.evaluate(Point::new(75.0, 75.0), &cache),
            SubmissionDecision::RejectedOutsideArea
        );
        assert_eq!(
            policy.evaluate(Point::new(25.0, 25.0), &cache),
            SubmissionDecision::Accepted { floors: None }
        );
    }

    #[test]
    fn test_floor_selector_populated_inside_region() {
        let cache = cache_with(
            vec![region("region:1", rect(0.0, 0.0, 50.0, 100.0), &[1, 2])],
            None,
        );
        let decision = SubmissionPolicy::new().evaluate(Point::new(25.0, 25.0), &cache);
        assert_eq!(
            decision,
            SubmissionDecision::Accepted {
                floors: Some(BTreeSet::from([1, 2]))
            }
        );
    }

    #[test]
    fn test_override_bypasses_area_and_offers_all_floors() {
        let area = PlayingArea {
            polygon: rect(0.0, 0.0, 10.0, 10.0),
            updated_at: Utc::now(),
        };
        let cache = cache_with(
            vec![
                region("region:1", rect(0.0, 0.0, 10.0, 10.0), &[1]),
                region("region:2", rect(20.0, 20.0, 40.0, 40.0), &[3, 4]),
            ],
            Some(area),
        );

        let decision =
            SubmissionPolicy::with_override(true).evaluate(Point::new(95.0, 95.0), &cache);
        assert_eq!(
            decision,
            SubmissionDecision::Accepted {
                floors: Some(BTreeSet::from([1, 3, 4]))
            }
        );
    }

    #[test]
    fn test_override_with_no_regions_hides_selector() {
        let cache = cache_with(vec![], None);
        let decision = SubmissionPolicy::with_override(true).evaluate(Point::new(5.0, 5.0), &cache);
        assert_eq!(decision, SubmissionDecision::Accepted { floors: None });
    }

    #[test]
    fn test_decision_tracks_subscribed_state() {
        let mut cache = cache_with(vec![], None);
        let policy = SubmissionPolicy::new();
        let p = Point::new(25.0, 25.0);
        assert_eq!(
            policy.evaluate(p, &cache),
            SubmissionDecision::Accepted { floors: None }
        );

        cache.apply(StoreEvent::RegionsChanged(vec![region(
            "region:1",
            rect(0.0, 0.0, 50.0, 50.0),
            &[2],
        )]));
        assert_eq!(
            policy.evaluate(p, &cache),
            SubmissionDecision::Accepted {
                floors: Some(BTreeSet::from([2]))
            }
        );
    }
}
