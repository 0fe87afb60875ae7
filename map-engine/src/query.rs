//! Point queries over loaded map state
//!
//! Overlapping regions are legal; which one answers a floor lookup is a
//! named, swappable policy rather than an accident of iteration. The
//! shipped policy is first-match-by-creation-order: scan regions in the
//! order the store delivers them (creation order) and take the first
//! whose polygon contains the point.

use enum_dispatch::enum_dispatch;
use shared::geometry::Point;
use shared::models::{PlayingArea, Region};
use std::collections::BTreeSet;

/// Is a submission at `point` allowed by the playing area?
///
/// No playing area means no restriction: every point is legal.
pub fn is_point_in_playing_area(point: Point, playing_area: Option<&PlayingArea>) -> bool {
    match playing_area {
        None => true,
        Some(area) => area.polygon.contains(point),
    }
}

/// Strategy for resolving a point against overlapping regions
///
/// Returns the floor set valid at the point, or `None` when no region
/// contains it ("no floor constraint known here").
#[enum_dispatch]
pub trait OverlapPolicy {
    fn floors_for_point(&self, point: Point, regions: &[Region]) -> Option<BTreeSet<i32>>;
}

/// First region in creation order whose polygon contains the point wins
///
/// Reproducible because the store delivers regions in creation order
/// and re-derives that order on every echo. The result therefore
/// depends on which overlapping region was created first: documented
/// behavior, not an accident.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatchByCreationOrder;

impl OverlapPolicy for FirstMatchByCreationOrder {
    fn floors_for_point(&self, point: Point, regions: &[Region]) -> Option<BTreeSet<i32>> {
        regions
            .iter()
            .find(|r| r.polygon.contains(point))
            .map(|r| r.floors.clone())
    }
}

/// Available overlap policies, statically dispatched
///
/// Future strategies (highest priority, smallest area, explicit
/// z-order) slot in as variants without touching callers.
#[enum_dispatch(OverlapPolicy)]
#[derive(Debug, Clone, Copy)]
pub enum OverlapResolution {
    FirstMatchByCreationOrder(FirstMatchByCreationOrder),
}

impl Default for OverlapResolution {
    fn default() -> Self {
        OverlapResolution::FirstMatchByCreationOrder(FirstMatchByCreationOrder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::geometry::Polygon;

    fn region(id: &str, x0: f64, x1: f64, floors: &[i32]) -> Region {
        Region {
            id: id.into(),
            name: id.into(),
            polygon: Polygon::new(vec![
                Point::new(x0, 0.0),
                Point::new(x1, 0.0),
                Point::new(x1, 100.0),
                Point::new(x0, 100.0),
            ]),
            floors: floors.iter().copied().collect(),
            color: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_playing_area_is_unrestricted() {
        assert!(is_point_in_playing_area(Point::new(99.0, 99.0), None));
    }

    #[test]
    fn test_playing_area_restricts() {
        let area = PlayingArea {
            polygon: Polygon::new(vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 100.0),
                Point::new(0.0, 100.0),
            ]),
            updated_at: Utc::now(),
        };
        assert!(is_point_in_playing_area(Point::new(25.0, 25.0), Some(&area)));
        assert!(!is_point_in_playing_area(Point::new(75.0, 75.0), Some(&area)));
    }

    #[test]
    fn test_floor_lookup_inside_and_outside() {
        let regions = vec![region("region:1", 0.0, 50.0, &[1, 2])];
        let policy = OverlapResolution::default();

        let floors = policy
            .floors_for_point(Point::new(25.0, 25.0), &regions)
            .unwrap();
        assert_eq!(floors, BTreeSet::from([1, 2]));
        assert!(policy
            .floors_for_point(Point::new(75.0, 75.0), &regions)
            .is_none());
    }

    #[test]
    fn test_overlap_first_match_wins_by_order() {
        let a = region("region:a", 0.0, 60.0, &[1]);
        let b = region("region:b", 0.0, 60.0, &[2]);
        let p = Point::new(30.0, 30.0);
        let policy = OverlapResolution::default();

        let forward = policy.floors_for_point(p, &[a.clone(), b.clone()]).unwrap();
        assert_eq!(forward, BTreeSet::from([1]));

        let reversed = policy.floors_for_point(p, &[b, a]).unwrap();
        assert_eq!(reversed, BTreeSet::from([2]));
    }

    #[test]
    fn test_empty_region_list() {
        let policy = OverlapResolution::default();
        assert!(policy.floors_for_point(Point::new(1.0, 1.0), &[]).is_none());
    }
}
