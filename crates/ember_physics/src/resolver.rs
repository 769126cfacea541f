//! Bounded-pass collision resolution
//!
//! Given a mover and a proposed displacement, the resolver scans the
//! [`CollisionIndex`] up to `max_passes` times, pushing the moved box out of
//! every collider it overlaps. The cost per call is bounded, which means a
//! small residual overlap can survive the last pass.

use std::fmt::Debug;

use glam::Vec3;

use crate::aabb::AABB;
use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::groups::CollisionGroups;
use crate::index::CollisionIndex;

/// What a handle in the index currently resolves to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderState {
    /// The handle outlived its entity
    Stale,
    /// The entity exists but carries no collision shape
    Absent,
    /// The entity has a collider whose bounds were never computed
    Pending,
    /// A usable collider
    Ready {
        bounds: AABB,
        groups: CollisionGroups,
    },
}

/// Lookup from collider handles to their current state
pub trait ColliderSource<K> {
    /// Resolve a handle
    fn collider(&self, handle: K) -> ColliderState;
}

/// A proposed move
#[derive(Debug, Clone)]
pub struct MoveQuery<K> {
    /// The moving collider (never collides with itself)
    pub mover: K,
    /// Current bounds of the mover
    pub bounds: AABB,
    /// Proposed displacement
    pub delta: Vec3,
    /// Optional filter: only colliders whose groups pass are considered
    pub filter: Option<CollisionGroups>,
    /// Overrides the configured pass count
    pub max_passes: Option<u32>,
}

impl<K> MoveQuery<K> {
    /// Create a new query with no filter and the configured pass count
    pub fn new(mover: K, bounds: AABB, delta: Vec3) -> Self {
        Self {
            mover,
            bounds,
            delta,
            filter: None,
            max_passes: None,
        }
    }

    /// Restrict which colliders are considered
    pub fn with_filter(mut self, filter: Option<CollisionGroups>) -> Self {
        self.filter = filter;
        self
    }

    /// Override the pass count
    pub fn with_max_passes(mut self, passes: u32) -> Self {
        self.max_passes = Some(passes);
        self
    }
}

/// Outcome of a move that hit something
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionInfo<K> {
    /// Vector to add to the proposed displacement to undo the overlaps
    pub correction: Vec3,
    /// Colliders that were hit, in hit order, each at most once
    pub touched: Vec<K>,
}

impl<K: PartialEq> CollisionInfo<K> {
    /// Check whether a collider was hit
    pub fn touched(&self, handle: &K) -> bool {
        self.touched.contains(handle)
    }

    /// Whether the correction pushes the mover upwards (it landed on something)
    pub fn is_landing(&self) -> bool {
        self.correction.y > 0.0
    }
}

/// Resolves proposed moves against a collision index
#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    config: PhysicsConfig,
}

impl CollisionResolver {
    /// Create a resolver
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Find and cancel out overlaps for a proposed move.
    ///
    /// Returns `Ok(None)` when the move touches nothing. Stale handles and
    /// repeat hits on an already touched collider are skipped and logged.
    /// A collider without computed bounds is a fatal error.
    pub fn resolve_move<K, S>(
        &self,
        source: &S,
        index: &CollisionIndex<K>,
        query: &MoveQuery<K>,
    ) -> Result<Option<CollisionInfo<K>>>
    where
        K: Copy + PartialEq + Debug,
        S: ColliderSource<K> + ?Sized,
    {
        let passes = query.max_passes.unwrap_or(self.config.max_passes);
        let mut moved = query.bounds.translated(query.delta);
        let mut correction = Vec3::ZERO;
        let mut touched: Vec<K> = Vec::new();

        for _ in 0..passes {
            let mut new_hits = 0;

            for handle in index.iter() {
                if handle == query.mover {
                    continue;
                }

                let (bounds, groups) = match source.collider(handle) {
                    ColliderState::Stale => {
                        log::warn!("Skipping expired collision handle {:?}", handle);
                        continue;
                    }
                    ColliderState::Absent => continue,
                    ColliderState::Pending => {
                        return Err(PhysicsError::ShapeNotComputed(format!("{:?}", handle)));
                    }
                    ColliderState::Ready { bounds, groups } => (bounds, groups),
                };

                if let Some(filter) = &query.filter {
                    if !filter.can_collide(&groups) {
                        continue;
                    }
                }

                if !moved.collides(&bounds) {
                    continue;
                }

                if touched.contains(&handle) {
                    log::warn!(
                        "{:?} collided with {:?} again in the same resolve call",
                        query.mover,
                        handle
                    );
                    continue;
                }

                let separation = moved.separation_vector(&bounds);
                correction += separation;
                moved.translate(separation);
                touched.push(handle);
                new_hits += 1;
            }

            if new_hits == 0 {
                break;
            }
        }

        if touched.is_empty() {
            Ok(None)
        } else {
            Ok(Some(CollisionInfo { correction, touched }))
        }
    }

    /// Single-pass move: the displacement actually applicable after one round
    /// of correction (`delta + correction`, or `delta` when nothing was hit).
    pub fn move_and_collide<K, S>(
        &self,
        source: &S,
        index: &CollisionIndex<K>,
        query: MoveQuery<K>,
    ) -> Result<Vec3>
    where
        K: Copy + PartialEq + Debug,
        S: ColliderSource<K> + ?Sized,
    {
        let query = query.with_max_passes(1);
        let correction = self
            .resolve_move(source, index, &query)?
            .map(|info| info.correction)
            .unwrap_or(Vec3::ZERO);
        Ok(query.delta + correction)
    }

    /// Probe a small downward move; true if it hits something
    pub fn probe_ground<K, S>(
        &self,
        source: &S,
        index: &CollisionIndex<K>,
        mover: K,
        bounds: AABB,
        filter: Option<CollisionGroups>,
    ) -> Result<bool>
    where
        K: Copy + PartialEq + Debug,
        S: ColliderSource<K> + ?Sized,
    {
        let probe = Vec3::new(0.0, -self.config.ground_probe_epsilon, 0.0);
        let query = MoveQuery::new(mover, bounds, probe).with_filter(filter);
        Ok(self.resolve_move(source, index, &query)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Boxes {
        states: HashMap<u32, ColliderState>,
        lookups: Cell<usize>,
    }

    impl Boxes {
        fn with(mut self, id: u32, bounds: AABB) -> Self {
            self.states.insert(
                id,
                ColliderState::Ready {
                    bounds,
                    groups: CollisionGroups::ALL,
                },
            );
            self
        }
    }

    impl ColliderSource<u32> for Boxes {
        fn collider(&self, handle: u32) -> ColliderState {
            self.lookups.set(self.lookups.get() + 1);
            self.states.get(&handle).copied().unwrap_or(ColliderState::Stale)
        }
    }

    fn index_of(ids: &[u32]) -> CollisionIndex<u32> {
        let mut index = CollisionIndex::new();
        for id in ids {
            index.register(*id);
        }
        index
    }

    fn floor() -> AABB {
        AABB::new(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.0, 10.0))
    }

    fn unit_box_on_floor() -> AABB {
        AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_no_collision_returns_none() {
        let boxes = Boxes::default().with(1, floor());
        let index = index_of(&[0, 1]);
        let resolver = CollisionResolver::default();
        let query = MoveQuery::new(0, unit_box_on_floor(), Vec3::new(0.5, 0.0, 0.0));
        // Sliding along the floor only touches it
        assert!(resolver.resolve_move(&boxes, &index, &query).unwrap().is_none());
    }

    #[test]
    fn test_falling_into_floor_is_pushed_up() {
        let boxes = Boxes::default().with(1, floor());
        let index = index_of(&[0, 1]);
        let resolver = CollisionResolver::default();
        let query = MoveQuery::new(0, unit_box_on_floor(), Vec3::new(0.0, -0.25, 0.0));

        let info = resolver.resolve_move(&boxes, &index, &query).unwrap().unwrap();
        assert_relative_eq!(info.correction.y, 0.25);
        assert!(info.is_landing());
        assert_eq!(info.touched, vec![1]);
    }

    #[test]
    fn test_mover_skips_itself() {
        let boxes = Boxes::default().with(0, unit_box_on_floor());
        let index = index_of(&[0]);
        let resolver = CollisionResolver::default();
        let query = MoveQuery::new(0, unit_box_on_floor(), Vec3::new(0.1, 0.0, 0.0));
        assert!(resolver.resolve_move(&boxes, &index, &query).unwrap().is_none());
    }

    #[test]
    fn test_stale_handles_are_skipped() {
        let boxes = Boxes::default().with(1, floor());
        let index = index_of(&[0, 99, 1]);
        let resolver = CollisionResolver::default();
        let query = MoveQuery::new(0, unit_box_on_floor(), Vec3::new(0.0, -0.5, 0.0));
        let info = resolver.resolve_move(&boxes, &index, &query).unwrap().unwrap();
        assert_eq!(info.touched, vec![1]);
    }

    #[test]
    fn test_pending_shape_is_fatal() {
        let mut boxes = Boxes::default();
        boxes.states.insert(1, ColliderState::Pending);
        let index = index_of(&[0, 1]);
        let resolver = CollisionResolver::default();
        let query = MoveQuery::new(0, unit_box_on_floor(), Vec3::ZERO);
        assert!(matches!(
            resolver.resolve_move(&boxes, &index, &query),
            Err(PhysicsError::ShapeNotComputed(_))
        ));
    }

    #[test]
    fn test_filter_excludes_colliders() {
        let mut boxes = Boxes::default();
        boxes.states.insert(
            1,
            ColliderState::Ready {
                bounds: floor(),
                groups: CollisionGroups::NONE,
            },
        );
        let index = index_of(&[0, 1]);
        let resolver = CollisionResolver::default();
        let query = MoveQuery::new(0, unit_box_on_floor(), Vec3::new(0.0, -0.5, 0.0))
            .with_filter(Some(CollisionGroups::ALL));
        assert!(resolver.resolve_move(&boxes, &index, &query).unwrap().is_none());
    }

    #[test]
    fn test_second_pass_resolves_push_into_neighbour() {
        // Corner between a floor and a wall at x = 1
        let wall = AABB::new(Vec3::new(1.0, 0.0, -10.0), Vec3::new(2.0, 5.0, 10.0));
        let boxes = Boxes::default().with(1, wall).with(2, floor());
        let index = index_of(&[0, 1, 2]);
        let resolver = CollisionResolver::default();
        let query = MoveQuery::new(0, unit_box_on_floor(), Vec3::new(0.5, -0.25, 0.0));

        let info = resolver.resolve_move(&boxes, &index, &query).unwrap().unwrap();
        assert_relative_eq!(info.correction.x, -0.5);
        assert_relative_eq!(info.correction.y, 0.25);
        assert_eq!(info.touched.len(), 2);
    }

    #[test]
    fn test_passes_are_bounded_and_touches_unique() {
        let mut boxes = Boxes::default();
        let mut ids = vec![0];
        for i in 1..=20u32 {
            let x = i as f32 * 0.5;
            let wall = AABB::new(Vec3::new(x - 5.0, -1.0, -1.0), Vec3::new(x, 2.0, 1.0));
            boxes = boxes.with(i, wall);
            ids.push(i);
        }
        let index = index_of(&ids);
        let resolver = CollisionResolver::new(PhysicsConfig::default().with_max_passes(3));
        let query = MoveQuery::new(0, unit_box_on_floor(), Vec3::new(0.25, 0.0, 0.0));

        let result = resolver.resolve_move(&boxes, &index, &query).unwrap();
        // The mover itself is skipped before any lookup
        assert!(boxes.lookups.get() <= 3 * (ids.len() - 1));
        if let Some(info) = result {
            let mut seen = info.touched.clone();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), info.touched.len());
        }
    }

    #[test]
    fn test_move_and_collide_single_shot() {
        let boxes = Boxes::default().with(1, floor());
        let index = index_of(&[0, 1]);
        let resolver = CollisionResolver::default();
        let query = MoveQuery::new(0, unit_box_on_floor(), Vec3::new(0.5, -0.5, 0.0));
        let applied = resolver.move_and_collide(&boxes, &index, query).unwrap();
        assert_relative_eq!(applied.x, 0.5);
        assert_relative_eq!(applied.y, 0.0);
    }

    #[test]
    fn test_probe_ground() {
        let boxes = Boxes::default().with(1, floor());
        let index = index_of(&[0, 1]);
        let resolver = CollisionResolver::default();
        assert!(resolver
            .probe_ground(&boxes, &index, 0, unit_box_on_floor(), None)
            .unwrap());
        let airborne = unit_box_on_floor().translated(Vec3::new(0.0, 1.0, 0.0));
        assert!(!resolver.probe_ground(&boxes, &index, 0, airborne, None).unwrap());
    }
}
