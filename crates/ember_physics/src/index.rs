//! Collision index - the set of currently collidable entities
//!
//! The index only stores handles. It never owns or keeps alive what they point
//! at, so destroying an entity needs no bookkeeping here; stale handles are
//! dropped by [`CollisionIndex::prune`] after the owner's reap phase.

/// Ordered collection of non-owning collider handles
#[derive(Debug, Clone)]
pub struct CollisionIndex<K> {
    handles: Vec<K>,
}

impl<K: Copy + PartialEq> CollisionIndex<K> {
    /// Create an empty index
    pub fn new() -> Self {
        Self { handles: Vec::new() }
    }

    /// Register a handle. Registering the same handle twice is a no-op.
    pub fn register(&mut self, handle: K) -> bool {
        if self.handles.contains(&handle) {
            return false;
        }
        self.handles.push(handle);
        true
    }

    /// Remove a handle, preserving the order of the rest
    pub fn unregister(&mut self, handle: K) -> bool {
        let before = self.handles.len();
        self.handles.retain(|h| *h != handle);
        self.handles.len() != before
    }

    /// Drop every handle for which `is_alive` returns false. Returns how many were dropped.
    pub fn prune(&mut self, mut is_alive: impl FnMut(K) -> bool) -> usize {
        let before = self.handles.len();
        self.handles.retain(|h| is_alive(*h));
        before - self.handles.len()
    }

    /// Check whether a handle is registered
    pub fn contains(&self, handle: K) -> bool {
        self.handles.contains(&handle)
    }

    /// Handles in registration order
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.handles.iter().copied()
    }

    /// Number of registered handles
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl<K: Copy + PartialEq> Default for CollisionIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut index = CollisionIndex::new();
        assert!(index.register(1u32));
        assert!(!index.register(1u32));
        assert!(index.register(2u32));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_prune_keeps_order() {
        let mut index = CollisionIndex::new();
        for h in 0..6u32 {
            index.register(h);
        }
        let dropped = index.prune(|h| h % 2 == 0);
        assert_eq!(dropped, 3);
        assert_eq!(index.iter().collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn test_unregister() {
        let mut index = CollisionIndex::new();
        index.register(7u32);
        assert!(index.unregister(7));
        assert!(!index.unregister(7));
        assert!(index.is_empty());
    }
}
