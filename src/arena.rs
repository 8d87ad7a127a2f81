//! Asset storage for the pipeline.
//!
//! Every asset value the pipeline touches — registered sources and
//! transformation outputs alike — lives in an [`Arena`] and is addressed by a
//! copyable [`AssetHandle`]. Records are append-only and never move, so a
//! handle stays valid for the arena's whole lifetime; everything is released
//! together when the arena is dropped.

use crate::asset::Asset;

/// Opaque handle to an asset owned by a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetHandle(usize);

impl AssetHandle {
    /// Position of the asset within its arena, for diagnostics.
    pub(crate) fn index(&self) -> usize {
        self.0
    }
}

/// Append-only store of assets, released as a unit.
#[derive(Debug, Default)]
pub struct Arena {
    assets: Vec<Asset>,
}

impl Arena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an asset and return its handle.
    pub fn insert(&mut self, asset: Asset) -> AssetHandle {
        let handle = AssetHandle(self.assets.len());
        self.assets.push(asset);
        handle
    }

    /// Look up an asset by handle.
    pub fn get(&self, handle: AssetHandle) -> Option<&Asset> {
        self.assets.get(handle.0)
    }

    /// Number of assets owned by the arena.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the arena owns no assets.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut arena = Arena::new();
        assert!(arena.is_empty());

        let a = arena.insert(Asset::default());
        let b = arena.insert(Asset::default());

        assert_eq!(arena.len(), 2);
        assert_ne!(a, b);
        assert!(arena.get(a).is_some());
        assert!(arena.get(b).is_some());
    }

    #[test]
    fn handles_stay_valid_after_growth() {
        let mut arena = Arena::new();
        let first = arena.insert(Asset {
            generator: "first".into(),
            ..Asset::default()
        });
        for _ in 0..100 {
            arena.insert(Asset::default());
        }
        assert_eq!(arena.get(first).unwrap().generator, "first");
    }

    #[test]
    fn unknown_handle_is_none() {
        let mut arena = Arena::new();
        let handle = arena.insert(Asset::default());
        let other = Arena::new();
        assert!(other.get(handle).is_none());
    }
}
