//! Per-asset bookkeeping shared by every kind the store holds: identity,
//! name, GC policy, and the reference count that policy is judged against.

use std::time::{Duration, Instant};

/// When an asset with zero references becomes eligible for collection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GcMethod {
    /// Survives every [`crate::store::AssetStore::update`] regardless of
    /// reference count.
    Never,
    /// Collectable once `ref_count == 0` and enough time has passed since
    /// the count last dropped to zero.
    Periodic,
}

/// `{name, gc_method, last_access, ref_count}` from spec §3 "Asset", minus
/// the identifier itself (that's the `Handle<T>` the store hands back).
#[derive(Clone, Debug)]
pub struct AssetMeta {
    name: String,
    gc_method: GcMethod,
    ref_count: u32,
    /// Instant the reference count last reached zero. Only meaningful once
    /// `ref_count == 0`; the eviction delay is measured from here rather
    /// than from creation, so an asset that gets used right up until it
    /// doesn't isn't penalized for its prior busy lifetime.
    last_release: Instant,
}

impl AssetMeta {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            gc_method: GcMethod::Never,
            ref_count: 0,
            last_release: Instant::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn gc_method(&self) -> GcMethod {
        self.gc_method
    }

    pub fn set_gc_method(&mut self, method: GcMethod) {
        self.gc_method = method;
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    pub fn acquire(&mut self) {
        self.ref_count += 1;
    }

    /// Releases one reference. When the count reaches zero the eviction
    /// clock starts (or restarts, if it had already been at zero before a
    /// transient re-acquire).
    pub fn release(&mut self) {
        self.ref_count = self.ref_count.saturating_sub(1);
        if self.ref_count == 0 {
            self.last_release = Instant::now();
        }
    }

    /// `gc_method == PERIODIC && ref_count == 0 && age > eviction_delay`.
    pub fn is_collectable(&self, eviction_delay: Duration) -> bool {
        self.gc_method == GcMethod::Periodic
            && self.ref_count == 0
            && self.last_release.elapsed() > eviction_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_is_not_collectable_regardless_of_ref_count() {
        let meta = AssetMeta::new("a".into());
        assert!(!meta.is_collectable(Duration::from_secs(0)));
    }

    #[test]
    fn periodic_with_refs_held_is_not_collectable() {
        let mut meta = AssetMeta::new("a".into());
        meta.set_gc_method(GcMethod::Periodic);
        meta.acquire();
        assert!(!meta.is_collectable(Duration::from_secs(0)));
    }

    #[test]
    fn periodic_unreferenced_past_delay_is_collectable() {
        let mut meta = AssetMeta::new("a".into());
        meta.set_gc_method(GcMethod::Periodic);
        meta.acquire();
        meta.release();
        assert!(meta.is_collectable(Duration::from_secs(0)));
    }
}
