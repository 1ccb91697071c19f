//! Memoize-with-expiry wrapper for a [`ZipLocator`].
//!
//! Lookups are cached per ZIP code for a fixed time-to-live. Both hits and
//! misses are cached. The cache never changes what a lookup returns, only
//! how often the inner locator is asked.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use afford_map_geography_models::Coordinates;
use afford_map_housing_models::ZipCode;

use crate::locator::ZipLocator;

/// Default time-to-live for cached lookups.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct Entry {
    stored_at: Instant,
    value: Option<Coordinates>,
}

/// A [`ZipLocator`] that remembers answers for `ttl`.
///
/// Uses interior mutability and is not `Sync`.
pub struct CachedLocator<L> {
    inner: L,
    ttl: Duration,
    entries: RefCell<BTreeMap<ZipCode, Entry>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<L: ZipLocator> CachedLocator<L> {
    /// Wraps `inner` with the default 24 hour TTL.
    pub fn new(inner: L) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    /// Wraps `inner` with a custom TTL.
    pub fn with_ttl(inner: L, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RefCell::new(BTreeMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.get()
    }

    /// Number of lookups forwarded to the inner locator.
    pub fn misses(&self) -> u64 {
        self.misses.get()
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Returns the wrapped locator.
    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: ZipLocator> ZipLocator for CachedLocator<L> {
    fn locate(&self, zip: &ZipCode) -> Option<Coordinates> {
        if let Some(entry) = self.entries.borrow().get(zip)
            && entry.stored_at.elapsed() < self.ttl
        {
            self.hits.set(self.hits.get() + 1);
            return entry.value;
        }

        self.misses.set(self.misses.get() + 1);
        let value = self.inner.locate(zip);
        self.entries.borrow_mut().insert(
            zip.clone(),
            Entry {
                stored_at: Instant::now(),
                value,
            },
        );
        value
    }
}

#[cfg(test)]
mod tests {
    use crate::locator::StaticLocator;

    use super::*;

    struct Counting {
        inner: StaticLocator,
        calls: Cell<u32>,
    }

    impl ZipLocator for Counting {
        fn locate(&self, zip: &ZipCode) -> Option<Coordinates> {
            self.calls.set(self.calls.get() + 1);
            self.inner.locate(zip)
        }
    }

    fn counting() -> Counting {
        let mut inner = StaticLocator::new();
        inner.insert(ZipCode::parse("30301").unwrap(), 33.75, -84.39);
        Counting {
            inner,
            calls: Cell::new(0),
        }
    }

    #[test]
    fn caches_hits_and_misses() {
        let cached = CachedLocator::new(counting());
        let known = ZipCode::parse("30301").unwrap();
        let unknown = ZipCode::parse("30399").unwrap();

        for _ in 0..3 {
            assert!(cached.locate(&known).is_some());
            assert!(cached.locate(&unknown).is_none());
        }
        assert_eq!(cached.misses(), 2);
        assert_eq!(cached.hits(), 4);
        assert_eq!(cached.into_inner().calls.get(), 2);
    }

    #[test]
    fn expired_entries_are_refetched() {
        let cached = CachedLocator::with_ttl(counting(), Duration::ZERO);
        let known = ZipCode::parse("30301").unwrap();
        cached.locate(&known);
        cached.locate(&known);
        assert_eq!(cached.misses(), 2);
        assert_eq!(cached.hits(), 0);
    }

    #[test]
    fn results_match_uncached() {
        let plain = counting();
        let cached = CachedLocator::new(counting());
        for raw in ["30301", "30399", "30301"] {
            let zip = ZipCode::parse(raw).unwrap();
            assert_eq!(cached.locate(&zip), plain.locate(&zip));
        }
    }

    #[test]
    fn clear_forgets_entries() {
        let cached = CachedLocator::new(counting());
        let known = ZipCode::parse("30301").unwrap();
        cached.locate(&known);
        cached.clear();
        cached.locate(&known);
        assert_eq!(cached.misses(), 2);
    }
}
