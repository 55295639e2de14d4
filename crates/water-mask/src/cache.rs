//! LRU cache for decoded raster tiles.

use std::num::NonZeroUsize;

use lru::LruCache;

/// Cache key for a tile: integer tile-grid coordinates
/// `(pixel_x / tile_size, pixel_y / tile_size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub tile_x: u32,
    pub tile_y: u32,
}

impl TileKey {
    pub fn new(tile_x: u32, tile_y: u32) -> Self {
        Self { tile_x, tile_y }
    }
}

impl std::fmt::Display for TileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.tile_x, self.tile_y)
    }
}

/// A decoded tile: `tile_size * tile_size` classification bytes, row-major,
/// zero-padded past the raster's right/bottom edge.
pub type Tile = Vec<u8>;

/// Cache statistics.
///
/// Counters are plain integers: each cache belongs to a single worker, so
/// no synchronization is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

/// LRU cache of decoded tiles, bounded by entry count.
///
/// Holds at most `capacity` tiles; inserting past capacity evicts exactly
/// the least-recently-used entry. `get` promotes the accessed key to
/// most-recently-used.
pub struct TileCache {
    cache: LruCache<TileKey, Tile>,
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl TileCache {
    /// Create a cache holding at most `max_tiles` entries.
    ///
    /// A zero capacity is clamped to one entry; `MaskConfig::validate`
    /// rejects it earlier for engine-constructed caches.
    pub fn new(max_tiles: usize) -> Self {
        let capacity = max_tiles.max(1);
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap()),
            capacity,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Check if a key is cached without updating the recency order.
    pub fn contains(&self, key: &TileKey) -> bool {
        self.cache.contains(key)
    }

    /// Get a tile, promoting it to most-recently-used on a hit.
    pub fn get(&mut self, key: &TileKey) -> Option<&Tile> {
        if let Some(tile) = self.cache.get(key) {
            self.hits += 1;
            Some(tile)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Insert a tile, evicting the least-recently-used entry if the cache
    /// is at capacity. The new key becomes most-recently-used.
    pub fn insert(&mut self, key: TileKey, tile: Tile) {
        if let Some((evicted, _)) = self.cache.push(key, tile) {
            if evicted != key {
                self.evictions += 1;
            }
        }
    }

    /// Get the tile for `key`, loading it with `load` on a miss.
    ///
    /// This packages the check-then-load-then-insert protocol: the loader
    /// runs only when the key is absent, and a load error leaves the cache
    /// unchanged.
    pub fn get_or_load<E>(
        &mut self,
        key: TileKey,
        load: impl FnOnce() -> std::result::Result<Tile, E>,
    ) -> std::result::Result<&Tile, E> {
        if self.cache.contains(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
            let tile = load()?;
            self.insert(key, tile);
        }
        // The key is present by now; the fallback never runs.
        Ok(self.cache.get_or_insert(key, Tile::default))
    }

    /// Number of cached tiles.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True when no tiles are cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Maximum number of tiles the cache can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get cache statistics.
    pub fn stats(&self) -> TileCacheStats {
        TileCacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entries: self.cache.len(),
        }
    }

    /// Clear all entries. Counters are preserved.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(value: u8) -> Tile {
        vec![value; 4]
    }

    #[test]
    fn test_insert_and_get() {
        let mut cache = TileCache::new(8);
        let key = TileKey::new(0, 0);

        assert!(!cache.contains(&key));
        assert!(cache.get(&key).is_none());

        cache.insert(key, tile(7));
        assert!(cache.contains(&key));
        assert_eq!(cache.get(&key), Some(&tile(7)));
    }

    #[test]
    fn test_capacity_bound_and_lru_eviction() {
        let mut cache = TileCache::new(3);

        for i in 0..10 {
            cache.insert(TileKey::new(i, 0), tile(i as u8));
            assert!(cache.len() <= 3);
        }

        assert_eq!(cache.len(), 3);
        // Only the three most recent keys survive.
        assert!(cache.contains(&TileKey::new(7, 0)));
        assert!(cache.contains(&TileKey::new(8, 0)));
        assert!(cache.contains(&TileKey::new(9, 0)));
        assert!(!cache.contains(&TileKey::new(6, 0)));
        assert_eq!(cache.stats().evictions, 7);
    }

    #[test]
    fn test_get_promotes_against_eviction() {
        let mut cache = TileCache::new(2);
        let a = TileKey::new(0, 0);
        let b = TileKey::new(1, 0);
        let c = TileKey::new(2, 0);

        cache.insert(a, tile(0));
        cache.insert(b, tile(1));

        // Touch `a` so `b` becomes the LRU entry.
        assert!(cache.get(&a).is_some());
        cache.insert(c, tile(2));

        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
    }

    #[test]
    fn test_contains_does_not_promote() {
        let mut cache = TileCache::new(2);
        let a = TileKey::new(0, 0);
        let b = TileKey::new(1, 0);

        cache.insert(a, tile(0));
        cache.insert(b, tile(1));

        // `contains` must not refresh `a`; it stays the LRU entry.
        assert!(cache.contains(&a));
        cache.insert(TileKey::new(2, 0), tile(2));
        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));
    }

    #[test]
    fn test_get_or_load_loads_once() {
        let mut cache = TileCache::new(4);
        let key = TileKey::new(3, 5);
        let mut loads = 0;

        for _ in 0..3 {
            let t = cache
                .get_or_load(key, || -> Result<Tile, ()> {
                    loads += 1;
                    Ok(tile(9))
                })
                .unwrap();
            assert_eq!(t, &tile(9));
        }

        assert_eq!(loads, 1);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn test_get_or_load_error_leaves_cache_unchanged() {
        let mut cache = TileCache::new(4);
        let key = TileKey::new(0, 0);

        let result = cache.get_or_load(key, || Err("read failed"));
        assert_eq!(result, Err("read failed"));
        assert!(!cache.contains(&key));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats() {
        let mut cache = TileCache::new(4);
        let key = TileKey::new(0, 0);

        cache.insert(key, tile(1));
        cache.get(&key);
        cache.get(&TileKey::new(9, 9));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.evictions, 0);
    }
}
