//! Points and the memoized pairwise distance cache.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

/// A location in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

type PointKey = (OrderedFloat<f64>, OrderedFloat<f64>);

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance, uncached.
    #[inline]
    pub fn euclidean(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn key(&self) -> PointKey {
        (OrderedFloat(self.x), OrderedFloat(self.y))
    }
}

/// Memoized Euclidean distances keyed by unordered point pair.
///
/// The same pair is queried over and over while subsets and permutations are
/// evaluated, so every distance is computed once and kept for the lifetime of
/// the cache. Growth is quadratic in the number of distinct points seen.
///
/// Interior mutability is a `RefCell`, so a cache is confined to one thread;
/// a concurrent host needs one cache per thread.
#[derive(Debug, Clone, Default)]
pub struct DistanceCache {
    entries: RefCell<HashMap<(PointKey, PointKey), f64>>,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance between `a` and `b`, computed on first request.
    pub fn distance(&self, a: &Point, b: &Point) -> f64 {
        let (ka, kb) = (a.key(), b.key());
        let key = if ka <= kb { (ka, kb) } else { (kb, ka) };

        let cached = self.entries.borrow().get(&key).copied();
        if let Some(d) = cached {
            return d;
        }

        let d = a.euclidean(b);
        self.entries.borrow_mut().insert(key, d);
        d
    }

    /// Number of memoized pairs.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop every memoized distance.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
