//! Item measurement.
//!
//! Heights come from the host's rendering system through [`Measure`]. The
//! engine only assumes that a measurer is idempotent for an unchanged item
//! measured at an unchanged width. A measurer that returns different heights
//! for the same content makes placements unstable between passes, and the
//! grid will visibly jitter on re-layout.

use std::collections::HashMap;
use std::hash::Hash;

/// Widths closer than this are the same width for caching purposes.
const WIDTH_EPSILON: f64 = 1e-6;

/// Produces the rendered height of an item laid out at a column width.
pub trait Measure<K> {
    /// Height of `id` at `column_width`, or `None` while the host is still
    /// sizing it asynchronously.
    fn measure(&mut self, id: &K, column_width: f64) -> Option<f64>;
}

impl<K, F> Measure<K> for F
where
    F: FnMut(&K, f64) -> f64,
{
    fn measure(&mut self, id: &K, column_width: f64) -> Option<f64> {
        Some(self(id, column_width))
    }
}

/// Measured height of an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemMeasurement<K> {
    pub id: K,
    /// Intrinsic height, never negative
    pub height: f64,
    /// Column width the height was measured at
    pub column_width: f64,
}

impl<K> ItemMeasurement<K> {
    /// Record a measurement. Negative and non-finite heights are stored as zero.
    pub fn new(id: K, height: f64, column_width: f64) -> Self {
        Self {
            id,
            height: sanitize_length(height),
            column_width: sanitize_length(column_width),
        }
    }

    /// Whether this measurement is still valid at `column_width`.
    pub fn is_valid_at(&self, column_width: f64) -> bool {
        (self.column_width - column_width).abs() < WIDTH_EPSILON
    }
}

pub(crate) fn sanitize_length(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Measurements kept between placement passes.
#[derive(Debug, Clone)]
pub struct MeasurementCache<K> {
    entries: HashMap<K, ItemMeasurement<K>>,
}

impl<K> Default for MeasurementCache<K> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<K: Hash + Eq + Clone> MeasurementCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached measurement of `id`, if it was taken at `column_width`.
    pub fn get(&self, id: &K, column_width: f64) -> Option<&ItemMeasurement<K>> {
        self.entries
            .get(id)
            .filter(|measurement| measurement.is_valid_at(column_width))
    }

    /// Cached measurement, or a fresh one from `measurer`.
    ///
    /// Returns `None` when the measurer has no height yet.
    pub fn measure<M: Measure<K>>(
        &mut self,
        id: &K,
        column_width: f64,
        measurer: &mut M,
    ) -> Option<ItemMeasurement<K>> {
        if let Some(cached) = self.get(id, column_width) {
            return Some(cached.clone());
        }
        let height = measurer.measure(id, column_width)?;
        let measurement = ItemMeasurement::new(id.clone(), height, column_width);
        self.entries.insert(id.clone(), measurement.clone());
        Some(measurement)
    }

    /// Forget the height of an item whose content changed.
    pub fn invalidate(&mut self, id: &K) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Drop measurements of items no longer in the collection.
    pub fn retain<F: FnMut(&K) -> bool>(&mut self, mut keep: F) {
        self.entries.retain(|id, _| keep(id));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_closure_is_a_measurer() {
        let mut measurer = |id: &u32, width: f64| *id as f64 + width;
        assert_eq!(measurer.measure(&3, 10.0), Some(13.0));
    }

    #[test]
    fn test_measurement_sanitizes_height() {
        assert_eq!(ItemMeasurement::new(1, -5.0, 10.0).height, 0.0);
        assert_eq!(ItemMeasurement::new(1, f64::NAN, 10.0).height, 0.0);
        assert_eq!(ItemMeasurement::new(1, 12.5, 10.0).height, 12.5);
    }

    #[test]
    fn test_cache_reuses_measurements_at_same_width() {
        let calls = Cell::new(0);
        let mut measurer = |_: &u32, _: f64| {
            calls.set(calls.get() + 1);
            40.0
        };
        let mut cache = MeasurementCache::new();

        let first = cache.measure(&7, 100.0, &mut measurer).unwrap();
        let second = cache.measure(&7, 100.0, &mut measurer).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);

        // A new width invalidates the cached height
        cache.measure(&7, 50.0, &mut measurer).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_invalidate_and_retain() {
        let mut measurer = |_: &u32, _: f64| 10.0;
        let mut cache = MeasurementCache::new();
        for id in 0..4 {
            cache.measure(&id, 100.0, &mut measurer);
        }
        assert_eq!(cache.len(), 4);

        assert!(cache.invalidate(&0));
        assert!(!cache.invalidate(&0));
        cache.retain(|id| *id != 3);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&1, 100.0).is_some());
        assert!(cache.get(&3, 100.0).is_none());
    }

    struct Pending;

    impl Measure<u32> for Pending {
        fn measure(&mut self, _: &u32, _: f64) -> Option<f64> {
            None
        }
    }

    #[test]
    fn test_pending_measurement_is_not_cached() {
        let mut cache = MeasurementCache::new();
        assert!(cache.measure(&1, 100.0, &mut Pending).is_none());
        assert!(cache.is_empty());
    }
}
