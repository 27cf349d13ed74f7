//! Greedy shortest-column-first placement.
//!
//! Items are visited in input order. Each one goes to the column whose
//! content is currently shortest, ties going to the leftmost column, and
//! sits directly below that column's last item. Spacing separates items
//! within a column; there is no spacing before a column's first item or
//! after its last.
//!
//! The heuristic is not height-optimal, only deterministic and
//! non-overlapping. One pass is O(n * c) for `n` items and `c` columns.

use std::hash::Hash;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{trace, warn};
use waterfall_core::{GridStyle, Orientation, Platform};

use crate::measure::{sanitize_length, ItemMeasurement, Measure};

/// Per-column heights, inline for typical column counts.
pub type ColumnHeights = SmallVec<[f64; 4]>;

/// Running state of one column during a placement pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnState {
    pub index: usize,
    /// Extent of the column's content, without trailing spacing
    pub height: f64,
    /// Number of items placed so far
    pub items: usize,
}

impl ColumnState {
    fn new(index: usize) -> Self {
        Self { index, height: 0.0, items: 0 }
    }

    /// Offset the next item would receive.
    pub fn next_offset(&self, spacing: f64) -> f64 {
        if self.items == 0 {
            0.0
        } else {
            self.height + spacing
        }
    }

    fn push(&mut self, height: f64, spacing: f64) -> f64 {
        let offset = self.next_offset(spacing);
        self.height = offset + height;
        self.items += 1;
        offset
    }
}

/// Where a single item landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedItem {
    /// Column index in `[0, column_count)`
    pub column: usize,
    /// Distance from the top of the column
    pub offset: f64,
    pub height: f64,
}

impl PlacedItem {
    /// Offset of the item's bottom edge.
    pub fn end(&self) -> f64 {
        self.offset + self.height
    }
}

/// Result of one placement pass, in input order and addressable by id.
#[derive(Debug, Clone)]
pub struct Placement<K> {
    items: IndexMap<K, PlacedItem>,
    column_heights: ColumnHeights,
    spacing: f64,
}

impl<K: Hash + Eq> Placement<K> {
    /// Placement of an item.
    pub fn get(&self, id: &K) -> Option<&PlacedItem> {
        self.items.get(id)
    }

    /// Column an item was assigned to.
    pub fn column_of(&self, id: &K) -> Option<usize> {
        self.items.get(id).map(|item| item.column)
    }

    pub fn contains(&self, id: &K) -> bool {
        self.items.contains_key(id)
    }

    /// All placements in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &PlacedItem)> {
        self.items.iter()
    }

    /// Items of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = (&K, &PlacedItem)> {
        // Input order within a column is already offset order.
        self.items.iter().filter(move |(_, item)| item.column == index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.column_heights.len()
    }

    /// Final content height of every column.
    pub fn column_heights(&self) -> &[f64] {
        &self.column_heights
    }

    /// Height of the tallest column.
    pub fn content_height(&self) -> f64 {
        self.column_heights.iter().copied().fold(0.0, f64::max)
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }
}

impl<K: Hash + Eq> PartialEq for Placement<K> {
    /// Equal when every item has the same placement, in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.spacing == other.spacing
            && self.column_heights == other.column_heights
            && self.items.iter().eq(other.items.iter())
    }
}

/// Assigns items to columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnPlacer {
    columns: usize,
    spacing: f64,
}

impl ColumnPlacer {
    /// # Panics
    ///
    /// Panics if `columns` is zero or `spacing` is negative or not finite.
    pub fn new(columns: usize, spacing: f64) -> Self {
        assert!(columns >= 1, "column count must be at least 1");
        assert!(
            spacing.is_finite() && spacing >= 0.0,
            "spacing must be finite and non-negative, got {spacing}"
        );
        Self { columns, spacing }
    }

    /// Placer for a style in the given orientation.
    pub fn for_style(style: &GridStyle, orientation: Orientation, platform: Platform) -> Self {
        Self::new(style.columns(orientation, platform), style.spacing())
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Width of one column when `available` is split into columns.
    pub fn column_width(&self, available: f64) -> f64 {
        let gaps = self.spacing * (self.columns - 1) as f64;
        sanitize_length((available - gaps) / self.columns as f64)
    }

    /// Place items with known heights, in order.
    ///
    /// Ids are expected to be unique; a repeated id keeps its first
    /// placement and the repeat is skipped.
    pub fn place<K, I>(&self, items: I) -> Placement<K>
    where
        K: Hash + Eq,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut columns: SmallVec<[ColumnState; 4]> =
            (0..self.columns).map(ColumnState::new).collect();
        let mut placed = IndexMap::new();
        let mut skipped = 0usize;

        for (id, height) in items {
            if placed.contains_key(&id) {
                skipped += 1;
                continue;
            }
            let height = sanitize_length(height);
            let column = shortest_column(&columns);
            let offset = columns[column].push(height, self.spacing);
            placed.insert(id, PlacedItem { column, offset, height });
        }

        if skipped > 0 {
            warn!(skipped, "duplicate item ids ignored during placement");
        }
        trace!(
            columns = self.columns,
            spacing = self.spacing,
            items = placed.len(),
            "placement pass complete"
        );

        Placement {
            items: placed,
            column_heights: columns.iter().map(|column| column.height).collect(),
            spacing: self.spacing,
        }
    }

    /// Place previously taken measurements, in order.
    pub fn place_measurements<K>(&self, measurements: &[ItemMeasurement<K>]) -> Placement<K>
    where
        K: Hash + Eq + Clone,
    {
        self.place(measurements.iter().map(|m| (m.id.clone(), m.height)))
    }

    /// Measure every item at this placer's column width, then place them.
    ///
    /// Returns `None` if any height is still pending; every item is still
    /// offered to the measurer so the host can size them all at once.
    pub fn place_measured<K, M>(
        &self,
        ids: &[K],
        available_width: f64,
        measurer: &mut M,
    ) -> Option<Placement<K>>
    where
        K: Hash + Eq + Clone,
        M: Measure<K>,
    {
        let column_width = self.column_width(available_width);
        let mut heights = Vec::with_capacity(ids.len());
        let mut pending = 0usize;
        for id in ids {
            match measurer.measure(id, column_width) {
                Some(height) => heights.push((id.clone(), height)),
                None => pending += 1,
            }
        }
        if pending > 0 {
            trace!(pending, "placement deferred until measurements arrive");
            return None;
        }
        Some(self.place(heights))
    }
}

/// Index of the shortest column, leftmost on ties.
fn shortest_column(columns: &[ColumnState]) -> usize {
    let mut index = 0;
    let mut best = columns.first().map_or(0.0, |column| column.height);
    for (i, column) in columns.iter().enumerate().skip(1) {
        if column.height < best {
            best = column.height;
            index = i;
        }
    }
    index
}
