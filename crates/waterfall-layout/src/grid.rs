//! Resolved grid layout: placements turned into frames.

use std::hash::Hash;

use glam::DVec2;
use indexmap::IndexMap;
use waterfall_core::{Axis, Background, EdgeInsets, GridStyle, Orientation, ScrollOptions, Viewport};

use crate::bounds::Bounds;
use crate::placer::Placement;
use crate::transition::{AnimatedFrame, FrameSet};

/// Padding across the scroll axis, which eats into the column extent.
pub(crate) fn cross_padding(padding: EdgeInsets, axis: Axis) -> f64 {
    match axis {
        Axis::Vertical => padding.horizontal(),
        Axis::Horizontal => padding.vertical(),
    }
}

/// One finished layout pass, ready to render.
#[derive(Debug, Clone)]
pub struct GridLayout<K> {
    placement: Placement<K>,
    frames: IndexMap<K, Bounds>,
    column_width: f64,
    content_size: DVec2,
    orientation: Orientation,
    scroll: ScrollOptions,
    background: Background,
}

impl<K: Hash + Eq + Clone> GridLayout<K> {
    /// Turn a placement into frames inside `viewport`.
    ///
    /// With a vertical scroll axis, columns run top to bottom from the
    /// leading edge. With a horizontal axis the same placement is
    /// transposed: columns become rows and offsets run towards the
    /// trailing edge.
    pub fn resolve(
        placement: Placement<K>,
        column_width: f64,
        viewport: Viewport,
        style: &GridStyle,
        scroll: ScrollOptions,
    ) -> Self {
        let padding = style.padding();
        let spacing = placement.spacing();
        // Origin in (cross, main) terms before any transposition.
        let (cross_start, main_start) = match scroll.direction {
            Axis::Vertical => (padding.leading, padding.top),
            Axis::Horizontal => (padding.top, padding.leading),
        };

        let frames = placement
            .iter()
            .map(|(id, item)| {
                let cross = cross_start + item.column as f64 * (column_width + spacing);
                let frame = Bounds::new(cross, main_start + item.offset, column_width, item.height);
                let frame = match scroll.direction {
                    Axis::Vertical => frame,
                    Axis::Horizontal => frame.transposed(),
                };
                (id.clone(), frame)
            })
            .collect();

        let main_extent = placement.content_height();
        let content_size = match scroll.direction {
            Axis::Vertical => DVec2::new(viewport.width, padding.vertical() + main_extent),
            Axis::Horizontal => DVec2::new(padding.horizontal() + main_extent, viewport.height),
        };

        Self {
            placement,
            frames,
            column_width,
            content_size,
            orientation: viewport.orientation(),
            scroll,
            background: style.background(),
        }
    }

    /// Frame of an item.
    pub fn frame(&self, id: &K) -> Option<Bounds> {
        self.frames.get(id).copied()
    }

    /// Frames in input order.
    pub fn frames(&self) -> impl Iterator<Item = (&K, &Bounds)> {
        self.frames.iter()
    }

    /// Frames at rest, fully opaque.
    pub fn settled_frames(&self) -> FrameSet<K> {
        self.frames
            .iter()
            .map(|(id, bounds)| (id.clone(), AnimatedFrame::settled(*bounds)))
            .collect()
    }

    /// Whether both layouts put every item in the same place.
    pub fn same_frames(&self, other: &GridLayout<K>) -> bool {
        self.frames.iter().eq(other.frames.iter())
    }

    pub fn placement(&self) -> &Placement<K> {
        &self.placement
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of columns (rows, for a horizontal grid).
    pub fn column_count(&self) -> usize {
        self.placement.column_count()
    }

    /// Cross-axis extent of one column.
    pub fn column_width(&self) -> f64 {
        self.column_width
    }

    /// Size of the scrollable content, padding included.
    pub fn content_size(&self) -> DVec2 {
        self.content_size
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn scroll_options(&self) -> ScrollOptions {
        self.scroll
    }

    pub fn background(&self) -> Background {
        self.background
    }
}
