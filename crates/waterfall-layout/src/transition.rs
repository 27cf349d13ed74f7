//! Animated transitions between two layouts.
//!
//! A transition never mutates either end: it reads a frozen set of source
//! frames and a shared target layout, and produces interpolated frames for
//! any point in time. Items present only in the target fade in at their
//! final frame; items present only in the source fade out where they were.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use waterfall_core::Animation;

use crate::bounds::Bounds;
use crate::grid::GridLayout;

/// Frames of every visible item, in drawing order.
pub type FrameSet<K> = IndexMap<K, AnimatedFrame>;

/// A frame with the opacity it is drawn at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedFrame {
    pub bounds: Bounds,
    /// 0.0 (invisible) to 1.0 (opaque)
    pub opacity: f64,
}

impl AnimatedFrame {
    /// A fully opaque frame.
    pub fn settled(bounds: Bounds) -> Self {
        Self { bounds, opacity: 1.0 }
    }
}

/// Interpolation from one set of frames to a new layout.
#[derive(Debug, Clone)]
pub struct Transition<K> {
    from: FrameSet<K>,
    to: Arc<GridLayout<K>>,
    animation: Animation,
    started_at: Duration,
}

impl<K: Hash + Eq + Clone> Transition<K> {
    /// Start animating from `from` to `to` at host time `started_at`.
    pub fn new(
        from: FrameSet<K>,
        to: Arc<GridLayout<K>>,
        animation: Animation,
        started_at: Duration,
    ) -> Self {
        Self { from, to, animation, started_at }
    }

    pub fn target(&self) -> &Arc<GridLayout<K>> {
        &self.to
    }

    pub fn animation(&self) -> Animation {
        self.animation
    }

    /// Eased progress at host time `now`.
    pub fn progress(&self, now: Duration) -> f64 {
        self.animation.progress(now.saturating_sub(self.started_at))
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        self.animation.is_finished(now.saturating_sub(self.started_at))
    }

    /// Interpolated frames at host time `now`.
    ///
    /// Target items come first in target order, followed by departing
    /// items that are still visible.
    pub fn frames_at(&self, now: Duration) -> FrameSet<K> {
        let t = self.progress(now);
        let mut frames: FrameSet<K> = self
            .to
            .frames()
            .map(|(id, target)| {
                let frame = match self.from.get(id) {
                    Some(source) => AnimatedFrame {
                        bounds: source.bounds.lerp(target, t),
                        opacity: lerp(source.opacity, 1.0, t),
                    },
                    None => AnimatedFrame { bounds: *target, opacity: t },
                };
                (id.clone(), frame)
            })
            .collect();

        for (id, source) in &self.from {
            if frames.contains_key(id) {
                continue;
            }
            let opacity = source.opacity * (1.0 - t);
            if opacity > 0.0 {
                frames.insert(id.clone(), AnimatedFrame { bounds: source.bounds, opacity });
            }
        }
        frames
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placer::ColumnPlacer;
    use waterfall_core::{GridStyle, ScrollOptions, Viewport};

    fn layout(columns: usize, items: &[(&'static str, f64)]) -> Arc<GridLayout<&'static str>> {
        let placer = ColumnPlacer::new(columns, 0.0);
        let viewport = Viewport::new(200.0, 400.0);
        Arc::new(GridLayout::resolve(
            placer.place(items.iter().copied()),
            placer.column_width(viewport.width),
            viewport,
            &GridStyle::new(columns).with_spacing(0.0),
            ScrollOptions::default(),
        ))
    }

    fn transition() -> Transition<&'static str> {
        let before = layout(1, &[("a", 10.0), ("gone", 10.0)]);
        let after = layout(2, &[("a", 10.0), ("new", 10.0)]);
        Transition::new(
            before.settled_frames(),
            after,
            Animation::linear(Duration::from_secs(1)),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_starts_at_source_frames() {
        let frames = transition().frames_at(Duration::from_secs(5));

        assert_eq!(frames["a"], AnimatedFrame::settled(Bounds::new(0.0, 0.0, 200.0, 10.0)));
        assert_eq!(frames["gone"].opacity, 1.0);
        assert!(!frames.contains_key("new") || frames["new"].opacity == 0.0);
    }

    #[test]
    fn test_midway() {
        let frames = transition().frames_at(Duration::from_millis(5500));

        assert_eq!(frames["a"].bounds, Bounds::new(0.0, 0.0, 150.0, 10.0));
        assert!((frames["new"].opacity - 0.5).abs() < 1e-9);
        assert_eq!(frames["new"].bounds, Bounds::new(100.0, 0.0, 100.0, 10.0));
        assert!((frames["gone"].opacity - 0.5).abs() < 1e-9);
        assert_eq!(frames["gone"].bounds, Bounds::new(0.0, 10.0, 200.0, 10.0));
    }

    #[test]
    fn test_settles_on_target() {
        let transition = transition();
        let end = Duration::from_secs(6);
        let frames = transition.frames_at(end);

        assert!(transition.is_finished(end));
        assert!(!frames.contains_key("gone"));
        assert_eq!(frames, transition.target().settled_frames());
    }

    #[test]
    fn test_time_before_start_clamps() {
        let transition = transition();
        assert_eq!(transition.progress(Duration::ZERO), 0.0);
        assert!(!transition.is_finished(Duration::ZERO));
    }
}
