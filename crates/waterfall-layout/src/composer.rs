//! Re-layout orchestration.
//!
//! [`GridComposer`] decides when a new placement pass is needed and runs it.
//! Any change to the item collection, the viewport, the style or an item's
//! content schedules a full pass; the next call to
//! [`GridComposer::layout`] measures, places and publishes the result.
//!
//! ```text
//! Idle -> Measuring -> Placing -> Rendered -> Idle
//!            ^  |                    |
//!            +--+  (pending heights) +--> Measuring (on trigger)
//! ```
//!
//! A pass is never partially visible: until it completes, callers keep
//! seeing the previous layout.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use waterfall_core::{Environment, GridStyle, Platform, ScrollOptions, Viewport};

use crate::grid::{cross_padding, GridLayout};
use crate::measure::{Measure, MeasurementCache};
use crate::placer::ColumnPlacer;
use crate::transition::{FrameSet, Transition};

/// Where the composer is in its layout cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing to do
    #[default]
    Idle,
    /// Collecting item heights
    Measuring,
    /// Assigning items to columns
    Placing,
    /// A fresh layout was published by the last pass
    Rendered,
}

/// Why a layout pass was scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First appearance
    Appear,
    /// Items inserted, removed or reordered
    Items,
    /// Available size or orientation changed
    Viewport,
    /// Style, scroll options or platform changed
    Style,
    /// An item's content changed and must be re-measured
    Content,
}

/// Drives placement passes for one grid.
#[derive(Debug)]
pub struct GridComposer<K> {
    style: GridStyle,
    scroll: ScrollOptions,
    platform: Platform,
    viewport: Option<Viewport>,
    items: Vec<K>,
    members: HashSet<K>,
    cache: MeasurementCache<K>,
    phase: Phase,
    pending: Option<Trigger>,
    current: Option<Arc<GridLayout<K>>>,
    transition: Option<Transition<K>>,
    passes: u64,
}

impl<K: Hash + Eq + Clone> GridComposer<K> {
    /// Composer configured from the nearest scope of `env`.
    pub fn new(env: &Environment<'_>) -> Self {
        Self {
            style: env.grid_style(),
            scroll: env.scroll_options(),
            platform: env.platform(),
            viewport: None,
            items: Vec::new(),
            members: HashSet::new(),
            cache: MeasurementCache::new(),
            phase: Phase::Idle,
            pending: Some(Trigger::Appear),
            current: None,
            transition: None,
            passes: 0,
        }
    }

    /// Pick up configuration changes from `env`.
    pub fn apply_environment(&mut self, env: &Environment<'_>) -> bool {
        let style = self.set_style(env.grid_style());
        let scroll = self.set_scroll_options(env.scroll_options());
        let platform = self.set_platform(env.platform());
        style || scroll || platform
    }

    /// Returns whether a pass was scheduled.
    pub fn set_style(&mut self, style: GridStyle) -> bool {
        if style == self.style {
            return false;
        }
        self.style = style;
        self.schedule(Trigger::Style);
        true
    }

    pub fn set_scroll_options(&mut self, scroll: ScrollOptions) -> bool {
        if scroll == self.scroll {
            return false;
        }
        // Column width now comes from the other axis.
        if scroll.direction != self.scroll.direction {
            self.cache.clear();
        }
        self.scroll = scroll;
        self.schedule(Trigger::Style);
        true
    }

    pub fn set_platform(&mut self, platform: Platform) -> bool {
        if platform == self.platform {
            return false;
        }
        self.platform = platform;
        self.schedule(Trigger::Style);
        true
    }

    /// Report the size available to the grid.
    ///
    /// Only a change of the extent split into columns, or of orientation,
    /// schedules a pass.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        let axis = self.scroll.direction;
        let changed = match self.viewport {
            None => true,
            Some(old) => {
                old.cross_extent(axis) != viewport.cross_extent(axis)
                    || old.orientation() != viewport.orientation()
            }
        };
        self.viewport = Some(viewport);
        if changed {
            self.schedule(Trigger::Viewport);
        }
        changed
    }

    /// Replace the item collection, in display order.
    pub fn set_items<I: IntoIterator<Item = K>>(&mut self, items: I) -> bool {
        let items: Vec<K> = items.into_iter().collect();
        if items == self.items {
            return false;
        }
        self.members = items.iter().cloned().collect();
        self.items = items;
        let members = &self.members;
        self.cache.retain(|id| members.contains(id));
        self.schedule(Trigger::Items);
        true
    }

    /// Mark an item's content as changed so it is measured again.
    pub fn invalidate(&mut self, id: &K) -> bool {
        if !self.members.contains(id) {
            return false;
        }
        self.cache.invalidate(id);
        self.schedule(Trigger::Content);
        true
    }

    fn schedule(&mut self, trigger: Trigger) {
        debug!(?trigger, phase = ?self.phase, "layout pass scheduled");
        self.pending.get_or_insert(trigger);
    }

    /// Run a pass if one is scheduled, and return the current layout.
    ///
    /// `now` is the host's clock, used to start and expire transitions.
    /// Returns the previous layout while heights are still pending, and
    /// `None` until a first pass has completed.
    pub fn layout<M: Measure<K>>(
        &mut self,
        measurer: &mut M,
        now: Duration,
    ) -> Option<Arc<GridLayout<K>>> {
        if self.transition.as_ref().is_some_and(|t| t.is_finished(now)) {
            self.transition = None;
        }

        let Some(trigger) = self.pending else {
            if self.phase == Phase::Rendered {
                self.phase = Phase::Idle;
            }
            return self.current.clone();
        };
        let Some(viewport) = self.viewport else {
            debug!(?trigger, "no viewport yet, layout deferred");
            return self.current.clone();
        };

        self.phase = Phase::Measuring;
        let axis = self.scroll.direction;
        let placer = ColumnPlacer::for_style(&self.style, viewport.orientation(), self.platform);
        let available = viewport.cross_extent(axis) - cross_padding(self.style.padding(), axis);
        let column_width = placer.column_width(available);

        let mut measurements = Vec::with_capacity(self.items.len());
        let mut waiting = 0usize;
        for id in &self.items {
            match self.cache.measure(id, column_width, measurer) {
                Some(measurement) => measurements.push(measurement),
                None => waiting += 1,
            }
        }
        if waiting > 0 {
            debug!(waiting, "layout pass waiting on measurements");
            return self.current.clone();
        }

        self.phase = Phase::Placing;
        let placement = placer.place_measurements(&measurements);
        let layout = Arc::new(GridLayout::resolve(
            placement,
            column_width,
            viewport,
            &self.style,
            self.scroll,
        ));
        self.passes += 1;

        let previous = self.current.replace(Arc::clone(&layout));
        let running = self.transition.take();
        self.transition = match (self.style.animation(), previous) {
            (Some(animation), Some(previous)) if !previous.same_frames(&layout) => {
                // Start from what is on screen, which may be mid-transition.
                let from = match &running {
                    Some(running) => running.frames_at(now),
                    None => previous.settled_frames(),
                };
                Some(Transition::new(from, Arc::clone(&layout), animation, now))
            }
            // Same frames as the running target: let it finish.
            (Some(_), Some(_)) => running,
            _ => None,
        };

        self.pending = None;
        self.phase = Phase::Rendered;
        debug!(
            ?trigger,
            pass = self.passes,
            columns = placer.columns(),
            items = layout.len(),
            animated = self.transition.is_some(),
            "layout pass complete"
        );
        Some(layout)
    }

    /// Frames to draw at host time `now`.
    pub fn frames(&self, now: Duration) -> FrameSet<K> {
        match (&self.transition, &self.current) {
            (Some(transition), _) if !transition.is_finished(now) => transition.frames_at(now),
            (_, Some(current)) => current.settled_frames(),
            _ => FrameSet::default(),
        }
    }

    /// Whether frames are still changing at `now`.
    pub fn is_animating(&self, now: Duration) -> bool {
        self.transition.as_ref().is_some_and(|t| !t.is_finished(now))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Reason for the scheduled pass, if any.
    pub fn pending(&self) -> Option<Trigger> {
        self.pending
    }

    /// Last published layout.
    pub fn current(&self) -> Option<&Arc<GridLayout<K>>> {
        self.current.as_ref()
    }

    pub fn transition(&self) -> Option<&Transition<K>> {
        self.transition.as_ref()
    }

    pub fn style(&self) -> &GridStyle {
        &self.style
    }

    pub fn items(&self) -> &[K] {
        &self.items
    }

    /// Number of completed passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Bounds;

    fn still(style: GridStyle) -> GridComposer<u32> {
        let env = Environment::root().with_grid_style(style.with_animation(None));
        GridComposer::new(&env)
    }

    fn height_of(id: &u32, _: f64) -> f64 {
        *id as f64 * 10.0
    }

    #[test]
    fn test_waits_for_viewport() {
        let mut composer = still(GridStyle::new(2));
        composer.set_items([1, 2]);

        assert!(composer.layout(&mut height_of, Duration::ZERO).is_none());
        assert_eq!(composer.phase(), Phase::Idle);
        assert_eq!(composer.pending(), Some(Trigger::Appear));
    }

    #[test]
    fn test_cycle_through_phases() {
        let mut composer = still(GridStyle::new(2).with_spacing(0.0));
        composer.set_items([1, 2, 1 + 2]);
        composer.set_viewport(Viewport::new(200.0, 400.0));

        let layout = composer.layout(&mut height_of, Duration::ZERO).unwrap();
        assert_eq!(composer.phase(), Phase::Rendered);
        assert_eq!(composer.passes(), 1);
        assert_eq!(layout.frame(&3), Some(Bounds::new(0.0, 10.0, 100.0, 30.0)));

        // No trigger: same snapshot, back to idle
        let again = composer.layout(&mut height_of, Duration::ZERO).unwrap();
        assert!(Arc::ptr_eq(&layout, &again));
        assert_eq!(composer.phase(), Phase::Idle);
        assert_eq!(composer.passes(), 1);
    }

    #[test]
    fn test_unchanged_inputs_do_not_trigger() {
        let mut composer = still(GridStyle::new(2));
        composer.set_items([1, 2]);
        composer.set_viewport(Viewport::new(200.0, 400.0));
        composer.layout(&mut height_of, Duration::ZERO);

        assert!(!composer.set_items([1, 2]));
        assert!(!composer.set_style(GridStyle::new(2).with_animation(None)));
        // Height change without orientation change does not matter
        assert!(!composer.set_viewport(Viewport::new(200.0, 500.0)));
        assert!(composer.pending().is_none());
    }

    #[test]
    fn test_each_trigger_schedules_a_pass() {
        let mut composer = still(GridStyle::new(2));
        composer.set_items([1, 2]);
        composer.set_viewport(Viewport::new(200.0, 400.0));
        composer.layout(&mut height_of, Duration::ZERO);

        assert!(composer.set_items([2, 1]));
        assert_eq!(composer.pending(), Some(Trigger::Items));
        composer.layout(&mut height_of, Duration::ZERO);

        assert!(composer.set_viewport(Viewport::new(300.0, 400.0)));
        assert_eq!(composer.pending(), Some(Trigger::Viewport));
        composer.layout(&mut height_of, Duration::ZERO);

        assert!(composer.invalidate(&1));
        assert_eq!(composer.pending(), Some(Trigger::Content));
        composer.layout(&mut height_of, Duration::ZERO);

        assert!(!composer.invalidate(&99));
        assert!(composer.set_scroll_options(ScrollOptions::horizontal()));
        assert_eq!(composer.pending(), Some(Trigger::Style));
        composer.layout(&mut height_of, Duration::ZERO);

        assert_eq!(composer.passes(), 5);
    }

    #[test]
    fn test_orientation_switch_changes_columns() {
        let mut composer = still(GridStyle::with_orientations(2, 3));
        composer.set_items(0..6);
        composer.set_viewport(Viewport::new(300.0, 600.0));
        let portrait = composer.layout(&mut height_of, Duration::ZERO).unwrap();
        assert_eq!(portrait.column_count(), 2);

        composer.set_viewport(Viewport::new(600.0, 300.0));
        let landscape = composer.layout(&mut height_of, Duration::ZERO).unwrap();
        assert_eq!(landscape.column_count(), 3);

        // A platform without orientation keeps the portrait count
        composer.set_platform(Platform::FIXED);
        let fixed = composer.layout(&mut height_of, Duration::ZERO).unwrap();
        assert_eq!(fixed.column_count(), 2);
    }

    #[test]
    fn test_style_change_replaces_placement() {
        let mut composer = still(GridStyle::new(2).with_spacing(0.0));
        composer.set_items(1..=6);
        composer.set_viewport(Viewport::new(300.0, 600.0));
        let before = composer.layout(&mut height_of, Duration::ZERO).unwrap();

        composer.set_style(GridStyle::new(3).with_spacing(0.0).with_animation(None));
        let after = composer.layout(&mut height_of, Duration::ZERO).unwrap();

        assert_eq!(before.column_count(), 2);
        assert_eq!(after.column_count(), 3);
        assert_ne!(before.placement(), after.placement());
        assert_eq!(after.placement().len(), 6);
        assert_eq!(after.column_width(), 100.0);
    }

    #[test]
    fn test_removed_items_drop_measurements() {
        let mut composer = still(GridStyle::new(1));
        composer.set_items([1, 2, 3]);
        composer.set_viewport(Viewport::new(100.0, 400.0));
        composer.layout(&mut height_of, Duration::ZERO);

        composer.set_items([1, 3]);
        let layout = composer.layout(&mut height_of, Duration::ZERO).unwrap();
        assert_eq!(layout.len(), 2);
        assert!(layout.frame(&2).is_none());
        assert_eq!(composer.cache.len(), 2);
    }

    /// Heights arrive only after `ready` is set.
    struct Deferred {
        ready: bool,
    }

    impl Measure<u32> for Deferred {
        fn measure(&mut self, id: &u32, _: f64) -> Option<f64> {
            self.ready.then_some(*id as f64)
        }
    }

    #[test]
    fn test_pending_measurements_keep_previous_layout() {
        let mut composer = still(GridStyle::new(2));
        composer.set_items([1, 2]);
        composer.set_viewport(Viewport::new(200.0, 400.0));
        let first = composer.layout(&mut height_of, Duration::ZERO).unwrap();

        composer.set_items([1, 2, 3]);
        let mut measurer = Deferred { ready: false };
        let shown = composer.layout(&mut measurer, Duration::ZERO).unwrap();
        assert!(Arc::ptr_eq(&first, &shown));
        assert_eq!(composer.phase(), Phase::Measuring);
        assert_eq!(composer.pending(), Some(Trigger::Items));

        measurer.ready = true;
        let next = composer.layout(&mut measurer, Duration::ZERO).unwrap();
        assert_eq!(next.len(), 3);
        assert_eq!(composer.phase(), Phase::Rendered);
    }

    #[test]
    fn test_animated_change_interpolates() {
        let style = GridStyle::new(1)
            .with_spacing(0.0)
            .with_animation(Some(waterfall_core::Animation::linear(Duration::from_secs(1))));
        let env = Environment::root().with_grid_style(style);
        let mut composer = GridComposer::new(&env);
        composer.set_items([1u32, 2]);
        composer.set_viewport(Viewport::new(100.0, 400.0));

        // First appearance is not animated
        composer.layout(&mut height_of, Duration::ZERO);
        assert!(!composer.is_animating(Duration::ZERO));

        composer.set_items([2, 1]);
        let start = Duration::from_secs(10);
        composer.layout(&mut height_of, start);
        assert!(composer.is_animating(start));

        // Item 1 moves from the top (y = 0) to below item 2 (y = 20)
        let midway = composer.frames(start + Duration::from_millis(500));
        assert_eq!(midway[&1].bounds.y, 10.0);

        let end = start + Duration::from_secs(1);
        assert!(!composer.is_animating(end));
        assert_eq!(composer.frames(end)[&1].bounds.y, 20.0);
    }

    fn animated(items: [u32; 2]) -> GridComposer<u32> {
        let style = GridStyle::new(1)
            .with_spacing(0.0)
            .with_animation(Some(waterfall_core::Animation::linear(Duration::from_secs(1))));
        let env = Environment::root().with_grid_style(style);
        let mut composer = GridComposer::new(&env);
        composer.set_items(items);
        composer.set_viewport(Viewport::new(100.0, 400.0));
        composer.layout(&mut height_of, Duration::ZERO);
        composer
    }

    #[test]
    fn test_unchanged_pass_keeps_running_transition() {
        let mut composer = animated([1, 2]);
        let start = Duration::from_secs(10);
        composer.set_items([2, 1]);
        composer.layout(&mut height_of, start);

        let now = start + Duration::from_millis(250);
        assert_eq!(composer.frames(now)[&1].bounds.y, 5.0);

        // Re-measuring gives the same heights, so nothing should jump
        assert!(composer.invalidate(&1));
        composer.layout(&mut height_of, now);
        assert_eq!(composer.passes(), 3);
        assert!(composer.is_animating(now));
        assert_eq!(composer.frames(now)[&1].bounds.y, 5.0);
        assert_eq!(composer.frames(start + Duration::from_millis(500))[&1].bounds.y, 10.0);
    }

    #[test]
    fn test_retarget_starts_from_frames_on_screen() {
        let mut composer = animated([1, 2]);
        let start = Duration::from_secs(10);
        composer.set_items([2, 1]);
        composer.layout(&mut height_of, start);

        // Halfway down, item 1 is sent back to the top
        let turn = start + Duration::from_millis(500);
        assert_eq!(composer.frames(turn)[&1].bounds.y, 10.0);
        composer.set_items([1, 2]);
        composer.layout(&mut height_of, turn);

        assert!(composer.is_animating(turn));
        assert_eq!(composer.frames(turn)[&1].bounds.y, 10.0);
        assert_eq!(composer.frames(turn + Duration::from_millis(500))[&1].bounds.y, 5.0);
        let end = turn + Duration::from_secs(1);
        assert!(!composer.is_animating(end));
        assert_eq!(composer.frames(end)[&1].bounds.y, 0.0);
    }

    #[test]
    fn test_invalidate_follows_latest_items() {
        let mut composer = still(GridStyle::new(2));
        composer.set_items([1, 2, 3]);
        composer.set_items([3, 4]);

        assert!(!composer.invalidate(&1));
        assert!(composer.invalidate(&4));
    }

    #[test]
    fn test_unanimated_change_applies_immediately() {
        let mut composer = still(GridStyle::new(1).with_spacing(0.0));
        composer.set_items([1, 2]);
        composer.set_viewport(Viewport::new(100.0, 400.0));
        composer.layout(&mut height_of, Duration::ZERO);

        composer.set_items([2, 1]);
        composer.layout(&mut height_of, Duration::ZERO);
        assert!(composer.transition().is_none());
        assert_eq!(composer.frames(Duration::ZERO)[&1].bounds.y, 20.0);
    }

    #[test]
    fn test_apply_environment() {
        let mut composer = still(GridStyle::new(2));
        let outer = Environment::root().with_grid_style(GridStyle::new(2).with_animation(None));
        assert!(!composer.apply_environment(&outer));

        let inner = outer.child().with_grid_style(GridStyle::new(4));
        assert!(composer.apply_environment(&inner));
        assert_eq!(composer.style().columns_in_portrait(), 4);
    }
}
