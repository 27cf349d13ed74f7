//! Waterfall (masonry) layout for variable-height items.
//!
//! Items are distributed over a fixed number of columns, each going to the
//! currently shortest column. The result is a set of frames ready for a
//! renderer, plus optional animated transitions between passes.
//!
//! # Architecture
//!
//! 1. **Measurement**: the host reports item heights through [`Measure`]
//! 2. **Placement**: [`ColumnPlacer`] assigns columns and offsets, a pure
//!    function of the ordered heights, column count and spacing
//! 3. **Resolution**: [`GridLayout`] turns a placement into frames,
//!    applying padding and the scroll axis
//! 4. **Orchestration**: [`GridComposer`] schedules passes when items,
//!    viewport or style change, and animates between them
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use waterfall_core::{Environment, GridStyle, Viewport};
//! use waterfall_layout::GridComposer;
//!
//! let env = Environment::root().with_grid_style(GridStyle::new(2).with_spacing(10.0));
//! let mut grid = GridComposer::new(&env);
//! grid.set_items([1u32, 2, 3]);
//! grid.set_viewport(Viewport::new(210.0, 800.0));
//!
//! let mut measure = |id: &u32, width: f64| if *id == 1 { width * 2.0 } else { width };
//! let layout = grid.layout(&mut measure, Duration::ZERO).unwrap();
//!
//! // Item 3 lands in the right column, below item 2
//! let frame = layout.frame(&3).unwrap();
//! assert_eq!((frame.x, frame.y), (110.0, 110.0));
//! ```

mod bounds;
mod composer;
mod grid;
mod measure;
mod placer;
mod transition;

pub use bounds::Bounds;
pub use composer::{GridComposer, Phase, Trigger};
pub use grid::GridLayout;
pub use measure::{ItemMeasurement, Measure, MeasurementCache};
pub use placer::{ColumnHeights, ColumnPlacer, ColumnState, PlacedItem, Placement};
pub use transition::{AnimatedFrame, FrameSet, Transition};
