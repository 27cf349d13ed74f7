//! Style configuration for waterfall grids.
//!
//! This crate holds the value types every other part of the engine agrees
//! on: the immutable [`GridStyle`], the [`Environment`] scope it travels
//! through, and small geometry and platform types.
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for the style types and
//!   [`GridStyle::from_json`].

pub mod environment;
pub mod errors;
pub mod style;
pub mod types;

pub use environment::Environment;
pub use errors::StyleError;
pub use style::{Animation, Background, Curve, GridStyle, ScrollOptions};
pub use types::{Axis, Color, EdgeInsets, Orientation, Platform, Viewport};
