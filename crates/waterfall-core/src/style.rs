//! Grid style configuration.
//!
//! A [`GridStyle`] is built once, then handed down to layout through an
//! [`Environment`](crate::Environment). Builders consume and return the
//! style, so a finished value is never mutated in place.
//!
//! Constructors that take values from code panic on invalid input: a zero
//! column count is a programming error, not a runtime condition. Values
//! coming from data go through the `try_*` constructors or
//! [`GridStyle::validate`], which return a [`StyleError`].

use std::time::Duration;

use crate::errors::StyleError;
use crate::types::{Axis, Color, EdgeInsets, Orientation, Platform};

/// Default number of columns in both orientations.
pub const DEFAULT_COLUMNS: usize = 2;
/// Default distance between adjacent items.
pub const DEFAULT_SPACING: f64 = 8.0;

/// Timing curve of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Curve {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

impl Curve {
    /// Map linear progress in `[0, 1]` onto the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::EaseIn => t * t,
            Curve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Curve::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Animation applied when the grid's data or geometry changes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Animation {
    pub curve: Curve,
    pub duration: Duration,
    pub delay: Duration,
}

impl Default for Animation {
    fn default() -> Self {
        Self::ease_in_out(Duration::from_millis(350))
    }
}

impl Animation {
    pub fn linear(duration: Duration) -> Self {
        Self::new(Curve::Linear, duration)
    }

    pub fn ease_in(duration: Duration) -> Self {
        Self::new(Curve::EaseIn, duration)
    }

    pub fn ease_out(duration: Duration) -> Self {
        Self::new(Curve::EaseOut, duration)
    }

    pub fn ease_in_out(duration: Duration) -> Self {
        Self::new(Curve::EaseInOut, duration)
    }

    pub fn new(curve: Curve, duration: Duration) -> Self {
        Self { curve, duration, delay: Duration::ZERO }
    }

    /// Start the animation after a delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Total time from start to settled.
    pub fn total(&self) -> Duration {
        self.delay + self.duration
    }

    /// Eased progress in `[0, 1]` after `elapsed` time.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        let Some(running) = elapsed.checked_sub(self.delay) else {
            return 0.0;
        };
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = running.as_secs_f64() / self.duration.as_secs_f64();
        self.curve.apply(t)
    }

    /// Whether the animation has settled after `elapsed` time.
    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.total()
    }
}

/// What is drawn behind the grid content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Background {
    #[default]
    Clear,
    Color(Color),
}

impl Background {
    /// Resolved fill color.
    pub fn color(&self) -> Color {
        match self {
            Background::Clear => Color::TRANSPARENT,
            Background::Color(color) => *color,
        }
    }
}

/// Scrolling behaviour of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollOptions {
    pub direction: Axis,
    pub shows_indicators: bool,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self { direction: Axis::Vertical, shows_indicators: true }
    }
}

impl ScrollOptions {
    pub fn horizontal() -> Self {
        Self { direction: Axis::Horizontal, ..Default::default() }
    }

    pub fn vertical() -> Self {
        Self::default()
    }

    pub fn with_indicators(mut self, shows: bool) -> Self {
        self.shows_indicators = shows;
        self
    }
}

/// Style of a waterfall grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGridStyle", into = "RawGridStyle"))]
pub struct GridStyle {
    columns_in_portrait: usize,
    /// Landscape override; `None` uses the portrait count
    columns_in_landscape: Option<usize>,
    spacing: f64,
    padding: EdgeInsets,
    animation: Option<Animation>,
    background: Background,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            columns_in_portrait: DEFAULT_COLUMNS,
            columns_in_landscape: None,
            spacing: DEFAULT_SPACING,
            padding: EdgeInsets::ZERO,
            animation: Some(Animation::default()),
            background: Background::Clear,
        }
    }
}

impl GridStyle {
    /// Style with the same column count in both orientations.
    ///
    /// # Panics
    ///
    /// Panics if `columns` is zero.
    pub fn new(columns: usize) -> Self {
        unwrap_style(Self::try_new(columns))
    }

    /// Style with distinct column counts per orientation.
    ///
    /// The landscape count only takes effect on platforms that report an
    /// orientation; elsewhere the portrait count is used.
    ///
    /// # Panics
    ///
    /// Panics if either count is zero.
    pub fn with_orientations(columns_in_portrait: usize, columns_in_landscape: usize) -> Self {
        unwrap_style(Self::try_with_orientations(columns_in_portrait, columns_in_landscape))
    }

    pub fn try_new(columns: usize) -> Result<Self, StyleError> {
        check_columns(columns, "portrait")?;
        Ok(Self { columns_in_portrait: columns, ..Default::default() })
    }

    pub fn try_with_orientations(
        columns_in_portrait: usize,
        columns_in_landscape: usize,
    ) -> Result<Self, StyleError> {
        check_columns(columns_in_portrait, "portrait")?;
        check_columns(columns_in_landscape, "landscape")?;
        Ok(Self {
            columns_in_portrait,
            columns_in_landscape: Some(columns_in_landscape),
            ..Default::default()
        })
    }

    /// Set the distance between adjacent items.
    ///
    /// # Panics
    ///
    /// Panics if `spacing` is negative or not finite.
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        unwrap_style(check_spacing(spacing));
        self.spacing = spacing;
        self
    }

    /// Set the inset of the content from the scroll view edges.
    ///
    /// # Panics
    ///
    /// Panics if any edge is negative or not finite.
    pub fn with_padding(mut self, padding: EdgeInsets) -> Self {
        unwrap_style(check_padding(&padding));
        self.padding = padding;
        self
    }

    /// Set the animation applied on change; `None` applies changes at once.
    pub fn with_animation(mut self, animation: Option<Animation>) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn columns_in_portrait(&self) -> usize {
        self.columns_in_portrait
    }

    pub fn columns_in_landscape(&self) -> usize {
        self.columns_in_landscape.unwrap_or(self.columns_in_portrait)
    }

    /// Column count for the given orientation on the given platform.
    pub fn columns(&self, orientation: Orientation, platform: Platform) -> usize {
        match orientation {
            Orientation::Landscape if platform.supports_orientation => {
                self.columns_in_landscape()
            }
            _ => self.columns_in_portrait,
        }
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn padding(&self) -> EdgeInsets {
        self.padding
    }

    pub fn animation(&self) -> Option<Animation> {
        self.animation
    }

    pub fn background(&self) -> Background {
        self.background
    }

    /// Check every invariant of the style.
    pub fn validate(&self) -> Result<(), StyleError> {
        check_columns(self.columns_in_portrait, "portrait")?;
        if let Some(landscape) = self.columns_in_landscape {
            check_columns(landscape, "landscape")?;
        }
        check_spacing(self.spacing)?;
        check_padding(&self.padding)?;
        Ok(())
    }

    /// Load a style from JSON. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        let raw: RawGridStyle = serde_json::from_str(json)?;
        Self::try_from(raw)
    }
}

fn unwrap_style<T>(result: Result<T, StyleError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("invalid grid style: {err}"),
    }
}

fn check_columns(columns: usize, orientation: &'static str) -> Result<(), StyleError> {
    if columns == 0 {
        return Err(StyleError::ZeroColumns { orientation });
    }
    Ok(())
}

fn check_spacing(spacing: f64) -> Result<(), StyleError> {
    if !(spacing.is_finite() && spacing >= 0.0) {
        return Err(StyleError::InvalidSpacing { value: spacing });
    }
    Ok(())
}

fn check_padding(padding: &EdgeInsets) -> Result<(), StyleError> {
    for (edge, value) in padding.edges() {
        if !(value.is_finite() && value >= 0.0) {
            return Err(StyleError::InvalidPadding { edge, value });
        }
    }
    Ok(())
}

/// Wire form of [`GridStyle`].
#[cfg(feature = "serde")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawGridStyle {
    columns_in_portrait: usize,
    columns_in_landscape: Option<usize>,
    spacing: f64,
    padding: EdgeInsets,
    animation: Option<Animation>,
    background: Background,
}

#[cfg(feature = "serde")]
impl Default for RawGridStyle {
    fn default() -> Self {
        GridStyle::default().into()
    }
}

#[cfg(feature = "serde")]
impl From<GridStyle> for RawGridStyle {
    fn from(style: GridStyle) -> Self {
        Self {
            columns_in_portrait: style.columns_in_portrait,
            columns_in_landscape: style.columns_in_landscape,
            spacing: style.spacing,
            padding: style.padding,
            animation: style.animation,
            background: style.background,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawGridStyle> for GridStyle {
    type Error = StyleError;

    fn try_from(raw: RawGridStyle) -> Result<Self, Self::Error> {
        let style = Self {
            columns_in_portrait: raw.columns_in_portrait,
            columns_in_landscape: raw.columns_in_landscape,
            spacing: raw.spacing,
            padding: raw.padding,
            animation: raw.animation,
            background: raw.background,
        };
        style.validate()?;
        Ok(style)
    }
}
