//! Scoped configuration passed down the composition tree.
//!
//! Each scope may install its own values; lookups walk outwards and the
//! nearest scope wins. An empty chain resolves to the defaults.
//!
//! ```
//! use waterfall_core::{Environment, GridStyle};
//!
//! let root = Environment::root().with_grid_style(GridStyle::new(3));
//! let nested = root.child().with_grid_style(GridStyle::new(1));
//!
//! assert_eq!(root.grid_style().columns_in_portrait(), 3);
//! assert_eq!(nested.grid_style().columns_in_portrait(), 1);
//! assert_eq!(nested.child().grid_style().columns_in_portrait(), 1);
//! ```

use crate::style::{GridStyle, ScrollOptions};
use crate::types::Platform;

/// A configuration scope, optionally nested inside a parent scope.
#[derive(Debug, Clone, Default)]
pub struct Environment<'a> {
    parent: Option<&'a Environment<'a>>,
    grid_style: Option<GridStyle>,
    scroll_options: Option<ScrollOptions>,
    platform: Option<Platform>,
}

impl Environment<'static> {
    /// The outermost scope.
    pub fn root() -> Self {
        Self::default()
    }
}

impl<'a> Environment<'a> {
    /// Open a nested scope that inherits everything from `self`.
    pub fn child(&'a self) -> Environment<'a> {
        Environment {
            parent: Some(self),
            grid_style: None,
            scroll_options: None,
            platform: None,
        }
    }

    /// Install a grid style for this scope, shadowing any outer one.
    pub fn with_grid_style(mut self, style: GridStyle) -> Self {
        self.grid_style = Some(style);
        self
    }

    /// Install scroll options for this scope.
    pub fn with_scroll_options(mut self, options: ScrollOptions) -> Self {
        self.scroll_options = Some(options);
        self
    }

    /// Declare the host platform's capabilities.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Nearest grid style, or the default style.
    pub fn grid_style(&self) -> GridStyle {
        self.lookup(|env| env.grid_style.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    /// Nearest scroll options, or the defaults.
    pub fn scroll_options(&self) -> ScrollOptions {
        self.lookup(|env| env.scroll_options.as_ref())
            .copied()
            .unwrap_or_default()
    }

    /// Nearest platform, or [`Platform::default`].
    pub fn platform(&self) -> Platform {
        self.lookup(|env| env.platform.as_ref())
            .copied()
            .unwrap_or_default()
    }

    fn lookup<'s, T>(
        &'s self,
        get: impl Fn(&'s Environment<'a>) -> Option<&'s T>,
    ) -> Option<&'s T> {
        let mut scope = Some(self);
        while let Some(env) = scope {
            if let Some(value) = get(env) {
                return Some(value);
            }
            scope = env.parent;
        }
        None
    }
}
