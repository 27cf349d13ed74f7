//! Axis-aligned frames of placed items.

use glam::DVec2;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    /// Position relative to the grid's content origin
    pub x: f64,
    pub y: f64,
    /// Size of the item
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Create bounds with position and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create bounds from position and size vectors.
    pub fn from_vecs(position: DVec2, size: DVec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Get position as a vector.
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Get size as a vector.
    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Get the right edge (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if a point is inside the bounds.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Whether the interiors of two bounds overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Swap the horizontal and vertical axes.
    pub fn transposed(&self) -> Bounds {
        Bounds::new(self.y, self.x, self.height, self.width)
    }

    /// Linear interpolation towards `target`; `t = 0` is `self`.
    pub fn lerp(&self, target: &Bounds, t: f64) -> Bounds {
        Bounds::from_vecs(
            self.position().lerp(target.position(), t),
            self.size().lerp(target.size(), t),
        )
    }
}
