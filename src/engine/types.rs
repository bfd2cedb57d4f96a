//! Core engine newtypes and geometry.
//!
//! All distances are in abstract pixels. The terminal host maps one
//! pixel to one cell.

use std::fmt;

/// Estimated height of a row in pixels. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowHeight(u32);

impl RowHeight {
    /// Minimum height any row can have.
    pub const MIN: Self = Self(1);

    /// Create a height, clamping zero up to [`RowHeight::MIN`].
    pub fn new(height: u32) -> Self {
        Self(height.max(1))
    }

    /// Get the raw pixel value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for RowHeight {
    fn default() -> Self {
        Self::MIN
    }
}

/// Index into an ordered row sequence. 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RowIndex(usize);

impl RowIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(&self) -> usize {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<usize> for RowIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Key identifying one row instance in one render pass.
///
/// Produced only by [`super::key_maker::KeyMaker`], which guarantees
/// uniqueness within a pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderKey(String);

impl RenderKey {
    pub(crate) fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Size of the host window (the area the popover must stay inside).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Pointer position in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside (right and bottom edges exclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && (point.x - self.x) < self.width
            && (point.y - self.y) < self.height
    }
}
