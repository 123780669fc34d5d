//! Core types for trajview.
//!
//! Two families live here: the trajectory model (atoms, frames, bounds) that
//! flows from the reader thread through the ring buffer into the projector,
//! and the cell primitives (colors, attributes, cells) that the renderer
//! understands.

// =============================================================================
// Color
// =============================================================================

/// A cell color. Channels hold 0..=255; `r == -1` is the terminal's own
/// default color. Integer channels keep comparison exact for the diff
/// renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: i16,
    pub g: i16,
    pub b: i16,
    pub a: i16,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as i16,
            g: g as i16,
            b: b as i16,
            a: a as i16,
        }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Leave the color to the terminal (SGR 39/49).
    pub const TERMINAL_DEFAULT: Self = Self {
        r: -1,
        g: -1,
        b: -1,
        a: -1,
    };

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Create an opaque color from unit-range channels (0.0-1.0).
    ///
    /// Channels outside the range are clamped.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(channel(r), channel(g), channel(b))
    }

    pub const fn is_terminal_default(&self) -> bool {
        self.r == -1
    }

    /// Perceived brightness in 0.0-1.0 (terminal default counts as dark).
    pub fn luminance(&self) -> f64 {
        if self.is_terminal_default() {
            return 0.0;
        }
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }
}

// =============================================================================
// Cells
// =============================================================================

bitflags::bitflags! {
    /// SGR attributes of a cell. The status panel uses `BOLD` and `DIM`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const INVERSE = 1 << 4;
    }
}

/// One character position on screen, as painted by the canvas or the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Unicode codepoint (32 for space, 0 for a wide-char continuation).
    pub char: u32,
    pub fg: Rgba,
    /// Atoms are drawn as spaces, so this carries their color.
    pub bg: Rgba,
    pub attrs: Attr,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            char: ' ' as u32,
            fg: Rgba::TERMINAL_DEFAULT,
            bg: Rgba::TERMINAL_DEFAULT,
            attrs: Attr::NONE,
        }
    }
}

// =============================================================================
// ClipRect
// =============================================================================

/// A rectangle of cells, used to keep atom drawing inside the view area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl ClipRect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x
            && (x as u32) < self.x as u32 + self.width as u32
            && y >= self.y
            && (y as u32) < self.y as u32 + self.height as u32
    }

    /// `contains` for offsets that may fall left of or above the screen.
    pub fn contains_signed(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x <= u16::MAX as i32 && y <= u16::MAX as i32 && self.contains(x as u16, y as u16)
    }
}

// =============================================================================
// Axis bounds
// =============================================================================

/// How one axis of the view volume is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AxisBound {
    /// Derive min/max from the data observed in each frame.
    #[default]
    Auto,
    /// User-fixed range. `min < max` is checked by configuration validation.
    Fixed { min: f64, max: f64 },
}

impl AxisBound {
    pub fn is_auto(&self) -> bool {
        matches!(self, AxisBound::Auto)
    }

    /// Resolve against an observed range.
    #[inline]
    pub fn resolve(&self, observed_min: f64, observed_max: f64) -> (f64, f64) {
        match *self {
            AxisBound::Auto => (observed_min, observed_max),
            AxisBound::Fixed { min, max } => (min, max),
        }
    }
}

/// Axis-aligned bounding box of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
}

impl Bounds {
    /// Min/max of the given points, or all zeros when there are none.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64, f64)>,
    {
        let mut acc = BoundsAccumulator::new();
        for (x, y, z) in points {
            acc.add(x, y, z);
        }
        acc.finish().unwrap_or_default()
    }

    /// Apply per-axis bound rules: auto axes keep this (observed) range,
    /// fixed axes take the configured range.
    pub fn resolve(&self, axes: &[AxisBound; 3]) -> Self {
        let (xmin, xmax) = axes[0].resolve(self.xmin, self.xmax);
        let (ymin, ymax) = axes[1].resolve(self.ymin, self.ymax);
        let (zmin, zmax) = axes[2].resolve(self.zmin, self.zmax);
        Self { xmin, xmax, ymin, ymax, zmin, zmax }
    }
}

/// Running min/max over a stream of points.
#[derive(Debug, Clone, Copy)]
pub struct BoundsAccumulator {
    bounds: Bounds,
    seen: bool,
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self {
            bounds: Bounds::default(),
            seen: false,
        }
    }

    #[inline]
    pub fn add(&mut self, x: f64, y: f64, z: f64) {
        let b = &mut self.bounds;
        if !self.seen {
            *b = Bounds { xmin: x, xmax: x, ymin: y, ymax: y, zmin: z, zmax: z };
            self.seen = true;
            return;
        }
        b.xmin = b.xmin.min(x);
        b.xmax = b.xmax.max(x);
        b.ymin = b.ymin.min(y);
        b.ymax = b.ymax.max(y);
        b.zmin = b.zmin.min(z);
        b.zmax = b.zmax.max(z);
    }

    /// The accumulated bounds, or None if no point was added.
    pub fn finish(self) -> Option<Bounds> {
        self.seen.then_some(self.bounds)
    }
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Trajectory model
// =============================================================================

/// Timestamp used when a frame header carries no usable time.
pub const MISSING_TIME: f64 = -1.0;

/// One particle of one frame. Immutable once read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atom {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Per-line time value (columnar input only).
    pub time: Option<f64>,
    /// Type id, assigned per frame in order of first appearance.
    pub atype: usize,
    /// Position of the atom within its frame.
    pub index: usize,
}

impl Atom {
    pub fn new(index: usize, x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            time: None,
            atype: 0,
            index,
        }
    }
}

/// One time-step of the trajectory.
///
/// Published into the ring buffer behind an `Arc` and never mutated after
/// commit; refilling a slot swaps in a new frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub atoms: Vec<Atom>,
    /// Bounds after applying the configured auto/fixed rule.
    pub bounds: Bounds,
    /// Frame timestamp, `MISSING_TIME` when unknown.
    pub time: f64,
    /// Number of frames read from the current source before this one.
    pub sequence: u64,
    /// True when the reader knew, at parse time, that no frame follows.
    pub is_last: bool,
    /// Number of distinct atom types in this frame.
    pub type_count: usize,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_from_unit() {
        assert_eq!(Rgba::from_unit(1.0, 0.0, 0.5), Rgba::rgb(255, 0, 128));
        assert_eq!(Rgba::from_unit(-1.0, 2.0, 0.0), Rgba::rgb(0, 255, 0));
    }

    #[test]
    fn test_luminance() {
        assert_eq!(Rgba::BLACK.luminance(), 0.0);
        assert!((Rgba::WHITE.luminance() - 1.0).abs() < 1e-9);
        assert_eq!(Rgba::TERMINAL_DEFAULT.luminance(), 0.0);
    }

    #[test]
    fn test_clip_rect_contains() {
        let area = ClipRect::new(1, 1, 40, 20);
        assert!(area.contains(1, 1) && area.contains(40, 20));
        assert!(!area.contains(0, 5));
        assert!(!area.contains(41, 5));
        assert!(!area.contains(5, 21));
        assert!(!area.contains_signed(-3, 4));
        assert!(!area.contains_signed(5, 70_000));
        assert!(area.contains_signed(12, 12));
    }

    #[test]
    fn test_bounds_from_points() {
        let b = Bounds::from_points([(1.0, -2.0, 3.0), (-4.0, 5.0, 0.5)]);
        assert_eq!(b.xmin, -4.0);
        assert_eq!(b.xmax, 1.0);
        assert_eq!(b.ymin, -2.0);
        assert_eq!(b.ymax, 5.0);
        assert_eq!(b.zmin, 0.5);
        assert_eq!(b.zmax, 3.0);
    }

    #[test]
    fn test_bounds_from_no_points_is_zero() {
        let b = Bounds::from_points(std::iter::empty());
        assert_eq!(b, Bounds::default());
    }

    #[test]
    fn test_bounds_resolve_mixes_auto_and_fixed() {
        let observed = Bounds { xmin: 1.0, xmax: 2.0, ymin: 3.0, ymax: 4.0, zmin: 5.0, zmax: 6.0 };
        let axes = [
            AxisBound::Auto,
            AxisBound::Fixed { min: -10.0, max: 10.0 },
            AxisBound::Auto,
        ];
        let r = observed.resolve(&axes);
        assert_eq!((r.xmin, r.xmax), (1.0, 2.0));
        assert_eq!((r.ymin, r.ymax), (-10.0, 10.0));
        assert_eq!((r.zmin, r.zmax), (5.0, 6.0));
    }
}
