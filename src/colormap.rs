//! Color palettes.
//!
//! Each palette is a fixed table of 17 RGB triples with 16-bit channels. The
//! projector maps atoms into 16 buckets (see [`NUM_COLORS`]); the 17th entry
//! only exists so an unclamped boundary value still hits a valid color.

use crate::types::Rgba;

/// Number of color buckets the projector maps into.
pub const NUM_COLORS: usize = 16;

/// Entries per palette table.
pub const PALETTE_LEN: usize = NUM_COLORS + 1;

/// Built-in palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    /// Dark red through yellow and green to violet.
    #[default]
    Default,
    /// The default ramp reversed (blue first).
    Inverted,
    Cold,
    Cold2,
    Greyscale,
}

impl Palette {
    pub const ALL: [Palette; 5] = [
        Palette::Default,
        Palette::Inverted,
        Palette::Cold,
        Palette::Cold2,
        Palette::Greyscale,
    ];

    /// The next palette in cycling order.
    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Palette::Default => "default",
            Palette::Inverted => "inverted",
            Palette::Cold => "cold",
            Palette::Cold2 => "cold2",
            Palette::Greyscale => "greyscale",
        }
    }

    fn table(self) -> [[u16; 3]; PALETTE_LEN] {
        match self {
            Palette::Default => DEFAULT_TABLE,
            Palette::Inverted => INVERTED_TABLE,
            Palette::Cold => scale8(COLD_TABLE_8),
            Palette::Cold2 => scale8(COLD2_TABLE_8),
            Palette::Greyscale => greyscale_table(),
        }
    }
}

const DEFAULT_TABLE: [[u16; 3]; PALETTE_LEN] = [
    [40000, 0, 0],
    [53000, 0, 0],
    [65535, 0, 0],
    [65535, 22000, 0],
    [65535, 33000, 0],
    [65535, 40000, 0],
    [65535, 50000, 0],
    [65000, 65000, 20000],
    [50000, 65000, 20000],
    [30000, 65000, 30000],
    [10000, 65535, 10000],
    [10000, 60000, 50000],
    [10000, 50000, 65535],
    [13000, 38000, 65535],
    [13000, 13000, 65535],
    [42000, 13000, 65535],
    [42000, 13000, 65535],
];

const INVERTED_TABLE: [[u16; 3]; PALETTE_LEN] = [
    [26000, 26000, 65535],
    [13000, 26000, 65535],
    [13000, 38000, 65535],
    [10000, 50000, 65535],
    [10000, 60000, 50000],
    [10000, 65535, 10000],
    [30000, 65000, 30000],
    [50000, 65000, 20000],
    [65000, 65000, 20000],
    [65535, 50000, 0],
    [65535, 40000, 0],
    [65535, 33000, 0],
    [65535, 22000, 0],
    [65535, 0, 0],
    [56000, 0, 0],
    [40000, 0, 0],
    [40000, 0, 0],
];

// 8-bit tables, widened with `scale8`.
const COLD_TABLE_8: [[u8; 3]; PALETTE_LEN] = [
    [255, 224, 255],
    [224, 192, 255],
    [192, 160, 255],
    [160, 128, 255],
    [128, 64, 255],
    [64, 0, 255],
    [0, 0, 255],
    [64, 0, 224],
    [128, 0, 192],
    [160, 0, 160],
    [192, 0, 128],
    [224, 0, 96],
    [255, 0, 0],
    [224, 0, 0],
    [192, 0, 0],
    [160, 0, 0],
    [157, 0, 0],
];

const COLD2_TABLE_8: [[u8; 3]; PALETTE_LEN] = [
    [64, 0, 255],
    [0, 0, 255],
    [60, 20, 255],
    [90, 40, 240],
    [120, 80, 220],
    [140, 90, 200],
    [160, 100, 180],
    [180, 90, 160],
    [200, 80, 128],
    [220, 40, 96],
    [236, 20, 64],
    [255, 0, 0],
    [224, 0, 0],
    [192, 0, 0],
    [160, 0, 0],
    [157, 0, 80],
    [157, 0, 120],
];

fn scale8(table: [[u8; 3]; PALETTE_LEN]) -> [[u16; 3]; PALETTE_LEN] {
    table.map(|rgb| rgb.map(|c| c as u16 * 256))
}

/// Dark grey up to white; the last two entries are both white.
fn greyscale_table() -> [[u16; 3]; PALETTE_LEN] {
    let mut table = [[0u16; 3]; PALETTE_LEN];
    for (i, entry) in table.iter_mut().enumerate() {
        let level = 8192 + (i.min(NUM_COLORS - 1) as u32 * (65535 - 8192) / (NUM_COLORS as u32 - 1));
        *entry = [level as u16; 3];
    }
    table
}

/// A palette normalized to unit-range floats.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    palette: Palette,
    colors: [[f64; 3]; PALETTE_LEN],
}

impl Colormap {
    pub fn new(palette: Palette) -> Self {
        let colors = palette
            .table()
            .map(|rgb| rgb.map(|c| c as f64 / 65535.0));
        Self { palette, colors }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Unit-range color of a bucket. Out-of-range buckets clamp to the last entry.
    #[inline]
    pub fn color(&self, bucket: usize) -> [f64; 3] {
        self.colors[bucket.min(PALETTE_LEN - 1)]
    }

    /// Terminal color of a bucket.
    pub fn rgba(&self, bucket: usize) -> Rgba {
        let [r, g, b] = self.color(bucket);
        Rgba::from_unit(r, g, b)
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::new(Palette::Default)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_palette_is_normalized() {
        for palette in Palette::ALL {
            let map = Colormap::new(palette);
            for bucket in 0..PALETTE_LEN {
                for c in map.color(bucket) {
                    assert!((0.0..=1.0).contains(&c), "{palette:?}[{bucket}] = {c}");
                }
            }
        }
    }

    #[test]
    fn test_default_palette_endpoints() {
        let map = Colormap::new(Palette::Default);
        assert_eq!(map.color(2), [1.0, 0.0, 0.0]);
        assert_eq!(map.rgba(0), Rgba::rgb(156, 0, 0));
    }

    #[test]
    fn test_cold_palette_is_widened_from_8_bit() {
        let map = Colormap::new(Palette::Cold);
        let [r, g, b] = map.color(6);
        assert_eq!(r, 0.0);
        assert_eq!(g, 0.0);
        assert!((b - 255.0 * 256.0 / 65535.0).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_bucket_clamps() {
        let map = Colormap::new(Palette::Inverted);
        assert_eq!(map.color(99), map.color(PALETTE_LEN - 1));
    }

    #[test]
    fn test_greyscale_is_monotonic_grey() {
        let map = Colormap::new(Palette::Greyscale);
        let mut prev = -1.0;
        for bucket in 0..PALETTE_LEN {
            let [r, g, b] = map.color(bucket);
            assert_eq!(r, g);
            assert_eq!(g, b);
            assert!(r >= prev);
            prev = r;
        }
        assert_eq!(map.color(NUM_COLORS - 1), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_palette_cycle_wraps() {
        let mut p = Palette::Default;
        for _ in 0..Palette::ALL.len() {
            p = p.next();
        }
        assert_eq!(p, Palette::Default);
        assert_eq!(Palette::Cold.next(), Palette::Cold2);
    }
}
