//! Per-frame geometry pass.
//!
//! Rotates a frame by the current orientation, resolves its view bounds,
//! depth-sorts it, and assigns each atom a color bucket and a radius. The
//! result is a paint order: the canvas draws [`Projection::atoms`] front to
//! back as given.
//!
//! Sorting and coloring use different z values. The sort runs on the rotated
//! z (visual stacking), while bucket and radius use the atom's original z.

use std::cmp::Ordering;

use crate::colormap::NUM_COLORS;
use crate::config::{Configuration, SizeVariation, SortDirection};
use crate::orientation::OrientationState;
use crate::types::{Bounds, BoundsAccumulator, Frame};

/// One atom ready for the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderAtom {
    /// Rotated x.
    pub x: f64,
    /// Rotated y.
    pub y: f64,
    /// Original (unrotated) z.
    pub color_z: f64,
    pub atype: usize,
    pub original_index: usize,
    pub color_index: usize,
    pub radius: i32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    /// Atoms in paint order.
    pub atoms: Vec<RenderAtom>,
    /// Resolved view bounds of the rotated frame.
    pub bounds: Bounds,
    /// Radius before depth variation.
    pub base_radius: i32,
}

/// Linear map of `v` from `[min, max]` into `[0, size]`, truncated.
#[inline]
pub fn to_relative(v: f64, min: f64, max: f64, size: f64) -> i32 {
    ((v - min) / (max - min) * size) as i32
}

/// Indices of `rotated` ordered lexicographically by (z, y, x).
pub fn depth_order(rotated: &[[f64; 3]], direction: SortDirection) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rotated.len()).collect();
    let by_depth = |a: &usize, b: &usize| -> Ordering {
        let (pa, pb) = (&rotated[*a], &rotated[*b]);
        pa[2]
            .total_cmp(&pb[2])
            .then_with(|| pa[1].total_cmp(&pb[1]))
            .then_with(|| pa[0].total_cmp(&pb[0]))
    };
    match direction {
        SortDirection::Forward => order.sort_unstable_by(by_depth),
        SortDirection::Reverse => order.sort_unstable_by(|a, b| by_depth(b, a)),
    }
    order
}

/// Color bucket, clamped to a valid palette index.
#[inline]
fn bucket(v: f64, min: f64, max: f64) -> usize {
    to_relative(v, min, max, NUM_COLORS as f64).clamp(0, NUM_COLORS as i32 - 1) as usize
}

fn atom_radius(base: i32, z: f64, zmin: f64, zmax: f64, vary: SizeVariation) -> i32 {
    let range = zmax - zmin;
    if vary == SizeVariation::Constant || !(range > 0.0) {
        return base;
    }
    let base = base as f64;
    let depth = match vary {
        SizeVariation::DecreaseWithDepth => z - zmin,
        SizeVariation::IncreaseWithDepth => zmax - z,
        SizeVariation::Constant => range,
    };
    (base * (0.5 * depth / range) + 0.5 * base) as i32
}

/// Run the full geometry pass for one frame.
pub fn project(frame: &Frame, orientation: &OrientationState, config: &Configuration) -> Projection {
    let r = orientation.matrix();

    let mut acc = BoundsAccumulator::new();
    let rotated: Vec<[f64; 3]> = frame
        .atoms
        .iter()
        .map(|a| {
            let p = [
                r[0][0] * a.x + r[0][1] * a.y + r[0][2] * a.z,
                r[1][0] * a.x + r[1][1] * a.y + r[1][2] * a.z,
                r[2][0] * a.x + r[2][1] * a.y + r[2][2] * a.z,
            ];
            acc.add(p[0], p[1], p[2]);
            p
        })
        .collect();

    let bounds = acc.finish().unwrap_or(frame.bounds).resolve(&config.axes);
    let order = depth_order(&rotated, config.sort);

    let base_radius = (config.radius / 2) as i32;
    let use_types = config.effective_use_types();
    let type_range = (frame.type_count + 1) as f64;

    let atoms = order
        .into_iter()
        .map(|i| {
            let original = &frame.atoms[i];
            let color_z = original.z;
            let color_index = if use_types {
                bucket(original.atype as f64, 0.0, type_range)
            } else {
                bucket(color_z, bounds.zmin, bounds.zmax)
            };
            RenderAtom {
                x: rotated[i][0],
                y: rotated[i][1],
                color_z,
                atype: original.atype,
                original_index: original.index,
                color_index,
                radius: atom_radius(base_radius, color_z, bounds.zmin, bounds.zmax, config.vary),
            }
        })
        .collect();

    Projection {
        atoms,
        bounds,
        base_radius,
    }
}

/// Data-to-cell mapping used by the canvas and the cursor readout.
pub mod screen {
    use super::{to_relative, RenderAtom};
    use crate::types::Bounds;

    #[inline]
    pub fn pixel(v: f64, min: f64, max: f64, size: u16) -> i32 {
        to_relative(v, min, max, size as f64)
    }

    /// Cell position of an atom inside a `width` x `height` area, y flipped.
    ///
    /// `None` when the atom would land on or past the area edge, or when its
    /// color z lies outside the z bounds; such atoms are dropped, not clamped.
    /// The edge margin is half the radius before depth variation, so every
    /// atom of a frame shares it.
    pub fn place(
        atom: &RenderAtom,
        bounds: &Bounds,
        base_radius: i32,
        width: u16,
        height: u16,
    ) -> Option<(i32, i32)> {
        if !(bounds.zmin..=bounds.zmax).contains(&atom.color_z) {
            return None;
        }
        let px = pixel(atom.x, bounds.xmin, bounds.xmax, width);
        let py = pixel(atom.y, bounds.ymin, bounds.ymax, height);
        let margin = base_radius / 2;
        let visible = px > 0
            && py > 0
            && px < width as i32 - margin
            && py < height as i32 - margin;
        visible.then_some((px, height as i32 - py))
    }

    /// Inverse of `place` for a cell inside the area.
    pub fn data_coordinates(cx: u16, cy: u16, bounds: &Bounds, width: u16, height: u16) -> (f64, f64) {
        let w = width.max(1) as f64;
        let h = height.max(1) as f64;
        let x = bounds.xmin + cx as f64 / w * (bounds.xmax - bounds.xmin);
        let y = bounds.ymin + (h - cy as f64) / h * (bounds.ymax - bounds.ymin);
        (x, y)
    }
}

// =============================================================================
// Tests
// =============================================================================
