//! Paints a projected frame into the view area.
//!
//! ```text
//!   ┌──────── W+2 ────────┐
//!   │ view area, W x H    │   box color: black on white, white on black
//!   │   ● atoms, painted  │
//!   │     back to front   │
//!   └─────────────────────┘
//! ```
//!
//! Cells are about twice as tall as they are wide, so discs are squashed
//! vertically by half to look round.

use crate::colormap::Colormap;
use crate::config::DrawMode;
use crate::projector::{screen, Projection, RenderAtom};
use crate::renderer::buffer::FrameBuffer;
use crate::types::{Attr, ClipRect, Rgba};

/// Where the highlight of a ball sits, relative to the disc radius.
const HIGHLIGHT_OFFSET: (f64, f64) = (-1.0 / 6.0, -1.0 / 3.0);
/// Inner and outer radii of the ball gradient, relative to the disc radius.
const GRADIENT_INNER: f64 = 0.1;
const GRADIENT_OUTER: f64 = 1.67;

pub struct Canvas {
    area: ClipRect,
}

impl Canvas {
    /// `area` is the interior; the box is drawn one cell outside it.
    pub fn new(area: ClipRect) -> Self {
        Self { area }
    }

    pub fn area(&self) -> ClipRect {
        self.area
    }

    pub fn background(white: bool) -> Rgba {
        if white { Rgba::WHITE } else { Rgba::BLACK }
    }

    pub fn foreground(white: bool) -> Rgba {
        if white { Rgba::BLACK } else { Rgba::WHITE }
    }

    /// Wipe the area and redraw the box around it.
    pub fn clear(&self, buffer: &mut FrameBuffer, white: bool) {
        let bg = Self::background(white);
        buffer.fill_rect(self.area, bg, None);
        let outline = ClipRect::new(
            self.area.x.saturating_sub(1),
            self.area.y.saturating_sub(1),
            self.area.width + 2,
            self.area.height + 2,
        );
        buffer.draw_box(outline, Self::foreground(white), bg);
    }

    /// Paint every visible atom in projection order. Returns how many were drawn.
    pub fn draw(&self, buffer: &mut FrameBuffer, projection: &Projection, colormap: &Colormap, mode: DrawMode) -> usize {
        let mut drawn = 0;
        for atom in &projection.atoms {
            let Some((px, py)) = screen::place(
                atom,
                &projection.bounds,
                projection.base_radius,
                self.area.width,
                self.area.height,
            ) else {
                continue;
            };
            let cx = self.area.x as i32 + px;
            let cy = self.area.y as i32 + py;
            self.draw_atom(buffer, atom, cx, cy, colormap.color(atom.color_index), mode);
            drawn += 1;
        }
        drawn
    }

    fn draw_atom(&self, buffer: &mut FrameBuffer, atom: &RenderAtom, cx: i32, cy: i32, rgb: [f64; 3], mode: DrawMode) {
        let flat = Rgba::from_unit(rgb[0], rgb[1], rgb[2]);
        match mode {
            DrawMode::Rectangle => {
                let side = atom.radius.max(1);
                let rows = ((side + 1) / 2).max(1);
                for dy in 0..rows {
                    for dx in 0..side {
                        self.paint(buffer, cx - side / 2 + dx, cy - rows / 2 + dy, flat);
                    }
                }
            }
            DrawMode::Circle => {
                for_disc(atom.radius, |dx, dy, _| self.paint(buffer, cx + dx, cy + dy, flat));
            }
            DrawMode::Ball => {
                let rho = disc_radius(atom.radius);
                for_disc(atom.radius, |dx, dy, (ex, ey)| {
                    let color = shade(rgb, gradient_position(ex, ey, rho));
                    self.paint(buffer, cx + dx, cy + dy, Rgba::from_unit(color[0], color[1], color[2]));
                });
            }
        }
    }

    fn paint(&self, buffer: &mut FrameBuffer, x: i32, y: i32, color: Rgba) {
        if self.area.contains_signed(x, y) {
            buffer.set_cell(x as u16, y as u16, ' ' as u32, color, color, Attr::NONE, Some(&self.area));
        }
    }
}

/// Horizontal disc radius in cells; a disc is as wide as a rectangle atom.
fn disc_radius(radius: i32) -> f64 {
    (radius.max(1) as f64 / 2.0).max(0.5)
}

/// Visit every cell of a disc. The callback gets the cell offset and the
/// offset in square (unsquashed) units.
fn for_disc(radius: i32, mut visit: impl FnMut(i32, i32, (f64, f64))) {
    let rho = disc_radius(radius);
    let reach_x = rho.ceil() as i32;
    let reach_y = (rho / 2.0).ceil() as i32;
    for dy in -reach_y..=reach_y {
        for dx in -reach_x..=reach_x {
            let ex = dx as f64;
            let ey = dy as f64 * 2.0;
            if (dx == 0 && dy == 0) || ex * ex + ey * ey <= rho * rho {
                visit(dx, dy, (ex, ey));
            }
        }
    }
}

/// Position along the ball gradient (0 at the highlight, 1 at the rim).
fn gradient_position(ex: f64, ey: f64, rho: f64) -> f64 {
    let hx = HIGHLIGHT_OFFSET.0 * rho;
    let hy = HIGHLIGHT_OFFSET.1 * rho;
    let d = ((ex - hx).powi(2) + (ey - hy).powi(2)).sqrt();
    let inner = GRADIENT_INNER * rho;
    let outer = GRADIENT_OUTER * rho;
    ((d - inner) / (outer - inner)).clamp(0.0, 1.0)
}

/// Gradient stops: white at 0, the atom color at 0.2, a fifth of it at 1.
fn shade(rgb: [f64; 3], t: f64) -> [f64; 3] {
    let lerp = |a: f64, b: f64, f: f64| a + (b - a) * f;
    if t <= 0.2 {
        let f = t / 0.2;
        rgb.map(|c| lerp(1.0, c, f))
    } else {
        let f = (t - 0.2) / 0.8;
        rgb.map(|c| lerp(c, 0.2 * c, f))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::Palette;
    use crate::types::Bounds;

    fn projection_of(atoms: Vec<RenderAtom>) -> Projection {
        Projection {
            atoms,
            bounds: Bounds {
                xmin: 0.0,
                xmax: 20.0,
                ymin: 0.0,
                ymax: 20.0,
                zmin: 0.0,
                zmax: 1.0,
            },
            base_radius: 1,
        }
    }

    fn atom_at(x: f64, y: f64, radius: i32) -> RenderAtom {
        RenderAtom {
            x,
            y,
            color_z: 0.0,
            atype: 0,
            original_index: 0,
            color_index: 8,
            radius,
        }
    }

    fn painted(buffer: &FrameBuffer, area: ClipRect, bg: Rgba) -> usize {
        let mut n = 0;
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                if buffer.get(x, y).is_some_and(|c| c.bg != bg) {
                    n += 1;
                }
            }
        }
        n
    }

    // =========================================================================
    // Clearing
    // =========================================================================

    #[test]
    fn test_clear_draws_box_in_contrast_color() {
        let mut buffer = FrameBuffer::new(22, 22);
        let canvas = Canvas::new(ClipRect::new(1, 1, 20, 20));

        canvas.clear(&mut buffer, true);
        let corner = buffer.get(0, 0).unwrap();
        assert_eq!(corner.char, '┌' as u32);
        assert_eq!(corner.fg, Rgba::BLACK);
        assert_eq!(buffer.get(5, 5).unwrap().bg, Rgba::WHITE);

        canvas.clear(&mut buffer, false);
        assert_eq!(buffer.get(0, 0).unwrap().fg, Rgba::WHITE);
        assert_eq!(buffer.get(5, 5).unwrap().bg, Rgba::BLACK);
    }

    // =========================================================================
    // Draw modes
    // =========================================================================

    #[test]
    fn test_circle_paints_center_in_palette_color() {
        let mut buffer = FrameBuffer::new(22, 22);
        let canvas = Canvas::new(ClipRect::new(1, 1, 20, 20));
        canvas.clear(&mut buffer, false);
        let colormap = Colormap::new(Palette::Default);

        let drawn = canvas.draw(&mut buffer, &projection_of(vec![atom_at(10.0, 10.0, 4)]), &colormap, DrawMode::Circle);
        assert_eq!(drawn, 1);
        let expected = colormap.rgba(8);
        assert_eq!(buffer.get(11, 11).unwrap().bg, expected);
        assert!(painted(&buffer, canvas.area(), Rgba::BLACK) > 1);
    }

    #[test]
    fn test_disc_is_squashed_vertically() {
        let mut cells = Vec::new();
        for_disc(8, |dx, dy, _| cells.push((dx, dy)));
        let width = cells.iter().map(|c| c.0).max().unwrap() - cells.iter().map(|c| c.0).min().unwrap();
        let height = cells.iter().map(|c| c.1).max().unwrap() - cells.iter().map(|c| c.1).min().unwrap();
        assert_eq!(width, 8);
        assert_eq!(height, 4);
    }

    #[test]
    fn test_rectangle_size() {
        let mut buffer = FrameBuffer::new(22, 22);
        let canvas = Canvas::new(ClipRect::new(1, 1, 20, 20));
        canvas.clear(&mut buffer, false);
        canvas.draw(
            &mut buffer,
            &projection_of(vec![atom_at(10.0, 10.0, 4)]),
            &Colormap::default(),
            DrawMode::Rectangle,
        );
        assert_eq!(painted(&buffer, canvas.area(), Rgba::BLACK), 4 * 2);
    }

    #[test]
    fn test_ball_gradient_stops() {
        let base = [1.0, 0.0, 0.0];
        assert_eq!(shade(base, 0.0), [1.0, 1.0, 1.0]);
        assert_eq!(shade(base, 0.2), base);
        let rim = shade(base, 1.0);
        assert!((rim[0] - 0.2).abs() < 1e-12);

        // highlight sits up and to the left of the centre
        let rho = 6.0;
        assert!(gradient_position(-1.0, -2.0, rho) < gradient_position(1.0, 2.0, rho));
    }

    #[test]
    fn test_ball_has_bright_and_dark_cells() {
        let mut buffer = FrameBuffer::new(32, 22);
        let canvas = Canvas::new(ClipRect::new(1, 1, 30, 20));
        canvas.clear(&mut buffer, false);
        let colormap = Colormap::default();
        let projection = Projection {
            bounds: Bounds {
                xmax: 30.0,
                ..projection_of(Vec::new()).bounds
            },
            ..projection_of(vec![atom_at(15.0, 10.0, 12)])
        };
        canvas.draw(&mut buffer, &projection, &colormap, DrawMode::Ball);

        let lum: Vec<f64> = buffer
            .cells()
            .iter()
            .filter(|c| c.char == ' ' as u32 && c.bg != Rgba::BLACK)
            .map(|c| c.bg.luminance())
            .collect();
        let max = lum.iter().cloned().fold(0.0, f64::max);
        let min = lum.iter().cloned().fold(1.0, f64::min);
        assert!(max > min + 0.2);
    }

    #[test]
    fn test_atoms_on_edge_are_dropped_and_clipped() {
        let mut buffer = FrameBuffer::new(22, 22);
        let canvas = Canvas::new(ClipRect::new(1, 1, 20, 20));
        canvas.clear(&mut buffer, false);
        let drawn = canvas.draw(
            &mut buffer,
            &Projection {
                base_radius: 6,
                ..projection_of(vec![atom_at(0.0, 10.0, 2), atom_at(19.0, 10.0, 6)])
            },
            &Colormap::default(),
            DrawMode::Circle,
        );
        assert_eq!(drawn, 0);

        // partly outside: painted but never over the box
        let drawn = canvas.draw(
            &mut buffer,
            &projection_of(vec![atom_at(1.0, 10.0, 6)]),
            &Colormap::default(),
            DrawMode::Circle,
        );
        assert_eq!(drawn, 1);
        assert_eq!(buffer.get(0, 11).unwrap().char, '│' as u32);
    }

    #[test]
    fn test_atoms_outside_z_slab_are_not_painted() {
        let mut buffer = FrameBuffer::new(22, 22);
        let canvas = Canvas::new(ClipRect::new(1, 1, 20, 20));
        canvas.clear(&mut buffer, false);
        let behind = RenderAtom {
            color_z: 2.0,
            ..atom_at(10.0, 10.0, 4)
        };
        let drawn = canvas.draw(&mut buffer, &projection_of(vec![behind]), &Colormap::default(), DrawMode::Circle);
        assert_eq!(drawn, 0);
        assert_eq!(painted(&buffer, canvas.area(), Rgba::BLACK), 0);
    }
}
