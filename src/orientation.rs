//! View orientation.
//!
//! The orientation is a 3x3 rotation matrix whose rows are the rotated basis
//! vectors. UI events never touch the matrix directly: they set pending
//! deltas, and the session folds them in once per render cycle with
//! [`OrientationState::apply_pending`].
//!
//! Two compositions exist. Button deltas rotate about the fixed world axes;
//! drag deltas rotate about the first and third basis vectors, so a mouse drag
//! always turns the picture the way the pointer moves.

/// Row-major rotation matrix.
pub type Matrix3 = [[f64; 3]; 3];

pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// A fixed world axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Deltas waiting for the next render cycle, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PendingRotation {
    pub di: f64,
    pub dj: f64,
    pub dk: f64,
    pub dim: f64,
    pub djm: f64,
}

impl PendingRotation {
    pub fn is_zero(&self) -> bool {
        self.di == 0.0 && self.dj == 0.0 && self.dk == 0.0 && self.dim == 0.0 && self.djm == 0.0
    }
}

/// Display angles in degrees, each in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrientationState {
    matrix: Matrix3,
    pending: PendingRotation,
}

impl Default for OrientationState {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationState {
    pub fn new() -> Self {
        Self {
            matrix: IDENTITY,
            pending: PendingRotation::default(),
        }
    }

    pub fn matrix(&self) -> &Matrix3 {
        &self.matrix
    }

    pub fn pending(&self) -> &PendingRotation {
        &self.pending
    }

    /// Set the pending rotation about a world axis. Last write wins.
    pub fn set_button_delta(&mut self, axis: Axis, degrees: f64) {
        match axis {
            Axis::X => self.pending.di = degrees,
            Axis::Y => self.pending.dj = degrees,
            Axis::Z => self.pending.dk = degrees,
        }
    }

    /// Set the pending drag rotation. Last write wins.
    pub fn set_drag_delta(&mut self, dim: f64, djm: f64) {
        self.pending.dim = dim;
        self.pending.djm = djm;
    }

    /// Back to the identity basis. Pending deltas are kept.
    pub fn reset(&mut self) {
        self.matrix = IDENTITY;
    }

    /// Fold the pending deltas into the matrix, then zero them.
    pub fn apply_pending(&mut self) {
        let p = self.pending;
        self.compose_buttons(-p.di, p.dj, -p.dk);
        self.compose_drag(-p.dim, -p.djm);
        self.pending = PendingRotation::default();
    }

    /// R <- M(i, j, k) * R
    fn compose_buttons(&mut self, i: f64, j: f64, k: f64) {
        if i == 0.0 && j == 0.0 && k == 0.0 {
            return;
        }
        let (si, ci) = i.to_radians().sin_cos();
        let (sj, cj) = j.to_radians().sin_cos();
        let (sk, ck) = k.to_radians().sin_cos();

        let m = [
            [cj * ck, -cj * sk, sj],
            [si * sj * ck + ci * sk, -si * sj * sk + ci * ck, -si * cj],
            [-ci * sj * ck + si * sk, ci * sj * sk + si * ck, ci * cj],
        ];
        self.matrix = mul(&m, &self.matrix);
    }

    /// Rotation about the first and third basis vectors.
    fn compose_drag(&mut self, im: f64, jm: f64) {
        if im == 0.0 && jm == 0.0 {
            return;
        }
        let (sim, cim) = im.to_radians().sin_cos();
        let (sjm, cjm) = jm.to_radians().sin_cos();

        let m = [
            [cjm, 0.0, sjm],
            [sim * sjm, cim, -sim * cjm],
            [-cim * sjm, sim, cim * cjm],
        ];
        self.matrix = mul(&m, &self.matrix);
    }

    /// Recover display angles from the current matrix.
    ///
    /// Each angle is quadrant-corrected for display, while the intermediate
    /// basis rotations use the principal value of the same arctangent. That
    /// keeps a half turn about one axis from leaking into the other two.
    pub fn euler_angles(&self) -> EulerAngles {
        let r = &self.matrix;

        let zc = quadrant_atan(r[0][1], r[0][0]);
        let (sz, cz) = principal_atan(r[0][1], r[0][0]).to_radians().sin_cos();

        // Third basis vector rotated by -zc about z.
        let r2x = r[2][0] * cz + r[2][1] * sz;
        let yc = quadrant_atan(-r2x, r[2][2]);
        let (sy, cy) = principal_atan(-r2x, r[2][2]).to_radians().sin_cos();

        // Second basis vector rotated by -zc about z, then by -yc about y.
        let r1x = r[1][0] * cz + r[1][1] * sz;
        let r1y = -r[1][0] * sz + r[1][1] * cz;
        let r1z = -r1x * sy + r[1][2] * cy;
        let xc = quadrant_atan(r1z, r1y);

        EulerAngles {
            x: normalize_degrees(xc),
            y: normalize_degrees(yc),
            z: normalize_degrees(zc),
        }
    }
}

/// atan(num/den) in degrees, in (-90, 90). A zero denominator yields 0.
fn principal_atan(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    (num / den).atan().to_degrees()
}

/// atan(num/den) in degrees, moved into the right quadrant by the signs.
/// A zero denominator yields 0.
fn quadrant_atan(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let mut angle = principal_atan(num, den);
    if den < 0.0 {
        angle += 180.0;
    } else if num < 0.0 {
        angle += 360.0;
    }
    angle
}

/// Into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

fn mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for (row, a_row) in out.iter_mut().zip(a.iter()) {
        for (col, cell) in row.iter_mut().enumerate() {
            *cell = a_row[0] * b[0][col] + a_row[1] * b[1][col] + a_row[2] * b[2][col];
        }
    }
    out
}

/// Drag distance in cells to rotation degrees: a full area width is 90°.
pub fn drag_delta(dx: i32, dy: i32, area_w: u16, area_h: u16) -> (f64, f64) {
    let w = area_w.max(1) as f64;
    let h = area_h.max(1) as f64;
    (dx as f64 * 90.0 / w, dy as f64 * 90.0 / h)
}

// =============================================================================
// Tests
// =============================================================================
