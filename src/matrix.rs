//! Column-major 4x4 matrices with an explicit product.
//!
//! [`Matrix`] stores its sixteen scalars column by column: `m[0..4]` is the first
//! column, `m[12..16]` holds the translation. This is the same memory layout as
//! [`glam::Mat4`] and WGSL's `mat4x4<f32>`, so a matrix can be uploaded with
//! [`Matrix::to_cols_array_2d`] without reordering.
//!
//! Multiplication is spelled out field by field rather than looped, which pins
//! the evaluation order of every sum:
//!
//! ```
//! use gimbal::Matrix;
//!
//! let t = Matrix::translation(glam::Vec3::new(1.0, 2.0, 3.0));
//! assert_eq!(t * Matrix::IDENTITY, t);
//! assert_eq!(Matrix::IDENTITY * t, t);
//! ```

use std::ops::Mul;

use glam::{Mat4, Quat, Vec3};

/// A 4x4 matrix of `f32` stored in column-major order.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrix {
    /// Sixteen scalars, column-major.
    pub m: [f32; 16],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    /// The identity matrix.
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// All elements zero.
    pub const ZERO: Self = Self { m: [0.0; 16] };

    /// Creates a matrix from sixteen column-major scalars.
    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    /// Returns the sixteen column-major scalars.
    pub const fn to_cols_array(&self) -> [f32; 16] {
        self.m
    }

    /// Returns the columns as nested arrays, the shape GPU uniform structs expect.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        let m = &self.m;
        [
            [m[0], m[1], m[2], m[3]],
            [m[4], m[5], m[6], m[7]],
            [m[8], m[9], m[10], m[11]],
            [m[12], m[13], m[14], m[15]],
        ]
    }

    /// Returns the element at `row`, `col`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[col * 4 + row]
    }

    /// Translation by `offset`, stored in the fourth column.
    #[rustfmt::skip]
    pub fn translation(offset: Vec3) -> Self {
        Self {
            m: [
                1.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                offset.x, offset.y, offset.z, 1.0,
            ],
        }
    }

    /// Per-axis scale along the diagonal.
    #[rustfmt::skip]
    pub fn scale(factors: Vec3) -> Self {
        Self {
            m: [
                factors.x, 0.0, 0.0, 0.0,
                0.0, factors.y, 0.0, 0.0,
                0.0, 0.0, factors.z, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Rotation of `angle` radians about +X (right-handed).
    #[rustfmt::skip]
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            m: [
                1.0, 0.0, 0.0, 0.0,
                0.0, c,   s,   0.0,
                0.0, -s,  c,   0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Rotation of `angle` radians about +Y (right-handed).
    #[rustfmt::skip]
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            m: [
                c,   0.0, -s,  0.0,
                0.0, 1.0, 0.0, 0.0,
                s,   0.0, c,   0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Rotation of `angle` radians about +Z (right-handed).
    #[rustfmt::skip]
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            m: [
                c,   s,   0.0, 0.0,
                -s,  c,   0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Builds the rotation matrix of a quaternion.
    ///
    /// The quaternion is used as given. A unit quaternion yields a pure rotation;
    /// the zero quaternion yields the identity.
    pub fn from_quat(q: Quat) -> Self {
        let (a2, b2, c2) = (q.x * q.x, q.y * q.y, q.z * q.z);
        let (ac, ab, bc) = (q.x * q.z, q.x * q.y, q.y * q.z);
        let (ad, bd, cd) = (q.w * q.x, q.w * q.y, q.w * q.z);

        let mut m = Self::IDENTITY;
        m.m[0] = 1.0 - 2.0 * (b2 + c2);
        m.m[1] = 2.0 * (ab + cd);
        m.m[2] = 2.0 * (ac - bd);

        m.m[4] = 2.0 * (ab - cd);
        m.m[5] = 1.0 - 2.0 * (a2 + c2);
        m.m[6] = 2.0 * (bc + ad);

        m.m[8] = 2.0 * (ac + bd);
        m.m[9] = 2.0 * (bc - ad);
        m.m[10] = 1.0 - 2.0 * (a2 + b2);
        m
    }

    /// Swaps rows and columns.
    pub fn transpose(&self) -> Self {
        let m = &self.m;
        #[rustfmt::skip]
        let t = [
            m[0], m[4], m[8],  m[12],
            m[1], m[5], m[9],  m[13],
            m[2], m[6], m[10], m[14],
            m[3], m[7], m[11], m[15],
        ];
        Self { m: t }
    }

    /// Transforms a point (w = 1), ignoring the projective row.
    pub fn transform_point3(&self, p: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0] * p.x + m[4] * p.y + m[8] * p.z + m[12],
            m[1] * p.x + m[5] * p.y + m[9] * p.z + m[13],
            m[2] * p.x + m[6] * p.y + m[10] * p.z + m[14],
        )
    }

    /// Returns true if every element differs from `other` by at most `epsilon`.
    pub fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    /// Returns false if any element is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, b: Matrix) -> Matrix {
        let a = &self.m;
        let b = &b.m;
        let mut r = [0.0f32; 16];

        r[0] = a[0] * b[0] + a[4] * b[1] + a[8] * b[2] + a[12] * b[3];
        r[1] = a[1] * b[0] + a[5] * b[1] + a[9] * b[2] + a[13] * b[3];
        r[2] = a[2] * b[0] + a[6] * b[1] + a[10] * b[2] + a[14] * b[3];
        r[3] = a[3] * b[0] + a[7] * b[1] + a[11] * b[2] + a[15] * b[3];

        r[4] = a[0] * b[4] + a[4] * b[5] + a[8] * b[6] + a[12] * b[7];
        r[5] = a[1] * b[4] + a[5] * b[5] + a[9] * b[6] + a[13] * b[7];
        r[6] = a[2] * b[4] + a[6] * b[5] + a[10] * b[6] + a[14] * b[7];
        r[7] = a[3] * b[4] + a[7] * b[5] + a[11] * b[6] + a[15] * b[7];

        r[8] = a[0] * b[8] + a[4] * b[9] + a[8] * b[10] + a[12] * b[11];
        r[9] = a[1] * b[8] + a[5] * b[9] + a[9] * b[10] + a[13] * b[11];
        r[10] = a[2] * b[8] + a[6] * b[9] + a[10] * b[10] + a[14] * b[11];
        r[11] = a[3] * b[8] + a[7] * b[9] + a[11] * b[10] + a[15] * b[11];

        r[12] = a[0] * b[12] + a[4] * b[13] + a[8] * b[14] + a[12] * b[15];
        r[13] = a[1] * b[12] + a[5] * b[13] + a[9] * b[14] + a[13] * b[15];
        r[14] = a[2] * b[12] + a[6] * b[13] + a[10] * b[14] + a[14] * b[15];
        r[15] = a[3] * b[12] + a[7] * b[13] + a[11] * b[14] + a[15] * b[15];

        Matrix { m: r }
    }
}

impl From<Mat4> for Matrix {
    fn from(m: Mat4) -> Self {
        Self {
            m: m.to_cols_array(),
        }
    }
}

impl From<Matrix> for Mat4 {
    fn from(m: Matrix) -> Self {
        Mat4::from_cols_array(&m.m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(start: f32) -> Matrix {
        let mut m = [0.0; 16];
        for (i, v) in m.iter_mut().enumerate() {
            *v = start + i as f32;
        }
        Matrix::from_cols_array(m)
    }

    #[test]
    fn identity_is_neutral_on_both_sides() {
        let m = sequential(1.0);
        assert_eq!(m * Matrix::IDENTITY, m);
        assert_eq!(Matrix::IDENTITY * m, m);

        let t = Matrix::translation(Vec3::new(-3.0, 0.5, 9.0)) * Matrix::rotation_y(0.7);
        assert_eq!(t * Matrix::IDENTITY, t);
        assert_eq!(Matrix::IDENTITY * t, t);
    }

    #[test]
    fn product_of_sequential_matrices() {
        let a = sequential(1.0);
        let b = sequential(17.0);

        #[rustfmt::skip]
        let expected = Matrix::from_cols_array([
            538.0, 612.0, 686.0, 760.0,
            650.0, 740.0, 830.0, 920.0,
            762.0, 868.0, 974.0, 1080.0,
            874.0, 996.0, 1118.0, 1240.0,
        ]);

        assert_eq!(a * b, expected);
    }

    #[test]
    fn product_of_affine_matrices() {
        // Scale (2, 3, 4) with translation (1, 2, 3), times a 90 degree turn about Z
        // with translation (5, 6, 7).
        #[rustfmt::skip]
        let a = Matrix::from_cols_array([
            2.0, 0.0, 0.0, 0.0,
            0.0, 3.0, 0.0, 0.0,
            0.0, 0.0, 4.0, 0.0,
            1.0, 2.0, 3.0, 1.0,
        ]);
        #[rustfmt::skip]
        let b = Matrix::from_cols_array([
            0.0, 1.0, 0.0, 0.0,
            -1.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            5.0, 6.0, 7.0, 1.0,
        ]);
        #[rustfmt::skip]
        let expected = Matrix::from_cols_array([
            0.0, 3.0, 0.0, 0.0,
            -2.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 4.0, 0.0,
            11.0, 20.0, 31.0, 1.0,
        ]);

        assert_eq!(a * b, expected);
    }

    #[test]
    fn agrees_with_glam() {
        let a = Matrix::translation(Vec3::new(1.0, -2.0, 0.5)) * Matrix::rotation_x(0.3);
        let b = Matrix::rotation_z(-1.1) * Matrix::scale(Vec3::new(2.0, 1.0, 0.5));

        let ours = a * b;
        let theirs = Matrix::from(Mat4::from(a) * Mat4::from(b));

        assert!(ours.abs_diff_eq(&theirs, 1e-5));
    }

    #[test]
    fn elemental_rotations_match_glam() {
        let angle = 0.85;
        assert!(Matrix::rotation_x(angle).abs_diff_eq(&Mat4::from_rotation_x(angle).into(), 1e-6));
        assert!(Matrix::rotation_y(angle).abs_diff_eq(&Mat4::from_rotation_y(angle).into(), 1e-6));
        assert!(Matrix::rotation_z(angle).abs_diff_eq(&Mat4::from_rotation_z(angle).into(), 1e-6));
    }

    #[test]
    fn from_quat_matches_glam() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 2.0, -0.5).normalize(), 1.3);
        let ours = Matrix::from_quat(q);
        let theirs = Matrix::from(Mat4::from_quat(q));
        assert!(ours.abs_diff_eq(&theirs, 1e-5));
    }

    #[test]
    fn zero_quaternion_is_identity() {
        let m = Matrix::from_quat(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert_eq!(m, Matrix::IDENTITY);
    }

    #[test]
    fn transpose_swaps_rows_and_columns() {
        let m = sequential(0.0);
        let t = m.transpose();
        for row in 0..4 {
            for col in 0..4 {
                assert_eq!(m.get(row, col), t.get(col, row));
            }
        }
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn transform_point_applies_translation() {
        let m = Matrix::translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.transform_point3(Vec3::ONE), Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn uniform_layout_matches_columns() {
        let m = sequential(0.0);
        let cols = m.to_cols_array_2d();
        assert_eq!(cols[0], [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(cols[3], [12.0, 13.0, 14.0, 15.0]);
    }
}
