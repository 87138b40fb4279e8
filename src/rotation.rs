//! Rotation modes and transform composition.
//!
//! The demo edits a single four-component rotation value `(x, y, z, w)` with
//! sliders. [`RotationMode`] decides how that value becomes a rotation matrix:
//!
//! | Mode         | Interpretation                                                     |
//! |--------------|--------------------------------------------------------------------|
//! | `ZyxEuler`   | normalize, convert to Euler angles, rebuild as `Rz * Ry * Rx`       |
//! | `Quaternion` | normalize, convert straight to a matrix                            |
//! | `AxisAngle`  | split into axis and angle, rebuild a quaternion, convert to matrix |
//!
//! All three agree for unit quaternions (up to float error), which is what the
//! demo lets you see. They differ in how they treat values that are not unit
//! length, since the sliders happily produce those.
//!
//! The all-zero value is the slider default. Every mode maps it to the identity.

use glam::{Quat, Vec3};

use crate::matrix::Matrix;

/// Threshold below which the axis-angle denominator is treated as zero.
const AXIS_EPSILON: f32 = 0.000_001;

/// How the four rotation components are turned into a rotation matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RotationMode {
    #[default]
    ZyxEuler,
    Quaternion,
    AxisAngle,
}

impl RotationMode {
    /// Every mode, in dropdown order.
    pub const ALL: [RotationMode; 3] = [
        RotationMode::ZyxEuler,
        RotationMode::Quaternion,
        RotationMode::AxisAngle,
    ];

    /// The label shown in the mode dropdown.
    pub fn label(self) -> &'static str {
        match self {
            RotationMode::ZyxEuler => "ZYX Euler",
            RotationMode::Quaternion => "Quaternion",
            RotationMode::AxisAngle => "Axis Angle",
        }
    }

    /// Whether the panel exposes a slider for the `w` component.
    pub fn uses_w(self) -> bool {
        !matches!(self, RotationMode::ZyxEuler)
    }

    /// Looks a mode up by its dropdown label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.label() == label)
    }
}

impl std::fmt::Display for RotationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Scales `q` to unit length. A zero-length quaternion comes back unchanged.
pub fn normalize_quat(q: Quat) -> Quat {
    let mut length = (q.x * q.x + q.y * q.y + q.z * q.z + q.w * q.w).sqrt();
    if length == 0.0 {
        length = 1.0;
    }
    let inv = 1.0 / length;
    Quat::from_xyzw(q.x * inv, q.y * inv, q.z * inv, q.w * inv)
}

/// Converts a quaternion to Euler angles in radians.
///
/// Returns roll about X in `x`, pitch about Y in `y` and yaw about Z in `z`,
/// the angles that rebuild `q` when applied Z, then Y, then X. Pitch is taken
/// from a clamped `asin`, so it stays finite near the poles.
pub fn quat_to_euler_zyx(q: Quat) -> Vec3 {
    let x0 = 2.0 * (q.w * q.x + q.y * q.z);
    let x1 = 1.0 - 2.0 * (q.x * q.x + q.y * q.y);
    let roll = x0.atan2(x1);

    let y0 = (2.0 * (q.w * q.y - q.z * q.x)).clamp(-1.0, 1.0);
    let pitch = y0.asin();

    let z0 = 2.0 * (q.w * q.z + q.x * q.y);
    let z1 = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
    let yaw = z0.atan2(z1);

    Vec3::new(roll, pitch, yaw)
}

/// Splits a quaternion into a rotation axis and an angle in radians.
///
/// The input is only normalized when `|w| > 1`. When the axis is numerically
/// undefined (angle near zero) the axis is `+X`.
pub fn quat_to_axis_angle(q: Quat) -> (Vec3, f32) {
    let q = if q.w.abs() > 1.0 { normalize_quat(q) } else { q };

    let angle = 2.0 * q.w.acos();
    let den = (1.0 - q.w * q.w).sqrt();

    let axis = if den > AXIS_EPSILON {
        Vec3::new(q.x / den, q.y / den, q.z / den)
    } else {
        Vec3::X
    };

    (axis, angle)
}

/// Builds a unit quaternion rotating `angle` radians about `axis`.
///
/// A zero-length axis yields the identity quaternion.
pub fn quat_from_axis_angle(axis: Vec3, angle: f32) -> Quat {
    let length = axis.length();
    if length == 0.0 {
        return Quat::IDENTITY;
    }

    let axis = axis / length;
    let (s, c) = (angle * 0.5).sin_cos();
    normalize_quat(Quat::from_xyzw(axis.x * s, axis.y * s, axis.z * s, c))
}

/// Rotation matrix for `rotation` under `mode`.
///
/// Non-finite input produces the identity.
pub fn rotation_matrix(rotation: Quat, mode: RotationMode) -> Matrix {
    if !rotation.is_finite() {
        return Matrix::IDENTITY;
    }

    let m = match mode {
        RotationMode::ZyxEuler => {
            let angles = quat_to_euler_zyx(normalize_quat(rotation));
            Matrix::rotation_z(angles.z) * Matrix::rotation_y(angles.y) * Matrix::rotation_x(angles.x)
        }
        RotationMode::Quaternion => Matrix::from_quat(normalize_quat(rotation)),
        RotationMode::AxisAngle => {
            let (axis, angle) = quat_to_axis_angle(rotation);
            Matrix::from_quat(quat_from_axis_angle(axis, angle))
        }
    };

    if m.is_finite() { m } else { Matrix::IDENTITY }
}

/// Composes `Translate(position) * Rotate(rotation, mode) * Scale(scale)`.
///
/// Applied to a point, the scale acts first and the translation last.
pub fn compose_transform(position: Vec3, rotation: Quat, scale: f32, mode: RotationMode) -> Matrix {
    Matrix::translation(position) * rotation_matrix(rotation, mode) * Matrix::scale(Vec3::splat(scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPS: f32 = 1e-5;

    #[test]
    fn labels_round_trip() {
        for mode in RotationMode::ALL {
            assert_eq!(RotationMode::from_label(mode.label()), Some(mode));
        }
        assert_eq!(RotationMode::from_label("Matrix"), None);
        assert_eq!(RotationMode::default(), RotationMode::ZyxEuler);
    }

    #[test]
    fn only_euler_hides_w() {
        assert!(!RotationMode::ZyxEuler.uses_w());
        assert!(RotationMode::Quaternion.uses_w());
        assert!(RotationMode::AxisAngle.uses_w());
    }

    #[test]
    fn normalize_keeps_zero() {
        let zero = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        assert_eq!(normalize_quat(zero), zero);

        let q = normalize_quat(Quat::from_xyzw(0.0, 3.0, 0.0, 4.0));
        assert!((q.y - 0.6).abs() < EPS);
        assert!((q.w - 0.8).abs() < EPS);
    }

    #[test]
    fn identity_quaternion_gives_identity_matrix() {
        for mode in [RotationMode::Quaternion, RotationMode::AxisAngle] {
            let m = rotation_matrix(Quat::IDENTITY, mode);
            assert!(m.abs_diff_eq(&Matrix::IDENTITY, EPS), "{mode}: {m:?}");
        }
    }

    #[test]
    fn zero_rotation_gives_identity_in_every_mode() {
        let zero = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        for mode in RotationMode::ALL {
            let m = rotation_matrix(zero, mode);
            assert!(m.abs_diff_eq(&Matrix::IDENTITY, EPS), "{mode}: {m:?}");
        }
    }

    #[test]
    fn non_finite_rotation_gives_identity() {
        let bad = Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0);
        for mode in RotationMode::ALL {
            assert_eq!(rotation_matrix(bad, mode), Matrix::IDENTITY);
        }
    }

    #[test]
    fn quarter_turn_about_z_agrees_across_modes() {
        let q = Quat::from_xyzw(0.0, 0.0, FRAC_PI_4.sin(), FRAC_PI_4.cos());
        let expected = Matrix::rotation_z(FRAC_PI_2);

        for mode in RotationMode::ALL {
            let m = rotation_matrix(q, mode);
            assert!(m.abs_diff_eq(&expected, EPS), "{mode}: {m:?}");
        }

        // +X maps to +Y.
        let p = expected.transform_point3(Vec3::X);
        assert!((p - Vec3::Y).length() < EPS);
    }

    #[test]
    fn modes_agree_for_unit_quaternions() {
        let q = Quat::from_axis_angle(Vec3::new(0.3, -1.0, 0.4).normalize(), 1.2);
        let reference = rotation_matrix(q, RotationMode::Quaternion);
        assert!(rotation_matrix(q, RotationMode::ZyxEuler).abs_diff_eq(&reference, 1e-4));
        assert!(rotation_matrix(q, RotationMode::AxisAngle).abs_diff_eq(&reference, 1e-4));
    }

    #[test]
    fn unnormalized_slider_values_still_rotate() {
        // Slider values are raw components, often far from unit length.
        let q = Quat::from_xyzw(0.0, 0.0, 90.0, 90.0);
        let m = rotation_matrix(q, RotationMode::Quaternion);
        assert!(m.abs_diff_eq(&Matrix::rotation_z(FRAC_PI_2), EPS));

        let e = rotation_matrix(q, RotationMode::ZyxEuler);
        assert!(e.abs_diff_eq(&Matrix::rotation_z(FRAC_PI_2), EPS));
    }

    #[test]
    fn euler_angles_of_single_axis_rotations() {
        let angles = quat_to_euler_zyx(Quat::from_rotation_x(0.5));
        assert!((angles - Vec3::new(0.5, 0.0, 0.0)).length() < EPS);

        let angles = quat_to_euler_zyx(Quat::from_rotation_y(-0.7));
        assert!((angles - Vec3::new(0.0, -0.7, 0.0)).length() < EPS);

        let angles = quat_to_euler_zyx(Quat::from_rotation_z(1.1));
        assert!((angles - Vec3::new(0.0, 0.0, 1.1)).length() < EPS);
    }

    #[test]
    fn euler_pitch_is_clamped() {
        // 2(wy - zx) exceeds 1 for this non-unit value; asin would be NaN unclamped.
        let angles = quat_to_euler_zyx(Quat::from_xyzw(0.0, 1.0, 0.0, 1.0));
        assert!(angles.is_finite());
        assert!((angles.y - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn axis_angle_decomposition() {
        let q = Quat::from_axis_angle(Vec3::Y, 1.0);
        let (axis, angle) = quat_to_axis_angle(q);
        assert!((axis - Vec3::Y).length() < EPS);
        assert!((angle - 1.0).abs() < EPS);

        let (axis, angle) = quat_to_axis_angle(Quat::IDENTITY);
        assert_eq!(axis, Vec3::X);
        assert!(angle.abs() < EPS);
    }

    #[test]
    fn axis_angle_normalizes_large_w() {
        let (axis, angle) = quat_to_axis_angle(Quat::from_xyzw(0.0, 0.0, 0.0, 5.0));
        assert_eq!(axis, Vec3::X);
        assert!(angle.abs() < EPS);
    }

    #[test]
    fn zero_axis_gives_identity_quaternion() {
        assert_eq!(quat_from_axis_angle(Vec3::ZERO, 2.0), Quat::IDENTITY);

        let q = quat_from_axis_angle(Vec3::new(0.0, 0.0, 2.0), FRAC_PI_2);
        let expected = Quat::from_rotation_z(FRAC_PI_2);
        assert!(q.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn compose_is_translate_rotate_scale() {
        let position = Vec3::new(1.0, 2.0, 3.0);
        let rotation = Quat::from_rotation_y(0.6);
        let mode = RotationMode::Quaternion;

        let composed = compose_transform(position, rotation, 2.5, mode);
        let manual = Matrix::translation(position)
            * rotation_matrix(rotation, mode)
            * Matrix::scale(Vec3::splat(2.5));
        assert_eq!(composed, manual);

        let glam = glam::Mat4::from_scale_rotation_translation(Vec3::splat(2.5), rotation, position);
        assert!(composed.abs_diff_eq(&glam.into(), 1e-5));
    }

    #[test]
    fn translate_then_rotate_differs_from_rotate_then_translate() {
        let t = Matrix::translation(Vec3::new(5.0, 0.0, 0.0));
        let r = rotation_matrix(
            Quat::from_xyzw(0.0, 0.0, FRAC_PI_4.sin(), FRAC_PI_4.cos()),
            RotationMode::Quaternion,
        );
        let point = Vec3::new(1.0, 0.0, 0.0);

        let tr = (t * r).transform_point3(point);
        let rt = (r * t).transform_point3(point);

        assert!((tr - Vec3::new(5.0, 1.0, 0.0)).length() < EPS);
        assert!((rt - Vec3::new(0.0, 6.0, 0.0)).length() < EPS);
        assert!((tr - rt).length() > 1.0);
    }

    #[test]
    fn default_state_composes_to_identity() {
        let m = compose_transform(Vec3::ZERO, Quat::from_xyzw(0.0, 0.0, 0.0, 0.0), 1.0, RotationMode::ZyxEuler);
        assert!(m.abs_diff_eq(&Matrix::IDENTITY, EPS));
    }
}
