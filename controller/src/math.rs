/*!
Math aliases and the small set of vector helpers shared by the controller modules.

Conventions
- Body frame: local +X = right, +Y = up, +Z = forward.
- `look_rotation(forward, up)` maps local +Z onto `forward` and local +Y onto `up`.
- Every helper is a plain function of its inputs with a single evaluation order, so the
  same inputs always produce bit-identical outputs.
*/

use std::f32::consts::PI;

use nalgebra as na;

use crate::settings::DEGENERATE_EPS_SQ;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type UnitVec3 = na::Unit<Vec3>;

/// Component of `v` that lies in the plane orthogonal to `normal`.
#[inline]
pub fn project_onto_plane(v: &Vec3, normal: &UnitVec3) -> Vec3 {
    let n = normal.into_inner();
    v - n * v.dot(&n)
}

/// Component of `v` along `axis`.
#[inline]
pub fn project_onto(v: &Vec3, axis: &UnitVec3) -> Vec3 {
    let a = axis.into_inner();
    a * v.dot(&a)
}

/// Normalize `v`, or `None` if it is too short to carry a direction.
#[inline]
pub fn try_direction(v: &Vec3) -> Option<UnitVec3> {
    if !v.iter().all(|c| c.is_finite()) || v.norm_squared() <= DEGENERATE_EPS_SQ {
        return None;
    }
    Some(UnitVec3::new_normalize(*v))
}

/// Direction of `v` within the plane orthogonal to `normal`, if non-degenerate.
#[inline]
pub fn planar_direction(v: &Vec3, normal: &UnitVec3) -> Option<UnitVec3> {
    try_direction(&project_onto_plane(v, normal))
}

/// A unit vector orthogonal to `v`.
///
/// Crosses with world X, or with world Z when `v` is (nearly) parallel to X.
pub fn any_orthogonal(v: &UnitVec3) -> UnitVec3 {
    try_direction(&v.cross(&Vec3::x()))
        .or_else(|| try_direction(&v.cross(&Vec3::z())))
        .unwrap_or_else(Vec3::y_axis)
}

/// Minimal rotation sending `from` onto `to`.
///
/// Antiparallel inputs have no unique shortest arc; a half turn about [`any_orthogonal`]
/// of `from` is used so the result stays deterministic.
pub fn shortest_arc(from: &UnitVec3, to: &UnitVec3) -> Quat {
    Quat::rotation_between_axis(from, to)
        .unwrap_or_else(|| Quat::from_axis_angle(&any_orthogonal(from), PI))
}

/// Rotation whose local forward (+Z) is `forward` and whose local up (+Y) is `up`.
///
/// `forward` must not be parallel to `up`; callers pass a vector already projected onto
/// the plane orthogonal to `up`.
#[inline]
pub fn look_rotation(forward: &UnitVec3, up: &UnitVec3) -> Quat {
    Quat::face_towards(&forward.into_inner(), &up.into_inner())
}

/// Rotate `v` by `angle_degrees` about `axis` (right-hand rule).
#[inline]
pub fn rotate_about(v: &Vec3, axis: &UnitVec3, angle_degrees: f32) -> Vec3 {
    Quat::from_axis_angle(axis, angle_degrees.to_radians()) * v
}

/// True if `q` is a unit quaternion within a loose tolerance.
#[inline]
pub fn is_unit_quat(q: &Quat) -> bool {
    (q.quaternion().norm() - 1.0).abs() <= 1.0e-4
}

/// True if `v` has unit length within a loose tolerance.
#[inline]
pub fn is_unit(v: &Vec3) -> bool {
    (v.norm() - 1.0).abs() <= 1.0e-4
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: &Vec3, b: &Vec3) -> bool {
        (a - b).norm() <= 1.0e-5
    }

    #[test]
    fn plane_projection_removes_normal_component() {
        let n = Vec3::y_axis();
        let v = Vec3::new(1.0, 2.0, 3.0);

        assert!(approx(&project_onto_plane(&v, &n), &Vec3::new(1.0, 0.0, 3.0)));
        assert!(approx(&project_onto(&v, &n), &Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn try_direction_rejects_short_and_non_finite() {
        assert!(try_direction(&Vec3::zeros()).is_none());
        assert!(try_direction(&Vec3::new(1.0e-4, 0.0, 0.0)).is_none());
        assert!(try_direction(&Vec3::new(f32::NAN, 1.0, 0.0)).is_none());
        assert!(try_direction(&Vec3::new(0.0, 3.0, 0.0)).is_some());
    }

    #[test]
    fn shortest_arc_maps_from_onto_to() {
        let from = Vec3::y_axis();
        let to = UnitVec3::new_normalize(Vec3::new(0.0, 0.0, -1.0));
        let q = shortest_arc(&from, &to);

        assert!(approx(&(q * from.into_inner()), &to.into_inner()));
    }

    #[test]
    fn shortest_arc_handles_antiparallel() {
        let from = Vec3::y_axis();
        let to = -Vec3::y_axis();
        let q = shortest_arc(&from, &to);

        assert!(approx(&(q * from.into_inner()), &to.into_inner()));
    }

    #[test]
    fn any_orthogonal_is_orthogonal_for_world_axes() {
        for axis in [Vec3::x_axis(), Vec3::y_axis(), Vec3::z_axis(), -Vec3::x_axis()] {
            let o = any_orthogonal(&axis);
            assert!(o.dot(&axis.into_inner()).abs() <= 1.0e-6);
            assert!(is_unit(&o));
        }
    }

    #[test]
    fn look_rotation_aligns_forward_and_up() {
        let forward = Vec3::x_axis();
        let up = UnitVec3::new_normalize(Vec3::new(0.0, 0.0, -1.0));
        let q = look_rotation(&forward, &up);

        assert!(approx(&(q * Vec3::z()), &forward.into_inner()));
        assert!(approx(&(q * Vec3::y()), &up.into_inner()));
        assert!(is_unit_quat(&q));
    }

    #[test]
    fn rotate_about_uses_right_hand_rule() {
        let down = Vec3::new(0.0, -1.0, 0.0);
        let rotated = rotate_about(&down, &Vec3::x_axis(), -90.0);

        assert!(approx(&rotated, &Vec3::new(0.0, 0.0, 1.0)));
    }
}
