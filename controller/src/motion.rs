//! Per-tick movement against the current up axis.
//!
//! Velocity is split into a planar part (fully replaced by movement input each tick) and
//! a part along up (kept, so falls and jumps carry through). Ground detection casts along
//! the current down axis instead of world -Y.

use log::trace;

use crate::input::MoveAxes;
use crate::math::{
    Point3, Quat, UnitVec3, Vec3, look_rotation, planar_direction, project_onto,
    project_onto_plane, try_direction,
};
use crate::probe::{LayerMask, SurfaceProbe};
use crate::settings::{
    ControllerSettings, DEFAULT_MOVE_SPEED, GROUND_PROBE_DISTANCE, GROUND_PROBE_SKIN,
    INPUT_DEADZONE,
};

/// Camera axes used to make movement input camera-relative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

/// Output of a single [`MotionProjector::compute_movement`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementOutput {
    /// New facing, or `None` to keep the current target (idle).
    pub target_rotation: Option<Quat>,
    /// `horizontal + vertical`.
    pub velocity: Vec3,
    /// Component orthogonal to up.
    pub horizontal: Vec3,
    /// Component along up, carried over from the incoming velocity.
    pub vertical: Vec3,
}

#[derive(Clone, Copy, Debug)]
pub struct MotionProjector {
    pub move_speed: f32,
    pub input_deadzone: f32,
    pub ground_skin: f32,
    pub ground_distance: f32,
    pub layers: LayerMask,
}

impl Default for MotionProjector {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            input_deadzone: INPUT_DEADZONE,
            ground_skin: GROUND_PROBE_SKIN,
            ground_distance: GROUND_PROBE_DISTANCE,
            layers: LayerMask::ALL,
        }
    }
}

impl MotionProjector {
    pub fn from_settings(settings: &ControllerSettings) -> Self {
        Self {
            move_speed: settings.move_speed,
            input_deadzone: settings.input_deadzone,
            ground_skin: settings.ground_probe_skin,
            ground_distance: settings.ground_probe_distance,
            layers: settings.probe_layers,
        }
    }

    /// Camera-relative movement on the plane orthogonal to `up`.
    ///
    /// - Idle input (below the deadzone) zeroes the planar velocity and keeps facing.
    /// - Otherwise planar velocity is replaced by `move_speed` along the input direction,
    ///   and the target rotation faces that direction.
    /// - The component of `current_velocity` along `up` always passes through.
    pub fn compute_movement(
        &self,
        axes: MoveAxes,
        up: &UnitVec3,
        camera: Option<&CameraBasis>,
        body_rotation: &Quat,
        current_velocity: &Vec3,
    ) -> MovementOutput {
        let vertical = project_onto(current_velocity, up);

        // 1) Idle, including non-finite axes.
        let raw = axes.raw();
        if !raw.iter().all(|c| c.is_finite()) || raw.norm() < self.input_deadzone {
            return MovementOutput {
                target_rotation: None,
                velocity: vertical,
                horizontal: Vec3::zeros(),
                vertical,
            };
        }

        // 2) Planar camera basis, or the body's when the camera looks along up.
        let (forward, right) = planar_basis(up, camera, body_rotation);

        // 3) Input direction.
        let wish = forward.into_inner() * axes.vertical + right.into_inner() * axes.horizontal;
        let move_dir = try_direction(&wish).map_or_else(Vec3::zeros, |d| d.into_inner());

        // 4-5) Facing.
        let target_rotation = look_rotation(&desired_facing(&move_dir, up, body_rotation), up);

        // 6) Planar override, vertical carry-over.
        let horizontal = project_onto_plane(&(move_dir * self.move_speed), up);
        let velocity = horizontal + vertical;
        debug_assert!(
            horizontal.dot(&up.into_inner()).abs() <= 1.0e-3 * self.move_speed.abs().max(1.0)
        );

        MovementOutput {
            target_rotation: Some(target_rotation),
            velocity,
            horizontal,
            vertical,
        }
    }

    /// True if a surface lies within `ground_distance` below `position` along `down`.
    ///
    /// The ray starts `ground_skin` above the position so a body resting exactly on a
    /// surface still registers it.
    pub fn ground_probe(
        &self,
        position: Point3,
        down: &UnitVec3,
        probe: &dyn SurfaceProbe,
    ) -> bool {
        if !self.ground_distance.is_finite() || self.ground_distance <= 0.0 {
            return false;
        }
        let origin = position - down.into_inner() * self.ground_skin;
        probe
            .cast(origin, *down, self.ground_distance, self.layers)
            .is_some()
    }

    /// Velocity after a jump impulse, or `None` when not grounded.
    ///
    /// The component along `up` is replaced by `jump_force`; the planar part is kept.
    pub fn jump_velocity(
        &self,
        current_velocity: &Vec3,
        up: &UnitVec3,
        jump_force: f32,
        grounded: bool,
    ) -> Option<Vec3> {
        if !grounded {
            return None;
        }
        Some(project_onto_plane(current_velocity, up) + up.into_inner() * jump_force)
    }
}

/// Planar forward/right on the plane orthogonal to `up`.
///
/// Prefers the camera; falls back to the body forward, then world forward, then world
/// right. Right is always `up x forward`.
fn planar_basis(
    up: &UnitVec3,
    camera: Option<&CameraBasis>,
    body_rotation: &Quat,
) -> (UnitVec3, UnitVec3) {
    if let Some(cam) = camera {
        if let (Some(f), Some(r)) = (
            planar_direction(&cam.forward, up),
            planar_direction(&cam.right, up),
        ) {
            return (f, r);
        }
        trace!("Camera basis degenerate against up; using body basis");
    }

    let forward = body_forward_on_plane(up, body_rotation);
    let right = try_direction(&up.cross(&forward.into_inner())).unwrap_or_else(Vec3::x_axis);
    (forward, right)
}

/// Facing for a movement direction: the direction on the plane, else the body forward.
fn desired_facing(move_dir: &Vec3, up: &UnitVec3, body_rotation: &Quat) -> UnitVec3 {
    planar_direction(move_dir, up).unwrap_or_else(|| body_forward_on_plane(up, body_rotation))
}

/// Body forward on the plane orthogonal to `up`, then world forward, then world right.
fn body_forward_on_plane(up: &UnitVec3, body_rotation: &Quat) -> UnitVec3 {
    planar_direction(&(body_rotation * Vec3::z()), up)
        .or_else(|| planar_direction(&Vec3::z(), up))
        .or_else(|| planar_direction(&Vec3::x(), up))
        .unwrap_or_else(Vec3::z_axis)
}
