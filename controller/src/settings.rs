/*!
Controller settings and tolerances.

These constants centralize the parameters used by gravity reorientation, movement
projection, ground probing and the orbit camera. The `*Settings` structs bundle them
so a game can override individual values per character.

Notes
- Distances are in meters, time in seconds, angles in degrees unless stated otherwise.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

use crate::probe::LayerMask;

/// Planar walking speed (meters per second).
pub const DEFAULT_MOVE_SPEED: f32 = 6.0;

/// Rate used to slerp the current body rotation toward its target (per second).
/// The interpolation factor for a step is `ROTATION_SPEED * dt`, clamped to 1.
pub const DEFAULT_ROTATION_SPEED: f32 = 10.0;

/// Instantaneous velocity added along up when jumping (meters per second).
pub const DEFAULT_JUMP_FORCE: f32 = 8.0;

/// Gravity magnitude in meters per second squared (positive value).
pub const DEFAULT_GRAVITY_STRENGTH: f32 = 25.0;

/// Ground probe starts this far above the body position, along up (meters).
pub const GROUND_PROBE_SKIN: f32 = 0.1;

/// Ground probe length along down (meters).
pub const GROUND_PROBE_DISTANCE: f32 = 1.2;

/// Movement input below this magnitude counts as idle.
pub const INPUT_DEADZONE: f32 = 0.1;

/// Planar speed above which the character is considered running (meters per second).
pub const RUNNING_SPEED_THRESHOLD: f32 = 0.2;

/// Surface probe used when resolving a gravity candidate starts this far behind the body
/// position, against the candidate down direction (meters).
pub const SURFACE_PROBE_SKIN: f32 = 0.05;

/// Surface probe length along the candidate down direction (meters).
pub const SURFACE_PROBE_DISTANCE: f32 = 2.0;

/// Squared length below which a projected direction is considered degenerate.
pub const DEGENERATE_EPS_SQ: f32 = 1.0e-6;

/// Angle between current and target rotation below which a transition is finished (radians).
pub const TRANSITION_EPS_RAD: f32 = 1.0e-3;

/// Orbit distance behind the target (meters).
pub const CAMERA_DISTANCE: f32 = 5.0;

/// Orbit focus height above the target along its up axis (meters).
pub const CAMERA_HEIGHT_OFFSET: f32 = 1.5;

/// Degrees of orbit per unit of look input per second.
pub const CAMERA_SENSITIVITY: f32 = 200.0;

/// Pitch limits (degrees).
pub const CAMERA_MIN_PITCH: f32 = -30.0;
pub const CAMERA_MAX_PITCH: f32 = 70.0;

/// Orbit axes are re-based once the cached up and the target up differ by more than this
/// (cosine of the angle between them).
pub const CAMERA_REBASE_COS: f32 = 0.999;

/// Per-character tuning for movement, jumping, gravity and probing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerSettings {
    pub move_speed: f32,
    pub rotation_speed: f32,
    pub jump_force: f32,
    pub gravity_strength: f32,
    pub ground_probe_skin: f32,
    pub ground_probe_distance: f32,
    pub input_deadzone: f32,
    pub running_threshold: f32,
    pub surface_probe_skin: f32,
    pub surface_probe_distance: f32,
    /// Layers considered by both the ground probe and the surface probe.
    pub probe_layers: LayerMask,
    pub transition_eps_rad: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            jump_force: DEFAULT_JUMP_FORCE,
            gravity_strength: DEFAULT_GRAVITY_STRENGTH,
            ground_probe_skin: GROUND_PROBE_SKIN,
            ground_probe_distance: GROUND_PROBE_DISTANCE,
            input_deadzone: INPUT_DEADZONE,
            running_threshold: RUNNING_SPEED_THRESHOLD,
            surface_probe_skin: SURFACE_PROBE_SKIN,
            surface_probe_distance: SURFACE_PROBE_DISTANCE,
            probe_layers: LayerMask::ALL,
            transition_eps_rad: TRANSITION_EPS_RAD,
        }
    }
}

/// Orbit camera tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSettings {
    pub distance: f32,
    pub height_offset: f32,
    pub sensitivity: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            distance: CAMERA_DISTANCE,
            height_offset: CAMERA_HEIGHT_OFFSET,
            sensitivity: CAMERA_SENSITIVITY,
            min_pitch: CAMERA_MIN_PITCH,
            max_pitch: CAMERA_MAX_PITCH,
        }
    }
}
