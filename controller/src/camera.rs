/*!
Third-person orbit camera that follows the character's up axis.

The orbit axes (up/right) are cached from the target and only re-based once the target's
up drifts past [`CAMERA_REBASE_COS`], so small wobbles during a rotation slerp do not shake
the view while a committed gravity change swings the orbit onto the new frame.

Pose
- `focus = target + up * height_offset`
- `position = focus + (yaw about up * pitch about right) * (back * distance)`
- `rotation = look_rotation(focus - position, up)`
*/

use log::debug;

use crate::math::{Point3, Quat, UnitVec3, Vec3, look_rotation, try_direction};
use crate::motion::CameraBasis;
use crate::settings::{CAMERA_REBASE_COS, CameraSettings};

#[derive(Clone, Debug)]
pub struct OrbitCamera {
    settings: CameraSettings,
    /// Degrees about the cached up axis.
    yaw: f32,
    /// Degrees about the cached right axis, clamped to the settings range.
    pitch: f32,
    orbit_up: UnitVec3,
    orbit_right: UnitVec3,
    position: Point3,
    rotation: Quat,
}

impl OrbitCamera {
    pub fn new(settings: CameraSettings, target_position: Point3, target_rotation: &Quat) -> Self {
        let mut camera = Self {
            settings,
            yaw: 0.0,
            pitch: 0.0_f32.clamp(settings.min_pitch, settings.max_pitch),
            orbit_up: target_rotation * Vec3::y_axis(),
            orbit_right: target_rotation * Vec3::x_axis(),
            position: target_position,
            rotation: *target_rotation,
        };
        camera.place(target_position);
        camera
    }

    /// Apply a look delta and follow the target.
    pub fn update(
        &mut self,
        look: (f32, f32),
        dt: f32,
        target_position: Point3,
        target_rotation: &Quat,
    ) {
        let step = self.settings.sensitivity * dt;
        self.yaw += look.0 * step;
        self.pitch = (self.pitch - look.1 * step)
            .clamp(self.settings.min_pitch, self.settings.max_pitch);

        let target_up = target_rotation * Vec3::y_axis();
        if self.orbit_up.dot(&target_up.into_inner()) < CAMERA_REBASE_COS {
            debug!(
                "Re-basing orbit axes: up {:?} -> {:?}",
                self.orbit_up.into_inner(),
                target_up.into_inner()
            );
            self.orbit_up = target_up;
            self.orbit_right = target_rotation * Vec3::x_axis();
        }

        self.place(target_position);
    }

    fn place(&mut self, target_position: Point3) {
        let yaw_rot = Quat::from_axis_angle(&self.orbit_up, self.yaw.to_radians());
        let pitch_rot = Quat::from_axis_angle(&self.orbit_right, self.pitch.to_radians());
        // Back of the cached frame: up x right == -forward.
        let back = self.orbit_up.cross(&self.orbit_right.into_inner());
        let offset = (yaw_rot * pitch_rot) * (back * self.settings.distance);

        let focus = target_position + self.orbit_up.into_inner() * self.settings.height_offset;
        self.position = focus + offset;
        if let Some(view) = try_direction(&(focus - self.position)) {
            self.rotation = look_rotation(&view, &self.orbit_up);
        }
    }

    #[inline]
    pub fn position(&self) -> Point3 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    pub fn orbit_up(&self) -> UnitVec3 {
        self.orbit_up
    }

    /// Camera forward/right for camera-relative movement.
    pub fn basis(&self) -> CameraBasis {
        CameraBasis {
            forward: self.rotation * Vec3::z(),
            right: self.rotation * Vec3::x(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: &Vec3, b: &Vec3) -> bool {
        (a - b).norm() <= 1.0e-4
    }

    fn upright() -> OrbitCamera {
        OrbitCamera::new(CameraSettings::default(), Point3::origin(), &Quat::identity())
    }

    #[test]
    fn default_pose_sits_behind_and_above() {
        let camera = upright();

        assert!(approx(&camera.position().coords, &Vec3::new(0.0, 1.5, -5.0)));
        let basis = camera.basis();
        assert!(approx(&basis.forward, &Vec3::z()));
        assert!(approx(&basis.right, &Vec3::x()));
    }

    #[test]
    fn pitch_is_clamped() {
        let settings = CameraSettings::default();
        let mut camera = OrbitCamera::new(settings, Point3::origin(), &Quat::identity());

        camera.update((0.0, -10.0), 1.0, Point3::origin(), &Quat::identity());
        assert_eq!(camera.pitch(), settings.max_pitch);

        camera.update((0.0, 10.0), 1.0, Point3::origin(), &Quat::identity());
        assert_eq!(camera.pitch(), settings.min_pitch);
    }

    #[test]
    fn positive_pitch_raises_camera_along_up() {
        let mut camera = upright();

        camera.update((0.0, -0.1), 1.0, Point3::origin(), &Quat::identity());

        assert!(camera.pitch() > 0.0);
        assert!(camera.position().y > 1.5);
        // Looking down at the focus.
        assert!(camera.basis().forward.y < 0.0);
    }

    #[test]
    fn small_tilt_keeps_orbit_axes() {
        let mut camera = upright();
        let tilted = Quat::from_axis_angle(&Vec3::x_axis(), 1.0_f32.to_radians());

        camera.update((0.0, 0.0), 0.016, Point3::origin(), &tilted);

        assert_eq!(camera.orbit_up(), Vec3::y_axis());
    }

    #[test]
    fn gravity_change_rebases_orbit() {
        let mut camera = upright();
        // Up becomes world -Z, forward becomes world +Y.
        let tipped = Quat::from_axis_angle(&Vec3::x_axis(), -std::f32::consts::FRAC_PI_2);

        camera.update((0.0, 0.0), 0.016, Point3::origin(), &tipped);

        assert!(approx(&camera.orbit_up().into_inner(), &-Vec3::z()));
        assert!(approx(&camera.position().coords, &Vec3::new(0.0, -5.0, -1.5)));
        assert!(approx(&camera.basis().forward, &Vec3::y()));
    }
}
