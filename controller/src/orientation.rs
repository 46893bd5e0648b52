/*!
Orientation frame and gravity candidate resolution.

Resolution turns a candidate gravity into a committed gravity and a target body rotation:

1. Probe along the candidate down direction. A hit aligns up with the surface normal,
   a miss trusts the candidate itself.
2. Keep the strength of the candidate; only its direction changes.
3. Carry the old heading into the new frame with the shortest-arc rotation between the old
   and new up axes, so the character does not snap-turn when gravity changes.

Every projection that can collapse to zero has an ordered fallback chain ending in a
vector that is non-degenerate by construction, so resolution always yields a valid frame.
*/

use log::trace;

use crate::gravity::GravityVector;
use crate::math::{
    Point3, Quat, UnitVec3, Vec3, is_unit_quat, look_rotation, planar_direction, shortest_arc,
    try_direction,
};
use crate::probe::{LayerMask, SurfaceProbe, cast_for_normal};
use crate::settings::{ControllerSettings, SURFACE_PROBE_DISTANCE, SURFACE_PROBE_SKIN};

/// Body orientation: the committed up axis, the rotation currently shown, and the rotation
/// it is being interpolated toward.
///
/// The controller only ever sets `target_rotation`; `current_rotation` moves toward it in
/// [`OrientationFrame::step_toward_target`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationFrame {
    pub up: UnitVec3,
    pub current_rotation: Quat,
    pub target_rotation: Quat,
}

impl OrientationFrame {
    /// Frame at rest in `rotation`; up is the rotation's local +Y.
    pub fn new(rotation: Quat) -> Self {
        Self {
            up: rotation * Vec3::y_axis(),
            current_rotation: rotation,
            target_rotation: rotation,
        }
    }

    /// Body forward (local +Z) of the current rotation.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.current_rotation * Vec3::z()
    }

    /// Body right (local +X) of the current rotation.
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.current_rotation * Vec3::x()
    }

    #[inline]
    pub fn set_target(&mut self, target: Quat) {
        debug_assert!(is_unit_quat(&target));
        self.target_rotation = target;
    }

    /// Angle between the current and the target rotation (radians).
    #[inline]
    pub fn angle_to_target(&self) -> f32 {
        self.current_rotation.angle_to(&self.target_rotation)
    }

    /// Slerp the current rotation toward the target by `t` in `[0, 1]`.
    pub fn step_toward_target(&mut self, t: f32) {
        let t = t.clamp(0.0, 1.0);
        self.current_rotation = self
            .current_rotation
            .try_slerp(&self.target_rotation, t, 1.0e-6)
            .unwrap_or(self.target_rotation);
        debug_assert!(is_unit_quat(&self.current_rotation));
    }
}

/// Where the pre-transition heading was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OldHeading {
    BodyForward,
    BodyRight,
    WorldForward,
    WorldRight,
}

/// Where the post-transition forward was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadingSource {
    /// Old heading carried across by the shortest-arc rotation.
    Mapped,
    BodyForward,
    CameraForward,
    /// `new_up x old_up`.
    UpCross,
    WorldForward,
    WorldRight,
}

/// Inputs for a single candidate resolution.
#[derive(Clone, Copy, Debug)]
pub struct ResolveRequest {
    pub candidate: GravityVector,
    pub current_up: UnitVec3,
    pub body_forward: Vec3,
    pub body_right: Vec3,
    /// Body position; the surface probe starts here.
    pub position: Point3,
    pub camera_forward: Option<Vec3>,
}

/// Outcome of [`OrientationResolver::resolve_candidate`]. Nothing is committed yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub committed_gravity: GravityVector,
    pub target_rotation: Quat,
    pub chosen_up: UnitVec3,
    pub forward: UnitVec3,
    /// True when the probe hit and `chosen_up` is the surface normal.
    pub surface_aligned: bool,
    pub old_heading: OldHeading,
    pub heading: HeadingSource,
}

impl Resolution {
    /// True if any heading fallback tier was needed.
    #[inline]
    pub fn used_fallback(&self) -> bool {
        self.old_heading != OldHeading::BodyForward || self.heading != HeadingSource::Mapped
    }
}

/// Resolves gravity candidates against the environment.
#[derive(Clone, Copy, Debug)]
pub struct OrientationResolver {
    pub probe_skin: f32,
    pub probe_distance: f32,
    pub layers: LayerMask,
}

impl Default for OrientationResolver {
    fn default() -> Self {
        Self {
            probe_skin: SURFACE_PROBE_SKIN,
            probe_distance: SURFACE_PROBE_DISTANCE,
            layers: LayerMask::ALL,
        }
    }
}

impl OrientationResolver {
    pub fn from_settings(settings: &ControllerSettings) -> Self {
        Self {
            probe_skin: settings.surface_probe_skin,
            probe_distance: settings.surface_probe_distance,
            layers: settings.probe_layers,
        }
    }

    /// Candidate as shown by preview displays. No probing, no side effects.
    #[inline]
    pub fn preview_only(
        &self,
        candidate: GravityVector,
        _frame: &OrientationFrame,
    ) -> GravityVector {
        candidate
    }

    /// Compute the committed gravity and target rotation for `req.candidate`.
    ///
    /// Pass [`crate::probe::NoSurface`] when no probe is available; it resolves exactly
    /// like a miss.
    pub fn resolve_candidate(&self, req: &ResolveRequest, probe: &dyn SurfaceProbe) -> Resolution {
        let down = req.candidate.direction();

        // 1-2) Surface-aligned up, or the candidate itself.
        let origin = req.position - down.into_inner() * self.probe_skin;
        let surface_up = cast_for_normal(probe, origin, down, self.probe_distance, self.layers);
        let surface_aligned = surface_up.is_some();
        let chosen_up = surface_up.unwrap_or(-down);

        // 3) Same strength, new direction.
        let committed_gravity = GravityVector::along(&-chosen_up, &req.candidate);

        // 4) Heading in the old frame.
        let (old_heading_dir, old_heading) = heading_before(req);

        // 5-6) Carry it into the new frame.
        let arc = shortest_arc(&req.current_up, &chosen_up);
        let mapped = arc * old_heading_dir.into_inner();
        let (forward, heading) = heading_after(&mapped, &chosen_up, req);

        // 7) Target rotation.
        let target_rotation = look_rotation(&forward, &chosen_up);
        debug_assert!(is_unit_quat(&target_rotation));
        debug_assert!(forward.dot(&chosen_up.into_inner()).abs() <= 1.0e-3);

        let resolution = Resolution {
            committed_gravity,
            target_rotation,
            chosen_up,
            forward,
            surface_aligned,
            old_heading,
            heading,
        };
        if resolution.used_fallback() {
            trace!("Heading fallback: old={old_heading:?} new={heading:?}");
        }
        resolution
    }
}

fn heading_before(req: &ResolveRequest) -> (UnitVec3, OldHeading) {
    let up = &req.current_up;
    if let Some(d) = planar_direction(&req.body_forward, up) {
        return (d, OldHeading::BodyForward);
    }
    if let Some(d) = planar_direction(&req.body_right, up) {
        return (d, OldHeading::BodyRight);
    }
    if let Some(d) = planar_direction(&Vec3::z(), up) {
        return (d, OldHeading::WorldForward);
    }
    // World forward is parallel to `up`, so world right is orthogonal to it.
    let right = planar_direction(&Vec3::x(), up).unwrap_or_else(Vec3::x_axis);
    (right, OldHeading::WorldRight)
}

fn heading_after(
    mapped: &Vec3,
    new_up: &UnitVec3,
    req: &ResolveRequest,
) -> (UnitVec3, HeadingSource) {
    if let Some(d) = planar_direction(mapped, new_up) {
        return (d, HeadingSource::Mapped);
    }
    // The shortest arc carries a non-degenerate forward onto the new plane, so the tiers
    // below only run when the incoming forward was itself degenerate.
    if let Some(d) = planar_direction(&req.body_forward, new_up) {
        return (d, HeadingSource::BodyForward);
    }
    if let Some(d) = req
        .camera_forward
        .and_then(|cam| planar_direction(&cam, new_up))
    {
        return (d, HeadingSource::CameraForward);
    }
    if let Some(d) = try_direction(&new_up.cross(&req.current_up.into_inner())) {
        return (d, HeadingSource::UpCross);
    }
    if let Some(d) = planar_direction(&Vec3::z(), new_up) {
        return (d, HeadingSource::WorldForward);
    }
    let right = planar_direction(&Vec3::x(), new_up).unwrap_or_else(Vec3::x_axis);
    (right, HeadingSource::WorldRight)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::math::rotate_about;
    use crate::probe::{NoSurface, SurfaceHit};

    const STRENGTH: f32 = 25.0;

    fn approx(a: &Vec3, b: &Vec3) -> bool {
        (a - b).norm() <= 1.0e-4
    }

    fn upright_request(candidate: Vec3, body_rotation: Quat) -> ResolveRequest {
        ResolveRequest {
            candidate: GravityVector::new(candidate).unwrap(),
            current_up: Vec3::y_axis(),
            body_forward: body_rotation * Vec3::z(),
            body_right: body_rotation * Vec3::x(),
            position: Point3::new(0.0, 1.0, 0.0),
            camera_forward: None,
        }
    }

    fn hit_probe(normal: Vec3) -> impl Fn(Point3, UnitVec3, f32, LayerMask) -> Option<SurfaceHit> {
        move |_, _, _, _| {
            Some(SurfaceHit {
                normal,
                distance: 0.5,
            })
        }
    }

    #[test]
    fn forward_flip_on_miss_trusts_candidate() {
        // World down rotated -90 degrees about world right: world forward becomes down.
        let candidate = rotate_about(&Vec3::new(0.0, -STRENGTH, 0.0), &Vec3::x_axis(), -90.0);
        let req = upright_request(candidate, Quat::identity());

        let r = OrientationResolver::default().resolve_candidate(&req, &NoSurface);

        assert!(!r.surface_aligned);
        assert!(approx(&r.committed_gravity.vector(), &(Vec3::z() * STRENGTH)));
        assert!(approx(&r.chosen_up.into_inner(), &Vec3::new(0.0, 0.0, -1.0)));
        // Tipping onto the wall ahead: old up becomes the new forward.
        assert!(approx(&r.forward.into_inner(), &Vec3::y()));
        assert!(!r.used_fallback());
    }

    #[test]
    fn surface_normal_wins_over_candidate() {
        let req = upright_request(Vec3::new(STRENGTH, 0.0, 0.0), Quat::identity());
        let probe = hit_probe(Vec3::new(0.0, 1.0, 0.0));

        let r = OrientationResolver::default().resolve_candidate(&req, &probe);

        assert!(r.surface_aligned);
        assert!(approx(&r.chosen_up.into_inner(), &Vec3::y()));
        assert!(approx(&r.committed_gravity.vector(), &Vec3::new(0.0, -STRENGTH, 0.0)));
    }

    #[test]
    fn hit_normal_is_normalized_before_use() {
        let req = upright_request(Vec3::new(STRENGTH, 0.0, 0.0), Quat::identity());
        let probe = hit_probe(Vec3::new(-4.0, 0.0, 0.0));

        let r = OrientationResolver::default().resolve_candidate(&req, &probe);

        assert!(approx(&r.chosen_up.into_inner(), &-Vec3::x()));
        assert!((r.committed_gravity.magnitude() - STRENGTH).abs() <= 1.0e-4);
    }

    #[test]
    fn unavailable_probe_behaves_like_miss() {
        let candidate = Vec3::new(0.0, 0.0, STRENGTH);
        let req = upright_request(candidate, Quat::identity());
        let resolver = OrientationResolver::default();

        let silent = |_: Point3, _: UnitVec3, _: f32, _: LayerMask| -> Option<SurfaceHit> {
            None
        };
        let without = resolver.resolve_candidate(&req, &NoSurface);
        let missed = resolver.resolve_candidate(&req, &silent);

        assert_eq!(without, missed);
        assert!(approx(&without.chosen_up.into_inner(), &-Vec3::z()));
    }

    #[test]
    fn probe_is_cast_from_behind_the_body_along_candidate_down() {
        let seen = Cell::new(None);
        let probe = |origin: Point3, dir: UnitVec3, max: f32, _: LayerMask| -> Option<SurfaceHit> {
            seen.set(Some((origin, dir, max)));
            None
        };
        let req = upright_request(Vec3::new(STRENGTH, 0.0, 0.0), Quat::identity());
        let resolver = OrientationResolver::default();

        resolver.resolve_candidate(&req, &probe);

        let (origin, dir, max) = seen.get().unwrap();
        assert!(approx(&origin.coords, &Vec3::new(-SURFACE_PROBE_SKIN, 1.0, 0.0)));
        assert!(approx(&dir.into_inner(), &Vec3::x()));
        assert_eq!(max, SURFACE_PROBE_DISTANCE);
    }

    #[test]
    fn heading_is_carried_by_shortest_arc() {
        // Yawed body, not aligned with any world axis.
        let body = Quat::from_axis_angle(&Vec3::y_axis(), 0.5);
        let candidate = Vec3::new(STRENGTH, 0.0, 0.0);
        let req = upright_request(candidate, body);

        let r = OrientationResolver::default().resolve_candidate(&req, &NoSurface);

        assert!(!r.used_fallback());
        let arc = shortest_arc(&req.current_up, &r.chosen_up);
        let old = planar_direction(&req.body_forward, &req.current_up).unwrap();
        let expected = planar_direction(&(arc * old.into_inner()), &r.chosen_up).unwrap();
        assert!(r.forward.angle(&expected.into_inner()) <= 1.0e-4);
    }

    #[test]
    fn half_turn_flip_keeps_heading() {
        let req = upright_request(Vec3::new(0.0, STRENGTH, 0.0), Quat::identity());

        let r = OrientationResolver::default().resolve_candidate(&req, &NoSurface);

        assert!(approx(&r.chosen_up.into_inner(), &-Vec3::y()));
        assert!(approx(&r.forward.into_inner(), &Vec3::z()));
        assert!(!r.used_fallback());
    }

    #[test]
    fn body_forward_along_up_falls_back_to_right() {
        // Body pitched so its forward points straight up.
        let body = Quat::from_axis_angle(&Vec3::x_axis(), -std::f32::consts::FRAC_PI_2);
        let req = upright_request(Vec3::new(STRENGTH, 0.0, 0.0), body);
        assert!(approx(&req.body_forward, &Vec3::y()));

        let r = OrientationResolver::default().resolve_candidate(&req, &NoSurface);

        assert_eq!(r.old_heading, OldHeading::BodyRight);
        assert!(r.used_fallback());
        assert!(r.forward.dot(&r.chosen_up.into_inner()).abs() <= 1.0e-4);
    }

    #[test]
    fn degenerate_body_uses_world_forward() {
        let req = ResolveRequest {
            candidate: GravityVector::new(Vec3::new(STRENGTH, 0.0, 0.0)).unwrap(),
            current_up: Vec3::y_axis(),
            body_forward: Vec3::y(),
            body_right: Vec3::zeros(),
            position: Point3::origin(),
            camera_forward: None,
        };

        let r = OrientationResolver::default().resolve_candidate(&req, &NoSurface);

        assert_eq!(r.old_heading, OldHeading::WorldForward);
        assert!(r.forward.dot(&r.chosen_up.into_inner()).abs() <= 1.0e-4);
    }

    #[test]
    fn target_rotation_matches_chosen_frame() {
        let body = Quat::from_axis_angle(&Vec3::y_axis(), -1.2);
        let req = upright_request(Vec3::new(1.0, -2.0, 0.5), body);
        let probe = hit_probe(Vec3::new(0.3, 0.9, -0.1));

        let r = OrientationResolver::default().resolve_candidate(&req, &probe);

        assert!(is_unit_quat(&r.target_rotation));
        assert!(approx(&(r.target_rotation * Vec3::y()), &r.chosen_up.into_inner()));
        assert!(approx(&(r.target_rotation * Vec3::z()), &r.forward.into_inner()));
    }

    #[test]
    fn preview_returns_candidate_unchanged() {
        let candidate = GravityVector::new(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        let frame = OrientationFrame::new(Quat::identity());

        assert_eq!(
            OrientationResolver::default().preview_only(candidate, &frame),
            candidate
        );
    }

    #[test]
    fn frame_steps_toward_target() {
        let mut frame = OrientationFrame::new(Quat::identity());
        frame.set_target(Quat::from_axis_angle(&Vec3::x_axis(), 1.0));

        frame.step_toward_target(0.5);
        assert!((frame.angle_to_target() - 0.5).abs() <= 1.0e-4);

        frame.step_toward_target(1.0);
        assert!(frame.angle_to_target() <= 1.0e-4);
    }

    fn heading_request(
        current_up: UnitVec3,
        body_forward: Vec3,
        camera: Option<Vec3>,
    ) -> ResolveRequest {
        ResolveRequest {
            candidate: GravityVector::new(Vec3::new(0.0, -STRENGTH, 0.0)).unwrap(),
            current_up,
            body_forward,
            body_right: Vec3::x(),
            position: Point3::origin(),
            camera_forward: camera,
        }
    }

    #[test]
    fn heading_tiers_follow_in_order_when_mapped_is_degenerate() {
        let none = Vec3::zeros();
        let cases = [
            (
                heading_request(Vec3::y_axis(), Vec3::z(), None),
                Vec3::y_axis(),
                Vec3::z(),
                HeadingSource::BodyForward,
            ),
            (
                heading_request(Vec3::y_axis(), Vec3::y(), Some(Vec3::x())),
                Vec3::y_axis(),
                Vec3::x(),
                HeadingSource::CameraForward,
            ),
            (
                heading_request(Vec3::z_axis(), Vec3::y(), None),
                Vec3::y_axis(),
                Vec3::x(),
                HeadingSource::UpCross,
            ),
            (
                heading_request(Vec3::y_axis(), Vec3::y(), None),
                Vec3::y_axis(),
                Vec3::z(),
                HeadingSource::WorldForward,
            ),
            (
                heading_request(Vec3::z_axis(), Vec3::z(), None),
                Vec3::z_axis(),
                Vec3::x(),
                HeadingSource::WorldRight,
            ),
        ];

        for (req, new_up, want, source) in cases {
            let (got, got_source) = heading_after(&none, &new_up, &req);
            assert_eq!(got_source, source);
            assert!(approx(&got.into_inner(), &want), "{source:?}: {got:?}");
        }
    }
}
