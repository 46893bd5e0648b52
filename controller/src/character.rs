/*!
Per-character state machine.

`Character` owns the gravity state, the orientation frame and the kinematic state of one
body, plus its injected collaborators. A host drives it through two entry points:

- [`Character::tick`] at frame rate: classified input, ground refresh, movement targets,
  animation flags and the orbit camera.
- [`Character::integrate`] at the fixed physics rate: gravity acceleration and rotation
  interpolation.

The host's physics step moves the body using [`Character::velocity`] and
[`Character::up`], then writes the resolved position back with [`Character::sync_body`].
*/

use log::{info, trace};

use crate::animation::{AnimationFlags, AnimationSink};
use crate::camera::OrbitCamera;
use crate::gravity::{GravityState, GravityVector, PendingSelection};
use crate::input::{Cardinal, InputEvent, TickInput};
use crate::math::{Point3, Quat, UnitVec3, Vec3};
use crate::motion::{CameraBasis, MotionProjector};
use crate::orientation::{OrientationFrame, OrientationResolver, ResolveRequest, Resolution};
use crate::preview::PreviewDisplay;
use crate::probe::SurfaceProbe;
use crate::settings::{CameraSettings, ControllerSettings};

/// Locomotion, driven by the ground probe and planar speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Locomotion {
    Idle,
    GroundedMoving,
    Airborne,
}

/// Gravity selection phase. Orthogonal to [`Locomotion`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GravityPhase {
    Settled,
    /// A selection is previewed and awaits confirm or cancel.
    Pending,
    /// The body is still rotating toward its target.
    Transitioning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterState {
    pub locomotion: Locomotion,
    pub gravity_phase: GravityPhase,
}

pub struct Character<P, D, A> {
    settings: ControllerSettings,
    gravity: GravityState,
    frame: OrientationFrame,
    resolver: OrientationResolver,
    projector: MotionProjector,
    camera: Option<OrbitCamera>,

    position: Point3,
    velocity: Vec3,
    horizontal_speed: f32,
    grounded: bool,
    /// Set on commit, cleared once the body reaches the committed frame.
    transitioning: bool,
    last_resolution: Option<Resolution>,

    probe: P,
    preview: D,
    animation: A,
}

impl<P, D, A> Character<P, D, A>
where
    P: SurfaceProbe,
    D: PreviewDisplay,
    A: AnimationSink,
{
    /// Spawn upright under world-down gravity, facing world forward.
    pub fn new(
        settings: ControllerSettings,
        position: Point3,
        probe: P,
        preview: D,
        animation: A,
    ) -> Result<Self, &'static str> {
        let gravity = GravityVector::world_down(settings.gravity_strength)?;
        Ok(Self {
            settings,
            gravity: GravityState::new(gravity),
            frame: OrientationFrame::new(Quat::identity()),
            resolver: OrientationResolver::from_settings(&settings),
            projector: MotionProjector::from_settings(&settings),
            camera: None,
            position,
            velocity: Vec3::zeros(),
            horizontal_speed: 0.0,
            grounded: false,
            transitioning: false,
            last_resolution: None,
            probe,
            preview,
            animation,
        })
    }

    /// Attach an orbit camera following this character.
    pub fn with_camera(mut self, settings: CameraSettings) -> Self {
        self.camera = Some(OrbitCamera::new(
            settings,
            self.position,
            &self.frame.current_rotation,
        ));
        self
    }

    /// Variable-rate update.
    ///
    /// The ground is probed at the current position before events are handled, so a jump
    /// only applies if the body is on a surface now. It is probed again after the events
    /// since a confirm may have changed the down axis.
    pub fn tick(&mut self, dt: f32, input: &TickInput) {
        self.refresh_grounded();
        for event in &input.events {
            self.handle_event(*event);
        }
        self.refresh_grounded();

        let camera = self.camera_basis();
        let movement = self.projector.compute_movement(
            input.axes,
            &self.gravity.up(),
            camera.as_ref(),
            &self.frame.current_rotation,
            &self.velocity,
        );
        if let Some(rotation) = movement.target_rotation {
            self.frame.set_target(rotation);
        }
        self.velocity = movement.velocity;
        self.horizontal_speed = movement.horizontal.norm();

        self.animation.set_flags(AnimationFlags::from_motion(
            self.horizontal_speed,
            self.grounded,
            self.settings.running_threshold,
        ));

        if let Some(camera) = self.camera.as_mut() {
            camera.update(input.look, dt, self.position, &self.frame.current_rotation);
        }
    }

    /// Fixed-rate update.
    pub fn integrate(&mut self, fixed_dt: f32) {
        if !fixed_dt.is_finite() || fixed_dt <= 0.0 {
            return;
        }

        let up = self.gravity.up().into_inner();
        if self.grounded {
            // Keep jumps, drop velocity into the ground.
            let along = self.velocity.dot(&up);
            if along < 0.0 {
                self.velocity -= up * along;
            }
        } else {
            self.velocity += self.gravity.current_gravity().vector() * fixed_dt;
        }

        self.frame
            .step_toward_target(self.settings.rotation_speed * fixed_dt);
        if self.transitioning && self.frame.angle_to_target() <= self.settings.transition_eps_rad {
            self.transitioning = false;
        }
    }

    /// Write back the position resolved by the host's collision step.
    ///
    /// `grounded_hint` overrides the ground flag until the next tick re-probes.
    pub fn sync_body(&mut self, position: Point3, grounded_hint: Option<bool>) {
        self.position = position;
        if let Some(grounded) = grounded_hint {
            self.grounded = grounded;
        }
    }

    pub fn state(&self) -> CharacterState {
        let locomotion = if !self.grounded {
            Locomotion::Airborne
        } else if self.horizontal_speed > self.settings.running_threshold {
            Locomotion::GroundedMoving
        } else {
            Locomotion::Idle
        };

        let gravity_phase = if self.gravity.pending().is_some() {
            GravityPhase::Pending
        } else if self.transitioning {
            GravityPhase::Transitioning
        } else {
            GravityPhase::Settled
        };

        CharacterState {
            locomotion,
            gravity_phase,
        }
    }

    fn refresh_grounded(&mut self) {
        self.grounded = self
            .projector
            .ground_probe(self.position, &self.gravity.down(), &self.probe);
    }

    fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::DirectionSelected(cardinal) => self.select(cardinal),
            InputEvent::Confirm => self.confirm(),
            InputEvent::Cancel => {
                if self.gravity.cancel_selection().is_some() {
                    self.preview.hide();
                }
            }
            InputEvent::Jump => {
                if let Some(v) = self.projector.jump_velocity(
                    &self.velocity,
                    &self.gravity.up(),
                    self.settings.jump_force,
                    self.grounded,
                ) {
                    self.velocity = v;
                }
            }
        }
    }

    fn select(&mut self, cardinal: Cardinal) {
        let (axis, angle) = cardinal.selection_axis();
        let selection = self
            .gravity
            .propose_selection(axis, angle, &self.frame.current_rotation);
        let shown = self
            .resolver
            .preview_only(selection.preview_candidate, &self.frame);
        self.preview.show(cardinal, shown);
    }

    fn confirm(&mut self) {
        let Some(pending) = self.gravity.pending().copied() else {
            trace!("Confirm without a pending selection");
            return;
        };

        let request = ResolveRequest {
            candidate: pending.preview_candidate,
            current_up: self.gravity.up(),
            body_forward: self.frame.forward(),
            body_right: self.frame.right(),
            position: self.position,
            camera_forward: self.camera_basis().map(|c| c.forward),
        };
        let resolution = self.resolver.resolve_candidate(&request, &self.probe);

        let previous = self.gravity.current_gravity();
        self.gravity.commit(resolution.committed_gravity);
        self.frame.up = resolution.chosen_up;
        self.frame.set_target(resolution.target_rotation);
        self.transitioning = self.frame.angle_to_target() > self.settings.transition_eps_rad;
        self.last_resolution = Some(resolution);
        self.preview.hide();

        info!(
            "Gravity committed: {:?} -> {:?} (surface_aligned={}, heading={:?})",
            previous.vector(),
            resolution.committed_gravity.vector(),
            resolution.surface_aligned,
            resolution.heading
        );
    }

    fn camera_basis(&self) -> Option<CameraBasis> {
        self.camera.as_ref().map(OrbitCamera::basis)
    }

    #[inline]
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    #[inline]
    pub fn gravity(&self) -> GravityVector {
        self.gravity.current_gravity()
    }

    #[inline]
    pub fn up(&self) -> UnitVec3 {
        self.gravity.up()
    }

    #[inline]
    pub fn pending(&self) -> Option<&PendingSelection> {
        self.gravity.pending()
    }

    #[inline]
    pub fn frame(&self) -> &OrientationFrame {
        &self.frame
    }

    #[inline]
    pub fn position(&self) -> Point3 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    #[inline]
    pub fn camera(&self) -> Option<&OrbitCamera> {
        self.camera.as_ref()
    }

    /// Outcome of the most recent confirmed selection.
    #[inline]
    pub fn last_resolution(&self) -> Option<&Resolution> {
        self.last_resolution.as_ref()
    }

    #[inline]
    pub fn preview(&self) -> &D {
        &self.preview
    }

    /// World geometry the character probes against.
    #[inline]
    pub fn probe(&self) -> &P {
        &self.probe
    }
}
