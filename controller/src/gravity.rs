//! Live gravity vector and the pending (previewed, unconfirmed) selection.
//!
//! [`GravityState`] is the single owner of both. Every other part of the controller reads
//! `up()` / `down()` from here and only ever writes back through [`GravityState::commit`].

use log::debug;

use crate::math::{Quat, UnitVec3, Vec3, is_unit, rotate_about};
use crate::settings::DEGENERATE_EPS_SQ;

/// Direction "toward the ground" scaled by the acceleration strength.
///
/// Always finite and non-zero; `up() == -direction()`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityVector(Vec3);

impl GravityVector {
    /// Validate a raw vector.
    pub fn try_new(v: Vec3) -> Result<Self, &'static str> {
        if !v.iter().all(|c| c.is_finite()) {
            return Err("Gravity vector must be finite");
        }
        if v.norm_squared() <= DEGENERATE_EPS_SQ {
            return Err("Gravity vector must be non-zero");
        }
        Ok(Self(v))
    }

    #[inline]
    pub fn new(v: Vec3) -> Option<Self> {
        Self::try_new(v).ok()
    }

    /// Canonical world down (-Y) with the given strength.
    pub fn world_down(strength: f32) -> Result<Self, &'static str> {
        Self::try_new(Vec3::new(0.0, -strength, 0.0))
    }

    /// Gravity pointing along `direction` with `strength` taken from an existing vector.
    ///
    /// Reusing a validated magnitude keeps the result non-zero.
    #[inline]
    pub fn along(direction: &UnitVec3, strength_of: &GravityVector) -> Self {
        Self(direction.into_inner() * strength_of.magnitude())
    }

    #[inline]
    pub fn vector(&self) -> Vec3 {
        self.0
    }

    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.0.norm()
    }

    /// Unit direction toward the ground.
    #[inline]
    pub fn direction(&self) -> UnitVec3 {
        UnitVec3::new_normalize(self.0)
    }

    /// Unit vector opposite gravity.
    #[inline]
    pub fn up(&self) -> UnitVec3 {
        -self.direction()
    }
}

/// A directional selection awaiting confirm or cancel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingSelection {
    /// Rotation axis in body space.
    pub local_axis: UnitVec3,
    pub angle_degrees: f32,
    /// Current gravity rotated by `angle_degrees` about the world-space `local_axis`.
    pub preview_candidate: GravityVector,
}

/// Active gravity plus at most one pending selection.
#[derive(Clone, Debug)]
pub struct GravityState {
    gravity: GravityVector,
    pending: Option<PendingSelection>,
}

impl GravityState {
    pub fn new(gravity: GravityVector) -> Self {
        Self {
            gravity,
            pending: None,
        }
    }

    #[inline]
    pub fn current_gravity(&self) -> GravityVector {
        self.gravity
    }

    #[inline]
    pub fn up(&self) -> UnitVec3 {
        self.gravity.up()
    }

    #[inline]
    pub fn down(&self) -> UnitVec3 {
        self.gravity.direction()
    }

    #[inline]
    pub fn pending(&self) -> Option<&PendingSelection> {
        self.pending.as_ref()
    }

    /// Preview current gravity rotated about a body-space axis and store it as pending.
    ///
    /// Replaces any earlier pending selection.
    pub fn propose_selection(
        &mut self,
        local_axis: UnitVec3,
        angle_degrees: f32,
        body_rotation: &Quat,
    ) -> PendingSelection {
        let world_axis = body_rotation * local_axis;
        let rotated = rotate_about(&self.gravity.vector(), &world_axis, angle_degrees);
        let preview_candidate = GravityVector::new(rotated).unwrap_or(self.gravity);

        let selection = PendingSelection {
            local_axis,
            angle_degrees,
            preview_candidate,
        };
        if self.pending.is_some() {
            debug!("Replacing pending gravity selection");
        }
        debug!(
            "Proposed gravity {:?} ({} deg about {:?})",
            preview_candidate.vector(),
            angle_degrees,
            world_axis.into_inner()
        );
        self.pending = Some(selection);
        selection
    }

    /// Drop the pending selection, if any.
    pub fn cancel_selection(&mut self) -> Option<PendingSelection> {
        let cancelled = self.pending.take();
        if cancelled.is_some() {
            debug!("Cancelled pending gravity selection");
        }
        cancelled
    }

    /// Replace the live gravity vector and clear the pending selection.
    pub fn commit(&mut self, gravity: GravityVector) {
        self.gravity = gravity;
        self.pending = None;
        self.debug_check();
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert!(is_unit(&self.up()));
        debug_assert!(self.gravity.magnitude() * self.gravity.magnitude() > DEGENERATE_EPS_SQ);
        debug_assert_eq!(self.up(), -self.down());
    }
}
