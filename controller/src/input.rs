//! Classified input consumed by the controller.
//!
//! Mapping raw device state to these values happens outside this crate.

use crate::math::{UnitVec3, Vec3};

/// Directions a gravity selection can be made in, relative to the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cardinal {
    Up,
    Down,
    Left,
    Right,
}

impl Cardinal {
    /// Body-space rotation axis and angle that turn current gravity toward this direction.
    ///
    /// - `Up`: body forward becomes down.
    /// - `Down`: body backward becomes down.
    /// - `Left`: body left becomes down.
    /// - `Right`: body right becomes down.
    pub fn selection_axis(self) -> (UnitVec3, f32) {
        match self {
            Cardinal::Up => (Vec3::x_axis(), -90.0),
            Cardinal::Down => (Vec3::x_axis(), 90.0),
            Cardinal::Left => (Vec3::z_axis(), -90.0),
            Cardinal::Right => (Vec3::z_axis(), 90.0),
        }
    }
}

/// Discrete per-tick events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    DirectionSelected(Cardinal),
    Confirm,
    Cancel,
    Jump,
}

/// Continuous movement axes, each in `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveAxes {
    pub horizontal: f32,
    pub vertical: f32,
}

impl MoveAxes {
    /// Clamped axes. Non-finite values read as no input.
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal: clamp_axis(horizontal),
            vertical: clamp_axis(vertical),
        }
    }

    /// Raw input vector `(h, 0, v)`.
    #[inline]
    pub fn raw(&self) -> Vec3 {
        Vec3::new(self.horizontal, 0.0, self.vertical)
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Everything the variable-rate tick consumes for one frame.
#[derive(Clone, Debug, Default)]
pub struct TickInput {
    /// Processed in order.
    pub events: Vec<InputEvent>,
    pub axes: MoveAxes,
    /// Orbit camera look delta (yaw, pitch) in input units.
    pub look: (f32, f32),
}
