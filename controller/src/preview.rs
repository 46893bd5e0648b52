//! Preview display collaborator.
//!
//! Receives the pending candidate while a selection is open and a hide once it is
//! confirmed or cancelled. Nothing flows back into the controller.

use crate::gravity::GravityVector;
use crate::input::Cardinal;

pub trait PreviewDisplay {
    /// Show (or move) the indicator for a pending selection.
    fn show(&mut self, cardinal: Cardinal, candidate: GravityVector);

    fn hide(&mut self);
}

/// Display for characters without preview indicators.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPreview;

impl PreviewDisplay for NoPreview {
    fn show(&mut self, _: Cardinal, _: GravityVector) {}

    fn hide(&mut self) {}
}

/// Keeps the last shown candidate. Useful for headless runs and tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreviewLog {
    pub visible: Option<(Cardinal, GravityVector)>,
    pub shown: usize,
    pub hidden: usize,
}

impl PreviewDisplay for PreviewLog {
    fn show(&mut self, cardinal: Cardinal, candidate: GravityVector) {
        self.visible = Some((cardinal, candidate));
        self.shown += 1;
    }

    fn hide(&mut self) {
        self.visible = None;
        self.hidden += 1;
    }
}
