//! Animation state published once per tick.

/// Locomotion flags handed to an [`AnimationSink`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationFlags {
    pub running: bool,
    pub falling: bool,
    pub idle: bool,
}

impl AnimationFlags {
    /// Flags for a body moving at `horizontal_speed` on the plane orthogonal to up.
    ///
    /// At most one of the three flags is set.
    pub fn from_motion(horizontal_speed: f32, grounded: bool, running_threshold: f32) -> Self {
        let falling = !grounded;
        let running = horizontal_speed > running_threshold && !falling;
        Self {
            running,
            falling,
            idle: !running && grounded,
        }
    }
}

/// Receives animation flags. Playback lives outside the controller.
pub trait AnimationSink {
    fn set_flags(&mut self, flags: AnimationFlags);
}

impl<F> AnimationSink for F
where
    F: FnMut(AnimationFlags),
{
    fn set_flags(&mut self, flags: AnimationFlags) {
        self(flags)
    }
}

/// Sink for characters without an animator.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAnimation;

impl AnimationSink for NoAnimation {
    fn set_flags(&mut self, _: AnimationFlags) {}
}
