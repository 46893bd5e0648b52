//! Headless run of the gravity controller in a closed room.
//!
//! Drives a scripted input sequence through the variable-rate tick and moves the body with
//! Rapier's kinematic character controller at a fixed rate, using the active up axis.
//! Run with `RUST_LOG=info` (or `debug`) to follow gravity commits.

mod level;

use gravity_controller::{
    AnimationFlags, AnimationSink, CameraSettings, Cardinal, Character, GravityVector,
    InputEvent, MoveAxes, Point3, PreviewDisplay, StaticQueryWorld, TickInput,
    build_static_query_world, layer_filter,
};
use log::{debug, error, info};
use nalgebra::{Isometry, Translation3};
use rapier3d::{
    control::{CharacterAutostep, CharacterLength, KinematicCharacterController},
    prelude::Capsule,
};

/// Variable-rate frame step (seconds).
const FRAME_DT: f32 = 1.0 / 60.0;

/// Fixed physics step (seconds).
const FIXED_DT: f32 = 1.0 / 50.0;

const FRAMES: u32 = 900;

/// Logs preview indicator changes instead of drawing them.
struct LoggedPreview;

impl PreviewDisplay for LoggedPreview {
    fn show(&mut self, cardinal: Cardinal, candidate: GravityVector) {
        info!("Preview {cardinal:?}: gravity {:?}", candidate.vector());
    }

    fn hide(&mut self) {
        debug!("Preview hidden");
    }
}

fn animation_log() -> impl AnimationSink {
    let mut last = AnimationFlags::default();
    move |flags: AnimationFlags| {
        if flags != last {
            debug!(
                "Animation running={} falling={} idle={}",
                flags.running, flags.falling, flags.idle
            );
            last = flags;
        }
    }
}

/// Scripted input for one frame.
fn scripted_input(frame: u32) -> TickInput {
    let events = match frame {
        120 => vec![InputEvent::Jump],
        200 => vec![InputEvent::DirectionSelected(Cardinal::Up)],
        210 => vec![InputEvent::DirectionSelected(Cardinal::Left)],
        220 => vec![InputEvent::Cancel],
        // Confirm without a pending selection: ignored.
        230 => vec![InputEvent::Confirm],
        240 => vec![InputEvent::DirectionSelected(Cardinal::Up)],
        250 => vec![InputEvent::Confirm],
        560 => vec![
            InputEvent::DirectionSelected(Cardinal::Right),
            InputEvent::Confirm,
        ],
        _ => Vec::new(),
    };

    let axes = match frame {
        60..120 => MoveAxes::new(0.0, 1.0),
        420..500 => MoveAxes::new(1.0, 0.4),
        700..780 => MoveAxes::new(-0.5, -1.0),
        _ => MoveAxes::default(),
    };

    let look = match frame {
        420..460 => (0.2, 0.0),
        _ => (0.0, 0.0),
    };

    TickInput { events, axes, look }
}

/// Extra travel along down while grounded, so the character controller keeps contact
/// with the floor and reports it (meters).
const GROUND_STICK: f32 = 0.05;

/// Character plus the kinematic controller that moves its capsule.
struct Harness<A: AnimationSink> {
    character: Character<StaticQueryWorld, LoggedPreview, A>,
    kcc: KinematicCharacterController,
    shape: Capsule,
    accumulator: f32,
}

impl<A: AnimationSink> Harness<A> {
    fn new(character: Character<StaticQueryWorld, LoggedPreview, A>) -> Self {
        let kcc = KinematicCharacterController {
            autostep: Some(CharacterAutostep {
                include_dynamic_bodies: false,
                max_height: CharacterLength::Relative(0.4),
                ..CharacterAutostep::default()
            }),
            offset: CharacterLength::Relative(0.025),
            snap_to_ground: None,
            ..KinematicCharacterController::default()
        };

        Self {
            character,
            kcc,
            shape: Capsule::new_y(level::CAPSULE_HALF_HEIGHT, level::CAPSULE_RADIUS),
            accumulator: 0.0,
        }
    }

    /// One variable-rate frame followed by as many fixed steps as have accumulated.
    fn frame(&mut self, input: &TickInput) {
        self.character.tick(FRAME_DT, input);

        self.accumulator += FRAME_DT;
        while self.accumulator >= FIXED_DT {
            self.character.integrate(FIXED_DT);
            self.step_body(FIXED_DT);
            self.accumulator -= FIXED_DT;
        }
    }

    /// Move the body by its velocity for one fixed step and write the result back.
    fn step_body(&mut self, dt: f32) {
        let character = &self.character;
        let up = character.up();
        let kcc = KinematicCharacterController { up, ..self.kcc };
        let pose = Isometry::from_parts(
            Translation3::from(character.position().coords),
            character.frame().current_rotation,
        );

        let mut desired = character.velocity() * dt;
        if character.is_grounded() && desired.dot(&up.into_inner()) <= 0.0 {
            desired -= up.into_inner() * GROUND_STICK;
        }

        let correction = {
            let query_pipeline = character
                .probe()
                .query_pipeline(layer_filter(character.settings().probe_layers));
            kcc.move_shape(dt, &query_pipeline, &self.shape, &pose, desired, |_| {})
        };

        let position = character.position() + correction.translation;
        self.character.sync_body(position, Some(correction.grounded));
    }
}

/// Spawn the character in the room at `position`.
fn spawn<A: AnimationSink>(position: Point3, animation: A) -> Result<Harness<A>, &'static str> {
    let world = build_static_query_world(level::room());
    info!("Built room with {} static colliders", world.len());

    let character = Character::new(
        level::controller_settings(),
        position,
        world,
        LoggedPreview,
        animation,
    )?;

    Ok(Harness::new(character.with_camera(CameraSettings::default())))
}

fn main() {
    env_logger::init();

    let mut harness = match spawn(level::SPAWN, animation_log()) {
        Ok(harness) => harness,
        Err(err) => {
            error!("Failed to spawn character: {err}");
            return;
        }
    };

    let mut last_state = harness.character.state();
    for frame in 0..FRAMES {
        harness.frame(&scripted_input(frame));

        let state = harness.character.state();
        if state != last_state {
            debug!("Frame {frame}: {state:?}");
            last_state = state;
        }
    }

    let character = &harness.character;
    info!(
        "Finished: position {:?}, up {:?}, gravity {:?}, {:?}",
        character.position().coords,
        character.up().into_inner(),
        character.gravity().vector(),
        character.state()
    );
    if let Some(camera) = character.camera() {
        info!("Camera at {:?}", camera.position().coords);
    }
}
