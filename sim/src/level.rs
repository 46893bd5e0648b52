//! Closed box room used by the headless run.
//!
//! Every face is a thick cuboid so any of the six gravity directions lands the body on a
//! surface. The floor and ceiling sit on one layer and the walls on another.

use gravity_controller::{
    ColliderShapeDef, ControllerSettings, LayerMask, Point3, Quat, Vec3, WorldStaticDef,
};

/// Half the inner size of the room (meters).
pub const ROOM_HALF_EXTENT: f32 = 10.0;

/// Half the thickness of each face (meters).
const FACE_HALF_THICKNESS: f32 = 0.5;

pub const FLOOR_LAYER: LayerMask = LayerMask(0b01);
pub const WALL_LAYER: LayerMask = LayerMask(0b10);

/// Capsule dimensions of the character (meters).
pub const CAPSULE_HALF_HEIGHT: f32 = 0.5;
pub const CAPSULE_RADIUS: f32 = 0.4;

/// Ground ray start above the capsule center (meters).
const GROUND_PROBE_SKIN: f32 = 0.1;

/// Distance from the capsule center to its tip (meters).
pub const CAPSULE_EXTENT: f32 = CAPSULE_HALF_HEIGHT + CAPSULE_RADIUS;

/// Capsule center resting on the floor.
pub const SPAWN: Point3 = Point3::new(0.0, CAPSULE_EXTENT, 0.0);

/// Ground ray length: skin plus the capsule tip plus a small contact margin (meters).
const GROUND_PROBE_DISTANCE: f32 = GROUND_PROBE_SKIN + CAPSULE_EXTENT + 0.05;

/// Controller tuning for the capsule in this room.
pub fn controller_settings() -> ControllerSettings {
    ControllerSettings {
        ground_probe_skin: GROUND_PROBE_SKIN,
        ground_probe_distance: GROUND_PROBE_DISTANCE,
        ..ControllerSettings::default()
    }
}

pub fn room() -> Vec<WorldStaticDef> {
    let r = ROOM_HALF_EXTENT;
    let t = FACE_HALF_THICKNESS;
    let span = r + 2.0 * t;

    let face = |id: u32, center: Vec3, half_extents: Vec3, layers: LayerMask| WorldStaticDef {
        id,
        translation: center,
        rotation: Quat::identity(),
        shape: ColliderShapeDef::Cuboid { half_extents },
        layers,
    };

    vec![
        // Floor and ceiling.
        face(1, Vec3::new(0.0, -t, 0.0), Vec3::new(span, t, span), FLOOR_LAYER),
        face(2, Vec3::new(0.0, 2.0 * r + t, 0.0), Vec3::new(span, t, span), FLOOR_LAYER),
        // Walls.
        face(3, Vec3::new(r + t, r, 0.0), Vec3::new(t, span, span), WALL_LAYER),
        face(4, Vec3::new(-r - t, r, 0.0), Vec3::new(t, span, span), WALL_LAYER),
        face(5, Vec3::new(0.0, r, r + t), Vec3::new(span, span, t), WALL_LAYER),
        face(6, Vec3::new(0.0, r, -r - t), Vec3::new(span, span, t), WALL_LAYER),
        // A pillar to walk into.
        WorldStaticDef {
            id: 7,
            translation: Vec3::new(4.0, 2.0, 4.0),
            rotation: Quat::identity(),
            shape: ColliderShapeDef::CapsuleY {
                radius: 1.0,
                half_height: 1.0,
            },
            layers: WALL_LAYER,
        },
        // A boulder resting on the floor.
        WorldStaticDef {
            id: 8,
            translation: Vec3::new(-5.0, 1.5, -5.0),
            rotation: Quat::identity(),
            shape: ColliderShapeDef::Sphere { radius: 1.5 },
            layers: FLOOR_LAYER,
        },
    ]
}
