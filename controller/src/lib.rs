pub mod animation;
pub mod camera;
pub mod character;
pub mod gravity;
pub mod input;
pub mod math;
pub mod motion;
pub mod orientation;
pub mod preview;
pub mod probe;
pub mod rapier_world;
pub mod settings;

pub use animation::{AnimationFlags, AnimationSink, NoAnimation};
pub use camera::OrbitCamera;
pub use character::{Character, CharacterState, GravityPhase, Locomotion};
pub use gravity::{GravityState, GravityVector, PendingSelection};
pub use input::{Cardinal, InputEvent, MoveAxes, TickInput};
pub use math::{Point3, Quat, UnitVec3, Vec3};
pub use motion::{CameraBasis, MotionProjector, MovementOutput};
pub use orientation::{
    HeadingSource, OldHeading, OrientationFrame, OrientationResolver, ResolveRequest, Resolution,
};
pub use preview::{NoPreview, PreviewDisplay, PreviewLog};
pub use probe::{LayerMask, NoSurface, SurfaceHit, SurfaceProbe};
pub use rapier_world::{
    ColliderShapeDef, StaticQueryWorld, WorldStaticDef, build_static_query_world,
    collider_from_def, layer_filter,
};
pub use settings::{CameraSettings, ControllerSettings};
