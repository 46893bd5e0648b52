//! Rapier-backed static level geometry and surface probe.
//!
//! Builds an in-memory Rapier scene from static collider definitions and answers the
//! controller's ray queries against it. The same world backs the host's kinematic
//! character controller through [`StaticQueryWorld::query_pipeline`].
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Immutable world: statics do not move after construction.
//! - Layer filtering happens on collider membership, so a probe mask selects which statics
//!   can be hit.

use nalgebra::{Isometry, Translation3, point, vector};
use rapier3d::prelude::{
    BroadPhaseBvh, Collider, ColliderBuilder, ColliderSet, Group, IntegrationParameters,
    InteractionGroups, NarrowPhase, QueryFilter, QueryPipeline, Ray, RigidBodySet,
};

use crate::math::{Point3, Quat, UnitVec3, Vec3};
use crate::probe::{LayerMask, SurfaceHit, SurfaceProbe};

/// Definition of an immutable level collider.
///
/// Conventions
/// - Units are meters.
/// - Rotation is a unit quaternion.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vec3,
    /// World-space rotation.
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
    /// Layers this collider belongs to.
    pub layers: LayerMask,
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },
}

/// Build a Rapier collider from a `WorldStaticDef`, posed in world space.
pub fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),
    };

    let mut collider = builder
        .collision_groups(
            InteractionGroups::all().with_memberships(Group::from_bits_truncate(def.layers.0)),
        )
        .build();
    collider.set_position(Isometry::from_parts(
        Translation3::from(def.translation),
        def.rotation,
    ));
    collider
}

/// Static colliders plus the broad phase needed to run scene queries.
pub struct StaticQueryWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
}

impl StaticQueryWorld {
    /// Borrowed `QueryPipeline` for ray casts and the kinematic character controller.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

/// Filter matching colliders whose membership intersects `layers`.
pub fn layer_filter<'a>(layers: LayerMask) -> QueryFilter<'a> {
    QueryFilter::default()
        .groups(InteractionGroups::all().with_filter(Group::from_bits_truncate(layers.0)))
}

pub fn build_static_query_world(
    world_statics: impl IntoIterator<Item = WorldStaticDef>,
) -> StaticQueryWorld {
    let mut defs: Vec<_> = world_statics.into_iter().collect();
    defs.sort_by_key(|d| d.id);

    let bodies = RigidBodySet::new();
    let mut colliders = ColliderSet::new();
    let mut modified_colliders = Vec::with_capacity(defs.len());

    for def in &defs {
        let co_handle = colliders.insert(collider_from_def(def));
        modified_colliders.push(co_handle);
    }

    let mut broad_phase = BroadPhaseBvh::new();
    let mut events = Vec::new();
    broad_phase.update(
        &IntegrationParameters::default(),
        &colliders,
        &bodies,
        &modified_colliders,
        &[],
        &mut events,
    );

    StaticQueryWorld {
        bodies,
        colliders,
        broad_phase,
        narrow_phase: NarrowPhase::default(),
    }
}

impl SurfaceProbe for StaticQueryWorld {
    fn cast(
        &self,
        origin: Point3,
        direction: UnitVec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<SurfaceHit> {
        let query_pipeline = self.query_pipeline(layer_filter(layers));
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        let (_handle, hit) =
            query_pipeline.cast_ray_and_get_normal(&ray, max_distance.max(0.0), true)?;
        Some(SurfaceHit {
            normal: Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z),
            distance: hit.time_of_impact,
        })
    }
}
