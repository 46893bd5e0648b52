//! Surface probe abstraction.
//!
//! The controller never owns world geometry. It asks a [`SurfaceProbe`] for the first
//! surface along a ray and treats "no result", a filtered miss and an unusable hit the
//! same way: as a miss.

use crate::math::{Point3, UnitVec3, Vec3, try_direction};

/// Bitmask selecting which collision layers a probe may hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    #[inline]
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// A single ray contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    /// World-space surface normal at the contact.
    pub normal: Vec3,
    /// Distance along the ray from its origin (meters).
    pub distance: f32,
}

/// Synchronous ray query against world geometry.
///
/// Implementations must be pure queries: the same arguments against the same world
/// return the same result.
pub trait SurfaceProbe {
    fn cast(
        &self,
        origin: Point3,
        direction: UnitVec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<SurfaceHit>;
}

impl<F> SurfaceProbe for F
where
    F: Fn(Point3, UnitVec3, f32, LayerMask) -> Option<SurfaceHit>,
{
    fn cast(
        &self,
        origin: Point3,
        direction: UnitVec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<SurfaceHit> {
        self(origin, direction, max_distance, layers)
    }
}

/// Probe for characters without world geometry; every cast misses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSurface;

impl SurfaceProbe for NoSurface {
    fn cast(&self, _: Point3, _: UnitVec3, _: f32, _: LayerMask) -> Option<SurfaceHit> {
        None
    }
}

/// Cast and keep only hits with a usable normal, returned normalized.
///
/// Non-positive or non-finite distances never reach the probe.
pub fn cast_for_normal(
    probe: &dyn SurfaceProbe,
    origin: Point3,
    direction: UnitVec3,
    max_distance: f32,
    layers: LayerMask,
) -> Option<UnitVec3> {
    if !max_distance.is_finite() || max_distance <= 0.0 {
        return None;
    }
    let hit = probe.cast(origin, direction, max_distance, layers)?;
    try_direction(&hit.normal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_act_as_probes() {
        let probe = |_: Point3, _: UnitVec3, _: f32, _: LayerMask| {
            Some(SurfaceHit {
                normal: Vec3::new(0.0, 2.0, 0.0),
                distance: 0.5,
            })
        };

        let n = cast_for_normal(
            &probe,
            Point3::origin(),
            -Vec3::y_axis(),
            1.0,
            LayerMask::ALL,
        );
        assert_eq!(n.map(|n| n.into_inner()), Some(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn degenerate_normals_count_as_miss() {
        let probe = |_: Point3, _: UnitVec3, _: f32, _: LayerMask| {
            Some(SurfaceHit {
                normal: Vec3::zeros(),
                distance: 0.5,
            })
        };

        let n = cast_for_normal(&probe, Point3::origin(), Vec3::y_axis(), 1.0, LayerMask::ALL);
        assert!(n.is_none());
    }

    #[test]
    fn invalid_distance_skips_probe() {
        let probe = |_: Point3, _: UnitVec3, _: f32, _: LayerMask| -> Option<SurfaceHit> {
            panic!("probe must not be called");
        };

        assert!(
            cast_for_normal(&probe, Point3::origin(), Vec3::y_axis(), 0.0, LayerMask::ALL)
                .is_none()
        );
        assert!(
            cast_for_normal(&probe, Point3::origin(), Vec3::y_axis(), f32::NAN, LayerMask::ALL)
                .is_none()
        );
    }

    #[test]
    fn no_surface_always_misses() {
        assert!(
            NoSurface
                .cast(Point3::origin(), Vec3::y_axis(), 10.0, LayerMask::ALL)
                .is_none()
        );
    }

    #[test]
    fn layer_masks_intersect_on_shared_bits() {
        assert!(LayerMask(0b0110).intersects(LayerMask(0b0100)));
        assert!(!LayerMask(0b0110).intersects(LayerMask(0b1001)));
        assert!(!LayerMask::NONE.intersects(LayerMask::ALL));
    }
}
