//! View-frustum culling against world-space AABBs.
//!
//! The frustum is six inward-facing planes extracted from a combined
//! view-projection matrix. Culling uses the positive-vertex test: an AABB is
//! outside as soon as its most-inward corner is behind any plane.

use glam::{Mat4, Vec3};

use crate::Aabb;

/// Result of testing a volume against the frustum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intersection {
    /// Entirely inside all six planes.
    Inside,
    /// Entirely behind at least one plane.
    Outside,
    /// Straddles one or more planes.
    Intersecting,
}

/// A plane in Hessian normal form. Points with
/// `normal.dot(p) + distance >= 0` are on the inside half-space.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    /// Creates a plane and normalizes it so that `normal` is unit length.
    pub fn new(normal: Vec3, distance: f32) -> Self {
        let len = normal.length();
        if len > 0.0 {
            Self {
                normal: normal / len,
                distance: distance / len,
            }
        } else {
            Self { normal, distance }
        }
    }

    /// Signed distance from the plane; positive is inside.
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.distance
    }
}

/// A view frustum as six inward-facing planes, ordered
/// left, right, bottom, top, near, far.
#[derive(Debug, Clone)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts frustum planes from a combined view-projection matrix
    /// (row combinations of the matrix, Gribb-Hartmann).
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let extract = |row: glam::Vec4, sign: f32| {
            let v = r3 + row * sign;
            Plane::new(Vec3::new(v.x, v.y, v.z), v.w)
        };

        Self {
            planes: [
                extract(r0, 1.0),  // left
                extract(r0, -1.0), // right
                extract(r1, 1.0),  // bottom
                extract(r1, -1.0), // top
                extract(r2, 1.0),  // near
                extract(r2, -1.0), // far
            ],
        }
    }

    /// Returns true if the point is inside all six planes.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance(p) >= 0.0)
    }

    /// Classifies an AABB against the frustum.
    pub fn test_aabb(&self, aabb: &Aabb) -> Intersection {
        let mut intersecting = false;
        for plane in &self.planes {
            // Positive vertex: the AABB corner furthest along the plane normal.
            let p = Vec3::new(
                if plane.normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            if plane.signed_distance(p) < 0.0 {
                return Intersection::Outside;
            }
            // Negative vertex: the opposite corner.
            let n = Vec3::new(
                if plane.normal.x >= 0.0 { aabb.min.x } else { aabb.max.x },
                if plane.normal.y >= 0.0 { aabb.min.y } else { aabb.max.y },
                if plane.normal.z >= 0.0 { aabb.min.z } else { aabb.max.z },
            );
            if plane.signed_distance(n) < 0.0 {
                intersecting = true;
            }
        }
        if intersecting {
            Intersection::Intersecting
        } else {
            Intersection::Inside
        }
    }

    /// Returns true if the AABB is at least partially inside the frustum.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.test_aabb(aabb) != Intersection::Outside
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_frustum() -> Frustum {
        // Camera at origin looking down -Z.
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        Frustum::from_view_projection(&(proj * view))
    }

    #[test]
    fn test_point_in_front_is_inside() {
        let f = test_frustum();
        assert!(f.contains_point(Vec3::new(0.0, 0.0, -10.0)));
    }

    #[test]
    fn test_point_behind_is_outside() {
        let f = test_frustum();
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_aabb_in_front_intersects() {
        let f = test_frustum();
        let b = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, -20.0), Vec3::splat(1.0));
        assert_eq!(f.test_aabb(&b), Intersection::Inside);
        assert!(f.intersects_aabb(&b));
    }

    #[test]
    fn test_aabb_behind_is_outside() {
        let f = test_frustum();
        let b = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 20.0), Vec3::splat(1.0));
        assert_eq!(f.test_aabb(&b), Intersection::Outside);
        assert!(!f.intersects_aabb(&b));
    }

    #[test]
    fn test_aabb_straddling_near_plane_intersects() {
        let f = test_frustum();
        // Spans from behind the camera to in front of it.
        let b = Aabb::new(Vec3::new(-1.0, -1.0, 1.0), Vec3::new(1.0, 1.0, -5.0));
        assert_eq!(f.test_aabb(&b), Intersection::Intersecting);
        assert!(f.intersects_aabb(&b));
    }

    #[test]
    fn test_aabb_far_to_the_side_is_outside() {
        let f = test_frustum();
        // 90 degree FOV: at z = -10 the frustum is ~±10 wide, so x = 200 is out.
        let b = Aabb::from_center_half_extents(Vec3::new(200.0, 0.0, -10.0), Vec3::splat(1.0));
        assert_eq!(f.test_aabb(&b), Intersection::Outside);
    }
}
