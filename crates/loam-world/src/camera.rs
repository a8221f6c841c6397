//! The observer's view: position, forward direction, and culling frustum.

use glam::{Mat4, Vec3};
use loam_math::Frustum;

/// Opaque view state consumed by visibility and request filtering.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Eye position in world meters.
    pub position: Vec3,
    /// Unit forward direction.
    pub forward: Vec3,
    /// World-space culling frustum.
    pub frustum: Frustum,
}

impl Camera {
    /// Builds a camera from explicit parts.
    pub fn new(position: Vec3, forward: Vec3, frustum: Frustum) -> Self {
        Self {
            position,
            forward,
            frustum,
        }
    }

    /// Convenience constructor: a 90-degree perspective view looking along
    /// `forward`.
    pub fn looking(position: Vec3, forward: Vec3) -> Self {
        let forward = forward.normalize_or(Vec3::NEG_Z);
        let up = if forward.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 16.0 / 9.0, 0.1, 1000.0);
        let view = Mat4::look_at_rh(position, position + forward, up);
        Self {
            position,
            forward,
            frustum: Frustum::from_view_projection(&(proj * view)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looking_camera_sees_ahead_not_behind() {
        let camera = Camera::looking(Vec3::ZERO, Vec3::NEG_Z);
        assert!(camera.frustum.contains_point(Vec3::new(0.0, 0.0, -5.0)));
        assert!(!camera.frustum.contains_point(Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn test_looking_straight_down_is_valid() {
        let camera = Camera::looking(Vec3::new(0.0, 50.0, 0.0), Vec3::NEG_Y);
        assert!(camera.frustum.contains_point(Vec3::new(0.0, 10.0, 0.0)));
    }
}
