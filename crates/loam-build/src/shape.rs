//! Signed inside/outside evaluation for the build shapes.
//!
//! Every shape answers with an approximate signed distance in meters:
//! negative inside, positive outside, zero on the surface. The evaluation
//! happens in the operation's local frame (translated to the center and
//! un-rotated about Y), so shapes compose with `rotation`, `thickness`,
//! `closed`, and `arc_sweep` uniformly.

use glam::Vec3;

/// The build shape variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildShape {
    /// Axis-aligned box (in the local frame).
    Cube,
    /// Ellipsoid; a sphere when all three sizes match.
    Sphere,
    /// Y-axis cylinder with elliptical cross-section.
    Cylinder,
    /// Triangular prism running along local Z, apex up.
    Prism,
}

/// Evaluation parameters shared by all shapes.
#[derive(Clone, Copy, Debug)]
pub struct ShapeParams {
    /// Half-extents (cube, prism) or radii (sphere, cylinder), meters.
    pub size: Vec3,
    /// Hollow shell thickness in meters; `None` is solid.
    pub thickness: Option<f32>,
    /// Close the ends of a hollow cylinder with caps.
    pub closed: bool,
    /// Angular extent of a cylinder in radians; `None` is the full circle.
    pub arc_sweep: Option<f32>,
}

impl BuildShape {
    /// Signed distance of a local-frame point, honoring the parameters.
    pub fn signed_distance(self, local: Vec3, params: &ShapeParams) -> f32 {
        let solid = self.solid_distance(local, params);
        match (self, params.thickness) {
            (_, None) => solid,
            (BuildShape::Cylinder, Some(t)) => self.hollow_cylinder(local, params, t),
            (_, Some(t)) => solid.abs() - t,
        }
    }

    /// Distance against the solid (non-hollow) shape.
    fn solid_distance(self, p: Vec3, params: &ShapeParams) -> f32 {
        let size = params.size.max(Vec3::splat(1e-4));
        match self {
            BuildShape::Cube => {
                let q = p.abs() - size;
                q.max_element()
            }
            BuildShape::Sphere => {
                let scale = size.min_element();
                ((p / size).length() - 1.0) * scale
            }
            BuildShape::Cylinder => {
                let radial = self.cylinder_radial(p, params);
                let dy = p.y.abs() - size.y;
                radial.max(dy)
            }
            BuildShape::Prism => {
                let q = Vec3::new(p.x.abs(), p.y, p.z.abs());
                let dz = q.z - size.z;
                let floor = -(q.y + size.y);
                // Tent plane from the base edges to the apex.
                let slope = (q.x / size.x + (q.y + size.y) / (2.0 * size.y) - 1.0)
                    * size.x.min(size.y);
                dz.max(floor).max(slope)
            }
        }
    }

    /// Radial distance of a cylinder cross-section, with the arc clip.
    fn cylinder_radial(self, p: Vec3, params: &ShapeParams) -> f32 {
        let size = params.size.max(Vec3::splat(1e-4));
        let scale = size.x.min(size.z);
        let radial =
            ((p.x / size.x) * (p.x / size.x) + (p.z / size.z) * (p.z / size.z)).sqrt() * scale
                - scale;
        match params.arc_sweep {
            Some(sweep) if sweep < std::f32::consts::TAU => {
                let mut angle = libm::atan2f(p.z, p.x);
                if angle < 0.0 {
                    angle += std::f32::consts::TAU;
                }
                if angle <= sweep { radial } else { scale.max(0.25) }
            }
            _ => radial,
        }
    }

    /// Hollow cylinder: tube walls, optionally with end caps, clipped to
    /// the outer cylinder.
    fn hollow_cylinder(self, p: Vec3, params: &ShapeParams, t: f32) -> f32 {
        let size = params.size.max(Vec3::splat(1e-4));
        let radial = self.cylinder_radial(p, params);
        let dy = p.y.abs() - size.y;
        let walls = (radial.abs() - t).max(dy);
        if params.closed {
            let caps = (dy.abs() - t).max(radial);
            walls.min(caps)
        } else {
            walls
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
