//! Rays, bounds, transforms and planar triangulation shared by zones and effects

use glam::{Affine3A, Quat, Vec2, Vec3};

/// A half-line in world space. The direction is kept normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Re-express the ray in the local frame of `transform`.
    ///
    /// The returned direction is not re-normalized, so a parameter `t` found in
    /// local space addresses the same point as `t` on the world ray.
    pub fn to_local(&self, transform: &Affine3A) -> Ray {
        let inverse = transform.inverse();
        Ray {
            origin: inverse.transform_point3(self.origin),
            direction: inverse.transform_vector3(self.direction),
        }
    }

    /// Distance to the local z = 0 plane, hitting either face
    pub fn intersect_xy_plane(&self) -> Option<f32> {
        if self.direction.z.abs() <= f32::EPSILON {
            return None;
        }
        let t = -self.origin.z / self.direction.z;
        (t >= 0.0).then_some(t)
    }
}

/// Euler angles in radians, applied Y first, then X, then Z (intrinsic).
///
/// Lamps author their light direction this way: yaw the fixture around the
/// wall, tilt it, then roll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Orientation {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_rotation_y(self.y) * Quat::from_rotation_x(self.x) * Quat::from_rotation_z(self.z)
    }
}

/// Translation, rotation and scale of a scene node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Axis-aligned bounding box. An empty box has `min > max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the box diagonal
    pub fn diagonal(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.size().length()
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounds of this box after an affine transform
    pub fn transformed(&self, transform: &Affine3A) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb::EMPTY;
        for corner in self.corners() {
            out.extend(transform.transform_point3(corner));
        }
        out
    }
}

/// Even-odd containment test against a closed vertex loop
pub fn point_in_polygon(point: Vec2, vertices: &[Vec2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (a, b) = (vertices[i], vertices[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Flat triangle mesh in a shape's local XY plane
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanarMesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl PlanarMesh {
    /// Triangulate a simple polygon (no holes) with earcut.
    pub fn from_polygon(vertices: &[Vec2]) -> Self {
        if vertices.len() < 3 {
            return Self::default();
        }
        let flat: Vec<f64> = vertices
            .iter()
            .flat_map(|p| [p.x as f64, p.y as f64])
            .collect();
        let indices = match earcutr::earcut(&flat, &[], 2) {
            Ok(indices) => indices.into_iter().map(|i| i as u32).collect(),
            Err(e) => {
                tracing::warn!("Polygon triangulation failed: {:?}", e);
                Vec::new()
            }
        };
        Self {
            positions: vertices.iter().map(|p| [p.x, p.y, 0.0]).collect(),
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// `segments` points evenly spaced on a circle, starting on +X
pub fn circle_points(radius: f32, segments: usize) -> Vec<Vec2> {
    (0..segments)
        .map(|i| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            Vec2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_point_in_polygon() {
        // L-shaped loop
        let l_shape = [
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 4.0),
            Vec2::new(0.0, 4.0),
        ];
        assert!(point_in_polygon(Vec2::new(0.5, 3.0), &l_shape));
        assert!(point_in_polygon(Vec2::new(3.0, 0.5), &l_shape));
        assert!(!point_in_polygon(Vec2::new(3.0, 3.0), &l_shape));
        assert!(!point_in_polygon(Vec2::new(-1.0, 0.5), &l_shape));

        // Degenerate loops never contain anything
        assert!(!point_in_polygon(Vec2::ZERO, &l_shape[..2]));
    }

    #[test]
    fn test_ray_to_local_plane() {
        // Plane lying flat at y = 10, facing up
        let transform = Transform::from_translation(Vec3::new(0.0, 10.0, 0.0))
            .with_rotation(Quat::from_rotation_x(-FRAC_PI_2))
            .to_affine();
        let ray = Ray::new(Vec3::new(2.0, 50.0, 3.0), Vec3::NEG_Y);
        let local = ray.to_local(&transform);
        let t = local.intersect_xy_plane().unwrap();
        assert!((t - 40.0).abs() < 1e-4);

        let hit = local.origin + local.direction * t;
        assert!((hit.x - 2.0).abs() < 1e-4);
        // -90 degrees about X maps world +Z onto local -Y
        assert!((hit.y + 3.0).abs() < 1e-4);

        // Pointing away from the plane
        let away = Ray::new(Vec3::new(0.0, 50.0, 0.0), Vec3::Y).to_local(&transform);
        assert!(away.intersect_xy_plane().is_none());
    }

    #[test]
    fn test_orientation_order() {
        // Yaw 90 degrees then tilt: +Y stays +Y under the yaw, so only the tilt shows
        let q = Orientation::new(FRAC_PI_2, FRAC_PI_2, 0.0).to_quat();
        let up = q * Vec3::Y;
        // Tilt about local X (which the yaw turned into world -Z) tips +Y toward +X
        assert!((up - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_aabb_union_and_transform() {
        let mut a = Aabb::EMPTY;
        assert!(a.is_empty());
        assert_eq!(a.diagonal(), 0.0);
        a.extend(Vec3::ZERO);
        a.extend(Vec3::new(2.0, 2.0, 1.0));
        assert_eq!(a.center(), Vec3::new(1.0, 1.0, 0.5));
        assert!((a.diagonal() - 3.0).abs() < 1e-6);

        let b = Aabb::new(Vec3::splat(-1.0), Vec3::ZERO);
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::splat(-1.0));
        assert_eq!(u.max, Vec3::new(2.0, 2.0, 1.0));
        assert_eq!(Aabb::EMPTY.union(&b), b);

        let moved = b.transformed(&Transform::from_translation(Vec3::X * 5.0).with_scale(Vec3::splat(2.0)).to_affine());
        assert_eq!(moved.min, Vec3::new(3.0, -2.0, -2.0));
        assert_eq!(moved.max, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_polygon_triangulation() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let mesh = PlanarMesh::from_polygon(&square);
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);

        assert_eq!(PlanarMesh::from_polygon(&square[..2]).triangle_count(), 0);
    }
}
