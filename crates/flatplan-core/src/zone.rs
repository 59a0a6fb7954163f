//! Hot zones - flat hit-test shapes placed over the floor plan

use glam::{Affine3A, Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::geometry::{circle_points, point_in_polygon, PlanarMesh, Ray, Transform};
use crate::scene::Rgb;

/// Radial segments used when a circular zone is turned into a mesh
pub const CIRCLE_SEGMENTS: usize = 24;

/// Default tint of rectangular and polygonal zones
pub const ZONE_COLOR: Rgb = Rgb(0xffff66);
/// Default tint of circular zones
pub const CIRCLE_ZONE_COLOR: Rgb = Rgb(0xff0000);

/// Outline of a zone in its local XY plane
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneShape {
    /// Centered `width` x `height` rectangle
    Rect { width: f32, height: f32 },
    /// Closed loop; the last vertex connects back to the first
    Polygon { points: Vec<Vec2> },
    /// Disc centered on the origin
    Circle { radius: f32 },
}

impl ZoneShape {
    pub fn contains(&self, p: Vec2) -> bool {
        match self {
            ZoneShape::Rect { width, height } => {
                p.x.abs() <= width * 0.5 && p.y.abs() <= height * 0.5
            }
            ZoneShape::Polygon { points } => point_in_polygon(p, points),
            ZoneShape::Circle { radius } => p.length_squared() <= radius * radius,
        }
    }

    /// Boundary loop (rect corners, polygon vertices, circle approximated
    /// with [`CIRCLE_SEGMENTS`] points)
    pub fn outline(&self) -> Vec<Vec2> {
        match self {
            ZoneShape::Rect { width, height } => {
                let (hw, hh) = (width * 0.5, height * 0.5);
                vec![
                    Vec2::new(-hw, -hh),
                    Vec2::new(hw, -hh),
                    Vec2::new(hw, hh),
                    Vec2::new(-hw, hh),
                ]
            }
            ZoneShape::Polygon { points } => points.clone(),
            ZoneShape::Circle { radius } => circle_points(*radius, CIRCLE_SEGMENTS),
        }
    }

    /// Triangulated surface for rendering
    pub fn mesh(&self) -> PlanarMesh {
        PlanarMesh::from_polygon(&self.outline())
    }
}

/// A named, positioned hit-test surface.
///
/// Zones are invisible in normal operation (`opacity == 0`). Ceiling zones
/// are the exception: their opacity is their on/off state.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub shape: ZoneShape,
    pub position: Vec3,
    pub rotation: Quat,
    pub color: Rgb,
    pub opacity: f32,
}

impl Zone {
    /// Rectangle lying in the horizontal plane
    pub fn rect(name: impl Into<String>, width: f32, height: f32, position: Vec3) -> Self {
        Self {
            name: name.into(),
            shape: ZoneShape::Rect { width, height },
            position,
            rotation: Quat::from_rotation_x(-FRAC_PI_2),
            color: ZONE_COLOR,
            opacity: 0.0,
        }
    }

    /// Closed polygon in the horizontal plane. A local vertex `(px, py)` lands
    /// at world `(x + px, y, z + py)`.
    ///
    /// Fewer than three points make a zone that never reports a hit.
    pub fn polygon(name: impl Into<String>, points: &[[f32; 2]], position: Vec3) -> Self {
        Self {
            name: name.into(),
            shape: ZoneShape::Polygon {
                points: points.iter().map(|p| Vec2::from_array(*p)).collect(),
            },
            position,
            rotation: Quat::from_rotation_x(FRAC_PI_2),
            color: ZONE_COLOR,
            opacity: 0.0,
        }
    }

    /// Disc in the horizontal plane
    pub fn circle(name: impl Into<String>, radius: f32, position: Vec3) -> Self {
        Self {
            name: name.into(),
            shape: ZoneShape::Circle { radius },
            position,
            rotation: Quat::from_rotation_x(FRAC_PI_2),
            color: CIRCLE_ZONE_COLOR,
            opacity: 0.0,
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation)
    }

    fn affine(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation, self.position)
    }

    /// Distance along `ray` to this zone's surface, if the ray crosses it.
    /// Both faces count.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let local = ray.to_local(&self.affine());
        let t = local.intersect_xy_plane()?;
        let hit = local.origin + local.direction * t;
        self.shape.contains(hit.truncate()).then_some(t)
    }

    pub fn is_hit(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }

    /// Zone center in world space
    pub fn center(&self) -> Vec3 {
        let outline = self.shape.outline();
        if outline.is_empty() {
            return self.position;
        }
        let local = outline.iter().copied().sum::<Vec2>() / outline.len() as f32;
        self.affine().transform_point3(local.extend(0.0))
    }
}

/// Every zone in `zones` crossed by `ray`, nearest first, as `(index, distance)`
pub fn cast<'a>(ray: &Ray, zones: impl IntoIterator<Item = &'a Zone>) -> Vec<(usize, f32)> {
    let mut hits: Vec<(usize, f32)> = zones
        .into_iter()
        .enumerate()
        .filter_map(|(i, zone)| zone.intersect(ray).map(|t| (i, t)))
        .collect();
    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits
}
