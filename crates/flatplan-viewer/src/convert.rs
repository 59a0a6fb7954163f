//! Conversions between core types and Bevy types

use bevy::asset::RenderAssetUsages;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use flatplan_core::geometry::PlanarMesh;
use flatplan_core::Rgb;

pub fn vec3(v: glam::Vec3) -> Vec3 {
    Vec3::from_array(v.to_array())
}

pub fn core_vec3(v: Vec3) -> glam::Vec3 {
    glam::Vec3::from_array(v.to_array())
}

pub fn quat(q: glam::Quat) -> Quat {
    Quat::from_array(q.to_array())
}

pub fn core_quat(q: Quat) -> glam::Quat {
    glam::Quat::from_array(q.to_array())
}

pub fn core_vec2(v: Vec2) -> glam::Vec2 {
    glam::Vec2::new(v.x, v.y)
}

pub fn transform(t: &flatplan_core::Transform) -> Transform {
    Transform {
        translation: vec3(t.translation),
        rotation: quat(t.rotation),
        scale: vec3(t.scale),
    }
}

pub fn core_transform(t: &Transform) -> flatplan_core::Transform {
    flatplan_core::Transform {
        translation: core_vec3(t.translation),
        rotation: core_quat(t.rotation),
        scale: core_vec3(t.scale),
    }
}

pub fn color(c: Rgb) -> Color {
    let [r, g, b] = c.to_array();
    Color::srgb(r, g, b)
}

pub fn color_alpha(c: Rgb, alpha: f32) -> Color {
    let [r, g, b] = c.to_array();
    Color::srgba(r, g, b, alpha)
}

/// Nearest 24-bit color of a Bevy color
pub fn rgb(c: Color) -> Rgb {
    let srgba = c.to_srgba();
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    Rgb((channel(srgba.red) << 16) | (channel(srgba.green) << 8) | channel(srgba.blue))
}

/// Flat triangle mesh in the local XY plane, normals along +Z
pub fn planar_mesh(planar: &PlanarMesh) -> Mesh {
    let count = planar.positions.len();
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, planar.positions.clone())
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, vec![[0.0, 0.0, 1.0]; count])
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, vec![[0.0, 0.0]; count])
        .with_inserted_indices(Indices::U32(planar.indices.clone()))
}

/// Open polyline through `points`
pub fn line_strip_mesh(points: &[glam::Vec3]) -> Mesh {
    let positions: Vec<[f32; 3]> = points.iter().map(|p| p.to_array()).collect();
    let count = positions.len();
    Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, vec![[0.0, 0.0, 1.0]; count])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_round_trip() {
        for hex in [0xf0f0f0, 0x5050ff, 0xffff99, 0x000000] {
            assert_eq!(rgb(color(Rgb(hex))), Rgb(hex));
        }
    }

    #[test]
    fn test_transform_round_trip() {
        let t = flatplan_core::Transform::from_translation(glam::Vec3::new(400.0, 260.0, 700.0))
            .with_scale(glam::Vec3::splat(3.0));
        let back = core_transform(&transform(&t));
        assert_eq!(back, t);
    }

    #[test]
    fn test_planar_mesh_attributes() {
        let planar = PlanarMesh::from_polygon(&[
            glam::Vec2::new(0.0, 0.0),
            glam::Vec2::new(1.0, 0.0),
            glam::Vec2::new(1.0, 1.0),
            glam::Vec2::new(0.0, 1.0),
        ]);
        let mesh = planar_mesh(&planar);
        assert_eq!(mesh.count_vertices(), 4);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(6));
    }
}
