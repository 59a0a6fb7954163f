//! Visual feedback meshes: light cones, light fields and hover outlines

use glam::{Quat, Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::geometry::{Orientation, PlanarMesh, Transform};
use crate::scene::Rgb;
use crate::zone::ZoneShape;

/// Glow color of a lit lamp
pub const GLOW_COLOR: Rgb = Rgb(0xffff99);
/// Hover outline color
pub const OUTLINE_COLOR: Rgb = Rgb(0xff0000);

/// Radial segments of a light cone
pub const CONE_SEGMENTS: u32 = 24;

/// Tilt applied to cones authored without an explicit orientation
pub const DEFAULT_CONE_TILT: Orientation = Orientation::new(-PI / 12.0, 0.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectShape {
    /// Cone along local +Y with the apex at `height / 2`
    Cone { radius: f32, height: f32 },
    /// Trapezoid widening by a third of `width` on each side toward +Y,
    /// approximating light spilling from a wall fixture
    LightField { width: f32, height: f32 },
}

/// Translucent proxy showing that a lamp is on.
///
/// The proxy is built transparent (off). Lighting it makes the surface
/// opaque; the stored opacity stays at zero so turning it off again needs no
/// bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectProxy {
    pub shape: EffectShape,
    pub position: Vec3,
    pub orientation: Orientation,
    pub color: Rgb,
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
}

impl EffectProxy {
    pub fn cone(radius: f32, height: f32, position: Vec3, orientation: Orientation) -> Self {
        Self {
            shape: EffectShape::Cone { radius, height },
            position,
            orientation,
            color: GLOW_COLOR,
            opacity: 0.0,
            transparent: true,
            double_sided: false,
        }
    }

    pub fn light_field(width: f32, height: f32, position: Vec3, orientation: Orientation) -> Self {
        Self {
            shape: EffectShape::LightField { width, height },
            position,
            orientation,
            color: GLOW_COLOR,
            opacity: 0.0,
            transparent: true,
            double_sided: true,
        }
    }

    pub fn is_lit(&self) -> bool {
        !self.transparent
    }

    pub fn set_lit(&mut self, lit: bool) {
        self.transparent = !lit;
    }

    /// Flip the proxy and return the new state
    pub fn toggle(&mut self) -> bool {
        self.transparent = !self.transparent;
        self.is_lit()
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.orientation.to_quat())
    }

    /// Trapezoid corners of a light field, `None` for cones
    pub fn field_outline(&self) -> Option<[Vec2; 4]> {
        match self.shape {
            EffectShape::LightField { width, height } => {
                let (hw, hh, spill) = (width / 2.0, height / 2.0, width / 3.0);
                Some([
                    Vec2::new(-hw, -hh),
                    Vec2::new(hw, -hh),
                    Vec2::new(hw + spill, hh),
                    Vec2::new(-hw - spill, hh),
                ])
            }
            EffectShape::Cone { .. } => None,
        }
    }

    /// Flat mesh of a light field, `None` for cones
    pub fn field_mesh(&self) -> Option<PlanarMesh> {
        self.field_outline().map(|outline| PlanarMesh::from_polygon(&outline))
    }
}

/// Hover indicator drawn around a lamp zone. Hidden until the pointer is
/// over the lamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutline {
    pub shape: ZoneShape,
    pub position: Vec3,
    pub rotation: Quat,
    pub color: Rgb,
    pub visible: bool,
}

impl SelectionOutline {
    pub fn circle(radius: f32, position: Vec3) -> Self {
        Self {
            shape: ZoneShape::Circle { radius },
            position,
            rotation: Quat::from_rotation_x(FRAC_PI_2),
            color: OUTLINE_COLOR,
            visible: false,
        }
    }

    pub fn rect(width: f32, height: f32, position: Vec3) -> Self {
        Self {
            shape: ZoneShape::Rect { width, height },
            position,
            rotation: Quat::from_rotation_x(-FRAC_PI_2),
            color: OUTLINE_COLOR,
            visible: false,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation)
    }

    /// Closed line loop in local space; the first point is repeated at the end
    pub fn line_loop(&self) -> Vec<Vec3> {
        let mut points: Vec<Vec3> = self.shape.outline().iter().map(|p| p.extend(0.0)).collect();
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
        points
    }
}
