//! Scene-graph node model handed over by the asset loader
//!
//! Loaded models arrive as a tree over a closed set of node kinds. Code that
//! needs to touch only meshes (recoloring a snowflake, measuring the floor plan)
//! walks the tree with a [`NodeVisitor`] instead of inspecting node types.

use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::geometry::{Aabb, Transform};

/// 24-bit sRGB color, `0xRRGGBB`. Serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xffffff);

    pub const fn from_hex(hex: u32) -> Self {
        Self(hex & 0xffffff)
    }

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// Channels scaled to 0.0-1.0
    pub fn to_array(self) -> [f32; 3] {
        [
            self.r() as f32 / 255.0,
            self.g() as f32 / 255.0,
            self.b() as f32 / 255.0,
        ]
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Surface appearance of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub opacity: f32,
    /// When false the surface renders opaque regardless of `opacity`
    pub transparent: bool,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
        }
    }
}

/// Named materials loaded alongside a model
#[derive(Debug, Clone, Default)]
pub struct MaterialSet {
    pub materials: HashMap<String, Material>,
}

impl MaterialSet {
    pub fn insert(&mut self, name: impl Into<String>, material: Material) {
        self.materials.insert(name.into(), material);
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Render every material from both faces
    pub fn force_double_sided(&mut self) {
        for material in self.materials.values_mut() {
            material.double_sided = true;
        }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    pub name: String,
    pub transform: Transform,
    /// Bounds of the vertex data in the node's own frame
    pub bounds: Aabb,
    pub material: Material,
    /// Material name to resolve against a [`MaterialSet`]
    pub material_name: Option<String>,
}

impl MeshNode {
    pub fn new(name: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            bounds,
            material: Material::default(),
            material_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupNode {
    pub name: String,
    pub transform: Transform,
    pub children: Vec<SceneNode>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Sky/ground gradient ambient light
    Hemisphere { sky: Rgb, ground: Rgb, intensity: f32 },
    /// Parallel light shining from the node position toward `target`
    Directional { color: Rgb, intensity: f32, target: Vec3 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightNode {
    pub name: String,
    pub transform: Transform,
    pub kind: LightKind,
}

/// A node of a loaded model or of the assembled scene
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Mesh(MeshNode),
    Group(GroupNode),
    Light(LightNode),
}

/// Per-variant callbacks for [`SceneNode::walk`]. `world` is the accumulated
/// transform of the visited node.
pub trait NodeVisitor {
    fn visit_mesh(&mut self, _mesh: &MeshNode, _world: &Affine3A) {}
    fn visit_group(&mut self, _group: &GroupNode, _world: &Affine3A) {}
    fn visit_light(&mut self, _light: &LightNode, _world: &Affine3A) {}
}

/// Mutable counterpart of [`NodeVisitor`] for [`SceneNode::walk_mut`]
pub trait NodeVisitorMut {
    fn visit_mesh(&mut self, _mesh: &mut MeshNode) {}
    fn visit_group(&mut self, _group: &mut GroupNode) {}
    fn visit_light(&mut self, _light: &mut LightNode) {}
}

impl SceneNode {
    pub fn group(name: impl Into<String>, children: Vec<SceneNode>) -> Self {
        SceneNode::Group(GroupNode {
            name: name.into(),
            transform: Transform::IDENTITY,
            children,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            SceneNode::Mesh(m) => &m.name,
            SceneNode::Group(g) => &g.name,
            SceneNode::Light(l) => &l.name,
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            SceneNode::Mesh(m) => &m.transform,
            SceneNode::Group(g) => &g.transform,
            SceneNode::Light(l) => &l.transform,
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            SceneNode::Mesh(m) => &mut m.transform,
            SceneNode::Group(g) => &mut g.transform,
            SceneNode::Light(l) => &mut l.transform,
        }
    }

    /// Depth-first traversal, parents before children
    pub fn walk(&self, visitor: &mut impl NodeVisitor) {
        self.walk_from(&Affine3A::IDENTITY, visitor);
    }

    fn walk_from(&self, parent: &Affine3A, visitor: &mut impl NodeVisitor) {
        let world = *parent * self.transform().to_affine();
        match self {
            SceneNode::Mesh(m) => visitor.visit_mesh(m, &world),
            SceneNode::Light(l) => visitor.visit_light(l, &world),
            SceneNode::Group(g) => {
                visitor.visit_group(g, &world);
                for child in &g.children {
                    child.walk_from(&world, visitor);
                }
            }
        }
    }

    pub fn walk_mut(&mut self, visitor: &mut impl NodeVisitorMut) {
        match self {
            SceneNode::Mesh(m) => visitor.visit_mesh(m),
            SceneNode::Light(l) => visitor.visit_light(l),
            SceneNode::Group(g) => {
                visitor.visit_group(g);
                for child in &mut g.children {
                    child.walk_mut(visitor);
                }
            }
        }
    }

    /// Union of all mesh bounds in the coordinate frame of this node's parent
    pub fn world_bounds(&self) -> Aabb {
        struct Bounds(Aabb);
        impl NodeVisitor for Bounds {
            fn visit_mesh(&mut self, mesh: &MeshNode, world: &Affine3A) {
                self.0 = self.0.union(&mesh.bounds.transformed(world));
            }
        }

        let mut bounds = Bounds(Aabb::EMPTY);
        self.walk(&mut bounds);
        bounds.0
    }

    /// Paint every mesh below this node
    pub fn set_color(&mut self, color: Rgb) {
        struct Paint(Rgb);
        impl NodeVisitorMut for Paint {
            fn visit_mesh(&mut self, mesh: &mut MeshNode) {
                mesh.material.color = self.0;
            }
        }

        self.walk_mut(&mut Paint(color));
    }

    /// Resolve mesh material names against `set`. Meshes without a match keep
    /// their current material.
    pub fn apply_materials(&mut self, set: &MaterialSet) {
        struct Apply<'a>(&'a MaterialSet);
        impl NodeVisitorMut for Apply<'_> {
            fn visit_mesh(&mut self, mesh: &mut MeshNode) {
                if let Some(material) = mesh.material_name.as_deref().and_then(|n| self.0.get(n)) {
                    mesh.material = material.clone();
                }
            }
        }

        self.walk_mut(&mut Apply(set));
    }

    pub fn mesh_count(&self) -> usize {
        struct Count(usize);
        impl NodeVisitor for Count {
            fn visit_mesh(&mut self, _mesh: &MeshNode, _world: &Affine3A) {
                self.0 += 1;
            }
        }

        let mut count = Count(0);
        self.walk(&mut count);
        count.0
    }

    /// Colors of every mesh, in traversal order
    pub fn mesh_colors(&self) -> Vec<Rgb> {
        struct Colors(Vec<Rgb>);
        impl NodeVisitor for Colors {
            fn visit_mesh(&mut self, mesh: &MeshNode, _world: &Affine3A) {
                self.0.push(mesh.material.color);
            }
        }

        let mut colors = Colors(Vec::new());
        self.walk(&mut colors);
        colors.0
    }
}
