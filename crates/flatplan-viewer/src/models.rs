//! Floor-plan and snowflake model loading
//!
//! Models load through the asset server. Once a glTF is in, its scene is
//! spawned; once the scene's entities exist they are converted into core
//! scene nodes and handed to the viewer, which frames the camera around the
//! floor plan and installs the snowflakes in their slots.

use bevy::asset::io::AssetReaderError;
use bevy::asset::{AssetLoadError, LoadState};
use bevy::gltf::Gltf;
use bevy::prelude::*;
use flatplan_core::assets::prepare_decoration;
use flatplan_core::fixture::SNOWFLAKE_SCALE;
use flatplan_core::scene::{GroupNode, Material, MeshNode};
use flatplan_core::{Aabb, LoadError, SceneNode};
use std::collections::HashMap;

use crate::app::{ViewerSettings, ViewerState};
use crate::convert::{color, core_transform, rgb, transform};

pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelCache>()
            .add_systems(Startup, request_models)
            .add_systems(Update, load_models)
            .add_systems(Update, spawn_models.after(load_models))
            .add_systems(Update, attach_floor_plan.after(spawn_models))
            .add_systems(Update, attach_decorations.after(spawn_models))
            .add_systems(Update, sync_decoration_colors.after(attach_decorations));
    }
}

/// Load progress of one model file
#[derive(Default)]
pub enum ModelLoad {
    #[default]
    NotRequested,
    Loading(Handle<Gltf>),
    Ready(Handle<Scene>),
    Spawned,
    Failed,
}

#[derive(Resource, Default)]
pub struct ModelCache {
    pub floor_plan: ModelLoad,
    pub snowflake: ModelLoad,
}

/// Root of the spawned floor-plan scene
#[derive(Component)]
pub struct FloorPlanRoot;

/// Root of a spawned snowflake scene
#[derive(Component)]
pub struct Decoration {
    pub slot: usize,
}

/// Scene root already converted and handed to the viewer
#[derive(Component)]
pub struct Attached;

fn request_models(
    mut cache: ResMut<ModelCache>,
    asset_server: Res<AssetServer>,
    settings: Res<ViewerSettings>,
) {
    let assets = &settings.0.assets;
    tracing::info!("Loading floor plan: {}", assets.floor_plan);
    cache.floor_plan = ModelLoad::Loading(asset_server.load(assets.floor_plan.clone()));
    cache.snowflake = ModelLoad::Loading(asset_server.load(assets.snowflake.clone()));
}

fn load_error(path: &str, err: &AssetLoadError) -> LoadError {
    match err {
        AssetLoadError::AssetReaderError(AssetReaderError::NotFound(_)) => LoadError::NotFound(path.to_string()),
        other => LoadError::Parse {
            path: path.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Advance one model's load. Returns the failure once, when it happens.
fn poll_model(
    load: &mut ModelLoad,
    path: &str,
    asset_server: &AssetServer,
    gltf_assets: &Assets<Gltf>,
) -> Option<LoadError> {
    let ModelLoad::Loading(handle) = load else {
        return None;
    };

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            let scene = gltf_assets
                .get(&*handle)
                .and_then(|gltf| gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()));
            match scene {
                Some(scene) => {
                    tracing::info!("Model loaded: {}", path);
                    *load = ModelLoad::Ready(scene);
                    None
                }
                None => {
                    *load = ModelLoad::Failed;
                    Some(LoadError::Parse {
                        path: path.to_string(),
                        reason: "no scenes".to_string(),
                    })
                }
            }
        }
        Some(LoadState::Failed(err)) => {
            *load = ModelLoad::Failed;
            Some(load_error(path, err.as_ref()))
        }
        _ => None,
    }
}

/// Check loading state and report failures to the viewer
fn load_models(
    mut cache: ResMut<ModelCache>,
    mut state: ResMut<ViewerState>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    settings: Res<ViewerSettings>,
) {
    let assets = &settings.0.assets;
    let cache = &mut *cache;

    if let Some(err) = poll_model(&mut cache.floor_plan, &assets.floor_plan, &asset_server, &gltf_assets) {
        state.viewer.attach_floor_plan(Err(err));
    }

    if let Some(err) = poll_model(&mut cache.snowflake, &assets.snowflake, &asset_server, &gltf_assets) {
        let reason = err.to_string();
        for slot in 0..state.viewer.controller.decoration_slots() {
            let err = LoadError::Parse {
                path: assets.snowflake.clone(),
                reason: reason.clone(),
            };
            state.viewer.attach_decoration(slot, Err(err));
        }
    }
}

fn spawn_models(
    mut commands: Commands,
    mut cache: ResMut<ModelCache>,
    state: Res<ViewerState>,
) {
    if let ModelLoad::Ready(scene) = &cache.floor_plan {
        commands.spawn((
            SceneRoot(scene.clone()),
            Transform::default(),
            FloorPlanRoot,
            Name::new("floor-plan"),
        ));
        cache.floor_plan = ModelLoad::Spawned;
    }

    if let ModelLoad::Ready(scene) = &cache.snowflake {
        let positions = state.viewer.controller.layout().snowflake_positions();
        for (slot, position) in positions.into_iter().enumerate() {
            let placement = flatplan_core::Transform::from_translation(position)
                .with_scale(glam::Vec3::splat(SNOWFLAKE_SCALE));
            commands.spawn((
                SceneRoot(scene.clone()),
                transform(&placement),
                Decoration { slot },
                Name::new(format!("snowflake-{slot}")),
            ));
        }
        cache.snowflake = ModelLoad::Spawned;
    }
}

type NodeQuery<'w, 's> = Query<
    'w,
    's,
    (
        Option<&'static Name>,
        &'static Transform,
        Option<&'static Mesh3d>,
        Option<&'static MeshMaterial3d<StandardMaterial>>,
        Option<&'static Children>,
    ),
>;

/// Bounds of a mesh's vertex positions
fn mesh_bounds(mesh: &Mesh) -> Aabb {
    let mut bounds = Aabb::EMPTY;
    if let Some(positions) = mesh.attribute(Mesh::ATTRIBUTE_POSITION).and_then(|a| a.as_float3()) {
        for p in positions {
            bounds.extend(glam::Vec3::from_array(*p));
        }
    }
    bounds
}

fn core_material(material: &StandardMaterial) -> Material {
    Material {
        color: rgb(material.base_color),
        opacity: material.base_color.to_srgba().alpha,
        transparent: !matches!(material.alpha_mode, AlphaMode::Opaque),
        double_sided: material.double_sided,
    }
}

/// Convert a spawned entity hierarchy into a core scene node
fn scene_node(
    entity: Entity,
    nodes: &NodeQuery,
    meshes: &Assets<Mesh>,
    materials: &Assets<StandardMaterial>,
) -> Option<SceneNode> {
    let (name, local, mesh, material, children) = nodes.get(entity).ok()?;
    let name = name.map(|n| n.as_str().to_string()).unwrap_or_default();
    let transform = core_transform(local);

    if let Some(mesh) = mesh {
        let bounds = meshes.get(&mesh.0).map(mesh_bounds).unwrap_or(Aabb::EMPTY);
        let mut node = MeshNode::new(name, bounds);
        node.transform = transform;
        if let Some(material) = material.and_then(|m| materials.get(&m.0)) {
            node.material = core_material(material);
        }
        return Some(SceneNode::Mesh(node));
    }

    let children = children
        .map(|children| {
            children
                .iter()
                .filter_map(|child| scene_node(child, nodes, meshes, materials))
                .collect()
        })
        .unwrap_or_default();
    Some(SceneNode::Group(GroupNode {
        name,
        transform,
        children,
    }))
}

/// Mesh entities with a standard material below `entity`, including itself
fn collect_mesh_materials(
    entity: Entity,
    children_query: &Query<&Children>,
    material_query: &Query<&MeshMaterial3d<StandardMaterial>>,
    out: &mut Vec<(Entity, Handle<StandardMaterial>)>,
) {
    if let Ok(material) = material_query.get(entity) {
        out.push((entity, material.0.clone()));
    }
    if let Ok(children) = children_query.get(entity) {
        for child in children.iter() {
            collect_mesh_materials(child, children_query, material_query, out);
        }
    }
}

/// Hand the floor plan to the viewer once its scene has spawned, and make
/// every surface visible from both sides
fn attach_floor_plan(
    mut commands: Commands,
    mut state: ResMut<ViewerState>,
    roots: Query<(Entity, &Children), (With<FloorPlanRoot>, Without<Attached>)>,
    nodes: NodeQuery,
    children_query: Query<&Children>,
    material_query: Query<&MeshMaterial3d<StandardMaterial>>,
    meshes: Res<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, _) in roots.iter() {
        let mut surfaces = Vec::new();
        collect_mesh_materials(entity, &children_query, &material_query, &mut surfaces);
        for (_, handle) in &surfaces {
            if let Some(material) = materials.get_mut(handle) {
                material.double_sided = true;
                material.cull_mode = None;
            }
        }

        let Some(node) = scene_node(entity, &nodes, &meshes, &materials) else {
            continue;
        };
        state.viewer.attach_floor_plan(Ok(node));
        commands.entity(entity).insert(Attached);
    }
}

fn attach_decorations(
    mut commands: Commands,
    mut state: ResMut<ViewerState>,
    roots: Query<(Entity, &Decoration, &Children), Without<Attached>>,
    nodes: NodeQuery,
    meshes: Res<Assets<Mesh>>,
    materials: Res<Assets<StandardMaterial>>,
) {
    if roots.is_empty() {
        return;
    }
    let positions = state.viewer.controller.layout().snowflake_positions();
    let palette = *state.viewer.controller.palette();

    for (entity, decoration, _) in roots.iter() {
        let (Some(node), Some(position)) = (
            scene_node(entity, &nodes, &meshes, &materials),
            positions.get(decoration.slot).copied(),
        ) else {
            continue;
        };
        let node = prepare_decoration(node, position, &palette);
        state.viewer.attach_decoration(decoration.slot, Ok(node));
        commands.entity(entity).insert(Attached);
    }
}

/// Paint each snowflake the color its decoration node carries. Instances
/// share the glTF's materials, so every mesh gets its own copy first.
fn sync_decoration_colors(
    mut commands: Commands,
    state: Res<ViewerState>,
    roots: Query<(Entity, &Decoration), With<Attached>>,
    children_query: Query<&Children>,
    material_query: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut own_materials: Local<HashMap<Entity, Handle<StandardMaterial>>>,
) {
    if !state.is_changed() {
        return;
    }
    let controller = &state.viewer.controller;

    for (root, decoration) in roots.iter() {
        let Some(target) = controller
            .decoration(decoration.slot)
            .and_then(|node| node.mesh_colors().first().copied())
        else {
            continue;
        };
        let target = color(target);

        let mut surfaces = Vec::new();
        collect_mesh_materials(root, &children_query, &material_query, &mut surfaces);
        for (entity, shared) in surfaces {
            let handle = own_materials.entry(entity).or_insert_with(|| {
                let Some(original) = materials.get(&shared).cloned() else {
                    return shared.clone();
                };
                let handle = materials.add(original);
                commands.entity(entity).insert(MeshMaterial3d(handle.clone()));
                handle
            });
            if let Some(material) = materials.get_mut(&*handle) {
                if material.base_color != target {
                    material.base_color = target;
                }
            }
        }
    }
}
