//! 3D scene: hot zones, lamp effects, hover outlines and lights
//!
//! Everything here is spawned once from the controller's layout. Systems then
//! mirror controller state onto materials and visibility each frame.

use bevy::prelude::*;
use bevy::render::render_resource::Face;
use flatplan_core::effect::{EffectShape, CONE_SEGMENTS};
use flatplan_core::scene::LightKind;
use flatplan_core::{SceneNode, Zone};

use crate::app::ViewerState;
use crate::convert::{color, color_alpha, line_strip_mesh, planar_mesh, transform, vec3};

/// Hemisphere intensity to ambient brightness
const AMBIENT_BRIGHTNESS_SCALE: f32 = 1000.0;
/// Directional intensity to illuminance in lux
const ILLUMINANCE_SCALE: f32 = 10_000.0;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(Update, (
                sync_zone_materials,
                sync_lamp_effects,
                sync_outlines,
            ));
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    Ceiling(usize),
    Lamp(usize),
    LightingMaster,
    Cooling(usize),
    CoolingMaster,
}

/// A hot zone's surface
#[derive(Component)]
pub struct ZoneEntity {
    pub kind: ZoneKind,
}

/// Light cone or light field of a lamp
#[derive(Component)]
pub struct LampEffect {
    pub index: usize,
}

/// Hover outline of a lamp
#[derive(Component)]
pub struct LampOutline {
    pub index: usize,
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    state: Res<ViewerState>,
) {
    let viewer = &state.viewer;
    let layout = viewer.controller.layout();
    let camera = &viewer.camera;

    let ambient = layout.lights.iter().find_map(|light| match light {
        SceneNode::Light(l) => match l.kind {
            LightKind::Hemisphere { sky, intensity, .. } => Some(AmbientLight {
                color: color(sky),
                brightness: intensity * AMBIENT_BRIGHTNESS_SCALE,
                affects_lightmapped_meshes: true,
            }),
            _ => None,
        },
        _ => None,
    });

    let mut camera_entity = commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_y_degrees.to_radians(),
            aspect_ratio: camera.aspect,
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        Transform::from_translation(vec3(camera.position)).looking_at(vec3(camera.target), Vec3::Y),
        MainCamera,
    ));
    if let Some(ambient) = ambient {
        camera_entity.insert(ambient);
    }

    for light in &layout.lights {
        if let SceneNode::Light(l) = light {
            if let LightKind::Directional { color: c, intensity, target } = l.kind {
                commands.spawn((
                    DirectionalLight {
                        illuminance: intensity * ILLUMINANCE_SCALE,
                        color: color(c),
                        shadows_enabled: false,
                        ..default()
                    },
                    Transform::from_translation(vec3(l.transform.translation))
                        .looking_at(vec3(target), Vec3::Y),
                    Name::new(l.name.clone()),
                ));
            }
        }
    }

    let zones = layout
        .ceilings
        .iter()
        .enumerate()
        .map(|(i, z)| (ZoneKind::Ceiling(i), z))
        .chain(layout.lamps.iter().enumerate().map(|(i, l)| (ZoneKind::Lamp(i), &l.zone)))
        .chain(std::iter::once((ZoneKind::LightingMaster, &layout.lighting_master.zone)))
        .chain(layout.cooling_units.iter().enumerate().map(|(i, u)| (ZoneKind::Cooling(i), &u.zone)))
        .chain(std::iter::once((ZoneKind::CoolingMaster, &layout.cooling_master.zone)));

    for (kind, zone) in zones {
        spawn_zone(&mut commands, &mut meshes, &mut materials, kind, zone);
    }

    for (index, lamp) in layout.lamps.iter().enumerate() {
        let effect = &lamp.effect;
        let mesh = match effect.shape {
            EffectShape::Cone { radius, height } => {
                Cone::new(radius, height).mesh().resolution(CONE_SEGMENTS).build()
            }
            EffectShape::LightField { .. } => match effect.field_mesh() {
                Some(planar) => planar_mesh(&planar),
                None => continue,
            },
        };
        commands.spawn((
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color_alpha(effect.color, effect.opacity),
                unlit: true,
                alpha_mode: AlphaMode::Blend,
                double_sided: effect.double_sided,
                cull_mode: if effect.double_sided { None } else { Some(Face::Back) },
                ..default()
            })),
            transform(&effect.transform()),
            LampEffect { index },
            Name::new(format!("{}-effect", lamp.zone.name)),
        ));

        let outline = &lamp.outline;
        commands.spawn((
            Mesh3d(meshes.add(line_strip_mesh(&outline.line_loop()))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color(outline.color),
                unlit: true,
                ..default()
            })),
            transform(&outline.transform()),
            Visibility::Hidden,
            LampOutline { index },
            Name::new(format!("{}-outline", lamp.zone.name)),
        ));
    }

    tracing::info!(
        ceilings = layout.ceilings.len(),
        lamps = layout.lamps.len(),
        coolers = layout.cooling_units.len(),
        "Scene assembled"
    );
}

fn spawn_zone(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    kind: ZoneKind,
    zone: &Zone,
) {
    // Only ceilings and the lighting master ever show; the rest are pure hit targets
    let visibility = match kind {
        ZoneKind::Ceiling(_) | ZoneKind::LightingMaster => Visibility::Inherited,
        _ => Visibility::Hidden,
    };
    commands.spawn((
        Mesh3d(meshes.add(planar_mesh(&zone.shape.mesh()))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: color_alpha(zone.color, zone.opacity),
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            ..default()
        })),
        transform(&zone.transform()),
        visibility,
        ZoneEntity { kind },
        Name::new(zone.name.clone()),
    ));
}

/// Base color and blending for a surface that is either see-through at
/// `opacity` or fully opaque
fn surface(c: flatplan_core::Rgb, opacity: f32, transparent: bool) -> (Color, AlphaMode) {
    if transparent {
        (color_alpha(c, opacity), AlphaMode::Blend)
    } else {
        (color(c), AlphaMode::Opaque)
    }
}

fn apply_surface(material: &mut StandardMaterial, (base_color, alpha_mode): (Color, AlphaMode)) {
    if material.base_color != base_color || material.alpha_mode != alpha_mode {
        material.base_color = base_color;
        material.alpha_mode = alpha_mode;
    }
}

/// Ceiling opacity and the lighting master's lit tint
fn sync_zone_materials(
    state: Res<ViewerState>,
    zones: Query<(&ZoneEntity, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !state.is_changed() {
        return;
    }
    let controller = &state.viewer.controller;
    let layout = controller.layout();

    for (zone, handle) in zones.iter() {
        let target = match zone.kind {
            ZoneKind::Ceiling(i) => match layout.ceilings.get(i) {
                Some(z) => surface(z.color, z.opacity, true),
                None => continue,
            },
            ZoneKind::LightingMaster => {
                let z = &layout.lighting_master.zone;
                surface(z.color, z.opacity, !controller.lighting_master_active())
            }
            _ => continue,
        };
        if let Some(material) = materials.get_mut(&handle.0) {
            apply_surface(material, target);
        }
    }
}

fn sync_lamp_effects(
    state: Res<ViewerState>,
    effects: Query<(&LampEffect, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !state.is_changed() {
        return;
    }
    let lamps = &state.viewer.controller.layout().lamps;

    for (effect, handle) in effects.iter() {
        let Some(lamp) = lamps.get(effect.index) else {
            continue;
        };
        let proxy = &lamp.effect;
        if let Some(material) = materials.get_mut(&handle.0) {
            apply_surface(material, surface(proxy.color, proxy.opacity, proxy.transparent));
        }
    }
}

fn sync_outlines(
    state: Res<ViewerState>,
    mut outlines: Query<(&LampOutline, &mut Visibility)>,
) {
    if !state.is_changed() {
        return;
    }
    let controller = &state.viewer.controller;

    for (outline, mut visibility) in outlines.iter_mut() {
        let target = if controller.outline_visible(outline.index) {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if *visibility != target {
            *visibility = target;
        }
    }
}
