//! The apartment: every hot zone, lamp and air conditioner of the floor plan
//!
//! Coordinates are in model units of the floor-plan mesh, Y up. Ceiling zones
//! hang at height 250; the master switches and A/C units float just above
//! them at 260 so they stay clickable from the default top-down view.

use glam::Vec3;
use std::f32::consts::PI;

use crate::effect::{EffectProxy, SelectionOutline, DEFAULT_CONE_TILT};
use crate::fixture::{CoolingUnit, Lamp, MasterSwitch};
use crate::geometry::{Orientation, Transform};
use crate::scene::{LightKind, LightNode, Rgb, SceneNode};
use crate::zone::Zone;

const CEILING_HEIGHT: f32 = 250.0;
const SWITCH_HEIGHT: f32 = 260.0;
const SWITCH_RADIUS: f32 = 32.0;

/// Scene clear color
pub const BACKGROUND: Rgb = Rgb(0xf0f0f0);
/// Tint of the lighting master switch when lit
pub const MASTER_LIGHT_COLOR: Rgb = Rgb(0xf0f000);

/// Everything the interaction controller and the scene need about the plan
#[derive(Debug, Clone)]
pub struct FloorPlanLayout {
    pub ceilings: Vec<Zone>,
    pub lamps: Vec<Lamp>,
    pub lighting_master: MasterSwitch,
    pub cooling_units: Vec<CoolingUnit>,
    pub cooling_master: MasterSwitch,
    /// Ambient and key light of the scene
    pub lights: Vec<SceneNode>,
}

impl FloorPlanLayout {
    pub fn apartment() -> Self {
        Self {
            ceilings: ceiling_zones(),
            lamps: lamps(),
            lighting_master: MasterSwitch::new(
                Zone::circle("all-lights", SWITCH_RADIUS, Vec3::new(472.0, SWITCH_HEIGHT, 700.0))
                    .with_color(MASTER_LIGHT_COLOR),
            ),
            cooling_units: [
                Vec3::new(150.0, SWITCH_HEIGHT, 450.0),
                Vec3::new(100.0, SWITCH_HEIGHT, -100.0),
                Vec3::new(-100.0, SWITCH_HEIGHT, 100.0),
            ]
            .into_iter()
            .enumerate()
            .map(|(i, p)| CoolingUnit::new(Zone::circle(format!("cooler-{i}"), SWITCH_RADIUS, p)))
            .collect(),
            cooling_master: MasterSwitch::new(Zone::circle(
                "all-coolers",
                SWITCH_RADIUS,
                Vec3::new(400.0, SWITCH_HEIGHT, 700.0),
            )),
            lights: scene_lights(),
        }
    }

    /// Snowflake positions by slot: one per cooling unit, then the master
    pub fn snowflake_positions(&self) -> Vec<Vec3> {
        self.cooling_units
            .iter()
            .map(|u| u.decor_position)
            .chain(std::iter::once(self.cooling_master.zone.position))
            .collect()
    }
}

fn ceiling_zones() -> Vec<Zone> {
    vec![
        Zone::rect("kitchen", 195.0, 450.0, Vec3::new(562.5, CEILING_HEIGHT, 368.5)),
        Zone::rect("hallway", 134.0, 452.0, Vec3::new(391.0, CEILING_HEIGHT, 367.5)),
        Zone::rect("toilet", 90.5, 215.0, Vec3::new(271.0, CEILING_HEIGHT, 212.28)),
        Zone::rect("bathroom", 200.0, 255.0, Vec3::new(118.5, CEILING_HEIGHT, 191.65)),
        Zone::rect("nursery", 338.0, 265.25, Vec3::new(147.45, CEILING_HEIGHT, 459.4)),
        Zone::polygon(
            "bedroom",
            &[[294.2, 336.6], [296.0, 77.0], [219.6, 0.0], [0.0, 0.0], [0.0, 336.6]],
            Vec3::new(-284.0, CEILING_HEIGHT, -17.4),
        ),
        Zone::polygon(
            "living-room",
            &[
                [0.0, 0.0],
                [0.0, 218.3],
                [222.14, 218.1],
                [303.54, 299.48],
                [607.7, 299.64],
                [607.7, 376.28],
                [741.4, 376.8],
                [741.4, 0.0],
            ],
            Vec3::new(-284.0, CEILING_HEIGHT, -243.0),
        ),
    ]
}

fn round_lamp(name: &str, radius: f32, at: Vec3, effect: EffectProxy) -> Lamp {
    Lamp {
        zone: Zone::circle(name, radius, at),
        outline: SelectionOutline::circle(radius, at),
        effect,
    }
}

fn wall_lamp(name: &str, width: f32, height: f32, at: Vec3, effect: EffectProxy) -> Lamp {
    Lamp {
        zone: Zone::rect(name, width, height, at),
        outline: SelectionOutline::rect(width, height, at),
        effect,
    }
}

fn lamps() -> Vec<Lamp> {
    let bedroom_tilt = Orientation::new(0.0, 0.0, -PI / 12.0);
    vec![
        round_lamp(
            "living-room-floor-lamp",
            16.0,
            Vec3::new(187.5, 182.0, -180.0),
            EffectProxy::cone(50.0, 150.0, Vec3::new(186.5, 105.0, -160.0), DEFAULT_CONE_TILT),
        ),
        round_lamp(
            "living-room-table-lamp",
            12.0,
            Vec3::new(430.5, 115.0, -207.0),
            EffectProxy::cone(15.0, 30.0, Vec3::new(430.5, 100.0, -204.0), DEFAULT_CONE_TILT),
        ),
        round_lamp(
            "living-room-wall-lamp",
            16.0,
            Vec3::new(-245.5, 207.0, -140.0),
            EffectProxy::light_field(
                30.0,
                80.0,
                Vec3::new(-234.5, 167.0, -140.0),
                Orientation::new(PI * 1.1, -PI * 0.5, 0.0),
            ),
        ),
        round_lamp(
            "bedroom-wall-lamp-1",
            14.0,
            Vec3::new(-10.5, 198.0, 98.0),
            EffectProxy::cone(50.0, 150.0, Vec3::new(-27.5, 123.5, 96.0), bedroom_tilt),
        ),
        round_lamp(
            "bedroom-wall-lamp-2",
            14.0,
            Vec3::new(-10.5, 198.0, 180.0),
            EffectProxy::cone(50.0, 150.0, Vec3::new(-27.5, 123.5, 179.5), bedroom_tilt),
        ),
        wall_lamp(
            "kitchen-wall-lamp",
            20.0,
            100.0,
            Vec3::new(472.5, 198.0, 443.5),
            EffectProxy::light_field(
                80.0,
                80.0,
                Vec3::new(497.5, 162.0, 443.0),
                Orientation::new(PI * 1.2, -PI * 0.5, 0.0),
            ),
        ),
        wall_lamp(
            "bathroom-wall-lamp",
            20.0,
            50.0,
            Vec3::new(212.5, 178.5, 192.0),
            EffectProxy::light_field(
                30.0,
                80.0,
                Vec3::new(200.5, 138.0, 192.0),
                Orientation::new(PI * 0.9, -PI * 0.5, 0.0),
            ),
        ),
    ]
}

fn scene_lights() -> Vec<SceneNode> {
    vec![
        SceneNode::Light(LightNode {
            name: "sky".to_string(),
            transform: Transform::IDENTITY,
            kind: LightKind::Hemisphere {
                sky: Rgb::WHITE,
                ground: Rgb(0xa0a0a0),
                intensity: 0.85,
            },
        }),
        SceneNode::Light(LightNode {
            name: "sun".to_string(),
            transform: Transform::from_translation(Vec3::new(0.0, 10.0, 0.0)),
            kind: LightKind::Directional {
                color: Rgb::WHITE,
                intensity: 0.15,
                target: Vec3::new(-5.0, 0.0, 0.0),
            },
        }),
    ]
}
