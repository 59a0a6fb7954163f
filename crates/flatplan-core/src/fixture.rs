//! Fixtures: the toggle-able things hot zones are mapped to

use glam::Vec3;

use crate::effect::{EffectProxy, SelectionOutline};
use crate::scene::{Rgb, SceneNode};
use crate::zone::Zone;

/// Uniform scale of a snowflake model
pub const SNOWFLAKE_SCALE: f32 = 3.0;

/// A lamp switch: the clickable zone, its hover outline and its light proxy
#[derive(Debug, Clone, PartialEq)]
pub struct Lamp {
    pub zone: Zone,
    pub outline: SelectionOutline,
    pub effect: EffectProxy,
}

/// Snowflake tints for idle and running air conditioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoolingPalette {
    pub neutral: Rgb,
    pub active: Rgb,
}

impl Default for CoolingPalette {
    fn default() -> Self {
        Self {
            neutral: Rgb(0xf0f0f0),
            active: Rgb(0x5050ff),
        }
    }
}

impl CoolingPalette {
    pub fn color_for(&self, active: bool) -> Rgb {
        if active {
            self.active
        } else {
            self.neutral
        }
    }
}

/// An air-conditioning unit: hot zone, snowflake decoration and on/off flag.
///
/// The snowflake loads asynchronously and may be missing. The flag is
/// tracked either way.
#[derive(Debug, Clone, PartialEq)]
pub struct CoolingUnit {
    pub zone: Zone,
    /// Where the snowflake is placed once it arrives
    pub decor_position: Vec3,
    pub decor: Option<SceneNode>,
    pub active: bool,
}

impl CoolingUnit {
    pub fn new(zone: Zone) -> Self {
        let decor_position = zone.position;
        Self {
            zone,
            decor_position,
            decor: None,
            active: false,
        }
    }

    /// Set the flag and repaint the snowflake to match
    pub fn set_active(&mut self, active: bool, palette: &CoolingPalette) {
        self.active = active;
        if let Some(decor) = self.decor.as_mut() {
            decor.set_color(palette.color_for(active));
        }
    }
}

/// Aggregate switch for a whole category. It holds geometry only; whether it
/// is active is always computed from its subordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterSwitch {
    pub zone: Zone,
    /// Decoration mirroring the aggregate state (the cooling master's snowflake)
    pub decor: Option<SceneNode>,
}

impl MasterSwitch {
    pub fn new(zone: Zone) -> Self {
        Self { zone, decor: None }
    }

    pub fn paint(&mut self, color: Rgb) {
        if let Some(decor) = self.decor.as_mut() {
            decor.set_color(color);
        }
    }
}
