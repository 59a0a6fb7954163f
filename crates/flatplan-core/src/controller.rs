//! Pointer gestures, hot-zone hit testing and toggle state
//!
//! The controller owns the whole [`FloorPlanLayout`] and is the only place
//! its state changes. A gesture is one press/release pair; releases that
//! follow more pointer moves than the drag tolerance were orbit drags and
//! toggle nothing. Clicks are dispatched in a fixed priority order:
//!
//! 1. lighting master switch
//! 2. individual lamps
//! 3. cooling master switch
//! 4. individual cooling units
//! 5. ceiling zones (every zone under the pointer flips)

use tracing::debug;

use crate::config::{InteractionConfig, ViewerConfig};
use crate::fixture::CoolingPalette;
use crate::geometry::Ray;
use crate::layout::FloorPlanLayout;
use crate::scene::SceneNode;
use crate::zone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Pressed,
}

/// What a pointer release did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Too many moves since the press; treated as a camera drag
    Dragged,
    AllLightsOff,
    LampToggled { index: usize, lit: bool },
    AllCoolingOff,
    CoolingToggled { slot: usize, active: bool },
    /// Ceiling zones flipped, in layout order
    CeilingToggled { indices: Vec<usize> },
    Missed,
}

impl ClickOutcome {
    /// True when the release changed any toggle state
    pub fn changed(&self) -> bool {
        !matches!(self, ClickOutcome::Dragged | ClickOutcome::Missed)
    }
}

pub struct InteractionController {
    layout: FloorPlanLayout,
    palette: CoolingPalette,
    drag_tolerance: u32,
    ceiling_on_opacity: f32,
    gesture: Gesture,
    move_count: u32,
}

impl InteractionController {
    pub fn new(layout: FloorPlanLayout, palette: CoolingPalette, interaction: &InteractionConfig) -> Self {
        Self {
            layout,
            palette,
            drag_tolerance: interaction.drag_tolerance,
            ceiling_on_opacity: interaction.ceiling_on_opacity,
            gesture: Gesture::Idle,
            move_count: 0,
        }
    }

    /// Controller over the apartment, colored per `config`
    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut layout = FloorPlanLayout::apartment();
        config.colors.apply(&mut layout);
        Self::new(layout, config.colors.palette(), &config.interaction)
    }

    pub fn layout(&self) -> &FloorPlanLayout {
        &self.layout
    }

    pub fn palette(&self) -> &CoolingPalette {
        &self.palette
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_pressed(&self) -> bool {
        self.gesture == Gesture::Pressed
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn pointer_down(&mut self) {
        self.gesture = Gesture::Pressed;
        self.move_count = 0;
    }

    /// Count a drag step while pressed, otherwise update lamp hover outlines.
    /// Returns true if any outline changed visibility.
    pub fn pointer_move(&mut self, ray: &Ray) -> bool {
        if self.is_pressed() {
            self.move_count = self.move_count.saturating_add(1);
            return false;
        }

        let mut changed = false;
        for lamp in &mut self.layout.lamps {
            let hovered = lamp.zone.is_hit(ray);
            if lamp.outline.visible != hovered {
                lamp.outline.visible = hovered;
                changed = true;
            }
        }
        changed
    }

    /// End the gesture. Clicks go through hit-test dispatch; drags are
    /// dropped.
    pub fn pointer_up(&mut self, ray: &Ray) -> ClickOutcome {
        self.gesture = Gesture::Idle;
        if self.move_count > self.drag_tolerance {
            debug!(moves = self.move_count, "Gesture was a drag");
            return ClickOutcome::Dragged;
        }

        let outcome = self.click(ray);
        debug!(?outcome, "Click dispatched");
        outcome
    }

    /// Hit-test dispatch for a click along `ray`
    pub fn click(&mut self, ray: &Ray) -> ClickOutcome {
        if self.layout.lighting_master.zone.is_hit(ray) {
            for ceiling in &mut self.layout.ceilings {
                ceiling.opacity = 0.0;
            }
            for lamp in &mut self.layout.lamps {
                lamp.effect.set_lit(false);
            }
            return ClickOutcome::AllLightsOff;
        }

        if let Some(index) = self.layout.lamps.iter().position(|l| l.zone.is_hit(ray)) {
            let lit = self.layout.lamps[index].effect.toggle();
            return ClickOutcome::LampToggled { index, lit };
        }

        if self.layout.cooling_master.zone.is_hit(ray) {
            for unit in &mut self.layout.cooling_units {
                unit.set_active(false, &self.palette);
            }
            self.repaint_cooling_master();
            return ClickOutcome::AllCoolingOff;
        }

        if let Some(slot) = self.layout.cooling_units.iter().position(|u| u.zone.is_hit(ray)) {
            let unit = &mut self.layout.cooling_units[slot];
            let active = !unit.active;
            unit.set_active(active, &self.palette);
            self.repaint_cooling_master();
            return ClickOutcome::CoolingToggled { slot, active };
        }

        let mut indices: Vec<usize> = zone::cast(ray, &self.layout.ceilings)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            return ClickOutcome::Missed;
        }
        indices.sort_unstable();
        for &i in &indices {
            let ceiling = &mut self.layout.ceilings[i];
            ceiling.opacity = if ceiling.opacity == 0.0 {
                self.ceiling_on_opacity
            } else {
                0.0
            };
        }
        ClickOutcome::CeilingToggled { indices }
    }

    pub fn lamp_lit(&self, index: usize) -> bool {
        self.layout.lamps.get(index).is_some_and(|l| l.effect.is_lit())
    }

    pub fn ceiling_opacity(&self, index: usize) -> f32 {
        self.layout.ceilings.get(index).map_or(0.0, |z| z.opacity)
    }

    pub fn outline_visible(&self, index: usize) -> bool {
        self.layout.lamps.get(index).is_some_and(|l| l.outline.visible)
    }

    pub fn cooling_active(&self, slot: usize) -> bool {
        self.layout.cooling_units.get(slot).is_some_and(|u| u.active)
    }

    /// Any ceiling lit or any lamp on
    pub fn lighting_master_active(&self) -> bool {
        self.layout.ceilings.iter().any(|z| z.opacity != 0.0)
            || self.layout.lamps.iter().any(|l| l.effect.is_lit())
    }

    /// Any cooling unit running
    pub fn cooling_master_active(&self) -> bool {
        self.layout.cooling_units.iter().any(|u| u.active)
    }

    /// Number of decoration slots: one per cooling unit plus the master
    pub fn decoration_slots(&self) -> usize {
        self.layout.cooling_units.len() + 1
    }

    /// Decoration in `slot`, if it has arrived
    pub fn decoration(&self, slot: usize) -> Option<&SceneNode> {
        let units = self.layout.cooling_units.len();
        if slot < units {
            self.layout.cooling_units[slot].decor.as_ref()
        } else if slot == units {
            self.layout.cooling_master.decor.as_ref()
        } else {
            None
        }
    }

    /// Install a loaded snowflake. Slots below the unit count belong to the
    /// units; the last slot is the cooling master's.
    ///
    /// A unit receiving its decoration starts over inactive and neutral.
    /// Returns false for an unknown slot.
    pub fn attach_decoration(&mut self, slot: usize, decor: SceneNode) -> bool {
        let units = self.layout.cooling_units.len();
        if slot < units {
            let unit = &mut self.layout.cooling_units[slot];
            unit.decor = Some(decor);
            unit.set_active(false, &self.palette);
        } else if slot == units {
            self.layout.cooling_master.decor = Some(decor);
        } else {
            return false;
        }
        self.repaint_cooling_master();
        true
    }

    fn repaint_cooling_master(&mut self) {
        let color = self.palette.color_for(self.cooling_master_active());
        self.layout.cooling_master.paint(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{ndc_to_pointer, PerspectiveCamera};
    use crate::geometry::Aabb;
    use crate::scene::{MeshNode, Rgb};
    use glam::{Vec2, Vec3};

    fn controller() -> InteractionController {
        InteractionController::from_config(&ViewerConfig::default())
    }

    /// Straight-down ray through the center of a zone
    fn down_at(point: Vec3) -> Ray {
        Ray::new(Vec3::new(point.x, 2000.0, point.z), Vec3::NEG_Y)
    }

    fn click(ctl: &mut InteractionController, ray: &Ray) -> ClickOutcome {
        ctl.pointer_down();
        ctl.pointer_up(ray)
    }

    fn snowflake() -> SceneNode {
        SceneNode::group(
            "snowflake",
            vec![SceneNode::Mesh(MeshNode::new("flake", Aabb::new(Vec3::splat(-1.0), Vec3::ONE)))],
        )
    }

    fn lamp_ray(ctl: &InteractionController, i: usize) -> Ray {
        down_at(ctl.layout().lamps[i].zone.center())
    }

    fn ceiling_ray(ctl: &InteractionController, name: &str) -> Ray {
        let zone = ctl.layout().ceilings.iter().find(|z| z.name == name).unwrap();
        down_at(zone.center())
    }

    #[test]
    fn test_lamp_parity() {
        let mut ctl = controller();
        let ray = lamp_ray(&ctl, 3);
        for n in 1..=5 {
            let outcome = click(&mut ctl, &ray);
            assert_eq!(outcome, ClickOutcome::LampToggled { index: 3, lit: n % 2 == 1 });
            assert_eq!(ctl.lamp_lit(3), n % 2 == 1);
            assert_eq!(ctl.lighting_master_active(), n % 2 == 1);
        }
    }

    #[test]
    fn test_drag_toggles_nothing() {
        let mut ctl = controller();
        let ray = lamp_ray(&ctl, 0);

        ctl.pointer_down();
        ctl.pointer_move(&ray);
        assert_eq!(ctl.move_count(), 1);
        // One move is within tolerance
        assert!(ctl.pointer_up(&ray).changed());
        assert!(ctl.lamp_lit(0));

        ctl.pointer_down();
        assert_eq!(ctl.move_count(), 0);
        ctl.pointer_move(&ray);
        ctl.pointer_move(&ray);
        assert!(ctl.is_pressed());
        assert_eq!(ctl.pointer_up(&ray), ClickOutcome::Dragged);
        assert!(!ctl.is_pressed());
        assert!(ctl.lamp_lit(0));
    }

    #[test]
    fn test_release_without_press_is_click() {
        let mut ctl = controller();
        let ray = lamp_ray(&ctl, 1);
        assert_eq!(ctl.pointer_up(&ray), ClickOutcome::LampToggled { index: 1, lit: true });
    }

    #[test]
    fn test_hover_only_when_idle() {
        let mut ctl = controller();
        let ray = lamp_ray(&ctl, 2);

        assert!(ctl.pointer_move(&ray));
        assert!(ctl.outline_visible(2));
        assert!((0..7).filter(|&i| i != 2).all(|i| !ctl.outline_visible(i)));
        assert!(!ctl.pointer_move(&ray));

        // Moving away hides the outline
        let away = down_at(Vec3::new(5000.0, 0.0, 5000.0));
        assert!(ctl.pointer_move(&away));
        assert!(!ctl.outline_visible(2));

        // Moves while pressed never touch outlines
        ctl.pointer_down();
        assert!(!ctl.pointer_move(&ray));
        assert!(!ctl.outline_visible(2));
    }

    #[test]
    fn test_lighting_master_clears_everything() {
        let mut ctl = controller();
        for ray in [lamp_ray(&ctl, 0), lamp_ray(&ctl, 5), ceiling_ray(&ctl, "kitchen")] {
            click(&mut ctl, &ray);
        }
        assert!(ctl.lighting_master_active());

        let master = down_at(ctl.layout().lighting_master.zone.center());
        assert_eq!(click(&mut ctl, &master), ClickOutcome::AllLightsOff);
        assert!((0..7).all(|i| !ctl.lamp_lit(i) && ctl.ceiling_opacity(i) == 0.0));
        assert!(!ctl.lighting_master_active());

        // Clicking it again with nothing on is still a clear
        assert_eq!(click(&mut ctl, &master), ClickOutcome::AllLightsOff);
    }

    #[test]
    fn test_ceiling_toggle() {
        let mut ctl = controller();
        let ray = ceiling_ray(&ctl, "toilet");

        let outcome = click(&mut ctl, &ray);
        assert_eq!(outcome, ClickOutcome::CeilingToggled { indices: vec![2] });
        assert_eq!(ctl.ceiling_opacity(2), 0.25);
        assert!(ctl.lighting_master_active());

        click(&mut ctl, &ray);
        assert_eq!(ctl.ceiling_opacity(2), 0.0);
        assert!(!ctl.lighting_master_active());
    }

    #[test]
    fn test_stacked_ceilings_flip_together() {
        let mut layout = FloorPlanLayout::apartment();
        let mut annex = layout.ceilings[0].clone();
        annex.name = "kitchen-annex".to_string();
        annex.position.y += 10.0;
        layout.ceilings.push(annex);
        let mut ctl = InteractionController::new(layout, CoolingPalette::default(), &InteractionConfig::default());

        let ray = ceiling_ray(&ctl, "kitchen");
        assert_eq!(click(&mut ctl, &ray), ClickOutcome::CeilingToggled { indices: vec![0, 7] });
        assert_eq!(ctl.ceiling_opacity(7), 0.25);
    }

    #[test]
    fn test_miss() {
        let mut ctl = controller();
        let ray = down_at(Vec3::new(5000.0, 0.0, 5000.0));
        assert_eq!(click(&mut ctl, &ray), ClickOutcome::Missed);
        assert!(!ctl.lighting_master_active());
        assert!(!ctl.cooling_master_active());
    }

    #[test]
    fn test_lamp_beats_ceiling() {
        let mut ctl = controller();
        // Kitchen wall lamp sits inside the kitchen ceiling footprint
        let ray = lamp_ray(&ctl, 5);
        assert!(ctl.layout().ceilings[0].is_hit(&ray));
        assert_eq!(click(&mut ctl, &ray), ClickOutcome::LampToggled { index: 5, lit: true });
        assert_eq!(ctl.ceiling_opacity(0), 0.0);
    }

    #[test]
    fn test_priority_order() {
        // Stack one zone of every kind at the same spot, then peel them off
        let spot = Vec3::new(2000.0, 260.0, 2000.0);
        let away = Vec3::new(-5000.0, 260.0, -5000.0);
        let mut layout = FloorPlanLayout::apartment();
        layout.lighting_master.zone.position = spot;
        layout.lamps[4].zone.position = spot;
        layout.cooling_master.zone.position = spot;
        layout.cooling_units[1].zone.position = spot;
        layout.ceilings[3].position = spot;
        let mut ctl = InteractionController::new(layout.clone(), CoolingPalette::default(), &InteractionConfig::default());
        let ray = down_at(spot);

        assert_eq!(click(&mut ctl, &ray), ClickOutcome::AllLightsOff);

        layout.lighting_master.zone.position = away;
        let mut ctl = InteractionController::new(layout.clone(), CoolingPalette::default(), &InteractionConfig::default());
        assert_eq!(click(&mut ctl, &ray), ClickOutcome::LampToggled { index: 4, lit: true });

        layout.lamps[4].zone.position = away;
        let mut ctl = InteractionController::new(layout.clone(), CoolingPalette::default(), &InteractionConfig::default());
        assert_eq!(click(&mut ctl, &ray), ClickOutcome::AllCoolingOff);

        layout.cooling_master.zone.position = away;
        let mut ctl = InteractionController::new(layout.clone(), CoolingPalette::default(), &InteractionConfig::default());
        assert_eq!(click(&mut ctl, &ray), ClickOutcome::CoolingToggled { slot: 1, active: true });

        layout.cooling_units[1].zone.position = away;
        let mut ctl = InteractionController::new(layout, CoolingPalette::default(), &InteractionConfig::default());
        assert_eq!(click(&mut ctl, &ray), ClickOutcome::CeilingToggled { indices: vec![3] });
    }

    #[test]
    fn test_cooling_scenario() {
        let mut ctl = controller();
        for slot in 0..ctl.decoration_slots() {
            assert!(ctl.attach_decoration(slot, snowflake()));
        }
        let neutral = Rgb(0xf0f0f0);
        let active = Rgb(0x5050ff);

        let unit = down_at(ctl.layout().cooling_units[0].zone.center());
        assert_eq!(click(&mut ctl, &unit), ClickOutcome::CoolingToggled { slot: 0, active: true });
        assert!(ctl.cooling_active(0));
        assert!(ctl.cooling_master_active());
        let decor = ctl.layout().cooling_units[0].decor.as_ref().unwrap();
        assert_eq!(decor.mesh_colors(), vec![active]);
        let master_decor = ctl.layout().cooling_master.decor.as_ref().unwrap();
        assert_eq!(master_decor.mesh_colors(), vec![active]);

        let third = down_at(ctl.layout().cooling_units[2].zone.center());
        click(&mut ctl, &third);
        let master = down_at(ctl.layout().cooling_master.zone.center());
        assert_eq!(click(&mut ctl, &master), ClickOutcome::AllCoolingOff);
        assert!((0..3).all(|s| !ctl.cooling_active(s)));
        assert!(!ctl.cooling_master_active());
        for unit in &ctl.layout().cooling_units {
            assert_eq!(unit.decor.as_ref().unwrap().mesh_colors(), vec![neutral]);
        }
        let master_decor = ctl.decoration(3).unwrap();
        assert_eq!(master_decor.mesh_colors(), vec![neutral]);
        assert!(ctl.decoration(4).is_none());
    }

    #[test]
    fn test_cooling_toggles_before_decor_arrives() {
        let mut ctl = controller();
        let unit = down_at(ctl.layout().cooling_units[1].zone.center());
        click(&mut ctl, &unit);
        assert!(ctl.cooling_active(1));
        assert!(ctl.cooling_master_active());

        // Late arrival resets the unit
        assert!(ctl.attach_decoration(1, snowflake()));
        assert!(!ctl.cooling_active(1));
        assert!(!ctl.cooling_master_active());
        assert!(!ctl.attach_decoration(9, snowflake()));
    }

    #[test]
    fn test_cooling_master_is_or_of_units() {
        let mut ctl = controller();
        let rays: Vec<Ray> = ctl
            .layout()
            .cooling_units
            .iter()
            .map(|u| down_at(u.zone.center()))
            .collect();
        for ray in rays.iter().chain(rays.iter().rev()).chain(rays.iter().take(2)) {
            click(&mut ctl, ray);
            let any = (0..3).any(|s| ctl.cooling_active(s));
            assert_eq!(ctl.cooling_master_active(), any);
        }
    }

    #[test]
    fn test_lamp_click_through_camera() {
        let mut ctl = controller();
        let mut camera = PerspectiveCamera::default();
        camera.position = Vec3::new(150.0, 1200.0, 200.0);
        camera.look_at(Vec3::new(150.0, 0.0, 100.0));

        let surface = Vec2::new(1200.0, 600.0);
        let lamp = ctl.layout().lamps[1].zone.center();
        let pointer = ndc_to_pointer(camera.project(lamp).truncate(), surface);
        let ray = camera.ray_from_pointer(pointer, surface);

        assert_eq!(click(&mut ctl, &ray), ClickOutcome::LampToggled { index: 1, lit: true });
        assert!(ctl.lighting_master_active());
        assert_eq!(click(&mut ctl, &ray), ClickOutcome::LampToggled { index: 1, lit: false });
        assert!(!ctl.lighting_master_active());
    }

    #[test]
    fn test_custom_tolerance_and_opacity() {
        let config = ViewerConfig::from_toml(
            "[interaction]\ndrag_tolerance = 3\nceiling_on_opacity = 0.5\n",
        )
        .unwrap();
        let mut ctl = InteractionController::from_config(&config);
        let ray = ceiling_ray(&ctl, "bathroom");

        ctl.pointer_down();
        for _ in 0..3 {
            ctl.pointer_move(&ray);
        }
        assert!(ctl.pointer_up(&ray).changed());
        assert_eq!(ctl.ceiling_opacity(3), 0.5);
    }
}
