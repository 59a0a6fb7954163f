//! Pointer input: hot-zone gestures and orbit navigation
//!
//! The left button does double duty, as in most model viewers: a press and
//! release with (almost) no movement is a click on a hot zone, a press and
//! drag orbits the camera. The controller tells the two apart.

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::app::ViewerState;
use crate::convert::core_vec2;

/// Pixel-unit scroll deltas per notch
const PIXELS_PER_LINE: f32 = 100.0;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>()
            .add_systems(Update, (handle_pointer, orbit_camera).chain());
    }
}

/// Last known cursor position, in logical pixels
#[derive(Resource, Default)]
pub struct PointerState {
    last_cursor: Option<Vec2>,
}

fn handle_pointer(
    mut state: ResMut<ViewerState>,
    mut pointer: ResMut<PointerState>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let surface = glam::Vec2::new(window.width(), window.height());
    let cursor = window.cursor_position();

    if mouse_button.just_pressed(MouseButton::Left) {
        state.viewer.pointer_down();
    }

    if let Some(position) = cursor {
        if pointer.last_cursor != Some(position) {
            pointer.last_cursor = Some(position);
            state.viewer.pointer_move(core_vec2(position), surface);
        }
    }

    if mouse_button.just_released(MouseButton::Left) {
        // Releases outside the window still end the gesture
        let Some(position) = cursor.or(pointer.last_cursor) else {
            return;
        };
        let outcome = state.viewer.pointer_up(core_vec2(position), surface);
        if outcome.changed() {
            tracing::info!(?outcome, "Toggled");
        }
    }
}

pub(crate) fn orbit_camera(
    mut state: ResMut<ViewerState>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    windows: Query<&Window>,
) {
    let Ok(window) = windows.single() else {
        mouse_motion.clear();
        mouse_wheel.clear();
        return;
    };

    let motion: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let steps: f32 = mouse_wheel
        .read()
        .map(|wheel| match wheel.unit {
            MouseScrollUnit::Line => wheel.y,
            MouseScrollUnit::Pixel => wheel.y / PIXELS_PER_LINE,
        })
        .sum();

    let dragging = mouse_button.pressed(MouseButton::Left) && motion != Vec2::ZERO;
    if !dragging && steps == 0.0 {
        return;
    }

    let viewer = &mut state.viewer;
    if dragging {
        viewer.controls.rotate(core_vec2(motion), window.height());
    }
    if steps != 0.0 {
        viewer.controls.zoom(steps);
    }
    viewer.controls.update(&mut viewer.camera);
}
