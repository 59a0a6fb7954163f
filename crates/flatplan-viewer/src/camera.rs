//! Camera: keep the Bevy camera in step with the core camera and the window

use bevy::prelude::*;
use flatplan_core::viewport::{sync_to_display, Surface};

use crate::app::ViewerState;
use crate::convert::vec3;
use crate::input::orbit_camera;
use crate::scene::MainCamera;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BackingSize>()
            .add_systems(Update, sync_viewport)
            .add_systems(Update, apply_camera.after(sync_viewport).after(orbit_camera));
    }
}

/// Size the renderer last drew at, in physical pixels
#[derive(Resource, Default)]
pub struct BackingSize(pub glam::UVec2);

/// The primary window as a drawing surface. Bevy reconfigures the swap
/// chain itself; resizing only records the new size.
struct WindowSurface<'a> {
    window: &'a Window,
    backing: &'a mut BackingSize,
}

impl Surface for WindowSurface<'_> {
    fn display_size(&self) -> glam::UVec2 {
        glam::UVec2::new(self.window.physical_width(), self.window.physical_height())
    }

    fn backing_size(&self) -> glam::UVec2 {
        self.backing.0
    }

    fn resize_backing(&mut self, size: glam::UVec2) {
        self.backing.0 = size;
    }
}

fn sync_viewport(
    mut state: ResMut<ViewerState>,
    mut backing: ResMut<BackingSize>,
    windows: Query<&Window>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let display = glam::UVec2::new(window.physical_width(), window.physical_height());
    if display == backing.0 {
        return;
    }

    let mut surface = WindowSurface {
        window,
        backing: &mut backing,
    };
    sync_to_display(&mut surface, &mut state.viewer.camera);
}

/// Copy the core camera onto the Bevy camera whenever the viewer changes
fn apply_camera(
    state: Res<ViewerState>,
    mut camera_query: Query<(&mut Transform, &mut Projection), With<MainCamera>>,
) {
    if !state.is_changed() {
        return;
    }
    let camera = &state.viewer.camera;

    if let Ok((mut transform, mut projection)) = camera_query.single_mut() {
        let target = Transform::from_translation(vec3(camera.position))
            .looking_at(vec3(camera.target), Vec3::Y);
        if *transform != target {
            *transform = target;
        }

        if let Projection::Perspective(perspective) = &mut *projection {
            let fov = camera.fov_y_degrees.to_radians();
            if perspective.fov != fov
                || perspective.near != camera.near
                || perspective.far != camera.far
                || perspective.aspect_ratio != camera.aspect
            {
                perspective.fov = fov;
                perspective.near = camera.near;
                perspective.far = camera.far;
                perspective.aspect_ratio = camera.aspect;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_surface_records_resize() {
        let mut window = Window::default();
        window.resolution.set_physical_resolution(1600, 900);
        let mut backing = BackingSize::default();
        let mut camera = flatplan_core::PerspectiveCamera::default();

        let mut surface = WindowSurface {
            window: &window,
            backing: &mut backing,
        };
        assert!(sync_to_display(&mut surface, &mut camera));
        assert_eq!(backing.0, glam::UVec2::new(1600, 900));
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}
