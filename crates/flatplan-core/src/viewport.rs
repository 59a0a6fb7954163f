//! Keeping the drawing surface and the camera projection in step with the
//! displayed size

use glam::UVec2;
use tracing::debug;

use crate::camera::PerspectiveCamera;

/// A drawable surface whose backing store can lag behind its on-screen size
pub trait Surface {
    /// Size the surface is displayed at, in physical pixels
    fn display_size(&self) -> UVec2;
    /// Size of the backing store currently rendered into
    fn backing_size(&self) -> UVec2;
    fn resize_backing(&mut self, size: UVec2);
}

/// Resize the backing store to the displayed size if they differ and update
/// the camera aspect to match. Returns true if a resize happened.
pub fn sync_to_display(surface: &mut impl Surface, camera: &mut PerspectiveCamera) -> bool {
    let size = surface.display_size();
    if size == surface.backing_size() {
        return false;
    }

    surface.resize_backing(size);
    if size.x > 0 && size.y > 0 {
        camera.aspect = size.x as f32 / size.y as f32;
    }
    debug!(width = size.x, height = size.y, "Viewport resized");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canvas {
        client: UVec2,
        backing: UVec2,
        resizes: usize,
    }

    impl Surface for Canvas {
        fn display_size(&self) -> UVec2 {
            self.client
        }

        fn backing_size(&self) -> UVec2 {
            self.backing
        }

        fn resize_backing(&mut self, size: UVec2) {
            self.backing = size;
            self.resizes += 1;
        }
    }

    #[test]
    fn test_resize_only_when_sizes_differ() {
        let mut canvas = Canvas {
            client: UVec2::new(1280, 720),
            backing: UVec2::new(300, 150),
            resizes: 0,
        };
        let mut camera = PerspectiveCamera::default();

        assert!(sync_to_display(&mut canvas, &mut camera));
        assert_eq!(canvas.backing, UVec2::new(1280, 720));
        assert!((camera.aspect - 1280.0 / 720.0).abs() < 1e-6);

        assert!(!sync_to_display(&mut canvas, &mut camera));
        assert_eq!(canvas.resizes, 1);

        canvas.client = UVec2::new(600, 600);
        assert!(sync_to_display(&mut canvas, &mut camera));
        assert_eq!(camera.aspect, 1.0);
    }

    #[test]
    fn test_collapsed_surface_keeps_aspect() {
        let mut canvas = Canvas {
            client: UVec2::new(0, 0),
            backing: UVec2::new(300, 150),
            resizes: 0,
        };
        let mut camera = PerspectiveCamera::default();
        assert!(sync_to_display(&mut canvas, &mut camera));
        assert_eq!(camera.aspect, 2.0);
    }
}
