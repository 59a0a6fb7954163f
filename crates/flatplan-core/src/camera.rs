//! Perspective camera, orbit navigation and auto-framing of the loaded plan

use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use crate::geometry::{Aabb, Ray};

/// Padding around the model when framing it
pub const FRAME_MARGIN: f32 = 1.1;

/// Applied to the center-to-camera direction before framing. Flipping and
/// stretching Y swings a camera that starts below the model's mid-height up
/// into a steep top-down view.
pub const VERTICAL_EXAGGERATION: Vec3 = Vec3::new(1.0, -5.0, 1.0);

/// Polar angles closer than this to the poles make `look_at` degenerate
const POLE_EPSILON: f32 = 1e-4;

/// Per-step zoom factor for one scroll notch
const ZOOM_BASE: f32 = 0.95;

/// Pointer position in surface pixels (origin top-left) to normalized device
/// coordinates (origin center, +Y up)
pub fn pointer_to_ndc(pointer: Vec2, surface_size: Vec2) -> Vec2 {
    Vec2::new(
        pointer.x / surface_size.x * 2.0 - 1.0,
        -(pointer.y / surface_size.y) * 2.0 + 1.0,
    )
}

/// Inverse of [`pointer_to_ndc`]
pub fn ndc_to_pointer(ndc: Vec2, surface_size: Vec2) -> Vec2 {
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * surface_size.x,
        (1.0 - ndc.y) * 0.5 * surface_size.y,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            aspect: 2.0,
            near: 0.01,
            far: 7500.0,
            position: Vec3::new(0.0, 100.0, 200.0),
            target: Vec3::new(0.0, 5.0, 0.0),
        }
    }
}

impl PerspectiveCamera {
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World point to normalized device coordinates
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.view_projection().project_point3(world)
    }

    /// Ray from the camera through a point given in normalized device
    /// coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        // Built in view space; unprojecting through a tiny near plane loses
        // too much precision at floor-plan scale
        let half_height = (self.fov_y_degrees * 0.5).to_radians().tan();
        let view_dir = Vec3::new(ndc.x * half_height * self.aspect, ndc.y * half_height, -1.0);
        let direction = self.view_matrix().inverse().transform_vector3(view_dir);
        Ray::new(self.position, direction)
    }

    /// Ray under a pointer position on a surface of `surface_size` pixels
    pub fn ray_from_pointer(&self, pointer: Vec2, surface_size: Vec2) -> Ray {
        self.ray_from_ndc(pointer_to_ndc(pointer, surface_size))
    }
}

/// Camera placement derived from a model's bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub center: Vec3,
    /// Length of the bounds diagonal
    pub size: f32,
    /// Distance from `center` at which `size * FRAME_MARGIN` fills the view
    pub distance: f32,
    pub position: Vec3,
}

impl CameraFrame {
    /// Frame `bounds` for `camera`, keeping the camera on its current side of
    /// the model. `None` for empty bounds.
    pub fn from_bounds(bounds: &Aabb, camera: &PerspectiveCamera) -> Option<Self> {
        if bounds.is_empty() {
            return None;
        }
        let size = bounds.diagonal();
        let center = bounds.center();

        let half_fov = (camera.fov_y_degrees * 0.5).to_radians();
        let distance = size * FRAME_MARGIN * 0.5 / half_fov.tan();

        let direction = ((camera.position - center) * VERTICAL_EXAGGERATION)
            .try_normalize()
            .unwrap_or(Vec3::Y);

        Some(Self {
            center,
            size,
            distance,
            position: center + direction * distance,
        })
    }

    /// Move the camera into place and fit its depth range to the model
    pub fn apply(&self, camera: &mut PerspectiveCamera) {
        camera.position = self.position;
        camera.near = self.size / 100.0;
        camera.far = self.size * 100.0;
        camera.look_at(self.center);
    }
}

/// Orbit navigation around a target point, mirroring the usual
/// drag-to-rotate, scroll-to-zoom controls.
///
/// Input accumulates between frames; [`OrbitControls::update`] applies it to
/// the camera and clamps to the configured limits.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Angle from +Y; 0 looks straight down
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::new(0.0, 5.0, 0.0),
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_scale: 1.0,
        }
    }
}

impl OrbitControls {
    /// Controls orbiting `target` with no distance limits
    pub fn new(target: Vec3, rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            target,
            rotate_speed,
            zoom_speed,
            ..Self::default()
        }
    }

    /// Queue a drag of `delta` pixels on a surface `viewport_height` pixels tall
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.pending_azimuth -= TAU * delta.x / viewport_height * self.rotate_speed;
        self.pending_polar -= TAU * delta.y / viewport_height * self.rotate_speed;
    }

    /// Queue a zoom of `steps` scroll notches; positive moves closer
    pub fn zoom(&mut self, steps: f32) {
        self.pending_scale *= ZOOM_BASE.powf(steps * self.zoom_speed);
    }

    /// Scale the limits to a freshly framed model and orbit around its center
    pub fn fit(&mut self, frame: &CameraFrame) {
        self.target = frame.center;
        self.max_distance = frame.size * 10.0;
        self.max_polar_angle = PI / 2.0;
    }

    /// Apply queued input to `camera`. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let radius = offset.length();

        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        azimuth += self.pending_azimuth;
        polar += self.pending_polar;
        let min_polar = self.min_polar_angle.max(POLE_EPSILON);
        let max_polar = self.max_polar_angle.min(PI - POLE_EPSILON).max(min_polar);
        polar = polar.clamp(min_polar, max_polar);

        let radius = (radius * self.pending_scale).clamp(self.min_distance, self.max_distance);

        let new_position = self.target
            + Vec3::new(
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
                radius * polar.sin() * azimuth.cos(),
            );

        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;
        self.pending_scale = 1.0;

        let moved = new_position.distance_squared(camera.position) > 1e-6 || camera.target != self.target;
        camera.position = new_position;
        camera.look_at(self.target);
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-2
    }

    #[test]
    fn test_pointer_ndc_round_trip_corners() {
        let size = Vec2::new(800.0, 400.0);
        assert_eq!(pointer_to_ndc(Vec2::ZERO, size), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_to_ndc(size, size), Vec2::new(1.0, -1.0));
        assert_eq!(pointer_to_ndc(size * 0.5, size), Vec2::ZERO);
        assert_eq!(ndc_to_pointer(Vec2::new(1.0, -1.0), size), size);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = PerspectiveCamera::default();
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        let expected = (camera.target - camera.position).normalize();
        assert!(approx(ray.direction, expected));
        assert_eq!(ray.origin, camera.position);
    }

    #[test]
    fn test_project_then_ray_passes_through_point() {
        let camera = PerspectiveCamera::default();
        let point = Vec3::new(30.0, 0.0, -20.0);
        let ndc = camera.project(point).truncate();
        let ray = camera.ray_from_ndc(ndc);
        let t = (point - ray.origin).dot(ray.direction);
        assert!(approx(ray.at(t), point));
    }

    #[test]
    fn test_frame_distance_from_fov() {
        let camera = PerspectiveCamera::default();
        let bounds = Aabb::new(Vec3::new(-300.0, 0.0, -250.0), Vec3::new(500.0, 270.0, 600.0));
        let frame = CameraFrame::from_bounds(&bounds, &camera).unwrap();

        let size = bounds.diagonal();
        let expected = size * 1.1 * 0.5 / (22.5f32).to_radians().tan();
        assert!((frame.distance - expected).abs() < 1e-2);
        assert!((frame.position.distance(frame.center) - expected).abs() < 1e-2);

        // Camera starts below the box center, so the exaggerated direction points up
        assert!(frame.position.y > frame.center.y);

        let mut camera = camera;
        frame.apply(&mut camera);
        assert_eq!(camera.target, bounds.center());
        assert!((camera.near - size / 100.0).abs() < 1e-4);
        assert!((camera.far - size * 100.0).abs() < 1e-1);
    }

    #[test]
    fn test_frame_empty_bounds() {
        assert!(CameraFrame::from_bounds(&Aabb::EMPTY, &PerspectiveCamera::default()).is_none());
    }

    #[test]
    fn test_orbit_fit_and_clamp() {
        let camera = PerspectiveCamera::default();
        let bounds = Aabb::new(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0));
        let frame = CameraFrame::from_bounds(&bounds, &camera).unwrap();

        let mut controls = OrbitControls::default();
        controls.fit(&frame);
        assert_eq!(controls.target, frame.center);
        assert_eq!(controls.max_distance, 1000.0);
        assert_eq!(controls.min_distance, 0.0);

        let mut camera = camera;
        frame.apply(&mut camera);

        // Zooming far out stops at the max distance
        controls.zoom(-500.0);
        controls.update(&mut camera);
        assert!((camera.position.distance(controls.target) - 1000.0).abs() < 1e-1);

        // Dragging far down never takes the camera under the horizon
        controls.rotate(Vec2::new(0.0, -10_000.0), 600.0);
        controls.update(&mut camera);
        assert!(camera.position.y >= controls.target.y - 1e-2);
    }

    #[test]
    fn test_orbit_rotate_preserves_distance() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::default();
        let before = camera.position.distance(controls.target);

        controls.rotate(Vec2::new(120.0, 0.0), 600.0);
        assert!(controls.update(&mut camera));
        assert!((camera.position.distance(controls.target) - before).abs() < 1e-2);

        // Nothing queued
        assert!(!controls.update(&mut camera));
    }
}
