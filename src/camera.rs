//! Perspective camera and the damped orbit rig that drives it.

use std::f32::consts::PI;

use glam::{Mat4, Vec2, Vec3};

use crate::input::PointerInput;

/// Perspective camera looking at `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 6.5),
            target: Vec3::ZERO,
            fov_y: 45.0,
            aspect: 16.0 / 10.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// wgpu clip space (depth 0..1)
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect.max(1e-3), self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Orbit controls in spherical coordinates around `center`.
///
/// `phi` is the polar angle from +Y, `theta` the azimuth around Y measured
/// from +Z. Rotation is damped; zoom and pan apply immediately.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    pub center: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,

    rotate_delta: Vec2,
}

impl OrbitControls {
    pub const DAMPING_FACTOR: f32 = 0.05;
    /// Stop short of looking straight up at the plane from below
    pub const MAX_POLAR_ANGLE: f32 = PI / 1.5;

    /// Rig that reproduces `camera`'s current placement.
    pub fn for_camera(camera: &Camera) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length().max(1e-4);
        let theta = offset.x.atan2(offset.z);
        let phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            enable_damping: true,
            damping_factor: Self::DAMPING_FACTOR,
            min_polar_angle: 0.0,
            max_polar_angle: Self::MAX_POLAR_ANGLE,
            min_distance: 1.0,
            max_distance: 100.0,
            center: camera.target,
            radius,
            theta,
            phi,
            rotate_delta: Vec2::ZERO,
        }
    }

    pub fn update(&mut self, camera: &mut Camera, input: &PointerInput, dt: f32) {
        let screen_height = input.screen_size.y.max(1.0);

        if input.rotating() {
            let rotate_per_pixel = 2.0 * PI / screen_height;
            self.rotate_delta -= input.cursor_delta * rotate_per_pixel * self.rotate_speed;
        }

        self.apply_rotation(dt);

        if input.scroll_delta.y != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(input.scroll_delta.y.abs());
            if input.scroll_delta.y > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
            self.radius = self.radius.clamp(self.min_distance, self.max_distance);
        }

        if input.panning() {
            let half_fov = camera.fov_y.to_radians() / 2.0;
            let world_height = 2.0 * self.radius * half_fov.tan();
            let pixels_to_world = world_height / screen_height;

            let forward = -self.direction();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();

            self.center += (right * -input.cursor_delta.x + up * input.cursor_delta.y)
                * pixels_to_world
                * self.pan_speed;
        }

        camera.target = self.center;
        camera.position = self.center + self.direction() * self.radius;
    }

    fn apply_rotation(&mut self, dt: f32) {
        if self.enable_damping {
            // frame-rate independent retention, tuned at 60 fps
            let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
            let step = self.rotate_delta * (1.0 - retention);
            self.theta += step.x;
            self.phi += step.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        const EPS: f32 = 1e-4;
        self.phi = self
            .phi
            .clamp(self.min_polar_angle.max(EPS), self.max_polar_angle.min(PI - EPS));
    }

    /// Unit vector from center to camera
    fn direction(&self) -> Vec3 {
        Vec3::new(
            self.phi.sin() * self.theta.sin(),
            self.phi.cos(),
            self.phi.sin() * self.theta.cos(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dragging(dx: f32, dy: f32) -> PointerInput {
        let mut input = PointerInput::new(800, 600);
        input.handle_mouse_input(winit::event::ElementState::Pressed, winit::event::MouseButton::Left);
        input.cursor_delta = Vec2::new(dx, dy);
        input
    }

    #[test]
    fn rig_reproduces_default_camera() {
        let mut camera = Camera::default();
        let mut orbit = OrbitControls::for_camera(&camera);
        assert!((orbit.phi - PI / 2.0).abs() < 1e-5);
        assert!(orbit.theta.abs() < 1e-5);

        orbit.update(&mut camera, &PointerInput::new(800, 600), 1.0 / 60.0);
        assert!((camera.position - Vec3::new(0.0, 0.0, 6.5)).length() < 1e-4);
    }

    #[test]
    fn polar_angle_never_passes_limit() {
        let mut camera = Camera::default();
        let mut orbit = OrbitControls::for_camera(&camera);
        // drag upwards hard: camera swings under the plane
        let input = dragging(0.0, -5000.0);
        for _ in 0..600 {
            orbit.update(&mut camera, &input, 1.0 / 60.0);
            assert!(orbit.phi <= OrbitControls::MAX_POLAR_ANGLE + 1e-6);
        }
        assert!((orbit.phi - OrbitControls::MAX_POLAR_ANGLE).abs() < 1e-4);
    }

    #[test]
    fn damping_carries_motion_after_release() {
        let mut camera = Camera::default();
        let mut orbit = OrbitControls::for_camera(&camera);
        orbit.update(&mut camera, &dragging(100.0, 0.0), 1.0 / 60.0);
        let after_drag = orbit.theta;

        let idle = PointerInput::new(800, 600);
        orbit.update(&mut camera, &idle, 1.0 / 60.0);
        let coasting = orbit.theta;
        assert!(coasting < after_drag, "rotation keeps going after release");

        for _ in 0..2000 {
            orbit.update(&mut camera, &idle, 1.0 / 60.0);
        }
        let settled = orbit.theta;
        orbit.update(&mut camera, &idle, 1.0 / 60.0);
        assert!((orbit.theta - settled).abs() < 1e-6);
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let mut camera = Camera::default();
        let mut orbit = OrbitControls::for_camera(&camera);
        let mut input = PointerInput::new(800, 600);
        input.scroll_delta = Vec2::new(0.0, 500.0);
        orbit.update(&mut camera, &input, 1.0 / 60.0);
        assert_eq!(orbit.radius, orbit.min_distance);
    }
}
