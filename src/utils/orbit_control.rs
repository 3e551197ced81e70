use glam::{Vec2, Vec3};

use crate::app::input::{InputState, MouseButton};
use crate::errors::Result;
use crate::scene::{NodeHandle, Transform, TransformGraph};

/// Orbits a graph node around a target point.
///
/// Left drag rotates, right drag pans, scroll zooms. The controller owns the
/// spherical coordinates and writes the node's `local` transform every
/// update, so the node should have an identity `global`.
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    pub center: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,

    rotate_delta: Vec2,
}

impl OrbitControls {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            min_distance: 1.0,
            max_distance: 1000.0,

            center,
            radius,
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,

            rotate_delta: Vec2::ZERO,
        }
    }

    /// Unit vector from the center towards the eye.
    fn direction(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }

    /// Eye placement for the current parameters.
    #[must_use]
    pub fn transform(&self) -> Transform {
        let mut transform = Transform::from_translation(self.center + self.direction() * self.radius);
        transform.look_at(self.center, Vec3::Y);
        transform
    }

    /// Applies this frame's input and writes the result into `node`.
    pub fn update(
        &mut self,
        graph: &mut TransformGraph,
        node: NodeHandle,
        input: &InputState,
        fov_degrees: f32,
        dt: f32,
    ) -> Result<()> {
        const EPS: f32 = 0.0001;
        let screen_height = input.screen_size.y.max(1.0);

        if input.is_button_pressed(MouseButton::Left) {
            let rotate_per_pixel = 2.0 * std::f32::consts::PI / screen_height;
            self.rotate_delta -= input.cursor_delta * rotate_per_pixel * self.rotate_speed;
        }

        if self.enable_damping {
            let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
            let applied = self.rotate_delta * (1.0 - retention);
            self.theta += applied.x;
            self.phi += applied.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }
        self.phi = self.phi.clamp(EPS, std::f32::consts::PI - EPS);

        if input.scroll_delta.y != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(input.scroll_delta.y.abs());
            if input.scroll_delta.y > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
            self.radius = self.radius.clamp(self.min_distance, self.max_distance);
        }

        if input.is_button_pressed(MouseButton::Right) {
            let half_fov = fov_degrees.to_radians() / 2.0;
            let world_per_pixel = 2.0 * self.radius * half_fov.tan() / screen_height;

            let forward = -self.direction();
            let right = forward.cross(Vec3::Y).normalize();
            let up = right.cross(forward).normalize();

            self.center += (right * -input.cursor_delta.x + up * input.cursor_delta.y) * world_per_pixel * self.pan_speed;
        }

        graph.set_local(node, self.transform().matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_zoom_respects_min_distance() {
        let mut graph = TransformGraph::new();
        let node = graph.create_node();
        let mut controls = OrbitControls::new(Vec3::ZERO, 1.5);
        let mut input = InputState::new();
        input.scroll_delta = Vec2::new(0.0, 50.0);

        controls.update(&mut graph, node, &input, 60.0, 1.0 / 60.0).unwrap();
        assert!((controls.radius - controls.min_distance).abs() < 1e-6);

        graph.traverse_all();
        let eye = graph.world_position(node);
        assert!((eye.length() - controls.min_distance).abs() < 1e-4);
    }
}
