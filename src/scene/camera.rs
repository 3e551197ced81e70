use glam::{Affine3A, Mat4};

use crate::backend::ClientArea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

/// Projection parameters of the scene camera.
///
/// The camera holds no placement of its own: its view comes from the world
/// transform of the graph node it is attached to (see
/// [`Scene::set_camera_node`](crate::scene::Scene::set_camera_node)).
#[derive(Debug, Clone)]
pub struct Camera {
    pub projection_type: ProjectionType,
    /// Vertical field of view, radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Half height of the orthographic volume.
    pub ortho_size: f32,

    projection_matrix: Mat4,
}

impl Camera {
    /// `fov` in degrees.
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            projection_type: ProjectionType::Perspective,
            fov: fov.to_radians(),
            aspect,
            near,
            far,
            ortho_size: 10.0,
            projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    #[must_use]
    pub fn new_orthographic(ortho_size: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            projection_type: ProjectionType::Orthographic,
            fov: 60.0_f32.to_radians(),
            aspect,
            near,
            far,
            ortho_size,
            projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    /// Call after editing any public projection field.
    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection_type {
            ProjectionType::Perspective => Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far),
            ProjectionType::Orthographic => {
                let h = self.ortho_size;
                let w = h * self.aspect;
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        };
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    /// Matches the aspect ratio to a drawing surface. Zero-height areas
    /// (minimized windows) are ignored.
    pub fn fit_client_area(&mut self, area: &impl ClientArea) {
        let (width, height) = area.client_size();
        if height == 0 {
            return;
        }
        self.set_aspect(width as f32 / height as f32);
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// The view is the inverse of the camera node's world transform.
    #[must_use]
    pub fn view_matrix(&self, world: &Affine3A) -> Mat4 {
        Mat4::from(world.inverse())
    }

    #[must_use]
    pub fn view_projection(&self, world: &Affine3A) -> Mat4 {
        self.projection_matrix * self.view_matrix(world)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_perspective(60.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}
