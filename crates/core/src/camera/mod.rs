use glam::{Mat4, Vec3};

/// Perspective camera shared by every scene. Scenes reposition and reconfigure
/// it; they never own it.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recomputes the cached projection after `fov`, `aspect` or the planes
    /// changed.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// View matrix looking from `position` toward the origin.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    /// Adapts the camera to a new viewport size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
        self.update_projection_matrix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_follows_fov() {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 1.0, 1000.0);
        let wide = camera.projection_matrix();

        camera.fov = 20.0;
        assert_eq!(camera.projection_matrix(), wide);
        camera.update_projection_matrix();

        // Narrower field of view scales clip-space y up.
        assert!(camera.projection_matrix().y_axis.y > wide.y_axis.y);
    }

    #[test]
    fn viewport_updates_aspect() {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 1.0, 1000.0);
        camera.set_viewport(1920, 1080);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);

        camera.set_viewport(640, 0);
        assert_eq!(camera.aspect, 640.0);
    }
}
