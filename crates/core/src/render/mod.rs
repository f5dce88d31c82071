use glam::Mat4;

use crate::{camera::PerspectiveCamera, scene::Scene, Result, VizError};

/// Post-processing pass appended after the main render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectPass {
    pub name: String,
    pub enabled: bool,
}

impl EffectPass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
        }
    }
}

/// Summary of one composited frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub scene: String,
    pub passes: usize,
    pub visible_meshes: usize,
    pub uploaded_vertices: usize,
    pub view_projection: Mat4,
}

/// Render surface plus the pass chain that composites each frame. The main
/// pass is bound to exactly one scene at a time.
#[derive(Debug)]
pub struct Compositor {
    width: u32,
    height: u32,
    pixel_ratio: f32,
    tone_mapping_exposure: f32,
    main_scene: Option<String>,
    effects: Vec<EffectPass>,
    frames: u64,
}

impl Compositor {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
            tone_mapping_exposure: 1.0,
            main_scene: None,
            effects: Vec::new(),
            frames: 0,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size of the drawable target in physical pixels.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.pixel_ratio).round() as u32,
            (self.height as f32 * self.pixel_ratio).round() as u32,
        )
    }

    pub fn tone_mapping_exposure(&self) -> f32 {
        self.tone_mapping_exposure
    }

    pub fn set_tone_mapping_exposure(&mut self, exposure: f32) {
        self.tone_mapping_exposure = exposure;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Binds the main render pass to a scene.
    pub fn attach(&mut self, scene: &str) {
        self.main_scene = Some(scene.to_string());
    }

    pub fn main_scene(&self) -> Option<&str> {
        self.main_scene.as_deref()
    }

    pub fn add_effect(&mut self, effect: EffectPass) {
        self.effects.push(effect);
    }

    pub fn effects(&self) -> &[EffectPass] {
        &self.effects
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Composites one frame of `scene` seen through `camera`, uploading any
    /// geometry flagged dirty since the previous frame.
    ///
    /// A zero-area surface (e.g. a minimised window) draws nothing: no pass
    /// runs and dirty geometry stays flagged for the next drawable frame.
    pub fn render(&mut self, scene: &mut dyn Scene, camera: &PerspectiveCamera) -> Result<FrameStats> {
        if self.main_scene.as_deref() != Some(scene.name()) {
            return Err(VizError::msg(format!(
                "render pass is not bound to scene `{}`",
                scene.name()
            )));
        }

        self.frames += 1;
        let view_projection = camera.projection_matrix() * camera.view_matrix();
        if self.width == 0 || self.height == 0 {
            tracing::trace!(frame = self.frames, "render surface has zero area, skipping");
            return Ok(FrameStats {
                frame: self.frames,
                scene: scene.name().to_string(),
                passes: 0,
                visible_meshes: 0,
                uploaded_vertices: 0,
                view_projection,
            });
        }

        let mut visible_meshes = 0;
        let mut uploaded_vertices = 0;
        for mesh in scene.graph_mut().meshes_mut() {
            if mesh.geometry.take_needs_update() {
                uploaded_vertices += mesh.geometry.vertex_count();
            }
            if mesh.visible {
                visible_meshes += 1;
            }
        }

        Ok(FrameStats {
            frame: self.frames,
            scene: scene.name().to_string(),
            passes: 1 + self.effects.iter().filter(|effect| effect.enabled).count(),
            visible_meshes,
            uploaded_vertices,
            view_projection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::catalogue;

    #[test]
    fn renders_only_the_attached_scene() {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 1.0, 1000.0);
        let mut scene = catalogue()[0].build(&mut camera).unwrap();
        let mut compositor = Compositor::new(800, 600, 2.0);

        assert!(compositor.render(&mut scene, &camera).is_err());

        compositor.attach(scene.name());
        compositor.add_effect(EffectPass::new("bloom"));
        let stats = compositor.render(&mut scene, &camera).unwrap();

        assert_eq!(stats.frame, 1);
        assert_eq!(stats.passes, 2);
        assert_eq!(stats.visible_meshes, 1);
        assert_eq!(stats.uploaded_vertices, 65 * 65 + 33 * 33);

        let stats = compositor.render(&mut scene, &camera).unwrap();
        assert_eq!(stats.uploaded_vertices, 0);
        assert_eq!(compositor.frames(), 2);
    }

    #[test]
    fn zero_area_skips_drawing_and_keeps_geometry_dirty() {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 1.0, 1000.0);
        let mut scene = catalogue()[0].build(&mut camera).unwrap();
        let mut compositor = Compositor::new(0, 0, 1.0);
        compositor.attach(scene.name());

        let stats = compositor.render(&mut scene, &camera).unwrap();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.passes, 0);
        assert_eq!(stats.visible_meshes, 0);
        assert_eq!(stats.uploaded_vertices, 0);

        compositor.resize(800, 600);
        let stats = compositor.render(&mut scene, &camera).unwrap();
        assert_eq!(stats.frame, 2);
        assert_eq!(stats.uploaded_vertices, 65 * 65 + 33 * 33);
    }

    #[test]
    fn resize_changes_drawing_buffer() {
        let mut compositor = Compositor::new(800, 600, 2.0);
        compositor.resize(1024, 768);
        assert_eq!(compositor.size(), (1024, 768));
        assert_eq!(compositor.drawing_buffer_size(), (2048, 1536));
    }
}
