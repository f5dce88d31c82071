//! Scenes, their GPU resources and the services that swap them at runtime.

pub mod graph;
pub mod library;
pub mod manager;
pub mod resources;
pub mod states;
pub mod variants;

use crate::{audio::AudioManager, camera::PerspectiveCamera, Config};

pub use graph::{Environment, Fog, Mesh, NodeId, SceneGraph, SceneObject};
pub use library::SceneLibrary;
pub use manager::SceneManager;
pub use resources::{Disposable, Geometry, Material, MaterialSlot, ResourceHandle, TeardownReport, Texture};
pub use states::{StatesScene, VisualState, CONTENT_STATE, FRUSTRATED_STATE};
pub use variants::{catalogue, Displacement, SceneVariant};

/// Everything a scene may read or reconfigure during one frame.
pub struct FrameContext<'a> {
    pub config: &'a Config,
    pub audio: &'a AudioManager,
    pub camera: &'a mut PerspectiveCamera,
}

/// A self-contained visual theme driven by audio.
pub trait Scene {
    fn name(&self) -> &str;

    fn graph(&self) -> &SceneGraph;

    fn graph_mut(&mut self) -> &mut SceneGraph;

    fn environment(&self) -> &Environment;

    /// Called once, right after the scene becomes current.
    fn setup_audio(&mut self, audio: &mut AudioManager);

    /// Recomputes visual parameters from the latest analysis data.
    fn update(&mut self, frame: &mut FrameContext<'_>);

    /// Removes and disposes every child. The shared camera is untouched.
    fn teardown(&mut self) -> TeardownReport;
}

impl std::fmt::Debug for dyn Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name())
            .field("children", &self.graph().len())
            .finish()
    }
}
