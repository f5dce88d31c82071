use std::collections::BTreeMap;

use glam::Vec3;

use crate::{
    audio::{AudioAnalysisSource, AudioManager, MICROPHONE_ID},
    camera::PerspectiveCamera,
    mapping::{normalized_volume, Rgb},
};

use super::{
    graph::{AmbientLight, DirectionalLight, Environment, Fog, Mesh, NodeId, SceneGraph, SceneObject},
    resources::{Geometry, Material, MaterialSlot, TeardownReport},
    variants::{SceneVariant, StateStyle},
    FrameContext, Scene,
};

/// Id of the state (and audio track) driving vertex displacement.
pub const CONTENT_STATE: &str = "content";
pub const FRUSTRATED_STATE: &str = "frustrated";

/// Named visual state: a mesh plus the positions it was built with.
#[derive(Debug)]
pub struct VisualState {
    node: NodeId,
    baseline: Vec<Vec3>,
}

impl VisualState {
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Vertex positions captured at construction. Never modified afterwards.
    pub fn baseline(&self) -> &[Vec3] {
        &self.baseline
    }
}

/// The scene template every catalogue variant instantiates.
#[derive(Debug)]
pub struct StatesScene {
    variant: SceneVariant,
    graph: SceneGraph,
    environment: Environment,
    states: BTreeMap<&'static str, VisualState>,
}

impl StatesScene {
    /// Adopts the camera, builds the environment and then the visual states,
    /// in that order.
    pub(crate) fn new(variant: SceneVariant, camera: &mut PerspectiveCamera) -> Self {
        camera.position = variant.camera_start;

        let spec = variant.environment;
        let mut graph = SceneGraph::new();
        graph.add(SceneObject::DirectionalLight(DirectionalLight {
            color: Rgb::from_hex(spec.light_color),
            intensity: spec.light_intensity,
            position: spec.light_position,
        }));
        graph.add(SceneObject::AmbientLight(AmbientLight {
            color: Rgb::from_hex(spec.ambient_color),
            intensity: spec.ambient_intensity,
        }));
        let environment = Environment {
            background: Rgb::from_hex(spec.background),
            fog: Fog {
                color: Rgb::from_hex(spec.fog_color),
                density: spec.fog_density,
            },
        };

        let mut states = BTreeMap::new();
        states.insert(
            CONTENT_STATE,
            add_state(&mut graph, CONTENT_STATE, &variant.content),
        );
        states.insert(
            FRUSTRATED_STATE,
            add_state(&mut graph, FRUSTRATED_STATE, &variant.frustrated),
        );

        Self {
            variant,
            graph,
            environment,
            states,
        }
    }

    pub fn variant(&self) -> &SceneVariant {
        &self.variant
    }

    pub fn state(&self, name: &str) -> Option<&VisualState> {
        self.states.get(name)
    }

    /// Current mesh of a named state. `None` after teardown.
    pub fn state_mesh(&self, name: &str) -> Option<&Mesh> {
        self.states
            .get(name)
            .and_then(|state| self.graph.mesh(state.node))
    }

    fn update_content_positions(&mut self, content: &AudioAnalysisSource) {
        let spectrum = content.data();
        if spectrum.is_empty() {
            return;
        }
        let Some(state) = self.states.get(CONTENT_STATE) else {
            return;
        };
        let Some(mesh) = self.graph.mesh_mut(state.node) else {
            return;
        };

        let magnitude = self.variant.displacement_magnitude;
        for (index, origin) in state.baseline.iter().enumerate() {
            let amplitude = f32::from(spectrum[index % spectrum.len()]) / 255.0;
            let offset = self
                .variant
                .displacement
                .offset(index, amplitude * magnitude, *origin);
            mesh.geometry.set_position(index, *origin + offset);
        }
        mesh.geometry.mark_needs_update();
    }

    fn update_camera(&self, camera: &mut PerspectiveCamera, t: f32) {
        camera.fov = self.variant.fov.map_inverted(t);
        camera.update_projection_matrix();
        camera.position.z = self.variant.distance.map_inverted(t);
    }

    fn update_fog(&mut self, t: f32) {
        // Variants without a fog mapping keep their construction fog.
        let Some(mapping) = self.variant.fog else {
            return;
        };
        self.environment.fog.density = mapping.density.map(t);
        self.environment.fog.color = mapping.color(t);
    }

    fn update_background(&mut self, t: f32, per_channel: bool) {
        if let Some(mapping) = self.variant.background {
            self.environment.background = mapping.color(t, per_channel);
        }
    }
}

fn add_state(graph: &mut SceneGraph, name: &str, style: &StateStyle) -> VisualState {
    let geometry = Geometry::sphere(style.radius, style.width_segments, style.height_segments);
    let baseline = geometry.positions().to_vec();
    let node = graph.add(SceneObject::Mesh(Mesh {
        name: name.to_string(),
        geometry,
        material: MaterialSlot::Single(Material::standard(style.color, style.wireframe)),
        visible: style.visible,
    }));
    VisualState { node, baseline }
}

impl Scene for StatesScene {
    fn name(&self) -> &str {
        self.variant.name
    }

    fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    fn environment(&self) -> &Environment {
        &self.environment
    }

    fn setup_audio(&mut self, audio: &mut AudioManager) {
        if !audio.play(CONTENT_STATE) {
            tracing::debug!(scene = self.name(), "no content track to start");
        }
    }

    fn update(&mut self, frame: &mut FrameContext<'_>) {
        let mic = frame.audio.get_source(MICROPHONE_ID);

        if let Some(content) = frame.audio.get_source(CONTENT_STATE) {
            self.update_content_positions(content);
        }

        let Some(mic) = mic else {
            return;
        };
        let t = normalized_volume(
            mic.average_volume(),
            frame.config.max_mic_volume,
            frame.config.clamp_mapping,
        );
        self.update_camera(frame.camera, t);
        self.update_fog(t);
        self.update_background(t, frame.config.per_channel_background);
    }

    fn teardown(&mut self) -> TeardownReport {
        self.graph.teardown()
    }
}
