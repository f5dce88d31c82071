use crate::{audio::AudioManager, render::Compositor};

use super::{Scene, TeardownReport};

/// Owns the current scene and the compositor it is rendered through.
#[derive(Debug)]
pub struct SceneManager {
    current: Box<dyn Scene>,
    compositor: Compositor,
}

impl SceneManager {
    /// Binds `initial` to the compositor and starts its audio.
    pub fn new(initial: Box<dyn Scene>, mut compositor: Compositor, audio: &mut AudioManager) -> Self {
        compositor.attach(initial.name());
        let mut manager = Self {
            current: initial,
            compositor,
        };
        manager.current.setup_audio(audio);
        tracing::info!(scene = manager.current.name(), "initial scene attached");
        manager
    }

    pub fn current(&self) -> &dyn Scene {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> &mut dyn Scene {
        self.current.as_mut()
    }

    /// Render surface and pass chain the current scene is drawn through.
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    /// Splits the borrow so a frame can render the current scene.
    pub fn parts_mut(&mut self) -> (&mut dyn Scene, &mut Compositor) {
        (self.current.as_mut(), &mut self.compositor)
    }

    /// Swaps in `scene`. The outgoing scene is torn down and all playback is
    /// paused before the new scene is attached and its audio started.
    ///
    /// Returns `None`, leaving everything untouched, when `scene` is `None`.
    pub fn set_scene(
        &mut self,
        scene: Option<Box<dyn Scene>>,
        audio: &mut AudioManager,
    ) -> Option<TeardownReport> {
        let scene = scene?;

        let report = self.current.teardown();
        audio.pause_all();
        tracing::info!(
            scene = self.current.name(),
            children = report.children_removed,
            geometries = report.geometries,
            materials = report.materials,
            textures = report.textures,
            "scene torn down"
        );

        self.compositor.attach(scene.name());
        self.current = scene;
        self.current.setup_audio(audio);
        tracing::info!(scene = self.current.name(), "scene attached");

        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        audio::{AudioAnalysisSource, HeadlessTrack, TrackState},
        camera::PerspectiveCamera,
        scene::{catalogue, ResourceHandle, CONTENT_STATE},
        SpectrumAnalyser,
    };

    struct Silence;

    impl SpectrumAnalyser for Silence {
        fn frequency_bin_count(&self) -> usize {
            4
        }

        fn fill_byte_frequency_data(&mut self, out: &mut [u8]) {
            out.fill(0);
        }
    }

    /// Wraps a real scene and records lifecycle calls in a shared journal.
    struct Journaled {
        inner: Box<dyn Scene>,
        journal: Rc<RefCell<Vec<String>>>,
        content: TrackState,
    }

    impl Scene for Journaled {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn graph(&self) -> &crate::scene::SceneGraph {
            self.inner.graph()
        }

        fn graph_mut(&mut self) -> &mut crate::scene::SceneGraph {
            self.inner.graph_mut()
        }

        fn environment(&self) -> &crate::scene::Environment {
            self.inner.environment()
        }

        fn setup_audio(&mut self, audio: &mut AudioManager) {
            self.journal.borrow_mut().push(format!(
                "setup {} (content playing: {})",
                self.name(),
                self.content.is_playing()
            ));
            self.inner.setup_audio(audio);
        }

        fn update(&mut self, frame: &mut crate::scene::FrameContext<'_>) {
            self.inner.update(frame);
        }

        fn teardown(&mut self) -> TeardownReport {
            self.journal.borrow_mut().push(format!("teardown {}", self.name()));
            self.inner.teardown()
        }
    }

    fn fixture() -> (AudioManager, TrackState, PerspectiveCamera) {
        let deck = HeadlessTrack::new();
        let state = deck.state();
        let audio = AudioManager::new(vec![AudioAnalysisSource::track(
            CONTENT_STATE,
            Box::new(deck),
            Box::new(Silence),
        )])
        .unwrap();
        (audio, state, PerspectiveCamera::new(75.0, 1.0, 1.0, 1000.0))
    }

    fn journaled(
        index: usize,
        camera: &mut PerspectiveCamera,
        journal: &Rc<RefCell<Vec<String>>>,
        content: &TrackState,
    ) -> Box<dyn Scene> {
        Box::new(Journaled {
            inner: Box::new(catalogue()[index].build(camera).unwrap()),
            journal: journal.clone(),
            content: content.clone(),
        })
    }

    #[test]
    fn absent_scene_changes_nothing() {
        let (mut audio, content, mut camera) = fixture();
        let initial = catalogue()[0].build(&mut camera).unwrap();
        let mut manager = SceneManager::new(Box::new(initial), Compositor::new(800, 600, 1.0), &mut audio);
        let children = manager.current().graph().len();

        assert!(manager.set_scene(None, &mut audio).is_none());

        assert_eq!(manager.current().name(), "breathing sphere");
        assert_eq!(manager.current().graph().len(), children);
        assert_eq!(manager.compositor().main_scene(), Some("breathing sphere"));
        assert!(content.is_playing());
    }

    #[test]
    fn transition_tears_down_before_new_audio_starts() {
        let (mut audio, content, mut camera) = fixture();
        let journal = Rc::new(RefCell::new(Vec::new()));

        let first = journaled(0, &mut camera, &journal, &content);
        let handles: Vec<ResourceHandle> = first.graph().resource_handles();
        let mut manager = SceneManager::new(first, Compositor::new(800, 600, 1.0), &mut audio);

        let second = journaled(1, &mut camera, &journal, &content);
        let report = manager.set_scene(Some(second), &mut audio).unwrap();

        assert_eq!(report.children_removed, 4);
        assert_eq!(report.geometries, 2);
        assert_eq!(report.materials, 2);
        assert!(handles.iter().all(ResourceHandle::is_disposed));

        assert_eq!(
            *journal.borrow(),
            vec![
                "setup breathing sphere (content playing: false)".to_string(),
                "teardown breathing sphere".to_string(),
                "setup radial bloom (content playing: false)".to_string(),
            ]
        );
        assert!(content.is_playing());
        assert_eq!(manager.current().name(), "radial bloom");
        assert_eq!(manager.compositor().main_scene(), Some("radial bloom"));
    }
}
