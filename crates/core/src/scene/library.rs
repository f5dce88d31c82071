use crate::{audio::AudioManager, camera::PerspectiveCamera, Config, Result, VizError};

use super::{variants::SceneVariant, Scene, SceneManager};

/// Ordered scene variants plus the navigation cursor.
#[derive(Debug)]
pub struct SceneLibrary {
    variants: Vec<SceneVariant>,
    index: usize,
}

impl SceneLibrary {
    /// Creates a library positioned on the last variant.
    pub fn new(variants: Vec<SceneVariant>) -> Result<Self> {
        if variants.is_empty() {
            return Err(VizError::InvalidInput(
                "scene library needs at least one variant",
            ));
        }
        let index = variants.len() - 1;
        Ok(Self { variants, index })
    }

    /// Zero-based position of the current variant.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variants(&self) -> &[SceneVariant] {
        &self.variants
    }

    pub fn current_variant(&self) -> &SceneVariant {
        &self.variants[self.index]
    }

    /// Builds the variant under the cursor, e.g. for the initial scene.
    pub fn build_current(&self, camera: &mut PerspectiveCamera) -> Result<Box<dyn Scene>> {
        let scene = self.current_variant().build(camera)?;
        Ok(Box::new(scene))
    }

    /// Constructs the requested variant around the shared camera and hands it
    /// to the scene manager. The cursor only moves if construction succeeds;
    /// otherwise nothing changes and `false` is returned.
    pub fn go_to(
        &mut self,
        index: usize,
        camera: &mut PerspectiveCamera,
        scenes: &mut SceneManager,
        audio: &mut AudioManager,
    ) -> bool {
        let Some(variant) = self.variants.get(index) else {
            tracing::debug!(index, count = self.len(), "scene index out of range");
            return false;
        };

        // Variants validate before touching the camera.
        let scene = match variant.build(camera) {
            Ok(scene) => scene,
            Err(err) => {
                tracing::warn!(index, %err, "scene construction failed");
                return false;
            }
        };

        self.index = index;
        scenes.set_scene(Some(Box::new(scene)), audio);
        tracing::info!(indicator = %self.indicator("Scene"), "navigated");
        true
    }

    /// Moves forward one scene. No-op on the last scene.
    pub fn next(
        &mut self,
        camera: &mut PerspectiveCamera,
        scenes: &mut SceneManager,
        audio: &mut AudioManager,
    ) -> bool {
        if self.index + 1 >= self.len() {
            return false;
        }
        self.go_to(self.index + 1, camera, scenes, audio)
    }

    /// Moves back one scene. No-op on the first scene.
    pub fn previous(
        &mut self,
        camera: &mut PerspectiveCamera,
        scenes: &mut SceneManager,
        audio: &mut AudioManager,
    ) -> bool {
        if self.index == 0 {
            return false;
        }
        self.go_to(self.index - 1, camera, scenes, audio)
    }

    /// Freezes or resumes scene updates. Returns the new frozen state.
    pub fn toggle_play(&self, config: &mut Config) -> bool {
        config.toggle_frozen()
    }

    /// "Scene 2 of 7" style position indicator.
    pub fn indicator(&self, label: &str) -> String {
        format!("{label} {} of {}", self.index + 1, self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::{AudioAnalysisSource, HeadlessTrack},
        mapping::LinearRange,
        render::Compositor,
        scene::{catalogue, CONTENT_STATE},
        SpectrumAnalyser,
    };

    struct Silence;

    impl SpectrumAnalyser for Silence {
        fn frequency_bin_count(&self) -> usize {
            2
        }

        fn fill_byte_frequency_data(&mut self, out: &mut [u8]) {
            out.fill(0);
        }
    }

    struct Stage {
        library: SceneLibrary,
        camera: PerspectiveCamera,
        scenes: SceneManager,
        audio: AudioManager,
    }

    fn stage(variants: Vec<SceneVariant>) -> Stage {
        let mut audio = AudioManager::new(vec![AudioAnalysisSource::track(
            CONTENT_STATE,
            Box::new(HeadlessTrack::new()),
            Box::new(Silence),
        )])
        .unwrap();
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 1.0, 1000.0);
        let library = SceneLibrary::new(variants).unwrap();
        let initial = library.build_current(&mut camera).unwrap();
        let scenes = SceneManager::new(initial, Compositor::new(640, 480, 1.0), &mut audio);
        Stage {
            library,
            camera,
            scenes,
            audio,
        }
    }

    impl Stage {
        fn go_to(&mut self, index: usize) -> bool {
            self.library
                .go_to(index, &mut self.camera, &mut self.scenes, &mut self.audio)
        }

        fn next(&mut self) -> bool {
            self.library
                .next(&mut self.camera, &mut self.scenes, &mut self.audio)
        }

        fn previous(&mut self) -> bool {
            self.library
                .previous(&mut self.camera, &mut self.scenes, &mut self.audio)
        }
    }

    #[test]
    fn starts_on_last_variant() {
        let stage = stage(catalogue());
        assert_eq!(stage.library.index(), 6);
        assert_eq!(stage.scenes.current().name(), "solid sun");
        assert_eq!(stage.library.indicator("Scene"), "Scene 7 of 7");
        assert!(SceneLibrary::new(Vec::new()).is_err());
    }

    #[test]
    fn out_of_range_navigation_is_ignored() {
        let mut stage = stage(catalogue());
        let name = stage.scenes.current().name().to_string();

        assert!(!stage.go_to(7));
        assert!(!stage.next());

        assert_eq!(stage.library.index(), 6);
        assert_eq!(stage.scenes.current().name(), name);
        assert_eq!(stage.scenes.current().graph().len(), 4);
    }

    #[test]
    fn walks_backward_and_forward() {
        let mut stage = stage(catalogue().into_iter().take(5).collect());
        assert!(stage.go_to(0));
        assert!(!stage.previous());
        assert_eq!(stage.library.index(), 0);

        assert!(stage.next());
        assert_eq!(stage.library.index(), 1);
        assert_eq!(stage.scenes.current().name(), "radial bloom");
        assert_eq!(stage.camera.position.z, 4.0);
        assert_eq!(stage.library.indicator("Versie"), "Versie 2 of 5");
    }

    #[test]
    fn failed_construction_keeps_index_scene_and_camera() {
        let mut variants = catalogue();
        variants[2].fov = LinearRange::new(-5.0, 90.0);
        let mut stage = stage(variants);
        stage.camera.position.z = 9.0;

        assert!(!stage.go_to(2));

        assert_eq!(stage.library.index(), 6);
        assert_eq!(stage.scenes.current().name(), "solid sun");
        assert_eq!(stage.camera.position.z, 9.0);
    }

    #[test]
    fn toggle_play_flips_freeze() {
        let stage = stage(catalogue());
        let mut config = Config::default();
        assert!(stage.library.toggle_play(&mut config));
        assert!(config.frozen);
        assert!(!stage.library.toggle_play(&mut config));
    }
}
