//! Process-wide services and the frame driver that ties them together.
//!
//! Each service is constructed explicitly and handed to a [`Services`]
//! registry exactly once. Only one registry, or the [`Animator`] built from
//! it, may be alive in the process at a time; opening a second one fails
//! with [`VizError::AlreadyInitialised`].

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    audio::AudioManager,
    camera::PerspectiveCamera,
    render::FrameStats,
    scene::{FrameContext, SceneLibrary, SceneManager},
    timeline::FrameClock,
    Config, Result, VizError,
};

static INSTANCE_LIVE: AtomicBool = AtomicBool::new(false);

/// Claim on the process-wide animator instance, released on drop.
#[derive(Debug)]
struct InstanceGuard;

impl InstanceGuard {
    fn acquire() -> Result<Self> {
        if INSTANCE_LIVE.swap(true, Ordering::AcqRel) {
            return Err(VizError::AlreadyInitialised("Animator"));
        }
        Ok(Self)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        INSTANCE_LIVE.store(false, Ordering::Release);
    }
}

/// Holds a service that may be initialised exactly once.
#[derive(Debug)]
struct ServiceSlot<T> {
    name: &'static str,
    value: Option<T>,
}

impl<T> ServiceSlot<T> {
    fn new(name: &'static str) -> Self {
        Self { name, value: None }
    }

    fn provide(&mut self, value: T) -> Result<()> {
        if self.value.is_some() {
            return Err(VizError::AlreadyInitialised(self.name));
        }
        self.value = Some(value);
        Ok(())
    }

    fn take(&mut self) -> Result<T> {
        self.value.take().ok_or(VizError::MissingService(self.name))
    }
}

/// Registry wiring the services together at process start.
#[derive(Debug)]
pub struct Services {
    config: ServiceSlot<Config>,
    audio: ServiceSlot<AudioManager>,
    scenes: ServiceSlot<SceneManager>,
    library: ServiceSlot<SceneLibrary>,
    guard: InstanceGuard,
}

impl Services {
    /// Opens the registry. Fails while another registry or animator is alive.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config: ServiceSlot::new("Config"),
            audio: ServiceSlot::new("AudioManager"),
            scenes: ServiceSlot::new("SceneManager"),
            library: ServiceSlot::new("SceneLibrary"),
            guard: InstanceGuard::acquire()?,
        })
    }

    pub fn provide_config(&mut self, config: Config) -> Result<()> {
        self.config.provide(config)
    }

    pub fn provide_audio(&mut self, audio: AudioManager) -> Result<()> {
        self.audio.provide(audio)
    }

    pub fn provide_scene_manager(&mut self, scenes: SceneManager) -> Result<()> {
        self.scenes.provide(scenes)
    }

    pub fn provide_library(&mut self, library: SceneLibrary) -> Result<()> {
        self.library.provide(library)
    }

    /// Builds the animator around the shared camera. The instance claim moves
    /// into the animator; on error it is released with the registry.
    pub fn into_animator(mut self, camera: PerspectiveCamera) -> Result<Animator> {
        Ok(Animator {
            config: self.config.take()?,
            audio: self.audio.take()?,
            scenes: self.scenes.take()?,
            library: self.library.take()?,
            camera,
            clock: FrameClock::new(),
            _guard: self.guard,
        })
    }
}

/// Frame driver: analysis refresh, then scene update, then compositing.
#[derive(Debug)]
pub struct Animator {
    config: Config,
    audio: AudioManager,
    scenes: SceneManager,
    library: SceneLibrary,
    camera: PerspectiveCamera,
    clock: FrameClock,
    _guard: InstanceGuard,
}

impl Animator {
    /// Runs one frame. Audio analysis always advances; the scene only updates
    /// while not frozen.
    pub fn frame(&mut self, delta: f32) -> Result<FrameStats> {
        self.audio.update(&self.config);

        let frozen = self.config.frozen;
        if !frozen {
            let mut frame = FrameContext {
                config: &self.config,
                audio: &self.audio,
                camera: &mut self.camera,
            };
            self.scenes.current_mut().update(&mut frame);
        }
        self.clock.advance(delta, frozen);

        let (scene, compositor) = self.scenes.parts_mut();
        compositor.render(scene, &self.camera)
    }

    /// Adapts camera and render target to a new viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.scenes.compositor_mut().resize(width, height);
    }

    pub fn next(&mut self) -> bool {
        self.library
            .next(&mut self.camera, &mut self.scenes, &mut self.audio)
    }

    pub fn previous(&mut self) -> bool {
        self.library
            .previous(&mut self.camera, &mut self.scenes, &mut self.audio)
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        self.library
            .go_to(index, &mut self.camera, &mut self.scenes, &mut self.audio)
    }

    /// Returns the new frozen state.
    pub fn toggle_play(&mut self) -> bool {
        self.library.toggle_play(&mut self.config)
    }

    pub fn indicator(&self) -> String {
        self.library.indicator(&self.config.indicator_label)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    pub fn library(&self) -> &SceneLibrary {
        &self.library
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }
}
