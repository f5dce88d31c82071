use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Mutex, MutexGuard},
};

use reactive_scenes_core::{
    catalogue, microphone_request, scene::ResourceHandle, AudioAnalysisSource, AudioManager,
    Compositor, Config, MicrophoneGrant, PerspectiveCamera, Playback, SceneLibrary, SceneManager,
    Services, SpectrumAnalyser, MICROPHONE_ID,
};

static SERIAL: Mutex<()> = Mutex::new(());

/// Only one animator may be alive per process, so tests take turns.
fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Spectrum the test can rewrite between frames.
#[derive(Clone)]
struct ScriptedSpectrum(Rc<RefCell<Vec<u8>>>);

impl SpectrumAnalyser for ScriptedSpectrum {
    fn frequency_bin_count(&self) -> usize {
        self.0.borrow().len()
    }

    fn fill_byte_frequency_data(&mut self, out: &mut [u8]) {
        out.copy_from_slice(&self.0.borrow());
    }
}

/// Content track that records, on every `play`, whether the watched
/// resources were already disposed.
struct WatchingTrack {
    playing: bool,
    watched: Rc<RefCell<Vec<ResourceHandle>>>,
    log: Rc<RefCell<Vec<bool>>>,
}

impl Playback for WatchingTrack {
    fn play(&mut self) {
        self.playing = true;
        let watched = self.watched.borrow();
        if !watched.is_empty() {
            self.log
                .borrow_mut()
                .push(watched.iter().all(ResourceHandle::is_disposed));
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn set_looping(&mut self, _looping: bool) {}
}

struct Rig {
    spectrum: Rc<RefCell<Vec<u8>>>,
    watched: Rc<RefCell<Vec<ResourceHandle>>>,
    log: Rc<RefCell<Vec<bool>>>,
    grant: Option<MicrophoneGrant>,
}

fn build(scene_count: usize) -> (reactive_scenes_core::Animator, Rig) {
    let spectrum = Rc::new(RefCell::new(vec![0u8; 8]));
    let watched = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::new(RefCell::new(Vec::new()));

    let track = AudioAnalysisSource::track(
        "content",
        Box::new(WatchingTrack {
            playing: false,
            watched: watched.clone(),
            log: log.clone(),
        }),
        Box::new(ScriptedSpectrum(spectrum.clone())),
    );
    let mut audio = AudioManager::new(vec![track]).unwrap();
    let (grant, request) = microphone_request();
    audio.request_microphone(request);

    let config = Config {
        muted: false,
        ..Config::default()
    };
    let mut camera = PerspectiveCamera::new(config.fov, 16.0 / 9.0, 1.0, config.render_distance);
    let library = SceneLibrary::new(catalogue().into_iter().take(scene_count).collect()).unwrap();
    let scenes = SceneManager::new(
        library.build_current(&mut camera).unwrap(),
        Compositor::new(1280, 720, 1.0),
        &mut audio,
    );

    let mut services = Services::new().unwrap();
    services.provide_config(config).unwrap();
    services.provide_audio(audio).unwrap();
    services.provide_scene_manager(scenes).unwrap();
    services.provide_library(library).unwrap();

    let animator = services.into_animator(camera).unwrap();
    (
        animator,
        Rig {
            spectrum,
            watched,
            log,
            grant: Some(grant),
        },
    )
}

#[test]
fn forward_navigation_disposes_before_audio_starts() {
    let _serial = serial();
    let (mut animator, rig) = build(5);
    assert!(animator.go_to(0));
    assert_eq!(animator.indicator(), "Scene 1 of 5");

    *rig.watched.borrow_mut() = animator.scenes().current().graph().resource_handles();
    assert!(animator.next());

    assert_eq!(animator.library().index(), 1);
    assert_eq!(animator.indicator(), "Scene 2 of 5");
    assert_eq!(*rig.log.borrow(), vec![true]);
    assert!(animator.audio().get_source("content").unwrap().is_playing());
}

#[test]
fn out_of_range_goto_keeps_index_and_scene() {
    let _serial = serial();
    let (mut animator, _rig) = build(5);
    let before = animator.scenes().current().name().to_string();

    assert!(!animator.go_to(12));
    assert_eq!(animator.library().index(), 4);
    assert_eq!(animator.scenes().current().name(), before);
}

#[test]
fn frozen_frames_keep_analysing_but_do_not_move_vertices() {
    let _serial = serial();
    let (mut animator, rig) = build(5);
    animator.frame(0.016).unwrap();

    assert!(animator.toggle_play());
    *rig.spectrum.borrow_mut() = vec![255; 8];
    let positions_before = content_positions(&animator);

    let stats = animator.frame(0.016).unwrap();
    assert_eq!(animator.audio().get_source("content").unwrap().average_volume(), 255.0);
    assert_eq!(content_positions(&animator), positions_before);
    assert_eq!(stats.uploaded_vertices, 0);
    assert_eq!(animator.clock().frozen_frames(), 1);

    assert!(!animator.toggle_play());
    let stats = animator.frame(0.016).unwrap();
    assert_ne!(content_positions(&animator), positions_before);
    assert!(stats.uploaded_vertices > 0);
}

#[test]
fn microphone_arrives_mid_session() {
    let _serial = serial();
    let (mut animator, mut rig) = build(5);
    let start_fov = animator.camera().fov;

    animator.frame(0.016).unwrap();
    assert!(animator.audio().get_source(MICROPHONE_ID).is_none());
    assert_eq!(animator.camera().fov, start_fov);

    let grant = rig.grant.take().unwrap();
    std::thread::spawn(move || grant.grant(Box::new(SendableSpectrum(vec![175, 0, 175, 0]))))
        .join()
        .unwrap();

    animator.frame(0.016).unwrap();
    assert_eq!(
        animator.audio().get_source(MICROPHONE_ID).unwrap().average_volume(),
        87.5
    );
    // The fifth catalogue entry maps fov over [10, 125].
    assert_eq!(animator.camera().fov, 67.5);
}

/// Owned spectrum that can cross the microphone channel.
struct SendableSpectrum(Vec<u8>);

impl SpectrumAnalyser for SendableSpectrum {
    fn frequency_bin_count(&self) -> usize {
        self.0.len()
    }

    fn fill_byte_frequency_data(&mut self, out: &mut [u8]) {
        out.copy_from_slice(&self.0);
    }
}

fn content_positions(animator: &reactive_scenes_core::Animator) -> Vec<[f32; 3]> {
    animator
        .scenes()
        .current()
        .graph()
        .children()
        .iter()
        .filter_map(|child| match child {
            reactive_scenes_core::scene::SceneObject::Mesh(mesh) if mesh.name == "content" => {
                Some(mesh.geometry.positions().iter().map(|p| p.to_array()).collect::<Vec<_>>())
            }
            _ => None,
        })
        .next()
        .unwrap()
}
