//! Core library for the Reactive Scenes viewer.
//!
//! A frame samples every audio source's spectrum, lets the current scene map
//! that data onto geometry, camera, fog and background, and composites the
//! result. Scenes are swapped at runtime through the [`SceneLibrary`] and
//! [`SceneManager`], which tear the outgoing scene down completely before the
//! incoming one starts its audio.
//!
//! The renderer and audio backends are external; this crate talks to them
//! through [`SpectrumAnalyser`], [`Playback`] and the [`Compositor`].

pub mod analysis;
pub mod animator;
pub mod assets;
pub mod audio;
pub mod camera;
pub mod config;
pub mod error;
pub mod mapping;
pub mod render;
pub mod scene;
pub mod timeline;

pub use analysis::{FftAnalyser, SpectrumAnalyser};
pub use animator::{Animator, Services};
pub use assets::{AssetStore, AudioAsset};
pub use audio::{
    microphone_request, AudioAnalysisSource, AudioManager, HeadlessTrack, MicrophoneGrant,
    MicrophoneRequest, MicrophoneStatus, Playback, TrackState, MICROPHONE_ID,
};
pub use camera::PerspectiveCamera;
pub use config::{Config, ConfigValue, OptionKind, OptionSpec, PanelRow};
pub use error::{Result, VizError};
pub use mapping::{LinearRange, Rgb};
pub use render::{Compositor, EffectPass, FrameStats};
pub use scene::{catalogue, FrameContext, Scene, SceneLibrary, SceneManager, SceneVariant};
pub use timeline::FrameClock;
