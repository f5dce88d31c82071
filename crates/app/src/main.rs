use std::{f32::consts::TAU, path::PathBuf, thread, time::Duration};

use clap::{Parser, Subcommand};
use reactive_scenes_core::{
    catalogue, microphone_request, AssetStore, AudioAsset, AudioManager, Compositor, Config,
    FftAnalyser, HeadlessTrack, PerspectiveCamera, SceneLibrary, SceneManager, Services,
    SpectrumAnalyser, TrackState,
};
use tracing_subscriber::EnvFilter;

const SAMPLE_RATE: f32 = 44_100.0;

fn main() -> reactive_scenes_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            frames,
            config,
            scene,
            deny_mic,
            delta,
            width,
            height,
        } => run(RunOptions {
            frames,
            config,
            scene,
            deny_mic,
            delta,
            width,
            height,
        }),
        Commands::Scenes => {
            for (index, variant) in catalogue().iter().enumerate() {
                println!("{:>2}  {}", index + 1, variant.name);
            }
            Ok(())
        }
    }
}

struct RunOptions {
    frames: u64,
    config: Option<PathBuf>,
    scene: Option<usize>,
    deny_mic: bool,
    delta: f32,
    width: u32,
    height: u32,
}

fn run(options: RunOptions) -> reactive_scenes_core::Result<()> {
    let config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    tracing::info!(frames = options.frames, muted = config.muted, "starting headless run");

    let mut assets = AssetStore::new();
    assets.register_track(AudioAsset::new("assets/content.mp3"))?;
    assets.register_track(AudioAsset::new("assets/frustrated.mp3"))?;

    let mut sources = Vec::new();
    for (slot, asset) in assets.tracks().iter().enumerate() {
        let deck = HeadlessTrack::new();
        let analyser = ToneAnalyser::following(deck.state(), 220.0 * (slot + 1) as f32);
        sources.push(asset.open(Box::new(deck), Box::new(analyser))?);
    }

    let mut audio = AudioManager::new(sources)?;
    let (grant, request) = microphone_request();
    audio.request_microphone(request);
    let deny_mic = options.deny_mic;
    thread::spawn(move || {
        // Permission prompts resolve some time after startup.
        thread::sleep(Duration::from_millis(50));
        if deny_mic {
            grant.deny("microphone disabled on the command line");
        } else {
            grant.grant(Box::new(ToneAnalyser::free_running(440.0)));
        }
    });

    let aspect = options.width as f32 / options.height.max(1) as f32;
    let mut camera = PerspectiveCamera::new(config.fov, aspect, 1.0, config.render_distance);
    let library = SceneLibrary::new(catalogue())?;
    let scenes = SceneManager::new(
        library.build_current(&mut camera)?,
        Compositor::new(options.width, options.height, 1.0),
        &mut audio,
    );

    let mut services = Services::new()?;
    services.provide_config(config)?;
    services.provide_audio(audio)?;
    services.provide_scene_manager(scenes)?;
    services.provide_library(library)?;
    let mut animator = services.into_animator(camera)?;

    if let Some(scene) = options.scene {
        if scene == 0 || !animator.go_to(scene - 1) {
            tracing::warn!(scene, "no such scene, keeping the current one");
        }
    }
    tracing::info!(indicator = %animator.indicator(), "scene ready");

    let frame_time = Duration::from_secs_f32(options.delta.max(0.0));
    for _ in 0..options.frames {
        let stats = animator.frame(options.delta)?;
        tracing::debug!(
            frame = stats.frame,
            scene = %stats.scene,
            uploaded = stats.uploaded_vertices,
            fov = animator.camera().fov,
            z = animator.camera().position.z,
            "frame"
        );
        thread::sleep(frame_time);
    }

    tracing::info!(
        frames = animator.clock().frames(),
        seconds = animator.clock().time_seconds,
        microphone = ?animator.audio().microphone_status(),
        indicator = %animator.indicator(),
        "run finished"
    );
    Ok(())
}

/// Stand-in for a decoded track or capture stream: a sine tone analysed by
/// the regular FFT path.
struct ToneAnalyser {
    inner: FftAnalyser,
    transport: Option<TrackState>,
    frequency: f32,
    phase: f32,
    block: Vec<f32>,
}

impl ToneAnalyser {
    /// Sounds only while the track is playing.
    fn following(transport: TrackState, frequency: f32) -> Self {
        Self::build(Some(transport), frequency)
    }

    fn free_running(frequency: f32) -> Self {
        Self::build(None, frequency)
    }

    fn build(transport: Option<TrackState>, frequency: f32) -> Self {
        let inner = FftAnalyser::new();
        let block = vec![0.0; inner.fft_size()];
        Self {
            inner,
            transport,
            frequency,
            phase: 0.0,
            block,
        }
    }
}

impl SpectrumAnalyser for ToneAnalyser {
    fn frequency_bin_count(&self) -> usize {
        self.inner.frequency_bin_count()
    }

    fn fill_byte_frequency_data(&mut self, out: &mut [u8]) {
        let sounding = self
            .transport
            .as_ref()
            .map_or(true, TrackState::is_playing);

        let step = TAU * self.frequency / SAMPLE_RATE;
        for sample in &mut self.block {
            *sample = if sounding { 0.05 * self.phase.sin() } else { 0.0 };
            self.phase = (self.phase + step) % TAU;
        }
        self.inner.push_samples(&self.block);
        self.inner.fill_byte_frequency_data(out);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-reactive generative scenes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the frame loop headlessly with synthetic audio devices.
    Run {
        /// Number of frames to render before exiting.
        #[arg(short, long, default_value_t = 600)]
        frames: u64,
        /// JSON file overriding the default configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// One-based catalogue index to start on instead of the last scene.
        #[arg(short, long)]
        scene: Option<usize>,
        /// Resolve the microphone request with a denial.
        #[arg(long)]
        deny_mic: bool,
        /// Seconds per frame.
        #[arg(long, default_value_t = 1.0 / 60.0)]
        delta: f32,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 720)]
        height: u32,
    },
    /// List the scene catalogue in navigation order.
    Scenes,
}
