use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Receiver, Sender, TryRecvError},
    Arc,
};

use crate::{analysis::average_volume, Config, Result, SpectrumAnalyser, VizError};

/// Fixed id of the live capture source.
pub const MICROPHONE_ID: &str = "mic";

/// Transport controls of a playable, loop-enabled audio asset.
pub trait Playback {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
    fn set_looping(&mut self, looping: bool);
}

/// Device feeding an [`AudioAnalysisSource`].
pub enum SourceDevice {
    /// A looping track that can be played and paused.
    Track(Box<dyn Playback>),
    /// Live capture stream. It has no transport controls.
    Microphone,
}

impl std::fmt::Debug for SourceDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceDevice::Track(playback) => f
                .debug_struct("Track")
                .field("playing", &playback.is_playing())
                .finish(),
            SourceDevice::Microphone => f.write_str("Microphone"),
        }
    }
}

/// One audio device paired with its analyser and output gain.
pub struct AudioAnalysisSource {
    id: String,
    device: SourceDevice,
    analyser: Box<dyn SpectrumAnalyser>,
    data: Vec<u8>,
    average_volume: f32,
    gain: f32,
}

impl AudioAnalysisSource {
    /// Wraps a playable asset. The asset is switched to looping playback.
    pub fn track(
        id: impl Into<String>,
        mut playback: Box<dyn Playback>,
        analyser: Box<dyn SpectrumAnalyser>,
    ) -> Self {
        playback.set_looping(true);
        Self::build(id.into(), SourceDevice::Track(playback), analyser, 1.0)
    }

    /// Wraps a capture stream. Its output is kept silent so the room is not
    /// fed back into the speakers.
    pub fn microphone(analyser: Box<dyn SpectrumAnalyser>) -> Self {
        Self::build(
            MICROPHONE_ID.to_string(),
            SourceDevice::Microphone,
            analyser,
            0.0,
        )
    }

    fn build(
        id: String,
        device: SourceDevice,
        analyser: Box<dyn SpectrumAnalyser>,
        gain: f32,
    ) -> Self {
        let data = vec![0; analyser.frequency_bin_count()];
        Self {
            id,
            device,
            analyser,
            data,
            average_volume: 0.0,
            gain,
        }
    }

    /// Unique id, the asset file stem or [`MICROPHONE_ID`].
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn device(&self) -> &SourceDevice {
        &self.device
    }

    /// Latest spectrum snapshot, one byte per frequency bin.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mean of the latest spectrum snapshot.
    pub fn average_volume(&self) -> f32 {
        self.average_volume
    }

    /// Output gain: 0 while muted, 1 otherwise. Always 0 for the microphone.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn is_microphone(&self) -> bool {
        matches!(self.device, SourceDevice::Microphone)
    }

    pub fn is_playing(&self) -> bool {
        match &self.device {
            SourceDevice::Track(playback) => playback.is_playing(),
            SourceDevice::Microphone => true,
        }
    }

    /// Switches looping on the track device. No effect on the microphone.
    pub fn set_looping(&mut self, looping: bool) {
        if let Some(playback) = self.playback_mut() {
            playback.set_looping(looping);
        }
    }

    /// Refreshes the spectrum in place and recomputes the average volume.
    pub fn refresh(&mut self) {
        self.analyser.fill_byte_frequency_data(&mut self.data);
        self.average_volume = average_volume(&self.data);
    }

    fn playback_mut(&mut self) -> Option<&mut dyn Playback> {
        match &mut self.device {
            SourceDevice::Track(playback) => Some(playback.as_mut()),
            SourceDevice::Microphone => None,
        }
    }
}

impl std::fmt::Debug for AudioAnalysisSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioAnalysisSource")
            .field("id", &self.id)
            .field("device", &self.device)
            .field("bins", &self.data.len())
            .field("average_volume", &self.average_volume)
            .field("gain", &self.gain)
            .finish()
    }
}

enum MicrophoneOutcome {
    Granted(Box<dyn SpectrumAnalyser + Send>),
    Denied(String),
}

/// Sending half of a pending microphone request, handed to whatever resolves
/// the capture permission.
pub struct MicrophoneGrant {
    tx: Sender<MicrophoneOutcome>,
}

impl MicrophoneGrant {
    /// Resolves the request with a live capture analyser.
    pub fn grant(self, analyser: Box<dyn SpectrumAnalyser + Send>) {
        // A dropped manager simply never sees the microphone.
        let _ = self.tx.send(MicrophoneOutcome::Granted(analyser));
    }

    /// Resolves the request without a device.
    pub fn deny(self, reason: impl Into<String>) {
        let _ = self.tx.send(MicrophoneOutcome::Denied(reason.into()));
    }
}

/// Receiving half of a pending microphone request, polled by the manager.
pub struct MicrophoneRequest {
    rx: Receiver<MicrophoneOutcome>,
}

/// Opens a microphone request. Resolution may happen on any thread, at any
/// time; the manager picks it up on its next update.
pub fn microphone_request() -> (MicrophoneGrant, MicrophoneRequest) {
    let (tx, rx) = mpsc::channel();
    (MicrophoneGrant { tx }, MicrophoneRequest { rx })
}

/// Whether the microphone source exists, is still pending or will never come.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicrophoneStatus {
    NotRequested,
    Pending,
    Available,
    Unavailable,
}

/// Owns every analysed audio source along with the mute policy.
pub struct AudioManager {
    sources: Vec<AudioAnalysisSource>,
    muted: bool,
    microphone: Option<MicrophoneRequest>,
    microphone_status: MicrophoneStatus,
}

impl AudioManager {
    /// Creates a manager over the given sources. Ids must be unique.
    pub fn new(sources: Vec<AudioAnalysisSource>) -> Result<Self> {
        for (index, source) in sources.iter().enumerate() {
            if sources[..index].iter().any(|other| other.id == source.id) {
                return Err(VizError::msg(format!(
                    "duplicate audio source id `{}`",
                    source.id
                )));
            }
        }

        Ok(Self {
            sources,
            muted: false,
            microphone: None,
            microphone_status: MicrophoneStatus::NotRequested,
        })
    }

    /// Attaches a pending microphone request. Frames proceed without a
    /// microphone until it resolves.
    pub fn request_microphone(&mut self, request: MicrophoneRequest) {
        self.microphone = Some(request);
        self.microphone_status = MicrophoneStatus::Pending;
    }

    pub fn microphone_status(&self) -> MicrophoneStatus {
        self.microphone_status
    }

    pub fn has_microphone(&self) -> bool {
        self.get_source(MICROPHONE_ID).is_some()
    }

    pub fn sources(&self) -> &[AudioAnalysisSource] {
        &self.sources
    }

    /// Looks up a source by id. Absence is a normal state, notably for the
    /// microphone.
    pub fn get_source(&self, id: &str) -> Option<&AudioAnalysisSource> {
        self.sources.iter().find(|source| source.id == id)
    }

    /// Starts the named track. Returns `false` if there is no such track.
    pub fn play(&mut self, id: &str) -> bool {
        self.with_playback(id, |playback| playback.play())
    }

    /// Pauses the named track. Returns `false` if there is no such track.
    pub fn pause(&mut self, id: &str) -> bool {
        self.with_playback(id, |playback| playback.pause())
    }

    /// Pauses every source that has transport controls.
    pub fn pause_all(&mut self) {
        for source in &mut self.sources {
            if let Some(playback) = source.playback_mut() {
                playback.pause();
            }
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Silences every track. Repeated calls are no-ops.
    pub fn mute(&mut self) {
        if self.muted {
            return;
        }
        self.set_track_gain(0.0);
        self.muted = true;
        tracing::debug!("audio muted");
    }

    /// Restores every track to unit gain. Repeated calls are no-ops.
    pub fn unmute(&mut self) {
        if !self.muted {
            return;
        }
        self.set_track_gain(1.0);
        self.muted = false;
        tracing::debug!("audio unmuted");
    }

    /// Applies the mute flag, adopts a resolved microphone and refreshes
    /// every spectrum. Runs every frame, frozen or not.
    pub fn update(&mut self, config: &Config) {
        if config.muted {
            self.mute();
        } else {
            self.unmute();
        }

        self.poll_microphone();

        for source in &mut self.sources {
            source.refresh();
        }
    }

    /// Checks the pending microphone request without blocking. Returns
    /// `true` when the microphone source was added by this call.
    pub fn poll_microphone(&mut self) -> bool {
        let Some(request) = &self.microphone else {
            return false;
        };

        let outcome = match request.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                MicrophoneOutcome::Denied("permission request was abandoned".to_string())
            }
        };
        self.microphone = None;

        match outcome {
            MicrophoneOutcome::Granted(analyser) => {
                self.sources.retain(|source| source.id != MICROPHONE_ID);
                self.sources.push(AudioAnalysisSource::microphone(analyser));
                self.microphone_status = MicrophoneStatus::Available;
                tracing::info!("microphone capture started");
                true
            }
            MicrophoneOutcome::Denied(reason) => {
                self.microphone_status = MicrophoneStatus::Unavailable;
                tracing::warn!(%reason, "continuing without microphone input");
                false
            }
        }
    }

    fn set_track_gain(&mut self, gain: f32) {
        for source in &mut self.sources {
            if !source.is_microphone() {
                source.gain = gain;
            }
        }
    }

    fn with_playback(&mut self, id: &str, action: impl FnOnce(&mut dyn Playback)) -> bool {
        match self
            .sources
            .iter_mut()
            .find(|source| source.id == id)
            .and_then(AudioAnalysisSource::playback_mut)
        {
            Some(playback) => {
                action(playback);
                true
            }
            None => {
                tracing::debug!(id, "no playable audio source");
                false
            }
        }
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("sources", &self.sources)
            .field("muted", &self.muted)
            .field("microphone_status", &self.microphone_status)
            .finish()
    }
}

/// Transport state shared between a [`HeadlessTrack`] and its observers.
#[derive(Debug, Clone, Default)]
pub struct TrackState {
    playing: Arc<AtomicBool>,
    looping: Arc<AtomicBool>,
}

impl TrackState {
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    pub fn is_looping(&self) -> bool {
        self.looping.load(Ordering::Relaxed)
    }
}

/// Playable device without an audio output, used when no playback backend is
/// attached. Its [`TrackState`] lets a signal generator follow the transport.
#[derive(Debug, Default)]
pub struct HeadlessTrack {
    state: TrackState,
}

impl HeadlessTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TrackState {
        self.state.clone()
    }
}

impl Playback for HeadlessTrack {
    fn play(&mut self) {
        self.state.playing.store(true, Ordering::Relaxed);
    }

    fn pause(&mut self) {
        self.state.playing.store(false, Ordering::Relaxed);
    }

    fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    fn set_looping(&mut self, looping: bool) {
        self.state.looping.store(looping, Ordering::Relaxed);
    }
}
