use std::path::Path;

use crate::{
    audio::{AudioAnalysisSource, Playback},
    Result, SpectrumAnalyser, VizError,
};

/// Audio track, looping unless told otherwise. Its id is the file stem, so
/// `assets/content.mp3` becomes `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    pub path: String,
    pub looped: bool,
}

impl AudioAsset {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            looped: true,
        }
    }

    /// File stem of the path, `None` if there is none.
    pub fn id(&self) -> Option<&str> {
        Path::new(&self.path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
    }

    /// Wraps the device playing this asset as an analysed track source,
    /// applying the asset's looping flag.
    pub fn open(
        &self,
        playback: Box<dyn Playback>,
        analyser: Box<dyn SpectrumAnalyser>,
    ) -> Result<AudioAnalysisSource> {
        let id = self.id().ok_or_else(|| self.unnamed())?;
        let mut source = AudioAnalysisSource::track(id, playback, analyser);
        source.set_looping(self.looped);
        Ok(source)
    }

    fn unnamed(&self) -> VizError {
        VizError::msg(format!("audio asset `{}` has no file name", self.path))
    }
}

/// Registry of the audio tracks available at startup, in registration order.
#[derive(Debug, Default)]
pub struct AssetStore {
    tracks: Vec<AudioAsset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    pub fn register_track(&mut self, asset: AudioAsset) -> Result<()> {
        let id = asset.id().ok_or_else(|| asset.unnamed())?;

        if self.track(id).is_some() {
            return Err(VizError::msg(format!("audio track `{id}` is already registered")));
        }
        self.tracks.push(asset);
        Ok(())
    }

    /// Looks up a registered track by id.
    pub fn track(&self, id: &str) -> Option<&AudioAsset> {
        self.tracks.iter().find(|track| track.id() == Some(id))
    }

    pub fn tracks(&self) -> &[AudioAsset] {
        &self.tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::HeadlessTrack;

    struct Silence;

    impl SpectrumAnalyser for Silence {
        fn frequency_bin_count(&self) -> usize {
            2
        }

        fn fill_byte_frequency_data(&mut self, out: &mut [u8]) {
            out.fill(0);
        }
    }

    #[test]
    fn ids_come_from_file_stems() {
        assert_eq!(AudioAsset::new("assets/content.mp3").id(), Some("content"));
        assert_eq!(AudioAsset::new("frustrated.ogg").id(), Some("frustrated"));
        assert_eq!(AudioAsset::new("").id(), None);
    }

    #[test]
    fn resolves_registered_tracks() {
        let mut store = AssetStore::new();
        store.register_track(AudioAsset::new("assets/content.mp3")).unwrap();
        store.register_track(AudioAsset::new("assets/frustrated.mp3")).unwrap();

        assert!(store.track("content").unwrap().looped);
        assert_eq!(store.tracks().len(), 2);
        assert!(store.track("calm").is_none());
    }

    #[test]
    fn errors_on_duplicate_ids() {
        let mut store = AssetStore::new();
        store.register_track(AudioAsset::new("a/content.mp3")).unwrap();

        let err = store.register_track(AudioAsset::new("b/content.wav")).unwrap_err();
        assert!(format!("{err}").contains("content"));
    }

    #[test]
    fn opened_sources_follow_the_looping_flag() {
        let deck = HeadlessTrack::new();
        let state = deck.state();
        let source = AudioAsset::new("assets/content.mp3")
            .open(Box::new(deck), Box::new(Silence))
            .unwrap();
        assert_eq!(source.id(), "content");
        assert!(state.is_looping());

        let deck = HeadlessTrack::new();
        let state = deck.state();
        let once = AudioAsset {
            looped: false,
            ..AudioAsset::new("assets/sting.wav")
        };
        once.open(Box::new(deck), Box::new(Silence)).unwrap();
        assert!(!state.is_looping());

        let err = AudioAsset::new("").open(Box::new(HeadlessTrack::new()), Box::new(Silence));
        assert!(err.is_err());
    }
}
