use std::{f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};

use crate::{Result, VizError};

/// Default analysis window, matching the 512-sample window every source uses.
pub const DEFAULT_FFT_SIZE: usize = 512;
const MIN_FFT_SIZE: usize = 32;
const SMOOTHING_TIME_CONSTANT: f32 = 0.8;
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// Frequency analyser attached to a single audio device.
///
/// Implementations write one byte per frequency bin, where 0 is silence and
/// 255 is the loudest representable magnitude.
pub trait SpectrumAnalyser {
    /// Number of bins produced per snapshot (half the window size).
    fn frequency_bin_count(&self) -> usize;

    /// Overwrites `out` with the current spectrum. `out` is always
    /// [`frequency_bin_count`](Self::frequency_bin_count) long.
    fn fill_byte_frequency_data(&mut self, out: &mut [u8]);
}

/// Software analyser that turns pushed time-domain samples into smoothed byte
/// magnitudes, windowed with a Blackman window and scaled onto a fixed
/// decibel range.
pub struct FftAnalyser {
    size: usize,
    window: Vec<f32>,
    samples: Vec<f32>,
    smoothed: Vec<f32>,
    plan: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl FftAnalyser {
    /// Creates an analyser with the default window size.
    pub fn new() -> Self {
        Self::build(DEFAULT_FFT_SIZE)
    }

    /// Creates an analyser with an explicit window size. The size must be a
    /// power of two of at least 32 samples.
    pub fn with_fft_size(size: usize) -> Result<Self> {
        if size < MIN_FFT_SIZE || !size.is_power_of_two() {
            return Err(VizError::InvalidInput(
                "fft size must be a power of two of at least 32",
            ));
        }
        Ok(Self::build(size))
    }

    fn build(size: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(size);
        let input = plan.make_input_vec();
        let spectrum = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();
        Self {
            size,
            window: (0..size).map(|i| blackman_value(i, size)).collect(),
            samples: vec![0.0; size],
            smoothed: vec![0.0; size / 2],
            plan,
            input,
            spectrum,
            scratch,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.size
    }

    /// Appends samples to the sliding window, keeping only the most recent
    /// `fft_size` of them.
    pub fn push_samples(&mut self, samples: &[f32]) {
        if samples.len() >= self.size {
            self.samples
                .copy_from_slice(&samples[samples.len() - self.size..]);
            return;
        }

        let keep = self.size - samples.len();
        self.samples.copy_within(samples.len().., 0);
        self.samples[keep..].copy_from_slice(samples);
    }

    fn analyse(&mut self) -> Result<()> {
        for ((slot, sample), weight) in self
            .input
            .iter_mut()
            .zip(self.samples.iter())
            .zip(self.window.iter())
        {
            *slot = sample * weight;
        }

        self.plan
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)?;

        let scale = 1.0 / self.size as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(self.spectrum.iter()) {
            let magnitude = bin.norm() * scale;
            *smoothed =
                SMOOTHING_TIME_CONSTANT * *smoothed + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;
        }
        Ok(())
    }
}

impl Default for FftAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyser for FftAnalyser {
    fn frequency_bin_count(&self) -> usize {
        self.size / 2
    }

    fn fill_byte_frequency_data(&mut self, out: &mut [u8]) {
        if let Err(err) = self.analyse() {
            tracing::warn!(%err, "spectrum refresh failed, reporting silence");
            out.fill(0);
            return;
        }

        for (byte, magnitude) in out.iter_mut().zip(self.smoothed.iter()) {
            *byte = magnitude_to_byte(*magnitude);
        }
    }
}

impl fmt::Debug for FftAnalyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftAnalyser")
            .field("size", &self.size)
            .finish()
    }
}

/// Arithmetic mean of a byte spectrum. Empty spectra average to zero.
pub fn average_volume(spectrum: &[u8]) -> f32 {
    if spectrum.is_empty() {
        return 0.0;
    }
    let total: u32 = spectrum.iter().map(|&value| u32::from(value)).sum();
    total as f32 / spectrum.len() as f32
}

fn magnitude_to_byte(magnitude: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let decibels = 20.0 * magnitude.log10();
    let scaled = 255.0 / (MAX_DECIBELS - MIN_DECIBELS) * (decibels - MIN_DECIBELS);
    scaled.clamp(0.0, 255.0) as u8
}

fn blackman_value(index: usize, len: usize) -> f32 {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    let x = index as f32 / len as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}
