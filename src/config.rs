//! Engine configuration, limits and the configuration error type.

use core::fmt;

use crate::window::WindowType;

/// Smallest accepted frame length. The phase kernel spans `fft_size / 2 - 1`
/// bins, which must not be empty.
pub const MIN_FFT_SIZE: usize = 4;

/// Largest accepted frame length.
pub const MAX_FFT_SIZE: usize = 16384;

/// Default reference sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

/// Errors returned while building or reconfiguring an engine.
///
/// The audio path never fails; every error surfaces at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Frame length is not a power of two inside `[MIN_FFT_SIZE, MAX_FFT_SIZE]`.
    InvalidFftSize(usize),
    /// Overlap factor is zero (with no previous value to fall back on) or
    /// larger than the frame length.
    InvalidOverlap(usize),
    /// Sample rate is not a finite positive number.
    InvalidSampleRate,
    /// The transform backend could not be planned for this length.
    TransformUnavailable(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFftSize(n) => write!(
                f,
                "fft size {n} must be a power of two between {MIN_FFT_SIZE} and {MAX_FFT_SIZE}"
            ),
            Self::InvalidOverlap(o) => write!(f, "overlap factor {o} is out of range"),
            Self::InvalidSampleRate => f.write_str("sample rate must be finite and positive"),
            Self::TransformUnavailable(n) => write!(f, "no transform available for size {n}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Frame geometry: transform length, overlap factor and analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    pub fft_size: usize,
    /// Number of overlapping frames; `hop_size = fft_size / overlap`.
    pub overlap: usize,
    pub window: WindowType,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            overlap: 4,
            window: WindowType::Hann,
        }
    }
}

impl FrameConfig {
    pub fn new(fft_size: usize, overlap: usize, window: WindowType) -> Self {
        Self {
            fft_size,
            overlap,
            window,
        }
    }

    /// Check the frame length and overlap factor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_fft_size(self.fft_size)?;
        if self.overlap == 0 || self.overlap > self.fft_size {
            return Err(ConfigError::InvalidOverlap(self.overlap));
        }
        Ok(())
    }

    /// Samples between consecutive frames, or `None` when `overlap` is zero.
    pub fn hop_size(&self) -> Option<usize> {
        self.fft_size.checked_div(self.overlap)
    }

    /// Number of non-redundant bins of a real frame.
    pub fn bins(&self) -> usize {
        self.fft_size / 2 + 1
    }
}

pub(crate) fn validate_fft_size(fft_size: usize) -> Result<(), ConfigError> {
    if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
        return Err(ConfigError::InvalidFftSize(fft_size));
    }
    Ok(())
}

/// How the modified phase is produced for each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PhasePolicy {
    /// Low-pass shaped noise on the decimated grid, interpolated and unwrapped.
    #[default]
    Shaped,
    /// Unshaped uniform phase increments on every bin, then unwrapped.
    RandomWalk,
}

/// How the linear amplitude of each bin is derived from the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AmplitudePolicy {
    /// `exp(env / 20)`.
    #[default]
    Envelope,
    /// `exp(env / 20)` plus a small noise term weighted by the phase kernel.
    EnvelopePlusNoise,
}

/// Tuning of the stochastic modifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticPolicy {
    pub phase: PhasePolicy,
    pub amplitude: AmplitudePolicy,
    /// Modulus applied to the per-bin residual phase after each frame.
    pub residual_wrap: f32,
}

impl Default for StochasticPolicy {
    fn default() -> Self {
        Self {
            phase: PhasePolicy::Shaped,
            amplitude: AmplitudePolicy::Envelope,
            residual_wrap: core::f32::consts::TAU,
        }
    }
}

/// Which spectral modifier an engine is built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModifierKind {
    /// Identity: the analysed spectrum is resynthesised unchanged.
    Bypass,
    Stochastic(StochasticPolicy),
}

impl Default for ModifierKind {
    fn default() -> Self {
        Self::Stochastic(StochasticPolicy::default())
    }
}

/// Continuous controls read by the modifier at each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifierParams {
    /// Fraction of the spectrum kept before re-interpolation, in `[0, 1]`.
    pub stoc_factor: f32,
    /// Phase-noise amplitude before the fixed attenuation.
    pub noise_level: f32,
    /// Corner of the phase-noise low-pass kernel in Hz.
    pub cutoff_hz: f32,
}

impl Default for ModifierParams {
    fn default() -> Self {
        Self {
            stoc_factor: 0.5,
            noise_level: 0.05,
            cutoff_hz: 2000.0,
        }
    }
}

/// Everything needed to build a [`ResynthEngine`](crate::engine::ResynthEngine).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub channels: usize,
    pub sample_rate: f32,
    pub frame: FrameConfig,
    pub modifier: ModifierKind,
    /// Seed for the modifier's random source.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: DEFAULT_SAMPLE_RATE,
            frame: FrameConfig::default(),
            modifier: ModifierKind::default(),
            seed: 0,
        }
    }
}

impl EngineConfig {
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_frame(mut self, frame: FrameConfig) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_modifier(mut self, modifier: ModifierKind) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate);
        }
        self.frame.validate()
    }
}
