//! # stocsynth - Real-time stochastic spectral resynthesis
//!
//! A streaming STFT engine that replaces every analysis frame with a smoothed
//! ("stochastic") magnitude envelope and a synthetic, low-pass shaped phase,
//! then rebuilds audio by overlap-add. The result keeps the broad timbre of
//! the input while discarding fine spectral detail and phase coherence.
//!
//! ## Features
//!
//! - **Block-size independent**: frames fire every `hop_size` samples no matter
//!   how the host slices its callbacks
//! - **Real-time safe processing**: all buffers are sized at configuration time;
//!   `process` does no allocation or locking
//! - **Pluggable spectral stage**: any [`SpectralModifier`], with
//!   [`StochasticModifier`] and [`Bypass`] built in
//! - **Windows**: Rectangular, Bartlett, Hann, Hamming
//! - **Deterministic**: the phase noise comes from a seedable generator
//!
//! ## Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Ring buffers and hop scheduling | [`ring`] |
//! | Windowed analysis / overlap-add | [`stft`], [`window`] |
//! | Forward / inverse DFT | [`transform`] |
//! | Envelope decimation, phase shaping | [`stochastic`], [`envelope`] |
//! | Orchestration | [`engine`] |
//!
//! ## Example
//!
//! ```
//! use stocsynth::{EngineConfig, FrameConfig, ResynthEngine, WindowType};
//!
//! let config = EngineConfig::default()
//!     .with_channels(2)
//!     .with_sample_rate(48_000.0)
//!     .with_frame(FrameConfig::new(1024, 4, WindowType::Hann))
//!     .with_seed(7);
//! let mut engine = ResynthEngine::new(config).unwrap();
//! engine.set_stochasticity(0.3);
//! engine.set_cutoff(1_500.0);
//!
//! let mut left = vec![0.0f32; 480];
//! let mut right = vec![0.0f32; 480];
//! engine.process(&mut [&mut left[..], &mut right[..]]);
//! ```
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or https://www.apache.org/licenses/LICENSE-2.0)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or https://opensource.org/licenses/MIT)
//!
//! at your option.

/// Engine configuration, limits and errors
pub mod config;

/// The streaming resynthesis engine
///
/// Owns the rings, window, transform and modifier of one processing instance.
pub mod engine;

/// Magnitude, interpolation and phase-unwrapping helpers
pub mod envelope;

/// Spectral modifier trait and the identity modifier
pub mod modifier;

/// Lock-free continuous controls
pub mod params;

/// Per-channel circular buffers and hop scheduling
pub mod ring;

/// Windowed analysis and overlap-add over circular buffers
pub mod stft;

/// Decimated-envelope, shaped-phase resynthesis
pub mod stochastic;

/// Forward/inverse DFT seam
pub mod transform;

/// Analysis windows
pub mod window;

pub use config::{
    AmplitudePolicy, ConfigError, EngineConfig, FrameConfig, ModifierKind, ModifierParams,
    PhasePolicy, StochasticPolicy, MAX_FFT_SIZE, MIN_FFT_SIZE,
};
pub use engine::ResynthEngine;
pub use modifier::{Bypass, SpectralModifier};
pub use params::ControlParams;
pub use rustfft::num_complex::{Complex, Complex32};
pub use stochastic::StochasticModifier;
pub use transform::{RustFftTransform, Transform};
pub use window::{WindowTable, WindowType};
