//! Spectral modification stage between the forward and inverse transforms.

use rustfft::num_complex::Complex32;

use crate::config::{ModifierKind, ModifierParams};
use crate::stochastic::StochasticModifier;

/// Rewrites one analysed spectrum before it is inverted.
///
/// `spectrum` holds all `fft_size` bins of the forward transform of a real
/// frame. Implementations must leave it conjugate-symmetric so the inverse is
/// real. `prepare` runs at configuration time and may allocate; `modify` runs
/// on the audio thread and must not.
///
/// State carried between frames is kept per channel, so the output of one
/// channel never depends on how frames of other channels interleave with it.
pub trait SpectralModifier: Send {
    /// Size all state for `channels` channels of `fft_size`-point frames and
    /// clear it.
    fn prepare(&mut self, fft_size: usize, channels: usize, sample_rate: f32);

    fn modify(&mut self, channel: usize, spectrum: &mut [Complex32], params: &ModifierParams);

    /// Forget any state carried between frames.
    fn reset(&mut self) {}
}

/// Leaves the spectrum untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bypass;

impl SpectralModifier for Bypass {
    fn prepare(&mut self, _fft_size: usize, _channels: usize, _sample_rate: f32) {}

    fn modify(&mut self, _channel: usize, _spectrum: &mut [Complex32], _params: &ModifierParams) {}
}

/// Build the modifier described by `kind`, seeding any random source with `seed`.
pub fn build(kind: ModifierKind, seed: u64) -> Box<dyn SpectralModifier> {
    match kind {
        ModifierKind::Bypass => Box::new(Bypass),
        ModifierKind::Stochastic(policy) => Box::new(StochasticModifier::seeded(policy, seed)),
    }
}
