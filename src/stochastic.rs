//! Stochastic resynthesis: decimated magnitude envelope plus shaped phase.
//!
//! Each frame the modifier
//!
//! 1. converts bins `0..=N/2` to decibels,
//! 2. keeps the first `round((N/2 + 1) * stoc_factor)` of them,
//! 3. stretches that coarse envelope back over all bins with a cubic blend,
//! 4. builds a phase curve: the analysed phase of the kept bins plus low-pass
//!    shaped noise accumulated per bin, or an unshaped random walk per bin,
//! 5. interpolates and unwraps the phase,
//! 6. writes `amp * e^{iθ}` into the lower half and its conjugate into the
//!    upper half of the spectrum.
//!
//! Fine spectral detail is lost below full stochasticity, and phase coherence
//! erodes as the noise level rises.

use core::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rustfft::num_complex::Complex32;

use crate::config::{AmplitudePolicy, ModifierParams, PhasePolicy, StochasticPolicy};
use crate::envelope::{lowpass_kernel, magnitude_db, resample_cubic, unwrap_phase};
use crate::modifier::SpectralModifier;

/// Fixed attenuation applied to `noise_level` before it scales phase noise.
pub const NOISE_ATTENUATION: f32 = 0.1;

/// Number of coarse envelope points kept for `bins` bins at `stoc_factor`.
///
/// Always at least one and never more than `bins`.
pub fn decimated_len(bins: usize, stoc_factor: f32) -> usize {
    let kept = (bins as f32 * stoc_factor).round();
    if kept.is_nan() {
        return 1;
    }
    (kept as usize).clamp(1, bins.max(1))
}

/// Seed of the generator owned by `channel`.
#[inline]
fn channel_seed(seed: u64, channel: usize) -> u64 {
    seed ^ channel as u64
}

#[inline]
fn wrap_residual(theta: f32, wrap: f32) -> f32 {
    if wrap > 0.0 && wrap.is_finite() {
        theta.rem_euclid(wrap)
    } else {
        theta
    }
}

/// Random source and accumulated phase noise of one channel.
struct ChannelState<R> {
    rng: R,
    residual: Vec<f32>,
}

pub struct StochasticModifier<R = StdRng> {
    policy: StochasticPolicy,
    seed: u64,
    channels: Vec<ChannelState<R>>,
    fft_size: usize,
    sample_rate: f32,
    mag_db: Vec<f32>,
    coarse: Vec<f32>,
    envelope: Vec<f32>,
    coarse_phase: Vec<f32>,
    phase: Vec<f32>,
    kernel: Vec<f32>,
    kernel_cutoff: f32,
}

impl StochasticModifier<StdRng> {
    /// Modifier whose channels draw from `StdRng`s derived from `seed`.
    pub fn seeded(policy: StochasticPolicy, seed: u64) -> Self {
        Self::with_seed(policy, seed)
    }
}

impl<R: RngCore + SeedableRng + Send> StochasticModifier<R> {
    /// Channel `c` draws from `R::seed_from_u64(seed ^ c)`. Generators are
    /// created by `prepare` and re-seeded by `reset`.
    pub fn with_seed(policy: StochasticPolicy, seed: u64) -> Self {
        Self {
            policy,
            seed,
            channels: Vec::new(),
            fft_size: 0,
            sample_rate: 0.0,
            mag_db: Vec::new(),
            coarse: Vec::new(),
            envelope: Vec::new(),
            coarse_phase: Vec::new(),
            phase: Vec::new(),
            kernel: Vec::new(),
            kernel_cutoff: f32::NAN,
        }
    }

    pub fn policy(&self) -> StochasticPolicy {
        self.policy
    }

    /// Number of channels the modifier was prepared for.
    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// Accumulated phase noise of `channel`, one value per bin.
    pub fn residual(&self, channel: usize) -> &[f32] {
        &self.channels[channel].residual
    }

    /// Magnitudes in dB of the last analysed frame.
    pub fn magnitudes_db(&self) -> &[f32] {
        &self.mag_db
    }

    /// Re-interpolated envelope of the last frame, in dB.
    pub fn envelope(&self) -> &[f32] {
        &self.envelope
    }

    /// Unwrapped phase of the last frame.
    pub fn phase(&self) -> &[f32] {
        &self.phase
    }

    /// Current phase-noise low-pass kernel.
    pub fn kernel(&self) -> &[f32] {
        &self.kernel
    }

    fn bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    fn fresh_channel(&self, channel: usize) -> ChannelState<R> {
        ChannelState {
            rng: R::seed_from_u64(channel_seed(self.seed, channel)),
            residual: vec![0.0; self.bins()],
        }
    }

    fn analyse_envelope(&mut self, spectrum: &[Complex32], kept: usize) {
        for (db, c) in self.mag_db.iter_mut().zip(spectrum) {
            *db = magnitude_db(*c);
        }
        self.coarse[..kept].copy_from_slice(&self.mag_db[..kept]);
        resample_cubic(&self.coarse[..kept], &mut self.envelope);
    }

    fn refresh_kernel(&mut self, cutoff_hz: f32) {
        if cutoff_hz == self.kernel_cutoff {
            return;
        }
        let nyquist = self.sample_rate * 0.5;
        let normalized = if nyquist > 0.0 { cutoff_hz / nyquist } else { 0.0 };
        let window_size = self.fft_size / 2 - 1;
        lowpass_kernel(normalized, window_size, &mut self.kernel);
        self.kernel_cutoff = cutoff_hz;
    }

    /// Analysed phase of the kept bins plus this channel's accumulated noise,
    /// stretched over all bins.
    fn shaped_phase(
        &mut self,
        channel: usize,
        spectrum: &[Complex32],
        kept: usize,
        noise_scale: f32,
    ) {
        let last = self.bins() - 1;
        let wrap = self.policy.residual_wrap;
        let coarse = &mut self.coarse_phase[..kept];
        for (p, c) in coarse.iter_mut().zip(spectrum) {
            *p = c.arg();
        }
        unwrap_phase(coarse);

        let state = &mut self.channels[channel];
        for (j, p) in coarse.iter_mut().enumerate() {
            let bin = if kept > 1 {
                (j * last + (kept - 1) / 2) / (kept - 1)
            } else {
                0
            };
            let u: f32 = state.rng.gen();
            let theta = state.residual[bin] + TAU * u * noise_scale * self.kernel[bin];
            state.residual[bin] = wrap_residual(theta, wrap);
            *p += theta;
        }
        resample_cubic(coarse, &mut self.phase);
        unwrap_phase(&mut self.phase);
    }

    fn random_walk_phase(&mut self, channel: usize) {
        let state = &mut self.channels[channel];
        for (residual, phase) in state.residual.iter_mut().zip(self.phase.iter_mut()) {
            let u: f32 = state.rng.gen();
            *residual = (*residual + TAU * u).rem_euclid(TAU);
            *phase = *residual;
        }
        unwrap_phase(&mut self.phase);
    }

    fn recombine(&mut self, channel: usize, spectrum: &mut [Complex32], noise_scale: f32) {
        let n = self.fft_size;
        let half = n / 2;
        let rng = &mut self.channels[channel].rng;
        for k in 0..=half {
            let mut amp = (self.envelope[k] / 20.0).exp();
            if self.policy.amplitude == AmplitudePolicy::EnvelopePlusNoise {
                let u: f32 = rng.gen();
                amp += u * noise_scale * self.kernel[k];
            }
            let (sin, cos) = self.phase[k].sin_cos();
            spectrum[k] = Complex32::new(amp * cos, amp * sin);
            if k > 0 && k < half {
                spectrum[n - k] = Complex32::new(amp * cos, -amp * sin);
            }
        }
    }
}

impl<R: RngCore + SeedableRng + Send> SpectralModifier for StochasticModifier<R> {
    fn prepare(&mut self, fft_size: usize, channels: usize, sample_rate: f32) {
        let bins = fft_size / 2 + 1;
        self.fft_size = fft_size;
        self.sample_rate = sample_rate;
        for buf in [
            &mut self.mag_db,
            &mut self.coarse,
            &mut self.envelope,
            &mut self.coarse_phase,
            &mut self.phase,
            &mut self.kernel,
        ] {
            buf.clear();
            buf.resize(bins, 0.0);
        }
        self.channels = (0..channels.max(1))
            .map(|c| self.fresh_channel(c))
            .collect();
        self.kernel_cutoff = f32::NAN;
    }

    fn modify(&mut self, channel: usize, spectrum: &mut [Complex32], params: &ModifierParams) {
        if self.fft_size < 4 || spectrum.len() != self.fft_size || channel >= self.channels.len() {
            debug_assert!(
                false,
                "modifier not prepared for channel {} of {} bins",
                channel,
                spectrum.len()
            );
            return;
        }
        let kept = decimated_len(self.bins(), params.stoc_factor);
        let noise_scale = params.noise_level * NOISE_ATTENUATION;

        self.analyse_envelope(spectrum, kept);
        self.refresh_kernel(params.cutoff_hz);
        match self.policy.phase {
            PhasePolicy::Shaped => self.shaped_phase(channel, spectrum, kept, noise_scale),
            PhasePolicy::RandomWalk => self.random_walk_phase(channel),
        }
        self.recombine(channel, spectrum, noise_scale);
    }

    fn reset(&mut self) {
        for c in 0..self.channels.len() {
            self.channels[c] = self.fresh_channel(c);
        }
    }
}
