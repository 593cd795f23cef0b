//! The resynthesis engine: rings, hop scheduling and the per-frame pipeline.

use std::sync::Arc;

use log::{debug, warn};
use rustfft::num_complex::Complex32;

use crate::config::{validate_fft_size, ConfigError, EngineConfig, FrameConfig, ModifierParams};
use crate::modifier::{self, SpectralModifier};
use crate::params::ControlParams;
use crate::ring::{Cursors, RingBank};
use crate::stft::{analysis_frame, overlap_add};
use crate::transform::{RustFftTransform, Transform};
use crate::window::WindowTable;

/// Multi-channel streaming STFT resynthesizer.
///
/// Every `hop_size` input samples a frame of `fft_size` samples is analysed,
/// passed through the configured [`SpectralModifier`], inverted and
/// overlap-added into the output ring. Output lags input by exactly
/// [`latency_samples`](Self::latency_samples).
///
/// `setup` and `reconfigure` allocate and must not run on the audio thread;
/// `process` does not allocate or lock.
///
/// # Example
/// ```
/// use stocsynth::{EngineConfig, ResynthEngine};
///
/// let mut engine = ResynthEngine::new(EngineConfig::default().with_channels(1)).unwrap();
/// let mut block = vec![0.0f32; 256];
/// engine.process(&mut [&mut block[..]]);
/// assert_eq!(engine.latency_samples(), 2048);
/// ```
pub struct ResynthEngine {
    channels: usize,
    sample_rate: f32,
    frame: FrameConfig,
    hop_size: usize,
    window: WindowTable,
    rings: RingBank,
    transform: Box<dyn Transform>,
    modifier: Box<dyn SpectralModifier>,
    time_frame: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    synth_frame: Vec<Complex32>,
    controls: Arc<ControlParams>,
}

impl ResynthEngine {
    /// Build an engine with the `rustfft` transform and the modifier named in
    /// `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let modifier = modifier::build(config.modifier, config.seed);
        Self::with_modifier(config, modifier)
    }

    /// Build an engine around a caller-supplied modifier. `config.modifier`
    /// and `config.seed` are ignored.
    pub fn with_modifier(
        config: EngineConfig,
        modifier: Box<dyn SpectralModifier>,
    ) -> Result<Self, ConfigError> {
        Self::with_parts(config, Box::new(RustFftTransform::new()), modifier)
    }

    /// Build an engine around a caller-supplied transform and modifier.
    pub fn with_parts(
        config: EngineConfig,
        transform: Box<dyn Transform>,
        modifier: Box<dyn SpectralModifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self {
            channels: 0,
            sample_rate: config.sample_rate,
            frame: config.frame,
            hop_size: 0,
            window: WindowTable::default(),
            rings: RingBank::default(),
            transform,
            modifier,
            time_frame: Vec::new(),
            spectrum: Vec::new(),
            synth_frame: Vec::new(),
            controls: Arc::new(ControlParams::default()),
        };
        engine.setup(config.channels);
        engine.reconfigure(config.frame)?;
        Ok(engine)
    }

    /// Allocate rings for `channel_count` channels. Zero is coerced to one.
    /// Audio in flight and modifier state are discarded.
    pub fn setup(&mut self, channel_count: usize) {
        let channels = if channel_count == 0 {
            warn!("channel count 0 coerced to 1");
            1
        } else {
            channel_count
        };
        self.channels = channels;
        self.rings.resize(channels, self.rings.len());
        self.rings.set_output_write(self.hop_size);
        if self.hop_size > 0 {
            self.modifier.prepare(self.frame.fft_size, channels, self.sample_rate);
        }
        debug!("setup: {channels} channel(s)");
    }

    /// Apply a new frame geometry.
    ///
    /// Rings are reallocated and cleared, the window and its scale factor are
    /// recomputed, the transform is re-planned and the modifier re-prepared.
    /// An `overlap` of zero keeps the previously configured overlap. On error
    /// the engine is left unchanged.
    pub fn reconfigure(&mut self, frame: FrameConfig) -> Result<(), ConfigError> {
        validate_fft_size(frame.fft_size)?;
        let overlap = match frame.overlap {
            0 if self.hop_size == 0 => return Err(ConfigError::InvalidOverlap(0)),
            0 => {
                warn!("overlap 0 ignored, keeping {}", self.frame.overlap);
                self.frame.overlap
            }
            o => o,
        };
        if overlap > frame.fft_size {
            return Err(ConfigError::InvalidOverlap(overlap));
        }
        self.transform.plan(frame.fft_size)?;

        let fft_size = frame.fft_size;
        self.frame = FrameConfig::new(fft_size, overlap, frame.window);
        self.hop_size = fft_size / overlap;
        self.rings.resize(self.channels, fft_size);
        self.rings.set_output_write(self.hop_size);
        self.window.rebuild(frame.window, fft_size, overlap);
        for buf in [
            &mut self.time_frame,
            &mut self.spectrum,
            &mut self.synth_frame,
        ] {
            buf.clear();
            buf.resize(fft_size, Complex32::new(0.0, 0.0));
        }
        self.modifier.prepare(fft_size, self.channels, self.sample_rate);

        debug!(
            "reconfigured: fft_size={} overlap={} hop={} window={:?} scale={:.6} latency={}",
            fft_size,
            overlap,
            self.hop_size,
            frame.window,
            self.window.scale_factor(),
            self.latency_samples()
        );
        Ok(())
    }

    /// Zero all rings and modifier state without reallocating.
    pub fn reset(&mut self) {
        self.rings.clear();
        self.rings.set_output_write(self.hop_size);
        self.modifier.reset();
    }

    pub fn set_stochasticity(&self, value: f32) {
        self.controls.set_stoc_factor(value);
    }

    pub fn set_noise_level(&self, value: f32) {
        self.controls.set_noise_level(value);
    }

    pub fn set_cutoff(&self, hz: f32) {
        self.controls.set_cutoff_hz(hz);
    }

    /// Shared handle for updating controls from another thread.
    pub fn controls(&self) -> Arc<ControlParams> {
        Arc::clone(&self.controls)
    }

    /// Process one block in place.
    ///
    /// `block` holds one slice per channel, all of the same length. Only the
    /// first [`channels`](Self::channels) slices are touched.
    pub fn process(&mut self, block: &mut [&mut [f32]]) {
        let params = self.controls.snapshot();
        let start = self.rings.begin_block();
        let hop = self.hop_size;
        let channels = block.len().min(self.channels);
        debug_assert!(
            block[..channels].windows(2).all(|w| w[0].len() == w[1].len()),
            "channel slices differ in length"
        );

        let mut end = start;
        for (channel, samples) in block.iter_mut().take(channels).enumerate() {
            let mut cursors = start;
            for sample in samples.iter_mut() {
                self.rings.push(channel, &mut cursors, *sample);
                *sample = self.rings.pop(channel, &mut cursors);
                if cursors.tick(hop) {
                    self.run_frame(channel, &mut cursors, &params);
                }
            }
            end = cursors;
        }
        self.rings.commit(end);
    }

    /// Analysis, modification and synthesis for one channel.
    fn run_frame(&mut self, channel: usize, cursors: &mut Cursors, params: &ModifierParams) {
        analysis_frame(
            self.rings.channel(channel).input(),
            cursors.input_write,
            self.window.coefficients(),
            &mut self.time_frame,
        );

        self.spectrum.copy_from_slice(&self.time_frame);
        self.transform.forward(&mut self.spectrum);
        self.modifier.modify(channel, &mut self.spectrum, params);

        self.synth_frame.copy_from_slice(&self.spectrum);
        self.transform.inverse(&mut self.synth_frame);

        overlap_add(
            &self.synth_frame,
            self.window.scale_factor(),
            cursors.output_write,
            self.rings.channel_mut(channel).output_mut(),
        );
        cursors.advance_output_write(self.hop_size, self.rings.len());
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn frame_config(&self) -> FrameConfig {
        self.frame
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn window(&self) -> &WindowTable {
        &self.window
    }

    pub fn window_scale_factor(&self) -> f32 {
        self.window.scale_factor()
    }

    /// Delay between a sample entering and its resynthesis leaving.
    pub fn latency_samples(&self) -> usize {
        self.frame.fft_size
    }

    /// Committed ring cursors, mainly for inspection in tests.
    pub fn cursors(&self) -> Cursors {
        self.rings.cursors()
    }

    /// Ring length per channel.
    pub fn buffer_len(&self) -> usize {
        self.rings.len()
    }
}
