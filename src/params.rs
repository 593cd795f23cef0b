//! Continuous controls shared between a control thread and the audio thread.
//!
//! Each value is an `f32` stored as bits in an `AtomicU32`. One writer and one
//! reader are expected; a reader may see a value from the previous block,
//! which is harmless for these perceptual controls.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::ModifierParams;

#[derive(Debug)]
pub struct ControlParams {
    stoc_factor: AtomicU32,
    noise_level: AtomicU32,
    cutoff_hz: AtomicU32,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self::new(ModifierParams::default())
    }
}

impl ControlParams {
    pub fn new(initial: ModifierParams) -> Self {
        Self {
            stoc_factor: AtomicU32::new(initial.stoc_factor.clamp(0.0, 1.0).to_bits()),
            noise_level: AtomicU32::new(initial.noise_level.max(0.0).to_bits()),
            cutoff_hz: AtomicU32::new(initial.cutoff_hz.max(0.0).to_bits()),
        }
    }

    /// Fraction of the spectrum kept before re-interpolation, clamped to `[0, 1]`.
    /// Non-finite values are ignored.
    pub fn set_stoc_factor(&self, value: f32) {
        if value.is_finite() {
            store(&self.stoc_factor, value.clamp(0.0, 1.0));
        }
    }

    pub fn set_noise_level(&self, value: f32) {
        if value.is_finite() {
            store(&self.noise_level, value.max(0.0));
        }
    }

    pub fn set_cutoff_hz(&self, value: f32) {
        if value.is_finite() {
            store(&self.cutoff_hz, value.max(0.0));
        }
    }

    pub fn stoc_factor(&self) -> f32 {
        load(&self.stoc_factor)
    }

    pub fn noise_level(&self) -> f32 {
        load(&self.noise_level)
    }

    pub fn cutoff_hz(&self) -> f32 {
        load(&self.cutoff_hz)
    }

    /// Read all three controls once, for the duration of a block.
    pub fn snapshot(&self) -> ModifierParams {
        ModifierParams {
            stoc_factor: self.stoc_factor(),
            noise_level: self.noise_level(),
            cutoff_hz: self.cutoff_hz(),
        }
    }
}

#[inline]
fn store(cell: &AtomicU32, value: f32) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}

#[inline]
fn load(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn defaults_match_modifier_params() {
        assert_eq!(ControlParams::default().snapshot(), ModifierParams::default());
    }

    #[test]
    fn setters_clamp_and_ignore_nan() {
        let p = ControlParams::default();
        p.set_stoc_factor(3.0);
        assert_eq!(p.stoc_factor(), 1.0);
        p.set_stoc_factor(-1.0);
        assert_eq!(p.stoc_factor(), 0.0);
        p.set_noise_level(f32::NAN);
        assert_eq!(p.noise_level(), 0.05);
        p.set_cutoff_hz(f32::INFINITY);
        assert_eq!(p.cutoff_hz(), 2000.0);
        p.set_cutoff_hz(-5.0);
        assert_eq!(p.cutoff_hz(), 0.0);
    }

    #[test]
    fn visible_across_threads() {
        let p = Arc::new(ControlParams::default());
        let writer = Arc::clone(&p);
        thread::spawn(move || writer.set_noise_level(0.08))
            .join()
            .unwrap();
        assert_eq!(p.noise_level(), 0.08);
    }
}
