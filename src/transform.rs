//! Complex forward/inverse DFT used by the engine.

use std::sync::Arc;

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

use crate::config::ConfigError;

/// A planned, fixed-length complex transform pair.
///
/// `plan` may allocate; `forward` and `inverse` must not.
pub trait Transform: Send {
    /// Prepare both directions for frames of length `size`.
    fn plan(&mut self, size: usize) -> Result<(), ConfigError>;

    /// Length the transform is currently planned for (0 before planning).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// In-place forward DFT, unnormalized.
    fn forward(&mut self, buffer: &mut [Complex32]);

    /// In-place inverse DFT, scaled by `1 / len` so that
    /// `inverse(forward(x)) == x`.
    fn inverse(&mut self, buffer: &mut [Complex32]);
}

/// [`Transform`] backed by `rustfft` plans.
#[derive(Default)]
pub struct RustFftTransform {
    forward: Option<Arc<dyn Fft<f32>>>,
    inverse: Option<Arc<dyn Fft<f32>>>,
    scratch: Vec<Complex32>,
    size: usize,
}

impl RustFftTransform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for RustFftTransform {
    fn plan(&mut self, size: usize) -> Result<(), ConfigError> {
        if size == 0 || !size.is_power_of_two() {
            return Err(ConfigError::TransformUnavailable(size));
        }
        if size == self.size {
            return Ok(());
        }
        let mut planner = FftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        self.scratch = vec![Complex32::new(0.0, 0.0); scratch_len];
        self.forward = Some(forward);
        self.inverse = Some(inverse);
        self.size = size;
        Ok(())
    }

    fn len(&self) -> usize {
        self.size
    }

    fn forward(&mut self, buffer: &mut [Complex32]) {
        debug_assert_eq!(buffer.len(), self.size);
        if let Some(fft) = &self.forward {
            fft.process_with_scratch(buffer, &mut self.scratch);
        }
    }

    fn inverse(&mut self, buffer: &mut [Complex32]) {
        debug_assert_eq!(buffer.len(), self.size);
        if let Some(fft) = &self.inverse {
            fft.process_with_scratch(buffer, &mut self.scratch);
            let norm = 1.0 / self.size as f32;
            for c in buffer.iter_mut() {
                *c *= norm;
            }
        }
    }
}
