//! Analysis windows and the overlap-add normalization factor.

use core::f32::consts::PI;

/// Supported analysis windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    Rectangular,
    Bartlett,
    #[default]
    Hann,
    Hamming,
}

impl WindowType {
    pub const ALL: [WindowType; 4] = [
        WindowType::Rectangular,
        WindowType::Bartlett,
        WindowType::Hann,
        WindowType::Hamming,
    ];

    /// Coefficient at `index` of a symmetric window of length `len`.
    pub fn coefficient(self, index: usize, len: usize) -> f32 {
        if len <= 1 {
            return 1.0;
        }
        let x = index as f32 / (len - 1) as f32;
        match self {
            WindowType::Rectangular => 1.0,
            WindowType::Bartlett => 1.0 - (2.0 * x - 1.0).abs(),
            WindowType::Hann => raised_cosine(0.5, 0.5, x),
            WindowType::Hamming => raised_cosine(0.54, 0.46, x),
        }
    }

    /// Overwrite `out` with this window.
    pub fn fill(self, out: &mut [f32]) {
        let len = out.len();
        for (i, w) in out.iter_mut().enumerate() {
            *w = self.coefficient(i, len);
        }
    }

    pub fn generate(self, len: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; len];
        self.fill(&mut out);
        out
    }
}

#[inline]
fn raised_cosine(a: f32, b: f32, x: f32) -> f32 {
    a - b * (2.0 * PI * x).cos()
}

/// Generate a rectangular window of length `len`.
pub fn rectangular(len: usize) -> Vec<f32> {
    WindowType::Rectangular.generate(len)
}

/// Generate a Bartlett (triangular) window of length `len`.
pub fn bartlett(len: usize) -> Vec<f32> {
    WindowType::Bartlett.generate(len)
}

/// Generate a symmetric Hann window of length `len`.
pub fn hann(len: usize) -> Vec<f32> {
    WindowType::Hann.generate(len)
}

/// Generate a symmetric Hamming window of length `len`.
pub fn hamming(len: usize) -> Vec<f32> {
    WindowType::Hamming.generate(len)
}

/// Gain applied to each inverse frame so that `overlap` summed copies of the
/// analysis window restore unity gain.
///
/// Returns `0.0` when `overlap` is zero or the window sums to zero, which
/// mutes the output instead of dividing by zero.
pub fn window_scale_factor(window: &[f32], overlap: usize) -> f32 {
    let sum: f32 = window.iter().sum();
    if overlap == 0 || sum == 0.0 {
        return 0.0;
    }
    1.0 / overlap as f32 / sum * window.len() as f32
}

/// Window coefficients for the configured frame plus their overlap-add scale.
#[derive(Debug, Clone, Default)]
pub struct WindowTable {
    kind: WindowType,
    coefficients: Vec<f32>,
    scale_factor: f32,
}

impl WindowTable {
    pub fn new(kind: WindowType, len: usize, overlap: usize) -> Self {
        let mut table = Self::default();
        table.rebuild(kind, len, overlap);
        table
    }

    /// Recompute coefficients and scale, reusing the allocation when possible.
    pub fn rebuild(&mut self, kind: WindowType, len: usize, overlap: usize) {
        self.kind = kind;
        self.coefficients.resize(len, 0.0);
        kind.fill(&mut self.coefficients);
        self.scale_factor = window_scale_factor(&self.coefficients, overlap);
    }

    pub fn kind(&self) -> WindowType {
        self.kind
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann() {
        let w = hann(8);
        assert_eq!(w.len(), 8);
        assert!(w[0].abs() < 1e-6);
        assert!(w[7].abs() < 1e-6);
        assert!((w[3] - w[4]).abs() < 1e-6);
    }

    #[test]
    fn test_hamming_endpoints() {
        let w = hamming(16);
        assert!((w[0] - 0.08).abs() < 1e-6);
        assert!((w[15] - 0.08).abs() < 1e-6);
    }

    #[test]
    fn test_bartlett_peak() {
        let w = bartlett(9);
        assert!((w[4] - 1.0).abs() < 1e-6);
        assert!(w[0].abs() < 1e-6);
        assert!((w[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_single_sample_windows() {
        for kind in WindowType::ALL {
            assert_eq!(kind.generate(1), vec![1.0]);
            assert!(kind.generate(0).is_empty());
        }
    }

    #[test]
    fn test_scale_factor_rectangular() {
        let w = rectangular(64);
        assert!((window_scale_factor(&w, 4) - 0.25).abs() < 1e-7);
        assert!((window_scale_factor(&w, 1) - 1.0).abs() < 1e-7);
    }

    #[test]
    fn test_scale_factor_degenerate() {
        assert_eq!(window_scale_factor(&[0.0; 8], 4), 0.0);
        assert_eq!(window_scale_factor(&[1.0; 8], 0), 0.0);
    }

    #[test]
    fn test_table_rebuild_reuses_storage() {
        let mut table = WindowTable::new(WindowType::Hann, 32, 4);
        assert_eq!(table.len(), 32);
        table.rebuild(WindowType::Rectangular, 16, 2);
        assert_eq!(table.len(), 16);
        assert_eq!(table.kind(), WindowType::Rectangular);
        assert!((table.scale_factor() - 0.5).abs() < 1e-7);
    }
}
