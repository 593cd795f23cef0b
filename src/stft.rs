//! Streaming STFT primitives over circular buffers.
//!
//! Both functions walk `window.len()` (or `frame.len()`) cells starting at
//! `start` and wrap at the end of the ring. Neither moves any cursor.

use rustfft::num_complex::Complex32;

/// Copy one windowed analysis frame out of `ring`.
///
/// - `ring`: circular input buffer, same length as `window`
/// - `start`: index of the oldest sample (the input write cursor)
/// - `window`: analysis window coefficients
/// - `frame_out`: receives `window[i] * ring[start + i]` as real parts
#[inline]
pub fn analysis_frame(ring: &[f32], start: usize, window: &[f32], frame_out: &mut [Complex32]) {
    debug_assert_eq!(ring.len(), window.len());
    debug_assert_eq!(frame_out.len(), window.len());
    let len = ring.len();
    if len == 0 {
        return;
    }
    let mut idx = start % len;
    for (out, &w) in frame_out.iter_mut().zip(window) {
        *out = Complex32::new(w * ring[idx], 0.0);
        idx += 1;
        if idx >= len {
            idx = 0;
        }
    }
}

/// Accumulate `scale * re(frame[i])` into `output` starting at `start`.
///
/// Cells already holding the tail of earlier frames keep their partial sums.
#[inline]
pub fn overlap_add(frame: &[Complex32], scale: f32, start: usize, output: &mut [f32]) {
    let len = output.len();
    if len == 0 {
        return;
    }
    let mut idx = start % len;
    for c in frame {
        output[idx] += c.re * scale;
        idx += 1;
        if idx >= len {
            idx = 0;
        }
    }
}
