//! Envelope and phase-curve helpers shared by the spectral modifiers.

use core::f32::consts::{PI, TAU};

use rustfft::num_complex::Complex32;

/// Magnitude in decibels. Silent bins are floored at `f32::MIN_POSITIVE`
/// so the result stays finite.
#[inline]
pub fn magnitude_db(c: Complex32) -> f32 {
    20.0 * c.norm().max(f32::MIN_POSITIVE).log10()
}

/// Four-point cubic blend between `y1` (at `t = 0`) and `y2` (at `t = 1`).
#[inline]
pub fn cubic_interpolation(y0: f32, y1: f32, y2: f32, y3: f32, t: f32) -> f32 {
    let a0 = y3 - y2 - y0 + y1;
    let a1 = y0 - y1 - a0;
    let a2 = y2 - y0;
    let a3 = y1;
    ((a0 * t + a1) * t + a2) * t + a3
}

/// Stretch `src` over `dst` with [`cubic_interpolation`].
///
/// The first and last points of both curves coincide and neighbours are
/// clamped at the edges. Positions are computed in integers, so equal
/// lengths copy exactly.
pub fn resample_cubic(src: &[f32], dst: &mut [f32]) {
    let (s, d) = (src.len(), dst.len());
    if s == 0 {
        dst.fill(0.0);
        return;
    }
    if s == 1 || d == 1 {
        dst.fill(src[0]);
        return;
    }
    let span_src = s - 1;
    let span_dst = d - 1;
    for (i, out) in dst.iter_mut().enumerate() {
        let num = i * span_src;
        let idx = num / span_dst;
        let rem = num % span_dst;
        if rem == 0 {
            *out = src[idx];
            continue;
        }
        let t = rem as f32 / span_dst as f32;
        let y0 = src[idx.saturating_sub(1)];
        let y1 = src[idx];
        let y2 = src[idx + 1];
        let y3 = src[(idx + 2).min(span_src)];
        *out = cubic_interpolation(y0, y1, y2, y3, t);
    }
}

/// Unwrap a phase curve in place so that no step between neighbours exceeds π.
pub fn unwrap_phase(phase: &mut [f32]) {
    let Some(&first) = phase.first() else {
        return;
    };
    let mut prev_raw = first;
    let mut prev_out = first;
    for p in phase.iter_mut().skip(1) {
        let raw = *p;
        let diff = raw - prev_raw;
        let step = if diff.abs() <= PI {
            diff
        } else {
            let wrapped = (diff + PI).rem_euclid(TAU) - PI;
            if wrapped == -PI && diff > 0.0 {
                PI
            } else {
                wrapped
            }
        };
        prev_out += step;
        *p = prev_out;
        prev_raw = raw;
    }
}

/// Hann-shaped low-pass response over the first `window_size` bins.
///
/// `cutoff` is the normalized corner (1.0 = Nyquist). Bins at normalized
/// frequency `f = k / window_size` follow `0.5 * (1 - cos(2π f / cutoff))`
/// up to the corner and are zero above it and beyond `window_size`.
pub fn lowpass_kernel(cutoff: f32, window_size: usize, out: &mut [f32]) {
    out.fill(0.0);
    if window_size == 0 || cutoff <= 0.0 || !cutoff.is_finite() {
        return;
    }
    for (k, w) in out.iter_mut().enumerate().take(window_size) {
        let f = k as f32 / window_size as f32;
        if f <= cutoff {
            *w = 0.5 * (1.0 - (TAU * f / cutoff).cos());
        }
    }
}
