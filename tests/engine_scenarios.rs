use std::f32::consts::TAU;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stocsynth::{
    Complex32, EngineConfig, FrameConfig, ModifierKind, ModifierParams, ResynthEngine,
    RustFftTransform, SpectralModifier, StochasticModifier, StochasticPolicy, Transform,
    WindowType,
};

const SR: f32 = 44_100.0;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn mono(fft_size: usize, window: WindowType, modifier: ModifierKind, seed: u64) -> ResynthEngine {
    init_logger();
    let config = EngineConfig::default()
        .with_channels(1)
        .with_sample_rate(SR)
        .with_frame(FrameConfig::new(fft_size, 4, window))
        .with_modifier(modifier)
        .with_seed(seed);
    ResynthEngine::new(config).unwrap()
}

fn run_blocks(engine: &mut ResynthEngine, input: &[f32], block: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(input.len());
    for chunk in input.chunks(block) {
        let mut buf = chunk.to_vec();
        engine.process(&mut [&mut buf[..]]);
        out.extend_from_slice(&buf);
    }
    out
}

fn white_noise(len: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn output_peak_bin(cycles_per_frame: f32) -> usize {
    let n = 256;
    let mut engine = mono(n, WindowType::Hann, ModifierKind::default(), 1);
    engine.set_stochasticity(1.0);
    engine.set_noise_level(0.0);
    let input: Vec<f32> = (0..n * 12)
        .map(|t| (TAU * cycles_per_frame * t as f32 / n as f32).sin())
        .collect();
    let output = run_blocks(&mut engine, &input, 64);

    let hann = WindowType::Hann.generate(n);
    let mut frame: Vec<Complex32> = output[n * 8..n * 9]
        .iter()
        .zip(&hann)
        .map(|(s, w)| Complex32::new(s * w, 0.0))
        .collect();
    let mut fft = RustFftTransform::new();
    fft.plan(n).unwrap();
    fft.forward(&mut frame);
    (1..=n / 2)
        .max_by(|&a, &b| frame[a].norm().total_cmp(&frame[b].norm()))
        .unwrap()
}

#[test]
fn sine_keeps_its_spectral_peak() {
    for bin in [8usize, 9, 10, 14, 21, 30] {
        let peak = output_peak_bin(bin as f32);
        assert!(
            (peak as isize - bin as isize).abs() <= 1,
            "input bin {} came back at {}",
            bin,
            peak
        );
    }
}

#[test]
fn sine_between_bins_keeps_its_peak() {
    let peak = output_peak_bin(12.5);
    assert!(peak == 12 || peak == 13, "peak at bin {}", peak);
}

#[test]
fn silent_noise_is_seed_independent() {
    let input = white_noise(4096, 3);
    let mut outputs = Vec::new();
    for seed in [1u64, 99] {
        let mut engine = mono(512, WindowType::Hann, ModifierKind::default(), seed);
        engine.set_noise_level(0.0);
        outputs.push(run_blocks(&mut engine, &input, 128));
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn same_seed_same_output() {
    let input = white_noise(4096, 4);
    let render = || {
        let mut engine = mono(512, WindowType::Hann, ModifierKind::default(), 42);
        engine.set_noise_level(0.8);
        run_blocks(&mut engine, &input, 100)
    };
    assert_eq!(render(), render());
}

#[test]
fn zero_stochasticity_flattens_spectrum() {
    let n = 512;
    let mut modifier = StochasticModifier::seeded(StochasticPolicy::default(), 5);
    modifier.prepare(n, 1, SR);
    let mut spectrum: Vec<Complex32> = white_noise(n, 6)
        .into_iter()
        .map(|s| Complex32::new(s, 0.0))
        .collect();
    let mut fft = RustFftTransform::new();
    fft.plan(n).unwrap();
    fft.forward(&mut spectrum);

    let params = ModifierParams {
        stoc_factor: 0.0,
        noise_level: 0.0,
        cutoff_hz: 2000.0,
    };
    modifier.modify(0, &mut spectrum, &params);
    let reference = spectrum[0].norm();
    for (k, c) in spectrum.iter().enumerate() {
        assert!(
            (c.norm() - reference).abs() <= reference * 1e-4,
            "bin {}: {} vs {}",
            k,
            c.norm(),
            reference
        );
    }
}

#[test]
fn output_is_independent_of_block_size() {
    let input = white_noise(3000, 7);
    let render = |block: usize| {
        let mut engine = mono(256, WindowType::Hann, ModifierKind::default(), 11);
        engine.set_noise_level(0.3);
        engine.set_stochasticity(0.4);
        run_blocks(&mut engine, &input, block)
    };
    let reference = render(512);
    assert_eq!(render(1), reference);
    assert_eq!(render(7), reference);
}

#[test]
fn stereo_bypass_is_independent_of_block_size() {
    let left = white_noise(2000, 8);
    let right = white_noise(2000, 9);
    let render = |block: usize| {
        let config = EngineConfig::default()
            .with_frame(FrameConfig::new(128, 4, WindowType::Hamming))
            .with_modifier(ModifierKind::Bypass);
        let mut engine = ResynthEngine::new(config).unwrap();
        let mut out = (Vec::new(), Vec::new());
        for (l, r) in left.chunks(block).zip(right.chunks(block)) {
            let (mut l, mut r) = (l.to_vec(), r.to_vec());
            engine.process(&mut [&mut l[..], &mut r[..]]);
            out.0.extend_from_slice(&l);
            out.1.extend_from_slice(&r);
        }
        out
    };
    let reference = render(333);
    assert_eq!(render(1), reference);
    assert_eq!(render(64), reference);
}

fn render_stereo(
    left: &[f32],
    right: &[f32],
    block: usize,
    noise_level: f32,
) -> (Vec<f32>, Vec<f32>) {
    init_logger();
    let config = EngineConfig::default()
        .with_frame(FrameConfig::new(256, 4, WindowType::Hann))
        .with_seed(5);
    let mut engine = ResynthEngine::new(config).unwrap();
    engine.set_noise_level(noise_level);
    let mut out = (Vec::new(), Vec::new());
    for (l, r) in left.chunks(block).zip(right.chunks(block)) {
        let (mut l, mut r) = (l.to_vec(), r.to_vec());
        engine.process(&mut [&mut l[..], &mut r[..]]);
        out.0.extend_from_slice(&l);
        out.1.extend_from_slice(&r);
    }
    out
}

#[test]
fn stereo_stochastic_is_independent_of_block_size() {
    let left = white_noise(3000, 15);
    let right = white_noise(3000, 16);
    let reference = render_stereo(&left, &right, 512, 0.5);
    assert_eq!(render_stereo(&left, &right, 64, 0.5), reference);
    assert_eq!(render_stereo(&left, &right, 1, 0.5), reference);
}

#[test]
fn identical_channels_stay_identical_without_noise() {
    let input = white_noise(3000, 17);
    let (left, right) = render_stereo(&input, &input, 100, 0.0);
    assert_eq!(left, right);
}

#[test]
fn stereo_channels_get_their_own_noise() {
    let input = white_noise(3000, 18);
    let (left, right) = render_stereo(&input, &input, 100, 0.5);
    assert_ne!(left, right);
}

#[test]
fn hann_bypass_has_unity_gain() {
    let n = 256;
    let mut engine = mono(n, WindowType::Hann, ModifierKind::Bypass, 0);
    let input = white_noise(n * 8, 10);
    let output = run_blocks(&mut engine, &input, 97);
    assert_eq!(engine.latency_samples(), n);
    for i in 0..input.len() - n {
        assert!(
            (output[i + n] - input[i]).abs() < 5e-3,
            "sample {}: {} vs {}",
            i,
            output[i + n],
            input[i]
        );
    }
}

#[test]
fn bartlett_bypass_is_exact_delay() {
    let n = 128;
    let mut engine = mono(n, WindowType::Bartlett, ModifierKind::Bypass, 0);
    let input = white_noise(n * 6, 12);
    let output = run_blocks(&mut engine, &input, 50);
    for i in 0..input.len() - n {
        assert!((output[i + n] - input[i]).abs() < 1e-4);
    }
}

#[test]
fn controls_can_be_driven_from_another_thread() {
    let mut engine = mono(256, WindowType::Hann, ModifierKind::default(), 0);
    let controls = engine.controls();
    thread::spawn(move || {
        controls.set_stoc_factor(0.25);
        controls.set_noise_level(0.5);
        controls.set_cutoff_hz(500.0);
    })
    .join()
    .unwrap();

    let snapshot = engine.controls().snapshot();
    assert_eq!(snapshot.stoc_factor, 0.25);
    assert_eq!(snapshot.noise_level, 0.5);
    assert_eq!(snapshot.cutoff_hz, 500.0);

    let mut block = white_noise(1024, 13);
    engine.process(&mut [&mut block[..]]);
    assert!(block.iter().all(|s| s.is_finite()));
}

#[test]
fn reconfigure_changes_latency() {
    let mut engine = mono(256, WindowType::Hann, ModifierKind::default(), 0);
    engine
        .reconfigure(FrameConfig::new(1024, 8, WindowType::Hamming))
        .unwrap();
    assert_eq!(engine.latency_samples(), 1024);
    assert_eq!(engine.hop_size(), 128);
    let mut block = white_noise(2048, 14);
    engine.process(&mut [&mut block[..]]);
    assert!(block.iter().all(|s| s.is_finite()));
}
