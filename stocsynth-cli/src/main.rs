use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use stocsynth::{
    AmplitudePolicy, EngineConfig, FrameConfig, ModifierKind, PhasePolicy, StochasticPolicy,
};
use stocsynth_cli::{read_audio, render, write_wav, WindowArg};

/// Render a WAV file through the stochastic resynthesis engine.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Path to the input WAV file
    input: PathBuf,

    /// Path of the 32-bit float WAV to write
    output: PathBuf,

    /// Frame length, a power of two
    #[arg(long, default_value_t = 2048)]
    fft_size: usize,

    /// Number of overlapping frames per frame length
    #[arg(long, default_value_t = 4)]
    overlap: usize,

    /// Analysis window
    #[arg(long, value_enum, default_value_t = WindowArg::Hann)]
    window: WindowArg,

    /// Fraction of the spectrum kept before re-interpolation
    #[arg(long, default_value_t = 0.5)]
    stoc_factor: f32,

    /// Phase noise amount
    #[arg(long, default_value_t = 0.05)]
    noise_level: f32,

    /// Phase noise low-pass corner in Hz
    #[arg(long, default_value_t = 2000.0)]
    cutoff: f32,

    /// Seed for the phase noise
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Samples handed to the engine per call
    #[arg(long, default_value_t = 512)]
    block_size: usize,

    /// Resynthesise without modifying the spectrum
    #[arg(long)]
    bypass: bool,

    /// Use unshaped per-bin phase increments
    #[arg(long)]
    random_walk: bool,

    /// Add kernel-weighted noise to each bin's amplitude
    #[arg(long)]
    add_amplitude_noise: bool,
}

impl Args {
    fn modifier(&self) -> ModifierKind {
        if self.bypass {
            return ModifierKind::Bypass;
        }
        ModifierKind::Stochastic(StochasticPolicy {
            phase: if self.random_walk {
                PhasePolicy::RandomWalk
            } else {
                PhasePolicy::Shaped
            },
            amplitude: if self.add_amplitude_noise {
                AmplitudePolicy::EnvelopePlusNoise
            } else {
                AmplitudePolicy::Envelope
            },
            ..StochasticPolicy::default()
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let input = read_audio(&args.input)?;

    let config = EngineConfig::default()
        .with_frame(FrameConfig::new(
            args.fft_size,
            args.overlap,
            args.window.into(),
        ))
        .with_modifier(args.modifier())
        .with_seed(args.seed);
    let output = render(
        &input,
        config,
        |engine| {
            engine.set_stochasticity(args.stoc_factor);
            engine.set_noise_level(args.noise_level);
            engine.set_cutoff(args.cutoff);
        },
        args.block_size,
    )?;

    write_wav(&args.output, &output)?;
    println!("Saved {}", args.output.display());
    Ok(())
}
