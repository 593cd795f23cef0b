use clap::ValueEnum;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;
use std::error::Error;
use std::path::Path;
use stocsynth::{ConfigError, EngineConfig, ResynthEngine, WindowType};

/// Window names accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowArg {
    Rectangular,
    Bartlett,
    Hann,
    Hamming,
}

impl From<WindowArg> for WindowType {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Rectangular => WindowType::Rectangular,
            WindowArg::Bartlett => WindowType::Bartlett,
            WindowArg::Hann => WindowType::Hann,
            WindowArg::Hamming => WindowType::Hamming,
        }
    }
}

/// Deinterleaved audio plus its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Audio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl Audio {
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

/// Read a WAV file. Integer samples are scaled to `[-1, 1]`.
pub fn read_audio(path: &Path) -> Result<Audio, Box<dyn Error>> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<_, _>>()?
        }
    };
    let count = usize::from(spec.channels.max(1));
    let mut channels = vec![Vec::with_capacity(interleaved.len() / count); count];
    for frame in interleaved.chunks(count) {
        for (ch, &s) in channels.iter_mut().zip(frame) {
            ch.push(s);
        }
    }
    Ok(Audio {
        channels,
        sample_rate: spec.sample_rate,
    })
}

/// Write `audio` as 32-bit float WAV.
pub fn write_wav(path: &Path, audio: &Audio) -> Result<(), Box<dyn Error>> {
    let spec = WavSpec {
        channels: audio.channels.len() as u16,
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for i in 0..audio.frames() {
        for ch in &audio.channels {
            writer.write_sample(ch[i])?;
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Run `input` through a freshly built engine, `block_size` frames at a time.
///
/// `fft_size` zeros are appended so the tail is flushed, and the first
/// `fft_size` output samples are dropped so the result lines up with the
/// input.
pub fn render(
    input: &Audio,
    config: EngineConfig,
    configure: impl FnOnce(&ResynthEngine),
    block_size: usize,
) -> Result<Audio, ConfigError> {
    let config = config
        .with_channels(input.channels.len())
        .with_sample_rate(input.sample_rate as f32);
    let mut engine = ResynthEngine::new(config)?;
    configure(&engine);

    let latency = engine.latency_samples();
    let frames = input.frames();
    let total = frames + latency;
    let block_size = block_size.max(1);
    info!(
        "rendering {} frame(s), {} channel(s), latency {}",
        frames,
        input.channels.len(),
        latency
    );

    let mut padded: Vec<Vec<f32>> = input
        .channels
        .iter()
        .map(|ch| {
            let mut v = ch.clone();
            v.resize(total, 0.0);
            v
        })
        .collect();
    let mut start = 0;
    while start < total {
        let end = (start + block_size).min(total);
        let mut block: Vec<&mut [f32]> = padded.iter_mut().map(|ch| &mut ch[start..end]).collect();
        engine.process(&mut block);
        start = end;
    }

    let channels = padded
        .into_iter()
        .map(|ch| ch[latency..].to_vec())
        .collect();
    Ok(Audio {
        channels,
        sample_rate: input.sample_rate,
    })
}
