use anyhow::{anyhow, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

/// Write mono f32 samples to a WAV file.
pub fn save_wav_file(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    if samples.is_empty() {
        return Err(anyhow!("Nothing to save, sample buffer is empty"));
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)
        .map_err(|e| anyhow!("Failed to create WAV file {}: {}", path.display(), e))?;

    for &sample in samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    Ok(())
}
