use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rodio::Source;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::player::DurationProbe;

/// Probe the playable duration of an audio file in milliseconds.
/// Strategy:
/// - WAV: read the header with hound (cheap and exact)
/// - otherwise prefer Symphonia container metadata (frame count / rate)
/// - if the container reports nothing, decode with rodio and take the
///   decoder's own duration estimate
///
/// `Ok(None)` means the file decodes but carries no derivable duration
/// (true for some recorded containers); the caller falls back to its hint.
pub fn probe_duration_ms(path: &Path) -> Result<Option<u64>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if ext == "wav" {
        let reader = hound::WavReader::open(path)
            .map_err(|e| anyhow!("Failed to open WAV {}: {}", path.display(), e))?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Ok(None);
        }
        return Ok(Some(
            reader.duration() as u64 * 1000 / spec.sample_rate as u64,
        ));
    }

    // Try Symphonia first; fall back to rodio for containers it rejects.
    match probe_with_symphonia(path) {
        Ok(Some(ms)) => Ok(Some(ms)),
        Ok(None) => probe_with_rodio(path),
        Err(e) => {
            log::warn!(
                "Symphonia probe failed for {}: {} — trying rodio",
                path.display(),
                e
            );
            probe_with_rodio(path)
        }
    }
}

fn probe_with_symphonia(path: &Path) -> Result<Option<u64>> {
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let file = File::open(path)
        .map_err(|e| anyhow!("Failed to open file {}: {}", path.display(), e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| anyhow!("Symphonia probe failed: {}", e))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| anyhow!("No supported audio tracks"))?;

    let params = &track.codec_params;
    match (params.n_frames, params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => Ok(Some(frames * 1000 / rate as u64)),
        _ => Ok(None),
    }
}

fn probe_with_rodio(path: &Path) -> Result<Option<u64>> {
    let file = File::open(path)
        .map_err(|e| anyhow!("Failed to open file {}: {}", path.display(), e))?;
    let decoder = rodio::Decoder::new(BufReader::new(file))
        .map_err(|e| anyhow!("Failed to decode audio {}: {}", path.display(), e))?;
    Ok(decoder
        .total_duration()
        .map(|d| d.as_millis().min(u64::MAX as u128) as u64))
}

/// The production probe: `probe_duration_ms` moved off the event loop.
pub struct MediaDurationProbe;

#[async_trait]
impl DurationProbe for MediaDurationProbe {
    async fn probe(&self, path: &Path) -> Result<Option<u64>> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || probe_duration_ms(&path))
            .await
            .map_err(|e| anyhow!("Duration probe task panicked: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_test_wav(path: &Path, seconds: u32) {
        let samples = vec![0.0f32; (16_000 * seconds) as usize];
        crate::audio_toolkit::audio::save_wav_file(path, &samples, 16_000).unwrap();
    }

    #[test]
    fn test_probe_wav_duration() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("one_second.wav");
        write_test_wav(&path, 1);

        let ms = probe_duration_ms(&path).unwrap();
        assert_eq!(ms, Some(1000));
    }

    #[test]
    fn test_probe_missing_file() {
        assert!(probe_duration_ms(Path::new("/nonexistent/audio.mp3")).is_err());
    }
}
