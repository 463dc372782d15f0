//! Microphone capture into an in-memory mono buffer.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Samples captured by a finished recording, at the device's native rate.
#[derive(Debug, Clone)]
pub struct CapturedAudio {
    /// Mono samples (multi-channel input is downmixed in the capture callback).
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Push-to-record microphone recorder.
///
/// Lifecycle: `open` resolves the device, `start` builds the input stream and
/// begins capturing, `stop` tears the stream down and drains the buffer,
/// `close` releases the device. The elapsed-duration counter is refreshed
/// from the capture callback itself, so `duration_ms` is always current.
pub struct AudioRecorder {
    device: Option<Device>,
    stream: Option<Stream>,
    samples: Arc<Mutex<Vec<f32>>>,
    recorded_ms: Arc<AtomicU64>,
    sample_rate: u32,
}

impl AudioRecorder {
    pub fn new() -> Self {
        Self {
            device: None,
            stream: None,
            samples: Arc::new(Mutex::new(Vec::new())),
            recorded_ms: Arc::new(AtomicU64::new(0)),
            sample_rate: 0,
        }
    }

    /// Resolve the capture device. `None` selects the host default; failing
    /// to find one is how a denied/absent microphone surfaces on desktop.
    pub fn open(&mut self, device: Option<Device>) -> Result<()> {
        let device = match device {
            Some(d) => d,
            None => cpal::default_host().default_input_device().ok_or_else(|| {
                anyhow!("No input device available (microphone missing or access denied)")
            })?,
        };
        log::debug!(
            "Recorder opened on device: {}",
            device.name().unwrap_or_else(|_| "<unnamed>".into())
        );
        self.device = Some(device);
        Ok(())
    }

    /// Begin capturing. Clears any samples from a previous take.
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| anyhow!("Recorder not opened"))?;

        let supported = device
            .default_input_config()
            .map_err(|e| anyhow!("No usable input config: {}", e))?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.config();
        let channels = config.channels as usize;
        self.sample_rate = config.sample_rate.0;

        self.samples.lock().unwrap().clear();
        self.recorded_ms.store(0, Ordering::Relaxed);

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(
                device,
                &config,
                channels,
                self.samples.clone(),
                self.recorded_ms.clone(),
            ),
            SampleFormat::I16 => build_stream::<i16>(
                device,
                &config,
                channels,
                self.samples.clone(),
                self.recorded_ms.clone(),
            ),
            SampleFormat::U16 => build_stream::<u16>(
                device,
                &config,
                channels,
                self.samples.clone(),
                self.recorded_ms.clone(),
            ),
            other => Err(anyhow!("Unsupported sample format: {:?}", other)),
        }?;

        stream
            .play()
            .map_err(|e| anyhow!("Failed to start capture stream: {}", e))?;
        self.stream = Some(stream);
        log::info!("Recording started at {} Hz", self.sample_rate);
        Ok(())
    }

    /// Stop capturing and hand back everything recorded since `start`.
    pub fn stop(&mut self) -> Result<CapturedAudio> {
        if self.stream.take().is_none() {
            return Err(anyhow!("Recorder is not capturing"));
        }
        let samples = std::mem::take(&mut *self.samples.lock().unwrap());
        log::info!(
            "Recording stopped: {} samples ({} ms)",
            samples.len(),
            self.recorded_ms.load(Ordering::Relaxed)
        );
        Ok(CapturedAudio {
            samples,
            sample_rate: self.sample_rate,
        })
    }

    /// Release the device.
    pub fn close(&mut self) {
        self.stream = None;
        self.device = None;
    }

    pub fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }

    /// Milliseconds captured so far, live while recording.
    pub fn duration_ms(&self) -> u64 {
        self.recorded_ms.load(Ordering::Relaxed)
    }
}

impl Default for AudioRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AudioRecorder {
    fn drop(&mut self) {
        // Dropping the cpal stream releases the microphone.
        self.close();
    }
}

/// Build an input stream that downmixes to mono and keeps the duration
/// counter current from inside the audio callback.
fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    channels: usize,
    samples: Arc<Mutex<Vec<f32>>>,
    recorded_ms: Arc<AtomicU64>,
) -> Result<Stream>
where
    T: cpal::Sample + cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let sample_rate = config.sample_rate.0 as u64;
    let error_count = Arc::new(AtomicU64::new(0));

    let err_fn = {
        let error_count = error_count.clone();
        move |err| {
            // ALSA emits periodic non-fatal buffer errors; report the first,
            // suppress the rest.
            if error_count.fetch_add(1, Ordering::Relaxed) == 0 {
                log::warn!("Audio stream error (non-fatal, further ones suppressed): {err}");
            }
        }
    };

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let mut buf = samples.lock().unwrap();
            for frame in data.chunks(channels.max(1)) {
                let mut acc = 0.0f32;
                for &s in frame {
                    let converted: f32 = cpal::Sample::from_sample(s);
                    acc += converted;
                }
                buf.push(acc / frame.len() as f32);
            }
            if sample_rate > 0 {
                recorded_ms.store(buf.len() as u64 * 1000 / sample_rate, Ordering::Relaxed);
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
