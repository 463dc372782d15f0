//! Playback preview over a single audio locator.
//!
//! State machine: `Loading → Ready ⇄ {Playing, Paused}`, with
//! `Loading → Error` when no duration can be resolved within the timeout
//! window. Retry from `Error` restarts the window; deleting the source is
//! the caller's affordance, not the player's.

use anyhow::Result;
use async_trait::async_trait;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long the duration probe may run before the player gives up.
pub const LOAD_TIMEOUT_MS: u64 = 10_000;

/// Positions closer than this to the end of the track count as "finished".
const END_OF_TRACK_EPSILON_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("audio is not ready (state: {0:?})")]
    NotReady(PlayerState),
    #[error("audio output unavailable: {0}")]
    Output(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Loading,
    Ready,
    Playing,
    Paused,
    Error,
}

/// Seam for resolving a locator's duration. The production implementation
/// decodes the file; tests substitute scripted probes.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<Option<u64>>;
}

pub struct AudioPlayer {
    locator: PathBuf,
    duration_hint_ms: Option<u64>,
    probe: Arc<dyn DurationProbe>,
    state: PlayerState,
    duration_ms: u64,
    position_ms: u64,
    playing_since: Option<Instant>,
    sink: Option<PlaybackSink>,
}

impl AudioPlayer {
    /// A player over `locator`, starting in `Loading`. The hint stands in for
    /// containers that carry no duration metadata (recorded takes pass the
    /// duration they measured); a valid probed duration always wins.
    pub fn new(locator: impl Into<PathBuf>, duration_hint_ms: Option<u64>) -> Self {
        Self::with_probe(locator, duration_hint_ms, Arc::new(super::loader::MediaDurationProbe))
    }

    pub fn with_probe(
        locator: impl Into<PathBuf>,
        duration_hint_ms: Option<u64>,
        probe: Arc<dyn DurationProbe>,
    ) -> Self {
        Self {
            locator: locator.into(),
            duration_hint_ms,
            probe,
            state: PlayerState::Loading,
            duration_ms: 0,
            position_ms: 0,
            playing_since: None,
            sink: None,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn locator(&self) -> &Path {
        &self.locator
    }

    /// Resolved duration; 0 until the player reaches `Ready`.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Current transport position, live while playing.
    pub fn position_ms(&self) -> u64 {
        let base = self.position_ms;
        match self.playing_since {
            Some(since) => {
                (base + since.elapsed().as_millis() as u64).min(self.duration_ms)
            }
            None => base,
        }
    }

    /// Probe the locator, bounded by the timeout window.
    pub async fn load(&mut self) -> PlayerState {
        self.state = PlayerState::Loading;
        self.position_ms = 0;
        self.playing_since = None;
        self.sink = None;

        let probed = tokio::time::timeout(
            Duration::from_millis(LOAD_TIMEOUT_MS),
            self.probe.probe(&self.locator),
        )
        .await;

        self.state = match probed {
            Ok(Ok(Some(ms))) if is_valid_duration(ms) => {
                self.duration_ms = ms;
                PlayerState::Ready
            }
            other => {
                match &other {
                    Ok(Ok(_)) => log::debug!(
                        "No duration metadata in {}",
                        self.locator.display()
                    ),
                    Ok(Err(e)) => log::warn!(
                        "Duration probe failed for {}: {}",
                        self.locator.display(),
                        e
                    ),
                    Err(_) => log::warn!(
                        "Duration probe timed out after {} ms for {}",
                        LOAD_TIMEOUT_MS,
                        self.locator.display()
                    ),
                }
                match self.duration_hint_ms.filter(|&ms| is_valid_duration(ms)) {
                    Some(hint) => {
                        self.duration_ms = hint;
                        PlayerState::Ready
                    }
                    None => PlayerState::Error,
                }
            }
        };
        self.state
    }

    /// Re-probe the same locator. Only meaningful from `Error`; restarts the
    /// timeout window.
    pub async fn retry(&mut self) -> PlayerState {
        if self.state != PlayerState::Error {
            return self.state;
        }
        self.load().await
    }

    pub fn play(&mut self) -> Result<(), PlayerError> {
        match self.state {
            PlayerState::Ready | PlayerState::Paused => {}
            other => return Err(PlayerError::NotReady(other)),
        }
        if self.sink.is_none() {
            let sink = PlaybackSink::open(&self.locator)?;
            sink.seek(Duration::from_millis(self.position_ms));
            self.sink = Some(sink);
        }
        if let Some(sink) = &self.sink {
            sink.play();
        }
        self.playing_since = Some(Instant::now());
        self.state = PlayerState::Playing;
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state != PlayerState::Playing {
            return;
        }
        self.position_ms = self.position_ms();
        self.playing_since = None;
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.state = PlayerState::Paused;
        self.apply_auto_rewind();
    }

    /// Seek to an absolute position, clamped to `[0, duration]`.
    pub fn seek_ms(&mut self, position_ms: u64) -> Result<(), PlayerError> {
        match self.state {
            PlayerState::Ready | PlayerState::Playing | PlayerState::Paused => {}
            other => return Err(PlayerError::NotReady(other)),
        }
        let clamped = position_ms.min(self.duration_ms);
        self.position_ms = clamped;
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
        if let Some(sink) = &self.sink {
            sink.seek(Duration::from_millis(clamped));
        }
        Ok(())
    }

    /// Jump relative to the current position (±10 s from the transport
    /// buttons), clamped to `[0, duration]`.
    pub fn skip_ms(&mut self, delta_ms: i64) -> Result<(), PlayerError> {
        let current = self.position_ms() as i64;
        let target = (current + delta_ms).clamp(0, self.duration_ms as i64);
        self.seek_ms(target as u64)
    }

    /// Fold playback progress back into the state machine: a track that ran
    /// out stops, and a stopped track sitting at the end rewinds to zero.
    pub fn refresh(&mut self) {
        if self.state == PlayerState::Playing && self.position_ms() >= self.duration_ms {
            self.position_ms = self.duration_ms;
            self.playing_since = None;
            if let Some(sink) = &self.sink {
                sink.pause();
            }
            self.state = PlayerState::Paused;
        }
        self.apply_auto_rewind();
    }

    fn apply_auto_rewind(&mut self) {
        if reached_end(
            self.state == PlayerState::Playing,
            self.position_ms,
            self.duration_ms,
        ) {
            self.position_ms = 0;
            if let Some(sink) = &self.sink {
                sink.seek(Duration::ZERO);
            }
        }
    }
}

/// End-of-track detection: within half a second of the duration while not
/// playing.
fn reached_end(playing: bool, position_ms: u64, duration_ms: u64) -> bool {
    !playing
        && position_ms > 0
        && duration_ms > 0
        && duration_ms.saturating_sub(position_ms) < END_OF_TRACK_EPSILON_MS
}

fn is_valid_duration(ms: u64) -> bool {
    ms > 0
}

/// rodio-backed output. Dropping it releases the device and stops playback.
struct PlaybackSink {
    _stream: rodio::OutputStream,
    sink: rodio::Sink,
}

impl PlaybackSink {
    fn open(path: &Path) -> Result<Self, PlayerError> {
        let (stream, handle) = rodio::OutputStream::try_default()
            .map_err(|e| PlayerError::Output(e.to_string()))?;
        let file = std::fs::File::open(path).map_err(|e| PlayerError::Output(e.to_string()))?;
        let source = rodio::Decoder::new(BufReader::new(file))
            .map_err(|e| PlayerError::Output(e.to_string()))?;
        let sink = rodio::Sink::try_new(&handle).map_err(|e| PlayerError::Output(e.to_string()))?;
        sink.append(source);
        sink.pause();
        Ok(Self {
            _stream: stream,
            sink,
        })
    }

    fn play(&self) {
        self.sink.play();
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn seek(&self, position: Duration) {
        if let Err(e) = self.sink.try_seek(position) {
            log::debug!("Seek not supported by this source: {e:?}");
        }
    }
}
