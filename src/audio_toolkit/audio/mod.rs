// Re-export all audio components
mod device;
mod loader;
mod player;
mod recorder;
mod utils;

pub use device::{list_input_devices, CpalDeviceInfo};
pub use loader::{probe_duration_ms, MediaDurationProbe};
pub use player::{AudioPlayer, DurationProbe, PlayerError, PlayerState, LOAD_TIMEOUT_MS};
pub use recorder::{AudioRecorder, CapturedAudio};
pub use utils::save_wav_file;
