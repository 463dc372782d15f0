pub mod audio;

pub use audio::{
    list_input_devices, AudioPlayer, AudioRecorder, CapturedAudio, CpalDeviceInfo, DurationProbe,
    MediaDurationProbe, PlayerState,
};
