pub mod audio_toolkit;
pub mod chatbot;
pub mod editor;
pub mod generation;
mod http;
pub mod managers;
pub mod settings;
pub mod signature;
pub mod storage;
pub mod utils;

pub use audio_toolkit::{AudioPlayer, PlayerState};
pub use chatbot::{ChatAnswer, ChatAnswerSource, ChatbotClient, ChatbotError, IndexedDocument};
pub use editor::TranscriptEditor;
pub use generation::{
    ActaComposer, AttachedFile, AudioSource, ComposeError, GenerationError, GenerationRequest,
    HttpMinutesGenerator, MinutesGenerator, PickedKind,
};
pub use managers::audio::{
    CaptureBackend, MicrophoneBackend, RecorderError, RecordingManager, RecordingResult,
};
pub use managers::minutes::{Acta, ActaStatus, FlowError, MinutesManager, ReviewFlow};
pub use settings::{CommunityContext, Settings};
pub use signature::SignaturePad;
pub use storage::ActaStorage;
