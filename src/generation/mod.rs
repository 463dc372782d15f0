mod client;
mod composer;

pub use client::{GenerationError, GenerationRequest, HttpMinutesGenerator, MinutesGenerator};
pub use composer::{ActaComposer, AttachedFile, AudioSource, ComposeError, PickedKind};
