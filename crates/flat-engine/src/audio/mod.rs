//! Audio collaborator boundary.
//!
//! The engine only tracks which sounds are loaded and whether they are playing;
//! decoding and output belong to an [`AudioBackend`] supplied by the host.

use std::path::Path;

use crate::error::AudioError;

/// Opaque handle to a playing sound, issued by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(pub u64);

pub trait AudioBackend {
    /// Start playing a file. A looping sound repeats until stopped.
    fn play(&self, path: &Path, looping: bool) -> Result<PlaybackHandle, AudioError>;

    fn stop(&self, handle: PlaybackHandle);
}
