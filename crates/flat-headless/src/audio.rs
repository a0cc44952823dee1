use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use flat_engine::{AudioBackend, AudioError, PlaybackHandle};

/// Audio backend that outputs nothing and only tracks which handles are live.
#[derive(Default)]
pub struct NullAudio {
    next: AtomicU64,
    /// Reject files that don't exist on disk.
    check_files: bool,
    active: Mutex<Vec<PlaybackHandle>>,
}

impl NullAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checking_files() -> Self {
        Self {
            check_files: true,
            ..Self::default()
        }
    }

    /// Handles started and not stopped yet.
    pub fn active(&self) -> Vec<PlaybackHandle> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AudioBackend for NullAudio {
    fn play(&self, path: &Path, looping: bool) -> Result<PlaybackHandle, AudioError> {
        if self.check_files && !path.exists() {
            return Err(AudioError::NotFound(path.display().to_string()));
        }
        let handle = PlaybackHandle(self.next.fetch_add(1, Ordering::Relaxed));
        log::debug!("play {} (looping: {}) -> {:?}", path.display(), looping, handle);
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
        Ok(handle)
    }

    fn stop(&self, handle: PlaybackHandle) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|h| *h != handle);
    }
}
