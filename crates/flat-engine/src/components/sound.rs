use std::path::{Path, PathBuf};

use crate::api::types::SoundId;
use crate::audio::{AudioBackend, PlaybackHandle};
use crate::components::tags::Tags;

/// A sound asset registered with the world.
///
/// Playback only works while the sound is loaded (see
/// [`World::load_sound`](crate::core::world::World::load_sound)).
#[derive(Debug, Clone)]
pub struct Sound {
    pub id: SoundId,
    pub path: PathBuf,
    pub looping: bool,
    tags: Tags,
    pub(crate) loaded: bool,
    playback: Option<PlaybackHandle>,
}

impl Sound {
    pub fn new(id: SoundId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
            looping: false,
            tags: Tags::new(),
            loaded: false,
            playback: None,
        }
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.tag(tag);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// Start (or restart) playback. Returns `false` when the sound is not loaded
    /// or the backend refused.
    pub fn play(&mut self, audio: &dyn AudioBackend) -> bool {
        if !self.loaded {
            return false;
        }

        if let Some(handle) = self.playback.take() {
            audio.stop(handle);
        }

        match audio.play(&self.path, self.looping) {
            Ok(handle) => {
                self.playback = Some(handle);
                true
            }
            Err(err) => {
                log::warn!("sound {:?}: {}", self.id, err);
                false
            }
        }
    }

    /// Stop playback. Returns `false` when not loaded or not playing.
    pub fn stop(&mut self, audio: &dyn AudioBackend) -> bool {
        if !self.loaded {
            return false;
        }
        match self.playback.take() {
            Some(handle) => {
                audio.stop(handle);
                true
            }
            None => false,
        }
    }

    // -- Tags --

    pub fn tag(&mut self, tag: &str) -> bool {
        self.tags.tag(tag)
    }

    pub fn tagged(&self, tag: &str) -> bool {
        self.tags.tagged(tag)
    }

    pub fn untag(&mut self, tag: &str) -> bool {
        self.tags.untag(tag)
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }
}
