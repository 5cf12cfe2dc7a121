//! In-memory registry of captured audio clips.
//!
//! Plays the role a browser's object-URL table plays for `MediaRecorder`
//! blobs: captured data goes in once, comes back out as an opaque revocable
//! handle. Clips are reference-counted, so a player holding an `Arc` to a
//! clip keeps the audio alive even after the handle is revoked — revocation
//! only prevents new lookups.

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, info};
use uuid::Uuid;

/// Opaque, revocable handle to captured audio data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(Uuid);

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One captured clip: mono f32 samples at the capture rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Mono PCM samples.
    pub samples: Vec<f32>,
    /// Rate the samples were captured at.
    pub sample_rate: u32,
}

/// Registry mapping clip handles to audio data.
#[derive(Debug, Default)]
pub struct ClipStore {
    clips: HashMap<ClipId, Arc<AudioClip>>,
}

impl ClipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register captured samples and return a handle to them.
    pub fn insert(&mut self, samples: Vec<f32>, sample_rate: u32) -> ClipId {
        let id = ClipId(Uuid::new_v4());
        debug!(clip = %id, sample_count = samples.len(), sample_rate, "Clip stored");
        self.clips.insert(
            id,
            Arc::new(AudioClip {
                samples,
                sample_rate,
            }),
        );
        id
    }

    /// Look up a clip by handle.
    pub fn get(&self, id: ClipId) -> Option<Arc<AudioClip>> {
        self.clips.get(&id).cloned()
    }

    /// Free a handle. Returns `false` if the handle was already revoked,
    /// so callers can assert each clip is revoked exactly once.
    pub fn revoke(&mut self, id: ClipId) -> bool {
        let removed = self.clips.remove(&id).is_some();
        if removed {
            info!(clip = %id, "Clip revoked");
        } else {
            debug!(clip = %id, "Revoke of unknown clip ignored");
        }
        removed
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Whether the store holds no live handles.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
