mod capture;
mod playback;
mod resampler;
mod store;

pub(crate) use resampler::Resampler;

pub use {
    capture::{AudioCapturer, CaptureErrorFn},
    playback::{ClipPlayer, PlaybackState},
    store::{AudioClip, ClipId, ClipStore},
};
