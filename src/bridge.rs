//! Lock-Free Thread Bridges
//!
//! The metering callback runs on the host's audio-processing context while
//! parameter and topology changes happen on the main thread. The two sides
//! share nothing but single-word atomics: the media play state and the
//! latest level frame. A few frames of staleness on either side is
//! acceptable; tearing is not, which is why every shared value is one
//! atomic word.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use serde::{Deserialize, Serialize};

/// Atomic f64 for lock-free communication between threads
///
/// Uses AtomicU64 internally since there's no native AtomicF64.
/// Suitable for real-time audio thread communication.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    /// Create a new atomic f64 with the given initial value
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Get the current value
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Set a new value
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clone for AtomicF64 {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

/// Shared "media is currently playing" flag
///
/// Set from the main thread on play/pause events of the underlying media
/// element, read by the metering callback. Distinct from the
/// enabled/bypass flag: a paused source silences the meters even while the
/// chain stays patched in.
#[derive(Debug, Default)]
pub struct PlayState(AtomicBool);

impl PlayState {
    /// Create a new play state, initially paused unless `playing` is set
    pub fn new(playing: bool) -> Self {
        Self(AtomicBool::new(playing))
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, playing: bool) {
        self.0.store(playing, Ordering::Relaxed);
    }
}

/// One metering callback's worth of level readings, in decibels
///
/// Ephemeral by contract: produced once per frame, published through the
/// [`LevelBridge`], and overwritten by the next frame. Never queued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
pub struct LevelFrame {
    /// Output level derived from the sampled frame
    pub output_db: f64,
    /// Gain reduction read live from the compressor endpoint
    pub reduction_db: f64,
}

impl LevelFrame {
    /// The frame reported while the media source is not playing
    pub const fn silent() -> Self {
        Self {
            output_db: 0.0,
            reduction_db: 0.0,
        }
    }
}

impl Default for LevelFrame {
    fn default() -> Self {
        Self::silent()
    }
}

/// Latest-value meter bridge between the audio callback and the UI
///
/// The audio side publishes, the UI side polls. Last write wins; there is
/// no history and no blocking on either side.
#[derive(Debug, Default)]
pub struct LevelBridge {
    output_db: AtomicF64,
    reduction_db: AtomicF64,
}

impl LevelBridge {
    /// Create a bridge reporting silence
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a frame's readings (audio-callback side)
    pub fn publish(&self, frame: LevelFrame) {
        self.output_db.set(frame.output_db);
        self.reduction_db.set(frame.reduction_db);
    }

    /// Read the most recently published readings (UI side)
    pub fn levels(&self) -> LevelFrame {
        LevelFrame {
            output_db: self.output_db.get(),
            reduction_db: self.reduction_db.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_atomic_f64() {
        let a = AtomicF64::new(3.5);
        assert!((a.get() - 3.5).abs() < 0.001);

        a.set(2.5);
        assert!((a.get() - 2.5).abs() < 0.001);
    }

    #[test]
    fn test_atomic_f64_preserves_infinities() {
        let a = AtomicF64::new(f64::NEG_INFINITY);
        assert!(a.get().is_infinite());
        assert!(a.get() < 0.0);
    }

    #[test]
    fn test_play_state_flips() {
        let playing = PlayState::new(false);
        assert!(!playing.get());

        playing.set(true);
        assert!(playing.get());
    }

    #[test]
    fn test_play_state_thread_safe() {
        let playing = Arc::new(PlayState::new(false));
        let writer = Arc::clone(&playing);

        std::thread::spawn(move || {
            writer.set(true);
        })
        .join()
        .unwrap();

        assert!(playing.get());
    }

    #[test]
    fn test_level_bridge_latest_wins() {
        let bridge = LevelBridge::new();
        assert_eq!(bridge.levels(), LevelFrame::silent());

        bridge.publish(LevelFrame {
            output_db: -12.0,
            reduction_db: -3.0,
        });
        bridge.publish(LevelFrame {
            output_db: -6.0,
            reduction_db: -9.0,
        });

        let levels = bridge.levels();
        assert_eq!(levels.output_db, -6.0);
        assert_eq!(levels.reduction_db, -9.0);
    }

    #[test]
    fn test_level_frame_serialization() {
        let frame = LevelFrame {
            output_db: -18.5,
            reduction_db: -4.0,
        };

        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"output_db\":-18.5"));

        let back: LevelFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}
