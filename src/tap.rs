//! Metering Tap
//!
//! The per-frame callback driver. A tap point routed from the chain tail
//! hands the driver one fixed-size frame of raw samples per invocation;
//! the driver converts frame energy to a decibel level, reads the live
//! gain-reduction figure from the compressor endpoint, and publishes both
//! through the level bridge. It runs on the host's audio-processing
//! context and never blocks.

use crate::bridge::{LevelBridge, LevelFrame, PlayState};
use crate::endpoint::EndpointHandle;
use std::sync::Arc;

/// Default number of samples per metering frame
pub const DEFAULT_FRAME_SIZE: usize = 1024;

/// Sum of squared samples over a frame
pub fn frame_energy(samples: &[f32]) -> f64 {
    samples.iter().map(|&s| (s as f64) * (s as f64)).sum()
}

/// Frame energy to decibels
///
/// The divisor is half the frame length, not the full length: a
/// perceptual-scaling approximation the panel's display behavior depends
/// on, kept as-is rather than corrected to the true-RMS formula. A silent
/// or empty frame reads negative infinity, which the meter math draws as
/// an empty bar.
pub fn frame_decibels(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return f64::NEG_INFINITY;
    }
    let rms = (frame_energy(samples) / (samples.len() as f64 / 2.0)).sqrt();
    20.0 * libm::log10(rms)
}

/// Per-frame metering driver
///
/// Holds clone-handles only (play state, compressor endpoint, level
/// bridge), so a session can hand one to the audio callback while keeping
/// its own copies.
pub struct MeterTap {
    playing: Arc<PlayState>,
    compressor: EndpointHandle,
    bridge: Arc<LevelBridge>,
}

impl MeterTap {
    pub fn new(
        playing: Arc<PlayState>,
        compressor: EndpointHandle,
        bridge: Arc<LevelBridge>,
    ) -> Self {
        Self {
            playing,
            compressor,
            bridge,
        }
    }

    /// Process one frame of raw samples from the tap point
    ///
    /// While the media source is not playing, both meters read 0
    /// regardless of the buffer contents — the source keeps delivering
    /// frames through pause and fade transitions.
    pub fn process_frame(&self, samples: &[f32]) {
        if !self.playing.get() {
            self.bridge.publish(LevelFrame::silent());
            return;
        }

        self.bridge.publish(LevelFrame {
            output_db: frame_decibels(samples),
            reduction_db: self.compressor.reduction(),
        });
    }

    /// The bridge this driver publishes into
    pub fn bridge(&self) -> &Arc<LevelBridge> {
        &self.bridge
    }
}
