//! Panel Session
//!
//! The explicit application context that replaces the original panel's
//! module-level globals: one `Session` owns the signal graph, the persisted
//! settings, the shared play state, and the enable/bypass lifecycle, with a
//! defined start and teardown (dropping the session drops everything it
//! created).
//!
//! Assembly happens once, when the media source is ready:
//! source -> compressor -> makeup gain -> {tap point, destination}. The
//! metering tap hangs off clone-handles, so the audio callback never
//! touches the session itself.

use crate::bay::{DynamicsJack, GainJack, PatchBay};
use crate::bridge::{LevelBridge, LevelFrame, PlayState};
use crate::endpoint::EndpointHandle;
use crate::graph::{NodeSpec, PatchError, SignalGraph};
use crate::meter::MeterScale;
use crate::params::{CompressorSettings, DynamicsParam};
use crate::store::{load_settings, save_settings, SettingsStore, StoreError};
use crate::tap::{MeterTap, DEFAULT_FRAME_SIZE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Node name of the compressor stage in the session graph
pub const COMPRESSOR_NODE: &str = "compressor";
/// Node name of the makeup-gain stage in the session graph
pub const MAKEUP_NODE: &str = "makeup";

/// Panel configuration, host-overridable with defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Samples per metering frame
    pub frame_size: usize,
    /// Meter scaling
    pub scale: MeterScale,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            scale: MeterScale::default(),
        }
    }
}

/// Error types for session operations
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The named media source is not present; initialization aborts
    /// before any graph is built
    SourceUnavailable(String),
    /// A topology operation failed
    Patch(PatchError),
    /// Persisting settings failed
    Store(StoreError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::SourceUnavailable(name) => {
                write!(f, "media source unavailable: {}", name)
            }
            SessionError::Patch(e) => write!(f, "patch error: {}", e),
            SessionError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<PatchError> for SessionError {
    fn from(e: PatchError) -> Self {
        SessionError::Patch(e)
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e)
    }
}

/// One control-panel session over a live audio source
pub struct Session {
    graph: SignalGraph,
    source: EndpointHandle,
    tap_point: EndpointHandle,
    compressor: Arc<DynamicsJack>,
    makeup: Arc<GainJack>,
    playing: Arc<PlayState>,
    bridge: Arc<LevelBridge>,
    settings: CompressorSettings,
    store: Box<dyn SettingsStore>,
    engaged: bool,
    config: PanelConfig,
}

impl Session {
    /// Start a session over a named media source registered in `bay`
    ///
    /// Fails with [`SessionError::SourceUnavailable`] before building
    /// anything when the source is missing; on success the graph is fully
    /// assembled, persisted settings are applied, and a persisted
    /// disabled state has already been honored by bypassing the chain.
    pub fn start(
        bay: &PatchBay,
        media_name: &str,
        destination: EndpointHandle,
        store: Box<dyn SettingsStore>,
        config: PanelConfig,
    ) -> Result<Self, SessionError> {
        let media = bay
            .find_media(media_name)
            .ok_or_else(|| SessionError::SourceUnavailable(media_name.to_string()))?;

        let playing = media.play_state();
        let source: EndpointHandle = media;
        let compressor = bay.dynamics();
        let makeup = bay.gain();
        let tap_point = bay.jack();

        let settings = load_settings(store.as_ref());

        let mut graph = SignalGraph::new();
        graph.chain(vec![
            NodeSpec::new(COMPRESSOR_NODE, compressor.clone()),
            NodeSpec::new(MAKEUP_NODE, makeup.clone()),
        ])?;
        graph.feed_from(source.as_ref())?;
        graph.route_to(tap_point.clone())?;
        graph.route_to(destination)?;

        let mut session = Self {
            graph,
            source,
            tap_point,
            compressor,
            makeup,
            playing,
            bridge: Arc::new(LevelBridge::new()),
            settings,
            store,
            engaged: true,
            config,
        };

        session.apply_settings();
        if !session.settings.enabled {
            session.graph.unpatch_from(session.source.as_ref())?;
            session.engaged = false;
        }
        Ok(session)
    }

    /// Set one parameter: clamp, apply to the endpoint, persist
    ///
    /// Returns the clamped value actually stored.
    pub fn set_param(&mut self, param: DynamicsParam, value: f64) -> Result<f64, SessionError> {
        let clamped = self.settings.set(param, value);
        self.apply_param(param, clamped);
        save_settings(self.store.as_mut(), &self.settings)?;
        Ok(clamped)
    }

    /// Engage or bypass the chain
    ///
    /// Idempotent at this level: the graph's topology operations are
    /// strict, so the session swallows same-state toggles instead of
    /// issuing a second bypass. The new state is persisted.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), SessionError> {
        if enabled != self.engaged {
            if enabled {
                self.graph.patch_into(self.source.as_ref())?;
            } else {
                self.graph.unpatch_from(self.source.as_ref())?;
            }
            self.engaged = enabled;
        }
        if self.settings.enabled != enabled {
            self.settings.enabled = enabled;
            save_settings(self.store.as_mut(), &self.settings)?;
        }
        Ok(())
    }

    /// Whether the chain is currently patched into the signal path
    pub fn enabled(&self) -> bool {
        self.engaged
    }

    /// Update the shared play flag (media play/pause events)
    pub fn set_playing(&self, playing: bool) {
        self.playing.set(playing);
    }

    pub fn playing(&self) -> bool {
        self.playing.get()
    }

    /// Clone-handle to the shared play flag
    pub fn play_state(&self) -> Arc<PlayState> {
        Arc::clone(&self.playing)
    }

    /// Build a metering driver for the audio callback
    ///
    /// The driver holds clone-handles only; hand it to the tap point's
    /// processing callback and keep using the session from the main
    /// thread.
    pub fn meter_tap(&self) -> MeterTap {
        MeterTap::new(
            Arc::clone(&self.playing),
            self.compressor.clone(),
            Arc::clone(&self.bridge),
        )
    }

    /// Latest published level readings
    pub fn levels(&self) -> LevelFrame {
        self.bridge.levels()
    }

    /// Output-meter height for the latest reading
    pub fn output_height(&self, meter_height: f64) -> f64 {
        self.config
            .scale
            .output_height(self.levels().output_db, meter_height)
    }

    /// Reduction-meter height for the latest reading
    pub fn reduction_height(&self, meter_height: f64) -> f64 {
        self.config
            .scale
            .reduction_height(self.levels().reduction_db, meter_height)
    }

    pub fn settings(&self) -> &CompressorSettings {
        &self.settings
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn graph(&self) -> &SignalGraph {
        &self.graph
    }

    /// The tap-point endpoint the host wires its processing callback to
    pub fn tap_point(&self) -> &EndpointHandle {
        &self.tap_point
    }

    /// The level bridge the UI polls
    pub fn bridge(&self) -> Arc<LevelBridge> {
        Arc::clone(&self.bridge)
    }

    fn apply_settings(&self) {
        for param in DynamicsParam::ALL {
            self.apply_param(param, self.settings.get(param));
        }
    }

    fn apply_param(&self, param: DynamicsParam, value: f64) {
        match param {
            DynamicsParam::Gain => self.makeup.set_level(value),
            other => self.compressor.set_param(other, value),
        }
    }
}
