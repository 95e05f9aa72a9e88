//! # Cinch: Compressor Control Panel Core
//!
//! `cinch` is the core of a browser-based dynamics-compressor control
//! panel: it models the live audio signal chain as an ordered node graph,
//! bypasses and restores the effect chain without glitches, persists
//! compressor parameter state across sessions, and converts sampled audio
//! energy into decibel levels and meter-bar heights in real time.
//!
//! ## Architecture
//!
//! The library is organized in three layers:
//!
//! - **Endpoint Layer** - the [`endpoint::AudioEndpoint`] contract over the
//!   host audio subsystem, with a virtual [`bay::PatchBay`] host for native
//!   use and tests
//! - **Graph Layer** - the [`graph::SignalGraph`] chain with its symmetric
//!   bypass/restore pair, plus the [`tap::MeterTap`] metering driver and
//!   the pure [`meter`] height math
//! - **Session Layer** - the [`session::Session`] application context
//!   tying graph, settings persistence, play state, and metering together
//!   (exposed to the browser through the `wasm` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cinch::prelude::*;
//!
//! // Host side: register the page's audio element, pick a destination
//! let bay = PatchBay::new();
//! let media = bay.media("page-audio");
//! let destination = bay.jack();
//!
//! // Assemble: source -> compressor -> makeup -> {tap, destination}
//! let mut session = Session::start(
//!     &bay,
//!     "page-audio",
//!     destination,
//!     Box::new(MemoryStore::new()),
//!     PanelConfig::default(),
//! )
//! .unwrap();
//!
//! // Audio-callback side: one fixed-size frame per invocation
//! let tap = session.meter_tap();
//! media.play_state().set(true);
//! tap.process_frame(&[0.0f32; 1024]);
//!
//! // UI side: adjust, toggle, draw
//! session.set_param(DynamicsParam::Threshold, -32.0).unwrap();
//! session.set_enabled(false).unwrap(); // bypass, chain stays wired
//! session.set_enabled(true).unwrap(); // restore, topology identical
//! let bar = session.output_height(400.0);
//! ```

pub mod bay;
pub mod bridge;
pub mod endpoint;
pub mod graph;
pub mod meter;
pub mod params;
pub mod session;
pub mod store;
pub mod tap;

#[cfg(feature = "wasm")]
pub mod wasm;

/// Prelude module for convenient imports
pub mod prelude {
    // Endpoint Layer
    pub use crate::bay::{DynamicsJack, GainJack, Jack, MediaJack, PatchBay};
    pub use crate::endpoint::{AudioEndpoint, EndpointHandle, EndpointId};

    // Graph Layer
    pub use crate::graph::{NodeKey, NodeSpec, PatchError, SignalGraph, SignalNode};
    pub use crate::meter::{
        height_before_peak, output_height, reduction_height, MeterScale, DEFAULT_CEILING_DB,
        DEFAULT_DAMPING, DEFAULT_FLOOR_DB, DEFAULT_UNITS,
    };
    pub use crate::tap::{frame_decibels, frame_energy, MeterTap, DEFAULT_FRAME_SIZE};

    // Thread Bridges
    pub use crate::bridge::{AtomicF64, LevelBridge, LevelFrame, PlayState};

    // Session Layer
    pub use crate::params::{CompressorSettings, DynamicsParam, ParamSpec};
    pub use crate::session::{
        PanelConfig, Session, SessionError, COMPRESSOR_NODE, MAKEUP_NODE,
    };
    pub use crate::store::{
        load_settings, save_settings, MemoryStore, SettingsStore, StoreError,
    };
}

// Re-export key types at crate root for convenience
pub use prelude::*;
