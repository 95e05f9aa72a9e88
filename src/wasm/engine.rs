//! PanelEngine - Main WASM interface for the compressor panel core
//!
//! The browser host mirrors its Web Audio topology into a virtual patch
//! bay: it declares the media elements it found, attaches the panel to one
//! of them, forwards each tap-point frame, and reads back levels, meter
//! heights, and the settings payload to persist. Storage itself stays on
//! the JavaScript side — the engine takes the payload the host read and
//! returns the payload the host should write.

use crate::bay::PatchBay;
use crate::params::DynamicsParam;
use crate::session::{PanelConfig, Session};
use crate::store::MemoryStore;
use crate::tap::MeterTap;
use crate::wasm::error::PanelJsError;
use wasm_bindgen::prelude::*;

/// Main WASM interface for the compressor panel core
#[wasm_bindgen]
pub struct PanelEngine {
    bay: PatchBay,
    config: PanelConfig,
    session: Option<Session>,
    tap: Option<MeterTap>,
}

#[wasm_bindgen]
impl PanelEngine {
    /// Create a new panel engine
    ///
    /// `config_json` optionally overrides frame size and meter scaling;
    /// missing fields keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<PanelEngine, JsValue> {
        // Initialize panic hook for better error messages
        console_error_panic_hook::set_once();

        let config: PanelConfig = match config_json {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| PanelJsError::from(e.to_string()).into_js())?,
            None => PanelConfig::default(),
        };

        Ok(Self {
            bay: PatchBay::new(),
            config,
            session: None,
            tap: None,
        })
    }

    // =========================================================================
    // Media and Session Lifecycle
    // =========================================================================

    /// Declare a media element the host found in the document
    pub fn declare_media(&self, name: &str) {
        self.bay.media(name);
    }

    /// Attach the panel to a declared media source and build the chain
    ///
    /// `stored_settings` is the persisted payload the host read (pass
    /// `null` on first run); attaching to an undeclared media name fails
    /// the same way a missing element does.
    pub fn attach(
        &mut self,
        media_name: &str,
        stored_settings: Option<String>,
    ) -> Result<(), JsValue> {
        let store = match stored_settings {
            Some(payload) => MemoryStore::with_payload(payload),
            None => MemoryStore::new(),
        };

        let destination = self.bay.jack();
        let session = Session::start(
            &self.bay,
            media_name,
            destination,
            Box::new(store),
            self.config.clone(),
        )
        .map_err(|e| PanelJsError::from(e).into_js())?;

        self.tap = Some(session.meter_tap());
        self.session = Some(session);
        Ok(())
    }

    /// Whether a session is attached
    pub fn attached(&self) -> bool {
        self.session.is_some()
    }

    // =========================================================================
    // Parameters and State
    // =========================================================================

    /// Set a parameter by payload key; returns the clamped stored value
    pub fn set_param(&mut self, key: &str, value: f64) -> Result<f64, JsValue> {
        let param = DynamicsParam::from_key(key)
            .ok_or_else(|| PanelJsError::from(format!("unknown parameter: {}", key)).into_js())?;
        self.session_mut()?
            .set_param(param, value)
            .map_err(|e| PanelJsError::from(e).into_js())
    }

    /// Engage or bypass the chain
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.session_mut()?
            .set_enabled(enabled)
            .map_err(|e| PanelJsError::from(e).into_js())
    }

    pub fn enabled(&self) -> Result<bool, JsValue> {
        Ok(self.session_ref()?.enabled())
    }

    /// Forward a media play/pause event
    pub fn set_playing(&self, playing: bool) -> Result<(), JsValue> {
        self.session_ref()?.set_playing(playing);
        Ok(())
    }

    /// Current settings as the JSON payload the host should persist
    pub fn settings_json(&self) -> Result<String, JsValue> {
        self.session_ref()?
            .settings()
            .to_json()
            .map_err(|e| PanelJsError::from(e.to_string()).into_js())
    }

    /// Range metadata for building the parameter controls
    pub fn param_specs(&self) -> Result<JsValue, JsValue> {
        let specs: Vec<_> = DynamicsParam::ALL.iter().map(|p| p.spec()).collect();
        serde_wasm_bindgen::to_value(&specs).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Samples per metering frame
    pub fn frame_size(&self) -> usize {
        self.config.frame_size
    }

    // =========================================================================
    // Metering
    // =========================================================================

    /// Process one tap-point frame of raw samples
    pub fn process_frame(&self, samples: &js_sys::Float32Array) -> Result<(), JsValue> {
        let tap = self
            .tap
            .as_ref()
            .ok_or_else(|| PanelJsError::from("no media attached").into_js())?;
        tap.process_frame(&samples.to_vec());
        Ok(())
    }

    /// Latest published level readings
    pub fn levels(&self) -> Result<JsValue, JsValue> {
        let levels = self.session_ref()?.levels();
        serde_wasm_bindgen::to_value(&levels).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Output-meter height for the latest reading
    pub fn output_height(&self, meter_height: f64) -> Result<f64, JsValue> {
        Ok(self.session_ref()?.output_height(meter_height))
    }

    /// Reduction-meter height for the latest reading
    pub fn reduction_height(&self, meter_height: f64) -> Result<f64, JsValue> {
        Ok(self.session_ref()?.reduction_height(meter_height))
    }

    /// Output-meter height rendered with the configured unit suffix
    pub fn output_css(&self, meter_height: f64) -> Result<String, JsValue> {
        let session = self.session_ref()?;
        Ok(session
            .config()
            .scale
            .css(session.output_height(meter_height)))
    }

    /// Reduction-meter height rendered with the configured unit suffix
    pub fn reduction_css(&self, meter_height: f64) -> Result<String, JsValue> {
        let session = self.session_ref()?;
        Ok(session
            .config()
            .scale
            .css(session.reduction_height(meter_height)))
    }
}

impl PanelEngine {
    fn session_ref(&self) -> Result<&Session, JsValue> {
        self.session
            .as_ref()
            .ok_or_else(|| PanelJsError::from("no media attached").into_js())
    }

    fn session_mut(&mut self) -> Result<&mut Session, JsValue> {
        self.session
            .as_mut()
            .ok_or_else(|| PanelJsError::from("no media attached").into_js())
    }
}
