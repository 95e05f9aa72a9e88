//! Compressor Parameters
//!
//! The panel controls a fixed, compile-time-known parameter set, so the
//! original's dynamically computed property getters become a plain enum, a
//! static range table for range-input hosts, and a serializable settings
//! struct. String keys match the persisted payload.

use serde::{Deserialize, Serialize};

/// A control on the dynamics chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicsParam {
    Threshold,
    Ratio,
    Attack,
    Release,
    Knee,
    /// Makeup gain, applied by the gain stage after the compressor
    Gain,
}

/// Range and default for one parameter, shaped for a range-input control
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl DynamicsParam {
    pub const ALL: [DynamicsParam; 6] = [
        DynamicsParam::Threshold,
        DynamicsParam::Ratio,
        DynamicsParam::Attack,
        DynamicsParam::Release,
        DynamicsParam::Knee,
        DynamicsParam::Gain,
    ];

    /// String key used in the persisted payload and by UI hosts
    pub fn key(self) -> &'static str {
        self.spec().key
    }

    /// Parse a payload/UI key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.key() == key)
    }

    /// Dense index, stable across the fixed parameter set
    pub fn index(self) -> usize {
        match self {
            DynamicsParam::Threshold => 0,
            DynamicsParam::Ratio => 1,
            DynamicsParam::Attack => 2,
            DynamicsParam::Release => 3,
            DynamicsParam::Knee => 4,
            DynamicsParam::Gain => 5,
        }
    }

    /// Range metadata, following the host audio API's parameter ranges
    pub fn spec(self) -> ParamSpec {
        match self {
            DynamicsParam::Threshold => ParamSpec {
                key: "threshold",
                label: "Threshold (dB)",
                min: -100.0,
                max: 0.0,
                step: 1.0,
                default: -24.0,
            },
            DynamicsParam::Ratio => ParamSpec {
                key: "ratio",
                label: "Ratio",
                min: 1.0,
                max: 20.0,
                step: 1.0,
                default: 12.0,
            },
            DynamicsParam::Attack => ParamSpec {
                key: "attack",
                label: "Attack (s)",
                min: 0.0,
                max: 1.0,
                step: 0.001,
                default: 0.003,
            },
            DynamicsParam::Release => ParamSpec {
                key: "release",
                label: "Release (s)",
                min: 0.0,
                max: 1.0,
                step: 0.01,
                default: 0.25,
            },
            DynamicsParam::Knee => ParamSpec {
                key: "knee",
                label: "Knee (dB)",
                min: 0.0,
                max: 40.0,
                step: 1.0,
                default: 30.0,
            },
            DynamicsParam::Gain => ParamSpec {
                key: "gain",
                label: "Makeup Gain",
                min: 0.0,
                max: 2.0,
                step: 0.01,
                default: 1.0,
            },
        }
    }
}

/// The persisted control-panel state
///
/// Field defaults follow the host audio API's compressor defaults; the
/// separate `enabled` flag records whether the chain is patched into the
/// signal path. `#[serde(default)]` makes partial payloads load cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "wasm", derive(tsify::Tsify))]
#[cfg_attr(feature = "wasm", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(default)]
pub struct CompressorSettings {
    pub threshold: f64,
    pub ratio: f64,
    pub attack: f64,
    pub release: f64,
    pub knee: f64,
    pub gain: f64,
    pub enabled: bool,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold: DynamicsParam::Threshold.spec().default,
            ratio: DynamicsParam::Ratio.spec().default,
            attack: DynamicsParam::Attack.spec().default,
            release: DynamicsParam::Release.spec().default,
            knee: DynamicsParam::Knee.spec().default,
            gain: DynamicsParam::Gain.spec().default,
            enabled: true,
        }
    }
}

impl CompressorSettings {
    pub fn get(&self, param: DynamicsParam) -> f64 {
        match param {
            DynamicsParam::Threshold => self.threshold,
            DynamicsParam::Ratio => self.ratio,
            DynamicsParam::Attack => self.attack,
            DynamicsParam::Release => self.release,
            DynamicsParam::Knee => self.knee,
            DynamicsParam::Gain => self.gain,
        }
    }

    /// Set a parameter, clamping into its range; returns the stored value
    pub fn set(&mut self, param: DynamicsParam, value: f64) -> f64 {
        let spec = param.spec();
        let clamped = value.clamp(spec.min, spec.max);
        match param {
            DynamicsParam::Threshold => self.threshold = clamped,
            DynamicsParam::Ratio => self.ratio = clamped,
            DynamicsParam::Attack => self.attack = clamped,
            DynamicsParam::Release => self.release = clamped,
            DynamicsParam::Knee => self.knee = clamped,
            DynamicsParam::Gain => self.gain = clamped,
        }
        clamped
    }

    /// Serialize to the persisted JSON payload
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a persisted JSON payload
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
