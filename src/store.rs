//! Settings Persistence
//!
//! The persistence seam between the session and whatever key/value backing
//! the host provides (browser local storage, a file, an in-memory cell).
//! The payload is the JSON form of [`CompressorSettings`]; what the host
//! does with the string is its own business.
//!
//! Loading is infallible by policy: an absent or malformed payload yields
//! the default settings and is never propagated — defaults are always
//! available, and a broken payload should not take the panel down. Write
//! failures do propagate. All writes flow through one `&mut` owner, which
//! serializes them by construction.

use crate::params::CompressorSettings;

/// Error types for persistence writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store rejected the payload
    WriteFailed(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::WriteFailed(reason) => write!(f, "settings write failed: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// A string-payload key/value backing for panel settings
pub trait SettingsStore: Send {
    /// Read the stored payload, if any
    fn read(&self) -> Option<String>;

    /// Replace the stored payload
    fn write(&mut self, payload: &str) -> Result<(), StoreError>;
}

/// In-memory store for native hosts and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    payload: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing payload (e.g. one the host read elsewhere)
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
        }
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

impl SettingsStore for MemoryStore {
    fn read(&self) -> Option<String> {
        self.payload.clone()
    }

    fn write(&mut self, payload: &str) -> Result<(), StoreError> {
        self.payload = Some(payload.to_string());
        Ok(())
    }
}

/// Load settings, substituting defaults for absent or malformed payloads
pub fn load_settings(store: &dyn SettingsStore) -> CompressorSettings {
    store
        .read()
        .and_then(|raw| CompressorSettings::from_json(&raw).ok())
        .unwrap_or_default()
}

/// Serialize and write settings to the store
pub fn save_settings(
    store: &mut dyn SettingsStore,
    settings: &CompressorSettings,
) -> Result<(), StoreError> {
    let payload = settings
        .to_json()
        .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
    store.write(&payload)
}
