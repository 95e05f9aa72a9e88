//! WASM bindings for cinch
//!
//! This module provides the JavaScript-facing API for running the
//! compressor panel core in a browser environment via WebAssembly.

mod engine;
mod error;

pub use engine::PanelEngine;
pub use error::PanelJsError;

// Re-export wasm_bindgen for convenience
pub use wasm_bindgen::prelude::*;
