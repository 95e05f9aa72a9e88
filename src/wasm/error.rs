//! Error types for WASM bindings

use wasm_bindgen::prelude::*;

/// Error type for WASM bindings
#[wasm_bindgen]
pub struct PanelJsError {
    message: String,
}

#[wasm_bindgen]
impl PanelJsError {
    /// Get the error message
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

impl From<crate::graph::PatchError> for PanelJsError {
    fn from(e: crate::graph::PatchError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

impl From<crate::session::SessionError> for PanelJsError {
    fn from(e: crate::session::SessionError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

impl From<String> for PanelJsError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for PanelJsError {
    fn from(message: &str) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl PanelJsError {
    /// Convert to JsValue for use as error return
    pub fn into_js(self) -> JsValue {
        JsValue::from_str(&self.message)
    }
}
