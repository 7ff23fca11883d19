//! Synthesis context models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A coordinate pair taken from the location worker.
///
/// Coordinates are carried as the worker reported them. A fix exists when
/// both fields are present and non-null, the same rule that gates stages
/// depending on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: Value,
    pub lng: Value,
}

/// The minimal view of a run handed to the reasoning service.
///
/// Every field defaults to empty; a field is only populated when its source
/// worker succeeded and the expected path resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisContext {
    /// Detected identity entries
    pub biometrics: Vec<Value>,
    /// Detected object labels
    pub objects: Vec<String>,
    /// Recognized text fragments
    pub ocr: Vec<Value>,
    /// Location fix, or null
    pub location: Option<Location>,
    /// Nearby camera entries
    pub cctv: Vec<Value>,
}

impl SynthesisContext {
    pub fn is_empty(&self) -> bool {
        self.biometrics.is_empty()
            && self.objects.is_empty()
            && self.ocr.is_empty()
            && self.location.is_none()
            && self.cctv.is_empty()
    }
}

/// Which worker feeds each context field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContextSources {
    #[serde(default = "default_biometrics")]
    pub biometrics: String,
    #[serde(default = "default_objects")]
    pub objects: String,
    #[serde(default = "default_ocr")]
    pub ocr: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_cctv")]
    pub cctv: String,
}

fn default_biometrics() -> String {
    "biometrics".to_string()
}

fn default_objects() -> String {
    "object_detection".to_string()
}

fn default_ocr() -> String {
    "ocr_environment".to_string()
}

fn default_location() -> String {
    "gps".to_string()
}

fn default_cctv() -> String {
    "cctv_retrieval".to_string()
}

impl Default for ContextSources {
    fn default() -> Self {
        Self {
            biometrics: default_biometrics(),
            objects: default_objects(),
            ocr: default_ocr(),
            location: default_location(),
            cctv: default_cctv(),
        }
    }
}
