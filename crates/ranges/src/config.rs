use serde::{Deserialize, Serialize};

use crate::RangeDescriptor;

/// JSON configuration consumed at startup: an optional media duration (for
/// hosts driving an offline clock) and the initial range descriptors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangesConfig {
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub ranges: Vec<RangeDescriptor>,
}

impl RangesConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
