//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunables for an [`Engine`](crate::Engine).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use trellis_core::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{ "validate_ref_names": false }"#).unwrap();
/// assert!(!config.validate_ref_names);
/// assert_eq!(config.placeholder_text, "MOVED ELSEWHERE");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reject reference names outside `[A-Za-z_$][A-Za-z0-9_$]*`.
    pub validate_ref_names: bool,

    /// Text of the throwaway node left where a moved node used to be.
    pub placeholder_text: String,

    /// Attribute that names a native node when it is wrapped into a model.
    pub ref_attribute: Option<String>,

    /// Upper bound on observer redelivery rounds per tick.
    pub max_flush_rounds: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validate_ref_names: true,
            placeholder_text: "MOVED ELSEWHERE".to_string(),
            ref_attribute: Some("data-ref".to_string()),
            max_flush_rounds: 16,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidData(format!("config: {}", e)))
    }
}
