//! Module result reported back to the orchestration host

use serde::Serialize;

/// Message reported on success
pub const SUCCESS_MESSAGE: &str = "okey dokey";

/// Terminal outcome of one module invocation
///
/// Serializes to the JSON object the host reads from the module's stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleOutcome {
    /// Whether the device configuration was (or in check mode, would be) changed
    pub changed: bool,

    /// Human-readable message
    pub msg: String,

    /// Set on failure only
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

impl ModuleOutcome {
    /// Successful run
    pub fn success(changed: bool) -> Self {
        Self {
            changed,
            msg: SUCCESS_MESSAGE.to_string(),
            failed: false,
        }
    }

    /// Failed run; never reports a change
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            msg: msg.into(),
            failed: true,
        }
    }

    /// Render as the host's JSON result line
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"changed": false, "failed": true, "msg": "cannot encode result: {e}"}}"#)
        })
    }
}

impl From<crate::Error> for ModuleOutcome {
    fn from(err: crate::Error) -> Self {
        Self::failure(err.to_string())
    }
}
