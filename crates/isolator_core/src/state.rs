//! Persisted State Document
//!
//! The state is a flat JSON object keyed by the stable parameter keys:
//!
//! ```json
//! { "low_gain": -6.0, "lowmid_gain": 0.0, "mid_gain": 0.0, "high_gain": 3.5,
//!   "low_bypass": false, "lowmid_bypass": false, "mid_bypass": true, "high_bypass": false }
//! ```
//!
//! Restoring applies only the keys present. Missing keys, unknown keys and
//! values of the wrong type leave the corresponding parameter unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::params::{IsolatorParams, ParamId};
use isolator_dsp::Band;

/// Full parameter state, as saved by hosts and the settings file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqState {
    pub low_gain: f32,
    pub lowmid_gain: f32,
    pub mid_gain: f32,
    pub high_gain: f32,
    pub low_bypass: bool,
    pub lowmid_bypass: bool,
    pub mid_bypass: bool,
    pub high_bypass: bool,
}

impl Default for EqState {
    fn default() -> Self {
        Self {
            low_gain: 0.0,
            lowmid_gain: 0.0,
            mid_gain: 0.0,
            high_gain: 0.0,
            low_bypass: false,
            lowmid_bypass: false,
            mid_bypass: false,
            high_bypass: false,
        }
    }
}

impl EqState {
    pub fn gains_db(&self) -> [f32; 4] {
        [self.low_gain, self.lowmid_gain, self.mid_gain, self.high_gain]
    }

    pub fn bypassed(&self) -> [bool; 4] {
        [self.low_bypass, self.lowmid_bypass, self.mid_bypass, self.high_bypass]
    }
}

impl IsolatorParams {
    /// Capture all eight parameters
    pub fn get_state(&self) -> EqState {
        EqState {
            low_gain: self.gain_db(Band::Low),
            lowmid_gain: self.gain_db(Band::LowMid),
            mid_gain: self.gain_db(Band::Mid),
            high_gain: self.gain_db(Band::High),
            low_bypass: self.is_bypassed(Band::Low),
            lowmid_bypass: self.is_bypassed(Band::LowMid),
            mid_bypass: self.is_bypassed(Band::Mid),
            high_bypass: self.is_bypassed(Band::High),
        }
    }

    /// Apply every parameter of a complete state
    pub fn apply_state(&self, state: &EqState) {
        for band in Band::ALL {
            self.set_gain_db(band, state.gains_db()[band.index()]);
            self.set_bypassed(band, state.bypassed()[band.index()]);
        }
    }

    /// Apply the keys present in a state document.
    ///
    /// Returns the number of parameters changed. A document that is not a
    /// JSON object is rejected and nothing changes.
    pub fn set_state(&self, doc: &Value) -> EngineResult<usize> {
        let Some(object) = doc.as_object() else {
            return Err(EngineError::InvalidState(format!(
                "expected an object, found {}",
                json_type_name(doc)
            )));
        };

        let mut applied = 0;
        for (key, value) in object {
            let Some(id) = ParamId::from_key(key) else {
                debug!(key = %key, "Ignoring unknown state key");
                continue;
            };

            let parsed = if id.is_bypass() {
                parse_bool(value).map(|b| if b { 1.0 } else { 0.0 })
            } else {
                value.as_f64().map(|v| v as f32)
            };

            match parsed {
                Some(v) => {
                    self.set(id, v);
                    applied += 1;
                }
                None => warn!(key = %key, value = %value, "Ignoring state value of wrong type"),
            }
        }
        Ok(applied)
    }

    /// Parse and apply a serialized state document
    pub fn set_state_json(&self, json: &str) -> EngineResult<usize> {
        let doc: Value =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidState(e.to_string()))?;
        self.set_state(&doc)
    }
}

/// Bools are accepted directly; numbers are true when non-zero
fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
