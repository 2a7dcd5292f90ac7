//! @acp:module "Response Envelope"
//! @acp:summary "Result/error wrapper shared by server and client"
//! @acp:domain cli
//! @acp:layer model
//!
//! Response envelope shared by the dispatcher and generated clients
//!
//! Success: `{"result": <value>}` with status 200.
//! Failure: `{"error": "<message>"}` with status 500.
//! A success without a payload serializes as `{}`; clients treat it as
//! success with `undefined`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{result}` / `{error}` wrapper
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// Wrap a successful operation value; `null` means "no result"
    pub fn success(value: Value) -> Self {
        Self {
            result: if value.is_null() { None } else { Some(value) },
            error: None,
        }
    }

    /// Wrap a failed operation
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Unwrap the envelope the way generated clients do
    pub fn into_result(self) -> std::result::Result<Option<Value>, String> {
        match (self.result, self.error) {
            (Some(value), _) => Ok(Some(value)),
            (None, Some(error)) => Err(error),
            (None, None) => Ok(None),
        }
    }
}
