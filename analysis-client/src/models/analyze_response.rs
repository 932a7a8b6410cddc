use crate::error::{Result, SubmitError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by the analysis endpoint.
///
/// Either `error` or the `message`/`file` pair is expected to be set, but
/// nothing stops a server from sending both; `error` wins when truthy.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AnalyzeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Value>,
}

/// What the result container should show for a decoded response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Failed { error: String },
    Completed { message: String, file: String },
}

impl AnalyzeResponse {
    /// Decode a response body, reading `error`, `message` and `file` as fields.
    ///
    /// Only a JSON object has fields; any other value decodes with all of them
    /// unset, except `null`, whose fields cannot be read at all.
    pub fn from_slice(body: &[u8]) -> Result<AnalyzeResponse> {
        match serde_json::from_slice(body)? {
            Value::Null => Err(SubmitError::NullBody),
            Value::Object(fields) => Ok(serde_json::from_value(Value::Object(fields))?),
            _ => Ok(AnalyzeResponse::default()),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match &self.error {
            Some(error) if is_truthy(error) => Outcome::Failed {
                error: display_value(error),
            },
            _ => Outcome::Completed {
                message: self.message.as_ref().map(display_value).unwrap_or_default(),
                file: self.file.as_ref().map(display_value).unwrap_or_default(),
            },
        }
    }
}

/// `null`, `false`, `0` and `""` count as unset.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// Strings are shown verbatim, anything else as its JSON text
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
