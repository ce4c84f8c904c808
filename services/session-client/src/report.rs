//! One JSON line per finished request

use serde::Serialize;
use serde_json::Value;
use transport::Response;

/// What the CLI prints for a single request.
#[derive(Debug, Serialize)]
pub struct RequestReport {
    pub request_id: String,
    pub method: String,
    pub url: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Response {
        status: u16,
        body: Option<Value>,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
}

impl Outcome {
    pub fn from_result(result: &session_refresh::Result<Response>) -> Self {
        match result {
            Ok(response) => Outcome::Response {
                status: response.status,
                body: body_value(response),
            },
            Err(e) => Outcome::Error {
                message: e.to_string(),
                status: e.status(),
                payload: e.payload().cloned(),
            },
        }
    }

    /// Label used for the request metrics.
    pub fn label(&self) -> String {
        match self {
            Outcome::Response { status, .. } => status.to_string(),
            Outcome::Error {
                status: Some(status),
                ..
            } => status.to_string(),
            Outcome::Error { status: None, .. } => "error".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error { .. })
    }
}

/// JSON bodies are embedded as-is, anything else as a string.
fn body_value(response: &Response) -> Option<Value> {
    if response.body.is_empty() {
        return None;
    }
    Some(
        response
            .json::<Value>()
            .unwrap_or_else(|_| Value::String(response.text())),
    )
}

impl RequestReport {
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"request_id":"{}","serialize_error":"{e}"}}"#, self.request_id)
        })
    }
}
