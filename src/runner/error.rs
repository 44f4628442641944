use thiserror::Error;

use crate::api::EnvelopeError;
use crate::client::ApiResponse;

/// How long a response excerpt attached to a failure may get
const RESPONSE_EXCERPT_CHARS: usize = 500;

/// Why a check failed. Every variant is recorded the same way: the check is
/// marked failed with the `Display` text as its details, and the run goes on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckFailure {
    /// No response was received
    #[error("Connection failed: {0}")]
    Connectivity(String),

    /// The API answered with a status of 400 or above
    #[error("Status: {status}")]
    Status { status: u16, response: String },

    /// An expected field is absent or malformed
    #[error("{0}")]
    Shape(String),

    /// Required state from an earlier check is missing
    #[error("{0}")]
    Precondition(String),
}

impl CheckFailure {
    /// Classify a response that did not satisfy its check
    pub fn from_response(resp: &ApiResponse) -> Self {
        if resp.is_network_failure() {
            CheckFailure::Connectivity(resp.body.to_string())
        } else if !resp.success {
            CheckFailure::Status {
                status: resp.status,
                response: resp.body.excerpt(RESPONSE_EXCERPT_CHARS),
            }
        } else {
            CheckFailure::Shape(format!(
                "Status: {}, envelope did not report success",
                resp.status
            ))
        }
    }

    /// Shape failure carrying the status the offending response came with
    pub fn shape(resp: &ApiResponse, reason: impl std::fmt::Display) -> Self {
        CheckFailure::Shape(format!("Status: {}, {}", resp.status, reason))
    }

    /// Response text worth echoing to the console, if any
    pub fn response(&self) -> Option<&str> {
        match self {
            CheckFailure::Status { response, .. } if !response.is_empty() => Some(response),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CheckFailure::Connectivity(_) => "connectivity",
            CheckFailure::Status { .. } => "status",
            CheckFailure::Shape(_) => "shape",
            CheckFailure::Precondition(_) => "precondition",
        }
    }
}

impl From<EnvelopeError> for CheckFailure {
    fn from(err: EnvelopeError) -> Self {
        CheckFailure::Shape(err.to_string())
    }
}

/// Details on success, the failure otherwise
pub type CheckOutcome = Result<String, CheckFailure>;
