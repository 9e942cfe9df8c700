//! Wire envelope shared by the server and the client.
//!
//! Every API response (apart from the health check and static uploads) is
//! wrapped as `{status, message, data, errors}`. A `success` envelope always
//! carries a `data` key, possibly `null`. An `error` envelope never does.

use serde::{Deserialize, Serialize};

/// Discriminant of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// One entry of the `errors` array on an error envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorDetail {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: Some(message.into()),
            stack: None,
        }
    }

    pub fn stack(stack: impl Into<String>) -> Self {
        Self {
            stack: Some(stack.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
}

impl<T> Envelope<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>, errors: Option<Vec<ErrorDetail>>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Default message used by `success` when a controller does not pick one
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Success";
