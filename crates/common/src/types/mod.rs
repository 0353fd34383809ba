use serde::{Deserialize, Serialize};

use crate::SERVICE_NAME;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Static payload returned by `GET /`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RootMessage {
    pub mensaje: String,
}

impl RootMessage {
    pub fn running() -> Self {
        Self { mensaje: format!("{SERVICE_NAME} funcionando") }
    }
}

/// Error envelope shared by every non-2xx response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}
