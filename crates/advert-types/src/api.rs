use serde::{Deserialize, Serialize};

// -- Advertisements --

/// Body of `POST /advertisements/`.
///
/// The server validates raw JSON against this shape itself so that it can
/// report every missing or mistyped field at once; clients just serialize it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAdvertisementRequest {
    pub header: String,
    pub description: String,
    pub user: String,
}

/// Body of `PATCH /advertisements/{user}/{id}`.
///
/// `user` is the claimed author and is only used for the ownership check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAdvertisementRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAdvertisementResponse {
    pub id: i64,
}

/// Read response. `description` and `user` are omitted in the summary view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisementResponse {
    pub id: i64,
    pub header: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAdvertisementResponse {
    pub status: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

// -- Errors --

/// One field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `message` is either plain text or the list of field errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Text(String),
    Fields(Vec<FieldError>),
}

/// Envelope for every failed request: `{"status": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: ErrorMessage,
}

impl ErrorResponse {
    pub fn new(message: ErrorMessage) -> Self {
        Self {
            status: "error".to_string(),
            message,
        }
    }
}
