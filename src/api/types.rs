//! JSON bodies of the public API

use serde::{Deserialize, Serialize};

pub const MSG_INVALID_INPUT: &str = "Invalid URL or id";
pub const MSG_DUPLICATE_ID: &str = "URL id already exists";
pub const MSG_CREATE_FAILED: &str = "Failed to create URL";
pub const MSG_NOT_FOUND: &str = "URL not found";
pub const MSG_FETCH_FAILED: &str = "Failed to fetch URL";

/// `POST /api/urls`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateUrlBody {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

/// `GET /api/urls/{id}`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OriginalUrlResponse {
    pub original_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

// ============ Health ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// 运行秒数
    pub uptime: u64,
    pub storage: HealthStorageCheck,
    pub response_time_ms: u32,
}
