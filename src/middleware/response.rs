use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Successful JSON response whose body is `{ <key>: data, ... }`.
#[derive(Debug)]
pub struct ApiResponse {
    pub body: Map<String, Value>,
    pub status_code: StatusCode,
    serialization_failed: bool,
}

impl ApiResponse {
    /// 200 OK with a single keyed entry
    pub fn success<T: Serialize>(key: &str, data: T) -> Self {
        Self::with_status(StatusCode::OK).and(key, data)
    }

    /// 201 Created with a single keyed entry
    pub fn created<T: Serialize>(key: &str, data: T) -> Self {
        Self::with_status(StatusCode::CREATED).and(key, data)
    }

    pub fn with_status(status_code: StatusCode) -> Self {
        Self {
            body: Map::new(),
            status_code,
            serialization_failed: false,
        }
    }

    /// Add another keyed entry to the body.
    pub fn and<T: Serialize>(mut self, key: &str, data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => {
                self.body.insert(key.to_string(), value);
            }
            Err(e) => {
                tracing::error!("Failed to serialize response data for '{}': {}", key, e);
                self.serialization_failed = true;
            }
        }
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        if self.serialization_failed {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": {
                        "message": "Failed to serialize response data",
                        "status": 500
                    }
                })),
            )
                .into_response();
        }

        (self.status_code, Json(Value::Object(self.body))).into_response()
    }
}

// Convenience type alias
pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;
