use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub meta: ResponseMeta,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    pub status: String,
    pub status_code: u16,
    pub timestamp: String,
    pub message: Option<String>,
    /// Number of structural violations in the returned ad copy.
    pub warnings: usize,
}

pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

/// Success envelope. Ad copy with violations is still a success, flagged
/// through `warnings` and a message.
pub fn success<T: Serialize>(data: T, warnings: usize) -> Reply<T> {
    let message = (warnings > 0).then(|| {
        format!("Generated ad copy has {} structural violation(s)", warnings)
    });

    let meta = ResponseMeta {
        status: if warnings > 0 { "partial" } else { "success" }.to_string(),
        status_code: StatusCode::OK.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        message,
        warnings,
    };

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: Some(data),
            meta,
        }),
    )
}

pub fn error<T>(status: StatusCode, message: String) -> Reply<T> {
    let meta = ResponseMeta {
        status: "error".to_string(),
        status_code: status.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        message: Some(message),
        warnings: 0,
    };

    (
        status,
        Json(ApiResponse {
            data: None,
            meta,
        }),
    )
}
