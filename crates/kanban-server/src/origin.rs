use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::routes::AppState;

/// Browser origins permitted to call the API.
///
/// Entries are compared without a trailing slash, since browsers never send
/// one in the `Origin` header.
#[derive(Debug, Clone, Default)]
pub struct OriginAllowList {
    origins: Vec<String>,
}

impl OriginAllowList {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins = origins
            .into_iter()
            .map(|o| normalize(o.as_ref()))
            .filter(|o| !o.is_empty())
            .collect();
        Self { origins }
    }

    pub fn allows(&self, origin: &str) -> bool {
        let origin = normalize(origin);
        self.origins.iter().any(|o| *o == origin)
    }

    /// Header values for the CORS layer. Entries that are not valid header
    /// values can never match a request and are skipped.
    pub fn header_values(&self) -> Vec<HeaderValue> {
        self.origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect()
    }
}

fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

/// Axum middleware that rejects requests from origins outside the allow-list.
///
/// Requests without an `Origin` header (same-origin, curl, server-to-server)
/// pass through.
pub async fn origin_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let origin = match request.headers().get(header::ORIGIN) {
        Some(value) => value,
        None => return next.run(request).await,
    };

    let allowed = origin
        .to_str()
        .map(|o| state.origins.allows(o))
        .unwrap_or(false);
    if allowed {
        return next.run(request).await;
    }

    warn!(origin = ?origin, path = %request.uri().path(), "rejected request from origin");
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "origin not allowed" })),
    )
        .into_response()
}
