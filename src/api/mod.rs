use axum::extract::State;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use subtle::ConstantTimeEq;
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::CrmError;
use crate::AppState;

mod contacts;
mod messages;

use contacts::*;
use messages::*;

/// Voice payloads dominate body size; 25 MB covers a long memo.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Auth middleware: checks Bearer token if ROLODEX_API_KEY is configured.
async fn require_auth(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, CrmError> {
    let Some(ref expected) = state.api_key else {
        return Ok(next.run(req).await);
    };

    let unauthorized = || CrmError::Unauthorized;

    let header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(unauthorized)?;

    let token = header.strip_prefix("Bearer ").ok_or_else(unauthorized)?;

    // constant-time comparison to prevent timing attacks
    if token.as_bytes().ct_eq(expected.as_bytes()).into() {
        Ok(next.run(req).await)
    } else {
        Err(unauthorized())
    }
}

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(index))
        .route("/health", get(health));

    let protected = Router::new()
        .route("/messages", post(inbound_text))
        .route("/messages/voice", post(inbound_voice))
        .route("/messages/image", post(inbound_image))
        .route("/contacts", get(list_contacts))
        .route("/contacts/{id}", get(get_contact))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public
        .merge(protected)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
