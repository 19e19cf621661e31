//! Shared-secret cookie check, applied as middleware to every route except
//! the health check.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ServerError;
use crate::state::AppState;

const COOKIE_NAME: &str = "session";

pub async fn require_session(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ServerError> {
    let presented = request
        .headers()
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| find_cookie(cookies, COOKIE_NAME));

    match presented {
        Some(value) if constant_time_eq(value.as_bytes(), state.session_secret.as_bytes()) => Ok(next.run(request).await),
        _ => Err(ServerError::Unauthorized),
    }
}

fn find_cookie<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies.split(';').map(str::trim).find_map(|kv| kv.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')))
}

/// Avoids short-circuiting on the first mismatched byte, which would let an
/// attacker learn the secret's length and prefix via timing.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
