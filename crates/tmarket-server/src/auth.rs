//! Admin capability gate.
//!
//! The storefront's real session/user system lives elsewhere; analytics only
//! needs a yes/no "caller is admin" check, expressed as a bearer token.

use axum::http::{header, HeaderMap};

use tmarket_core::config::AuthMode;

use crate::error::AppError;

/// Verify the caller holds the admin capability.
///
/// `AuthMode::None` admits everyone (local development). `AuthMode::Token`
/// requires `Authorization: Bearer <token>` to match the configured value.
pub fn require_admin(auth_mode: &AuthMode, headers: &HeaderMap) -> Result<(), AppError> {
    match auth_mode {
        AuthMode::None => Ok(()),
        AuthMode::Token(expected) => {
            let presented = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "));
            match presented {
                Some(token) if token == expected => Ok(()),
                _ => Err(AppError::Unauthorized),
            }
        }
    }
}
