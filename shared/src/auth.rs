//! Caller identity resolution.
//!
//! Tokens are verified by the Cognito user pool authorizer on API Gateway.
//! By the time a request reaches the Lambda the verified claims sit in
//! `requestContext.authorizer.claims`; we only read them.

use lambda_http::{Request, RequestExt};

use crate::{Error, Result};

/// Decoded user information from the authorizer claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User's Cognito subject
    pub user_id: String,
}

impl AuthenticatedUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Extract user from API Gateway authorizer claims.
pub fn extract_user_from_context(claims: &serde_json::Value) -> Result<AuthenticatedUser> {
    let sub = claims
        .get("sub")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Unauthenticated("Missing sub claim".to_string()))?;

    Ok(AuthenticatedUser::new(sub))
}

/// Extract the caller from a Lambda request.
pub fn extract_user(event: &Request) -> Result<AuthenticatedUser> {
    let context = event
        .request_context_ref()
        .ok_or_else(|| Error::Unauthenticated("Missing request context".to_string()))?;

    let claims = context
        .authorizer()
        .and_then(|a| a.fields.get("claims"))
        .ok_or_else(|| Error::Unauthenticated("Missing claims in authorizer context".to_string()))?;

    extract_user_from_context(claims)
}
