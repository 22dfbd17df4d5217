//! Authentication middleware
//!
//! Extracts and validates bearer tokens from requests.

use crate::auth::{decode_token, Claims, Role};
use crate::error::GovernanceError;
use crate::state::SharedState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

/// Validate the bearer token and stash the claims for handlers
pub async fn auth_middleware(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GovernanceError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| GovernanceError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = decode_token(&state.jwt_secret, bearer.token())?;

    // Insert claims into request extensions for handlers to use
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Require specific role
pub fn require_role(claims: &Claims, required: Role) -> Result<(), GovernanceError> {
    let has_permission = match required {
        Role::Observer => true,
        Role::Operator => claims.role.can_operate(),
        Role::Reviewer => claims.role.can_review(),
    };

    if !has_permission {
        return Err(GovernanceError::Forbidden(format!(
            "Requires {} role, you have {}",
            required, claims.role
        )));
    }

    Ok(())
}
