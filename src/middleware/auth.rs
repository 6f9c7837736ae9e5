use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::Error;
use crate::models::principal::Principal;
use crate::services::access;
use crate::AppState;

/// Bearer token from the `Authorization` header. Opaque here — only the
/// platform's identity provider can say who it belongs to.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(Error::Unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or(Error::Unauthenticated)?;

        Ok(SessionToken(token.to_string()))
    }
}

/// The resolved caller: session context produced at the start of every
/// protected operation, passed down explicitly from here on.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal {
    pub principal: Principal,
    pub token: String,
}

impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionToken(token) = SessionToken::from_request_parts(parts, state).await?;
        let principal = access::resolve(state.identity.as_ref(), &token).await?;
        Ok(Self { principal, token })
    }
}
