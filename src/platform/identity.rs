use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::principal::Principal;

/// The platform's auth surface. Session tokens are opaque strings minted by
/// the platform; this service never inspects them.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the principal behind a session token. Fails `Unauthenticated`
    /// when the token is missing, expired, or unknown.
    async fn me(&self, token: &str) -> Result<Principal>;

    /// Fetch a principal by id. Fails `NotFound` when absent.
    async fn get(&self, id: &str) -> Result<Principal>;

    /// Every account the platform knows about.
    async fn list(&self) -> Result<Vec<Principal>>;

    /// Patch a principal's stored fields.
    async fn update(&self, id: &str, patch: Value) -> Result<Principal>;

    /// Remove a principal record. Irreversible.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Invalidate the session behind a token.
    async fn logout(&self, token: &str) -> Result<()>;
}
