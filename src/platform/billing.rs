use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where the platform wants the browser sent next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectUrl {
    pub url: String,
}

/// Payment-session creation, delegated to the platform's hosted functions.
/// Both calls only mint a redirect URL — payment completion is reported back
/// by an out-of-band webhook that writes Subscription rows.
#[async_trait]
pub trait BillingSessions: Send + Sync {
    async fn create_checkout_session(&self, token: &str) -> Result<RedirectUrl>;

    async fn create_portal_session(&self, token: &str) -> Result<RedirectUrl>;
}
