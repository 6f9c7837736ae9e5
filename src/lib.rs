// Library exports for binary tools and tests
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod platform;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use platform::billing::BillingSessions;
use platform::identity::IdentityProvider;
use platform::store::EntityStore;

/// Application state shared across all handlers. The platform facades are
/// trait objects so the server runs against the remote platform and the
/// tests against the in-memory one.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub billing: Arc<dyn BillingSessions>,
    pub config: Arc<Config>,
}
