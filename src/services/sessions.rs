use crate::error::Result;
use crate::models::session::Session;
use crate::platform::store::{filter_as, EntityStore, Filter};
use crate::services::access::CoachAccess;

pub struct SessionService;

impl SessionService {
    /// Scheduled sessions for a client's own dashboard, soonest first.
    pub async fn upcoming_for_client(
        store: &dyn EntityStore,
        client_email: &str,
    ) -> Result<Vec<Session>> {
        filter_as::<Session>(
            store,
            &Filter::new()
                .eq("client_email", client_email)
                .eq("status", "scheduled"),
            Some("session_date"),
        )
        .await
    }

    /// Every session in the coach's partition, newest first.
    pub async fn list_for_coach(
        store: &dyn EntityStore,
        access: &CoachAccess,
    ) -> Result<Vec<Session>> {
        filter_as::<Session>(
            store,
            &Filter::new().eq("coach_email", access.email()),
            Some("-session_date"),
        )
        .await
    }
}
