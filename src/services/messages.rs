use serde_json::json;

use crate::error::{Error, Result};
use crate::models::client::Client;
use crate::models::message::{ContactCoachRequest, Message};
use crate::platform::store::{create_as, filter_as, EntityStore, Filter};
use crate::services::access::CoachAccess;

pub struct MessageService;

impl MessageService {
    /// Create a client→coach message. `sender_type`, `is_read` and `priority`
    /// are stamped here, and the routing pair comes from the caller's own
    /// client record — never from the request body.
    pub async fn contact_coach(
        store: &dyn EntityStore,
        client: &Client,
        req: &ContactCoachRequest,
    ) -> Result<Message> {
        if req.subject.trim().is_empty() {
            return Err(Error::Validation("subject is required".into()));
        }
        if req.content.trim().is_empty() {
            return Err(Error::Validation("content is required".into()));
        }

        let fields = json!({
            "subject": req.subject,
            "content": req.content,
            "client_email": client.email,
            "coach_email": client.coach_email,
            "sender_type": "client",
            "is_read": false,
            "priority": "normal",
        });
        create_as::<Message>(store, fields).await
    }

    /// The coach's inbox, newest first.
    pub async fn inbox_for_coach(
        store: &dyn EntityStore,
        access: &CoachAccess,
    ) -> Result<Vec<Message>> {
        filter_as::<Message>(
            store,
            &Filter::new().eq("coach_email", access.email()),
            Some("-created_date"),
        )
        .await
    }
}
