use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::store::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    Client,
    Coach,
}

impl std::fmt::Display for SenderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SenderType::Client => "client",
            SenderType::Coach => "coach",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessagePriority {
    Low,
    Normal,
    High,
}

/// A message between a client and their coach, keyed by the pair of account
/// emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub client_email: String,
    pub coach_email: String,
    pub sender_type: SenderType,
    pub subject: String,
    pub content: String,
    pub is_read: bool,
    pub priority: MessagePriority,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

impl Entity for Message {
    const NAME: &'static str = "Message";
}

/// Request body for `POST /client/messages`. Routing and flag fields are
/// stamped server-side, so the body carries only the authored content.
#[derive(Debug, Deserialize)]
pub struct ContactCoachRequest {
    pub subject: String,
    pub content: String,
}
