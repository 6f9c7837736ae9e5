use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity record as the platform's auth surface returns it.
///
/// `role` and `user_type` are kept as raw strings — the wire can carry values
/// outside the known set, and those must classify as [`Actor::Unrecognized`]
/// rather than fail deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: String,
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub subscription_status: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub subscription_fee_per_client: Option<f64>,
    #[serde(default)]
    pub stripe_customer_id: Option<String>,
    #[serde(default)]
    pub stripe_subscription_id: Option<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

/// Closed classification of an authenticated principal. Produced once per
/// request by [`Principal::classify`], then matched exhaustively wherever a
/// scope decision is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Admin,
    Coach,
    Client,
    Unrecognized,
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Actor::Admin => "admin",
            Actor::Coach => "coach",
            Actor::Client => "client",
            Actor::Unrecognized => "unrecognized",
        };
        write!(f, "{s}")
    }
}

impl Principal {
    /// A `user` with no `user_type` yet is a coach-in-waiting and classifies
    /// as coach.
    pub fn classify(&self) -> Actor {
        match (self.role.as_str(), self.user_type.as_deref()) {
            ("admin", _) => Actor::Admin,
            ("user", Some("coach") | Some("") | None) => Actor::Coach,
            ("user", Some("client")) => Actor::Client,
            _ => Actor::Unrecognized,
        }
    }

    /// Display name, falling back to the account email.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Trial,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::Trial => "trial",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "inactive" => Ok(SubscriptionStatus::Inactive),
            "trial" => Ok(SubscriptionStatus::Trial),
            _ => Err(anyhow::anyhow!("Unknown subscription status: {s}")),
        }
    }
}

/// Currencies the manage-coach form accepts.
pub const SUPPORTED_CURRENCIES: &[&str] = &["usd", "eur", "gbp", "cad", "aud"];

/// Request body for `PUT /admin/coaches/{id}`.
#[derive(Debug, Deserialize)]
pub struct ManageCoachRequest {
    pub subscription_status: String,
    pub currency: String,
    pub subscription_fee_per_client: f64,
}
