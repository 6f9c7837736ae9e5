use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::client::Client;
use crate::models::principal::{
    Actor, ManageCoachRequest, Principal, SubscriptionStatus, SUPPORTED_CURRENCIES,
};
use crate::models::subscription::{paid_revenue, Subscription};
use crate::platform::identity::IdentityProvider;
use crate::platform::store::{list_as, EntityStore};
use crate::services::access::CoachAccess;
use crate::services::billing::{project_billing, BillingProjection};
use crate::services::clients::ClientService;

#[derive(Debug, Serialize)]
pub struct PlatformOverview {
    pub total_coaches: usize,
    pub total_clients: usize,
    pub total_revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct CoachSummary {
    #[serde(flatten)]
    pub coach: Principal,
    pub client_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CoachPreview {
    pub coach: Principal,
    pub clients: Vec<Client>,
    pub billing: BillingProjection,
}

pub struct AdminService;

impl AdminService {
    pub async fn overview(
        store: &dyn EntityStore,
        identity: &dyn IdentityProvider,
    ) -> Result<PlatformOverview> {
        let coaches = Self::coaches(identity).await?;
        let clients = list_as::<Client>(store).await?;
        let subscriptions = list_as::<Subscription>(store).await?;
        Ok(PlatformOverview {
            total_coaches: coaches.len(),
            total_clients: clients.len(),
            total_revenue: paid_revenue(&subscriptions),
        })
    }

    /// Every coach (confirmed or in-waiting) with their client count.
    pub async fn list_coaches(
        store: &dyn EntityStore,
        identity: &dyn IdentityProvider,
    ) -> Result<Vec<CoachSummary>> {
        let coaches = Self::coaches(identity).await?;
        let clients = list_as::<Client>(store).await?;
        Ok(coaches
            .into_iter()
            .map(|coach| {
                let client_count = clients
                    .iter()
                    .filter(|c| c.coach_email == coach.email)
                    .count();
                CoachSummary {
                    coach,
                    client_count,
                }
            })
            .collect())
    }

    /// Confirm the coach role and set the billing fields.
    pub async fn manage_coach(
        identity: &dyn IdentityProvider,
        id: &str,
        req: &ManageCoachRequest,
    ) -> Result<Principal> {
        let status: SubscriptionStatus = req.subscription_status.parse().map_err(|_| {
            Error::Validation(format!(
                "unknown subscription status: {}",
                req.subscription_status
            ))
        })?;
        if !SUPPORTED_CURRENCIES.contains(&req.currency.as_str()) {
            return Err(Error::Validation(format!(
                "unsupported currency: {}",
                req.currency
            )));
        }
        if !req.subscription_fee_per_client.is_finite() || req.subscription_fee_per_client < 0.0 {
            return Err(Error::Validation(
                "subscription_fee_per_client must be zero or more".into(),
            ));
        }

        identity
            .update(
                id,
                json!({
                    "user_type": "coach",
                    "subscription_status": status.to_string(),
                    "currency": req.currency,
                    "subscription_fee_per_client": req.subscription_fee_per_client,
                }),
            )
            .await
            .map_err(|e| match e {
                Error::NotFound(_) => Error::NotFound("coach"),
                other => other,
            })
    }

    /// Assemble a coach's dashboard through the read-only preview scope.
    pub async fn preview_coach(
        store: &dyn EntityStore,
        identity: &dyn IdentityProvider,
        admin: &Principal,
        id: &str,
    ) -> Result<CoachPreview> {
        let coach = identity.get(id).await.map_err(|e| match e {
            Error::NotFound(_) => Error::NotFound("coach"),
            other => other,
        })?;
        let access = CoachAccess::preview(admin, coach)?;
        let clients = ClientService::list(store, &access).await?;
        let billing = project_billing(access.coach(), clients.len());
        Ok(CoachPreview {
            coach: access.coach().clone(),
            clients,
            billing,
        })
    }

    async fn coaches(identity: &dyn IdentityProvider) -> Result<Vec<Principal>> {
        Ok(identity
            .list()
            .await?
            .into_iter()
            .filter(|u| u.classify() == Actor::Coach)
            .collect())
    }
}
