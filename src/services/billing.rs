use serde::Serialize;

use crate::models::principal::{Principal, SubscriptionStatus};

/// Fee charged per client seat when the admin has not set one.
pub const DEFAULT_FEE_PER_CLIENT: f64 = 10.0;

/// What the subscription card shows. Computed from stored fields only —
/// no payment-provider call is involved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingProjection {
    pub monthly_fee: f64,
    pub display_status: SubscriptionStatus,
    pub currency: String,
}

/// Project a coach's billing card. A coach with no clients is still billed
/// for one seat; an unset or unrecognized stored status displays as trial.
pub fn project_billing(coach: &Principal, client_count: usize) -> BillingProjection {
    let fee = coach
        .subscription_fee_per_client
        .unwrap_or(DEFAULT_FEE_PER_CLIENT);
    BillingProjection {
        monthly_fee: fee * client_count.max(1) as f64,
        display_status: coach
            .subscription_status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(SubscriptionStatus::Trial),
        currency: coach.currency.clone().unwrap_or_else(|| "gbp".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coach(fee: Option<f64>, status: Option<&str>, currency: Option<&str>) -> Principal {
        serde_json::from_value(json!({
            "id": "K1",
            "email": "jo@x.com",
            "role": "user",
            "user_type": "coach",
            "subscription_fee_per_client": fee,
            "subscription_status": status,
            "currency": currency,
        }))
        .unwrap()
    }

    #[test]
    fn fee_times_client_count() {
        let projection = project_billing(&coach(Some(12.0), Some("active"), Some("gbp")), 5);
        assert_eq!(projection.monthly_fee, 60.0);
        assert_eq!(projection.display_status, SubscriptionStatus::Active);
        assert_eq!(projection.currency, "gbp");
    }

    #[test]
    fn zero_clients_still_bills_one_seat() {
        let projection = project_billing(&coach(Some(15.0), Some("active"), None), 0);
        assert_eq!(projection.monthly_fee, 15.0);
    }

    #[test]
    fn defaults_fee_ten_status_trial_currency_gbp() {
        let projection = project_billing(&coach(None, None, None), 3);
        assert_eq!(projection.monthly_fee, 30.0);
        assert_eq!(projection.display_status, SubscriptionStatus::Trial);
        assert_eq!(projection.currency, "gbp");
    }

    #[test]
    fn unrecognized_status_displays_as_trial() {
        let projection = project_billing(&coach(None, Some("comped"), None), 1);
        assert_eq!(projection.display_status, SubscriptionStatus::Trial);
    }
}
