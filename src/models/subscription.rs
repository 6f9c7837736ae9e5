use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::store::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Failed,
}

/// A billing row written by the payment webhook. Read-only to this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub coach_email: String,
    pub amount_due: f64,
    pub status: PaymentStatus,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

impl Entity for Subscription {
    const NAME: &'static str = "Subscription";
}

/// Total collected revenue: the sum of `amount_due` over paid rows.
pub fn paid_revenue(subscriptions: &[Subscription]) -> f64 {
    subscriptions
        .iter()
        .filter(|s| s.status == PaymentStatus::Paid)
        .map(|s| s.amount_due)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(status: PaymentStatus, amount_due: f64) -> Subscription {
        Subscription {
            id: "s".into(),
            coach_email: "coach@example.com".into(),
            amount_due,
            status,
            created_date: None,
        }
    }

    #[test]
    fn revenue_counts_only_paid_rows() {
        let subs = vec![
            sub(PaymentStatus::Paid, 30.0),
            sub(PaymentStatus::Pending, 99.0),
            sub(PaymentStatus::Paid, 12.5),
            sub(PaymentStatus::Failed, 50.0),
        ];
        assert_eq!(paid_revenue(&subs), 42.5);
    }

    #[test]
    fn revenue_of_nothing_is_zero() {
        assert_eq!(paid_revenue(&[]), 0.0);
    }
}
