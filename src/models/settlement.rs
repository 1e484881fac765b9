//! Settlement records: gateway transactions, driver payouts, cash collections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order::{PaymentMethod, PaymentStatus};
use super::timestamp;

fn default_currency() -> String {
    "mxn".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Platform to driver transfer state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
}

impl TransferStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "Pending",
            TransferStatus::Completed => "Completed",
            TransferStatus::Failed => "Failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverPayout {
    pub id: String,
    pub driver_id: String,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_email: Option<String>,
    pub order_id: String,
    #[serde(default)]
    pub order_title: Option<String>,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub transfer_status: TransferStatus,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DriverPayout {
    /// Only pending payouts may be processed; anything else would pay twice
    pub fn is_processable(&self) -> bool {
        self.transfer_status == TransferStatus::Pending
    }
}

/// Cash a driver collected, with the commission owed back to the platform
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashCollection {
    pub id: String,
    pub driver_id: String,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_email: Option<String>,
    pub order_id: String,
    #[serde(default)]
    pub order_title: Option<String>,
    pub amount_collected: f64,
    pub commission_owed: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub payment_status: PaymentStatus,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub collection_date: Option<DateTime<Utc>>,
}

impl CashCollection {
    pub fn is_outstanding(&self) -> bool {
        self.payment_status == PaymentStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_payout_is_not_processable() {
        let json = r#"{
            "id": "p1", "driver_id": "d1", "order_id": "o1",
            "amount": 255.0, "transfer_status": "completed"
        }"#;
        let payout: DriverPayout = serde_json::from_str(json).unwrap();
        assert_eq!(payout.currency, "mxn");
        assert!(!payout.is_processable());
    }

    #[test]
    fn test_collection_outstanding_until_paid() {
        let json = r#"{
            "id": "c1", "driver_id": "d1", "order_id": "o1",
            "amount_collected": 317.4, "commission_owed": 62.4,
            "payment_status": "pending"
        }"#;
        let mut collection: CashCollection = serde_json::from_str(json).unwrap();
        assert!(collection.is_outstanding());
        collection.payment_status = PaymentStatus::Paid;
        assert!(!collection.is_outstanding());
    }
}
