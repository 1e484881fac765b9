use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Lifecycle of a delivery order
///
/// `pending → accepted → in_progress → delivered`, with `cancelled`
/// reachable from `pending` or `accepted`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    InProgress,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::InProgress => "On the way",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// The only status this one may move forward to
    pub fn advance(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Accepted),
            OrderStatus::Accepted => Some(OrderStatus::InProgress),
            OrderStatus::InProgress => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Single-step forward moves, plus cancellation before pickup
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if target == OrderStatus::Cancelled {
            return matches!(self, OrderStatus::Pending | OrderStatus::Accepted);
        }
        self.advance() == Some(target)
    }
}

/// Settlement state, orthogonal to [`OrderStatus`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
    Expired,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Payment pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Cancelled => "Payment cancelled",
            PaymentStatus::Expired => "Payment expired",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::CreditCard => "Card",
        }
    }
}

/// Monetary breakdown of an order. Computed once by the service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub subtotal: f64,
    pub service_fee: f64,
    pub iva_amount: f64,
    #[serde(default)]
    pub commission_rate: Option<f64>,
    #[serde(default)]
    pub commission_amount: f64,
    pub driver_earnings: f64,
    pub owner_earnings: f64,
    pub total_amount: f64,
}

impl Financials {
    /// Compares two breakdowns to the cent
    pub fn matches(&self, other: &Financials) -> bool {
        fn cents(amount: f64) -> i64 {
            (amount * 100.0).round() as i64
        }
        cents(self.subtotal) == cents(other.subtotal)
            && cents(self.service_fee) == cents(other.service_fee)
            && cents(self.iva_amount) == cents(other.iva_amount)
            && cents(self.total_amount) == cents(other.total_amount)
            && cents(self.owner_earnings) == cents(other.owner_earnings)
            && cents(self.driver_earnings) == cents(other.driver_earnings)
    }
}

/// A delivery request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub pickup_address: String,
    pub delivery_address: String,
    pub price: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub financials: Option<Financials>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Amount the client pays, falling back to the bare price for legacy orders
    pub fn amount_due(&self) -> f64 {
        self.financials
            .as_ref()
            .map(|f| f.total_amount)
            .unwrap_or(self.price)
    }

    pub fn is_assigned_to(&self, driver_id: &str) -> bool {
        self.driver_id.as_deref() == Some(driver_id)
    }

    /// Next status the assigned driver may set through the status endpoint
    pub fn next_driver_step(&self, driver_id: &str) -> Option<OrderStatus> {
        if !self.is_assigned_to(driver_id) {
            return None;
        }
        match self.status {
            OrderStatus::Accepted | OrderStatus::InProgress => self.status.advance(),
            _ => None,
        }
    }

    /// Client may declare cash payment while nothing has been settled
    pub fn can_choose_cash(&self) -> bool {
        self.payment_status == PaymentStatus::Pending
            && self.payment_method != Some(PaymentMethod::Cash)
            && self.status != OrderStatus::Cancelled
    }

    /// Driver may confirm cash once delivered
    pub fn can_complete_cash(&self, driver_id: &str) -> bool {
        self.is_assigned_to(driver_id)
            && self.status == OrderStatus::Delivered
            && self.payment_method == Some(PaymentMethod::Cash)
            && self.payment_status == PaymentStatus::Pending
    }
}

/// Body of `POST /api/orders`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewOrder {
    pub title: String,
    pub description: String,
    pub pickup_address: String,
    pub delivery_address: String,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(status: OrderStatus, driver: Option<&str>) -> Order {
        Order {
            id: "o1".into(),
            client_id: "c1".into(),
            client_name: None,
            driver_id: driver.map(String::from),
            driver_name: None,
            title: "Groceries".into(),
            description: String::new(),
            pickup_address: "Av. Reforma 1".into(),
            delivery_address: "Calle 5 #20".into(),
            price: 300.0,
            status,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            financials: None,
            created_at: None,
            accepted_at: None,
            delivered_at: None,
        }
    }

    #[test]
    fn test_status_advances_one_step_forward() {
        let mut status = OrderStatus::Pending;
        let mut seen = vec![status];
        while let Some(next) = status.advance() {
            assert!(status.can_transition_to(next));
            status = next;
            seen.push(status);
        }
        assert_eq!(
            seen,
            vec![
                OrderStatus::Pending,
                OrderStatus::Accepted,
                OrderStatus::InProgress,
                OrderStatus::Delivered
            ]
        );
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::InProgress));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::InProgress.can_transition_to(OrderStatus::Accepted));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Accepted.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Cancelled.advance().is_none());
    }

    #[test]
    fn test_only_assigned_driver_moves_order() {
        let accepted = order(OrderStatus::Accepted, Some("d1"));
        assert_eq!(accepted.next_driver_step("d1"), Some(OrderStatus::InProgress));
        assert_eq!(accepted.next_driver_step("d2"), None);

        let pending = order(OrderStatus::Pending, None);
        assert_eq!(pending.next_driver_step("d1"), None);
    }

    #[test]
    fn test_cash_completion_requires_delivery() {
        let mut o = order(OrderStatus::InProgress, Some("d1"));
        o.payment_method = Some(PaymentMethod::Cash);
        assert!(!o.can_complete_cash("d1"));

        o.status = OrderStatus::Delivered;
        assert!(o.can_complete_cash("d1"));
        assert!(!o.can_complete_cash("d2"));

        o.payment_status = PaymentStatus::Paid;
        assert!(!o.can_complete_cash("d1"));
    }

    #[test]
    fn test_order_deserializes_service_payload() {
        let json = r#"{
            "id": "o9",
            "client_id": "c1",
            "client_name": "Ana",
            "title": "Pharmacy run",
            "description": "",
            "pickup_address": "A",
            "delivery_address": "B",
            "price": 300.0,
            "status": "in_progress",
            "payment_status": "pending",
            "payment_method": "cash",
            "financials": {
                "subtotal": 300.0, "service_fee": 15.0, "iva_amount": 2.4,
                "commission_rate": 0.15, "commission_amount": 45.0,
                "driver_earnings": 255.0, "owner_earnings": 60.0, "total_amount": 317.4
            },
            "created_at": "2024-05-01T12:30:00.123456"
        }"#;
        let o: Order = serde_json::from_str(json).unwrap();
        assert_eq!(o.status, OrderStatus::InProgress);
        assert_eq!(o.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(o.amount_due(), 317.4);
        assert!(o.created_at.is_some());
    }
}
