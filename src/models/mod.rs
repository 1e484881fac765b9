//! Wire types of the marketplace API
//!
//! Everything here mirrors what the service sends and accepts. The client
//! holds these as transient copies and re-fetches after every mutation.

pub mod admin;
pub mod order;
pub mod settlement;
pub mod user;
pub mod verification;

pub use admin::{AdminStats, CommissionConfig};
pub use order::{Financials, NewOrder, Order, OrderStatus, PaymentMethod, PaymentStatus};
pub use settlement::{CashCollection, DriverPayout, PaymentTransaction, TransferStatus};
pub use user::{AuthResponse, Credentials, Registration, Role, User};
pub use verification::{Document, DocumentKind, DocumentStatus, DocumentUpload, DriverVerification};

/// Timestamp deserialization that accepts both RFC 3339 and naive ISO-8601.
///
/// The service emits naive UTC datetimes (`2024-05-01T12:30:00.123456`)
/// on some endpoints and offset-qualified ones on others.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

}
