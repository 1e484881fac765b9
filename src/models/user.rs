use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Role tag of an account. Fixed at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Driver,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Driver => "driver",
            Role::Admin => "admin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Driver => "Driver",
            Role::Admin => "Admin",
        }
    }

    /// Roles offered on the registration screen. Admin accounts are provisioned server-side.
    pub fn next_registrable(&self) -> Role {
        match self {
            Role::Client => Role::Driver,
            Role::Driver | Role::Admin => Role::Client,
        }
    }
}

/// Account record as returned by `/api/auth/me` and `/api/admin/users`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    pub user_type: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_phone_verified: bool,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub premium_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_orders: u32,
    #[serde(default)]
    pub total_earnings: f64,
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn active_label(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }
}

/// Login body
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Registration body
#[derive(Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub user_type: Role,
    pub address: Option<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("user_type", &self.user_type)
            .field("password", &"***")
            .finish_non_exhaustive()
    }
}

/// Token + identity returned by login and register
#[derive(Clone, Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defaults_for_missing_aggregates() {
        let json = r#"{
            "id": "u1",
            "name": "Ana",
            "email": "ana@example.com",
            "phone": "+52 55 1234 5678",
            "user_type": "driver"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_type, Role::Driver);
        assert!(user.is_active);
        assert_eq!(user.total_orders, 0);
        assert_eq!(user.total_earnings, 0.0);
        assert!(user.premium_expires_at.is_none());
    }

    #[test]
    fn test_registration_serializes_role_lowercase() {
        let reg = Registration {
            name: "Luis".into(),
            email: "luis@example.com".into(),
            phone: "5512345678".into(),
            password: "secret123".into(),
            user_type: Role::Client,
            address: None,
        };
        let value = serde_json::to_value(&reg).unwrap();
        assert_eq!(value["user_type"], "client");
        assert!(!format!("{:?}", reg).contains("secret123"));
    }
}
