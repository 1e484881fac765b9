use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COMMISSION_RATE, DEFAULT_PREMIUM_MONTHLY, DEFAULT_SERVICE_FEE};

/// Platform-wide commission settings. Replaced wholesale by admin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommissionConfig {
    /// Fraction of the order subtotal kept by the platform, in [0, 1]
    pub commission_rate: f64,
    /// Fixed fee charged to the client per order (MXN)
    pub service_fee: f64,
    pub premium_subscription_monthly: f64,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        CommissionConfig {
            commission_rate: DEFAULT_COMMISSION_RATE,
            service_fee: DEFAULT_SERVICE_FEE,
            premium_subscription_monthly: DEFAULT_PREMIUM_MONTHLY,
        }
    }
}

impl CommissionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.commission_rate.is_finite() || !(0.0..=1.0).contains(&self.commission_rate) {
            return Err("Commission rate must be between 0 and 1".to_string());
        }
        if !self.service_fee.is_finite() || self.service_fee < 0.0 {
            return Err("Service fee cannot be negative".to_string());
        }
        if !self.premium_subscription_monthly.is_finite() || self.premium_subscription_monthly < 0.0 {
            return Err("Premium subscription price cannot be negative".to_string());
        }
        Ok(())
    }
}

/// Aggregates shown on the admin overview
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminStats {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub total_commission_earned: f64,
    pub active_users: u64,
    pub active_drivers: u64,
    pub pending_orders: u64,
    pub completed_orders: u64,
    pub monthly_revenue: f64,
    pub monthly_commission: f64,
    pub average_order_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation_bounds() {
        assert!(CommissionConfig::default().validate().is_ok());

        let mut config = CommissionConfig::default();
        config.commission_rate = 1.5;
        assert!(config.validate().is_err());

        config.commission_rate = 1.0;
        config.service_fee = -1.0;
        assert!(config.validate().is_err());

        config.service_fee = 0.0;
        config.premium_subscription_monthly = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stats_tolerate_partial_payload() {
        let stats: AdminStats = serde_json::from_str(r#"{"total_orders": 12}"#).unwrap();
        assert_eq!(stats.total_orders, 12);
        assert_eq!(stats.monthly_revenue, 0.0);
    }
}
