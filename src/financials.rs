//! Order price rules and the client-side Financials preview
//!
//! The service computes the authoritative breakdown; the preview must
//! reproduce it for the same commission config, so the arithmetic below
//! keeps the exact operation order the service uses.

use thiserror::Error;

use crate::constants::{IVA_RATE, PRICE_MAX, PRICE_MIN, PRICE_STEP};
use crate::models::{CommissionConfig, Financials};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceError {
    #[error("price must be a number")]
    NotANumber,
    #[error("price must be between ${min:.0} and ${max:.0}")]
    OutOfRange { min: f64, max: f64 },
    #[error("price must be a multiple of ${step:.0}")]
    OffStep { step: f64 },
}

/// Breakdown a client would pay for `price` under `config`
pub fn preview(price: f64, config: &CommissionConfig) -> Financials {
    let service_fee = config.service_fee;
    let iva_amount = service_fee * IVA_RATE;
    let commission = price * config.commission_rate;
    let total_amount = price + service_fee + iva_amount;
    let owner_earnings = commission + service_fee;
    let driver_earnings = price - commission;

    Financials {
        subtotal: price,
        service_fee,
        iva_amount,
        commission_rate: Some(config.commission_rate),
        commission_amount: commission,
        driver_earnings,
        owner_earnings,
        total_amount,
    }
}

/// Checks a price against the closed range and step
pub fn validate_price(price: f64) -> Result<f64, PriceError> {
    if !price.is_finite() {
        return Err(PriceError::NotANumber);
    }
    if !(PRICE_MIN..=PRICE_MAX).contains(&price) {
        return Err(PriceError::OutOfRange { min: PRICE_MIN, max: PRICE_MAX });
    }
    let steps = (price - PRICE_MIN) / PRICE_STEP;
    if (steps - steps.round()).abs() > 1e-9 {
        return Err(PriceError::OffStep { step: PRICE_STEP });
    }
    Ok(price)
}

/// Parses user input and validates it
pub fn parse_price(raw: &str) -> Result<f64, PriceError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let price = cleaned.parse::<f64>().map_err(|_| PriceError::NotANumber)?;
    validate_price(price)
}

/// Moves the price control by `steps` increments, clamped to the range
pub fn step_price(price: f64, steps: i32) -> f64 {
    let snapped = PRICE_MIN + ((price - PRICE_MIN) / PRICE_STEP).round() * PRICE_STEP;
    (snapped + f64::from(steps) * PRICE_STEP).clamp(PRICE_MIN, PRICE_MAX)
}

/// es-MX peso amount: `$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn config(rate: f64, fee: f64) -> CommissionConfig {
        CommissionConfig {
            commission_rate: rate,
            service_fee: fee,
            premium_subscription_monthly: 200.0,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let f = preview(300.0, &config(0.15, 15.0));
        assert!(close(f.iva_amount, 2.40));
        assert!(close(f.commission_amount, 45.0));
        assert!(close(f.total_amount, 317.40));
        assert!(close(f.owner_earnings, 60.0));
        assert!(close(f.driver_earnings, 255.0));
    }

    #[test]
    fn test_totals_and_split_invariants() {
        for rate in [0.0, 0.1, 0.15, 0.33, 1.0] {
            for fee in [0.0, 12.5, 15.0, 40.0] {
                let cfg = config(rate, fee);
                let mut price = 50.0;
                while price <= 5000.0 {
                    let f = preview(price, &cfg);
                    assert!(close(f.total_amount, price + fee + 0.16 * fee));
                    assert!(close(f.total_amount, f.subtotal + f.service_fee + f.iva_amount));
                    assert!((f.owner_earnings + f.driver_earnings - (price + fee)).abs() < 1e-6);
                    price += 490.0;
                }
            }
        }
    }

    #[test]
    fn test_price_validation() {
        assert_eq!(validate_price(50.0), Ok(50.0));
        assert_eq!(validate_price(300.0), Ok(300.0));
        assert_eq!(validate_price(5000.0), Ok(5000.0));
        assert!(matches!(validate_price(40.0), Err(PriceError::OutOfRange { .. })));
        assert!(matches!(validate_price(5010.0), Err(PriceError::OutOfRange { .. })));
        assert!(matches!(validate_price(305.0), Err(PriceError::OffStep { .. })));
        assert_eq!(validate_price(f64::NAN), Err(PriceError::NotANumber));
    }

    #[test]
    fn test_parse_price_accepts_formatted_input() {
        assert_eq!(parse_price("$1,250"), Ok(1250.0));
        assert_eq!(parse_price(" 300 "), Ok(300.0));
        assert_eq!(parse_price("abc"), Err(PriceError::NotANumber));
    }

    #[test]
    fn test_step_price_clamps() {
        assert_eq!(step_price(50.0, -1), 50.0);
        assert_eq!(step_price(5000.0, 3), 5000.0);
        assert_eq!(step_price(100.0, 1), 110.0);
        assert_eq!(step_price(104.0, 0), 100.0);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(317.4), "$317.40");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(2.4), "$2.40");
        assert_eq!(format_currency(-45.0), "-$45.00");
    }
}
