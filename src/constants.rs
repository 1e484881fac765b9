//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default base URL of the marketplace API
pub const DEFAULT_API_URL: &str = "http://localhost:8001";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application name
pub const APP_NAME: &str = "Mandados";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory under $HOME holding config and session files
pub const CONFIG_DIR_NAME: &str = ".mandados";

/// Log file written next to the working directory
pub const LOG_FILE_NAME: &str = "mandados.log";

/// IVA charged on the service fee. Fixed by law, not configurable.
pub const IVA_RATE: f64 = 0.16;

/// Default commission configuration
pub const DEFAULT_COMMISSION_RATE: f64 = 0.15;
pub const DEFAULT_SERVICE_FEE: f64 = 15.0;
pub const DEFAULT_PREMIUM_MONTHLY: f64 = 200.0;

/// Order price bounds (MXN) and step of the price control
pub const PRICE_MIN: f64 = 50.0;
pub const PRICE_MAX: f64 = 5000.0;
pub const PRICE_STEP: f64 = 10.0;

/// Price the client order form starts at
pub const DEFAULT_ORDER_PRICE: f64 = 100.0;

/// Order price used by the admin commission preview
pub const COMMISSION_PREVIEW_PRICE: f64 = 300.0;

/// Length of the email verification code
pub const VERIFICATION_CODE_LEN: usize = 6;

/// Largest document accepted for upload
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Shown when a driver without full verification tries to accept an order
pub const VERIFICATION_REQUIRED_MESSAGE: &str =
    "Complete your verification (email, phone, INE and license) to accept orders";
