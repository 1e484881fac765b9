//! # Mandados TUI
//!
//! Terminal client for a last-mile delivery marketplace. One binary serves
//! the three roles of the platform.
//!
//! ## Features
//! - Clients create orders with a live price breakdown and follow them
//! - Drivers verify their identity, accept orders and move them to delivery
//! - Cash-on-delivery with commission tracking
//! - Admin dashboard: users, driver approval, payouts, commission settings
//! - Session persisted between runs
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod financials;
pub mod messages;
pub mod models;
pub mod network;
pub mod session;
pub mod storage;
pub mod ui;
pub mod validation;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use config::Settings;
pub use error::ApiError;
pub use messages::{ApiCall, ApiReply, NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{CommissionConfig, Financials, Order, OrderStatus, Role, User};
pub use network::{ApiClient, NetworkActor};
pub use session::Session;
pub use storage::Storage;
