//! Network layer - marketplace API calls
//!
//! The Network actor receives call commands and sends back typed replies.

pub mod actor;
pub mod client;

pub use actor::NetworkActor;
pub use client::ApiClient;
