//! Render state - data structure sent from App layer to UI for rendering

use crate::app::state::{AdminState, ClientState, DriverState, LandingState, Notice, Prompt};
use crate::messages::ui_events::{InputMode, KeyContext, View};
use crate::models::{Financials, User};

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    pub view: View,
    pub input_mode: InputMode,
    pub show_help: bool,

    // Requests
    pub is_loading: bool,
    pub in_flight: usize,

    // Status line and popup
    pub notice: Option<Notice>,
    pub prompt: Option<Prompt>,

    // Session
    pub user: Option<User>,
    pub api_url: String,

    // Screens
    pub landing: LandingState,
    pub client: ClientState,
    pub driver: DriverState,
    pub admin: AdminState,

    // Derived previews
    pub order_preview: Option<Financials>,
    pub order_price_error: Option<String>,
    pub commission_preview: Option<Financials>,
}

impl RenderState {
    /// Context the UI loop needs to map keys
    pub fn key_context(&self) -> KeyContext {
        KeyContext {
            view: self.view,
            input_mode: self.input_mode,
            show_help: self.show_help,
            prompt_open: self.prompt.is_some(),
        }
    }

    /// Phone flag of the signed-in user, which the verification view lacks
    pub fn phone_verified(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_phone_verified)
    }
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            view: View::Loading,
            input_mode: InputMode::Normal,
            show_help: false,
            is_loading: false,
            in_flight: 0,
            notice: None,
            prompt: None,
            user: None,
            api_url: String::new(),
            landing: LandingState::default(),
            client: ClientState::default(),
            driver: DriverState::default(),
            admin: AdminState::default(),
            order_preview: None,
            order_price_error: None,
            commission_preview: None,
        }
    }
}
