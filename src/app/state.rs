//! App state - pure data structure with no I/O logic

use std::collections::{HashMap, HashSet};

use crate::app::forms::{Form, TextField};
use crate::config::Settings;
use crate::constants::DEFAULT_ORDER_PRICE;
use crate::financials;
use crate::messages::network::ApiCall;
use crate::messages::ui_events::{AdminTab, ClientTab, DriverTab, InputMode};
use crate::messages::RenderState;
use crate::models::{
    AdminStats, CashCollection, CommissionConfig, Document, DocumentKind, DriverPayout, DriverVerification,
    Financials, Order, PaymentTransaction, Role, User,
};
use crate::session::{Session, SessionPhase};
use crate::storage::Storage;

// Field positions inside each form
pub const LOGIN_EMAIL: usize = 0;
pub const LOGIN_PASSWORD: usize = 1;

pub const REGISTER_NAME: usize = 0;
pub const REGISTER_EMAIL: usize = 1;
pub const REGISTER_PHONE: usize = 2;
pub const REGISTER_PASSWORD: usize = 3;
pub const REGISTER_ADDRESS: usize = 4;

pub const ORDER_TITLE: usize = 0;
pub const ORDER_DESCRIPTION: usize = 1;
pub const ORDER_PICKUP: usize = 2;
pub const ORDER_DELIVERY: usize = 3;
pub const ORDER_PRICE: usize = 4;

pub const CONFIG_RATE: usize = 0;
pub const CONFIG_SERVICE_FEE: usize = 1;
pub const CONFIG_PREMIUM: usize = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LandingMode {
    #[default]
    Login,
    Register,
}

/// Anonymous screen: login and registration forms
#[derive(Clone, Debug, PartialEq)]
pub struct LandingState {
    pub mode: LandingMode,
    pub login: Form,
    pub register: Form,
    pub role: Role,
}

impl Default for LandingState {
    fn default() -> Self {
        LandingState {
            mode: LandingMode::Login,
            login: Form::new(vec![TextField::new("Email"), TextField::masked("Password")]),
            register: Form::new(vec![
                TextField::new("Name"),
                TextField::new("Email"),
                TextField::new("Phone"),
                TextField::masked("Password"),
                TextField::new("Address (optional)"),
            ]),
            role: Role::Client,
        }
    }
}

impl LandingState {
    pub fn active_form(&self) -> &Form {
        match self.mode {
            LandingMode::Login => &self.login,
            LandingMode::Register => &self.register,
        }
    }

    pub fn active_form_mut(&mut self) -> &mut Form {
        match self.mode {
            LandingMode::Login => &mut self.login,
            LandingMode::Register => &mut self.register,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientState {
    pub tab: ClientTab,
    pub orders: Vec<Order>,
    pub selected: usize,
    pub form: Form,
    /// Preview shown when the last order was submitted
    pub expected: Option<Financials>,
}

impl Default for ClientState {
    fn default() -> Self {
        ClientState {
            tab: ClientTab::Orders,
            orders: Vec::new(),
            selected: 0,
            form: new_order_form(),
            expected: None,
        }
    }
}

pub fn new_order_form() -> Form {
    Form::new(vec![
        TextField::new("Title"),
        TextField::new("Description"),
        TextField::new("Pickup address"),
        TextField::new("Delivery address"),
        TextField::new("Price (MXN)").with_value(format!("{}", DEFAULT_ORDER_PRICE)),
    ])
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriverState {
    pub tab: DriverTab,
    pub available: Vec<Order>,
    pub mine: Vec<Order>,
    pub selected: usize,
    pub verification: Option<DriverVerification>,
    pub documents: Vec<Document>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdminState {
    pub tab: AdminTab,
    pub stats: Option<AdminStats>,
    pub users: Vec<User>,
    pub orders: Vec<Order>,
    pub pending_drivers: Vec<User>,
    pub transactions: Vec<PaymentTransaction>,
    pub payouts: Vec<DriverPayout>,
    pub collections: Vec<CashCollection>,
    pub config: Option<CommissionConfig>,
    pub config_form: Form,
    pub selected: usize,
}

impl Default for AdminState {
    fn default() -> Self {
        AdminState {
            tab: AdminTab::Overview,
            stats: None,
            users: Vec::new(),
            orders: Vec::new(),
            pending_drivers: Vec::new(),
            transactions: Vec::new(),
            payouts: Vec::new(),
            collections: Vec::new(),
            config: None,
            config_form: Form::new(vec![
                TextField::new("Commission rate (0-1)"),
                TextField::new("Service fee (MXN)"),
                TextField::new("Premium monthly (MXN)"),
            ]),
            selected: 0,
        }
    }
}

impl AdminState {
    /// Load the fetched config into the editor
    pub fn fill_config_form(&mut self) {
        let config = self.config.clone().unwrap_or_default();
        let values = [
            config.commission_rate.to_string(),
            config.service_fee.to_string(),
            config.premium_subscription_monthly.to_string(),
        ];
        for (idx, value) in values.into_iter().enumerate() {
            if let Some(field) = self.config_form.field_mut(idx) {
                field.set(value);
            }
        }
    }

    /// Rows in the list shown by the current tab
    pub fn list_len(&self) -> usize {
        match self.tab {
            AdminTab::Overview | AdminTab::Commission => 0,
            AdminTab::Users => self.users.len(),
            AdminTab::Orders => self.orders.len(),
            AdminTab::Drivers => self.pending_drivers.len(),
            AdminTab::Payments => self.transactions.len(),
            AdminTab::Payouts => self.payouts.len(),
            AdminTab::Collections => self.collections.len(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Status line shown at the bottom of every screen
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// What a prompt popup collects
#[derive(Clone, Debug, PartialEq)]
pub enum PromptKind {
    RejectComment { driver_id: String, driver_name: String },
    VerificationCode,
    DocumentPath(DocumentKind),
}

impl PromptKind {
    pub fn title(&self) -> String {
        match self {
            PromptKind::RejectComment { driver_name, .. } => format!("Reject {} - comment (optional)", driver_name),
            PromptKind::VerificationCode => "Verification code from your email".to_string(),
            PromptKind::DocumentPath(kind) => format!("Path to your {} image", kind.label()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: TextField,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Prompt {
            kind,
            input: TextField::new(""),
        }
    }
}

/// Success line held back until the re-fetch after a mutation lands
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSuccess {
    pub message: String,
    pub awaiting: HashSet<u64>,
}

/// Main application state - pure data, no I/O
pub struct AppState {
    pub settings: Settings,
    pub storage: Storage,
    pub session: Session,

    // Screens
    pub input_mode: InputMode,
    pub landing: LandingState,
    pub client: ClientState,
    pub driver: DriverState,
    pub admin: AdminState,

    // Requests
    pub next_request_id: u64,
    pub in_flight: HashMap<u64, ApiCall>,
    /// Newest request id per read call, older replies are dropped
    pub latest_read: HashMap<&'static str, u64>,
    pub pending_success: Option<PendingSuccess>,

    // Popups
    pub notice: Option<Notice>,
    pub prompt: Option<Prompt>,
    pub show_help: bool,
}

impl AppState {
    /// State for a fresh run, picking up a token persisted for the configured server
    pub fn new(settings: Settings, storage: Storage) -> Self {
        let session = match storage.load_session(&settings.api_url) {
            Some(stored) => Session::restored(stored.token),
            None => Session::anonymous(),
        };
        Self::with_session(settings, storage, session)
    }

    pub fn with_session(settings: Settings, storage: Storage, session: Session) -> Self {
        AppState {
            settings,
            storage,
            session,
            input_mode: InputMode::Normal,
            landing: LandingState::default(),
            client: ClientState::default(),
            driver: DriverState::default(),
            admin: AdminState::default(),
            next_request_id: 1,
            in_flight: HashMap::new(),
            latest_read: HashMap::new(),
            pending_success: None,
            notice: None,
            prompt: None,
            show_help: false,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn role(&self) -> Option<Role> {
        match self.session.phase() {
            SessionPhase::Authenticated(role) => Some(role),
            _ => None,
        }
    }

    /// Commission used for order previews. Only admins can read the live config.
    pub fn preview_config(&self) -> CommissionConfig {
        match (self.role(), &self.admin.config) {
            (Some(Role::Admin), Some(config)) => config.clone(),
            _ => self.settings.commission.clone(),
        }
    }

    /// Preview for the price typed in the order form
    pub fn order_preview(&self) -> Result<Financials, String> {
        let price = financials::parse_price(self.client.form.value(ORDER_PRICE)).map_err(|e| e.to_string())?;
        Ok(financials::preview(price, &self.preview_config()))
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let (order_preview, order_price_error) = match self.order_preview() {
            Ok(preview) => (Some(preview), None),
            Err(e) => (None, Some(e)),
        };

        RenderState {
            view: self.view(),
            input_mode: self.input_mode,
            show_help: self.show_help,
            is_loading: self.is_loading(),
            in_flight: self.in_flight.len(),
            notice: self.notice.clone(),
            prompt: self.prompt.clone(),
            user: self.session.user().cloned(),
            api_url: self.settings.api_url.clone(),
            landing: self.landing.clone(),
            client: self.client.clone(),
            driver: self.driver.clone(),
            admin: self.admin.clone(),
            order_preview,
            order_price_error,
            commission_preview: self.commission_preview(),
        }
    }
}
