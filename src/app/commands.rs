//! Command handlers - business logic for processing UI events
//!
//! Handlers return the network commands to send. Mutations go out only when
//! nothing else is in flight; reads may overlap.

use std::path::PathBuf;

use crate::app::forms::Form;
use crate::app::router::dashboard_reads;
use crate::app::state::*;
use crate::app::AppState;
use crate::constants::{COMMISSION_PREVIEW_PRICE, DEFAULT_ORDER_PRICE, VERIFICATION_REQUIRED_MESSAGE};
use crate::financials;
use crate::messages::network::ApiCall;
use crate::messages::ui_events::{cycle, AdminTab, ClientTab, DriverTab, InputMode, View};
use crate::messages::NetworkCommand;
use crate::models::{
    CommissionConfig, Credentials, DocumentKind, Financials, NewOrder, Order, OrderStatus, Registration,
};
use crate::validation;

impl AppState {
    // ========================
    // Request issuing
    // ========================

    fn execute(&mut self, call: ApiCall) -> (u64, NetworkCommand) {
        let id = self.next_id();
        if !call.is_mutation() {
            self.latest_read.insert(call.name(), id);
        }
        tracing::debug!(id, call = call.name(), "Queueing call");
        self.in_flight.insert(id, call.clone());
        let token = self.session.token().map(String::from);
        (id, NetworkCommand::Execute { id, call, token })
    }

    /// Issue a mutation unless another request is still running
    pub fn mutate(&mut self, call: ApiCall) -> Vec<NetworkCommand> {
        if self.is_loading() {
            tracing::debug!(call = call.name(), "Ignoring action while a request is in flight");
            self.notice = Some(Notice::info("Please wait for the current request to finish"));
            return Vec::new();
        }
        let (_, cmd) = self.execute(call);
        vec![cmd]
    }

    /// Issue a read, reusing an identical one already in flight unless `fresh`
    fn read(&mut self, call: ApiCall, fresh: bool, cmds: &mut Vec<NetworkCommand>) -> u64 {
        let running = self
            .in_flight
            .iter()
            .find(|(_, c)| !c.is_mutation() && c.name() == call.name())
            .map(|(id, _)| *id);
        if let (Some(id), false) = (running, fresh) {
            return id;
        }
        let (id, cmd) = self.execute(call);
        cmds.push(cmd);
        id
    }

    /// Fetch every collection of the current dashboard
    pub fn refresh(&mut self) -> Vec<NetworkCommand> {
        self.refresh_tracked(false).0
    }

    /// Dashboard reads and their ids. A `fresh` refresh supersedes reads
    /// issued before the latest mutation instead of joining them.
    pub(crate) fn refresh_tracked(&mut self, fresh: bool) -> (Vec<NetworkCommand>, Vec<u64>) {
        let mut cmds = Vec::new();
        let mut ids = Vec::new();
        if let Some(role) = self.role() {
            for call in dashboard_reads(role) {
                ids.push(self.read(call, fresh, &mut cmds));
            }
        }
        (cmds, ids)
    }

    /// Resolve a persisted token into an identity
    pub fn start(&mut self) -> Vec<NetworkCommand> {
        if self.view() == View::Loading {
            let mut cmds = Vec::new();
            self.read(ApiCall::Me, false, &mut cmds);
            cmds
        } else {
            Vec::new()
        }
    }

    /// Cancel every in-flight request
    pub fn cancel_requests(&mut self) -> Vec<NetworkCommand> {
        if self.in_flight.is_empty() {
            return Vec::new();
        }
        self.notice = Some(Notice::info(format!("Cancelling {} request(s)", self.in_flight.len())));
        self.in_flight.keys().map(|id| NetworkCommand::CancelRequest(*id)).collect()
    }

    // ========================
    // Session
    // ========================

    pub fn logout(&mut self) -> Vec<NetworkCommand> {
        if let Some(user) = self.session.user() {
            tracing::info!(user = %user.email, "Logging out");
        }
        self.end_session(Notice::info("Logged out"))
    }

    /// Drop identity and token, abandon requests and return to the landing screen
    pub(crate) fn end_session(&mut self, notice: Notice) -> Vec<NetworkCommand> {
        let cmds = self
            .in_flight
            .drain()
            .map(|(id, _)| NetworkCommand::CancelRequest(id))
            .collect();
        self.latest_read.clear();
        self.pending_success = None;

        self.session.clear();
        if let Err(e) = self.storage.clear_session() {
            tracing::warn!(error = %e, "Failed to remove persisted session");
        }

        self.input_mode = InputMode::Normal;
        self.prompt = None;
        self.landing = LandingState::default();
        self.client = ClientState::default();
        self.driver = DriverState::default();
        self.admin = AdminState::default();
        self.notice = Some(notice);
        cmds
    }

    // ========================
    // Navigation
    // ========================

    fn move_tab(&mut self, delta: isize) {
        match self.view() {
            View::Client(tab) => self.set_client_tab(cycle(&ClientTab::ALL, tab, delta)),
            View::Driver(tab) => self.set_driver_tab(cycle(&DriverTab::ALL, tab, delta)),
            View::Admin(tab) => self.set_admin_tab(cycle(&AdminTab::ALL, tab, delta)),
            View::Landing | View::Loading => {}
        }
    }

    pub fn next_tab(&mut self) {
        self.move_tab(1);
    }

    pub fn prev_tab(&mut self) {
        self.move_tab(-1);
    }

    pub fn switch_tab(&mut self, idx: usize) {
        match self.view() {
            View::Client(_) => {
                if let Some(tab) = ClientTab::ALL.get(idx) {
                    self.set_client_tab(*tab);
                }
            }
            View::Driver(_) => {
                if let Some(tab) = DriverTab::ALL.get(idx) {
                    self.set_driver_tab(*tab);
                }
            }
            View::Admin(_) => {
                if let Some(tab) = AdminTab::ALL.get(idx) {
                    self.set_admin_tab(*tab);
                }
            }
            View::Landing | View::Loading => {}
        }
    }

    fn set_client_tab(&mut self, tab: ClientTab) {
        self.client.tab = tab;
        self.client.selected = 0;
        self.input_mode = InputMode::Normal;
    }

    fn set_driver_tab(&mut self, tab: DriverTab) {
        self.driver.tab = tab;
        self.driver.selected = 0;
    }

    fn set_admin_tab(&mut self, tab: AdminTab) {
        self.admin.tab = tab;
        self.admin.selected = 0;
        self.input_mode = InputMode::Normal;
        if tab == AdminTab::Commission {
            self.admin.fill_config_form();
        }
    }

    fn list_len(&self) -> usize {
        match self.view() {
            View::Client(ClientTab::Orders) => self.client.orders.len(),
            View::Driver(DriverTab::Available) => self.driver.available.len(),
            View::Driver(DriverTab::Mine) => self.driver.mine.len(),
            View::Admin(_) => self.admin.list_len(),
            _ => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.view() {
            View::Client(_) => Some(&mut self.client.selected),
            View::Driver(_) => Some(&mut self.driver.selected),
            View::Admin(_) => Some(&mut self.admin.selected),
            View::Landing | View::Loading => None,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.list_len();
        if let Some(selected) = self.selection_mut() {
            if len > 0 {
                *selected = (*selected + 1) % len;
            }
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.list_len();
        if let Some(selected) = self.selection_mut() {
            if len > 0 {
                *selected = selected.checked_sub(1).unwrap_or(len - 1);
            }
        }
    }

    /// Keep selections inside their lists after a reload
    pub(crate) fn clamp_selections(&mut self) {
        fn clamp(selected: &mut usize, len: usize) {
            if *selected >= len {
                *selected = len.saturating_sub(1);
            }
        }
        let len = self.list_len();
        if let Some(selected) = self.selection_mut() {
            clamp(selected, len);
        }
    }

    // ========================
    // Form editing
    // ========================

    fn active_form_mut(&mut self) -> Option<&mut Form> {
        match self.view() {
            View::Landing => Some(self.landing.active_form_mut()),
            View::Client(ClientTab::NewOrder) => Some(&mut self.client.form),
            View::Admin(AdminTab::Commission) => Some(&mut self.admin.config_form),
            _ => None,
        }
    }

    pub fn start_editing(&mut self) {
        if self.active_form_mut().is_some() {
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn enter_char(&mut self, c: char) {
        if let Some(field) = self.active_form_mut().and_then(|f| f.focused_mut()) {
            field.insert(c);
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(field) = self.active_form_mut().and_then(|f| f.focused_mut()) {
            field.backspace();
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(field) = self.active_form_mut().and_then(|f| f.focused_mut()) {
            field.move_left();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(field) = self.active_form_mut().and_then(|f| f.focused_mut()) {
            field.move_right();
        }
    }

    pub fn next_field(&mut self) {
        if let Some(form) = self.active_form_mut() {
            form.next_field();
        }
    }

    pub fn prev_field(&mut self) {
        if let Some(form) = self.active_form_mut() {
            form.prev_field();
        }
    }

    /// Enter in a form or `s` on a form screen
    pub fn submit(&mut self) -> Vec<NetworkCommand> {
        match self.view() {
            View::Landing => match self.landing.mode {
                LandingMode::Login => self.login(),
                LandingMode::Register => self.register(),
            },
            View::Client(ClientTab::NewOrder) => self.create_order(),
            View::Admin(AdminTab::Commission) => self.save_commission_config(),
            _ => Vec::new(),
        }
    }

    // ========================
    // Landing
    // ========================

    pub fn toggle_auth_mode(&mut self) {
        self.landing.mode = match self.landing.mode {
            LandingMode::Login => LandingMode::Register,
            LandingMode::Register => LandingMode::Login,
        };
    }

    pub fn cycle_role(&mut self) {
        if self.landing.mode == LandingMode::Register {
            self.landing.role = self.landing.role.next_registrable();
        }
    }

    pub fn login(&mut self) -> Vec<NetworkCommand> {
        let form = &self.landing.login;
        let email = form.value(LOGIN_EMAIL).to_string();
        let password = form.fields.get(LOGIN_PASSWORD).map(|f| f.value.clone()).unwrap_or_default();

        if !validation::is_valid_email(&email) {
            return self.reject_input("Enter a valid email address");
        }
        if password.is_empty() {
            return self.reject_input("Enter your password");
        }

        self.input_mode = InputMode::Normal;
        tracing::info!(email = %email, "Logging in");
        self.mutate(ApiCall::Login(Credentials { email, password }))
    }

    pub fn register(&mut self) -> Vec<NetworkCommand> {
        let form = &self.landing.register;
        let missing = validation::first_missing(&[
            ("Name", form.value(REGISTER_NAME)),
            ("Email", form.value(REGISTER_EMAIL)),
            ("Phone", form.value(REGISTER_PHONE)),
            ("Password", form.value(REGISTER_PASSWORD)),
        ]);
        if let Some(missing) = missing {
            return self.reject_input(format!("{} is required", missing));
        }
        if !validation::is_valid_email(form.value(REGISTER_EMAIL)) {
            return self.reject_input("Enter a valid email address");
        }

        let address = Some(form.value(REGISTER_ADDRESS).to_string()).filter(|a| !a.is_empty());
        let registration = Registration {
            name: form.value(REGISTER_NAME).to_string(),
            email: form.value(REGISTER_EMAIL).to_string(),
            phone: form.value(REGISTER_PHONE).to_string(),
            password: form.fields.get(REGISTER_PASSWORD).map(|f| f.value.clone()).unwrap_or_default(),
            user_type: self.landing.role,
            address,
        };

        self.input_mode = InputMode::Normal;
        tracing::info!(email = %registration.email, role = registration.user_type.as_str(), "Registering");
        self.mutate(ApiCall::Register(registration))
    }

    fn reject_input(&mut self, message: impl Into<String>) -> Vec<NetworkCommand> {
        self.notice = Some(Notice::error(message));
        Vec::new()
    }

    // ========================
    // Client orders
    // ========================

    pub fn new_order(&mut self) {
        self.set_client_tab(ClientTab::NewOrder);
        self.client.form.focus = ORDER_TITLE;
        self.input_mode = InputMode::Editing;
    }

    fn step_order_price(&mut self, steps: i32) {
        if self.view() != View::Client(ClientTab::NewOrder) {
            return;
        }
        let current = self
            .client
            .form
            .value(ORDER_PRICE)
            .trim_start_matches('$')
            .replace(',', "")
            .parse::<f64>()
            .unwrap_or(DEFAULT_ORDER_PRICE);
        let next = financials::step_price(current, steps);
        if let Some(field) = self.client.form.field_mut(ORDER_PRICE) {
            field.set(format!("{}", next));
        }
    }

    pub fn price_up(&mut self) {
        self.step_order_price(1);
    }

    pub fn price_down(&mut self) {
        self.step_order_price(-1);
    }

    pub fn create_order(&mut self) -> Vec<NetworkCommand> {
        let form = &self.client.form;
        let missing = validation::first_missing(&[
            ("Title", form.value(ORDER_TITLE)),
            ("Description", form.value(ORDER_DESCRIPTION)),
            ("Pickup address", form.value(ORDER_PICKUP)),
            ("Delivery address", form.value(ORDER_DELIVERY)),
        ]);
        if let Some(missing) = missing {
            return self.reject_input(format!("{} is required", missing));
        }
        let price = match financials::parse_price(form.value(ORDER_PRICE)) {
            Ok(price) => price,
            Err(e) => return self.reject_input(e.to_string()),
        };

        let form = &self.client.form;
        let order = NewOrder {
            title: form.value(ORDER_TITLE).to_string(),
            description: form.value(ORDER_DESCRIPTION).to_string(),
            pickup_address: form.value(ORDER_PICKUP).to_string(),
            delivery_address: form.value(ORDER_DELIVERY).to_string(),
            price,
        };
        let preview = financials::preview(price, &self.preview_config());

        let cmds = self.mutate(ApiCall::CreateOrder(order));
        if !cmds.is_empty() {
            self.input_mode = InputMode::Normal;
            self.client.expected = Some(preview);
        }
        cmds
    }

    fn selected_client_order(&self) -> Option<&Order> {
        self.client.orders.get(self.client.selected)
    }

    pub fn pay_cash(&mut self) -> Vec<NetworkCommand> {
        let Some(order) = self.selected_client_order() else {
            return Vec::new();
        };
        if !order.can_choose_cash() {
            return self.reject_input("Cash payment is not available for this order");
        }
        let id = order.id.clone();
        self.mutate(ApiCall::PayCash(id))
    }

    // ========================
    // Driver orders
    // ========================

    fn driver_id(&self) -> Option<String> {
        self.session.user_id().map(String::from)
    }

    pub fn accept_order(&mut self) -> Vec<NetworkCommand> {
        let Some(order) = self.driver.available.get(self.driver.selected) else {
            return Vec::new();
        };
        if order.status != OrderStatus::Pending {
            return self.reject_input("This order is no longer available");
        }
        let id = order.id.clone();
        // Refuse early when the last known verification fails the gate
        let phone_verified = self.session.user().is_some_and(|u| u.is_phone_verified);
        if let Some(verification) = &self.driver.verification {
            if !verification.may_accept_orders(phone_verified) {
                return self.reject_input(VERIFICATION_REQUIRED_MESSAGE);
            }
        }
        self.mutate(ApiCall::AcceptOrder(id))
    }

    /// Move the selected delivery one step forward
    pub fn advance_order(&mut self) -> Vec<NetworkCommand> {
        let Some(driver_id) = self.driver_id() else {
            return Vec::new();
        };
        let Some(order) = self.driver.mine.get(self.driver.selected) else {
            return Vec::new();
        };
        let Some(status) = order.next_driver_step(&driver_id) else {
            let message = format!("Nothing to do for an order that is {}", order.status.label());
            return self.reject_input(message);
        };
        let order_id = order.id.clone();
        self.mutate(ApiCall::UpdateOrderStatus { order_id, status })
    }

    pub fn complete_cash(&mut self) -> Vec<NetworkCommand> {
        let Some(driver_id) = self.driver_id() else {
            return Vec::new();
        };
        let Some(order) = self.driver.mine.get(self.driver.selected) else {
            return Vec::new();
        };
        if !order.can_complete_cash(&driver_id) {
            return self.reject_input("Cash can be confirmed only on delivered cash orders still pending payment");
        }
        let id = order.id.clone();
        self.mutate(ApiCall::CompleteCash(id))
    }

    // ========================
    // Driver verification
    // ========================

    pub fn send_email_code(&mut self) -> Vec<NetworkCommand> {
        if self.driver.verification.as_ref().is_some_and(|v| v.email_verified) {
            return self.reject_input("Your email is already verified");
        }
        self.mutate(ApiCall::SendEmailCode)
    }

    pub fn open_code_prompt(&mut self) {
        self.prompt = Some(Prompt::new(PromptKind::VerificationCode));
    }

    pub fn open_document_prompt(&mut self, kind: DocumentKind) {
        self.prompt = Some(Prompt::new(PromptKind::DocumentPath(kind)));
    }

    // ========================
    // Admin
    // ========================

    pub fn toggle_user(&mut self) -> Vec<NetworkCommand> {
        let Some(user) = self.admin.users.get(self.admin.selected) else {
            return Vec::new();
        };
        if Some(user.id.as_str()) == self.session.user_id() {
            return self.reject_input("You cannot deactivate your own account");
        }
        let id = user.id.clone();
        self.mutate(ApiCall::ToggleUserStatus(id))
    }

    pub fn approve_driver(&mut self) -> Vec<NetworkCommand> {
        let Some(driver) = self.admin.pending_drivers.get(self.admin.selected) else {
            return Vec::new();
        };
        let driver_id = driver.id.clone();
        self.mutate(ApiCall::ApproveDriver {
            driver_id,
            approved: true,
            comments: None,
        })
    }

    pub fn open_reject_prompt(&mut self) {
        if let Some(driver) = self.admin.pending_drivers.get(self.admin.selected) {
            self.prompt = Some(Prompt::new(PromptKind::RejectComment {
                driver_id: driver.id.clone(),
                driver_name: driver.name.clone(),
            }));
        }
    }

    pub fn process_payout(&mut self) -> Vec<NetworkCommand> {
        let Some(payout) = self.admin.payouts.get(self.admin.selected) else {
            return Vec::new();
        };
        if !payout.is_processable() {
            let message = format!("Payout already {}", payout.transfer_status.label().to_lowercase());
            return self.reject_notice(message);
        }
        let id = payout.id.clone();
        self.mutate(ApiCall::ProcessPayout(id))
    }

    pub fn mark_commission_paid(&mut self) -> Vec<NetworkCommand> {
        let Some(collection) = self.admin.collections.get(self.admin.selected) else {
            return Vec::new();
        };
        if !collection.is_outstanding() {
            return self.reject_notice("Commission already paid");
        }
        let id = collection.id.clone();
        self.mutate(ApiCall::MarkCommissionPaid(id))
    }

    fn reject_notice(&mut self, message: impl Into<String>) -> Vec<NetworkCommand> {
        self.notice = Some(Notice::info(message));
        Vec::new()
    }

    /// Commission editor contents as a config
    pub fn parse_config_form(&self) -> Result<CommissionConfig, String> {
        let form = &self.admin.config_form;
        let parse = |idx: usize, label: &str| -> Result<f64, String> {
            form.value(idx)
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("{} must be a number", label))
        };
        let config = CommissionConfig {
            commission_rate: parse(CONFIG_RATE, "Commission rate")?,
            service_fee: parse(CONFIG_SERVICE_FEE, "Service fee")?,
            premium_subscription_monthly: parse(CONFIG_PREMIUM, "Premium price")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Breakdown of a sample order under the config being edited
    pub fn commission_preview(&self) -> Option<Financials> {
        self.parse_config_form()
            .ok()
            .map(|config| financials::preview(COMMISSION_PREVIEW_PRICE, &config))
    }

    pub fn save_commission_config(&mut self) -> Vec<NetworkCommand> {
        match self.parse_config_form() {
            Ok(config) => {
                self.input_mode = InputMode::Normal;
                self.mutate(ApiCall::UpdateCommissionConfig(config))
            }
            Err(e) => self.reject_input(e),
        }
    }

    // ========================
    // Prompt popup
    // ========================

    pub fn prompt_char(&mut self, c: char) {
        if let Some(prompt) = &mut self.prompt {
            prompt.input.insert(c);
        }
    }

    pub fn prompt_backspace(&mut self) {
        if let Some(prompt) = &mut self.prompt {
            prompt.input.backspace();
        }
    }

    pub fn prompt_cancel(&mut self) {
        self.prompt = None;
    }

    pub fn prompt_submit(&mut self) -> Vec<NetworkCommand> {
        let Some(prompt) = self.prompt.take() else {
            return Vec::new();
        };
        let value = prompt.input.trimmed().to_string();
        match prompt.kind.clone() {
            PromptKind::VerificationCode => {
                if !validation::is_valid_verification_code(&value) {
                    self.prompt = Some(prompt);
                    return self.reject_input("The code has exactly 6 letters or digits");
                }
                self.mutate(ApiCall::VerifyEmail(value))
            }
            PromptKind::DocumentPath(kind) => {
                if value.is_empty() {
                    self.prompt = Some(prompt);
                    return self.reject_input("Enter the path of the file to upload");
                }
                let path = expand_home(&value);
                self.mutate(ApiCall::UploadDocument { kind, path })
            }
            PromptKind::RejectComment { driver_id, .. } => self.mutate(ApiCall::ApproveDriver {
                driver_id,
                approved: false,
                comments: Some(value).filter(|c| !c.is_empty()),
            }),
        }
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|h| h.join(rest)).unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}
