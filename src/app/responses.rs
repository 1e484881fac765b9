//! Network response handling
//!
//! Replies update the role state they belong to. A mutation's success line is
//! shown only after the re-fetch it triggers has landed.

use crate::app::state::{new_order_form, Notice, PendingSuccess};
use crate::app::AppState;
use crate::constants::VERIFICATION_REQUIRED_MESSAGE;
use crate::error::ApiError;
use crate::financials::format_currency;
use crate::messages::network::{ApiCall, ApiReply};
use crate::messages::ui_events::{ClientTab, InputMode};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{AuthResponse, Order, Role};

impl AppState {
    pub fn handle_response(&mut self, response: NetworkResponse) -> Vec<NetworkCommand> {
        let id = response.id();
        let Some(call) = self.in_flight.remove(&id) else {
            tracing::debug!(id, "Ignoring response for a request no longer tracked");
            return Vec::new();
        };

        match response {
            NetworkResponse::Completed { result: Ok(reply), .. } => self.apply_reply(id, call, reply),
            NetworkResponse::Completed { result: Err(err), .. } => self.apply_failure(id, call, err),
            NetworkResponse::Cancelled { .. } => {
                tracing::info!(id, call = call.name(), "Call cancelled");
                if matches!(call, ApiCall::Me) {
                    self.session.clear();
                }
                self.settle(id);
                Vec::new()
            }
        }
    }

    /// Mark a tracked re-fetch as finished and release the held success line
    fn settle(&mut self, id: u64) {
        let done = match &mut self.pending_success {
            Some(pending) => {
                pending.awaiting.remove(&id);
                pending.awaiting.is_empty()
            }
            None => false,
        };
        if done {
            if let Some(pending) = self.pending_success.take() {
                self.notice = Some(Notice::success(pending.message));
            }
        }
    }

    /// Whether a read reply is the newest one issued for its call
    fn is_current(&self, id: u64, call: &ApiCall) -> bool {
        self.latest_read.get(call.name()) == Some(&id)
    }

    fn apply_reply(&mut self, id: u64, call: ApiCall, reply: ApiReply) -> Vec<NetworkCommand> {
        if !call.is_mutation() && !self.is_current(id, &call) {
            tracing::debug!(id, call = call.name(), "Dropping superseded reply");
            self.settle(id);
            return Vec::new();
        }

        match reply {
            ApiReply::Auth(auth) => return self.on_authenticated(&call, auth),
            ApiReply::Me(user) => {
                tracing::info!(user = %user.email, role = user.user_type.as_str(), "Session restored");
                self.session.resolve(user);
                return self.refresh();
            }
            ApiReply::Orders(orders) => {
                match self.role() {
                    Some(Role::Client) => self.client.orders = orders,
                    Some(Role::Driver) => self.driver.available = orders,
                    Some(Role::Admin) => self.admin.orders = orders,
                    None => {}
                }
            }
            ApiReply::DriverOrders(orders) => self.driver.mine = orders,
            ApiReply::Verification(verification) => self.driver.verification = Some(verification),
            ApiReply::Documents(documents) => self.driver.documents = documents,
            ApiReply::Stats(stats) => self.admin.stats = Some(stats),
            ApiReply::Users(users) => self.admin.users = users,
            ApiReply::PendingDrivers(drivers) => self.admin.pending_drivers = drivers,
            ApiReply::Commission(config) => {
                self.admin.config = Some(config);
                if self.input_mode == InputMode::Normal {
                    self.admin.fill_config_form();
                }
            }
            ApiReply::Payouts(payouts) => self.admin.payouts = payouts,
            ApiReply::Collections(collections) => self.admin.collections = collections,
            ApiReply::Transactions(transactions) => self.admin.transactions = transactions,
            ApiReply::OrderCreated(order) => {
                let message = self.on_order_created(&order);
                return self.after_mutation(message);
            }
            ApiReply::Done => {
                let message = call.success_message();
                return self.after_mutation(message);
            }
        }

        self.clamp_selections();
        self.settle(id);
        Vec::new()
    }

    fn on_authenticated(&mut self, call: &ApiCall, auth: AuthResponse) -> Vec<NetworkCommand> {
        let token = auth.access_token.clone();
        let name = auth.user.name.clone();
        tracing::info!(user = %auth.user.email, role = auth.user.user_type.as_str(), "Authenticated");

        self.session.establish(auth);
        if let Err(e) = self.storage.save_session(&token, &self.settings.api_url) {
            tracing::warn!(error = %e, "Failed to persist session");
        }

        self.landing.login.clear_masked();
        self.landing.register.clear_masked();
        self.notice = Some(Notice::success(match call {
            ApiCall::Register(_) => format!("Account created. Welcome, {}", name),
            _ => format!("Welcome, {}", name),
        }));
        self.refresh()
    }

    /// Compare the server's breakdown with the preview shown before sending
    fn on_order_created(&mut self, order: &Order) -> Option<String> {
        let expected = self.client.expected.take();
        self.client.form = new_order_form();
        self.client.tab = ClientTab::Orders;
        self.client.selected = 0;

        match (expected, &order.financials) {
            (Some(expected), Some(actual)) if !expected.matches(actual) => {
                tracing::warn!(
                    order_id = %order.id,
                    expected_total = expected.total_amount,
                    actual_total = actual.total_amount,
                    "Order breakdown differs from preview"
                );
                Some(format!(
                    "Order created. Total charged by the server is {} (preview was {})",
                    format_currency(actual.total_amount),
                    format_currency(expected.total_amount)
                ))
            }
            _ => Some(format!("Order created for {}", format_currency(order.amount_due()))),
        }
    }

    /// Re-fetch the dashboard, then show `message`
    fn after_mutation(&mut self, message: Option<String>) -> Vec<NetworkCommand> {
        let (cmds, ids) = self.refresh_tracked(true);
        if let Some(message) = message {
            if ids.is_empty() {
                self.notice = Some(Notice::success(message));
            } else {
                self.pending_success = Some(PendingSuccess {
                    message,
                    awaiting: ids.into_iter().collect(),
                });
            }
        }
        cmds
    }

    fn apply_failure(&mut self, id: u64, call: ApiCall, err: ApiError) -> Vec<NetworkCommand> {
        tracing::warn!(id, call = call.name(), error = %err, "Call failed");

        if err.ends_session() && !matches!(call, ApiCall::Login(_) | ApiCall::Register(_)) {
            return self.end_session(Notice::error(err.user_message(call.failure_message())));
        }

        self.settle(id);

        if !call.is_mutation() && !self.is_current(id, &call) {
            tracing::debug!(id, call = call.name(), "Dropping superseded failure");
            return Vec::new();
        }

        if matches!(call, ApiCall::Me) {
            self.session.clear();
            self.notice = Some(Notice::error(format!(
                "Could not restore your session: {}",
                err.user_message(call.failure_message())
            )));
            return Vec::new();
        }

        let text = match (&call, &err) {
            (ApiCall::AcceptOrder(_), ApiError::Forbidden { .. }) => VERIFICATION_REQUIRED_MESSAGE.to_string(),
            _ => err.user_message(call.failure_message()),
        };
        self.notice = Some(Notice::error(text));

        if let ApiCall::CreateOrder(_) = call {
            self.client.expected = None;
        }

        // The server refused a transition on stale data; show the current state
        let stale = matches!(
            err,
            ApiError::Forbidden { .. } | ApiError::NotFound { .. } | ApiError::Rejected { .. }
        );
        if call.is_mutation() && stale && self.role().is_some() {
            return self.refresh();
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::financials;
    use crate::messages::ui_events::View;
    use crate::models::{OrderStatus, PaymentStatus};
    use crate::session::Session;
    use crate::storage::Storage;
    use tempfile::TempDir;

    const API: &str = "http://localhost:8001";

    fn signed_in(role: Role) -> (AppState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path());
        storage.save_session("tok", API).unwrap();

        let auth: AuthResponse = serde_json::from_value(serde_json::json!({
            "access_token": "tok",
            "user": {"id": "u1", "name": "Ana", "email": "ana@example.com", "user_type": role.as_str()}
        }))
        .unwrap();
        let mut session = Session::anonymous();
        session.establish(auth);
        (AppState::with_session(Settings::default(), storage, session), dir)
    }

    fn order(id: &str) -> Order {
        Order {
            id: id.into(),
            client_id: "u1".into(),
            client_name: None,
            driver_id: None,
            driver_name: None,
            title: "Groceries".into(),
            description: "Milk".into(),
            pickup_address: "Av. Reforma 1".into(),
            delivery_address: "Calle 5 #20".into(),
            price: 300.0,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            financials: None,
            created_at: None,
            accepted_at: None,
            delivered_at: None,
        }
    }

    fn ids(cmds: &[NetworkCommand]) -> Vec<u64> {
        cmds.iter()
            .filter_map(|c| match c {
                NetworkCommand::Execute { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn ok(id: u64, reply: ApiReply) -> NetworkResponse {
        NetworkResponse::Completed {
            id,
            result: Ok(reply),
            time_ms: 1,
        }
    }

    fn err(id: u64, error: ApiError) -> NetworkResponse {
        NetworkResponse::Completed {
            id,
            result: Err(error),
            time_ms: 1,
        }
    }

    #[test]
    fn test_unauthorized_read_ends_session() {
        let (mut state, _dir) = signed_in(Role::Client);
        let cmds = state.refresh();
        let id = ids(&cmds)[0];

        let cancels = state.handle_response(err(id, ApiError::Unauthenticated));
        assert!(cancels.is_empty());
        assert_eq!(state.view(), View::Landing);
        assert!(state.session.token().is_none());
        assert!(state.storage.load_session(API).is_none());
        assert_eq!(state.notice.as_ref().map(|n| n.level), Some(crate::app::state::NoticeLevel::Error));
    }

    #[test]
    fn test_unauthorized_cancels_other_requests() {
        let (mut state, _dir) = signed_in(Role::Driver);
        let reads = ids(&state.refresh());
        assert_eq!(reads.len(), 4);

        let cmds = state.handle_response(err(reads[0], ApiError::Unauthenticated));
        let cancelled: Vec<u64> = cmds
            .iter()
            .filter_map(|c| match c {
                NetworkCommand::CancelRequest(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(cancelled.len(), 3);
        assert!(state.in_flight.is_empty());

        // Late replies for the abandoned reads change nothing
        assert!(state.handle_response(ok(reads[1], ApiReply::DriverOrders(vec![order("o1")]))).is_empty());
        assert!(state.driver.mine.is_empty());
    }

    #[test]
    fn test_success_notice_waits_for_refetch() {
        let (mut state, _dir) = signed_in(Role::Client);
        let mutation = ids(&state.mutate(ApiCall::PayCash("o1".into())))[0];

        let refetch = ids(&state.handle_response(ok(mutation, ApiReply::Done)));
        assert_eq!(refetch.len(), 1);
        assert!(state.notice.is_none());
        assert!(state.pending_success.is_some());

        state.handle_response(ok(refetch[0], ApiReply::Orders(vec![order("o1")])));
        let notice = state.notice.clone().unwrap();
        assert!(notice.text.starts_with("Cash payment set"));
        assert_eq!(state.client.orders.len(), 1);
    }

    #[test]
    fn test_mutations_are_single_flight() {
        let (mut state, _dir) = signed_in(Role::Client);
        assert_eq!(state.mutate(ApiCall::PayCash("o1".into())).len(), 1);
        assert!(state.mutate(ApiCall::PayCash("o2".into())).is_empty());
        assert_eq!(state.in_flight.len(), 1);
    }

    #[test]
    fn test_refresh_joins_reads_in_flight() {
        let (mut state, _dir) = signed_in(Role::Admin);
        let first = ids(&state.refresh());
        assert_eq!(first.len(), 8);
        assert!(state.refresh().is_empty());
        assert_eq!(state.in_flight.len(), 8);
    }

    #[test]
    fn test_refetch_supersedes_older_read() {
        let (mut state, _dir) = signed_in(Role::Client);
        let mutation = ids(&state.mutate(ApiCall::PayCash("o1".into())))[0];
        // Refresh pressed while the mutation runs
        let stale = ids(&state.refresh())[0];

        let fresh = ids(&state.handle_response(ok(mutation, ApiReply::Done)))[0];
        assert_ne!(stale, fresh);

        state.handle_response(ok(fresh, ApiReply::Orders(vec![order("new")])));
        state.handle_response(ok(stale, ApiReply::Orders(vec![order("old")])));
        assert_eq!(state.client.orders[0].id, "new");
    }

    #[test]
    fn test_superseded_read_failure_keeps_notice() {
        let (mut state, _dir) = signed_in(Role::Client);
        let mutation = ids(&state.mutate(ApiCall::PayCash("o1".into())))[0];
        let stale = ids(&state.refresh())[0];
        let fresh = ids(&state.handle_response(ok(mutation, ApiReply::Done)))[0];
        state.handle_response(ok(fresh, ApiReply::Orders(vec![order("o1")])));
        let shown = state.notice.clone().unwrap().text;

        state.handle_response(err(stale, ApiError::Timeout));
        assert_eq!(state.notice.clone().unwrap().text, shown);
        assert_eq!(state.client.orders.len(), 1);
    }

    #[test]
    fn test_forbidden_accept_shows_verification_message() {
        let (mut state, _dir) = signed_in(Role::Driver);
        let id = ids(&state.mutate(ApiCall::AcceptOrder("o1".into())))[0];

        let refetch = state.handle_response(err(id, ApiError::Forbidden { detail: None }));
        assert_eq!(state.notice.as_ref().unwrap().text, VERIFICATION_REQUIRED_MESSAGE);
        assert_eq!(ids(&refetch).len(), 4);
        assert!(state.session.token().is_some());
    }

    #[test]
    fn test_order_created_compares_with_preview() {
        let (mut state, _dir) = signed_in(Role::Client);
        let preview = financials::preview(300.0, &state.settings.commission);
        state.client.expected = Some(preview.clone());
        let id = ids(&state.mutate(ApiCall::CreateOrder(crate::models::NewOrder {
            title: "Groceries".into(),
            description: "Milk".into(),
            pickup_address: "A".into(),
            delivery_address: "B".into(),
            price: 300.0,
        })))[0];

        let mut created = order("o7");
        let mut charged = preview;
        charged.total_amount += 5.0;
        created.financials = Some(charged);

        let refetch = ids(&state.handle_response(ok(id, ApiReply::OrderCreated(created))));
        state.handle_response(ok(refetch[0], ApiReply::Orders(Vec::new())));
        let text = state.notice.clone().unwrap().text;
        assert!(text.contains("$322.40"), "{}", text);
        assert!(text.contains("$317.40"), "{}", text);
        assert!(state.client.expected.is_none());
    }

    #[test]
    fn test_failed_restore_keeps_persisted_token() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path());
        storage.save_session("tok", API).unwrap();
        let mut state = AppState::new(Settings::default(), storage);
        assert_eq!(state.view(), View::Loading);

        let me = ids(&state.start())[0];
        state.handle_response(err(me, ApiError::Network("connection refused".into())));
        assert_eq!(state.view(), View::Landing);
        assert!(state.storage.load_session(API).is_some());
    }
}
