//! Role router - picks the screen from the session and lists what each screen loads

use crate::app::AppState;
use crate::messages::network::ApiCall;
use crate::messages::ui_events::View;
use crate::models::Role;
use crate::session::SessionPhase;

impl AppState {
    /// Screen for the current session and tab selection
    pub fn view(&self) -> View {
        match self.session.phase() {
            SessionPhase::Anonymous => View::Landing,
            SessionPhase::Resolving => View::Loading,
            SessionPhase::Authenticated(Role::Client) => View::Client(self.client.tab),
            SessionPhase::Authenticated(Role::Driver) => View::Driver(self.driver.tab),
            SessionPhase::Authenticated(Role::Admin) => View::Admin(self.admin.tab),
        }
    }
}

/// Collections a role's dashboard fetches on entry and after each mutation
pub fn dashboard_reads(role: Role) -> Vec<ApiCall> {
    match role {
        Role::Client => vec![ApiCall::ListOrders],
        Role::Driver => vec![
            ApiCall::ListOrders,
            ApiCall::DriverOrders,
            ApiCall::VerificationStatus,
            ApiCall::VerificationDocuments,
        ],
        Role::Admin => vec![
            ApiCall::AdminStats,
            ApiCall::AdminUsers,
            ApiCall::ListOrders,
            ApiCall::PendingDrivers,
            ApiCall::CommissionConfig,
            ApiCall::DriverPayouts,
            ApiCall::CashCollections,
            ApiCall::Transactions,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::messages::ui_events::{AdminTab, DriverTab};
    use crate::models::AuthResponse;
    use crate::session::Session;
    use crate::storage::Storage;

    fn state_with(session: Session) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        AppState::with_session(Settings::default(), Storage::at(dir.path()), session)
    }

    fn auth(role: Role) -> AuthResponse {
        serde_json::from_value(serde_json::json!({
            "access_token": "tok",
            "user": {"id": "u1", "name": "Ana", "email": "ana@example.com", "user_type": role.as_str()}
        }))
        .unwrap()
    }

    #[test]
    fn test_view_follows_session() {
        assert_eq!(state_with(Session::anonymous()).view(), View::Landing);
        assert_eq!(state_with(Session::restored("tok")).view(), View::Loading);

        let mut session = Session::anonymous();
        session.establish(auth(Role::Driver));
        let mut state = state_with(session);
        assert_eq!(state.view(), View::Driver(DriverTab::Available));
        state.driver.tab = DriverTab::Verification;
        assert_eq!(state.view(), View::Driver(DriverTab::Verification));

        let mut session = Session::anonymous();
        session.establish(auth(Role::Admin));
        assert_eq!(state_with(session).view(), View::Admin(AdminTab::Overview));
    }

    #[test]
    fn test_driver_dashboard_loads_verification() {
        let names: Vec<_> = dashboard_reads(Role::Driver).iter().map(|c| c.name()).collect();
        assert!(names.contains(&"verification_status"));
        assert!(dashboard_reads(Role::Admin).iter().all(|c| !c.is_mutation()));
    }
}
