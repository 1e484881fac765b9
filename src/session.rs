//! Current identity and bearer credential
//!
//! The session is owned by the app state and its token is copied into
//! every network command, so requests never read ambient auth state.

use crate::models::{AuthResponse, Role, User};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

/// Where the session stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    /// Token known, identity being fetched
    Resolving,
    Authenticated(Role),
}

impl Session {
    pub fn anonymous() -> Self {
        Session::default()
    }

    /// Session restored from a persisted token; identity still unknown
    pub fn restored(token: impl Into<String>) -> Self {
        Session {
            token: Some(token.into()),
            user: None,
        }
    }

    pub fn establish(&mut self, auth: AuthResponse) {
        self.token = Some(auth.access_token);
        self.user = Some(auth.user);
    }

    /// Attach the identity returned by `/api/auth/me`
    pub fn resolve(&mut self, user: User) {
        if self.token.is_some() {
            self.user = Some(user);
        }
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.token, &self.user) {
            (None, _) => SessionPhase::Anonymous,
            (Some(_), None) => SessionPhase::Resolving,
            (Some(_), Some(user)) => SessionPhase::Authenticated(user.user_type),
        }
    }
}
