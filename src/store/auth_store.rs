use std::rc::Rc;

use leptos_reactive::{create_signal, ReadSignal, SignalGetUntracked, SignalSet, WriteSignal};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::prelude::{Credentials, Registration, RestClient, SyncError, User};

use super::{utils::tracked, LoadingFlag, Notifications};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    LoginStart,
    LoginSuccess { user: User, token: String },
    LoginFailure,
    Logout,
    UpdateUser(Map<String, Value>),
}

impl AuthState {
    pub fn reduce(&self, action: AuthAction) -> Self {
        match action {
            AuthAction::LoginStart => Self {
                is_loading: true,
                ..self.clone()
            },
            AuthAction::LoginSuccess { user, token } => Self {
                user: Some(user),
                token: Some(token),
                is_authenticated: true,
                is_loading: false,
            },
            AuthAction::LoginFailure | AuthAction::Logout => Self {
                user: None,
                token: None,
                is_authenticated: false,
                is_loading: false,
            },
            AuthAction::UpdateUser(fields) => {
                let user = self.user.clone().unwrap_or_default();
                match user.merge_fields(&fields) {
                    Ok(user) => Self {
                        user: Some(user),
                        ..self.clone()
                    },
                    Err(error) => {
                        warn!(%error, "rejected user update");
                        self.clone()
                    }
                }
            }
        }
    }
}

/// Session authentication state and the operations that change it.
pub struct AuthStore {
    pub state: ReadSignal<AuthState>,
    set_state: WriteSignal<AuthState>,
    loading: LoadingFlag,
    client: Rc<RestClient>,
    notifications: Rc<Notifications>,
}

impl AuthStore {
    /// Starts in the loading state with whatever token the client has
    /// persisted; call [`AuthStore::restore`] to validate it.
    pub fn new(client: Rc<RestClient>, notifications: Rc<Notifications>) -> Self {
        let token = client.tokens().load().unwrap_or_else(|error| {
            warn!(%error, "could not read stored token");
            None
        });
        let (state, set_state) = create_signal(AuthState {
            token,
            is_loading: true,
            ..AuthState::default()
        });
        Self {
            state,
            set_state,
            loading: LoadingFlag::new(),
            client,
            notifications,
        }
    }

    pub fn dispatch(&self, action: AuthAction) {
        debug!(?action, "auth dispatch");
        let next = self.state.get_untracked().reduce(action);
        self.set_state.set(next);
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.get_untracked()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    /// Validates a previously stored token. An invalid token logs the
    /// session out.
    pub async fn restore(&self) -> Option<User> {
        let Some(token) = self.snapshot().token else {
            self.dispatch(AuthAction::LoginFailure);
            return None;
        };
        let _guard = self.loading.guard();
        match self.client.validate().await {
            Ok(user) => {
                self.dispatch(AuthAction::LoginSuccess {
                    user: user.clone(),
                    token,
                });
                Some(user)
            }
            Err(error) => {
                warn!(%error, "token validation failed");
                self.logout();
                None
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, SyncError> {
        self.dispatch(AuthAction::LoginStart);
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = tracked(
            &self.loading,
            &self.notifications,
            "Login failed. Please check your credentials.",
            |_| self.dispatch(AuthAction::LoginFailure),
            self.client.login(&credentials),
        )
        .await?;
        self.dispatch(AuthAction::LoginSuccess {
            user: response.user.clone(),
            token: response.token,
        });
        self.notifications.success("Login successful!");
        Ok(response.user)
    }

    pub async fn register(&self, registration: &Registration) -> Result<User, SyncError> {
        self.dispatch(AuthAction::LoginStart);
        let response = tracked(
            &self.loading,
            &self.notifications,
            "Registration failed. Please try again.",
            |_| self.dispatch(AuthAction::LoginFailure),
            self.client.register(registration),
        )
        .await?;
        self.dispatch(AuthAction::LoginSuccess {
            user: response.user.clone(),
            token: response.token,
        });
        self.notifications.success("Registration successful!");
        Ok(response.user)
    }

    pub fn logout(&self) {
        if let Err(error) = self.client.tokens().clear() {
            warn!(%error, "could not remove stored token");
        }
        self.dispatch(AuthAction::Logout);
        self.notifications.success("Logged out successfully");
    }

    pub fn update_user(&self, fields: Map<String, Value>) {
        self.dispatch(AuthAction::UpdateUser(fields));
    }
}
