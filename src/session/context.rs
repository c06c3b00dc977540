use crate::api::{ApiError, ReviewApi};
use std::fmt;
use tokio::sync::watch;
use tracing::{info, warn};

/// API token sent as `Authorization: Token <value>`
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    pub fn header_value(&self) -> String {
        format!("Token {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Lifecycle of the reviewer's session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Never signed in, or signed out explicitly
    #[default]
    SignedOut,
    Active {
        credential: Credential,
        is_superuser: bool,
    },
    /// The server rejected the credential; the reviewer must sign in again
    Expired,
}

/// Credential and role flag shared by every component that talks to the server
pub struct SessionContext {
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::SignedOut);
        Self { state }
    }

    /// Session that starts out signed in, e.g. with a token from config
    pub fn with_credential(credential: Credential, is_superuser: bool) -> Self {
        let session = Self::new();
        session.init(credential, is_superuser);
        session
    }

    /// Start a session after a successful sign-in
    pub fn init(&self, credential: Credential, is_superuser: bool) {
        info!("Session started (superuser={})", is_superuser);
        self.state.send_replace(SessionState::Active {
            credential,
            is_superuser,
        });
    }

    /// Sign out
    pub fn teardown(&self) {
        info!("Session ended");
        self.state.send_replace(SessionState::SignedOut);
    }

    /// Drop the credential after the server rejected it.
    ///
    /// Returns `true` only for the call that actually expired an active session.
    pub fn invalidate(&self) -> bool {
        let expired = self.state.send_if_modified(|state| {
            if matches!(state, SessionState::Active { .. }) {
                *state = SessionState::Expired;
                true
            } else {
                false
            }
        });

        if expired {
            warn!("Session invalidated by server, re-authentication required");
        }

        expired
    }

    /// Current credential; a missing one is treated like a 401
    pub fn credential(&self) -> Result<Credential, ApiError> {
        match &*self.state.borrow() {
            SessionState::Active { credential, .. } => Ok(credential.clone()),
            _ => Err(ApiError::Unauthorized),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Active { .. })
    }

    pub fn is_superuser(&self) -> bool {
        matches!(
            *self.state.borrow(),
            SessionState::Active {
                is_superuser: true,
                ..
            }
        )
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch for sign-in, sign-out and expiry
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Pass a server result through, expiring the session on a 401
    pub fn guard<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(ApiError::Unauthorized) = &result {
            self.invalidate();
        }
        result
    }

    /// Sign in with username and password.
    ///
    /// Both the token exchange and the role lookup must succeed before the
    /// session becomes active.
    pub async fn login(
        &self,
        api: &dyn ReviewApi,
        username: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        info!("Signing in as {}", username);

        let credential = Credential::new(api.obtain_token(username, password).await?);
        let status = api.user_status(&credential).await?;

        self.init(credential, status.is_superuser);
        Ok(())
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
