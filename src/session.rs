//! Session provider: identity snapshot and bearer-token issuance.
//!
//! ARCHITECTURE
//! ============
//! Feature modules only see the [`SessionProvider`] trait: a read-only view of
//! "who is signed in" plus token issuance. [`LocalSessionProvider`] is the
//! in-process implementation used by the CLI and tests; a hosted identity
//! service plugs in behind the same trait.
//!
//! Every sign-in and sign-out bumps a monotonically increasing epoch. Modules
//! capture the epoch when an action starts and compare it on resolution, so a
//! sign-out during a pending call never renders stale data.

use std::fmt::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("not signed in")]
    Unauthenticated,
    #[error("sign-in rejected: {0}")]
    SignInRejected(String),
}

/// Opaque bearer credential attached to remote calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInMethod {
    Federated,
    Anonymous,
}

/// Identity snapshot handed to feature modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub uid: String,
    pub display_name: Option<String>,
    pub method: SignInMethod,
}

/// Read-only identity view consumed by feature modules.
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current user, or `None` when signed out.
    fn current_user(&self) -> Option<SessionUser>;

    /// Changes on every sign-in and sign-out.
    fn epoch(&self) -> u64;

    /// Issue a bearer token for the current user.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unauthenticated`] when nobody is signed in.
    async fn id_token(&self) -> Result<Token, SessionError>;

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}

struct ActiveSession {
    user: SessionUser,
    token: Token,
}

/// In-process session holder.
#[derive(Default)]
pub struct LocalSessionProvider {
    active: Mutex<Option<ActiveSession>>,
    epoch: AtomicU64,
}

impl LocalSessionProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt an identity issued by an external provider.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SignInRejected`] for an empty uid or token.
    pub fn sign_in_federated(
        &self,
        uid: &str,
        display_name: Option<&str>,
        token: &str,
    ) -> Result<SessionUser, SessionError> {
        if uid.trim().is_empty() {
            return Err(SessionError::SignInRejected("empty uid".into()));
        }
        if token.trim().is_empty() {
            return Err(SessionError::SignInRejected("empty token".into()));
        }
        let user = SessionUser {
            uid: uid.to_string(),
            display_name: display_name.map(str::to_string),
            method: SignInMethod::Federated,
        };
        self.install(user.clone(), Token::new(token));
        Ok(user)
    }

    /// Start a guest session with a generated uid and token.
    pub fn sign_in_anonymously(&self) -> SessionUser {
        let user = SessionUser {
            uid: format!("guest-{}", Uuid::new_v4().simple()),
            display_name: None,
            method: SignInMethod::Anonymous,
        };
        self.install(user.clone(), Token::new(generate_token()));
        user
    }

    pub fn sign_out(&self) {
        let previous = self.lock().take();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(session) = previous {
            info!(uid = %session.user.uid, "session: signed out");
        }
    }

    fn install(&self, user: SessionUser, token: Token) {
        info!(uid = %user.uid, method = ?user.method, "session: signed in");
        *self.lock() = Some(ActiveSession { user, token });
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl SessionProvider for LocalSessionProvider {
    fn current_user(&self) -> Option<SessionUser> {
        self.lock().as_ref().map(|s| s.user.clone())
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    async fn id_token(&self) -> Result<Token, SessionError> {
        self.lock()
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(SessionError::Unauthenticated)
    }
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
