//! Authentication state shared by every request.
//!
//! Read once at startup; afterwards only changed through
//! [`SessionHandle::set_token`] and [`SessionHandle::invalidate`].

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self { token }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Cheaply cloneable handle to the current [`Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<RwLock<Session>>);

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(RwLock::new(session)))
    }

    /// Current bearer token, if any.
    pub async fn token(&self) -> Option<String> {
        self.0.read().await.token.clone()
    }

    pub async fn set_token(&self, token: String) {
        *self.0.write().await = Session::new(Some(token));
        tracing::info!("Session token updated");
    }

    /// Drop the token; later requests go out unauthenticated.
    pub async fn invalidate(&self) {
        *self.0.write().await = Session::default();
        tracing::info!("Session invalidated");
    }
}
