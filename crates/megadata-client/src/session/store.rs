//! Signed-in session holder
//!
//! One `SessionStore` is shared (cheaply cloned) by the HTTP client and
//! every service. It keeps the in-memory session in step with persistent
//! storage and broadcasts a [`SessionEvent`] whenever the identity changes.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use megadata_common::{canonical_service, AppError, AppResult};
use megadata_core::access::{evaluate, evaluate_screen, is_stale};
use megadata_core::{GuardDecision, RouteConstraint, Screen, Session, SessionEvent, SessionIdentity};

use super::storage::{MemorySessionStorage, SessionStorage};

const EVENT_BUFFER: usize = 32;

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    current: RwLock<Option<Session>>,
    storage: Arc<dyn SessionStorage>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(None),
                storage,
                events,
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStorage::new()))
    }

    /// Load the persisted session into memory
    pub fn restore(&self) -> AppResult<Option<Session>> {
        let loaded = self.inner.storage.load()?;
        debug!(found = loaded.is_some(), "Session restored from storage");
        (*self.inner.current.write()).clone_from(&loaded);
        Ok(loaded)
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.current.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.current.read().as_ref().map(|s| s.token.clone())
    }

    /// Subscribe to session changes
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Install a freshly signed-in session
    pub fn establish(&self, session: Session) -> AppResult<()> {
        self.inner.storage.save(&session)?;
        let identity = SessionIdentity::from(&session);
        *self.inner.current.write() = Some(session);
        info!(user_id = %identity.user_id, role = %identity.role, "Session established");
        self.publish(SessionEvent::LoggedIn(identity));
        Ok(())
    }

    /// Sign out. Returns whether a session existed.
    pub fn clear(&self) -> AppResult<bool> {
        let previous = self.take()?;
        if let Some(session) = &previous {
            info!(user_id = %session.user_id, "Session cleared");
            self.publish(SessionEvent::LoggedOut(SessionIdentity::from(session)));
        }
        Ok(previous.is_some())
    }

    /// Purge a session that is expired, malformed or rejected by the backend
    pub fn expire(&self) -> AppResult<bool> {
        let previous = self.take()?;
        if let Some(session) = &previous {
            warn!(user_id = %session.user_id, "Session expired and purged");
            self.publish(SessionEvent::Expired(SessionIdentity::from(session)));
        }
        Ok(previous.is_some())
    }

    /// Rewrite fields of the current session in place
    ///
    /// Returns `NoSession` when nobody is signed in.
    pub fn update<F>(&self, change: F) -> AppResult<Session>
    where
        F: FnOnce(&mut Session),
    {
        let updated = {
            let mut guard = self.inner.current.write();
            let session = guard.as_mut().ok_or(AppError::NoSession)?;
            change(session);
            session.assigned_service = canonical_service(session.assigned_service.take(), None);
            session.clone()
        };
        self.inner.storage.save(&updated)?;
        debug!(user_id = %updated.user_id, "Session updated");
        self.publish(SessionEvent::Updated(SessionIdentity::from(&updated)));
        Ok(updated)
    }

    /// Guard a screen, purging an expired or malformed session
    ///
    /// The purge happens on public screens too, even though they render.
    pub fn guard(&self, screen: Screen, now: i64) -> AppResult<GuardDecision> {
        let session = self.current();
        let decision = evaluate_screen(session.as_ref(), screen, now);
        if session.is_some_and(|s| is_stale(&s, now)) {
            self.expire()?;
        }
        Ok(decision)
    }

    /// Guard a bare constraint, purging the session when the decision requires it
    pub fn guard_constraint(&self, constraint: RouteConstraint, now: i64) -> AppResult<GuardDecision> {
        let decision = evaluate(self.current().as_ref(), constraint, now);
        self.apply(decision)
    }

    /// Current session when it passes `constraint`
    ///
    /// # Errors
    /// `NoSession` or `SessionExpired` when there is no usable session,
    /// `Forbidden` on a role mismatch
    pub fn require(&self, constraint: RouteConstraint, now: i64) -> AppResult<Session> {
        let session = self.current();
        match self.guard_constraint(constraint, now)? {
            GuardDecision::Render => session.ok_or(AppError::NoSession),
            GuardDecision::Redirect { reason, .. } => Err(match reason {
                megadata_core::RedirectReason::NoSession => AppError::NoSession,
                megadata_core::RedirectReason::Expired | megadata_core::RedirectReason::Malformed => {
                    AppError::SessionExpired
                }
                megadata_core::RedirectReason::RoleMismatch
                | megadata_core::RedirectReason::AlreadySignedIn => AppError::Forbidden,
            }),
        }
    }

    fn apply(&self, decision: GuardDecision) -> AppResult<GuardDecision> {
        if decision.purges_session() {
            self.expire()?;
        }
        Ok(decision)
    }

    fn take(&self) -> AppResult<Option<Session>> {
        let previous = self.inner.current.write().take();
        self.inner.storage.clear()?;
        Ok(previous)
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("signed_in", &self.inner.current.read().is_some())
            .finish()
    }
}
