//! In-memory booking session store.
//!
//! Sessions live only for the duration of a booking; they are removed on
//! submission and never persisted or shared across sessions. Each session
//! sits behind its own `Mutex`, so a handler awaiting the payment gateway
//! stalls only that session; the map-level lock is held just long enough
//! to look a session up. The core's idempotency check is still not atomic
//! against concurrent calls on one session, so the client debounces its
//! "Continue" control.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use reclaim_core::BookingWizard;

/// Shared handle to one session's wizard.
pub type SessionHandle = Arc<Mutex<BookingWizard>>;

#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session, returning its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(BookingWizard::new())));
        tracing::info!(session_id = %id, "booking session opened");
        id
    }

    /// Look up a session's handle. The map lock is released before the
    /// caller locks the session itself.
    pub async fn session(&self, id: Uuid) -> Option<SessionHandle> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Clone a snapshot of a session's wizard.
    pub async fn get(&self, id: Uuid) -> Option<BookingWizard> {
        let session = self.session(id).await?;
        let wizard = session.lock().await;
        Some(wizard.clone())
    }

    /// Mutate a session through a synchronous closure.
    pub async fn update<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut BookingWizard) -> R,
    ) -> Option<R> {
        let session = self.session(id).await?;
        let mut wizard = session.lock().await;
        Some(f(&mut wizard))
    }

    /// Remove a session. A handler still holding the session's handle can
    /// finish its operation; the session just becomes unreachable.
    pub async fn remove(&self, id: Uuid) -> Option<SessionHandle> {
        let removed = self.inner.write().await.remove(&id);
        if removed.is_some() {
            tracing::info!(session_id = %id, "booking session closed");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reclaim_core::StepId;

    use super::*;

    #[tokio::test]
    async fn create_get_remove() {
        let store = SessionStore::new();
        let id = store.create().await;

        let wizard = store.get(id).await.expect("session exists");
        assert_eq!(wizard.current_step(), StepId::ServiceSelection);

        assert!(store.remove(id).await.is_some());
        assert!(store.get(id).await.is_none());
        assert!(store.remove(id).await.is_none());
    }

    #[tokio::test]
    async fn update_mutates_in_place() {
        let store = SessionStore::new();
        let id = store.create().await;

        let valid = store
            .update(id, |wizard| wizard.is_current_step_valid())
            .await
            .unwrap();
        assert!(!valid);

        assert!(store.update(Uuid::new_v4(), |_| ()).await.is_none());
    }

    #[tokio::test]
    async fn one_sessions_lock_does_not_block_another() {
        let store = SessionStore::new();
        let a = store.create().await;
        let b = store.create().await;

        // Hold session A as a slow payment call would.
        let session_a = store.session(a).await.unwrap();
        let _held = session_a.lock().await;

        // Session B stays reachable and mutable.
        let result = tokio::time::timeout(
            Duration::from_millis(100),
            store.update(b, |wizard| wizard.current_step()),
        )
        .await;
        assert_eq!(result.unwrap(), Some(StepId::ServiceSelection));

        // So does the map itself.
        let c = tokio::time::timeout(Duration::from_millis(100), store.create())
            .await
            .unwrap();
        assert!(store.get(c).await.is_some());
    }
}
