use crate::traits::SessionBackend;
use mitra_core::error::SessionError;
use mitra_core::types::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Owns the identity pair of the current voice conversation.
pub struct SessionManager {
    backend: Arc<dyn SessionBackend>,
    current: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            current: Mutex::new(None),
        }
    }

    /// Generates a fresh identity pair and registers it with the backend.
    ///
    /// The new session replaces the current one only after the handshake succeeds.
    pub async fn initialize_session(&self) -> Result<Session, SessionError> {
        let mut current = self.current.lock().await;
        let session = self.handshake().await?;
        *current = Some(session.clone());
        Ok(session)
    }

    /// Returns the conversation's session, running the handshake on first use.
    pub async fn ensure_session(&self) -> Result<Session, SessionError> {
        let mut current = self.current.lock().await;
        if let Some(s) = current.as_ref() {
            return Ok(s.clone());
        }
        let session = self.handshake().await?;
        *current = Some(session.clone());
        Ok(session)
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.lock().await.clone()
    }

    /// Forgets the current session; the next recording starts a new conversation.
    pub async fn reset(&self) {
        *self.current.lock().await = None;
    }

    async fn handshake(&self) -> Result<Session, SessionError> {
        let session = Session::generate();
        log::info!(
            "initializing session farmer={} session={}",
            session.farmer_id.as_str(),
            session.session_id.as_str()
        );
        if let Err(e) = self.backend.create_session(&session).await {
            log::error!("session handshake failed: {e}");
            return Err(e);
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

    // `fail_with` of 0 accepts the handshake.
    struct CountingBackend {
        calls: AtomicUsize,
        fail_with: AtomicU16,
    }

    #[async_trait::async_trait]
    impl SessionBackend for CountingBackend {
        async fn create_session(&self, _session: &Session) -> Result<(), SessionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with.load(Ordering::SeqCst) {
                0 => Ok(()),
                status => Err(SessionError::Rejected { status }),
            }
        }
    }

    fn backend(fail_with: Option<u16>) -> Arc<CountingBackend> {
        Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
            fail_with: AtomicU16::new(fail_with.unwrap_or(0)),
        })
    }

    #[tokio::test]
    async fn ensure_session_handshakes_once() {
        let b = backend(None);
        let mgr = SessionManager::new(b.clone());

        let first = mgr.ensure_session().await.unwrap();
        let second = mgr.ensure_session().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_handshake_stores_nothing() {
        let b = backend(Some(500));
        let mgr = SessionManager::new(b.clone());

        let err = mgr.ensure_session().await.unwrap_err();
        assert_eq!(err, SessionError::Rejected { status: 500 });
        assert!(mgr.current().await.is_none());

        // A later attempt handshakes again rather than reusing a failed session.
        let _ = mgr.ensure_session().await;
        assert_eq!(b.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reset_starts_a_new_conversation() {
        let b = backend(None);
        let mgr = SessionManager::new(b.clone());

        let first = mgr.ensure_session().await.unwrap();
        mgr.reset().await;
        let second = mgr.ensure_session().await.unwrap();
        assert_ne!(first, second);
        assert_eq!(b.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn initialize_replaces_session_only_on_success() {
        let b = backend(None);
        let mgr = SessionManager::new(b.clone());

        let first = mgr.initialize_session().await.unwrap();
        let second = mgr.initialize_session().await.unwrap();
        assert_ne!(first, second);
        assert_eq!(mgr.current().await, Some(second.clone()));

        b.fail_with.store(500, Ordering::SeqCst);
        let err = mgr.initialize_session().await.unwrap_err();
        assert_eq!(err, SessionError::Rejected { status: 500 });
        assert_eq!(mgr.current().await, Some(second));
        assert_eq!(b.calls.load(Ordering::SeqCst), 3);
    }
}
