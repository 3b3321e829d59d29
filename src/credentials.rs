//! Stored-credential reset flow
//!
//! The one genuinely fallible operation neighbouring the control loops. The
//! storage backend itself lives in the host; this module defines its
//! contract and the user-facing reset flow: on failure the user is told, the
//! error is propagated, and nothing else changes, so network connectivity is
//! never left in an ambiguous state.

use thiserror::Error;

use crate::session::DeviceSession;

/// Errors reported by a credential store.
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    /// The backing store could not be opened.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    /// Erasing or committing the erase failed.
    #[error("failed to erase stored credentials: {0}")]
    EraseFailed(String),
}

/// Host-provided persistent credential storage.
pub trait CredentialStore: Send + Sync {
    /// Erase all persisted credentials.
    ///
    /// Must be all-or-nothing: on error the store is left unchanged. A
    /// store with nothing to erase reports success.
    fn clear_credentials(&self) -> Result<(), CredentialError>;
}

/// Runs the user-invoked credential reset.
///
/// On success the user is notified that the device will restart and `Ok` is
/// returned so the host may reboot. On failure the user is notified, the
/// error is returned, and no other state is touched; the session stays
/// operable.
pub fn run_credential_reset(
    store: &dyn CredentialStore,
    session: &dyn DeviceSession,
) -> Result<(), CredentialError> {
    match store.clear_credentials() {
        Ok(()) => {
            tracing::info!("stored credentials cleared");
            session.show_notification("Credentials cleared, restarting...");
            Ok(())
        }
        Err(e) => {
            tracing::error!("credential reset failed: {e}");
            session.show_notification("Failed to reset credentials");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::RecordingSession;

    struct OkStore;

    impl CredentialStore for OkStore {
        fn clear_credentials(&self) -> Result<(), CredentialError> {
            Ok(())
        }
    }

    struct FailingStore;

    impl CredentialStore for FailingStore {
        fn clear_credentials(&self) -> Result<(), CredentialError> {
            Err(CredentialError::EraseFailed("commit failed".to_string()))
        }
    }

    #[test]
    fn test_successful_reset_notifies_restart() {
        let session = RecordingSession::idle();
        let result = run_credential_reset(&OkStore, &session);

        assert!(result.is_ok());
        assert_eq!(
            session.notifications(),
            vec!["Credentials cleared, restarting..."]
        );
    }

    #[test]
    fn test_failed_reset_notifies_and_propagates() {
        let session = RecordingSession::idle();
        let result = run_credential_reset(&FailingStore, &session);

        assert!(matches!(result, Err(CredentialError::EraseFailed(_))));
        assert_eq!(session.notifications(), vec!["Failed to reset credentials"]);
        // The failure must not disturb the session.
        assert_eq!(session.toggle_count(), 0);
    }

    #[test]
    fn test_error_display() {
        let err = CredentialError::Unavailable("no backing store".to_string());
        assert_eq!(
            err.to_string(),
            "credential store unavailable: no backing store"
        );
    }
}
