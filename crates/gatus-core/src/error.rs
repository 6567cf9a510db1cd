// ── Core error types ──
//
// `UpdateFailed` is the one signal a host sees from steady-state polling:
// every client failure collapses into it. Setup-time errors (`CoreError`)
// keep the specific API failure so a configuration form can say what went
// wrong.

use gatus_api::ErrorKind;
use thiserror::Error;

/// A refresh cycle did not produce a new snapshot.
///
/// `kind` is kept for logs only; hosts are expected to treat every
/// `UpdateFailed` the same way.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Error fetching gatus data: {message}")]
pub struct UpdateFailed {
    pub message: String,
    pub kind: ErrorKind,
}

impl From<gatus_api::Error> for UpdateFailed {
    fn from(err: gatus_api::Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Setup ────────────────────────────────────────────────────────
    /// The first refresh failed; the entry should be retried later.
    #[error("Gatus entry '{title}' is not ready: {source}")]
    NotReady {
        title: String,
        #[source]
        source: UpdateFailed,
    },

    // ── API errors (specific kind preserved) ─────────────────────────
    #[error(transparent)]
    Api(#[from] gatus_api::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_failed_keeps_message_and_kind() {
        let api = gatus_api::Error::new(ErrorKind::Dns, "api/v1/endpoints/statuses", "no such host");
        let failed = UpdateFailed::from(api.clone());
        assert_eq!(failed.kind, ErrorKind::Dns);
        assert_eq!(failed.message, api.to_string());
        assert!(failed.to_string().contains("no such host"));
    }

    #[test]
    fn not_ready_keeps_failure_kind() {
        let err = CoreError::NotReady {
            title: "Home".into(),
            source: UpdateFailed {
                message: "m".into(),
                kind: ErrorKind::Timeout,
            },
        };
        assert!(err.to_string().starts_with("Gatus entry 'Home' is not ready"));
        assert!(matches!(err, CoreError::NotReady { source, .. } if source.kind == ErrorKind::Timeout));
    }
}
