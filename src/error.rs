use std::path::PathBuf;

use thiserror::Error;

/// Failure modes of a sync run.
///
/// Every variant except the dropped-record case (which is never an error)
/// aborts the run before any export file is written.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Non-success status, GraphQL `errors`, or an unusable payload.
    #[error("upstream error from {source_name}: {reason}")]
    Upstream { source_name: String, reason: String },

    /// Connection, TLS, timeout or body-read failure.
    #[error("request to {source_name} failed: {source}")]
    Transport {
        source_name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    /// A row of the supplier feed or a persisted state file failed coercion.
    #[error("parse error in {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("duplicate product key \"{key}\" in {snapshot} snapshot")]
    DuplicateKey { snapshot: String, key: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub fn upstream(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SyncError::Upstream {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(context: impl Into<String>, reason: impl Into<String>) -> Self {
        SyncError::Parse {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` for failures caused by a data source rather than local state.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            SyncError::Upstream { .. } | SyncError::Transport { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_and_transport_are_upstream_kinds() {
        assert!(SyncError::upstream("shopify", "HTTP 500").is_upstream());
        assert!(!SyncError::Configuration("missing token".into()).is_upstream());
        assert!(!SyncError::parse("feed row 3", "bad stock").is_upstream());
    }

    #[test]
    fn duplicate_key_message_names_the_key() {
        let err = SyncError::DuplicateKey {
            snapshot: "supplier".into(),
            key: "SKU-1".into(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate product key \"SKU-1\" in supplier snapshot"
        );
    }
}
