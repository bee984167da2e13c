//! Errors raised when host state cannot be determined.
//!
//! Absence of a key, value or file is never an error: every primitive folds
//! it into `false`. These variants cover the cases where the answer is
//! unknown, which must not be mistaken for "no reboot pending".

use std::io;
use thiserror::Error;

/// Failure to read the host state a reboot check depends on.
#[derive(Debug, Error)]
pub enum RebootCheckError {
    /// The process lacks permission to inspect the target.
    #[error("access denied while inspecting {target}")]
    AccessDenied { target: String },

    /// An I/O failure other than "not found".
    #[error("I/O failure while inspecting {target}")]
    Io {
        target: String,
        #[source]
        source: io::Error,
    },

    /// The registry API reported a failure other than missing or denied.
    #[error("registry query for {key} failed: {detail}")]
    RegistryQuery { key: String, detail: String },

    /// This host has no Windows registry.
    #[error("registry access unavailable: {reason}")]
    RegistryUnavailable { reason: String },
}

impl RebootCheckError {
    /// Map an I/O error for `target`, keeping permission failures distinct.
    ///
    /// Callers handle `NotFound` before reaching this point.
    pub fn from_io(target: impl Into<String>, source: io::Error) -> Self {
        let target = target.into();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::AccessDenied { target },
            _ => Self::Io { target, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_permission_denied() {
        let err = RebootCheckError::from_io(
            "/var/run/reboot-required",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, RebootCheckError::AccessDenied { .. }));
        assert!(err.to_string().contains("/var/run/reboot-required"));
    }

    #[test]
    fn test_from_io_other_keeps_source() {
        let err = RebootCheckError::from_io("somewhere", io::Error::other("disk on fire"));
        match err {
            RebootCheckError::Io { target, source } => {
                assert_eq!(target, "somewhere");
                assert_eq!(source.to_string(), "disk on fire");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
