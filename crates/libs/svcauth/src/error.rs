/// Why a single auth method could not sign or verify a request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum MethodError {
    #[error("credential material is not configured")]
    MissingCredential,

    #[error("metadata {key} is missing")]
    MissingMetadata { key: &'static str },

    #[error("metadata {key} is malformed: {reason}")]
    MalformedMetadata { key: &'static str, reason: String },

    #[error("timestamp is {skew_secs}s away from local clock (tolerance {tolerance_secs}s)")]
    StaleTimestamp { skew_secs: u64, tolerance_secs: u64 },

    #[error("signature does not match request")]
    SignatureMismatch,

    #[error("signing key is not trusted")]
    UntrustedKey,
}

impl MethodError {
    pub(crate) fn malformed(key: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            key,
            reason: reason.into(),
        }
    }
}

/// Coarse classification of [`SvcAuthError`] for callers that branch on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The local method could not produce a signature.
    Signing,
    /// The caller declared a method this process has not loaded.
    UnknownMethod,
    /// The declared method was loaded but rejected the request.
    Verification,
    /// The set of loaded methods is itself invalid.
    Configuration,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SvcAuthError {
    #[error("failed to sign request with {method}: {source}")]
    Signing {
        method: String,
        #[source]
        source: MethodError,
    },

    #[error("unknown service to service authentication method: {method}")]
    UnknownMethod { method: String },

    #[error("failed to verify request with {method}: {source}")]
    Verification {
        method: String,
        #[source]
        source: MethodError,
    },

    #[error("authentication method {method} is loaded more than once")]
    DuplicateMethod { method: String },

    #[error("authentication method name must not be empty")]
    EmptyMethodName,
}

impl SvcAuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Signing { .. } => ErrorKind::Signing,
            Self::UnknownMethod { .. } => ErrorKind::UnknownMethod,
            Self::Verification { .. } => ErrorKind::Verification,
            Self::DuplicateMethod { .. } | Self::EmptyMethodName => ErrorKind::Configuration,
        }
    }

    /// Returns `true` when a present signature was rejected. Such calls must
    /// be treated as untrusted, never downgraded to a plain external call.
    pub fn is_security_event(&self) -> bool {
        matches!(self, Self::Verification { .. })
    }

    /// The method name this error refers to, if any.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Signing { method, .. }
            | Self::UnknownMethod { method }
            | Self::Verification { method, .. }
            | Self::DuplicateMethod { method } => Some(method.as_str()),
            Self::EmptyMethodName => None,
        }
    }

    /// The underlying method failure for signing and verification errors.
    pub fn method_error(&self) -> Option<&MethodError> {
        match self {
            Self::Signing { source, .. } | Self::Verification { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn kinds_follow_variants() {
        let signing = SvcAuthError::Signing {
            method: "hmac-v1".to_owned(),
            source: MethodError::MissingCredential,
        };
        assert_eq!(signing.kind(), ErrorKind::Signing);
        assert!(!signing.is_security_event());

        let unknown = SvcAuthError::UnknownMethod {
            method: "hmac-v9".to_owned(),
        };
        assert_eq!(unknown.kind(), ErrorKind::UnknownMethod);
        assert_eq!(unknown.method(), Some("hmac-v9"));
        assert!(unknown.method_error().is_none());

        let dup = SvcAuthError::DuplicateMethod {
            method: "a".to_owned(),
        };
        assert_eq!(dup.kind(), ErrorKind::Configuration);
        let empty = SvcAuthError::EmptyMethodName;
        assert_eq!(empty.kind(), ErrorKind::Configuration);
        assert_eq!(empty.method(), None);
    }

    #[test]
    fn verification_error_chains_its_cause() {
        let err = SvcAuthError::Verification {
            method: "hmac-v1".to_owned(),
            source: MethodError::SignatureMismatch,
        };
        assert!(err.is_security_event());
        assert_eq!(
            err.to_string(),
            "failed to verify request with hmac-v1: signature does not match request"
        );
        let cause = err.source().expect("wrapped cause");
        assert_eq!(cause.to_string(), "signature does not match request");
        assert_eq!(err.method_error(), Some(&MethodError::SignatureMismatch));
    }
}
