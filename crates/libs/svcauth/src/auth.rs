use std::sync::Arc;

use crate::error::{MethodError, SvcAuthError};
use crate::meta::AUTH_METHOD_META_KEY;
use crate::transport::Transport;

/// One pluggable service-to-service authentication scheme.
///
/// Implementations hold only immutable key material after construction and
/// are shared across concurrent requests without locking.
pub trait ServiceAuth: Send + Sync {
    /// Stable method name. Signer and verifier are matched on it.
    fn method(&self) -> &str;

    /// Attaches this method's proof to `req`. Must not touch `req` on error.
    fn sign(&self, req: &mut dyn Transport) -> Result<(), MethodError>;

    fn verify(&self, req: &dyn Transport) -> Result<(), MethodError>;
}

impl<T: ServiceAuth + ?Sized> ServiceAuth for Arc<T> {
    fn method(&self) -> &str {
        (**self).method()
    }

    fn sign(&self, req: &mut dyn Transport) -> Result<(), MethodError> {
        (**self).sign(req)
    }

    fn verify(&self, req: &dyn Transport) -> Result<(), MethodError> {
        (**self).verify(req)
    }
}

/// Signs `req` with `method` and records the method name so the receiver
/// can pick the matching verifier.
///
/// The method marker is written only after the method signed successfully.
pub fn sign(method: &dyn ServiceAuth, req: &mut dyn Transport) -> Result<(), SvcAuthError> {
    let name = method.method();
    if let Err(source) = method.sign(req) {
        return Err(SvcAuthError::Signing {
            method: name.to_owned(),
            source,
        });
    }
    req.set_meta(AUTH_METHOD_META_KEY, name);
    log::debug!("signed service request with {name}");
    Ok(())
}

/// Verifies `req` against the methods this process has loaded.
///
/// Returns `Ok(true)` for an authenticated internal call and `Ok(false)`
/// when the request carries no method marker. A marker naming a method
/// that is not loaded yields [`SvcAuthError::UnknownMethod`]; a loaded
/// method rejecting the request yields [`SvcAuthError::Verification`].
/// Only the declared method is consulted.
pub fn verify(req: &dyn Transport, loaded: &[Arc<dyn ServiceAuth>]) -> Result<bool, SvcAuthError> {
    let Some(declared) = req.read_meta(AUTH_METHOD_META_KEY) else {
        return Ok(false);
    };

    let Some(method) = loaded.iter().find(|method| method.method() == declared) else {
        let names: Vec<&str> = loaded.iter().map(|method| method.method()).collect();
        log::warn!(
            "rejecting service request: unknown auth method {declared:?} (loaded: {names:?})"
        );
        return Err(SvcAuthError::UnknownMethod {
            method: declared.to_owned(),
        });
    };

    match method.verify(req) {
        Ok(()) => {
            log::debug!("verified internal service request with {declared}");
            Ok(true)
        }
        Err(source) => {
            log::warn!("rejecting service request signed with {declared}: {source}");
            Err(SvcAuthError::Verification {
                method: declared.to_owned(),
                source,
            })
        }
    }
}
