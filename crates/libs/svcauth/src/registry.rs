use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use crate::auth::{self, ServiceAuth};
use crate::error::SvcAuthError;
use crate::transport::Transport;

/// Methods a process accepts when verifying incoming calls.
///
/// Immutable once built; method names are unique and non-empty.
#[derive(Clone, Default)]
pub struct MethodSet {
    methods: Vec<Arc<dyn ServiceAuth>>,
}

impl MethodSet {
    pub fn new(methods: Vec<Arc<dyn ServiceAuth>>) -> Result<Self, SvcAuthError> {
        {
            let mut seen = BTreeSet::new();
            for method in &methods {
                let name = method.method();
                if name.is_empty() {
                    return Err(SvcAuthError::EmptyMethodName);
                }
                if !seen.insert(name) {
                    return Err(SvcAuthError::DuplicateMethod {
                        method: name.to_owned(),
                    });
                }
            }
        }
        Ok(Self { methods })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ServiceAuth>> {
        self.methods.iter().find(|method| method.method() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.methods.iter().map(|method| method.method()).collect()
    }

    pub fn methods(&self) -> &[Arc<dyn ServiceAuth>] {
        &self.methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// See [`crate::verify`].
    pub fn verify(&self, req: &dyn Transport) -> Result<bool, SvcAuthError> {
        auth::verify(req, &self.methods)
    }
}

impl std::fmt::Debug for MethodSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSet")
            .field("methods", &self.names())
            .finish()
    }
}

/// Shared handle to the current [`MethodSet`].
///
/// Readers take a snapshot and keep it for the whole request; a rotation
/// swaps in a complete new set, never editing the one readers hold.
#[derive(Debug, Default)]
pub struct LoadedMethods {
    current: RwLock<Arc<MethodSet>>,
}

impl LoadedMethods {
    pub fn new(methods: MethodSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(methods)),
        }
    }

    pub fn snapshot(&self) -> Arc<MethodSet> {
        // The guarded Arc is replaced whole, so a poisoned lock still holds
        // a consistent set.
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Installs `methods` and returns the set it replaced.
    pub fn replace(&self, methods: MethodSet) -> Arc<MethodSet> {
        let next = Arc::new(methods);
        log::info!("service auth methods now {:?}", next.names());
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    pub fn verify(&self, req: &dyn Transport) -> Result<bool, SvcAuthError> {
        self.snapshot().verify(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::HmacAuth;
    use crate::transport::Request;

    fn hmac(name: &str, secret: &str) -> Arc<dyn ServiceAuth> {
        Arc::new(HmacAuth::new(name, secret))
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let methods = vec![hmac("hmac-v1", "a"), hmac("hmac-v1", "b")];
        let err = MethodSet::new(methods).expect_err("duplicate");
        assert_eq!(
            err,
            SvcAuthError::DuplicateMethod {
                method: "hmac-v1".to_owned()
            }
        );
    }

    #[test]
    fn empty_names_are_rejected() {
        let err = MethodSet::new(vec![hmac("", "a")]).expect_err("empty name");
        assert_eq!(err, SvcAuthError::EmptyMethodName);
    }

    #[test]
    fn lookup_by_exact_name() {
        let set = MethodSet::new(vec![hmac("hmac-v1", "a"), hmac("hmac-v2", "b")]).expect("set");
        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), vec!["hmac-v1", "hmac-v2"]);
        assert!(set.get("hmac-v2").is_some());
        assert!(set.get("HMAC-V2").is_none());
        assert_eq!(
            format!("{set:?}"),
            "MethodSet { methods: [\"hmac-v1\", \"hmac-v2\"] }"
        );
    }

    #[test]
    fn replace_keeps_existing_snapshots_intact() {
        let first = MethodSet::new(vec![hmac("hmac-v1", "a")]).expect("set");
        let loaded = LoadedMethods::new(first);
        let before = loaded.snapshot();

        let second = MethodSet::new(vec![hmac("hmac-v2", "b")]).expect("set");
        let previous = loaded.replace(second);

        assert_eq!(before.names(), vec!["hmac-v1"]);
        assert_eq!(previous.names(), vec!["hmac-v1"]);
        assert_eq!(loaded.snapshot().names(), vec!["hmac-v2"]);
    }

    #[test]
    fn default_handle_treats_unsigned_calls_as_external() {
        let loaded = LoadedMethods::default();
        assert!(loaded.snapshot().is_empty());
        assert_eq!(loaded.snapshot().len(), 0);
        assert_eq!(loaded.verify(&Request::new("x")), Ok(false));
    }
}
