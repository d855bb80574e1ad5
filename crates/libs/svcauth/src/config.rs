//! TOML configuration for the methods a process signs and verifies with.
//!
//! ```toml
//! sign_with = ["ed25519-v1", "hmac-v1"]
//!
//! [[methods]]
//! kind = "hmac"
//! name = "hmac-v1"
//! secret = "s3cr3t"
//!
//! [[methods]]
//! kind = "ed25519"
//! signing_key = "<hex seed>"
//! trusted_keys = ["<hex public key>"]
//! requires_experiment = "v2"
//! ```
//!
//! `sign_with` is a preference list: the first entry that was actually
//! loaded signs outgoing calls.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use ed25519_dalek::{SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use serde::{Deserialize, Deserializer};
use svcauth_experiments::{ExperimentSet, Name};
use zeroize::Zeroizing;

use crate::auth::ServiceAuth;
use crate::error::SvcAuthError;
use crate::method::{Ed25519Auth, HmacAuth};
use crate::registry::MethodSet;
use crate::scheme::DEFAULT_MAX_SKEW_SECS;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read auth config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid auth config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("method {method}: invalid key material: {reason}")]
    InvalidKey { method: String, reason: String },

    #[error("none of the sign_with methods {methods:?} is loaded")]
    UnknownSigner { methods: Vec<String> },

    #[error(transparent)]
    Methods(#[from] SvcAuthError),
}

/// Secret string from config. Zeroed on drop and never printed.
#[derive(Clone, Default)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(Zeroizing::new(value.to_owned()))
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|value| Self(Zeroizing::new(value)))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(default)]
    pub sign_with: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum MethodConfig {
    Hmac {
        name: Option<String>,
        secret: SecretString,
        max_skew_secs: Option<u64>,
        requires_experiment: Option<Name>,
    },
    Ed25519 {
        name: Option<String>,
        signing_key: Option<SecretString>,
        #[serde(default)]
        trusted_keys: Vec<String>,
        max_skew_secs: Option<u64>,
        requires_experiment: Option<Name>,
    },
}

impl MethodConfig {
    pub fn name(&self) -> &str {
        match self {
            MethodConfig::Hmac { name, .. } => name.as_deref().unwrap_or(HmacAuth::DEFAULT_NAME),
            MethodConfig::Ed25519 { name, .. } => {
                name.as_deref().unwrap_or(Ed25519Auth::DEFAULT_NAME)
            }
        }
    }

    pub fn requires_experiment(&self) -> Option<Name> {
        match self {
            MethodConfig::Hmac {
                requires_experiment,
                ..
            }
            | MethodConfig::Ed25519 {
                requires_experiment,
                ..
            } => *requires_experiment,
        }
    }

    fn build(&self) -> Result<Arc<dyn ServiceAuth>, ConfigError> {
        let method = self.name().to_owned();
        match self {
            MethodConfig::Hmac {
                secret,
                max_skew_secs,
                ..
            } => {
                if secret.expose().is_empty() {
                    return Err(ConfigError::InvalidKey {
                        method,
                        reason: "secret must not be empty".to_owned(),
                    });
                }
                let skew = max_skew_secs.unwrap_or(DEFAULT_MAX_SKEW_SECS);
                let auth = HmacAuth::new(method, secret.expose()).with_max_skew_secs(skew);
                Ok(Arc::new(auth))
            }
            MethodConfig::Ed25519 {
                signing_key,
                trusted_keys,
                max_skew_secs,
                ..
            } => {
                let trusted = trusted_keys
                    .iter()
                    .map(|raw| decode_verifying_key(&method, raw))
                    .collect::<Result<Vec<_>, _>>()?;
                let auth = match signing_key {
                    Some(seed) => {
                        let signing_key = decode_signing_key(&method, seed)?;
                        let mut auth = Ed25519Auth::new(method, signing_key);
                        for key in trusted {
                            auth = auth.with_trusted_key(key);
                        }
                        auth
                    }
                    None if trusted.is_empty() => {
                        return Err(ConfigError::InvalidKey {
                            method,
                            reason: "either signing_key or trusted_keys is required".to_owned(),
                        });
                    }
                    None => Ed25519Auth::verifier(method, trusted),
                };
                let skew = max_skew_secs.unwrap_or(DEFAULT_MAX_SKEW_SECS);
                Ok(Arc::new(auth.with_max_skew_secs(skew)))
            }
        }
    }
}

/// Methods resolved from config for this process.
pub struct ServiceAuthSetup {
    /// Signs outgoing calls; `None` when `sign_with` is empty.
    pub signer: Option<Arc<dyn ServiceAuth>>,
    /// Accepted when verifying incoming calls.
    pub methods: MethodSet,
}

impl fmt::Debug for ServiceAuthSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let signer = self.signer.as_ref().map(|signer| signer.method());
        f.debug_struct("ServiceAuthSetup")
            .field("signer", &signer)
            .field("methods", &self.methods)
            .finish()
    }
}

impl AuthConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Builds every method whose experiment gate (if any) is enabled in
    /// `experiments`, then picks the signer.
    pub fn build(&self, experiments: &ExperimentSet) -> Result<ServiceAuthSetup, ConfigError> {
        let mut loaded = Vec::with_capacity(self.methods.len());
        for config in &self.methods {
            if let Some(gate) = config.requires_experiment() {
                if !experiments.enabled(gate) {
                    log::info!(
                        "skipping auth method {}: experiment {gate} is not enabled",
                        config.name()
                    );
                    continue;
                }
            }
            loaded.push(config.build()?);
        }
        let methods = MethodSet::new(loaded)?;

        let signer = if self.sign_with.is_empty() {
            None
        } else {
            let signer = self
                .sign_with
                .iter()
                .find_map(|name| methods.get(name))
                .cloned()
                .ok_or_else(|| ConfigError::UnknownSigner {
                    methods: self.sign_with.clone(),
                })?;
            Some(signer)
        };

        log::debug!(
            "service auth configured: signer={:?} methods={:?}",
            signer.as_ref().map(|signer| signer.method()),
            methods.names()
        );
        Ok(ServiceAuthSetup { signer, methods })
    }
}

fn decode_signing_key(method: &str, seed: &SecretString) -> Result<SigningKey, ConfigError> {
    let mut bytes = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
    let decoded = hex::decode_to_slice(seed.expose().trim(), &mut bytes[..]);
    if let Err(err) = decoded {
        return Err(ConfigError::InvalidKey {
            method: method.to_owned(),
            reason: format!("signing_key: {err}"),
        });
    }
    Ok(SigningKey::from_bytes(&bytes))
}

fn decode_verifying_key(method: &str, raw: &str) -> Result<VerifyingKey, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidKey {
        method: method.to_owned(),
        reason: format!("trusted key {raw}: {reason}"),
    };
    let mut bytes = [0u8; PUBLIC_KEY_LENGTH];
    hex::decode_to_slice(raw.trim(), &mut bytes).map_err(|err| invalid(err.to_string()))?;
    VerifyingKey::from_bytes(&bytes).map_err(|err| invalid(err.to_string()))
}
