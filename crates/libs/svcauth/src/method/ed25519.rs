use std::fmt;

use ed25519_dalek::{
    Signature, Signer, SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH,
};

use crate::auth::ServiceAuth;
use crate::error::MethodError;
use crate::meta::{KEY_META_KEY, SIGNATURE_META_KEY, TIMESTAMP_META_KEY};
use crate::scheme::{self, Clock, DEFAULT_MAX_SKEW_SECS};
use crate::transport::Transport;

/// Ed25519 signatures over the request signing input.
///
/// Verifiers accept any key in `trusted`, so a new key can be trusted on
/// every receiver before senders switch to it. A verifier-only instance has
/// no signing key and fails to sign.
pub struct Ed25519Auth {
    name: String,
    signing_key: Option<SigningKey>,
    trusted: Vec<VerifyingKey>,
    max_skew_secs: u64,
    clock: Clock,
}

impl Ed25519Auth {
    pub const DEFAULT_NAME: &'static str = "ed25519-v1";

    /// Signs with `signing_key` and trusts its own public key.
    pub fn new(name: impl Into<String>, signing_key: SigningKey) -> Self {
        let trusted = vec![signing_key.verifying_key()];
        Self {
            name: name.into(),
            signing_key: Some(signing_key),
            trusted,
            max_skew_secs: DEFAULT_MAX_SKEW_SECS,
            clock: Clock::System,
        }
    }

    pub fn verifier(name: impl Into<String>, trusted: Vec<VerifyingKey>) -> Self {
        Self {
            name: name.into(),
            signing_key: None,
            trusted,
            max_skew_secs: DEFAULT_MAX_SKEW_SECS,
            clock: Clock::System,
        }
    }

    pub fn with_trusted_key(mut self, key: VerifyingKey) -> Self {
        if !self.trusted.contains(&key) {
            self.trusted.push(key);
        }
        self
    }

    pub fn with_max_skew_secs(mut self, max_skew_secs: u64) -> Self {
        self.max_skew_secs = max_skew_secs;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn trusted_keys(&self) -> &[VerifyingKey] {
        &self.trusted
    }
}

impl fmt::Debug for Ed25519Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trusted: Vec<String> = self
            .trusted
            .iter()
            .map(|key| hex::encode(key.as_bytes()))
            .collect();
        f.debug_struct("Ed25519Auth")
            .field("name", &self.name)
            .field("can_sign", &self.signing_key.is_some())
            .field("trusted", &trusted)
            .field("max_skew_secs", &self.max_skew_secs)
            .finish()
    }
}

impl ServiceAuth for Ed25519Auth {
    fn method(&self) -> &str {
        &self.name
    }

    fn sign(&self, req: &mut dyn Transport) -> Result<(), MethodError> {
        let Some(signing_key) = &self.signing_key else {
            return Err(MethodError::MissingCredential);
        };
        let timestamp = self.clock.now_secs();
        let input = scheme::signing_input(&self.name, timestamp, req.payload());
        let signature = signing_key.sign(&input);
        let public_key = hex::encode(signing_key.verifying_key().as_bytes());

        req.set_meta(TIMESTAMP_META_KEY, &timestamp.to_string());
        req.set_meta(KEY_META_KEY, &public_key);
        req.set_meta(SIGNATURE_META_KEY, &hex::encode(signature.to_bytes()));
        Ok(())
    }

    fn verify(&self, req: &dyn Transport) -> Result<(), MethodError> {
        let timestamp = scheme::read_timestamp(req)?;
        let key_bytes = scheme::read_hex::<PUBLIC_KEY_LENGTH>(req, KEY_META_KEY)?;
        let signature_bytes = scheme::read_hex::<SIGNATURE_LENGTH>(req, SIGNATURE_META_KEY)?;

        let key = self
            .trusted
            .iter()
            .find(|trusted| trusted.as_bytes() == &key_bytes)
            .ok_or(MethodError::UntrustedKey)?;
        scheme::check_freshness(self.clock.now_secs(), timestamp, self.max_skew_secs)?;

        let input = scheme::signing_input(&self.name, timestamp, req.payload());
        let signature = Signature::from_bytes(&signature_bytes);
        key.verify_strict(&input, &signature)
            .map_err(|_| MethodError::SignatureMismatch)
    }
}
