use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::auth::ServiceAuth;
use crate::error::MethodError;
use crate::meta::{SIGNATURE_META_KEY, TIMESTAMP_META_KEY};
use crate::scheme::{self, Clock, DEFAULT_MAX_SKEW_SECS};
use crate::transport::Transport;

type HmacSha256 = Hmac<Sha256>;

const TAG_LEN: usize = 32;

/// Shared-secret HMAC-SHA256 over the request signing input.
pub struct HmacAuth {
    name: String,
    secret: Zeroizing<Vec<u8>>,
    max_skew_secs: u64,
    clock: Clock,
}

impl HmacAuth {
    pub const DEFAULT_NAME: &'static str = "hmac-v1";

    pub fn new(name: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            secret: Zeroizing::new(secret.into()),
            max_skew_secs: DEFAULT_MAX_SKEW_SECS,
            clock: Clock::System,
        }
    }

    pub fn with_max_skew_secs(mut self, max_skew_secs: u64) -> Self {
        self.max_skew_secs = max_skew_secs;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn max_skew_secs(&self) -> u64 {
        self.max_skew_secs
    }

    fn mac(&self, timestamp: u64, payload: &[u8]) -> Result<HmacSha256, MethodError> {
        if self.secret.is_empty() {
            return Err(MethodError::MissingCredential);
        }
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .map_err(|_| MethodError::MissingCredential)?;
        mac.update(&scheme::signing_input(&self.name, timestamp, payload));
        Ok(mac)
    }
}

impl fmt::Debug for HmacAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacAuth")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .field("max_skew_secs", &self.max_skew_secs)
            .field("clock", &self.clock)
            .finish()
    }
}

impl ServiceAuth for HmacAuth {
    fn method(&self) -> &str {
        &self.name
    }

    fn sign(&self, req: &mut dyn Transport) -> Result<(), MethodError> {
        let timestamp = self.clock.now_secs();
        let tag = self.mac(timestamp, req.payload())?.finalize().into_bytes();

        req.set_meta(TIMESTAMP_META_KEY, &timestamp.to_string());
        req.set_meta(SIGNATURE_META_KEY, &hex::encode(tag));
        Ok(())
    }

    fn verify(&self, req: &dyn Transport) -> Result<(), MethodError> {
        let timestamp = scheme::read_timestamp(req)?;
        let provided = scheme::read_hex::<TAG_LEN>(req, SIGNATURE_META_KEY)?;
        scheme::check_freshness(self.clock.now_secs(), timestamp, self.max_skew_secs)?;

        self.mac(timestamp, req.payload())?
            .verify_slice(&provided)
            .map_err(|_| MethodError::SignatureMismatch)
    }
}
