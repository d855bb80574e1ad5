//! Signing input and freshness rules shared by the built-in methods.
//!
//! A request is signed over
//!
//! ```text
//! svcauth-v1\n{method}\n{timestamp}\n{hex(sha256(payload))}
//! ```
//!
//! Binding the method name keeps a tag from being relabeled as another
//! method's. The timestamp is unix seconds and must be within the
//! verifier's skew tolerance.

use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::error::MethodError;
use crate::meta::TIMESTAMP_META_KEY;
use crate::transport::Transport;

const SCHEME_TAG: &str = "svcauth-v1";

pub const DEFAULT_MAX_SKEW_SECS: u64 = 300;

/// Time source for signing and freshness checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    /// Always reports the given unix second.
    Fixed(u64),
}

impl Clock {
    pub fn now_secs(self) -> u64 {
        match self {
            Clock::System => now_seconds_u64(),
            Clock::Fixed(secs) => secs,
        }
    }
}

pub fn now_seconds_u64() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

pub(crate) fn signing_input(method: &str, timestamp: u64, payload: &[u8]) -> Vec<u8> {
    let payload_digest = hex::encode(Sha256::digest(payload));
    format!("{SCHEME_TAG}\n{method}\n{timestamp}\n{payload_digest}").into_bytes()
}

pub(crate) fn check_freshness(
    now: u64,
    timestamp: u64,
    tolerance_secs: u64,
) -> Result<(), MethodError> {
    let skew_secs = now.abs_diff(timestamp);
    if skew_secs > tolerance_secs {
        return Err(MethodError::StaleTimestamp {
            skew_secs,
            tolerance_secs,
        });
    }
    Ok(())
}

pub(crate) fn required_meta<'a>(
    req: &'a dyn Transport,
    key: &'static str,
) -> Result<&'a str, MethodError> {
    req.read_meta(key)
        .ok_or(MethodError::MissingMetadata { key })
}

/// Reads the signed timestamp. Only the exact decimal form the signer
/// writes is accepted, so the value cannot be re-encoded in transit.
pub(crate) fn read_timestamp(req: &dyn Transport) -> Result<u64, MethodError> {
    let raw = required_meta(req, TIMESTAMP_META_KEY)?;
    let timestamp = raw
        .parse::<u64>()
        .map_err(|err| MethodError::malformed(TIMESTAMP_META_KEY, err.to_string()))?;
    if timestamp.to_string() != raw {
        return Err(MethodError::malformed(TIMESTAMP_META_KEY, "not canonical decimal"));
    }
    Ok(timestamp)
}

/// Reads `N` hex-encoded bytes, lowercase only, as written by the signer.
pub(crate) fn read_hex<const N: usize>(
    req: &dyn Transport,
    key: &'static str,
) -> Result<[u8; N], MethodError> {
    let raw = required_meta(req, key)?;
    let mut out = [0u8; N];
    hex::decode_to_slice(raw, &mut out)
        .map_err(|err| MethodError::malformed(key, err.to_string()))?;
    if hex::encode(out) != raw {
        return Err(MethodError::malformed(key, "not lowercase hex"));
    }
    Ok(out)
}
