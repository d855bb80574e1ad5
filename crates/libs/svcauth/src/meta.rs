//! Metadata keys written and read by the auth layer.

/// Names the method that signed the request. Its presence marks the call
/// as a claimed internal call.
pub const AUTH_METHOD_META_KEY: &str = "Svc-Auth-Method";

/// Unix seconds at which the request was signed.
pub const TIMESTAMP_META_KEY: &str = "Svc-Auth-Timestamp";

/// Hex-encoded authentication tag or signature.
pub const SIGNATURE_META_KEY: &str = "Svc-Auth-Signature";

/// Hex-encoded public key that produced an asymmetric signature.
pub const KEY_META_KEY: &str = "Svc-Auth-Key";
