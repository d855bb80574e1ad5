//! Built-in [`ServiceAuth`](crate::ServiceAuth) implementations.

mod ed25519;
mod hmac;

pub use self::ed25519::Ed25519Auth;
pub use self::hmac::HmacAuth;
