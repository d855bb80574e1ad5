//! Service-to-service request authentication.
//!
//! A caller signs an outgoing request with one [`ServiceAuth`] method;
//! [`sign`] records the method's name under [`AUTH_METHOD_META_KEY`]. The
//! receiver passes the request and the methods it has loaded to [`verify`],
//! which dispatches to the declared method and reports whether the request
//! is an authenticated internal call:
//!
//! - no marker: `Ok(false)`, an ordinary external call
//! - marker naming a loaded method that accepts it: `Ok(true)`
//! - marker naming a method that is not loaded: [`SvcAuthError::UnknownMethod`]
//! - loaded method rejecting the request: [`SvcAuthError::Verification`]
//!
//! Several methods may be loaded at once (e.g. during key rotation); each
//! request is checked only by the method it declares.
//!
//! Built-in methods are [`HmacAuth`] and [`Ed25519Auth`]. Both sign over
//! the method name, a unix timestamp and the SHA-256 of the request payload
//! (see [`scheme`]).

mod auth;
pub mod config;
mod error;
pub mod meta;
pub mod method;
mod registry;
pub mod scheme;
pub mod transport;

pub use auth::{sign, verify, ServiceAuth};
pub use config::{AuthConfig, ConfigError, MethodConfig, ServiceAuthSetup};
pub use error::{ErrorKind, MethodError, SvcAuthError};
pub use meta::AUTH_METHOD_META_KEY;
pub use method::{Ed25519Auth, HmacAuth};
pub use registry::{LoadedMethods, MethodSet};
pub use scheme::Clock;
pub use transport::{HeaderRequest, Request, Transport};

pub use svcauth_experiments as experiments;
