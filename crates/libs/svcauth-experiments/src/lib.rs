//! Experiment flags for a single process run.
//!
//! An [`ExperimentSet`] is built once at startup from an ordered list of
//! sources and then passed explicitly to the components that consult it:
//!
//! - experiments declared by the application
//! - the `ENCORE_EXPERIMENT` variable of this process
//! - `ENCORE_EXPERIMENT=...` entries in the caller's environment snapshot
//!
//! Every name is checked against the closed [`Name`] enum. An unrecognized
//! name fails construction with [`UnknownExperimentError`].

pub mod error;
pub mod name;
pub mod set;

pub use error::UnknownExperimentError;
pub use name::Name;
pub use set::{ExperimentSet, ENV_NAME};
