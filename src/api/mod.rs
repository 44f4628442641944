//! Canonical views of the remote API's resources.

pub mod envelope;
pub mod types;

pub use envelope::EnvelopeError;
pub use types::*;
