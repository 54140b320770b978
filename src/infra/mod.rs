//! Infra contains infrastructure specific implementations of things in the [`domain`](crate::domain)
//! module.
mod cloud_logging;
mod stdout;

pub use cloud_logging::CloudLoggingBackend;
pub use stdout::{StdoutBackend, StdoutError};
