//! Domain definitions of the audit logger
//!
//! Packages elsewhere e.g. in the [`infra`](crate::infra) module implement the traits defined here.
mod backend;
mod context;
mod entry;
pub mod labels;
mod severity;

pub use backend::LogBackend;
pub use context::ExecutionContext;
pub use entry::{Entry, EntryMetadata, Message, Resource};
pub use labels::Labels;
pub use severity::Severity;
