//! Audit logging bound to an execution context.
//!
//! An [`AuditLogger`] is created once per invocation, e.g. once per incoming event, from the
//! [`ExecutionContext`] of that invocation. Every entry it writes carries the `execution_id`,
//! `correlation_id` and `workspace_id` labels of the context next to the labels given by the
//! caller, and ends up in a named log of [Google Cloud Logging](https://cloud.google.com/logging).
//!
//! ```no_run
//! use skills_audit::{create_logger, ExecutionContext, Labels, Severity};
//!
//! # async fn handle() -> Result<(), Box<dyn std::error::Error>> {
//! let context = ExecutionContext::new(Some("e1"), "c1", "w1");
//! let labels = Labels::from([("team".to_string(), "x".to_string())]);
//! let logger = create_logger(Some(context), labels, None, None)?;
//!
//! logger.log("skill installed", Severity::Info, &Labels::new()).await?;
//! logger.log(vec!["step 1", "step 2"], Severity::Warning, &Labels::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Backends other than Google Cloud Logging plug in through the [`LogBackend`] trait and
//! [`Builder::build_with_backend`].

/// Domain types: the context, severities, labels, entries and the backend trait
pub mod domain;

/// Backend implementations
pub mod infra;

/// The factory and the logger itself
pub mod logger;

pub use domain::{Entry, EntryMetadata, ExecutionContext, Labels, LogBackend, Message, Resource, Severity};
pub use infra::{CloudLoggingBackend, StdoutBackend, StdoutError};
pub use logger::{create_logger, AuditLogger, Builder, ContextError, DEFAULT_LOG_NAME};
