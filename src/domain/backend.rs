//! The seam between the audit logger and wherever its entries end up
//!
//! Implementations live in the [`infra`](crate::infra) module.
use super::entry::{Entry, Resource};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// A LogBackend accepts batches of entries at one of three severities.
///
/// Every call is one submission: either all entries are accepted or the call fails. The error is
/// handed back to the caller of [`AuditLogger::log`](crate::logger::AuditLogger::log) untouched.
#[async_trait]
pub trait LogBackend: Send + Sync + Debug {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn submit_info(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Self::Error>;

    async fn submit_warning(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Self::Error>;

    async fn submit_error(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Self::Error>;
}

#[async_trait]
impl<B: LogBackend + ?Sized> LogBackend for Arc<B> {
    type Error = B::Error;

    async fn submit_info(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Self::Error> {
        (**self).submit_info(entries, resource).await
    }

    async fn submit_warning(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Self::Error> {
        (**self).submit_warning(entries, resource).await
    }

    async fn submit_error(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Self::Error> {
        (**self).submit_error(entries, resource).await
    }
}
