use crate::domain::{Entry, LogBackend, Resource};
use async_trait::async_trait;
use chrono::Utc;
use googlelog::error::Error;
use googlelog::logger::{monitored_resource, Builder, Client, LogSeverity};
use googlelog::{LogEntry, MonitoredResource};

/// A [LogBackend] that writes to [Google Cloud Logging](https://cloud.google.com/logging)
#[derive(Debug)]
pub struct CloudLoggingBackend {
    client: Client,
}

impl CloudLoggingBackend {
    /// Binds to the `name` log of `project`. Without a project the client discovers one from the
    /// environment or the metadata server.
    pub fn new(name: &str, project: Option<&str>, log: Option<slog::Logger>) -> Self {
        let mut builder = Builder::new(name);
        if let Some(project) = project {
            builder = builder.with_project(project);
        }
        if let Some(log) = log {
            builder = builder.with_logger(log.new(slog::o!("backend" => "cloud-logging")));
        }
        Self::with_client(builder.build())
    }

    pub fn with_client(client: Client) -> Self {
        CloudLoggingBackend { client }
    }

    async fn submit(&self, severity: LogSeverity, entries: Vec<Entry>, resource: &Resource) -> Result<(), Error> {
        self.client
            .write(severity, log_entries(entries), to_monitored_resource(resource))
            .await
    }
}

/// Converts entries to Google [LogEntry]s with a text payload. All entries of one submission get
/// the same timestamp.
pub(super) fn log_entries(entries: Vec<Entry>) -> Vec<LogEntry> {
    let now = Utc::now();
    entries
        .into_iter()
        .map(|entry| LogEntry {
            text_payload: Some(entry.message),
            labels: Some(entry.metadata.labels.clone()),
            timestamp: Some(now),
            ..Default::default()
        })
        .collect()
}

pub(super) fn to_monitored_resource(resource: &Resource) -> MonitoredResource {
    monitored_resource(&resource.type_, resource.labels.clone())
}

#[async_trait]
impl LogBackend for CloudLoggingBackend {
    type Error = Error;

    async fn submit_info(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Error> {
        self.submit(LogSeverity::Info, entries, resource).await
    }

    async fn submit_warning(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Error> {
        self.submit(LogSeverity::Warning, entries, resource).await
    }

    async fn submit_error(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Error> {
        self.submit(LogSeverity::Error, entries, resource).await
    }
}

#[cfg(test)]
mod tests {
    use super::{log_entries, to_monitored_resource};
    use crate::domain::{EntryMetadata, Labels, Message, Resource};
    use pretty_assertions::assert_eq;

    #[test]
    fn entries_become_text_payloads_with_shared_labels() {
        let metadata = EntryMetadata {
            labels: Labels::from([("workspace_id".to_string(), "w1".to_string())]),
        };
        let entries = log_entries(Message::from(["a", "b"]).into_entries(metadata.clone()));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text_payload.as_deref(), Some("a"));
        assert_eq!(entries[1].text_payload.as_deref(), Some("b"));
        assert_eq!(entries[0].labels.as_ref(), Some(&metadata.labels));
        assert_eq!(entries[0].labels, entries[1].labels);
        assert_eq!(entries[0].timestamp, entries[1].timestamp);
        assert_eq!(entries[0].severity, None);
    }

    #[test]
    fn global_resource_has_no_labels() {
        let resource = to_monitored_resource(&Resource::global());
        assert_eq!(resource.type_.as_deref(), Some("global"));
        assert_eq!(resource.labels, None);
    }
}
