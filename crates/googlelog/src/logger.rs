use crate::error::Error;
use crate::shipper::{Shipper, DEFAULT_API_BASE, DEFAULT_METADATA_HOST};

use google_logging2::api::{LogEntry, MonitoredResource, WriteLogEntriesRequest};

use std::collections::HashMap;
use std::env;
use std::fmt;

use tokio::sync::OnceCell;

/// Environment variables consulted, in order, when no project was set on the [`Builder`]
pub const PROJECT_ENV_VARS: [&str; 2] = ["GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"];

/// Builder for the [`Client`]
#[derive(Default)]
pub struct Builder {
    log_id: String,
    project: Option<String>,
    api_base: Option<String>,
    metadata_host: Option<String>,
    log: Option<slog::Logger>,
}

/// Writes log entries to a single log of a Google Cloud project.
///
/// Cloning is not supported; share it behind an `Arc` if needed. The access token and project id
/// are cached inside the client.
pub struct Client {
    log_id: String,
    project: OnceCell<String>,
    shipper: Shipper,
}

/// The severities this client submits at.
///
/// See <https://cloud.google.com/logging/docs/reference/v2/rest/v2/LogEntry#logseverity>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Info,
    Warning,
    Error,
}

impl LogSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogSeverity::Info => "INFO",
            LogSeverity::Warning => "WARNING",
            LogSeverity::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Builder {
    /// Creates a Builder object.
    ///
    /// # Parameters
    /// - `log_id`: The name of the log within the project, for example `skills_audit`. It ends up
    ///   URL-encoded in the `logName` of the [WriteLogEntriesRequest](https://cloud.google.com/logging/docs/reference/v2/rest/v2/entries/write).
    ///
    /// # Example
    ///
    /// ```
    /// use googlelog::logger::Builder;
    /// let client = Builder::new("skills_audit")
    ///     .with_project("my-gcp-project")
    ///     .build();
    /// assert_eq!(client.log_id(), "skills_audit");
    /// ```
    #[must_use = "The builder must be used"]
    pub fn new(log_id: &str) -> Self {
        Self {
            log_id: log_id.to_string(),
            ..Default::default()
        }
    }

    /// Sets the Google Cloud project to write to.
    ///
    /// If not set, the project is taken from the `GOOGLE_CLOUD_PROJECT` or `GCLOUD_PROJECT`
    /// environment variables and, failing that, from the metadata server on first write.
    #[must_use = "The builder must be used"]
    pub fn with_project(self, project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            ..self
        }
    }

    /// Overrides the base URL of the Google Logging API. Mostly useful for tests and emulators.
    #[must_use = "The builder must be used"]
    pub fn with_api_base(self, api_base: impl Into<String>) -> Self {
        Self {
            api_base: Some(api_base.into()),
            ..self
        }
    }

    /// Overrides the base URL of the metadata server used for tokens and project discovery.
    #[must_use = "The builder must be used"]
    pub fn with_metadata_host(self, metadata_host: impl Into<String>) -> Self {
        Self {
            metadata_host: Some(metadata_host.into()),
            ..self
        }
    }

    /// Sets the slog logger used for diagnostics of the client itself.
    #[must_use = "The builder must be used"]
    pub fn with_logger(self, log: slog::Logger) -> Self {
        Self {
            log: Some(log),
            ..self
        }
    }

    /// Builds the [`Client`]. No network calls are made here.
    pub fn build(self) -> Client {
        let project = self.project.or_else(project_from_env);
        let log = self
            .log
            .unwrap_or_else(|| slog::Logger::root(slog::Discard, slog::o!()));
        Client {
            log_id: self.log_id,
            project: OnceCell::new_with(project),
            shipper: Shipper::new(
                self.api_base
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                self.metadata_host
                    .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string()),
                log,
            ),
        }
    }
}

/// The first non-empty project set in [`PROJECT_ENV_VARS`]
pub fn project_from_env() -> Option<String> {
    PROJECT_ENV_VARS
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.is_empty())
}

/// The `logName` of a log in a project
pub fn log_name(project: &str, log_id: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(log_id.as_bytes()).collect();
    format!("projects/{project}/logs/{encoded}")
}

/// Composes the body of an `entries:write` call. Each entry gets the severity stamped on it and
/// the shared `resource` is set on the request.
pub fn construct_request(
    log_name: String,
    severity: LogSeverity,
    entries: Vec<LogEntry>,
    resource: MonitoredResource,
) -> WriteLogEntriesRequest {
    let entries = entries
        .into_iter()
        .map(|entry| LogEntry {
            severity: Some(severity.as_str().to_string()),
            ..entry
        })
        .collect();

    WriteLogEntriesRequest {
        log_name: Some(log_name),
        entries: Some(entries),
        resource: Some(resource),
        ..Default::default()
    }
}

/// A [MonitoredResource](https://cloud.google.com/logging/docs/reference/v2/rest/v2/MonitoredResource)
/// of the given type
pub fn monitored_resource(
    resource_type: &str,
    labels: HashMap<String, String>,
) -> MonitoredResource {
    MonitoredResource {
        type_: Some(resource_type.to_string()),
        labels: if labels.is_empty() {
            None
        } else {
            Some(labels)
        },
    }
}

impl Client {
    pub fn log_id(&self) -> &str {
        &self.log_id
    }

    /// The project, if it is known without asking the metadata server
    pub fn known_project(&self) -> Option<&str> {
        self.project.get().map(String::as_str)
    }

    async fn project(&self) -> Result<&str, Error> {
        self.project
            .get_or_try_init(|| self.shipper.fetch_project_id())
            .await
            .map(String::as_str)
    }

    /// Writes all `entries` in a single `entries:write` call at the given severity.
    pub async fn write(
        &self,
        severity: LogSeverity,
        entries: Vec<LogEntry>,
        resource: MonitoredResource,
    ) -> Result<(), Error> {
        let project = self.project().await?;
        let body = construct_request(
            log_name(project, &self.log_id),
            severity,
            entries,
            resource,
        );
        self.shipper.send_log_entries(&body).await
    }

    /// Shorthand for [`write`](Client::write) at [`LogSeverity::Info`]
    pub async fn info(
        &self,
        entries: Vec<LogEntry>,
        resource: MonitoredResource,
    ) -> Result<(), Error> {
        self.write(LogSeverity::Info, entries, resource).await
    }

    /// Shorthand for [`write`](Client::write) at [`LogSeverity::Warning`]
    pub async fn warning(
        &self,
        entries: Vec<LogEntry>,
        resource: MonitoredResource,
    ) -> Result<(), Error> {
        self.write(LogSeverity::Warning, entries, resource).await
    }

    /// Shorthand for [`write`](Client::write) at [`LogSeverity::Error`]
    pub async fn error(
        &self,
        entries: Vec<LogEntry>,
        resource: MonitoredResource,
    ) -> Result<(), Error> {
        self.write(LogSeverity::Error, entries, resource).await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("log_id", &self.log_id)
            .field("project", &self.known_project())
            .finish()
    }
}
