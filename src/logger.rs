//! The audit logger and the factory that binds it to an execution context
use crate::domain::labels::{context_labels, merge_labels};
use crate::domain::{EntryMetadata, ExecutionContext, Labels, LogBackend, Message, Resource, Severity};
use crate::infra::CloudLoggingBackend;
use thiserror::Error;

/// The log stream written to when no name is given
pub const DEFAULT_LOG_NAME: &str = "skills_audit";

/// Returned by the factory when the execution context cannot identify an invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("no execution context given, correlationId and workspaceId are required")]
    Absent,
    #[error("execution context is missing {fields}: {context}", fields = .missing.join(", "))]
    Invalid {
        missing: Vec<&'static str>,
        context: ExecutionContext,
    },
}

/// Builder for the [`AuditLogger`]
#[derive(Debug)]
pub struct Builder {
    context: Option<ExecutionContext>,
    labels: Labels,
    name: String,
    project: Option<String>,
    log: Option<slog::Logger>,
}

impl Builder {
    /// Starts a builder for the given execution context. Validation happens when building.
    #[must_use = "The builder must be used"]
    pub fn new(context: Option<ExecutionContext>) -> Self {
        Builder {
            context,
            labels: Labels::new(),
            name: DEFAULT_LOG_NAME.to_string(),
            project: None,
            log: None,
        }
    }

    /// Labels added to every entry. Per call labels and context labels take precedence.
    #[must_use = "The builder must be used"]
    pub fn with_labels(self, labels: Labels) -> Self {
        Builder { labels, ..self }
    }

    /// The name of the log stream, `skills_audit` if not set.
    #[must_use = "The builder must be used"]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Builder {
            name: name.into(),
            ..self
        }
    }

    /// The Google Cloud project to log to. Without it the project is discovered from the
    /// environment.
    #[must_use = "The builder must be used"]
    pub fn with_project(self, project: impl Into<String>) -> Self {
        Builder {
            project: Some(project.into()),
            ..self
        }
    }

    /// A slog logger for diagnostics of the backend client.
    #[must_use = "The builder must be used"]
    pub fn with_logger(self, log: slog::Logger) -> Self {
        Builder {
            log: Some(log),
            ..self
        }
    }

    fn validate(context: Option<ExecutionContext>) -> Result<ExecutionContext, ContextError> {
        let context = context.ok_or(ContextError::Absent)?;
        let missing = context.missing_fields();
        if missing.is_empty() {
            Ok(context)
        } else {
            Err(ContextError::Invalid { missing, context })
        }
    }

    /// Builds a logger that writes to Google Cloud Logging.
    ///
    /// The context is checked before the client is created. No network calls are made until the
    /// first [`AuditLogger::log`].
    pub fn build(self) -> Result<AuditLogger<CloudLoggingBackend>, ContextError> {
        let context = Self::validate(self.context)?;
        let backend = CloudLoggingBackend::new(&self.name, self.project.as_deref(), self.log);
        Ok(AuditLogger::new(context, self.labels, self.name, backend))
    }

    /// Builds a logger that submits to the given backend.
    pub fn build_with_backend<B: LogBackend>(self, backend: B) -> Result<AuditLogger<B>, ContextError> {
        let context = Self::validate(self.context)?;
        Ok(AuditLogger::new(context, self.labels, self.name, backend))
    }
}

/// Creates an [`AuditLogger`] bound to `context` that writes to the `name` log (default
/// `skills_audit`) of `project` (default: discovered) in Google Cloud Logging.
///
/// Fails right away if the context is absent or lacks a correlation id or workspace id.
pub fn create_logger(
    context: Option<ExecutionContext>,
    labels: Labels,
    name: Option<&str>,
    project: Option<&str>,
) -> Result<AuditLogger<CloudLoggingBackend>, ContextError> {
    let mut builder = Builder::new(context)
        .with_labels(labels)
        .with_name(name.unwrap_or(DEFAULT_LOG_NAME));
    if let Some(project) = project {
        builder = builder.with_project(project);
    }
    builder.build()
}

/// Emits audit entries tagged with the labels of one execution context.
///
/// Holds no state besides its configuration; every [`log`](AuditLogger::log) call builds its
/// entries from scratch and results in exactly one backend submission.
#[derive(Debug)]
pub struct AuditLogger<B> {
    context: ExecutionContext,
    context_labels: Labels,
    labels: Labels,
    name: String,
    backend: B,
}

impl<B: LogBackend> AuditLogger<B> {
    fn new(context: ExecutionContext, labels: Labels, name: String, backend: B) -> Self {
        AuditLogger {
            context_labels: context_labels(&context),
            context,
            labels,
            name,
            backend,
        }
    }

    /// Submits `msg`, one entry per message, at the given severity.
    ///
    /// The labels of the entries are the factory labels, overridden by `call_labels`, overridden
    /// by `execution_id`, `correlation_id` and `workspace_id` from the context. A backend error
    /// is returned as is.
    pub async fn log(
        &self,
        msg: impl Into<Message>,
        severity: Severity,
        call_labels: &Labels,
    ) -> Result<(), B::Error> {
        let metadata = EntryMetadata {
            labels: merge_labels(&self.labels, call_labels, &self.context_labels),
        };
        let entries = msg.into().into_entries(metadata);
        let resource = Resource::global();

        match severity {
            Severity::Warning => self.backend.submit_warning(entries, &resource).await,
            Severity::Error => self.backend.submit_error(entries, &resource).await,
            Severity::Info => self.backend.submit_info(entries, &resource).await,
        }
    }

    pub async fn info(&self, msg: impl Into<Message>) -> Result<(), B::Error> {
        self.log(msg, Severity::Info, &Labels::new()).await
    }

    pub async fn warning(&self, msg: impl Into<Message>) -> Result<(), B::Error> {
        self.log(msg, Severity::Warning, &Labels::new()).await
    }

    pub async fn error(&self, msg: impl Into<Message>) -> Result<(), B::Error> {
        self.log(msg, Severity::Error, &Labels::new()).await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Entry, Resource};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Endpoint {
        Info,
        Warning,
        Error,
    }

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    #[error("backend rejected submission #{0}")]
    struct Rejected(u32);

    #[derive(Debug, Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<(Endpoint, Vec<Entry>, Resource)>>,
        reject_with: Option<Rejected>,
    }

    impl RecordingBackend {
        fn rejecting(err: Rejected) -> Self {
            RecordingBackend {
                reject_with: Some(err),
                ..Default::default()
            }
        }

        fn record(&self, endpoint: Endpoint, entries: Vec<Entry>, resource: &Resource) -> Result<(), Rejected> {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint, entries, resource.clone()));
            match &self.reject_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<(Endpoint, Vec<Entry>, Resource)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LogBackend for RecordingBackend {
        type Error = Rejected;

        async fn submit_info(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Rejected> {
            self.record(Endpoint::Info, entries, resource)
        }

        async fn submit_warning(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Rejected> {
            self.record(Endpoint::Warning, entries, resource)
        }

        async fn submit_error(&self, entries: Vec<Entry>, resource: &Resource) -> Result<(), Rejected> {
            self.record(Endpoint::Error, entries, resource)
        }
    }

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn context() -> ExecutionContext {
        ExecutionContext::new(Some("e1"), "c1", "w1")
    }

    fn team_logger(backend: RecordingBackend) -> AuditLogger<RecordingBackend> {
        Builder::new(Some(context()))
            .with_labels(labels(&[("team", "x")]))
            .build_with_backend(backend)
            .unwrap()
    }

    #[test]
    fn invalid_contexts_fail_before_touching_the_backend() {
        let invalid = vec![
            None,
            Some(ExecutionContext {
                event_id: Some("e1".to_string()),
                correlation_id: None,
                workspace_id: Some("w1".to_string()),
            }),
            Some(ExecutionContext::new(Some("e1"), "c1", "")),
            Some(ExecutionContext::default()),
        ];

        for ctx in invalid {
            let backend = Arc::new(RecordingBackend::default());
            let result = Builder::new(ctx).build_with_backend(Arc::clone(&backend));
            assert!(result.is_err());
            assert!(backend.calls().is_empty());
        }
    }

    #[test]
    fn invalid_context_error_names_fields_and_echoes_context() {
        let ctx = ExecutionContext {
            event_id: Some("e1".to_string()),
            correlation_id: None,
            workspace_id: None,
        };
        let err = Builder::new(Some(ctx.clone()))
            .build_with_backend(RecordingBackend::default())
            .unwrap_err();
        assert_eq!(
            err,
            ContextError::Invalid {
                missing: vec!["correlationId", "workspaceId"],
                context: ctx,
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("correlationId, workspaceId"));
        assert!(msg.contains(r#"eventId: Some("e1")"#));

        let err = Builder::new(None)
            .build_with_backend(RecordingBackend::default())
            .unwrap_err();
        assert_eq!(err, ContextError::Absent);
    }

    #[test]
    fn create_logger_validates_before_building_the_client() {
        let err = create_logger(None, Labels::new(), None, None).unwrap_err();
        assert_eq!(err, ContextError::Absent);
    }

    #[test]
    fn create_logger_uses_default_name() {
        let logger = create_logger(Some(context()), Labels::new(), None, Some("my-project")).unwrap();
        assert_eq!(logger.name(), "skills_audit");
        assert_eq!(logger.context(), &context());

        let logger = create_logger(Some(context()), Labels::new(), Some("other"), Some("my-project")).unwrap();
        assert_eq!(logger.name(), "other");
    }

    #[test]
    fn missing_event_id_is_accepted() {
        let ctx = ExecutionContext::new(None::<String>, "c1", "w1");
        assert!(Builder::new(Some(ctx))
            .build_with_backend(RecordingBackend::default())
            .is_ok());
    }

    #[tokio::test]
    async fn single_message_goes_to_info_with_merged_labels() {
        let logger = team_logger(RecordingBackend::default());
        logger.log("hello", Severity::default(), &Labels::new()).await.unwrap();

        let calls = logger.backend().calls();
        assert_eq!(calls.len(), 1);
        let (endpoint, entries, resource) = &calls[0];
        assert_eq!(*endpoint, Endpoint::Info);
        assert_eq!(resource, &Resource::global());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "hello");
        assert_eq!(
            entries[0].metadata.labels,
            labels(&[
                ("team", "x"),
                ("execution_id", "e1"),
                ("correlation_id", "c1"),
                ("workspace_id", "w1"),
            ])
        );
    }

    #[tokio::test]
    async fn batch_goes_to_warning_in_one_submission() {
        let logger = team_logger(RecordingBackend::default());
        logger
            .log(vec!["a", "b", "c"], Severity::Warning, &Labels::new())
            .await
            .unwrap();

        let calls = logger.backend().calls();
        assert_eq!(calls.len(), 1);
        let (endpoint, entries, _) = &calls[0];
        assert_eq!(*endpoint, Endpoint::Warning);
        let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
        assert!(entries.iter().all(|e| Arc::ptr_eq(&e.metadata, &entries[0].metadata)));
    }

    #[tokio::test]
    async fn call_labels_override_factory_labels_and_route_to_error() {
        let logger = team_logger(RecordingBackend::default());
        logger
            .log("x", Severity::Error, &labels(&[("team", "y")]))
            .await
            .unwrap();

        let calls = logger.backend().calls();
        let (endpoint, entries, _) = &calls[0];
        assert_eq!(*endpoint, Endpoint::Error);
        assert_eq!(entries[0].metadata.labels.get("team").map(String::as_str), Some("y"));
    }

    #[tokio::test]
    async fn context_labels_cannot_be_overridden() {
        let backend = RecordingBackend::default();
        let logger = Builder::new(Some(context()))
            .with_labels(labels(&[("correlation_id", "factory")]))
            .build_with_backend(backend)
            .unwrap();
        logger
            .log(
                "x",
                Severity::Info,
                &labels(&[("execution_id", "call"), ("workspace_id", "call")]),
            )
            .await
            .unwrap();

        let calls = logger.backend().calls();
        let labels = &calls[0].1[0].metadata.labels;
        assert_eq!(labels.get("execution_id").map(String::as_str), Some("e1"));
        assert_eq!(labels.get("correlation_id").map(String::as_str), Some("c1"));
        assert_eq!(labels.get("workspace_id").map(String::as_str), Some("w1"));
    }

    #[tokio::test]
    async fn execution_id_cannot_be_supplied_when_the_event_id_is_absent() {
        let logger = Builder::new(Some(ExecutionContext::new(None::<String>, "c1", "w1")))
            .with_labels(labels(&[("execution_id", "factory"), ("team", "x")]))
            .build_with_backend(RecordingBackend::default())
            .unwrap();
        logger
            .log("x", Severity::Info, &labels(&[("execution_id", "call")]))
            .await
            .unwrap();

        let calls = logger.backend().calls();
        assert_eq!(
            calls[0].1[0].metadata.labels,
            labels(&[("team", "x"), ("correlation_id", "c1"), ("workspace_id", "w1")])
        );
    }

    #[tokio::test]
    async fn backend_rejection_is_returned_unchanged_without_retry() {
        let logger = team_logger(RecordingBackend::rejecting(Rejected(42)));
        let err = logger.info("doomed").await.unwrap_err();
        assert_eq!(err, Rejected(42));
        assert_eq!(logger.backend().calls().len(), 1);
    }

    #[tokio::test]
    async fn shorthands_route_to_their_endpoint() {
        let logger = team_logger(RecordingBackend::default());
        logger.info("i").await.unwrap();
        logger.warning("w").await.unwrap();
        logger.error("e").await.unwrap();

        let endpoints: Vec<Endpoint> = logger.backend().calls().iter().map(|c| c.0).collect();
        assert_eq!(endpoints, vec![Endpoint::Info, Endpoint::Warning, Endpoint::Error]);
    }

    #[tokio::test]
    async fn calls_do_not_share_state() {
        let logger = team_logger(RecordingBackend::default());
        logger.log("one", Severity::Info, &labels(&[("step", "1")])).await.unwrap();
        logger.log("two", Severity::Info, &Labels::new()).await.unwrap();

        let calls = logger.backend().calls();
        assert_eq!(calls[0].1[0].metadata.labels.get("step").map(String::as_str), Some("1"));
        assert_eq!(calls[1].1[0].metadata.labels.get("step"), None);
    }
}
