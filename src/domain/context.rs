//! The execution context an audit logger is bound to
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifies one logical invocation, typically lifted straight out of an incoming event.
///
/// All fields are optional here because an incoming payload may lack them. The logger factory
/// refuses contexts without a correlation id or workspace id.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    /// The event that triggered this invocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

impl ExecutionContext {
    pub fn new(
        event_id: Option<impl Into<String>>,
        correlation_id: impl Into<String>,
        workspace_id: impl Into<String>,
    ) -> Self {
        ExecutionContext {
            event_id: event_id.map(Into::into),
            correlation_id: Some(correlation_id.into()),
            workspace_id: Some(workspace_id.into()),
        }
    }

    /// The names of the required fields that are absent or empty.
    ///
    /// The event id is not required.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if is_blank(&self.correlation_id) {
            missing.push("correlationId");
        }
        if is_blank(&self.workspace_id) {
            missing.push("workspaceId");
        }
        missing
    }
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, str::is_empty)
}

impl Display for ExecutionContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ExecutionContext(eventId: {:?}, correlationId: {:?}, workspaceId: {:?})",
            self.event_id, self.correlation_id, self.workspace_id
        )
    }
}
