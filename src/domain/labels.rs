//! Label maps and how they are merged into the metadata of an entry
use super::context::ExecutionContext;
use std::collections::HashMap;

pub type Labels = HashMap<String, String>;

pub const EXECUTION_ID: &str = "execution_id";
pub const CORRELATION_ID: &str = "correlation_id";
pub const WORKSPACE_ID: &str = "workspace_id";

/// The labels derived from the execution context.
///
/// A context without an event id yields no `execution_id` label at all.
pub fn context_labels(context: &ExecutionContext) -> Labels {
    [
        (EXECUTION_ID, &context.event_id),
        (CORRELATION_ID, &context.correlation_id),
        (WORKSPACE_ID, &context.workspace_id),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
    .collect()
}

/// The keys owned by the execution context. Caller labels never set these.
pub const CONTEXT_KEYS: [&str; 3] = [EXECUTION_ID, CORRELATION_ID, WORKSPACE_ID];

/// Merges, in order, the factory labels, the per call labels and the context labels. A key set by
/// a later map replaces the same key from an earlier one.
///
/// The context keys are dropped from the factory and call labels first, so a context key that the
/// context leaves unset is absent from the result rather than taken from the caller.
pub fn merge_labels(factory: &Labels, call: &Labels, context: &Labels) -> Labels {
    let mut merged = Labels::with_capacity(factory.len() + call.len() + context.len());
    for layer in [factory, call] {
        merged.extend(
            layer
                .iter()
                .filter(|(k, _)| !CONTEXT_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone())),
        );
    }
    merged.extend(context.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Parses a `KEY=VALUE` pair. The value may contain further `=` characters.
pub fn parse_label(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("label '{}' is not of the form KEY=VALUE", s)),
    }
}
