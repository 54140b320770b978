use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How urgent an audit entry is. Variants are ordered by increasing urgency.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    #[default]
    #[strum(to_string = "info", serialize = "informational")]
    Info,
    #[strum(to_string = "warning", serialize = "warn")]
    Warning,
    Error,
}
