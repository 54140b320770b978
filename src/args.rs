use crate::app;
use clap::{Arg, Command};
use strum_macros::{Display, EnumString};

pub const VERBOSITY: &str = "verbosity";
pub const LOG_LEVEL: &str = "log-level";
pub const EVENT_ID: &str = "event-id";
pub const CORRELATION_ID: &str = "correlation-id";
pub const WORKSPACE_ID: &str = "workspace-id";
pub const LABEL: &str = "label";
pub const CALL_LABEL: &str = "call-label";
pub const LOG_NAME: &str = "log-name";
pub const PROJECT: &str = "project";
pub const SEVERITY: &str = "severity";
pub const OUTPUT: &str = "output";
pub const MESSAGE: &str = "message";

#[derive(EnumString, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum LogLevelType {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Where the audit entries go
#[derive(EnumString, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum OutputType {
    /// The Google Logging API
    Api,
    /// JSON lines on stdout
    Stdout,
}

pub(crate) fn clap_app() -> Command<'static> {
    command(true)
}

/// The command without environment fallbacks, so only the given arguments count.
#[cfg(test)]
pub(crate) fn clap_app_without_env() -> Command<'static> {
    command(false)
}

fn command(from_env: bool) -> Command<'static> {
    let env = |arg: Arg<'static>, name: &'static str| if from_env { arg.env(name) } else { arg };

    Command::new(app::NAME)
        .version(app::VERSION)
        .long_version(app::long_version())
        .about("Writes audit log entries, bound to an execution context, to Google Cloud Logging")
        .arg(
            Arg::new(VERBOSITY)
                .short('v')
                .multiple_occurrences(true)
                .help("verbosity level of the diagnostic output"),
        )
        .arg(env(
            Arg::new(LOG_LEVEL)
                .long(LOG_LEVEL)
                .value_name("LEVEL")
                .help("Sets the level of the diagnostic output, overrides -v")
                .possible_values(["error", "warn", "info", "debug", "trace"])
                .takes_value(true),
            "SKILLS_AUDIT_LOG_LEVEL",
        ))
        .arg(env(
            Arg::new(EVENT_ID)
                .long(EVENT_ID)
                .value_name("ID")
                .help("The id of the event being handled, recorded as the execution_id label")
                .takes_value(true),
            "SKILLS_AUDIT_EVENT_ID",
        ))
        .arg(env(
            Arg::new(CORRELATION_ID)
                .long(CORRELATION_ID)
                .value_name("ID")
                .help("The correlation id of the invocation. Required")
                .takes_value(true),
            "SKILLS_AUDIT_CORRELATION_ID",
        ))
        .arg(env(
            Arg::new(WORKSPACE_ID)
                .long(WORKSPACE_ID)
                .value_name("ID")
                .help("The workspace the invocation belongs to. Required")
                .takes_value(true),
            "SKILLS_AUDIT_WORKSPACE_ID",
        ))
        .arg(env(
            Arg::new(LABEL)
                .long(LABEL)
                .value_name("KEY=VALUE")
                .help("A label added to every entry. Can be repeated")
                .multiple_occurrences(true)
                .value_delimiter(',')
                .takes_value(true),
            "SKILLS_AUDIT_LABELS",
        ))
        .arg(
            Arg::new(CALL_LABEL)
                .long(CALL_LABEL)
                .value_name("KEY=VALUE")
                .help("A label for this submission only, overriding --label. Can be repeated")
                .multiple_occurrences(true)
                .takes_value(true),
        )
        .arg(env(
            Arg::new(LOG_NAME)
                .long(LOG_NAME)
                .value_name("NAME")
                .help("The name of the log to write to")
                .default_value(skills_audit::DEFAULT_LOG_NAME)
                .takes_value(true),
            "SKILLS_AUDIT_LOG_NAME",
        ))
        .arg(env(
            Arg::new(PROJECT)
                .long(PROJECT)
                .value_name("PROJECT")
                .help("The Google Cloud project to log to. Discovered from the environment if not set")
                .takes_value(true),
            "SKILLS_AUDIT_PROJECT",
        ))
        .arg(env(
            Arg::new(SEVERITY)
                .long(SEVERITY)
                .short('s')
                .value_name("SEVERITY")
                .help("The severity of the entries")
                .possible_values(["info", "warning", "error"])
                .default_value("info")
                .takes_value(true),
            "SKILLS_AUDIT_SEVERITY",
        ))
        .arg(env(
            Arg::new(OUTPUT)
                .long(OUTPUT)
                .value_name("OUTPUT")
                .help("Where to send the entries: 'api' for the Google Logging API or 'stdout' for JSON lines")
                .possible_values(["api", "stdout"])
                .default_value("api")
                .takes_value(true),
            "SKILLS_AUDIT_OUTPUT",
        ))
        .arg(
            Arg::new(MESSAGE)
                .value_name("MESSAGE")
                .help("The messages to log, one entry each, submitted together")
                .required(true)
                .multiple_values(true),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn clap_app_is_consistent() {
        clap_app().debug_assert();
    }

    #[test]
    fn messages_are_required() {
        assert!(clap_app().try_get_matches_from(["skills-audit"]).is_err());
    }

    #[test]
    fn repeated_labels_are_collected() {
        let m = clap_app()
            .try_get_matches_from([
                "skills-audit",
                "--label",
                "team=x",
                "--label",
                "env=prod",
                "--call-label",
                "step=1",
                "one",
                "two",
            ])
            .unwrap();
        let labels: Vec<&str> = m.values_of(LABEL).unwrap().collect();
        assert_eq!(labels, vec!["team=x", "env=prod"]);
        let messages: Vec<&str> = m.values_of(MESSAGE).unwrap().collect();
        assert_eq!(messages, vec!["one", "two"]);
    }

    #[test]
    fn options_fall_back_to_the_environment_only_when_asked() {
        let from_env = clap_app();
        let project = from_env.get_arguments().find(|a| a.get_id() == PROJECT).unwrap();
        assert!(project.get_env().is_some());

        let without_env = clap_app_without_env();
        assert!(without_env.get_arguments().all(|a| a.get_env().is_none()));
    }

    #[test]
    fn output_types_parse() {
        assert_eq!(OutputType::from_str("api"), Ok(OutputType::Api));
        assert_eq!(OutputType::from_str("stdout"), Ok(OutputType::Stdout));
        assert_eq!(LogLevelType::from_str("warn"), Ok(LogLevelType::Warn));
    }
}
