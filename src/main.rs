#[macro_use]
extern crate lazy_static;

extern crate clap;

mod app;
mod args;
mod logging;

use args::OutputType;
use clap::ArgMatches;
use skills_audit::domain::labels::parse_label;
use skills_audit::{AuditLogger, Builder, ExecutionContext, Labels, LogBackend, Severity, StdoutBackend};
use slog::{debug, info, o, warn};
use std::{process, result::Result, str::FromStr};

fn labels_of(m: &ArgMatches, arg: &str) -> Result<Labels, String> {
    m.values_of(arg)
        .into_iter()
        .flatten()
        .map(parse_label)
        .collect()
}

// Absent only when none of the identifying options were given at all.
fn context_of(m: &ArgMatches) -> Option<ExecutionContext> {
    let value = |arg: &str| m.value_of(arg).map(String::from);
    let context = ExecutionContext {
        event_id: value(args::EVENT_ID),
        correlation_id: value(args::CORRELATION_ID),
        workspace_id: value(args::WORKSPACE_ID),
    };
    if context == ExecutionContext::default() {
        None
    } else {
        Some(context)
    }
}

fn parse_variant<T: FromStr<Err = strum::ParseError>>(input: &str, what: &str) -> Result<T, String> {
    match input.parse::<T>() {
        Ok(variant) => Ok(variant),
        Err(strum::ParseError::VariantNotFound) => Err(format!("unknown {}: {}", what, input)),
    }
}

// Readers of the stdout lines expect a full `projects/{project}/logs/{id}` name. The bare id is
// only written when no project is configured anywhere.
fn stdout_log_name(project: Option<String>, name: &str) -> String {
    match project {
        Some(project) => googlelog::logger::log_name(&project, name),
        None => name.to_string(),
    }
}

async fn submit<B: LogBackend>(
    logger: &AuditLogger<B>,
    messages: Vec<String>,
    severity: Severity,
    call_labels: &Labels,
) -> Result<(), String> {
    logger
        .log(messages, severity, call_labels)
        .await
        .map_err(|e| format!("could not submit audit entries: {}", e))
}

async fn run(arg_matches: ArgMatches) -> Result<(), String> {
    let root_logger = logging::create_logger(&arg_matches)?;
    let log = root_logger.new(o!("module" => "main"));

    let name = arg_matches
        .value_of(args::LOG_NAME)
        .unwrap_or(skills_audit::DEFAULT_LOG_NAME);
    let project = arg_matches.value_of(args::PROJECT);
    let severity: Severity = parse_variant(arg_matches.value_of(args::SEVERITY).unwrap_or_default(), "severity")?;
    let output: OutputType = parse_variant(arg_matches.value_of(args::OUTPUT).unwrap_or_default(), "output")?;
    let messages: Vec<String> = arg_matches
        .values_of(args::MESSAGE)
        .into_iter()
        .flatten()
        .map(String::from)
        .collect();
    let call_labels = labels_of(&arg_matches, args::CALL_LABEL)?;

    let mut builder = Builder::new(context_of(&arg_matches))
        .with_labels(labels_of(&arg_matches, args::LABEL)?)
        .with_name(name)
        .with_logger(root_logger.clone());
    if let Some(project) = project {
        builder = builder.with_project(project);
    }

    info!(log, "Starting {}", app::NAME;
        "version" => app::VERSION,
        "log-name" => name,
        "project" => project.unwrap_or("<discovered>"),
        "severity" => %severity,
        "output" => %output,
    );

    let count = messages.len();
    match output {
        OutputType::Api => {
            let logger = builder.build().map_err(|e| e.to_string())?;
            submit(&logger, messages, severity, &call_labels).await?;
        }
        OutputType::Stdout => {
            let project = project
                .map(String::from)
                .or_else(googlelog::logger::project_from_env);
            if project.is_none() {
                warn!(log, "No project configured, writing the bare log id as logName"; "log-name" => name);
            }
            let log_name = stdout_log_name(project, name);
            let logger = builder
                .build_with_backend(StdoutBackend::stdout(log_name))
                .map_err(|e| e.to_string())?;
            submit(&logger, messages, severity, &call_labels).await?;
        }
    }

    debug!(log, "Submitted {} audit entries", count);
    Ok(())
}

#[tokio::main]
async fn main() {
    let arg_matches = args::clap_app().get_matches();
    if let Err(e) = run(arg_matches).await {
        eprintln!("\nError: {}", e);
        process::exit(1);
    };
}
