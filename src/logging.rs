use crate::args;

use args::{LOG_LEVEL, VERBOSITY};
use clap::ArgMatches;
use slog::{o, Drain, Level, Logger, OwnedKVList, Record};
use slog_async::Async;
use slog_term::{CompactFormat, TermDecorator};
use std::{fmt::Display, result::Result};

#[derive(Clone)]
struct FallbackToStderr<D: Drain> {
    drain: D,
}

impl<D: Drain> Drain for FallbackToStderr<D>
where
    D::Err: Display,
{
    type Ok = ();
    type Err = ();
    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<(), ()> {
        if let Err(err) = self.drain.log(record, logger_values) {
            eprint!("A drain could not log to its destination: {}", err);
        }
        Ok(())
    }

    #[inline]
    fn is_enabled(&self, level: Level) -> bool {
        self.drain.is_enabled(level)
    }
}

pub fn min_log_level(arg_matches: &ArgMatches) -> Result<Level, String> {
    let min_log_level = match arg_matches.occurrences_of(VERBOSITY) {
        0 => Level::Warning,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };

    Ok(match arg_matches.value_of(LOG_LEVEL) {
        Some(level) => match level
            .parse::<args::LogLevelType>()
            .map_err(|e| format!("unknown log level '{}': {}", level, e))?
        {
            args::LogLevelType::Error => Level::Error,
            args::LogLevelType::Warn => Level::Warning,
            args::LogLevelType::Info => Level::Info,
            args::LogLevelType::Debug => Level::Debug,
            args::LogLevelType::Trace => Level::Trace,
        },
        None => min_log_level,
    })
}

/// The diagnostic logger of the binary. It writes to stderr so that stdout stays free for the
/// JSON lines of the stdout output.
pub fn create_logger(arg_matches: &ArgMatches) -> Result<slog::Logger, String> {
    let min_log_level = min_log_level(arg_matches)?;

    let decorator = TermDecorator::new().stderr().build();
    let term_drain = CompactFormat::new(decorator)
        .build()
        .filter_level(min_log_level)
        .map(|drain| FallbackToStderr { drain })
        .fuse();

    let drain = Async::new(term_drain).build().fuse();
    let root = Logger::root(drain, o!());
    Ok(root.new(o!()))
}
