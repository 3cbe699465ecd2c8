//! Stderr logger.
//!
//! Prints `[elapsed LEVEL component @thread] message`, where `component` is
//! the record target with its `pushframe_` prefix dropped and the thread is
//! shown for named workers (rayon pool threads, reprojection watchdogs).
//! Workspace targets and third-party targets get separate level filters, so
//! `-vv` turns on pipeline debug output without flooding stderr with
//! dependency noise. Library code only talks to the `log` facade.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt as tfmt, EnvFilter};

/// Level filters for [`init`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter for `pushframe*` targets.
    pub level: LevelFilter,
    /// Filter for every other target.
    pub dependency_level: LevelFilter,
}

impl LogSettings {
    /// `level` for the workspace; dependencies never go below warnings.
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            dependency_level: level.min(LevelFilter::Warn),
        }
    }

    fn max_level(&self) -> LevelFilter {
        self.level.max(self.dependency_level)
    }

    fn allows(&self, level: Level, target: &str) -> bool {
        let filter = if is_workspace_target(target) {
            self.level
        } else {
            self.dependency_level
        };
        level <= filter
    }
}

fn is_workspace_target(target: &str) -> bool {
    let krate = target.split("::").next().unwrap_or(target);
    krate == "pushframe" || krate.starts_with("pushframe_")
}

/// Target without the `pushframe_` crate prefix, e.g. `pipeline::reproject`.
fn component(target: &str) -> &str {
    target.strip_prefix("pushframe_").unwrap_or(target)
}

fn format_line(elapsed: f64, level: Level, target: &str, thread: Option<&str>, args: &fmt::Arguments<'_>) -> String {
    match thread {
        Some(name) => format!("[{elapsed:8.3}s {level:>5} {} @{name}] {args}", component(target)),
        None => format!("[{elapsed:8.3}s {level:>5} {}] {args}", component(target)),
    }
}

struct StderrLogger {
    settings: LogSettings,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.settings.allows(metadata.level(), metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let current = std::thread::current();
        let thread = current.name().filter(|&n| n != "main");
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            thread,
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init(settings: LogSettings) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            settings,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(settings.max_level());
    }
    Ok(())
}

/// Install the stderr logger at `level` (see [`LogSettings::new`]).
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    init(LogSettings::new(level))
}

/// Map a `-v` count to a level: 0 = warn, 1 = info, 2 = debug, 3+ = trace.
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install a `tracing` subscriber instead. `RUST_LOG` overrides the default
/// filter, which keeps workspace targets at info and the rest at warn.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,pushframe=info"));
    if json {
        let _ = tfmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_thread_names(true)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = tfmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_thread_names(true)
            .with_timer(tfmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_increasing_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(1), LevelFilter::Info);
        assert_eq!(level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(9), LevelFilter::Trace);
    }

    #[test]
    fn dependencies_stay_at_warnings_when_verbose() {
        let s = LogSettings::new(LevelFilter::Debug);
        assert!(s.allows(Level::Debug, "pushframe_pipeline::reproject"));
        assert!(s.allows(Level::Debug, "pushframe"));
        assert!(!s.allows(Level::Trace, "pushframe_camera::model"));
        assert!(!s.allows(Level::Info, "rayon_core::registry"));
        assert!(s.allows(Level::Warn, "image::codecs::png"));
        assert!(!s.allows(Level::Info, "pushframes_elsewhere"));
        assert_eq!(s.max_level(), LevelFilter::Debug);

        let quiet = LogSettings::new(LevelFilter::Error);
        assert_eq!(quiet.dependency_level, LevelFilter::Error);
        assert!(!quiet.allows(Level::Warn, "image"));
    }

    #[test]
    fn lines_name_the_component_and_worker() {
        let line = format_line(
            1.5,
            Level::Info,
            "pushframe_pipeline::reproject",
            Some("reproject-GREEN#3"),
            &format_args!("reprojected {}/{} framelets", 14, 15),
        );
        assert_eq!(
            line,
            "[   1.500s  INFO pipeline::reproject @reproject-GREEN#3] reprojected 14/15 framelets"
        );
        let line = format_line(0.0, Level::Warn, "rayon_core", None, &format_args!("x"));
        assert_eq!(line, "[   0.000s  WARN rayon_core] x");
    }
}
