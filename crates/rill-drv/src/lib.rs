//! rill-drv - the interpreter driver.
//!
//! Orchestrates the pipeline: read and normalize the source file, parse it
//! into an arena-allocated AST, then evaluate. Lexical, syntactic and
//! static-semantic problems are rendered as source diagnostics and stop
//! the run before evaluation; runtime errors terminate it with a single
//! `error:` line. Exit status is 0 on success and 1 on any failure.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};

use rill_util::{Arena, Handler, Source};

/// Usage line printed on argument errors.
pub const USAGE: &str = "usage: rill <filename> [arg]";

/// Driver configuration parsed from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Script to run
    pub filename: PathBuf,
    /// Value bound to the guest variable `arg`
    pub arg: i64,
}

impl Config {
    /// Parse command-line arguments (program name excluded).
    ///
    /// The optional second argument must be a non-negative decimal
    /// integer; it defaults to 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use rill_drv::Config;
    ///
    /// let config = Config::from_args(&["demo.rl".into(), "3".into()]).unwrap();
    /// assert_eq!(config.arg, 3);
    /// ```
    pub fn from_args(args: &[String]) -> Result<Config> {
        if args.is_empty() || args.len() > 2 {
            bail!("{}", USAGE);
        }
        let arg = match args.get(1) {
            Some(text) => match text.parse::<i64>() {
                Ok(value) if value >= 0 => value,
                _ => bail!("argument must be a non-negative integer, got '{}'", text),
            },
            None => 0,
        };
        Ok(Config {
            filename: PathBuf::from(&args[0]),
            arg,
        })
    }
}

/// Entry point called by the `rill` binary.
pub fn main() -> Result<()> {
    logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_args(&args)?;
    let source = Source::from_file(&config.filename)?;
    let mut stdout = std::io::stdout().lock();
    run_source(&source, config.arg, &mut stdout)
}

/// Parse and evaluate a source, writing guest output to `out`.
///
/// Diagnostics for parse failures are rendered to standard error; the
/// returned error then only carries the failure summary.
pub fn run_source<W: Write>(source: &Source, arg: i64, out: &mut W) -> Result<()> {
    let arena = Arena::new();
    let handler = Handler::new();
    let program = rill_par::parse_file(&arena, source, &handler);

    let Some(program) = program else {
        let mut stderr = std::io::stderr().lock();
        for diag in handler.diagnostics() {
            let _ = write!(stderr, "{}", diag.render(source));
        }
        let count = handler.error_count();
        bail!(
            "aborting due to {} previous error{}",
            count,
            if count == 1 { "" } else { "s" }
        );
    };

    if log::log_enabled!(log::Level::Trace) {
        log::trace!("ast:\n{}", rill_par::dump(program, source));
    }

    rill_eval::execute(program, source, arg, out)?;
    Ok(())
}

mod logger {
    use log::{LevelFilter, Metadata, Record};

    struct StderrLogger;

    static LOGGER: StderrLogger = StderrLogger;

    impl log::Log for StderrLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            eprintln!("[{}] {}", record.level(), record.args());
        }

        fn flush(&self) {}
    }

    /// Install the stderr logger when `RILL_LOG` asks for one.
    pub fn init() {
        let level = std::env::var("RILL_LOG")
            .ok()
            .and_then(|v| v.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Off);
        if level != LevelFilter::Off && log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }
}
