#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Uses only `std::env::args()`; no external dependencies.

use std::env;
use std::process;

/// Parsed command-line options.
pub struct Opts {
    /// Maximum number of checks running at once.
    pub concurrency: usize,
    /// Stop the view automatically after this many milliseconds (0 = never).
    pub exit_after_ms: u64,
    /// Draw on the alternate screen.
    pub alt_screen: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            concurrency: 3,
            exit_after_ms: 0,
            alt_screen: true,
        }
    }
}

const HELP_TEXT: &str = "\
tcheck demo

Runs ten simulated preflight checks with bounded parallelism and shows their
progress live. Press q, Esc or Ctrl+C to leave; failed checks are listed on
exit and turn the exit code to 1.

USAGE:
    tcheck-demo [OPTIONS]

OPTIONS:
    --concurrency=N     Checks allowed to run at once (default: 3)
    --exit-after-ms=N   Quit automatically after N milliseconds (0 = never)
    --no-alt-screen     Draw in the main screen instead of the alternate one
    --help, -h          Show this help message
    --version, -V       Show version

KEYBINDINGS:
    Up / Down           Scroll the check list
    q / Esc / Ctrl+C    Quit

ENVIRONMENT VARIABLES:
    TCHECK_DEMO_CONCURRENCY     Override --concurrency
    TCHECK_DEMO_EXIT_AFTER_MS   Override --exit-after-ms
    TCHECK_LOG                  Log filter directive (e.g. debug, tcheck_core=trace)
    TCHECK_LOG_FILE             Write logs to this file (logging is off without it)";

const VERSION: &str = env!("CARGO_PKG_VERSION");

impl Opts {
    /// Parse environment variables first, then command-line arguments.
    ///
    /// Arguments win over the environment.
    pub fn parse() -> Self {
        let mut opts = Self::default();
        opts.apply_env();

        match opts.apply_args(env::args().skip(1)) {
            Ok(Action::Run) => opts,
            Ok(Action::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Action::Version) => {
                println!("tcheck-demo {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(val) = env::var("TCHECK_DEMO_CONCURRENCY")
            && let Ok(n) = val.parse()
        {
            self.concurrency = n;
        }
        if let Ok(val) = env::var("TCHECK_DEMO_EXIT_AFTER_MS")
            && let Ok(n) = val.parse()
        {
            self.exit_after_ms = n;
        }
    }

    fn apply_args<I>(&mut self, args: I) -> Result<Action, String>
    where
        I: IntoIterator<Item = String>,
    {
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Action::Help),
                "--version" | "-V" => return Ok(Action::Version),
                "--no-alt-screen" => self.alt_screen = false,
                other => {
                    if let Some(val) = other.strip_prefix("--concurrency=") {
                        match val.parse::<usize>() {
                            Ok(n) if n > 0 => self.concurrency = n,
                            _ => return Err(format!("Invalid --concurrency value: {val}")),
                        }
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        match val.parse() {
                            Ok(n) => self.exit_after_ms = n,
                            Err(_) => return Err(format!("Invalid --exit-after-ms value: {val}")),
                        }
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }
        Ok(Action::Run)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Run,
    Help,
    Version,
}
