//! Terminal output for dbforge commands.
//!
//! Human output goes to stderr as right-aligned status verbs, with a progress
//! bar while a batch runs. With `--message-format json` the only output is
//! one JSON event per line on stdout.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

/// What the shell prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Errors only.
    Quiet,
    /// Status lines and a progress bar.
    Normal,
    /// Status lines without a progress bar, so they interleave with logs.
    Verbose,
    /// JSON events on stdout and nothing on stderr.
    Json,
}

/// `--color` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            other => Err(format!("unknown color setting `{}` (use auto, always or never)", other)),
        }
    }
}

/// Verb printed in front of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Loading,
    Creating,
    Created,
    Finished,
    Warning,
    Failed,
}

impl Status {
    fn verb(self) -> &'static str {
        match self {
            Status::Loading => "Loading",
            Status::Creating => "Creating",
            Status::Created => "Created",
            Status::Finished => "Finished",
            Status::Warning => "Warning",
            Status::Failed => "Failed",
        }
    }

    fn ansi(self) -> &'static str {
        match self {
            Status::Loading | Status::Creating => "\x1b[1;36m",
            Status::Created | Status::Finished => "\x1b[1;32m",
            Status::Warning => "\x1b[1;33m",
            Status::Failed => "\x1b[1;31m",
        }
    }
}

const VERB_WIDTH: usize = 12;

/// Output sink shared by the batch executor and the CLI.
#[derive(Debug)]
pub struct Shell {
    mode: OutputMode,
    color: bool,
}

impl Shell {
    pub fn new(mode: OutputMode, color: ColorChoice) -> Self {
        let color = match (mode, color) {
            (OutputMode::Json, _) | (_, ColorChoice::Never) => false,
            (_, ColorChoice::Always) => true,
            (_, ColorChoice::Auto) => io::stderr().is_terminal(),
        };
        Shell { mode, color }
    }

    /// A shell that only prints JSON events.
    pub fn json() -> Self {
        Shell::new(OutputMode::Json, ColorChoice::Never)
    }

    /// Pick the mode from CLI flags; `json` wins over `-q` and `-v`.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        let mode = match (json, quiet, verbose) {
            (true, _, _) => OutputMode::Json,
            (false, true, _) => OutputMode::Quiet,
            (false, false, true) => OutputMode::Verbose,
            (false, false, false) => OutputMode::Normal,
        };
        Shell::new(mode, color)
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn use_color(&self) -> bool {
        self.color
    }

    /// Print `{verb:>12} {msg}` to stderr. Quiet mode keeps only failures.
    pub fn status(&self, status: Status, msg: impl Display) {
        match self.mode {
            OutputMode::Json => {}
            OutputMode::Quiet if status != Status::Failed => {}
            _ => eprintln!("{} {}", self.verb(status), msg),
        }
    }

    /// Print preformatted text to stderr, unless in JSON mode.
    pub fn print_block(&self, text: impl Display) {
        if self.mode != OutputMode::Json {
            eprint!("{}", text);
        }
    }

    /// Write one event line to stdout in JSON mode.
    pub fn json_event<T: Serialize>(&self, event: &T) {
        if self.mode != OutputMode::Json {
            return;
        }
        match serde_json::to_string(event) {
            Ok(line) => {
                let mut out = io::stdout().lock();
                let _ = writeln!(out, "{}", line);
                let _ = out.flush();
            }
            Err(e) => tracing::warn!("could not serialize event: {}", e),
        }
    }

    fn verb(&self, status: Status) -> String {
        if self.color {
            format!("{}{:>w$}\x1b[0m", status.ansi(), status.verb(), w = VERB_WIDTH)
        } else {
            format!("{:>w$}", status.verb(), w = VERB_WIDTH)
        }
    }

    /// Start a progress bar over `total` projects. Only normal mode draws it.
    pub fn progress(self: &Arc<Self>, total: u64, msg: impl Display) -> Progress {
        let bar = (self.mode == OutputMode::Normal && total > 1).then(|| {
            let bar = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar().template("{msg} [{bar:30}] {pos}/{len}") {
                bar.set_style(style.progress_chars("=> "));
            }
            bar.set_message(msg.to_string());
            bar
        });
        Progress {
            shell: Arc::clone(self),
            bar,
        }
    }
}

/// Batch progress. `indicatif` bars are internally synchronized, so worker
/// threads share one `&Progress`.
pub struct Progress {
    shell: Arc<Shell>,
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Print a status line above the bar.
    pub fn println(&self, status: Status, msg: impl Display) {
        match &self.bar {
            Some(bar) => bar.suspend(|| self.shell.status(status, msg)),
            None => self.shell.status(status, msg),
        }
    }

    pub fn inc(&self, delta: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

/// `0.42s` under a minute, `1.5m` above.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
