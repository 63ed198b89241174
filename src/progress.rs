//! Render progress reporting.
//!
//! Reports what `tagxref render` is doing: how many tag rows were indexed,
//! which file is being annotated and how many remain. Progress is emitted on
//! **stderr** so stdout stays clean for scripts.

use std::io::Write;

/// A single progress event for a render run.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// The index has been built from this many store rows.
    Indexed { rows: u64, symbols: u64 },
    /// File `n` of `total` is being annotated.
    Annotating { path: String, n: u64, total: u64 },
    /// The document is being written.
    Writing { path: String },
}

/// Reports render progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "annotate  12 / 340 files  ./src/main.c".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Indexed { rows, symbols } => format!(
                "index  {} rows, {} symbols\n",
                format_number(*rows),
                format_number(*symbols)
            ),
            ProgressEvent::Annotating { path, n, total } => format!(
                "annotate  {} / {} files  {}\n",
                format_number(*n),
                format_number(*total),
                path
            ),
            ProgressEvent::Writing { path } => format!("write  {}\n", path),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Indexed { rows, symbols } => serde_json::json!({
                "event": "progress",
                "phase": "indexed",
                "rows": rows,
                "symbols": symbols
            }),
            ProgressEvent::Annotating { path, n, total } => serde_json::json!({
                "event": "progress",
                "phase": "annotating",
                "path": path,
                "n": n,
                "total": total
            }),
            ProgressEvent::Writing { path } => serde_json::json!({
                "event": "progress",
                "phase": "writing",
                "path": path
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
