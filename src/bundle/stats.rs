//! Bundler statistics report.
use std::fmt;

use serde::Deserialize;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// The subset of the bundler's JSON stats that the build reports on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BundleStats {
    /// Compilation errors; any one fails the build.
    pub errors: Vec<Diagnostic>,
    /// Compilation warnings; reported only.
    pub warnings: Vec<Diagnostic>,
    /// Emitted files.
    pub assets: Vec<Asset>,
    /// Wall-clock compilation time in milliseconds.
    pub time: Option<u64>,
}

/// A compiler error or warning. Older bundlers report plain strings, newer
/// ones objects with a message and the originating module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Diagnostic {
    /// Bare message.
    Text(String),
    /// Message with its source module.
    Detailed {
        /// What went wrong.
        message: String,
        /// Module the diagnostic belongs to.
        #[serde(default, rename = "moduleName")]
        module_name: Option<String>,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Detailed {
                message,
                module_name: Some(module),
            } => write!(f, "{module}: {message}"),
            Self::Detailed { message, .. } => f.write_str(message),
        }
    }
}

/// One emitted file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    /// Path relative to the output directory.
    pub name: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
}

impl BundleStats {
    /// Parse the JSON document the bundler printed on stdout.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `text` is not a stats object.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Whether the compilation reported any error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The first reported error, used as the failure reason.
    #[must_use]
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.errors.first()
    }

    /// Human-readable summary, one entry per line.
    ///
    /// With `color` off the output contains no escape sequences.
    #[must_use]
    pub fn render(&self, color: bool) -> Vec<String> {
        let paint = |code: &str, text: &str| {
            if color {
                format!("{code}{text}{RESET}")
            } else {
                text.to_string()
            }
        };

        let mut lines = Vec::new();
        let width = self.assets.iter().map(|a| a.name.len()).max().unwrap_or(0);
        for asset in &self.assets {
            let name = format!("{:<width$}", asset.name);
            lines.push(format!(
                "{}  {:>10}",
                paint(GREEN, &name),
                format_size(asset.size)
            ));
        }
        for warning in &self.warnings {
            lines.push(format!("{} {warning}", paint(YELLOW, "WARNING")));
        }
        for error in &self.errors {
            lines.push(format!("{} {error}", paint(RED, "ERROR")));
        }

        let mut totals = format!(
            "{} {}, {} {}, {} {}",
            self.assets.len(),
            plural(self.assets.len(), "asset"),
            self.warnings.len(),
            plural(self.warnings.len(), "warning"),
            self.errors.len(),
            plural(self.errors.len(), "error"),
        );
        if let Some(ms) = self.time {
            totals.push_str(&format!(" in {ms}ms"));
        }
        lines.push(paint(BOLD, &totals));
        lines
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    }
}
