//! Log file location, escape-sequence removal, and timestamps.
use std::fs;
use std::io::IsTerminal as _;
use std::path::PathBuf;

/// Timestamp written in the log file header.
pub(super) const HEADER_STAMP: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp prefixed to every log file line.
pub(super) const LINE_STAMP: &str = "%H:%M:%S";

/// Remove terminal escape sequences from `s`.
///
/// A CSI sequence (`ESC [` ... final byte in `@..=~`) is dropped whole; for
/// any other escape only the character after `ESC` goes with it.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut pieces = s.split('\x1b');
    let mut out = pieces.next().unwrap_or_default().to_string();
    for piece in pieces {
        let kept = match piece.strip_prefix('[') {
            Some(csi) => csi
                .find(|c: char| ('@'..='~').contains(&c))
                .and_then(|end| csi.get(end + 1..))
                .unwrap_or_default(),
            None => {
                let first = piece.chars().next().map_or(0, char::len_utf8);
                piece.get(first..).unwrap_or_default()
            }
        };
        out.push_str(kept);
    }
    out
}

/// Whether console output should be coloured.
///
/// `NO_COLOR` (any value) wins; otherwise colour is used only when stdout
/// is a terminal.
#[must_use]
pub fn supports_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// `$XDG_CACHE_HOME`, else `~/.cache`, else `./.cache`.
fn cache_root() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_CACHE_HOME") {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".cache")
}

/// `<cache>/sitebuild/<command>.log`, creating the directory on the way.
///
/// Task names contain `:`, which is not valid in Windows file names.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = cache_root().join("sitebuild");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{}.log", command.replace(':', "-"))))
}

/// Current UTC time rendered with a `chrono` format string.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}
