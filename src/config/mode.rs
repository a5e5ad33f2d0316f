//! Build mode selection.
use serde::Serialize;

/// Environment variable consulted when no mode is given on the command line.
pub const MODE_ENV: &str = "NODE_ENV";

/// Whether bundles are minified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Minified bundles.
    Production,
    /// Unminified bundles.
    Development,
}

impl Mode {
    /// Pick the mode from `NODE_ENV`: `development` selects development,
    /// anything else (including unset) selects production.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(MODE_ENV).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("development") => Self::Development,
            _ => Self::Production,
        }
    }

    /// Whether minimizers are enabled.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Name as passed to the bundler and to templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
