//! Application context resolved once at startup and threaded read-only
//! through every command handler.

use crate::format::ColorChoice;
use regxplore_core::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    Normal,
    Verbose,
    VeryVerbose,
    Trace,
}

impl VerbosityLevel {
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Normal,
            1 => VerbosityLevel::Verbose,
            2 => VerbosityLevel::VeryVerbose,
            _ => VerbosityLevel::Trace,
        }
    }

    pub fn tracing_filter(self) -> &'static str {
        match self {
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "info",
            VerbosityLevel::VeryVerbose => "debug",
            VerbosityLevel::Trace => "trace",
        }
    }
}

pub struct AppContext {
    pub config: Config,
    pub color: ColorChoice,
    pub verbosity: VerbosityLevel,
}

impl AppContext {
    pub fn build(color: ColorChoice, verbosity: VerbosityLevel) -> Self {
        Self {
            config: crate::config::load(),
            color,
            verbosity,
        }
    }

    /// Resolves `host_or_bookmark` against `config.registries.list`: if it
    /// names a saved registry, returns that bookmark's URL stripped of its
    /// scheme; otherwise returns the input unchanged.
    pub fn resolve_host(&self, host_or_bookmark: &str) -> String {
        self.config
            .registries
            .list
            .iter()
            .find(|r| r.name == host_or_bookmark)
            .map(|r| {
                r.url
                    .trim_start_matches("https://")
                    .trim_start_matches("http://")
                    .to_string()
            })
            .unwrap_or_else(|| host_or_bookmark.to_string())
    }
}
