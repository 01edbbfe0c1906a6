//! Terminal-aware output helpers: color policy and the `--format` values
//! every subcommand accepts.

use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

/// Color output control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl From<&str> for ColorChoice {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }
}

impl ColorChoice {
    pub fn should_color(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal()
            }
        }
    }
}

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pretty,
    Json,
    Yaml,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "yaml" | "yml" => OutputFormat::Yaml,
            _ => OutputFormat::Pretty,
        }
    }
}

/// Renders a flat list of strings (repository names, tag names) per format.
pub fn render_list(items: &[String], format: OutputFormat, color: ColorChoice) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(items).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(items).unwrap_or_default(),
        OutputFormat::Pretty => items
            .iter()
            .map(|item| {
                if color.should_color() {
                    format!("{}", item.as_str().cyan())
                } else {
                    item.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Renders a `repository -> tag` map per format, sorted by key for
/// deterministic output.
pub fn render_images(
    images: &std::collections::HashMap<String, String>,
    format: OutputFormat,
    color: ColorChoice,
) -> String {
    let mut entries: Vec<(&String, &String)> = images.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    match format {
        OutputFormat::Json => serde_json::to_string_pretty(
            &entries
                .iter()
                .map(|(k, v)| ((*k).clone(), (*v).clone()))
                .collect::<std::collections::BTreeMap<_, _>>(),
        )
        .unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(
            &entries
                .iter()
                .map(|(k, v)| ((*k).clone(), (*v).clone()))
                .collect::<std::collections::BTreeMap<_, _>>(),
        )
        .unwrap_or_default(),
        OutputFormat::Pretty => entries
            .iter()
            .map(|(repo, tag)| {
                if color.should_color() {
                    format!("{}:{}", repo.cyan(), tag.green())
                } else {
                    format!("{repo}:{tag}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
