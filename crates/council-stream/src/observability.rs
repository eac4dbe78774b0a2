use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_FILE: &str = "council.logs.jsonl";
const DEFAULT_LEVEL: &str = "info";

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

/// Where logs go and how much of them, resolved from `COUNCIL_*` variables.
#[derive(Debug, PartialEq, Eq)]
struct LogSettings {
    enabled: bool,
    /// `COUNCIL_LOG_LEVEL`, else `RUST_LOG`.
    filter: Option<String>,
    /// Directory and file name of the JSONL sink; console when `None`.
    json_sink: Option<(PathBuf, String)>,
}

impl LogSettings {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let enabled = non_blank("COUNCIL_OBSERVABILITY")
            .map(|value| parse_bool_env(&value).unwrap_or(true))
            .unwrap_or(true);
        let filter = non_blank("COUNCIL_LOG_LEVEL")
            .filter(|level| EnvFilter::try_new(level).is_ok())
            .or_else(|| non_blank("RUST_LOG"));
        let json_sink = non_blank("COUNCIL_JSON_LOG_PATH").map(|raw| split_log_path(Path::new(&raw)));
        Self {
            enabled,
            filter,
            json_sink,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        self.filter
            .as_deref()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LEVEL))
    }
}

/// Splits a log file path into the directory and file name the appender wants.
fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (dir, file_name)
}

/// Initialize logging once per process.
///
/// Environment variables:
/// - `COUNCIL_OBSERVABILITY`: optional enable/disable flag (default enabled).
/// - `COUNCIL_LOG_LEVEL`: optional level/filter override (`info`, `debug`, etc.).
/// - `COUNCIL_JSON_LOG_PATH`: optional log file path. If set, logs are JSONL in that file.
///   If unset, logs go to stderr in a compact console format so stdout stays
///   free for session output.
/// - `RUST_LOG`: filter used when `COUNCIL_LOG_LEVEL` is unset or invalid.
pub fn init_observability() {
    INIT.get_or_init(|| {
        let settings = LogSettings::from_lookup(|key| std::env::var(key).ok());
        if !settings.enabled {
            return;
        }

        let env_filter = settings.env_filter();
        match settings.json_sink {
            Some((dir, file_name)) => {
                let _ = std::fs::create_dir_all(&dir);
                let writer = tracing_appender::rolling::never(dir, file_name);
                let json_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(false)
                    .with_writer(writer);
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(json_layer)
                    .try_init();
            }
            None => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr);
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(console_layer)
                    .try_init();
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> LogSettings {
        let env: HashMap<&str, &str> = pairs.iter().copied().collect();
        LogSettings::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn parses_common_flag_spellings() {
        for on in ["1", "true", " YES ", "on", "Enabled"] {
            assert_eq!(parse_bool_env(on), Some(true), "{on}");
        }
        for off in ["0", "false", "No", "off", "disabled"] {
            assert_eq!(parse_bool_env(off), Some(false), "{off}");
        }
        assert_eq!(parse_bool_env("maybe"), None);
    }

    #[test]
    fn defaults_to_enabled_console_logging() {
        assert_eq!(
            settings(&[]),
            LogSettings {
                enabled: true,
                filter: None,
                json_sink: None,
            }
        );
        assert!(settings(&[("COUNCIL_OBSERVABILITY", "garbage")]).enabled);
        assert!(!settings(&[("COUNCIL_OBSERVABILITY", "off")]).enabled);
    }

    #[test]
    fn level_override_beats_rust_log_unless_invalid() {
        let both = settings(&[("COUNCIL_LOG_LEVEL", "debug"), ("RUST_LOG", "warn")]);
        assert_eq!(both.filter.as_deref(), Some("debug"));

        let invalid = settings(&[("COUNCIL_LOG_LEVEL", "council=loud"), ("RUST_LOG", "warn")]);
        assert_eq!(invalid.filter.as_deref(), Some("warn"));

        let blank = settings(&[("COUNCIL_LOG_LEVEL", "  ")]);
        assert_eq!(blank.filter, None);
    }

    #[test]
    fn json_path_selects_file_sink() {
        let bare = settings(&[("COUNCIL_JSON_LOG_PATH", "run.jsonl")]);
        assert_eq!(bare.json_sink, Some((PathBuf::from("."), "run.jsonl".to_string())));

        let nested = settings(&[("COUNCIL_JSON_LOG_PATH", "logs/council/run.jsonl")]);
        assert_eq!(
            nested.json_sink,
            Some((PathBuf::from("logs/council"), "run.jsonl".to_string()))
        );
    }

    #[test]
    fn init_is_idempotent() {
        init_observability();
        init_observability();
    }
}
