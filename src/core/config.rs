//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.req/config.toml` unless `--config` points elsewhere.
//! If the default file is missing on first run, a commented-out template is
//! generated so users can discover all options.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::discovery::DEFAULT_FILE_PATTERN;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ReqConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub file_pattern: Option<String>,
    pub case_sensitive: Option<bool>,
    pub log_file: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ThemeConfig {
    pub request: Option<String>,
    pub response: Option<String>,
    pub script: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_RESPONSE_THEME: &str = "base16-ocean.dark";
pub const DEFAULT_REQUEST_THEME: &str = "base16-eighties.dark";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_FILE_NAME: &str = "req.log";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub file_pattern: String,
    pub case_sensitive: bool,
    pub log_file: PathBuf,
    pub log_level: String,
    pub request_theme: String,
    pub response_theme: String,
    pub script_theme: String,
    pub timeout_secs: u64,
}

/// Values supplied on the command line. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub file_pattern: Option<String>,
    pub case_sensitive: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.req/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".req"))
}

/// Returns the path to `~/.req/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Where the loaded config came from.
///
/// Config is read before the logger exists (the log path is a config value),
/// so loading records its outcome here and `log` reports it once logging is
/// up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No config file existed; a commented-out template was written.
    Generated(PathBuf),
    /// No config file existed and the template could not be written.
    GenerateFailed { path: PathBuf, reason: String },
    /// No home directory, so nothing was read.
    NoHome,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Generated(path) => {
                info!("No config file found, generated default at {}", path.display())
            }
            ConfigSource::GenerateFailed { path, reason } => {
                warn!("Failed to write default config to {}: {}", path.display(), reason)
            }
            ConfigSource::NoHome => warn!("Could not determine home directory, using default config"),
        }
    }
}

/// Load config from an explicit path, or from `~/.req/config.toml`.
///
/// A missing default file generates a commented-out template and yields
/// `ReqConfig::default()`. A missing explicit file is an error. A malformed
/// file is `ConfigError::Parse` either way.
pub fn load_config(explicit: Option<&Path>) -> Result<(ReqConfig, ConfigSource), ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => return Ok((ReqConfig::default(), ConfigSource::NoHome)),
        },
    };

    if explicit.is_none() && !path.exists() {
        let source = match generate_default_config(&path) {
            Ok(()) => ConfigSource::Generated(path),
            Err(e) => ConfigSource::GenerateFailed {
                path,
                reason: e.to_string(),
            },
        };
        return Ok((ReqConfig::default(), source));
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: ReqConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    Ok((config, ConfigSource::File(path)))
}

/// Writes a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    let default_content = r#"# req configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# file_pattern = "\\.http$"          # Regex matched against paths relative to the root
# case_sensitive = false             # Fuzzy filter case sensitivity
# log_file = "~/.req/req.log"
# log_level = "info"                 # "error", "warn", "info", "debug", "trace"

# [theme]                            # Any syntect default theme name
# request = "base16-eighties.dark"
# response = "base16-ocean.dark"
# script = "base16-eighties.dark"

# [http]
# timeout_secs = 30
"#;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, default_content)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ReqConfig, cli: &CliOverrides) -> ResolvedConfig {
    // File pattern: CLI → env → config → default
    let file_pattern = cli
        .file_pattern
        .clone()
        .or_else(|| std::env::var("REQ_FILE_PATTERN").ok())
        .or_else(|| config.general.file_pattern.clone())
        .unwrap_or_else(|| DEFAULT_FILE_PATTERN.to_string());

    // Case sensitivity: the CLI flag can only turn it on
    let case_sensitive = cli.case_sensitive || config.general.case_sensitive.unwrap_or(false);

    // Log level: env → config → default
    let log_level = std::env::var("REQ_LOG_LEVEL")
        .ok()
        .or_else(|| config.general.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    // Timeout: env → config → default
    let timeout_secs = std::env::var("REQ_HTTP_TIMEOUT")
        .ok()
        .and_then(|v| v.parse().ok())
        .or(config.http.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let request_theme = config
        .theme
        .request
        .clone()
        .unwrap_or_else(|| DEFAULT_REQUEST_THEME.to_string());

    ResolvedConfig {
        file_pattern,
        case_sensitive,
        log_file: resolve_log_file(config),
        log_level,
        script_theme: config
            .theme
            .script
            .clone()
            .unwrap_or_else(|| request_theme.clone()),
        request_theme,
        response_theme: config
            .theme
            .response
            .clone()
            .unwrap_or_else(|| DEFAULT_RESPONSE_THEME.to_string()),
        timeout_secs,
    }
}

/// Log file: config (with `~/` expansion) → `~/.req/req.log` → `./req.log`.
fn resolve_log_file(config: &ReqConfig) -> PathBuf {
    if let Some(ref file) = config.general.log_file {
        if let Some(rest) = file.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        return PathBuf::from(file);
    }
    config_dir()
        .map(|d| d.join(DEFAULT_LOG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_NAME))
}

/// Map a configured level name onto a `log` filter, defaulting to `Info`.
pub fn level_filter(level: &str) -> log::LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" | "warning" => log::LevelFilter::Warn,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = ReqConfig::default();
        assert!(config.general.file_pattern.is_none());
        assert!(config.theme.request.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = ReqConfig::default();
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.request_theme, DEFAULT_REQUEST_THEME);
        assert_eq!(resolved.response_theme, DEFAULT_RESPONSE_THEME);
        assert_eq!(resolved.script_theme, DEFAULT_REQUEST_THEME);
        assert!(!resolved.case_sensitive);
        assert!(resolved.log_file.ends_with("req.log"));
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = ReqConfig {
            general: GeneralConfig {
                case_sensitive: Some(true),
                log_file: Some("/tmp/custom.log".to_string()),
                ..Default::default()
            },
            theme: ThemeConfig {
                request: Some("InspiredGitHub".to_string()),
                response: Some("Solarized (dark)".to_string()),
                script: None,
            },
            http: HttpConfig {
                timeout_secs: Some(5),
            },
        };
        let resolved = resolve(&config, &CliOverrides::default());
        assert!(resolved.case_sensitive);
        assert_eq!(resolved.log_file, PathBuf::from("/tmp/custom.log"));
        assert_eq!(resolved.request_theme, "InspiredGitHub");
        assert_eq!(resolved.response_theme, "Solarized (dark)");
        // Script theme follows the request theme when unset
        assert_eq!(resolved.script_theme, "InspiredGitHub");
    }

    #[test]
    fn test_resolve_cli_pattern_wins() {
        let config = ReqConfig {
            general: GeneralConfig {
                file_pattern: Some(r"\.rest$".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            file_pattern: Some(r"\.req$".to_string()),
            case_sensitive: true,
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.file_pattern, r"\.req$");
        assert!(resolved.case_sensitive);
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[theme]
response = "InspiredGitHub"
"#;
        let config: ReqConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme.response.as_deref(), Some("InspiredGitHub"));
        assert!(config.theme.request.is_none());
        assert!(config.http.timeout_secs.is_none());
    }

    #[test]
    fn test_full_toml_parses() {
        let toml_str = r#"
[general]
file_pattern = "\\.http$"
case_sensitive = true
log_level = "debug"

[http]
timeout_secs = 10
"#;
        let config: ReqConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.file_pattern.as_deref(), Some(r"\.http$"));
        assert_eq!(config.general.case_sensitive, Some(true));
        assert_eq!(config.general.log_level.as_deref(), Some("debug"));
        assert_eq!(config.http.timeout_secs, Some(10));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let err = load_config(Some(Path::new("/no/such/req-config.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[http]\ntimeout_secs = 7\n").unwrap();

        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(config.http.timeout_secs, Some(7));
        assert_eq!(source, ConfigSource::File(path));
    }

    #[test]
    fn test_generated_template_parses_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        generate_default_config(&path).unwrap();

        let (config, _) = load_config(Some(&path)).unwrap();
        assert!(config.general.file_pattern.is_none());
        assert!(config.theme.request.is_none());
    }

    #[test]
    fn test_level_filter_names() {
        assert_eq!(level_filter("DEBUG"), log::LevelFilter::Debug);
        assert_eq!(level_filter("warning"), log::LevelFilter::Warn);
        assert_eq!(level_filter("nonsense"), log::LevelFilter::Info);
    }
}
