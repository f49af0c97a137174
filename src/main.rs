use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use log::{debug, error, info, warn};
use regex::Regex;
use simplelog::{ConfigBuilder, WriteLogger};

use req::core::config::{self, CliOverrides, ConfigError, ResolvedConfig};
use req::core::context::Context;
use req::core::discovery;
use req::core::env::{EnvFileError, Environment, load_env_file};
use req::engine::{EngineError, HttpEngine};
use req::tui;
use req::tui::clipboard::SystemClipboard;
use req::tui::highlight::theme_exists;
use req::tui::views::{Services, Themes};

#[derive(Parser)]
#[command(name = "req", about = "Browse, inspect and send requests from .http files")]
struct Args {
    /// Directory searched recursively for request files
    #[arg(default_value = ".")]
    path: PathBuf,

    /// File of KEY=VALUE lines used as the initial environment
    #[arg(short = 'e', long = "env", value_name = "FILE")]
    env: Option<PathBuf>,

    /// Regex matched against file paths relative to PATH
    #[arg(long, value_name = "REGEX")]
    pattern: Option<String>,

    /// Match fuzzy filters case-sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// Config file to use instead of ~/.req/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Anything that stops the TUI from starting (or ends it abnormally).
#[derive(Debug)]
enum StartupError {
    Config(ConfigError),
    EnvFile { path: PathBuf, source: EnvFileError },
    Root { path: PathBuf, source: io::Error },
    Pattern(regex::Error),
    Engine(EngineError),
    Terminal(io::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Config(e) => write!(f, "{e}"),
            StartupError::EnvFile { path, source } => {
                write!(f, "cannot load {}: {source}", path.display())
            }
            StartupError::Root { path, source } => {
                write!(f, "cannot search {}: {source}", path.display())
            }
            StartupError::Pattern(e) => write!(f, "invalid file pattern: {e}"),
            StartupError::Engine(e) => write!(f, "cannot start request engine: {e}"),
            StartupError::Terminal(e) => write!(f, "terminal error: {e}"),
        }
    }
}

impl std::error::Error for StartupError {}

fn main() -> ExitCode {
    let args = Args::parse();
    match start(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("req: {e}");
            ExitCode::FAILURE
        }
    }
}

fn start(args: Args) -> Result<(), StartupError> {
    let (file_config, source) =
        config::load_config(args.config.as_deref()).map_err(StartupError::Config)?;
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            file_pattern: args.pattern.clone(),
            case_sensitive: args.case_sensitive,
        },
    );
    init_logging(&resolved);
    info!("req starting in {}", args.path.display());
    source.log();
    debug!("Config: {:?}", file_config);

    let env = match args.env {
        Some(path) => load_env_file(&path)
            .map_err(|source| StartupError::EnvFile { path: path.clone(), source })?,
        None => Environment::new(),
    };

    let pattern = Regex::new(&resolved.file_pattern).map_err(StartupError::Pattern)?;
    let files = discovery::discover(&args.path, &pattern).map_err(|source| StartupError::Root {
        path: args.path.clone(),
        source,
    })?;
    info!("Discovered {} request files", files.len());

    let engine = HttpEngine::new(Duration::from_secs(resolved.timeout_secs))
        .map_err(StartupError::Engine)?;

    let themes = Themes::from_config(&resolved);
    for name in [&themes.request, &themes.response, &themes.script] {
        if !theme_exists(name) {
            warn!("Unknown theme {name:?}, falling back to the default");
        }
    }

    let services = Services {
        ctx: Context::new(Rc::new(engine)).with_environment(env),
        clipboard: Rc::new(SystemClipboard::new()),
        themes,
        case_sensitive: resolved.case_sensitive,
    };

    tui::run(files, services).map_err(StartupError::Terminal)
}

/// File logger: the terminal belongs to ratatui. Failing to open the log
/// file leaves logging disabled.
fn init_logging(config: &ResolvedConfig) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Some(dir) = config.log_file.parent() {
        let _ = fs::create_dir_all(dir);
    }
    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config::level_filter(&config.log_level), log_config, log_file);
    }
}
