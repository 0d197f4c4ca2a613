// Configuration loading and parsing (courtside.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_API_BASE_URL: &str = "https://api.balldontlie.io/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SEASONS_BACK: u32 = 3;

/// Earliest and latest season start years accepted for `default_season`.
pub const SEASON_RANGE: std::ops::RangeInclusive<i32> = 1946..=2100;

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// The team every win/loss and home/away derivation is computed for.
    pub tracked_team_id: u64,
    pub default_season: i32,
    /// How many seasons before `default_season` the season picker offers.
    pub seasons_back: u32,
    pub api_base_url: String,
    pub api_key: String,
    pub request_timeout_secs: u64,
    pub db_path: String,
}

impl Config {
    /// Assemble a config in code, with ambient fields at their defaults.
    pub fn new(
        tracked_team_id: u64,
        default_season: i32,
        api_base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Config {
            tracked_team_id,
            default_season,
            seasons_back: DEFAULT_SEASONS_BACK,
            api_base_url: api_base_url.into(),
            api_key: api_key.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            db_path: default_db_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// courtside.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire courtside.toml file.
#[derive(Debug, Clone, Deserialize)]
struct CourtsideFile {
    team: TeamSection,
    season: SeasonSection,
    #[serde(default)]
    api: ApiSection,
    #[serde(default)]
    storage: StorageSection,
}

#[derive(Debug, Clone, Deserialize)]
struct TeamSection {
    tracked_team_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct SeasonSection {
    default_season: i32,
    #[serde(default = "default_seasons_back")]
    seasons_back: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiSection {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_timeout")]
    request_timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        ApiSection {
            base_url: default_base_url(),
            request_timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StorageSection {
    db_path: Option<String>,
}

fn default_seasons_back() -> u32 {
    DEFAULT_SEASONS_BACK
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
struct CredentialsFile {
    api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/courtside.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- courtside.toml (required) ---
    let main_path = config_dir.join("courtside.toml");
    let main_text = read_file(&main_path)?;
    let file: CourtsideFile = toml::from_str(&main_text).map_err(|e| ConfigError::ParseError {
        path: main_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials: CredentialsFile = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsFile::default()
    };

    let config = Config {
        tracked_team_id: file.team.tracked_team_id,
        default_season: file.season.default_season,
        seasons_back: file.season.seasons_back,
        api_base_url: file.api.base_url.trim_end_matches('/').to_string(),
        api_key: credentials.api_key.unwrap_or_default(),
        request_timeout_secs: file.api.request_timeout_secs,
        db_path: file.storage.db_path.unwrap_or_else(default_db_path),
    };

    validate(&config)?;

    Ok(config)
}

/// Files `config/` may be seeded with, main file first. `credentials.toml`
/// only ships as a `.example`, so it is seeded only if someone drops a real
/// one into `defaults/`.
const SEEDED_FILES: [&str; 2] = ["courtside.toml", "credentials.toml"];

/// Seed `config/` with any of [`SEEDED_FILES`] that it lacks, copying from
/// `defaults/`. Existing files are never touched. Returns the files written.
///
/// Fails only when `courtside.toml` exists in neither directory, since
/// nothing can be loaded then.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    let main_file = SEEDED_FILES[0];
    if !config_dir.join(main_file).exists() && !defaults_dir.join(main_file).exists() {
        return Err(copy_error(format!(
            "no {main_file} in {} or {}; run from the project root",
            config_dir.display(),
            defaults_dir.display()
        )));
    }

    let mut copied = Vec::new();
    for name in SEEDED_FILES {
        let source = defaults_dir.join(name);
        if !source.is_file() {
            continue;
        }
        let target = config_dir.join(name);
        if seed_file(&source, &target)? {
            info!("Seeded {} from {}", target.display(), source.display());
            copied.push(target);
        }
    }
    Ok(copied)
}

/// Copy `source` to `target` unless `target` already exists. Uses
/// `create_new` so a file written concurrently is left alone.
fn seed_file(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| copy_error(format!("failed to create {}: {e}", parent.display())))?;
    }

    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(copy_error(format!("failed to create {}: {e}", target.display())));
        }
    };

    let content = std::fs::read(source)
        .map_err(|e| copy_error(format!("failed to read {}: {e}", source.display())))?;
    std::io::Write::write_all(&mut dest, &content)
        .map_err(|e| copy_error(format!("failed to write {}: {e}", target.display())))?;
    Ok(true)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

/// `courtside.db` in the platform data directory, or in the working
/// directory when the platform has none.
pub fn default_db_path() -> String {
    directories::ProjectDirs::from("", "", "courtside")
        .map(|dirs| dirs.data_dir().join("courtside.db"))
        .unwrap_or_else(|| PathBuf::from("courtside.db"))
        .to_string_lossy()
        .into_owned()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.tracked_team_id == 0 {
        return Err(invalid("team.tracked_team_id", "must be greater than 0"));
    }

    if !SEASON_RANGE.contains(&config.default_season) {
        return Err(invalid(
            "season.default_season",
            format!(
                "must be between {} and {}, got {}",
                SEASON_RANGE.start(),
                SEASON_RANGE.end(),
                config.default_season
            ),
        ));
    }

    let url = &config.api_base_url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(invalid(
            "api.base_url",
            format!("must start with http:// or https://, got `{url}`"),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(invalid("api.request_timeout_secs", "must be > 0"));
    }

    if config.api_key.trim().is_empty() {
        return Err(invalid(
            "credentials.api_key",
            "missing; copy defaults/credentials.toml.example to config/credentials.toml",
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
