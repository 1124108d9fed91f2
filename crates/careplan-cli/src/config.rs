use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use careplan_generate::client::{DEFAULT_API_BASE_URL, DEFAULT_MODEL};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

const APP_DIR: &str = "careplan";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareplanConfig {
    /// Schema version. Missing means the current version.
    #[serde(default = "current_version")]
    pub config_version: u32,
    /// Directory holding the key-value store.
    pub data_dir: PathBuf,
    /// Generation model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the generation API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    pub created_at: jiff::Timestamp,
}

fn current_version() -> u32 {
    CURRENT_VERSION
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl CareplanConfig {
    /// A fresh config storing data under `data_dir`.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            config_version: CURRENT_VERSION,
            data_dir,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            created_at: jiff::Timestamp::now(),
        }
    }
}

/// Redacted settings safe to print.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigInfo {
    pub config_path: String,
    pub data_dir: String,
    pub model: String,
    pub api_base_url: String,
    pub created_at: String,
    pub api_key_hint: Option<String>,
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join(APP_DIR))
}

pub fn config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Default data directory: `<data dir>/careplan`.
pub fn default_data_dir() -> eyre::Result<PathBuf> {
    let base = dirs::data_dir().ok_or_else(|| eyre::eyre!("no data directory found"))?;
    Ok(base.join(APP_DIR))
}

/// Load the config at `path`, writing a default one first if none exists.
pub fn load_or_init(path: &Path) -> eyre::Result<CareplanConfig> {
    if path.exists() {
        return load_config(path);
    }
    let config = CareplanConfig::new(default_data_dir()?);
    save_config(path, &config)?;
    tracing::info!(path = %path.display(), "default config created");
    Ok(config)
}

pub fn load_config(path: &Path) -> eyre::Result<CareplanConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .map_or(CURRENT_VERSION, |v| u32::try_from(v).unwrap_or(u32::MAX));

    let migrated = migrate(json, on_disk_version)?;
    let config: CareplanConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value. Version 1 is
/// the first schema, so there is nothing to run yet.
fn migrate(json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update careplan."
        ));
    }

    Ok(json)
}

pub fn save_config(path: &Path, config: &CareplanConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path has no parent: {}", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

pub fn config_info(
    config: &CareplanConfig,
    config_path: &Path,
    data_dir: &Path,
    api_key: Option<&str>,
) -> ConfigInfo {
    ConfigInfo {
        config_path: config_path.display().to_string(),
        data_dir: data_dir.display().to_string(),
        model: config.model.clone(),
        api_base_url: config.api_base_url.clone(),
        created_at: config.created_at.to_string(),
        api_key_hint: api_key.map(redact_api_key),
    }
}

pub fn redact_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
