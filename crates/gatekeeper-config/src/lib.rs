use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use gatekeeper_core::domain::is_valid_table_name;
use gatekeeper_core::rules::{ResolveOptions, DEFAULT_RESULT_LIMIT, MAX_RESULT_LIMIT};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const APP_DIR: &str = "gatekeeper";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_PIPELINE_TABLE: &str = "pipeline";
pub const DEFAULT_NEW_CUSTOMER_YES: &str = "Sì";
pub const DEFAULT_NEW_CUSTOMER_NO: &str = "No";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub pipeline_table: String,
    pub result_limit: usize,
    pub form: FormConfig,
}

/// Prefilled-form target. `url` stays unset until configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    pub url: Option<String>,
    pub new_customer_yes: String,
    pub new_customer_no: String,
    pub entries: FormEntries,
}

/// Form question ids (`entry.NNN`) each field is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEntries {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub new_customer: String,
    pub customer_id: String,
}

impl Default for FormEntries {
    fn default() -> Self {
        Self {
            first_name: "entry.2043584573".to_string(),
            last_name: "entry.252075690".to_string(),
            phone: "entry.1449005772".to_string(),
            new_customer: "entry.1264387969".to_string(),
            customer_id: "entry.1434715647".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pipeline_table: DEFAULT_PIPELINE_TABLE.to_string(),
            result_limit: DEFAULT_RESULT_LIMIT,
            form: FormConfig {
                url: None,
                new_customer_yes: DEFAULT_NEW_CUSTOMER_YES.to_string(),
                new_customer_no: DEFAULT_NEW_CUSTOMER_NO.to_string(),
                entries: FormEntries::default(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid pipeline_table value: {0}")]
    InvalidPipelineTable(String),
    #[error("invalid result_limit value: {0} (expected 1 to {max})", max = MAX_RESULT_LIMIT)]
    InvalidResultLimit(usize),
    #[error("invalid form.{field} value: {reason}")]
    InvalidFormField { field: &'static str, reason: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    pipeline_table: Option<String>,
    result_limit: Option<usize>,
    form: Option<FormFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FormFile {
    url: Option<String>,
    new_customer_yes: Option<String>,
    new_customer_no: Option<String>,
    entries: Option<EntriesFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntriesFile {
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    new_customer: Option<String>,
    customer_id: Option<String>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(table) = parsed.pipeline_table {
        let table = table.trim().to_string();
        if !is_valid_table_name(&table) {
            return Err(ConfigError::InvalidPipelineTable(table));
        }
        config.pipeline_table = table;
    }

    if let Some(limit) = parsed.result_limit {
        config.result_limit = ResolveOptions::with_limit(limit)
            .map_err(|_| ConfigError::InvalidResultLimit(limit))?
            .limit;
    }

    if let Some(form) = parsed.form {
        if let Some(url) = form.url {
            config.form.url = Some(require_form_url(url)?);
        }
        if let Some(value) = form.new_customer_yes {
            config.form.new_customer_yes = require_text("new_customer_yes", value)?;
        }
        if let Some(value) = form.new_customer_no {
            config.form.new_customer_no = require_text("new_customer_no", value)?;
        }
        if let Some(entries) = form.entries {
            config.form.entries = merge_entries(entries)?;
        }
    }

    Ok(config)
}

fn merge_entries(entries: EntriesFile) -> Result<FormEntries> {
    let mut merged = FormEntries::default();
    if let Some(value) = entries.first_name {
        merged.first_name = require_entry("entries.first_name", value)?;
    }
    if let Some(value) = entries.last_name {
        merged.last_name = require_entry("entries.last_name", value)?;
    }
    if let Some(value) = entries.phone {
        merged.phone = require_entry("entries.phone", value)?;
    }
    if let Some(value) = entries.new_customer {
        merged.new_customer = require_entry("entries.new_customer", value)?;
    }
    if let Some(value) = entries.customer_id {
        merged.customer_id = require_entry("entries.customer_id", value)?;
    }
    Ok(merged)
}

fn require_text(field: &'static str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidFormField {
            field,
            reason: "value cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// The form link must be an absolute http(s) URL with a host.
fn require_form_url(value: String) -> Result<String> {
    let value = value.trim().to_string();
    let invalid = |reason: String| ConfigError::InvalidFormField { field: "url", reason };
    let parsed = Url::parse(&value).map_err(|err| invalid(format!("{err}: {value}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("expected an http(s) URL, got {value}")));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid(format!("missing host in {value}")));
    }
    Ok(value)
}

fn require_entry(field: &'static str, value: String) -> Result<String> {
    let value = require_text(field, value)?;
    if !value.starts_with("entry.") {
        return Err(ConfigError::InvalidFormField {
            field,
            reason: format!("expected an entry.* id, got {value}"),
        });
    }
    Ok(value)
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
