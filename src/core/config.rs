use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::io;

/// Project configuration file looked up at the root being migrated.
pub const CONFIG_FILE: &str = "srcmigrate.json";

/// Root configuration structure for srcmigrate.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateConfig {
    /// File extensions (without dot, case-sensitive) that are rewritten.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Globs matched against root-relative paths; matching files are skipped.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// When set, originals are copied to `<file><suffix>` before writing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_suffix: Option<String>,

    /// Leave bare enum identifiers alone; only rewrite qualified references.
    #[serde(default)]
    pub require_qualifier: bool,

    #[serde(default)]
    pub includes: IncludesConfig,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: Vec::new(),
            backup_suffix: None,
            require_qualifier: false,
            includes: IncludesConfig::default(),
        }
    }
}

/// Configuration for the include-extension rewrite
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludesConfig {
    #[serde(default = "default_include_prefixes")]
    pub prefixes: Vec<String>,

    #[serde(default = "default_include_extension")]
    pub extension: String,

    #[serde(default = "default_include_renames")]
    pub renames: BTreeMap<String, String>,
}

impl Default for IncludesConfig {
    fn default() -> Self {
        Self {
            prefixes: default_include_prefixes(),
            extension: default_include_extension(),
            renames: default_include_renames(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    ["cpp", "C", "hpp", "h"].iter().map(|s| s.to_string()).collect()
}

fn default_include_prefixes() -> Vec<String> {
    Vec::new()
}

fn default_include_extension() -> String {
    "h".to_string()
}

fn default_include_renames() -> BTreeMap<String, String> {
    crate::migrate::builtin_include_renames()
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// Load configuration for a migration rooted at `root`.
///
/// An explicit path must exist. Otherwise `srcmigrate.json` is looked up in
/// `root` (or its parent when `root` is a file) and built-in defaults are used
/// when it is absent.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<MigrateConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let dir = if root.is_file() {
                root.parent().unwrap_or(root)
            } else {
                root
            };
            let candidate = dir.join(CONFIG_FILE);
            if !candidate.exists() {
                return Ok(MigrateConfig::default());
            }
            candidate
        }
    };

    let content = io::read_file(&path, &format!("read {}", path.display()))?;
    parse_config(&content, &path.display().to_string())
}

/// Parse and validate configuration JSON; `source` names it in errors.
pub fn parse_config(content: &str, source: &str) -> Result<MigrateConfig> {
    let mut config: MigrateConfig =
        serde_json::from_str(content).map_err(|e| Error::config_invalid_json(source, e))?;

    config.extensions = config
        .extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_string())
        .collect();
    if config.extensions.iter().any(|ext| ext.is_empty()) || config.extensions.is_empty() {
        return Err(Error::config_invalid_value(
            "extensions",
            Some(config.extensions.join(",")),
            "Extensions must be a non-empty list of non-empty names",
        ));
    }

    config.includes.extension = config.includes.extension.trim_start_matches('.').to_string();
    if config.includes.extension.is_empty() {
        return Err(Error::config_invalid_value(
            "includes.extension",
            None,
            "Include extension cannot be empty",
        ));
    }

    if matches!(config.backup_suffix.as_deref(), Some("")) {
        return Err(Error::config_invalid_value(
            "backupSuffix",
            None,
            "Backup suffix cannot be empty; omit it to disable backups",
        ));
    }

    Ok(config)
}
