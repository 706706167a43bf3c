use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        error::ConfigError,
        sync::{DomainSpec, SyncOptions},
        walker::{SourceRoot, is_glob_pattern},
    },
    formats::scanners::DEFAULT_COMMENT_PREFIXES,
};

pub const CONFIG_FILE_NAME: &str = ".msgsyncrc.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
    #[serde(default = "default_domains")]
    pub domains: Vec<DomainConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_domain: Option<String>,
    #[serde(default)]
    pub purge_obsolete: bool,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    /// Headers for freshly scanned catalogs (`Language`, `Plural-Forms`, ...).
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_comment_prefixes")]
    pub comment_prefixes: Vec<String>,
}

/// A directory to scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub path: String,
    /// Regex the full path of a file must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DomainConfig {
    pub name: String,
    pub targets: Vec<String>,
}

fn default_sources() -> Vec<SourceConfig> {
    vec![SourceConfig {
        path: "src".to_string(),
        pattern: None,
    }]
}

fn default_domains() -> Vec<DomainConfig> {
    vec![DomainConfig {
        name: "messages".to_string(),
        targets: vec!["locale/messages.pot".to_string()],
    }]
}

fn default_ignores() -> Vec<String> {
    ["**/node_modules/**", "**/vendor/**"]
        .map(String::from)
        .to_vec()
}

fn default_comment_prefixes() -> Vec<String> {
    DEFAULT_COMMENT_PREFIXES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            domains: default_domains(),
            default_domain: None,
            purge_obsolete: false,
            ignores: default_ignores(),
            headers: BTreeMap::new(),
            comment_prefixes: default_comment_prefixes(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for invalid source regexes or ignore globs. Domain
    /// checks happen when the run starts, after CLI overrides are applied.
    pub fn validate(&self) -> Result<()> {
        for source in &self.sources {
            if let Some(pattern) = &source.pattern {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    field: "sources",
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            }
        }

        // Patterns without wildcards are literal paths and always valid.
        for pattern in self.ignores.iter().filter(|p| is_glob_pattern(p)) {
            Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                field: "ignores",
                pattern: pattern.clone(),
                message: e.msg.to_string(),
            })?;
        }

        Ok(())
    }

    /// Build run options, resolving relative paths against `base_dir`.
    pub fn to_sync_options(&self, base_dir: &Path) -> Result<SyncOptions> {
        self.validate()?;

        let mut roots = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let mut root = SourceRoot::new(base_dir.join(&source.path));
            if let Some(pattern) = &source.pattern {
                root = root.with_pattern(Regex::new(pattern)?);
            }
            roots.push(root);
        }

        let domains = self
            .domains
            .iter()
            .map(|d| DomainSpec::new(&d.name, d.targets.iter().map(|t| base_dir.join(t))))
            .collect();

        Ok(SyncOptions {
            roots,
            domains,
            default_domain: self.default_domain.clone(),
            purge_obsolete: self.purge_obsolete,
            dry_run: false,
            ignores: self.ignores.clone(),
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect(),
            reference_base: base_dir.to_path_buf(),
        })
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Directory relative config paths resolve against: the one holding the
    /// config file, or the start directory when using defaults.
    pub base_dir: PathBuf,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                base_dir,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            base_dir: start_dir.to_path_buf(),
            from_file: false,
        }),
    }
}
