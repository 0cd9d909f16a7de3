//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/clustermap/clustermap.toml`
//! 3. Local config: `<root>/.clustermap.toml` (the directory holding the taxonomy)
//! 4. Environment variables: `CLUSTERMAP_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::CsvColumns;

/// Raw column names for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCsvColumns {
    pub keyword: Option<String>,
    pub search_volume: Option<String>,
    pub keyword_difficulty: Option<String>,
    pub cpc: Option<String>,
    pub funnel_stage: Option<String>,
    pub search_intent: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub anchor_dir: Option<String>,
    pub output_file: Option<PathBuf>,
    pub workers: Option<usize>,
    pub columns: RawCsvColumns,
    pub pillar_names: Option<BTreeMap<String, String>>,
}

/// Unified configuration for clustermap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory below the root that holds the pillar directories
    pub anchor_dir: String,
    /// Output JSON file, relative paths resolve against the root
    pub output_file: PathBuf,
    /// Extraction worker threads (0 = all available cores)
    pub workers: usize,
    /// CSV column header names
    pub columns: CsvColumns,
    /// Display names applied by `clustermap rename`
    pub pillar_names: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            anchor_dir: "3.1 Qualified Clusters".into(),
            output_file: PathBuf::from("squarified-ready.json"),
            workers: 0,
            columns: CsvColumns::default(),
            pillar_names: default_pillar_names(),
        }
    }
}

fn default_pillar_names() -> BTreeMap<String, String> {
    [
        ("human resources", "Human Resources"),
        ("candidates", "Job Candidates"),
        ("developer", "Software Development"),
        ("databases", "Database Management"),
        ("devops_tools", "DevOps & Tools"),
        ("offshore_outsourcing", "Offshore Outsourcing"),
        ("emerging_tech", "Emerging Technologies"),
        ("salary", "Salary & Compensation"),
        ("programming_languages", "Programming Languages"),
        ("cloud_platforms", "Cloud Platforms"),
        ("software", "Software Solutions"),
        ("jobs_work", "Jobs & Work"),
        ("hiring", "Hiring & Recruitment"),
        ("web_frameworks", "Web Frameworks"),
        ("staffing", "Staffing Services"),
        ("immigration_forms", "Immigration & Visas"),
        ("mobile_development", "Mobile Development"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Get the XDG config directory for clustermap.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "clustermap").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("clustermap.toml"))
}

/// Get the path to the local config file in a root directory.
pub fn local_config_path(root: &Path) -> PathBuf {
    root.join(".clustermap.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~` and `$VAR` in a path-like string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl CsvColumns {
    fn merge(&self, overlay: &RawCsvColumns) -> Self {
        let pick = |o: &Option<String>, base: &String| o.clone().unwrap_or_else(|| base.clone());
        Self {
            keyword: pick(&overlay.keyword, &self.keyword),
            search_volume: pick(&overlay.search_volume, &self.search_volume),
            keyword_difficulty: pick(&overlay.keyword_difficulty, &self.keyword_difficulty),
            cpc: pick(&overlay.cpc, &self.cpc),
            funnel_stage: pick(&overlay.funnel_stage, &self.funnel_stage),
            search_intent: pick(&overlay.search_intent, &self.search_intent),
        }
    }
}

impl Settings {
    /// Output path, resolved against `root` when relative.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        if self.output_file.is_absolute() {
            self.output_file.clone()
        } else {
            root.join(&self.output_file)
        }
    }

    /// Taxonomy directory below `root`.
    pub fn base_path(&self, root: &Path) -> PathBuf {
        root.join(&self.anchor_dir)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.output_file.to_string_lossy().as_ref());
        self.output_file = PathBuf::from(expanded);
    }

    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Pillar names: overlay entries are added, same keys replaced
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut pillar_names = self.pillar_names.clone();
        if let Some(names) = &overlay.pillar_names {
            pillar_names.extend(names.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Self {
            anchor_dir: overlay
                .anchor_dir
                .clone()
                .unwrap_or_else(|| self.anchor_dir.clone()),
            output_file: overlay
                .output_file
                .clone()
                .unwrap_or_else(|| self.output_file.clone()),
            workers: overlay.workers.unwrap_or(self.workers),
            columns: self.columns.merge(&overlay.columns),
            pillar_names,
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `root` - Optional root directory for the local config file
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/clustermap/clustermap.toml`
    /// 3. Local config: `<root>/.clustermap.toml`
    /// 4. Environment variables: `CLUSTERMAP_*` prefix
    pub fn load(root: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(root) = root {
            let local_path = local_config_path(root);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply CLUSTERMAP_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("CLUSTERMAP").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("anchor_dir") {
            settings.anchor_dir = val;
        }
        if let Ok(val) = config.get_string("output_file") {
            settings.output_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("workers") {
            settings.workers = val.trim().parse().map_err(|_| ApplicationError::Config {
                message: format!("CLUSTERMAP_WORKERS must be a number, got {:?}", val),
            })?;
        }

        let columns = RawCsvColumns {
            keyword: config.get_string("columns.keyword").ok(),
            search_volume: config.get_string("columns.search_volume").ok(),
            keyword_difficulty: config.get_string("columns.keyword_difficulty").ok(),
            cpc: config.get_string("columns.cpc").ok(),
            funnel_stage: config.get_string("columns.funnel_stage").ok(),
            search_intent: config.get_string("columns.search_intent").ok(),
        };
        settings.columns = settings.columns.merge(&columns);

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# clustermap configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/clustermap/clustermap.toml
#   Local:  <root>/.clustermap.toml
#   Env:    CLUSTERMAP_* environment variables (CLUSTERMAP_COLUMNS__CPC=...)

# Directory below the root holding pillar/parent/[subtopic] folders
# anchor_dir = "3.1 Qualified Clusters"

# Output file (relative to the root)
# output_file = "squarified-ready.json"

# Extraction workers, 0 = all cores
# workers = 0

[columns]
# keyword = "keyword"
# search_volume = "Semrush_Search Volume"
# keyword_difficulty = "Semrush_Keyword Difficulty"
# cpc = "Semrush_CPC (USD)"
# funnel_stage = "Semrush_Funnel Stage"
# search_intent = "Semrush_Search Intent"

# Display names used by `clustermap rename` (added to the built-in table)
[pillar_names]
# devops_tools = "DevOps & Tools"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
