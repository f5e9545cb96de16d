//! Configuration management.

use anyhow::{Context as _, Result};
use cfip::{PipelineConfig, SourceDescriptor};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Latency threshold for `collect` (ms).
    pub max_latency: f64,

    /// Default target regions for `regions`.
    pub regions: Vec<String>,

    /// Latency threshold for `regions` (ms).
    pub region_max_latency: f64,

    /// Concurrent registry lookups.
    pub max_concurrency: usize,

    /// Output file for `collect`.
    pub output: PathBuf,

    /// Output file for `regions`.
    pub region_output: PathBuf,

    /// Number of addresses published to DNS.
    pub dns_limit: usize,

    /// Record name used when `CF_DOMAIN_NAME` is not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Source list overriding the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceDescriptor>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_latency: 100.0,
            regions: vec!["SG".to_string(), "TW".to_string(), "JP".to_string()],
            region_max_latency: 200.0,
            max_concurrency: 10,
            output: PathBuf::from("yx_ips.txt"),
            region_output: PathBuf::from("sgfd_ips.txt"),
            dns_limit: 2,
            domain: None,
            sources: None,
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("io", "cfip", "cfip-sync")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The file to use: an explicit path, or the default location.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        explicit.map_or_else(Self::path, |p| Ok(p.to_path_buf()))
    }

    /// Load configuration.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
        config.pipeline().validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Pipeline settings derived from this configuration.
    pub fn pipeline(&self) -> PipelineConfig {
        self.sources
            .clone()
            .map_or_else(PipelineConfig::default, PipelineConfig::with_sources)
    }
}
