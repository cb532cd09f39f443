//! Ferret configuration from `.ferret/config.toml`.
//!
//! Every section defaults independently so a partial file is fine; a missing
//! or unparseable file falls back to defaults with a warning.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Ferret configuration from config.toml
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct FerretConfig {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub ranker: RankerConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScannerConfig {
    /// Minimum winning score; below this the verdict is UNKNOWN.
    #[serde(default = "default_activation_threshold")]
    pub activation_threshold: f32,
}

fn default_activation_threshold() -> f32 {
    1.0
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            activation_threshold: default_activation_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExtractorConfig {
    /// Name prefixes treated as private and excluded from extraction.
    #[serde(default = "default_private_prefixes")]
    pub private_prefixes: Vec<String>,
}

fn default_private_prefixes() -> Vec<String> {
    vec!["_".to_string()]
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            private_prefixes: default_private_prefixes(),
        }
    }
}

impl ExtractorConfig {
    /// Exclusion predicate for function names.
    pub fn is_private(&self, name: &str) -> bool {
        self.private_prefixes.iter().any(|p| name.starts_with(p))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    /// Embedding model name (fastembed model enum variant)
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Cache directory for model files
    #[serde(default)]
    pub cache_dir: Option<String>,
}

fn default_embedding_model() -> String {
    "AllMiniLML6V2".to_string()
}
fn default_batch_size() -> usize {
    32
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            batch_size: default_batch_size(),
            cache_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RankerConfig {
    /// Cosine similarity above this marks two candidates as duplicates.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
}

fn default_similarity_threshold() -> f32 {
    0.92
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorpusConfig {
    /// Extra ignore patterns applied on top of .gitignore.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Files larger than this are recorded as unreadable.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_max_file_size() -> u64 {
    2 * 1024 * 1024
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            max_file_size: default_max_file_size(),
        }
    }
}

/// Ferret home directory (`~/.ferret`).
pub fn ferret_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ferret")
}

/// Load configuration from `<dir>/config.toml`, falling back to defaults.
pub fn load_config(dir: &Path) -> FerretConfig {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return FerretConfig::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse config.toml: {}", e);
            FerretConfig::default()
        }),
        Err(e) => {
            tracing::warn!("Failed to read config.toml: {}", e);
            FerretConfig::default()
        }
    }
}

/// Write a default config.toml into `dir`, creating it if needed.
pub fn write_default_config(dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join("config.toml");
    let content = toml::to_string_pretty(&FerretConfig::default())?;
    std::fs::write(&path, content)?;
    Ok(path)
}

// =============================================================================
// Unit Tests
// =============================================================================
