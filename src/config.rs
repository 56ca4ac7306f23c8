//! Configuration for gizzdex.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GIZZDEX_CONTENT_ROOT, GIZZDEX_EXTENSION, GIZZDEX_CATEGORY)
//! 2. Config file (.gizzdex/config.yaml)
//! 3. Defaults (./data, mdx, albums)
//!
//! Config file discovery:
//! - Searches current directory and parents for .gizzdex/config.yaml
//! - Falls back to <user config dir>/gizzdex/config.yaml
//! - Paths in a project config file are relative to the project root (the
//!   directory holding .gizzdex/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::library::store::DEFAULT_EXTENSION;
use crate::library::{ContentIndex, ContentWatcher, FsStore};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const ENV_CONTENT_ROOT: &str = "GIZZDEX_CONTENT_ROOT";
pub const ENV_EXTENSION: &str = "GIZZDEX_EXTENSION";
pub const ENV_CATEGORY: &str = "GIZZDEX_CATEGORY";

const DEFAULT_CONTENT_DIR: &str = "data";
const DEFAULT_CATEGORY: &str = "albums";
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub watch: Option<WatchConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentConfig {
    /// Content root (relative to the project root)
    pub root: Option<String>,
    /// Content file extension
    pub extension: Option<String>,
    /// Category used when a command does not name one
    pub default_category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub debounce_ms: Option<u64>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Directory holding one subdirectory per category
    pub content_root: PathBuf,
    /// Content file extension, without the dot
    pub extension: String,
    /// Category used when none is given
    pub default_category: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Watcher debounce window
    pub debounce: Duration,
}

impl ResolvedConfig {
    /// Content index over the configured root
    pub fn index(&self) -> ContentIndex<FsStore> {
        ContentIndex::open(&self.content_root, &self.extension)
    }

    /// Watcher over the configured root
    pub fn watcher(&self) -> ContentWatcher {
        ContentWatcher::new(&self.content_root, &self.extension).with_debounce(self.debounce)
    }

    /// Pick the given category or the configured default
    pub fn category<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.default_category)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".gizzdex").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("gizzdex").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Directory that relative paths in a config file are resolved against
fn config_base_dir(config_path: &Path) -> PathBuf {
    let parent = config_path.parent().unwrap_or(Path::new("."));
    match parent.file_name().and_then(|n| n.to_str()) {
        Some(".gizzdex") => parent.parent().unwrap_or(Path::new(".")).to_path_buf(),
        _ => parent.to_path_buf(),
    }
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Merge environment, config file and defaults
fn resolve(
    cwd: &Path,
    file: Option<(PathBuf, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let (config_file, content, watch) = match file {
        Some((path, config)) => {
            let base = config_base_dir(&path);
            (Some((path, base)), config.content, config.watch)
        }
        None => (None, ContentConfig::default(), None),
    };

    let content_root = if let Some(root) = env(ENV_CONTENT_ROOT) {
        resolve_path(cwd, &root)
    } else if let (Some(root), Some((_, base))) = (&content.root, &config_file) {
        resolve_path(base, root)
    } else if let Some((_, base)) = &config_file {
        base.join(DEFAULT_CONTENT_DIR)
    } else {
        cwd.join(DEFAULT_CONTENT_DIR)
    };

    let extension = env(ENV_EXTENSION)
        .or(content.extension)
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
        .trim_start_matches('.')
        .to_string();

    let default_category = env(ENV_CATEGORY)
        .or(content.default_category)
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let debounce = Duration::from_millis(
        watch
            .and_then(|w| w.debounce_ms)
            .unwrap_or(DEFAULT_DEBOUNCE_MS),
    );

    ResolvedConfig {
        content_root,
        extension,
        default_category,
        config_file: config_file.map(|(path, _)| path),
        debounce,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;

    let file = match find_config_file(&cwd) {
        Some(path) => {
            let config = load_config_file(&path)?;
            Some((path, config))
        }
        None => None,
    };

    Ok(resolve(&cwd, file, |key| std::env::var(key).ok()))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
