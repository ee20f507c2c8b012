//! Configuration loading and management.
//!
//! Provides types for the TOML-based configuration file.
//!
//! # Configuration file
//!
//! The default configuration file is `dockfix.toml` in the current working
//! directory. Use [`Config::load`] to read it:
//!
//! ```rust,no_run
//! use dockfix::config::Config;
//!
//! let config = Config::load(None).expect("failed to load config");
//! assert!(config.is_category_enabled(dockfix::finding::Category::Security));
//! ```

use std::path::{Path, PathBuf};

use crate::finding::Category;

/// Main configuration for the lint engine.
///
/// Loaded from a TOML file (typically `dockfix.toml`). All fields carry
/// sensible defaults so the config file can be omitted entirely.
///
/// # Examples
///
/// ```rust,no_run
/// use dockfix::config::Config;
///
/// // Load from the default location or fall back to built-in defaults.
/// let config = Config::load(None).unwrap();
/// ```
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// Where the rule catalogue comes from.
    pub catalogue: CatalogueConfig,
    /// When strict mode is enabled, medium findings are promoted to failures.
    pub strict: StrictConfig,
    /// Per-category on/off toggles.
    pub categories: CategoriesConfig,
}

/// Rule catalogue source.
///
/// When [`path`](CatalogueConfig::path) is unset the compiled-in catalogue
/// is used. A `--rules` flag on the command line takes precedence over this
/// setting.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CatalogueConfig {
    /// Path to a JSON rule catalogue that replaces the built-in one.
    pub path: Option<PathBuf>,
}

/// Strict-mode configuration.
///
/// When [`enabled`](StrictConfig::enabled) is `true`, any violation with
/// [`Severity::Medium`](crate::finding::Severity::Medium) will cause the
/// lint to fail (status = [`LintStatus::Failed`](crate::finding::LintStatus::Failed)).
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct StrictConfig {
    /// Set to `true` to treat medium-severity violations as errors.
    pub enabled: bool,
}

/// Per-category on/off toggles.
///
/// Every category defaults to **enabled**. Set a field to `false` in the
/// TOML config file to skip all rules in that category.
///
/// # Examples
///
/// ```toml
/// [categories]
/// ci_cd = false   # skip stage-naming conventions
/// ```
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CategoriesConfig {
    /// Base image tagging and selection rules.
    pub base_image: bool,
    /// Root users, sensitive ports, writable image paths.
    pub security: bool,
    /// Layer-count and build-context rules.
    pub build_optimization: bool,
    /// Readability and portability conventions.
    pub maintainability: bool,
    /// Package installation hygiene.
    pub dependency_management: bool,
    /// Multi-stage build conventions.
    pub ci_cd: bool,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        CategoriesConfig {
            base_image: true,
            security: true,
            build_optimization: true,
            maintainability: true,
            dependency_management: true,
            ci_cd: true,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// Resolution order:
    /// 1. If `path` is `Some`, load from that file (error if missing).
    /// 2. If `path` is `None`, try `dockfix.toml` in the current directory.
    /// 3. If that file does not exist either, return [`Config::default()`].
    ///
    /// # Errors
    ///
    /// Returns `Err(String)` when:
    /// - The explicit path does not exist.
    /// - The file cannot be read from disk.
    /// - The TOML content fails to parse.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use std::path::Path;
    /// use dockfix::config::Config;
    ///
    /// // Explicit path
    /// let cfg = Config::load(Some(Path::new("my-config.toml")))?;
    ///
    /// // Auto-detect or default
    /// let cfg = Config::load(None)?;
    /// # Ok::<(), String>(())
    /// ```
    pub fn load(path: Option<&Path>) -> Result<Config, String> {
        let config_path = if let Some(p) = path {
            if p.exists() {
                Some(p.to_path_buf())
            } else {
                return Err(format!("Config file not found: {}", p.display()));
            }
        } else {
            let default_path = Path::new("dockfix.toml");
            if default_path.exists() {
                Some(default_path.to_path_buf())
            } else {
                None
            }
        };

        match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
                let config: Config = toml::from_str(&content)
                    .map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))?;
                Ok(config)
            }
            None => Ok(Config::default()),
        }
    }

    /// Returns `true` if rules in the given category should run.
    ///
    /// # Examples
    ///
    /// ```
    /// use dockfix::config::Config;
    /// use dockfix::finding::Category;
    ///
    /// let config = Config::default();
    /// assert!(config.is_category_enabled(Category::Security));
    /// ```
    pub fn is_category_enabled(&self, category: Category) -> bool {
        match category {
            Category::BaseImage => self.categories.base_image,
            Category::Security => self.categories.security,
            Category::BuildOptimization => self.categories.build_optimization,
            Category::Maintainability => self.categories.maintainability,
            Category::DependencyManagement => self.categories.dependency_management,
            Category::CiCd => self.categories.ci_cd,
        }
    }
}
