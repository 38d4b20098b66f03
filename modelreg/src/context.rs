use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use modelreg_build::RegistryGenerator;

/// Project context for modelreg operations
#[derive(Debug)]
pub struct ProjectContext {
    /// Root directory of the project (where Cargo.toml is)
    pub project_root: PathBuf,
    /// Path to .modelreg directory
    pub modelreg_dir: PathBuf,
    /// Path to config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: Option<ModelregConfig>,
}

/// Configuration stored in .modelreg/config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelregConfig {
    #[serde(default)]
    pub registry: RegistrySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySettings {
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    #[serde(default = "default_output_file")]
    pub output_file: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_file: default_output_file(),
            namespace: default_namespace(),
            collection: default_collection(),
        }
    }
}

fn default_source_dir() -> String {
    "src/entity".to_string()
}

fn default_output_file() -> String {
    "src/entity/models.rs".to_string()
}

fn default_namespace() -> String {
    "super".to_string()
}

fn default_collection() -> String {
    "models".to_string()
}

/// Values given on the command line (or through their environment variables).
#[derive(Debug, Clone, Default)]
pub struct RegistryOverrides {
    pub source_dir: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub namespace: Option<String>,
    pub collection: Option<String>,
}

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Find project context starting from the given directory
    pub fn find_from(start: &Path) -> Result<Self> {
        let project_root = Self::find_project_root(start)?;
        Self::from_root(project_root)
    }

    /// Create context from a known project root
    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        let modelreg_dir = project_root.join(".modelreg");
        let config_path = modelreg_dir.join("config.toml");

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).context("Failed to read config.toml")?;
            let config: ModelregConfig = toml::from_str(&content).context("Failed to parse config.toml")?;
            Some(config)
        } else {
            None
        };

        Ok(Self {
            project_root,
            modelreg_dir,
            config_path,
            config,
        })
    }

    /// Find project root by looking for Cargo.toml
    fn find_project_root(start: &Path) -> Result<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join("Cargo.toml").exists() {
                return Ok(current);
            }

            if !current.pop() {
                bail!(
                    "Could not find Cargo.toml in {start:?} or any parent directory. \
                     Are you in a Rust project?"
                );
            }
        }
    }

    /// Check if modelreg is initialized in this project
    pub fn is_initialized(&self) -> bool {
        self.config_path.exists()
    }

    /// Registry settings from the config file, or the defaults
    pub fn settings(&self) -> RegistrySettings {
        self.config
            .as_ref()
            .map(|config| config.registry.clone())
            .unwrap_or_default()
    }

    /// Build a generator from the config file, with `overrides` taking precedence.
    ///
    /// Relative paths resolve against the project root.
    pub fn generator(&self, overrides: &RegistryOverrides) -> Result<RegistryGenerator> {
        let settings = self.settings();

        let source_dir = match &overrides.source_dir {
            Some(path) => path.clone(),
            None => PathBuf::from(expand_env(&settings.source_dir)?),
        };
        let output_file = match &overrides.output_file {
            Some(path) => path.clone(),
            None => PathBuf::from(expand_env(&settings.output_file)?),
        };
        let namespace = overrides.namespace.clone().unwrap_or(settings.namespace);
        let collection = overrides.collection.clone().unwrap_or(settings.collection);

        Ok(RegistryGenerator::new()
            .source_dir(self.project_root.join(source_dir))
            .output_file(self.project_root.join(output_file))
            .namespace(namespace)
            .collection_name(collection))
    }

    /// Path shown to the user, relative to the project root when possible
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

/// Expand `${VAR}` references from the environment.
pub fn expand_env(value: &str) -> Result<String> {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            bail!("Unterminated variable reference in {value:?}");
        };
        let var_name = &rest[start + 2..start + 2 + len];
        let var_value =
            std::env::var(var_name).with_context(|| format!("Environment variable {var_name} not set"))?;

        expanded.push_str(&rest[..start]);
        expanded.push_str(&var_value);
        rest = &rest[start + 3 + len..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}
