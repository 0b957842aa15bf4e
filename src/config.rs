use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use log::debug;
use log::warn;
use serde::Deserialize;
use serde::Serialize;

use crate::prompt::LineReader;

/// Name of the config file, both in the home directory and in projects.
pub const CONFIG_FILE_NAME: &str = ".pivotalrc";

pub const API_TOKEN: &str = "api_token";
pub const USE_SSL: &str = "use_ssl";
pub const ME: &str = "me";
pub const PROJECT_ID: &str = "project_id";

/// Keys that must be present before talking to the tracker, with the label
/// used when prompting for them.
const REQUIRED_KEYS: [(&str, &str); 4] = [
    (API_TOKEN, "Api token (https://www.pivotaltracker.com/profile)"),
    (USE_SSL, "Use SSL (y/n)"),
    (ME, "Your pivotal initials (e.g. BG)"),
    (PROJECT_ID, "Project ID"),
];

// -----------------------------------------------------------------------------
// Types

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    String(String),
}

pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// Merged configuration (project values override global ones).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    values: ConfigMap,
}

/// Where to look for config files.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub home: Option<PathBuf>,
    pub cwd: PathBuf,
}

/// Owns the two configuration tiers for the lifetime of the process.
pub struct ConfigStore {
    paths: ConfigPaths,
    global: ConfigMap,
    project: ConfigMap,
    config: Option<Config>,
}

// -----------------------------------------------------------------------------
// ConfigValue impl

impl ConfigValue {
    /// Interpret an answer typed at a prompt: `y`/`n` become booleans.
    pub fn from_input(input: &str) -> Self {
        match input {
            "y" => Self::Bool(true),
            "n" => Self::Bool(false),
            other => Self::String(other.to_string()),
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::String(s) => matches!(s.to_lowercase().as_str(), "y" | "yes" | "true"),
        }
    }
}

impl Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

// -----------------------------------------------------------------------------
// Config impl

impl Config {
    pub fn new(values: ConfigMap) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn api_token(&self) -> Result<String> {
        self.require(API_TOKEN)
    }

    pub fn use_ssl(&self) -> bool {
        self.get(USE_SSL).is_some_and(ConfigValue::is_truthy)
    }

    /// The operator's initials, used to find their stories.
    pub fn me(&self) -> Result<String> {
        self.require(ME)
    }

    pub fn project_id(&self) -> Result<String> {
        self.require(PROJECT_ID)
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .map(ToString::to_string)
            .with_context(|| format!("`{key}` is not set in {CONFIG_FILE_NAME}"))
    }
}

// -----------------------------------------------------------------------------
// ConfigPaths impl

impl ConfigPaths {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            home: dirs::home_dir(),
            cwd: std::env::current_dir().context("Failed to determine working directory")?,
        })
    }

    pub fn global_file(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// The nearest config file at or above the working directory.
    ///
    /// The global file does not count as a project file, even when the working
    /// directory is inside the home directory.
    pub fn project_file(&self) -> Option<PathBuf> {
        let found = self
            .cwd
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|file| file.is_file())?;
        if self.is_global_file(&found) {
            return None;
        }
        Some(found)
    }

    /// Whether `file` is the global file, following symlinks in either path.
    pub fn is_global_file(&self, file: &Path) -> bool {
        self.global_file()
            .is_some_and(|global| canonical(&global) == canonical(file))
    }

    /// Newly entered values are always written next to the working directory.
    pub fn project_write_file(&self) -> PathBuf {
        self.cwd.join(CONFIG_FILE_NAME)
    }
}

// -----------------------------------------------------------------------------
// ConfigStore impl

impl ConfigStore {
    pub fn new(paths: ConfigPaths) -> Self {
        Self {
            paths,
            global: ConfigMap::new(),
            project: ConfigMap::new(),
            config: None,
        }
    }

    /// Load and merge both tiers. Files are only read on the first call.
    pub fn read(&mut self) -> &Config {
        if self.config.is_none() {
            self.global = self
                .paths
                .global_file()
                .map(|file| load_map(&file))
                .unwrap_or_default();
            self.project = self
                .paths
                .project_file()
                .map(|file| load_map(&file))
                .unwrap_or_default();
            let mut values = self.global.clone();
            values.extend(self.project.clone());
            self.config = Some(Config::new(values));
        }
        self.config.get_or_insert_default()
    }

    /// Prompt for every required key missing from the merged configuration and
    /// persist the answers in the project config file.
    pub fn ensure_full_config(
        &mut self,
        reader: &mut impl LineReader,
        stdout: &mut impl std::io::Write,
    ) -> Result<&Config> {
        let mut added = ConfigMap::new();
        for (key, label) in REQUIRED_KEYS {
            if self.read().get(key).is_none() {
                let answer = reader.read_line(label)?;
                added.insert(key.to_string(), ConfigValue::from_input(&answer));
            }
        }

        if !added.is_empty() {
            self.project.extend(added.clone());
            let file = self.paths.project_write_file();
            // Written from the home directory, the project file is the global
            // file, so it must keep the global keys.
            let contents = if self.paths.is_global_file(&file) {
                let mut values = self.global.clone();
                values.extend(self.project.clone());
                values
            } else {
                self.project.clone()
            };
            let yaml =
                serde_yml::to_string(&contents).context("Failed to serialize configuration")?;
            fs::write(&file, yaml)
                .with_context(|| format!("Failed to write config to {}", file.display()))?;
            if let Some(config) = &mut self.config {
                config.values.extend(added);
            }
            writeln!(stdout, "Writing config to {CONFIG_FILE_NAME}")?;
        }

        Ok(self.read())
    }
}

/// Resolve symlinks when the path exists; otherwise compare it as given.
fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Missing, empty and unparsable files all count as an empty map.
fn load_map(file: &Path) -> ConfigMap {
    let Ok(contents) = fs::read_to_string(file) else {
        return ConfigMap::new();
    };
    debug!("Loading config from {}", file.display());
    if contents.trim().is_empty() {
        return ConfigMap::new();
    }
    match serde_yml::from_str::<BTreeMap<String, Option<ConfigValue>>>(&contents) {
        Ok(map) => map
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect(),
        Err(err) => {
            warn!("Ignoring invalid config file {}: {}", file.display(), err);
            ConfigMap::new()
        }
    }
}
