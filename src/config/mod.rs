use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use toml::{Table, Value};

use crate::validation::Limits;
use crate::view::{TimestampFormat, ViewOptions, DEFAULT_TIMESTAMP_FORMAT};

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "Quicknote";
const APP_NAME: &str = "quicknote";

pub const CONFIG_ENV: &str = "QUICKNOTE_CONFIG";
pub const DATA_ENV: &str = "QUICKNOTE_DATA";

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn with_paths(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let mut default_cfg = AppConfig::default();
            default_cfg.post_load();
            self.write_default_config(&default_cfg)?;
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let table: Table = toml::from_str(&raw).context("parsing config toml")?;
        let mut cfg = AppConfig::default();
        cfg.apply_table(&table);
        cfg.post_load();
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
    pub state_dir: PathBuf,
    pub log_dir: PathBuf,
    pub local_storage_file: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        let override_config = env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let override_data = env::var(DATA_ENV).ok().map(PathBuf::from);

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;

        let config_dir = override_config
            .clone()
            .map(|p| {
                if p.is_dir() {
                    p
                } else {
                    p.parent().map(Path::to_path_buf).unwrap_or(p)
                }
            })
            .unwrap_or_else(|| project_dirs.config_dir().to_path_buf());

        let config_file = override_config
            .filter(|p| p.is_file() || p.extension().is_some())
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let data_dir = override_data.unwrap_or_else(|| project_dirs.data_dir().to_path_buf());
        let state_dir = project_dirs
            .state_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_dir.join("state"));

        Ok(Self::from_roots(config_dir, config_file, data_dir, state_dir))
    }

    /// Lays out every path below a single root directory.
    pub fn rooted(root: &Path) -> Self {
        let config_dir = root.join("config");
        let config_file = config_dir.join("config.toml");
        Self::from_roots(config_dir, config_file, root.join("data"), root.join("state"))
    }

    fn from_roots(
        config_dir: PathBuf,
        config_file: PathBuf,
        data_dir: PathBuf,
        state_dir: PathBuf,
    ) -> Self {
        let log_dir = state_dir.join("logs");
        let local_storage_file = data_dir.join("local_storage.json");
        Self {
            config_dir,
            config_file,
            data_dir,
            state_dir,
            log_dir,
            local_storage_file,
        }
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.data_dir, &self.state_dir, &self.log_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating application directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppConfig {
    pub limits: Limits,
    pub ui: UiOptions,
}

impl AppConfig {
    /// Overlays the recognised keys of a parsed config file onto `self`.
    /// Values of the wrong type keep their default; unknown keys are ignored.
    /// Both are logged.
    fn apply_table(&mut self, table: &Table) {
        for (section, value) in table {
            let Some(entries) = value.as_table() else {
                tracing::warn!("config key {section} is not a table, ignoring it");
                continue;
            };
            for (key, value) in entries {
                match (section.as_str(), key.as_str()) {
                    ("limits", "title_max") => {
                        read_field(section, key, value, &mut self.limits.title_max)
                    }
                    ("limits", "body_max") => {
                        read_field(section, key, value, &mut self.limits.body_max)
                    }
                    ("ui", "timestamp_format") => {
                        read_field(section, key, value, &mut self.ui.timestamp_format)
                    }
                    ("ui", "highlight_matches") => {
                        read_field(section, key, value, &mut self.ui.highlight_matches)
                    }
                    _ => tracing::warn!("unknown config key {section}.{key}, ignoring it"),
                }
            }
        }
    }

    fn post_load(&mut self) {
        let defaults = Limits::default();
        if self.limits.title_max == 0 {
            tracing::warn!("limits.title_max must be positive, using {}", defaults.title_max);
            self.limits.title_max = defaults.title_max;
        }
        if self.limits.body_max == 0 {
            tracing::warn!("limits.body_max must be positive, using {}", defaults.body_max);
            self.limits.body_max = defaults.body_max;
        }
        if let Err(err) = TimestampFormat::parse(&self.ui.timestamp_format) {
            tracing::warn!(?err, "invalid ui.timestamp_format, falling back to default");
            self.ui.timestamp_format = DEFAULT_TIMESTAMP_FORMAT.to_string();
        }
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            timestamp_format: TimestampFormat::parse(&self.ui.timestamp_format)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UiOptions {
    pub timestamp_format: String,
    pub highlight_matches: bool,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            highlight_matches: true,
        }
    }
}

fn read_field<T: DeserializeOwned>(section: &str, key: &str, value: &Value, slot: &mut T) {
    match value.clone().try_into::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(err) => tracing::warn!(%err, "invalid {section}.{key}, keeping the default"),
    }
}
