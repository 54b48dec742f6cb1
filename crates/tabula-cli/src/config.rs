// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tabula_core::{
    ColumnDefinition, DEFAULT_COLUMN_WIDTH, DEFAULT_MAX_WIDTH, DEFAULT_MIN_WIDTH,
    DEFAULT_PAGE_SIZE, DEFAULT_PAGE_WINDOW, LARGE_SELECTION_THRESHOLD, TableConfig,
};

const CONFIG_VERSION: i64 = 1;
const CONFIG_PATH_ENV: &str = "TABULA_CONFIG_PATH";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            table: Table::default(),
            storage: Storage::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    pub page_size: Option<i64>,
    pub page_window: Option<i64>,
    pub default_column_width: Option<i64>,
    pub min_column_width: Option<i64>,
    pub max_column_width: Option<i64>,
    pub large_selection_threshold: Option<i64>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE as i64),
            page_window: Some(i64::from(DEFAULT_PAGE_WINDOW)),
            default_column_width: Some(i64::from(DEFAULT_COLUMN_WIDTH)),
            min_column_width: Some(i64::from(DEFAULT_MIN_WIDTH)),
            max_column_width: Some(i64::from(DEFAULT_MAX_WIDTH)),
            large_selection_threshold: Some(LARGE_SELECTION_THRESHOLD as i64),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub filter: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(tabula_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and keep values under [table], [storage], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let positive = [
            ("table.page_size", self.table.page_size),
            ("table.default_column_width", self.table.default_column_width),
            ("table.min_column_width", self.table.min_column_width),
            ("table.max_column_width", self.table.max_column_width),
            (
                "table.large_selection_threshold",
                self.table.large_selection_threshold,
            ),
        ];
        for (name, value) in positive {
            if let Some(value) = value
                && value <= 0
            {
                bail!(
                    "{name} in {} must be positive, got {value}",
                    path.display()
                );
            }
        }

        if let Some(window) = self.table.page_window
            && window < 0
        {
            bail!(
                "table.page_window in {} must be non-negative, got {window}",
                path.display()
            );
        }

        let narrow = [
            ("table.page_window", self.table.page_window),
            ("table.default_column_width", self.table.default_column_width),
            ("table.min_column_width", self.table.min_column_width),
            ("table.max_column_width", self.table.max_column_width),
        ];
        for (name, value) in narrow {
            if let Some(value) = value
                && u32::try_from(value).is_err()
            {
                bail!(
                    "{name} in {} must be at most {}, got {value}",
                    path.display(),
                    u32::MAX
                );
            }
        }
        let counts = [
            ("table.page_size", self.table.page_size),
            (
                "table.large_selection_threshold",
                self.table.large_selection_threshold,
            ),
        ];
        for (name, value) in counts {
            if let Some(value) = value
                && usize::try_from(value).is_err()
            {
                bail!(
                    "{name} in {} must be at most {}, got {value}",
                    path.display(),
                    usize::MAX
                );
            }
        }

        let (min, default, max) = (
            self.min_column_width(),
            self.default_column_width(),
            self.max_column_width(),
        );
        if !(min <= default && default <= max) {
            bail!(
                "column widths in {} must satisfy min_column_width <= default_column_width <= max_column_width, got {min} <= {default} <= {max}",
                path.display()
            );
        }

        if let Some(db_path) = &self.storage.db_path {
            tabula_store::validate_db_path(db_path)?;
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => tabula_store::default_db_path(),
        }
    }

    pub fn table_config(&self) -> TableConfig {
        TableConfig {
            page_size: to_usize(self.table.page_size, DEFAULT_PAGE_SIZE),
            page_window: to_u32(self.table.page_window, DEFAULT_PAGE_WINDOW),
            large_selection_threshold: to_usize(
                self.table.large_selection_threshold,
                LARGE_SELECTION_THRESHOLD,
            ),
        }
    }

    pub fn default_column_width(&self) -> u32 {
        to_u32(self.table.default_column_width, DEFAULT_COLUMN_WIDTH)
    }

    pub fn min_column_width(&self) -> u32 {
        to_u32(self.table.min_column_width, DEFAULT_MIN_WIDTH)
    }

    pub fn max_column_width(&self) -> u32 {
        to_u32(self.table.max_column_width, DEFAULT_MAX_WIDTH)
    }

    /// Fills in the configured width and bounds wherever a definition
    /// still carries the built-in defaults.
    pub fn apply_column_defaults(
        &self,
        definitions: Vec<ColumnDefinition>,
    ) -> Vec<ColumnDefinition> {
        definitions
            .into_iter()
            .map(|mut definition| {
                if definition.min_width == DEFAULT_MIN_WIDTH {
                    definition.min_width = self.min_column_width();
                }
                if definition.max_width == DEFAULT_MAX_WIDTH {
                    definition.max_width = self.max_column_width();
                }
                if definition.width.is_none() {
                    definition.width = Some(self.default_column_width());
                }
                definition
            })
            .collect()
    }

    pub fn log_filter(&self) -> &str {
        self.log.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file to a writable log path")
        })?;
        Ok(data_root.join(tabula_store::APP_NAME).join("tabula.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# tabula config\n# Place this file at: {}\n\nversion = 1\n\n[table]\npage_size = {}\npage_window = {}\ndefault_column_width = {}\nmin_column_width = {}\nmax_column_width = {}\nlarge_selection_threshold = {}\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/tabula/tabula.db)\n# db_path = \"/absolute/path/to/tabula.db\"\n\n[log]\n# TABULA_LOG overrides this filter\nfilter = \"{}\"\n# file = \"/absolute/path/to/tabula.log\"\n",
            path.display(),
            DEFAULT_PAGE_SIZE,
            DEFAULT_PAGE_WINDOW,
            DEFAULT_COLUMN_WIDTH,
            DEFAULT_MIN_WIDTH,
            DEFAULT_MAX_WIDTH,
            LARGE_SELECTION_THRESHOLD,
            DEFAULT_LOG_FILTER,
        )
    }
}

fn to_usize(value: Option<i64>, fallback: usize) -> usize {
    value
        .and_then(|value| usize::try_from(value).ok())
        .unwrap_or(fallback)
}

fn to_u32(value: Option<i64>, fallback: u32) -> u32 {
    value
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use tabula_core::{ColumnDefinition, ColumnType, DEFAULT_COLUMN_WIDTH};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        let table = config.table_config();
        assert_eq!(table.page_size, 25);
        assert_eq!(table.page_window, 2);
        assert_eq!(table.large_selection_threshold, 1000);
        assert_eq!(config.log_filter(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[table]\npage_size = 10\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[table], [storage], and [log]"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[table]\npage_size = 50\npage_window = 3\nmax_column_width = 800\nlarge_selection_threshold = 200\n[log]\nfilter = \"tabula_core=debug\"\n",
        )?;
        let config = Config::load(&path)?;
        let table = config.table_config();
        assert_eq!(table.page_size, 50);
        assert_eq!(table.page_window, 3);
        assert_eq!(table.large_selection_threshold, 200);
        assert_eq!(config.max_column_width(), 800);
        assert_eq!(config.log_filter(), "tabula_core=debug");
        Ok(())
    }

    #[test]
    fn non_positive_page_size_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[table]\npage_size = 0\n")?;
        let error = Config::load(&path).expect_err("zero page size should fail");
        let message = error.to_string();
        assert!(message.contains("table.page_size"));
        assert!(message.contains("must be positive"));
        Ok(())
    }

    #[test]
    fn inverted_width_bounds_are_rejected() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[table]\nmin_column_width = 300\nmax_column_width = 200\n")?;
        let error = Config::load(&path).expect_err("min above max should fail");
        assert!(error.to_string().contains("min_column_width <= default_column_width"));
        Ok(())
    }

    #[test]
    fn oversized_width_is_rejected_instead_of_defaulted() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[table]\nmax_column_width = 5000000000\n")?;
        let error = Config::load(&path).expect_err("width beyond u32 should fail");
        let message = error.to_string();
        assert!(message.contains("table.max_column_width"));
        assert!(message.contains("5000000000"));
        Ok(())
    }

    #[test]
    fn db_path_rejects_uri_style_storage_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"https://evil.example/tabula.db\"\n")?;
        let error = Config::load(&path).expect_err("URI db_path should fail validation");
        let message = error.to_string();
        assert!(
            message.contains("looks like a URI") || message.contains("filesystem path"),
            "unexpected message: {message}"
        );
        Ok(())
    }

    #[test]
    fn db_path_prefers_storage_config() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"/explicit/from-config.db\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.db_path()?, PathBuf::from("/explicit/from-config.db"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TABULA_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TABULA_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn log_file_prefers_configured_path() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nfile = \"/var/tmp/tabula.log\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.log_file()?, PathBuf::from("/var/tmp/tabula.log"));
        Ok(())
    }

    #[test]
    fn column_defaults_fill_unset_widths_only() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[table]\ndefault_column_width = 120\nmin_column_width = 60\n",
        )?;
        let config = Config::load(&path)?;
        let definitions = config.apply_column_defaults(vec![
            ColumnDefinition::new("name", "Name", ColumnType::Text),
            ColumnDefinition::new("notes", "Notes", ColumnType::Text).with_width(300),
        ]);
        assert_eq!(definitions[0].width, Some(120));
        assert_eq!(definitions[0].min_width, 60);
        assert_eq!(definitions[1].width, Some(300));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[table]"));
        assert!(example.contains("[storage]"));
        assert!(example.contains("[log]"));

        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.default_column_width(), DEFAULT_COLUMN_WIDTH);
        Ok(())
    }
}
