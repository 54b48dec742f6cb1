// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TABULA_LOG";

/// `TABULA_LOG` wins over the configured filter.
pub fn resolve_filter(env_value: Option<&str>, configured: &str) -> Result<EnvFilter> {
    let (source, directives) = match env_value.map(str::trim) {
        Some(value) if !value.is_empty() => (LOG_ENV, value),
        _ => ("[log].filter", configured),
    };
    EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter {directives:?} from {source}"))
}

/// Sends tracing output to `file`; the terminal belongs to the table UI.
pub fn init(configured_filter: &str, file: &Path) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = resolve_filter(env_value.as_deref(), configured_filter)?;

    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let writer = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .with_context(|| {
            format!(
                "open log file {}; set [log].file to a writable path",
                file.display()
            )
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(writer))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[cfg(test)]
mod tests {
    use super::resolve_filter;
    use anyhow::Result;

    #[test]
    fn env_value_overrides_configured_filter() -> Result<()> {
        let filter = resolve_filter(Some("tabula_core=debug"), "info")?;
        assert_eq!(filter.to_string(), "tabula_core=debug");
        Ok(())
    }

    #[test]
    fn blank_env_value_falls_back_to_config() -> Result<()> {
        let filter = resolve_filter(Some("  "), "warn")?;
        assert_eq!(filter.to_string(), "warn");
        let filter = resolve_filter(None, "warn")?;
        assert_eq!(filter.to_string(), "warn");
        Ok(())
    }

    #[test]
    fn invalid_filter_names_its_source() {
        let error = resolve_filter(None, "tabula=notalevel").expect_err("bad level should fail");
        assert!(error.to_string().contains("[log].filter"));
    }
}
