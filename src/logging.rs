//! File logging. The terminal belongs to the UI, so events go to
//! `<data dir>/outlinetodo.log`.

use std::{fs::OpenOptions, sync::Mutex};

use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LOG_ENV};

/// `OUTLINETODO_LOG` wins over `[log] level`.
pub fn env_filter(config: &Config) -> Result<EnvFilter> {
    filter_from(&directive(std::env::var(LOG_ENV).ok(), config))
}

pub fn filter_from(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive).wrap_err_with(|| format!("invalid log filter `{directive}`"))
}

fn directive(from_env: Option<String>, config: &Config) -> String {
    from_env
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| config.log.level.clone())
}

pub fn init_logging(config: &Config) -> Result<()> {
    let filter = env_filter(config)?;
    std::fs::create_dir_all(config.data_dir())
        .wrap_err_with(|| format!("creating {}", config.data_dir().display()))?;
    let log_path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .wrap_err_with(|| format!("opening log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| eyre!("installing log subscriber: {err}"))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.data_dir().display(),
        "logging started"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_level() {
        assert!(filter_from("outlinetodo=notalevel").is_err());
    }

    #[test]
    fn accepts_module_directives() {
        assert!(filter_from("warn,outlinetodo::store=debug").is_ok());
    }

    #[test]
    fn environment_overrides_config_level() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from(dir.path()).unwrap();
        config.log.level = "warn".to_string();

        assert_eq!(directive(None, &config), "warn");
        assert_eq!(directive(Some("  ".into()), &config), "warn");
        assert_eq!(directive(Some("debug".into()), &config), "debug");
    }
}
