//! Initialisation du système de logging

use anyhow::{anyhow, Result};
use pmoconfig::Config;
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Registry};

/// Installe le subscriber global d'après la section `logger` de la configuration
///
/// Le niveau vient de `logger.min_level` (TRACE si la valeur n'est pas
/// reconnue), la sortie console de `logger.enable_console`. Retourne le filtre
/// retenu, ou une erreur si un subscriber global est déjà installé.
pub fn init_logging(config: &Config) -> Result<LevelFilter> {
    let level = match config.get_log_min_level() {
        Ok(l) => match string_to_level(&l) {
            Some(lev) => LevelFilter::from_level(lev),
            None => LevelFilter::TRACE,
        },
        Err(_) => LevelFilter::TRACE,
    };

    let enable_console = config.get_log_enable_console().unwrap_or(true);

    let console = enable_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
    });

    Registry::default()
        .with(level)
        .with(console)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!(level = %level, console = enable_console, "Logging initialized");
    Ok(level)
}

pub(crate) fn string_to_level(s: &str) -> Option<Level> {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_level() {
        assert_eq!(string_to_level("debug"), Some(Level::DEBUG));
        assert_eq!(string_to_level(" WARN "), Some(Level::WARN));
        assert_eq!(string_to_level("verbose"), None);
    }

    #[test]
    fn test_init_logging_once() {
        let config = Config::from_yaml_str("logger:\n  min_level: DEBUG\n  enable_console: false\n").unwrap();
        assert_eq!(init_logging(&config).unwrap(), LevelFilter::DEBUG);
        assert!(init_logging(&config).is_err());
    }
}
