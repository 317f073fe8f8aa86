//! # PMOMedia Configuration Module
//!
//! This module provides configuration management for PMOMedia, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use pmoconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let interval = config.get_frame_interval_ms()?;
//!
//! // Update configuration values
//! config.set_frame_interval_ms(0)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Les autres crates étendent [`Config`] avec leurs propres traits
//! (`FrameCacheConfigExt`, `EngineConfigExt`).

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmomedia.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> = Arc::new(match Config::load_config("") {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to load PMOMedia configuration ({}), using defaults", err);
            Config::in_memory()
        }
    });
}

const ENV_CONFIG_DIR: &str = "PMOMEDIA_CONFIG";
const ENV_PREFIX: &str = "PMOMEDIA_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmomedia";

// Default values for configuration
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;
const DEFAULT_FRAME_INTERVAL_MS: u64 = 50;
const DEFAULT_PROGRESS_EVERY: usize = 10;
const DEFAULT_PROCESSOR_LATENCY_MS: u64 = 10;

/// Macro to generate getter/setter for usize values with default
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<usize> {
            match self.get_value($path) {
                Ok(Value::Number(n)) => Ok(n.as_u64().map(|v| v as usize).unwrap_or($default)),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, size: usize) -> Result<()> {
            let n = Number::from(size);
            self.set_value($path, Value::Number(n))
        }
    };
}

/// Macro to generate getter/setter for millisecond values with default
macro_rules! impl_millis_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<u64> {
            match self.get_value($path) {
                Ok(Value::Number(n)) => Ok(n.as_u64().unwrap_or($default)),
                Ok(Value::String(s)) => s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| anyhow!("Invalid value '{}' for {}: {}", s, $path.join("."), e)),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, millis: u64) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(millis)))
        }
    };
}

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Configuration manager for PMOMedia
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
///
/// Une configuration construite avec [`Config::in_memory`] n'a pas de
/// fichier associé : [`Config::save`] ne fait alors rien.
#[derive(Debug)]
pub struct Config {
    config_dir: Option<String>,
    path: Option<String>,
    data: Mutex<Value>,
}

// Implémentation manuelle de Clone
impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.lock_data().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        CONFIG_DIR_NAME.to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!(
                "Le chemin spécifié n'est pas un répertoire: {}",
                path.display()
            ));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMOMEDIA_CONFIG` environment variable
    /// 3. `.pmomedia` in the current directory
    /// 4. `.pmomedia` in the user's home directory
    ///
    /// The directory is created if it doesn't exist.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir=%config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        if let Ok(data) = fs::read(&path) {
            info!(config_file=%path, "Loaded config file");
            let external_value: Value = serde_yaml::from_slice(&data)?;
            merge_yaml(&mut config_value, &Self::lower_keys_value(external_value));
        } else {
            info!(config_file=%path, "Config file not found, using default embedded config");
        }

        let mut config_value = Self::lower_keys_value(config_value);
        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir: Some(config_dir),
            path: Some(path),
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Construit une configuration sans fichier
    ///
    /// Seules la configuration intégrée et les variables d'environnement
    /// `PMOMEDIA_CONFIG__*` sont prises en compte.
    pub fn in_memory() -> Self {
        let mut value = serde_yaml::from_str::<Value>(DEFAULT_CONFIG)
            .map(Self::lower_keys_value)
            .unwrap_or_else(|_| Value::Mapping(Mapping::new()));
        Self::apply_env_overrides(&mut value);

        Config {
            config_dir: None,
            path: None,
            data: Mutex::new(value),
        }
    }

    /// Construit une configuration à partir d'un document YAML fusionné
    /// par-dessus la configuration intégrée, sans fichier associé
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut value = Self::lower_keys_value(serde_yaml::from_str(DEFAULT_CONFIG)?);
        let external = Self::lower_keys_value(serde_yaml::from_str(yaml)?);
        merge_yaml(&mut value, &external);

        Ok(Config {
            config_dir: None,
            path: None,
            data: Mutex::new(value),
        })
    }

    /// Répertoire de configuration, absent pour une configuration en mémoire
    pub fn directory(&self) -> Option<&str> {
        self.config_dir.as_deref()
    }

    fn lock_data(&self) -> MutexGuard<'_, Value> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let yaml = serde_yaml::to_string(&*self.lock_data())?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["engine", "frame_interval_ms"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock_data();
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock_data();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                if let Some(next) = map.get(&Value::String(key.to_lowercase())) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    /// Récupère une valeur textuelle, ou `default` si absente ou non textuelle
    pub fn get_string_or(&self, path: &[&str], default: &str) -> String {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            _ => default.to_string(),
        }
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    let new_key = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    new_map.insert(new_key, Self::lower_keys_value(v));
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    impl_millis_config!(
        get_frame_interval_ms,
        set_frame_interval_ms,
        &["engine", "frame_interval_ms"],
        DEFAULT_FRAME_INTERVAL_MS
    );

    impl_usize_config!(
        get_progress_every,
        set_progress_every,
        &["engine", "progress_every"],
        DEFAULT_PROGRESS_EVERY
    );

    impl_millis_config!(
        get_processor_latency_ms,
        set_processor_latency_ms,
        &["processor", "latency_ms"],
        DEFAULT_PROCESSOR_LATENCY_MS
    );

    /// Récupère le niveau de log minimum depuis la configuration
    pub fn get_log_min_level(&self) -> Result<String> {
        Ok(self.get_string_or(&["logger", "min_level"], DEFAULT_LOG_MIN_LEVEL))
    }

    /// Définit le niveau de log minimum dans la configuration
    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["logger", "min_level"], Value::String(level))
    }
}

/// Returns the global configuration instance
///
/// The instance is lazily loaded on first access. If the configuration
/// directory cannot be used, the embedded defaults are used instead.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.get_frame_interval_ms().unwrap(), 50);
        assert_eq!(config.get_progress_every().unwrap(), 10);
        assert_eq!(config.get_processor_latency_ms().unwrap(), 10);
        assert_eq!(config.get_log_min_level().unwrap(), "INFO");
        assert!(config.get_log_enable_console().unwrap());
        assert!(config.directory().is_none());
    }

    #[test]
    fn test_yaml_overrides_are_merged() {
        let config = Config::from_yaml_str(
            "Engine:\n  Frame_Interval_Ms: 0\nprocessor:\n  latency_ms: 3\n",
        )
        .unwrap();
        assert_eq!(config.get_frame_interval_ms().unwrap(), 0);
        assert_eq!(config.get_processor_latency_ms().unwrap(), 3);
        // Les clés non surchargées gardent leur valeur par défaut
        assert_eq!(config.get_progress_every().unwrap(), 10);
    }

    #[test]
    fn test_set_and_get_value() {
        let config = Config::from_yaml_str("{}").unwrap();
        config.set_frame_interval_ms(7).unwrap();
        assert_eq!(config.get_frame_interval_ms().unwrap(), 7);

        config
            .set_value(&["custom", "nested", "key"], Value::String("v".into()))
            .unwrap();
        assert_eq!(
            config.get_value(&["CUSTOM", "nested", "key"]).unwrap(),
            Value::String("v".into())
        );
        assert!(config.get_value(&["custom", "missing"]).is_err());
    }

    #[test]
    fn test_invalid_millis_string_is_an_error() {
        let config = Config::from_yaml_str("engine:\n  frame_interval_ms: soon\n").unwrap();
        assert!(config.get_frame_interval_ms().is_err());
    }

    #[test]
    fn test_merge_yaml_replaces_scalars() {
        let mut base: Value = serde_yaml::from_str("a: 1\nb:\n  c: 2\n").unwrap();
        let ext: Value = serde_yaml::from_str("b:\n  c: 3\n  d: 4\n").unwrap();
        merge_yaml(&mut base, &ext);
        let expected: Value = serde_yaml::from_str("a: 1\nb:\n  c: 3\n  d: 4\n").unwrap();
        assert_eq!(base, expected);
    }
}
