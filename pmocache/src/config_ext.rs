//! Extension pour intégrer le magasin de frames dans pmoconfig
//!
//! Ce module fournit le trait `FrameCacheConfigExt` qui ajoute à
//! `pmoconfig::Config` la lecture de la politique de remplissage et la
//! construction d'un [`FrameStore`] configuré.

use crate::{FillMode, FrameStore};
use anyhow::{anyhow, Result};
use pmoconfig::Config;
use serde_yaml::Value;
use std::sync::Arc;

/// Trait d'extension pour ajouter la configuration du cache de frames
///
/// # Exemple
///
/// ```rust,ignore
/// use pmoconfig::get_config;
/// use pmocache::FrameCacheConfigExt;
///
/// let config = get_config();
/// let store = config.create_frame_store()?;
/// ```
pub trait FrameCacheConfigExt {
    /// Récupère la politique de remplissage (`cache.fill_mode`)
    ///
    /// Retourne [`FillMode::Guarded`] si la clé est absente, une erreur si
    /// la valeur n'est pas reconnue.
    fn get_cache_fill_mode(&self) -> Result<FillMode>;

    /// Définit la politique de remplissage
    fn set_cache_fill_mode(&self, mode: FillMode) -> Result<()>;

    /// Crée un magasin vide configuré, prêt à être partagé
    fn create_frame_store(&self) -> Result<Arc<FrameStore>>;
}

impl FrameCacheConfigExt for Config {
    fn get_cache_fill_mode(&self) -> Result<FillMode> {
        match self.get_value(&["cache", "fill_mode"]) {
            Ok(Value::String(s)) => s.parse::<FillMode>().map_err(|e| anyhow!(e)),
            Ok(other) => Err(anyhow!("cache.fill_mode must be a string, got {:?}", other)),
            Err(_) => Ok(FillMode::default()),
        }
    }

    fn set_cache_fill_mode(&self, mode: FillMode) -> Result<()> {
        self.set_value(&["cache", "fill_mode"], Value::String(mode.as_str().to_string()))
    }

    fn create_frame_store(&self) -> Result<Arc<FrameStore>> {
        let mode = self.get_cache_fill_mode()?;
        tracing::info!(mode = %mode, "Creating frame store");
        Ok(FrameStore::shared(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fill_mode_is_guarded() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.get_cache_fill_mode().unwrap(), FillMode::Guarded);
    }

    #[test]
    fn test_fill_mode_round_trip() {
        let config = Config::from_yaml_str("{}").unwrap();
        config.set_cache_fill_mode(FillMode::Unguarded).unwrap();
        let store = config.create_frame_store().unwrap();
        assert_eq!(store.mode(), FillMode::Unguarded);
    }

    #[test]
    fn test_invalid_fill_mode() {
        let config = Config::from_yaml_str("cache:\n  fill_mode: maybe\n").unwrap();
        assert!(config.get_cache_fill_mode().is_err());
        assert!(config.create_frame_store().is_err());
    }
}
