//! Extension de pmoconfig pour le moteur de lecture

use crate::engine::{EngineSettings, PlaybackEngine};
use anyhow::Result;
use pmoconfig::Config;
use std::time::Duration;

/// Trait d'extension pour pmoconfig::Config
///
/// # Exemple
///
/// ```rust
/// use pmoconfig::Config;
/// use pmoengine::EngineConfigExt;
///
/// let config = Config::from_yaml_str("engine:\n  frame_interval_ms: 0\n")?;
/// let settings = config.engine_settings()?;
/// assert!(settings.frame_interval.is_zero());
/// assert_eq!(settings.progress_every, 10);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub trait EngineConfigExt {
    /// Lit `engine.frame_interval_ms`, `engine.progress_every` et
    /// `processor.latency_ms`
    fn engine_settings(&self) -> Result<EngineSettings>;

    /// Écrit les réglages dans la configuration
    fn set_engine_settings(&self, settings: &EngineSettings) -> Result<()>;

    /// Construit un moteur avec un processeur, réglé d'après la configuration
    fn create_engine(&self) -> Result<PlaybackEngine>;
}

impl EngineConfigExt for Config {
    fn engine_settings(&self) -> Result<EngineSettings> {
        Ok(EngineSettings {
            frame_interval: Duration::from_millis(self.get_frame_interval_ms()?),
            progress_every: self.get_progress_every()?,
            processor_latency: Duration::from_millis(self.get_processor_latency_ms()?),
        })
    }

    fn set_engine_settings(&self, settings: &EngineSettings) -> Result<()> {
        self.set_frame_interval_ms(settings.frame_interval.as_millis() as u64)?;
        self.set_progress_every(settings.progress_every)?;
        self.set_processor_latency_ms(settings.processor_latency.as_millis() as u64)
    }

    fn create_engine(&self) -> Result<PlaybackEngine> {
        let settings = self.engine_settings()?;
        tracing::debug!(?settings, "Creating playback engine");
        Ok(PlaybackEngine::with_processor(settings))
    }
}

impl PlaybackEngine {
    /// Raccourci pour [`EngineConfigExt::create_engine`]
    pub fn from_config(config: &Config) -> Result<Self> {
        config.create_engine()
    }
}
