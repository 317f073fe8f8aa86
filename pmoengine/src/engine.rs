//! PlaybackEngine : façade unique de lecture
//!
//! Le moteur ouvre l'étage le plus externe d'un pipeline, tire les frames une
//! à une jusqu'à la fin de flux, les transmet au [`Sink`] actif puis ferme le
//! pipeline. Il tient aussi le rôle de gestionnaire de playlists : il compte
//! les playlists jouées et sait si l'une d'elles est en cours.

use crate::error::{EngineError, Result};
use crate::sink::{CountingProcessor, Sink};
use pmoplaylist::{Player, Playlist};
use pmosource::FrameSource;
use std::time::{Duration, Instant};

/// Réglages de cadence du moteur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Pause après chaque frame
    pub frame_interval: Duration,
    /// Trace de progression toutes les N frames (0 : jamais)
    pub progress_every: usize,
    /// Latence du [`CountingProcessor`] construit par
    /// [`PlaybackEngine::with_processor`] (et donc `from_config`)
    ///
    /// Sans effet avec [`PlaybackEngine::with_settings`] : le sink fourni
    /// garde sa propre latence.
    pub processor_latency: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(50),
            progress_every: 10,
            processor_latency: Duration::from_millis(10),
        }
    }
}

impl EngineSettings {
    /// Réglages sans aucune pause, pour les tests et les traitements par lot
    pub fn unpaced() -> Self {
        Self {
            frame_interval: Duration::ZERO,
            processor_latency: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Bilan d'une lecture complète
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Identité de l'étage externe joué
    pub identity: String,
    pub frames: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct PlaylistActivity {
    active: bool,
    managed: usize,
}

impl PlaylistActivity {
    fn status(&self) -> String {
        if self.active {
            "Managing Playlist".to_string()
        } else {
            format!("Ready ({} managed)", self.managed)
        }
    }
}

/// Moteur de lecture
#[derive(Debug)]
pub struct PlaybackEngine {
    sink: Sink,
    settings: EngineSettings,
    playlists: PlaylistActivity,
}

impl PlaybackEngine {
    pub fn new(sink: Sink) -> Self {
        Self::with_settings(sink, EngineSettings::default())
    }

    /// Moteur avec un sink déjà construit
    ///
    /// Seules la cadence et la progression de `settings` s'appliquent ;
    /// `processor_latency` est ignorée.
    pub fn with_settings(sink: Sink, settings: EngineSettings) -> Self {
        Self {
            sink,
            settings,
            playlists: PlaylistActivity::default(),
        }
    }

    /// Moteur avec un [`CountingProcessor`], réglé d'après `settings`
    pub fn with_processor(settings: EngineSettings) -> Self {
        let processor = CountingProcessor::new(settings.processor_latency);
        Self::with_settings(Sink::processor(processor), settings)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut Sink {
        &mut self.sink
    }

    /// Remplace le sink actif et retourne le précédent
    ///
    /// Ne doit pas être appelé pendant une lecture : `play` emprunte le moteur
    /// mutablement, le remplacement a donc toujours lieu entre deux lectures.
    pub fn set_sink(&mut self, sink: Sink) -> Sink {
        let previous = std::mem::replace(&mut self.sink, sink);
        tracing::info!(
            from = %previous.description(),
            to = %self.sink.description(),
            "Switching active sink"
        );
        previous
    }

    pub fn active_sink_description(&self) -> String {
        self.sink.description()
    }

    /// Joue `source` jusqu'à la fin de flux
    ///
    /// Sur une erreur de lecture, la source est fermée au mieux puis l'erreur
    /// est retournée.
    pub fn play(&mut self, source: &mut dyn FrameSource) -> Result<PlaybackReport> {
        let identity = source.identity().to_string();
        let started = Instant::now();
        tracing::info!(source = %identity, "Playing");

        source.open()?;

        let mut frames = 0usize;
        loop {
            let frame = match source.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(err) => {
                    tracing::error!(source = %identity, frames, "Playback aborted: {}", err);
                    if let Err(close_err) = source.close() {
                        tracing::warn!(source = %identity, "Failed to close source: {}", close_err);
                    }
                    return Err(EngineError::Source(err));
                }
            };

            self.sink.handle(&frame);
            frames += 1;

            if self.settings.progress_every > 0 && frames % self.settings.progress_every == 0 {
                tracing::debug!(source = %identity, frames, "Playback progress");
            }
            if !self.settings.frame_interval.is_zero() {
                std::thread::sleep(self.settings.frame_interval);
            }
        }

        source.close()?;

        let report = PlaybackReport {
            identity,
            frames,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            source = %report.identity,
            frames = report.frames,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "[DONE]"
        );
        Ok(report)
    }

    /// Joue une playlist complète, dans l'ordre d'insertion
    pub fn play_playlist(&mut self, playlist: &mut Playlist) -> Result<()> {
        self.playlists.active = true;
        self.playlists.managed += 1;
        tracing::info!(
            playlist = %playlist.title(),
            items = playlist.child_count(),
            "Starting playlist"
        );

        let result = playlist.play(self);

        self.playlists.active = false;
        match &result {
            Ok(()) => tracing::info!(playlist = %playlist.title(), "Playlist completed successfully"),
            Err(err) => tracing::error!(playlist = %playlist.title(), "Playlist stopped: {}", err),
        }
        result
    }

    /// Statut du gestionnaire de playlists seul
    pub fn playlist_status(&self) -> String {
        self.playlists.status()
    }

    /// `"MediaEngine: Active | <sink> | PlaylistManager: <statut>"`
    pub fn system_status(&self) -> String {
        format!(
            "MediaEngine: Active | {} | PlaylistManager: {}",
            self.sink.description(),
            self.playlists.status()
        )
    }

    /// Remet à zéro le compteur de playlists
    pub fn reset_playlist_manager(&mut self) {
        self.playlists = PlaylistActivity::default();
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::with_processor(EngineSettings::default())
    }
}

impl Player for PlaybackEngine {
    type Error = EngineError;

    fn play_source(&mut self, source: &mut dyn FrameSource) -> Result<()> {
        self.play(source).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::TracingRenderer;
    use pmosource::{MediaSource, SourceKind};

    fn unpaced_engine() -> PlaybackEngine {
        PlaybackEngine::with_processor(EngineSettings::unpaced())
    }

    #[test]
    fn test_play_counts_frames_per_kind() {
        let mut engine = unpaced_engine();
        for (kind, expected) in [(SourceKind::Local, 3), (SourceKind::Stream, 5), (SourceKind::Api, 4)] {
            let mut source = MediaSource::new(kind, "x");
            let report = engine.play(&mut source).unwrap();
            assert_eq!(report.frames, expected);
            assert_eq!(report.identity, source.identity());
        }
        assert_eq!(engine.active_sink_description(), "Processor: Processing (12 frames)");
    }

    #[test]
    fn test_initial_status() {
        let engine = unpaced_engine();
        assert_eq!(
            engine.system_status(),
            "MediaEngine: Active | Processor: Idle | PlaylistManager: Ready (0 managed)"
        );
    }

    #[test]
    fn test_set_sink_returns_previous() {
        let mut engine = unpaced_engine();
        let previous = engine.set_sink(Sink::renderer(TracingRenderer::new("Screen")));
        assert!(previous.is_processor());
        assert_eq!(engine.active_sink_description(), "Renderer: Screen");

        let mut source = MediaSource::api("1");
        engine.play(&mut source).unwrap();
        assert_eq!(engine.active_sink_description(), "Renderer: Screen");
    }

    #[test]
    fn test_processor_latency_applies_to_built_processor_only() {
        let settings = EngineSettings {
            frame_interval: Duration::ZERO,
            progress_every: 10,
            processor_latency: Duration::from_millis(20),
        };

        let mut built = PlaybackEngine::with_processor(settings);
        let report = built.play(&mut MediaSource::local("a")).unwrap();
        assert!(report.elapsed >= Duration::from_millis(60));

        let mut supplied = PlaybackEngine::with_settings(
            Sink::processor(CountingProcessor::new(Duration::ZERO)),
            settings,
        );
        assert_eq!(supplied.settings().processor_latency, Duration::from_millis(20));
        let report = supplied.play(&mut MediaSource::local("a")).unwrap();
        assert!(report.elapsed < Duration::from_millis(60));
    }

    #[test]
    fn test_frame_interval_paces_playback() {
        let settings = EngineSettings {
            frame_interval: Duration::from_millis(10),
            processor_latency: Duration::ZERO,
            ..EngineSettings::default()
        };
        let mut engine = PlaybackEngine::with_processor(settings);
        let report = engine.play(&mut MediaSource::local("a")).unwrap();
        assert!(report.elapsed >= Duration::from_millis(30));
    }
}
