//! # pmoengine - Moteur de lecture PMOMedia
//!
//! Cette crate assemble les autres briques : elle joue des pipelines
//! `pmosource` (éventuellement mis en cache par `pmocache`) et des playlists
//! `pmoplaylist`, et transmet chaque frame au sink actif.
//!
//! ## Architecture
//!
//! ```text
//! pmoengine
//!     ├── engine.rs      - PlaybackEngine : lecture, playlists, statut
//!     ├── sink/          - FrameProcessor, FrameRenderer et le sink actif
//!     ├── config_ext.rs  - Réglages du moteur dans pmoconfig
//!     └── logging.rs     - Subscriber tracing global
//! ```
//!
//! ## Utilisation
//!
//! ```rust
//! use pmoengine::{EngineSettings, PlaybackEngine, Sink, TracingRenderer};
//! use pmoplaylist::Playlist;
//! use pmosource::{MediaSource, Pipeline};
//!
//! let mut engine = PlaybackEngine::with_processor(EngineSettings::unpaced());
//!
//! let mut playlist = Playlist::new("Weekend");
//! playlist.add_leaf("Movie", Pipeline::new(MediaSource::local("movie.mp4")).watermark().build());
//! playlist.add_leaf("News", Box::new(MediaSource::api("news")));
//!
//! engine.play_playlist(&mut playlist)?;
//! assert_eq!(
//!     engine.system_status(),
//!     "MediaEngine: Active | Processor: Processing (7 frames) | PlaylistManager: Ready (1 managed)"
//! );
//!
//! engine.set_sink(Sink::renderer(TracingRenderer::new("Screen")));
//! assert_eq!(engine.active_sink_description(), "Renderer: Screen");
//! # Ok::<(), pmoengine::EngineError>(())
//! ```

mod config_ext;
pub mod engine;
mod error;
pub mod logging;
pub mod sink;

pub use config_ext::EngineConfigExt;
pub use engine::{EngineSettings, PlaybackEngine, PlaybackReport};
pub use error::{EngineError, Result};
pub use logging::init_logging;
pub use sink::{CountingProcessor, FrameProcessor, FrameRenderer, Sink, TracingRenderer};
