//! # pmocache - Cache de frames pour PMOMedia
//!
//! Cette crate mémorise la séquence complète des frames d'un pipeline, indexée
//! par son identité, pour que les ouvertures suivantes soient servies sans
//! toucher au pipeline d'origine.
//!
//! ## Architecture
//!
//! ```text
//! pmocache
//!     ├── cache.rs          - FrameStore : magasin partagé (identité -> frames)
//!     ├── cached_source.rs  - CachedSource : wrapper FrameSource adossé au magasin
//!     └── config_ext.rs     - Extension pmoconfig (politique de remplissage)
//! ```
//!
//! Le magasin est un service explicite : il est créé une fois puis passé à
//! chaque [`CachedSource`] via un `Arc`. Les tests peuvent ainsi injecter un
//! magasin isolé.
//!
//! ## Utilisation
//!
//! ```rust
//! use pmocache::{CacheOutcome, CacheStage, FillMode, FrameStore};
//! use pmosource::{drain, MediaSource, Pipeline};
//!
//! let store = FrameStore::shared(FillMode::Guarded);
//!
//! let mut first = Pipeline::new(MediaSource::local("movie.mp4")).cached(&store).watermark().build();
//! let mut second = Pipeline::new(MediaSource::local("movie.mp4")).cached(&store).build();
//!
//! let a = drain(&mut first)?;
//! let b = drain(&mut second)?;
//!
//! assert_eq!(a, b);
//! assert_eq!(store.len(), 1);
//! assert_eq!(store.stats().hits, 1);
//! # Ok::<(), pmosource::SourceError>(())
//! ```
//!
//! ## Concurrence
//!
//! Lecture (hit) et écriture (remplissage) sont chacune atomiques vis-à-vis de
//! la map. En mode [`FillMode::Guarded`] (défaut), deux premières ouvertures
//! simultanées d'une même identité ne vident le pipeline interne qu'une fois :
//! la seconde attend le remplissage en cours. [`FillMode::Unguarded`] conserve
//! le comportement historique où les deux peuvent manquer le cache.

pub mod cache;
pub mod cached_source;

#[cfg(feature = "pmoconfig")]
mod config_ext;

pub use cache::{CacheOutcome, CacheStats, FillMode, FrameSequence, FrameStore};
pub use cached_source::{CacheStage, CachedSource};

#[cfg(feature = "pmoconfig")]
pub use config_ext::FrameCacheConfigExt;
