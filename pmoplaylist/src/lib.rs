//! # pmoplaylist - Playlists hiérarchiques pour PMOMedia
//!
//! Une playlist est un arbre : chaque feuille ([`PlaylistLeaf`]) porte un titre
//! et un pipeline de sources complet, chaque nœud composite ([`Playlist`]) une
//! suite ordonnée d'enfants.
//!
//! # Architecture
//!
//! - **Playlist** : composite, ajout en fin, retrait par index contrôlé
//! - **PlaylistLeaf** : un pipeline `FrameSource` et son titre
//! - **PlaylistNode** : l'un ou l'autre
//! - **Player** : le moteur qui joue les feuilles (implémenté par `pmoengine`)
//!
//! # Exemple d'utilisation
//!
//! ```rust
//! use pmoplaylist::{Player, Playlist, PlaylistLeaf};
//! use pmosource::{FrameSource, MediaSource, SourceKind};
//!
//! struct Collect(Vec<String>);
//!
//! impl Player for Collect {
//!     type Error = pmosource::SourceError;
//!
//!     fn play_source(&mut self, source: &mut dyn FrameSource) -> Result<(), Self::Error> {
//!         self.0.push(source.identity().to_string());
//!         Ok(())
//!     }
//! }
//!
//! let mut playlist = Playlist::new("Weekend");
//! playlist.add(PlaylistLeaf::from_origin(
//!     "movie.mp4",
//!     SourceKind::Local,
//!     Box::new(MediaSource::local("movie.mp4")),
//! ));
//! playlist.add_leaf("Daily news", Box::new(MediaSource::api("news")));
//!
//! let mut player = Collect(Vec::new());
//! playlist.play(&mut player)?;
//!
//! assert_eq!(player.0, vec!["local:movie.mp4", "api:news"]);
//! # Ok::<(), pmosource::SourceError>(())
//! ```

mod error;
mod player;
mod playlist;

// Réexports publics
pub use error::{Error, Result};
pub use player::Player;
pub use playlist::leaf::PlaylistLeaf;
pub use playlist::{Playlist, PlaylistNode};
