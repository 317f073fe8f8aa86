//! Point d'entrée du moteur de lecture vu depuis les playlists

use pmosource::FrameSource;

/// Ce qui sait jouer un pipeline complet
///
/// Les playlists ne connaissent le moteur qu'au travers de ce trait ;
/// `pmoengine::PlaybackEngine` l'implémente.
pub trait Player {
    type Error;

    /// Joue `source` jusqu'à la fin de flux
    fn play_source(&mut self, source: &mut dyn FrameSource) -> Result<(), Self::Error>;
}
