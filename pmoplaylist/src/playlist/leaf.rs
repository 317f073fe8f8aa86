//! PlaylistLeaf : un pipeline jouable et son titre

use crate::player::Player;
use pmosource::{FrameSource, SourceKind};
use std::fmt;

/// Élément terminal d'une playlist
///
/// Le titre est figé à la construction ; le pipeline appartient exclusivement
/// à la feuille.
pub struct PlaylistLeaf {
    title: String,
    pipeline: Box<dyn FrameSource>,
}

impl PlaylistLeaf {
    pub fn new(title: impl Into<String>, pipeline: Box<dyn FrameSource>) -> Self {
        Self {
            title: title.into(),
            pipeline,
        }
    }

    /// Crée une feuille titrée `"<origin> (<kind>)"`
    pub fn from_origin(origin: &str, kind: SourceKind, pipeline: Box<dyn FrameSource>) -> Self {
        Self::new(format!("{} ({})", origin, kind), pipeline)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Identité du pipeline (étage le plus externe)
    pub fn identity(&self) -> &str {
        self.pipeline.identity()
    }

    pub fn play<P: Player + ?Sized>(&mut self, player: &mut P) -> Result<(), P::Error> {
        player.play_source(self.pipeline.as_mut())
    }
}

impl fmt::Debug for PlaylistLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaylistLeaf")
            .field("title", &self.title)
            .field("pipeline", &self.pipeline.identity())
            .finish()
    }
}
