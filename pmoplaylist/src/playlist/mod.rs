//! Arbre de playlist : feuilles et playlists composites

pub mod leaf;

use self::leaf::PlaylistLeaf;
use crate::error::{Error, Result};
use crate::player::Player;
use pmosource::FrameSource;
use std::fmt;

/// Nœud d'une playlist
#[derive(Debug)]
pub enum PlaylistNode {
    Leaf(PlaylistLeaf),
    Composite(Playlist),
}

impl PlaylistNode {
    pub fn title(&self) -> &str {
        match self {
            PlaylistNode::Leaf(leaf) => leaf.title(),
            PlaylistNode::Composite(playlist) => playlist.title(),
        }
    }

    pub fn play<P: Player + ?Sized>(&mut self, player: &mut P) -> std::result::Result<(), P::Error> {
        match self {
            PlaylistNode::Leaf(leaf) => leaf.play(player),
            PlaylistNode::Composite(playlist) => playlist.play(player),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, PlaylistNode::Leaf(_))
    }
}

impl From<PlaylistLeaf> for PlaylistNode {
    fn from(leaf: PlaylistLeaf) -> Self {
        PlaylistNode::Leaf(leaf)
    }
}

impl From<Playlist> for PlaylistNode {
    fn from(playlist: Playlist) -> Self {
        PlaylistNode::Composite(playlist)
    }
}

/// Playlist composite : suite ordonnée de nœuds
///
/// L'ordre d'insertion est le seul ordre garanti, aussi bien pour la lecture
/// que pour le listing. Un nœud ajouté appartient à cette playlist seule.
#[derive(Debug)]
pub struct Playlist {
    title: String,
    children: Vec<PlaylistNode>,
}

impl Playlist {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            children: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Ajoute un nœud en fin de playlist
    pub fn add(&mut self, node: impl Into<PlaylistNode>) {
        self.children.push(node.into());
    }

    /// Ajoute une feuille construite à partir d'un titre et d'un pipeline
    pub fn add_leaf(&mut self, title: impl Into<String>, pipeline: Box<dyn FrameSource>) {
        self.add(PlaylistLeaf::new(title, pipeline));
    }

    /// Retire et retourne le nœud à la position `index`
    ///
    /// Un index hors bornes laisse la playlist intacte et retourne
    /// [`Error::IndexOutOfRange`].
    pub fn remove_child(&mut self, index: usize) -> Result<PlaylistNode> {
        let len = self.children.len();
        if index >= len {
            tracing::warn!(playlist = %self.title, index, len, "Cannot remove playlist item");
            return Err(Error::IndexOutOfRange { index, len });
        }
        let node = self.children.remove(index);
        tracing::debug!(playlist = %self.title, index, title = %node.title(), "Removed playlist item");
        Ok(node)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self) -> impl Iterator<Item = &PlaylistNode> {
        self.children.iter()
    }

    /// Titres des enfants directs, dans l'ordre
    pub fn titles(&self) -> Vec<&str> {
        self.children.iter().map(PlaylistNode::title).collect()
    }

    /// Listing numéroté à partir de 1 : `"1. <titre>"`
    pub fn listing(&self) -> Vec<String> {
        self.children
            .iter()
            .enumerate()
            .map(|(i, child)| format!("{}. {}", i + 1, child.title()))
            .collect()
    }

    /// Joue chaque enfant dans l'ordre d'insertion
    ///
    /// La lecture s'arrête à la première erreur, qui est retournée telle quelle.
    pub fn play<P: Player + ?Sized>(&mut self, player: &mut P) -> std::result::Result<(), P::Error> {
        let total = self.children.len();
        tracing::info!(playlist = %self.title, items = total, "=== Playing Playlist ===");

        for (i, child) in self.children.iter_mut().enumerate() {
            tracing::info!(
                playlist = %self.title,
                position = i + 1,
                total,
                title = %child.title(),
                "Playing item"
            );
            child.play(player)?;
        }

        tracing::info!(playlist = %self.title, "Playlist completed");
        Ok(())
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Playlist: {} ({} items)", self.title, self.children.len())?;
        for line in self.listing() {
            write!(f, "\n  {}", line)?;
        }
        Ok(())
    }
}
