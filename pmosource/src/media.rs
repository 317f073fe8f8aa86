//! Sources de base : fichier local, flux réseau (HLS) et API distante
//!
//! Aucune de ces sources ne fait de véritable I/O : chacune produit un nombre
//! fixe de frames déterministes (`local-frame-1`, `hls-frame-2`, ...), ce qui
//! rend les pipelines reproductibles.

use crate::events::{EventPublisher, SourceEvent};
use crate::{Frame, FrameSource, Result, SourceError};
use std::fmt;
use std::str::FromStr;

/// Origine d'une [`MediaSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Fichier local, identifié par son chemin
    Local,
    /// Flux réseau HLS, identifié par son URL
    Stream,
    /// API distante, identifiée par un ID
    Api,
}

impl SourceKind {
    /// Préfixe utilisé dans l'identité de la source
    pub const fn scheme(&self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Stream => "hls",
            SourceKind::Api => "api",
        }
    }

    /// Nombre de frames produites entre `open` et la fin de flux
    pub const fn frame_count(&self) -> usize {
        match self {
            SourceKind::Local => 3,
            SourceKind::Stream => 5,
            SourceKind::Api => 4,
        }
    }

    /// Déduit le type de source à partir du type demandé et de l'origine
    ///
    /// `api` reste une API ; pour tout autre type, une origine `http://`,
    /// `https://` ou contenant `.m3u8` désigne un flux, le reste un fichier local.
    pub fn classify(kind: &str, origin: &str) -> Result<Self> {
        match kind.parse::<SourceKind>()? {
            SourceKind::Api => Ok(SourceKind::Api),
            _ if origin.starts_with("http://")
                || origin.starts_with("https://")
                || origin.contains(".m3u8") =>
            {
                Ok(SourceKind::Stream)
            }
            _ => Ok(SourceKind::Local),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for SourceKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(SourceKind::Local),
            "hls" | "stream" => Ok(SourceKind::Stream),
            "api" => Ok(SourceKind::Api),
            other => Err(SourceError::Unavailable(format!(
                "unknown source type '{}' (expected hls, local or api)",
                other
            ))),
        }
    }
}

/// Source de frames simulée
///
/// L'identité vaut `<scheme>:<origin>` (`local:movie.mp4`, `hls:http://...`,
/// `api:42`).
#[derive(Debug)]
pub struct MediaSource {
    kind: SourceKind,
    origin: String,
    identity: String,
    cursor: usize,
    opened: bool,
    events: EventPublisher,
}

impl MediaSource {
    pub fn new(kind: SourceKind, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            identity: format!("{}:{}", kind.scheme(), origin),
            kind,
            origin,
            cursor: 0,
            opened: false,
            events: EventPublisher::new(),
        }
    }

    pub fn local(path: impl Into<String>) -> Self {
        Self::new(SourceKind::Local, path)
    }

    pub fn stream(url: impl Into<String>) -> Self {
        Self::new(SourceKind::Stream, url)
    }

    pub fn api(id: impl Into<String>) -> Self {
        Self::new(SourceKind::Api, id)
    }

    /// Publie les ouvertures/fermetures sur `events`
    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = events;
        self
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl FrameSource for MediaSource {
    fn open(&mut self) -> Result<()> {
        match self.kind {
            SourceKind::Local => tracing::info!(path = %self.origin, "Opening local file"),
            SourceKind::Stream => tracing::info!(url = %self.origin, "Opening HLS stream"),
            SourceKind::Api => tracing::info!(id = %self.origin, "Fetching from API"),
        }
        self.cursor = 0;
        self.opened = true;
        self.events.publish(SourceEvent::Opened {
            source: self.identity.clone(),
        });
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        if !self.opened || self.cursor >= self.kind.frame_count() {
            return Ok(None);
        }
        self.cursor += 1;
        let payload = format!("{}-frame-{}", self.kind.scheme(), self.cursor);
        Ok(Some(Frame::from(payload)))
    }

    fn close(&mut self) -> Result<()> {
        match self.kind {
            SourceKind::Local => tracing::info!(path = %self.origin, "Closing local file"),
            SourceKind::Stream => tracing::info!(url = %self.origin, "Closing HLS stream"),
            SourceKind::Api => tracing::info!(id = %self.origin, "Done API fetch"),
        }
        self.opened = false;
        self.events.publish(SourceEvent::Closed {
            source: self.identity.clone(),
        });
        Ok(())
    }

    fn identity(&self) -> &str {
        &self.identity
    }
}
