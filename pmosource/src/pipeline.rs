//! Construction de pipelines
//!
//! [`Pipeline`] empile les étages dans l'ordre des appels : le premier étage
//! ajouté est le plus proche de la source, le dernier est celui qu'ouvre le
//! moteur de lecture.
//!
//! ```rust
//! use pmosource::{EventPublisher, FrameSource, Pipeline};
//!
//! let events = EventPublisher::new();
//! let pipeline = Pipeline::media(pmosource::SourceKind::Local, "movie.mp4", events)
//!     .subtitle()
//!     .equalizer()
//!     .build();
//!
//! assert_eq!(pipeline.identity(), "eq(sub(local:movie.mp4))");
//! ```
//!
//! Les crates qui fournissent d'autres étages (cache, ...) passent par
//! [`Pipeline::wrap`].

use crate::decorators::{Equalizer, Subtitle, Watermark};
use crate::events::EventPublisher;
use crate::media::{MediaSource, SourceKind};
use crate::FrameSource;

/// Builder de pipeline
pub struct Pipeline {
    head: Box<dyn FrameSource>,
    events: EventPublisher,
}

impl Pipeline {
    /// Démarre un pipeline sur une source déjà construite
    pub fn new(source: impl FrameSource + 'static) -> Self {
        Self {
            head: Box::new(source),
            events: EventPublisher::new(),
        }
    }

    /// Démarre un pipeline sur une [`MediaSource`] qui publie sur `events`
    pub fn media(kind: SourceKind, origin: impl Into<String>, events: EventPublisher) -> Self {
        let source = MediaSource::new(kind, origin).with_events(events.clone());
        Self::new(source).with_events(events)
    }

    /// Publisher transmis aux étages ajoutés ensuite
    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    /// Identité de l'étage le plus externe
    pub fn identity(&self) -> &str {
        self.head.identity()
    }

    /// Ajoute un étage arbitraire par-dessus la tête courante
    pub fn wrap<F>(self, stage: F) -> Self
    where
        F: FnOnce(Box<dyn FrameSource>, EventPublisher) -> Box<dyn FrameSource>,
    {
        let head = stage(self.head, self.events.clone());
        Self {
            head,
            events: self.events,
        }
    }

    pub fn equalizer(self) -> Self {
        self.wrap(|inner, events| Box::new(Equalizer::new(inner).with_events(events)))
    }

    pub fn subtitle(self) -> Self {
        self.wrap(|inner, events| Box::new(Subtitle::new(inner).with_events(events)))
    }

    pub fn watermark(self) -> Self {
        self.wrap(|inner, events| Box::new(Watermark::new(inner).with_events(events)))
    }

    /// Retourne l'étage le plus externe
    pub fn build(self) -> Box<dyn FrameSource> {
        self.head
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("identity", &self.identity())
            .finish()
    }
}
