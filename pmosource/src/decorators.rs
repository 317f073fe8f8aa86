//! Décorateurs de sources
//!
//! Un décorateur possède exactement une source interne et lui transmet
//! `open`/`read_frame`/`close`, en ajoutant un effet de bord à un point précis
//! du cycle de vie :
//!
//! | décorateur    | identité     | effet                                        |
//! |---------------|--------------|----------------------------------------------|
//! | [`Equalizer`] | `eq(<inner>)`  | à l'`open`, avant de déléguer               |
//! | [`Subtitle`]  | `sub(<inner>)` | après chaque frame non nulle de la source interne |
//! | [`Watermark`] | `wm(<inner>)`  | après chaque frame non nulle de la source interne |
//!
//! Les frames ne sont jamais modifiées : l'ordre d'empilement ne change que
//! l'ordre des effets.
//!
//! ```text
//! [Equalizer, Subtitle] sur S  =>  Subtitle(Equalizer(S))
//! ```

use crate::events::{EventPublisher, SourceEvent};
use crate::{Frame, FrameSource, Result};

/// Égaliseur audio (effet à l'ouverture)
#[derive(Debug)]
pub struct Equalizer<S> {
    inner: S,
    identity: String,
    events: EventPublisher,
}

impl<S: FrameSource> Equalizer<S> {
    pub fn new(inner: S) -> Self {
        Self {
            identity: format!("eq({})", inner.identity()),
            inner,
            events: EventPublisher::new(),
        }
    }

    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = events;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSource> FrameSource for Equalizer<S> {
    fn open(&mut self) -> Result<()> {
        tracing::debug!(source = %self.identity, "[EQ]");
        self.events.publish(SourceEvent::Equalized {
            source: self.identity.clone(),
        });
        self.inner.open()
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        self.inner.read_frame()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn identity(&self) -> &str {
        &self.identity
    }
}

/// Incrustation de sous-titres (effet sur chaque frame)
#[derive(Debug)]
pub struct Subtitle<S> {
    inner: S,
    identity: String,
    events: EventPublisher,
}

impl<S: FrameSource> Subtitle<S> {
    pub fn new(inner: S) -> Self {
        Self {
            identity: format!("sub({})", inner.identity()),
            inner,
            events: EventPublisher::new(),
        }
    }

    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = events;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSource> FrameSource for Subtitle<S> {
    fn open(&mut self) -> Result<()> {
        self.inner.open()
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        let frame = self.inner.read_frame()?;
        if frame.is_some() {
            tracing::trace!(source = %self.identity, "[SUB]");
            self.events.publish(SourceEvent::Subtitled {
                source: self.identity.clone(),
            });
        }
        Ok(frame)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn identity(&self) -> &str {
        &self.identity
    }
}

/// Filigrane (effet sur chaque frame)
#[derive(Debug)]
pub struct Watermark<S> {
    inner: S,
    identity: String,
    events: EventPublisher,
}

impl<S: FrameSource> Watermark<S> {
    pub fn new(inner: S) -> Self {
        Self {
            identity: format!("wm({})", inner.identity()),
            inner,
            events: EventPublisher::new(),
        }
    }

    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = events;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSource> FrameSource for Watermark<S> {
    fn open(&mut self) -> Result<()> {
        self.inner.open()
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        let frame = self.inner.read_frame()?;
        if frame.is_some() {
            tracing::trace!(source = %self.identity, "[WM]");
            self.events.publish(SourceEvent::Watermarked {
                source: self.identity.clone(),
            });
        }
        Ok(frame)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn identity(&self) -> &str {
        &self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{drain, MediaSource};

    #[test]
    fn test_identity_nesting() {
        let source = Watermark::new(Subtitle::new(Equalizer::new(MediaSource::local("a"))));
        assert_eq!(source.identity(), "wm(sub(eq(local:a)))");
        assert_eq!(source.inner().inner().identity(), "eq(local:a)");
    }

    #[test]
    fn test_equalizer_fires_before_inner_open() {
        let events = EventPublisher::new();
        let rx = events.subscribe();
        let mut source =
            Equalizer::new(MediaSource::local("a").with_events(events.clone())).with_events(events);

        source.open().unwrap();

        let labels: Vec<_> = rx.try_iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["[EQ]", "[OPEN]"]);
    }

    #[test]
    fn test_subtitle_skips_sentinel() {
        let events = EventPublisher::new();
        let rx = events.subscribe();
        let mut source = Subtitle::new(MediaSource::stream("http://live")).with_events(events);

        let frames = drain(&mut source).unwrap();
        // Lecture supplémentaire après la fin de flux : aucun effet
        assert!(source.read_frame().unwrap().is_none());

        assert_eq!(frames.len(), 5);
        assert_eq!(rx.try_iter().count(), 5);
    }

    #[test]
    fn test_decorators_do_not_alter_frames() {
        let mut plain = MediaSource::api("7");
        let mut decorated = Watermark::new(Subtitle::new(Equalizer::new(MediaSource::api("7"))));

        assert_eq!(drain(&mut plain).unwrap(), drain(&mut decorated).unwrap());
    }
}
