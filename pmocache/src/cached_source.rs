//! Wrapper de source adossé au [`FrameStore`]

use crate::cache::{CacheOutcome, FrameSequence, FrameStore};
use pmosource::{EventPublisher, Frame, FrameSource, Pipeline, Result, SourceEvent};
use std::sync::Arc;

/// Source qui mémorise la séquence complète de sa source interne
///
/// La clé de cache est l'identité de la source interne, au moment de
/// l'ouverture. Sur un hit, la source interne n'est ni ouverte, ni lue, ni
/// fermée. Sur un miss, elle est ouverte, lue jusqu'à la fin de flux puis
/// fermée, et la séquence obtenue est écrite dans le magasin.
///
/// L'identité du wrapper vaut `cached(<inner>)`. Les décorateurs posés
/// par-dessus ne font pas partie de la clé : leurs effets se produisent à
/// chaque lecture, hit ou miss.
pub struct CachedSource<S> {
    inner: S,
    store: Arc<FrameStore>,
    identity: String,
    buffer: Option<FrameSequence>,
    cursor: usize,
    last_outcome: Option<CacheOutcome>,
    events: EventPublisher,
}

impl<S: FrameSource> CachedSource<S> {
    pub fn new(inner: S, store: Arc<FrameStore>) -> Self {
        Self {
            identity: format!("cached({})", inner.identity()),
            inner,
            store,
            buffer: None,
            cursor: 0,
            last_outcome: None,
            events: EventPublisher::new(),
        }
    }

    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = events;
        self
    }

    /// Clé utilisée dans le magasin
    pub fn key(&self) -> &str {
        self.inner.identity()
    }

    /// Résultat du dernier `open`, `None` avant la première ouverture
    pub fn last_outcome(&self) -> Option<CacheOutcome> {
        self.last_outcome
    }

    pub fn store(&self) -> &Arc<FrameStore> {
        &self.store
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

// Vide la source interne ; sur erreur de lecture, la ferme avant de propager
fn drain_inner<S: FrameSource + ?Sized>(inner: &mut S) -> Result<Vec<Frame>> {
    inner.open()?;
    let mut frames = Vec::new();
    loop {
        match inner.read_frame() {
            Ok(Some(frame)) => frames.push(frame),
            Ok(None) => break,
            Err(err) => {
                if let Err(close_err) = inner.close() {
                    tracing::warn!(
                        source = %inner.identity(),
                        "Failed to close source after read error: {}",
                        close_err
                    );
                }
                return Err(err);
            }
        }
    }
    inner.close()?;
    Ok(frames)
}

impl<S: FrameSource> FrameSource for CachedSource<S> {
    fn open(&mut self) -> Result<()> {
        let key = self.inner.identity().to_string();
        // Un échec de remplissage ne doit pas laisser relire l'ancien buffer
        self.buffer = None;
        self.cursor = 0;
        self.last_outcome = None;

        let inner = &mut self.inner;
        let events = &self.events;

        let (frames, outcome) = self.store.fetch_or_fill(&key, || {
            tracing::info!(key = %key, "[CACHE MISS]");
            events.publish(SourceEvent::CacheMiss { key: key.clone() });
            drain_inner(inner)
        })?;

        if outcome == CacheOutcome::Hit {
            tracing::info!(key = %key, "[CACHE HIT]");
            self.events.publish(SourceEvent::CacheHit { key });
        }

        self.buffer = Some(frames);
        self.cursor = 0;
        self.last_outcome = Some(outcome);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        let Some(buffer) = &self.buffer else {
            return Ok(None);
        };
        let frame = buffer.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }

    fn close(&mut self) -> Result<()> {
        // Le magasin survit à la lecture : rien à libérer
        Ok(())
    }

    fn identity(&self) -> &str {
        &self.identity
    }
}

impl<S> std::fmt::Debug for CachedSource<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSource")
            .field("identity", &self.identity)
            .field("cursor", &self.cursor)
            .field("last_outcome", &self.last_outcome)
            .finish()
    }
}

/// Ajoute l'étage de cache au builder [`Pipeline`]
pub trait CacheStage {
    /// Pose un [`CachedSource`] par-dessus la tête courante du pipeline
    fn cached(self, store: &Arc<FrameStore>) -> Self;
}

impl CacheStage for Pipeline {
    fn cached(self, store: &Arc<FrameStore>) -> Self {
        let store = Arc::clone(store);
        self.wrap(move |inner, events| Box::new(CachedSource::new(inner, store).with_events(events)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FillMode;
    use pmosource::{MediaSource, SourceError};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Source dont la lecture échoue tant que `broken` est levé
    struct SwitchableSource {
        broken: Arc<AtomicBool>,
        cursor: usize,
    }

    impl FrameSource for SwitchableSource {
        fn open(&mut self) -> Result<()> {
            self.cursor = 0;
            Ok(())
        }

        fn read_frame(&mut self) -> Result<Option<Frame>> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(SourceError::Read {
                    source_name: "api:switch".into(),
                    reason: "gateway timeout".into(),
                });
            }
            if self.cursor >= 2 {
                return Ok(None);
            }
            self.cursor += 1;
            Ok(Some(Frame::from(format!("api-frame-{}", self.cursor))))
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }

        fn identity(&self) -> &str {
            "api:switch"
        }
    }

    #[test]
    fn test_identity_and_key() {
        let store = FrameStore::shared(FillMode::Guarded);
        let source = CachedSource::new(MediaSource::local("movie.mp4"), store);
        assert_eq!(source.identity(), "cached(local:movie.mp4)");
        assert_eq!(source.key(), "local:movie.mp4");
        assert!(source.last_outcome().is_none());
    }

    #[test]
    fn test_read_before_open_is_end_of_stream() {
        let store = FrameStore::shared(FillMode::Guarded);
        let mut source = CachedSource::new(MediaSource::api("1"), store);
        assert!(source.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_reopen_rewinds_cursor() {
        let store = FrameStore::shared(FillMode::Guarded);
        let mut source = CachedSource::new(MediaSource::stream("http://live"), store.clone());

        let first = pmosource::drain(&mut source).unwrap();
        assert_eq!(source.last_outcome(), Some(CacheOutcome::Miss));
        let second = pmosource::drain(&mut source).unwrap();
        assert_eq!(source.last_outcome(), Some(CacheOutcome::Hit));

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_failed_reopen_does_not_serve_previous_frames() {
        let store = FrameStore::shared(FillMode::Guarded);
        let broken = Arc::new(AtomicBool::new(false));
        let mut source = CachedSource::new(
            SwitchableSource {
                broken: broken.clone(),
                cursor: 0,
            },
            store.clone(),
        );

        source.open().unwrap();
        assert!(source.read_frame().unwrap().is_some());

        store.clear();
        broken.store(true, Ordering::SeqCst);

        assert!(source.open().is_err());
        assert!(source.last_outcome().is_none());
        assert!(source.read_frame().unwrap().is_none());
    }
}
