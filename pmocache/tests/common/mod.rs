//! Sources instrumentées partagées par les tests d'intégration

#![allow(dead_code)]

use pmosource::{Frame, FrameSource, Result, SourceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

/// Source qui compte ses ouvertures et peut se synchroniser ou échouer
pub struct ProbeSource {
    identity: String,
    total: usize,
    cursor: usize,
    pub opens: Arc<AtomicUsize>,
    barrier: Option<Arc<Barrier>>,
    open_delay: Option<Duration>,
    fail_after: Option<usize>,
}

impl ProbeSource {
    pub fn new(identity: &str, total: usize) -> Self {
        Self {
            identity: identity.to_string(),
            total,
            cursor: 0,
            opens: Arc::new(AtomicUsize::new(0)),
            barrier: None,
            open_delay: None,
            fail_after: None,
        }
    }

    pub fn sharing_counter(mut self, opens: &Arc<AtomicUsize>) -> Self {
        self.opens = Arc::clone(opens);
        self
    }

    /// Bloque chaque `open` sur la barrière
    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    /// Échoue à la lecture de la frame `n` (0-based)
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl FrameSource for ProbeSource {
    fn open(&mut self) -> Result<()> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait();
        }
        if let Some(delay) = self.open_delay {
            std::thread::sleep(delay);
        }
        self.cursor = 0;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        if self.fail_after == Some(self.cursor) {
            return Err(SourceError::Read {
                source_name: self.identity.clone(),
                reason: "connection reset".into(),
            });
        }
        if self.cursor >= self.total {
            return Ok(None);
        }
        self.cursor += 1;
        Ok(Some(Frame::from(format!("probe-frame-{}", self.cursor))))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn identity(&self) -> &str {
        &self.identity
    }
}
