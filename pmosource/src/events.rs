//! Événements émis par les sources et leurs wrappers
//!
//! Chaque effet de bord observable du pipeline (ouverture d'une source,
//! passage dans un décorateur, hit ou miss du cache) est publié sous forme de
//! [`SourceEvent`] vers les abonnés d'un [`EventPublisher`].
//!
//! Les envois utilisent `try_send` : un abonné lent ou disparu ne bloque
//! jamais la lecture.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Effet de bord observable dans un pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// Une source de base a été ouverte
    Opened { source: String },
    /// Une source de base a été fermée
    Closed { source: String },
    /// L'égaliseur a été appliqué à l'ouverture
    Equalized { source: String },
    /// Un sous-titre a accompagné une frame
    Subtitled { source: String },
    /// Un filigrane a accompagné une frame
    Watermarked { source: String },
    /// Le cache a servi la séquence sans toucher au pipeline interne
    CacheHit { key: String },
    /// Le cache a dû vider le pipeline interne
    CacheMiss { key: String },
}

impl SourceEvent {
    /// Étiquette courte, telle qu'affichée dans les traces de lecture
    pub fn label(&self) -> &'static str {
        match self {
            SourceEvent::Opened { .. } => "[OPEN]",
            SourceEvent::Closed { .. } => "[CLOSE]",
            SourceEvent::Equalized { .. } => "[EQ]",
            SourceEvent::Subtitled { .. } => "[SUB]",
            SourceEvent::Watermarked { .. } => "[WM]",
            SourceEvent::CacheHit { .. } => "[CACHE HIT]",
            SourceEvent::CacheMiss { .. } => "[CACHE MISS]",
        }
    }

    /// Identité de la source (ou clé de cache) concernée
    pub fn subject(&self) -> &str {
        match self {
            SourceEvent::Opened { source }
            | SourceEvent::Closed { source }
            | SourceEvent::Equalized { source }
            | SourceEvent::Subtitled { source }
            | SourceEvent::Watermarked { source } => source,
            SourceEvent::CacheHit { key } | SourceEvent::CacheMiss { key } => key,
        }
    }
}

impl fmt::Display for SourceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.subject())
    }
}

/// Diffuseur d'événements
///
/// Les clones partagent la même liste d'abonnés : un abonnement pris après la
/// construction du pipeline voit les événements de tous ses étages.
#[derive(Clone, Default)]
pub struct EventPublisher {
    subscribers: Arc<RwLock<Vec<Sender<SourceEvent>>>>,
}

impl EventPublisher {
    /// Crée un publisher sans abonné
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute un abonné et retourne le côté réception de son channel
    pub fn subscribe(&self) -> Receiver<SourceEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Publie un événement à tous les abonnés
    ///
    /// Les abonnés dont le receiver a été abandonné sont retirés.
    pub fn publish(&self, event: SourceEvent) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| !matches!(tx.try_send(event.clone()), Err(TrySendError::Disconnected(_))));
    }

    /// Retourne le nombre d'abonnés actifs
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPublisher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_publisher_basic() {
        let publisher = EventPublisher::new();
        let rx = publisher.subscribe();

        publisher.publish(SourceEvent::Equalized {
            source: "eq(local:a)".into(),
        });

        let received = rx.try_recv().unwrap();
        assert_eq!(received.label(), "[EQ]");
        assert_eq!(received.subject(), "eq(local:a)");
    }

    #[test]
    fn test_clones_share_subscribers() {
        let publisher = EventPublisher::new();
        let clone = publisher.clone();
        let rx = publisher.subscribe();

        clone.publish(SourceEvent::CacheMiss { key: "k".into() });

        assert_eq!(clone.subscriber_count(), 1);
        assert_eq!(rx.try_recv().unwrap(), SourceEvent::CacheMiss { key: "k".into() });
    }

    #[test]
    fn test_dropped_subscriber_is_removed() {
        let publisher = EventPublisher::new();
        let rx1 = publisher.subscribe();
        let rx2 = publisher.subscribe();
        drop(rx2);

        publisher.publish(SourceEvent::Opened { source: "s".into() });

        assert_eq!(publisher.subscriber_count(), 1);
        assert_eq!(rx1.len(), 1);
    }
}
