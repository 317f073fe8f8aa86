//! Module de gestion du magasin de frames partagé
//!
//! Le [`FrameStore`] associe l'identité d'un pipeline à la séquence complète
//! des frames qu'il a produites. Une entrée est remplie une seule fois puis ne
//! change plus jusqu'à la fin du processus.
//!
//! Note : ce type est conçu pour être utilisé derrière un `Arc<FrameStore>`,
//! construit une fois au démarrage et passé à chaque [`CachedSource`](crate::CachedSource).

use once_cell::sync::OnceCell;
use pmosource::{Frame, Result, SourceError};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Séquence de frames mémorisée, partagée entre tous les lecteurs
pub type FrameSequence = Arc<[Frame]>;

type Slot = Arc<OnceCell<FrameSequence>>;

/// Politique de remplissage des entrées manquantes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    /// Au plus un remplissage par identité : les ouvertures concurrentes
    /// attendent le remplissage en cours au lieu de vider le pipeline à leur tour.
    #[default]
    Guarded,
    /// Vérification et insertion sont deux sections critiques distinctes.
    /// Deux premières ouvertures simultanées peuvent toutes deux manquer le
    /// cache et vider le pipeline interne ; la dernière écriture l'emporte.
    Unguarded,
}

impl FillMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillMode::Guarded => "guarded",
            FillMode::Unguarded => "unguarded",
        }
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillMode {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guarded" => Ok(FillMode::Guarded),
            "unguarded" => Ok(FillMode::Unguarded),
            other => Err(SourceError::Other(anyhow::anyhow!(
                "unknown cache fill mode '{}'",
                other
            ))),
        }
    }
}

/// Résultat d'une consultation du cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

/// Compteurs du magasin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Consultations servies sans toucher au pipeline interne
    pub hits: u64,
    /// Consultations qui ont vidé le pipeline interne
    pub misses: u64,
    /// Écritures d'entrées (peut dépasser le nombre d'identités en mode `Unguarded`)
    pub fills: u64,
}

/// Magasin de frames partagé entre toutes les lectures du processus
pub struct FrameStore {
    entries: RwLock<HashMap<String, Slot>>,
    mode: FillMode,
    hits: AtomicU64,
    misses: AtomicU64,
    fills: AtomicU64,
}

impl FrameStore {
    /// Crée un magasin vide
    pub fn new(mode: FillMode) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            mode,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            fills: AtomicU64::new(0),
        }
    }

    /// Crée un magasin vide prêt à être partagé
    pub fn shared(mode: FillMode) -> Arc<Self> {
        Arc::new(Self::new(mode))
    }

    pub fn mode(&self) -> FillMode {
        self.mode
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, Slot>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, Slot>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Retourne la séquence mémorisée pour `key`, si elle est complète
    pub fn lookup(&self, key: &str) -> Option<FrameSequence> {
        self.read_entries()
            .get(key)
            .and_then(|slot| slot.get().cloned())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Nombre d'identités dont la séquence est complète
    pub fn len(&self) -> usize {
        self.read_entries()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identités mémorisées, triées
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .read_entries()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Vide le magasin et remet les compteurs à zéro
    pub fn clear(&self) {
        self.write_entries().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.fills.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fills: self.fills.load(Ordering::Relaxed),
        }
    }

    /// Retourne la séquence de `key`, en la produisant avec `fill` si besoin
    ///
    /// `fill` n'est appelé que sur un miss. S'il échoue, l'erreur est
    /// propagée et aucune entrée n'est écrite pour `key`.
    pub fn fetch_or_fill<F>(&self, key: &str, fill: F) -> Result<(FrameSequence, CacheOutcome)>
    where
        F: FnOnce() -> Result<Vec<Frame>>,
    {
        if let Some(frames) = self.lookup(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key, "Frame sequence served from cache");
            return Ok((frames, CacheOutcome::Hit));
        }

        match self.mode {
            FillMode::Guarded => self.fill_guarded(key, fill),
            FillMode::Unguarded => self.fill_unguarded(key, fill),
        }
    }

    fn fill_guarded<F>(&self, key: &str, fill: F) -> Result<(FrameSequence, CacheOutcome)>
    where
        F: FnOnce() -> Result<Vec<Frame>>,
    {
        // Le slot est créé sous le verrou de la map, mais rempli en dehors :
        // les autres identités restent accessibles pendant le remplissage.
        let slot = self.write_entries().entry(key.to_string()).or_default().clone();

        let mut filled_here = false;
        let result = slot.get_or_try_init(|| {
            filled_here = true;
            fill().map(FrameSequence::from)
        });

        match result {
            Ok(frames) => {
                let frames = frames.clone();
                if filled_here {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    self.fills.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(key, frames = frames.len(), "Frame sequence stored");
                    Ok((frames, CacheOutcome::Miss))
                } else {
                    // Une autre lecture a rempli le slot pendant l'attente
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(key, "Frame sequence served after in-flight fill");
                    Ok((frames, CacheOutcome::Hit))
                }
            }
            Err(err) => {
                // Le slot vide reste en place : une lecture en attente dessus
                // prend le relais et son remplissage doit rester visible.
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(key, "Failed to fill frame sequence: {}", err);
                Err(err)
            }
        }
    }

    fn fill_unguarded<F>(&self, key: &str, fill: F) -> Result<(FrameSequence, CacheOutcome)>
    where
        F: FnOnce() -> Result<Vec<Frame>>,
    {
        self.misses.fetch_add(1, Ordering::Relaxed);

        let frames = match fill() {
            Ok(frames) => FrameSequence::from(frames),
            Err(err) => {
                tracing::warn!(key, "Failed to fill frame sequence: {}", err);
                return Err(err);
            }
        };

        let slot = Slot::default();
        let _ = slot.set(frames.clone());
        if self.write_entries().insert(key.to_string(), slot).is_some() {
            tracing::debug!(key, "Concurrent fill replaced an existing entry");
        }
        self.fills.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key, frames = frames.len(), "Frame sequence stored");

        Ok((frames, CacheOutcome::Miss))
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new(FillMode::default())
    }
}

impl fmt::Debug for FrameStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameStore")
            .field("mode", &self.mode)
            .field("entries", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}
