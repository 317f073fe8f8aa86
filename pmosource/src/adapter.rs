//! Adaptation d'un format étranger au contrat [`FrameSource`]
//!
//! Un [`FormatConverter`] produit des frames brutes dans son propre format ;
//! [`FormatAdapter`] les convertit au format standard du pipeline.

use crate::events::{EventPublisher, SourceEvent};
use crate::{Frame, FrameSource, Result};

/// Nombre de frames brutes produites par un convertisseur
pub const CONVERTER_MAX_FRAMES: usize = 50;

/// Taille d'une frame brute en octets
pub const CONVERTER_FRAME_SIZE: usize = 1024;

/// Format exposé par l'adaptateur
pub const STANDARD_FORMAT: &str = "Standard";

/// Convertisseur de format simulé
#[derive(Debug, Default)]
pub struct FormatConverter {
    initialized: bool,
    frame_count: usize,
}

impl FormatConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self) {
        self.initialized = true;
        tracing::debug!("Format converter initialized");
    }

    /// Frame brute suivante, `None` si non initialisé ou épuisé
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        if !self.initialized || self.frame_count >= CONVERTER_MAX_FRAMES {
            return None;
        }
        self.frame_count += 1;
        Some(vec![0u8; CONVERTER_FRAME_SIZE])
    }

    pub fn convert_frame(&self, raw: &[u8]) -> Frame {
        Frame::copy_from_slice(raw)
    }

    pub fn cleanup(&mut self) {
        self.initialized = false;
        self.frame_count = 0;
        tracing::debug!("Format converter cleaned up");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Source exposant un [`FormatConverter`] comme une [`FrameSource`]
///
/// L'identité vaut `adapted:<format d'origine>`.
#[derive(Debug)]
pub struct FormatAdapter {
    converter: FormatConverter,
    original_format: String,
    identity: String,
    events: EventPublisher,
}

impl FormatAdapter {
    pub fn new(converter: FormatConverter, original_format: impl Into<String>) -> Self {
        let original_format = original_format.into();
        Self {
            identity: format!("adapted:{}", original_format),
            converter,
            original_format,
            events: EventPublisher::new(),
        }
    }

    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = events;
        self
    }

    pub fn original_format(&self) -> &str {
        &self.original_format
    }

    pub fn adapted_format(&self) -> &str {
        STANDARD_FORMAT
    }

    pub fn converter(&self) -> &FormatConverter {
        &self.converter
    }
}

impl FrameSource for FormatAdapter {
    fn open(&mut self) -> Result<()> {
        tracing::info!(
            from = %self.original_format,
            to = STANDARD_FORMAT,
            "Opening format adapter"
        );
        // Un open repart du début, comme les autres sources
        self.converter.cleanup();
        self.converter.initialize();
        self.events.publish(SourceEvent::Opened {
            source: self.identity.clone(),
        });
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self
            .converter
            .next_frame()
            .map(|raw| self.converter.convert_frame(&raw)))
    }

    fn close(&mut self) -> Result<()> {
        tracing::info!(format = %self.original_format, "Closing format adapter");
        self.converter.cleanup();
        self.events.publish(SourceEvent::Closed {
            source: self.identity.clone(),
        });
        Ok(())
    }

    fn identity(&self) -> &str {
        &self.identity
    }
}
