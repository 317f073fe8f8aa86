//! Destinations des frames lues par le moteur
//!
//! Deux formes de sink coexistent : un processeur, qui fait un travail par
//! frame et expose un statut, et un renderer, qui affiche la frame sous un
//! nom. Le moteur ne voit que l'enum [`Sink`].

mod processor;
mod renderer;

pub use processor::CountingProcessor;
pub use renderer::TracingRenderer;

use pmosource::Frame;

/// Sink qui traite les frames
pub trait FrameProcessor: Send {
    fn process_frame(&mut self, frame: &Frame);

    /// Statut lisible, repris par `PlaybackEngine::system_status`
    fn status(&self) -> String;
}

/// Sink qui restitue les frames
pub trait FrameRenderer: Send {
    fn render_frame(&mut self, frame: &Frame);

    fn name(&self) -> String;
}

/// Sink actif du moteur
pub enum Sink {
    Processor(Box<dyn FrameProcessor>),
    Renderer(Box<dyn FrameRenderer>),
}

impl Sink {
    pub fn processor(processor: impl FrameProcessor + 'static) -> Self {
        Sink::Processor(Box::new(processor))
    }

    pub fn renderer(renderer: impl FrameRenderer + 'static) -> Self {
        Sink::Renderer(Box::new(renderer))
    }

    /// Transmet une frame au sink
    pub fn handle(&mut self, frame: &Frame) {
        match self {
            Sink::Processor(processor) => processor.process_frame(frame),
            Sink::Renderer(renderer) => renderer.render_frame(frame),
        }
    }

    /// `"Processor: <statut>"` ou `"Renderer: <nom>"`
    pub fn description(&self) -> String {
        match self {
            Sink::Processor(processor) => format!("Processor: {}", processor.status()),
            Sink::Renderer(renderer) => format!("Renderer: {}", renderer.name()),
        }
    }

    pub fn is_processor(&self) -> bool {
        matches!(self, Sink::Processor(_))
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Sink").field(&self.description()).finish()
    }
}

impl Default for Sink {
    fn default() -> Self {
        Sink::processor(CountingProcessor::default())
    }
}
