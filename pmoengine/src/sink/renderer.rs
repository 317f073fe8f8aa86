use super::FrameRenderer;
use pmosource::Frame;

/// Renderer qui trace chaque frame reçue sous son nom
#[derive(Debug, Clone)]
pub struct TracingRenderer {
    name: String,
}

impl TracingRenderer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl FrameRenderer for TracingRenderer {
    fn render_frame(&mut self, frame: &Frame) {
        tracing::trace!(renderer = %self.name, bytes = frame.len(), "Rendering frame");
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
