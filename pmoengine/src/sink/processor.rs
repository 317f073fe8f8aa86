use super::FrameProcessor;
use pmosource::Frame;
use std::time::Duration;

/// Latence simulée par défaut pour chaque frame
pub const DEFAULT_PROCESSOR_LATENCY: Duration = Duration::from_millis(10);

/// Processeur qui compte les frames et simule un temps de traitement
///
/// La latence est une pause bloquante du thread appelant.
#[derive(Debug, Clone)]
pub struct CountingProcessor {
    latency: Duration,
    active: bool,
    frames_processed: u64,
    bytes_processed: u64,
}

impl CountingProcessor {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            active: false,
            frames_processed: 0,
            bytes_processed: 0,
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn bytes_processed(&self) -> u64 {
        self.bytes_processed
    }

    /// Repasse à l'état `Idle` et remet les compteurs à zéro
    pub fn reset(&mut self) {
        self.active = false;
        self.frames_processed = 0;
        self.bytes_processed = 0;
    }
}

impl Default for CountingProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESSOR_LATENCY)
    }
}

impl FrameProcessor for CountingProcessor {
    fn process_frame(&mut self, frame: &Frame) {
        self.active = true;
        self.frames_processed += 1;
        self.bytes_processed += frame.len() as u64;
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
    }

    fn status(&self) -> String {
        if self.active {
            format!("Processing ({} frames)", self.frames_processed)
        } else {
            "Idle".to_string()
        }
    }
}
