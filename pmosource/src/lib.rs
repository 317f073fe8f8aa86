//! # PMOSource
//!
//! Common traits and types for PMOMedia frame sources.
//!
//! This crate provides the foundational abstraction for every media origin in
//! the PMOMedia pipeline: a [`FrameSource`] is opened, read frame by frame until
//! it reports end-of-stream, then closed.
//!
//! ## Features
//!
//! - **Source variants**: local files, network (HLS) streams and remote APIs via [`MediaSource`].
//! - **Format adaptation**: [`FormatAdapter`] exposes a foreign converter as a `FrameSource`.
//! - **Decorators**: [`Equalizer`], [`Subtitle`] and [`Watermark`] wrap any source.
//! - **Events**: every observable side effect is published as a [`SourceEvent`].
//! - **Builder**: [`Pipeline`] composes decorators in caller-controlled order.
//!
//! ## Usage
//!
//! ```rust
//! use pmosource::{FrameSource, MediaSource, Pipeline};
//!
//! let mut pipeline = Pipeline::new(MediaSource::local("movie.mp4"))
//!     .equalizer()
//!     .watermark()
//!     .build();
//!
//! assert_eq!(pipeline.identity(), "wm(eq(local:movie.mp4))");
//!
//! pipeline.open()?;
//! let mut frames = Vec::new();
//! while let Some(frame) = pipeline.read_frame()? {
//!     frames.push(frame);
//! }
//! pipeline.close()?;
//!
//! assert_eq!(frames.len(), 3);
//! assert_eq!(&frames[0][..], b"local-frame-1");
//! # Ok::<(), pmosource::SourceError>(())
//! ```

pub mod adapter;
pub mod decorators;
pub mod events;
pub mod media;
pub mod pipeline;

pub use adapter::{FormatAdapter, FormatConverter};
pub use decorators::{Equalizer, Subtitle, Watermark};
pub use events::{EventPublisher, SourceEvent};
pub use media::{MediaSource, SourceKind};
pub use pipeline::Pipeline;

/// One opaque unit of media payload
///
/// Frames are reference-counted: cloning a frame never copies its bytes,
/// which lets caches hand out the same buffers to every reader.
pub type Frame = bytes::Bytes;

/// Error types for frame source operations
///
/// The built-in sources never fail; these variants exist for sources backed
/// by real I/O and propagate unchanged through decorators and caches.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source not available: {0}")]
    Unavailable(String),

    #[error("Failed to read from {source_name}: {reason}")]
    Read { source_name: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for frame source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Main trait for frame sources
///
/// A source produces an ordered, finite sequence of frames. The lifecycle is:
///
/// 1. [`open`](FrameSource::open) resets the read cursor;
/// 2. [`read_frame`](FrameSource::read_frame) returns `Ok(Some(frame))` until
///    the stream is exhausted, then `Ok(None)` (end-of-stream) on every call
///    until the next `open`;
/// 3. [`close`](FrameSource::close) releases whatever `open` acquired.
///
/// Reading before `open` returns end-of-stream immediately.
///
/// # Thread Safety
///
/// Sources are `Send` so that a pipeline can be moved to the thread that
/// plays it, but a single open/read/close cycle is driven by one caller at a
/// time (`&mut self`).
pub trait FrameSource: Send {
    /// Opens the source and resets its read cursor
    fn open(&mut self) -> Result<()>;

    /// Returns the next frame, or `None` once the stream is exhausted
    fn read_frame(&mut self) -> Result<Option<Frame>>;

    /// Closes the source
    fn close(&mut self) -> Result<()>;

    /// Stable key used for caching and logging
    ///
    /// Wrappers derive their identity from the one they wrap
    /// (e.g. `eq(local:movie.mp4)`).
    fn identity(&self) -> &str;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        (**self).read_frame()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn identity(&self) -> &str {
        (**self).identity()
    }
}

/// Opens `source`, reads it to end-of-stream and closes it
///
/// Returns every frame read, in order. On error the source is left as is;
/// callers decide whether to close it.
pub fn drain<S: FrameSource + ?Sized>(source: &mut S) -> Result<Vec<Frame>> {
    source.open()?;
    let mut frames = Vec::new();
    while let Some(frame) = source.read_frame()? {
        frames.push(frame);
    }
    source.close()?;
    Ok(frames)
}
