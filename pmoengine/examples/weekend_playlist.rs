//! Lecture d'une petite playlist décorée et mise en cache
//!
//! ```bash
//! cargo run -p pmoengine --example weekend_playlist
//! ```

use pmocache::{CacheStage, FrameCacheConfigExt};
use pmoconfig::get_config;
use pmoengine::{init_logging, EngineConfigExt, Sink, TracingRenderer};
use pmoplaylist::{Playlist, PlaylistLeaf};
use pmosource::{EventPublisher, Pipeline, SourceKind};

fn main() -> anyhow::Result<()> {
    let config = get_config();
    init_logging(&config)?;

    let store = config.create_frame_store()?;
    let events = EventPublisher::new();
    let mut engine = config.create_engine()?;

    let mut playlist = Playlist::new("Weekend");
    for (origin, kind) in [
        ("movie.mp4", SourceKind::Local),
        ("https://live.example.com/stream.m3u8", SourceKind::Stream),
        ("weather", SourceKind::Api),
        ("movie.mp4", SourceKind::Local),
    ] {
        let pipeline = Pipeline::media(kind, origin, events.clone())
            .equalizer()
            .cached(&store)
            .watermark()
            .build();
        playlist.add(PlaylistLeaf::from_origin(origin, kind, pipeline));
    }

    println!("{}", playlist);
    engine.play_playlist(&mut playlist)?;
    println!("{}", engine.system_status());

    engine.set_sink(Sink::renderer(TracingRenderer::new("Screen")));
    engine.play_playlist(&mut playlist)?;
    println!("{}", engine.system_status());
    println!("{:?}", store.stats());

    Ok(())
}
