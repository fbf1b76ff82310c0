#[macro_use]
extern crate log;

use anyhow::{Context, Result};
use pcm_tempo_rs::config::{self, Config};
use pcm_tempo_rs::sources::PcmSource;
use pcm_tempo_rs::stretcher::OlaStretcher;
use pcm_tempo_rs::{event, render, EventBus, TempoStream};

mod net;
mod stdin;


type Stream = TempoStream<Box<dyn PcmSource + Send>, OlaStretcher>;

fn open_stream(config: &Config, bus: &EventBus) -> Result<Stream> {
    let source = config.input.open()?;
    let format = source.format();
    info!(
        "Input: {} Hz, {} channels, {} bits",
        format.sample_rate, format.channels, format.bits_per_sample
    );

    let stream = TempoStream::new(source, OlaStretcher::new, config.stream.clone())
        .context("Unsupported input")?
        .with_observer(bus.clone());

    Ok(stream)
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => config::load_from(path).await?,
        None => config::load().await?,
    };

    let bus = EventBus::new();
    event::debug(&bus);

    if let Some(path) = &config.output.path {
        let mut stream = open_stream(&config, &bus)?;
        let frames = tokio::task::block_in_place(|| render::render_to_wav(&mut stream, path))?;
        info!("Wrote {} frames to {}", frames, path.display());
    }

    if let Some(addr) = &config.output.listen {
        let stream = open_stream(&config, &bus)?;
        stdin::start(stream.tempo_handle(), stream.tempo());
        net::serve(addr, stream).await?;
    }

    Ok(())
}
