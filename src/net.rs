use std::time::Duration;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;

use pcm_tempo_rs::{PcmSource, TempoStream, TimeStretcher};

const CHUNK_FRAMES: usize = 1024;

/// Serve `stream` to one TCP client at a time until it is exhausted.
///
/// Each client gets a WAV header for an infinite file followed by PCM paced
/// at the stream's sample rate. A client that disconnects early leaves the
/// rest of the stream, starting with the chunk it failed to receive, for the
/// next one.
pub async fn serve<S, T>(addr: &str, mut stream: TempoStream<S, T>) -> Result<()>
where
    S: PcmSource,
    T: TimeStretcher,
{
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not listen on {addr}"))?;
    info!("Listening on {}", addr);

    let mut unsent = None;

    while !stream.is_exhausted() || unsent.is_some() {
        let (mut socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        match send_stream(&mut socket, &mut stream, &mut unsent).await {
            Ok(()) => info!("Finished streaming to {}", peer),
            Err(e) => warn!("Connection to {} closed: {:#}", peer, e),
        }
    }

    Ok(())
}

/// Write a WAV header and then the stream to `socket`.
///
/// `unsent` holds a chunk already taken from the stream that a previous
/// client never received; it is written first, and a chunk that fails to
/// write is put back there.
pub async fn send_stream<S, T, W>(
    socket: &mut W,
    stream: &mut TempoStream<S, T>,
    unsent: &mut Option<Vec<u8>>,
) -> Result<()>
where
    S: PcmSource,
    T: TimeStretcher,
    W: AsyncWrite + Unpin,
{
    let format = stream.format();
    let spec = WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    // Players recognize the stream as a wav file of unknown length
    let header = spec.into_header_for_infinite_file();
    socket
        .write_all(&header[..])
        .await
        .context("Failed to write wav header")?;

    if let Some(chunk) = unsent.take() {
        write_chunk(socket, chunk, unsent).await?;
    }

    let chunk_bytes = CHUNK_FRAMES * format.bytes_per_frame();
    let chunk_duration =
        Duration::from_secs_f64(CHUNK_FRAMES as f64 / format.sample_rate.max(1) as f64);
    let mut interval = tokio::time::interval(chunk_duration);

    while !stream.is_exhausted() {
        interval.tick().await;

        let mut chunk = vec![0u8; chunk_bytes];
        tokio::task::block_in_place(|| stream.fill(&mut chunk));

        write_chunk(socket, chunk, unsent).await?;
    }

    Ok(())
}

async fn write_chunk<W: AsyncWrite + Unpin>(
    socket: &mut W,
    chunk: Vec<u8>,
    unsent: &mut Option<Vec<u8>>,
) -> Result<()> {
    if let Err(e) = socket.write_all(&chunk).await {
        *unsent = Some(chunk);
        return Err(e).context("Failed to write samples");
    }

    Ok(())
}
