//! End-to-end tests: WAV and raw PCM sources through a stream and back out
//! as WAV.

mod common;

use std::f32::consts::PI;
use std::io::Cursor;
use std::path::Path;

use common::*;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use pcm_tempo_rs::config;
use pcm_tempo_rs::render::{render, render_to_wav};
use pcm_tempo_rs::sources::{ReaderSource, WavSource};
use pcm_tempo_rs::stretcher::OlaStretcher;

fn write_wav(path: &Path, channels: u16, bits_per_sample: u16, samples: &[i32]) {
    let spec = WavSpec {
        channels,
        sample_rate: SAMPLE_RATE,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

fn sine_samples(frames: usize, frequency: f32) -> Vec<i32> {
    (0..frames)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            ((2.0 * PI * frequency * t).sin() * 16000.0) as i32
        })
        .collect()
}

fn read_samples(path: &Path) -> Vec<i16> {
    WavReader::open(path)
        .unwrap()
        .into_samples::<i16>()
        .map(Result::unwrap)
        .collect()
}

#[test]
fn test_passthrough_render_is_bit_exact() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");

    let samples: Vec<i32> = (0..3000).map(|i| (i * 23 % 65536) - 32768).collect();
    write_wav(&input, 2, 16, &samples);

    let mut stream = TempoStream::new(
        WavSource::open(&input).unwrap(),
        PassthroughStretcher::new,
        options(100, TailPolicy::Flush),
    )
    .unwrap();
    let frames = render_to_wav(&mut stream, &output).unwrap();

    assert_eq!(frames, 1500);
    let written: Vec<i32> = read_samples(&output).into_iter().map(i32::from).collect();
    assert_eq!(written, samples);

    let reader = WavReader::open(&output).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
}

#[test]
fn test_tempo_changes_rendered_length() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    let frames = SAMPLE_RATE as usize;
    write_wav(&input, 1, 16, &sine_samples(frames, 440.0));

    for (tempo, expected) in [(2.0, frames / 2), (0.5, frames * 2)] {
        let output = dir.path().join(format!("tone-{tempo}.wav"));
        let mut stream = TempoStream::new(
            WavSource::open(&input).unwrap(),
            OlaStretcher::new,
            StreamOptions {
                tempo,
                ..StreamOptions::default()
            },
        )
        .unwrap();

        let rendered = render_to_wav(&mut stream, &output).unwrap() as usize;

        assert!(
            rendered.abs_diff(expected) <= 2 * 1024,
            "tempo {tempo}: expected about {expected} frames, got {rendered}"
        );
        assert_eq!(read_samples(&output).len(), rendered);
    }
}

#[test]
fn test_stretched_tone_stays_in_range() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    write_wav(&input, 1, 16, &sine_samples(20000, 220.0));

    let mut stream = TempoStream::new(
        WavSource::open(&input).unwrap(),
        OlaStretcher::new,
        StreamOptions {
            tempo: 0.75,
            ..StreamOptions::default()
        },
    )
    .unwrap();

    let mut out = Cursor::new(Vec::new());
    render(&mut stream, &mut out).unwrap();
    out.set_position(0);

    let peak = WavReader::new(out)
        .unwrap()
        .into_samples::<i16>()
        .map(|s| s.unwrap().unsigned_abs())
        .max()
        .unwrap();
    assert!(peak > 8000, "tone lost, peak {peak}");
    assert!(peak < 24000, "tone overshoots, peak {peak}");
}

#[test]
fn test_raw_pcm_reader_renders() {
    let data = ramp_pcm(777, 2);
    let source = ReaderSource::new(Cursor::new(data.clone()), StreamFormat::pcm16(SAMPLE_RATE, 2));
    let mut stream = TempoStream::new(
        source,
        PassthroughStretcher::new,
        options(64, TailPolicy::Flush),
    )
    .unwrap();

    let mut out = Cursor::new(Vec::new());
    let frames = render(&mut stream, &mut out).unwrap();
    out.set_position(0);

    assert_eq!(frames, 777);
    let bytes: Vec<u8> = WavReader::new(out)
        .unwrap()
        .into_samples::<i16>()
        .flat_map(|s| s.unwrap().to_le_bytes())
        .collect();
    assert_eq!(bytes, data);
}

#[test]
fn test_24_bit_wav_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("deep.wav");
    write_wav(&input, 2, 24, &[0, 1, -1, 8_000_000]);

    let result = TempoStream::new(
        WavSource::open(&input).unwrap(),
        PassthroughStretcher::new,
        StreamOptions::default(),
    );

    assert_eq!(result.err(), Some(StreamError::UnsupportedBitDepth(24)));
}

#[test]
fn test_config_sine_renders_requested_duration() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("sine.wav");
    let config = config::parse(&format!(
        r#"
[input]
kind = "sine"
frequency = 330.0
seconds = 0.25
sample_rate = 8000
channels = 1

[stream]
block_frames = 256

[output]
path = "{}"
"#,
        output.display()
    ))
    .unwrap();

    let mut stream = TempoStream::new(
        config.input.open().unwrap(),
        PassthroughStretcher::new,
        config.stream.clone(),
    )
    .unwrap();
    let frames = render_to_wav(&mut stream, config.output.path.as_ref().unwrap()).unwrap();

    assert_eq!(frames, 2000);
    assert_eq!(read_samples(&output).len(), 2000);
}
