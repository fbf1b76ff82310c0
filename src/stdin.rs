use std::io::Read;

use pcm_tempo_rs::TempoHandle;

/// Multiplier applied per `+` / `-` key press
const TEMPO_STEP: f64 = 1.05;

/// Range the keyboard can reach, matching what the stretcher can honour
const MIN_TEMPO: f64 = 0.1;
const MAX_TEMPO: f64 = 10.0;

/// Tempo after pressing `key`, or `None` if the key does nothing.
pub fn next_tempo(tempo: f64, key: u8) -> Option<f64> {
    let next = match key {
        b'+' => tempo * TEMPO_STEP,
        b'-' => tempo / TEMPO_STEP,
        b'=' => 1.0,
        _ => return None,
    };

    Some(next.clamp(MIN_TEMPO, MAX_TEMPO))
}

/// Adjust the tempo from the keyboard: `+` faster, `-` slower, `=` reset.
///
/// Runs on its own thread since reading stdin blocks.
pub fn start(handle: TempoHandle, initial_tempo: f64) {
    std::thread::spawn(move || {
        let mut tempo = initial_tempo.clamp(MIN_TEMPO, MAX_TEMPO);

        for byte in std::io::stdin().lock().bytes() {
            let Ok(byte) = byte else {
                break;
            };

            let Some(next) = next_tempo(tempo, byte) else {
                continue;
            };

            if next == tempo {
                info!("Tempo already at {:.3}", tempo);
                continue;
            }

            tempo = next;
            handle.set(tempo);
            info!("Tempo set to {:.3}", tempo);
        }
    });
}
