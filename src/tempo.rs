//! Staged tempo changes.
//!
//! The stretcher must never see a new ratio in the middle of an iteration,
//! so tempo updates are recorded here and picked up by the pull loop at the
//! start of its next iteration.

use std::sync::{Arc, Mutex};

pub(crate) fn is_valid_tempo(tempo: f64) -> bool {
    tempo.is_finite() && tempo > 0.0
}

/// Tempo owned by a single stream, plus whether the stretcher is out of date.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TempoState {
    tempo: f64,
    pending: bool,
}

impl TempoState {
    /// New state with `tempo` already pending, so the first iteration hands
    /// the stretcher its ratio.
    pub fn new(tempo: f64) -> Self {
        Self {
            tempo,
            pending: true,
        }
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Stage a new tempo. Returns false (and changes nothing) for values
    /// that are not positive and finite.
    pub fn set(&mut self, tempo: f64) -> bool {
        if !is_valid_tempo(tempo) {
            return false;
        }
        self.tempo = tempo;
        self.pending = true;
        true
    }

    /// Time ratio to hand to the stretcher, if a change is pending.
    pub fn take_pending_ratio(&mut self) -> Option<f64> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(1.0 / self.tempo)
    }
}

/// Cloneable single-slot cell for posting tempo changes from another thread.
///
/// Only the most recent value posted before an iteration is applied.
#[derive(Clone, Debug, Default)]
pub struct TempoHandle {
    slot: Arc<Mutex<Option<f64>>>,
}

impl TempoHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, tempo: f64) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(tempo);
        }
    }

    /// Value posted since the last `take`, if any.
    pub fn peek(&self) -> Option<f64> {
        self.slot.lock().ok().and_then(|slot| *slot)
    }

    pub(crate) fn take(&self) -> Option<f64> {
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }
}
