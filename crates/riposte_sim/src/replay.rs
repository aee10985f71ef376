//! Recorded input traces.
//!
//! A trace is the full time-indexed input record of a match - exactly
//! what the transport would have delivered. Feeding the same trace to
//! two fresh cores must produce bit-identical worlds, which makes traces
//! the tool of choice for determinism checks and desync post-mortems.

use serde::{Deserialize, Serialize};

use crate::constants::{Frame, PlayerNumber};
use crate::input::PadInput;
use crate::rollback::RollbackManager;

/// One `(player, frame, input)` tuple as delivered by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSample {
    /// Player the sample belongs to.
    pub player: PlayerNumber,
    /// Frame the sample applies to.
    pub frame: Frame,
    /// The input byte.
    pub input: PadInput,
}

/// An ordered record of every input a match received.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputTrace {
    samples: Vec<TraceSample>,
}

impl InputTrace {
    /// Creates an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sample. Order matters: samples are replayed exactly as
    /// recorded, arrival reordering included.
    pub fn record(&mut self, player: PlayerNumber, frame: Frame, input: PadInput) {
        self.samples.push(TraceSample {
            player,
            frame,
            input,
        });
    }

    /// Recorded samples in arrival order.
    #[must_use]
    pub fn samples(&self) -> &[TraceSample] {
        &self.samples
    }

    /// Largest frame any sample names (0 for an empty trace).
    #[must_use]
    pub fn max_frame(&self) -> Frame {
        self.samples.iter().map(|s| s.frame).max().unwrap_or(0)
    }

    /// Feeds the whole trace into a core in recorded order.
    pub fn apply(&self, rollback: &mut RollbackManager) {
        for sample in &self.samples {
            rollback.set_player_input(sample.player, sample.input, sample.frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PlayerNumber, MAX_PLAYERS, SPAWN_POSITIONS, SPAWN_ROTATIONS};

    fn test_match() -> RollbackManager {
        let mut rollback = RollbackManager::new();
        for slot in 0..MAX_PLAYERS {
            let entity = rollback.create_entity();
            rollback.spawn_player(
                slot as PlayerNumber,
                entity,
                SPAWN_POSITIONS[slot],
                SPAWN_ROTATIONS[slot],
            );
        }
        rollback
    }

    fn scripted_trace() -> InputTrace {
        let mut trace = InputTrace::new();
        for frame in 1..=20 {
            trace.record(0, frame, PadInput::new(PadInput::RIGHT));
            trace.record(1, frame, PadInput::NONE);
        }
        // A late arrival for an old frame, as the wire would deliver it.
        trace.record(1, 3, PadInput::new(PadInput::UP));
        trace
    }

    #[test]
    fn test_trace_survives_serialization() {
        let trace = scripted_trace();
        let encoded = serde_json::to_string(&trace).unwrap();
        let decoded: InputTrace = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.samples(), trace.samples());
        assert_eq!(decoded.max_frame(), 20);
    }

    #[test]
    fn test_identical_traces_produce_identical_worlds() {
        let trace = scripted_trace();

        let mut first = test_match();
        let mut second = test_match();
        for core in [&mut first, &mut second] {
            trace.apply(core);
            core.simulate_to_current_frame();
            core.validate_frame(trace.max_frame());
        }

        for player in 0..MAX_PLAYERS as PlayerNumber {
            assert_eq!(
                first.confirmed_physics_state(player),
                second.confirmed_physics_state(player)
            );
            assert_eq!(
                first.confirmed_player_body(player),
                second.confirmed_player_body(player)
            );
        }
    }
}
