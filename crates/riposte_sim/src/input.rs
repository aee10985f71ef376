//! Input samples and the per-player input ring.
//!
//! A pad sample is one byte; the ring holds the last
//! [`WINDOW_BUFFER_SIZE`] samples indexed by *age*:
//! `ring[current_frame - frame]` is the sample for `frame`. Samples
//! older than the window are gone - the rollback window is bounded by
//! design, and asking past it is a programmer error.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::constants::WINDOW_BUFFER_SIZE;

/// Bit-packed pad sample for one player and one frame.
///
/// Unused bits must be zero; the byte travels on the wire verbatim.
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct PadInput(pub u8);

impl PadInput {
    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Jump.
    pub const UP: u8 = 1 << 0;
    /// Reserved; no crouch mechanic is wired to it.
    pub const DOWN: u8 = 1 << 1;
    /// Walk / dash left.
    pub const LEFT: u8 = 1 << 2;
    /// Walk / dash right.
    pub const RIGHT: u8 = 1 << 3;
    /// Spawn an attack hitbox.
    pub const ATTACK: u8 = 1 << 4;

    /// Creates a sample from raw bits.
    #[inline]
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits of the sample.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether `UP` is held.
    #[inline]
    #[must_use]
    pub const fn up(self) -> bool {
        self.0 & Self::UP != 0
    }

    /// Whether `DOWN` is held.
    #[inline]
    #[must_use]
    pub const fn down(self) -> bool {
        self.0 & Self::DOWN != 0
    }

    /// Whether `LEFT` is held.
    #[inline]
    #[must_use]
    pub const fn left(self) -> bool {
        self.0 & Self::LEFT != 0
    }

    /// Whether `RIGHT` is held.
    #[inline]
    #[must_use]
    pub const fn right(self) -> bool {
        self.0 & Self::RIGHT != 0
    }

    /// Whether `ATTACK` is held.
    #[inline]
    #[must_use]
    pub const fn attack(self) -> bool {
        self.0 & Self::ATTACK != 0
    }
}

/// Fixed-depth ring of one player's recent input samples, newest first.
///
/// Index 0 is the sample for the current frame; index `n` is the sample
/// for `current_frame - n`.
#[derive(Clone)]
pub struct InputRing {
    samples: [PadInput; WINDOW_BUFFER_SIZE],
}

impl InputRing {
    /// Creates a ring filled with [`PadInput::NONE`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: [PadInput::NONE; WINDOW_BUFFER_SIZE],
        }
    }

    /// Returns the sample `offset` frames in the past.
    ///
    /// # Panics
    ///
    /// Panics if `offset` reaches past the rollback window; callers must
    /// not ask for frames the ring no longer holds.
    #[must_use]
    pub fn sample(&self, offset: usize) -> PadInput {
        assert!(
            offset < WINDOW_BUFFER_SIZE,
            "input {offset} frames in the past is outside the rollback window"
        );
        self.samples[offset]
    }

    /// Overwrites the sample `offset` frames in the past.
    ///
    /// # Panics
    ///
    /// Panics if `offset` reaches past the rollback window.
    pub fn set(&mut self, offset: usize, input: PadInput) {
        assert!(
            offset < WINDOW_BUFFER_SIZE,
            "input {offset} frames in the past is outside the rollback window"
        );
        self.samples[offset] = input;
    }

    /// Ages the ring by `delta` frames: every sample moves `delta` slots
    /// toward the past and the vacated head is filled with the previous
    /// newest sample (hold-last-input prediction).
    ///
    /// The shift runs with descending indices so it can work in place.
    pub fn shift_right(&mut self, delta: usize) {
        if delta == 0 {
            return;
        }
        if delta >= WINDOW_BUFFER_SIZE {
            self.samples = [self.samples[0]; WINDOW_BUFFER_SIZE];
            return;
        }
        for i in (delta..WINDOW_BUFFER_SIZE).rev() {
            self.samples[i] = self.samples[i - delta];
        }
        let head = self.samples[delta];
        for slot in &mut self.samples[..delta] {
            *slot = head;
        }
    }

    /// Overwrites the `count` newest slots with `input` (prediction
    /// after a watermark advance).
    pub fn backfill_newest(&mut self, count: usize, input: PadInput) {
        let count = count.min(WINDOW_BUFFER_SIZE);
        for slot in &mut self.samples[..count] {
            *slot = input;
        }
    }
}

impl Default for InputRing {
    fn default() -> Self {
        Self::new()
    }
}
