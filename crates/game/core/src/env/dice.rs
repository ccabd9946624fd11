//! Dice for percentage-based combat mechanics.
//!
//! Dodge rolls draw a uniform integer in `[1, 100]`. Production code plugs in
//! an entropy-backed implementation from the runtime; [`PcgDice`] gives a
//! reproducible sequence from a seed and [`ScriptedDice`] replays fixed
//! values for tests and scenario scripts.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of d100 rolls.
pub trait Dice: Send + Sync {
    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self) -> u32;
}

/// Seeded PCG-XSH-RR dice.
///
/// Each roll advances the internal 64-bit state, so two instances built from
/// the same seed produce the same sequence.
#[derive(Debug)]
pub struct PcgDice {
    state: AtomicU64,
}

impl PcgDice {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self {
            state: AtomicU64::new(seed),
        }
    }

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    fn next_u32(&self) -> u32 {
        let previous = self
            .state
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |state| {
                Some(Self::pcg_step(state))
            })
            .unwrap_or_else(|state| state);
        Self::pcg_output(Self::pcg_step(previous))
    }
}

impl Dice for PcgDice {
    fn roll_d100(&self) -> u32 {
        (self.next_u32() % 100) + 1
    }
}

/// Dice that replay a fixed script of rolls.
///
/// Once the script is exhausted every roll returns `fallback`.
#[derive(Debug)]
pub struct ScriptedDice {
    rolls: Mutex<VecDeque<u32>>,
    fallback: u32,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>, fallback: u32) -> Self {
        Self {
            rolls: Mutex::new(rolls.into_iter().collect()),
            fallback: fallback.clamp(1, 100),
        }
    }

    /// Dice that always roll the same value.
    pub fn always(roll: u32) -> Self {
        Self::new([], roll)
    }
}

impl Dice for ScriptedDice {
    fn roll_d100(&self) -> u32 {
        let mut rolls = self
            .rolls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rolls
            .pop_front()
            .map(|roll| roll.clamp(1, 100))
            .unwrap_or(self.fallback)
    }
}
