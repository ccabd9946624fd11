//! Dodge rolls.
//!
//! Only the gym side dodges by die roll. The player dodges by timed input,
//! resolved by the runtime's dodge window, never here.

use crate::env::Dice;

/// Probability (percent) that a gym creature dodges a player attack.
pub const GYM_DODGE_PERCENT: u32 = 10;

/// Returns true iff a d100 roll lands at or under `probability_percent`.
pub fn roll_dodge(dice: &(impl Dice + ?Sized), probability_percent: u32) -> bool {
    dice.roll_d100() <= probability_percent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedDice;

    #[test]
    fn roll_at_threshold_dodges() {
        let dice = ScriptedDice::new([10, 11, 1, 100], 50);
        assert!(roll_dodge(&dice, GYM_DODGE_PERCENT));
        assert!(!roll_dodge(&dice, GYM_DODGE_PERCENT));
        assert!(roll_dodge(&dice, GYM_DODGE_PERCENT));
        assert!(!roll_dodge(&dice, GYM_DODGE_PERCENT));
    }

    #[test]
    fn zero_probability_never_dodges() {
        let dice = ScriptedDice::always(1);
        assert!(!roll_dodge(&dice, 0));
    }
}
