use rand::Rng;

use loomie_core::Dice;

/// Dice backed by the thread-local generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadDice;

impl Dice for ThreadDice {
    fn roll_d100(&self) -> u32 {
        rand::thread_rng().gen_range(1..=100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_stay_in_range() {
        let dice = ThreadDice;
        for _ in 0..1_000 {
            let roll = dice.roll_d100();
            assert!((1..=100).contains(&roll));
        }
    }
}
