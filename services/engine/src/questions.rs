//! Question set generation
//!
//! Produces a fixed-length ordered sequence of graded arithmetic items.
//! Pure over the supplied RNG: the same seed yields the same sequence, and
//! nothing here touches shared state, so one generator serves every tier.

use rand::seq::SliceRandom;
use rand::Rng;
use types::question::{QuestionItem, OPTION_COUNT};

/// Operand range for the addition prompts
const OPERAND_MIN: u32 = 1;
const OPERAND_MAX: u32 = 50;

/// Decoys are drawn within ±DECOY_SPREAD of the correct sum
const DECOY_SPREAD: i64 = 10;

/// Generate `count` addition questions with shuffled candidate answers.
///
/// Every item has exactly four distinct positive candidates including the
/// correct sum; the correct answer's slot carries no information.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<QuestionItem> {
    (0..count).map(|index| generate_item(rng, index)).collect()
}

fn generate_item<R: Rng + ?Sized>(rng: &mut R, index: usize) -> QuestionItem {
    let a = rng.gen_range(OPERAND_MIN..=OPERAND_MAX);
    let b = rng.gen_range(OPERAND_MIN..=OPERAND_MAX);
    let correct = a + b;

    let mut options = vec![correct];
    // Rejection-sample decoys; the candidate space around the sum is small
    // but dense enough that this converges in a handful of draws.
    while options.len() < OPTION_COUNT {
        let offset = rng.gen_range(-DECOY_SPREAD..=DECOY_SPREAD);
        let decoy = correct as i64 + offset;
        if decoy > 0 && !options.contains(&(decoy as u32)) {
            options.push(decoy as u32);
        }
    }
    options.shuffle(rng);

    QuestionItem {
        index,
        prompt: format!("{} + {} = ?", a, b),
        options: [options[0], options[1], options[2], options[3]],
        correct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn seeded() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_sequence_is_ordered_without_gaps() {
        let items = generate(&mut seeded(), 20);
        assert_eq!(items.len(), 20);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.index, i);
        }
    }

    #[test]
    fn test_candidates_distinct_positive_and_contain_correct() {
        let items = generate(&mut seeded(), 1000);
        for item in &items {
            assert!(item.options.contains(&item.correct));
            assert!(item.options.iter().all(|&o| o > 0));

            let mut sorted = item.options;
            sorted.sort_unstable();
            for pair in sorted.windows(2) {
                assert_ne!(pair[0], pair[1], "duplicate candidate in {:?}", item);
            }

            // Operand bounds imply the correct sum stays in range
            assert!(item.correct >= 2 * OPERAND_MIN && item.correct <= 2 * OPERAND_MAX);
        }
    }

    #[test]
    fn test_correct_position_roughly_uniform() {
        let items = generate(&mut seeded(), 1000);
        let mut slots = [0usize; OPTION_COUNT];
        for item in &items {
            let pos = item
                .options
                .iter()
                .position(|&o| o == item.correct)
                .unwrap();
            slots[pos] += 1;
        }

        // Expected 250 per slot; allow a generous statistical tolerance.
        for (i, &count) in slots.iter().enumerate() {
            assert!(
                (180..=320).contains(&count),
                "slot {} saw {} of 1000 correct answers",
                i,
                count
            );
        }
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let first = generate(&mut seeded(), 20);
        let second = generate(&mut seeded(), 20);
        assert_eq!(first, second);
    }
}
