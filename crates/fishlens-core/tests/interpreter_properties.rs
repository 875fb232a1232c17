//! Randomized checks of interpreter invariants.
//!
//! Sequences are generated from a seeded `StdRng` so failures reproduce.

use fishlens_core::interpret::FishResultInterpreter;
use fishlens_core::ClassificationEntry;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const SEED: u64 = 0x5A1_404;
const ROUNDS: usize = 200;

const WORDS: &[&str] = &[
    "tiger", "shark", "goldfish", "reef", "umbrella", "cod", "rainbow", "trout", "towel", "coral",
    "Salmon", "kelp", "bass", "guitar", "marine", "iguana", "tuna", "aquatic", "lobster", "rock",
];

fn random_label(rng: &mut StdRng) -> String {
    let len = rng.gen_range(1..=3);
    (0..len)
        .map(|_| *WORDS.choose(rng).unwrap())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Entries with non-increasing scores, like any normalized ranking.
fn random_ranking(rng: &mut StdRng) -> Vec<ClassificationEntry> {
    let n = rng.gen_range(0..=12);
    let mut scores: Vec<f32> = (0..n).map(|_| rng.gen_range(0.0..=1.0)).collect();
    scores.sort_by(|a, b| b.total_cmp(a));
    scores
        .into_iter()
        .map(|score| ClassificationEntry::new(random_label(rng), score))
        .collect()
}

#[test]
fn test_order_and_scores_preserved() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..ROUNDS {
        let entries = random_ranking(&mut rng);
        let k = rng.gen_range(1..=15);
        let out = FishResultInterpreter::new(k).interpret(&entries);

        for (record, entry) in out.records.iter().zip(&entries) {
            assert_eq!(record.label, entry.label);
            assert_eq!(record.score, entry.score);
        }
    }
}

#[test]
fn test_truncates_to_min_of_len_and_k() {
    let mut rng = StdRng::seed_from_u64(SEED + 1);
    for _ in 0..ROUNDS {
        let entries = random_ranking(&mut rng);
        let k = rng.gen_range(1..=15);
        let out = FishResultInterpreter::new(k).interpret(&entries);
        assert_eq!(out.records.len(), entries.len().min(k));
    }
}

#[test]
fn test_relevance_is_stable_on_reinterpretation() {
    let mut rng = StdRng::seed_from_u64(SEED + 2);
    let interpreter = FishResultInterpreter::default();
    for _ in 0..ROUNDS {
        let entries = random_ranking(&mut rng);
        let first = interpreter.interpret(&entries);

        let relabeled: Vec<ClassificationEntry> = first
            .records
            .iter()
            .map(|r| ClassificationEntry::new(r.label.clone(), r.score))
            .collect();
        let second = interpreter.interpret(&relabeled);

        assert_eq!(first, second);
        for record in &first.records {
            assert_eq!(record.is_fish(), interpreter.is_relevant(&record.label));
        }
    }
}

#[test]
fn test_taxonomy_fields_all_or_nothing() {
    let mut rng = StdRng::seed_from_u64(SEED + 3);
    let interpreter = FishResultInterpreter::default();
    for _ in 0..ROUNDS {
        for record in interpreter.interpret(&random_ranking(&mut rng)).records {
            let present = [
                record.species.is_some(),
                record.genus.is_some(),
                record.common_name.is_some(),
            ];
            assert!(present.iter().all(|&p| p) || present.iter().all(|&p| !p));
            if let Some(common) = &record.common_name {
                assert_eq!(common, &record.label);
            }
        }
    }
}

#[test]
fn test_no_fish_signal_matches_records() {
    let mut rng = StdRng::seed_from_u64(SEED + 4);
    for _ in 0..ROUNDS {
        let entries = random_ranking(&mut rng);
        let out = FishResultInterpreter::new(rng.gen_range(1..=6)).interpret(&entries);
        let expected = out.records.iter().all(|r| r.species.is_none());
        assert_eq!(out.no_fish_detected, expected);
    }
}
