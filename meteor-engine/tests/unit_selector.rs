use meteor_common::Target;
use meteor_engine::TargetSelector;
use std::collections::HashMap;

fn targets(weights: &[f64]) -> Vec<Target> {
    weights
        .iter()
        .enumerate()
        .map(|(i, w)| Target::new(format!("http://t{i}/"), *w))
        .collect()
}

#[test]
fn test_weights_are_normalized() {
    let selector = TargetSelector::seeded(&targets(&[3.0, 1.0]), 1);
    let normalized: Vec<f64> = selector.targets().iter().map(|t| t.weight).collect();
    assert_eq!(normalized, vec![0.75, 0.25]);
    assert_eq!(selector.cumulative_weights(), &[0.75, 1.0]);
}

#[test]
fn test_non_positive_weight_defaults_to_one() {
    let selector = TargetSelector::seeded(&targets(&[0.0, -2.0, 2.0]), 1);
    let normalized: Vec<f64> = selector.targets().iter().map(|t| t.weight).collect();
    assert_eq!(normalized, vec![0.25, 0.25, 0.5]);
}

#[test]
fn test_roll_boundaries() {
    // Cumulative [0.75, 1.0]: first target up to and including 0.75.
    let selector = TargetSelector::seeded(&targets(&[3.0, 1.0]), 1);
    assert_eq!(selector.target_for_roll(0.0), "http://t0/");
    assert_eq!(selector.target_for_roll(0.75), "http://t0/");
    assert_eq!(selector.target_for_roll(0.7500001), "http://t1/");
    assert_eq!(selector.target_for_roll(0.9999999), "http://t1/");
}

#[test]
fn test_roll_past_cumulative_sum_falls_back_to_last() {
    // Ten weights of 0.1 do not sum to exactly 1.0 in floating point.
    let selector = TargetSelector::seeded(&targets(&[0.1; 10]), 1);
    assert_eq!(selector.target_for_roll(1.5), "http://t9/");
}

#[test]
fn test_single_target_always_selected() {
    let mut selector = TargetSelector::seeded(&targets(&[5.0]), 7);
    for _ in 0..100 {
        assert_eq!(selector.select(), "http://t0/");
    }
}

#[test]
fn test_same_seed_same_sequence() {
    let ts = targets(&[1.0, 2.0, 3.0]);
    let mut a = TargetSelector::seeded(&ts, 42);
    let mut b = TargetSelector::seeded(&ts, 42);
    for _ in 0..200 {
        assert_eq!(a.select(), b.select());
    }
}

#[test]
fn test_observed_frequencies_converge_to_weights() {
    const DRAWS: usize = 10_000;
    let weights = [5.0, 3.0, 1.5, 0.5];
    let ts = targets(&weights);
    let total: f64 = weights.iter().sum();

    for seed in [1_u64, 2, 3] {
        let mut selector = TargetSelector::seeded(&ts, seed);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..DRAWS {
            *counts.entry(selector.select().to_string()).or_insert(0) += 1;
        }

        for (i, w) in weights.iter().enumerate() {
            let observed = *counts.get(&format!("http://t{i}/")).unwrap_or(&0) as f64 / DRAWS as f64;
            let expected = w / total;
            assert!(
                (observed - expected).abs() < 0.02,
                "seed {seed}, target {i}: observed {observed:.4}, expected {expected:.4}"
            );
        }
    }
}

#[test]
#[should_panic(expected = "at least one target")]
fn test_empty_targets_panics() {
    let _ = TargetSelector::seeded(&[], 1);
}
