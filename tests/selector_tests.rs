//! Target selection over built-in tiers and custom pools

use moldrop::core::{fallback_molecule, select_target, SimpleRng, TargetSelector};
use moldrop::types::Molecule;

#[test]
fn test_custom_pool_never_repeats_immediately() {
    let pool = vec![
        Molecule::new("Ethane", "CC"),
        Molecule::new("Methanol", "CO"),
        Molecule::new("Propane", "CCC"),
        Molecule::new("Ethanol", "CCO"),
    ];
    let mut rng = SimpleRng::new(9);
    let mut previous: Option<String> = None;
    let mut longest_run = 1;
    let mut run = 1;

    for _ in 0..2_000 {
        let next = select_target(5, previous.as_deref(), Some(&pool), &mut rng);
        assert!(pool.contains(&next));
        if previous.as_deref() == Some(next.name.as_str()) {
            run += 1;
            longest_run = longest_run.max(run);
        } else {
            run = 1;
        }
        previous = Some(next.name);
    }
    assert!(longest_run <= pool.len(), "run of {longest_run}");
}

#[test]
fn test_single_entry_pool_repeats() {
    let pool = vec![Molecule::new("Water", "O")];
    let mut rng = SimpleRng::new(1);
    for _ in 0..10 {
        assert_eq!(select_target(0, Some("Water"), Some(&pool), &mut rng).name, "Water");
    }
}

#[test]
fn test_early_game_uses_first_tier() {
    let selector = TargetSelector::builtin();
    let mut rng = SimpleRng::new(3);
    for _ in 0..200 {
        let m = selector.select(0, None, &mut rng);
        assert!(selector.tier(0).contains(&m), "{} outside tier 1", m.name);
    }
}

#[test]
fn test_late_game_reaches_hard_tier() {
    let selector = TargetSelector::builtin();
    let mut rng = SimpleRng::new(5);
    let hard = (0..500)
        .map(|_| selector.select(20, None, &mut rng))
        .filter(|m| selector.tier(2).contains(m))
        .count();
    assert!(hard > 300, "only {hard} hard targets");
}

#[test]
fn test_empty_pools_fall_back() {
    let selector = TargetSelector::with_tiers([Vec::new(), Vec::new(), Vec::new()])
        .with_custom_pool(Some(Vec::new()));
    let mut rng = SimpleRng::new(0);
    let m = selector.select(12, Some("Ethane"), &mut rng);
    assert_eq!(m, fallback_molecule());
    assert_eq!(m.pattern, "CC");
}

/// Share of picks drawn from each built-in tier at `clear_count`
fn tier_shares(clear_count: u32, seed: u32) -> [f64; 3] {
    const TRIALS: usize = 4_000;
    let selector = TargetSelector::builtin();
    let mut rng = SimpleRng::new(seed);
    let mut counts = [0usize; 3];
    for _ in 0..TRIALS {
        let m = selector.select(clear_count, None, &mut rng);
        let tier = (0..3)
            .find(|&t| selector.tier(t).contains(&m))
            .expect("pick comes from a built-in tier");
        counts[tier] += 1;
    }
    counts.map(|c| c as f64 / TRIALS as f64)
}

fn assert_near(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 0.05,
        "{what}: {actual:.3} not near {expected:.2}"
    );
}

#[test]
fn test_tier_two_weight_grows_through_mid_game() {
    let at_two = tier_shares(2, 17);
    assert_near(at_two[1], 0.35, "tier 2 at 2 clears");
    assert_eq!(at_two[2], 0.0);

    let at_five = tier_shares(5, 23);
    assert_near(at_five[1], 0.80, "tier 2 at 5 clears");
    assert_eq!(at_five[2], 0.0);
}

#[test]
fn test_three_way_split_at_six_clears() {
    let shares = tier_shares(6, 31);
    assert_near(shares[2], 0.40, "tier 3 at 6 clears");
    assert_near(shares[1], 0.30, "tier 2 at 6 clears");
    assert_near(shares[0], 0.30, "tier 1 at 6 clears");
}

#[test]
fn test_builtin_tier_never_repeats_past_its_size() {
    let selector = TargetSelector::builtin();
    let tier_size = selector.tier(0).len();
    let mut rng = SimpleRng::new(41);
    let mut previous: Option<String> = None;
    let mut run = 1;
    let mut longest_run = 1;

    for _ in 0..2_000 {
        let next = selector.select(0, previous.as_deref(), &mut rng);
        if previous.as_deref() == Some(next.name.as_str()) {
            run += 1;
            longest_run = longest_run.max(run);
        } else {
            run = 1;
        }
        previous = Some(next.name);
    }
    assert!(longest_run <= tier_size, "run of {longest_run}");
}
