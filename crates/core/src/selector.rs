//! Target selector - weighted choice of the next molecule to build
//!
//! Three built-in difficulty tiers; harder tiers become more likely as the
//! player clears more molecules. A custom pool, when configured, replaces the
//! tiers entirely. Both paths avoid handing out the same molecule twice in a
//! row using a bounded number of re-rolls.
//!
//! | Cleared | Tier roll |
//! |---------|-----------|
//! | 0-1 | tier 1 |
//! | 2-5 | tier 2 with `min(0.85, 0.35 + (n-2)*0.15)`, else tier 1 |
//! | 6+ | tier 3 with `min(0.9, 0.4 + (n-6)*0.1)`, then tier 2 with `min(0.7, 0.3 + (n-6)*0.08)`, else tier 1 |

use log::warn;

use crate::rng::SimpleRng;
use crate::types::Molecule;

const TIER_1: &[(&str, &str)] = &[
    ("Ethane", "CC"),
    ("Methanol", "CO"),
    ("Dioxygen", "O=O"),
    ("Carbon dioxide", "O=C=O"),
    ("Propane", "CCC"),
    ("Ethanol", "CCO"),
    ("Dimethyl ether", "COC"),
];

const TIER_2: &[(&str, &str)] = &[
    ("Butane", "CCCC"),
    ("Isobutane", "CC(C)C"),
    ("Propanol", "CCCO"),
    ("Isopropanol", "CC(O)C"),
    ("Acetone", "CC(=O)C"),
    ("Acetic acid", "CC(=O)O"),
    ("Ethylene glycol", "OCCO"),
];

const TIER_3: &[(&str, &str)] = &[
    ("Pentane", "CCCCC"),
    ("Neopentane", "CC(C)(C)C"),
    ("Diethyl ether", "CCOCC"),
    ("Isobutanol", "CC(C)CO"),
    ("Methyl acetate", "CC(=O)OC"),
    ("Butanoic acid", "CCCC(=O)O"),
    ("Lactic acid", "CC(O)C(=O)O"),
    ("Glycerol", "OCC(O)CO"),
];

/// Returned only when every pool is empty
pub fn fallback_molecule() -> Molecule {
    let (name, pattern) = TIER_1
        .iter()
        .min_by_key(|(_, pattern)| pattern.len())
        .copied()
        .unwrap_or(("Ethane", "CC"));
    Molecule::new(name, pattern)
}

fn to_pool(entries: &[(&str, &str)]) -> Vec<Molecule> {
    entries
        .iter()
        .map(|&(name, pattern)| Molecule::new(name, pattern))
        .collect()
}

/// Chooses targets from tiered pools or a custom pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSelector {
    tiers: [Vec<Molecule>; 3],
    custom_pool: Option<Vec<Molecule>>,
}

impl TargetSelector {
    /// Selector over the built-in tiers
    pub fn builtin() -> Self {
        Self::with_tiers([to_pool(TIER_1), to_pool(TIER_2), to_pool(TIER_3)])
    }

    pub fn with_tiers(tiers: [Vec<Molecule>; 3]) -> Self {
        Self {
            tiers,
            custom_pool: None,
        }
    }

    /// Replace the tiers with a custom pool (an empty pool is ignored)
    pub fn with_custom_pool(mut self, pool: Option<Vec<Molecule>>) -> Self {
        self.custom_pool = pool.filter(|p| !p.is_empty());
        self
    }

    pub fn tier(&self, index: usize) -> &[Molecule] {
        &self.tiers[index]
    }

    pub fn custom_pool(&self) -> Option<&[Molecule]> {
        self.custom_pool.as_deref()
    }

    /// Pick the next target. Never fails; see [`fallback_molecule`].
    pub fn select(
        &self,
        clear_count: u32,
        previous: Option<&str>,
        rng: &mut SimpleRng,
    ) -> Molecule {
        if let Some(pool) = &self.custom_pool {
            if let Some(m) = pick_avoiding(pool, previous, rng) {
                return m;
            }
        }

        for tier in tier_order(clear_count, rng) {
            if let Some(m) = pick_avoiding(&self.tiers[tier], previous, rng) {
                return m;
            }
        }

        warn!("all molecule pools are empty, using fallback target");
        fallback_molecule()
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Tier indices to try, preferred first
fn tier_order(clear_count: u32, rng: &mut SimpleRng) -> [usize; 3] {
    const EASY: [usize; 3] = [0, 1, 2];
    const MEDIUM: [usize; 3] = [1, 0, 2];
    const HARD: [usize; 3] = [2, 1, 0];

    if clear_count < 2 {
        return EASY;
    }

    if clear_count < 6 {
        let p_medium = (0.35 + (clear_count - 2) as f64 * 0.15).min(0.85);
        return if rng.next_f64() < p_medium { MEDIUM } else { EASY };
    }

    let steps = (clear_count - 6) as f64;
    let p_hard = (0.4 + steps * 0.1).min(0.9);
    let p_medium = (0.3 + steps * 0.08).min(0.7);
    let roll = rng.next_f64();
    if roll < p_hard {
        HARD
    } else if roll < p_hard + p_medium {
        MEDIUM
    } else {
        EASY
    }
}

/// Uniform pick that re-rolls up to `pool.len()` times to dodge `previous`
fn pick_avoiding(
    pool: &[Molecule],
    previous: Option<&str>,
    rng: &mut SimpleRng,
) -> Option<Molecule> {
    let first = pool.first()?;
    if pool.len() == 1 {
        return Some(first.clone());
    }

    for _ in 0..pool.len() {
        let Some(idx) = rng.pick_index(pool.len()) else {
            break;
        };
        let candidate = &pool[idx];
        if previous != Some(candidate.name.as_str()) {
            return Some(candidate.clone());
        }
    }

    Some(first.clone())
}

/// One-shot selection over the built-in tiers, honoring an optional custom pool
pub fn select_target(
    clear_count: u32,
    previous: Option<&str>,
    custom_pool: Option<&[Molecule]>,
    rng: &mut SimpleRng,
) -> Molecule {
    TargetSelector::builtin()
        .with_custom_pool(custom_pool.map(<[Molecule]>::to_vec))
        .select(clear_count, previous, rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pool: &[Molecule]) -> Vec<&str> {
        pool.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_early_game_uses_tier_one() {
        let selector = TargetSelector::builtin();
        let tier1 = names(selector.tier(0));
        let mut rng = SimpleRng::new(42);
        for _ in 0..200 {
            let m = selector.select(0, None, &mut rng);
            assert!(tier1.contains(&m.name.as_str()), "{} not tier 1", m.name);
        }
    }

    #[test]
    fn test_mid_game_never_reaches_tier_three() {
        let selector = TargetSelector::builtin();
        let tier3 = names(selector.tier(2));
        let mut rng = SimpleRng::new(7);
        let mut saw_tier2 = false;
        for _ in 0..300 {
            let m = selector.select(4, None, &mut rng);
            assert!(!tier3.contains(&m.name.as_str()));
            saw_tier2 |= names(selector.tier(1)).contains(&m.name.as_str());
        }
        assert!(saw_tier2);
    }

    #[test]
    fn test_late_game_mostly_hard() {
        let selector = TargetSelector::builtin();
        let tier3 = names(selector.tier(2));
        let mut rng = SimpleRng::new(11);
        let hard = (0..1000)
            .filter(|_| tier3.contains(&selector.select(20, None, &mut rng).name.as_str()))
            .count();
        // p_hard is capped at 0.9 from 11 clears on.
        assert!(hard > 800, "only {} hard picks", hard);
    }

    #[test]
    fn test_custom_pool_overrides_tiers() {
        let pool = vec![Molecule::new("A", "CO"), Molecule::new("B", "OCO")];
        let selector = TargetSelector::builtin().with_custom_pool(Some(pool));
        let mut rng = SimpleRng::new(5);
        for _ in 0..50 {
            let m = selector.select(30, None, &mut rng);
            assert!(m.name == "A" || m.name == "B");
        }
    }

    #[test]
    fn test_empty_custom_pool_is_ignored() {
        let selector = TargetSelector::builtin().with_custom_pool(Some(Vec::new()));
        assert!(selector.custom_pool().is_none());
    }

    #[test]
    fn test_single_entry_pool_repeats() {
        let pool = vec![Molecule::new("Only", "CC")];
        let mut rng = SimpleRng::new(1);
        let m = select_target(0, Some("Only"), Some(&pool), &mut rng);
        assert_eq!(m.name, "Only");
    }

    #[test]
    fn test_empty_pools_fall_back() {
        let selector = TargetSelector::with_tiers([Vec::new(), Vec::new(), Vec::new()]);
        let mut rng = SimpleRng::new(1);
        let m = selector.select(10, None, &mut rng);
        assert_eq!(m, Molecule::new("Ethane", "CC"));
    }

    #[test]
    fn test_tier_order_bands() {
        let mut rng = SimpleRng::new(3);
        assert_eq!(tier_order(0, &mut rng), [0, 1, 2]);
        assert_eq!(tier_order(1, &mut rng), [0, 1, 2]);
        for _ in 0..100 {
            assert_ne!(tier_order(3, &mut rng)[0], 2);
        }
    }
}
