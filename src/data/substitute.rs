//! Helpers for deterministic substitute datasets.

use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;

use crate::period::Period;

/// RNG seeded from the section key and period.
pub fn seeded_rng(section_key: &str, period: &Period) -> StdRng {
    let mut hasher = FxHasher::default();
    section_key.hash(&mut hasher);
    period.hash(&mut hasher);
    StdRng::seed_from_u64(hasher.finish())
}

pub fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

/// Random ISO date inside the period.
pub fn date_in_period(rng: &mut StdRng, period: &Period) -> String {
    let day = rng.gen_range(1..=period.days_in_month());
    format!("{}-{:02}", period, day)
}

/// `PREFIX-YYMM-NNN`
pub fn record_id(prefix: &str, period: &Period, n: usize) -> String {
    format!(
        "{}-{:02}{:02}-{:03}",
        prefix,
        period.year().rem_euclid(100),
        period.month(),
        n
    )
}

/// Amount rounded to whole units.
pub fn amount(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    rng.gen_range(min..max).round()
}
