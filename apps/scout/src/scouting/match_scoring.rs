//! Match Scoring — heuristic compatibility between a startup and an accelerator.
//!
//! Default: `HeuristicScorer` (pure, deterministic, no I/O).
//! `AppState` holds an `Arc<dyn MatchScorer>` so the heuristic can be swapped
//! without touching the batch runner or handlers.
//!
//! Points are accumulated in hundredths and converted once, so the common
//! totals (0.70, 0.85, 1.00) are exact.

use crate::models::records::{AcceleratorRecord, StartupRecord};

const BASE_POINTS: u32 = 20;
const SECTOR_MATCH_POINTS: u32 = 50;
const SAME_COUNTRY_POINTS: u32 = 30;
const MULTI_COUNTRY_POINTS: u32 = 15;
const MAX_POINTS: u32 = 100;

pub trait MatchScorer: Send + Sync {
    /// Returns a score in `[0.2, 1.0]`.
    fn score(&self, startup: &StartupRecord, accelerator: &AcceleratorRecord) -> f64;
}

pub struct HeuristicScorer;

impl MatchScorer for HeuristicScorer {
    fn score(&self, startup: &StartupRecord, accelerator: &AcceleratorRecord) -> f64 {
        match_score(startup, accelerator)
    }
}

/// Algorithm:
/// 1. Start at 0.20.
/// 2. +0.50 for every sector token that equals some focus token.
///    Tokens are lower-cased and split on commas, slashes and whitespace.
///    Several matching sector tokens each add their own bonus.
/// 3. Same country (case-insensitive) → +0.30; otherwise an accelerator
///    country containing "multi" or "eu" → +0.15. Skipped if either is blank.
/// 4. Cap at 1.00.
pub fn match_score(startup: &StartupRecord, accelerator: &AcceleratorRecord) -> f64 {
    let points = BASE_POINTS
        + sector_points(&startup.sector, &accelerator.focus)
        + country_points(&startup.country, &accelerator.country);

    points.min(MAX_POINTS) as f64 / 100.0
}

fn tokens(field: &str) -> Vec<String> {
    field
        .to_lowercase()
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn sector_points(sector: &str, focus: &str) -> u32 {
    let focuses = tokens(focus);
    let matching = tokens(sector)
        .iter()
        .filter(|s| focuses.contains(s))
        .count() as u32;
    matching * SECTOR_MATCH_POINTS
}

fn country_points(startup_country: &str, accelerator_country: &str) -> u32 {
    let startup_country = startup_country.to_lowercase();
    let accelerator_country = accelerator_country.to_lowercase();

    if startup_country.is_empty() || accelerator_country.is_empty() {
        0
    } else if startup_country == accelerator_country {
        SAME_COUNTRY_POINTS
    } else if accelerator_country.contains("multi") || accelerator_country.contains("eu") {
        MULTI_COUNTRY_POINTS
    } else {
        0
    }
}
