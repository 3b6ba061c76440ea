// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Shared pairing core for chemical and electrical synthesis.

All three regimes produce an ordered list of (pre cell, post cell) pairs;
emission into projections happens afterwards, so chemical and electrical
synthesis draw their pairs from exactly the same machinery.
*/

use super::TargetingMode;
use crate::rng::NetRng;
use crate::targeting::SegmentTargetSpec;
use crate::types::BuildResult;
use connectogen_structures::{ConnectionSite, Point3d};
use tracing::warn;

/// Every ordered pair is considered once; on self projections the diagonal is
/// skipped. A probability at or above one accepts without consuming a draw.
pub(crate) fn probabilistic_pairs(
    rng: &mut NetRng,
    pre_size: usize,
    post_size: usize,
    self_projection: bool,
    probability: f64,
) -> Vec<(u64, u64)> {
    let mut pairs = Vec::new();
    for pre in 0..pre_size {
        for post in 0..post_size {
            if self_projection && pre == post {
                continue;
            }
            if probability >= 1.0 || rng.uniform() < probability {
                pairs.push((pre as u64, post as u64));
            }
        }
    }
    pairs
}

/// Fixed-count selection. Driving cells iterate in index order; per driver
/// the fractional count rounds by Bernoulli draw, then partners are drawn
/// without replacement. When the candidate pool is smaller than the rounded
/// count, selection falls back to drawing with replacement (logged once per
/// call); a driver with no candidates at all forms no pairs.
pub(crate) fn targeted_pairs(
    rng: &mut NetRng,
    pre_size: usize,
    post_size: usize,
    self_projection: bool,
    count: f64,
    mode: TargetingMode,
) -> Vec<(u64, u64)> {
    let (driver_count, candidate_count) = match mode {
        TargetingMode::Convergent => (post_size, pre_size),
        TargetingMode::Divergent => (pre_size, post_size),
    };
    let mut pairs = Vec::new();
    let mut fallback_drivers = 0usize;
    let mut dry_drivers = 0usize;

    for driver in 0..driver_count {
        let k = rng.round_count(count);
        if k == 0 {
            continue;
        }
        let exclude = if self_projection { Some(driver) } else { None };
        let partners = match rng.sample_distinct(k, candidate_count, exclude) {
            Some(partners) => partners,
            None => match rng.sample_with_replacement(k, candidate_count, exclude) {
                Some(partners) => {
                    fallback_drivers += 1;
                    partners
                }
                None => {
                    dry_drivers += 1;
                    continue;
                }
            },
        };
        for partner in partners {
            let pair = match mode {
                TargetingMode::Convergent => (partner as u64, driver as u64),
                TargetingMode::Divergent => (driver as u64, partner as u64),
            };
            pairs.push(pair);
        }
    }

    if fallback_drivers > 0 {
        warn!(
            target: "connectogen-synthesis",
            "Partner pool smaller than requested count for {} driving cells; drew with replacement",
            fallback_drivers
        );
    }
    if dry_drivers > 0 {
        warn!(
            target: "connectogen-synthesis",
            "{} driving cells had no partner candidates and formed no pairs",
            dry_drivers
        );
    }
    pairs
}

/// Distance-dependent selection. Per driving cell, candidates are walked in
/// index order and each is accepted with probability `rule(distance)`; the
/// walk stops once the rounded per-cell count is reached. A rule value at or
/// above one accepts without consuming a draw, so the constant rule 1.0
/// reproduces certain acceptance.
pub(crate) fn distance_pairs(
    rng: &mut NetRng,
    pre_locations: &[Point3d],
    post_locations: &[Point3d],
    self_projection: bool,
    count: f64,
    mode: TargetingMode,
    rule: &dyn Fn(f64) -> f64,
) -> BuildResult<Vec<(u64, u64)>> {
    let (driver_locations, candidate_locations) = match mode {
        TargetingMode::Convergent => (post_locations, pre_locations),
        TargetingMode::Divergent => (pre_locations, post_locations),
    };
    let mut pairs = Vec::new();

    for (driver, driver_location) in driver_locations.iter().enumerate() {
        let k = rng.round_count(count);
        if k == 0 {
            continue;
        }
        let mut accepted = 0usize;
        for (candidate, candidate_location) in candidate_locations.iter().enumerate() {
            if accepted == k {
                break;
            }
            if self_projection && candidate == driver {
                continue;
            }
            let probability = rule(driver_location.distance_to(candidate_location));
            if probability >= 1.0 || rng.uniform() < probability {
                let pair = match mode {
                    TargetingMode::Convergent => (candidate as u64, driver as u64),
                    TargetingMode::Divergent => (driver as u64, candidate as u64),
                };
                pairs.push(pair);
                accepted += 1;
            }
        }
    }
    Ok(pairs)
}

/// Pick one attachment site from a set of target specs, choosing the group
/// uniformly; with no specs the site defaults to the soma center convention
/// (segment 0, fraction 0.5).
pub(crate) fn pick_site(rng: &mut NetRng, specs: &[SegmentTargetSpec]) -> ConnectionSite {
    if specs.is_empty() {
        return ConnectionSite::soma_center();
    }
    let group = if specs.len() == 1 { 0 } else { rng.pick(specs.len()) };
    specs[group].sample_site(rng)
}
