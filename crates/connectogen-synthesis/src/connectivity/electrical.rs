// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Electrical (gap junction) connectivity synthesis.

Mirrors the chemical regimes through the same pairing core, but emits bare
contacts: no delay exists and no weight is synthesized (callers may assign
conductance scales afterwards). The pre/post roles record the driving
direction used during selection; the junctions themselves are symmetric.
*/

use super::pairing;
use super::synthesis::{check_count, log_skip, placed_locations};
use super::TargetingMode;
use crate::context::BuildContext;
use crate::targeting::SegmentTargetSpec;
use crate::types::{BuildError, BuildResult};
use connectogen_structures::{ElectricalProjection, Population};
use tracing::info;

/// Form gap junctions between every ordered (pre, post) pair independently
/// with the given probability. Semantics match
/// [`probabilistic_projection`](super::probabilistic_projection), including
/// the `None` sentinel for empty populations and zero probability.
pub fn probabilistic_electrical_projection(
    ctx: &mut BuildContext,
    pre: &Population,
    post: &Population,
    gap_junctions: &[String],
    probability: f64,
    pre_targets: &[SegmentTargetSpec],
    post_targets: &[SegmentTargetSpec],
) -> BuildResult<Option<Vec<ElectricalProjection>>> {
    check_components(gap_junctions)?;
    if pre.is_empty() || post.is_empty() || probability <= 0.0 {
        log_skip(pre, post, probability <= 0.0);
        return Ok(None);
    }
    let pairs = pairing::probabilistic_pairs(
        &mut ctx.rng,
        pre.size(),
        post.size(),
        pre.id == post.id,
        probability,
    );
    Ok(Some(emit(
        ctx,
        pre,
        post,
        &pairs,
        gap_junctions,
        pre_targets,
        post_targets,
    )))
}

/// Form a fixed number of gap junctions per driving cell; count rounding,
/// partner selection and the replacement fallback match
/// [`targeted_projection`](super::targeted_projection).
#[allow(clippy::too_many_arguments)]
pub fn targeted_electrical_projection(
    ctx: &mut BuildContext,
    pre: &Population,
    post: &Population,
    gap_junctions: &[String],
    count: f64,
    mode: TargetingMode,
    pre_targets: &[SegmentTargetSpec],
    post_targets: &[SegmentTargetSpec],
) -> BuildResult<Option<Vec<ElectricalProjection>>> {
    check_components(gap_junctions)?;
    check_count(count)?;
    if pre.is_empty() || post.is_empty() {
        log_skip(pre, post, false);
        return Ok(None);
    }
    let pairs = pairing::targeted_pairs(
        &mut ctx.rng,
        pre.size(),
        post.size(),
        pre.id == post.id,
        count,
        mode,
    );
    Ok(Some(emit(
        ctx,
        pre,
        post,
        &pairs,
        gap_junctions,
        pre_targets,
        post_targets,
    )))
}

/// Form gap junctions per driving cell by distance rule, walking candidates
/// in index order exactly like
/// [`distance_projection`](super::distance_projection).
#[allow(clippy::too_many_arguments)]
pub fn distance_electrical_projection<F>(
    ctx: &mut BuildContext,
    pre: &Population,
    post: &Population,
    gap_junctions: &[String],
    count: f64,
    mode: TargetingMode,
    rule: F,
    pre_targets: &[SegmentTargetSpec],
    post_targets: &[SegmentTargetSpec],
) -> BuildResult<Option<Vec<ElectricalProjection>>>
where
    F: Fn(f64) -> f64,
{
    check_components(gap_junctions)?;
    check_count(count)?;
    if pre.is_empty() || post.is_empty() {
        log_skip(pre, post, false);
        return Ok(None);
    }
    let pre_locations = placed_locations(pre)?;
    let post_locations = placed_locations(post)?;
    let pairs = pairing::distance_pairs(
        &mut ctx.rng,
        &pre_locations,
        &post_locations,
        pre.id == post.id,
        count,
        mode,
        &rule,
    )?;
    Ok(Some(emit(
        ctx,
        pre,
        post,
        &pairs,
        gap_junctions,
        pre_targets,
        post_targets,
    )))
}

fn check_components(gap_junctions: &[String]) -> BuildResult<()> {
    if gap_junctions.is_empty() {
        return Err(BuildError::BadParameters(
            "at least one gap junction component is required".to_string(),
        ));
    }
    for (i, component) in gap_junctions.iter().enumerate() {
        if gap_junctions[..i].contains(component) {
            return Err(BuildError::BadParameters(format!(
                "duplicate gap junction component '{}'",
                component
            )));
        }
    }
    Ok(())
}

fn emit(
    ctx: &mut BuildContext,
    pre: &Population,
    post: &Population,
    pairs: &[(u64, u64)],
    gap_junctions: &[String],
    pre_targets: &[SegmentTargetSpec],
    post_targets: &[SegmentTargetSpec],
) -> Vec<ElectricalProjection> {
    let mut projections: Vec<ElectricalProjection> = gap_junctions
        .iter()
        .map(|component| {
            ElectricalProjection::new(
                format!("elect_proj_{}_{}_{}", pre.id, post.id, component),
                pre.id.clone(),
                post.id.clone(),
                component.clone(),
            )
        })
        .collect();

    for &(pre_cell, post_cell) in pairs {
        let post_site = pairing::pick_site(&mut ctx.rng, post_targets);
        let pre_site = pairing::pick_site(&mut ctx.rng, pre_targets);
        for projection in &mut projections {
            projection.add_connection(pre_cell, pre_site, post_cell, post_site);
        }
    }

    info!(
        target: "connectogen-synthesis",
        "Formed {} gap junction contacts in {} projections '{}' -> '{}'",
        pairs.len() * gap_junctions.len(),
        projections.len(),
        pre.id,
        post.id
    );
    projections
}
