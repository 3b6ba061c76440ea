// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Chemical connectivity synthesis.

Each entry point returns `Ok(None)` when no projection is created at all
(an empty population on either side, or a zero connection probability) and
`Ok(Some(projections))` otherwise, one projection per synapse component.
Projections may legitimately be empty, for example when every per-cell count
rounds to zero; the `None` sentinel is reserved for the cases above.

Per formed pair one postsynaptic and one presynaptic attachment site are
drawn, shared by every component, then delay and weight resolve per
component. Draw order is fixed (post site, pre site, then per component delay
before weight) so seeded builds reproduce byte-identical connection lists.
*/

use super::pairing;
use super::TargetingMode;
use crate::context::BuildContext;
use crate::params::{ResolvedComponent, SynapseParams};
use crate::targeting::SegmentTargetSpec;
use crate::types::{BuildError, BuildResult};
use connectogen_structures::{Point3d, Population, Projection};
use tracing::info;

/// Form connections between every ordered (pre, post) pair independently
/// with the given probability. On a self projection (same population on both
/// sides) a cell never pairs with itself.
///
/// # Arguments
///
/// * `ctx` - Build context supplying the random stream
/// * `pre` / `post` - Presynaptic and postsynaptic populations
/// * `params` - Synapse components with their delay/weight specification
/// * `probability` - Per-pair connection probability; values at or above 1
///   accept every pair
/// * `pre_targets` / `post_targets` - Attachment site distributions; empty
///   slices fall back to segment 0, fraction 0.5
///
/// # Returns
///
/// `None` when either population is empty or the probability is zero or
/// lower; otherwise one projection per synapse component.
#[allow(clippy::too_many_arguments)]
pub fn probabilistic_projection(
    ctx: &mut BuildContext,
    pre: &Population,
    post: &Population,
    params: &SynapseParams,
    probability: f64,
    pre_targets: &[SegmentTargetSpec],
    post_targets: &[SegmentTargetSpec],
) -> BuildResult<Option<Vec<Projection>>> {
    let components = params.resolve()?;
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
    let projections = emit(ctx, pre, post, &pairs, &components, pre_targets, post_targets)?;
    Ok(Some(projections))
}

/// Form a fixed number of connections per driving cell. With
/// `TargetingMode::Convergent` every postsynaptic cell receives `count`
/// presynaptic partners; with `TargetingMode::Divergent` every presynaptic
/// cell contacts `count` postsynaptic partners. Fractional counts round
/// stochastically so the expectation is exact.
#[allow(clippy::too_many_arguments)]
pub fn targeted_projection(
    ctx: &mut BuildContext,
    pre: &Population,
    post: &Population,
    params: &SynapseParams,
    count: f64,
    mode: TargetingMode,
    pre_targets: &[SegmentTargetSpec],
    post_targets: &[SegmentTargetSpec],
) -> BuildResult<Option<Vec<Projection>>> {
    let components = params.resolve()?;
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
    let projections = emit(ctx, pre, post, &pairs, &components, pre_targets, post_targets)?;
    Ok(Some(projections))
}

/// Form connections per driving cell by walking candidates in index order
/// and accepting each with probability `rule(distance)`, stopping at the
/// rounded per-cell count. Both populations must be fully placed. Rule
/// values at or above 1 accept unconditionally.
#[allow(clippy::too_many_arguments)]
pub fn distance_projection<F>(
    ctx: &mut BuildContext,
    pre: &Population,
    post: &Population,
    params: &SynapseParams,
    count: f64,
    mode: TargetingMode,
    rule: F,
    pre_targets: &[SegmentTargetSpec],
    post_targets: &[SegmentTargetSpec],
) -> BuildResult<Option<Vec<Projection>>>
where
    F: Fn(f64) -> f64,
{
    let components = params.resolve()?;
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
    let projections = emit(ctx, pre, post, &pairs, &components, pre_targets, post_targets)?;
    Ok(Some(projections))
}

pub(crate) fn check_count(count: f64) -> BuildResult<()> {
    if count < 0.0 || !count.is_finite() {
        return Err(BuildError::BadParameters(format!(
            "per-cell connection count must be finite and non-negative, got {}",
            count
        )));
    }
    Ok(())
}

pub(crate) fn placed_locations(population: &Population) -> BuildResult<Vec<Point3d>> {
    population
        .instances
        .iter()
        .map(|instance| {
            instance
                .location
                .ok_or_else(|| BuildError::MissingCoordinates(population.id.clone()))
        })
        .collect()
}

pub(crate) fn log_skip(pre: &Population, post: &Population, zero_probability: bool) {
    let reason = if zero_probability {
        "zero connection probability"
    } else if pre.is_empty() {
        "empty presynaptic population"
    } else {
        "empty postsynaptic population"
    };
    info!(
        target: "connectogen-synthesis",
        "No projection created '{}' -> '{}': {}",
        pre.id,
        post.id,
        reason
    );
}

fn emit(
    ctx: &mut BuildContext,
    pre: &Population,
    post: &Population,
    pairs: &[(u64, u64)],
    components: &[ResolvedComponent],
    pre_targets: &[SegmentTargetSpec],
    post_targets: &[SegmentTargetSpec],
) -> BuildResult<Vec<Projection>> {
    let mut projections: Vec<Projection> = components
        .iter()
        .map(|component| {
            Projection::new(
                format!("proj_{}_{}_{}", pre.id, post.id, component.synapse),
                pre.id.clone(),
                post.id.clone(),
                component.synapse.clone(),
            )
        })
        .collect();

    for &(pre_cell, post_cell) in pairs {
        let post_site = pairing::pick_site(&mut ctx.rng, post_targets);
        let pre_site = pairing::pick_site(&mut ctx.rng, pre_targets);
        for (projection, component) in projections.iter_mut().zip(components) {
            let delay = component.delay.sample(&mut ctx.rng)?;
            let weight = component.weight.sample(&mut ctx.rng)?;
            projection.add_connection(pre_cell, pre_site, post_cell, post_site, weight, delay);
        }
    }

    info!(
        target: "connectogen-synthesis",
        "Formed {} connections in {} projections '{}' -> '{}'",
        pairs.len() * components.len(),
        projections.len(),
        pre.id,
        post.id
    );
    Ok(projections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population(id: &str, size: usize) -> Population {
        Population::new(id.to_string(), "cell".to_string(), size).unwrap()
    }

    #[test]
    fn test_empty_population_yields_no_projection() {
        let mut ctx = BuildContext::seeded(1);
        let pre = population("a", 0);
        let post = population("b", 5);
        let params = SynapseParams::with_defaults(vec!["ampa".to_string()]);
        let result =
            probabilistic_projection(&mut ctx, &pre, &post, &params, 0.5, &[], &[]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_zero_probability_yields_no_projection() {
        let mut ctx = BuildContext::seeded(1);
        let pre = population("a", 5);
        let post = population("b", 5);
        let params = SynapseParams::with_defaults(vec!["ampa".to_string()]);
        let result =
            probabilistic_projection(&mut ctx, &pre, &post, &params, 0.0, &[], &[]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_zero_count_yields_empty_projection_not_none() {
        let mut ctx = BuildContext::seeded(1);
        let pre = population("a", 5);
        let post = population("b", 5);
        let params = SynapseParams::with_defaults(vec!["ampa".to_string()]);
        let result = targeted_projection(
            &mut ctx,
            &pre,
            &post,
            &params,
            0.0,
            TargetingMode::Convergent,
            &[],
            &[],
        )
        .unwrap();
        let projections = result.expect("Zero count still creates the projection");
        assert_eq!(projections.len(), 1);
        assert!(projections[0].is_empty());
    }

    #[test]
    fn test_certain_probability_connects_every_pair() {
        let mut ctx = BuildContext::seeded(1);
        let pre = population("a", 4);
        let post = population("b", 3);
        let params = SynapseParams::uniform(vec!["ampa".to_string()], 1.5, 0.25);
        let projections =
            probabilistic_projection(&mut ctx, &pre, &post, &params, 1.0, &[], &[])
                .unwrap()
                .unwrap();
        assert_eq!(projections[0].len(), 12);
        for connection in &projections[0].connections {
            assert_eq!(connection.delay_ms, 1.5);
            assert_eq!(connection.weight, 0.25);
            assert_eq!(connection.post_segment, 0);
            assert_eq!(connection.post_fraction, 0.5);
        }
    }

    #[test]
    fn test_multi_component_connections_share_sites() {
        let mut ctx = BuildContext::seeded(1);
        let pre = population("a", 6);
        let post = population("b", 6);
        let mut params =
            SynapseParams::with_defaults(vec!["ampa".to_string(), "nmda".to_string()]);
        params.weights = crate::params::ParamSpec::PerComponent(vec![1.0, 0.1]);
        let projections =
            probabilistic_projection(&mut ctx, &pre, &post, &params, 0.5, &[], &[])
                .unwrap()
                .unwrap();
        assert_eq!(projections.len(), 2);
        assert_eq!(projections[0].len(), projections[1].len());
        for (a, b) in projections[0]
            .connections
            .iter()
            .zip(&projections[1].connections)
        {
            assert_eq!(a.pre_cell, b.pre_cell);
            assert_eq!(a.post_cell, b.post_cell);
            assert_eq!(a.pre_segment, b.pre_segment);
            assert_eq!(a.pre_fraction, b.pre_fraction);
            assert_eq!(a.post_segment, b.post_segment);
            assert_eq!(a.post_fraction, b.post_fraction);
            assert_eq!(a.weight, 1.0);
            assert_eq!(b.weight, 0.1);
        }
    }

    #[test]
    fn test_targeted_convergent_count_conservation() {
        let mut ctx = BuildContext::seeded(2);
        let pre = population("a", 40);
        let post = population("b", 5);
        let params = SynapseParams::with_defaults(vec!["ampa".to_string()]);
        let projections = targeted_projection(
            &mut ctx,
            &pre,
            &post,
            &params,
            8.0,
            TargetingMode::Convergent,
            &[],
            &[],
        )
        .unwrap()
        .unwrap();
        assert_eq!(projections[0].len(), 40);
        for post_cell in 0..5u64 {
            let incoming = projections[0]
                .connections
                .iter()
                .filter(|c| c.post_cell == post_cell)
                .count();
            assert_eq!(incoming, 8);
        }
    }

    #[test]
    fn test_negative_count_is_an_error() {
        let mut ctx = BuildContext::seeded(2);
        let pre = population("a", 4);
        let post = population("b", 4);
        let params = SynapseParams::with_defaults(vec!["ampa".to_string()]);
        let result = targeted_projection(
            &mut ctx,
            &pre,
            &post,
            &params,
            -1.0,
            TargetingMode::Divergent,
            &[],
            &[],
        );
        assert!(matches!(result, Err(BuildError::BadParameters(_))));
    }

    #[test]
    fn test_distance_requires_placement() {
        let mut ctx = BuildContext::seeded(3);
        let pre = population("a", 4);
        let post = population("b", 4);
        let params = SynapseParams::with_defaults(vec!["ampa".to_string()]);
        let result = distance_projection(
            &mut ctx,
            &pre,
            &post,
            &params,
            2.0,
            TargetingMode::Convergent,
            |_| 1.0,
            &[],
            &[],
        );
        assert!(matches!(result, Err(BuildError::MissingCoordinates(_))));
    }

    #[test]
    fn test_seeded_builds_are_reproducible() {
        let run = || {
            let mut ctx = BuildContext::seeded(99);
            let pre = population("a", 20);
            let post = population("b", 20);
            let mut params = SynapseParams::uniform(vec!["ampa".to_string()], 1.0, 0.5);
            params.delay_std = Some(0.2);
            params.weight_std = Some(0.1);
            params.clipped = true;
            let projections =
                probabilistic_projection(&mut ctx, &pre, &post, &params, 0.3, &[], &[])
                    .unwrap()
                    .unwrap();
            projections[0].connections.clone()
        };
        assert_eq!(run(), run());
    }
}
