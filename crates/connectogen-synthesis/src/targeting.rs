// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Segment targeting: length-weighted sampling of attachment sites on cell
morphologies.

A `SegmentTargetSpec` flattens one named segment group (with its recursively
included groups) into an ordered segment list plus a running cumulative length
distribution. Sampling a site draws a uniform position along the summed length
and maps it back to one segment and a fraction along that segment, so longer
segments receive proportionally more contacts.
*/

use crate::rng::NetRng;
use crate::types::{BuildError, BuildResult};
use ahash::AHashSet;
use connectogen_structures::{CellMorphology, ConnectionSite};

/// Length-weighted sampling target built from one segment group.
#[derive(Debug, Clone)]
pub struct SegmentTargetSpec {
    /// Group this spec was resolved from
    pub group: String,

    /// Segment ids in expansion order (members first, then includes)
    pub segments: Vec<u32>,

    /// Running length totals; `cumulative_lengths[i]` is the summed length of
    /// `segments[0..=i]`. Non-decreasing by construction.
    pub cumulative_lengths: Vec<f64>,
}

impl SegmentTargetSpec {
    /// Total length of every segment in the spec
    pub fn total_length(&self) -> f64 {
        self.cumulative_lengths.last().copied().unwrap_or(0.0)
    }

    /// Number of segments in the spec
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the spec holds no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Draw one attachment site, weighted by segment length.
    ///
    /// Buckets are half-open: a draw landing exactly on a boundary belongs to
    /// the following segment, and zero-length segments occupy empty buckets so
    /// they are never drawn. When the total length is zero (a group of point
    /// segments) the segment is picked uniformly with fraction 0.5 instead.
    pub fn sample_site(&self, rng: &mut NetRng) -> ConnectionSite {
        let total = self.total_length();
        if total <= 0.0 {
            let index = if self.segments.len() == 1 {
                0
            } else {
                rng.pick(self.segments.len())
            };
            return ConnectionSite::new(self.segments[index], 0.5);
        }
        let location = rng.uniform() * total;
        let index = self
            .cumulative_lengths
            .partition_point(|&c| c <= location)
            .min(self.segments.len() - 1);
        let previous = if index == 0 {
            0.0
        } else {
            self.cumulative_lengths[index - 1]
        };
        let length = self.cumulative_lengths[index] - previous;
        let fraction = if length > 0.0 {
            (location - previous) / length
        } else {
            0.5
        };
        ConnectionSite::new(self.segments[index], fraction)
    }
}

/// Resolve one named segment group of a morphology into a sampling target.
///
/// Group includes are expanded depth-first, direct members before included
/// groups, in declaration order. Each group is expanded at most once (include
/// cycles terminate) and a segment reached through multiple includes
/// contributes only once.
///
/// # Errors
///
/// `UnknownSegmentGroup` when the group (or one of its includes) does not
/// exist on the morphology; `EmptySegmentGroup` when it exists but resolves
/// to zero segments.
pub fn resolve_target_spec(
    cell_type: &str,
    morphology: &CellMorphology,
    group_name: &str,
) -> BuildResult<SegmentTargetSpec> {
    let mut segments = Vec::new();
    let mut visited_groups = AHashSet::new();
    let mut seen_segments = AHashSet::new();
    collect_group_segments(
        cell_type,
        morphology,
        group_name,
        &mut visited_groups,
        &mut seen_segments,
        &mut segments,
    )?;
    if segments.is_empty() {
        return Err(BuildError::EmptySegmentGroup {
            cell_type: cell_type.to_string(),
            group: group_name.to_string(),
        });
    }

    let mut cumulative_lengths = Vec::with_capacity(segments.len());
    let mut total = 0.0;
    for &id in &segments {
        total += morphology.segment_length(id)?;
        cumulative_lengths.push(total);
    }

    Ok(SegmentTargetSpec {
        group: group_name.to_string(),
        segments,
        cumulative_lengths,
    })
}

fn collect_group_segments(
    cell_type: &str,
    morphology: &CellMorphology,
    group_name: &str,
    visited_groups: &mut AHashSet<String>,
    seen_segments: &mut AHashSet<u32>,
    out: &mut Vec<u32>,
) -> BuildResult<()> {
    if !visited_groups.insert(group_name.to_string()) {
        return Ok(());
    }
    let group = morphology
        .group(group_name)
        .ok_or_else(|| BuildError::UnknownSegmentGroup {
            cell_type: cell_type.to_string(),
            group: group_name.to_string(),
        })?;
    for &member in &group.members {
        if seen_segments.insert(member) {
            out.push(member);
        }
    }
    for include in &group.includes {
        collect_group_segments(
            cell_type,
            morphology,
            include,
            visited_groups,
            seen_segments,
            out,
        )?;
    }
    Ok(())
}

/// Draw attachment sites per group: `counts[i]` sites from `specs[i]`,
/// concatenated in group order. Segments may repeat across draws; every draw
/// gets a fresh fraction.
pub fn sample_per_group(
    rng: &mut NetRng,
    specs: &[SegmentTargetSpec],
    counts: &[usize],
) -> BuildResult<Vec<ConnectionSite>> {
    if specs.len() != counts.len() {
        return Err(BuildError::BadParameters(format!(
            "{} segment groups but {} counts",
            specs.len(),
            counts.len()
        )));
    }
    let total: usize = counts.iter().sum();
    let mut sites = Vec::with_capacity(total);
    for (spec, &count) in specs.iter().zip(counts) {
        for _ in 0..count {
            sites.push(spec.sample_site(rng));
        }
    }
    Ok(sites)
}

/// Draw `total` attachment sites from a set of groups. The group for each
/// draw is picked uniformly (relative group sizes do not bias the choice),
/// then the site within the chosen group is length-weighted as usual.
pub fn sample_pooled(
    rng: &mut NetRng,
    specs: &[SegmentTargetSpec],
    total: usize,
) -> BuildResult<Vec<ConnectionSite>> {
    if specs.is_empty() {
        return Err(BuildError::BadParameters(
            "at least one segment group is required".to_string(),
        ));
    }
    let mut sites = Vec::with_capacity(total);
    for _ in 0..total {
        let group = if specs.len() == 1 {
            0
        } else {
            rng.pick(specs.len())
        };
        sites.push(specs[group].sample_site(rng));
    }
    Ok(sites)
}
