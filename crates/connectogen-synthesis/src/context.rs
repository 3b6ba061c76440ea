// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Build context: the mutable state threaded through every construction stage.

The context owns the random stream, the per-cell-type segment target cache and
the cross-population placement registry. Independent builds each get their own
context; `reset` starts a fresh run on the same instance.
*/

use crate::rng::NetRng;
use crate::targeting::{resolve_target_spec, SegmentTargetSpec};
use crate::types::BuildResult;
use ahash::AHashMap;
use connectogen_structures::{CellMorphology, Point3d};
use tracing::debug;

/// One placed soma, recorded for cross-population overlap checks.
#[derive(Debug, Clone)]
pub struct PlacedCell {
    pub population: String,
    pub cell: u64,
    pub center: Point3d,
    pub radius: f64,
}

/// Mutable state shared by placement, targeting and synthesis.
#[derive(Debug)]
pub struct BuildContext {
    /// Random stream every operation draws from
    pub rng: NetRng,
    target_specs: AHashMap<String, AHashMap<String, SegmentTargetSpec>>,
    placed: Vec<PlacedCell>,
}

impl BuildContext {
    /// Context with a fixed seed, for reproducible builds
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: NetRng::seeded(seed),
            target_specs: AHashMap::new(),
            placed: Vec::new(),
        }
    }

    /// Context seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: NetRng::from_entropy(),
            target_specs: AHashMap::new(),
            placed: Vec::new(),
        }
    }

    /// Start a fresh run: reseed the stream and drop every cached target spec
    /// and placement record.
    pub fn reset(&mut self, seed: u64) {
        self.rng = NetRng::seeded(seed);
        self.target_specs.clear();
        self.placed.clear();
    }

    /// Resolve segment target specs for a cell type, caching per
    /// (cell type, group). Within one run each group of each cell type is
    /// resolved at most once; later calls return the cached distribution.
    pub fn resolve_targets(
        &mut self,
        cell_type: &str,
        morphology: &CellMorphology,
        groups: &[String],
    ) -> BuildResult<Vec<SegmentTargetSpec>> {
        let mut specs = Vec::with_capacity(groups.len());
        for group in groups {
            let cached = self
                .target_specs
                .get(cell_type)
                .and_then(|by_group| by_group.get(group));
            let spec = match cached {
                Some(spec) => spec.clone(),
                None => {
                    let spec = resolve_target_spec(cell_type, morphology, group)?;
                    debug!(
                        target: "connectogen-synthesis",
                        "Cached target spec for '{}/{}': {} segments, {:.1}um total",
                        cell_type,
                        group,
                        spec.len(),
                        spec.total_length()
                    );
                    self.target_specs
                        .entry(cell_type.to_string())
                        .or_default()
                        .insert(group.clone(), spec.clone());
                    spec
                }
            };
            specs.push(spec);
        }
        Ok(specs)
    }

    /// Number of cached target specs across all cell types
    pub fn cached_spec_count(&self) -> usize {
        self.target_specs.values().map(|m| m.len()).sum()
    }

    /// Record one placed soma for later overlap checks
    pub fn register_placement(&mut self, population: &str, cell: u64, center: Point3d, radius: f64) {
        self.placed.push(PlacedCell {
            population: population.to_string(),
            cell,
            center,
            radius,
        });
    }

    /// Every soma registered so far, in placement order
    pub fn placements(&self) -> &[PlacedCell] {
        &self.placed
    }

    /// Drop placement records while keeping cached target specs
    pub fn clear_placements(&mut self) {
        self.placed.clear();
    }
}
