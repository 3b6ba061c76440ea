// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Connectogen Synthesis

This crate implements the network construction algorithms:
- Segment targeting (length-weighted attachment site sampling over named
  segment groups)
- Spatial placement (rectangular and cylindrical regions, optional overlap
  avoidance with bounded retries)
- Connection synthesis (probabilistic, targeted and distance-dependent
  regimes, chemical and electrical)
- Batch orchestration driven by a textual connectivity table with
  TOML override profiles

## Architecture

Populations, morphologies and projections are plain data owned by
`connectogen-structures`; everything in this crate is a function of
(declared structure, seed, parameters). All randomness flows through the
[`NetRng`] stream inside a [`BuildContext`], so seeding the context once
makes an entire build run reproducible.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod connectivity;
pub mod context;
pub mod params;
pub mod placement;
pub mod rng;
pub mod targeting;
pub mod types;

// Re-export the synthesis entry points (primary API)
pub use connectivity::{
    apply_connectivity_table, distance_electrical_projection, distance_projection,
    probabilistic_electrical_projection, probabilistic_projection, targeted_electrical_projection,
    targeted_projection, BatchOptions, BatchOutcome, ConnectivityRow, ConnectivityTable,
    OverrideRule, TargetingMode,
};

pub use config::ConnectivityProfile;
pub use context::{BuildContext, PlacedCell};
pub use params::{ComponentSelector, ParamSpec, SynapseParams};
pub use placement::{
    place_cylindrical, place_rectangular, CylindricalRegion, OverlapPolicy, RectangularRegion,
    DEFAULT_MAX_PLACEMENT_ATTEMPTS,
};
pub use rng::NetRng;
pub use targeting::{resolve_target_spec, sample_per_group, sample_pooled, SegmentTargetSpec};
pub use types::{BuildError, BuildResult};

// Re-export core data types from connectogen_structures (single source of truth)
pub use connectogen_structures::{
    CellMorphology, Connection, ConnectionSite, ElectricalConnection, ElectricalProjection,
    Point3d, Population, Projection, Segment, SegmentGroup, SegmentPoint, StructureError,
};
