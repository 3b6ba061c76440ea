// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Connectivity synthesis operations.

Three regimes form connections between two populations: uniform-probability
pairwise, fixed-count targeted (convergent or divergent), and
distance-dependent with a caller-supplied acceptance rule. Chemical synthesis
emits weighted, delayed connections per synapse component; electrical
synthesis emits bare gap junction contacts through the same pairing core.
*/

mod pairing;

pub mod electrical;
pub mod orchestrator;
pub mod synthesis;

/// Which side drives fixed-count partner selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetingMode {
    /// Each postsynaptic cell receives the requested number of presynaptic
    /// partners
    Convergent,
    /// Each presynaptic cell contacts the requested number of postsynaptic
    /// partners
    Divergent,
}

pub use electrical::{
    distance_electrical_projection, probabilistic_electrical_projection,
    targeted_electrical_projection,
};
pub use orchestrator::{
    apply_connectivity_table, BatchOptions, BatchOutcome, ConnectivityRow, ConnectivityTable,
    OverrideRule,
};
pub use synthesis::{distance_projection, probabilistic_projection, targeted_projection};
