//! # Connectogen - Connectivity Targeting and Spatial Placement
//!
//! Connectogen builds the connectivity of biologically detailed network
//! models: it places cell populations in space, samples synapse attachment
//! sites on segmented morphologies weighted by segment length, and
//! synthesizes chemical and electrical projections under probabilistic,
//! targeted and distance-dependent regimes. The whole build is a
//! deterministic function of (declared structure, seed, parameters).
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! connectogen = "0.0.1-beta.4"
//! ```
//!
//! ```rust,no_run
//! use connectogen::prelude::*;
//!
//! // Seed once; every draw flows through the context's stream
//! let mut ctx = BuildContext::seeded(42);
//!
//! let pre = Population::new("exc".to_string(), "pyr".to_string(), 50)?;
//! let post = Population::new("inh".to_string(), "basket".to_string(), 10)?;
//!
//! // 20% pairwise connectivity, default delay/weight per component
//! let params = SynapseParams::with_defaults(vec!["ampa".to_string()]);
//! let projections =
//!     probabilistic_projection(&mut ctx, &pre, &post, &params, 0.2, &[], &[])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Data: connectogen-structures                           │
//! │  (CellMorphology, Population, Projection)               │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: connectogen-synthesis                      │
//! │  (placement, segment targeting, connection synthesis,   │
//! │   batch orchestration)                                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! All randomness is drawn from one seeded stream owned by the
//! [`BuildContext`](crate::synthesis::BuildContext). Two runs with the same
//! seed and the same inputs produce identical connection sequences,
//! including jittered delays and weights.
//!
//! ## Related Crates
//!
//! - **connectogen-structures**: data definitions, no algorithms
//! - **connectogen-synthesis**: the construction algorithms
//!
//! ## License
//!
//! Apache-2.0

// Re-export data layer
pub use connectogen_structures as structures;

// Re-export algorithm layer
pub use connectogen_synthesis as synthesis;

/// Prelude - commonly used types and entry points
pub mod prelude {
    pub use crate::structures::*;

    pub use crate::synthesis::{
        apply_connectivity_table, distance_electrical_projection, distance_projection,
        place_cylindrical, place_rectangular, probabilistic_electrical_projection,
        probabilistic_projection, resolve_target_spec, targeted_electrical_projection,
        targeted_projection, BatchOptions, BatchOutcome, BuildContext, BuildError, BuildResult,
        ComponentSelector, ConnectivityProfile, ConnectivityTable, CylindricalRegion, NetRng,
        OverlapPolicy, OverrideRule, ParamSpec, RectangularRegion, SegmentTargetSpec,
        SynapseParams, TargetingMode,
    };
}
