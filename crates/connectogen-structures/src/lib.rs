// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The core crate for connectogen. Defines the data structures shared by every
//! network construction stage: cell morphologies with named segment groups,
//! spatially embedded populations, and the chemical / electrical projections
//! produced by the synthesis crate.
//!
//! Pure data definition - no business logic. Construction algorithms live in
//! connectogen-synthesis.

mod error;
pub mod geometry;
pub mod morphology;
pub mod population;
pub mod projection;

pub use error::StructureError;
pub use geometry::Point3d;
pub use morphology::{CellMorphology, Segment, SegmentGroup, SegmentPoint};
pub use population::{Instance, Population};
pub use projection::{
    Connection, ConnectionSite, ElectricalConnection, ElectricalProjection, Projection,
};
