// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Cell morphology data structures (segment trees and named segment groups).

Pure data definition - no business logic. The cumulative length distributions
used for weighted targeting are built in connectogen-synthesis.
*/

use crate::StructureError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A morphology point: 3D position plus local diameter (micrometers).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub diameter: f64,
}

impl SegmentPoint {
    pub fn new(x: f64, y: f64, z: f64, diameter: f64) -> Self {
        Self { x, y, z, diameter }
    }

    /// Euclidean distance to another morphology point (diameter ignored)
    pub fn distance_to(&self, other: &SegmentPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// One segment of a cell morphology.
///
/// A segment without an explicit proximal point inherits the distal point of
/// its parent segment. Root segments must carry an explicit proximal point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Identifier, unique within the morphology
    pub id: u32,

    /// Optional human-readable name ("soma", "dend_3", ...)
    #[serde(default)]
    pub name: Option<String>,

    /// Parent segment id (None for root segments)
    #[serde(default)]
    pub parent: Option<u32>,

    /// Proximal end point (None means: inherit parent's distal point)
    #[serde(default)]
    pub proximal: Option<SegmentPoint>,

    /// Distal end point
    pub distal: SegmentPoint,
}

/// A named group of segments, possibly including other groups.
///
/// Groups mirror the sectioning of the source morphology ("soma_group",
/// "dendrite_group", ...). Includes are expanded recursively when the group
/// is resolved into a sampling target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentGroup {
    /// Group name, unique within the morphology
    pub id: String,

    /// Direct member segment ids
    #[serde(default)]
    pub members: Vec<u32>,

    /// Names of other groups folded into this one
    #[serde(default)]
    pub includes: Vec<String>,
}

/// A complete cell morphology: segment tree plus named segment groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellMorphology {
    /// Morphology identifier (usually the cell type name)
    pub id: String,

    /// All segments, in file order
    pub segments: Vec<Segment>,

    /// Named segment groups
    #[serde(default)]
    pub groups: Vec<SegmentGroup>,
}

impl CellMorphology {
    /// Create a morphology with validation
    ///
    /// # Errors
    ///
    /// Returns error if the id is empty, a segment id is duplicated, a parent
    /// or group member references a missing segment, a root segment lacks a
    /// proximal point, or a group include names a missing group.
    pub fn new(
        id: String,
        segments: Vec<Segment>,
        groups: Vec<SegmentGroup>,
    ) -> Result<Self, StructureError> {
        if id.trim().is_empty() {
            return Err(StructureError::BadParameters(
                "morphology id cannot be empty".to_string(),
            ));
        }
        let morphology = Self { id, segments, groups };
        morphology.validate()?;
        Ok(morphology)
    }

    /// Look up a segment by id
    pub fn segment(&self, id: u32) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Look up a segment group by name
    pub fn group(&self, name: &str) -> Option<&SegmentGroup> {
        self.groups.iter().find(|g| g.id == name)
    }

    /// Proximal point of a segment, resolving parent-distal inheritance
    pub fn proximal_of(&self, id: u32) -> Result<SegmentPoint, StructureError> {
        let segment = self.segment(id).ok_or(StructureError::UnknownSegment(id))?;
        if let Some(point) = segment.proximal {
            return Ok(point);
        }
        match segment.parent {
            Some(parent_id) => {
                let parent = self
                    .segment(parent_id)
                    .ok_or(StructureError::UnknownSegment(parent_id))?;
                Ok(parent.distal)
            }
            None => Err(StructureError::BadParameters(format!(
                "root segment {} has no proximal point",
                id
            ))),
        }
    }

    /// Length of a segment: Euclidean distance from its (resolved) proximal
    /// point to its distal point. Zero-length segments (point somata) are
    /// legal.
    pub fn segment_length(&self, id: u32) -> Result<f64, StructureError> {
        let segment = self.segment(id).ok_or(StructureError::UnknownSegment(id))?;
        let proximal = self.proximal_of(id)?;
        Ok(proximal.distance_to(&segment.distal))
    }

    /// Validate internal consistency
    pub fn validate(&self) -> Result<(), StructureError> {
        let mut seen = HashSet::new();
        for segment in &self.segments {
            if !seen.insert(segment.id) {
                return Err(StructureError::BadParameters(format!(
                    "duplicate segment id {} in morphology '{}'",
                    segment.id, self.id
                )));
            }
        }
        for segment in &self.segments {
            if let Some(parent) = segment.parent {
                if !seen.contains(&parent) {
                    return Err(StructureError::UnknownSegment(parent));
                }
            } else if segment.proximal.is_none() {
                return Err(StructureError::BadParameters(format!(
                    "root segment {} in morphology '{}' has no proximal point",
                    segment.id, self.id
                )));
            }
        }
        let group_names: HashSet<&str> = self.groups.iter().map(|g| g.id.as_str()).collect();
        if group_names.len() != self.groups.len() {
            return Err(StructureError::BadParameters(format!(
                "duplicate segment group name in morphology '{}'",
                self.id
            )));
        }
        for group in &self.groups {
            for member in &group.members {
                if !seen.contains(member) {
                    return Err(StructureError::UnknownSegment(*member));
                }
            }
            for include in &group.includes {
                if !group_names.contains(include.as_str()) {
                    return Err(StructureError::UnknownGroup(include.clone()));
                }
            }
        }
        Ok(())
    }
}
