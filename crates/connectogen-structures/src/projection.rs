// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Projection data structures (synthesis output).

A projection groups every connection formed between one presynaptic and one
postsynaptic population through a single synapse component. Chemical
connections carry weight and delay; electrical connections carry neither a
delay nor a synthesized weight.

Pure data definition - no business logic. Connections are appended by the
synthesizers in connectogen-synthesis; afterwards the caller may still edit
weights and delays in bulk.
*/

use serde::{Deserialize, Serialize};

/// A point on a morphology where a connection attaches: segment id plus
/// normalized position along that segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSite {
    pub segment: u32,
    pub fraction_along: f64,
}

impl ConnectionSite {
    pub fn new(segment: u32, fraction_along: f64) -> Self {
        Self { segment, fraction_along }
    }

    /// Default attachment point: segment 0 at its midpoint
    pub fn soma_center() -> Self {
        Self { segment: 0, fraction_along: 0.5 }
    }
}

/// One chemical connection between two cell instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Identifier, unique and monotonically increasing within its projection
    pub id: u64,

    /// Presynaptic instance index
    pub pre_cell: u64,
    /// Attachment segment on the presynaptic morphology
    pub pre_segment: u32,
    /// Normalized position along the presynaptic segment
    pub pre_fraction: f64,

    /// Postsynaptic instance index
    pub post_cell: u64,
    /// Attachment segment on the postsynaptic morphology
    pub post_segment: u32,
    /// Normalized position along the postsynaptic segment
    pub post_fraction: f64,

    /// Transmission delay in milliseconds
    pub delay_ms: f64,
    /// Synaptic weight (dimensionless scale factor)
    pub weight: f64,
}

/// One electrical (gap junction) connection between two cell instances.
///
/// Pre/post record the driving direction used during synthesis; the junction
/// itself is symmetric. Weights are never synthesized, only assigned by the
/// caller afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalConnection {
    /// Identifier, unique and monotonically increasing within its projection
    pub id: u64,

    pub pre_cell: u64,
    pub pre_segment: u32,
    pub pre_fraction: f64,

    pub post_cell: u64,
    pub post_segment: u32,
    pub post_fraction: f64,

    /// Junction conductance scale, if the caller assigned one
    #[serde(default)]
    pub weight: Option<f64>,
}

/// All chemical connections from one population to another through a single
/// synapse component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    /// Projection identifier
    pub id: String,

    /// Presynaptic population id
    pub presynaptic: String,

    /// Postsynaptic population id
    pub postsynaptic: String,

    /// Synapse component id
    pub synapse: String,

    /// Connections in creation order
    pub connections: Vec<Connection>,
}

impl Projection {
    pub fn new(id: String, presynaptic: String, postsynaptic: String, synapse: String) -> Self {
        Self {
            id,
            presynaptic,
            postsynaptic,
            synapse,
            connections: Vec::new(),
        }
    }

    /// Append a connection, assigning the next sequential id
    pub fn add_connection(
        &mut self,
        pre_cell: u64,
        pre_site: ConnectionSite,
        post_cell: u64,
        post_site: ConnectionSite,
        weight: f64,
        delay_ms: f64,
    ) -> u64 {
        let id = self.connections.len() as u64;
        self.connections.push(Connection {
            id,
            pre_cell,
            pre_segment: pre_site.segment,
            pre_fraction: pre_site.fraction_along,
            post_cell,
            post_segment: post_site.segment,
            post_fraction: post_site.fraction_along,
            delay_ms,
            weight,
        });
        id
    }

    /// Number of connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// True when no connections were formed
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Multiply every connection weight by `factor`
    pub fn scale_weights(&mut self, factor: f64) {
        for connection in &mut self.connections {
            connection.weight *= factor;
        }
    }

    /// Overwrite every connection weight
    pub fn set_weights(&mut self, weight: f64) {
        for connection in &mut self.connections {
            connection.weight = weight;
        }
    }

    /// Overwrite every connection delay (milliseconds)
    pub fn set_delays(&mut self, delay_ms: f64) {
        for connection in &mut self.connections {
            connection.delay_ms = delay_ms;
        }
    }
}

/// All electrical connections from one population to another through a single
/// gap junction component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectricalProjection {
    /// Projection identifier
    pub id: String,

    /// Driving-side population id
    pub presynaptic: String,

    /// Driven-side population id
    pub postsynaptic: String,

    /// Gap junction component id
    pub gap_junction: String,

    /// Connections in creation order
    pub connections: Vec<ElectricalConnection>,
}

impl ElectricalProjection {
    pub fn new(
        id: String,
        presynaptic: String,
        postsynaptic: String,
        gap_junction: String,
    ) -> Self {
        Self {
            id,
            presynaptic,
            postsynaptic,
            gap_junction,
            connections: Vec::new(),
        }
    }

    /// Append a connection, assigning the next sequential id
    pub fn add_connection(
        &mut self,
        pre_cell: u64,
        pre_site: ConnectionSite,
        post_cell: u64,
        post_site: ConnectionSite,
    ) -> u64 {
        let id = self.connections.len() as u64;
        self.connections.push(ElectricalConnection {
            id,
            pre_cell,
            pre_segment: pre_site.segment,
            pre_fraction: pre_site.fraction_along,
            post_cell,
            post_segment: post_site.segment,
            post_fraction: post_site.fraction_along,
            weight: None,
        });
        id
    }

    /// Number of connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// True when no connections were formed
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Assign the same conductance scale to every connection
    pub fn set_weights(&mut self, weight: f64) {
        for connection in &mut self.connections {
            connection.weight = Some(weight);
        }
    }
}
