// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Population data structure (network representation).

Pure data definition - no business logic. Spatial placement is implemented in
connectogen-synthesis.
*/

use crate::{Point3d, StructureError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One cell instance within a population.
///
/// Instances start out unplaced; the placement stage fills in locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Index of the instance within its population (0-based, dense)
    pub id: u64,

    /// Soma location, if the population has been placed
    #[serde(default)]
    pub location: Option<Point3d>,
}

/// A population of cells of a single component (cell type).
///
/// Size zero is legal: empty populations act as placeholders that every
/// synthesis operation skips over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    /// Population identifier, unique within the network
    pub id: String,

    /// Component (cell type) shared by every instance
    pub component: String,

    /// Cell instances, ids 0..size-1
    pub instances: Vec<Instance>,

    /// Additional user-defined properties
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl Population {
    /// Create a population of `size` unplaced instances with validation
    ///
    /// # Errors
    ///
    /// Returns error if id or component is empty
    pub fn new(id: String, component: String, size: usize) -> Result<Self, StructureError> {
        if id.trim().is_empty() {
            return Err(StructureError::BadParameters(
                "population id cannot be empty".to_string(),
            ));
        }
        if component.trim().is_empty() {
            return Err(StructureError::BadParameters(
                "population component cannot be empty".to_string(),
            ));
        }
        let instances = (0..size)
            .map(|i| Instance { id: i as u64, location: None })
            .collect();
        Ok(Self {
            id,
            component,
            instances,
            properties: HashMap::new(),
        })
    }

    /// Number of instances
    pub fn size(&self) -> usize {
        self.instances.len()
    }

    /// True when the population has no instances
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Assign a soma location to one instance
    pub fn place_instance(&mut self, index: usize, location: Point3d) -> Result<(), StructureError> {
        let size = self.instances.len();
        let instance = self.instances.get_mut(index).ok_or_else(|| {
            StructureError::InstanceOutOfRange {
                population: self.id.clone(),
                index: index as u64,
                size,
            }
        })?;
        instance.location = Some(location);
        Ok(())
    }

    /// Soma location of one instance, if placed
    pub fn location_of(&self, index: usize) -> Option<Point3d> {
        self.instances.get(index).and_then(|i| i.location)
    }

    /// True when every instance carries a location
    pub fn is_fully_placed(&self) -> bool {
        self.instances.iter().all(|i| i.location.is_some())
    }

    /// Get a property value by key
    pub fn get_property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}
