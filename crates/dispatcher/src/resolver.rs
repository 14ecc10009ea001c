//! Destination table: routing key -> destination, fixed for the lifetime of a run.

use std::collections::HashMap;

use contracts::{DestinationId, DispatchBlueprint};

use crate::error::DispatcherError;

/// A destination and its flush threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub id: DestinationId,
    pub batch_size: usize,
}

/// Immutable routing table
#[derive(Debug, Clone, Default)]
pub struct DestinationTable {
    routes: HashMap<String, DestinationId>,
    /// Known destinations, in configuration order
    destinations: Vec<Destination>,
}

impl DestinationTable {
    pub fn builder() -> DestinationTableBuilder {
        DestinationTableBuilder::default()
    }

    /// Build the table from a validated blueprint
    pub fn from_blueprint(blueprint: &DispatchBlueprint) -> Self {
        let mut builder = Self::builder();
        for destination in &blueprint.destinations {
            builder = builder.destination(
                destination.id.clone(),
                blueprint.batch_size_for(destination),
                destination.routing_keys.iter().cloned(),
            );
        }
        builder.build()
    }

    /// Resolve a routing key
    ///
    /// # Errors
    /// [`DispatcherError::DestinationNotFound`] when the key has no entry.
    pub fn resolve(&self, routing_key: &str) -> Result<&DestinationId, DispatcherError> {
        self.routes
            .get(routing_key)
            .ok_or_else(|| DispatcherError::DestinationNotFound {
                routing_key: routing_key.to_string(),
            })
    }

    /// Flush threshold of a destination (1 for unknown destinations)
    pub fn batch_size(&self, id: &DestinationId) -> usize {
        self.destinations
            .iter()
            .find(|d| &d.id == id)
            .map(|d| d.batch_size)
            .unwrap_or(1)
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct DestinationTableBuilder {
    table: DestinationTable,
}

impl DestinationTableBuilder {
    /// Register a destination with its routing keys
    ///
    /// Later registrations of the same routing key win.
    pub fn destination(
        mut self,
        id: impl Into<DestinationId>,
        batch_size: usize,
        routing_keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let id = id.into();
        for key in routing_keys {
            self.table.routes.insert(key.into(), id.clone());
        }
        match self.table.destinations.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.batch_size = batch_size.max(1),
            None => self.table.destinations.push(Destination {
                id,
                batch_size: batch_size.max(1),
            }),
        }
        self
    }

    /// Shorthand: a destination whose only routing key is its own id
    pub fn route(self, id: &str, batch_size: usize) -> Self {
        self.destination(id, batch_size, [id])
    }

    pub fn build(self) -> DestinationTable {
        self.table
    }
}
