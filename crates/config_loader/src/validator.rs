//! Configuration validation
//!
//! Rules:
//! - numeric ranges (batch sizes, poll timeout, queue capacity) via `validator`
//! - at least one destination
//! - destination ids non-empty and unique
//! - routing keys non-empty and unique across all destinations
//! - sink parameters required by the sink type are present

use std::collections::HashSet;

use contracts::{ContractError, DispatchBlueprint, SinkType};
use ::validator::Validate;

/// Validate a DispatchBlueprint
///
/// Returns the first error encountered.
pub fn validate(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    validate_ranges(blueprint)?;
    validate_destination_ids(blueprint)?;
    validate_routing_keys(blueprint)?;
    validate_sink(blueprint)?;
    Ok(())
}

fn validate_ranges(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(|errors| {
        let field = errors
            .errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "config".to_string());
        ContractError::config_validation(field, errors.to_string())
    })
}

fn validate_destination_ids(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    if blueprint.destinations.is_empty() {
        return Err(ContractError::config_validation(
            "destinations",
            "at least one destination is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, destination) in blueprint.destinations.iter().enumerate() {
        if destination.id.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("destinations[{idx}].id"),
                "destination id cannot be empty",
            ));
        }
        if !seen.insert(destination.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("destinations[id={}]", destination.id),
                "duplicate destination id",
            ));
        }
    }
    Ok(())
}

/// A routing key resolving to two destinations would make resolution ambiguous
fn validate_routing_keys(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for destination in &blueprint.destinations {
        for key in &destination.routing_keys {
            if key.is_empty() {
                return Err(ContractError::config_validation(
                    format!("destinations[{}].routing_keys", destination.id),
                    "routing key cannot be empty",
                ));
            }
            if !seen.insert(key.as_str()) {
                return Err(ContractError::config_validation(
                    format!("destinations[{}].routing_keys[{key}]", destination.id),
                    "duplicate routing key",
                ));
            }
        }
    }
    Ok(())
}

fn validate_sink(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    let sink = &blueprint.sink;
    if sink.name.is_empty() {
        return Err(ContractError::config_validation(
            "sink.name",
            "sink name cannot be empty",
        ));
    }
    if sink.sink_type == SinkType::Network && !sink.params.contains_key("addr") {
        return Err(ContractError::config_validation(
            "sink.params.addr",
            "network sink requires an 'addr' parameter",
        ));
    }
    Ok(())
}
