use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::flight::Attribute;
use crate::node::NodeSchema;

/// Sentinel name for the root of the dependency graph.
pub const ROOT_NODE: &str = "root";

/// Per-flight namespace: which names exist, which are recorded, which are
/// derived, and the scalar facts known about the aircraft and flight.
///
/// Built once per flight and read-only afterwards; the external scheduler
/// walks it to order derivations.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    recorded: HashSet<String>,
    requested: Vec<String>,
    derived: HashMap<String, NodeSchema>,
    aircraft_info: HashMap<String, Value>,
    flight_record: HashMap<String, Value>,
}

impl NodeRegistry {
    pub fn new(
        recorded: impl IntoIterator<Item = String>,
        requested: Vec<String>,
        derived: impl IntoIterator<Item = NodeSchema>,
        aircraft_info: HashMap<String, Value>,
        flight_record: HashMap<String, Value>,
    ) -> Self {
        Self {
            recorded: recorded.into_iter().collect(),
            requested,
            derived: derived
                .into_iter()
                .map(|schema| (schema.name().to_string(), schema))
                .collect(),
            aircraft_info,
            flight_record,
        }
    }

    /// Every addressable name, sorted: recorded parameters, derived nodes,
    /// known facts, and the root sentinel.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: HashSet<&str> = HashSet::new();
        keys.insert(ROOT_NODE);
        keys.extend(self.recorded.iter().map(String::as_str));
        keys.extend(self.derived.keys().map(String::as_str));
        keys.extend(self.aircraft_info.keys().map(String::as_str));
        keys.extend(self.flight_record.keys().map(String::as_str));
        let mut keys: Vec<String> = keys.into_iter().map(str::to_string).collect();
        keys.sort();
        keys
    }

    /// Whether `name` can produce a result given the available names.
    ///
    /// Recorded parameters, present facts, and the root sentinel are always
    /// operational; derived nodes defer to their schema.
    pub fn operational(&self, name: &str, available: &HashSet<String>) -> bool {
        if name == ROOT_NODE || self.recorded.contains(name) {
            return true;
        }
        if self.fact(name).is_some() {
            return true;
        }
        match self.derived.get(name) {
            Some(schema) => schema.can_operate(available),
            None => {
                log::debug!("'{}' is not in this flight's namespace", name);
                false
            }
        }
    }

    /// Scalar fact by name, aircraft info taking priority over the flight
    /// record. A JSON null counts as absent.
    pub fn get_attribute(&self, name: &str) -> Option<Attribute> {
        self.fact(name)
            .map(|value| Attribute::new(name, value.clone()))
    }

    pub fn schema(&self, name: &str) -> Option<&NodeSchema> {
        self.derived.get(name)
    }

    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    pub fn is_recorded(&self, name: &str) -> bool {
        self.recorded.contains(name)
    }

    fn fact(&self, name: &str) -> Option<&Value> {
        self.aircraft_info
            .get(name)
            .or_else(|| self.flight_record.get(name))
            .filter(|value| !value.is_null())
    }
}
