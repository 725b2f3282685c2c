use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::node::name::verbose_name;
use crate::prelude::{NodeError, NodeResult};

/// Above this many dependencies the powerset enumeration in
/// [`NodeSchema::operational_combinations`] becomes intractable.
const COMBINATION_LIMIT: usize = 15;

type OperabilityFn = dyn Fn(&[String], &HashSet<String>) -> bool + Send + Sync;

/// How a node decides whether it can run from the available inputs.
#[derive(Clone)]
pub enum Operability {
    /// Every declared dependency must be available. The default.
    AllDependencies,
    /// Any one declared dependency suffices.
    AnyDependency,
    /// Author-supplied logic over (declared dependencies, available names),
    /// e.g. "A and (B or C)".
    Custom(Arc<OperabilityFn>),
}

impl fmt::Debug for Operability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operability::AllDependencies => write!(f, "AllDependencies"),
            Operability::AnyDependency => write!(f, "AnyDependency"),
            Operability::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl Default for Operability {
    fn default() -> Self {
        Operability::AllDependencies
    }
}

/// Declarative description of a node: display name, ordered dependency
/// names, and operability rule. Validated once at registration; there is
/// no runtime introspection of computation signatures.
#[derive(Debug, Clone)]
pub struct NodeSchema {
    name: String,
    dependencies: Vec<String>,
    operability: Operability,
}

impl NodeSchema {
    /// A node without dependencies cannot be derived from anything, so an
    /// empty, blank, or duplicated dependency list aborts registration.
    pub fn new(name: impl Into<String>, dependencies: &[&str]) -> NodeResult<Self> {
        let name = name.into();
        if dependencies.is_empty() {
            return Err(NodeError::Declaration {
                node: name,
                reason: "at least one dependency is required".into(),
            });
        }
        let mut seen = HashSet::new();
        for dep in dependencies {
            if dep.trim().is_empty() {
                return Err(NodeError::Declaration {
                    node: name,
                    reason: "blank dependency name".into(),
                });
            }
            if !seen.insert(*dep) {
                return Err(NodeError::Declaration {
                    node: name,
                    reason: format!("duplicate dependency '{}'", dep),
                });
            }
        }
        Ok(Self {
            name,
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            operability: Operability::default(),
        })
    }

    /// As [`NodeSchema::new`], deriving the display name from a type
    /// identifier: `from_ident("GearDownSelection", ..)` names the node
    /// "Gear Down Selection".
    pub fn from_ident(ident: &str, dependencies: &[&str]) -> NodeResult<Self> {
        Self::new(verbose_name(ident), dependencies)
    }

    pub fn with_operability(mut self, operability: Operability) -> Self {
        self.operability = operability;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependency_names(&self) -> &[String] {
        &self.dependencies
    }

    /// Whether this node can run given the available names.
    pub fn can_operate(&self, available: &HashSet<String>) -> bool {
        match &self.operability {
            Operability::AllDependencies => {
                self.dependencies.iter().all(|d| available.contains(d))
            }
            Operability::AnyDependency => {
                self.dependencies.iter().any(|d| available.contains(d))
            }
            Operability::Custom(f) => f(&self.dependencies, available),
        }
    }

    /// Every subset of the declared dependencies under which the node can
    /// operate. Exponential in the dependency count and meant for
    /// documentation and validation only, never the per-flight path; a
    /// node with more than [`COMBINATION_LIMIT`] dependencies should
    /// express its operability directly instead, and enumeration is
    /// refused for it.
    pub fn operational_combinations(&self) -> Vec<Vec<String>> {
        let n = self.dependencies.len();
        if n > COMBINATION_LIMIT {
            log::warn!(
                "'{}' has {} dependencies; refusing to enumerate 2^{} combinations, \
                 express operability directly instead",
                self.name,
                n,
                n
            );
            return Vec::new();
        }
        let mut combinations = Vec::new();
        for bits in 0u32..(1u32 << n) {
            let subset: Vec<String> = self
                .dependencies
                .iter()
                .enumerate()
                .filter(|(i, _)| bits & (1 << i) != 0)
                .map(|(_, d)| d.clone())
                .collect();
            let as_set: HashSet<String> = subset.iter().cloned().collect();
            if self.can_operate(&as_set) {
                combinations.push(subset);
            }
        }
        combinations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn zero_dependencies_is_a_declaration_error() {
        let err = NodeSchema::new("Altitude Aal", &[]);
        assert!(matches!(err, Err(NodeError::Declaration { .. })));
        assert!(NodeSchema::new("Altitude Aal", &["Altitude STD", ""]).is_err());
        assert!(NodeSchema::new("Altitude Aal", &["A", "A"]).is_err());
    }

    #[test]
    fn default_operability_requires_every_dependency() {
        let schema = NodeSchema::new("Altitude Aal", &["Altitude STD", "Altitude Radio"]).unwrap();
        assert!(schema.can_operate(&available(&["Altitude STD", "Altitude Radio", "Pitch"])));
        assert!(!schema.can_operate(&available(&["Altitude STD"])));
    }

    #[test]
    fn any_dependency_and_custom_rules() {
        let any = NodeSchema::new("Heading", &["Heading True", "Heading Magnetic"])
            .unwrap()
            .with_operability(Operability::AnyDependency);
        assert!(any.can_operate(&available(&["Heading Magnetic"])));
        assert!(!any.can_operate(&available(&["Pitch"])));

        // "A and (B or C)"
        let custom = NodeSchema::new("Sideslip", &["A", "B", "C"])
            .unwrap()
            .with_operability(Operability::Custom(Arc::new(|_, avail| {
                avail.contains("A") && (avail.contains("B") || avail.contains("C"))
            })));
        assert!(custom.can_operate(&available(&["A", "C"])));
        assert!(!custom.can_operate(&available(&["B", "C"])));
    }

    #[test]
    fn combinations_agree_with_can_operate() {
        let schema = NodeSchema::new("Heading", &["A", "B", "C"])
            .unwrap()
            .with_operability(Operability::AnyDependency);
        let combinations = schema.operational_combinations();
        // Powerset of three names has eight subsets; only the empty one
        // fails the any-dependency rule.
        assert_eq!(combinations.len(), 7);
        for combination in &combinations {
            let as_set: HashSet<String> = combination.iter().cloned().collect();
            assert!(schema.can_operate(&as_set));
        }
    }

    #[test]
    fn default_rule_yields_a_single_combination() {
        let schema = NodeSchema::new("Altitude Aal", &["Altitude STD", "Altitude Radio"]).unwrap();
        let combinations = schema.operational_combinations();
        assert_eq!(
            combinations,
            vec![vec!["Altitude STD".to_string(), "Altitude Radio".to_string()]]
        );
    }

    #[test]
    fn ident_naming_matches_the_class_name_convention() {
        let schema = NodeSchema::from_ident("GearDownSelection", &["Gear Down"]).unwrap();
        assert_eq!(schema.name(), "Gear Down Selection");
    }
}
