//! Property metadata - typed, inheritable attribute declarations
//!
//! A [`PropertyDefinition`] belongs to exactly one resource type. Subtypes
//! inherit their parent's definitions and may redeclare one by name, which
//! replaces the inherited definition in place without reordering.

use crate::resource::ResourceInstance;
use crate::value::{Value, ValueKind};
use std::fmt;
use std::sync::Arc;

/// A deferred default computation, evaluated against the owning instance
pub type LazyDefault = Arc<dyn Fn(&ResourceInstance) -> Value + Send + Sync>;

/// Default for an unset property: a literal, or a computation run lazily on
/// every unset read (never memoized - callers wanting a stable value must
/// set the property explicitly)
#[derive(Clone)]
pub enum DefaultExpr {
    Literal(Value),
    Lazy(LazyDefault),
}

impl DefaultExpr {
    /// Evaluate the default in the context of `instance`
    pub fn evaluate(&self, instance: &ResourceInstance) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Lazy(compute) => compute(instance),
        }
    }
}

impl fmt::Debug for DefaultExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// A typed attribute declaration on a resource type
#[derive(Debug, Clone)]
pub struct PropertyDefinition {
    /// Property name, unique within its declaring type
    pub name: String,
    /// Optional type constraint checked on assignment
    pub constraint: Option<ValueKind>,
    /// Optional default for unset reads
    pub default: Option<DefaultExpr>,
    /// Identity properties are copied into current/after snapshots before
    /// hook logic runs
    pub identity: bool,
    /// The name property supplies the instance name when read unset;
    /// implies `identity`
    pub name_property: bool,
    /// Desired-state properties describe what the user wants and are never
    /// pre-seeded into a current-value snapshot
    pub desired_state: bool,
}

impl PropertyDefinition {
    /// Declare a property with the given name; desired-state by default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            default: None,
            identity: false,
            name_property: false,
            desired_state: true,
        }
    }

    /// Constrain assignments to values of `kind`
    pub fn constraint(mut self, kind: ValueKind) -> Self {
        self.constraint = Some(kind);
        self
    }

    /// Set a literal default value
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultExpr::Literal(value.into()));
        self
    }

    /// Set a lazy default, re-evaluated on every unset read
    pub fn default_lazy(
        mut self,
        compute: impl Fn(&ResourceInstance) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.default = Some(DefaultExpr::Lazy(Arc::new(compute)));
        self
    }

    /// Mark this property as identifying the managed real-world object
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Make this the name property (also marks it as identity)
    pub fn name_property(mut self) -> Self {
        self.name_property = true;
        self.identity = true;
        self
    }

    /// Classify this property as desired state (`true`, the default) or
    /// actual state (`false`)
    pub fn desired_state(mut self, desired: bool) -> Self {
        self.desired_state = desired;
        self
    }

    /// Whether this property's explicitly-set value is seeded into a fresh
    /// current-value instance
    pub(crate) fn seeds_current_value(&self) -> bool {
        self.identity || self.name_property || !self.desired_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_desired_state() {
        let prop = PropertyDefinition::new("x");
        assert!(prop.desired_state);
        assert!(!prop.identity);
        assert!(!prop.seeds_current_value());
    }

    #[test]
    fn name_property_implies_identity() {
        let prop = PropertyDefinition::new("i").name_property();
        assert!(prop.identity);
        assert!(prop.seeds_current_value());
    }

    #[test]
    fn actual_state_properties_seed_current_value() {
        let prop = PropertyDefinition::new("d").desired_state(false);
        assert!(prop.seeds_current_value());
    }
}
