//! Resource types and instances
//!
//! A [`ResourceType`] is an immutable description of a kind of managed
//! resource: its properties (own and inherited), the names it is resolvable
//! under, an optional current-value hook, and inline action bodies. Types
//! form a single-inheritance hierarchy and are shared as `Arc<ResourceType>`
//! once built.
//!
//! A [`ResourceInstance`] is a concrete resource of one type: a name plus a
//! sparse map of explicitly-set property values. Being explicitly set is
//! distinguishable from being unset, which matters both for lazy defaults
//! and for current-state seeding.

use crate::error::{Error, Result};
use crate::hooks::{CallSuper, HookFn};
use crate::property::PropertyDefinition;
use crate::provider::{ActionFn, ActionScope};
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// An immutable resource type definition
pub struct ResourceType {
    name: String,
    parent: Option<Arc<ResourceType>>,
    provides: Vec<String>,
    /// Inherited first, own appended, same-name redeclarations replacing
    /// the inherited definition in place
    all_properties: Vec<PropertyDefinition>,
    hook: Option<HookFn>,
    actions: HashMap<String, ActionFn>,
}

impl ResourceType {
    /// Start building a new resource type
    pub fn builder(name: impl Into<String>) -> ResourceTypeBuilder {
        ResourceTypeBuilder {
            name: name.into(),
            parent: None,
            properties: Vec::new(),
            provides: Vec::new(),
            hook: None,
            actions: HashMap::new(),
        }
    }

    /// The type's own name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent type, if any
    pub fn parent(&self) -> Option<&Arc<ResourceType>> {
        self.parent.as_ref()
    }

    /// Lookup names this type is registered under
    pub fn provides(&self) -> &[String] {
        &self.provides
    }

    /// All properties in declaration order (inherited first, own second,
    /// duplicates overriding in place). Consumers needing stable display
    /// order must sort by name themselves.
    pub fn all_properties(&self) -> &[PropertyDefinition] {
        &self.all_properties
    }

    /// Look up a property definition by name
    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.all_properties.iter().find(|p| p.name == name)
    }

    /// This type's own current-value hook, ignoring ancestors
    pub(crate) fn own_hook(&self) -> Option<&HookFn> {
        self.hook.as_ref()
    }

    /// Find the nearest inline action body for `action`, walking up the
    /// parent chain
    pub fn find_action(&self, action: &str) -> Option<ActionFn> {
        if let Some(body) = self.actions.get(action) {
            return Some(Arc::clone(body));
        }
        self.parent.as_ref().and_then(|p| p.find_action(action))
    }

    /// Create an instance of this type
    pub fn instance(self: &Arc<Self>, name: impl Into<String>) -> ResourceInstance {
        ResourceInstance::new(Arc::clone(self), name)
    }

    /// Whether this type is `other` or a descendant of it
    pub fn derives_from(&self, other: &ResourceType) -> bool {
        let mut cursor = Some(self);
        while let Some(ty) = cursor {
            if std::ptr::eq(ty, other) {
                return true;
            }
            cursor = ty.parent.as_deref();
        }
        false
    }
}

impl fmt::Debug for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("provides", &self.provides)
            .field("properties", &self.all_properties.len())
            .field("has_hook", &self.hook.is_some())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`ResourceType`]
pub struct ResourceTypeBuilder {
    name: String,
    parent: Option<Arc<ResourceType>>,
    properties: Vec<PropertyDefinition>,
    provides: Vec<String>,
    hook: Option<HookFn>,
    actions: HashMap<String, ActionFn>,
}

impl ResourceTypeBuilder {
    /// Inherit from a parent type
    pub fn parent(mut self, parent: &Arc<ResourceType>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declare a property on this type
    pub fn property(mut self, definition: PropertyDefinition) -> Self {
        self.properties.push(definition);
        self
    }

    /// Register this type as resolvable under `name`; may be called
    /// multiple times. Types with no explicit provides name are registered
    /// under their own type name.
    pub fn provides(mut self, name: impl Into<String>) -> Self {
        self.provides.push(name.into());
        self
    }

    /// Attach this type's own current-value hook
    ///
    /// The hook mutates `current` in place to represent observed state. It
    /// may invoke [`CallSuper::call`] to run the nearest ancestor's own hook
    /// before its remaining body continues; omitting the call runs only this
    /// body.
    pub fn load_current_value(
        mut self,
        hook: impl Fn(&mut ResourceInstance, &ResourceInstance, &CallSuper) -> Result<()>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Declare an inline action body
    pub fn action(
        mut self,
        name: impl Into<String>,
        body: impl Fn(&mut ActionScope) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.actions.insert(name.into(), Arc::new(body));
        self
    }

    /// Finalize the type
    ///
    /// Fails with [`Error::DuplicateNameProperty`] if the resulting type
    /// would carry more than one name property.
    pub fn build(self) -> Result<Arc<ResourceType>> {
        // Own declarations may repeat a name; the later one replaces the
        // earlier in place, same as a subtype redeclaring an inherited one.
        let mut effective: Vec<PropertyDefinition> = match &self.parent {
            Some(parent) => parent.all_properties.clone(),
            None => Vec::new(),
        };
        for definition in self.properties {
            match effective.iter_mut().find(|p| p.name == definition.name) {
                Some(slot) => *slot = definition,
                None => effective.push(definition),
            }
        }

        let mut name_property: Option<&str> = None;
        for definition in &effective {
            if definition.name_property {
                if let Some(first) = name_property {
                    return Err(Error::DuplicateNameProperty {
                        type_name: self.name,
                        first: first.to_string(),
                        second: definition.name.clone(),
                    });
                }
                name_property = Some(&definition.name);
            }
        }

        let provides = if self.provides.is_empty() {
            vec![self.name.clone()]
        } else {
            self.provides
        };

        Ok(Arc::new(ResourceType {
            name: self.name,
            parent: self.parent,
            provides,
            all_properties: effective,
            hook: self.hook,
            actions: self.actions,
        }))
    }
}

/// A concrete resource: desired state as authored, or a materialized
/// current/after snapshot
#[derive(Clone)]
pub struct ResourceInstance {
    ty: Arc<ResourceType>,
    name: String,
    values: BTreeMap<String, Value>,
}

impl ResourceInstance {
    /// Create an instance with no explicitly-set properties
    pub fn new(ty: Arc<ResourceType>, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// The instance's type
    pub fn resource_type(&self) -> &Arc<ResourceType> {
        &self.ty
    }

    /// The instance's string identity
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read a property
    ///
    /// Returns the explicitly-set value if any; otherwise the instance name
    /// for an unset name property; otherwise the evaluated default (lazy
    /// defaults re-run on every unset read); otherwise `None`. `None` is the
    /// unset sentinel - never a type-specific zero value.
    pub fn get(&self, property: &str) -> Option<Value> {
        if let Some(value) = self.values.get(property) {
            return Some(value.clone());
        }
        let definition = self.ty.property(property)?;
        if definition.name_property {
            return Some(Value::Str(self.name.clone()));
        }
        definition.default.as_ref().map(|d| d.evaluate(self))
    }

    /// Assign a property, validating any declared type constraint
    ///
    /// On failure the assignment does not take effect and the instance is
    /// left unchanged.
    pub fn set(&mut self, property: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let definition =
            self.ty
                .property(property)
                .ok_or_else(|| Error::UnknownProperty {
                    type_name: self.ty.name().to_string(),
                    property: property.to_string(),
                })?;
        if let Some(expected) = definition.constraint {
            if value.kind() != expected {
                return Err(Error::TypeConstraint {
                    type_name: self.ty.name().to_string(),
                    property: property.to_string(),
                    expected,
                    actual: value.kind(),
                });
            }
        }
        self.values.insert(property.to_string(), value);
        Ok(())
    }

    /// Whether `property` was explicitly set; defaults never count
    pub fn is_set(&self, property: &str) -> bool {
        self.values.contains_key(property)
    }

    /// Explicitly-set properties in name order
    pub fn set_properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The explicitly-set value of `property`, bypassing defaults
    pub(crate) fn explicit_value(&self, property: &str) -> Option<&Value> {
        self.values.get(property)
    }

    /// Store a value without constraint validation; used when seeding
    /// snapshots with values that already passed validation on the source
    pub(crate) fn seed(&mut self, property: &str, value: Value) {
        self.values.insert(property.to_string(), value);
    }
}

impl fmt::Debug for ResourceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceInstance")
            .field("type", &self.ty.name())
            .field("name", &self.name)
            .field("values", &self.values)
            .finish()
    }
}
