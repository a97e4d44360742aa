//! Current-value hook resolution across the type hierarchy
//!
//! Each resource type may declare its own current-value hook. Resolution
//! walks the ancestry nearest-first: a type with no own hook transparently
//! uses the nearest ancestor's hook; a type whose hook invokes
//! [`CallSuper::call`] runs the next ancestor hook up the chain before its
//! remaining body continues.

use crate::error::Result;
use crate::resource::{ResourceInstance, ResourceType};
use std::sync::Arc;

/// A current-value hook: mutates `current` in place to represent observed
/// state, given the desired-state `new_resource` and an explicit super
/// handle
pub type HookFn = Arc<
    dyn Fn(&mut ResourceInstance, &ResourceInstance, &CallSuper) -> Result<()> + Send + Sync,
>;

/// The ordered hooks of a type's ancestry, nearest own hook first
pub struct HookChain {
    hooks: Vec<HookFn>,
}

impl HookChain {
    /// Collect own hooks up the parent chain for `ty`; `None` when no type
    /// in the ancestry declares one
    pub fn resolve(ty: &Arc<ResourceType>) -> Option<Self> {
        let mut hooks = Vec::new();
        let mut cursor = Some(ty.as_ref());
        while let Some(t) = cursor {
            if let Some(hook) = t.own_hook() {
                hooks.push(Arc::clone(hook));
            }
            cursor = t.parent().map(|p| p.as_ref());
        }
        if hooks.is_empty() {
            None
        } else {
            Some(Self { hooks })
        }
    }

    /// Run the nearest hook; further ancestors run only through the super
    /// handle
    pub fn invoke(
        &self,
        current: &mut ResourceInstance,
        new_resource: &ResourceInstance,
    ) -> Result<()> {
        self.invoke_from(0, current, new_resource)
    }

    fn invoke_from(
        &self,
        index: usize,
        current: &mut ResourceInstance,
        new_resource: &ResourceInstance,
    ) -> Result<()> {
        let call_super = CallSuper {
            chain: self,
            next: index + 1,
        };
        (self.hooks[index])(current, new_resource, &call_super)
    }
}

/// Explicit delegation handle passed to every hook body
pub struct CallSuper<'a> {
    chain: &'a HookChain,
    next: usize,
}

impl CallSuper<'_> {
    /// Run the nearest ancestor's own hook against the same instances
    ///
    /// A no-op when no further ancestor declares a hook, mirroring a super
    /// call at the top of the hierarchy.
    pub fn call(
        &self,
        current: &mut ResourceInstance,
        new_resource: &ResourceInstance,
    ) -> Result<()> {
        if self.next < self.chain.hooks.len() {
            self.chain.invoke_from(self.next, current, new_resource)
        } else {
            Ok(())
        }
    }
}

/// Build a fresh current-value snapshot for `source`
///
/// Creates a new instance of the source's type carrying its name, seeds the
/// identity / name-property / actual-state slice of explicitly-set values,
/// then runs the resolved hook chain against it. Desired-state properties
/// are never pre-seeded, and nothing is cached: every call rebuilds the
/// instance and re-runs hook side effects.
pub fn materialize_current_value(source: &ResourceInstance) -> Result<ResourceInstance> {
    let ty = Arc::clone(source.resource_type());
    log::debug!(
        "materializing current value for {}[{}]",
        ty.name(),
        source.name()
    );

    let mut current = ty.instance(source.name());
    for definition in ty.all_properties() {
        if definition.seeds_current_value() {
            if let Some(value) = source.explicit_value(&definition.name) {
                current.seed(&definition.name, value.clone());
            }
        }
    }

    if let Some(chain) = HookChain::resolve(&ty) {
        chain.invoke(&mut current, source)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::property::PropertyDefinition;
    use crate::value::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stand-in for a real state probe: an incrementing counter shared by
    /// hook bodies and lazy defaults
    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn next(counter: &AtomicUsize) -> usize {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Explicitly-set properties plus the name, sorted, as "k=v" pairs
    fn render_set(instance: &ResourceInstance) -> String {
        let mut parts: Vec<String> = instance
            .set_properties()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        parts.push(format!("name={}", instance.name()));
        parts.sort();
        parts.join(", ")
    }

    /// A type with one lazily-defaulted property `x` and a hook that
    /// records the counter and the seeded properties it observed
    fn probed_type(counter: &Arc<AtomicUsize>) -> Arc<ResourceType> {
        let for_default = Arc::clone(counter);
        let for_hook = Arc::clone(counter);
        ResourceType::builder("probed")
            .property(PropertyDefinition::new("x").default_lazy(move |_| {
                Value::from(format!("default {}", next(&for_default)))
            }))
            .load_current_value(move |current, _new, _super_hook| {
                let observed = render_set(current);
                current.set("x", format!("loaded {} ({observed})", next(&for_hook)))
            })
            .build()
            .unwrap()
    }

    #[test]
    fn desired_state_is_not_seeded() {
        let counter = counter();
        let ty = probed_type(&counter);
        let mut source = ty.instance("blah");
        source.set("x", "desired").unwrap();

        let current = materialize_current_value(&source).unwrap();
        assert_eq!(current.get("x"), Some(Value::from("loaded 1 (name=blah)")));
        // The source is untouched
        assert_eq!(source.get("x"), Some(Value::from("desired")));
    }

    #[test]
    fn never_memoized_across_calls() {
        let counter = counter();
        let ty = probed_type(&counter);
        let mut source = ty.instance("blah");
        source.set("x", "desired").unwrap();

        let first = materialize_current_value(&source).unwrap();
        let second = materialize_current_value(&source).unwrap();
        assert_eq!(first.get("x"), Some(Value::from("loaded 1 (name=blah)")));
        assert_eq!(second.get("x"), Some(Value::from("loaded 2 (name=blah)")));
    }

    #[test]
    fn identity_and_actual_state_properties_are_seeded() {
        let counter = counter();
        let base = probed_type(&counter);
        let ty = ResourceType::builder("probed_identity")
            .parent(&base)
            .property(PropertyDefinition::new("i").identity())
            .property(PropertyDefinition::new("d").desired_state(false))
            .build()
            .unwrap();

        let mut source = ty.instance("blah");
        source.set("x", "desired").unwrap();
        source.set("i", "desired_i").unwrap();
        source.set("d", "desired_d").unwrap();

        let current = materialize_current_value(&source).unwrap();
        assert_eq!(
            current.get("x"),
            Some(Value::from("loaded 1 (d=desired_d, i=desired_i, name=blah)"))
        );
    }

    #[test]
    fn name_property_is_seeded_when_set() {
        let counter = counter();
        let base = probed_type(&counter);
        let ty = ResourceType::builder("probed_named")
            .parent(&base)
            .property(PropertyDefinition::new("i").name_property())
            .property(PropertyDefinition::new("d").desired_state(false))
            .build()
            .unwrap();

        let mut source = ty.instance("blah");
        source.set("x", "desired").unwrap();
        source.set("i", "desired_i").unwrap();
        source.set("d", "desired_d").unwrap();

        let current = materialize_current_value(&source).unwrap();
        assert_eq!(
            current.get("x"),
            Some(Value::from("loaded 1 (d=desired_d, i=desired_i, name=blah)"))
        );
    }

    #[test]
    fn subtype_without_hook_uses_nearest_ancestor() {
        let counter = counter();
        let parent = probed_type(&counter);
        let child = ResourceType::builder("probed_child")
            .parent(&parent)
            .property(PropertyDefinition::new("y"))
            .build()
            .unwrap();

        let mut source = child.instance("blah");
        source.set("x", "desired").unwrap();

        let current = materialize_current_value(&source).unwrap();
        assert_eq!(current.get("x"), Some(Value::from("loaded 1 (name=blah)")));
        // The snapshot is an instance of the subtype, not the declaring type
        assert!(Arc::ptr_eq(current.resource_type(), &child));
    }

    #[test]
    fn subtype_hook_without_super_replaces_parent_hook() {
        let counter = counter();
        let parent = probed_type(&counter);
        let for_hook = Arc::clone(&counter);
        let child = ResourceType::builder("probed_child")
            .parent(&parent)
            .property(PropertyDefinition::new("y"))
            .load_current_value(move |current, _new, _super_hook| {
                let observed = render_set(current);
                current.set("y", format!("loaded_y {} ({observed})", next(&for_hook)))
            })
            .build()
            .unwrap();

        let mut source = child.instance("blah");
        source.set("x", "desired").unwrap();

        let current = materialize_current_value(&source).unwrap();
        assert_eq!(current.get("y"), Some(Value::from("loaded_y 1 (name=blah)")));
        // Parent hook never ran, so x falls back to its lazy default
        assert_eq!(current.get("x"), Some(Value::from("default 2")));
    }

    #[test]
    fn call_super_runs_ancestor_body_first() {
        let counter = counter();
        let parent = probed_type(&counter);
        let for_hook = Arc::clone(&counter);
        let child = ResourceType::builder("probed_child")
            .parent(&parent)
            .property(PropertyDefinition::new("y"))
            .load_current_value(move |current, new, super_hook| {
                super_hook.call(current, new)?;
                let observed = render_set(current);
                current.set("y", format!("loaded_y {} ({observed})", next(&for_hook)))
            })
            .build()
            .unwrap();

        let mut source = child.instance("blah");
        source.set("x", "desired").unwrap();

        let current = materialize_current_value(&source).unwrap();
        assert_eq!(current.get("x"), Some(Value::from("loaded 1 (name=blah)")));
        assert_eq!(
            current.get("y"),
            Some(Value::from("loaded_y 2 (name=blah, x=loaded 1 (name=blah))"))
        );
    }

    #[test]
    fn call_super_at_hierarchy_top_is_a_noop() {
        let ty = ResourceType::builder("rooted")
            .property(PropertyDefinition::new("x"))
            .load_current_value(|current, new, super_hook| {
                super_hook.call(current, new)?;
                current.set("x", "observed")
            })
            .build()
            .unwrap();

        let current = materialize_current_value(&ty.instance("blah")).unwrap();
        assert_eq!(current.get("x"), Some(Value::from("observed")));
    }

    #[test]
    fn no_hook_anywhere_yields_only_seeded_slice() {
        let ty = ResourceType::builder("inert")
            .property(PropertyDefinition::new("i").identity())
            .property(PropertyDefinition::new("x"))
            .build()
            .unwrap();
        let mut source = ty.instance("blah");
        source.set("i", "one").unwrap();
        source.set("x", "two").unwrap();

        let current = materialize_current_value(&source).unwrap();
        assert_eq!(current.get("i"), Some(Value::from("one")));
        assert_eq!(current.get("x"), None);
        assert_eq!(current.name(), "blah");
    }

    #[test]
    fn hook_error_propagates() {
        let ty = ResourceType::builder("failing")
            .property(PropertyDefinition::new("x"))
            .load_current_value(|_current, _new, _super_hook| {
                Err(Error::Other(anyhow::anyhow!("probe unreachable")))
            })
            .build()
            .unwrap();

        let err = materialize_current_value(&ty.instance("blah")).unwrap_err();
        assert!(err.to_string().contains("probe unreachable"));
    }
}
