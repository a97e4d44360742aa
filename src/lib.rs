//! # Converge
//!
//! The convergence core of a declarative resource-management engine.
//!
//! Given a user-authored *desired state* for a managed resource, this crate
//! determines the resource's *actual current state* through a per-type hook
//! chain, runs an idempotent *action* that reconciles the two, and
//! optionally records the *resulting state* afterward, notifying observers
//! at each transition.
//!
//! ## Core Concepts
//!
//! - **[`ResourceType`]**: an immutable type definition - properties (own
//!   and inherited), lookup names, an optional current-value hook, inline
//!   action bodies
//! - **[`ResourceInstance`]**: one resource of one type - a name plus the
//!   explicitly-set slice of its properties
//! - **[`Provider`]**: the executable unit bound to one (resource, action)
//!   pair for one run
//! - **[`run_action`]**: the pipeline driving load-current, notify, action,
//!   load-after, notify in strict order
//!
//! ## Example
//!
//! ```ignore
//! use converge::{
//!     PropertyDefinition, ResourceType, ResourceTypeRegistry, RunContext,
//!     ValueKind, run_action,
//! };
//!
//! let host_entry = ResourceType::builder("host_entry")
//!     .property(PropertyDefinition::new("hostname").name_property())
//!     .property(PropertyDefinition::new("address").constraint(ValueKind::Str))
//!     .load_current_value(|current, _new, _super_hook| {
//!         // Inspect the real system and record what is actually there
//!         current.set("address", "127.0.0.1")
//!     })
//!     .action("create", |scope| {
//!         let desired = scope.new_resource.get("address");
//!         let actual = scope.current_resource.and_then(|c| c.get("address"));
//!         if desired != actual {
//!             // ...write the entry...
//!         }
//!         Ok(())
//!     })
//!     .build()?;
//!
//! let mut registry = ResourceTypeRegistry::new();
//! registry.register(&host_entry);
//!
//! let mut resource = host_entry.instance("db.internal");
//! resource.set("address", "10.0.0.12")?;
//!
//! let mut provider = registry.resolve_provider(resource, "create")?;
//! run_action(provider.as_mut(), &RunContext::default())?;
//! ```
//!
//! ## Scope
//!
//! This crate covers the convergence lifecycle of one resource instance
//! under one action. How a specific resource type inspects the real world
//! lives in externally-authored hook and action bodies; ordering multiple
//! resources against each other is the surrounding orchestrator's job.
//! Registration must complete before runs begin - afterwards the type
//! metadata is immutable and independent runs may share it freely.

pub mod context;
pub mod error;
pub mod hooks;
pub mod property;
pub mod provider;
pub mod registry;
pub mod resource;
pub mod runner;
pub mod value;

// Re-export main types at crate root
pub use context::{
    CollectingDispatcher, EventDispatcher, NullDispatcher, RecordedEvent, RunContext,
};
pub use error::{Error, Result};
pub use hooks::{materialize_current_value, CallSuper, HookChain, HookFn};
pub use property::{DefaultExpr, LazyDefault, PropertyDefinition};
pub use provider::{ActionFn, ActionScope, InlineActionProvider, Provider};
pub use registry::{ProviderFactory, ResourceTypeRegistry};
pub use resource::{ResourceInstance, ResourceType, ResourceTypeBuilder};
pub use runner::{run_action, RunPhase};
pub use value::{Value, ValueKind};
