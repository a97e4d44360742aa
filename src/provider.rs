//! Providers - the executable unit for one (resource, action) pair
//!
//! A provider owns the desired-state instance for the duration of one run
//! and accumulates the current and after snapshots as the pipeline drives
//! it. Hand-written providers implement [`Provider`] directly and may
//! override any loading step; types that only declare inline action bodies
//! get a synthesized [`InlineActionProvider`].

use crate::context::RunContext;
use crate::error::Result;
use crate::hooks::materialize_current_value;
use crate::resource::ResourceInstance;
use std::fmt;
use std::sync::Arc;

/// Execution scope handed to an inline action body
pub struct ActionScope<'a> {
    /// The desired-state resource; actions may mutate it
    pub new_resource: &'a mut ResourceInstance,
    /// The current-state snapshot, when one was loaded
    pub current_resource: Option<&'a ResourceInstance>,
    /// Ambient run state, passed through unchanged
    pub run_context: &'a RunContext,
}

/// An inline action body declared on a resource type
pub type ActionFn = Arc<dyn Fn(&mut ActionScope) -> Result<()> + Send + Sync>;

/// The convergence lifecycle of one resource instance under one action
///
/// Bound to a single (desired-state instance, action name) pair for one
/// run. `current_resource` and `after_resource` stay readable after the run
/// completes; `after_resource` remains `None` unless explicitly populated.
pub trait Provider: Send + Sync + fmt::Debug {
    /// The desired-state resource this provider converges
    fn new_resource(&self) -> &ResourceInstance;

    /// The action name this provider is bound to
    fn action(&self) -> &str;

    /// The current-state snapshot, once loaded
    fn current_resource(&self) -> Option<&ResourceInstance>;

    /// The post-action snapshot; `None` signals "not computed"
    fn after_resource(&self) -> Option<&ResourceInstance>;

    /// Determine the resource's actual current state
    ///
    /// Implementations may delegate to
    /// [`materialize_current_value`](crate::materialize_current_value) or
    /// inspect the world directly, and may deliberately leave the current
    /// snapshot unset.
    fn load_current_resource(&mut self, ctx: &RunContext) -> Result<()>;

    /// Capture post-action state; the default leaves it unset
    fn load_after_resource(&mut self, _ctx: &RunContext) -> Result<()> {
        Ok(())
    }

    /// Run the reconciliation logic for the bound action
    fn run_action_body(&mut self, ctx: &RunContext) -> Result<()>;
}

/// Provider synthesized from a resource type's inline action declaration
///
/// Its current-state loading delegates to the hook chain via
/// [`materialize_current_value`], and it never captures an after snapshot.
pub struct InlineActionProvider {
    new_resource: ResourceInstance,
    action: String,
    body: ActionFn,
    current: Option<ResourceInstance>,
}

impl InlineActionProvider {
    pub(crate) fn new(new_resource: ResourceInstance, action: String, body: ActionFn) -> Self {
        Self {
            new_resource,
            action,
            body,
            current: None,
        }
    }
}

impl fmt::Debug for InlineActionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineActionProvider")
            .field("resource", &self.new_resource)
            .field("action", &self.action)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl Provider for InlineActionProvider {
    fn new_resource(&self) -> &ResourceInstance {
        &self.new_resource
    }

    fn action(&self) -> &str {
        &self.action
    }

    fn current_resource(&self) -> Option<&ResourceInstance> {
        self.current.as_ref()
    }

    fn after_resource(&self) -> Option<&ResourceInstance> {
        // Synthesized providers never capture after state
        None
    }

    fn load_current_resource(&mut self, _ctx: &RunContext) -> Result<()> {
        self.current = Some(materialize_current_value(&self.new_resource)?);
        Ok(())
    }

    fn run_action_body(&mut self, ctx: &RunContext) -> Result<()> {
        let body = Arc::clone(&self.body);
        let mut scope = ActionScope {
            new_resource: &mut self.new_resource,
            current_resource: self.current.as_ref(),
            run_context: ctx,
        };
        body(&mut scope)
    }
}
