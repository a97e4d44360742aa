//! Run context and event dispatch
//!
//! These are the core's only collaborators: an ambient attribute bag it
//! passes through untouched, and a best-effort event sink it notifies as an
//! action run transitions between states.

use crate::resource::ResourceInstance;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Observer for resource state transitions
///
/// Notifications are fire-and-forget: the pipeline never blocks on or
/// alters behavior based on a dispatcher's outcome.
pub trait EventDispatcher: Send + Sync {
    /// The current-state snapshot for `new_resource` was loaded (possibly
    /// left unset by a provider override)
    fn resource_current_state_loaded(
        &self,
        new_resource: &ResourceInstance,
        action: &str,
        current: Option<&ResourceInstance>,
    );

    /// The after-state was loaded; `after` is the captured snapshot, or
    /// `new_resource` itself when none was captured
    fn resource_after_state_loaded(
        &self,
        new_resource: &ResourceInstance,
        action: &str,
        after: &ResourceInstance,
    );
}

/// No-op dispatcher
pub struct NullDispatcher;

impl EventDispatcher for NullDispatcher {
    fn resource_current_state_loaded(
        &self,
        _new_resource: &ResourceInstance,
        _action: &str,
        _current: Option<&ResourceInstance>,
    ) {
    }

    fn resource_after_state_loaded(
        &self,
        _new_resource: &ResourceInstance,
        _action: &str,
        _after: &ResourceInstance,
    ) {
    }
}

/// A recorded state-transition notification
#[derive(Debug, Clone)]
pub enum RecordedEvent {
    CurrentStateLoaded {
        resource: String,
        action: String,
        current: Option<ResourceInstance>,
    },
    AfterStateLoaded {
        resource: String,
        action: String,
        after: ResourceInstance,
    },
}

/// Dispatcher that records every notification, for tests and reporting
#[derive(Default)]
pub struct CollectingDispatcher {
    events: Mutex<Vec<RecordedEvent>>,
}

impl CollectingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the notifications recorded so far
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventDispatcher for CollectingDispatcher {
    fn resource_current_state_loaded(
        &self,
        new_resource: &ResourceInstance,
        action: &str,
        current: Option<&ResourceInstance>,
    ) {
        self.events
            .lock()
            .unwrap()
            .push(RecordedEvent::CurrentStateLoaded {
                resource: new_resource.name().to_string(),
                action: action.to_string(),
                current: current.cloned(),
            });
    }

    fn resource_after_state_loaded(
        &self,
        new_resource: &ResourceInstance,
        action: &str,
        after: &ResourceInstance,
    ) {
        self.events
            .lock()
            .unwrap()
            .push(RecordedEvent::AfterStateLoaded {
                resource: new_resource.name().to_string(),
                action: action.to_string(),
                after: after.clone(),
            });
    }
}

/// Ambient execution state for one run
///
/// The node attribute bag is opaque to the core: it is handed through to
/// action bodies unchanged and never inspected here.
pub struct RunContext {
    /// Node attributes and other ambient state
    pub node: BTreeMap<String, Value>,
    events: Arc<dyn EventDispatcher>,
}

impl RunContext {
    /// Create a context dispatching to `events`
    pub fn new(events: Arc<dyn EventDispatcher>) -> Self {
        Self {
            node: BTreeMap::new(),
            events,
        }
    }

    /// Replace the node attribute bag
    pub fn with_node(mut self, node: BTreeMap<String, Value>) -> Self {
        self.node = node;
        self
    }

    /// The event dispatcher for this run
    pub fn events(&self) -> &dyn EventDispatcher {
        self.events.as_ref()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(Arc::new(NullDispatcher))
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}
