//! Action execution pipeline
//!
//! Drives one action run through its states in strict order, none
//! skippable:
//!
//! `Initialized -> CurrentLoaded -> ActionExecuted -> AfterLoaded ->
//! Completed`
//!
//! A failure in any phase aborts the run at that transition and surfaces
//! with the resource type, action name, and failing phase attached. The
//! pipeline never retries and never suppresses.

use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::provider::Provider;
use std::fmt;

/// The phase of an action run in which a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    CurrentLoad,
    Action,
    AfterLoad,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CurrentLoad => "current-load",
            Self::Action => "action",
            Self::AfterLoad => "after-load",
        };
        write!(f, "{name}")
    }
}

/// Run the provider's bound action through the full pipeline
///
/// 1. Load current state and notify `resource_current_state_loaded`.
/// 2. Run the action body with the desired and current state in scope.
/// 3. Load after state (unset by default) and notify
///    `resource_after_state_loaded` - the event always carries a resource,
///    falling back to the desired-state instance when no after snapshot was
///    captured, even though the `after_resource` accessor stays `None`.
///
/// Event dispatch is fire-and-forget; the dispatcher's outcome is never
/// consulted.
pub fn run_action(provider: &mut dyn Provider, ctx: &RunContext) -> Result<()> {
    let type_name = provider.new_resource().resource_type().name().to_string();
    let action = provider.action().to_string();
    log::debug!(
        "running action '{action}' on {type_name}[{}]",
        provider.new_resource().name()
    );

    provider
        .load_current_resource(ctx)
        .map_err(|source| phase_error(RunPhase::CurrentLoad, &type_name, &action, source))?;
    log::debug!(
        "{type_name}[{}]: current state loaded",
        provider.new_resource().name()
    );
    ctx.events().resource_current_state_loaded(
        provider.new_resource(),
        &action,
        provider.current_resource(),
    );

    provider
        .run_action_body(ctx)
        .map_err(|source| phase_error(RunPhase::Action, &type_name, &action, source))?;
    log::debug!(
        "{type_name}[{}]: action executed",
        provider.new_resource().name()
    );

    provider
        .load_after_resource(ctx)
        .map_err(|source| phase_error(RunPhase::AfterLoad, &type_name, &action, source))?;
    let after_for_event = provider
        .after_resource()
        .unwrap_or_else(|| provider.new_resource());
    ctx.events()
        .resource_after_state_loaded(provider.new_resource(), &action, after_for_event);

    log::debug!(
        "{type_name}[{}]: action '{action}' completed",
        provider.new_resource().name()
    );
    Ok(())
}

fn phase_error(phase: RunPhase, type_name: &str, action: &str, source: Error) -> Error {
    Error::Phase {
        phase,
        type_name: type_name.to_string(),
        action: action.to_string(),
        source: Box::new(source),
    }
}
