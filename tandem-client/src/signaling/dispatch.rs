use crate::error::CallError;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Event handler: runs to completion against the context before the next
/// event is looked at.
pub type Handler<C> = for<'a> fn(&'a mut C, Option<Value>) -> BoxFuture<'a, Result<(), CallError>>;

/// Event name → handler table for relay events.
pub struct Dispatcher<C> {
    handlers: HashMap<&'static str, Handler<C>>,
}

impl<C> Dispatcher<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers the handler for `event`. One handler per name; a later
    /// registration replaces the earlier one.
    pub fn on(&mut self, event: &'static str, handler: Handler<C>) {
        if self.handlers.insert(event, handler).is_some() {
            warn!("Replacing handler for `{}`", event);
        }
    }

    pub fn handler(&self, event: &str) -> Option<Handler<C>> {
        self.handlers.get(event).copied()
    }
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}
