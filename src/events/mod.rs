//! Access notifications
//!
//! The pipeline reports two observable facts: a resource was served, and a
//! token's security context binding failed. Host applications subscribe by
//! handing an [`EventSink`] to the pipeline; sinks are called synchronously.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::types::ResourceIdentifier;

/// Notification emitted by the access pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessEvent {
    /// A resource was handed to the delivery strategy successfully
    ResourceServed {
        identifier: ResourceIdentifier,
        filename: String,
        strategy: String,
    },
    /// The token was bound to a different security context
    ContextBindingFailed { identifier: ResourceIdentifier },
}

impl AccessEvent {
    /// Stable event name
    pub fn name(&self) -> &'static str {
        match self {
            AccessEvent::ResourceServed { .. } => "resource_served",
            AccessEvent::ContextBindingFailed { .. } => "context_binding_failed",
        }
    }

    /// Identifier of the resource the event concerns
    pub fn identifier(&self) -> &ResourceIdentifier {
        match self {
            AccessEvent::ResourceServed { identifier, .. }
            | AccessEvent::ContextBindingFailed { identifier } => identifier,
        }
    }
}

/// Receiver of access notifications
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &AccessEvent);
}

/// Logs every event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &AccessEvent) {
        match event {
            AccessEvent::ResourceServed { identifier, filename, strategy } => {
                tracing::info!(
                    target: "protected_resource::events",
                    event = event.name(),
                    identifier = %identifier,
                    filename = %filename,
                    strategy = %strategy,
                    "Protected resource served"
                );
            }
            AccessEvent::ContextBindingFailed { identifier } => {
                tracing::warn!(
                    target: "protected_resource::events",
                    event = event.name(),
                    identifier = %identifier,
                    "Security context binding failed"
                );
            }
        }
    }
}

/// Keeps every event in memory, for hosts that poll and for tests
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<AccessEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<AccessEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events with the given name
    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name() == name).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &AccessEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Forwards every event to several sinks in order
#[derive(Default, Clone)]
pub struct FanoutEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutEventSink {
    fn emit(&self, event: &AccessEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}
