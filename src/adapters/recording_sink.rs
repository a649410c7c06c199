//! In-memory event sink.

use std::sync::Mutex;

use crate::domain::events::TradeEvent;
use crate::ports::event_port::EventSink;

/// Keeps every emitted event, optionally forwarding to another sink.
#[derive(Default)]
pub struct RecordingEventSink<'a> {
    events: Mutex<Vec<TradeEvent>>,
    forward: Option<&'a dyn EventSink>,
}

impl<'a> RecordingEventSink<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forwarding_to(sink: &'a dyn EventSink) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            forward: Some(sink),
        }
    }

    pub fn events(&self) -> Vec<TradeEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.name() == name)
            .count()
    }
}

impl EventSink for RecordingEventSink<'_> {
    fn emit(&self, event: &TradeEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
        if let Some(sink) = self.forward {
            sink.emit(event);
        }
    }
}
