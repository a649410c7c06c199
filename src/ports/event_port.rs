//! Event sink port trait.

use crate::domain::events::TradeEvent;

/// Append-only receiver for engine events. Emitting never fails from the
/// engine's point of view.
pub trait EventSink {
    fn emit(&self, event: &TradeEvent);
}
