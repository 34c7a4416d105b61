//! Bridge from collection changes to an `EventEmitter`.

use std::cell::RefCell;

use event_emitter_rs::EventEmitter;

use crate::error::Result;
use crate::sequence::{Change, Observer};

/// Event name carrying every change, whatever its kind.
pub const CHANGE_EVENT: &str = "change";

/// Republishes each [`Change`] as a JSON string, once under its kind
/// (`"insert"`, `"update"`, `"remove"`) and once under [`CHANGE_EVENT`].
///
/// `EventEmitter` runs each listener on its own thread; the bridge joins them
/// before returning, so listeners have run by the time the mutating call
/// completes.
pub struct EmitterBridge {
    emitter: RefCell<EventEmitter>,
}

impl EmitterBridge {
    pub fn new(emitter: EventEmitter) -> Self {
        Self {
            emitter: RefCell::new(emitter),
        }
    }

    pub fn publish(&self, change: &Change) -> Result<()> {
        let payload = serde_json::to_string(change)?;
        let mut emitter = self.emitter.borrow_mut();

        for event in [change.kind.as_str(), CHANGE_EVENT] {
            for handle in emitter.emit(event, payload.clone()) {
                if handle.join().is_err() {
                    tracing::warn!(event, "change listener panicked");
                }
            }
        }

        Ok(())
    }

    pub fn into_observer(self) -> Observer {
        Box::new(move |change: &Change| {
            if let Err(err) = self.publish(change) {
                tracing::warn!(%err, "failed to publish change");
            }
        })
    }
}
