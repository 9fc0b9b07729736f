//! Event listeners for live nodes.
//!
//! A [`Handler`] wraps a callback behind an `Arc` so the same handler can be
//! installed on a node and later removed by identity, the way listeners are
//! matched on a native tree.

use std::fmt;
use std::sync::Arc;

use super::node::NodeId;

/// An event delivered to a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// The event name, e.g. `"click"`.
    pub name: String,
    /// The node the event was dispatched on.
    pub target: NodeId,
}

/// A listener callback.
///
/// Cloning a handler yields the same listener: clones compare equal and
/// removing one removes the other.
#[derive(Clone)]
pub struct Handler {
    callback: Arc<dyn Fn(&Event) + Send + Sync>,
}

impl Handler {
    /// Create a new handler with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Invoke the callback.
    pub fn call(&self, event: &Event) {
        (self.callback)(event);
    }

    /// Whether two handlers are the same listener.
    pub fn same(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("callback", &Arc::as_ptr(&self.callback))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn handler_call_invokes_callback() {
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();

        let handler = Handler::new(move |_| {
            called_clone.store(true, Ordering::SeqCst);
        });

        assert!(!called.load(Ordering::SeqCst));
        handler.call(&Event {
            name: "click".into(),
            target: NodeId::next(),
        });
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn clones_are_the_same_listener() {
        let a = Handler::new(|_| {});
        let b = a.clone();
        let c = Handler::new(|_| {});

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
