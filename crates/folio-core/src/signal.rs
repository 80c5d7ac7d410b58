//! Change notification for the browser.
//!
//! A [`Signal`] is a list of callbacks ("slots") that run when the owner
//! emits. The browser controller exposes one signal per observable change:
//! a page was displayed, the selection was replaced, a fetch failed. A
//! presentation layer connects to those and re-renders.
//!
//! Slots run synchronously on the emitting thread, in connection order. The
//! slot list is copied before the slots run, so a slot may connect or
//! disconnect slots on the same signal; the change applies from the next
//! emission.
//!
//! ```
//! use folio_core::Signal;
//!
//! let fetch_failed = Signal::<String>::new();
//! let id = fetch_failed.connect(|message| eprintln!("fetch failed: {message}"));
//!
//! fetch_failed.emit("HTTP 503".to_string());
//! assert!(fetch_failed.disconnect(id));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle to one connected slot, used to disconnect it.
    ///
    /// Handles are never reused, so disconnecting a stale handle is a no-op.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A list of slots notified with a value of type `Args`.
///
/// Slots receive the emitted value by reference. `Signal` is `Send + Sync`;
/// share it behind an `Arc` or as a field of a shared owner.
pub struct Signal<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a signal with no slots.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot. It stays connected until [`disconnect`](Self::disconnect)
    /// or [`disconnect_all`](Self::disconnect_all).
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.slots.lock().insert(Arc::new(slot));
        tracing::trace!(target: targets::SIGNAL, ?id, "slot connected");
        id
    }

    /// Connect a slot for as long as the returned guard lives.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use folio_core::Signal;
    ///
    /// let selection_changed = Signal::<usize>::new();
    /// let last = Arc::new(AtomicUsize::new(0));
    /// {
    ///     let last = Arc::clone(&last);
    ///     let _guard = selection_changed.connect_scoped(move |&n| last.store(n, Ordering::SeqCst));
    ///     selection_changed.emit(30);
    /// }
    /// selection_changed.emit(5);
    /// assert_eq!(last.load(Ordering::SeqCst), 30);
    /// ```
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            id: self.connect(slot),
            signal: self,
        }
    }

    /// Disconnect one slot. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    /// Disconnect every slot.
    pub fn disconnect_all(&self) {
        self.slots.lock().clear();
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Suppress or resume emission. While blocked, [`emit`](Self::emit) drops
    /// the value without running any slot.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Whether emission is suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Run every connected slot with `args`.
    #[tracing::instrument(skip_all, target = "folio_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "blocked, dropping emission");
            return;
        }

        // No lock is held while slots run.
        let slots: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slots = slots.len(), "emitting");

        for slot in &slots {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

/// Disconnects its slot when dropped.
///
/// Returned by [`Signal::connect_scoped`]; it borrows the signal and cannot
/// outlive it.
pub struct ConnectionGuard<'a, Args: 'static> {
    signal: &'a Signal<Args>,
    id: ConnectionId,
}

impl<Args: 'static> ConnectionGuard<'_, Args> {
    /// The guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args: 'static> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        self.signal.disconnect(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + Send + 'static>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        signal.connect(move |value: &T| sink.lock().push(value.clone()));
        log
    }

    #[test]
    fn test_emit_reaches_slot() {
        let page_changed = Signal::<u32>::new();
        let log = recorder(&page_changed);

        page_changed.emit(1);
        page_changed.emit(4);

        assert_eq!(*log.lock(), vec![1, 4]);
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let signal = Signal::<u32>::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let id = signal.connect(move |&n| sink.lock().push(n));

        signal.emit(1);
        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.emit(2);

        assert_eq!(*log.lock(), vec![1]);
    }

    #[test]
    fn test_blocked_signal_drops_emissions() {
        let signal = Signal::<u32>::new();
        let log = recorder(&signal);

        signal.set_blocked(true);
        assert!(signal.is_blocked());
        signal.emit(7);
        signal.set_blocked(false);
        signal.emit(8);

        assert_eq!(*log.lock(), vec![8]);
    }

    #[test]
    fn test_slots_run_in_connection_order() {
        let signal = Signal::<&'static str>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["table", "status-bar"] {
            let sink = Arc::clone(&log);
            signal.connect(move |value| sink.lock().push(format!("{tag}:{value}")));
        }

        assert_eq!(signal.connection_count(), 2);
        signal.emit("page");
        assert_eq!(*log.lock(), vec!["table:page", "status-bar:page"]);

        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_scoped_connection() {
        let signal = Signal::<usize>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        {
            let sink = Arc::clone(&log);
            let guard = signal.connect_scoped(move |&n| sink.lock().push(n));
            assert_eq!(signal.connection_count(), 1);
            assert!(!signal.disconnect(ConnectionId::default()));
            let _ = guard.id();
            signal.emit(3);
        }

        assert_eq!(signal.connection_count(), 0);
        signal.emit(4);
        assert_eq!(*log.lock(), vec![3]);
    }

    #[test]
    fn test_slot_may_disconnect_itself() {
        let signal = Arc::new(Signal::<()>::new());
        let calls = Arc::new(Mutex::new(0));

        let weak = Arc::downgrade(&signal);
        let counter = Arc::clone(&calls);
        signal.connect(move |_| {
            *counter.lock() += 1;
            if let Some(signal) = weak.upgrade() {
                signal.disconnect_all();
            }
        });

        signal.emit(());
        signal.emit(());
        assert_eq!(*calls.lock(), 1);
    }
}
