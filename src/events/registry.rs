//! Ordered listener registry with failure-isolating fan-out.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::broadcast;

use crate::config::EventsConfig;
use crate::error::{log_dispatch_error, ListenerDispatchError};
use crate::native::{NativeEvent, NativeEventSink};

use super::{MediaPlayerEventListener, PlayerEvent, PlayerId};

/// Listeners of one media player, in registration order.
///
/// Dispatch iterates over a snapshot taken when the event arrives, so
/// listeners may add or remove registrations (even themselves) while an
/// event is in flight; such changes apply from the next event on.
pub struct EventListenerRegistry {
    player: PlayerId,
    listeners: RwLock<Vec<Arc<dyn MediaPlayerEventListener>>>,
    active: AtomicBool,
    events_tx: broadcast::Sender<PlayerEvent>,
    failures: Mutex<VecDeque<ListenerDispatchError>>,
    failure_capacity: usize,
    failure_count: AtomicU64,
}

impl EventListenerRegistry {
    pub fn new(player: PlayerId, config: &EventsConfig) -> Self {
        let (events_tx, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Self {
            player,
            listeners: RwLock::new(Vec::new()),
            active: AtomicBool::new(true),
            events_tx,
            failures: Mutex::new(VecDeque::with_capacity(config.failure_history)),
            failure_capacity: config.failure_history,
            failure_count: AtomicU64::new(0),
        }
    }

    /// Append a registration. The same listener may be added repeatedly and
    /// then receives each event once per registration.
    pub fn add(&self, listener: Arc<dyn MediaPlayerEventListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Remove the earliest registration of `listener`.
    ///
    /// Returns false when it was not registered.
    pub fn remove(&self, listener: &Arc<dyn MediaPlayerEventListener>) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        match listeners.iter().position(|l| same_listener(l, listener)) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Deliver `event` to every registered listener, in order, on the
    /// calling thread, then publish it to async subscribers.
    ///
    /// A panicking listener is recorded and skipped. Returns the number of
    /// listeners that handled the event without failing.
    pub fn dispatch(&self, event: &PlayerEvent) -> usize {
        let snapshot: Vec<Arc<dyn MediaPlayerEventListener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut delivered = 0;
        for (index, listener) in snapshot.iter().enumerate() {
            let result = catch_unwind(AssertUnwindSafe(|| {
                event.deliver(listener.as_ref(), self.player);
            }));
            match result {
                Ok(()) => delivered += 1,
                Err(payload) => self.record_failure(ListenerDispatchError {
                    player_id: self.player.0,
                    listener_index: index,
                    event: event.kind(),
                    reason: ListenerDispatchError::panic_reason(payload.as_ref()),
                }),
            }
        }

        // No receivers is the common case.
        let _ = self.events_tx.send(event.clone());
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events_tx.subscribe()
    }

    /// Total listener failures since creation.
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// Most recent listener failures, oldest first.
    pub fn recent_failures(&self) -> Vec<ListenerDispatchError> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Stop accepting native events. Events already cloned out of the
    /// engine before detach are dropped here.
    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn record_failure(&self, err: ListenerDispatchError) {
        log_dispatch_error(&err);
        self.failure_count.fetch_add(1, Ordering::SeqCst);
        if self.failure_capacity == 0 {
            return;
        }
        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        if failures.len() == self.failure_capacity {
            failures.pop_front();
        }
        failures.push_back(err);
    }
}

impl NativeEventSink for EventListenerRegistry {
    fn on_native_event(&self, event: NativeEvent) {
        if !self.is_active() {
            log::debug!("[EventListenerRegistry] {} dropped late {:?}", self.player, event);
            return;
        }
        self.dispatch(&PlayerEvent::from(event));
    }
}

fn same_listener(
    a: &Arc<dyn MediaPlayerEventListener>,
    b: &Arc<dyn MediaPlayerEventListener>,
) -> bool {
    // Compare data pointers only; vtable pointers are not unique.
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}
