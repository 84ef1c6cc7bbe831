//! Simulated readiness reactor
//!
//! Readiness is injected with [`SimReactor::fire`] and queued on an
//! `embassy-sync` channel until the interrupt loop picks it up.

use core::cell::{Cell, RefCell};

use bonemux_hal::{HwError, Interest, ReadyEvent, Reactor, SourceId};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use heapless::FnvIndexMap;

/// Depth of the pending event queue
pub const READY_QUEUE_LEN: usize = 16;

/// Simulated reactor
pub struct SimReactor {
    subscribed: RefCell<FnvIndexMap<SourceId, u16, 64>>,
    ready: Channel<NoopRawMutex, ReadyEvent, READY_QUEUE_LEN>,
    refuse: Cell<bool>,
}

impl Default for SimReactor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimReactor {
    pub fn new() -> Self {
        Self {
            subscribed: RefCell::new(FnvIndexMap::new()),
            ready: Channel::new(),
            refuse: Cell::new(false),
        }
    }

    /// Make the next subscription fail
    pub fn refuse_next(&self) {
        self.refuse.set(true);
    }

    /// Check if a source is being watched
    pub fn is_subscribed(&self, source: SourceId) -> bool {
        self.subscribed.borrow().contains_key(&source)
    }

    /// Number of watched sources
    pub fn subscriptions(&self) -> usize {
        self.subscribed.borrow().len()
    }

    /// Report urgent readiness on a source
    ///
    /// Returns false if the source is not subscribed or the queue is full.
    pub fn fire(&self, source: SourceId) -> bool {
        let token = match self.subscribed.borrow().get(&source) {
            Some(token) => *token,
            None => return false,
        };
        self.ready.try_send(ReadyEvent { source, token }).is_ok()
    }

    /// Take a pending event without waiting
    pub fn try_next(&self) -> Option<ReadyEvent> {
        self.ready.try_receive().ok()
    }
}

impl Reactor for SimReactor {
    fn subscribe(&self, source: SourceId, token: u16, interest: Interest) -> Result<(), HwError> {
        let Interest::Urgent = interest;
        if self.refuse.replace(false) {
            return Err(HwError::Busy);
        }
        self.subscribed
            .borrow_mut()
            .insert(source, token)
            .map(|_| ())
            .map_err(|_| HwError::Busy)
    }

    fn unsubscribe(&self, source: SourceId) {
        self.subscribed.borrow_mut().remove(&source);
    }

    async fn wait_ready(&self) -> ReadyEvent {
        self.ready.receive().await
    }
}
