//! Zero-capacity handoff between the broadcast coordinator and one delivery loop.
//!
//! An offer only succeeds while the receiving side is parked in [`Receiver::recv`].
//! The receiver parks by installing a fresh `oneshot::Sender` in the shared slot;
//! the coordinator's [`Sender::try_offer`] takes whatever is parked there or
//! gives the value back. Nothing is ever buffered on behalf of a busy receiver.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

struct Slot<T> {
    parked: Option<oneshot::Sender<T>>,
    closed: bool,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
}

impl<T> Shared<T> {
    // The slot holds no invariants that a panicking holder could break halfway.
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Why an offer was refused. The value is handed back either way.
#[derive(Debug, PartialEq, Eq)]
pub enum TryOfferError<T> {
    /// The receiver exists but is not currently waiting.
    NotReady(T),
    /// The receiver was dropped or the handoff was closed.
    Closed(T),
}

impl<T> TryOfferError<T> {
    pub fn into_inner(self) -> T {
        match self {
            TryOfferError::NotReady(value) | TryOfferError::Closed(value) => value,
        }
    }
}

pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot {
            parked: None,
            closed: false,
        }),
    });

    (
        Sender {
            shared: shared.clone(),
        },
        Receiver {
            shared,
            pending: None,
        },
    )
}

/// Offering side, held by the coordinator's registry.
pub struct Sender<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Sender<T> {
    /// Hand `value` to the receiver if it is parked right now. Never blocks.
    pub fn try_offer(&self, value: T) -> Result<(), TryOfferError<T>> {
        let parked = {
            let mut slot = self.shared.lock();
            if slot.closed {
                return Err(TryOfferError::Closed(value));
            }
            slot.parked.take()
        };

        match parked {
            Some(waiter) => waiter.send(value).map_err(TryOfferError::Closed),
            None => Err(TryOfferError::NotReady(value)),
        }
    }

    /// True while the receiver is waiting for a value.
    pub fn is_parked(&self) -> bool {
        let slot = self.shared.lock();
        !slot.closed && slot.parked.is_some()
    }

    /// Release the handoff. A parked receiver wakes up with `None`, later
    /// offers are refused with [`TryOfferError::Closed`].
    pub fn close(&self) {
        let mut slot = self.shared.lock();
        slot.closed = true;
        slot.parked = None;
    }
}

/// Receiving side, owned by a single delivery loop.
pub struct Receiver<T> {
    shared: Arc<Shared<T>>,
    pending: Option<oneshot::Receiver<T>>,
}

impl<T> Receiver<T> {
    /// Park until the coordinator hands over a value. Returns `None` once the
    /// handoff is closed.
    ///
    /// Cancel safe: if the future is dropped the receiver stays parked, and a
    /// value taken by the coordinator in the meantime is returned by the next
    /// call. Call [`Receiver::unpark`] before doing other work so offers made
    /// while busy are dropped instead of held.
    pub async fn recv(&mut self) -> Option<T> {
        if self.pending.is_none() {
            let (waiter, pending) = oneshot::channel();
            {
                let mut slot = self.shared.lock();
                if slot.closed {
                    return None;
                }
                slot.parked = Some(waiter);
            }
            self.pending = Some(pending);
        }

        let pending = self.pending.as_mut()?;
        let received = pending.await;
        self.pending = None;
        received.ok()
    }

    /// Stop waiting. If the coordinator already took the parked waiter, the
    /// value it sent stays pending for the next [`Receiver::recv`].
    pub fn unpark(&mut self) {
        let reclaimed = self.shared.lock().parked.take().is_some();
        if reclaimed {
            self.pending = None;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        let mut slot = self.shared.lock();
        slot.closed = true;
        slot.parked = None;
    }
}
