//! Connection contracts.
//!
//! A [`Conn`] starts closed, becomes open after a successful
//! [`Conn::open`] and closed again after [`Conn::close`]. While open, each
//! `send` is one write followed by one read; `read` and `write` give raw
//! stream access for callers doing their own framing. All I/O takes
//! `&mut self`, so a single connection can not be driven from two places
//! at once.

use std::sync::Mutex;
use std::time::Duration;

use log::debug;

use super::config::TransportOptions;
use super::error::Result;

/// A request/response connection to a device or service.
pub trait Conn: Send {
    /// Establishes the connection.
    fn open(&mut self) -> Result<()>;

    /// Terminates the connection. Closing a closed connection succeeds.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Sends `data` and returns the response, using the default timeout.
    fn send(&mut self, data: &[u8]) -> Result<Vec<u8>>;

    /// Sends `data` and returns the response. Each I/O step must finish
    /// within `timeout`.
    fn send_with_timeout(&mut self, data: &[u8], timeout: Duration) -> Result<Vec<u8>>;

    /// Reads whatever is available into `buf`, waiting at most the
    /// default timeout. Returns the number of bytes read; 0 means the peer
    /// closed the stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Writes some prefix of `data` and returns its length.
    fn write(&mut self, data: &[u8]) -> Result<usize>;
}

impl<C: Conn + ?Sized> Conn for Box<C> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn send(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).send(data)
    }

    fn send_with_timeout(&mut self, data: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        (**self).send_with_timeout(data, timeout)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }
}

/// Callback receiving data pushed by the remote side.
pub type Handler = Box<dyn FnMut(&[u8]) -> Result<()> + Send>;

/// A connection that can also deliver unsolicited inbound data.
pub trait StreamConn: Conn {
    /// Registers `handler`, replacing any previous one.
    fn subscribe(&mut self, handler: Handler);

    /// Removes the handler. Succeeds when none is registered.
    fn unsubscribe(&mut self) -> Result<()>;
}

/// Higher level lifecycle for protocol-aware clients built on a [`Conn`].
pub trait Client {
    fn connect(&mut self) -> Result<()>;

    fn disconnect(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;
}

/// Creates transport-specific connections from configuration.
pub trait TransportProvider {
    /// Builds a connection that is not opened yet.
    fn create_conn(&self, options: TransportOptions) -> Result<Box<dyn Conn>>;
}

/// Single handler slot for [`StreamConn`] implementations.
///
/// Holds at most one handler. It may be shared with a reader thread,
/// which calls [`Subscription::dispatch`] for every inbound chunk. The
/// handler runs without the slot locked, so it may itself call `set` or
/// `clear`.
#[derive(Default)]
pub struct Subscription {
    slot: Mutex<Slot>,
}

#[derive(Default)]
struct Slot {
    handler: Option<Handler>,
    // bumped by every set/clear; a dispatch only puts its handler back if
    // nothing changed while it ran
    generation: u64,
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, handler: Handler) {
        let mut slot = self.lock();
        if slot.handler.is_some() {
            debug!("replacing subscription handler");
        }
        slot.handler = Some(handler);
        slot.generation = slot.generation.wrapping_add(1);
    }

    pub fn clear(&self) {
        let mut slot = self.lock();
        slot.handler = None;
        slot.generation = slot.generation.wrapping_add(1);
    }

    pub fn is_active(&self) -> bool {
        self.lock().handler.is_some()
    }

    /// Hands `data` to the current handler. Returns `Ok(false)` when no
    /// handler is registered, or when another dispatch is running it.
    pub fn dispatch(&self, data: &[u8]) -> Result<bool> {
        let (mut handler, generation) = {
            let mut slot = self.lock();
            match slot.handler.take() {
                Some(handler) => (handler, slot.generation),
                None => return Ok(false),
            }
        };
        let result = handler(data);
        let mut slot = self.lock();
        if slot.generation == generation && slot.handler.is_none() {
            slot.handler = Some(handler);
        }
        result.map(|()| true)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        // a handler that panicked leaves the slot itself consistent
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Sentinel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(counter: &Arc<AtomicUsize>) -> Handler {
        let counter = Arc::clone(counter);
        Box::new(move |data| {
            counter.fetch_add(data.len(), Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn dispatch_without_handler() {
        let subscription = Subscription::new();
        assert!(!subscription.is_active());
        assert!(!subscription.dispatch(&[1, 2]).unwrap());
    }

    #[test]
    fn set_replaces_previous_handler() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let subscription = Subscription::new();

        subscription.set(counting(&first));
        assert!(subscription.dispatch(&[1]).unwrap());
        subscription.set(counting(&second));
        assert!(subscription.dispatch(&[1, 2, 3]).unwrap());

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn clear_is_idempotent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let subscription = Subscription::new();
        subscription.set(counting(&counter));
        subscription.clear();
        subscription.clear();
        assert!(!subscription.is_active());
        assert!(!subscription.dispatch(&[1]).unwrap());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handler_may_clear_its_own_slot() {
        let subscription = Arc::new(Subscription::new());
        let slot = Arc::clone(&subscription);
        subscription.set(Box::new(move |_| {
            slot.clear();
            Ok(())
        }));

        let worker = Arc::clone(&subscription);
        let (done, finished) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _ = done.send(worker.dispatch(&[1]).map_err(|err| err.to_string()));
        });
        let delivered = finished
            .recv_timeout(std::time::Duration::from_secs(3))
            .expect("dispatch did not return");
        assert_eq!(delivered, Ok(true));
        assert!(!subscription.is_active());
        assert!(!subscription.dispatch(&[2]).unwrap());
    }

    #[test]
    fn handler_may_replace_itself() {
        let counter = Arc::new(AtomicUsize::new(0));
        let subscription = Arc::new(Subscription::new());
        let slot = Arc::clone(&subscription);
        let mut next = Some(counting(&counter));
        subscription.set(Box::new(move |_| {
            if let Some(handler) = next.take() {
                slot.set(handler);
            }
            Ok(())
        }));

        assert!(subscription.dispatch(&[1]).unwrap());
        assert!(subscription.dispatch(&[1, 2]).unwrap());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn handler_survives_dispatch() {
        let counter = Arc::new(AtomicUsize::new(0));
        let subscription = Subscription::new();
        subscription.set(counting(&counter));
        for _ in 0..3 {
            assert!(subscription.dispatch(&[0]).unwrap());
        }
        assert!(subscription.is_active());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn handler_errors_propagate() {
        let subscription = Subscription::new();
        subscription.set(Box::new(|_| Err(Sentinel::InvalidMessage.into())));
        assert!(subscription
            .dispatch(&[0])
            .unwrap_err()
            .is(Sentinel::InvalidMessage));
    }
}
