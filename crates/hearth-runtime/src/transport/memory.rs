//! In-memory transport for tests
//!
//! Backed by plain queues behind a shared handle: the test pushes inbound
//! frame sets and inspects what the runtime sent, while the runtime owns the
//! [`MemoryTransport`] itself. Polling never blocks; readiness is just
//! "queue non-empty".

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hearth_core::{Result, TransportError};

use super::Transport;

#[derive(Debug, Default)]
struct Shared {
    inbound: VecDeque<Vec<Vec<u8>>>,
    replies: Vec<Vec<Vec<u8>>>,
    broadcasts: Vec<Vec<u8>>,
    closed: bool,
}

// ----------------------------------------------------------------------------
// Memory Transport
// ----------------------------------------------------------------------------

/// Queue-backed [`Transport`] implementation
#[derive(Debug)]
pub struct MemoryTransport {
    shared: Arc<Mutex<Shared>>,
}

/// Test-side handle onto a [`MemoryTransport`]'s queues
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryTransport {
    /// Create a transport plus the handle a test uses to drive it
    pub fn pair() -> (Self, MemoryHandle) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            MemoryHandle { shared },
        )
    }
}

impl MemoryHandle {
    /// Queue one inbound multipart message
    pub fn push_inbound(&self, frames: Vec<Vec<u8>>) {
        self.shared.lock().expect("transport poisoned").inbound.push_back(frames);
    }

    /// All frame sets sent on the reply endpoint so far
    pub fn replies(&self) -> Vec<Vec<Vec<u8>>> {
        self.shared.lock().expect("transport poisoned").replies.clone()
    }

    /// All payloads sent on the broadcast endpoint so far
    pub fn broadcasts(&self) -> Vec<Vec<u8>> {
        self.shared.lock().expect("transport poisoned").broadcasts.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().expect("transport poisoned").closed
    }
}

impl Transport for MemoryTransport {
    fn poll_inbound(&mut self, _timeout: Duration) -> Result<bool> {
        let shared = self.shared.lock().expect("transport poisoned");
        if shared.closed {
            return Err(TransportError::Closed.into());
        }
        Ok(!shared.inbound.is_empty())
    }

    fn recv_inbound(&mut self) -> Result<Vec<Vec<u8>>> {
        let mut shared = self.shared.lock().expect("transport poisoned");
        shared
            .inbound
            .pop_front()
            .ok_or_else(|| TransportError::Socket("no inbound message queued".to_string()).into())
    }

    fn send_reply(&mut self, frames: &[&[u8]]) -> Result<()> {
        let mut shared = self.shared.lock().expect("transport poisoned");
        if shared.closed {
            return Err(TransportError::Closed.into());
        }
        shared
            .replies
            .push(frames.iter().map(|f| f.to_vec()).collect());
        Ok(())
    }

    fn send_broadcast(&mut self, payload: &[u8]) -> Result<()> {
        let mut shared = self.shared.lock().expect("transport poisoned");
        if shared.closed {
            return Err(TransportError::Closed.into());
        }
        shared.broadcasts.push(payload.to_vec());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.shared.lock().expect("transport poisoned").closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_queue_drains_in_order() {
        let (mut transport, handle) = MemoryTransport::pair();
        handle.push_inbound(vec![b"a".to_vec()]);
        handle.push_inbound(vec![b"b".to_vec()]);

        assert!(transport.poll_inbound(Duration::ZERO).unwrap());
        assert_eq!(transport.recv_inbound().unwrap(), vec![b"a".to_vec()]);
        assert_eq!(transport.recv_inbound().unwrap(), vec![b"b".to_vec()]);
        assert!(!transport.poll_inbound(Duration::ZERO).unwrap());
    }

    #[test]
    fn sends_are_visible_through_the_handle() {
        let (mut transport, handle) = MemoryTransport::pair();
        transport.send_reply(&[b"fe1", b"payload"]).unwrap();
        transport.send_broadcast(b"everyone").unwrap();

        assert_eq!(handle.replies().len(), 1);
        assert_eq!(handle.replies()[0][0], b"fe1");
        assert_eq!(handle.broadcasts(), vec![b"everyone".to_vec()]);
    }

    #[test]
    fn closed_transport_rejects_traffic() {
        let (mut transport, handle) = MemoryTransport::pair();
        transport.close().unwrap();

        assert!(handle.is_closed());
        assert!(transport.send_broadcast(b"x").is_err());
        assert!(transport.poll_inbound(Duration::ZERO).is_err());
    }
}
