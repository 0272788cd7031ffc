//! In-memory transport for unit tests.

use std::{
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{ConnectionId, Transport, TransportError, TransportKind};

/// Records every delivered message; can be told to fail or to stall.
pub struct FakeTransport {
    id: ConnectionId,
    kind: TransportKind,
    remote_address: String,
    sent: Mutex<Vec<String>>,
    send_attempts: AtomicUsize,
    close_calls: AtomicUsize,
    fail_sends: AtomicBool,
    closed: watch::Sender<bool>,
    delay: Option<Duration>,
}

impl FakeTransport {
    pub fn new(kind: TransportKind) -> Self {
        let id = ConnectionId::generate();
        Self {
            id,
            kind,
            remote_address: format!("fake/{}", id),
            sent: Mutex::new(Vec::new()),
            send_attempts: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            fail_sends: AtomicBool::new(false),
            closed: watch::Sender::new(false),
            delay: None,
        }
    }

    /// A transport whose every send fails, as if the peer vanished
    pub fn failing(kind: TransportKind) -> Self {
        let transport = Self::new(kind);
        transport.fail_sends.store(true, Ordering::SeqCst);
        transport
    }

    /// A transport whose sends take `delay` before completing
    pub fn slow(kind: TransportKind, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(kind)
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_sends.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn kind(&self) -> TransportKind {
        self.kind
    }

    fn remote_address(&self) -> &str {
        &self.remote_address
    }

    async fn send(&self, message: &str) -> Result<(), TransportError> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Io(std::io::Error::from(
                std::io::ErrorKind::BrokenPipe,
            )));
        }
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.send_replace(true);
    }

    async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}
