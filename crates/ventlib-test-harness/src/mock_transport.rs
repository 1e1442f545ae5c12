//! Scripted mock transport for deterministic driver tests.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/reply pairs. Each exchange must send exactly the next expected
//! request; the scripted outcome (reply bytes, timeout, or socket fault) is
//! then returned.
//!
//! Clones share the same script and sent log, so a test can hand one clone
//! to the driver and keep another to inspect afterwards.
//!
//! # Example
//!
//! ```
//! use ventlib_test_harness::MockTransport;
//!
//! let mock = MockTransport::new();
//! mock.expect(b"mobile\x01\x0d", &[0u8; 36]);
//! mock.expect_timeout(b"mobile\x03\x0d");
//! assert_eq!(mock.remaining_expectations(), 2);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use ventlib_core::error::{Error, Result};
use ventlib_core::transport::Transport;

#[derive(Debug, Clone)]
enum Outcome {
    Reply(Vec<u8>),
    Timeout,
    Fault(String),
}

#[derive(Debug, Clone)]
struct Expectation {
    request: Vec<u8>,
    outcome: Outcome,
}

#[derive(Debug, Default)]
struct Inner {
    expectations: VecDeque<Expectation>,
    sent_log: Vec<Vec<u8>>,
}

/// A scripted [`Transport`] for testing without a unit on the network.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking test thread poisons the lock; the script is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, request: &[u8], outcome: Outcome) {
        self.lock().expectations.push_back(Expectation {
            request: request.to_vec(),
            outcome,
        });
    }

    /// Reply with `reply` when `request` is sent.
    pub fn expect(&self, request: &[u8], reply: &[u8]) {
        self.push(request, Outcome::Reply(reply.to_vec()));
    }

    /// Report [`Error::Timeout`] when `request` is sent.
    pub fn expect_timeout(&self, request: &[u8]) {
        self.push(request, Outcome::Timeout);
    }

    /// Report [`Error::Transport`] with `message` when `request` is sent.
    pub fn expect_fault(&self, request: &[u8], message: &str) {
        self.push(request, Outcome::Fault(message.to_string()));
    }

    /// Every request sent so far, one element per exchange.
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        self.lock().sent_log.clone()
    }

    pub fn remaining_expectations(&self) -> usize {
        self.lock().expectations.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn exchange(&mut self, request: &[u8], _timeout: Duration) -> Result<Vec<u8>> {
        let mut inner = self.lock();
        inner.sent_log.push(request.to_vec());

        let expectation = inner.expectations.pop_front().ok_or_else(|| {
            Error::Transport(format!(
                "no more expectations in mock transport (sent {request:02X?})"
            ))
        })?;

        if request != expectation.request.as_slice() {
            return Err(Error::Transport(format!(
                "unexpected request: expected {:02X?}, got {:02X?}",
                expectation.request, request
            )));
        }

        match expectation.outcome {
            Outcome::Reply(bytes) => Ok(bytes),
            Outcome::Timeout => Err(Error::Timeout),
            Outcome::Fault(message) => Err(Error::Transport(message)),
        }
    }

    fn peer(&self) -> String {
        "mock".to_string()
    }
}
