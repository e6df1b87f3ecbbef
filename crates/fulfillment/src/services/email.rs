//! Email sender trait and in-memory implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FulfillmentError;

/// An outbound HTML email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Trait for sending transactional email.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), FulfillmentError>;
}

#[derive(Debug, Default)]
struct InMemoryEmailState {
    outbox: Vec<Email>,
    fail_on_send: bool,
}

/// In-memory email sender for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmailSender {
    state: Arc<Mutex<InMemoryEmailState>>,
}

impl InMemoryEmailSender {
    /// Creates a new in-memory email sender.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryEmailState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configures the sender to fail every send call.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.lock().fail_on_send = fail;
    }

    /// Returns the number of emails sent.
    pub fn sent_count(&self) -> usize {
        self.lock().outbox.len()
    }

    /// Returns a copy of the outbox.
    pub fn outbox(&self) -> Vec<Email> {
        self.lock().outbox.clone()
    }
}

#[async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send(&self, email: Email) -> Result<(), FulfillmentError> {
        let mut state = self.lock();

        if state.fail_on_send {
            return Err(FulfillmentError::Email(format!(
                "could not deliver to {}",
                email.to
            )));
        }

        state.outbox.push(email);
        Ok(())
    }
}
