//! Toast notifications.
//!
//! The engine hands toasts to a [`Notifier`] and never waits on it. The
//! bundled [`ToastCenter`] keeps toasts in memory; delay and expiry are
//! evaluated when the UI asks for [`ToastCenter::visible`], not by timers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use detective_types::ContactId;

use crate::clock::Clock;

/// A request to show some text, optionally tied to a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastRequest {
    pub text: String,
    pub contact_id: Option<ContactId>,
    /// Hold the toast back for this long before it appears.
    pub delay_ms: u64,
    /// Lifetime once visible; `None` uses the notifier's default.
    pub ttl_ms: Option<u64>,
}

impl ToastRequest {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            contact_id: None,
            delay_ms: 0,
            ttl_ms: None,
        }
    }

    #[must_use]
    pub fn for_contact(mut self, contact: ContactId) -> Self {
        self.contact_id = Some(contact);
        self
    }

    #[must_use]
    pub fn after(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }
}

/// Fire-and-forget sink for toasts.
pub trait Notifier: Send + Sync {
    fn notify(&self, request: ToastRequest);
}

/// Drops every toast.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, request: ToastRequest) {
        tracing::trace!(text = %request.text, "Dropping toast");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub text: String,
    pub contact_id: Option<ContactId>,
    pub created_at: i64,
    pub delay_ms: u64,
    pub ttl_ms: u64,
}

impl Toast {
    fn shows_at(&self) -> i64 {
        self.created_at.saturating_add(self.delay_ms as i64)
    }

    fn expires_at(&self) -> i64 {
        self.shows_at().saturating_add(self.ttl_ms as i64)
    }
}

pub struct ToastCenter {
    clock: Arc<dyn Clock>,
    default_ttl_ms: u64,
    next_id: AtomicU64,
    toasts: Mutex<Vec<Toast>>,
}

impl std::fmt::Debug for ToastCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastCenter")
            .field("default_ttl_ms", &self.default_ttl_ms)
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl ToastCenter {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, default_ttl_ms: u64) -> Self {
        Self {
            clock,
            default_ttl_ms,
            next_id: AtomicU64::new(1),
            toasts: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Toasts currently on screen. Expired toasts are dropped as a side effect.
    pub fn visible(&self) -> Vec<Toast> {
        let now = self.clock.now_ms();
        let mut toasts = self.lock();
        toasts.retain(|toast| now < toast.expires_at());
        toasts
            .iter()
            .filter(|toast| now >= toast.shows_at())
            .cloned()
            .collect()
    }

    /// Toasts queued or showing, including ones still waiting on their delay.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Remove a toast early (e.g. the player tapped it).
    pub fn dismiss(&self, id: u64) -> bool {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        toasts.len() != before
    }
}

impl Notifier for ToastCenter {
    fn notify(&self, request: ToastRequest) {
        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            text: request.text,
            contact_id: request.contact_id,
            created_at: self.clock.now_ms(),
            delay_ms: request.delay_ms,
            ttl_ms: request.ttl_ms.unwrap_or(self.default_ttl_ms),
        };
        tracing::debug!(id = toast.id, delay_ms = toast.delay_ms, "Toast queued");
        self.lock().push(toast);
    }
}
