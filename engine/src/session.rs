//! One player's chat session.
//!
//! [`Session`] is what a chat screen talks to: it records the player's
//! message, resolves it, records the contact's reply, and forwards solve
//! notifications to the [`Notifier`] without waiting on it.

use std::sync::Arc;

use uuid::Uuid;

use detective_types::{Contact, ContactId, Message, Outcome, Sender};

use crate::notifications::{Notifier, ToastRequest};
use crate::resolver::Resolver;
use crate::store::PuzzleStore;

pub const DEFAULT_NOTIFICATION_DELAY_MS: u64 = 1_500;
pub const DEFAULT_TOAST_TTL_MS: u64 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Delay before a solve notification appears.
    pub notification_delay_ms: u64,
    pub toast_ttl_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            notification_delay_ms: DEFAULT_NOTIFICATION_DELAY_MS,
            toast_ttl_ms: DEFAULT_TOAST_TTL_MS,
        }
    }
}

pub struct Session {
    resolver: Resolver,
    store: PuzzleStore,
    notifier: Arc<dyn Notifier>,
    settings: SessionSettings,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

impl Session {
    #[must_use]
    pub fn new(resolver: Resolver, store: PuzzleStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            resolver,
            store,
            notifier,
            settings: SessionSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn store(&self) -> &PuzzleStore {
        &self.store
    }

    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Contacts unlocked at the current global turn.
    #[must_use]
    pub fn visible_contacts(&self) -> Vec<&Contact> {
        self.resolver
            .content()
            .visible_contacts(self.store.current_turn())
            .collect()
    }

    /// Handle one line the player sent to `contact`.
    ///
    /// Transcripts are only kept for contacts that exist in the content.
    pub fn submit(&mut self, contact: &ContactId, input: &str) -> Outcome {
        let known = self.resolver.content().has_contact(contact);
        if known {
            let now = self.store.now_ms();
            self.store.add_message(
                contact,
                Message::new(new_message_id(), input, Sender::User, now),
            );
        }

        let outcome = self.resolver.resolve(&mut self.store, contact, input);

        if known {
            let now = self.store.now_ms();
            self.store.add_message(
                contact,
                Message::new(new_message_id(), outcome.text(), Sender::Contact, now),
            );
        }

        if let Outcome::Success(solved) = &outcome
            && let Some(payload) = &solved.notification
        {
            self.deliver_notification(&payload.contact, &payload.message);
        }
        outcome
    }

    fn deliver_notification(&mut self, contact: &ContactId, text: &str) {
        if self.resolver.content().has_contact(contact) {
            let now = self.store.now_ms();
            self.store.add_message(
                contact,
                Message::new(new_message_id(), text, Sender::Contact, now).unread(),
            );
        } else {
            tracing::warn!(contact = %contact, "Notification for unknown contact; toast only");
        }
        tracing::info!(contact = %contact, "Queued solve notification");
        self.notifier.notify(
            ToastRequest::new(text)
                .for_contact(contact.clone())
                .after(self.settings.notification_delay_ms)
                .ttl(self.settings.toast_ttl_ms),
        );
    }

    /// Open a chat screen: everything from `contact` becomes read.
    pub fn open_chat(&mut self, contact: &ContactId) -> &[Message] {
        self.store.mark_messages_read(contact);
        self.store.messages(contact)
    }

    /// Unread messages per visible contact, for a chat list.
    #[must_use]
    pub fn unread_counts(&self) -> Vec<(ContactId, usize)> {
        self.visible_contacts()
            .into_iter()
            .map(|c| (c.id.clone(), self.store.unread_count(&c.id)))
            .collect()
    }

    /// Start the game over.
    pub fn reset(&mut self) {
        self.store.reset_all();
    }
}
