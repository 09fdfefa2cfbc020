//! Contact collection
//!
//! The physics step reports every newly started touch through
//! [`ContactListener`]. Nothing may be mutated from inside the step, so the
//! collector only buffers the fixture pair; the resolution pass drains the
//! buffer after the step returns.

use std::sync::{Mutex, PoisonError};

use rapier2d::prelude::ColliderHandle;

/// Two fixtures that began touching during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub fixture_a: ColliderHandle,
    pub fixture_b: ColliderHandle,
}

impl Contact {
    pub fn new(fixture_a: ColliderHandle, fixture_b: ColliderHandle) -> Self {
        Self {
            fixture_a,
            fixture_b,
        }
    }
}

/// Receives contact-begin notifications from the physics step
pub trait ContactListener: Send + Sync {
    fn begin_contact(&self, contact: Contact);
}

/// Buffers contacts in arrival order until drained
#[derive(Debug, Default)]
pub struct ContactCollector {
    contacts: Mutex<Vec<Contact>>,
}

impl ContactCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything collected so far, leaving the buffer empty
    pub fn drain(&self) -> Vec<Contact> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Contact>> {
        // A panic mid-push cannot leave the Vec half-written
        self.contacts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ContactListener for ContactCollector {
    fn begin_contact(&self, contact: Contact) {
        self.lock().push(contact);
    }
}
