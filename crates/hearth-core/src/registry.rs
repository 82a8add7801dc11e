//! Event registry for frontend and timer handlers
//!
//! The registry is a table of registrations keyed by a monotonically
//! increasing handle id. Exactly one frontend registration may exist and it
//! can never be cleared; timers carry independent enable state and are swept
//! out by the dispatch loop once inactive.
//!
//! Times are durations on the runtime's monotonic scale (elapsed since
//! runtime start). A fresh timer has `last_fired` of zero, so a timer
//! registered late in the process lifetime may fire on its first scan.

use std::time::Duration;

use tracing::debug;

use crate::errors::RegistryError;
use crate::types::HandleId;

// ----------------------------------------------------------------------------
// Registrations and Entries
// ----------------------------------------------------------------------------

/// A validated registration request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Handler for inbound frontend traffic; at most one may exist
    Frontend,
    /// Periodic timer firing every `interval`
    Timer { interval: Duration },
}

/// What an entry routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Frontend,
    Timer,
}

/// Enable state of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Active,
    Inactive,
}

/// One row of the registry table.
///
/// Owned exclusively by the registry; handlers never hold a reference to
/// their own entry.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    handle: HandleId,
    status: EntryStatus,
    kind: EntryKind,
}

#[derive(Debug, Clone)]
enum EntryKind {
    Frontend,
    Timer {
        interval: Duration,
        last_fired: Duration,
    },
}

impl RegistryEntry {
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn kind(&self) -> EventKind {
        match self.kind {
            EntryKind::Frontend => EventKind::Frontend,
            EntryKind::Timer { .. } => EventKind::Timer,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        match self.kind {
            EntryKind::Frontend => None,
            EntryKind::Timer { interval, .. } => Some(interval),
        }
    }
}

// ----------------------------------------------------------------------------
// Event Registry
// ----------------------------------------------------------------------------

/// Table of registered handlers, iterated in registration order
#[derive(Debug, Default)]
pub struct EventRegistry {
    entries: Vec<RegistryEntry>,
    next_handle: u64,
    frontend: Option<HandleId>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, returning a fresh process-unique handle.
    ///
    /// A second frontend registration is rejected; a timer interval of zero
    /// is rejected.
    pub fn register(&mut self, registration: Registration) -> Result<HandleId, RegistryError> {
        let kind = match registration {
            Registration::Frontend => {
                if self.frontend.is_some() {
                    return Err(RegistryError::DuplicateFrontend);
                }
                EntryKind::Frontend
            }
            Registration::Timer { interval } => {
                if interval.is_zero() {
                    return Err(RegistryError::InvalidInterval);
                }
                EntryKind::Timer {
                    interval,
                    last_fired: Duration::ZERO,
                }
            }
        };

        let handle = HandleId::new(self.next_handle);
        self.next_handle += 1;

        if matches!(kind, EntryKind::Frontend) {
            self.frontend = Some(handle);
        }

        debug!(handle = handle.value(), ?registration, "registered event");
        self.entries.push(RegistryEntry {
            handle,
            status: EntryStatus::Active,
            kind,
        });
        Ok(handle)
    }

    /// Deactivate a timer.
    ///
    /// Idempotent for timers; the frontend entry can never be cleared and an
    /// unknown handle is an error.
    pub fn clear(&mut self, handle: HandleId) -> Result<(), RegistryError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.handle == handle)
            .ok_or(RegistryError::UnknownTimer(handle))?;

        match entry.kind {
            EntryKind::Frontend => Err(RegistryError::CannotClearFrontend),
            EntryKind::Timer { .. } => {
                entry.status = EntryStatus::Inactive;
                debug!(handle = handle.value(), "cleared timer");
                Ok(())
            }
        }
    }

    /// Authoritative post-setup check: exactly one frontend handler must
    /// exist once the tenant's setup routine has returned.
    pub fn validate_after_init(&self) -> Result<(), RegistryError> {
        let count = self
            .entries
            .iter()
            .filter(|e| matches!(e.kind, EntryKind::Frontend))
            .count();
        match count {
            0 => Err(RegistryError::MissingFrontend),
            1 => Ok(()),
            _ => Err(RegistryError::DuplicateFrontend),
        }
    }

    /// Handle of the sole frontend entry, if registered
    pub fn frontend_handle(&self) -> Option<HandleId> {
        self.frontend
    }

    /// Handles of active timers whose interval has elapsed, in registration
    /// order
    pub fn due_timers(&self, now: Duration) -> Vec<HandleId> {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Active)
            .filter_map(|e| match e.kind {
                EntryKind::Timer {
                    interval,
                    last_fired,
                } if now.saturating_sub(last_fired) >= interval => Some(e.handle),
                _ => None,
            })
            .collect()
    }

    /// Record that a timer fired at `now`
    pub fn touch(&mut self, handle: HandleId, now: Duration) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.handle == handle) {
            if let EntryKind::Timer {
                ref mut last_fired, ..
            } = entry.kind
            {
                *last_fired = now;
            }
        }
    }

    pub fn is_active(&self, handle: HandleId) -> bool {
        self.entries
            .iter()
            .any(|e| e.handle == handle && e.status == EntryStatus::Active)
    }

    /// Remove all inactive entries (post-tick cleanup pass)
    pub fn sweep_inactive(&mut self) {
        self.entries.retain(|e| e.status == EntryStatus::Active);
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn handles_increase_monotonically() {
        let mut registry = EventRegistry::new();
        let a = registry.register(Registration::Timer { interval: secs(1) }).unwrap();
        let b = registry.register(Registration::Frontend).unwrap();
        let c = registry.register(Registration::Timer { interval: secs(2) }).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn second_frontend_registration_is_rejected() {
        let mut registry = EventRegistry::new();
        registry.register(Registration::Frontend).unwrap();
        let err = registry.register(Registration::Frontend).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateFrontend));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut registry = EventRegistry::new();
        let err = registry
            .register(Registration::Timer {
                interval: Duration::ZERO,
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidInterval));
    }

    #[test]
    fn validation_requires_exactly_one_frontend() {
        let mut registry = EventRegistry::new();
        assert!(matches!(
            registry.validate_after_init(),
            Err(RegistryError::MissingFrontend)
        ));

        registry.register(Registration::Frontend).unwrap();
        assert!(registry.validate_after_init().is_ok());
    }

    #[test]
    fn clearing_the_frontend_always_fails() {
        let mut registry = EventRegistry::new();
        let fe = registry.register(Registration::Frontend).unwrap();
        let err = registry.clear(fe).unwrap_err();
        assert!(matches!(err, RegistryError::CannotClearFrontend));
        assert!(registry.is_active(fe));
    }

    #[test]
    fn clearing_an_unknown_handle_fails() {
        let mut registry = EventRegistry::new();
        let err = registry.clear(HandleId::new(42)).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownTimer(h) if h == HandleId::new(42)));
    }

    #[test]
    fn clearing_a_timer_is_idempotent() {
        let mut registry = EventRegistry::new();
        let timer = registry
            .register(Registration::Timer { interval: secs(1) })
            .unwrap();
        registry.clear(timer).unwrap();
        registry.clear(timer).unwrap();
        assert!(!registry.is_active(timer));
    }

    #[test]
    fn due_timers_respect_interval_and_order() {
        let mut registry = EventRegistry::new();
        let fast = registry
            .register(Registration::Timer { interval: secs(1) })
            .unwrap();
        let slow = registry
            .register(Registration::Timer { interval: secs(5) })
            .unwrap();

        assert!(registry.due_timers(Duration::ZERO).is_empty());
        assert_eq!(registry.due_timers(secs(1)), vec![fast]);
        assert_eq!(registry.due_timers(secs(5)), vec![fast, slow]);

        registry.touch(fast, secs(5));
        assert_eq!(registry.due_timers(secs(5)), vec![slow]);
        assert_eq!(registry.due_timers(secs(6)), vec![fast, slow]);
    }

    #[test]
    fn cleared_timers_are_not_due_and_get_swept() {
        let mut registry = EventRegistry::new();
        registry.register(Registration::Frontend).unwrap();
        let timer = registry
            .register(Registration::Timer { interval: secs(1) })
            .unwrap();

        registry.clear(timer).unwrap();
        assert!(registry.due_timers(secs(10)).is_empty());

        registry.sweep_inactive();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].kind(), EventKind::Frontend);
    }
}
