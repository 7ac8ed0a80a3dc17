#![forbid(unsafe_code)]

//! Scoped registrations with the host.
//!
//! Observers, listeners and the background-scroll lock are all acquired from
//! the host and must be released on every exit path. Each acquisition yields
//! a [`Registration`] guard (kept by the core) and a [`RegistrationHandle`]
//! (kept by the host). Both share one liveness flag: dropping the guard
//! clears it, and hosts skip or prune handles whose flag is clear.
//!
//! # Invariants
//!
//! 1. A guard is live from creation until it is dropped or released.
//! 2. Release is idempotent and happens at most once per guard.
//! 3. Hosts never deliver events through a dead handle.

use std::cell::Cell;
use std::rc::Rc;

/// What a registration stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
    /// Visibility observer over the registry's regions.
    VisibilityObserver,
    /// Raw scroll-offset listener.
    ScrollListener,
    /// Background scroll suppressed while the menu overlay is open.
    ScrollLock,
}

/// Core-side guard. Dropping it releases the registration.
#[derive(Debug)]
#[must_use = "dropping a registration releases it immediately"]
pub struct Registration {
    kind: RegistrationKind,
    live: Rc<Cell<bool>>,
}

/// Host-side view of a registration.
#[derive(Debug, Clone)]
pub struct RegistrationHandle {
    kind: RegistrationKind,
    live: Rc<Cell<bool>>,
}

impl Registration {
    /// Create a live guard and the matching host handle.
    pub fn new(kind: RegistrationKind) -> (Self, RegistrationHandle) {
        let live = Rc::new(Cell::new(true));
        tracing::debug!(?kind, "registration acquired");
        (
            Self {
                kind,
                live: Rc::clone(&live),
            },
            RegistrationHandle { kind, live },
        )
    }

    #[must_use]
    pub fn kind(&self) -> RegistrationKind {
        self.kind
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    /// Release explicitly. Equivalent to dropping the guard.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.live.replace(false) {
            tracing::debug!(kind = ?self.kind, "registration released");
        }
    }
}

impl RegistrationHandle {
    #[must_use]
    pub fn kind(&self) -> RegistrationKind {
        self.kind
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_clears_the_shared_flag() {
        let (guard, handle) = Registration::new(RegistrationKind::ScrollListener);
        assert!(guard.is_live());
        assert!(handle.is_live());
        drop(guard);
        assert!(!handle.is_live());
    }

    #[test]
    fn release_is_equivalent_to_drop() {
        let (guard, handle) = Registration::new(RegistrationKind::ScrollLock);
        guard.release();
        assert!(!handle.is_live());
        assert_eq!(handle.kind(), RegistrationKind::ScrollLock);
    }

    #[test]
    fn guard_is_released_when_unwinding() {
        let (guard, handle) = Registration::new(RegistrationKind::VisibilityObserver);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _held = guard;
            panic!("teardown on an error path");
        }));
        assert!(result.is_err());
        assert!(!handle.is_live());
    }
}
