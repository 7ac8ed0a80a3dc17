#![forbid(unsafe_code)]

//! Slide-out menu overlay state.
//!
//! `Closed -> Open -> Closed`. While open, the overlay holds the host's
//! background-scroll lock; every way out of `Open` drops it, including the
//! overlay itself being dropped.

use crate::host::PageHost;
use crate::lifecycle::Registration;

/// Overlay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

/// Why the overlay closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Click on the dimmed backdrop.
    Backdrop,
    /// Explicit close button.
    CloseButton,
    /// A navigation selection made inside the overlay.
    Navigation,
    /// The page itself is being torn down.
    Teardown,
}

/// Overlay state plus the scroll lock it holds while open.
#[derive(Debug, Default)]
pub struct MenuOverlay {
    lock: Option<Registration>,
}

impl MenuOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> MenuState {
        if self.lock.is_some() {
            MenuState::Open
        } else {
            MenuState::Closed
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock.is_some()
    }

    /// Open the overlay and suppress background scroll.
    ///
    /// Returns `false` if it was already open.
    pub fn open<H: PageHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.lock.is_some() {
            return false;
        }
        self.lock = Some(host.lock_background_scroll());
        tracing::debug!("menu opened");
        true
    }

    /// Close the overlay and restore background scroll.
    ///
    /// Returns `false` if it was already closed.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        match self.lock.take() {
            Some(lock) => {
                lock.release();
                tracing::debug!(?reason, "menu closed");
                true
            }
            None => false,
        }
    }
}
