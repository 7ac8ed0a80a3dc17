#![forbid(unsafe_code)]

//! The host capability seam.
//!
//! Everything environment-specific (where regions are, how scrolling is
//! animated, where the theme attribute lives) sits behind [`PageHost`]. The
//! core never reaches into a host beyond these calls, which keeps the
//! controller testable with a deterministic host.

use std::fmt;

use crate::geometry::{Span, Viewport};
use crate::lifecycle::Registration;
use crate::section::SectionId;
use crate::theme::Theme;

/// Host-side failures. None of them are fatal to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host cannot report region visibility.
    ObservationUnavailable,
    /// The host cannot report scroll offsets.
    ListenerUnavailable,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObservationUnavailable => write!(f, "visibility observation unavailable"),
            Self::ListenerUnavailable => write!(f, "scroll listener unavailable"),
        }
    }
}

impl std::error::Error for HostError {}

/// Capabilities the core needs from its environment.
pub trait PageHost {
    /// Current extent of the rendered region for `id`, if it is rendered.
    fn region(&self, id: SectionId) -> Option<Span>;

    /// Current viewport.
    fn viewport(&self) -> Viewport;

    /// Request a smooth scroll so the viewport top lands on `top`.
    ///
    /// Fire-and-forget: a second request re-targets the animation.
    fn scroll_to(&mut self, top: u32);

    /// Apply the theme as the root presentation attribute, before the next
    /// paint.
    fn set_root_theme(&mut self, theme: Theme);

    /// Start observing visibility of `targets`, in that order.
    ///
    /// # Errors
    ///
    /// [`HostError::ObservationUnavailable`] when the host cannot observe.
    fn observe_visibility(&mut self, targets: &[SectionId]) -> Result<Registration, HostError>;

    /// Start listening to raw scroll offsets.
    ///
    /// # Errors
    ///
    /// [`HostError::ListenerUnavailable`] when the host cannot report them.
    fn listen_scroll(&mut self) -> Result<Registration, HostError>;

    /// Suppress background page scrolling until the guard is dropped.
    fn lock_background_scroll(&mut self) -> Registration;
}
