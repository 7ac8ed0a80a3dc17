#![forbid(unsafe_code)]

//! `folio-host` provides a host-driven, deterministic page backend for Folio.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedder pushes inputs and layout changes.
//! - **Deterministic time**: the embedder advances a monotonic clock explicitly.
//! - **No blocking / no threads**: usable from `wasm32-unknown-unknown` as well
//!   as from the terminal frontend.
//!
//! [`Document`] simulates the rendered page (regions stacked vertically, a
//! viewport, root attributes, the background-scroll lock) and implements
//! [`PageHost`]. [`step::StepPage`] drives a controller over it.

pub mod scroll;
pub mod step;

use core::time::Duration;
use std::collections::BTreeMap;

use folio_core::geometry::intersection_ratio;
use folio_core::lifecycle::{Registration, RegistrationHandle, RegistrationKind};
use folio_core::tracker::VisibilitySample;
use folio_core::{HostError, Msg, PageHost, SectionId, SectionRegistry, Span, Theme, Viewport};

pub use scroll::{DEFAULT_SCROLL_DURATION, ScrollAnimator, ScrollTick};
pub use step::{HostInput, StepPage, StepResult};

/// Root attribute holding the theme.
pub const THEME_ATTR: &str = "theme";

/// Document consistency error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A registered section has no rendered region.
    MissingRegion(SectionId),
    /// A section was rendered more than once.
    DuplicateRegion(SectionId),
    /// A region is rendered for a section the registry does not name.
    UnregisteredRegion(SectionId),
}

impl core::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingRegion(id) => write!(f, "section {id} has no rendered region"),
            Self::DuplicateRegion(id) => write!(f, "section {id} is rendered more than once"),
            Self::UnregisteredRegion(id) => write!(f, "region {id} is not in the registry"),
        }
    }
}

impl std::error::Error for DocumentError {}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time. Time never runs backwards.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }
}

/// What the host environment can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Region visibility observation.
    pub visibility: bool,
    /// Raw scroll-offset events.
    pub scroll_events: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            visibility: true,
            scroll_events: true,
        }
    }
}

impl HostCapabilities {
    /// Everything except visibility observation.
    #[must_use]
    pub fn without_visibility() -> Self {
        Self {
            visibility: false,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
struct Observer {
    handle: RegistrationHandle,
    targets: Vec<SectionId>,
}

/// Simulated rendered page.
#[derive(Debug)]
pub struct Document {
    regions: Vec<(SectionId, Span)>,
    viewport: Viewport,
    attrs: BTreeMap<String, String>,
    capabilities: HostCapabilities,
    animator: ScrollAnimator,
    now: Duration,
    scroll_requests: u32,
    observers: Vec<Observer>,
    listeners: Vec<RegistrationHandle>,
    locks: Vec<RegistrationHandle>,
}

impl Document {
    /// An empty document with a viewport of the given height.
    #[must_use]
    pub fn new(viewport_height: u32) -> Self {
        Self {
            regions: Vec::new(),
            viewport: Viewport::new(0, viewport_height),
            attrs: BTreeMap::new(),
            capabilities: HostCapabilities::default(),
            animator: ScrollAnimator::default(),
            now: Duration::ZERO,
            scroll_requests: 0,
            observers: Vec::new(),
            listeners: Vec::new(),
            locks: Vec::new(),
        }
    }

    /// Regions stacked top to bottom with the given heights.
    #[must_use]
    pub fn stacked(
        viewport_height: u32,
        sections: impl IntoIterator<Item = (SectionId, u32)>,
    ) -> Self {
        let mut doc = Self::new(viewport_height);
        doc.set_regions(stack(sections));
        doc
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: HostCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Replace the rendered regions, in document order.
    pub fn set_regions(&mut self, regions: impl IntoIterator<Item = (SectionId, Span)>) {
        self.regions = regions.into_iter().collect();
        self.clamp_scroll();
    }

    #[must_use]
    pub fn regions(&self) -> &[(SectionId, Span)] {
        &self.regions
    }

    /// Total document height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.regions.iter().map(|(_, s)| s.bottom()).max().unwrap_or(0)
    }

    #[must_use]
    pub fn max_scroll(&self) -> u32 {
        self.height().saturating_sub(self.viewport.height)
    }

    /// Change the viewport height.
    pub fn resize(&mut self, height: u32) {
        self.viewport.height = height;
        self.clamp_scroll();
    }

    #[must_use]
    pub fn scroll_y(&self) -> u32 {
        self.viewport.scroll_y
    }

    /// Value of a root presentation attribute.
    #[must_use]
    pub fn root_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// False while any background-scroll lock is held.
    #[must_use]
    pub fn background_scroll_enabled(&self) -> bool {
        !self.locks.iter().any(RegistrationHandle::is_live)
    }

    /// Number of smooth-scroll requests received.
    #[must_use]
    pub fn scroll_requests(&self) -> u32 {
        self.scroll_requests
    }

    /// Live registrations of `kind`.
    #[must_use]
    pub fn live_registrations(&self, kind: RegistrationKind) -> usize {
        let handles = self
            .observers
            .iter()
            .map(|o| &o.handle)
            .chain(&self.listeners)
            .chain(&self.locks);
        handles.filter(|h| h.kind() == kind && h.is_live()).count()
    }

    /// A smooth scroll is in flight.
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.animator.is_active()
    }

    /// Where the current smooth scroll is headed.
    #[must_use]
    pub fn scroll_target(&self) -> Option<u32> {
        self.animator.target()
    }

    /// User scroll input (wheel, keys). Ignored while the background is
    /// locked. Returns whether the offset changed.
    pub fn scroll_by(&mut self, delta: i64) -> bool {
        let target = i64::from(self.viewport.scroll_y).saturating_add(delta);
        self.jump_to(target.clamp(0, i64::from(u32::MAX)) as u32)
    }

    /// Instant user scroll to `y`. Ignored while the background is locked.
    pub fn jump_to(&mut self, y: u32) -> bool {
        if !self.background_scroll_enabled() {
            tracing::trace!(y, "user scroll ignored while locked");
            return false;
        }
        self.animator.cancel();
        let y = y.min(self.max_scroll());
        let moved = y != self.viewport.scroll_y;
        self.viewport.scroll_y = y;
        moved
    }

    /// Advance host time, moving any smooth scroll in flight.
    pub fn set_time(&mut self, now: Duration) -> ScrollTick {
        self.now = now;
        let tick = self.animator.advance(now, &mut self.viewport.scroll_y);
        if tick.settled {
            tracing::debug!(y = self.viewport.scroll_y, "smooth scroll settled");
        }
        tick
    }

    /// Verify every registry id maps to exactly one rendered region.
    ///
    /// # Errors
    ///
    /// The first inconsistency found, in registry order.
    pub fn check_registry(&self, registry: &SectionRegistry) -> Result<(), DocumentError> {
        for id in registry.iter() {
            match self.regions.iter().filter(|(r, _)| *r == id).count() {
                0 => return Err(DocumentError::MissingRegion(id)),
                1 => {}
                _ => return Err(DocumentError::DuplicateRegion(id)),
            }
        }
        if let Some((id, _)) = self.regions.iter().find(|(r, _)| !registry.contains(*r)) {
            return Err(DocumentError::UnregisteredRegion(*id));
        }
        Ok(())
    }

    /// Current visibility of each target, in target order.
    #[must_use]
    pub fn visibility(&self, targets: &[SectionId]) -> Vec<VisibilitySample> {
        targets
            .iter()
            .map(|&id| {
                let ratio = self
                    .region(id)
                    .map_or(0.0, |span| intersection_ratio(span, self.viewport));
                VisibilitySample::new(id, ratio)
            })
            .collect()
    }

    /// Callbacks owed to live registrations after a scroll or layout
    /// change: the scroll listener first, then each observer.
    pub fn collect_events(&mut self) -> Vec<Msg> {
        self.prune();
        let mut events = Vec::new();
        if !self.listeners.is_empty() {
            events.push(Msg::Scrolled {
                y: self.viewport.scroll_y,
            });
        }
        for observer in &self.observers {
            events.push(Msg::Visibility(self.visibility(&observer.targets)));
        }
        events
    }

    fn prune(&mut self) {
        self.observers.retain(|o| o.handle.is_live());
        self.listeners.retain(RegistrationHandle::is_live);
        self.locks.retain(RegistrationHandle::is_live);
    }

    fn clamp_scroll(&mut self) {
        let max = self.max_scroll();
        if self.viewport.scroll_y > max {
            self.viewport.scroll_y = max;
        }
    }
}

impl PageHost for Document {
    fn region(&self, id: SectionId) -> Option<Span> {
        self.regions
            .iter()
            .find(|(r, _)| *r == id)
            .map(|(_, span)| *span)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_to(&mut self, top: u32) {
        let target = top.min(self.max_scroll());
        self.scroll_requests += 1;
        self.animator.start(self.viewport.scroll_y, target, self.now);
        tracing::debug!(from = self.viewport.scroll_y, to = target, "smooth scroll");
    }

    fn set_root_theme(&mut self, theme: Theme) {
        self.attrs
            .insert(THEME_ATTR.to_string(), theme.as_attr().to_string());
    }

    fn observe_visibility(&mut self, targets: &[SectionId]) -> Result<Registration, HostError> {
        if !self.capabilities.visibility {
            return Err(HostError::ObservationUnavailable);
        }
        let (reg, handle) = Registration::new(RegistrationKind::VisibilityObserver);
        self.observers.push(Observer {
            handle,
            targets: targets.to_vec(),
        });
        Ok(reg)
    }

    fn listen_scroll(&mut self) -> Result<Registration, HostError> {
        if !self.capabilities.scroll_events {
            return Err(HostError::ListenerUnavailable);
        }
        let (reg, handle) = Registration::new(RegistrationKind::ScrollListener);
        self.listeners.push(handle);
        Ok(reg)
    }

    fn lock_background_scroll(&mut self) -> Registration {
        let (reg, handle) = Registration::new(RegistrationKind::ScrollLock);
        self.locks.push(handle);
        reg
    }
}

/// Lay regions out top to bottom with the given heights.
pub fn stack(sections: impl IntoIterator<Item = (SectionId, u32)>) -> Vec<(SectionId, Span)> {
    let mut top = 0u32;
    sections
        .into_iter()
        .map(|(id, height)| {
            let span = Span::new(top, height);
            top = span.bottom();
            (id, span)
        })
        .collect()
}
