#![forbid(unsafe_code)]

//! Step-based page runner.
//!
//! [`StepPage`] drives a [`PageController`] over a [`Document`] without
//! threads or blocking. The embedder controls the loop:
//!
//! 1. Push inputs via [`StepPage::push`].
//! 2. Advance time via [`StepPage::advance_time`].
//! 3. Call [`StepPage::step`] to move any smooth scroll, process queued
//!    inputs and deliver the host callbacks they cause.
//!
//! After every scroll or layout change the document's live registrations
//! are notified: the scroll listener first, then the visibility observer,
//! each as a controller message. When a smooth scroll lands, the controller
//! gets [`Msg::ScrollEnded`] after the final visibility report; when user
//! input cancels one, it gets it before the report of the new position.

use core::time::Duration;
use std::collections::VecDeque;

use folio_core::tracker::IntersectionEntry;
use folio_core::{
    CloseReason, Msg, PageController, PageOptions, PageState, SectionId, Span, Update,
};

use crate::{DeterministicClock, Document};

/// Upper bound on frames [`StepPage::settle`] will run.
const MAX_SETTLE_FRAMES: u32 = 10_000;

/// Inputs an embedder can push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostInput {
    /// Nav bar selection.
    Navigate(SectionId),
    ToggleTheme,
    OpenMenu,
    CloseMenu(CloseReason),
    /// Selection inside the menu overlay.
    MenuNavigate(SectionId),
    /// User scroll by a relative amount (wheel, arrow keys).
    Wheel(i64),
    /// User scroll to an absolute offset (Home/End).
    JumpTo(u32),
    /// Viewport height changed.
    Resize { height: u32 },
}

impl HostInput {
    fn into_msg(self) -> Option<Msg> {
        match self {
            Self::Navigate(id) => Some(Msg::Navigate(id)),
            Self::ToggleTheme => Some(Msg::ToggleTheme),
            Self::OpenMenu => Some(Msg::OpenMenu),
            Self::CloseMenu(reason) => Some(Msg::CloseMenu(reason)),
            Self::MenuNavigate(id) => Some(Msg::MenuNavigate(id)),
            Self::Wheel(_) | Self::JumpTo(_) | Self::Resize { .. } => None,
        }
    }
}

/// Result of a single [`StepPage::step`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// Number of inputs processed during this step.
    pub events_processed: u32,
    /// The active section changed.
    pub active_changed: bool,
    /// A smooth scroll reached its target during this step.
    pub scroll_settled: bool,
    /// The scroll offset moved.
    pub scrolled: bool,
    /// Something visible changed; the embedder should redraw.
    pub redraw: bool,
    /// Visibility crossings delivered during this step, in order.
    pub entries: Vec<IntersectionEntry>,
}

impl StepResult {
    fn absorb(&mut self, update: Update) {
        self.active_changed |= update.active_changed;
        self.redraw |= update.needs_redraw();
        self.entries.extend(update.entries);
    }

    /// Fold a later step into this one.
    pub fn merge(&mut self, other: StepResult) {
        self.events_processed += other.events_processed;
        self.active_changed |= other.active_changed;
        self.scroll_settled |= other.scroll_settled;
        self.scrolled |= other.scrolled;
        self.redraw |= other.redraw;
        self.entries.extend(other.entries);
    }
}

/// Host-driven, non-blocking page runner.
///
/// # Lifecycle
///
/// 1. [`StepPage::mount`] mounts the controller; the initial visibility
///    notification is delivered on the first step.
/// 2. [`StepPage::step`] is called repeatedly from the embedder's loop.
/// 3. [`StepPage::unmount`] releases every registration and hands the
///    document back.
#[derive(Debug)]
pub struct StepPage {
    controller: PageController,
    document: Document,
    clock: DeterministicClock,
    queue: VecDeque<HostInput>,
    report_pending: bool,
}

impl StepPage {
    /// Mount a controller over `document`.
    #[must_use]
    pub fn mount(mut document: Document, options: PageOptions) -> Self {
        let controller = PageController::mount(&mut document, options);
        Self {
            controller,
            document,
            clock: DeterministicClock::new(),
            queue: VecDeque::new(),
            report_pending: true,
        }
    }

    /// Release every registration and return the document.
    pub fn unmount(self) -> Document {
        self.controller.unmount();
        self.document
    }

    /// Queue an input for the next [`step`](Self::step).
    pub fn push(&mut self, input: HostInput) {
        self.queue.push_back(input);
    }

    /// Advance the deterministic clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set the deterministic clock to an absolute time.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Replace the layout: new regions and viewport height.
    ///
    /// Observers are notified on the next step.
    pub fn relayout(&mut self, regions: Vec<(SectionId, Span)>, viewport_height: u32) {
        self.document.set_regions(regions);
        self.document.resize(viewport_height);
        self.report_pending = true;
    }

    /// Move any smooth scroll to the current time, then process every
    /// queued input.
    pub fn step(&mut self) -> StepResult {
        let mut result = StepResult::default();

        let tick = self.document.set_time(self.clock.now());
        result.scroll_settled = tick.settled;
        let mut dirty = std::mem::take(&mut self.report_pending) || tick.moved;
        result.scrolled |= tick.moved;
        if dirty {
            self.report(&mut result);
            dirty = false;
        }
        if tick.settled {
            self.end_scroll(&mut result);
        }

        while let Some(input) = self.queue.pop_front() {
            result.events_processed += 1;
            let was_scrolling = self.document.is_scrolling();
            match input {
                HostInput::Wheel(delta) => {
                    dirty = self.document.scroll_by(delta);
                    self.end_interrupted(was_scrolling, &mut result);
                }
                HostInput::JumpTo(y) => {
                    dirty = self.document.jump_to(y);
                    self.end_interrupted(was_scrolling, &mut result);
                }
                HostInput::Resize { height } => {
                    self.document.resize(height);
                    dirty = true;
                }
                page => {
                    if let Some(msg) = page.into_msg() {
                        let update = self.controller.update(&mut self.document, msg);
                        result.absorb(update);
                    }
                }
            }
            if dirty {
                result.scrolled = true;
                result.redraw = true;
                self.report(&mut result);
                dirty = false;
            }
        }

        result.redraw |= result.scrolled;
        result
    }

    /// Step in `frame` increments until no smooth scroll is in flight.
    pub fn settle(&mut self, frame: Duration) -> StepResult {
        let mut total = self.step();
        let mut frames = 0;
        while self.document.is_scrolling() && frames < MAX_SETTLE_FRAMES {
            self.advance_time(frame);
            total.merge(self.step());
            frames += 1;
        }
        total
    }

    #[must_use]
    pub fn state(&self) -> PageState {
        self.controller.state()
    }

    #[must_use]
    pub fn controller(&self) -> &PageController {
        &self.controller
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn end_interrupted(&mut self, was_scrolling: bool, result: &mut StepResult) {
        if was_scrolling && !self.document.is_scrolling() {
            tracing::debug!("smooth scroll interrupted by user input");
            self.end_scroll(result);
        }
    }

    fn end_scroll(&mut self, result: &mut StepResult) {
        let update = self.controller.update(&mut self.document, Msg::ScrollEnded);
        result.absorb(update);
    }

    fn report(&mut self, result: &mut StepResult) {
        for msg in self.document.collect_events() {
            let update = self.controller.update(&mut self.document, msg);
            result.absorb(update);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::lifecycle::RegistrationKind;
    use folio_core::{MenuState, Theme};
    use pretty_assertions::assert_eq;

    const FRAME: Duration = Duration::from_millis(16);

    fn page() -> StepPage {
        let doc = Document::stacked(
            900,
            [
                (SectionId::Home, 1000),
                (SectionId::About, 1000),
                (SectionId::Strengths, 1000),
                (SectionId::Skills, 1000),
                (SectionId::Projects, 1000),
                (SectionId::Certifications, 1000),
                (SectionId::Contact, 1000),
            ],
        );
        StepPage::mount(doc, PageOptions::default())
    }

    #[test]
    fn mount_registers_and_first_step_reports() {
        let mut p = page();
        assert_eq!(
            p.document()
                .live_registrations(RegistrationKind::VisibilityObserver),
            1
        );
        let first = p.step();
        assert_eq!(first.events_processed, 0);
        // Home enters at 90%, About is out of view.
        assert_eq!(first.entries.len(), 7);
        assert_eq!(p.state().active, SectionId::Home);
        assert_eq!(p.document().root_attr(crate::THEME_ATTR), Some("dark"));
    }

    #[test]
    fn step_with_nothing_to_do_is_quiet() {
        let mut p = page();
        p.step();
        let idle = p.step();
        assert_eq!(idle, StepResult::default());
    }

    #[test]
    fn wheel_scroll_reports_scrolled_flag() {
        let mut p = page();
        p.step();
        p.push(HostInput::Wheel(120));
        let r = p.step();
        assert_eq!(r.events_processed, 1);
        assert!(r.scrolled && r.redraw);
        assert!(p.state().scrolled);
    }

    #[test]
    fn wheel_is_ignored_while_menu_is_open() {
        let mut p = page();
        p.step();
        p.push(HostInput::OpenMenu);
        p.push(HostInput::Wheel(500));
        let r = p.step();
        assert!(!r.scrolled);
        assert_eq!(p.document().scroll_y(), 0);
        assert_eq!(p.state().menu, MenuState::Open);
    }

    #[test]
    fn theme_toggle_touches_only_the_root_attribute() {
        let mut p = page();
        p.step();
        p.push(HostInput::ToggleTheme);
        let r = p.step();
        assert!(r.redraw && !r.scrolled && !r.active_changed);
        assert_eq!(p.state().theme, Theme::Light);
        assert_eq!(p.document().root_attr(crate::THEME_ATTR), Some("light"));
        assert_eq!(p.document().scroll_requests(), 0);
    }

    #[test]
    fn navigation_settles_on_target() {
        let mut p = page();
        p.step();
        p.push(HostInput::Navigate(SectionId::Skills));
        let r = p.settle(FRAME);
        assert!(r.scroll_settled);
        assert_eq!(p.document().scroll_y(), 3000);
        assert_eq!(p.state().active, SectionId::Skills);
    }

    #[test]
    fn unmount_releases_everything() {
        let mut p = page();
        p.push(HostInput::OpenMenu);
        p.step();
        let doc = p.unmount();
        assert!(doc.background_scroll_enabled());
        assert_eq!(doc.live_registrations(RegistrationKind::ScrollListener), 0);
        assert_eq!(
            doc.live_registrations(RegistrationKind::VisibilityObserver),
            0
        );
    }
}
