#![forbid(unsafe_code)]

//! Top-level page controller.
//!
//! [`PageController`] is the single owner of every piece of mutable page
//! state: the active section, the theme flag, the menu overlay and the
//! scrolled flag. Views read a [`PageState`] snapshot and act by sending
//! [`Msg`] values through [`PageController::update`], Elm style.
//!
//! # Writers of the active section
//!
//! Two writers exist and both are last-write-wins:
//!
//! 1. Navigation writes the requested section *before* the scroll animation
//!    is requested (optimistic update).
//! 2. The visibility tracker writes whatever a crossing batch resolves to.
//!
//! Once a navigation scroll settles the tracker observes the destination and
//! confirms the same value, so the two converge. While the scroll is still
//! moving, sections it passes may briefly win; with
//! [`TrackerConfig::hold_navigation`] the tracker's writes are held back
//! until the host sends [`Msg::ScrollEnded`].
//!
//! # Teardown
//!
//! Dropping the controller (or calling [`PageController::unmount`]) releases
//! the observer, the scroll listener and, if the menu is open, the
//! background-scroll lock.

use crate::host::PageHost;
use crate::menu::{CloseReason, MenuOverlay, MenuState};
use crate::section::{SectionId, SectionRegistry};
use crate::theme::Theme;
use crate::tracker::{IntersectionEntry, TrackerConfig, VisibilitySample, VisibilityTracker};

/// Messages understood by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Nav bar selection.
    Navigate(SectionId),
    /// Theme button.
    ToggleTheme,
    /// Menu button.
    OpenMenu,
    /// Backdrop click or close button.
    CloseMenu(CloseReason),
    /// Selection made inside the menu overlay.
    MenuNavigate(SectionId),
    /// Host scroll listener callback.
    Scrolled { y: u32 },
    /// Host visibility observer callback, in observation order.
    Visibility(Vec<VisibilitySample>),
    /// A smooth scroll reached its target or was interrupted by the user.
    ScrollEnded,
}

/// What an update changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    /// The active section now differs from before the update.
    pub active_changed: bool,
    /// Number of active-section writes, including idempotent ones.
    pub activations: u32,
    pub theme_changed: bool,
    pub menu_changed: bool,
    pub scrolled_changed: bool,
    /// A scroll request was issued to the host.
    pub scroll_requested: bool,
    /// Crossing entries produced by a visibility batch.
    pub entries: Vec<IntersectionEntry>,
}

impl Update {
    /// Whether anything visible changed.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.active_changed || self.theme_changed || self.menu_changed || self.scrolled_changed
    }

    /// Fold another update into this one.
    pub fn merge(&mut self, other: Update) {
        self.active_changed |= other.active_changed;
        self.activations += other.activations;
        self.theme_changed |= other.theme_changed;
        self.menu_changed |= other.menu_changed;
        self.scrolled_changed |= other.scrolled_changed;
        self.scroll_requested |= other.scroll_requested;
        self.entries.extend(other.entries);
    }
}

/// Read-only snapshot handed to views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub active: SectionId,
    pub theme: Theme,
    pub menu: MenuState,
    pub scrolled: bool,
    /// False when the host could not supply visibility observation.
    pub observing: bool,
}

/// Mount-time options.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub registry: SectionRegistry,
    pub tracker: TrackerConfig,
    pub theme: Theme,
    /// Active section before anything is observed.
    pub initial_active: SectionId,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            registry: SectionRegistry::standard(),
            tracker: TrackerConfig::default(),
            theme: Theme::default(),
            initial_active: SectionId::Home,
        }
    }
}

/// Owner of all page state.
#[derive(Debug)]
pub struct PageController {
    registry: SectionRegistry,
    active: SectionId,
    theme: Theme,
    tracker: VisibilityTracker,
    menu: MenuOverlay,
    /// Section held active while its navigation scroll is in flight.
    holding: Option<SectionId>,
}

impl PageController {
    /// Mount against `host`: register observers, apply the initial theme.
    pub fn mount<H: PageHost + ?Sized>(host: &mut H, options: PageOptions) -> Self {
        let PageOptions {
            registry,
            tracker,
            theme,
            initial_active,
        } = options;
        let mut tracker = VisibilityTracker::new(registry.clone(), tracker);
        tracker.attach(host);
        host.set_root_theme(theme);
        tracing::info!(
            sections = registry.len(),
            observing = tracker.is_observing(),
            %theme,
            "page mounted"
        );
        Self {
            registry,
            active: initial_active,
            theme,
            tracker,
            menu: MenuOverlay::new(),
            holding: None,
        }
    }

    /// Release every host registration. Equivalent to dropping.
    pub fn unmount(mut self) {
        self.menu.close(CloseReason::Teardown);
        self.tracker.detach();
        tracing::info!("page unmounted");
    }

    #[must_use]
    pub fn state(&self) -> PageState {
        PageState {
            active: self.active,
            theme: self.theme,
            menu: self.menu.state(),
            scrolled: self.tracker.is_scrolled(),
            observing: self.tracker.is_observing(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn active(&self) -> SectionId {
        self.active
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Section held by an in-flight navigation scroll, if any.
    #[must_use]
    pub fn holding(&self) -> Option<SectionId> {
        self.holding
    }

    #[must_use]
    pub fn tracker(&self) -> &VisibilityTracker {
        &self.tracker
    }

    /// Dispatch one message.
    pub fn update<H: PageHost + ?Sized>(&mut self, host: &mut H, msg: Msg) -> Update {
        match msg {
            Msg::Navigate(id) => self.navigate_to(host, id),
            Msg::ToggleTheme => self.toggle_theme(host),
            Msg::OpenMenu => self.open_menu(host),
            Msg::CloseMenu(reason) => self.close_menu(reason),
            Msg::MenuNavigate(id) => self.navigate_from_menu(host, id),
            Msg::Scrolled { y } => Update {
                scrolled_changed: self.tracker.on_scroll(y),
                ..Update::default()
            },
            Msg::Visibility(samples) => self.apply_visibility(samples),
            Msg::ScrollEnded => {
                if let Some(id) = self.holding.take() {
                    tracing::debug!(%id, "navigation hold released");
                }
                Update::default()
            }
        }
    }

    /// Scroll to `id` and mark it active immediately.
    ///
    /// A no-op when the host has no rendered region for `id`.
    pub fn navigate_to<H: PageHost + ?Sized>(&mut self, host: &mut H, id: SectionId) -> Update {
        let Some(region) = host.region(id) else {
            tracing::debug!(%id, "navigation target not rendered; ignoring");
            return Update::default();
        };
        let mut update = Update::default();
        self.write_active(id, &mut update);
        host.scroll_to(region.top);
        update.scroll_requested = true;
        if self.tracker.config().hold_navigation {
            self.holding = Some(id);
        }
        tracing::debug!(%id, top = region.top, "navigate");
        update
    }

    /// Navigate and close the menu as one action.
    pub fn navigate_from_menu<H: PageHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: SectionId,
    ) -> Update {
        let mut update = self.navigate_to(host, id);
        update.merge(self.close_menu(CloseReason::Navigation));
        update
    }

    pub fn toggle_theme<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Update {
        self.set_theme(host, self.theme.toggled())
    }

    /// Apply a specific theme. Writes the root attribute only on change.
    pub fn set_theme<H: PageHost + ?Sized>(&mut self, host: &mut H, theme: Theme) -> Update {
        if theme == self.theme {
            return Update::default();
        }
        self.theme = theme;
        host.set_root_theme(theme);
        tracing::debug!(%theme, "theme toggled");
        Update {
            theme_changed: true,
            ..Update::default()
        }
    }

    pub fn open_menu<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Update {
        Update {
            menu_changed: self.menu.open(host),
            ..Update::default()
        }
    }

    pub fn close_menu(&mut self, reason: CloseReason) -> Update {
        Update {
            menu_changed: self.menu.close(reason),
            ..Update::default()
        }
    }

    fn apply_visibility(&mut self, samples: Vec<VisibilitySample>) -> Update {
        let entries = self.tracker.observe(samples);
        let mut update = Update::default();
        if let Some(held) = self.holding {
            tracing::trace!(%held, entries = entries.len(), "tracker writes held");
            update.entries = entries;
            return update;
        }
        for id in self.tracker.writes(&entries) {
            self.write_active(id, &mut update);
        }
        update.entries = entries;
        update
    }

    fn write_active(&mut self, id: SectionId, update: &mut Update) {
        update.activations += 1;
        if self.active != id {
            tracing::debug!(from = %self.active, to = %id, "active section");
            self.active = id;
            update.active_changed = true;
        }
    }
}
