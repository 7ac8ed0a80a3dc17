//! Controller behaviour against a minimal recording host.

use std::collections::HashMap;

use folio_core::lifecycle::{Registration, RegistrationHandle, RegistrationKind};
use folio_core::{
    CloseReason, HostError, MenuState, Msg, PageController, PageHost, PageOptions, SectionId,
    SectionRegistry, Span, Theme, TrackerConfig, Viewport, VisibilitySample,
};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct RecordingHost {
    regions: HashMap<SectionId, Span>,
    viewport: Viewport,
    scroll_requests: Vec<u32>,
    theme_writes: Vec<Theme>,
    handles: Vec<RegistrationHandle>,
    no_observer: bool,
}

impl RecordingHost {
    fn with_sections(ids: &[SectionId]) -> Self {
        let regions = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, Span::new(i as u32 * 1000, 1000)))
            .collect();
        Self {
            regions,
            viewport: Viewport::new(0, 800),
            ..Self::default()
        }
    }

    fn live(&self, kind: RegistrationKind) -> usize {
        self.handles
            .iter()
            .filter(|h| h.kind() == kind && h.is_live())
            .count()
    }

    fn background_scroll_enabled(&self) -> bool {
        self.live(RegistrationKind::ScrollLock) == 0
    }

    fn register(&mut self, kind: RegistrationKind) -> Registration {
        let (reg, handle) = Registration::new(kind);
        self.handles.push(handle);
        reg
    }
}

impl PageHost for RecordingHost {
    fn region(&self, id: SectionId) -> Option<Span> {
        self.regions.get(&id).copied()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_to(&mut self, top: u32) {
        self.scroll_requests.push(top);
    }

    fn set_root_theme(&mut self, theme: Theme) {
        self.theme_writes.push(theme);
    }

    fn observe_visibility(&mut self, _targets: &[SectionId]) -> Result<Registration, HostError> {
        if self.no_observer {
            return Err(HostError::ObservationUnavailable);
        }
        Ok(self.register(RegistrationKind::VisibilityObserver))
    }

    fn listen_scroll(&mut self) -> Result<Registration, HostError> {
        Ok(self.register(RegistrationKind::ScrollListener))
    }

    fn lock_background_scroll(&mut self) -> Registration {
        self.register(RegistrationKind::ScrollLock)
    }
}

fn mount(host: &mut RecordingHost) -> PageController {
    PageController::mount(host, PageOptions::default())
}

#[test]
fn mount_registers_observer_listener_and_theme() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let page = mount(&mut host);
    assert_eq!(host.live(RegistrationKind::VisibilityObserver), 1);
    assert_eq!(host.live(RegistrationKind::ScrollListener), 1);
    assert_eq!(host.theme_writes, vec![Theme::Dark]);
    let state = page.state();
    assert_eq!(state.active, SectionId::Home);
    assert_eq!(state.menu, MenuState::Closed);
    assert!(!state.scrolled);
    assert!(state.observing);
}

#[test]
fn navigate_to_present_section_is_optimistic_and_scrolls_once() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount(&mut host);

    let up = page.update(&mut host, Msg::Navigate(SectionId::Skills));

    assert_eq!(page.active(), SectionId::Skills);
    assert!(up.active_changed);
    assert!(up.scroll_requested);
    assert_eq!(host.scroll_requests, vec![3000]);
}

#[test]
fn navigate_to_absent_section_changes_nothing() {
    let mut host = RecordingHost::with_sections(&[SectionId::Home, SectionId::About]);
    let mut page = mount(&mut host);
    let before = page.state();

    let up = page.update(&mut host, Msg::Navigate(SectionId::Projects));

    assert_eq!(page.state(), before);
    assert_eq!(up, folio_core::Update::default());
    assert!(host.scroll_requests.is_empty());
}

#[test]
fn toggling_theme_twice_round_trips() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount(&mut host);

    page.update(&mut host, Msg::ToggleTheme);
    assert_eq!(page.theme(), Theme::Light);
    page.update(&mut host, Msg::ToggleTheme);
    assert_eq!(page.theme(), Theme::Dark);

    assert_eq!(host.theme_writes, vec![Theme::Dark, Theme::Light, Theme::Dark]);
    assert!(host.scroll_requests.is_empty());
    assert_eq!(page.active(), SectionId::Home);
}

#[test]
fn menu_backdrop_restores_scroll() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount(&mut host);
    page.update(&mut host, Msg::OpenMenu);
    assert!(!host.background_scroll_enabled());
    page.update(&mut host, Msg::CloseMenu(CloseReason::Backdrop));
    assert!(host.background_scroll_enabled());
    assert_eq!(page.state().menu, MenuState::Closed);
}

#[test]
fn menu_close_button_restores_scroll() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount(&mut host);
    page.update(&mut host, Msg::OpenMenu);
    assert!(!host.background_scroll_enabled());
    page.update(&mut host, Msg::CloseMenu(CloseReason::CloseButton));
    assert!(host.background_scroll_enabled());
}

#[test]
fn menu_navigation_restores_scroll_and_navigates() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount(&mut host);
    page.update(&mut host, Msg::OpenMenu);

    let up = page.update(&mut host, Msg::MenuNavigate(SectionId::Projects));

    assert_eq!(page.active(), SectionId::Projects);
    assert_eq!(page.state().menu, MenuState::Closed);
    assert!(host.background_scroll_enabled());
    assert!(up.menu_changed && up.active_changed && up.scroll_requested);
    assert_eq!(host.scroll_requests, vec![4000]);
}

#[test]
fn menu_navigation_to_missing_section_still_closes() {
    let mut host = RecordingHost::with_sections(&[SectionId::Home]);
    let mut page = mount(&mut host);
    page.update(&mut host, Msg::OpenMenu);
    page.update(&mut host, Msg::MenuNavigate(SectionId::Contact));
    assert_eq!(page.active(), SectionId::Home);
    assert!(host.background_scroll_enabled());
}

#[test]
fn teardown_while_menu_open_releases_everything() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount(&mut host);
    page.update(&mut host, Msg::OpenMenu);
    drop(page);
    assert!(host.background_scroll_enabled());
    assert_eq!(host.live(RegistrationKind::VisibilityObserver), 0);
    assert_eq!(host.live(RegistrationKind::ScrollListener), 0);
}

#[test]
fn explicit_unmount_releases_everything() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount(&mut host);
    page.update(&mut host, Msg::OpenMenu);
    page.unmount();
    assert!(host.handles.iter().all(|h| !h.is_live()));
}

#[test]
fn degraded_mode_keeps_navigation_working() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    host.no_observer = true;
    let mut page = mount(&mut host);
    assert!(!page.state().observing);

    let up = page.update(
        &mut host,
        Msg::Visibility(vec![VisibilitySample::new(SectionId::About, 1.0)]),
    );
    assert_eq!(up.activations, 0);
    assert_eq!(page.active(), SectionId::Home);

    page.update(&mut host, Msg::Navigate(SectionId::Contact));
    assert_eq!(page.active(), SectionId::Contact);
}

#[test]
fn visibility_crossing_activates_once_per_crossing() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount(&mut host);
    page.update(
        &mut host,
        Msg::Visibility(vec![VisibilitySample::new(SectionId::About, 0.0)]),
    );

    // One observation jumping straight from 0% to 60%.
    let up = page.update(
        &mut host,
        Msg::Visibility(vec![VisibilitySample::new(SectionId::About, 0.6)]),
    );
    assert_eq!(up.activations, 1);
    assert_eq!(page.active(), SectionId::About);

    // Further ticks inside the same band do nothing.
    for r in [0.62, 0.7, 0.75] {
        let up = page.update(
            &mut host,
            Msg::Visibility(vec![VisibilitySample::new(SectionId::About, r)]),
        );
        assert_eq!(up.activations, 0);
    }
}

#[test]
fn gradual_reveal_writes_once_per_threshold() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount(&mut host);
    page.update(
        &mut host,
        Msg::Visibility(vec![VisibilitySample::new(SectionId::Skills, 0.0)]),
    );
    let mut writes = 0;
    for r in [0.05, 0.1, 0.15, 0.25, 0.3, 0.45, 0.55, 0.6] {
        writes += page
            .update(
                &mut host,
                Msg::Visibility(vec![VisibilitySample::new(SectionId::Skills, r)]),
            )
            .activations;
    }
    // 0.05 enters the viewport, 0.25 crosses 20%, 0.55 crosses 50%.
    assert_eq!(writes, 3);
    assert_eq!(page.active(), SectionId::Skills);
}

#[test]
fn batch_with_several_crossings_is_last_write_wins() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount(&mut host);
    let up = page.update(
        &mut host,
        Msg::Visibility(vec![
            VisibilitySample::new(SectionId::Strengths, 0.9),
            VisibilitySample::new(SectionId::Skills, 0.2),
        ]),
    );
    assert_eq!(up.activations, 2);
    assert_eq!(page.active(), SectionId::Skills);
}

#[test]
fn scrolled_flag_follows_threshold() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = PageController::mount(
        &mut host,
        PageOptions {
            tracker: TrackerConfig::default().with_scrolled_threshold(10),
            ..PageOptions::default()
        },
    );
    assert!(page.update(&mut host, Msg::Scrolled { y: 11 }).scrolled_changed);
    assert!(page.state().scrolled);
    assert!(page.update(&mut host, Msg::Scrolled { y: 3 }).scrolled_changed);
    assert!(!page.state().scrolled);
}

#[test]
fn custom_registry_is_shared_with_tracker() {
    let registry =
        SectionRegistry::new([SectionId::Home, SectionId::About, SectionId::Contact]).unwrap();
    let mut host = RecordingHost::with_sections(registry.ids());
    let page = PageController::mount(
        &mut host,
        PageOptions {
            registry: registry.clone(),
            ..PageOptions::default()
        },
    );
    assert_eq!(page.registry(), &registry);
    assert_eq!(page.tracker().registry(), &registry);
}

fn mount_holding(host: &mut RecordingHost) -> PageController {
    PageController::mount(
        host,
        PageOptions {
            tracker: TrackerConfig::default().with_navigation_hold(true),
            ..PageOptions::default()
        },
    )
}

#[test]
fn navigation_hold_ignores_sections_passed_on_the_way() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount_holding(&mut host);
    page.update(&mut host, Msg::Navigate(SectionId::Projects));
    assert_eq!(page.holding(), Some(SectionId::Projects));

    for id in [SectionId::About, SectionId::Strengths, SectionId::Skills] {
        let up = page.update(
            &mut host,
            Msg::Visibility(vec![VisibilitySample::new(id, 0.9)]),
        );
        assert_eq!(up.activations, 0, "{id}");
        assert_eq!(up.entries.len(), 1, "crossings still reported");
        assert_eq!(page.active(), SectionId::Projects);
    }

    page.update(&mut host, Msg::ScrollEnded);
    assert_eq!(page.holding(), None);
    let up = page.update(
        &mut host,
        Msg::Visibility(vec![VisibilitySample::new(SectionId::Contact, 0.5)]),
    );
    assert_eq!(up.activations, 1);
    assert_eq!(page.active(), SectionId::Contact);
}

#[test]
fn without_hold_tracker_writes_during_navigation() {
    let mut host = RecordingHost::with_sections(&SectionId::ALL);
    let mut page = mount(&mut host);
    page.update(&mut host, Msg::Navigate(SectionId::Projects));
    assert_eq!(page.holding(), None);
    page.update(
        &mut host,
        Msg::Visibility(vec![VisibilitySample::new(SectionId::About, 0.9)]),
    );
    assert_eq!(page.active(), SectionId::About);
}

#[test]
fn navigating_to_a_missing_section_does_not_hold() {
    let mut host = RecordingHost::with_sections(&[SectionId::Home, SectionId::About]);
    let mut page = mount_holding(&mut host);
    page.update(&mut host, Msg::Navigate(SectionId::Contact));
    assert_eq!(page.holding(), None);
}
