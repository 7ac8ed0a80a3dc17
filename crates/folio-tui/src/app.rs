#![forbid(unsafe_code)]

//! Application state for the terminal page.
//!
//! [`App`] owns a [`StepPage`] over a document whose regions come from the
//! terminal [`PageLayout`]. Keys and mouse events become [`HostInput`]s and
//! are stepped immediately; [`App::tick`] moves time forward for smooth
//! scrolling and entrance animations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use folio_core::contact::{ContactForm, Field, FieldError, FormTransport, SubmitOutcome};
use folio_core::content::Portfolio;
use folio_core::motion::{
    AnimationRequest, AnimationTarget, Animator, Direction, Pose, RevealTracker, Timeline,
    card_fade, container_stagger, float_bob, meter_fill, nav_fade,
};
use folio_core::{
    CloseReason, MenuState, PageOptions, PageState, SectionId, SectionRegistry, TrackerConfig,
};
use folio_host::{Document, HostInput, StepPage, StepResult};
use ratatui::layout::{Position, Rect};

use crate::cli::Opts;
use crate::layout::{LineKind, LinkTarget, PageLayout, PageLine};
use crate::links::{LinkOpener, resolve_resume};
use crate::transport::{SubmitResult, spawn_submit};
use crate::view::{self, MenuEntry, NavHit};

/// Rows moved per wheel notch.
const WHEEL_ROWS: u32 = 3;

/// Where keystrokes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Page,
    Form(Field),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Message shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

pub struct App {
    page: StepPage,
    portfolio: Portfolio,
    content_dir: Option<PathBuf>,
    layout: PageLayout,
    row_px: u32,
    width: u16,
    height: u16,
    timeline: Timeline,
    reveals: RevealTracker,
    revealed_at: HashMap<SectionId, Duration>,
    focus: Focus,
    menu_cursor: usize,
    form: ContactForm,
    form_errors: Vec<FieldError>,
    status: Option<Status>,
    pending: Option<Receiver<SubmitResult>>,
    transport: Arc<dyn FormTransport + Send + Sync>,
    links: Box<dyn LinkOpener>,
    quit: bool,
}

impl App {
    /// Lay out `portfolio` for a `width × height` terminal and mount the page.
    pub fn new(
        portfolio: Portfolio,
        opts: &Opts,
        (width, height): (u16, u16),
        transport: Arc<dyn FormTransport + Send + Sync>,
        links: Box<dyn LinkOpener>,
    ) -> Self {
        let registry = SectionRegistry::standard();
        let row_px = opts.row_px.max(1);
        let rows = view::body_rows(height);
        let layout = PageLayout::build(&portfolio, &registry, width, usize::from(rows));
        let mut document = Document::new(u32::from(rows) * row_px);
        document.set_regions(layout.regions(row_px));

        let page = StepPage::mount(
            document,
            PageOptions {
                registry,
                tracker: TrackerConfig::default()
                    .with_policy(opts.policy)
                    .with_navigation_hold(opts.nav_hold),
                theme: opts.theme,
                ..PageOptions::default()
            },
        );

        let mut timeline = Timeline::new();
        timeline.request(AnimationRequest {
            target: AnimationTarget::NavBar,
            variant: nav_fade(),
            stagger: None,
        });
        timeline.request(AnimationRequest {
            target: AnimationTarget::Hero,
            variant: card_fade(Direction::Up, Duration::from_millis(150)),
            stagger: None,
        });

        let mut app = Self {
            page,
            portfolio,
            content_dir: opts
                .content
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf),
            layout,
            row_px,
            width,
            height,
            timeline,
            reveals: RevealTracker::new(),
            revealed_at: HashMap::new(),
            focus: Focus::Page,
            menu_cursor: 0,
            form: ContactForm::new(),
            form_errors: Vec::new(),
            status: None,
            pending: None,
            transport,
            links,
            quit: false,
        };
        let first = app.page.step();
        app.after_step(first);
        tracing::info!(
            width,
            height,
            rows = app.layout.len(),
            observing = app.page.state().observing,
            "page mounted"
        );
        app
    }

    /// Move the page clock to `now` since start.
    pub fn tick(&mut self, now: Duration) {
        self.page.set_time(now);
        let result = self.page.step();
        self.after_step(result);
        self.timeline.prune(self.layout.max_children());
        self.poll_submission();
    }

    /// The terminal changed size.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        let rows = view::body_rows(height);
        self.layout = PageLayout::build(
            &self.portfolio,
            self.page.controller().registry(),
            width,
            usize::from(rows),
        );
        self.page
            .relayout(self.layout.regions(self.row_px), u32::from(rows) * self.row_px);
        let result = self.page.step();
        self.after_step(result);
        tracing::debug!(width, height, rows = self.layout.len(), "relayout");
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }
        if let Focus::Form(field) = self.focus {
            self.form_key(field, key);
            return;
        }
        if self.page.state().menu == MenuState::Open {
            self.menu_key(key);
            return;
        }
        self.page_key(key);
    }

    fn page_key(&mut self, key: KeyEvent) {
        let line = i64::from(self.row_px);
        let screen = i64::from(view::body_rows(self.height).saturating_sub(1).max(1)) * line;
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(id) = self.nth_section(c) {
                    self.send(HostInput::Navigate(id));
                }
            }
            KeyCode::Tab => {
                let next = self.registry().next(self.page.state().active);
                self.send(HostInput::Navigate(next));
            }
            KeyCode::BackTab => {
                let prev = self.registry().prev(self.page.state().active);
                self.send(HostInput::Navigate(prev));
            }
            KeyCode::Char('j') | KeyCode::Down => self.send(HostInput::Wheel(line)),
            KeyCode::Char('k') | KeyCode::Up => self.send(HostInput::Wheel(-line)),
            KeyCode::PageDown | KeyCode::Char(' ') => self.send(HostInput::Wheel(screen)),
            KeyCode::PageUp => self.send(HostInput::Wheel(-screen)),
            KeyCode::Home => self.send(HostInput::JumpTo(0)),
            KeyCode::End => self.send(HostInput::JumpTo(u32::MAX)),
            KeyCode::Char('t') => self.send(HostInput::ToggleTheme),
            KeyCode::Char('m') => self.open_menu(),
            KeyCode::Char('c') => self.open_form(),
            KeyCode::Char('o') => self.open_resume(),
            KeyCode::Char('g') => self.open_visible_repo(),
            _ => {}
        }
    }

    fn menu_key(&mut self, key: KeyEvent) {
        let entries = view::menu_entries(self.registry());
        let len = entries.len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('m') => {
                self.send(HostInput::CloseMenu(CloseReason::CloseButton));
            }
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('t') => self.send(HostInput::ToggleTheme),
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(id) = self.nth_section(c) {
                    self.send(HostInput::MenuNavigate(id));
                }
            }
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => {
                self.menu_cursor = (self.menu_cursor + 1) % len.max(1);
            }
            KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => {
                self.menu_cursor = (self.menu_cursor + len.max(1) - 1) % len.max(1);
            }
            KeyCode::Enter => {
                if let Some(&entry) = entries.get(self.menu_cursor) {
                    self.menu_pick(entry);
                }
            }
            _ => {}
        }
    }

    fn form_key(&mut self, field: Field, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.focus = Focus::Page,
            KeyCode::Tab | KeyCode::Down => self.focus = Focus::Form(field.next()),
            KeyCode::BackTab | KeyCode::Up => self.focus = Focus::Form(field.prev()),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.submit(),
            KeyCode::Enter if field == Field::Message => self.form.push(field, '\n'),
            KeyCode::Enter => self.focus = Focus::Form(field.next()),
            KeyCode::Backspace => {
                self.form.pop(field);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.form.push(field, c);
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let wheel = i64::from(WHEEL_ROWS * self.row_px);
        match mouse.kind {
            MouseEventKind::ScrollDown if self.focus == Focus::Page => {
                self.send(HostInput::Wheel(wheel));
            }
            MouseEventKind::ScrollUp if self.focus == Focus::Page => {
                self.send(HostInput::Wheel(-wheel));
            }
            MouseEventKind::Down(MouseButton::Left) => self.click(mouse.column, mouse.row),
            _ => {}
        }
    }

    fn click(&mut self, x: u16, y: u16) {
        let at = Position::new(x, y);
        if self.focus != Focus::Page {
            if !view::form_area(self.area()).contains(at) {
                self.focus = Focus::Page;
            }
            return;
        }
        if self.page.state().menu == MenuState::Open {
            let menu = view::menu_layout(self.area(), self.registry());
            if menu.close.contains(at) {
                self.send(HostInput::CloseMenu(CloseReason::CloseButton));
            } else if let Some(&(entry, _)) = menu.items.iter().find(|(_, r)| r.contains(at)) {
                self.menu_pick(entry);
            } else if !menu.panel.contains(at) {
                self.send(HostInput::CloseMenu(CloseReason::Backdrop));
            }
            return;
        }
        if y == view::NAV_ROW {
            let items = view::nav_items(self.width, &self.portfolio.profile.name, self.registry());
            let hit = items
                .iter()
                .find(|item| x >= item.x && x < item.x.saturating_add(item.width))
                .map(|item| item.hit);
            match hit {
                Some(NavHit::Brand) => {
                    let first = self.registry().first();
                    self.send(HostInput::Navigate(first));
                }
                Some(NavHit::Section(id)) => self.send(HostInput::Navigate(id)),
                Some(NavHit::Theme) => self.send(HostInput::ToggleTheme),
                Some(NavHit::Menu) => self.open_menu(),
                None => {}
            }
            return;
        }
        let body = view::body_area(self.area());
        if body.contains(at) {
            let row = self.scroll_row() + usize::from(y - body.y);
            if let Some(target) = self.layout.link_at(row).cloned() {
                self.activate(&target);
            }
        }
    }

    fn activate(&mut self, target: &LinkTarget) {
        match target {
            LinkTarget::Url(url) => {
                let url = url.clone();
                self.open_link(&url, "link");
            }
            LinkTarget::Resume => self.open_resume(),
            LinkTarget::ContactForm => self.open_form(),
        }
    }

    fn send(&mut self, input: HostInput) {
        self.page.push(input);
        let result = self.page.step();
        self.after_step(result);
    }

    fn after_step(&mut self, result: StepResult) {
        let now = self.page.now();
        self.timeline.set_now(now);
        for id in self.reveals.reveal(&result.entries, &mut self.timeline) {
            tracing::debug!(section = %id, "section revealed");
            self.revealed_at.insert(id, now);
        }
        if result.active_changed {
            tracing::debug!(active = %self.page.state().active, "active section");
        }
    }

    fn menu_pick(&mut self, entry: MenuEntry) {
        match entry {
            MenuEntry::Section(id) => self.send(HostInput::MenuNavigate(id)),
            MenuEntry::CaseStudies => self.send(HostInput::MenuNavigate(SectionId::Projects)),
            MenuEntry::Theme => self.send(HostInput::ToggleTheme),
            MenuEntry::Resume => self.open_resume(),
        }
    }

    fn open_menu(&mut self) {
        let active = self.page.state().active;
        self.menu_cursor = self.registry().position(active).unwrap_or(0);
        self.send(HostInput::OpenMenu);
    }

    fn open_form(&mut self) {
        self.focus = Focus::Form(Field::Name);
        self.form_errors.clear();
        if self.registry().contains(SectionId::Contact) {
            self.send(HostInput::Navigate(SectionId::Contact));
        }
    }

    fn open_resume(&mut self) {
        let target = resolve_resume(&self.portfolio.profile.resume, self.content_dir.as_deref());
        self.open_link(&target, "resume");
    }

    fn open_visible_repo(&mut self) {
        let first = self.scroll_row();
        let rows = first..first + usize::from(view::body_rows(self.height));
        match self.layout.first_url_in(SectionId::Projects, rows) {
            Some(url) => {
                let url = url.to_string();
                self.open_link(&url, "repository");
            }
            None => {
                if self.registry().contains(SectionId::Projects) {
                    self.send(HostInput::Navigate(SectionId::Projects));
                }
                self.status = Some(Status::new(
                    StatusKind::Info,
                    "Press g again with a project in view to open its repository",
                ));
            }
        }
    }

    fn open_link(&mut self, target: &str, what: &str) {
        self.status = Some(match self.links.open(target) {
            Ok(()) => Status::new(StatusKind::Info, format!("Opened {what}: {target}")),
            Err(e) => {
                tracing::warn!(target, error = %e, "cannot open link");
                Status::new(StatusKind::Error, format!("Could not open {what}: {e}"))
            }
        });
    }

    fn submit(&mut self) {
        if self.pending.is_some() {
            self.status = Some(Status::new(StatusKind::Info, "Still sending…"));
            return;
        }
        match self.form.validate() {
            Err(errors) => {
                let text = errors
                    .first()
                    .map_or_else(String::new, ToString::to_string);
                self.form_errors = errors;
                self.status = Some(Status::new(StatusKind::Error, text));
            }
            Ok(submission) => {
                self.form_errors.clear();
                let endpoint = self.portfolio.contact.form_endpoint.clone();
                tracing::info!(endpoint = %endpoint, "sending contact form");
                self.pending = Some(spawn_submit(
                    Arc::clone(&self.transport),
                    endpoint,
                    submission,
                ));
                self.status = Some(Status::new(StatusKind::Info, "Sending…"));
            }
        }
    }

    /// Pick up a finished submission. Returns whether one arrived.
    pub fn poll_submission(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                Err(folio_core::contact::TransportError::Network(
                    "worker exited without a result".into(),
                ))
            }
        };
        self.pending = None;
        self.status = Some(match result {
            Ok(SubmitOutcome::Accepted) => {
                self.form.clear();
                self.focus = Focus::Page;
                Status::new(StatusKind::Success, "Message sent successfully!")
            }
            Ok(SubmitOutcome::Rejected { status }) => {
                tracing::warn!(status, "contact form not accepted");
                Status::new(StatusKind::Error, "Oops! Something went wrong.")
            }
            Err(e) => {
                tracing::warn!(error = %e, "contact form not delivered");
                Status::new(StatusKind::Error, "Oops! Something went wrong.")
            }
        });
        true
    }

    fn nth_section(&self, digit: char) -> Option<SectionId> {
        let n = digit.to_digit(10)? as usize;
        self.registry().ids().get(n.checked_sub(1)?).copied()
    }

    fn registry(&self) -> &SectionRegistry {
        self.page.controller().registry()
    }

    fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    // --- read access for the view and tests ---

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    #[must_use]
    pub fn state(&self) -> PageState {
        self.page.state()
    }

    #[must_use]
    pub fn page(&self) -> &StepPage {
        &self.page
    }

    #[must_use]
    pub fn sections(&self) -> &SectionRegistry {
        self.registry()
    }

    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    #[must_use]
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// First layout row in view.
    #[must_use]
    pub fn scroll_row(&self) -> usize {
        (self.page.document().scroll_y() / self.row_px) as usize
    }

    #[must_use]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    #[must_use]
    pub fn menu_cursor(&self) -> usize {
        self.menu_cursor
    }

    #[must_use]
    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    #[must_use]
    pub fn form_errors(&self) -> &[FieldError] {
        &self.form_errors
    }

    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn nav_pose(&self) -> Pose {
        self.timeline.pose(AnimationTarget::NavBar, 0)
    }

    /// Entrance pose of a page row.
    ///
    /// Sections not yet seen stay hidden while visibility is observed.
    #[must_use]
    pub fn line_pose(&self, line: &PageLine) -> Pose {
        if line.section == SectionId::Home {
            return self.timeline.pose(AnimationTarget::Hero, 0);
        }
        if self.page.state().observing && !self.reveals.is_revealed(line.section) {
            return Pose {
                opacity: 0.0,
                ..Pose::REST
            };
        }
        match line.child {
            None => self
                .timeline
                .pose(AnimationTarget::SectionTitle(line.section), 0),
            Some(child) => self
                .timeline
                .pose(AnimationTarget::SectionBody(line.section), child),
        }
    }

    /// Fill fraction of a skill meter row.
    #[must_use]
    pub fn meter_fill(&self, line: &PageLine) -> f32 {
        let LineKind::Meter { percent, .. } = line.kind else {
            return 0.0;
        };
        let full = f32::from(percent.min(100)) / 100.0;
        match self.revealed_at.get(&line.section) {
            Some(&at) => {
                let delay = container_stagger().delay_for(line.child.unwrap_or(0));
                meter_fill(percent)
                    .delayed_by(delay)
                    .pose_at(self.timeline.now().saturating_sub(at))
                    .scale
            }
            None if self.page.state().observing => 0.0,
            None => full,
        }
    }

    /// Whether the next frames will differ without any input: a scroll or
    /// entrance animation in flight, the hero hint bobbing, or a form post
    /// waiting for its answer.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.page.document().is_scrolling()
            || self.timeline.any_active(self.layout.max_children())
            || self.page.state().active == SectionId::Home
            || self.pending.is_some()
    }

    /// Current offset of the hero scroll hint, in host units.
    #[must_use]
    pub fn hint_offset(&self) -> f32 {
        float_bob().offset_at(self.timeline.now())
    }
}
