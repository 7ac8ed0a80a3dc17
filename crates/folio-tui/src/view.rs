#![forbid(unsafe_code)]

//! Drawing the page with ratatui.
//!
//! Screen rows: the nav bar on top, the page body, and a one-row status bar.
//! The slide-out menu and the contact form are drawn over the body.
//! Hit areas are computed by the same functions used for drawing so mouse
//! handling and rendering agree.

use folio_core::contact::Field;
use folio_core::motion::Pose;
use folio_core::{MenuState, SectionId, SectionRegistry, Theme};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Focus, StatusKind};
use crate::layout::{LineKind, PageLine, truncate};
use crate::palette::{Palette, accent_color};

/// Row of the nav bar.
pub const NAV_ROW: u16 = 0;

/// Below this width the nav links collapse into a menu button.
pub const COMPACT_BELOW: u16 = 80;

/// Width of the slide-out menu panel.
pub const MENU_WIDTH: u16 = 30;

/// Trailing message lines kept in view while editing.
const MESSAGE_ROWS: usize = 4;

/// Rows available to the page body in a terminal `height` rows tall.
#[must_use]
pub fn body_rows(height: u16) -> u16 {
    height.saturating_sub(2).max(1)
}

#[must_use]
pub fn body_area(area: Rect) -> Rect {
    Rect::new(area.x, area.y + 1, area.width, body_rows(area.height))
}

fn status_area(area: Rect) -> Rect {
    Rect::new(
        area.x,
        area.bottom().saturating_sub(1),
        area.width,
        area.height.min(1),
    )
}

/// What a nav bar cell does when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavHit {
    Brand,
    Section(SectionId),
    Theme,
    Menu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub hit: NavHit,
    pub x: u16,
    pub width: u16,
    pub label: String,
}

/// Nav bar items for a terminal `width` cells wide, left to right.
#[must_use]
pub fn nav_items(width: u16, brand: &str, registry: &SectionRegistry) -> Vec<NavItem> {
    let mut right: Vec<(NavHit, String)> = Vec::new();
    if width >= COMPACT_BELOW {
        right.extend(
            registry
                .iter()
                .map(|id| (NavHit::Section(id), id.nav_label().to_string())),
        );
        right.push((NavHit::Theme, "◐".to_string()));
    } else {
        right.push((NavHit::Theme, "◐".to_string()));
        right.push((NavHit::Menu, "≡ menu".to_string()));
    }

    let mut items = vec![NavItem {
        hit: NavHit::Brand,
        x: 1,
        width: cell_width(brand),
        label: brand.to_string(),
    }];
    let gap = 2;
    let total: u16 = right
        .iter()
        .map(|(_, label)| cell_width(label) + gap)
        .sum::<u16>()
        .saturating_sub(gap);
    let mut x = width.saturating_sub(total + 1);
    for (hit, label) in right {
        let w = cell_width(&label);
        items.push(NavItem {
            hit,
            x,
            width: w,
            label,
        });
        x = x.saturating_add(w + gap);
    }
    items
}

fn cell_width(s: &str) -> u16 {
    u16::try_from(s.width()).unwrap_or(u16::MAX)
}

/// A selectable row of the slide-out menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Section(SectionId),
    /// Dark mode switch.
    Theme,
    /// Shortcut to the projects section.
    CaseStudies,
    Resume,
}

/// Menu rows in cursor order: the sections, then the actions.
#[must_use]
pub fn menu_entries(registry: &SectionRegistry) -> Vec<MenuEntry> {
    let mut entries: Vec<MenuEntry> = registry.iter().map(MenuEntry::Section).collect();
    entries.push(MenuEntry::Theme);
    if registry.contains(SectionId::Projects) {
        entries.push(MenuEntry::CaseStudies);
    }
    entries.push(MenuEntry::Resume);
    entries
}

/// Slide-out menu geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLayout {
    pub panel: Rect,
    pub close: Rect,
    /// Name and headline, two rows.
    pub profile: Rect,
    /// Rows that fit in the panel, in cursor order.
    pub items: Vec<(MenuEntry, Rect)>,
}

#[must_use]
pub fn menu_layout(area: Rect, registry: &SectionRegistry) -> MenuLayout {
    let width = MENU_WIDTH.min(area.width);
    // The status row stays uncovered.
    let panel = Rect::new(
        area.right() - width,
        area.y,
        width,
        area.height.saturating_sub(1),
    );
    let inner = width.saturating_sub(4);
    let close = Rect::new(panel.right().saturating_sub(4), panel.y + 1, 3, 1);
    let profile = Rect::new(panel.x + 2, panel.y + 3, inner, 2.min(panel.height));

    let entries = menu_entries(registry);
    let first = panel.y + 6;
    let room = panel.bottom().saturating_sub(1).saturating_sub(first);
    // Blank rows between entries only when everything still fits.
    let step = if usize::from(room) >= entries.len() * 2 { 2 } else { 1 };
    let items = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let y = first + step * u16::try_from(i).ok()?;
            (y < panel.bottom().saturating_sub(1))
                .then(|| (entry, Rect::new(panel.x + 2, y, inner, 1)))
        })
        .collect();
    MenuLayout {
        panel,
        close,
        profile,
        items,
    }
}

/// Contact form panel.
#[must_use]
pub fn form_area(area: Rect) -> Rect {
    let body = body_area(area);
    let width = body.width.saturating_sub(4).min(72);
    let height = body.height.min(17);
    Rect::new(
        body.x + (body.width - width) / 2,
        body.y + (body.height - height) / 2,
        width,
        height,
    )
}

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let state = app.state();
    let palette = Palette::for_theme(state.theme);
    f.render_widget(Fill(palette.base()), area);
    if area.height < 3 || area.width < 8 {
        return;
    }

    draw_body(f, app, &palette, body_area(area));
    draw_nav(f, app, &palette, area);
    draw_status(f, app, &palette, status_area(area));

    if state.menu == MenuState::Open {
        draw_menu(f, app, &palette, area);
    }
    if let Focus::Form(field) = app.focus() {
        draw_form(f, app, &palette, area, field);
    }
}

/// Dim an entering element by its opacity; `None` hides it.
fn faded(style: Style, pose: Pose) -> Option<Style> {
    if pose.opacity < 0.15 {
        None
    } else if pose.opacity < 0.75 {
        Some(style.add_modifier(Modifier::DIM))
    } else {
        Some(style)
    }
}

fn draw_nav(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let row = Rect::new(area.x, area.y + NAV_ROW, area.width, area.height.min(1));
    let state = app.state();
    let bg = if state.scrolled { p.nav_bg } else { p.bg };
    f.render_widget(Fill(Style::default().bg(bg)), row);

    let base = Style::default().fg(p.fg).bg(bg);
    let Some(base) = faded(base, app.nav_pose()) else {
        return;
    };
    let buf = f.buffer_mut();
    for item in nav_items(area.width, &app.portfolio().profile.name, app.sections()) {
        let style = match item.hit {
            NavHit::Brand => base.fg(p.accent).add_modifier(Modifier::BOLD),
            NavHit::Section(id) if id == state.active => base
                .fg(p.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            NavHit::Section(_) => base.fg(p.muted),
            NavHit::Theme | NavHit::Menu => base,
        };
        let label = match item.hit {
            NavHit::Theme => theme_glyph(state.theme).to_string(),
            _ => item.label,
        };
        buf.set_stringn(row.x + item.x, row.y, label, usize::from(item.width), style);
    }
}

fn theme_glyph(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "☾",
        Theme::Light => "☀",
    }
}

fn draw_body(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let layout = app.layout();
    let text_width = layout.text_width().min(area.width);
    let left = area.x + (area.width - text_width) / 2;
    let first = app.scroll_row();
    let hint_down = app.hint_offset() > 4.0;
    let buf = f.buffer_mut();

    for (offset, line) in layout
        .lines()
        .iter()
        .skip(first)
        .take(usize::from(area.height))
        .enumerate()
    {
        let mut y = area.y + offset as u16;
        let Some(style) = faded(line_style(line, p), app.line_pose(line)) else {
            continue;
        };
        match &line.kind {
            LineKind::Blank => {}
            LineKind::Meter { accent, .. } => {
                let fill = app.meter_fill(line);
                let bar = Meter {
                    fill,
                    label: &line.text,
                    color: accent_color(*accent),
                    empty: p.border,
                };
                bar.draw(buf, Rect::new(left, y, text_width, 1), style);
            }
            LineKind::ScrollHint => {
                if hint_down && y + 1 < area.bottom() {
                    y += 1;
                }
                let x = left + text_width.saturating_sub(cell_width(&line.text)) / 2;
                buf.set_stringn(x, y, &line.text, usize::from(text_width), style);
            }
            _ => {
                buf.set_stringn(left, y, &line.text, usize::from(text_width), style);
            }
        }
    }
}

fn line_style(line: &PageLine, p: &Palette) -> Style {
    match line.kind {
        LineKind::Hero => p.title().fg(p.accent),
        LineKind::Title => p.title(),
        LineKind::Label => p.base().add_modifier(Modifier::BOLD),
        LineKind::Subtitle | LineKind::Muted | LineKind::ScrollHint => p.dim(),
        LineKind::Link(_) => p.link(),
        LineKind::Blank | LineKind::Text | LineKind::Bullet | LineKind::Meter { .. } => p.base(),
    }
}

/// A skill meter row: bar, then the percentage label.
struct Meter<'a> {
    fill: f32,
    label: &'a str,
    color: Color,
    empty: Color,
}

impl Meter<'_> {
    fn draw(&self, buf: &mut Buffer, row: Rect, style: Style) {
        let label_w = cell_width(self.label) + 1;
        let bar = row.width.saturating_sub(label_w);
        let filled = ((f32::from(bar) * self.fill.clamp(0.0, 1.0)).round() as u16).min(bar);
        for i in 0..bar {
            let (ch, fg) = if i < filled {
                ("█", self.color)
            } else {
                ("░", self.empty)
            };
            buf.set_string(row.x + i, row.y, ch, style.fg(fg));
        }
        buf.set_stringn(
            row.x + bar + 1,
            row.y,
            self.label,
            usize::from(label_w.saturating_sub(1)),
            style,
        );
    }
}

fn draw_status(f: &mut Frame, app: &App, p: &Palette, row: Rect) {
    let base = Style::default().fg(p.muted).bg(p.panel_bg);
    f.render_widget(Fill(base), row);
    let left = match app.status() {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Info => p.fg,
                StatusKind::Success => p.success,
                StatusKind::Error => p.error,
            };
            Span::styled(status.text.clone(), base.fg(color))
        }
        None => Span::styled(
            format!("§ {}", app.state().active.nav_label()),
            base.fg(p.accent),
        ),
    };
    let hints = match (app.focus(), app.state().menu) {
        (Focus::Form(_), _) => "Tab next · Ctrl+S send · Esc close",
        (Focus::Page, MenuState::Open) => "1-7 go · ↑↓ Enter pick · Esc close",
        (Focus::Page, MenuState::Closed) => "1-7 jump · t theme · m menu · c contact · q quit",
    };
    let left_w = cell_width(&left.content);
    let buf = f.buffer_mut();
    buf.set_line(row.x + 1, row.y, &Line::from(left), row.width.saturating_sub(2));
    let hint_w = cell_width(hints);
    if left_w + hint_w + 4 <= row.width {
        buf.set_string(row.right() - hint_w - 1, row.y, hints, base);
    }
}

fn draw_menu(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    // Backdrop: the page stays visible, dimmed.
    f.buffer_mut()
        .set_style(area, Style::default().add_modifier(Modifier::DIM));
    let menu = menu_layout(area, app.sections());
    f.render_widget(Clear, menu.panel);
    f.render_widget(
        Block::default()
            .borders(Borders::LEFT)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(p.border))
            .style(Style::default().bg(p.panel_bg)),
        menu.panel,
    );

    let panel_style = Style::default().fg(p.fg).bg(p.panel_bg);
    let state = app.state();
    let buf = f.buffer_mut();
    buf.set_string(menu.panel.x + 2, menu.panel.y + 1, "menu", panel_style.fg(p.muted));
    buf.set_string(menu.close.x, menu.close.y, " ✕ ", panel_style);

    let profile = &app.portfolio().profile;
    let pw = usize::from(menu.profile.width);
    let rows = [
        (profile.name.as_str(), panel_style.fg(p.accent).add_modifier(Modifier::BOLD)),
        (profile.headline.as_str(), panel_style.fg(p.muted)),
    ];
    for (dy, (text, style)) in (0..menu.profile.height).zip(rows) {
        buf.set_stringn(menu.profile.x, menu.profile.y + dy, truncate(text, pw), pw, style);
    }

    for (i, (entry, rect)) in menu.items.iter().enumerate() {
        let mut style = panel_style;
        let label = match *entry {
            MenuEntry::Section(id) => {
                if id == state.active {
                    style = style.fg(p.accent).add_modifier(Modifier::BOLD);
                }
                format!("{}  {}", i + 1, id.nav_label())
            }
            MenuEntry::Theme => {
                let on = if state.theme == Theme::Dark { "on" } else { "off" };
                format!("{}  dark mode: {on}", theme_glyph(state.theme))
            }
            MenuEntry::CaseStudies => {
                style = style.fg(p.accent);
                "→  view case studies".to_string()
            }
            MenuEntry::Resume => "↗  view resume".to_string(),
        };
        if i == app.menu_cursor() {
            style = style.add_modifier(Modifier::REVERSED);
        }
        buf.set_stringn(rect.x, rect.y, label, usize::from(rect.width), style);
    }
}

fn draw_form(f: &mut Frame, app: &App, p: &Palette, area: Rect, focused: Field) {
    let panel = form_area(area);
    f.render_widget(Clear, panel);

    let base = Style::default().fg(p.fg).bg(p.panel_bg);
    let mut text = Vec::new();
    for field in Field::ALL {
        let label_style = if field == focused {
            base.fg(p.accent).add_modifier(Modifier::BOLD)
        } else {
            base.add_modifier(Modifier::BOLD)
        };
        text.push(Line::from(Span::styled(field.label(), label_style)));
        let value = app.form().get(field);
        if value.is_empty() && field != focused {
            text.push(Line::from(Span::styled(field.placeholder(), base.fg(p.muted))));
        } else {
            let cursor = if field == focused { "▏" } else { "" };
            let lines: Vec<&str> = value.split('\n').collect();
            let shown = lines.len().saturating_sub(MESSAGE_ROWS);
            let last = lines.len() - 1;
            for (i, line) in lines.iter().enumerate().skip(shown) {
                let lead = if i == shown { "› " } else { "  " };
                let tail = if i == last { cursor } else { "" };
                text.push(Line::from(vec![
                    Span::styled(lead, base.fg(p.muted)),
                    Span::styled(format!("{line}{tail}"), base),
                ]));
            }
        }
        text.push(Line::from(""));
    }
    for error in app.form_errors() {
        text.push(Line::from(Span::styled(error.to_string(), base.fg(p.error))));
    }
    if app.is_sending() {
        text.push(Line::from(Span::styled("Sending…", base.fg(p.muted))));
    }

    let form = Paragraph::new(Text::from(text))
        .style(base)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" Send a message ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(p.border).bg(p.panel_bg)),
        );
    f.render_widget(form, panel);
}

/// Paint every cell of an area with a style.
struct Fill(Style);

impl Widget for Fill {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                buf[(x, y)].set_char(' ').set_style(self.0);
            }
        }
    }
}
