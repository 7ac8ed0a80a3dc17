#![forbid(unsafe_code)]

//! Page layout: content flattened into word-wrapped terminal rows.
//!
//! Sections are laid out top to bottom in registry order. Each section owns a
//! contiguous run of rows, so its rendered region is `rows × row_px` host
//! units starting at `first_row × row_px`.

use std::ops::Range;

use folio_core::content::{Accent, MAX_DOTS, Portfolio};
use folio_core::{SectionId, SectionRegistry, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest the text column gets, in cells.
pub const MAX_CONTENT_WIDTH: u16 = 96;

/// Something a row can open when activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// An external address.
    Url(String),
    /// The profile's resume document.
    Resume,
    /// The in-app contact form.
    ContactForm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    /// The hero greeting.
    Hero,
    Title,
    Subtitle,
    Label,
    Text,
    Bullet,
    Muted,
    /// A skill meter; the row text is the percentage label.
    Meter { percent: u8, accent: Accent },
    Link(LinkTarget),
    /// Bobbing "scroll down" hint under the hero.
    ScrollHint,
}

/// One terminal row of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLine {
    pub section: SectionId,
    pub kind: LineKind,
    pub text: String,
    /// Staggered child of the section body; `None` for headings and the hero.
    pub child: Option<usize>,
}

/// The whole page as rows.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    lines: Vec<PageLine>,
    sections: Vec<(SectionId, Range<usize>)>,
    width: u16,
}

impl PageLayout {
    /// Lay out `portfolio` for a terminal `width` cells wide.
    ///
    /// The home section is padded to at least `min_home_rows` so the hero
    /// fills the first screen.
    #[must_use]
    pub fn build(
        portfolio: &Portfolio,
        registry: &SectionRegistry,
        width: u16,
        min_home_rows: usize,
    ) -> Self {
        let text_width = content_width(width);
        let mut lines = Vec::new();
        let mut sections = Vec::with_capacity(registry.len());
        for id in registry.iter() {
            let start = lines.len();
            let mut b = SectionBuilder::new(id, usize::from(text_width));
            match id {
                SectionId::Home => b.home(portfolio, min_home_rows),
                SectionId::About => b.about(portfolio),
                SectionId::Strengths => b.strengths(portfolio),
                SectionId::Skills => b.skills(portfolio),
                SectionId::Projects => b.projects(portfolio),
                SectionId::Certifications => b.certifications(portfolio),
                SectionId::Contact => b.contact(portfolio),
            }
            if b.lines.is_empty() {
                b.blank();
            }
            lines.extend(b.lines);
            sections.push((id, start..lines.len()));
        }
        Self {
            lines,
            sections,
            width,
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[PageLine] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Terminal width this layout was built for.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Text column width in cells.
    #[must_use]
    pub fn text_width(&self) -> u16 {
        content_width(self.width)
    }

    /// Rows owned by `id`.
    #[must_use]
    pub fn section_rows(&self, id: SectionId) -> Option<Range<usize>> {
        self.sections
            .iter()
            .find(|(s, _)| *s == id)
            .map(|(_, rows)| rows.clone())
    }

    /// Rendered region of every section, in host units.
    #[must_use]
    pub fn regions(&self, row_px: u32) -> Vec<(SectionId, Span)> {
        self.sections
            .iter()
            .map(|(id, rows)| {
                let top = to_u32(rows.start).saturating_mul(row_px);
                let height = to_u32(rows.len()).saturating_mul(row_px);
                (*id, Span::new(top, height))
            })
            .collect()
    }

    /// Largest staggered child index plus one.
    #[must_use]
    pub fn max_children(&self) -> usize {
        self.lines
            .iter()
            .filter_map(|l| l.child)
            .max()
            .map_or(0, |c| c + 1)
    }

    /// Link on `row`, if any.
    #[must_use]
    pub fn link_at(&self, row: usize) -> Option<&LinkTarget> {
        match &self.lines.get(row)?.kind {
            LineKind::Link(target) => Some(target),
            _ => None,
        }
    }

    /// First external link of `section` within `rows`.
    #[must_use]
    pub fn first_url_in(&self, section: SectionId, rows: Range<usize>) -> Option<&str> {
        let end = rows.end.min(self.lines.len());
        self.lines
            .get(rows.start.min(end)..end)?
            .iter()
            .filter(|l| l.section == section)
            .find_map(|l| match &l.kind {
                LineKind::Link(LinkTarget::Url(url)) => Some(url.as_str()),
                _ => None,
            })
    }
}

fn content_width(width: u16) -> u16 {
    width.saturating_sub(4).clamp(1, MAX_CONTENT_WIDTH)
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Word-wrap `text` to `width` cells. Words wider than a line are split.
#[must_use]
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    let mut line = String::new();
    let mut line_w = 0;
    for word in text.split_whitespace() {
        let word_w = word.width();
        let sep = usize::from(!line.is_empty());
        if line_w + sep + word_w <= width {
            if sep == 1 {
                line.push(' ');
            }
            line.push_str(word);
            line_w += sep + word_w;
            continue;
        }
        if !line.is_empty() {
            out.push(std::mem::take(&mut line));
            line_w = 0;
        }
        if word_w <= width {
            line.push_str(word);
            line_w = word_w;
            continue;
        }
        for ch in word.chars() {
            let ch_w = ch.width().unwrap_or(0);
            if line_w + ch_w > width && !line.is_empty() {
                out.push(std::mem::take(&mut line));
                line_w = 0;
            }
            line.push(ch);
            line_w += ch_w;
        }
    }
    if !line.is_empty() || out.is_empty() {
        out.push(line);
    }
    out
}

/// Cut `text` to at most `width` cells, marking the cut with `…`.
#[must_use]
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    if width > 0 {
        out.push('…');
    }
    out
}

struct SectionBuilder {
    id: SectionId,
    width: usize,
    child: Option<usize>,
    lines: Vec<PageLine>,
}

impl SectionBuilder {
    fn new(id: SectionId, width: usize) -> Self {
        Self {
            id,
            width,
            child: None,
            lines: Vec::new(),
        }
    }

    fn line(&mut self, kind: LineKind, text: impl Into<String>) {
        self.lines.push(PageLine {
            section: self.id,
            kind,
            text: text.into(),
            child: self.child,
        });
    }

    fn blank(&mut self) {
        self.line(LineKind::Blank, "");
    }

    fn para(&mut self, kind: LineKind, text: &str) {
        for row in wrap(text, self.width) {
            self.line(kind.clone(), row);
        }
    }

    /// Link rows are never wrapped; overlong text is cut with an ellipsis.
    fn link(&mut self, target: LinkTarget, text: &str) {
        let text = truncate(text, self.width);
        self.line(LineKind::Link(target), text);
    }

    /// Wrapped with a hanging indent after `marker`.
    fn bullet(&mut self, marker: &str, text: &str) {
        let indent = marker.width();
        let rows = wrap(text, self.width.saturating_sub(indent));
        for (i, row) in rows.into_iter().enumerate() {
            let lead = if i == 0 {
                marker.to_string()
            } else {
                " ".repeat(indent)
            };
            self.line(LineKind::Bullet, format!("{lead}{row}"));
        }
    }

    fn next_child(&mut self) {
        self.child = Some(self.child.map_or(0, |c| c + 1));
    }

    fn heading(&mut self, portfolio: &Portfolio) {
        self.child = None;
        let (title, subtitle) = portfolio.heading(self.id);
        self.para(LineKind::Title, &title);
        if let Some(sub) = subtitle {
            self.para(LineKind::Subtitle, sub);
        }
        self.blank();
    }

    fn home(&mut self, p: &Portfolio, min_rows: usize) {
        let profile = &p.profile;
        self.blank();
        self.para(LineKind::Hero, &format!("Hi, I'm {}", profile.name));
        self.para(LineKind::Text, &profile.headline);
        self.para(LineKind::Muted, &profile.tagline);
        self.blank();
        self.para(LineKind::Text, &profile.summary);
        if !p.quick_proof.is_empty() {
            self.blank();
            for proof in &p.quick_proof {
                self.bullet("▸ ", &format!("{}: {}", proof.label, proof.value));
            }
        }
        self.blank();
        self.link(LinkTarget::Resume, "[o] Download resume");
        self.link(LinkTarget::ContactForm, "[c] Contact me");
        while self.lines.len() + 2 < min_rows {
            self.blank();
        }
        self.line(LineKind::ScrollHint, "⌄ scroll");
        self.blank();
    }

    fn about(&mut self, p: &Portfolio) {
        let about = &p.about;
        self.heading(p);
        self.next_child();
        self.para(LineKind::Text, &about.summary);
        self.blank();

        self.next_child();
        let edu = &about.education;
        self.line(LineKind::Label, "Education");
        self.para(LineKind::Text, &format!("{}, {}", edu.degree, edu.field));
        self.para(LineKind::Muted, &edu.institution);
        if let Some(spec) = &edu.specialization {
            self.para(LineKind::Muted, &format!("Specialization: {spec}"));
        }
        self.blank();

        self.next_child();
        self.line(LineKind::Label, "What I enjoy");
        self.para(LineKind::Text, &about.enjoys);
        self.blank();

        if !about.focus.is_empty() {
            self.next_child();
            self.line(LineKind::Label, "Current focus");
            for item in &about.focus {
                self.bullet("• ", item);
            }
            self.blank();
        }
    }

    fn strengths(&mut self, p: &Portfolio) {
        let s = &p.strengths;
        self.heading(p);
        self.next_child();
        for item in &s.core {
            self.bullet("✓ ", item);
        }
        self.blank();
        if !s.roles.is_empty() {
            self.next_child();
            self.line(LineKind::Label, "Roles I'm targeting");
            self.para(LineKind::Text, &s.roles.join(" · "));
            self.blank();
        }
        if let Some(note) = &s.note {
            self.next_child();
            self.para(LineKind::Muted, note);
            self.blank();
        }
    }

    fn skills(&mut self, p: &Portfolio) {
        self.heading(p);
        for skill in &p.skills {
            self.next_child();
            self.para(
                LineKind::Label,
                &format!("{}  ·  {}", skill.name, skill.proficiency.label()),
            );
            let filled = skill.dots.min(MAX_DOTS);
            let dots: String = (0..MAX_DOTS)
                .map(|i| if i < filled { '●' } else { '○' })
                .collect();
            self.para(LineKind::Text, &format!("{dots}  {}", skill.description));
            self.line(
                LineKind::Meter {
                    percent: skill.percent,
                    accent: skill.accent,
                },
                format!("{}%", skill.percent),
            );
            self.blank();
        }
        for group in &p.skill_groups {
            self.next_child();
            self.line(LineKind::Label, group.title.clone());
            self.para(LineKind::Text, &group.summary);
            if !group.tags.is_empty() {
                self.para(LineKind::Muted, &group.tags.join(" · "));
            }
            self.blank();
        }
    }

    fn projects(&mut self, p: &Portfolio) {
        self.heading(p);
        for project in &p.projects {
            self.next_child();
            self.para(LineKind::Label, &project.title);
            self.para(
                LineKind::Muted,
                &format!("{} · {}", project.duration, project.client),
            );
            self.para(LineKind::Text, &format!("Problem: {}", project.problem));
            self.para(LineKind::Text, &format!("Objective: {}", project.objective));
            if !project.approach.is_empty() {
                self.line(LineKind::Label, "Approach");
                for step in &project.approach {
                    self.bullet("• ", step);
                }
            }
            if !project.impact.is_empty() {
                self.line(LineKind::Label, "Impact");
                for item in &project.impact {
                    self.bullet("✓ ", item);
                }
            }
            if !project.architecture.is_empty() {
                self.line(LineKind::Label, "Architecture");
                self.para(LineKind::Text, &project.architecture.join(" → "));
            }
            if !project.tech.is_empty() {
                self.para(LineKind::Muted, &format!("Tech: {}", project.tech.join(", ")));
            }
            self.link(
                LinkTarget::Url(project.repo.clone()),
                &format!("↗ {}", project.repo),
            );
            self.blank();
        }
    }

    fn certifications(&mut self, p: &Portfolio) {
        self.heading(p);
        for cert in &p.certifications {
            self.next_child();
            self.para(LineKind::Label, &cert.title);
            self.para(LineKind::Muted, &cert.detail);
            self.link(LinkTarget::Url(cert.url.clone()), "↗ View credential");
            self.blank();
        }
    }

    fn contact(&mut self, p: &Portfolio) {
        let c = &p.contact;
        self.heading(p);
        self.next_child();
        self.para(LineKind::Text, &c.pitch);
        self.blank();

        self.next_child();
        self.link(
            LinkTarget::Url(format!("mailto:{}", c.email)),
            &format!("✉ {}", c.email),
        );
        if let Some(phone) = &c.phone {
            self.line(LineKind::Text, format!("☎ {phone}"));
        }
        if let Some(location) = &c.location {
            self.line(LineKind::Muted, format!("⌖ {location}"));
        }
        for url in [&c.github, &c.linkedin].into_iter().flatten() {
            self.link(LinkTarget::Url(url.clone()), &format!("↗ {url}"));
        }
        self.blank();

        self.next_child();
        self.link(LinkTarget::ContactForm, "[c] Send a message");
        if let Some(tip) = &c.tip {
            self.para(LineKind::Muted, tip);
        }
        self.blank();

        if !p.profile.footer.is_empty() {
            self.next_child();
            self.para(LineKind::Muted, &p.profile.footer);
        }
    }
}
