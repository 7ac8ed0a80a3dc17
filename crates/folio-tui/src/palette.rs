#![forbid(unsafe_code)]

//! Colours for the dark and light themes.

use folio_core::Theme;
use folio_core::content::Accent;
use ratatui::style::{Color, Modifier, Style};

/// Resolved colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    /// Nav bar background once the page has scrolled.
    pub nav_bg: Color,
    pub panel_bg: Color,
    pub border: Color,
    pub error: Color,
    pub success: Color,
}

impl Palette {
    #[must_use]
    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg: Color::Rgb(10, 10, 12),
                fg: Color::Rgb(229, 231, 235),
                muted: Color::Rgb(156, 163, 175),
                accent: Color::Rgb(96, 165, 250),
                nav_bg: Color::Rgb(24, 24, 27),
                panel_bg: Color::Rgb(31, 31, 36),
                border: Color::Rgb(63, 63, 70),
                error: Color::Rgb(248, 113, 113),
                success: Color::Rgb(74, 222, 128),
            },
            Theme::Light => Self {
                bg: Color::Rgb(250, 250, 250),
                fg: Color::Rgb(17, 24, 39),
                muted: Color::Rgb(75, 85, 99),
                accent: Color::Rgb(37, 99, 235),
                nav_bg: Color::Rgb(229, 231, 235),
                panel_bg: Color::Rgb(243, 244, 246),
                border: Color::Rgb(209, 213, 219),
                error: Color::Rgb(220, 38, 38),
                success: Color::Rgb(22, 163, 74),
            },
        }
    }

    #[must_use]
    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    #[must_use]
    pub fn dim(&self) -> Style {
        Style::default().fg(self.muted).bg(self.bg)
    }

    #[must_use]
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.fg)
            .bg(self.bg)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn link(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.bg)
            .add_modifier(Modifier::UNDERLINED)
    }
}

/// Terminal colour for a content accent.
#[must_use]
pub const fn accent_color(accent: Accent) -> Color {
    match accent {
        Accent::Blue => Color::Rgb(59, 130, 246),
        Accent::Green => Color::Rgb(34, 197, 94),
        Accent::Orange => Color::Rgb(249, 115, 22),
        Accent::Cyan => Color::Rgb(6, 182, 212),
        Accent::Red => Color::Rgb(239, 68, 68),
        Accent::Purple => Color::Rgb(168, 85, 247),
        Accent::Pink => Color::Rgb(236, 72, 153),
        Accent::Yellow => Color::Rgb(234, 179, 8),
    }
}
