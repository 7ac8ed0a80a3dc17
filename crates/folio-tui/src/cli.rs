#![forbid(unsafe_code)]

//! Command-line argument parsing for the `folio` binary.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `FOLIO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

use folio_core::{ActivationPolicy, Theme};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Host units per terminal row unless overridden.
pub const DEFAULT_ROW_PX: u32 = 16;

const HELP_TEXT: &str = "\
Folio: a single-page portfolio in your terminal

USAGE:
    folio [OPTIONS]

OPTIONS:
    --theme=THEME        Start in 'dark' (default) or 'light'
    --content=PATH       Load portfolio content from a JSON file
    --policy=POLICY      Active-section policy: 'last-write-wins' (default)
                         or 'most-visible'
    --no-nav-hold        Let sections passed during a jump take the highlight
    --row-px=N           Host units per terminal row (default: 16)
    --no-mouse           Disable mouse event capture
    --exit-after-ms=N    Quit automatically after N milliseconds
    --help, -h           Show this help message
    --version, -V        Show version

SECTIONS:
    1  home
    2  about
    3  what i bring
    4  skills
    5  projects
    6  certifications
    7  contact

KEYBINDINGS:
    1-7               Jump to a section
    Tab / Shift-Tab   Next / previous section
    j k, Up Down      Scroll a line
    PgUp PgDn         Scroll a page
    Home End          Top / bottom of the page
    t                 Toggle dark / light theme
    m                 Open / close the menu
    Esc               Close the menu or leave the form
    c                 Write a message (contact form)
    Ctrl+S            Send the message (Enter adds a line)
    o                 Open the resume
    g                 Open the project repositories
    q / Ctrl+C        Quit

ENVIRONMENT VARIABLES:
    FOLIO_THEME            Override --theme
    FOLIO_CONTENT          Override --content
    FOLIO_POLICY           Override --policy
    FOLIO_NAV_HOLD         '0' to behave like --no-nav-hold
    FOLIO_ROW_PX           Override --row-px
    FOLIO_EXIT_AFTER_MS    Override --exit-after-ms
    FOLIO_LOG              Log filter (e.g. 'debug'); enables the log file
    FOLIO_LOG_FILE         Log file path (default: folio.log)
    FOLIO_LOG_FORMAT       'json' for JSON log lines";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Initial theme.
    pub theme: Theme,
    /// Content document; the embedded one when `None`.
    pub content: Option<PathBuf>,
    /// Active-section resolution policy.
    pub policy: ActivationPolicy,
    /// Keep the jumped-to section highlighted until its scroll ends.
    pub nav_hold: bool,
    /// Host units per terminal row.
    pub row_px: u32,
    /// Whether mouse events are enabled.
    pub mouse: bool,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            content: None,
            policy: ActivationPolicy::LastWriteWins,
            nav_hold: true,
            row_px: DEFAULT_ROW_PX,
            mouse: true,
            exit_after_ms: 0,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags. Prints help/version or a usage error
    /// and exits where appropriate.
    pub fn parse() -> Self {
        let lookup = |key: &str| env::var(key).ok();
        match parse_from(env::args().skip(1), lookup) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("folio {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }
}

/// Parse `args` with `env` as the environment lookup.
///
/// # Errors
///
/// A usage message for unknown arguments or invalid values.
pub fn parse_from(
    args: impl IntoIterator<Item = String>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Command, String> {
    let mut opts = Opts::default();

    // Apply environment variable defaults first
    if let Some(val) = env("FOLIO_THEME") {
        opts.theme = parse_theme(&val)?;
    }
    if let Some(val) = env("FOLIO_CONTENT")
        && !val.is_empty()
    {
        opts.content = Some(PathBuf::from(val));
    }
    if let Some(val) = env("FOLIO_POLICY") {
        opts.policy = parse_policy(&val)?;
    }
    if let Some(val) = env("FOLIO_NAV_HOLD") {
        opts.nav_hold = !matches!(val.as_str(), "0" | "false" | "off");
    }
    if let Some(val) = env("FOLIO_ROW_PX")
        && let Ok(n) = val.parse()
    {
        opts.row_px = n;
    }
    if let Some(val) = env("FOLIO_EXIT_AFTER_MS")
        && let Ok(n) = val.parse()
    {
        opts.exit_after_ms = n;
    }

    // Parse command-line args (override env vars)
    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--no-mouse" => opts.mouse = false,
            "--no-nav-hold" => opts.nav_hold = false,
            other => {
                if let Some(val) = other.strip_prefix("--theme=") {
                    opts.theme = parse_theme(val)?;
                } else if let Some(val) = other.strip_prefix("--content=") {
                    opts.content = Some(PathBuf::from(val));
                } else if let Some(val) = other.strip_prefix("--policy=") {
                    opts.policy = parse_policy(val)?;
                } else if let Some(val) = other.strip_prefix("--row-px=") {
                    opts.row_px = match val.parse() {
                        Ok(n) if n > 0 => n,
                        _ => return Err(format!("Invalid --row-px value: {val}")),
                    };
                } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                    opts.exit_after_ms = val
                        .parse()
                        .map_err(|_| format!("Invalid --exit-after-ms value: {val}"))?;
                } else {
                    return Err(format!("Unknown argument: {other}"));
                }
            }
        }
    }

    if opts.row_px == 0 {
        opts.row_px = DEFAULT_ROW_PX;
    }
    Ok(Command::Run(opts))
}

fn parse_theme(val: &str) -> Result<Theme, String> {
    Theme::from_attr(val).ok_or_else(|| format!("Invalid theme: {val} (expected dark or light)"))
}

fn parse_policy(val: &str) -> Result<ActivationPolicy, String> {
    ActivationPolicy::from_name(val).ok_or_else(|| {
        format!("Invalid policy: {val} (expected last-write-wins or most-visible)")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::SectionId;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert_eq!(opts.theme, Theme::Dark);
        assert_eq!(opts.policy, ActivationPolicy::LastWriteWins);
        assert_eq!(opts.row_px, 16);
        assert!(opts.mouse);
        assert!(opts.nav_hold);
        assert_eq!(opts.exit_after_ms, 0);
        assert!(opts.content.is_none());
    }

    #[test]
    fn flags_are_parsed() {
        let cmd = parse_from(
            args(&[
                "--theme=light",
                "--policy=most-visible",
                "--row-px=20",
                "--no-mouse",
                "--no-nav-hold",
                "--content=me.json",
            ]),
            no_env,
        )
        .unwrap();
        let Command::Run(opts) = cmd else {
            panic!("expected a run command");
        };
        assert_eq!(opts.theme, Theme::Light);
        assert_eq!(opts.policy, ActivationPolicy::MostVisible);
        assert_eq!(opts.row_px, 20);
        assert!(!opts.mouse);
        assert!(!opts.nav_hold);
        assert_eq!(opts.content, Some(PathBuf::from("me.json")));
    }

    #[test]
    fn flags_override_environment() {
        let env = |key: &str| match key {
            "FOLIO_THEME" => Some("light".to_string()),
            "FOLIO_EXIT_AFTER_MS" => Some("250".to_string()),
            "FOLIO_NAV_HOLD" => Some("0".to_string()),
            _ => None,
        };
        let Ok(Command::Run(from_env)) = parse_from(args(&[]), env) else {
            panic!("env-only parse failed");
        };
        assert_eq!(from_env.theme, Theme::Light);
        assert_eq!(from_env.exit_after_ms, 250);
        assert!(!from_env.nav_hold);

        let Ok(Command::Run(flagged)) = parse_from(args(&["--theme=dark"]), env) else {
            panic!("flag parse failed");
        };
        assert_eq!(flagged.theme, Theme::Dark);
    }

    #[test]
    fn bad_values_are_usage_errors() {
        assert!(parse_from(args(&["--theme=sepia"]), no_env).is_err());
        assert!(parse_from(args(&["--row-px=0"]), no_env).is_err());
        assert!(parse_from(args(&["--frobnicate"]), no_env).is_err());
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse_from(args(&["-h"]), no_env), Ok(Command::Help));
        assert_eq!(
            parse_from(args(&["--version", "--bogus"]), no_env),
            Ok(Command::Version)
        );
    }

    #[test]
    fn version_string_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn help_section_list_matches_registry() {
        let labels: Vec<&str> = HELP_TEXT
            .lines()
            .skip_while(|l| !l.starts_with("SECTIONS:"))
            .skip(1)
            .take_while(|l| !l.trim().is_empty())
            .map(|l| l.trim().split_once("  ").map_or("", |(_, label)| label.trim()))
            .collect();
        let expected: Vec<&str> = SectionId::ALL.iter().map(|id| id.nav_label()).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn help_text_contains_env_vars() {
        assert!(HELP_TEXT.contains("FOLIO_THEME"));
        assert!(HELP_TEXT.contains("FOLIO_LOG_FILE"));
    }
}
