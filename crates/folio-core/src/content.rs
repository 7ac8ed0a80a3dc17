#![forbid(unsafe_code)]

//! Static portfolio content.
//!
//! Content is data, not code: a JSON document deserialized with serde. A
//! default document is embedded in the binary; a user document can replace
//! it at startup. Both go through the same validation.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::section::SectionId;

const BUILTIN: &str = include_str!("../content/portfolio.json");

/// Maximum number of proficiency dots a skill can show.
pub const MAX_DOTS: u8 = 5;

/// Content loading or validation failure.
#[derive(Debug)]
pub enum ContentError {
    Io { path: PathBuf, source: io::Error },
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse(err) => write!(f, "malformed content: {err}"),
            Self::Invalid(msg) => write!(f, "invalid content: {msg}"),
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Accent colour name for cards and meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    #[default]
    Blue,
    Green,
    Orange,
    Cyan,
    Red,
    Purple,
    Pink,
    Yellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
}

impl Proficiency {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub headline: String,
    pub tagline: String,
    pub summary: String,
    /// Opaque profile image reference.
    pub image: String,
    /// Opaque resume document reference.
    pub resume: String,
    #[serde(default)]
    pub footer: String,
}

/// Title and optional subtitle for a section heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub id: SectionId,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPoint {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub field: String,
    pub institution: String,
    #[serde(default)]
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct About {
    pub summary: String,
    pub education: Education,
    pub enjoys: String,
    #[serde(default)]
    pub focus: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strengths {
    pub core: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub proficiency: Proficiency,
    pub description: String,
    #[serde(default)]
    pub accent: Accent,
    /// Filled dots out of [`MAX_DOTS`].
    pub dots: u8,
    /// Confidence meter, 0–100.
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One project case study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub duration: String,
    pub client: String,
    pub problem: String,
    pub objective: String,
    #[serde(default)]
    pub approach: Vec<String>,
    #[serde(default)]
    pub impact: Vec<String>,
    /// Pipeline stages, drawn top to bottom.
    pub architecture: Vec<String>,
    #[serde(default)]
    pub tech: Vec<String>,
    pub repo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub title: String,
    pub detail: String,
    pub url: String,
    #[serde(default)]
    pub accent: Accent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub pitch: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    /// Third-party endpoint the contact form posts to.
    pub form_endpoint: String,
    #[serde(default)]
    pub tip: Option<String>,
}

/// The whole page's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub profile: Profile,
    #[serde(default)]
    pub headings: Vec<Heading>,
    #[serde(default)]
    pub quick_proof: Vec<ProofPoint>,
    pub about: About,
    pub strengths: Strengths,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub skill_groups: Vec<SkillGroup>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    pub contact: Contact,
}

impl Portfolio {
    /// The embedded default content.
    ///
    /// # Errors
    ///
    /// Only if the embedded document is broken, which the test suite rules
    /// out.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json(BUILTIN)
    }

    /// Read and validate a JSON document from disk.
    ///
    /// # Errors
    ///
    /// [`ContentError::Io`] if the file cannot be read, otherwise as
    /// [`Portfolio::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let portfolio = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), "loaded portfolio content");
        Ok(portfolio)
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// [`ContentError::Parse`] for malformed JSON, [`ContentError::Invalid`]
    /// when a value is out of range.
    pub fn from_json(text: &str) -> Result<Self, ContentError> {
        let portfolio: Portfolio = serde_json::from_str(text)?;
        portfolio.validate()?;
        Ok(portfolio)
    }

    /// Heading for `id`. Sections without an explicit heading use their id.
    #[must_use]
    pub fn heading(&self, id: SectionId) -> (String, Option<&str>) {
        match self.headings.iter().find(|h| h.id == id) {
            Some(h) => (h.title.clone(), h.subtitle.as_deref()),
            None => (capitalize(id.as_str()), None),
        }
    }

    fn validate(&self) -> Result<(), ContentError> {
        if self.profile.name.trim().is_empty() {
            return Err(invalid("profile.name is empty"));
        }
        for skill in &self.skills {
            if skill.dots > MAX_DOTS {
                return Err(invalid(format!(
                    "skill {:?} has {} dots (max {MAX_DOTS})",
                    skill.name, skill.dots
                )));
            }
            if skill.percent > 100 {
                return Err(invalid(format!(
                    "skill {:?} has percent {} (max 100)",
                    skill.name, skill.percent
                )));
            }
        }
        for project in &self.projects {
            if project.architecture.is_empty() {
                return Err(invalid(format!(
                    "project {:?} has no architecture stages",
                    project.title
                )));
            }
            check_url("project repo", &project.repo)?;
        }
        for cert in &self.certifications {
            check_url("certification url", &cert.url)?;
        }
        for link in [&self.contact.github, &self.contact.linkedin]
            .into_iter()
            .flatten()
        {
            check_url("contact link", link)?;
        }
        check_url("contact.form_endpoint", &self.contact.form_endpoint)?;
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ContentError {
    ContentError::Invalid(msg.into())
}

fn check_url(what: &str, raw: &str) -> Result<(), ContentError> {
    let url = Url::parse(raw).map_err(|e| invalid(format!("{what} {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("{what} {raw:?}: unsupported scheme {other}"))),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
