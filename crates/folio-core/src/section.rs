#![forbid(unsafe_code)]

//! Section identifiers and the ordered section registry.
//!
//! The registry is the single source of truth for page structure. The
//! navigation bar renders its links from it and the visibility tracker
//! observes exactly the regions it names, so both consumers hold clones of
//! the same registry rather than separate lists.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A named, vertically stacked region of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Home,
    About,
    Strengths,
    Skills,
    Projects,
    Certifications,
    Contact,
}

impl SectionId {
    /// Every section in standard page order.
    pub const ALL: [SectionId; 7] = [
        SectionId::Home,
        SectionId::About,
        SectionId::Strengths,
        SectionId::Skills,
        SectionId::Projects,
        SectionId::Certifications,
        SectionId::Contact,
    ];

    /// Region identifier, as used for in-page anchors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Strengths => "strengths",
            Self::Skills => "skills",
            Self::Projects => "projects",
            Self::Certifications => "certifications",
            Self::Contact => "contact",
        }
    }

    /// Label shown in the slide-out menu.
    #[must_use]
    pub const fn nav_label(self) -> &'static str {
        match self {
            Self::Strengths => "what i bring",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known section identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSectionIdError {
    input: String,
}

impl fmt::Display for ParseSectionIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown section id: {:?}", self.input)
    }
}

impl std::error::Error for ParseSectionIdError {}

impl FromStr for SectionId {
    type Err = ParseSectionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ParseSectionIdError {
                input: s.to_string(),
            })
    }
}

/// Registry construction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry must name at least one section.
    Empty,
    /// A section was listed more than once.
    Duplicate(SectionId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "section registry is empty"),
            Self::Duplicate(id) => write!(f, "section {id} listed more than once"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Fixed, ordered, immutable list of sections.
///
/// Order defines navigation display order only; it says nothing about which
/// section starts out active. Cloning is cheap and every clone sees the same
/// list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRegistry {
    ids: Arc<[SectionId]>,
}

impl SectionRegistry {
    /// Registry with all seven sections in standard order.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            ids: Arc::from(SectionId::ALL.as_slice()),
        }
    }

    /// Registry with a custom order or subset.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Empty`] for an empty list and
    /// [`RegistryError::Duplicate`] if any id repeats.
    pub fn new(ids: impl IntoIterator<Item = SectionId>) -> Result<Self, RegistryError> {
        let mut list: Vec<SectionId> = Vec::new();
        for id in ids {
            if list.contains(&id) {
                return Err(RegistryError::Duplicate(id));
            }
            list.push(id);
        }
        if list.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(Self {
            ids: Arc::from(list),
        })
    }

    #[must_use]
    pub fn ids(&self) -> &[SectionId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.ids.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always false; construction rejects empty registries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: SectionId) -> bool {
        self.ids.contains(&id)
    }

    /// Display position of `id`, if registered.
    #[must_use]
    pub fn position(&self, id: SectionId) -> Option<usize> {
        self.ids.iter().position(|&s| s == id)
    }

    /// First registered section.
    #[must_use]
    pub fn first(&self) -> SectionId {
        self.ids[0]
    }

    /// Section after `id`, wrapping around.
    #[must_use]
    pub fn next(&self, id: SectionId) -> SectionId {
        match self.position(id) {
            Some(i) => self.ids[(i + 1) % self.ids.len()],
            None => self.first(),
        }
    }

    /// Section before `id`, wrapping around.
    #[must_use]
    pub fn prev(&self, id: SectionId) -> SectionId {
        match self.position(id) {
            Some(0) | None => self.ids[self.ids.len() - 1],
            Some(i) => self.ids[i - 1],
        }
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip_through_from_str() {
        for id in SectionId::ALL {
            assert_eq!(id.as_str().parse::<SectionId>(), Ok(id));
        }
        assert!("footer".parse::<SectionId>().is_err());
    }

    #[test]
    fn strengths_has_a_friendlier_menu_label() {
        assert_eq!(SectionId::Strengths.nav_label(), "what i bring");
        assert_eq!(SectionId::Projects.nav_label(), "projects");
    }

    #[test]
    fn standard_registry_is_in_page_order() {
        let reg = SectionRegistry::standard();
        assert_eq!(reg.ids(), SectionId::ALL.as_slice());
        assert_eq!(reg.first(), SectionId::Home);
    }

    #[test]
    fn duplicates_and_empty_lists_are_rejected() {
        assert_eq!(
            SectionRegistry::new([SectionId::Home, SectionId::Home]),
            Err(RegistryError::Duplicate(SectionId::Home))
        );
        assert_eq!(
            SectionRegistry::new(Vec::<SectionId>::new()),
            Err(RegistryError::Empty)
        );
    }

    #[test]
    fn clones_share_the_same_list() {
        let a = SectionRegistry::new([SectionId::Home, SectionId::Contact]).unwrap();
        let b = a.clone();
        assert!(std::ptr::eq(a.ids().as_ptr(), b.ids().as_ptr()));
    }

    #[test]
    fn next_and_prev_wrap() {
        let reg =
            SectionRegistry::new([SectionId::Home, SectionId::About, SectionId::Contact]).unwrap();
        assert_eq!(reg.next(SectionId::Contact), SectionId::Home);
        assert_eq!(reg.prev(SectionId::Home), SectionId::Contact);
        assert_eq!(reg.next(SectionId::Home), SectionId::About);
        // Unregistered ids fall back to the ends.
        assert_eq!(reg.next(SectionId::Skills), SectionId::Home);
        assert_eq!(reg.prev(SectionId::Skills), SectionId::Contact);
    }
}
