#![forbid(unsafe_code)]

//! Scroll/visibility tracking.
//!
//! Decides which section the reader is looking at without any interaction.
//! The host reports raw visibility ratios for the observed regions; the
//! tracker turns them into threshold-crossing entries and resolves a batch of
//! entries into an active-section write.
//!
//! # Crossing model
//!
//! Thresholds split `[0, 1]` into bands. A region's band is the number of
//! thresholds at or below its ratio. An [`IntersectionEntry`] is produced
//! when a region's band or its intersecting flag changes, and once for every
//! region on its first sample (initial notification). Samples that stay in
//! the same band produce nothing, so a region scrolling from 0% to 60%
//! through many ticks yields one entry per threshold crossed.
//!
//! # Batch resolution
//!
//! Under [`ActivationPolicy::LastWriteWins`] (the default) every intersecting
//! entry writes the active section in observation order, so the last one in
//! the batch wins. During very fast scrolls across short sections this can
//! report a section that is not the one nearest the viewport centre.
//! [`ActivationPolicy::MostVisible`] is an opt-in deterministic alternative.
//!
//! # Navigation hold
//!
//! A navigation scroll passes over every section between the start and the
//! destination, and each of them may cross a threshold on the way. With
//! [`TrackerConfig::hold_navigation`] set, the controller keeps the
//! requested section while such a scroll is in flight and ignores tracker
//! writes until the host reports the scroll has ended. Off by default.
//!
//! # Failure Modes
//!
//! - Observation unavailable: the tracker stays detached from visibility,
//!   logs once, and reports no entries. Navigation still updates the active
//!   section optimistically.

use crate::host::{HostError, PageHost};
use crate::lifecycle::Registration;
use crate::section::{SectionId, SectionRegistry};

/// Default visibility thresholds (fraction of region area in view).
pub const DEFAULT_THRESHOLDS: [f32; 3] = [0.2, 0.5, 0.8];

/// Default scroll offset beyond which the page counts as scrolled.
pub const DEFAULT_SCROLLED_THRESHOLD: u32 = 50;

/// How a batch of intersecting entries becomes one active section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationPolicy {
    /// Apply every intersecting entry in order; the last write wins.
    #[default]
    LastWriteWins,
    /// Pick the intersecting entry with the highest ratio (later entry on ties).
    MostVisible,
}

impl ActivationPolicy {
    /// Parse `"last-write-wins"` / `"most-visible"` (underscores accepted).
    #[must_use]
    pub fn from_name(s: &str) -> Option<Self> {
        match s.replace('_', "-").as_str() {
            "last-write-wins" | "last" => Some(Self::LastWriteWins),
            "most-visible" | "visible" => Some(Self::MostVisible),
            _ => None,
        }
    }
}

/// Tracker configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Band edges, ascending, each in `(0, 1]`.
    pub thresholds: Vec<f32>,
    /// `is_scrolled` becomes true once the scroll offset exceeds this.
    pub scrolled_threshold: u32,
    /// Batch resolution policy.
    pub policy: ActivationPolicy,
    /// Keep the navigated-to section active until its scroll ends.
    pub hold_navigation: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            scrolled_threshold: DEFAULT_SCROLLED_THRESHOLD,
            policy: ActivationPolicy::default(),
            hold_navigation: false,
        }
    }
}

impl TrackerConfig {
    /// Replace the thresholds. Values are clamped to `[0, 1]`, sorted and
    /// deduplicated; NaN values are dropped.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: impl IntoIterator<Item = f32>) -> Self {
        let mut t: Vec<f32> = thresholds
            .into_iter()
            .filter(|v| !v.is_nan())
            .map(|v| v.clamp(0.0, 1.0))
            .collect();
        t.sort_by(f32::total_cmp);
        t.dedup();
        self.thresholds = t;
        self
    }

    #[must_use]
    pub fn with_scrolled_threshold(mut self, px: u32) -> Self {
        self.scrolled_threshold = px;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ActivationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_navigation_hold(mut self, hold: bool) -> Self {
        self.hold_navigation = hold;
        self
    }

    fn band(&self, ratio: f32) -> usize {
        self.thresholds.iter().filter(|&&t| ratio >= t).count()
    }
}

/// Raw visibility measurement reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilitySample {
    pub id: SectionId,
    /// Fraction of the region inside the viewport.
    pub ratio: f32,
}

impl VisibilitySample {
    #[must_use]
    pub const fn new(id: SectionId, ratio: f32) -> Self {
        Self { id, ratio }
    }
}

/// A threshold crossing for one region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub id: SectionId,
    pub ratio: f32,
    pub is_intersecting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Band {
    index: usize,
    intersecting: bool,
}

/// Visibility and scroll-offset tracker.
#[derive(Debug)]
pub struct VisibilityTracker {
    config: TrackerConfig,
    registry: SectionRegistry,
    /// Last band per registry slot.
    bands: Vec<Option<Band>>,
    observer: Option<Registration>,
    listener: Option<Registration>,
    scrolled: bool,
}

impl VisibilityTracker {
    /// A tracker that is not attached to any host.
    #[must_use]
    pub fn new(registry: SectionRegistry, config: TrackerConfig) -> Self {
        let bands = vec![None; registry.len()];
        Self {
            config,
            registry,
            bands,
            observer: None,
            listener: None,
            scrolled: false,
        }
    }

    /// Register the visibility observer and scroll listener with `host`.
    ///
    /// Failures degrade the tracker instead of failing the mount.
    pub fn attach<H: PageHost + ?Sized>(&mut self, host: &mut H) {
        self.detach();
        match host.observe_visibility(self.registry.ids()) {
            Ok(reg) => self.observer = Some(reg),
            Err(err) => {
                tracing::warn!(%err, "visibility tracking degraded; only navigation updates the active section");
            }
        }
        match host.listen_scroll() {
            Ok(reg) => self.listener = Some(reg),
            Err(err) => tracing::warn!(%err, "scroll offset tracking unavailable"),
        }
        self.scrolled = host.viewport().scroll_y > self.config.scrolled_threshold;
    }

    /// Release every host registration and forget band history.
    pub fn detach(&mut self) {
        self.observer = None;
        self.listener = None;
        self.bands.iter_mut().for_each(|b| *b = None);
    }

    /// Whether visibility observation is live.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.observer.as_ref().is_some_and(Registration::is_live)
    }

    /// Whether the scroll listener is live.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listener.as_ref().is_some_and(Registration::is_live)
    }

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    /// Record a new scroll offset. Returns `true` if `is_scrolled` flipped.
    pub fn on_scroll(&mut self, scroll_y: u32) -> bool {
        if !self.is_listening() {
            return false;
        }
        let scrolled = scroll_y > self.config.scrolled_threshold;
        let flipped = scrolled != self.scrolled;
        self.scrolled = scrolled;
        flipped
    }

    /// Convert raw samples into crossing entries, in sample order.
    ///
    /// Samples for unregistered sections are ignored. Returns nothing while
    /// observation is unavailable.
    pub fn observe(
        &mut self,
        samples: impl IntoIterator<Item = VisibilitySample>,
    ) -> Vec<IntersectionEntry> {
        if !self.is_observing() {
            return Vec::new();
        }
        let mut entries = Vec::new();
        for sample in samples {
            let Some(slot) = self.registry.position(sample.id) else {
                continue;
            };
            let ratio = if sample.ratio.is_nan() {
                0.0
            } else {
                sample.ratio.clamp(0.0, 1.0)
            };
            let band = Band {
                index: self.config.band(ratio),
                intersecting: ratio > 0.0,
            };
            if self.bands[slot] != Some(band) {
                self.bands[slot] = Some(band);
                tracing::trace!(id = %sample.id, ratio, band = band.index, "visibility crossing");
                entries.push(IntersectionEntry {
                    id: sample.id,
                    ratio,
                    is_intersecting: band.intersecting,
                });
            }
        }
        entries
    }

    /// The sequence of active-section writes a batch produces.
    ///
    /// Under last-write-wins this is every intersecting entry in order;
    /// under most-visible it is at most one write.
    #[must_use]
    pub fn writes(&self, entries: &[IntersectionEntry]) -> Vec<SectionId> {
        let intersecting = entries.iter().filter(|e| e.is_intersecting);
        match self.config.policy {
            ActivationPolicy::LastWriteWins => intersecting.map(|e| e.id).collect(),
            ActivationPolicy::MostVisible => intersecting
                .fold(None::<&IntersectionEntry>, |best, e| match best {
                    Some(b) if b.ratio > e.ratio => Some(b),
                    _ => Some(e),
                })
                .map(|e| e.id)
                .into_iter()
                .collect(),
        }
    }

    /// The section a batch resolves to, if any entry intersects.
    #[must_use]
    pub fn resolve(&self, entries: &[IntersectionEntry]) -> Option<SectionId> {
        self.writes(entries).last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::RegistrationHandle;
    use pretty_assertions::assert_eq;

    fn live_tracker(policy: ActivationPolicy) -> (VisibilityTracker, RegistrationHandle) {
        let mut t = VisibilityTracker::new(
            SectionRegistry::standard(),
            TrackerConfig::default().with_policy(policy),
        );
        let (reg, handle) = Registration::new(crate::lifecycle::RegistrationKind::VisibilityObserver);
        t.observer = Some(reg);
        let (listener, _) = Registration::new(crate::lifecycle::RegistrationKind::ScrollListener);
        t.listener = Some(listener);
        (t, handle)
    }

    #[test]
    fn first_sample_is_always_reported() {
        let (mut t, _h) = live_tracker(ActivationPolicy::LastWriteWins);
        let entries = t.observe([
            VisibilitySample::new(SectionId::Home, 1.0),
            VisibilitySample::new(SectionId::About, 0.0),
        ]);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_intersecting);
        assert!(!entries[1].is_intersecting);
    }

    #[test]
    fn ticks_inside_one_band_are_silent() {
        let (mut t, _h) = live_tracker(ActivationPolicy::LastWriteWins);
        t.observe([VisibilitySample::new(SectionId::About, 0.55)]);
        for r in [0.56, 0.6, 0.7, 0.79] {
            assert!(t.observe([VisibilitySample::new(SectionId::About, r)]).is_empty());
        }
        assert_eq!(t.observe([VisibilitySample::new(SectionId::About, 0.8)]).len(), 1);
    }

    #[test]
    fn leaving_the_viewport_is_a_crossing() {
        let (mut t, _h) = live_tracker(ActivationPolicy::LastWriteWins);
        t.observe([VisibilitySample::new(SectionId::Skills, 0.1)]);
        let out = t.observe([VisibilitySample::new(SectionId::Skills, 0.0)]);
        assert_eq!(out.len(), 1);
        assert!(!out[0].is_intersecting);
    }

    #[test]
    fn last_write_wins_takes_the_last_intersecting_entry() {
        let (mut t, _h) = live_tracker(ActivationPolicy::LastWriteWins);
        let entries = t.observe([
            VisibilitySample::new(SectionId::About, 0.9),
            VisibilitySample::new(SectionId::Strengths, 0.25),
            VisibilitySample::new(SectionId::Skills, 0.0),
        ]);
        assert_eq!(
            t.writes(&entries),
            vec![SectionId::About, SectionId::Strengths]
        );
        assert_eq!(t.resolve(&entries), Some(SectionId::Strengths));
    }

    #[test]
    fn most_visible_picks_highest_ratio() {
        let (mut t, _h) = live_tracker(ActivationPolicy::MostVisible);
        let entries = t.observe([
            VisibilitySample::new(SectionId::About, 0.9),
            VisibilitySample::new(SectionId::Strengths, 0.25),
        ]);
        assert_eq!(t.writes(&entries), vec![SectionId::About]);
    }

    #[test]
    fn dead_observer_reports_nothing() {
        let (mut t, _h) = live_tracker(ActivationPolicy::LastWriteWins);
        t.observer = None;
        assert!(t.observe([VisibilitySample::new(SectionId::Home, 1.0)]).is_empty());
    }

    #[test]
    fn scrolled_flag_flips_past_threshold_only() {
        let (mut t, _h) = live_tracker(ActivationPolicy::LastWriteWins);
        assert!(!t.on_scroll(50));
        assert!(!t.is_scrolled());
        assert!(t.on_scroll(51));
        assert!(t.is_scrolled());
        assert!(!t.on_scroll(400));
        assert!(t.on_scroll(0));
    }

    #[test]
    fn unregistered_samples_are_ignored() {
        let mut t = VisibilityTracker::new(
            SectionRegistry::new([SectionId::Home, SectionId::Contact]).unwrap(),
            TrackerConfig::default(),
        );
        let (reg, _h) = Registration::new(crate::lifecycle::RegistrationKind::VisibilityObserver);
        t.observer = Some(reg);
        let out = t.observe([VisibilitySample::new(SectionId::Skills, 1.0)]);
        assert!(out.is_empty());
    }

    #[test]
    fn thresholds_are_normalized() {
        let c = TrackerConfig::default().with_thresholds([0.8, f32::NAN, 1.5, 0.2, 0.2]);
        assert_eq!(c.thresholds, vec![0.2, 0.8, 1.0]);
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!(
            ActivationPolicy::from_name("most_visible"),
            Some(ActivationPolicy::MostVisible)
        );
        assert_eq!(
            ActivationPolicy::from_name("last-write-wins"),
            Some(ActivationPolicy::LastWriteWins)
        );
        assert_eq!(ActivationPolicy::from_name("centre"), None);
    }
}
