//! Property tests for the crossing model and geometry.

use folio_core::geometry::intersection_ratio;
use folio_core::lifecycle::{Registration, RegistrationKind};
use folio_core::tracker::{DEFAULT_THRESHOLDS, VisibilityTracker};
use folio_core::{
    ActivationPolicy, HostError, PageHost, SectionId, SectionRegistry, Span, Theme, TrackerConfig,
    Viewport, VisibilitySample,
};
use proptest::prelude::*;

/// Host that grants every registration and nothing else.
struct Granting;

impl PageHost for Granting {
    fn region(&self, _id: SectionId) -> Option<Span> {
        None
    }
    fn viewport(&self) -> Viewport {
        Viewport::default()
    }
    fn scroll_to(&mut self, _top: u32) {}
    fn set_root_theme(&mut self, _theme: Theme) {}
    fn observe_visibility(&mut self, _t: &[SectionId]) -> Result<Registration, HostError> {
        Ok(Registration::new(RegistrationKind::VisibilityObserver).0)
    }
    fn listen_scroll(&mut self) -> Result<Registration, HostError> {
        Ok(Registration::new(RegistrationKind::ScrollListener).0)
    }
    fn lock_background_scroll(&mut self) -> Registration {
        Registration::new(RegistrationKind::ScrollLock).0
    }
}

fn attached(policy: ActivationPolicy) -> VisibilityTracker {
    let mut t = VisibilityTracker::new(
        SectionRegistry::standard(),
        TrackerConfig::default().with_policy(policy),
    );
    t.attach(&mut Granting);
    t
}

fn band(r: f32) -> (usize, bool) {
    (DEFAULT_THRESHOLDS.iter().filter(|&&t| r >= t).count(), r > 0.0)
}

fn section() -> impl Strategy<Value = SectionId> {
    prop::sample::select(SectionId::ALL.to_vec())
}

proptest! {
    #[test]
    fn ratio_is_always_a_fraction(
        top in 0u32..100_000,
        height in 0u32..10_000,
        scroll in 0u32..100_000,
        vh in 0u32..5_000,
    ) {
        let r = intersection_ratio(Span::new(top, height), Viewport::new(scroll, vh));
        prop_assert!((0.0..=1.0).contains(&r));
    }

    #[test]
    fn one_entry_per_band_change(ratios in prop::collection::vec(0.0f32..=1.0, 1..60)) {
        let mut t = attached(ActivationPolicy::LastWriteWins);
        let mut expected = 0usize;
        let mut last = None;
        let mut got = 0usize;
        for r in &ratios {
            let b = band(*r);
            if last != Some(b) {
                expected += 1;
                last = Some(b);
            }
            got += t.observe([VisibilitySample::new(SectionId::About, *r)]).len();
        }
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn last_write_wins_resolves_to_last_intersecting_entry(
        batch in prop::collection::vec((section(), 0.0f32..=1.0), 1..20),
    ) {
        let mut t = attached(ActivationPolicy::LastWriteWins);
        let entries = t.observe(batch.iter().map(|&(id, r)| VisibilitySample::new(id, r)));
        let expected = entries.iter().rev().find(|e| e.is_intersecting).map(|e| e.id);
        prop_assert_eq!(t.resolve(&entries), expected);
    }

    #[test]
    fn most_visible_writes_at_most_once(
        batch in prop::collection::vec((section(), 0.0f32..=1.0), 1..20),
    ) {
        let mut t = attached(ActivationPolicy::MostVisible);
        let entries = t.observe(batch.iter().map(|&(id, r)| VisibilitySample::new(id, r)));
        let writes = t.writes(&entries);
        prop_assert!(writes.len() <= 1);
        if let Some(id) = writes.first() {
            let best = entries
                .iter()
                .filter(|e| e.is_intersecting)
                .map(|e| e.ratio)
                .fold(0.0f32, f32::max);
            prop_assert!(
                entries
                    .iter()
                    .any(|e| e.id == *id && e.is_intersecting && e.ratio == best)
            );
        }
    }
}
