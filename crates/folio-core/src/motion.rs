#![forbid(unsafe_code)]

//! Declarative motion descriptors.
//!
//! The core does not animate anything itself. It describes *what* should
//! animate (a [`Variant`]: hidden pose, shown pose, transition) and hands an
//! [`AnimationRequest`] to an [`Animator`] supplied by the frontend. The
//! only contract is that the request is made; how it is drawn is up to the
//! frontend. [`Timeline`] is a ready-made animator that frontends can sample
//! for poses.
//!
//! Times are [`Duration`]s on the host clock.

use std::collections::HashMap;
use std::time::Duration;

use crate::section::SectionId;
use crate::tracker::IntersectionEntry;

// ---------------------------------------------------------------------------
// Easing
// ---------------------------------------------------------------------------

/// Easing curve for tweens. Maps `t` in `[0, 1]` to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// How a variant moves from hidden to shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Fixed-duration interpolation.
    Tween {
        duration: Duration,
        easing: Easing,
        delay: Duration,
    },
    /// Damped spring released from rest at 0 toward 1.
    Spring {
        stiffness: f32,
        damping: f32,
        mass: f32,
        delay: Duration,
    },
}

/// Residual displacement at which a spring counts as settled.
const SPRING_REST: f64 = 1e-3;

impl Transition {
    #[must_use]
    pub const fn tween(duration: Duration, easing: Easing) -> Self {
        Self::Tween {
            duration,
            easing,
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn spring(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self::Spring {
            stiffness,
            damping,
            mass,
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        match *self {
            Self::Tween { delay, .. } | Self::Spring { delay, .. } => delay,
        }
    }

    /// Same transition with an extra start delay.
    #[must_use]
    pub fn delayed_by(mut self, extra: Duration) -> Self {
        match &mut self {
            Self::Tween { delay, .. } | Self::Spring { delay, .. } => {
                *delay = delay.saturating_add(extra);
            }
        }
        self
    }

    /// Progress at `elapsed` since the request. `0.0` during the delay,
    /// `1.0` once finished. Springs may briefly overshoot `1.0`.
    #[must_use]
    pub fn progress(&self, elapsed: Duration) -> f32 {
        let Some(t) = elapsed.checked_sub(self.delay()) else {
            return 0.0;
        };
        match *self {
            Self::Tween {
                duration, easing, ..
            } => {
                if duration.is_zero() {
                    return 1.0;
                }
                easing.apply((t.as_secs_f64() / duration.as_secs_f64()) as f32)
            }
            Self::Spring {
                stiffness,
                damping,
                mass,
                ..
            } => spring_response(stiffness, damping, mass, t.as_secs_f64()) as f32,
        }
    }

    /// Time after which the transition is done, delay included.
    #[must_use]
    pub fn settle_time(&self) -> Duration {
        let body = match *self {
            Self::Tween { duration, .. } => duration,
            Self::Spring {
                stiffness,
                damping,
                mass,
                ..
            } => {
                let (omega, zeta) = spring_params(stiffness, damping, mass);
                let decay = if zeta <= 1.0 {
                    zeta * omega
                } else {
                    omega * (zeta - (zeta * zeta - 1.0).sqrt())
                };
                if decay <= 0.0 {
                    Duration::MAX
                } else {
                    Duration::from_secs_f64((1.0 / SPRING_REST).ln() / decay)
                }
            }
        };
        self.delay().saturating_add(body)
    }

    #[must_use]
    pub fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.settle_time()
    }
}

fn spring_params(stiffness: f32, damping: f32, mass: f32) -> (f64, f64) {
    let k = f64::from(stiffness.max(f32::EPSILON));
    let m = f64::from(mass.max(f32::EPSILON));
    let c = f64::from(damping.max(0.0));
    let omega = (k / m).sqrt();
    let zeta = c / (2.0 * (k * m).sqrt());
    (omega, zeta)
}

/// Displacement of a unit step response for a damped spring at time `t`.
fn spring_response(stiffness: f32, damping: f32, mass: f32, t: f64) -> f64 {
    let (omega, zeta) = spring_params(stiffness, damping, mass);
    if (zeta - 1.0).abs() < 1e-9 {
        1.0 - (-omega * t).exp() * (1.0 + omega * t)
    } else if zeta < 1.0 {
        let wd = omega * (1.0 - zeta * zeta).sqrt();
        let envelope = (-zeta * omega * t).exp();
        1.0 - envelope * ((wd * t).cos() + (zeta * omega / wd) * (wd * t).sin())
    } else {
        let root = (zeta * zeta - 1.0).sqrt();
        let r1 = -omega * (zeta - root);
        let r2 = -omega * (zeta + root);
        1.0 - (r2 * (r1 * t).exp() - r1 * (r2 * t).exp()) / (r2 - r1)
    }
}

// ---------------------------------------------------------------------------
// Poses and variants
// ---------------------------------------------------------------------------

/// Visual state of an animated element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub opacity: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale: f32,
}

impl Pose {
    /// Fully shown, in place.
    pub const REST: Pose = Pose {
        opacity: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
    };

    /// Interpolate toward `to`. `t` is not clamped so springs can overshoot;
    /// opacity is.
    #[must_use]
    pub fn lerp(&self, to: &Pose, t: f32) -> Pose {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Pose {
            opacity: mix(self.opacity, to.opacity).clamp(0.0, 1.0),
            offset_x: mix(self.offset_x, to.offset_x),
            offset_y: mix(self.offset_y, to.offset_y),
            scale: mix(self.scale, to.scale),
        }
    }
}

/// Hidden pose, shown pose and the transition between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variant {
    pub hidden: Pose,
    pub show: Pose,
    pub transition: Transition,
}

impl Variant {
    /// Pose at `elapsed` since the request.
    #[must_use]
    pub fn pose_at(&self, elapsed: Duration) -> Pose {
        if self.transition.is_complete(elapsed) {
            return self.show;
        }
        self.hidden.lerp(&self.show, self.transition.progress(elapsed))
    }

    #[must_use]
    pub fn delayed_by(mut self, extra: Duration) -> Self {
        self.transition = self.transition.delayed_by(extra);
        self
    }
}

/// Direction a card enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Up,
    Down,
    Left,
    Right,
    None,
}

/// Staggered entry of a container's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stagger {
    /// Delay between consecutive children.
    pub children: Duration,
    /// Delay before the first child.
    pub delay_children: Duration,
}

impl Stagger {
    /// Start delay for child `index`.
    #[must_use]
    pub fn delay_for(&self, index: usize) -> Duration {
        let n = u32::try_from(index).unwrap_or(u32::MAX);
        self.delay_children
            .saturating_add(self.children.saturating_mul(n))
    }
}

/// Container stagger used by every section body.
#[must_use]
pub const fn container_stagger() -> Stagger {
    Stagger {
        children: Duration::from_millis(120),
        delay_children: Duration::from_millis(120),
    }
}

/// Card entrance: fade in, travel 24 units from `direction`, settle on a
/// soft spring.
#[must_use]
pub fn card_fade(direction: Direction, delay: Duration) -> Variant {
    let (offset_x, offset_y) = match direction {
        Direction::Up => (0.0, 24.0),
        Direction::Down => (0.0, -24.0),
        Direction::Left => (24.0, 0.0),
        Direction::Right => (-24.0, 0.0),
        Direction::None => (0.0, 0.0),
    };
    Variant {
        hidden: Pose {
            opacity: 0.0,
            offset_x,
            offset_y,
            scale: 0.985,
        },
        show: Pose::REST,
        transition: Transition::spring(80.0, 12.0, 0.5).delayed_by(delay),
    }
}

/// Navigation bar drop-in on first paint.
#[must_use]
pub fn nav_fade() -> Variant {
    Variant {
        hidden: Pose {
            opacity: 0.0,
            offset_y: -28.0,
            ..Pose::REST
        },
        show: Pose::REST,
        transition: Transition::tween(Duration::from_millis(500), Easing::EaseOut),
    }
}

/// Section heading rising into place the first time it is seen.
#[must_use]
pub fn title_rise() -> Variant {
    Variant {
        hidden: Pose {
            opacity: 0.0,
            offset_y: 18.0,
            ..Pose::REST
        },
        show: Pose::REST,
        transition: Transition::tween(Duration::from_millis(400), Easing::EaseOut),
    }
}

/// Skill meter filling from empty; `pose.scale` carries the fill fraction.
#[must_use]
pub fn meter_fill(percent: u8) -> Variant {
    Variant {
        hidden: Pose {
            scale: 0.0,
            ..Pose::REST
        },
        show: Pose {
            scale: f32::from(percent.min(100)) / 100.0,
            ..Pose::REST
        },
        transition: Transition::tween(Duration::from_millis(800), Easing::EaseOut),
    }
}

/// Repeating vertical bob (the "scroll down" hint under the hero).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bob {
    pub amplitude: f32,
    pub period: Duration,
}

/// Hero scroll hint: 8 units down and back every 1.6 s.
#[must_use]
pub const fn float_bob() -> Bob {
    Bob {
        amplitude: 8.0,
        period: Duration::from_millis(1600),
    }
}

impl Bob {
    /// Offset at `elapsed`: `0 -> amplitude -> 0` each period, eased.
    #[must_use]
    pub fn offset_at(&self, elapsed: Duration) -> f32 {
        if self.period.is_zero() {
            return 0.0;
        }
        let phase = (elapsed.as_secs_f64() / self.period.as_secs_f64()).fract() as f32;
        let half = if phase < 0.5 {
            phase * 2.0
        } else {
            (1.0 - phase) * 2.0
        };
        self.amplitude * Easing::EaseInOut.apply(half)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Element an animation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationTarget {
    NavBar,
    Hero,
    /// A section's heading.
    SectionTitle(SectionId),
    /// A section's body; children are staggered.
    SectionBody(SectionId),
}

/// One request handed to the frontend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRequest {
    pub target: AnimationTarget,
    pub variant: Variant,
    pub stagger: Option<Stagger>,
}

/// Frontend capability: animate an element from hidden to shown.
pub trait Animator {
    fn request(&mut self, request: AnimationRequest);
}

/// Issues entrance animations the first time each section intersects.
#[derive(Debug, Default, Clone)]
pub struct RevealTracker {
    seen: Vec<SectionId>,
}

impl RevealTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_revealed(&self, id: SectionId) -> bool {
        self.seen.contains(&id)
    }

    /// Request heading and body entrances for sections intersecting for the
    /// first time. Returns the newly revealed sections.
    pub fn reveal(
        &mut self,
        entries: &[IntersectionEntry],
        animator: &mut dyn Animator,
    ) -> Vec<SectionId> {
        let mut fresh = Vec::new();
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            if self.seen.contains(&entry.id) {
                continue;
            }
            self.seen.push(entry.id);
            fresh.push(entry.id);
            animator.request(AnimationRequest {
                target: AnimationTarget::SectionTitle(entry.id),
                variant: title_rise(),
                stagger: None,
            });
            animator.request(AnimationRequest {
                target: AnimationTarget::SectionBody(entry.id),
                variant: card_fade(Direction::Up, Duration::ZERO),
                stagger: Some(container_stagger()),
            });
        }
        fresh
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Running {
    started: Duration,
    request: AnimationRequest,
}

/// Animator that records requests against a clock and can be sampled.
///
/// Targets never requested are at rest. A repeated request for the same
/// target restarts it.
#[derive(Debug, Default, Clone)]
pub struct Timeline {
    now: Duration,
    running: HashMap<AnimationTarget, Running>,
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock to `now` (monotonic; earlier values are ignored).
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Pose of `target`'s child `index` (use 0 for unstaggered targets).
    #[must_use]
    pub fn pose(&self, target: AnimationTarget, index: usize) -> Pose {
        let Some(run) = self.running.get(&target) else {
            return Pose::REST;
        };
        let variant = match run.request.stagger {
            Some(stagger) => run.request.variant.delayed_by(stagger.delay_for(index)),
            None => run.request.variant,
        };
        variant.pose_at(self.now.saturating_sub(run.started))
    }

    /// Whether any staggered or plain animation is still moving; `children`
    /// bounds the stagger horizon that is considered.
    #[must_use]
    pub fn any_active(&self, children: usize) -> bool {
        self.running.values().any(|run| {
            let tail = run
                .request
                .stagger
                .map_or(Duration::ZERO, |s| s.delay_for(children));
            let done = run.request.variant.transition.settle_time().saturating_add(tail);
            self.now.saturating_sub(run.started) < done
        })
    }

    /// Drop finished animations; they are at rest either way.
    pub fn prune(&mut self, children: usize) {
        let now = self.now;
        self.running.retain(|_, run| {
            let tail = run
                .request
                .stagger
                .map_or(Duration::ZERO, |s| s.delay_for(children));
            now.saturating_sub(run.started)
                < run.request.variant.transition.settle_time().saturating_add(tail)
        });
    }
}

impl Animator for Timeline {
    fn request(&mut self, request: AnimationRequest) {
        self.running.insert(
            request.target,
            Running {
                started: self.now,
                request,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn easing_endpoints() {
        for e in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert_eq!(e.apply(0.0), 0.0);
            assert_eq!(e.apply(1.0), 1.0);
            assert_eq!(e.apply(2.0), 1.0);
        }
    }

    #[test]
    fn tween_respects_delay() {
        let t = Transition::tween(MS(100), Easing::Linear).delayed_by(MS(50));
        assert_eq!(t.progress(MS(40)), 0.0);
        assert!((t.progress(MS(100)) - 0.5).abs() < 1e-4);
        assert_eq!(t.progress(MS(500)), 1.0);
        assert_eq!(t.settle_time(), MS(150));
    }

    #[test]
    fn card_spring_settles_near_one() {
        let v = card_fade(Direction::Up, Duration::ZERO);
        assert_eq!(v.pose_at(Duration::ZERO).opacity, 0.0);
        let settle = v.transition.settle_time();
        assert!(settle > MS(100) && settle < Duration::from_secs(2), "{settle:?}");
        assert_eq!(v.pose_at(settle), Pose::REST);
        let p = v.transition.progress(settle.saturating_sub(MS(1)));
        assert!((p - 1.0).abs() < 0.01, "{p}");
    }

    #[test]
    fn overdamped_and_critical_springs_start_at_zero() {
        for (k, c, m) in [(100.0, 40.0, 1.0), (100.0, 20.0, 1.0)] {
            let t = Transition::spring(k, c, m);
            assert!(t.progress(Duration::ZERO).abs() < 1e-6);
            assert!((t.progress(Duration::from_secs(5)) - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn stagger_delays_accumulate() {
        let s = container_stagger();
        assert_eq!(s.delay_for(0), MS(120));
        assert_eq!(s.delay_for(3), MS(480));
    }

    #[test]
    fn bob_returns_to_rest_each_period() {
        let b = float_bob();
        assert_eq!(b.offset_at(Duration::ZERO), 0.0);
        assert!((b.offset_at(MS(800)) - 8.0).abs() < 1e-3);
        assert!(b.offset_at(MS(1600)).abs() < 1e-3);
    }

    #[derive(Default)]
    struct Recorder(Vec<AnimationRequest>);

    impl Animator for Recorder {
        fn request(&mut self, request: AnimationRequest) {
            self.0.push(request);
        }
    }

    #[test]
    fn reveal_requests_once_per_section() {
        let mut reveal = RevealTracker::new();
        let mut rec = Recorder::default();
        let entries = [
            IntersectionEntry {
                id: SectionId::About,
                ratio: 0.3,
                is_intersecting: true,
            },
            IntersectionEntry {
                id: SectionId::Skills,
                ratio: 0.0,
                is_intersecting: false,
            },
        ];
        assert_eq!(reveal.reveal(&entries, &mut rec), vec![SectionId::About]);
        assert_eq!(rec.0.len(), 2);
        assert!(reveal.reveal(&entries, &mut rec).is_empty());
        assert_eq!(rec.0.len(), 2);
        assert!(reveal.is_revealed(SectionId::About));
        assert!(!reveal.is_revealed(SectionId::Skills));
    }

    #[test]
    fn timeline_samples_staggered_children() {
        let mut tl = Timeline::new();
        tl.request(AnimationRequest {
            target: AnimationTarget::SectionBody(SectionId::Projects),
            variant: card_fade(Direction::Up, Duration::ZERO),
            stagger: Some(container_stagger()),
        });
        tl.set_now(MS(200));
        let first = tl.pose(AnimationTarget::SectionBody(SectionId::Projects), 0);
        let third = tl.pose(AnimationTarget::SectionBody(SectionId::Projects), 2);
        assert!(first.opacity > 0.0);
        assert_eq!(third.opacity, 0.0, "third child is still inside its delay");
        assert_eq!(tl.pose(AnimationTarget::NavBar, 0), Pose::REST);
        assert!(tl.any_active(3));
        tl.set_now(Duration::from_secs(10));
        tl.prune(3);
        assert!(!tl.any_active(3));
    }
}
