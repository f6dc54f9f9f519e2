//! Animation timeline for the overlay's animatable properties
//!
//! The overlay animates three properties: the content center, the backdrop
//! alpha and the presentation opacity. Animations run on a `Timeline` that the
//! host advances once per frame with `tick`. Starting an animation on a
//! property that is already animating takes that property over (last writer
//! wins). An animation that loses all of its properties this way completes
//! with `finished == false`.

use crate::layout::Point;
use std::time::Duration;

/// Timing curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Slow start and end, matching the usual UI default curve
    #[default]
    EaseInOut,
}

impl Easing {
    /// Map linear progress (0..=1) onto the curve
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Current values of the animatable properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedValues {
    pub center: Point,
    pub backdrop_alpha: f32,
    pub opacity: f32,
}

impl Default for AnimatedValues {
    fn default() -> Self {
        AnimatedValues {
            center: Point::ZERO,
            backdrop_alpha: 1.0,
            opacity: 1.0,
        }
    }
}

/// End values for an animation; `None` leaves a property alone
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationTarget {
    pub center: Option<Point>,
    pub backdrop_alpha: Option<f32>,
    pub opacity: Option<f32>,
}

impl AnimationTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(mut self, center: Point) -> Self {
        self.center = Some(center);
        self
    }

    pub fn backdrop_alpha(mut self, alpha: f32) -> Self {
        self.backdrop_alpha = Some(alpha);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    fn is_empty(&self) -> bool {
        self.center.is_none() && self.backdrop_alpha.is_none() && self.opacity.is_none()
    }

    /// Drop every property that `newer` also animates
    fn yield_to(&mut self, newer: &AnimationTarget) {
        if newer.center.is_some() {
            self.center = None;
        }
        if newer.backdrop_alpha.is_some() {
            self.backdrop_alpha = None;
        }
        if newer.opacity.is_some() {
            self.opacity = None;
        }
    }
}

/// What a finished animation was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationTag {
    /// Cross-dissolve in after presentation
    Present,
    /// Return to the pre-drag state
    Settle,
    /// Exit animation; the overlay closes when it completes
    Dismiss,
}

/// Completion report for one animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub tag: AnimationTag,
    /// False if the animation was superseded before reaching its target
    pub finished: bool,
}

#[derive(Debug, Clone)]
struct Running {
    from: AnimatedValues,
    target: AnimationTarget,
    elapsed: Duration,
    duration: Duration,
    tag: AnimationTag,
}

impl Running {
    fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    fn apply(&self, values: &mut AnimatedValues, t: f32) {
        if let Some(center) = self.target.center {
            values.center = self.from.center.lerp(center, t);
        }
        if let Some(alpha) = self.target.backdrop_alpha {
            values.backdrop_alpha = lerp(self.from.backdrop_alpha, alpha, t);
        }
        if let Some(opacity) = self.target.opacity {
            values.opacity = lerp(self.from.opacity, opacity, t);
        }
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    if t >= 1.0 {
        return to;
    }
    from + (to - from) * t
}

/// Animation engine advanced by the host's frame clock
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    running: Vec<Running>,
    pending: Vec<Completion>,
    easing: Easing,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Start animating from `current` towards `target`
    pub fn animate(
        &mut self,
        current: &AnimatedValues,
        target: AnimationTarget,
        duration: Duration,
        tag: AnimationTag,
    ) {
        self.stop(&target);
        self.running.push(Running {
            from: *current,
            target,
            elapsed: Duration::ZERO,
            duration,
            tag,
        });
    }

    /// Stop animating every property `properties` names, leaving the values
    /// where they are
    ///
    /// Animations left with nothing to animate complete with `finished == false`.
    pub fn stop(&mut self, properties: &AnimationTarget) {
        let pending = &mut self.pending;
        self.running.retain_mut(|older| {
            older.target.yield_to(properties);
            if older.target.is_empty() {
                pending.push(Completion {
                    tag: older.tag,
                    finished: false,
                });
                false
            } else {
                true
            }
        });
    }

    /// Whether any animation is still running
    pub fn is_animating(&self) -> bool {
        !self.running.is_empty()
    }

    /// Whether an animation with this tag is still running
    pub fn is_running(&self, tag: AnimationTag) -> bool {
        self.running.iter().any(|r| r.tag == tag)
    }

    /// Advance every animation by `dt`, writing into `values`
    ///
    /// Returns the completions that became due, superseded ones first.
    pub fn tick(&mut self, values: &mut AnimatedValues, dt: Duration) -> Vec<Completion> {
        let mut done = std::mem::take(&mut self.pending);
        let easing = self.easing;

        self.running.retain_mut(|anim| {
            anim.elapsed = anim.elapsed.saturating_add(dt);
            let progress = anim.progress();
            anim.apply(values, easing.apply(progress));
            if progress >= 1.0 {
                done.push(Completion {
                    tag: anim.tag,
                    finished: true,
                });
                false
            } else {
                true
            }
        });

        done
    }
}

/// Single-value tween, used for animated zoom changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration, easing: Easing) -> Self {
        Tween {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
            easing,
        }
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    /// Advance by `dt`; returns the new value and whether the tween is done
    pub fn step(&mut self, dt: Duration) -> (f32, bool) {
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.duration.is_zero() || self.elapsed >= self.duration {
            return (self.to, true);
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        (lerp(self.from, self.to, self.easing.apply(t)), false)
    }
}
