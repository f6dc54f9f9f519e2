//! Interactive pan-to-dismiss
//!
//! A vertical drag moves the content with the pointer and fades the backdrop.
//! When the drag ends past the dismiss threshold the content flies off in the
//! drag's direction and the overlay closes; otherwise everything settles back.
//!
//! The math is exposed as free functions so hosts can preview the outcome of
//! a drag. `DismissController` carries the per-drag state and turns
//! `DragEvent`s into `DragResponse`s; it never touches views itself.

use crate::animation::AnimationTag;
use crate::config::PreviewConfig;
use crate::event::{DragEvent, DragPhase};
use crate::layout::{Point, Vector};
use anyhow::{anyhow, Result};
use std::time::Duration;

/// Floor for half the viewport height, so degenerate viewports never divide by zero
pub const MIN_HALF_EXTENT: f32 = 1.0;

fn half_extent(viewport_height: f32) -> f32 {
    (viewport_height / 2.0).max(MIN_HALF_EXTENT)
}

/// `1 - |dy| / (height / 2)`, floored at 0
pub fn vertical_factor(translation_y: f32, viewport_height: f32) -> f32 {
    (1.0 - translation_y.abs() / half_extent(viewport_height)).max(0.0)
}

/// Map a vertical factor onto the backdrop alpha range
pub fn backdrop_alpha(factor: f32, min_alpha: f32, max_alpha: f32) -> f32 {
    factor * (max_alpha - min_alpha) + min_alpha
}

/// Signed drag distance relative to half the viewport height
pub fn moved_factor(translation_y: f32, viewport_height: f32) -> f32 {
    translation_y / half_extent(viewport_height)
}

/// What an ended drag resolves to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DismissDecision {
    /// Leave the screen; `direction` is +1 (down) or -1 (up)
    Commit { direction: f32 },
    BounceBack,
}

/// Commit iff `|moved_factor|` is strictly above `threshold`
pub fn decide(moved_factor: f32, threshold: f32) -> DismissDecision {
    if moved_factor.abs() > threshold {
        let direction = if moved_factor > 0.0 { 1.0 } else { -1.0 };
        DismissDecision::Commit { direction }
    } else {
        DismissDecision::BounceBack
    }
}

/// State of one drag from `Began` to `Ended`/`Cancelled`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub origin_center: Point,
    pub current_translation: Vector,
}

/// Values to apply immediately, without animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveUpdate {
    pub center: Point,
    pub backdrop_alpha: f32,
}

/// Animation to start after any live update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnimation {
    pub center: Point,
    pub backdrop_alpha: f32,
    pub duration: Duration,
    /// `Dismiss` means the overlay closes when this animation completes
    pub tag: AnimationTag,
}

/// What the host should do in response to one drag event
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragResponse {
    pub live: Option<LiveUpdate>,
    pub animation: Option<DragAnimation>,
}

impl DragResponse {
    /// Whether this response closes the overlay once its animation ends
    pub fn commits(&self) -> bool {
        self.animation
            .is_some_and(|a| a.tag == AnimationTag::Dismiss)
    }
}

/// Drag-to-dismiss state machine
#[derive(Debug, Clone)]
pub struct DismissController {
    min_alpha: f32,
    max_alpha: f32,
    threshold: f32,
    duration: Duration,
    /// Set by `Began`, kept until the next `Began`
    origin_center: Option<Point>,
    session: Option<DragSession>,
}

impl DismissController {
    pub fn new(config: &PreviewConfig) -> Self {
        DismissController {
            min_alpha: config.min_backdrop_alpha,
            max_alpha: config.max_backdrop_alpha,
            threshold: config.dismiss_threshold,
            duration: config.animation_duration,
            origin_center: None,
            session: None,
        }
    }

    /// Center recorded by the most recent `Began`
    pub fn origin_center(&self) -> Option<Point> {
        self.origin_center
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Whether a drag is in progress
    pub fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    /// Translation of the active drag
    pub fn current_translation(&self) -> Result<Vector> {
        self.session
            .map(|s| s.current_translation)
            .ok_or_else(|| anyhow!("no drag in progress"))
    }

    /// Backdrop alpha for a drag of `translation_y`
    pub fn alpha_for(&self, translation_y: f32, viewport_height: f32) -> f32 {
        backdrop_alpha(
            vertical_factor(translation_y, viewport_height),
            self.min_alpha,
            self.max_alpha,
        )
    }

    /// Process one drag event
    ///
    /// `view_center` is the dragged content's current center; it is only read
    /// on `Began`.
    pub fn handle(
        &mut self,
        event: &DragEvent,
        view_center: Point,
        viewport_height: f32,
    ) -> DragResponse {
        if event.phase == DragPhase::Began {
            self.origin_center = Some(view_center);
        }
        // An Ended/Changed without a Began measures from the zero point
        let origin = self.origin_center.unwrap_or(Point::ZERO);

        let mut response = DragResponse::default();

        match event.phase {
            DragPhase::Began | DragPhase::Changed => {
                self.session = Some(DragSession {
                    origin_center: origin,
                    current_translation: event.translation,
                });
                response.live = Some(self.live_update(origin, event.translation, viewport_height));
            }
            DragPhase::Cancelled => {
                self.session = None;
                response.animation = Some(self.settle(origin));
            }
            DragPhase::Ended => {
                self.session = None;
                response.live = Some(self.live_update(origin, event.translation, viewport_height));

                let factor = moved_factor(event.translation.y, viewport_height);
                response.animation = Some(match decide(factor, self.threshold) {
                    DismissDecision::Commit { direction } => {
                        tracing::debug!(factor, direction, "Drag committed dismissal");
                        DragAnimation {
                            center: origin + Vector::new(0.0, viewport_height * direction),
                            backdrop_alpha: 0.0,
                            duration: self.duration,
                            tag: AnimationTag::Dismiss,
                        }
                    }
                    DismissDecision::BounceBack => {
                        tracing::debug!(factor, "Drag below dismiss threshold, bouncing back");
                        self.settle(origin)
                    }
                });
            }
        }

        response
    }

    fn live_update(&self, origin: Point, translation: Vector, viewport_height: f32) -> LiveUpdate {
        LiveUpdate {
            center: origin + translation,
            backdrop_alpha: self.alpha_for(translation.y, viewport_height),
        }
    }

    fn settle(&self, origin: Point) -> DragAnimation {
        DragAnimation {
            center: origin,
            backdrop_alpha: self.max_alpha,
            duration: self.duration,
            tag: AnimationTag::Settle,
        }
    }
}
