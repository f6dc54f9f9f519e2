//! Zoom providers - continuous scroll-style zoom or none at all
//!
//! The overlay never owns the zoom scale directly. It talks to a
//! `ZoomProvider`, reads the scale to decide whether panning is allowed, and
//! writes it for the double-tap toggle.

use crate::animation::{Easing, Tween};
use crate::layout::{Point, Rect, Size, Vector};
use std::time::Duration;

/// Scale at which the content fills the viewport exactly
pub const IDENTITY_SCALE: f32 = 1.0;

const DEFAULT_ZOOM_DURATION: Duration = Duration::from_millis(250);

/// How the overlay's content can be zoomed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomStrategy {
    /// Continuous zoom with panning of the zoomed content, up to `max_scale`
    Scroll { max_scale: f32 },
    /// No zoom; the content only moves with the dismiss drag
    Transform,
}

impl ZoomStrategy {
    /// Build the provider for this strategy
    pub fn provider(&self) -> Box<dyn ZoomProvider> {
        match *self {
            ZoomStrategy::Scroll { max_scale } => Box::new(ScrollZoom::new(max_scale)),
            ZoomStrategy::Transform => Box::new(FixedZoom),
        }
    }
}

/// Zoom state owner as seen by the overlay
pub trait ZoomProvider {
    /// Current zoom scale (>= 1.0)
    fn scale(&self) -> f32;

    /// Whether this provider can zoom at all
    fn supports_zoom(&self) -> bool {
        true
    }

    /// Set the viewport size; the unzoomed content fills it
    fn set_bounds(&mut self, bounds: Size);

    /// Size of the unzoomed content frame
    fn content_size(&self) -> Size;

    /// Offset of the visible region within the zoomed content
    fn content_offset(&self) -> Vector {
        Vector::ZERO
    }

    /// Convert a viewport point into unzoomed content coordinates
    fn convert_to_content(&self, point: Point) -> Point {
        point
    }

    /// Change the scale, keeping the visible center fixed
    fn set_scale(&mut self, scale: f32, animated: bool);

    /// Zoom so that `rect` (content coordinates) fills the viewport
    fn zoom_to_rect(&mut self, rect: Rect, animated: bool);

    /// Multiply the scale by `factor`, keeping `anchor` (viewport) fixed
    fn pinch(&mut self, factor: f32, anchor: Point);

    /// Move the visible region of zoomed content by `delta` (viewport units)
    fn scroll_by(&mut self, _delta: Vector) {}

    /// Advance an animated zoom; returns the new scale if it changed
    fn tick(&mut self, _dt: Duration) -> Option<f32> {
        None
    }
}

/// Rectangle of `content_size / scale` centered on `center`
pub fn zoom_rect_for_scale(content_size: Size, scale: f32, center: Point) -> Rect {
    let scale = scale.max(f32::EPSILON);
    Rect::centered(center, content_size.scaled(1.0 / scale))
}

#[derive(Debug, Clone, Copy)]
struct ZoomAnimation {
    scale: Tween,
    offset_x: Tween,
    offset_y: Tween,
}

/// Scroll-view style zoom: content fills the viewport at scale 1 and can be
/// magnified up to `max_scale`, with the visible region tracked as an offset
#[derive(Debug, Clone)]
pub struct ScrollZoom {
    bounds: Size,
    scale: f32,
    offset: Vector,
    max_scale: f32,
    duration: Duration,
    animation: Option<ZoomAnimation>,
}

impl ScrollZoom {
    pub fn new(max_scale: f32) -> Self {
        ScrollZoom {
            bounds: Size::default(),
            scale: IDENTITY_SCALE,
            offset: Vector::ZERO,
            max_scale: max_scale.max(IDENTITY_SCALE),
            duration: DEFAULT_ZOOM_DURATION,
            animation: None,
        }
    }

    pub fn with_bounds(mut self, bounds: Size) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn max_scale(&self) -> f32 {
        self.max_scale
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(IDENTITY_SCALE, self.max_scale)
    }

    /// Keep the visible region inside the zoomed content
    fn clamp_offset(&self, offset: Vector, scale: f32) -> Vector {
        let max_x = (self.bounds.width * scale - self.bounds.width).max(0.0);
        let max_y = (self.bounds.height * scale - self.bounds.height).max(0.0);
        Vector::new(offset.x.clamp(0.0, max_x), offset.y.clamp(0.0, max_y))
    }

    fn apply(&mut self, scale: f32, offset: Vector, animated: bool) {
        let offset = self.clamp_offset(offset, scale);
        if animated && !self.duration.is_zero() {
            self.animation = Some(ZoomAnimation {
                scale: Tween::new(self.scale, scale, self.duration, Easing::EaseInOut),
                offset_x: Tween::new(self.offset.x, offset.x, self.duration, Easing::EaseInOut),
                offset_y: Tween::new(self.offset.y, offset.y, self.duration, Easing::EaseInOut),
            });
        } else {
            self.animation = None;
            self.scale = scale;
            self.offset = offset;
        }
    }
}

impl ZoomProvider for ScrollZoom {
    fn scale(&self) -> f32 {
        self.scale
    }

    fn set_bounds(&mut self, bounds: Size) {
        self.bounds = bounds;
        self.offset = self.clamp_offset(self.offset, self.scale);
    }

    fn content_size(&self) -> Size {
        self.bounds
    }

    fn content_offset(&self) -> Vector {
        self.offset
    }

    fn convert_to_content(&self, point: Point) -> Point {
        Point::new(
            (point.x + self.offset.x) / self.scale,
            (point.y + self.offset.y) / self.scale,
        )
    }

    fn set_scale(&mut self, scale: f32, animated: bool) {
        let scale = self.clamp_scale(scale);
        let half = Vector::new(self.bounds.width / 2.0, self.bounds.height / 2.0);
        let visible_center = self.convert_to_content(Point::ZERO + half);
        let offset = Vector::new(
            visible_center.x * scale - half.x,
            visible_center.y * scale - half.y,
        );
        self.apply(scale, offset, animated);
    }

    fn zoom_to_rect(&mut self, rect: Rect, animated: bool) {
        if rect.size().is_empty() || self.bounds.is_empty() {
            return;
        }
        let scale = self.clamp_scale(
            (self.bounds.width / rect.width).min(self.bounds.height / rect.height),
        );
        let center = rect.center();
        let offset = Vector::new(
            center.x * scale - self.bounds.width / 2.0,
            center.y * scale - self.bounds.height / 2.0,
        );
        self.apply(scale, offset, animated);
    }

    fn pinch(&mut self, factor: f32, anchor: Point) {
        if factor <= 0.0 {
            return;
        }
        let under_anchor = self.convert_to_content(anchor);
        let scale = self.clamp_scale(self.scale * factor);
        let offset = Vector::new(
            under_anchor.x * scale - anchor.x,
            under_anchor.y * scale - anchor.y,
        );
        self.apply(scale, offset, false);
    }

    fn scroll_by(&mut self, delta: Vector) {
        if self.animation.is_some() {
            return;
        }
        self.offset = self.clamp_offset(self.offset + delta, self.scale);
    }

    fn tick(&mut self, dt: Duration) -> Option<f32> {
        let mut animation = self.animation.take()?;
        let (scale, done) = animation.scale.step(dt);
        let (x, _) = animation.offset_x.step(dt);
        let (y, _) = animation.offset_y.step(dt);
        self.scale = scale;
        self.offset = Vector::new(x, y);
        if !done {
            self.animation = Some(animation);
        }
        Some(scale)
    }
}

/// Provider for content that cannot zoom
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedZoom;

impl ZoomProvider for FixedZoom {
    fn scale(&self) -> f32 {
        IDENTITY_SCALE
    }

    fn supports_zoom(&self) -> bool {
        false
    }

    fn set_bounds(&mut self, _bounds: Size) {}

    fn content_size(&self) -> Size {
        Size::default()
    }

    fn set_scale(&mut self, _scale: f32, _animated: bool) {}

    fn zoom_to_rect(&mut self, _rect: Rect, _animated: bool) {}

    fn pinch(&mut self, _factor: f32, _anchor: Point) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn zoom() -> ScrollZoom {
        ScrollZoom::new(6.0).with_bounds(Size::new(400.0, 800.0))
    }

    #[test]
    fn test_zoom_rect_is_quarter_size_around_center() {
        let rect = zoom_rect_for_scale(Size::new(400.0, 800.0), 4.0, Point::new(200.0, 400.0));
        assert_eq!(rect, Rect::new(150.0, 300.0, 100.0, 200.0));
        assert_eq!(rect.center(), Point::new(200.0, 400.0));
    }

    #[test]
    fn test_zoom_to_quarter_rect_gives_scale_four() {
        let mut zoom = zoom();
        let rect = zoom_rect_for_scale(zoom.content_size(), 4.0, Point::new(200.0, 400.0));
        zoom.zoom_to_rect(rect, false);

        assert!(approx(zoom.scale(), 4.0));
        // Visible region is centered on the tapped point
        let center = zoom.convert_to_content(Point::new(200.0, 400.0));
        assert!(approx(center.x, 200.0));
        assert!(approx(center.y, 400.0));
    }

    #[test]
    fn test_zoom_to_rect_clamps_to_max_scale() {
        let mut zoom = zoom();
        zoom.zoom_to_rect(Rect::new(0.0, 0.0, 10.0, 10.0), false);
        assert_eq!(zoom.scale(), 6.0);
        assert_eq!(zoom.content_offset(), Vector::ZERO);
    }

    #[test]
    fn test_animated_zoom_steps_through_tick() {
        let mut zoom = zoom();
        zoom.set_scale(3.0, true);
        assert_eq!(zoom.scale(), 1.0);
        assert!(zoom.is_animating());

        let mid = zoom.tick(Duration::from_millis(125)).unwrap_or_default();
        assert!(mid > 1.0 && mid < 3.0);
        assert_eq!(zoom.tick(Duration::from_millis(200)), Some(3.0));
        assert!(!zoom.is_animating());
        assert_eq!(zoom.tick(Duration::from_millis(16)), None);
    }

    #[test]
    fn test_reset_to_identity_clears_offset() {
        let mut zoom = zoom();
        zoom.zoom_to_rect(Rect::new(300.0, 600.0, 100.0, 200.0), false);
        assert!(zoom.content_offset().x > 0.0);

        zoom.set_scale(1.0, false);
        assert_eq!(zoom.scale(), 1.0);
        assert_eq!(zoom.content_offset(), Vector::ZERO);
    }

    #[test]
    fn test_pinch_keeps_anchor_fixed_and_clamps() {
        let mut zoom = zoom();
        let anchor = Point::new(100.0, 100.0);
        zoom.pinch(2.0, anchor);
        assert_eq!(zoom.scale(), 2.0);
        let under = zoom.convert_to_content(anchor);
        assert!(approx(under.x, 100.0) && approx(under.y, 100.0));

        zoom.pinch(0.1, anchor);
        assert_eq!(zoom.scale(), 1.0);
    }

    #[test]
    fn test_scroll_moves_visible_region_within_content() {
        let mut zoom = zoom();
        zoom.scroll_by(Vector::new(30.0, 30.0));
        assert_eq!(zoom.content_offset(), Vector::ZERO);

        zoom.set_scale(2.0, false);
        assert_eq!(zoom.content_offset(), Vector::new(200.0, 400.0));

        zoom.scroll_by(Vector::new(50.0, 50.0));
        assert_eq!(zoom.content_offset(), Vector::new(250.0, 450.0));

        zoom.scroll_by(Vector::new(1000.0, -1000.0));
        assert_eq!(zoom.content_offset(), Vector::new(400.0, 0.0));
        assert_eq!(zoom.scale(), 2.0);
    }

    #[test]
    fn test_fixed_zoom_never_changes() {
        let mut zoom = ZoomStrategy::Transform.provider();
        assert!(!zoom.supports_zoom());
        zoom.set_scale(4.0, false);
        zoom.pinch(3.0, Point::ZERO);
        assert_eq!(zoom.scale(), 1.0);
    }
}
