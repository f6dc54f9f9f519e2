//! Full-screen media preview overlay
//!
//! `PreviewOverlay` ties the pieces together:
//! - presentation on a host surface, optionally cross-dissolving in
//! - pan-to-dismiss through `DismissController`
//! - zoom through a `ZoomProvider`, with panning gated on the zoom scale
//! - looping video playback
//!
//! The host drives it with gesture events (directly or through a
//! `GestureSource`), layout calls, and a per-frame `tick`.

use crate::animation::{AnimatedValues, AnimationTag, AnimationTarget, Completion, Timeline};
use crate::config::PreviewConfig;
use crate::dismiss::{DismissController, DragResponse};
use crate::event::{DragEvent, DragPhase, EventHandler, GestureEvent};
use crate::gesture::{GestureSource, SubscriptionId};
use crate::layout::{Point, Rect, Size, Vector};
use crate::media::{LoopingPlayback, MediaKind, Player, PreviewMedia};
use crate::presentation::{SharedHost, SurfaceGuard};
use crate::zoom::{zoom_rect_for_scale, ZoomProvider, IDENTITY_SCALE};
use anyhow::{bail, Result};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Lifecycle of an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Built but not shown yet
    Created,
    /// On screen and interactive
    Presented,
    /// Exit animation running; gestures are ignored
    Dismissing,
    /// Closed; the surface has been released
    Dismissed,
}

/// Modal full-screen preview of one image or video
pub struct PreviewOverlay {
    media: PreviewMedia,
    config: PreviewConfig,
    controller: DismissController,
    zoom: Box<dyn ZoomProvider>,
    timeline: Timeline,
    values: AnimatedValues,
    viewport: Size,
    /// Content center when nothing is moving it
    rest_center: Point,
    pan_enabled: bool,
    /// Last translation of a drag scrolling zoomed content
    scroll_translation: Option<Vector>,
    playback: Option<LoopingPlayback>,
    surface: Option<SurfaceGuard>,
    state: OverlayState,
    on_close: Option<Box<dyn FnMut()>>,
}

impl std::fmt::Debug for PreviewOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewOverlay")
            .field("kind", &self.media.kind())
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("values", &self.values)
            .field("scale", &self.zoom.scale())
            .field("pan_enabled", &self.pan_enabled)
            .finish()
    }
}

impl PreviewOverlay {
    pub fn new(media: PreviewMedia, config: PreviewConfig) -> Self {
        PreviewOverlay {
            controller: DismissController::new(&config),
            zoom: config.zoom_strategy.provider(),
            media,
            config,
            timeline: Timeline::new(),
            values: AnimatedValues {
                backdrop_alpha: config.max_backdrop_alpha,
                ..AnimatedValues::default()
            },
            viewport: Size::default(),
            rest_center: Point::ZERO,
            pan_enabled: true,
            scroll_translation: None,
            playback: None,
            surface: None,
            state: OverlayState::Created,
            on_close: None,
        }
    }

    /// Replace the zoom provider built from the configured strategy
    pub fn with_zoom_provider(mut self, zoom: Box<dyn ZoomProvider>) -> Self {
        self.zoom = zoom;
        self.zoom.set_bounds(self.viewport);
        self
    }

    /// Attach the player for a video payload
    pub fn with_player(mut self, player: Box<dyn Player>) -> Self {
        if self.media.kind() != MediaKind::Video {
            tracing::warn!("Ignoring player for a still image preview");
            return self;
        }
        self.playback = Some(LoopingPlayback::new(player));
        self
    }

    /// Callback run once when the overlay closes
    pub fn on_close(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    /// Rebuild an overlay from serialized state
    ///
    /// Overlays hold live host resources and cannot be restored; this always
    /// fails.
    pub fn restore(_serialized: &[u8]) -> Result<Self> {
        tracing::warn!("Attempted to restore a preview overlay from serialized state");
        bail!("preview overlays cannot be restored from serialized state")
    }

    /// Present on a new full-screen surface from `host`
    pub fn show(&mut self, host: SharedHost, animated: bool) -> Result<()> {
        match self.state {
            OverlayState::Created => {}
            OverlayState::Presented | OverlayState::Dismissing => {
                bail!("preview overlay is already shown")
            }
            OverlayState::Dismissed => bail!("preview overlay was dismissed"),
        }

        self.surface = Some(SurfaceGuard::acquire(host, animated)?);
        self.state = OverlayState::Presented;
        tracing::info!(kind = ?self.media.kind(), animated, "Showing preview overlay");

        if animated && !self.config.present_duration.is_zero() {
            self.values.opacity = 0.0;
            self.timeline.animate(
                &self.values,
                AnimationTarget::new().opacity(1.0),
                self.config.present_duration,
                AnimationTag::Present,
            );
        } else {
            self.values.opacity = 1.0;
            self.did_appear();
        }
        Ok(())
    }

    fn did_appear(&mut self) {
        if let Some(playback) = self.playback.as_mut() {
            playback.on_appear();
        }
    }

    fn close(&mut self) {
        if self.state == OverlayState::Dismissed {
            return;
        }
        self.state = OverlayState::Dismissed;
        if let Some(playback) = self.playback.as_mut() {
            playback.on_disappear();
        }
        self.surface = None;
        tracing::info!("Preview overlay dismissed");
        if let Some(mut on_close) = self.on_close.take() {
            on_close();
        }
    }

    /// Called before the host lays out the overlay
    pub fn will_layout(&mut self) {
        if self.config.flush_pan_before_layout {
            self.flush_pan();
        }
        self.zoom.set_scale(IDENTITY_SCALE, false);
        self.sync_pan_gate();
    }

    /// Called after the host laid out the overlay at `viewport`
    pub fn did_layout(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.zoom.set_bounds(viewport);
        self.zoom.set_scale(IDENTITY_SCALE, false);
        let center = Rect::fullscreen(viewport).center();
        self.rest_center = center;
        if self.state != OverlayState::Dismissing {
            if self.timeline.is_running(AnimationTag::Settle) {
                // Settle towards the new layout's resting place instead
                self.timeline.animate(
                    &self.values,
                    AnimationTarget::new()
                        .center(center)
                        .backdrop_alpha(self.config.max_backdrop_alpha),
                    self.config.animation_duration,
                    AnimationTag::Settle,
                );
            } else {
                self.values.center = center;
            }
        }
        self.sync_pan_gate();
    }

    /// `will_layout` followed by `did_layout`
    pub fn layout(&mut self, viewport: Size) {
        self.will_layout();
        self.did_layout(viewport);
    }

    /// Disable and re-enable panning, cancelling any drag in flight
    pub fn flush_pan(&mut self) {
        let enabled = self.pan_enabled;
        self.set_pan_enabled(false);
        self.pan_enabled = enabled;
    }

    fn set_pan_enabled(&mut self, enabled: bool) {
        if !enabled && self.controller.is_tracking() {
            let translation = self.controller.current_translation().unwrap_or_default();
            tracing::debug!("Cancelling drag in flight");
            let response = self.controller.handle(
                &DragEvent::new(DragPhase::Cancelled, translation),
                self.values.center,
                self.viewport.height,
            );
            self.apply(response);
        }
        self.pan_enabled = enabled;
    }

    /// Panning is allowed exactly at identity zoom
    fn sync_pan_gate(&mut self) {
        self.sync_pan_gate_to(self.zoom.scale());
    }

    fn sync_pan_gate_to(&mut self, scale: f32) {
        let enabled = scale == IDENTITY_SCALE;
        if enabled != self.pan_enabled {
            tracing::debug!(scale, enabled, "Pan gate changed");
        }
        self.set_pan_enabled(enabled);
    }

    fn apply(&mut self, response: DragResponse) {
        if let Some(live) = response.live {
            self.values.center = live.center;
            self.values.backdrop_alpha = live.backdrop_alpha;
        }
        if let Some(animation) = response.animation {
            self.timeline.animate(
                &self.values,
                AnimationTarget::new()
                    .center(animation.center)
                    .backdrop_alpha(animation.backdrop_alpha),
                animation.duration,
                animation.tag,
            );
            if animation.tag == AnimationTag::Dismiss {
                self.state = OverlayState::Dismissing;
            }
        }
    }

    /// Feed one drag event; returns false if the drag is not accepted now
    ///
    /// At identity zoom the drag pans the content towards dismissal. While
    /// zoomed it scrolls the visible region instead.
    pub fn handle_drag(&mut self, event: &DragEvent) -> bool {
        if self.state != OverlayState::Presented {
            return false;
        }
        let scrolling = match event.phase {
            DragPhase::Began => !self.pan_enabled,
            _ => self.scroll_translation.is_some() || !self.pan_enabled,
        };
        if scrolling {
            return self.scroll_drag(event);
        }
        self.scroll_translation = None;

        // A settle in flight is heading back to the rest center
        let view_center = if self.timeline.is_running(AnimationTag::Settle) {
            self.rest_center
        } else {
            self.values.center
        };
        self.timeline.stop(
            &AnimationTarget::new()
                .center(self.rest_center)
                .backdrop_alpha(self.config.max_backdrop_alpha),
        );

        let response = self
            .controller
            .handle(event, view_center, self.viewport.height);
        self.apply(response);
        true
    }

    fn scroll_drag(&mut self, event: &DragEvent) -> bool {
        if !self.zoom.supports_zoom() {
            return false;
        }
        match event.phase {
            DragPhase::Began => self.scroll_translation = Some(Vector::ZERO),
            DragPhase::Changed | DragPhase::Ended => {
                // Without a Began the first event only sets the baseline
                let last = self.scroll_translation.unwrap_or(event.translation);
                self.zoom.scroll_by(Vector::new(
                    last.x - event.translation.x,
                    last.y - event.translation.y,
                ));
                self.scroll_translation =
                    (event.phase == DragPhase::Changed).then_some(event.translation);
            }
            DragPhase::Cancelled => self.scroll_translation = None,
        }
        true
    }

    /// Toggle between identity zoom and the double-tap magnification
    pub fn handle_double_tap(&mut self, at: Point) -> bool {
        if self.state != OverlayState::Presented || !self.zoom.supports_zoom() {
            return false;
        }
        if self.zoom.scale() == IDENTITY_SCALE {
            let center = self.zoom.convert_to_content(at);
            let rect = zoom_rect_for_scale(
                self.zoom.content_size(),
                self.config.double_tap_scale,
                center,
            );
            tracing::debug!(?center, "Double tap zoom in");
            self.zoom.zoom_to_rect(rect, true);
            // Zooming in; stop panning before the first zoom step lands
            self.set_pan_enabled(false);
        } else {
            tracing::debug!("Double tap zoom reset");
            self.zoom.set_scale(IDENTITY_SCALE, true);
        }
        true
    }

    /// Apply one pinch step
    pub fn handle_pinch(&mut self, factor: f32, anchor: Point) -> bool {
        if self.state != OverlayState::Presented || !self.zoom.supports_zoom() {
            return false;
        }
        self.zoom.pinch(factor, anchor);
        self.sync_pan_gate();
        true
    }

    /// The zoom component reported a new scale
    pub fn handle_zoom_changed(&mut self, scale: f32) {
        self.sync_pan_gate_to(scale);
    }

    /// The video reached its end; loop it
    pub fn handle_playback_ended(&mut self) -> bool {
        match self.playback.as_mut() {
            Some(playback) => {
                playback.on_end();
                true
            }
            None => false,
        }
    }

    /// Advance animations by `dt`
    pub fn tick(&mut self, dt: Duration) {
        if let Some(scale) = self.zoom.tick(dt) {
            self.sync_pan_gate_to(scale);
        }

        let completions = self.timeline.tick(&mut self.values, dt);
        for completion in completions {
            self.complete(completion);
        }
    }

    fn complete(&mut self, completion: Completion) {
        match completion.tag {
            AnimationTag::Present => {
                if self.state == OverlayState::Presented {
                    self.did_appear();
                }
            }
            AnimationTag::Dismiss if completion.finished => self.close(),
            AnimationTag::Dismiss | AnimationTag::Settle => {}
        }
    }

    /// Register one handler per gesture kind on `source`
    ///
    /// Handlers hold a weak reference; dropping the overlay makes them no-ops.
    pub fn attach(this: &Rc<RefCell<Self>>, source: &mut GestureSource) -> Vec<SubscriptionId> {
        let drag = Rc::downgrade(this);
        let tap = Rc::downgrade(this);
        let pinch = Rc::downgrade(this);
        let ended = Rc::downgrade(this);
        let zoom = Rc::downgrade(this);

        vec![
            source.subscribe_drag(move |e| {
                if let Some(overlay) = drag.upgrade() {
                    overlay.borrow_mut().handle_drag(e);
                }
            }),
            source.subscribe_double_tap(move |at| {
                if let Some(overlay) = tap.upgrade() {
                    overlay.borrow_mut().handle_double_tap(at);
                }
            }),
            source.subscribe_pinch(move |factor, anchor| {
                if let Some(overlay) = pinch.upgrade() {
                    overlay.borrow_mut().handle_pinch(factor, anchor);
                }
            }),
            source.subscribe_playback_ended(move || {
                if let Some(overlay) = ended.upgrade() {
                    overlay.borrow_mut().handle_playback_ended();
                }
            }),
            source.subscribe_zoom(move |scale| {
                if let Some(overlay) = zoom.upgrade() {
                    overlay.borrow_mut().handle_zoom_changed(scale);
                }
            }),
        ]
    }

    /// Remove handlers registered by `attach`
    pub fn detach(source: &mut GestureSource, subscriptions: &[SubscriptionId]) {
        for id in subscriptions {
            source.unsubscribe(*id);
        }
    }

    pub fn media(&self) -> &PreviewMedia {
        &self.media
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Whether the overlay currently owns a surface
    pub fn is_visible(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_dismissed(&self) -> bool {
        self.state == OverlayState::Dismissed
    }

    pub fn is_animating(&self) -> bool {
        self.timeline.is_animating()
    }

    pub fn is_pan_enabled(&self) -> bool {
        self.pan_enabled
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.is_tracking()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn content_center(&self) -> Point {
        self.values.center
    }

    /// Frame of the unzoomed content, following the drag
    pub fn content_frame(&self) -> Rect {
        Rect::centered(self.values.center, self.viewport)
    }

    pub fn backdrop_alpha(&self) -> f32 {
        self.values.backdrop_alpha
    }

    /// Presentation opacity (cross-dissolve)
    pub fn opacity(&self) -> f32 {
        self.values.opacity
    }

    pub fn zoom_scale(&self) -> f32 {
        self.zoom.scale()
    }

    pub fn zoom_offset(&self) -> Vector {
        self.zoom.content_offset()
    }

    pub fn playback(&self) -> Option<&LoopingPlayback> {
        self.playback.as_ref()
    }
}

impl EventHandler for PreviewOverlay {
    fn handle_event(&mut self, event: &GestureEvent) -> bool {
        match *event {
            GestureEvent::Drag(ref drag) => self.handle_drag(drag),
            GestureEvent::DoubleTap(at) => self.handle_double_tap(at),
            GestureEvent::Pinch { factor, anchor } => self.handle_pinch(factor, anchor),
            GestureEvent::PlaybackEnded => self.handle_playback_ended(),
            GestureEvent::ZoomChanged(scale) => {
                self.handle_zoom_changed(scale);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{FramePlayer, StillImage};
    use crate::presentation::{PresentationHost, SurfaceId};

    const VIEWPORT: Size = Size {
        width: 400.0,
        height: 800.0,
    };
    const FRAME: Duration = Duration::from_millis(16);

    #[derive(Default)]
    struct FakeHost {
        acquired: u32,
        released: Vec<SurfaceId>,
    }

    impl PresentationHost for FakeHost {
        fn acquire_surface(&mut self, _animated: bool) -> Result<SurfaceId> {
            self.acquired += 1;
            Ok(SurfaceId(self.acquired as u64))
        }

        fn release_surface(&mut self, id: SurfaceId) {
            self.released.push(id);
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn image() -> PreviewMedia {
        PreviewMedia::image(StillImage::from_rgb(vec![128; 12], 2, 2).unwrap())
    }

    fn shown(config: PreviewConfig) -> (PreviewOverlay, Rc<RefCell<FakeHost>>) {
        let host = Rc::new(RefCell::new(FakeHost::default()));
        let mut overlay = PreviewOverlay::new(image(), config);
        overlay.show(host.clone(), false).unwrap();
        overlay.layout(VIEWPORT);
        (overlay, host)
    }

    fn run(overlay: &mut PreviewOverlay, total: Duration) {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            overlay.tick(FRAME);
            elapsed += FRAME;
        }
    }

    #[test]
    fn test_bounce_back_restores_origin_and_alpha() {
        let (mut overlay, host) = shown(PreviewConfig::default());
        let origin = overlay.content_center();
        assert_eq!(origin, Point::new(200.0, 400.0));

        overlay.handle_drag(&DragEvent::began());
        overlay.handle_drag(&DragEvent::ended(0.0, 50.0));
        assert_eq!(overlay.content_center(), Point::new(200.0, 450.0));

        run(&mut overlay, Duration::from_millis(300));
        assert_eq!(overlay.content_center(), origin);
        assert_eq!(overlay.backdrop_alpha(), 1.0);
        assert_eq!(overlay.state(), OverlayState::Presented);
        assert!(host.borrow().released.is_empty());
    }

    #[test]
    fn test_committed_drag_exits_and_closes_once() {
        let closed = Rc::new(RefCell::new(0));
        let counter = closed.clone();
        let host = Rc::new(RefCell::new(FakeHost::default()));
        let mut overlay = PreviewOverlay::new(image(), PreviewConfig::default())
            .on_close(move || *counter.borrow_mut() += 1);
        overlay.show(host.clone(), false).unwrap();
        overlay.layout(VIEWPORT);

        overlay.handle_drag(&DragEvent::began());
        overlay.handle_drag(&DragEvent::ended(0.0, 300.0));
        assert_eq!(overlay.state(), OverlayState::Dismissing);
        assert!(overlay.is_visible());

        // Gestures no longer interfere with the exit
        assert!(!overlay.handle_drag(&DragEvent::began()));

        run(&mut overlay, Duration::from_millis(300));
        assert_eq!(overlay.content_center(), Point::new(200.0, 1200.0));
        assert_eq!(overlay.backdrop_alpha(), 0.0);
        assert!(overlay.is_dismissed());
        assert!(!overlay.is_visible());
        assert_eq!(host.borrow().released, vec![SurfaceId(1)]);
        assert_eq!(*closed.borrow(), 1);

        run(&mut overlay, Duration::from_millis(100));
        assert_eq!(*closed.borrow(), 1);
    }

    #[test]
    fn test_cancel_returns_to_pre_drag_values() {
        let (mut overlay, _host) = shown(PreviewConfig::default());
        overlay.handle_drag(&DragEvent::began());
        overlay.handle_drag(&DragEvent::changed(30.0, 600.0));
        assert_eq!(overlay.backdrop_alpha(), 0.25);

        overlay.handle_drag(&DragEvent::cancelled(30.0, 600.0));
        run(&mut overlay, Duration::from_millis(300));
        assert_eq!(overlay.content_center(), Point::new(200.0, 400.0));
        assert_eq!(overlay.backdrop_alpha(), 1.0);
        assert!(!overlay.is_dismissed());
    }

    #[test]
    fn test_double_tap_zooms_and_gates_pan() {
        let (mut overlay, _host) = shown(PreviewConfig::default());
        assert!(overlay.handle_double_tap(Point::new(200.0, 400.0)));
        assert!(!overlay.is_pan_enabled());

        run(&mut overlay, Duration::from_millis(300));
        assert!(approx(overlay.zoom_scale(), 4.0));
        assert!(!overlay.is_pan_enabled());
        assert!(overlay.handle_drag(&DragEvent::began()));
        assert!(!overlay.is_dragging());

        overlay.handle_double_tap(Point::new(10.0, 10.0));
        run(&mut overlay, Duration::from_millis(300));
        assert_eq!(overlay.zoom_scale(), 1.0);
        assert!(overlay.is_pan_enabled());
        assert!(overlay.handle_drag(&DragEvent::began()));
    }

    #[test]
    fn test_regrab_during_settle_follows_pointer_and_rests() {
        let (mut overlay, _host) = shown(PreviewConfig::default());
        let rest = overlay.content_center();

        overlay.handle_drag(&DragEvent::began());
        overlay.handle_drag(&DragEvent::ended(0.0, 100.0));
        run(&mut overlay, Duration::from_millis(100));
        assert!(overlay.content_center().y > rest.y);

        // Grab again halfway through the bounce back
        overlay.handle_drag(&DragEvent::began());
        overlay.handle_drag(&DragEvent::changed(0.0, 60.0));
        assert_eq!(overlay.content_center(), Point::new(200.0, 460.0));
        let alpha = overlay.backdrop_alpha();

        overlay.tick(FRAME);
        assert_eq!(overlay.content_center(), Point::new(200.0, 460.0));
        assert_eq!(overlay.backdrop_alpha(), alpha);

        overlay.handle_drag(&DragEvent::ended(0.0, 10.0));
        run(&mut overlay, Duration::from_millis(640));
        assert_eq!(overlay.content_center(), rest);
        assert_eq!(overlay.backdrop_alpha(), 1.0);
        assert_eq!(overlay.state(), OverlayState::Presented);
    }

    #[test]
    fn test_drag_scrolls_zoomed_content() {
        let (mut overlay, _host) = shown(PreviewConfig::default());
        overlay.handle_double_tap(Point::new(200.0, 400.0));
        run(&mut overlay, Duration::from_millis(480));
        assert!(approx(overlay.zoom_scale(), 4.0));
        let offset = overlay.zoom_offset();

        assert!(overlay.handle_drag(&DragEvent::began()));
        overlay.handle_drag(&DragEvent::changed(-50.0, -50.0));
        let moved = overlay.zoom_offset();
        assert!(approx(moved.x, offset.x + 50.0));
        assert!(approx(moved.y, offset.y + 50.0));

        overlay.handle_drag(&DragEvent::ended(-60.0, -50.0));
        assert!(approx(overlay.zoom_offset().x, offset.x + 60.0));
        assert!(approx(overlay.zoom_offset().y, offset.y + 50.0));

        assert!(!overlay.is_dragging());
        assert_eq!(overlay.content_center(), Point::new(200.0, 400.0));
        assert_eq!(overlay.state(), OverlayState::Presented);
    }

    #[test]
    fn test_pinch_disables_pan_until_identity() {
        let (mut overlay, _host) = shown(PreviewConfig::default());
        overlay.handle_pinch(1.5, Point::new(100.0, 100.0));
        assert!(!overlay.is_pan_enabled());
        overlay.handle_pinch(1.0 / 1.5, Point::new(100.0, 100.0));
        assert!(overlay.zoom_scale() == 1.0 || !overlay.is_pan_enabled());
        overlay.handle_pinch(0.5, Point::new(100.0, 100.0));
        assert_eq!(overlay.zoom_scale(), 1.0);
        assert!(overlay.is_pan_enabled());
    }

    #[test]
    fn test_zoom_notification_reasserts_gate() {
        let (mut overlay, _host) = shown(PreviewConfig::default());
        overlay.handle_event(&GestureEvent::ZoomChanged(2.0));
        assert!(!overlay.is_pan_enabled());
        overlay.handle_event(&GestureEvent::ZoomChanged(1.0));
        assert!(overlay.is_pan_enabled());
    }

    #[test]
    fn test_zoom_during_drag_cancels_it() {
        let (mut overlay, _host) = shown(PreviewConfig::default());
        overlay.handle_drag(&DragEvent::began());
        overlay.handle_drag(&DragEvent::changed(0.0, 100.0));
        overlay.handle_pinch(2.0, Point::new(200.0, 400.0));

        assert!(!overlay.is_dragging());
        run(&mut overlay, Duration::from_millis(300));
        assert_eq!(overlay.content_center(), Point::new(200.0, 400.0));
    }

    #[test]
    fn test_direct_strategy_ignores_zoom_gestures() {
        let (mut overlay, _host) = shown(PreviewConfig::direct());
        assert!(!overlay.handle_double_tap(Point::new(200.0, 400.0)));
        assert!(!overlay.handle_pinch(2.0, Point::ZERO));
        assert_eq!(overlay.zoom_scale(), 1.0);
        assert!(overlay.handle_drag(&DragEvent::began()));
    }

    #[test]
    fn test_layout_flush_cancels_in_flight_drag() {
        let (mut overlay, _host) = shown(PreviewConfig::default());
        overlay.handle_drag(&DragEvent::began());
        overlay.handle_drag(&DragEvent::changed(0.0, 350.0));

        overlay.will_layout();
        assert!(!overlay.is_dragging());
        assert!(overlay.is_pan_enabled());
        overlay.did_layout(Size::new(800.0, 400.0));

        run(&mut overlay, Duration::from_millis(300));
        assert_eq!(overlay.content_center(), Point::new(400.0, 200.0));
        assert_eq!(overlay.backdrop_alpha(), 1.0);
        assert!(!overlay.is_dismissed());
    }

    #[test]
    fn test_layout_without_flush_keeps_drag() {
        let config = PreviewConfig::default().with_flush_pan_before_layout(false);
        let (mut overlay, _host) = shown(config);
        overlay.handle_drag(&DragEvent::began());
        overlay.handle_drag(&DragEvent::changed(0.0, 50.0));
        overlay.will_layout();
        assert!(overlay.is_dragging());
    }

    #[test]
    fn test_animated_show_cross_dissolves_then_plays() {
        let host = Rc::new(RefCell::new(FakeHost::default()));
        let player = Rc::new(RefCell::new(FramePlayer::new(Vec::new(), 30)));
        let mut overlay = PreviewOverlay::new(PreviewMedia::video("clip.mp4"), PreviewConfig::default())
            .with_player(Box::new(player.clone()));

        overlay.show(host.clone(), true).unwrap();
        assert_eq!(overlay.opacity(), 0.0);
        assert!(!player.borrow().is_playing());

        run(&mut overlay, Duration::from_millis(350));
        assert_eq!(overlay.opacity(), 1.0);
        assert!(player.borrow().is_playing());

        assert!(overlay.handle_event(&GestureEvent::PlaybackEnded));
        assert_eq!(overlay.playback().map(|p| p.loops()), Some(1));
    }

    #[test]
    fn test_dismissal_pauses_video() {
        let host = Rc::new(RefCell::new(FakeHost::default()));
        let player = Rc::new(RefCell::new(FramePlayer::new(Vec::new(), 30)));
        let mut overlay = PreviewOverlay::new(PreviewMedia::video("clip.mp4"), PreviewConfig::direct())
            .with_player(Box::new(player.clone()));
        overlay.show(host, false).unwrap();
        overlay.layout(VIEWPORT);
        assert!(player.borrow().is_playing());

        overlay.handle_drag(&DragEvent::began());
        overlay.handle_drag(&DragEvent::ended(0.0, -400.0));
        run(&mut overlay, Duration::from_millis(300));
        assert_eq!(overlay.content_center(), Point::new(200.0, -400.0));
        assert!(!player.borrow().is_playing());
    }

    #[test]
    fn test_show_twice_fails_and_drop_releases_surface() {
        let (mut overlay, host) = shown(PreviewConfig::default());
        assert!(overlay.show(host.clone(), false).is_err());
        assert_eq!(host.borrow().acquired, 1);

        drop(overlay);
        assert_eq!(host.borrow().released, vec![SurfaceId(1)]);
    }

    #[test]
    fn test_gestures_ignored_before_show() {
        let mut overlay = PreviewOverlay::new(image(), PreviewConfig::default());
        assert!(!overlay.handle_drag(&DragEvent::began()));
        assert!(!overlay.handle_double_tap(Point::ZERO));
    }

    #[test]
    fn test_restore_fails_fast() {
        assert!(PreviewOverlay::restore(b"{}").is_err());
    }

    #[test]
    fn test_attach_routes_source_events() {
        let host = Rc::new(RefCell::new(FakeHost::default()));
        let overlay = Rc::new(RefCell::new(PreviewOverlay::new(
            image(),
            PreviewConfig::default(),
        )));
        overlay.borrow_mut().show(host, false).unwrap();
        overlay.borrow_mut().layout(VIEWPORT);

        let mut source = GestureSource::new();
        let subscriptions = PreviewOverlay::attach(&overlay, &mut source);
        assert_eq!(subscriptions.len(), 5);

        source.dispatch(&GestureEvent::Drag(DragEvent::began()));
        source.dispatch(&GestureEvent::Drag(DragEvent::changed(0.0, 40.0)));
        assert!(overlay.borrow().is_dragging());
        assert_eq!(overlay.borrow().content_center(), Point::new(200.0, 440.0));

        PreviewOverlay::detach(&mut source, &subscriptions);
        assert!(source.is_empty());
    }
}
