//! Gesture recognition and typed gesture subscriptions
//!
//! `GestureRecognizer` turns raw pointer input into drags, double taps and
//! pinches. `GestureSource` fans recognized gestures out to handlers that
//! subscribed to one gesture kind each.

use crate::event::{DragEvent, DragPhase, GestureEvent, PointerInput};
use crate::layout::{Point, Vector};
use std::time::{Duration, Instant};

/// Time threshold for double-tap detection
const DOUBLE_TAP_INTERVAL: Duration = Duration::from_millis(350);

/// Maximum distance between the two presses of a double tap
const DOUBLE_TAP_SLOP: f32 = 1.0;

/// Zoom factor for one wheel step
const PINCH_STEP: f32 = 1.25;

#[derive(Debug, Clone, Copy)]
struct Tracking {
    start: Point,
    last: Point,
    /// Whether `Began` was emitted (first movement seen)
    began: bool,
}

impl Tracking {
    fn translation(&self) -> Vector {
        self.last.offset_from(self.start)
    }
}

/// Pointer-to-gesture recognizer
///
/// A press starts tracking; the first movement emits `Began` followed by
/// `Changed`; release emits `Ended`. Disabling the recognizer while a drag is
/// in flight emits `Cancelled` and forgets the pointer until the next press.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    enabled: bool,
    tracking: Option<Tracking>,
    last_press: Option<(Instant, Point)>,
    double_tap_interval: Duration,
    double_tap_slop: f32,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        GestureRecognizer {
            enabled: true,
            tracking: None,
            last_press: None,
            double_tap_interval: DOUBLE_TAP_INTERVAL,
            double_tap_slop: DOUBLE_TAP_SLOP,
        }
    }

    pub fn with_double_tap_interval(mut self, interval: Duration) -> Self {
        self.double_tap_interval = interval;
        self
    }

    pub fn with_double_tap_slop(mut self, slop: f32) -> Self {
        self.double_tap_slop = slop;
        self
    }

    /// Whether drag recognition is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a drag is in flight
    pub fn is_dragging(&self) -> bool {
        self.tracking.is_some_and(|t| t.began)
    }

    /// Enable or disable drag recognition
    ///
    /// Returns the `Cancelled` event when disabling interrupts a drag.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<GestureEvent> {
        self.enabled = enabled;
        if enabled {
            return None;
        }
        let tracking = self.tracking.take()?;
        tracking.began.then(|| {
            GestureEvent::Drag(DragEvent::new(
                DragPhase::Cancelled,
                tracking.translation(),
            ))
        })
    }

    /// Disable and immediately re-enable, resetting any in-flight drag
    pub fn flush(&mut self) -> Option<GestureEvent> {
        let was_enabled = self.enabled;
        let cancelled = self.set_enabled(false);
        self.enabled = was_enabled;
        cancelled
    }

    /// Feed one pointer input, returning the gestures it completes
    pub fn handle(&mut self, input: PointerInput, now: Instant) -> Vec<GestureEvent> {
        let mut out = Vec::new();

        match input {
            PointerInput::Press(at) => {
                let is_double_tap = self.last_press.is_some_and(|(t, p)| {
                    now.duration_since(t) < self.double_tap_interval
                        && at.offset_from(p).length() <= self.double_tap_slop
                });

                if is_double_tap {
                    self.last_press = None; // Reset to avoid triple-tap
                    self.tracking = None;
                    out.push(GestureEvent::DoubleTap(at));
                } else {
                    self.last_press = Some((now, at));
                    self.tracking = Some(Tracking {
                        start: at,
                        last: at,
                        began: false,
                    });
                }
            }
            PointerInput::Move(at) => {
                if !self.enabled {
                    return out;
                }
                if let Some(tracking) = self.tracking.as_mut() {
                    tracking.last = at;
                    if !tracking.began {
                        tracking.began = true;
                        // A drag's press never pairs into a double tap
                        self.last_press = None;
                        out.push(GestureEvent::Drag(DragEvent::began()));
                    }
                    out.push(GestureEvent::Drag(DragEvent::new(
                        DragPhase::Changed,
                        tracking.translation(),
                    )));
                }
            }
            PointerInput::Release(at) => {
                if let Some(mut tracking) = self.tracking.take() {
                    if tracking.began && self.enabled {
                        tracking.last = at;
                        out.push(GestureEvent::Drag(DragEvent::new(
                            DragPhase::Ended,
                            tracking.translation(),
                        )));
                    }
                }
            }
            PointerInput::Scroll { delta, at } => {
                out.push(GestureEvent::Pinch {
                    factor: PINCH_STEP.powf(delta),
                    anchor: at,
                });
            }
        }

        out
    }
}

/// Handle returned by the `subscribe_*` methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Handler {
    Drag(Box<dyn FnMut(&DragEvent)>),
    DoubleTap(Box<dyn FnMut(Point)>),
    Pinch(Box<dyn FnMut(f32, Point)>),
    PlaybackEnded(Box<dyn FnMut()>),
    Zoom(Box<dyn FnMut(f32)>),
}

impl Handler {
    /// Invoke if the handler subscribed to this event's kind
    fn invoke(&mut self, event: &GestureEvent) -> bool {
        match (self, event) {
            (Handler::Drag(f), GestureEvent::Drag(drag)) => f(drag),
            (Handler::DoubleTap(f), GestureEvent::DoubleTap(at)) => f(*at),
            (Handler::Pinch(f), GestureEvent::Pinch { factor, anchor }) => f(*factor, *anchor),
            (Handler::PlaybackEnded(f), GestureEvent::PlaybackEnded) => f(),
            (Handler::Zoom(f), GestureEvent::ZoomChanged(scale)) => f(*scale),
            _ => return false,
        }
        true
    }
}

/// Registry of typed gesture handlers
#[derive(Default)]
pub struct GestureSource {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler)>,
}

impl std::fmt::Debug for GestureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureSource")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl GestureSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    pub fn subscribe_drag(&mut self, f: impl FnMut(&DragEvent) + 'static) -> SubscriptionId {
        self.register(Handler::Drag(Box::new(f)))
    }

    pub fn subscribe_double_tap(&mut self, f: impl FnMut(Point) + 'static) -> SubscriptionId {
        self.register(Handler::DoubleTap(Box::new(f)))
    }

    pub fn subscribe_pinch(&mut self, f: impl FnMut(f32, Point) + 'static) -> SubscriptionId {
        self.register(Handler::Pinch(Box::new(f)))
    }

    pub fn subscribe_playback_ended(&mut self, f: impl FnMut() + 'static) -> SubscriptionId {
        self.register(Handler::PlaybackEnded(Box::new(f)))
    }

    pub fn subscribe_zoom(&mut self, f: impl FnMut(f32) + 'static) -> SubscriptionId {
        self.register(Handler::Zoom(Box::new(f)))
    }

    /// Remove a handler, returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() != before
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver an event to every handler of its kind, returns how many ran
    pub fn dispatch(&mut self, event: &GestureEvent) -> usize {
        self.handlers
            .iter_mut()
            .map(|(_, handler)| handler.invoke(event))
            .filter(|ran| *ran)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn drag_phases(events: &[GestureEvent]) -> Vec<DragPhase> {
        events
            .iter()
            .filter_map(|e| match e {
                GestureEvent::Drag(d) => Some(d.phase),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_press_move_release_produces_drag_sequence() {
        let mut recognizer = GestureRecognizer::new();
        let now = Instant::now();

        assert!(recognizer
            .handle(PointerInput::Press(Point::new(10.0, 10.0)), now)
            .is_empty());

        let moved = recognizer.handle(PointerInput::Move(Point::new(10.0, 14.0)), now);
        assert_eq!(drag_phases(&moved), vec![DragPhase::Began, DragPhase::Changed]);
        assert!(recognizer.is_dragging());

        let released = recognizer.handle(PointerInput::Release(Point::new(12.0, 20.0)), now);
        assert_eq!(
            released,
            vec![GestureEvent::Drag(DragEvent::ended(2.0, 10.0))]
        );
        assert!(!recognizer.is_dragging());
    }

    #[test]
    fn test_tap_without_movement_is_not_a_drag() {
        let mut recognizer = GestureRecognizer::new();
        let now = Instant::now();
        recognizer.handle(PointerInput::Press(Point::new(1.0, 1.0)), now);
        let released = recognizer.handle(PointerInput::Release(Point::new(1.0, 1.0)), now);
        assert!(released.is_empty());
    }

    #[test]
    fn test_press_after_drag_is_not_a_double_tap() {
        let mut recognizer = GestureRecognizer::new();
        let now = Instant::now();
        let at = Point::new(5.0, 5.0);

        recognizer.handle(PointerInput::Press(at), now);
        recognizer.handle(PointerInput::Move(Point::new(5.0, 9.0)), now);
        recognizer.handle(PointerInput::Release(Point::new(5.0, 9.0)), now);

        let next = recognizer.handle(PointerInput::Press(at), now + Duration::from_millis(100));
        assert!(next.is_empty());
        assert!(!recognizer.is_dragging());
    }

    #[test]
    fn test_double_tap_within_threshold() {
        let mut recognizer = GestureRecognizer::new();
        let now = Instant::now();
        let at = Point::new(5.0, 5.0);

        recognizer.handle(PointerInput::Press(at), now);
        recognizer.handle(PointerInput::Release(at), now);
        let second = recognizer.handle(PointerInput::Press(at), now + Duration::from_millis(100));
        assert_eq!(second, vec![GestureEvent::DoubleTap(at)]);

        // A third press starts over
        let third = recognizer.handle(PointerInput::Press(at), now + Duration::from_millis(150));
        assert!(third.is_empty());
    }

    #[test]
    fn test_slow_second_press_is_not_double_tap() {
        let mut recognizer = GestureRecognizer::new();
        let now = Instant::now();
        let at = Point::new(5.0, 5.0);
        recognizer.handle(PointerInput::Press(at), now);
        let second = recognizer.handle(PointerInput::Press(at), now + Duration::from_millis(500));
        assert!(second.is_empty());
    }

    #[test]
    fn test_flush_cancels_in_flight_drag() {
        let mut recognizer = GestureRecognizer::new();
        let now = Instant::now();
        recognizer.handle(PointerInput::Press(Point::new(0.0, 0.0)), now);
        recognizer.handle(PointerInput::Move(Point::new(0.0, 6.0)), now);

        assert_eq!(
            recognizer.flush(),
            Some(GestureEvent::Drag(DragEvent::cancelled(0.0, 6.0)))
        );
        assert!(recognizer.is_enabled());

        // The same pointer no longer drives a drag
        assert!(recognizer
            .handle(PointerInput::Move(Point::new(0.0, 9.0)), now)
            .is_empty());
        assert!(recognizer.flush().is_none());
    }

    #[test]
    fn test_disabled_recognizer_ignores_movement() {
        let mut recognizer = GestureRecognizer::new();
        let now = Instant::now();
        assert!(recognizer.set_enabled(false).is_none());
        recognizer.handle(PointerInput::Press(Point::new(0.0, 0.0)), now);
        assert!(recognizer
            .handle(PointerInput::Move(Point::new(0.0, 9.0)), now)
            .is_empty());
    }

    #[test]
    fn test_scroll_maps_to_pinch() {
        let mut recognizer = GestureRecognizer::new();
        let at = Point::new(2.0, 2.0);
        let out = recognizer.handle(PointerInput::Scroll { delta: 1.0, at }, Instant::now());
        assert_eq!(
            out,
            vec![GestureEvent::Pinch {
                factor: PINCH_STEP,
                anchor: at
            }]
        );
    }

    #[test]
    fn test_source_dispatches_by_kind() {
        let mut source = GestureSource::new();
        let drags = Rc::new(RefCell::new(Vec::new()));
        let taps = Rc::new(RefCell::new(0));

        let sink = drags.clone();
        let drag_id = source.subscribe_drag(move |e| sink.borrow_mut().push(e.phase));
        let counter = taps.clone();
        source.subscribe_double_tap(move |_| *counter.borrow_mut() += 1);

        assert_eq!(source.dispatch(&GestureEvent::Drag(DragEvent::began())), 1);
        assert_eq!(source.dispatch(&GestureEvent::DoubleTap(Point::ZERO)), 1);
        assert_eq!(source.dispatch(&GestureEvent::PlaybackEnded), 0);
        assert_eq!(*drags.borrow(), vec![DragPhase::Began]);
        assert_eq!(*taps.borrow(), 1);

        assert!(source.unsubscribe(drag_id));
        assert!(!source.unsubscribe(drag_id));
        assert_eq!(source.dispatch(&GestureEvent::Drag(DragEvent::began())), 0);
        assert_eq!(source.len(), 1);
    }
}
