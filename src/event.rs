//! Event system - gesture events, raw pointer input, and terminal events

use crate::layout::{Point, Vector};
use std::time::{Duration, Instant};

#[cfg(feature = "tui")]
use anyhow::Result;

/// Phase of a continuous drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Began,
    Changed,
    Cancelled,
    Ended,
}

/// One tick of a continuous drag
///
/// `translation` is cumulative from the point where the drag began, measured
/// in the coordinate space of the dragged view's parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    pub phase: DragPhase,
    pub translation: Vector,
}

impl DragEvent {
    pub fn new(phase: DragPhase, translation: Vector) -> Self {
        DragEvent { phase, translation }
    }

    pub fn began() -> Self {
        Self::new(DragPhase::Began, Vector::ZERO)
    }

    pub fn changed(x: f32, y: f32) -> Self {
        Self::new(DragPhase::Changed, Vector::new(x, y))
    }

    pub fn ended(x: f32, y: f32) -> Self {
        Self::new(DragPhase::Ended, Vector::new(x, y))
    }

    pub fn cancelled(x: f32, y: f32) -> Self {
        Self::new(DragPhase::Cancelled, Vector::new(x, y))
    }
}

/// Recognized gestures and media notifications delivered to the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Continuous drag
    Drag(DragEvent),
    /// Double tap at a point in the parent coordinate space
    DoubleTap(Point),
    /// Pinch step: multiply the zoom scale by `factor` around `anchor`
    Pinch { factor: f32, anchor: Point },
    /// The video player reached the end of its item
    PlaybackEnded,
    /// The zoom component changed its scale
    ZoomChanged(f32),
}

/// Keyboard key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Up,
    Down,
    Left,
    Right,
    Backspace,
    Enter,
    Tab,
    Esc,
    Null,
}

/// Raw pointer input, before gesture recognition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Press(Point),
    Move(Point),
    Release(Point),
    /// Wheel step, positive away from the user
    Scroll { delta: f32, at: Point },
}

/// UI events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Keyboard event
    Key(Key),
    /// Pointer event
    Pointer(PointerInput),
    /// Terminal resized (new cols, new rows)
    Resize(u16, u16),
    /// Focus gained
    FocusGained,
    /// Focus lost
    FocusLost,
}

/// Event handler trait for gesture consumers
pub trait EventHandler {
    /// Handle a gesture event, return true if consumed
    fn handle_event(&mut self, _event: &GestureEvent) -> bool {
        false
    }
}

/// Event polling and conversion from crossterm events
#[cfg(feature = "tui")]
pub struct EventPoller {
    _enabled: bool,
}

#[cfg(feature = "tui")]
impl EventPoller {
    /// Create a new event poller, enabling raw mode and mouse capture
    pub fn new() -> Result<Self> {
        crossterm::terminal::enable_raw_mode()?;

        // Mouse capture is what drives the gestures, so this one must succeed
        crossterm::execute!(std::io::stdout(), crossterm::event::EnableMouseCapture)?;
        let _ = crossterm::execute!(std::io::stdout(), crossterm::event::EnableFocusChange);

        Ok(EventPoller { _enabled: true })
    }

    /// Poll for next event with timeout
    pub fn poll(&self, timeout: Duration) -> Result<Option<Event>> {
        if crossterm::event::poll(timeout)? {
            let event = crossterm::event::read()?;
            Ok(convert_crossterm_event(event))
        } else {
            Ok(None)
        }
    }

    /// Drain every event that is already queued
    pub fn drain(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        while crossterm::event::poll(Duration::ZERO)? {
            if let Some(event) = convert_crossterm_event(crossterm::event::read()?) {
                events.push(event);
            }
        }
        Ok(events)
    }
}

#[cfg(feature = "tui")]
impl Drop for EventPoller {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::DisableMouseCapture,
            crossterm::event::DisableFocusChange,
        );
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

/// Convert crossterm event to our Event type
///
/// Events with no counterpart (right/middle buttons, paste) are dropped.
#[cfg(feature = "tui")]
fn convert_crossterm_event(event: crossterm::event::Event) -> Option<Event> {
    use crossterm::event::{Event as CEvent, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};

    match event {
        CEvent::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) => {
            if kind == KeyEventKind::Release {
                return None;
            }
            Some(Event::Key(convert_key(code, modifiers)))
        }
        CEvent::Mouse(me) => {
            let at = cell_point(me.column, me.row);
            let input = match me.kind {
                MouseEventKind::Down(MouseButton::Left) => PointerInput::Press(at),
                MouseEventKind::Up(MouseButton::Left) => PointerInput::Release(at),
                MouseEventKind::Drag(MouseButton::Left) => PointerInput::Move(at),
                MouseEventKind::ScrollUp => PointerInput::Scroll { delta: 1.0, at },
                MouseEventKind::ScrollDown => PointerInput::Scroll { delta: -1.0, at },
                _ => return None,
            };
            Some(Event::Pointer(input))
        }
        CEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
        CEvent::FocusGained => Some(Event::FocusGained),
        CEvent::FocusLost => Some(Event::FocusLost),
        CEvent::Paste(_) => None,
    }
}

/// Center of a character cell, in cell units
#[cfg(feature = "tui")]
fn cell_point(col: u16, row: u16) -> Point {
    Point::new(col as f32 + 0.5, row as f32 + 0.5)
}

/// Convert crossterm key code to our Key type
#[cfg(feature = "tui")]
fn convert_key(code: crossterm::event::KeyCode, mods: crossterm::event::KeyModifiers) -> Key {
    use crossterm::event::{KeyCode, KeyModifiers};

    if mods.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(c) = code {
            return Key::Ctrl(c);
        }
    }

    match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Esc => Key::Esc,
        _ => Key::Null,
    }
}

/// Frame timing for animation
pub struct FrameTimer {
    frame_duration: Duration,
    last_frame: Instant,
}

impl FrameTimer {
    pub fn new(fps: u32) -> Self {
        Self {
            frame_duration: Duration::from_nanos(1_000_000_000 / fps.max(1) as u64),
            last_frame: Instant::now(),
        }
    }

    /// Time until next frame (zero if frame is due)
    pub fn time_to_next_frame(&self) -> Duration {
        self.frame_duration.saturating_sub(self.last_frame.elapsed())
    }

    /// Mark frame as rendered, returns time elapsed since the previous frame
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        elapsed
    }

    /// Check if a frame is due now
    pub fn frame_due(&self) -> bool {
        self.last_frame.elapsed() >= self.frame_duration
    }
}
