//! mkpreview - A minimalist full-screen media preview overlay
//!
//! Shows one image or video above everything else with:
//! - Pan-to-dismiss with a backdrop that fades as the content is dragged away
//! - Double-tap and pinch zoom, with panning gated on the zoom scale
//! - Looping video playback driven through a `Player`
//! - Scoped presentation surfaces that are always given back
//! - A terminal host (feature `tui`) drawing with truecolor half-blocks

pub mod animation;
pub mod config;
pub mod dismiss;
pub mod event;
pub mod gesture;
pub mod layout;
pub mod media;
pub mod overlay;
pub mod presentation;
pub mod zoom;

#[cfg(feature = "tui")]
pub mod render;
#[cfg(feature = "tui")]
pub mod terminal;

// Re-export commonly used types
pub use animation::{AnimatedValues, AnimationTag, AnimationTarget, Completion, Easing, Timeline};
pub use config::PreviewConfig;
pub use dismiss::{DismissController, DismissDecision, DragResponse};
pub use event::{
    DragEvent, DragPhase, Event, EventHandler, FrameTimer, GestureEvent, Key, PointerInput,
};
pub use gesture::{GestureRecognizer, GestureSource, SubscriptionId};
pub use layout::{Point, Rect, Size, Vector};
pub use media::{
    FramePlayer, ImageData, LoopingPlayback, MediaKind, Player, PreviewMedia, StillImage,
    VideoSource,
};
pub use overlay::{OverlayState, PreviewOverlay};
pub use presentation::{PresentationHost, SharedHost, SurfaceGuard, SurfaceId};
pub use zoom::{FixedZoom, ScrollZoom, ZoomProvider, ZoomStrategy};

#[cfg(feature = "tui")]
pub use event::EventPoller;
#[cfg(feature = "tui")]
pub use render::{Compositor, FrameParams, Renderer};
#[cfg(feature = "tui")]
pub use terminal::TerminalGeometry;
