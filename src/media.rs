//! Media payloads and playback control
//!
//! An overlay shows exactly one piece of media: a still image or a video.
//! Videos are played by an external `Player`; the overlay only tells it when
//! to play, pause and loop.

use crate::layout::Size;
use anyhow::{anyhow, bail, Result};
use image::GenericImageView;
use std::cell::{OnceCell, RefCell};
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

/// Which payload an overlay carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Pixel data format
#[derive(Debug, Clone)]
pub enum ImageData {
    /// Raw RGB bytes (3 bytes per pixel)
    Rgb(Vec<u8>),
    /// Raw RGBA bytes (4 bytes per pixel)
    Rgba(Vec<u8>),
    /// Encoded file contents (PNG, JPEG, ...)
    Encoded(Vec<u8>),
}

impl ImageData {
    /// Get the raw RGB data, converting from other formats if necessary
    pub fn to_rgb(&self, width: u32, height: u32) -> Result<Vec<u8>> {
        match self {
            ImageData::Rgb(data) => Ok(data.clone()),
            ImageData::Rgba(data) => {
                // Drop alpha
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                for chunk in data.chunks_exact(4) {
                    rgb.extend_from_slice(&chunk[..3]);
                }
                Ok(rgb)
            }
            ImageData::Encoded(data) => {
                let img = image::load_from_memory(data)?;
                Ok(img.to_rgb8().into_raw())
            }
        }
    }
}

/// A still image with known pixel dimensions
#[derive(Debug, Clone)]
pub struct StillImage {
    data: ImageData,
    width: u32,
    height: u32,
    /// RGB pixels of encoded data, decoded on first use
    decoded: OnceCell<Vec<u8>>,
}

impl StillImage {
    /// Create a new image from RGB data
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if data.len() != (width as usize) * (height as usize) * 3 {
            bail!("RGB buffer does not match {}x{}", width, height);
        }
        Ok(StillImage {
            data: ImageData::Rgb(data),
            width,
            height,
            decoded: OnceCell::new(),
        })
    }

    /// Create a new image from RGBA data
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            bail!("RGBA buffer does not match {}x{}", width, height);
        }
        Ok(StillImage {
            data: ImageData::Rgba(data),
            width,
            height,
            decoded: OnceCell::new(),
        })
    }

    /// Create a new image from encoded file contents
    ///
    /// Only the header is read here; pixels are decoded on first use.
    pub fn from_encoded(data: Vec<u8>) -> Result<Self> {
        let (width, height) = image::ImageReader::new(Cursor::new(&data))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(StillImage {
            data: ImageData::Encoded(data),
            width,
            height,
            decoded: OnceCell::new(),
        })
    }

    /// Load and decode an image file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref())?;
        let (width, height) = img.dimensions();
        Ok(StillImage {
            data: ImageData::Rgb(img.to_rgb8().into_raw()),
            width,
            height,
            decoded: OnceCell::new(),
        })
    }

    /// Get image dimensions in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel dimensions as a layout size
    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    pub fn data(&self) -> &ImageData {
        &self.data
    }

    pub fn to_rgb(&self) -> Result<Vec<u8>> {
        if !matches!(self.data, ImageData::Encoded(_)) {
            return self.data.to_rgb(self.width, self.height);
        }
        if let Some(rgb) = self.decoded.get() {
            return Ok(rgb.clone());
        }
        let rgb = self.data.to_rgb(self.width, self.height)?;
        Ok(self.decoded.get_or_init(|| rgb).clone())
    }

    /// Decoded RGB buffer for sampling
    pub fn to_rgb_image(&self) -> Result<image::RgbImage> {
        let rgb = self.to_rgb()?;
        image::RgbImage::from_raw(self.width, self.height, rgb)
            .ok_or_else(|| anyhow!("RGB buffer does not match {}x{}", self.width, self.height))
    }
}

/// Reference to a video resource, resolved by the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    uri: String,
}

impl VideoSource {
    pub fn new(uri: impl Into<String>) -> Self {
        VideoSource { uri: uri.into() }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// The payload of a preview overlay
#[derive(Debug, Clone)]
pub enum PreviewMedia {
    Image(StillImage),
    Video(VideoSource),
}

impl PreviewMedia {
    pub fn image(image: StillImage) -> Self {
        PreviewMedia::Image(image)
    }

    pub fn video(uri: impl Into<String>) -> Self {
        PreviewMedia::Video(VideoSource::new(uri))
    }

    /// Build from a kind tag and two optional slots
    ///
    /// Exactly the slot named by `kind` must be populated.
    pub fn from_parts(
        kind: MediaKind,
        image: Option<StillImage>,
        video: Option<VideoSource>,
    ) -> Result<Self> {
        match (kind, image, video) {
            (MediaKind::Image, Some(image), None) => Ok(PreviewMedia::Image(image)),
            (MediaKind::Video, None, Some(video)) => Ok(PreviewMedia::Video(video)),
            (kind, image, video) => bail!(
                "{:?} media needs exactly its own payload (image: {}, video: {})",
                kind,
                image.is_some(),
                video.is_some()
            ),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            PreviewMedia::Image(_) => MediaKind::Image,
            PreviewMedia::Video(_) => MediaKind::Video,
        }
    }

    pub fn as_image(&self) -> Option<&StillImage> {
        match self {
            PreviewMedia::Image(image) => Some(image),
            PreviewMedia::Video(_) => None,
        }
    }

    pub fn as_video(&self) -> Option<&VideoSource> {
        match self {
            PreviewMedia::Video(video) => Some(video),
            PreviewMedia::Image(_) => None,
        }
    }
}

/// External video player controlled by the overlay
pub trait Player {
    fn play(&mut self);
    fn pause(&mut self);
    /// Jump back to the first frame without changing play state
    fn seek_to_start(&mut self);
    fn is_playing(&self) -> bool;
}

impl<P: Player> Player for Rc<RefCell<P>> {
    fn play(&mut self) {
        self.borrow_mut().play();
    }

    fn pause(&mut self) {
        self.borrow_mut().pause();
    }

    fn seek_to_start(&mut self) {
        self.borrow_mut().seek_to_start();
    }

    fn is_playing(&self) -> bool {
        self.borrow().is_playing()
    }
}

/// Plays on appear, pauses on disappear, loops forever
pub struct LoopingPlayback {
    player: Box<dyn Player>,
    loops: u64,
}

impl std::fmt::Debug for LoopingPlayback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopingPlayback")
            .field("playing", &self.player.is_playing())
            .field("loops", &self.loops)
            .finish()
    }
}

impl LoopingPlayback {
    pub fn new(player: Box<dyn Player>) -> Self {
        LoopingPlayback { player, loops: 0 }
    }

    pub fn on_appear(&mut self) {
        self.player.play();
    }

    pub fn on_disappear(&mut self) {
        self.player.pause();
    }

    /// The item reached its end; start over
    pub fn on_end(&mut self) {
        self.loops += 1;
        self.player.seek_to_start();
    }

    /// How many times playback wrapped around
    pub fn loops(&self) -> u64 {
        self.loops
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }
}

/// Frame-sequence player
///
/// Holds decoded frames and a playback position. When the position reaches
/// the end it stays on the last frame and reports the end once; the caller
/// decides whether to seek back.
#[derive(Debug, Clone)]
pub struct FramePlayer {
    frames: Vec<StillImage>,
    frame_duration: Duration,
    position: Duration,
    playing: bool,
    end_reported: bool,
}

impl FramePlayer {
    pub fn new(frames: Vec<StillImage>, fps: u32) -> Self {
        FramePlayer {
            frames,
            frame_duration: Duration::from_nanos(1_000_000_000 / fps.max(1) as u64),
            position: Duration::ZERO,
            playing: false,
            end_reported: false,
        }
    }

    /// Total length of the sequence
    pub fn duration(&self) -> Duration {
        self.frame_duration * self.frames.len() as u32
    }

    /// Index of the frame at the current position
    pub fn frame_index(&self) -> usize {
        if self.frames.is_empty() {
            return 0;
        }
        let index = (self.position.as_nanos() / self.frame_duration.as_nanos().max(1)) as usize;
        index.min(self.frames.len() - 1)
    }

    pub fn current_frame(&self) -> Option<&StillImage> {
        self.frames.get(self.frame_index())
    }

    /// Advance playback; returns true exactly when the end is first reached
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.playing || self.frames.is_empty() {
            return false;
        }
        self.position = (self.position + dt).min(self.duration());
        if self.position >= self.duration() && !self.end_reported {
            self.end_reported = true;
            return true;
        }
        false
    }
}

impl Player for FramePlayer {
    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek_to_start(&mut self) {
        self.position = Duration::ZERO;
        self.end_reported = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
