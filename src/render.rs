//! Terminal rendering - presentation surface and overlay drawing
//!
//! The overlay surface is the alternate screen: acquiring it switches to the
//! alternate buffer, releasing it switches back, which restores whatever the
//! host had drawn underneath. Frames are composed into a pixel grid and
//! written as truecolor `▀` half-blocks (two pixels per cell).
//!
//! Performance optimizations:
//! - Write buffering to minimize syscalls
//! - Color escapes only emitted when the color changes along a row
//! - Pre-allocated line buffer reused across rows

use crate::layout::{Point, Rect, Size, Vector};
use crate::overlay::PreviewOverlay;
use crate::presentation::{PresentationHost, SurfaceId};
use crate::terminal::TerminalGeometry;
use anyhow::{bail, Result};
use image::RgbImage;
use std::fmt::Write as _;
use std::io::{self, BufWriter, Write};

/// Default buffer capacity for write batching (16KB)
const WRITE_BUFFER_CAPACITY: usize = 16 * 1024;

pub type Rgb = [u8; 3];

/// Linear blend from `a` to `b`
fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let channel = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    [channel(a[0], b[0]), channel(a[1], b[1]), channel(a[2], b[2])]
}

/// Geometry and blend values of one overlay frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    /// Unzoomed content frame, in cells
    pub content_frame: Rect,
    pub zoom_scale: f32,
    /// Visible region offset within the zoomed content, in cells
    pub zoom_offset: Vector,
    pub backdrop_alpha: f32,
    pub opacity: f32,
}

impl FrameParams {
    pub fn of(overlay: &PreviewOverlay) -> Self {
        FrameParams {
            content_frame: overlay.content_frame(),
            zoom_scale: overlay.zoom_scale(),
            zoom_offset: overlay.zoom_offset(),
            backdrop_alpha: overlay.backdrop_alpha(),
            opacity: overlay.opacity(),
        }
    }
}

/// Composes overlay frames into half-block pixel grids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compositor {
    /// Color of the host screen under the overlay
    pub host_background: Rgb,
    /// Backdrop color at full alpha
    pub backdrop: Rgb,
}

impl Default for Compositor {
    fn default() -> Self {
        Compositor {
            host_background: [28, 28, 34],
            backdrop: [0, 0, 0],
        }
    }
}

impl Compositor {
    /// Compose one frame; returns `cols * rows * 2` pixels, row-major
    pub fn compose(
        &self,
        params: &FrameParams,
        image: Option<&RgbImage>,
        geometry: TerminalGeometry,
    ) -> Vec<Rgb> {
        let (width, height) = geometry.pixel_grid();
        let backdrop = mix(
            self.host_background,
            self.backdrop,
            params.backdrop_alpha * params.opacity,
        );
        let mut pixels = vec![backdrop; width * height];

        let Some(image) = image else {
            return pixels;
        };
        let (img_w, img_h) = image.dimensions();
        if img_w == 0 || img_h == 0 {
            return pixels;
        }

        // Aspect-fit in pixel space, then back to cell units
        let frame = params.content_frame;
        let fitted = Size::new(img_w as f32, img_h as f32)
            .fit_within(Size::new(frame.width, frame.height * 2.0));
        if fitted.is_empty() {
            return pixels;
        }
        let placed = Rect::new(
            (frame.width - fitted.width) / 2.0,
            (frame.height - fitted.height / 2.0) / 2.0,
            fitted.width,
            fitted.height / 2.0,
        );
        let scale = params.zoom_scale.max(f32::EPSILON);

        for py in 0..height {
            for px in 0..width {
                let at = Point::new(px as f32 + 0.5, (py as f32 + 0.5) / 2.0);
                let local = at.offset_from(frame.origin()) + params.zoom_offset;
                let content = Point::new(local.x / scale, local.y / scale);
                if !placed.contains(content) {
                    continue;
                }
                let u = ((content.x - placed.x) / placed.width * img_w as f32) as u32;
                let v = ((content.y - placed.y) / placed.height * img_h as f32) as u32;
                let sample = image.get_pixel(u.min(img_w - 1), v.min(img_h - 1)).0;
                pixels[py * width + px] = mix(backdrop, sample, params.opacity);
            }
        }

        pixels
    }
}

/// Encode one cell row: `top` pixels as foreground, `bottom` as background
pub fn encode_row(top: &[Rgb], bottom: &[Rgb], out: &mut String) {
    let mut fg: Option<Rgb> = None;
    let mut bg: Option<Rgb> = None;

    for (&t, &b) in top.iter().zip(bottom) {
        if fg != Some(t) {
            let _ = write!(out, "\x1b[38;2;{};{};{}m", t[0], t[1], t[2]);
            fg = Some(t);
        }
        if bg != Some(b) {
            let _ = write!(out, "\x1b[48;2;{};{};{}m", b[0], b[1], b[2]);
            bg = Some(b);
        }
        out.push('▀');
    }
}

/// Raw terminal renderer and overlay presentation host
///
/// Uses internal write buffering to minimize syscalls and improve performance.
/// Call `flush()` after a batch of operations to ensure output is displayed.
pub struct Renderer {
    /// Buffered writer for batching terminal output
    writer: BufWriter<io::Stdout>,
    geometry: TerminalGeometry,
    compositor: Compositor,
    in_alt_screen: bool,
    surface: Option<SurfaceId>,
    next_surface: u64,
    line_buffer: String,
}

impl Renderer {
    /// Create a new renderer for the current terminal
    pub fn new() -> Result<Self> {
        let geometry = TerminalGeometry::detect()?;
        let stdout = io::stdout();
        let writer = BufWriter::with_capacity(WRITE_BUFFER_CAPACITY, stdout);

        Ok(Renderer {
            writer,
            geometry,
            compositor: Compositor::default(),
            in_alt_screen: false,
            surface: None,
            next_surface: 0,
            line_buffer: String::with_capacity(256),
        })
    }

    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn geometry(&self) -> TerminalGeometry {
        self.geometry
    }

    /// Refresh terminal geometry (call after resize)
    pub fn refresh_geometry(&mut self) -> Result<()> {
        self.geometry = TerminalGeometry::detect()?;
        Ok(())
    }

    /// Enter alternative screen buffer
    ///
    /// Note: This immediately flushes to ensure the screen switch happens.
    pub fn enter_alt_screen(&mut self) -> Result<()> {
        if !self.in_alt_screen {
            write!(self.writer, "\x1b[?1049h")?;
            self.writer.flush()?;
            self.in_alt_screen = true;
        }
        Ok(())
    }

    /// Exit alternative screen buffer
    ///
    /// Note: This immediately flushes to ensure the screen switch happens.
    pub fn exit_alt_screen(&mut self) -> Result<()> {
        if self.in_alt_screen {
            write!(self.writer, "\x1b[?1049l")?;
            self.writer.flush()?;
            self.in_alt_screen = false;
        }
        Ok(())
    }

    /// Clear the screen
    pub fn clear(&mut self) -> Result<()> {
        write!(self.writer, "\x1b[2J")?;
        Ok(())
    }

    /// Move cursor to position (0-indexed)
    #[inline]
    pub fn move_cursor(&mut self, col: u16, row: u16) -> Result<()> {
        write!(self.writer, "\x1b[{};{}H", row + 1, col + 1)?;
        Ok(())
    }

    /// Hide cursor
    ///
    /// Note: Buffered - call flush() to ensure it takes effect immediately.
    pub fn hide_cursor(&mut self) -> Result<()> {
        write!(self.writer, "\x1b[?25l")?;
        Ok(())
    }

    /// Show cursor
    ///
    /// Note: Buffered - call flush() to ensure it takes effect immediately.
    pub fn show_cursor(&mut self) -> Result<()> {
        write!(self.writer, "\x1b[?25h")?;
        Ok(())
    }

    /// Write text at current cursor position
    #[inline]
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        write!(self.writer, "{}", text)?;
        Ok(())
    }

    /// Write text with ANSI color/style codes
    #[inline]
    pub fn write_styled(&mut self, text: &str, style: &str) -> Result<()> {
        write!(self.writer, "{}{}\x1b[0m", style, text)?;
        Ok(())
    }

    /// Flush output buffer to terminal
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Whether an overlay surface is currently shown
    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Draw one overlay frame onto the surface
    ///
    /// `image` is the decoded still image or the current video frame.
    pub fn draw_overlay(&mut self, overlay: &PreviewOverlay, image: Option<&RgbImage>) -> Result<()> {
        if self.surface.is_none() {
            return Ok(());
        }
        let params = FrameParams::of(overlay);
        let pixels = self.compositor.compose(&params, image, self.geometry);
        let (width, _) = self.geometry.pixel_grid();

        for row in 0..self.geometry.rows as usize {
            let top = &pixels[2 * row * width..(2 * row + 1) * width];
            let bottom = &pixels[(2 * row + 1) * width..(2 * row + 2) * width];
            self.line_buffer.clear();
            encode_row(top, bottom, &mut self.line_buffer);
            write!(self.writer, "\x1b[{};1H{}\x1b[0m", row + 1, self.line_buffer)?;
        }
        self.flush()
    }

    fn restore_screen(&mut self) -> Result<()> {
        self.write_text("\x1b[0m")?;
        self.exit_alt_screen()?;
        self.show_cursor()?;
        self.flush()
    }
}

impl PresentationHost for Renderer {
    fn acquire_surface(&mut self, _animated: bool) -> Result<SurfaceId> {
        if self.surface.is_some() {
            bail!("terminal already shows a preview surface");
        }
        self.enter_alt_screen()?;
        self.hide_cursor()?;
        self.clear()?;
        self.flush()?;

        self.next_surface += 1;
        let id = SurfaceId(self.next_surface);
        self.surface = Some(id);
        Ok(id)
    }

    fn release_surface(&mut self, id: SurfaceId) {
        if self.surface != Some(id) {
            tracing::warn!(surface = id.0, "Release of unknown surface");
            return;
        }
        self.surface = None;
        if let Err(e) = self.restore_screen() {
            tracing::warn!("Failed to restore terminal screen: {e:#}");
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        // Ensure we exit alt screen and show cursor on drop
        let _ = self.exit_alt_screen();
        let _ = self.show_cursor();
        let _ = self.writer.flush();
    }
}
