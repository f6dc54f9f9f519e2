//! mkpreview demo - Two buttons opening an image or a looping video preview
//!
//! Keys `1`/`2` (or clicking the buttons) open the previews. Drag the content
//! vertically to dismiss it, double-click to zoom, scroll to pinch. `q` quits.
//! An image path may be passed as the first argument. Logs go to
//! `preview_demo.log`; set `RUST_LOG` to adjust.

use anyhow::Result;
use image::RgbImage;
use mkpreview::{
    Event, EventPoller, FramePlayer, FrameTimer, GestureEvent, GestureRecognizer, GestureSource,
    Key, PointerInput, PreviewConfig, PreviewMedia, PreviewOverlay, Renderer, SharedHost,
    StillImage, SubscriptionId,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Instant;

const IMAGE_BUTTON_ROW: u16 = 2;
const VIDEO_BUTTON_ROW: u16 = 4;

/// The preview currently on screen
struct Active {
    overlay: Rc<RefCell<PreviewOverlay>>,
    subscriptions: Vec<SubscriptionId>,
    still: Option<RgbImage>,
    player: Option<Rc<RefCell<FramePlayer>>>,
}

impl Active {
    /// Frame to draw: the still image or the player's current frame
    fn frame(&self) -> Result<Option<RgbImage>> {
        if let Some(still) = &self.still {
            return Ok(Some(still.clone()));
        }
        match &self.player {
            Some(player) => player
                .borrow()
                .current_frame()
                .map(StillImage::to_rgb_image)
                .transpose(),
            None => Ok(None),
        }
    }
}

fn main() -> Result<()> {
    let log = std::fs::File::create("preview_demo.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mkpreview=debug")),
        )
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let image = match std::env::args().nth(1) {
        Some(path) => StillImage::open(path)?,
        None => gradient(64, 48, 0)?,
    };

    let renderer = Rc::new(RefCell::new(Renderer::new()?));
    let host: SharedHost = renderer.clone();
    let events = EventPoller::new()?;
    let mut recognizer = GestureRecognizer::new();
    let mut source = GestureSource::new();
    let mut timer = FrameTimer::new(60);
    let mut active: Option<Active> = None;

    draw_home(&mut renderer.borrow_mut())?;

    'main: loop {
        let mut pending = Vec::new();
        if let Some(event) = events.poll(timer.time_to_next_frame())? {
            pending.push(event);
            pending.extend(events.drain()?);
        }

        for event in pending {
            match event {
                Event::Key(Key::Char('q')) | Event::Key(Key::Ctrl('c')) => break 'main,
                Event::Key(Key::Char('1')) if active.is_none() => {
                    active = Some(open_image(&image, &host, &renderer, &mut source)?);
                }
                Event::Key(Key::Char('2')) if active.is_none() => {
                    active = Some(open_video(&host, &renderer, &mut source)?);
                }
                Event::Pointer(input) if active.is_some() => {
                    for gesture in recognizer.handle(input, Instant::now()) {
                        source.dispatch(&gesture);
                    }
                }
                Event::Pointer(PointerInput::Press(at)) => match at.y as u16 {
                    IMAGE_BUTTON_ROW => {
                        active = Some(open_image(&image, &host, &renderer, &mut source)?);
                    }
                    VIDEO_BUTTON_ROW => {
                        active = Some(open_video(&host, &renderer, &mut source)?);
                    }
                    _ => {}
                },
                Event::Resize(_, _) => {
                    renderer.borrow_mut().refresh_geometry()?;
                    match &active {
                        Some(current) => {
                            if let Some(cancelled) = recognizer.flush() {
                                source.dispatch(&cancelled);
                            }
                            let viewport = renderer.borrow().geometry().viewport();
                            current.overlay.borrow_mut().layout(viewport);
                        }
                        None => draw_home(&mut renderer.borrow_mut())?,
                    }
                }
                _ => {}
            }
        }

        if !timer.frame_due() {
            continue;
        }
        let dt = timer.tick();

        let Some(current) = active.as_ref() else {
            continue;
        };

        if let Some(player) = &current.player {
            let ended = player.borrow_mut().tick(dt);
            if ended {
                source.dispatch(&GestureEvent::PlaybackEnded);
            }
        }
        current.overlay.borrow_mut().tick(dt);

        if current.overlay.borrow().is_dismissed() {
            PreviewOverlay::detach(&mut source, &current.subscriptions);
            active = None;
            recognizer = GestureRecognizer::new();
            draw_home(&mut renderer.borrow_mut())?;
            continue;
        }

        let frame = current.frame()?;
        renderer
            .borrow_mut()
            .draw_overlay(&current.overlay.borrow(), frame.as_ref())?;
    }

    // Release any surface before the renderer restores the terminal
    drop(active);
    drop(events);
    println!("mkpreview demo finished");
    Ok(())
}

fn draw_home(renderer: &mut Renderer) -> Result<()> {
    renderer.write_text("\x1b[0m")?;
    renderer.clear()?;
    renderer.hide_cursor()?;
    renderer.move_cursor(2, IMAGE_BUTTON_ROW)?;
    renderer.write_styled("[ 1  View image ]", "\x1b[1m")?;
    renderer.move_cursor(2, VIDEO_BUTTON_ROW)?;
    renderer.write_styled("[ 2  View video ]", "\x1b[1m")?;
    renderer.move_cursor(2, VIDEO_BUTTON_ROW + 2)?;
    renderer.write_styled("q to quit", "\x1b[2m")?;
    renderer.flush()
}

fn present(
    overlay: PreviewOverlay,
    host: &SharedHost,
    renderer: &Rc<RefCell<Renderer>>,
    source: &mut GestureSource,
) -> Result<(Rc<RefCell<PreviewOverlay>>, Vec<SubscriptionId>)> {
    let overlay = Rc::new(RefCell::new(overlay));
    overlay.borrow_mut().show(host.clone(), true)?;
    let viewport = renderer.borrow().geometry().viewport();
    overlay.borrow_mut().layout(viewport);
    let subscriptions = PreviewOverlay::attach(&overlay, source);
    Ok((overlay, subscriptions))
}

fn open_image(
    image: &StillImage,
    host: &SharedHost,
    renderer: &Rc<RefCell<Renderer>>,
    source: &mut GestureSource,
) -> Result<Active> {
    let still = image.to_rgb_image()?;
    let overlay = PreviewOverlay::new(PreviewMedia::image(image.clone()), PreviewConfig::default());
    let (overlay, subscriptions) = present(overlay, host, renderer, source)?;
    Ok(Active {
        overlay,
        subscriptions,
        still: Some(still),
        player: None,
    })
}

fn open_video(
    host: &SharedHost,
    renderer: &Rc<RefCell<Renderer>>,
    source: &mut GestureSource,
) -> Result<Active> {
    let frames = (0..24)
        .map(|i| gradient(48, 36, i * 10))
        .collect::<Result<Vec<_>>>()?;
    let player = Rc::new(RefCell::new(FramePlayer::new(frames, 12)));
    let overlay = PreviewOverlay::new(
        PreviewMedia::video("synthetic://gradient"),
        PreviewConfig::direct(),
    )
    .with_player(Box::new(player.clone()));
    let (overlay, subscriptions) = present(overlay, host, renderer, source)?;
    Ok(Active {
        overlay,
        subscriptions,
        still: None,
        player: Some(player),
    })
}

/// Diagonal color gradient, shifted by `phase`
fn gradient(width: u32, height: u32, phase: u32) -> Result<StillImage> {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push(((x * 255 / width.max(1) + phase) % 256) as u8);
            data.push((y * 255 / height.max(1)) as u8);
            data.push(((phase * 2 + 96) % 256) as u8);
        }
    }
    StillImage::from_rgb(data, width, height)
}
