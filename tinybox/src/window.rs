//! Host Window Driver: owns the SDL window/canvas, repaints at ~60 Hz, and
//! drains keyboard events into the Input Bus (spec.md §5's display thread).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::Color;
use sdl2::rect::Rect;

use crate::display::{Surface, COLS, PIXEL_H, PIXEL_W, ROWS};
use crate::input::InputBus;
use crate::palette::rgb;

const CELL_W: u32 = 8;
const CELL_H: u32 = 16;
const PIXEL_SCALE: u32 = 2;
const TICK: Duration = Duration::from_millis(16);

pub struct WindowDriver {
    surface: Arc<std::sync::Mutex<SurfaceView>>,
}

/// A snapshot-based read side for the window driver. The VM's `Surface`
/// lives on the main thread (spec.md §5: single writer by convention); the
/// driver only ever sees copies taken via `Surface::snapshot`, handed over
/// through this small mutex-guarded mailbox.
pub(crate) struct SurfaceView {
    chars: Vec<[u8; COLS]>,
    colors: Vec<[u8; COLS]>,
    pixels: Vec<Vec<bool>>,
    pixel_mode: bool,
    cursor_x: usize,
    cursor_y: usize,
    cursor_visible: bool,
}

impl WindowDriver {
    pub fn new() -> Self {
        Self {
            surface: Arc::new(std::sync::Mutex::new(SurfaceView {
                chars: vec![[b' '; COLS]; ROWS],
                colors: vec![[7u8; COLS]; ROWS],
                pixels: vec![vec![false; PIXEL_W]; PIXEL_H],
                pixel_mode: false,
                cursor_x: 0,
                cursor_y: 0,
                cursor_visible: true,
            })),
        }
    }

    /// Main thread calls this after every batch of VM/shell work to publish
    /// what the display thread should paint next tick.
    pub fn publish(&self, surface: &Surface) {
        let (chars, colors) = surface.snapshot();
        let mut view = self.surface.lock().unwrap();
        view.chars = chars;
        view.colors = colors;
        view.pixels = surface.pixels.iter().map(|row| row.to_vec()).collect();
        view.pixel_mode = surface.pixel_mode;
        view.cursor_x = surface.cursor_x;
        view.cursor_y = surface.cursor_y;
        view.cursor_visible = surface.cursor_visible;
    }

    pub fn handle(&self) -> Arc<std::sync::Mutex<SurfaceView>> {
        self.surface.clone()
    }

    /// Runs the SDL event/repaint loop until `window_running` is cleared or
    /// the user closes the window. Intended to run on its own thread.
    pub fn run(
        view: Arc<std::sync::Mutex<SurfaceView>>,
        input: Arc<InputBus>,
        window_running: Arc<AtomicBool>,
        scale: u32,
    ) -> Result<(), String> {
        let sdl_ctx = sdl2::init()?;
        let video = sdl_ctx.video()?;
        let scale = scale.max(1);
        let win_w = (COLS as u32 * CELL_W).max(PIXEL_W as u32 * PIXEL_SCALE) * scale;
        let win_h = (ROWS as u32 * CELL_H).max(PIXEL_H as u32 * PIXEL_SCALE) * scale;
        let window = video
            .window("tinybox", win_w, win_h)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;
        let mut canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let mut event_pump = sdl_ctx.event_pump()?;

        while window_running.load(Ordering::Relaxed) {
            for event in event_pump.poll_iter() {
                match event {
                    Event::Quit { .. } => {
                        window_running.store(false, Ordering::Relaxed);
                    }
                    Event::TextInput { text, .. } => {
                        for c in text.bytes() {
                            input.push_printable(c);
                        }
                    }
                    Event::KeyDown {
                        keycode: Some(Keycode::Backspace),
                        ..
                    } => input.push_backspace(),
                    Event::KeyDown {
                        keycode: Some(Keycode::Return),
                        ..
                    } => input.push_enter(),
                    _ => {}
                }
            }

            let snapshot = view.lock().unwrap();
            if snapshot.pixel_mode {
                paint_pixels(&mut canvas, &snapshot);
            } else {
                paint_text(&mut canvas, &snapshot);
            }
            drop(snapshot);
            canvas.present();
            std::thread::sleep(TICK);
        }
        Ok(())
    }
}

impl Default for WindowDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn paint_text(canvas: &mut sdl2::render::WindowCanvas, view: &SurfaceView) {
    let (r, g, b) = rgb(0);
    canvas.set_draw_color(Color::RGB(r, g, b));
    canvas.clear();
    for (y, row) in view.chars.iter().enumerate() {
        for (x, &ch) in row.iter().enumerate() {
            if ch == b' ' {
                continue;
            }
            let color = view.colors[y][x];
            let (r, g, b) = rgb(color);
            canvas.set_draw_color(Color::RGB(r, g, b));
            let _ = canvas.fill_rect(Rect::new(
                x as i32 * CELL_W as i32,
                y as i32 * CELL_H as i32,
                CELL_W / 2,
                CELL_H / 2,
            ));
        }
    }
    if view.cursor_visible {
        let (r, g, b) = rgb(15);
        canvas.set_draw_color(Color::RGB(r, g, b));
        let _ = canvas.fill_rect(Rect::new(
            view.cursor_x as i32 * CELL_W as i32,
            view.cursor_y as i32 * CELL_H as i32 + CELL_H as i32 - 2,
            CELL_W,
            2,
        ));
    }
}

fn paint_pixels(canvas: &mut sdl2::render::WindowCanvas, view: &SurfaceView) {
    let (r, g, b) = rgb(0);
    canvas.set_draw_color(Color::RGB(r, g, b));
    canvas.clear();
    let (r, g, b) = rgb(15);
    canvas.set_draw_color(Color::RGB(r, g, b));
    for (y, row) in view.pixels.iter().enumerate() {
        for (x, &on) in row.iter().enumerate() {
            if on {
                let _ = canvas.fill_rect(Rect::new(
                    x as i32 * PIXEL_SCALE as i32,
                    y as i32 * PIXEL_SCALE as i32,
                    PIXEL_SCALE,
                    PIXEL_SCALE,
                ));
            }
        }
    }
}
