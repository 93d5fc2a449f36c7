//! Top-level wiring: owns the CPU, Display Surface, Filestore, and Shell on
//! the main thread, and the shared handles the display thread needs
//! (spec.md §9 — "System split into main-owned and display-owned views").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::cpu::Cpu;
use crate::display::Surface;
use crate::error::FsError;
use crate::fs::Filestore;
use crate::input::InputBus;
use crate::shell::Shell;
use crate::window::WindowDriver;

pub struct System {
    pub cpu: Cpu,
    pub surface: Surface,
    pub fsx: Filestore,
    pub shell: Shell,
    pub input: Arc<InputBus>,
    pub window_running: Arc<AtomicBool>,
    window: WindowDriver,
}

impl System {
    pub fn new(fs_dir: impl AsRef<std::path::Path>) -> Result<Self, FsError> {
        Ok(Self {
            cpu: Cpu::new(),
            surface: Surface::new(),
            fsx: Filestore::open(fs_dir)?,
            shell: Shell::new(),
            input: Arc::new(InputBus::new()),
            window_running: Arc::new(AtomicBool::new(true)),
            window: WindowDriver::new(),
        })
    }

    /// Spawns the display thread and waits ~1s for the window to appear
    /// (spec.md §5 startup sequence), then returns its join handle.
    pub fn spawn_display_thread(&self, scale: u32) -> JoinHandle<()> {
        let view = self.window.handle();
        let input = self.input.clone();
        let window_running = self.window_running.clone();
        let handle = std::thread::spawn(move || {
            if let Err(e) = WindowDriver::run(view, input, window_running, scale) {
                log::error!("display thread exited: {e}");
            }
        });
        std::thread::sleep(Duration::from_millis(1000));
        handle
    }

    /// Called after every shell iteration to publish the latest surface to
    /// the display thread.
    pub fn publish(&self) {
        self.window.publish(&self.surface);
    }

    /// Runs the shell loop until `exit`/`quit` or window close, publishing
    /// the surface to the display thread between commands.
    pub fn run_shell(&mut self) {
        self.shell.start(&mut self.surface);
        self.publish();
        loop {
            if !self.window_running.load(Ordering::Relaxed) {
                break;
            }
            let Some(line) = self
                .input
                .read_line(|| self.window_running.load(Ordering::Relaxed))
            else {
                break;
            };
            self.shell.run_once(
                &line,
                &mut self.surface,
                &self.input,
                &mut self.fsx,
                &mut self.cpu,
                &self.window_running,
            );
            self.publish();
        }
    }

    pub fn shutdown(&self, handle: JoinHandle<()>) {
        self.window_running.store(false, Ordering::Relaxed);
        let _ = handle.join();
    }
}
