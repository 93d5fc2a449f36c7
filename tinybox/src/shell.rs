//! Shell: command dispatcher running on the main thread (spec.md §6).
//!
//! Reads whole lines off the Input Bus (line editing itself happens in the
//! window driver as keystrokes arrive) and dispatches whitespace-separated
//! commands against the Display Surface, the Filestore, and the VM.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use time::OffsetDateTime;

use crate::cpu::Cpu;
use crate::display::Surface;
use crate::error::FsError;
use crate::fs::Filestore;
use crate::input::InputBus;
use crate::palette::COLOR_ERROR;

const MAX_HISTORY: usize = 50;
const PROMPT_COLOR: u8 = 10;

pub struct Shell {
    history: Vec<String>,
    started_at: Instant,
    saved_color: u8,
}

impl Shell {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            started_at: Instant::now(),
            saved_color: 7,
        }
    }

    fn error(&self, surface: &mut Surface, msg: &str) {
        let prev = surface.current_color;
        surface.current_color = COLOR_ERROR;
        surface.print_str(format!("Error: {msg}\n").as_bytes());
        surface.current_color = prev;
    }

    fn print_prompt(&self, surface: &mut Surface) {
        let prev = surface.current_color;
        surface.current_color = PROMPT_COLOR;
        surface.print_str(b"tinybox> ");
        surface.current_color = prev;
    }

    /// Print the initial prompt. `System` owns the read-line loop so it can
    /// publish the surface to the display thread between commands.
    pub fn start(&self, surface: &mut Surface) {
        self.print_prompt(surface);
    }

    /// Process one already-read line: records history, dispatches, and
    /// reprints the prompt unless the command ended the shell.
    #[allow(clippy::too_many_arguments)]
    pub fn run_once(
        &mut self,
        line: &str,
        surface: &mut Surface,
        input: &InputBus,
        fsx: &mut Filestore,
        cpu: &mut Cpu,
        window_running: &AtomicBool,
    ) {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            if self.history.len() == MAX_HISTORY {
                self.history.remove(0);
            }
            self.history.push(trimmed.to_string());
        }
        surface.print_str(b"\n");
        log::debug!("shell: dispatching {trimmed:?}");
        if self.dispatch(trimmed, surface, input, fsx, cpu, window_running) {
            if window_running.load(Ordering::Relaxed) {
                self.print_prompt(surface);
            }
        } else {
            surface.print_str(b"\n");
        }
    }

    /// Returns `false` when the shell should stop (exit/quit).
    #[allow(clippy::too_many_arguments)]
    fn dispatch(
        &mut self,
        line: &str,
        surface: &mut Surface,
        input: &InputBus,
        fsx: &mut Filestore,
        cpu: &mut Cpu,
        window_running: &AtomicBool,
    ) -> bool {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            return true;
        };
        let args: Vec<&str> = parts.collect();

        match cmd {
            "help" => self.cmd_help(surface),
            "clear" | "cls" => surface.clear_screen(),
            "ls" | "dir" => self.cmd_ls(surface, fsx),
            "cat" => self.cmd_cat(surface, fsx, &args),
            "rm" => self.cmd_rm(surface, fsx, &args),
            "cp" => self.cmd_cp(surface, fsx, &args),
            "mv" => self.cmd_mv(surface, fsx, &args),
            "touch" => self.cmd_touch(surface, fsx, &args),
            "echo" => {
                surface.print_str(args.join(" ").as_bytes());
                surface.print_str(b"\n");
            }
            "date" => self.cmd_date(surface),
            "uptime" => self.cmd_uptime(surface),
            "meminfo" => self.cmd_meminfo(surface, cpu),
            "sysinfo" => self.cmd_sysinfo(surface),
            "hexdump" => self.cmd_hexdump(surface, fsx, &args),
            "history" => self.cmd_history(surface),
            "banner" => self.cmd_banner(surface, &args),
            "color" => self.cmd_color(surface, &args),
            "matrix" => self.cmd_matrix(surface, input, window_running),
            "starfield" => self.cmd_starfield(surface, input, window_running),
            "about" => {
                surface.print_str(
                    b"tinybox -- a fantasy microcomputer. 64K of memory, eight registers,\n\
                      an 80x25 text grid and a 320x200 pixel plane.\n",
                );
            }
            "run" => self.cmd_run(surface, input, fsx, cpu, &args, window_running),
            "exit" | "quit" => {
                surface.print_str(b"bye.\n");
                window_running.store(false, Ordering::Relaxed);
                return false;
            }
            other => self.error(surface, &format!("unknown command '{other}'")),
        }
        true
    }

    fn cmd_help(&self, surface: &mut Surface) {
        surface.print_str(
            b"help | clear|cls | ls|dir | cat <f> | rm <f> | cp <s> <d> | mv <s> <d>\n\
              touch <f> | echo <...> | date | uptime | meminfo | sysinfo\n\
              hexdump <f> | history | banner <...> | color [0..15] | matrix\n\
              starfield | about | run <f> | exit|quit\n",
        );
    }

    fn cmd_ls(&self, surface: &mut Surface, fsx: &Filestore) {
        for entry in fsx.list() {
            surface.print_str(format!("{:<24} {:>8}\n", entry.name, entry.size).as_bytes());
        }
    }

    fn cmd_cat(&self, surface: &mut Surface, fsx: &Filestore, args: &[&str]) {
        let Some(name) = args.first() else {
            return self.error(surface, "usage: cat <file>");
        };
        match fsx.read(name) {
            Ok(data) => surface.print_str(&data),
            Err(e) => self.error(surface, &e.to_string()),
        }
    }

    fn cmd_rm(&self, surface: &mut Surface, fsx: &mut Filestore, args: &[&str]) {
        let Some(name) = args.first() else {
            return self.error(surface, "usage: rm <file>");
        };
        if let Err(e) = fsx.remove(name) {
            self.error(surface, &e.to_string());
        }
    }

    fn cmd_cp(&self, surface: &mut Surface, fsx: &mut Filestore, args: &[&str]) {
        let (Some(src), Some(dst)) = (args.first(), args.get(1)) else {
            return self.error(surface, "usage: cp <src> <dst>");
        };
        if let Err(e) = fsx.copy(src, dst) {
            self.error(surface, &e.to_string());
        }
    }

    fn cmd_mv(&self, surface: &mut Surface, fsx: &mut Filestore, args: &[&str]) {
        let (Some(src), Some(dst)) = (args.first(), args.get(1)) else {
            return self.error(surface, "usage: mv <src> <dst>");
        };
        if let Err(e) = fsx.rename(src, dst) {
            self.error(surface, &e.to_string());
        }
    }

    fn cmd_touch(&self, surface: &mut Surface, fsx: &mut Filestore, args: &[&str]) {
        let Some(name) = args.first() else {
            return self.error(surface, "usage: touch <file>");
        };
        if let Err(e) = fsx.touch(name) {
            self.error(surface, &e.to_string());
        }
    }

    fn cmd_date(&self, surface: &mut Surface) {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        surface.print_str(format!("{now}\n").as_bytes());
    }

    fn cmd_uptime(&self, surface: &mut Surface) {
        let secs = self.started_at.elapsed().as_secs();
        let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        surface.print_str(format!("{h}h {m}m {s}s\n").as_bytes());
    }

    fn cmd_meminfo(&self, surface: &mut Surface, cpu: &Cpu) {
        surface.print_str(
            format!(
                "pc={:04x} sp={:3} flags={:03b}\nregs: {:?}\n",
                cpu.pc, cpu.sp, cpu.flags, cpu.regs
            )
            .as_bytes(),
        );
    }

    fn cmd_sysinfo(&self, surface: &mut Surface) {
        let prev = surface.current_color;
        surface.current_color = 11;
        surface.print_str(
            b"tinybox v0.1 -- virtual 16-bit RISC\n\
              64 KiB RAM, 8 registers, 80x25 text / 320x200 pixels\n",
        );
        surface.current_color = prev;
    }

    fn cmd_hexdump(&self, surface: &mut Surface, fsx: &Filestore, args: &[&str]) {
        let Some(name) = args.first() else {
            return self.error(surface, "usage: hexdump <file>");
        };
        let data = match fsx.read(name) {
            Ok(d) => d,
            Err(e) => return self.error(surface, &e.to_string()),
        };
        for (i, chunk) in data.chunks(16).enumerate() {
            let mut line = format!("{:04x}: ", i * 16);
            for b in chunk {
                line.push_str(&format!("{b:02x} "));
            }
            for _ in chunk.len()..16 {
                line.push_str("   ");
            }
            line.push_str("| ");
            for &b in chunk {
                line.push(if (0x20..0x7f).contains(&b) { b as char } else { '.' });
            }
            line.push('\n');
            surface.print_str(line.as_bytes());
        }
    }

    fn cmd_history(&self, surface: &mut Surface) {
        for (i, cmd) in self.history.iter().enumerate() {
            surface.print_str(format!("{:3}  {cmd}\n", i + 1).as_bytes());
        }
    }

    fn cmd_banner(&self, surface: &mut Surface, args: &[&str]) {
        let text = args.join(" ");
        let rule = "=".repeat(text.len().max(1) + 4);
        surface.print_str(format!("{rule}\n| {text} |\n{rule}\n").as_bytes());
    }

    fn cmd_color(&mut self, surface: &mut Surface, args: &[&str]) {
        let Some(arg) = args.first() else {
            return self.error(surface, "usage: color [0..15]");
        };
        match arg.parse::<u8>() {
            Ok(c) if c < 16 => {
                self.saved_color = c;
                surface.current_color = c;
            }
            _ => self.error(surface, "color must be 0..15"),
        }
    }

    /// Runs until `window_running` clears or a keystroke arrives on the
    /// Input Bus, whichever comes first (any stale keypress left over from
    /// the command line that invoked this is drained first).
    fn cmd_matrix(&self, surface: &mut Surface, input: &InputBus, window_running: &AtomicBool) {
        let _ = input.read_char(|| false);
        surface.clear_pixels();
        for i in 0..crate::display::PIXEL_H {
            if !window_running.load(Ordering::Relaxed) || input.key_pressed() {
                break;
            }
            let x = (i * 37) % crate::display::PIXEL_W;
            surface.set_pixel(x as i32, i as i32, true);
        }
        surface.clear_pixels();
    }

    fn cmd_starfield(&self, surface: &mut Surface, input: &InputBus, window_running: &AtomicBool) {
        let _ = input.read_char(|| false);
        surface.clear_pixels();
        for i in 0..200u32 {
            if !window_running.load(Ordering::Relaxed) || input.key_pressed() {
                break;
            }
            let x = ((i * 17) % crate::display::PIXEL_W as u32) as i32;
            let y = ((i * 53) % crate::display::PIXEL_H as u32) as i32;
            surface.set_pixel(x, y, true);
        }
        surface.clear_pixels();
    }

    #[allow(clippy::too_many_arguments)]
    fn cmd_run(
        &self,
        surface: &mut Surface,
        input: &InputBus,
        fsx: &Filestore,
        cpu: &mut Cpu,
        args: &[&str],
        window_running: &AtomicBool,
    ) {
        let Some(name) = args.first() else {
            return self.error(surface, "usage: run <file>");
        };
        let image = match fsx.read(name) {
            Ok(d) => d,
            Err(FsError::FileNotFound(n)) => return self.error(surface, &format!("file not found: {n}")),
            Err(e) => return self.error(surface, &e.to_string()),
        };
        cpu.reset();
        if let Err(e) = cpu.load(&image) {
            return self.error(surface, &e.to_string());
        }
        cpu.run(surface, input, window_running);
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use tempfile::tempdir;

    fn harness() -> (Shell, Surface, InputBus, Filestore, Cpu, AtomicBool) {
        let dir = tempdir().unwrap();
        (
            Shell::new(),
            Surface::new(),
            InputBus::new(),
            Filestore::open(dir.path()).unwrap(),
            Cpu::new(),
            AtomicBool::new(true),
        )
    }

    #[test]
    fn unknown_command_prints_error() {
        let (mut shell, mut surface, input, mut fsx, mut cpu, running) = harness();
        shell.dispatch("frobnicate", &mut surface, &input, &mut fsx, &mut cpu, &running);
        let line: String = surface.chars[0].iter().map(|&b| b as char).collect();
        assert!(line.starts_with("Error: unknown command 'frobnicate'"));
    }

    #[test]
    fn echo_prints_arguments() {
        let (mut shell, mut surface, input, mut fsx, mut cpu, running) = harness();
        shell.dispatch("echo hello world", &mut surface, &input, &mut fsx, &mut cpu, &running);
        let line: String = surface.chars[0].iter().take(11).map(|&b| b as char).collect();
        assert_eq!(line, "hello world");
    }

    #[test]
    fn exit_clears_window_running() {
        let (mut shell, mut surface, input, mut fsx, mut cpu, running) = harness();
        let keep_going = shell.dispatch("exit", &mut surface, &input, &mut fsx, &mut cpu, &running);
        assert!(!keep_going);
        assert!(!running.load(Ordering::Relaxed));
    }

    #[test]
    fn history_records_nonempty_commands() {
        let (mut shell, mut surface, input, mut fsx, mut cpu, running) = harness();
        shell.history.push("ls".to_string());
        shell.dispatch("history", &mut surface, &input, &mut fsx, &mut cpu, &running);
        let line: String = surface.chars[0].iter().map(|&b| b as char).collect();
        assert!(line.contains("ls"));
    }

    #[test]
    fn cat_missing_file_is_recoverable_error() {
        let (mut shell, mut surface, input, mut fsx, mut cpu, running) = harness();
        shell.dispatch("cat nope.bin", &mut surface, &input, &mut fsx, &mut cpu, &running);
        let line: String = surface.chars[0].iter().map(|&b| b as char).collect();
        assert!(line.starts_with("Error:"));
    }
}
