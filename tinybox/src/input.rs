//! Input Bus: keyboard intake shared between the window driver (writer) and
//! the shell / VM's `READ_CHAR` opcode (readers), spec.md §3, §4.3, §5.
//!
//! Guarded by a single mutex; critical sections only ever touch one line or
//! one character field, so contention is never an issue in practice.

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

const LINE_CAP: usize = 256;

#[derive(Default)]
pub struct InputState {
    pub line_buffer: Vec<u8>,
    pub line_ready: bool,
    pub last_char: u8,
    pub char_ready: bool,
}

pub struct InputBus {
    state: Mutex<InputState>,
}

impl Default for InputBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBus {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InputState::default()),
        }
    }

    /// Called by the window driver for a printable keystroke.
    pub fn push_printable(&self, c: u8) {
        let mut st = self.state.lock().unwrap();
        if st.line_buffer.len() < LINE_CAP - 1 {
            st.line_buffer.push(c);
        }
        st.last_char = c;
        st.char_ready = true;
    }

    /// Called by the window driver for Backspace.
    pub fn push_backspace(&self) {
        let mut st = self.state.lock().unwrap();
        st.line_buffer.pop();
    }

    /// Called by the window driver for Enter.
    pub fn push_enter(&self) {
        let mut st = self.state.lock().unwrap();
        st.line_ready = true;
        st.last_char = b'\n';
        st.char_ready = true;
    }

    /// Current fill, for the driver to echo backspace visually.
    pub fn pos(&self) -> usize {
        self.state.lock().unwrap().line_buffer.len()
    }

    /// Spin (50 ms back-off, spec.md §4.3) until a full line is ready or
    /// `still_running` goes false. Returns `None` on cooperative shutdown.
    pub fn read_line(&self, still_running: impl Fn() -> bool) -> Option<String> {
        loop {
            {
                let mut st = self.state.lock().unwrap();
                if st.line_ready {
                    let line = String::from_utf8_lossy(&st.line_buffer).into_owned();
                    st.line_buffer.clear();
                    st.line_ready = false;
                    return Some(line);
                }
            }
            if !still_running() {
                return None;
            }
            thread::sleep(Duration::from_millis(50));
        }
    }

    /// The VM's `READ_CHAR`: spin until a character arrives.
    pub fn read_char(&self, still_running: impl Fn() -> bool) -> Option<u8> {
        loop {
            {
                let mut st = self.state.lock().unwrap();
                if st.char_ready {
                    st.char_ready = false;
                    return Some(st.last_char);
                }
            }
            if !still_running() {
                return None;
            }
            thread::sleep(Duration::from_millis(50));
        }
    }

    /// The VM's `KEY_PRESSED`: non-blocking.
    pub fn key_pressed(&self) -> bool {
        self.state.lock().unwrap().char_ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_roundtrip() {
        let bus = InputBus::new();
        for &c in b"hi" {
            bus.push_printable(c);
        }
        bus.push_enter();
        let line = bus.read_line(|| true).unwrap();
        assert_eq!(line, "hi");
    }

    #[test]
    fn char_ready_flag() {
        let bus = InputBus::new();
        assert!(!bus.key_pressed());
        bus.push_printable(b'x');
        assert!(bus.key_pressed());
        let c = bus.read_char(|| true).unwrap();
        assert_eq!(c, b'x');
        assert!(!bus.key_pressed());
    }

    #[test]
    fn backspace_shrinks_buffer() {
        let bus = InputBus::new();
        bus.push_printable(b'a');
        bus.push_printable(b'b');
        bus.push_backspace();
        assert_eq!(bus.pos(), 1);
    }

    #[test]
    fn shutdown_unblocks_waiters() {
        let bus = InputBus::new();
        assert!(bus.read_line(|| false).is_none());
        assert!(bus.read_char(|| false).is_none());
    }
}
