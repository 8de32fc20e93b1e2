//! Progress indicator shown while the completion call blocks.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

const FRAMES: [&str; 4] = [".  ", ".. ", "...", "   "];
const FRAME_INTERVAL: Duration = Duration::from_millis(150);
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

/// Animated dots on stderr, running on a dedicated thread.
///
/// Stopping joins the thread, so by the time `stop()` returns the terminal
/// has been restored and the caller can print freely.
pub struct Spinner {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

/// Clears the spinner line and restores the cursor when the spinner thread
/// unwinds, whether it exited normally or panicked.
struct CursorGuard;

impl Drop for CursorGuard {
    fn drop(&mut self) {
        let mut out = io::stderr();
        let _ = write!(out, "\r{}\r{SHOW_CURSOR}", " ".repeat(80));
        let _ = out.flush();
    }
}

impl Spinner {
    /// Start the animation with the given label.
    pub fn start(label: &str) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let label = label.to_string();

        let handle = std::thread::spawn(move || {
            let _guard = CursorGuard;
            let mut out = io::stderr();
            let _ = write!(out, "{HIDE_CURSOR}");
            let _ = out.flush();

            let mut i = 0;
            while !stop_flag.load(Ordering::Relaxed) {
                let frame = FRAMES[i % FRAMES.len()];
                let _ = write!(out, "\r{label} {frame}");
                let _ = out.flush();
                std::thread::sleep(FRAME_INTERVAL);
                i += 1;
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signal the thread to stop and wait for its teardown to finish.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.halt();
    }
}
