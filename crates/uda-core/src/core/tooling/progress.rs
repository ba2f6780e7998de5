use std::env;
use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub(crate) fn progress_enabled() -> bool {
    match env::var("UDA_PROGRESS") {
        Ok(value) => value != "0",
        Err(_) => io::stderr().is_terminal(),
    }
}

static OUTPUT_LOCK: Mutex<()> = Mutex::new(());
static SUSPENDED: AtomicUsize = AtomicUsize::new(0);

fn clear_progress_line() {
    let _guard = OUTPUT_LOCK.lock().ok();
    let _ = io::stderr().write_all(b"\r\x1b[2K");
    let _ = io::stderr().flush();
}

/// Hides the spinner while a child process owns the terminal.
pub(crate) struct ProgressSuspendGuard {
    enabled: bool,
}

impl ProgressSuspendGuard {
    pub(crate) fn new() -> Self {
        if !progress_enabled() {
            return Self { enabled: false };
        }
        SUSPENDED.fetch_add(1, Ordering::SeqCst);
        clear_progress_line();
        Self { enabled: true }
    }
}

impl Drop for ProgressSuspendGuard {
    fn drop(&mut self) {
        if self.enabled {
            SUSPENDED.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

pub struct ProgressReporter {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    pub fn spinner(label: impl Into<String>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        if !progress_enabled() {
            return Self { stop, handle: None };
        }
        let label = label.into();
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
            const TICK: Duration = Duration::from_millis(80);
            const START_DELAY: Duration = Duration::from_millis(120);
            let started = Instant::now();
            let mut idx = 0usize;
            let mut rendered = false;
            while !flag.load(Ordering::SeqCst) {
                let paused = SUSPENDED.load(Ordering::SeqCst) > 0;
                if paused || started.elapsed() < START_DELAY {
                    if rendered {
                        clear_progress_line();
                        rendered = false;
                    }
                    thread::sleep(TICK);
                    continue;
                }
                let frame = FRAMES[idx % FRAMES.len()];
                idx = idx.wrapping_add(1);
                let line = format!("\r\x1b[2Kuda ▸ {label} {frame}");
                {
                    let _guard = OUTPUT_LOCK.lock().ok();
                    let _ = io::stderr().write_all(line.as_bytes());
                    let _ = io::stderr().flush();
                }
                rendered = true;
                thread::sleep(TICK);
            }
            if rendered {
                clear_progress_line();
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    pub fn finish(mut self, message: impl Into<String>) {
        self.stop();
        eprintln!("uda ▸ {}", message.into());
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop();
    }
}
