//! Host-replaceable log fan-out.
//!
//! The runtime reports through [`tracing`], and every line additionally goes
//! to a process-wide table of sinks. Sinks are callable slots identified by a
//! stable index: registration never invalidates earlier indices, so a sink can
//! be removed long after others were added. A linked WebLink session registers
//! a sink here to mirror server logs into the connected browser console.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

type Sink = Box<dyn Fn(&str) + Send + 'static>;

static SINKS: Mutex<Vec<Option<Sink>>> = Mutex::new(Vec::new());
static MAX_LEVEL: AtomicU8 = AtomicU8::new(Level::Debug as u8);

/// Severity of a dispatched log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl Level {
    fn tag(self) -> char {
        match self {
            Level::Error => 'E',
            Level::Warn => 'W',
            Level::Info => 'I',
            Level::Debug => 'D',
        }
    }
}

/// Registers a sink and returns the index to pass to [`remove_sink`].
pub fn add_sink(sink: impl Fn(&str) + Send + 'static) -> usize {
    let mut sinks = SINKS.lock().unwrap();
    sinks.push(Some(Box::new(sink)));
    sinks.len() - 1
}

/// Clears the sink slot at `index`. Indices are not reused.
pub fn remove_sink(index: usize) {
    let mut sinks = SINKS.lock().unwrap();
    if let Some(slot) = sinks.get_mut(index) {
        *slot = None;
    }
}

/// Drops every line more verbose than `level`. The default lets everything
/// through; `tracing` subscribers apply their own filtering on top.
pub fn set_level(level: Level) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Emits one line through `tracing` and every registered sink.
pub fn dispatch(level: Level, message: &str) {
    if level as u8 > MAX_LEVEL.load(Ordering::Relaxed) {
        return;
    }
    match level {
        Level::Error => tracing::error!(target: "webfront", "{message}"),
        Level::Warn => tracing::warn!(target: "webfront", "{message}"),
        Level::Info => tracing::info!(target: "webfront", "{message}"),
        Level::Debug => tracing::debug!(target: "webfront", "{message}"),
    }
    let line = format!("[{}] {message}", level.tag());
    let sinks = SINKS.lock().unwrap();
    for sink in sinks.iter().flatten() {
        sink(&line);
    }
}

pub fn error(message: impl AsRef<str>) {
    dispatch(Level::Error, message.as_ref());
}

pub fn warn(message: impl AsRef<str>) {
    dispatch(Level::Warn, message.as_ref());
}

pub fn info(message: impl AsRef<str>) {
    dispatch(Level::Info, message.as_ref());
}

pub fn debug(message: impl AsRef<str>) {
    dispatch(Level::Debug, message.as_ref());
}
