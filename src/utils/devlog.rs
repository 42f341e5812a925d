//! Developer trace channel ("level 6").
//!
//! `dev6!` lines go to the `nexus_records::dev6` log target at TRACE and, when a capture is
//! active on the current thread, into a per-thread buffer so tests can assert on them without
//! touching the global logger.

use std::cell::RefCell;

thread_local! {
    static CAPTURE: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Ends the capture on the current thread when dropped.
pub struct CaptureGuard {
    _private: (),
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        CAPTURE.with(|c| *c.borrow_mut() = None);
    }
}

/// Start capturing `dev6!` lines emitted on this thread.
#[must_use = "capture stops when the guard is dropped"]
pub fn capture() -> CaptureGuard {
    CAPTURE.with(|c| *c.borrow_mut() = Some(Vec::new()));
    CaptureGuard { _private: () }
}

/// Whether a capture is active on this thread.
pub fn is_capturing() -> bool {
    CAPTURE.with(|c| c.borrow().is_some())
}

#[doc(hidden)]
pub fn record(line: &str) {
    CAPTURE.with(|c| {
        if let Some(buf) = c.borrow_mut().as_mut() {
            buf.push(line.to_owned());
        }
    });
}

/// Take every captured line, leaving the buffer empty.
pub fn take() -> Vec<String> {
    CAPTURE.with(|c| c.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
}

/// Captured lines that parse as JSON objects with `"op": op`.
pub fn traces_for(op: &str) -> Vec<serde_json::Value> {
    CAPTURE.with(|c| {
        c.borrow()
            .iter()
            .flatten()
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .filter(|v| v.get("op").and_then(serde_json::Value::as_str) == Some(op))
            .collect()
    })
}

/// Emit a developer trace line.
#[macro_export]
macro_rules! dev6 {
    ($($arg:tt)*) => {{
        let __line = format!($($arg)*);
        $crate::utils::devlog::record(&__line);
        log::log!(target: $crate::logger::DEV6_TARGET, log::Level::Trace, "{}", __line);
    }};
}
