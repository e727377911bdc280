//! Backtrace capture for the panic safety net.
//!
//! The panic hook stores a backtrace in a thread-local slot; the catch-panic
//! handler runs on the same thread right after unwinding and takes it.
//! Backtraces are only captured when `RUST_BACKTRACE` enables them.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::RefCell;
use std::sync::Once;

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static INSTALL: Once = Once::new();

/// Chain a backtrace-recording hook in front of the current panic hook.
pub fn install_hook() {
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::capture();
            if backtrace.status() == BacktraceStatus::Captured {
                LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace.to_string()));
            }
            previous(info);
        }));
    });
}

/// Take the backtrace recorded by the most recent panic on this thread.
pub fn take_backtrace() -> Option<String> {
    LAST_BACKTRACE.with(|slot| slot.borrow_mut().take())
}
