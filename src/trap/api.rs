// nt_secmon/src/trap/api.rs

//! # Public API for the Trap Subsystem
//!
//! Provides a stable interface for the rest of the monitor: routing a
//! trapped frame, and the single fail-stop entry.

use crate::trap::ds::{ErrorCode, HaltReason, Routed, TrapFrame};
use crate::trap::infrastructure::di;

/// Stops the monitor for good.
///
/// The first reason recorded wins; it is reported once on the console and
/// the core parks with interrupts disabled.
pub fn halt(reason: HaltReason) -> ! {
    di::halt(reason)
}

/// Checks if the monitor has stopped.
pub fn is_halted() -> bool {
    di::halt_state().is_halted()
}

/// Why the monitor stopped, if it has.
pub fn halt_reason() -> Option<HaltReason> {
    di::halt_state().reason()
}

/// The packed error code of the halt, if any.
pub fn halt_code() -> Option<ErrorCode> {
    di::halt_state().code()
}

/// Routes a trapped supervisor call through the global monitor.
///
/// Returns [`Routed::Halted`] once the monitor has stopped or before it
/// is initialized.
pub fn dispatch(frame: &mut dyn TrapFrame) -> Routed {
    di::dispatch_trap(frame)
}
