// nt_secmon/src/trap/infrastructure/halt_manager.rs

//! # Halt State Manager
//!
//! The monitor is either Running or Halted with a reason. The state is one
//! atomic word holding the packed [`ErrorCode`] of the reason, zero meaning
//! Running, so it can be read from any trap or fault context without a
//! lock.

use crate::error_print;
use crate::trap::ds::{ErrorCode, HaltReason};
use crate::trap::infrastructure::di::traits::HardwareController;
use core::sync::atomic::{AtomicU32, Ordering};

const RUNNING: u32 = 0;

pub struct HaltState {
    code: AtomicU32,
}

impl HaltState {
    pub const fn new() -> Self {
        Self {
            code: AtomicU32::new(RUNNING),
        }
    }

    pub fn is_halted(&self) -> bool {
        self.code.load(Ordering::Acquire) != RUNNING
    }

    /// The packed reason, if halted.
    pub fn code(&self) -> Option<ErrorCode> {
        match self.code.load(Ordering::Acquire) {
            RUNNING => None,
            raw => Some(ErrorCode::from_raw(raw)),
        }
    }

    pub fn reason(&self) -> Option<HaltReason> {
        self.code().and_then(HaltReason::from_code)
    }

    /// Moves the state to Halted.
    ///
    /// Returns `true` if this call performed the transition. A later
    /// caller leaves the first reason in place.
    pub fn enter(&self, reason: HaltReason) -> bool {
        self.code
            .compare_exchange(
                RUNNING,
                reason.code().raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for HaltState {
    fn default() -> Self {
        Self::new()
    }
}

/// Records the halt, reports it once, and parks the core.
pub fn fail_stop(state: &HaltState, reason: HaltReason, hw: &dyn HardwareController) -> ! {
    hw.disable_interrupts();
    if state.enter(reason) {
        error_print!("monitor halted: {} ({:?})", reason, reason.code());
    }
    hw.park()
}
