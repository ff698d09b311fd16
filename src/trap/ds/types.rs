// nt_secmon/src/trap/ds/types.rs

//! # Trap Type Definitions
//!
//! Privilege modes, the raw trap operand and its decoded route.

use crate::trap::exports::{SVC_FAST_INDEX_MASK, SVC_MODE_MASK, SVC_SLOW_INDEX_MASK};
use core::fmt;

/// Machine word passed through supervisor calls.
pub type Word = usize;

/// Privilege level of the code that issued the trap.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Privilege {
    /// The monitor itself or an interrupt taken on its stack.
    Privileged,
    /// A box.
    Unprivileged,
}

/// Where a trap operand sends control.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Route {
    /// Operand 0: the externally supplied privileged hook.
    Hook,
    /// Fast table slot, always below `SVC_FAST_INDEX_MAX`.
    Fast(u8),
    /// Slow table slot, not yet bounds-checked against the table length.
    Slow(u8),
}

/// The 8-bit operand embedded in a supervisor call.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct TrapOperand(u8);

impl TrapOperand {
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Splits the operand into selector and index.
    ///
    /// Zero is checked before the selector bit, so no table is ever
    /// consulted for a hook call.
    pub const fn route(self) -> Route {
        if self.0 == 0 {
            Route::Hook
        } else if self.0 & SVC_MODE_MASK != 0 {
            Route::Fast(self.0 & SVC_FAST_INDEX_MASK)
        } else {
            Route::Slow(self.0 & SVC_SLOW_INDEX_MASK)
        }
    }
}

impl fmt::Debug for TrapOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrapOperand({:#04x} -> {:?})", self.0, self.route())
    }
}
