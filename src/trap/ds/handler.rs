// nt_secmon/src/trap/ds/handler.rs

//! # Trap Handler Definitions
//!
//! Handler signatures, the validated dispatch tables, and the record of
//! what the router did with a trap.

use super::context::TrapFrame;
use super::error::ConfigError;
use super::types::{Privilege, Word};
use crate::trap::exports::{SVC_FAST_INDEX_MAX, SVC_SLOW_INDEX_MAX};

/// Fast-table handler. It owns the frame for the duration of the call and
/// reads or rewrites whatever it needs.
pub type FastHandler = fn(&mut dyn TrapFrame);

/// Slow-table handler: up to four argument words in, one word out.
pub type SlowHandler = fn(Word, Word, Word, Word) -> Word;

/// The privileged hook reached through operand 0. It must leave the
/// exception-return state to the hook's own policy; the router does not
/// touch the frame around it.
pub type PrivHook = fn(&mut dyn TrapFrame);

/// A fixed-width fast table.
pub type FastTable = [FastHandler; SVC_FAST_INDEX_MAX];

/// Dispatch tables that passed the boot self-check.
///
/// Construction is the only place widths and lengths are checked; once a
/// value exists, every masked fast index is in range by type.
#[derive(Clone, Copy)]
pub struct SvcTables {
    fast_unpriv: &'static FastTable,
    fast_priv: &'static FastTable,
    slow: &'static [SlowHandler],
}

impl SvcTables {
    /// Validates the build-time tables.
    pub fn new(
        fast_unpriv: &'static [FastHandler],
        fast_priv: &'static [FastHandler],
        slow: &'static [SlowHandler],
    ) -> Result<Self, ConfigError> {
        let fast_unpriv = <&FastTable>::try_from(fast_unpriv)
            .map_err(|_| ConfigError::FastTableWidth(Privilege::Unprivileged))?;
        let fast_priv = <&FastTable>::try_from(fast_priv)
            .map_err(|_| ConfigError::FastTableWidth(Privilege::Privileged))?;
        if slow.is_empty() {
            return Err(ConfigError::SlowTableEmpty);
        }
        if slow.len() > SVC_SLOW_INDEX_MAX {
            return Err(ConfigError::SlowTableTooLong);
        }
        Ok(Self {
            fast_unpriv,
            fast_priv,
            slow,
        })
    }

    /// The fast table for callers of the given privilege.
    pub fn fast(&self, mode: Privilege) -> &'static FastTable {
        match mode {
            Privilege::Privileged => self.fast_priv,
            Privilege::Unprivileged => self.fast_unpriv,
        }
    }

    pub fn slow(&self) -> &'static [SlowHandler] {
        self.slow
    }
}

/// What the router did with one trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Control went to the privileged hook.
    Hook,
    /// A fast-table handler ran.
    Fast(u8),
    /// A slow-table handler ran; `result` was written back to slot 0.
    Slow { index: u8, result: Word },
    /// The slow index was beyond the table; nothing ran, nothing was written.
    Discarded(u8),
    /// The monitor is halted; the trap was not processed.
    Halted,
}

impl Routed {
    /// Whether the router left the exception-return state to a handler.
    pub fn leaves_return_to_hook(&self) -> bool {
        matches!(self, Routed::Hook)
    }
}
