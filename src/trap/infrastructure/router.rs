// nt_secmon/src/trap/infrastructure/router.rs

//! # Supervisor Call Router
//!
//! Decodes the operand of a trapped supervisor call and hands the frame to
//! the privileged hook, a fast-table slot or a slow-table slot. Routing is
//! a pure function of the operand, the caller's privilege and the tables:
//! no allocation, no logging, no state carried between traps.

use super::halt_manager::HaltState;
use crate::trap::ds::{PrivHook, Route, Routed, SvcTables, TrapContext, TrapFrame};

pub struct SvcRouter<'s> {
    tables: SvcTables,
    hook: PrivHook,
    state: &'s HaltState,
}

impl<'s> SvcRouter<'s> {
    pub fn new(tables: SvcTables, hook: PrivHook, state: &'s HaltState) -> Self {
        Self {
            tables,
            hook,
            state,
        }
    }

    pub fn tables(&self) -> &SvcTables {
        &self.tables
    }

    /// Routes one trap.
    ///
    /// The hook gets the frame untouched. A fast handler gets the frame and
    /// does its own argument handling. A slow handler gets the four argument
    /// words and its result lands in slot 0; a slow index past the table
    /// leaves the frame as it was.
    pub fn route(&self, frame: &mut dyn TrapFrame) -> Routed {
        if self.state.is_halted() {
            return Routed::Halted;
        }
        match frame.operand().route() {
            Route::Hook => {
                (self.hook)(frame);
                Routed::Hook
            }
            Route::Fast(index) => {
                let handler = self.tables.fast(frame.privilege())[index as usize];
                handler(frame);
                Routed::Fast(index)
            }
            Route::Slow(index) => {
                let Some(handler) = self.tables.slow().get(index as usize) else {
                    return Routed::Discarded(index);
                };
                let ctx = TrapContext::capture(frame);
                let [a0, a1, a2, a3] = ctx.args;
                let result = handler(a0, a1, a2, a3);
                frame.store_arg(0, result);
                Routed::Slow { index, result }
            }
        }
    }
}
