// nt_secmon/src/trap/mod.rs

//! # Supervisor Call Routing and Fail-Stop Subsystem
//!
//! Routes every trapped supervisor call to the privileged hook, a fast
//! table slot or a slow table slot, and owns the monitor's halt state and
//! protection fault handlers.

// Make submodules accessible within the trap crate.
mod api;
mod ds;
pub mod exports;
pub(crate) mod infrastructure;
pub mod vectors;

// Publicly re-export the entire API module.
pub use self::api::*;

// Re-export key data structures that users of the API might need directly.
pub use self::ds::{
    ConfigError, ErrorCode, ErrorLevel, ErrorSource, FaultClass, HaltReason, // Error structures
    FastHandler, FastTable, PrivHook, Routed, SlowHandler, SvcTables,        // Dispatch tables
    Privilege, Route, TrapOperand, Word,                                     // Operands
    SavedRegisters, SoftFrame, TrapContext, TrapFrame, TRAP_ARGS,            // Frames
};

pub use self::infrastructure::di::traits::HardwareController;
pub use self::infrastructure::fault::{self, FaultHandler, FaultSnapshot};
pub use self::infrastructure::halt_manager::HaltState;
pub use self::infrastructure::router::SvcRouter;

#[cfg(target_arch = "riscv64")]
pub use self::infrastructure::low_level::RiscvHardware;

use self::vectors::SvcVectors;

/// Initializes the monitor core.
///
/// Must be called once during boot, before the first box runs. It checks
/// the dispatch tables, installs the fault handlers and points the hardware
/// trap vector at the monitor. A table that fails the check halts here.
pub fn init(hw: &'static dyn HardwareController, vectors: &'static SvcVectors) {
    infrastructure::initialize_monitor(hw, vectors);
}
