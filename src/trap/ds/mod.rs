// nt_secmon/src/trap/ds/mod.rs

//! # Trap Data Structures Module
//!
//! Defines the core data structures for the trap router and the fail-stop
//! path: operands and routes, frames and contexts, handler tables, and the
//! error taxonomy. Nothing in this module allocates.

// The order of declaration matters for public re-export.
pub mod types;
pub mod context;
pub mod error;
pub mod handler;

// Re-export key types for convenient access by other modules.
pub use self::types::{Privilege, Route, TrapOperand, Word};

pub use self::context::{SavedRegisters, SoftFrame, TrapContext, TrapFrame, TRAP_ARGS};

pub use self::error::{
    ConfigError, ErrorCode, ErrorLevel, ErrorSource, FaultClass, HaltReason,
};

pub use self::handler::{
    FastHandler, FastTable, PrivHook, Routed, SlowHandler, SvcTables,
};
