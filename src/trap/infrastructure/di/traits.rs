// nt_secmon/src/trap/infrastructure/di/traits.rs

//! # Dependency Injection Traits
//!
//! The monitor core reaches the hardware only through
//! [`HardwareController`], so the router, the fault handlers and the halt
//! path run unchanged against a host mock in tests.

use crate::trap::ds::FaultClass;
use crate::trap::infrastructure::fault::{FaultHandler, FaultSnapshot};

/// Interface for Hardware Control.
pub trait HardwareController: Send + Sync {
    /// Points the hardware trap vector at the monitor entry.
    fn init_trap_vector(&self);

    /// Disables all supervisor-level interrupts.
    /// Returns `true` if interrupts were previously enabled.
    fn disable_interrupts(&self) -> bool;

    /// Restores interrupts to a previous state.
    fn restore_interrupts(&self, was_enabled: bool);

    /// Installs the handler for one fault class.
    fn install_fault_handler(&self, class: FaultClass, handler: FaultHandler);

    /// Routes every class to its own handler instead of escalating to hard.
    fn enable_fault_routing(&self);

    /// Captures the diagnostics of the fault being handled.
    fn fault_snapshot(&self, class: FaultClass) -> FaultSnapshot;

    /// Stops the core permanently.
    fn park(&self) -> !;
}
