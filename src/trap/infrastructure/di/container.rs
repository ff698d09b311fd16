// nt_secmon/src/trap/infrastructure/di/container.rs

//! # Monitor Dependency Injection Container
//!
//! Defines the `Monitor` struct, which binds the router, the fault
//! handlers and the interrupt entry to one hardware controller and one
//! halt state.

use super::traits::HardwareController;
use crate::trap::ds::{FaultClass, HaltReason, Routed, TrapFrame, Word};
use crate::trap::infrastructure::fault::FaultSubsystem;
use crate::trap::infrastructure::halt_manager::{fail_stop, HaltState};
use crate::trap::infrastructure::router::SvcRouter;
use crate::trap::vectors::IrqHandler;

pub struct Monitor {
    router: SvcRouter<'static>,
    hardware: &'static dyn HardwareController,
    irq: IrqHandler,
    state: &'static HaltState,
}

impl Monitor {
    /// Creates a new `Monitor` by injecting its dependencies.
    pub fn new(
        router: SvcRouter<'static>,
        hardware: &'static dyn HardwareController,
        irq: IrqHandler,
        state: &'static HaltState,
    ) -> Self {
        Self {
            router,
            hardware,
            irq,
            state,
        }
    }

    /// Installs the fault handlers, then points the trap vector at the
    /// monitor. Faults are routed before the first trap can arrive.
    pub fn initialize(&self) {
        FaultSubsystem::new(self.hardware, self.state).install();
        self.hardware.init_trap_vector();
    }

    pub fn handle_trap(&self, frame: &mut dyn TrapFrame) -> Routed {
        self.router.route(frame)
    }

    pub fn handle_fault(&self, class: FaultClass) -> ! {
        FaultSubsystem::new(self.hardware, self.state).handle(class)
    }

    pub fn handle_interrupt(&self, cause: Word) {
        if !self.state.is_halted() {
            (self.irq)(cause);
        }
    }

    pub fn halt(&self, reason: HaltReason) -> ! {
        fail_stop(self.state, reason, self.hardware)
    }

    pub fn router(&self) -> &SvcRouter<'static> {
        &self.router
    }

    /// Provides access to the `HardwareController`.
    pub fn hardware_controller(&self) -> &dyn HardwareController {
        self.hardware
    }
}
