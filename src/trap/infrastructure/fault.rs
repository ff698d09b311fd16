// nt_secmon/src/trap/infrastructure/fault.rs

//! # Hardware Protection Faults
//!
//! One handler per fault class. Each captures the diagnostics the class
//! carries, reports them once, records the halt and parks the core. None
//! of them returns.

use super::di;
use super::di::traits::HardwareController;
use super::halt_manager::{fail_stop, HaltState};
use crate::error_print;
use crate::trap::ds::{FaultClass, HaltReason};

/// Entry installed in the hardware fault vector.
pub type FaultHandler = fn() -> !;

/// Diagnostics captured at fault entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultSnapshot {
    pub class: FaultClass,
    /// Cause/status word of the fault.
    pub status: usize,
    /// Faulting data address, for classes that latch one.
    pub address: Option<usize>,
    /// Program counter of the faulting instruction.
    pub pc: usize,
}

/// The fault handlers bound to one hardware controller and halt state.
pub struct FaultSubsystem<'a> {
    hw: &'a dyn HardwareController,
    state: &'a HaltState,
}

impl<'a> FaultSubsystem<'a> {
    pub fn new(hw: &'a dyn HardwareController, state: &'a HaltState) -> Self {
        Self { hw, state }
    }

    /// Installs the global handlers and enables per-class routing.
    pub fn install(&self) {
        for class in FaultClass::ALL {
            self.hw.install_fault_handler(class, handler_for(class));
        }
        self.hw.enable_fault_routing();
    }

    /// Reports the fault and fail-stops.
    pub fn handle(&self, class: FaultClass) -> ! {
        self.hw.disable_interrupts();
        let snapshot = self.hw.fault_snapshot(class);
        if !self.state.is_halted() {
            report(&snapshot);
        }
        fail_stop(self.state, HaltReason::Fault(class), self.hw)
    }
}

fn report(snapshot: &FaultSnapshot) {
    match snapshot.class {
        FaultClass::Bus => error_print!(
            "bus fault: status {:#x} address {:x?} pc {:#x}",
            snapshot.status,
            snapshot.address,
            snapshot.pc
        ),
        FaultClass::MemoryManagement => error_print!(
            "memory management fault: status {:#x} address {:x?} pc {:#x}",
            snapshot.status,
            snapshot.address,
            snapshot.pc
        ),
        FaultClass::Hard => error_print!(
            "hard fault: status {:#x} pc {:#x}",
            snapshot.status,
            snapshot.pc
        ),
        FaultClass::Usage => error_print!(
            "usage fault: status {:#x} pc {:#x}",
            snapshot.status,
            snapshot.pc
        ),
        FaultClass::Debug => error_print!("debug monitor trap at pc {:#x}", snapshot.pc),
    }
}

/// The global handler installed for a class.
pub fn handler_for(class: FaultClass) -> FaultHandler {
    match class {
        FaultClass::Usage => fault_usage,
        FaultClass::MemoryManagement => fault_memory,
        FaultClass::Bus => fault_bus,
        FaultClass::Hard => fault_hard,
        FaultClass::Debug => fault_debug,
    }
}

fn fault_usage() -> ! {
    di::dispatch_fault(FaultClass::Usage)
}

fn fault_memory() -> ! {
    di::dispatch_fault(FaultClass::MemoryManagement)
}

fn fault_bus() -> ! {
    di::dispatch_fault(FaultClass::Bus)
}

fn fault_hard() -> ! {
    di::dispatch_fault(FaultClass::Hard)
}

fn fault_debug() -> ! {
    di::dispatch_fault(FaultClass::Debug)
}

/// Installs the fault handlers on `hw`, routed to the global halt state.
pub fn init(hw: &'static dyn HardwareController) {
    FaultSubsystem::new(hw, di::halt_state()).install();
}


#[cfg(test)]
mod tests {
    use super::mock::MockHardware;
    use super::*;
    use crate::trap::ds::{
        FastHandler, Privilege, Routed, SlowHandler, SoftFrame, SvcTables, TrapFrame, Word,
    };
    use crate::trap::exports::svc_slow;
    use crate::trap::infrastructure::router::SvcRouter;
    use core::sync::atomic::Ordering;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn install_covers_every_class_and_enables_routing() {
        let hw = MockHardware::new(0, 0);
        let state = HaltState::new();
        FaultSubsystem::new(&hw, &state).install();
        assert!(hw.routing.load(Ordering::SeqCst));
        let installed = hw.installed.lock();
        for class in FaultClass::ALL {
            assert!(installed[class as usize].is_some(), "{class:?}");
        }
    }

    #[test]
    fn bus_fault_halts_once_and_the_router_refuses_traps() {
        let hw = MockHardware::new(5, 0x8020_0040);
        let state = HaltState::new();
        let faults = FaultSubsystem::new(&hw, &state);

        let unwound = catch_unwind(AssertUnwindSafe(|| faults.handle(FaultClass::Bus)));
        assert!(unwound.is_err());
        assert_eq!(hw.snapshots.load(Ordering::SeqCst), 1);
        assert_eq!(hw.parks.load(Ordering::SeqCst), 1);
        assert_eq!(state.reason(), Some(HaltReason::Fault(FaultClass::Bus)));

        fn nop(_: &mut dyn TrapFrame) {}
        fn one(_: Word, _: Word, _: Word, _: Word) -> Word {
            1
        }
        static FAST: [FastHandler; 16] = [nop; 16];
        static SLOW: [SlowHandler; 2] = [one, one];
        let tables = SvcTables::new(&FAST, &FAST, &SLOW).unwrap();
        let router = SvcRouter::new(tables, nop, &state);
        let mut frame = SoftFrame::new(Privilege::Unprivileged, svc_slow(1), [0; 4]);
        assert_eq!(router.route(&mut frame), Routed::Halted);
        assert_eq!(frame.regs[0], 0);
    }

    #[test]
    fn second_fault_keeps_the_first_reason() {
        let hw = MockHardware::new(0, 0);
        let state = HaltState::new();
        let faults = FaultSubsystem::new(&hw, &state);
        let _ = catch_unwind(AssertUnwindSafe(|| faults.handle(FaultClass::Usage)));
        let _ = catch_unwind(AssertUnwindSafe(|| faults.handle(FaultClass::Hard)));
        assert_eq!(state.reason(), Some(HaltReason::Fault(FaultClass::Usage)));
        assert_eq!(hw.parks.load(Ordering::SeqCst), 2);
    }
}
