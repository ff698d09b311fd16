// nt_secmon/src/trap/infrastructure/di/mod.rs

//! # Dependency Injection System - Global Access and Initialization
//!
//! Manages the global `Monitor` instance and the halt state it shares with
//! the fail-stop path. The monitor is published once through `spin::Once`
//! and read without a lock afterwards.

pub mod container;
pub mod traits;

use self::container::Monitor;
use self::traits::HardwareController;
use crate::trap::ds::{FaultClass, HaltReason, Routed, TrapFrame, Word};
use crate::trap::infrastructure::halt_manager::{fail_stop, HaltState};
use crate::trap::infrastructure::low_level;
use crate::trap::infrastructure::router::SvcRouter;
use crate::trap::vectors::SvcVectors;
use crate::{error_print, info_print, warn_print};
use spin::Once;

/// The monitor state shared by the router and every fail-stop path.
static HALT_STATE: HaltState = HaltState::new();

/// The global `Monitor` instance.
static MONITOR: Once<Monitor> = Once::new();

pub fn halt_state() -> &'static HaltState {
    &HALT_STATE
}

/// Initializes the global monitor.
///
/// Runs the boot self-check over `vectors`; a misconfigured table halts
/// before any trap is routed. A second call leaves the first monitor in
/// place.
pub fn initialize_monitor(hw: &'static dyn HardwareController, vectors: &'static SvcVectors) {
    if MONITOR.is_completed() {
        warn_print!("monitor already initialized");
        return;
    }
    let tables = match vectors.tables() {
        Ok(tables) => tables,
        Err(e) => {
            error_print!("svc table self-check failed: {}", e);
            fail_stop(&HALT_STATE, HaltReason::Configuration(e), hw)
        }
    };
    let monitor = MONITOR.call_once(|| {
        let router = SvcRouter::new(tables, vectors.priv_hook, &HALT_STATE);
        Monitor::new(router, hw, vectors.irq, &HALT_STATE)
    });
    monitor.initialize();
    info_print!(
        "monitor up: {} slow entries, {} fast entries per level",
        tables.slow().len(),
        crate::trap::exports::SVC_FAST_INDEX_MAX
    );
}

/// Checks if the monitor has been initialized.
pub fn is_initialized() -> bool {
    MONITOR.is_completed()
}

/// Routes a supervisor call. Before initialization nothing is routed.
pub(crate) fn dispatch_trap(frame: &mut dyn TrapFrame) -> Routed {
    match MONITOR.get() {
        Some(monitor) => monitor.handle_trap(frame),
        None => Routed::Halted,
    }
}

pub(crate) fn dispatch_interrupt(cause: Word) {
    if let Some(monitor) = MONITOR.get() {
        monitor.handle_interrupt(cause);
    }
}

pub(crate) fn dispatch_fault(class: FaultClass) -> ! {
    match MONITOR.get() {
        Some(monitor) => monitor.handle_fault(class),
        None => halt_early(HaltReason::Fault(class)),
    }
}

/// Fail-stop entry for the whole crate.
pub(crate) fn halt(reason: HaltReason) -> ! {
    match MONITOR.get() {
        Some(monitor) => monitor.halt(reason),
        None => halt_early(reason),
    }
}

/// Halting before a hardware controller is bound.
fn halt_early(reason: HaltReason) -> ! {
    low_level::disable_interrupts();
    if HALT_STATE.enter(reason) {
        error_print!("monitor halted before init: {}", reason);
    }
    low_level::park()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trap::ds::{Privilege, SoftFrame};
    use crate::trap::exports::{slow, svc_fast, svc_slow};
    use crate::trap::infrastructure::fault::mock::MockHardware;
    use crate::trap::vectors::{
        BoxServices, DebugServices, InterruptVirtualization, PageServices, Platform,
    };
    use core::sync::atomic::Ordering;

    struct Board;

    impl InterruptVirtualization for Board {
        fn irq_level_get() -> Word {
            0x5A
        }
    }
    impl BoxServices for Board {
        fn box_init_first(frame: &mut dyn TrapFrame) {
            frame.store_arg(1, 0xB0);
        }
    }
    impl DebugServices for Board {}
    impl PageServices for Board {}
    impl Platform for Board {}

    static HW: MockHardware = MockHardware::new(0, 0);
    static VECTORS: SvcVectors = SvcVectors::for_platform::<Board>();

    // The only test that touches the global monitor. It ends halted.
    #[test]
    fn global_monitor_routes_until_an_installed_fault_handler_halts_it() {
        initialize_monitor(&HW, &VECTORS);
        assert!(is_initialized());
        assert!(HW.routing.load(Ordering::SeqCst));

        let mut frame = SoftFrame::new(Privilege::Unprivileged, svc_slow(slow::IRQ_LEVEL_GET), [0; 4]);
        assert_eq!(
            dispatch_trap(&mut frame),
            Routed::Slow {
                index: slow::IRQ_LEVEL_GET,
                result: 0x5A
            }
        );
        assert_eq!(frame.regs[0], 0x5A);

        let mut frame = SoftFrame::new(Privilege::Unprivileged, svc_fast(4), [0; 4]);
        assert_eq!(dispatch_trap(&mut frame), Routed::Fast(4));
        assert_eq!(frame.regs[1], 0xB0);

        // A second initialization is ignored.
        initialize_monitor(&HW, &VECTORS);
        assert!(!halt_state().is_halted());

        // The bus handler installed on the controller reaches this monitor.
        let bus = HW.installed.lock()[FaultClass::Bus as usize].expect("bus handler installed");
        let unwound = std::panic::catch_unwind(|| bus());
        assert!(unwound.is_err());
        assert_eq!(HW.snapshots.load(Ordering::SeqCst), 1);
        assert_eq!(HW.parks.load(Ordering::SeqCst), 1);
        assert_eq!(halt_state().reason(), Some(HaltReason::Fault(FaultClass::Bus)));

        let mut frame = SoftFrame::new(Privilege::Unprivileged, svc_slow(slow::IRQ_LEVEL_GET), [0; 4]);
        assert_eq!(dispatch_trap(&mut frame), Routed::Halted);
        assert_eq!(frame.regs[0], 0);
    }
}
