// nt_secmon/src/trap/infrastructure/low_level.rs

//! # Low-Level Trap Hardware Control
//!
//! Direct control over the RISC-V trap CSRs, the assembly entry point, and
//! the critical-section primitive the registry writers run under. Every
//! item that touches a CSR is gated on `riscv64`; the pure pieces (cause
//! classification, the critical-section token) build on any host so the
//! layers above them can be unit tested.

use crate::trap::ds::FaultClass;
use core::marker::PhantomData;

#[cfg(target_arch = "riscv64")]
pub use self::riscv_port::*;

/// Proof that interrupts are disabled on this hart.
///
/// Only [`interrupt_free`] creates one, and the borrow keeps it from
/// escaping the closure.
pub struct CriticalSection<'cs> {
    _marker: PhantomData<&'cs ()>,
}

impl<'cs> CriticalSection<'cs> {
    /// # Safety
    ///
    /// Interrupts must stay disabled for `'cs`.
    unsafe fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

/// Runs `f` with supervisor interrupts disabled and restores the previous
/// enable state afterwards.
pub fn interrupt_free<R>(f: impl FnOnce(&CriticalSection<'_>) -> R) -> R {
    let was_enabled = disable_interrupts();
    // Safety: SIE is clear until `restore_interrupts` below.
    let cs = unsafe { CriticalSection::new() };
    let result = f(&cs);
    restore_interrupts(was_enabled);
    result
}

/// What a trap cause means to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapKind {
    /// Asynchronous interrupt with its cause number.
    Interrupt(usize),
    /// `ecall` from a box or from the monitor itself.
    SupervisorCall,
    /// A protection fault, already mapped onto its class.
    Fault(FaultClass),
}

const SCAUSE_INTERRUPT: usize = 1 << (usize::BITS - 1);

/// Decodes a raw `scause` value.
pub const fn classify(scause: usize) -> TrapKind {
    if scause & SCAUSE_INTERRUPT != 0 {
        return TrapKind::Interrupt(scause & !SCAUSE_INTERRUPT);
    }
    match scause {
        8 | 9 => TrapKind::SupervisorCall,
        _ => TrapKind::Fault(fault_class(scause)),
    }
}

/// Maps a RISC-V exception code onto the fault class whose handler owns it.
///
/// Misaligned accesses and illegal instructions are usage faults, access
/// faults are bus faults, page faults are memory-management faults and
/// breakpoints reach the debug monitor. Everything else escalates to hard.
pub const fn fault_class(code: usize) -> FaultClass {
    match code {
        0 | 2 | 4 | 6 => FaultClass::Usage,
        1 | 5 | 7 => FaultClass::Bus,
        12 | 13 | 15 => FaultClass::MemoryManagement,
        3 => FaultClass::Debug,
        _ => FaultClass::Hard,
    }
}

/// Disables supervisor-level interrupts globally for the current hart.
///
/// # Returns
///
/// `true` if interrupts were previously enabled, `false` otherwise.
#[cfg(target_arch = "riscv64")]
#[inline]
pub fn disable_interrupts() -> bool {
    let sstatus: usize;
    unsafe {
        core::arch::asm!("csrrc {}, sstatus, {}", out(reg) sstatus, in(reg) 1usize << 1);
    }
    // SIE is bit 1.
    (sstatus & (1 << 1)) != 0
}

#[cfg(not(target_arch = "riscv64"))]
#[inline]
pub fn disable_interrupts() -> bool {
    false
}

/// Restores the global interrupt enable state returned by
/// [`disable_interrupts`].
#[cfg(target_arch = "riscv64")]
#[inline]
pub fn restore_interrupts(was_enabled: bool) {
    if was_enabled {
        unsafe {
            core::arch::asm!("csrs sstatus, {}", in(reg) 1usize << 1);
        }
    }
}

#[cfg(not(target_arch = "riscv64"))]
#[inline]
pub fn restore_interrupts(_was_enabled: bool) {}

/// Hosts have no hart to stop; unwinding is the closest thing.
#[cfg(not(target_arch = "riscv64"))]
pub fn park() -> ! {
    panic!("monitor halted")
}

#[cfg(target_arch = "riscv64")]
mod riscv_port {
    use super::{classify, disable_interrupts, restore_interrupts, TrapKind};
    use crate::trap::ds::{FaultClass, SavedRegisters};
    use crate::trap::infrastructure::di::{self, traits::HardwareController};
    use crate::trap::infrastructure::fault::{FaultHandler, FaultSnapshot};
    use core::arch::{asm, global_asm};
    use core::sync::atomic::{AtomicBool, Ordering};
    use riscv::register::{scause, sepc, stval};
    use spin::RwLock;

    global_asm!(include_str!("asm/trap_entry.S"));

    extern "C" {
        /// The assembly entry point for all traps. It saves the full frame.
        fn __trap_entry();
    }

    /// Sets `stvec` to the trap entry in direct mode.
    ///
    /// Clears `sscratch` as well: the entry reads zero as "trapped from
    /// S-mode" and the firmware may leave anything there.
    pub fn init_trap_vector() {
        let stvec_value = __trap_entry as usize;
        unsafe {
            asm!("csrw sscratch, zero");
            asm!("csrw stvec, {}", in(reg) stvec_value);
        }
    }

    /// Target of the `call` in `__trap_entry`.
    ///
    /// # Safety
    ///
    /// Only `__trap_entry` calls this; `frame` points at the frame it just
    /// saved on the monitor stack.
    #[no_mangle]
    pub extern "C" fn handle_trap(frame: &mut SavedRegisters) {
        match classify(frame.scause) {
            TrapKind::SupervisorCall => {
                let routed = di::dispatch_trap(frame);
                if !routed.leaves_return_to_hook() {
                    frame.advance_sepc();
                }
            }
            TrapKind::Interrupt(cause) => di::dispatch_interrupt(cause),
            TrapKind::Fault(class) => dispatch_fault(class),
        }
    }

    /// Per-class fault vectors, indexed by `FaultClass as usize`.
    static FAULT_VECTORS: RwLock<[Option<FaultHandler>; 5]> = RwLock::new([None; 5]);

    /// Without routing every class escalates to the hard-fault vector.
    static FAULT_ROUTING: AtomicBool = AtomicBool::new(false);

    fn dispatch_fault(class: FaultClass) -> ! {
        let routed = if FAULT_ROUTING.load(Ordering::Acquire) {
            class
        } else {
            FaultClass::Hard
        };
        let handler = FAULT_VECTORS.read()[routed as usize];
        match handler {
            Some(handler) => handler(),
            None => park(),
        }
    }

    /// Stops the hart for good.
    pub fn park() -> ! {
        disable_interrupts();
        loop {
            #[allow(unused_unsafe)]
            unsafe {
                riscv::asm::wfi();
            }
        }
    }

    /// The hardware controller of a RISC-V S-mode monitor.
    pub struct RiscvHardware;

    impl HardwareController for RiscvHardware {
        fn init_trap_vector(&self) {
            init_trap_vector();
        }

        fn disable_interrupts(&self) -> bool {
            disable_interrupts()
        }

        fn restore_interrupts(&self, was_enabled: bool) {
            restore_interrupts(was_enabled);
        }

        fn install_fault_handler(&self, class: FaultClass, handler: FaultHandler) {
            FAULT_VECTORS.write()[class as usize] = Some(handler);
        }

        fn enable_fault_routing(&self) {
            FAULT_ROUTING.store(true, Ordering::Release);
        }

        fn fault_snapshot(&self, class: FaultClass) -> FaultSnapshot {
            // The trap CSRs still describe the fault: nothing has trapped
            // since the entry and interrupts are off.
            let status = scause::read().bits();
            let address = match class {
                FaultClass::Bus | FaultClass::MemoryManagement => Some(stval::read()),
                _ => None,
            };
            FaultSnapshot {
                class,
                status,
                address,
                pc: sepc::read(),
            }
        }

        fn park(&self) -> ! {
            park()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecall_causes_are_supervisor_calls() {
        assert_eq!(classify(8), TrapKind::SupervisorCall);
        assert_eq!(classify(9), TrapKind::SupervisorCall);
    }

    #[test]
    fn interrupt_bit_is_stripped() {
        assert_eq!(classify(SCAUSE_INTERRUPT | 5), TrapKind::Interrupt(5));
    }

    #[test]
    fn exceptions_map_onto_fault_classes() {
        assert_eq!(classify(2), TrapKind::Fault(FaultClass::Usage));
        assert_eq!(classify(6), TrapKind::Fault(FaultClass::Usage));
        assert_eq!(classify(5), TrapKind::Fault(FaultClass::Bus));
        assert_eq!(classify(7), TrapKind::Fault(FaultClass::Bus));
        assert_eq!(classify(13), TrapKind::Fault(FaultClass::MemoryManagement));
        assert_eq!(classify(3), TrapKind::Fault(FaultClass::Debug));
        assert_eq!(classify(11), TrapKind::Fault(FaultClass::Hard));
        assert_eq!(classify(24), TrapKind::Fault(FaultClass::Hard));
    }

    #[test]
    fn interrupt_free_returns_the_closure_value() {
        assert_eq!(interrupt_free(|_| 7), 7);
    }
}
