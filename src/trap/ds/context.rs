// nt_secmon/src/trap/ds/context.rs

//! # Trap Frames and Contexts
//!
//! A [`TrapFrame`] is the hardware's view of the interrupted register state.
//! The router never touches registers directly; it goes through the frame,
//! choosing the direct or the unprivileged access path from the caller's
//! privilege. [`TrapContext`] is the per-trap capture handed to slow-table
//! handlers.

use super::types::{Privilege, TrapOperand, Word};
use core::cell::Cell;

/// Number of argument words a supervisor call carries.
pub const TRAP_ARGS: usize = 4;

/// Access to the register state stacked when a trap fired.
///
/// Argument slot 0 doubles as the result slot.
pub trait TrapFrame {
    /// Privilege level of the interrupted code.
    fn privilege(&self) -> Privilege;
    /// Saved return address of the interrupted code.
    fn return_address(&self) -> usize;
    /// Operand of the trap instruction.
    fn operand(&self) -> TrapOperand;
    /// Direct load of an argument slot, for privileged callers.
    fn load(&self, slot: usize) -> Word;
    /// Load of an argument slot with the caller's access rights.
    fn load_unprivileged(&self, slot: usize) -> Word;
    /// Direct store into an argument slot.
    fn store(&mut self, slot: usize, value: Word);
    /// Store into an argument slot with the caller's access rights.
    fn store_unprivileged(&mut self, slot: usize, value: Word);

    /// Loads a slot through the access path matching the caller's privilege.
    fn load_arg(&self, slot: usize) -> Word {
        match self.privilege() {
            Privilege::Privileged => self.load(slot),
            Privilege::Unprivileged => self.load_unprivileged(slot),
        }
    }

    /// Stores a slot through the access path matching the caller's privilege.
    fn store_arg(&mut self, slot: usize, value: Word) {
        match self.privilege() {
            Privilege::Privileged => self.store(slot, value),
            Privilege::Unprivileged => self.store_unprivileged(slot, value),
        }
    }
}

/// Per-trap capture of the values a slow-table handler sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapContext {
    pub args: [Word; TRAP_ARGS],
    pub return_address: usize,
    pub operand: TrapOperand,
    pub mode: Privilege,
}

impl TrapContext {
    /// Captures the context from a frame, reading the argument words with
    /// the access rights of the caller.
    pub fn capture(frame: &dyn TrapFrame) -> Self {
        let mode = frame.privilege();
        let mut args = [0; TRAP_ARGS];
        for (slot, arg) in args.iter_mut().enumerate() {
            *arg = frame.load_arg(slot);
        }
        Self {
            args,
            return_address: frame.return_address(),
            operand: frame.operand(),
            mode,
        }
    }
}

/// # Saved Registers
///
/// This struct precisely matches the register layout saved by
/// `trap_entry.S` on a RISC-V hart. The order and size of fields are
/// critical and must not be altered without updating the assembly.
///
/// Supervisor calls use `a0..a3` (x10..x13) for arguments and the result,
/// and the low byte of `a7` (x17) as the operand because `ecall` carries no
/// immediate.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SavedRegisters {
    /// General-purpose registers x0-x31.
    pub x: [usize; 32],
    /// Supervisor Status Register (`sstatus`).
    pub sstatus: usize,
    /// Supervisor Exception Program Counter (`sepc`).
    pub sepc: usize,
    /// Supervisor Cause Register (`scause`).
    pub scause: usize,
    /// Supervisor Trap Value Register (`stval`).
    pub stval: usize,
}

impl SavedRegisters {
    const A0: usize = 10;
    const A7: usize = 17;
    /// `sstatus.SPP`: set when the trap came from S-mode.
    const SSTATUS_SPP: usize = 1 << 8;

    /// Creates a new, zero-initialized frame.
    pub const fn new() -> Self {
        Self {
            x: [0; 32],
            sstatus: 0,
            sepc: 0,
            scause: 0,
            stval: 0,
        }
    }

    /// Moves `sepc` past the 4-byte `ecall`.
    pub fn advance_sepc(&mut self) {
        self.sepc += 4;
    }
}

impl Default for SavedRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl TrapFrame for SavedRegisters {
    fn privilege(&self) -> Privilege {
        if self.sstatus & Self::SSTATUS_SPP != 0 {
            Privilege::Privileged
        } else {
            Privilege::Unprivileged
        }
    }

    fn return_address(&self) -> usize {
        self.sepc
    }

    fn operand(&self) -> TrapOperand {
        TrapOperand::new(self.x[Self::A7] as u8)
    }

    fn load(&self, slot: usize) -> Word {
        self.x[Self::A0 + slot]
    }

    // The hart spills the caller's registers into monitor memory, so the
    // unprivileged path reads the same slot without touching box memory.
    fn load_unprivileged(&self, slot: usize) -> Word {
        self.x[Self::A0 + slot]
    }

    fn store(&mut self, slot: usize, value: Word) {
        self.x[Self::A0 + slot] = value;
    }

    fn store_unprivileged(&mut self, slot: usize, value: Word) {
        self.x[Self::A0 + slot] = value;
    }
}

/// A software-stacked frame, used by harnesses that drive the router
/// without hardware. It counts accesses per path so callers can verify
/// that unprivileged traps never take the direct path.
#[derive(Debug, Clone)]
pub struct SoftFrame {
    pub mode: Privilege,
    pub return_address: usize,
    pub operand: TrapOperand,
    pub regs: [Word; TRAP_ARGS],
    direct_accesses: Cell<u32>,
    unprivileged_accesses: Cell<u32>,
}

impl SoftFrame {
    pub fn new(mode: Privilege, operand: u8, regs: [Word; TRAP_ARGS]) -> Self {
        Self {
            mode,
            return_address: 0,
            operand: TrapOperand::new(operand),
            regs,
            direct_accesses: Cell::new(0),
            unprivileged_accesses: Cell::new(0),
        }
    }

    pub fn direct_accesses(&self) -> u32 {
        self.direct_accesses.get()
    }

    pub fn unprivileged_accesses(&self) -> u32 {
        self.unprivileged_accesses.get()
    }

    fn bump(counter: &Cell<u32>) {
        counter.set(counter.get() + 1);
    }
}

impl TrapFrame for SoftFrame {
    fn privilege(&self) -> Privilege {
        self.mode
    }

    fn return_address(&self) -> usize {
        self.return_address
    }

    fn operand(&self) -> TrapOperand {
        self.operand
    }

    fn load(&self, slot: usize) -> Word {
        Self::bump(&self.direct_accesses);
        self.regs[slot]
    }

    fn load_unprivileged(&self, slot: usize) -> Word {
        Self::bump(&self.unprivileged_accesses);
        self.regs[slot]
    }

    fn store(&mut self, slot: usize, value: Word) {
        Self::bump(&self.direct_accesses);
        self.regs[slot] = value;
    }

    fn store_unprivileged(&mut self, slot: usize, value: Word) {
        Self::bump(&self.unprivileged_accesses);
        self.regs[slot] = value;
    }
}
