// nt_secmon/src/trap/exports.rs

//! # Trap Operand Encoding
//!
//! The 8-bit operand carried by every supervisor call is shared by the
//! monitor and all code loaded into the system:
//!
//! ```text
//!   0x00            privileged hook (context switch, interrupt tail-chaining)
//!   1xxx_iiii       fast table, index iiii (bits 4-6 ignored)
//!   0iii_iiii       slow table, index iii_iiii (nonzero)
//! ```

/// Selector bit: set for the fast table, clear for the slow table.
pub const SVC_MODE_MASK: u8 = 0x80;
/// Index bits of a fast operand.
pub const SVC_FAST_INDEX_MASK: u8 = 0x0F;
/// Width of each fast table.
pub const SVC_FAST_INDEX_MAX: usize = (SVC_FAST_INDEX_MASK as usize) + 1;
/// Index bits of a slow operand.
pub const SVC_SLOW_INDEX_MASK: u8 = !SVC_MODE_MASK;
/// Largest slow table the encoding can address.
pub const SVC_SLOW_INDEX_MAX: usize = (SVC_SLOW_INDEX_MASK as usize) + 1;

/// Operand that selects the privileged hook.
pub const SVC_PRIV_HOOK: u8 = 0;

/// Encodes a fast-table operand.
pub const fn svc_fast(index: u8) -> u8 {
    SVC_MODE_MASK | (index & SVC_FAST_INDEX_MASK)
}

/// Encodes a slow-table operand.
pub const fn svc_slow(index: u8) -> u8 {
    index & SVC_SLOW_INDEX_MASK
}

/// Fast-table slots for calls from unprivileged code.
pub mod fast_unpriv {
    pub const GATEWAY_OUT: u8 = 0;
    pub const REGISTER_GATEWAY: u8 = 3;
    pub const BOX_INIT_FIRST: u8 = 4;
    pub const BOX_INIT_NEXT: u8 = 5;
}

/// Fast-table slots for calls from privileged code.
pub mod fast_priv {
    pub const GATEWAY_IN: u8 = 0;
}

/// Slow-table slots. Gaps are deprecated or unassigned and halt when called.
pub mod slow {
    pub const ISR_SET: u8 = 1;
    pub const ISR_GET: u8 = 2;
    pub const IRQ_ENABLE: u8 = 3;
    pub const IRQ_DISABLE: u8 = 4;
    pub const IRQ_PENDING_CLR: u8 = 5;
    pub const IRQ_PENDING_SET: u8 = 6;
    pub const IRQ_PENDING_GET: u8 = 7;
    pub const IRQ_PRIORITY_SET: u8 = 8;
    pub const IRQ_PRIORITY_GET: u8 = 9;
    pub const HALT_USER_ERROR: u8 = 13;
    pub const IRQ_LEVEL_GET: u8 = 14;
    pub const BOX_NAMESPACE_FROM_ID: u8 = 17;
    pub const DEBUG_REBOOT: u8 = 18;
    pub const DEBUG_REGISTER_DRIVER: u8 = 19;
    pub const IRQ_DISABLE_ALL: u8 = 20;
    pub const IRQ_ENABLE_ALL: u8 = 21;
    pub const PAGE_MALLOC: u8 = 22;
    pub const PAGE_FREE: u8 = 23;

    /// Number of entries in the reference slow table.
    pub const TABLE_LEN: usize = 24;
}

const _: () = assert!(slow::TABLE_LEN <= SVC_SLOW_INDEX_MAX);
