// nt_secmon/src/trap/vectors.rs

//! # Supervisor Call Vectors
//!
//! The services behind the table slots live outside the monitor core and
//! are reached through the collaborator traits below. A platform picks the
//! services it provides; every method it leaves alone halts the monitor
//! with [`HaltReason::NotImplemented`]. [`SvcVectors::for_platform`] binds
//! one platform into the three dispatch tables at compile time.

use crate::trap::api::halt;
use crate::trap::ds::{
    ConfigError, FastHandler, FastTable, HaltReason, PrivHook, SlowHandler, SvcTables, TrapFrame,
    Word,
};
use crate::trap::exports::{fast_priv, fast_unpriv, slow, SVC_FAST_INDEX_MAX};
use crate::util::sbi;
use crate::warn_print;

/// Halts for a slot with no service behind it.
pub fn not_implemented() -> ! {
    halt(HaltReason::NotImplemented)
}

/// Interrupt virtualization for boxes.
pub trait InterruptVirtualization {
    /// Leaves a box gateway back into the caller.
    fn gateway_out(_frame: &mut dyn TrapFrame) {
        not_implemented()
    }
    /// Enters a box from a privileged interrupt context.
    fn gateway_in(_frame: &mut dyn TrapFrame) {
        not_implemented()
    }
    fn isr_set(_irqn: Word, _vector: Word, _flag: Word) {
        not_implemented()
    }
    fn isr_get(_irqn: Word) -> Word {
        not_implemented()
    }
    fn irq_enable(_irqn: Word) {
        not_implemented()
    }
    fn irq_disable(_irqn: Word) {
        not_implemented()
    }
    fn irq_pending_clr(_irqn: Word) {
        not_implemented()
    }
    fn irq_pending_set(_irqn: Word) {
        not_implemented()
    }
    fn irq_pending_get(_irqn: Word) -> Word {
        not_implemented()
    }
    fn irq_priority_set(_irqn: Word, _priority: Word) {
        not_implemented()
    }
    fn irq_priority_get(_irqn: Word) -> Word {
        not_implemented()
    }
    fn irq_level_get() -> Word {
        not_implemented()
    }
    fn irq_disable_all() {
        not_implemented()
    }
    fn irq_enable_all() {
        not_implemented()
    }
    /// Delivers a hardware interrupt to whichever box owns it.
    fn isr_dispatch(_cause: Word) {
        not_implemented()
    }
}

/// Box lifecycle and lookup services.
pub trait BoxServices {
    fn register_gateway(_frame: &mut dyn TrapFrame) {
        not_implemented()
    }
    fn box_init_first(_frame: &mut dyn TrapFrame) {
        not_implemented()
    }
    fn box_init_next(_frame: &mut dyn TrapFrame) {
        not_implemented()
    }
    /// Copies the namespace of `box_id` into the caller's buffer.
    fn namespace_from_id(_box_id: Word, _buf: Word, _size: Word) -> Word {
        not_implemented()
    }
}

pub trait DebugServices {
    /// Restarts the system. The default asks the SBI firmware for a cold
    /// reboot.
    fn reboot(reason: Word) {
        warn_print!("debug reboot requested, reason {:#x}", reason);
        sbi::system::reboot()
    }
    fn register_driver(_driver: Word) {
        not_implemented()
    }
}

pub trait PageServices {
    fn page_malloc(_table: Word) -> Word {
        not_implemented()
    }
    fn page_free(_table: Word) -> Word {
        not_implemented()
    }
}

/// Everything a board provides to the monitor.
pub trait Platform:
    InterruptVirtualization + BoxServices + DebugServices + PageServices + 'static
{
    /// The privileged hook behind operand 0. It owns the exception return.
    fn priv_svc_0(_frame: &mut dyn TrapFrame) {
        not_implemented()
    }
}

/// Interrupt entry for asynchronous causes.
pub type IrqHandler = fn(Word);

/// The resolved vectors of one platform.
pub struct SvcVectors {
    pub fast_unpriv: FastTable,
    pub fast_priv: FastTable,
    pub slow: [SlowHandler; slow::TABLE_LEN],
    pub priv_hook: PrivHook,
    pub irq: IrqHandler,
}

impl SvcVectors {
    pub const fn for_platform<P: Platform>() -> Self {
        let unassigned: FastHandler = fast_not_implemented;
        let mut unpriv_table = [unassigned; SVC_FAST_INDEX_MAX];
        unpriv_table[fast_unpriv::GATEWAY_OUT as usize] = P::gateway_out;
        unpriv_table[fast_unpriv::REGISTER_GATEWAY as usize] = P::register_gateway;
        unpriv_table[fast_unpriv::BOX_INIT_FIRST as usize] = P::box_init_first;
        unpriv_table[fast_unpriv::BOX_INIT_NEXT as usize] = P::box_init_next;

        let mut priv_table = [unassigned; SVC_FAST_INDEX_MAX];
        priv_table[fast_priv::GATEWAY_IN as usize] = P::gateway_in;

        // Slots 0, 10-12 and 15-16 are unassigned or deprecated.
        let mut table: [SlowHandler; slow::TABLE_LEN] = [slow_not_implemented; slow::TABLE_LEN];
        table[slow::ISR_SET as usize] = isr_set::<P>;
        table[slow::ISR_GET as usize] = isr_get::<P>;
        table[slow::IRQ_ENABLE as usize] = irq_enable::<P>;
        table[slow::IRQ_DISABLE as usize] = irq_disable::<P>;
        table[slow::IRQ_PENDING_CLR as usize] = irq_pending_clr::<P>;
        table[slow::IRQ_PENDING_SET as usize] = irq_pending_set::<P>;
        table[slow::IRQ_PENDING_GET as usize] = irq_pending_get::<P>;
        table[slow::IRQ_PRIORITY_SET as usize] = irq_priority_set::<P>;
        table[slow::IRQ_PRIORITY_GET as usize] = irq_priority_get::<P>;
        table[slow::HALT_USER_ERROR as usize] = halt_user_error;
        table[slow::IRQ_LEVEL_GET as usize] = irq_level_get::<P>;
        table[slow::BOX_NAMESPACE_FROM_ID as usize] = box_namespace_from_id::<P>;
        table[slow::DEBUG_REBOOT as usize] = debug_reboot::<P>;
        table[slow::DEBUG_REGISTER_DRIVER as usize] = debug_register_driver::<P>;
        table[slow::IRQ_DISABLE_ALL as usize] = irq_disable_all::<P>;
        table[slow::IRQ_ENABLE_ALL as usize] = irq_enable_all::<P>;
        table[slow::PAGE_MALLOC as usize] = page_malloc::<P>;
        table[slow::PAGE_FREE as usize] = page_free::<P>;

        Self {
            fast_unpriv: unpriv_table,
            fast_priv: priv_table,
            slow: table,
            priv_hook: P::priv_svc_0,
            irq: P::isr_dispatch,
        }
    }

    /// Runs the boot self-check over the resolved tables.
    pub fn tables(&'static self) -> Result<SvcTables, ConfigError> {
        SvcTables::new(&self.fast_unpriv, &self.fast_priv, &self.slow)
    }
}

fn fast_not_implemented(_frame: &mut dyn TrapFrame) {
    not_implemented()
}

fn slow_not_implemented(_: Word, _: Word, _: Word, _: Word) -> Word {
    not_implemented()
}

/// Bits of a box's error word kept in the halt code. The packed
/// [`ErrorCode`](crate::trap::ds::ErrorCode) has a 16-bit number field, so
/// higher bits are dropped.
pub const USER_ERROR_MASK: Word = 0xFFFF;

/// The halt code number recorded for a box's error word.
pub const fn user_error_number(reason: Word) -> u16 {
    (reason & USER_ERROR_MASK) as u16
}

fn halt_user_error(reason: Word, _: Word, _: Word, _: Word) -> Word {
    halt(HaltReason::UserError(user_error_number(reason)))
}

fn isr_set<P: Platform>(irqn: Word, vector: Word, flag: Word, _: Word) -> Word {
    P::isr_set(irqn, vector, flag);
    0
}

fn isr_get<P: Platform>(irqn: Word, _: Word, _: Word, _: Word) -> Word {
    P::isr_get(irqn)
}

fn irq_enable<P: Platform>(irqn: Word, _: Word, _: Word, _: Word) -> Word {
    P::irq_enable(irqn);
    0
}

fn irq_disable<P: Platform>(irqn: Word, _: Word, _: Word, _: Word) -> Word {
    P::irq_disable(irqn);
    0
}

fn irq_pending_clr<P: Platform>(irqn: Word, _: Word, _: Word, _: Word) -> Word {
    P::irq_pending_clr(irqn);
    0
}

fn irq_pending_set<P: Platform>(irqn: Word, _: Word, _: Word, _: Word) -> Word {
    P::irq_pending_set(irqn);
    0
}

fn irq_pending_get<P: Platform>(irqn: Word, _: Word, _: Word, _: Word) -> Word {
    P::irq_pending_get(irqn)
}

fn irq_priority_set<P: Platform>(irqn: Word, priority: Word, _: Word, _: Word) -> Word {
    P::irq_priority_set(irqn, priority);
    0
}

fn irq_priority_get<P: Platform>(irqn: Word, _: Word, _: Word, _: Word) -> Word {
    P::irq_priority_get(irqn)
}

fn irq_level_get<P: Platform>(_: Word, _: Word, _: Word, _: Word) -> Word {
    P::irq_level_get()
}

fn box_namespace_from_id<P: Platform>(box_id: Word, buf: Word, size: Word, _: Word) -> Word {
    P::namespace_from_id(box_id, buf, size)
}

fn debug_reboot<P: Platform>(reason: Word, _: Word, _: Word, _: Word) -> Word {
    P::reboot(reason);
    0
}

fn debug_register_driver<P: Platform>(driver: Word, _: Word, _: Word, _: Word) -> Word {
    P::register_driver(driver);
    0
}

fn irq_disable_all<P: Platform>(_: Word, _: Word, _: Word, _: Word) -> Word {
    P::irq_disable_all();
    0
}

fn irq_enable_all<P: Platform>(_: Word, _: Word, _: Word, _: Word) -> Word {
    P::irq_enable_all();
    0
}

fn page_malloc<P: Platform>(table: Word, _: Word, _: Word, _: Word) -> Word {
    P::page_malloc(table)
}

fn page_free<P: Platform>(table: Word, _: Word, _: Word, _: Word) -> Word {
    P::page_free(table)
}
