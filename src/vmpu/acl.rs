// nt_secmon/src/vmpu/acl.rs

//! Access-control decision primitives.
//!
//! The region-programming algorithm that backs these decisions belongs to
//! the memory-protection collaborator. The monitor core only fixes the call
//! shapes, and ships [`PermissiveAcl`] which grants every request.

use bitflags::bitflags;

bitflags! {
    /// Access rights attached to a box resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Acl: u16 {
        const EXECUTE_READ = 0x0001;
        const EXECUTE_WRITE = 0x0002;
        const EXECUTE_EXECUTE = 0x0004;
        const USER_READ = 0x0008;
        const USER_WRITE = 0x0010;
        const USER_EXECUTE = 0x0020;
        const STACK = 0x0400;
        const PERIPHERAL = 0x2000;
        const SHARED = 0x4000;
        const USER = 0x8000;

        const USER_RW = Self::USER_READ.bits() | Self::USER_WRITE.bits();
    }
}

/// Decides whether a box holding `acl` may touch a resource.
pub trait AccessControl {
    /// Access to a whole peripheral by device id.
    fn acl_dev(&self, acl: Acl, device_id: u16) -> bool;
    /// Access to `size` bytes of memory at `addr`.
    fn acl_mem(&self, acl: Acl, addr: u32, size: u32) -> bool;
    /// Access to a register with separate read and write masks.
    fn acl_reg(&self, acl: Acl, addr: u32, rmask: u32, wmask: u32) -> bool;
    /// Access to a single bit-band address.
    fn acl_bit(&self, acl: Acl, addr: u32) -> bool;
}

/// Grants everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct PermissiveAcl;

impl AccessControl for PermissiveAcl {
    fn acl_dev(&self, _acl: Acl, _device_id: u16) -> bool {
        true
    }

    fn acl_mem(&self, _acl: Acl, _addr: u32, _size: u32) -> bool {
        true
    }

    fn acl_reg(&self, _acl: Acl, _addr: u32, _rmask: u32, _wmask: u32) -> bool {
        true
    }

    fn acl_bit(&self, _acl: Acl, _addr: u32) -> bool {
        true
    }
}
