// nt_secmon/src/vmpu/mod.rs

//! # Virtual MPU: Box Bookkeeping
//!
//! Owns the global box function registry. Writers hold the write lock with
//! interrupts disabled for their whole extent, so a lookup issued from trap
//! or fault context never observes a half-sorted table. Lookups share the
//! read lock, so a lookup that preempts another lookup on the same core
//! still completes. Nothing outside this module touches the registry
//! directly.

pub mod acl;
pub mod registry;

pub use self::acl::{AccessControl, Acl, PermissiveAcl};
pub use self::registry::{
    hash_addr, BoxDescriptor, BoxId, BoxRegistry, FunctionRecord, RegistryError,
};

use crate::trap::infrastructure::low_level::interrupt_free;
use crate::{error_print, info_print};
use spin::RwLock;

static REGISTRY: RwLock<BoxRegistry> = RwLock::new(BoxRegistry::new());

/// Registers a box described by the box-initialization collaborator.
///
/// The caller must treat an error as fatal for the box.
pub fn add_box(desc: &BoxDescriptor<'_>) -> Result<BoxId, RegistryError> {
    let result = interrupt_free(|cs| REGISTRY.write().add_box(cs, desc));
    match &result {
        Ok(id) => info_print!("{} registered with {} functions", id, desc.functions.len()),
        Err(e) => error_print!("box registration failed: {}", e),
    }
    result
}

/// Adds protected functions for an already registered box.
pub fn add_box_functions(box_id: BoxId, addrs: &[u32]) -> Result<usize, RegistryError> {
    interrupt_free(|cs| REGISTRY.write().add_box_functions(cs, box_id, addrs))
}

/// Resolves the box owning a protected function address.
///
/// Safe to call from trap and fault context.
pub fn lookup_box_by_address(addr: u32) -> Option<BoxId> {
    interrupt_free(|_| REGISTRY.read().lookup(addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn lookup_completes_while_an_interrupted_lookup_holds_the_registry() {
        const ADDR: u32 = 0x0800_0401;
        let id = add_box(&BoxDescriptor { functions: &[ADDR] }).unwrap();

        // The outer reader stands in for a lookup preempted by a trap.
        let outer = REGISTRY.read();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(lookup_box_by_address(ADDR));
        });
        let nested = rx.recv_timeout(Duration::from_secs(2));
        drop(outer);

        assert_eq!(nested, Ok(Some(id)));
        assert_eq!(lookup_box_by_address(ADDR ^ 0x10), None);
    }
}
