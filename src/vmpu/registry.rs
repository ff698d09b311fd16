// nt_secmon/src/vmpu/registry.rs

//! # Box Function Registry
//!
//! A fixed-capacity arena of [`FunctionRecord`]s kept sorted by an 8-bit
//! address hash, plus a 256-entry index from hash to the start of the run
//! of records sharing it. Registration happens once per box during start-up;
//! afterwards the registry is only read.

use crate::config::{MAX_PRIVATE_FUNCTIONS, MAX_PRIVATE_FUNCTIONS_LIMIT};
use crate::trap::infrastructure::low_level::CriticalSection;
use crate::debug_print;
use core::fmt;
use core::num::NonZeroU8;

/// Identifier of a registered box. Zero is reserved and never an owner.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoxId(NonZeroU8);

impl BoxId {
    /// The first identifier handed out.
    pub const FIRST: BoxId = match NonZeroU8::new(1) {
        Some(id) => BoxId(id),
        None => unreachable!(),
    };

    pub const fn new(raw: u8) -> Option<Self> {
        match NonZeroU8::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    pub const fn get(self) -> u8 {
        self.0.get()
    }

    const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "box#{}", self.get())
    }
}

/// Box descriptor handed over by the box-initialization collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxDescriptor<'a> {
    /// Addresses of the box's protected functions.
    pub functions: &'a [u32],
}

/// Errors returned by registry mutations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The batch does not fit in the remaining capacity.
    Overflow { requested: usize, available: usize },
    /// Every box identifier has been handed out.
    BoxIdExhausted,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow { requested, available } => write!(
                f,
                "function table overflow: {} requested, {} available",
                requested, available
            ),
            Self::BoxIdExhausted => write!(f, "box identifier space exhausted"),
        }
    }
}

/// Folds the four bytes of an address into its 8-bit hash.
pub const fn hash_addr(addr: u32) -> u8 {
    ((addr >> 24) ^ (addr >> 16) ^ (addr >> 8) ^ addr) as u8
}

/// One protected function and its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionRecord {
    pub addr: u32,
    pub hash: u8,
    pub box_id: BoxId,
    /// Length of the equal-hash run starting here; 0 for records inside a run.
    /// A full registry of 0x100 records can form a single run.
    pub run_length: u16,
    /// Reserved attribute bits.
    pub flags: u8,
}

impl FunctionRecord {
    const EMPTY: FunctionRecord = FunctionRecord {
        addr: 0,
        hash: 0,
        box_id: BoxId::FIRST,
        run_length: 0,
        flags: 0,
    };

    fn new(addr: u32, box_id: BoxId) -> Self {
        Self {
            addr,
            hash: hash_addr(addr),
            box_id,
            run_length: 0,
            flags: 0,
        }
    }
}

/// Registry of at most `N` functions.
pub struct BoxRegistry<const N: usize = MAX_PRIVATE_FUNCTIONS> {
    records: [FunctionRecord; N],
    count: usize,
    /// Start of the run for each hash; `None` when no record has that hash.
    hash_index: [Option<u8>; 0x100],
    last_box: Option<BoxId>,
}

impl<const N: usize> BoxRegistry<N> {
    const CAPACITY_FITS_INDEX: () = assert!(
        N <= MAX_PRIVATE_FUNCTIONS_LIMIT,
        "registry capacity must not exceed 0x100"
    );

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_FITS_INDEX;
        Self {
            records: [FunctionRecord::EMPTY; N],
            count: 0,
            hash_index: [None; 0x100],
            last_box: None,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The registered records, sorted by hash.
    pub fn records(&self) -> &[FunctionRecord] {
        &self.records[..self.count]
    }

    /// Number of boxes registered so far.
    pub fn box_count(&self) -> usize {
        self.last_box.map_or(0, |id| usize::from(id.get()))
    }

    /// Registers a box and its functions, returning the new identifier.
    ///
    /// A failed registration leaves the registry untouched and does not
    /// consume an identifier.
    pub fn add_box(
        &mut self,
        cs: &CriticalSection<'_>,
        desc: &BoxDescriptor<'_>,
    ) -> Result<BoxId, RegistryError> {
        let box_id = match self.last_box {
            None => BoxId::FIRST,
            Some(last) => last.next().ok_or(RegistryError::BoxIdExhausted)?,
        };

        if !desc.functions.is_empty() {
            self.add_box_functions(cs, box_id, desc.functions)?;
        }

        self.last_box = Some(box_id);
        Ok(box_id)
    }

    /// Appends `addrs` for `box_id` and rebuilds the hash index.
    ///
    /// The whole batch is rejected if it does not fit. Returns the total
    /// number of registered functions.
    pub fn add_box_functions(
        &mut self,
        _cs: &CriticalSection<'_>,
        box_id: BoxId,
        addrs: &[u32],
    ) -> Result<usize, RegistryError> {
        let available = N - self.count;
        if addrs.len() > available {
            return Err(RegistryError::Overflow {
                requested: addrs.len(),
                available,
            });
        }

        for (slot, &addr) in self.records[self.count..].iter_mut().zip(addrs) {
            *slot = FunctionRecord::new(addr, box_id);
        }
        self.count += addrs.len();

        self.sort_by_hash();
        self.rebuild_index();

        debug_print!("added {} functions for {}:", addrs.len(), box_id);
        for record in self.records() {
            debug_print!(
                "\tfn_addr:{:#010x}, box:{:#04x}, fn_hash={:#04x}, fn_count={:#04x}",
                record.addr,
                record.box_id.get(),
                record.hash,
                record.run_length
            );
        }

        Ok(self.count)
    }

    /// Finds the owner of a registered function address.
    pub fn lookup(&self, addr: u32) -> Option<BoxId> {
        let start = usize::from(self.hash_index[usize::from(hash_addr(addr))]?);
        let run = usize::from(self.records[start].run_length);
        self.records[start..start + run]
            .iter()
            .find(|record| record.addr == addr)
            .map(|record| record.box_id)
    }

    /// Stable insertion sort by hash. The prefix registered earlier is
    /// already sorted, so each batch only moves its own records.
    fn sort_by_hash(&mut self) {
        let records = &mut self.records[..self.count];
        for i in 1..records.len() {
            let mut j = i;
            while j > 0 && records[j - 1].hash > records[j].hash {
                records.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    /// Walks the sorted records once, storing each run's start in the index
    /// and its length in the run's first record.
    fn rebuild_index(&mut self) {
        self.hash_index = [None; 0x100];

        let count = self.count;
        let mut start = 0;
        while start < count {
            let hash = self.records[start].hash;
            let mut end = start + 1;
            while end < count && self.records[end].hash == hash {
                self.records[end].run_length = 0;
                end += 1;
            }
            // N <= 0x100: a start fits in u8, a run length in u16.
            self.records[start].run_length = (end - start) as u16;
            self.hash_index[usize::from(hash)] = Some(start as u8);
            start = end;
        }
    }
}

impl<const N: usize> Default for BoxRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trap::infrastructure::low_level::interrupt_free;
    use proptest::prelude::*;

    fn id(raw: u8) -> BoxId {
        BoxId::new(raw).unwrap()
    }

    /// Addresses whose hash is `hash`: the low byte is chosen so the fold lands there.
    fn addr_with_hash(high: u32, hash: u8) -> u32 {
        let high = high & 0xFFFF_FF00;
        let partial = hash_addr(high);
        high | u32::from(partial ^ hash)
    }

    #[test]
    fn hash_folds_all_four_bytes() {
        assert_eq!(hash_addr(0x0000_0000), 0x00);
        assert_eq!(hash_addr(0x1234_5678), 0x12 ^ 0x34 ^ 0x56 ^ 0x78);
        assert_eq!(hash_addr(0xFF00_0000), 0xFF);
        assert_eq!(hash_addr(0x0000_00FF), 0xFF);
    }

    #[test]
    fn box_zero_is_not_an_identifier() {
        assert!(BoxId::new(0).is_none());
        assert_eq!(BoxId::FIRST.get(), 1);
    }

    #[test]
    fn first_record_is_reachable() {
        let mut reg: BoxRegistry<16> = BoxRegistry::new();
        // Hash 0 sorts first, so this record sits at array index 0.
        let addr = 0x0101_0000;
        assert_eq!(hash_addr(addr), 0);
        interrupt_free(|cs| reg.add_box_functions(cs, id(1), &[addr, 0x0800_0401]))
            .unwrap();
        assert_eq!(reg.records()[0].addr, addr);
        assert_eq!(reg.lookup(addr), Some(id(1)));
    }

    #[test]
    fn capacity_overflow_keeps_earlier_boxes() {
        let mut reg: BoxRegistry<16> = BoxRegistry::new();
        let box1: [u32; 10] = core::array::from_fn(|i| 0x0800_1000 + 0x40 * i as u32);
        let box2: [u32; 10] = core::array::from_fn(|i| 0x0801_2000 + 0x40 * i as u32);

        let first = interrupt_free(|cs| reg.add_box(cs, &BoxDescriptor { functions: &box1 }));
        assert_eq!(first, Ok(id(1)));
        assert_eq!(reg.len(), 10);

        let second = interrupt_free(|cs| reg.add_box(cs, &BoxDescriptor { functions: &box2 }));
        assert_eq!(
            second,
            Err(RegistryError::Overflow {
                requested: 10,
                available: 6
            })
        );
        assert_eq!(reg.len(), 10);
        for addr in box1 {
            assert_eq!(reg.lookup(addr), Some(id(1)));
        }
        for addr in box2 {
            assert_eq!(reg.lookup(addr), None);
        }

        // The failed registration did not burn an identifier.
        let third = interrupt_free(|cs| reg.add_box(cs, &BoxDescriptor { functions: &box2[..6] }));
        assert_eq!(third, Ok(id(2)));
        assert_eq!(reg.len(), 16);
    }

    #[test]
    fn add_box_functions_returns_running_total() {
        let mut reg: BoxRegistry<16> = BoxRegistry::new();
        let total = interrupt_free(|cs| reg.add_box_functions(cs, id(1), &[0x10, 0x20, 0x30]));
        assert_eq!(total, Ok(3));
        let total = interrupt_free(|cs| reg.add_box_functions(cs, id(2), &[0x40]));
        assert_eq!(total, Ok(4));
    }

    #[test]
    fn colliding_hashes_resolve_through_the_run() {
        let a = addr_with_hash(0x0800_1100, 0x5A);
        let b = addr_with_hash(0x0802_2200, 0x5A);
        let c = addr_with_hash(0x2000_3300, 0x5A);
        let other = addr_with_hash(0x0800_1100, 0x5B);
        assert_eq!(hash_addr(a), hash_addr(b));
        assert_eq!(hash_addr(b), hash_addr(c));
        assert_ne!(hash_addr(other), 0x5A);

        let orders: [[u32; 3]; 3] = [[a, b, c], [c, a, b], [b, c, a]];
        for order in orders {
            let mut reg: BoxRegistry<16> = BoxRegistry::new();
            interrupt_free(|cs| {
                reg.add_box_functions(cs, id(1), &order[..1]).unwrap();
                reg.add_box_functions(cs, id(2), &order[1..2]).unwrap();
                reg.add_box_functions(cs, id(3), &order[2..]).unwrap();
            });
            assert_eq!(reg.lookup(order[0]), Some(id(1)));
            assert_eq!(reg.lookup(order[1]), Some(id(2)));
            assert_eq!(reg.lookup(order[2]), Some(id(3)));
            assert_eq!(reg.lookup(other), None);

            let start = reg.records().iter().position(|r| r.hash == 0x5A).unwrap();
            assert_eq!(reg.records()[start].run_length, 3);
        }
    }

    #[test]
    fn unknown_address_in_known_run_is_not_found() {
        let mut reg: BoxRegistry<16> = BoxRegistry::new();
        let a = addr_with_hash(0x0800_1100, 0x11);
        let stranger = addr_with_hash(0x0900_0000, 0x11);
        interrupt_free(|cs| reg.add_box_functions(cs, id(1), &[a])).unwrap();
        assert_eq!(reg.lookup(stranger), None);
        assert_eq!(reg.lookup(a), Some(id(1)));
    }

    #[test]
    fn box_ids_run_out() {
        let mut reg: BoxRegistry<4> = BoxRegistry::new();
        interrupt_free(|cs| {
            for expected in 1..=255u8 {
                assert_eq!(reg.add_box(cs, &BoxDescriptor::default()), Ok(id(expected)));
            }
            assert_eq!(
                reg.add_box(cs, &BoxDescriptor::default()),
                Err(RegistryError::BoxIdExhausted)
            );
        });
        assert_eq!(reg.box_count(), 255);
        assert!(reg.is_empty());
    }

    #[test]
    fn full_capacity_of_256() {
        let mut reg: BoxRegistry<256> = BoxRegistry::new();
        let addrs: [u32; 256] = core::array::from_fn(|i| 0x0800_0000 + 4 * i as u32);
        interrupt_free(|cs| reg.add_box_functions(cs, id(7), &addrs)).unwrap();
        for addr in addrs {
            assert_eq!(reg.lookup(addr), Some(id(7)));
        }
        assert_eq!(
            interrupt_free(|cs| reg.add_box_functions(cs, id(7), &[1])),
            Err(RegistryError::Overflow {
                requested: 1,
                available: 0
            })
        );
    }

    #[test]
    fn full_registry_sharing_one_hash_stays_resolvable() {
        let mut reg: BoxRegistry<256> = BoxRegistry::new();
        let addrs: [u32; 256] = core::array::from_fn(|b| {
            let b = b as u32;
            (b << 24) | (b << 16)
        });
        assert!(addrs.iter().all(|&a| hash_addr(a) == 0));

        let total = interrupt_free(|cs| reg.add_box_functions(cs, id(1), &addrs));
        assert_eq!(total, Ok(256));
        assert_eq!(reg.records()[0].run_length, 256);
        assert_sorted_and_indexed(&reg);
        for addr in addrs {
            assert_eq!(reg.lookup(addr), Some(id(1)));
        }
    }

    fn assert_sorted_and_indexed<const N: usize>(reg: &BoxRegistry<N>) {
        let records = reg.records();
        assert!(records.windows(2).all(|w| w[0].hash <= w[1].hash));
        for (i, record) in records.iter().enumerate() {
            let starts_run = i == 0 || records[i - 1].hash != record.hash;
            if starts_run {
                assert_eq!(reg.hash_index[usize::from(record.hash)], Some(i as u8));
                assert!(record.run_length > 0);
            } else {
                assert_eq!(record.run_length, 0);
            }
        }
    }

    proptest! {
        #[test]
        fn disjoint_boxes_resolve_to_their_owner(
            addrs in proptest::collection::hash_set(any::<u32>(), 2..32),
            split in any::<prop::sample::Index>(),
            reverse in any::<bool>(),
        ) {
            let addrs: std::vec::Vec<u32> = addrs.into_iter().collect();
            let cut = split.index(addrs.len() - 1) + 1;
            let (mut b_set, c_set) = (addrs[..cut].to_vec(), addrs[cut..].to_vec());
            if reverse {
                b_set.reverse();
            }

            let mut reg: BoxRegistry<32> = BoxRegistry::new();
            let (b, c) = interrupt_free(|cs| {
                let b = reg.add_box(cs, &BoxDescriptor { functions: &b_set }).unwrap();
                let c = reg.add_box(cs, &BoxDescriptor { functions: &c_set }).unwrap();
                (b, c)
            });

            for addr in &b_set {
                prop_assert_eq!(reg.lookup(*addr), Some(b));
            }
            for addr in &c_set {
                prop_assert_eq!(reg.lookup(*addr), Some(c));
            }
        }

        #[test]
        fn records_stay_sorted_after_any_batches(
            batches in proptest::collection::vec(
                proptest::collection::vec(any::<u32>(), 0..6),
                1..8,
            ),
        ) {
            let mut reg: BoxRegistry<48> = BoxRegistry::new();
            interrupt_free(|cs| {
                for (n, batch) in batches.iter().enumerate() {
                    reg.add_box_functions(cs, id(n as u8 + 1), batch).unwrap();
                }
            });
            assert_sorted_and_indexed(&reg);

            // Sorting again changes nothing.
            let before: std::vec::Vec<FunctionRecord> = reg.records().to_vec();
            reg.sort_by_hash();
            prop_assert_eq!(reg.records(), &before[..]);
        }
    }
}
