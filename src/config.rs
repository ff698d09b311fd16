// nt_secmon/src/config.rs

//! Build-time configuration of the monitor.
//!
//! Everything here is fixed when the image is linked. Changing the trap
//! operand layout (see [`crate::trap::exports`]) or the registry capacity
//! requires rebuilding every box.

/// Default capacity of the box function registry.
pub const MAX_PRIVATE_FUNCTIONS: usize = 16;

/// Hard upper bound on the registry capacity: run starts are stored as `u8`.
pub const MAX_PRIVATE_FUNCTIONS_LIMIT: usize = 0x100;

const _: () = assert!(
    MAX_PRIVATE_FUNCTIONS <= MAX_PRIVATE_FUNCTIONS_LIMIT,
    "MAX_PRIVATE_FUNCTIONS must not exceed 0x100"
);

/// Boot stack size (16KB).
pub const STACK_SIZE: usize = 4096 * 4;

/// Lowest log level written to the console. Debug builds also print the
/// registry dump after every batch.
pub const LOG_LEVEL: crate::console::Level = if cfg!(debug_assertions) {
    crate::console::Level::Debug
} else {
    crate::console::Level::Info
};
