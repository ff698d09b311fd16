// nt_secmon/src/trap/infrastructure/mod.rs

//! # Trap Infrastructure Module
//!
//! The working parts of the monitor core: the low-level hardware layer,
//! the dependency injection container, the router, the halt state and the
//! fault handlers.

// Low-level hardware interaction layer.
pub mod low_level;

// The Dependency Injection (DI) framework.
pub mod di;

// Concrete components.
pub mod fault;
pub mod halt_manager;
pub mod router;

// Re-export the main initialization function for the monitor.
pub use di::initialize_monitor;
