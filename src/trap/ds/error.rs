// nt_secmon/src/trap/ds/error.rs

//! # Error and Halt Data Structures
//!
//! Every fatal condition is described by a [`HaltReason`], which packs into
//! a structured 32-bit [`ErrorCode`]. The packed form is what the monitor
//! state machine stores, so it fits in a single atomic word.

use super::types::Privilege;
use core::fmt;

/// Defines the severity of an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ErrorLevel {
    /// An unrecoverable error requiring a system halt.
    Fatal = 0,
    /// A serious error confined to one box.
    Critical = 1,
    /// A standard error reported to the caller.
    Error = 2,
    /// A potential issue that does not prevent correct operation.
    Warning = 3,
}

/// Identifies the subsystem where an error originated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorSource {
    Unknown = 0,
    Svc = 1,
    Registry = 2,
    Fault = 3,
    Box = 4,
    Kernel = 5,
}

/// A structured error code, combining source, level, and a specific code.
/// Format: 32-bit integer
/// - Bits 24-31: `ErrorSource`
/// - Bits 16-23: `ErrorLevel`
/// - Bits 0-15:  Specific error number
///
/// Codes built from a known source are never zero.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct ErrorCode(u32);

impl ErrorCode {
    /// Creates a new `ErrorCode`.
    pub const fn new(source: ErrorSource, level: ErrorLevel, code: u16) -> Self {
        Self(((source as u32) << 24) | ((level as u32) << 16) | (code as u32))
    }

    /// Reinterprets a raw value, e.g. one loaded from the halt state.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the `ErrorSource` part of the code.
    pub fn source(&self) -> ErrorSource {
        match (self.0 >> 24) as u8 {
            1 => ErrorSource::Svc,
            2 => ErrorSource::Registry,
            3 => ErrorSource::Fault,
            4 => ErrorSource::Box,
            5 => ErrorSource::Kernel,
            _ => ErrorSource::Unknown,
        }
    }

    /// Returns the `ErrorLevel` part of the code.
    pub fn level(&self) -> ErrorLevel {
        match ((self.0 >> 16) & 0xFF) as u8 {
            0 => ErrorLevel::Fatal,
            1 => ErrorLevel::Critical,
            2 => ErrorLevel::Error,
            _ => ErrorLevel::Warning,
        }
    }

    /// Returns the specific error number.
    pub fn number(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Checks if the error is fatal.
    pub fn is_fatal(&self) -> bool {
        self.level() == ErrorLevel::Fatal
    }
}

impl fmt::Debug for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ErrorCode({:?}|{:?}|{})",
            self.source(),
            self.level(),
            self.number()
        )
    }
}

/// Boot-time dispatch table misconfiguration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A fast table does not have exactly `SVC_FAST_INDEX_MAX` entries.
    FastTableWidth(Privilege),
    /// The slow table has no entries.
    SlowTableEmpty,
    /// The slow table is longer than the slow index can address.
    SlowTableTooLong,
}

impl ConfigError {
    const fn number(self) -> u16 {
        match self {
            Self::FastTableWidth(Privilege::Unprivileged) => 1,
            Self::FastTableWidth(Privilege::Privileged) => 2,
            Self::SlowTableEmpty => 3,
            Self::SlowTableTooLong => 4,
        }
    }

    const fn from_number(number: u16) -> Option<Self> {
        match number {
            1 => Some(Self::FastTableWidth(Privilege::Unprivileged)),
            2 => Some(Self::FastTableWidth(Privilege::Privileged)),
            3 => Some(Self::SlowTableEmpty),
            4 => Some(Self::SlowTableTooLong),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastTableWidth(p) => write!(f, "{:?} fast table has the wrong width", p),
            Self::SlowTableEmpty => write!(f, "slow table is empty"),
            Self::SlowTableTooLong => write!(f, "slow table exceeds the slow index range"),
        }
    }
}

/// Hardware protection fault classes routed to the fail-stop handlers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultClass {
    Usage = 0,
    MemoryManagement = 1,
    Bus = 2,
    Hard = 3,
    Debug = 4,
}

impl FaultClass {
    pub const ALL: [FaultClass; 5] = [
        FaultClass::Usage,
        FaultClass::MemoryManagement,
        FaultClass::Bus,
        FaultClass::Hard,
        FaultClass::Debug,
    ];

    const fn from_number(number: u16) -> Option<Self> {
        match number {
            0 => Some(Self::Usage),
            1 => Some(Self::MemoryManagement),
            2 => Some(Self::Bus),
            3 => Some(Self::Hard),
            4 => Some(Self::Debug),
            _ => None,
        }
    }
}

/// Why the monitor stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HaltReason {
    /// Dispatch tables failed the boot self-check.
    Configuration(ConfigError),
    /// An unassigned or deprecated table slot was called.
    NotImplemented,
    /// A box reported an unrecoverable error through `halt_user_error`.
    UserError(u16),
    /// A hardware protection fault.
    Fault(FaultClass),
    /// A panic inside the monitor.
    Panic,
}

impl HaltReason {
    const NOT_IMPLEMENTED: u16 = 0x100;

    /// Packs the reason into its error code.
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::Configuration(e) => ErrorCode::new(ErrorSource::Svc, ErrorLevel::Fatal, e.number()),
            Self::NotImplemented => {
                ErrorCode::new(ErrorSource::Svc, ErrorLevel::Fatal, Self::NOT_IMPLEMENTED)
            }
            Self::UserError(reason) => ErrorCode::new(ErrorSource::Box, ErrorLevel::Fatal, reason),
            Self::Fault(class) => ErrorCode::new(ErrorSource::Fault, ErrorLevel::Fatal, class as u16),
            Self::Panic => ErrorCode::new(ErrorSource::Kernel, ErrorLevel::Fatal, 1),
        }
    }

    /// Recovers the reason from a packed code.
    pub fn from_code(code: ErrorCode) -> Option<Self> {
        match code.source() {
            ErrorSource::Svc if code.number() == Self::NOT_IMPLEMENTED => Some(Self::NotImplemented),
            ErrorSource::Svc => ConfigError::from_number(code.number()).map(Self::Configuration),
            ErrorSource::Box => Some(Self::UserError(code.number())),
            ErrorSource::Fault => FaultClass::from_number(code.number()).map(Self::Fault),
            ErrorSource::Kernel => Some(Self::Panic),
            ErrorSource::Registry | ErrorSource::Unknown => None,
        }
    }
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "configuration fault: {}", e),
            Self::NotImplemented => write!(f, "function not implemented"),
            Self::UserError(reason) => write!(f, "user error {:#x}", reason),
            Self::Fault(class) => write!(f, "{:?} fault", class),
            Self::Panic => write!(f, "monitor panic"),
        }
    }
}
