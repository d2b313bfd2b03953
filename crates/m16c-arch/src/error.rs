//! Decode and encode failures.

use thiserror::Error;

/// Reasons a byte window does not hold an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DecodeError {
    /// The leading bytes do not form an opcode of the instruction set.
    #[error("invalid opcode {opcode:#04x} at {address:#07x}")]
    InvalidOpcode {
        /// First byte of the rejected window.
        opcode: u8,
        /// Address the window was decoded at.
        address: u32,
    },
    /// The window ended before the instruction did.
    #[error("instruction needs {needed} bytes but only {available} are available")]
    Truncated {
        /// Bytes required so far.
        needed: usize,
        /// Bytes present in the window.
        available: usize,
    },
}

/// Reasons an instruction cannot be re-encoded at an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum EncodeError {
    /// Branch target is unreachable from the encoding address.
    #[error("branch target {target:#07x} out of range from {address:#07x}")]
    DisplacementOutOfRange {
        /// Absolute branch target.
        target: u32,
        /// Encoding address.
        address: u32,
    },
    /// Immediate operand does not fit its encoding field.
    #[error("immediate {value} does not fit a {bits}-bit field")]
    ImmediateOutOfRange {
        /// Rejected value.
        value: i32,
        /// Width of the field.
        bits: u8,
    },
}
