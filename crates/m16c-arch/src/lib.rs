//! Renesas M16C architecture layer for binary-analysis hosts.
//!
//! The crate declares the register file and flag semantics, and turns raw
//! instruction bytes into control-flow facts, display tokens and low-level IL
//! through a decode, verify, render/lift pipeline.

/// Register names, alias views and the register file.
pub mod registers;
pub use registers::{
    Register, RegisterFile, RegisterInfo, RegisterView, REGISTER_COUNT, STORAGE_SLOT_COUNT,
};

/// Status flags and generic branch conditions.
pub mod flags;
pub use flags::{Condition, Flag, FlagRole, CONDITION_COUNT, FLAG_COUNT};

/// Decode and encode error types.
pub mod error;
pub use error::{DecodeError, EncodeError};

/// Renderer configuration and the host setting that drives it.
pub mod config;
pub use config::{DisplayConfig, SettingSpec, SHOW_SUFFIX_KEY, SHOW_SUFFIX_SETTING};

/// Display tokens.
pub mod token;
pub use token::{tokens_to_string, InstructionTextToken, TokenKind};

/// Instruction length and control-flow edges.
pub mod info;
pub use info::{BranchKind, InstructionInfo, MAX_BRANCHES};

/// Low-level IL and the sink it is appended to.
pub mod il;
pub use il::{Expr, FlagWrite, IlBuffer, IlOp, IlSink};

/// Instruction decoding, encoding, rendering and lifting.
pub mod mc;
pub use mc::{
    decode, encode, CallDistance, Instruction, JumpDistance, ADDRESS_MASK,
    MAX_INSTRUCTION_LENGTH, NOP_OPCODE,
};

/// Roundtrip verification and diagnostics.
pub mod verify;
pub use verify::{hex, verify_roundtrip, DiagnosticSink, LogDiagnostics, RoundtripError};

/// Architecture description and per-address gateways.
pub mod arch;
pub use arch::{nop_patch, Endianness, M16cArchitecture};

/// Linear-sweep disassembly.
pub mod disasm;
pub use disasm::{disassemble_one, linear_sweep, DisassemblyRow};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use serde_json as _;
