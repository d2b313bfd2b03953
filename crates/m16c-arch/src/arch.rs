//! Host-facing architecture description and per-address gateways.
//!
//! Every gateway decodes afresh from the caller's window; no decoded
//! instruction outlives the call that produced it.

use crate::config::DisplayConfig;
use crate::flags::{Condition, Flag, FlagRole};
use crate::il::{FlagWrite, IlSink};
use crate::info::InstructionInfo;
use crate::mc::{self, Instruction, MAX_INSTRUCTION_LENGTH, NOP_OPCODE};
use crate::registers::Register;
use crate::token::{tokens_to_string, InstructionTextToken};
use crate::verify::{verify_roundtrip, DiagnosticSink, LogDiagnostics};

/// Byte order of multi-byte values. The M16C only has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Endianness {
    /// Least significant byte first.
    Little,
}

/// Bytes that overwrite `len` bytes of code with `NOP`s.
#[must_use]
pub fn nop_patch(len: usize) -> Vec<u8> {
    vec![NOP_OPCODE; len]
}

/// The M16C architecture as seen by a binary-analysis host.
///
/// `D` receives roundtrip diagnostics from [`Self::instruction_text`]. The
/// architecture is `Sync` whenever `D` is, so one instance can serve
/// concurrent calls for distinct addresses.
#[derive(Debug, Clone, Default)]
pub struct M16cArchitecture<D = LogDiagnostics> {
    diagnostics: D,
}

impl M16cArchitecture {
    /// Architecture with the `log`-backed diagnostic sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::unused_self)]
impl<D: DiagnosticSink> M16cArchitecture<D> {
    /// Registered architecture name.
    pub const NAME: &'static str = "m16c";
    /// Byte order.
    pub const ENDIANNESS: Endianness = Endianness::Little;
    /// Address size in bytes.
    pub const ADDRESS_SIZE: usize = 3;
    /// Default integer size in bytes.
    pub const DEFAULT_INT_SIZE: usize = 2;
    /// Longest instruction; the host should offer at least this many bytes.
    pub const MAX_INSTRUCTION_LENGTH: usize = MAX_INSTRUCTION_LENGTH;
    /// Stack pointer register.
    pub const STACK_POINTER: Register = Register::SP;

    /// Architecture reporting roundtrip failures to `diagnostics`.
    #[must_use]
    pub const fn with_diagnostics(diagnostics: D) -> Self {
        Self { diagnostics }
    }

    /// The diagnostic sink.
    #[must_use]
    pub const fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Every register, aliases included.
    #[must_use]
    pub const fn registers(&self) -> &'static [Register] {
        &Register::ALL
    }

    /// Every flag in `FLG` bit order.
    #[must_use]
    pub const fn flags(&self) -> &'static [Flag] {
        &Flag::ALL
    }

    /// Semantic role of `flag`.
    #[must_use]
    pub const fn flag_role(&self, flag: Flag) -> FlagRole {
        flag.role()
    }

    /// Flags the host must track to evaluate `condition`.
    #[must_use]
    pub const fn flags_required_for_condition(&self, condition: Condition) -> &'static [Flag] {
        condition.required_flags()
    }

    /// Flags written by a flag-write class.
    #[must_use]
    pub const fn flags_written_by(&self, write: FlagWrite) -> &'static [Flag] {
        write.flags()
    }

    /// Decodes one instruction, or `None` when the window holds none.
    #[must_use]
    pub fn decode(&self, data: &[u8], address: u32) -> Option<Instruction> {
        match mc::decode(data, address) {
            Ok(instruction) => Some(instruction),
            Err(err) => {
                log::trace!("{err}");
                None
            }
        }
    }

    /// Length and control-flow edges of the instruction at `address`.
    #[must_use]
    pub fn instruction_info(&self, data: &[u8], address: u32) -> Option<InstructionInfo> {
        self.decode(data, address)
            .map(|instruction| instruction.analyze(address))
    }

    /// Display tokens and length of the instruction at `address`.
    ///
    /// Re-encodes the instruction and reports any mismatch with `data` to the
    /// diagnostic sink; the returned tokens and length are unaffected.
    #[must_use]
    pub fn instruction_text(
        &self,
        data: &[u8],
        address: u32,
        config: &DisplayConfig,
    ) -> Option<(Vec<InstructionTextToken>, usize)> {
        let instruction = self.decode(data, address)?;
        let tokens = self.render_verified(&instruction, data, address, config);
        Some((tokens, instruction.length()))
    }

    /// Renders `instruction`, decoded from `data` at `address`, and checks
    /// that it re-encodes to the same bytes.
    ///
    /// A mismatch goes to the diagnostic sink only; the tokens are those of
    /// a plain [`Instruction::render`].
    #[must_use]
    pub fn render_verified(
        &self,
        instruction: &Instruction,
        data: &[u8],
        address: u32,
        config: &DisplayConfig,
    ) -> Vec<InstructionTextToken> {
        let tokens = instruction.render(config);
        if let Err(err) = verify_roundtrip(instruction, data, address, &tokens_to_string(&tokens))
        {
            self.diagnostics.roundtrip_failed(&err);
        }
        tokens
    }

    /// Appends the IL of the instruction at `address` to `il` and returns its
    /// length. Nothing is appended when the window holds no instruction.
    pub fn instruction_low_level_il<S: IlSink + ?Sized>(
        &self,
        data: &[u8],
        address: u32,
        il: &mut S,
    ) -> Option<usize> {
        let instruction = self.decode(data, address)?;
        instruction.lift(address, il);
        Some(instruction.length())
    }

    /// Replacement bytes that turn `data` into a run of `NOP`s.
    ///
    /// Every M16C `NOP` is one byte, so any length can be patched.
    #[must_use]
    pub fn convert_to_nop(&self, data: &[u8], address: u32) -> Vec<u8> {
        log::debug!("patching {} bytes at {address:#07x} to NOP", data.len());
        nop_patch(data.len())
    }
}
