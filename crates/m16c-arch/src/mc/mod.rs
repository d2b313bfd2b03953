//! M16C instruction engine: one enum variant per opcode family.
//!
//! Every operation here (length, encode, analyze, render, lift) is an
//! exhaustive match over [`Instruction`], so adding a family is a compile
//! error until every projection handles it.

mod analyze;
mod decoder;
mod encoder;
mod lift;
/// Operand fields shared by the instruction families.
pub mod operand;
mod render;

pub use decoder::decode;
pub use encoder::encode;
pub use operand::{BranchCondition, GeneralOperand, Location, ShortDest, ShortRegister, Size};

use crate::flags::Flag;

/// Largest instruction the architecture defines; hosts pass at least this many
/// bytes per decode call where the buffer allows.
pub const MAX_INSTRUCTION_LENGTH: usize = 8;

/// The 20-bit physical address space.
pub const ADDRESS_MASK: u32 = 0x000F_FFFF;

/// Canonical single-byte `NOP`.
pub const NOP_OPCODE: u8 = 0x04;

/// Reach of an unconditional `JMP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum JumpDistance {
    /// `.S`: 3-bit forward displacement, `+2..=+9`.
    Short,
    /// `.B`: signed 8-bit displacement.
    Byte,
    /// `.W`: signed 16-bit displacement.
    Word,
    /// `.A`: 20-bit absolute address.
    Absolute,
}

impl JumpDistance {
    /// Mnemonic specifier.
    #[must_use]
    pub const fn specifier(self) -> &'static str {
        match self {
            Self::Short => ".S",
            Self::Byte => ".B",
            Self::Word => ".W",
            Self::Absolute => ".A",
        }
    }
}

/// Reach of a `JSR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CallDistance {
    /// `.W`: signed 16-bit displacement.
    Word,
    /// `.A`: 20-bit absolute address.
    Absolute,
}

impl CallDistance {
    /// Mnemonic specifier.
    #[must_use]
    pub const fn specifier(self) -> &'static str {
        match self {
            Self::Word => ".W",
            Self::Absolute => ".A",
        }
    }
}

/// A decoded instruction.
///
/// Branch targets are absolute 20-bit addresses resolved at decode time, so
/// encoding at a different address re-derives the displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Instruction {
    /// `BRK`.
    Brk,
    /// `NOP`.
    Nop,
    /// `RTS`.
    Rts,
    /// `REIT`.
    Reit,
    /// `UND`.
    Und,
    /// `WAIT`.
    Wait,
    /// `EXITD`.
    Exitd,
    /// `ENTER #imm8`.
    Enter {
        /// Bytes reserved for the stack frame.
        frame: u8,
    },
    /// `INT #imm6`.
    Int {
        /// Software interrupt number, `0..=63`.
        vector: u8,
    },
    /// `FSET flag`.
    Fset(Flag),
    /// `FCLR flag`.
    Fclr(Flag),
    /// `JMP.{S,B,W,A} label`.
    Jmp {
        /// Encoding reach.
        distance: JumpDistance,
        /// Absolute target.
        target: u32,
    },
    /// `JSR.{W,A} label`.
    Jsr {
        /// Encoding reach.
        distance: CallDistance,
        /// Absolute target.
        target: u32,
    },
    /// `JCnd label`.
    JCnd {
        /// Tested condition.
        condition: BranchCondition,
        /// Absolute target when taken.
        target: u32,
    },
    /// `MOV.size:G src, dest`.
    MovG {
        /// Operation size.
        size: Size,
        /// Source operand.
        src: GeneralOperand,
        /// Destination operand.
        dest: GeneralOperand,
    },
    /// `MOV.size:G #imm, dest`.
    MovImm {
        /// Operation size.
        size: Size,
        /// Immediate, at most `size` wide.
        imm: u16,
        /// Destination operand.
        dest: GeneralOperand,
    },
    /// `MOV.size:Q #imm4, dest`.
    MovQ {
        /// Operation size.
        size: Size,
        /// Signed immediate, `-8..=7`.
        imm: i8,
        /// Destination operand.
        dest: GeneralOperand,
    },
    /// `MOV.B:S #imm8, dest`.
    MovS {
        /// Immediate.
        imm: u8,
        /// Destination operand.
        dest: ShortDest,
    },
    /// `MOV.B:Z #0, dest`.
    MovZ {
        /// Destination operand.
        dest: ShortDest,
    },
    /// `ADD.size:Q #imm4, dest`.
    AddQ {
        /// Operation size.
        size: Size,
        /// Signed immediate, `-8..=7`.
        imm: i8,
        /// Destination operand.
        dest: GeneralOperand,
    },
    /// `CMP.size:Q #imm4, dest`.
    CmpQ {
        /// Operation size.
        size: Size,
        /// Signed immediate, `-8..=7`.
        imm: i8,
        /// Compared operand.
        dest: GeneralOperand,
    },
    /// `PUSH.B:S R0L/R0H`.
    PushS(ShortRegister),
    /// `POP.B:S R0L/R0H`.
    PopS(ShortRegister),
}

impl Instruction {
    /// Encoded length in bytes.
    #[must_use]
    pub const fn length(&self) -> usize {
        match self {
            Self::Brk
            | Self::Nop
            | Self::Rts
            | Self::Reit
            | Self::Und
            | Self::PushS(_)
            | Self::PopS(_)
            | Self::Jmp {
                distance: JumpDistance::Short,
                ..
            } => 1,
            Self::Wait
            | Self::Exitd
            | Self::Int { .. }
            | Self::Fset(_)
            | Self::Fclr(_)
            | Self::Jmp {
                distance: JumpDistance::Byte,
                ..
            } => 2,
            Self::Enter { .. }
            | Self::Jmp {
                distance: JumpDistance::Word,
                ..
            }
            | Self::Jsr {
                distance: CallDistance::Word,
                ..
            } => 3,
            Self::Jmp {
                distance: JumpDistance::Absolute,
                ..
            }
            | Self::Jsr {
                distance: CallDistance::Absolute,
                ..
            } => 4,
            Self::JCnd { condition, .. } => {
                if condition.is_short() {
                    2
                } else {
                    3
                }
            }
            Self::MovG { src, dest, .. } => 2 + src.extension_len() + dest.extension_len(),
            Self::MovImm { size, dest, .. } => 2 + dest.extension_len() + size.bytes() as usize,
            Self::MovQ { dest, .. } | Self::AddQ { dest, .. } | Self::CmpQ { dest, .. } => {
                2 + dest.extension_len()
            }
            Self::MovS { dest, .. } => 2 + dest.extension_len(),
            Self::MovZ { dest } => 1 + dest.extension_len(),
        }
    }
}

/// Resolves `base + displacement` inside the 20-bit address space.
pub(crate) const fn relative_target(address: u32, base_offset: u32, displacement: i32) -> u32 {
    address
        .wrapping_add(base_offset)
        .wrapping_add_signed(displacement)
        & ADDRESS_MASK
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, relative_target, Instruction, ADDRESS_MASK, NOP_OPCODE};

    #[test]
    fn nop_opcode_decodes_to_nop() {
        let instruction = decode(&[NOP_OPCODE], 0).expect("nop decodes");
        assert_eq!(instruction, Instruction::Nop);
        assert_eq!(instruction.length(), 1);
    }

    #[test]
    fn relative_targets_wrap_in_twenty_bits() {
        assert_eq!(relative_target(ADDRESS_MASK, 2, 0), 1);
        assert_eq!(relative_target(0, 1, -2), ADDRESS_MASK);
    }

    #[test]
    fn length_matches_encoding_for_sample_program() {
        let program: &[&[u8]] = &[
            &[0x04],
            &[0x7C, 0xF2, 0x10],
            &[0x75, 0xCF, 0x00, 0x04, 0x34, 0x12],
            &[0x72, 0xAC, 0x10, 0x20, 0x00],
            &[0xF5, 0x00, 0x10],
            &[0x7D, 0xCE, 0xF0],
        ];
        for bytes in program {
            let instruction = decode(bytes, 0x100).expect("sample decodes");
            assert_eq!(instruction.length(), bytes.len());
            assert_eq!(encode(&instruction, 0x100).expect("re-encodes"), *bytes);
        }
    }
}
