//! Operand fields shared by the instruction families.

use crate::flags::Condition;
use crate::il::Expr;
use crate::registers::Register;

/// Operation size selected by the `.B`/`.W` specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Size {
    /// `.B`, 8 bits.
    Byte,
    /// `.W`, 16 bits.
    Word,
}

impl Size {
    /// Size from the low opcode bit (`0` = byte).
    #[must_use]
    pub const fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 {
            Self::Byte
        } else {
            Self::Word
        }
    }

    /// Low opcode bit for this size.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Byte => 0,
            Self::Word => 1,
        }
    }

    /// Width in bytes.
    #[must_use]
    pub const fn bytes(self) -> u8 {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
        }
    }

    /// Mnemonic specifier, `.B` or `.W`.
    #[must_use]
    pub const fn specifier(self) -> &'static str {
        match self {
            Self::Byte => ".B",
            Self::Word => ".W",
        }
    }

    /// Mask covering one operand of this size.
    #[must_use]
    pub const fn mask(self) -> u32 {
        match self {
            Self::Byte => 0xFF,
            Self::Word => 0xFFFF,
        }
    }
}

/// Operand selected by the 4-bit `src`/`dest` addressing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum GeneralOperand {
    /// `R0L/R0H/R1L/R1H` for bytes, `R0/R1/R2/R3` for words (index `0..=3`).
    Data(u8),
    /// `A0` or `A1` (index `0..=1`).
    Address(u8),
    /// `[A0]` or `[A1]`.
    Indirect(u8),
    /// `dsp:8[A0]` / `dsp:8[A1]`, unsigned displacement.
    Disp8Address {
        /// Address register index.
        index: u8,
        /// Displacement.
        dsp: u8,
    },
    /// `dsp:8[SB]`, unsigned displacement.
    Disp8Sb(u8),
    /// `dsp:8[FB]`, signed displacement.
    Disp8Fb(i8),
    /// `dsp:16[A0]` / `dsp:16[A1]`.
    Disp16Address {
        /// Address register index.
        index: u8,
        /// Displacement.
        dsp: u16,
    },
    /// `dsp:16[SB]`.
    Disp16Sb(u16),
    /// `abs16`.
    Abs16(u16),
}

const fn address_register(index: u8) -> Register {
    if index & 1 == 0 {
        Register::A0
    } else {
        Register::A1
    }
}

const fn data_register(index: u8, size: Size) -> Register {
    match (index & 0x3, size) {
        (0, Size::Byte) => Register::R0L,
        (1, Size::Byte) => Register::R0H,
        (2, Size::Byte) => Register::R1L,
        (_, Size::Byte) => Register::R1H,
        (0, Size::Word) => Register::R0,
        (1, Size::Word) => Register::R1,
        (2, Size::Word) => Register::R2,
        (_, Size::Word) => Register::R3,
    }
}

impl GeneralOperand {
    /// 4-bit addressing field value.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Data(index) => index & 0x3,
            Self::Address(index) => 0x4 | (index & 1),
            Self::Indirect(index) => 0x6 | (index & 1),
            Self::Disp8Address { index, .. } => 0x8 | (index & 1),
            Self::Disp8Sb(_) => 0xA,
            Self::Disp8Fb(_) => 0xB,
            Self::Disp16Address { index, .. } => 0xC | (index & 1),
            Self::Disp16Sb(_) => 0xE,
            Self::Abs16(_) => 0xF,
        }
    }

    /// Number of displacement bytes following the opcode.
    #[must_use]
    pub const fn extension_len(self) -> usize {
        match self {
            Self::Data(_) | Self::Address(_) | Self::Indirect(_) => 0,
            Self::Disp8Address { .. } | Self::Disp8Sb(_) | Self::Disp8Fb(_) => 1,
            Self::Disp16Address { .. } | Self::Disp16Sb(_) | Self::Abs16(_) => 2,
        }
    }

    /// Appends the displacement bytes, little-endian.
    pub fn write_extension(self, out: &mut Vec<u8>) {
        match self {
            Self::Data(_) | Self::Address(_) | Self::Indirect(_) => {}
            Self::Disp8Address { dsp, .. } | Self::Disp8Sb(dsp) => out.push(dsp),
            Self::Disp8Fb(dsp) => out.extend_from_slice(&dsp.to_le_bytes()),
            Self::Disp16Address { dsp, .. } | Self::Disp16Sb(dsp) | Self::Abs16(dsp) => {
                out.extend_from_slice(&dsp.to_le_bytes());
            }
        }
    }

    /// Register named by a register-direct operand at `size`.
    ///
    /// Byte-sized `A0`/`A1` still name the 16-bit register; the lifter
    /// zero-extends into it.
    #[must_use]
    pub const fn register(self, size: Size) -> Option<Register> {
        match self {
            Self::Data(index) => Some(data_register(index, size)),
            Self::Address(index) => Some(address_register(index)),
            _ => None,
        }
    }

    /// Base register of a memory operand, if any.
    #[must_use]
    pub const fn base_register(self) -> Option<Register> {
        match self {
            Self::Indirect(index)
            | Self::Disp8Address { index, .. }
            | Self::Disp16Address { index, .. } => Some(address_register(index)),
            Self::Disp8Sb(_) | Self::Disp16Sb(_) => Some(Register::SB),
            Self::Disp8Fb(_) => Some(Register::FB),
            Self::Data(_) | Self::Address(_) | Self::Abs16(_) => None,
        }
    }

    /// Resolves the operand at `size` to a register view or a memory address.
    #[must_use]
    pub fn location(self, size: Size) -> Location {
        let based = |base: Register, dsp: u32| {
            Location::Memory(Expr::add(2, Expr::Register(base), Expr::constant(2, dsp)))
        };
        match self {
            Self::Data(index) => Location::Register(data_register(index, size)),
            Self::Address(index) => Location::Register(address_register(index)),
            Self::Indirect(index) => Location::Memory(Expr::Register(address_register(index))),
            Self::Disp8Address { index, dsp } => based(address_register(index), u32::from(dsp)),
            Self::Disp8Sb(dsp) => based(Register::SB, u32::from(dsp)),
            Self::Disp8Fb(dsp) => {
                let extended = u16::from_le_bytes(i16::from(dsp).to_le_bytes());
                based(Register::FB, u32::from(extended))
            }
            Self::Disp16Address { index, dsp } => based(address_register(index), u32::from(dsp)),
            Self::Disp16Sb(dsp) => based(Register::SB, u32::from(dsp)),
            Self::Abs16(address) => Location::Memory(Expr::constant(2, u32::from(address))),
        }
    }
}

/// A [`GeneralOperand`] resolved for lifting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Register-direct operand.
    Register(Register),
    /// Memory operand at the given 16-bit effective address.
    Memory(Expr),
}

/// Operand selected by the 3-bit `dest` field of `:S`/`:Z` formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ShortDest {
    /// `R0H`.
    R0H,
    /// `R0L`.
    R0L,
    /// `dsp:8[SB]`.
    Disp8Sb(u8),
    /// `dsp:8[FB]`.
    Disp8Fb(i8),
    /// `abs16`.
    Abs16(u16),
}

impl ShortDest {
    /// 3-bit field value.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::R0H => 3,
            Self::R0L => 4,
            Self::Disp8Sb(_) => 5,
            Self::Disp8Fb(_) => 6,
            Self::Abs16(_) => 7,
        }
    }

    /// Equivalent general operand, used for rendering and lifting.
    #[must_use]
    pub const fn general(self) -> GeneralOperand {
        match self {
            Self::R0H => GeneralOperand::Data(1),
            Self::R0L => GeneralOperand::Data(0),
            Self::Disp8Sb(dsp) => GeneralOperand::Disp8Sb(dsp),
            Self::Disp8Fb(dsp) => GeneralOperand::Disp8Fb(dsp),
            Self::Abs16(address) => GeneralOperand::Abs16(address),
        }
    }

    /// Number of displacement bytes following the opcode.
    #[must_use]
    pub const fn extension_len(self) -> usize {
        self.general().extension_len()
    }
}

/// `R0L`/`R0H` selector of `PUSH.B:S`/`POP.B:S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum ShortRegister {
    R0L,
    R0H,
}

impl ShortRegister {
    /// Opcode bit 3 value.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::R0L => 0,
            Self::R0H => 1,
        }
    }

    /// Named register.
    #[must_use]
    pub const fn register(self) -> Register {
        match self {
            Self::R0L => Register::R0L,
            Self::R0H => Register::R0H,
        }
    }
}

/// Branch conditions of `JCnd`.
///
/// The first eight fit the one-byte short form; the rest need the `7D` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum BranchCondition {
    Geu,
    Gtu,
    Eq,
    N,
    Ltu,
    Leu,
    Ne,
    Pz,
    Le,
    O,
    Ge,
    Gt,
    No,
    Lt,
}

impl BranchCondition {
    /// Every branch condition, short forms first.
    pub const ALL: [Self; 14] = [
        Self::Geu,
        Self::Gtu,
        Self::Eq,
        Self::N,
        Self::Ltu,
        Self::Leu,
        Self::Ne,
        Self::Pz,
        Self::Le,
        Self::O,
        Self::Ge,
        Self::Gt,
        Self::No,
        Self::Lt,
    ];

    /// 4-bit condition code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Geu => 0x0,
            Self::Gtu => 0x1,
            Self::Eq => 0x2,
            Self::N => 0x3,
            Self::Ltu => 0x4,
            Self::Leu => 0x5,
            Self::Ne => 0x6,
            Self::Pz => 0x7,
            Self::Le => 0x8,
            Self::O => 0x9,
            Self::Ge => 0xA,
            Self::Gt => 0xC,
            Self::No => 0xD,
            Self::Lt => 0xE,
        }
    }

    /// Condition for a 4-bit code. `0xB` and `0xF` are unassigned.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x0 => Some(Self::Geu),
            0x1 => Some(Self::Gtu),
            0x2 => Some(Self::Eq),
            0x3 => Some(Self::N),
            0x4 => Some(Self::Ltu),
            0x5 => Some(Self::Leu),
            0x6 => Some(Self::Ne),
            0x7 => Some(Self::Pz),
            0x8 => Some(Self::Le),
            0x9 => Some(Self::O),
            0xA => Some(Self::Ge),
            0xC => Some(Self::Gt),
            0xD => Some(Self::No),
            0xE => Some(Self::Lt),
            _ => None,
        }
    }

    /// True for conditions encodable in the one-byte short form.
    #[must_use]
    pub const fn is_short(self) -> bool {
        self.code() < 0x8
    }

    /// Mnemonic, e.g. `JGEU`.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Geu => "JGEU",
            Self::Gtu => "JGTU",
            Self::Eq => "JEQ",
            Self::N => "JN",
            Self::Ltu => "JLTU",
            Self::Leu => "JLEU",
            Self::Ne => "JNE",
            Self::Pz => "JPZ",
            Self::Le => "JLE",
            Self::O => "JO",
            Self::Ge => "JGE",
            Self::Gt => "JGT",
            Self::No => "JNO",
            Self::Lt => "JLT",
        }
    }

    /// Generic flag condition tested by this branch.
    #[must_use]
    pub const fn condition(self) -> Condition {
        match self {
            Self::Geu => Condition::UnsignedGreaterEqual,
            Self::Gtu => Condition::UnsignedGreaterThan,
            Self::Eq => Condition::Equal,
            Self::N => Condition::Negative,
            Self::Ltu => Condition::UnsignedLessThan,
            Self::Leu => Condition::UnsignedLessEqual,
            Self::Ne => Condition::NotEqual,
            Self::Pz => Condition::Positive,
            Self::Le => Condition::SignedLessEqual,
            Self::O => Condition::Overflow,
            Self::Ge => Condition::SignedGreaterEqual,
            Self::Gt => Condition::SignedGreaterThan,
            Self::No => Condition::NoOverflow,
            Self::Lt => Condition::SignedLessThan,
        }
    }
}
