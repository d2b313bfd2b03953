//! Low-level IL operations emitted by the lifter, and the sink they go into.
//!
//! Register writes always name the exact view being written (`R0L`, not
//! `R2R0`), so a sub-register write is a partial write into the root storage.
//! [`RegisterFile::apply`] executes the register and flag effects of an
//! operation with exactly those semantics.

use crate::flags::{Condition, Flag};
use crate::registers::{Register, RegisterFile};

/// Which flags an operation updates from its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FlagWrite {
    /// Flags untouched.
    #[default]
    None,
    /// Sign and zero (`MOV`).
    Sz,
    /// Overflow, sign, zero and carry (`ADD`, `CMP`).
    Oszc,
}

impl FlagWrite {
    /// Flags written by this class. Each carries its own [`Flag::role`].
    #[must_use]
    pub const fn flags(self) -> &'static [Flag] {
        match self {
            Self::None => &[],
            Self::Sz => &[Flag::S, Flag::Z],
            Self::Oszc => &[Flag::O, Flag::S, Flag::Z, Flag::C],
        }
    }
}

/// IL expression tree. Sizes are in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Expr {
    Const {
        size: u8,
        value: u32,
    },
    Register(Register),
    Flag(Flag),
    Add {
        size: u8,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Sub {
        size: u8,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    ZeroExtend {
        size: u8,
        value: Box<Expr>,
    },
    LowPart {
        size: u8,
        value: Box<Expr>,
    },
    Load {
        size: u8,
        address: Box<Expr>,
    },
    Pop {
        size: u8,
    },
}

impl Expr {
    /// Constant of `size` bytes.
    #[must_use]
    pub const fn constant(size: u8, value: u32) -> Self {
        Self::Const { size, value }
    }

    /// `left + right` at `size` bytes.
    #[must_use]
    pub fn add(size: u8, left: Self, right: Self) -> Self {
        Self::Add {
            size,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `left - right` at `size` bytes.
    #[must_use]
    pub fn sub(size: u8, left: Self, right: Self) -> Self {
        Self::Sub {
            size,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Memory read of `size` bytes.
    #[must_use]
    pub fn load(size: u8, address: Self) -> Self {
        Self::Load {
            size,
            address: Box::new(address),
        }
    }

    /// Zero extension to `size` bytes.
    #[must_use]
    pub fn zero_extend(size: u8, value: Self) -> Self {
        Self::ZeroExtend {
            size,
            value: Box::new(value),
        }
    }

    /// Truncation to the low `size` bytes.
    #[must_use]
    pub fn low_part(size: u8, value: Self) -> Self {
        Self::LowPart {
            size,
            value: Box::new(value),
        }
    }

    /// Result size in bytes.
    #[must_use]
    pub const fn size(&self) -> u8 {
        match self {
            Self::Const { size, .. }
            | Self::Add { size, .. }
            | Self::Sub { size, .. }
            | Self::ZeroExtend { size, .. }
            | Self::LowPart { size, .. }
            | Self::Load { size, .. }
            | Self::Pop { size } => *size,
            Self::Register(reg) => reg.width(),
            Self::Flag(_) => 1,
        }
    }

    /// The operation whose result sets the flags: zero extensions are
    /// stripped, since flags follow the operation size, not the write size.
    fn flag_source(&self) -> &Self {
        match self {
            Self::ZeroExtend { value, .. } => value.flag_source(),
            _ => self,
        }
    }
}

/// One IL statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IlOp {
    /// Write `value` into the `dest` view.
    SetRegister {
        /// Register view being written.
        dest: Register,
        /// Value expression.
        value: Expr,
        /// Flags updated from the written value.
        flags: FlagWrite,
    },
    /// Write `value` to memory.
    Store {
        /// Access size in bytes.
        size: u8,
        /// Address expression.
        address: Expr,
        /// Value expression.
        value: Expr,
        /// Flags updated from the stored value.
        flags: FlagWrite,
    },
    /// Set or clear one flag.
    SetFlag {
        /// Target flag.
        flag: Flag,
        /// New value.
        value: bool,
    },
    /// Evaluate for flags only (`CMP`).
    Eval {
        /// Expression whose result drives the flags.
        value: Expr,
        /// Flags updated.
        flags: FlagWrite,
    },
    /// Push onto the stack.
    Push {
        /// Size in bytes.
        size: u8,
        /// Pushed value.
        value: Expr,
    },
    /// Unconditional jump.
    Jump(Expr),
    /// Subroutine call.
    Call(Expr),
    /// Return from subroutine or interrupt.
    Return,
    /// Conditional branch on a generic flag condition.
    If {
        /// Branch condition.
        condition: Condition,
        /// Target when the condition holds.
        taken: u32,
        /// Target otherwise.
        not_taken: u32,
    },
    /// Software interrupt through the vector table.
    Trap(u8),
    /// Debugger breakpoint.
    Breakpoint,
    /// Architecture-specific effect with no IL equivalent.
    Intrinsic(&'static str),
    /// No operation.
    Nop,
    /// Undefined behavior.
    Undefined,
}

/// Host IL container. Opaque beyond appending operations.
pub trait IlSink {
    /// Appends one operation.
    fn append(&mut self, op: IlOp);
}

/// Vector-backed [`IlSink`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IlBuffer {
    ops: Vec<IlOp>,
}

impl IlBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations appended so far.
    #[must_use]
    pub fn ops(&self) -> &[IlOp] {
        &self.ops
    }

    /// Consumes the buffer.
    #[must_use]
    pub fn into_ops(self) -> Vec<IlOp> {
        self.ops
    }
}

impl IlSink for IlBuffer {
    fn append(&mut self, op: IlOp) {
        self.ops.push(op);
    }
}

impl IlSink for Vec<IlOp> {
    fn append(&mut self, op: IlOp) {
        self.push(op);
    }
}

#[allow(clippy::cast_lossless)]
const fn size_mask(size: u8) -> u32 {
    if size >= 4 {
        u32::MAX
    } else {
        (1u32 << (size as u32 * 8)) - 1
    }
}

fn sign_bit(size: u8) -> u32 {
    1u32 << (u32::from(size.saturating_sub(1).min(3)) * 8 + 7)
}

impl RegisterFile {
    /// Evaluates a register-only expression. Memory and stack reads yield `None`.
    #[must_use]
    pub fn evaluate(&self, expr: &Expr) -> Option<u32> {
        match expr {
            Expr::Const { size, value } => Some(value & size_mask(*size)),
            Expr::Register(reg) => Some(self.read(*reg)),
            Expr::Flag(flag) => Some(u32::from(self.flag(*flag))),
            Expr::Add { size, left, right } => {
                Some(self.evaluate(left)?.wrapping_add(self.evaluate(right)?) & size_mask(*size))
            }
            Expr::Sub { size, left, right } => {
                Some(self.evaluate(left)?.wrapping_sub(self.evaluate(right)?) & size_mask(*size))
            }
            Expr::ZeroExtend { size, value } | Expr::LowPart { size, value } => {
                Some(self.evaluate(value)? & size_mask(*size))
            }
            Expr::Load { .. } | Expr::Pop { .. } => None,
        }
    }

    /// Applies the register and flag effects of `op`.
    ///
    /// Returns `false`, leaving the file untouched, when the operation has
    /// effects outside the register file or reads memory.
    pub fn apply(&mut self, op: &IlOp) -> bool {
        match op {
            IlOp::SetRegister { dest, value, flags } => {
                let Some(result) = self.evaluate(value) else {
                    return false;
                };
                self.update_flags(*flags, value.flag_source(), result);
                self.write(*dest, result);
                true
            }
            IlOp::SetFlag { flag, value } => {
                self.set_flag(*flag, *value);
                true
            }
            IlOp::Eval { value, flags } => {
                let Some(result) = self.evaluate(value) else {
                    return false;
                };
                self.update_flags(*flags, value.flag_source(), result);
                true
            }
            IlOp::Nop => true,
            _ => false,
        }
    }

    fn update_flags(&mut self, write: FlagWrite, value: &Expr, result: u32) {
        if write == FlagWrite::None {
            return;
        }
        let size = value.size();
        let result = result & size_mask(size);
        let sign = sign_bit(size);
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::S, result & sign != 0);
        if write != FlagWrite::Oszc {
            return;
        }

        let (left, right, is_sub) = match value {
            Expr::Add { left, right, .. } => (left, right, false),
            Expr::Sub { left, right, .. } => (left, right, true),
            _ => return,
        };
        let (Some(a), Some(b)) = (self.evaluate(left), self.evaluate(right)) else {
            return;
        };
        let (a, b) = (a & size_mask(size), b & size_mask(size));
        if is_sub {
            self.set_flag(Flag::C, a >= b);
            self.set_flag(Flag::O, (a ^ b) & (a ^ result) & sign != 0);
        } else {
            self.set_flag(Flag::C, u64::from(a) + u64::from(b) > u64::from(size_mask(size)));
            self.set_flag(Flag::O, (a ^ result) & (b ^ result) & sign != 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Expr, FlagWrite, IlBuffer, IlOp, IlSink};
    use crate::flags::{Condition, Flag, FlagRole};
    use crate::registers::{Register, RegisterFile};

    #[test]
    fn flag_write_classes_only_touch_generic_flags() {
        for write in [FlagWrite::None, FlagWrite::Sz, FlagWrite::Oszc] {
            for flag in write.flags() {
                assert_ne!(flag.role(), FlagRole::Special);
            }
        }
        assert_eq!(FlagWrite::Oszc.flags().len(), 4);
    }

    #[test]
    fn buffer_preserves_append_order() {
        let mut il = IlBuffer::new();
        il.append(IlOp::Nop);
        il.append(IlOp::Return);
        assert_eq!(il.ops(), &[IlOp::Nop, IlOp::Return]);
        assert_eq!(il.into_ops().len(), 2);
    }

    #[test]
    fn sub_register_write_preserves_parent_bits() {
        let mut file = RegisterFile::new();
        file.write(Register::R2R0, 0xAAAA_1234);
        let applied = file.apply(&IlOp::SetRegister {
            dest: Register::R0H,
            value: Expr::constant(1, 0x7F),
            flags: FlagWrite::Sz,
        });
        assert!(applied);
        assert_eq!(file.read(Register::R2R0), 0xAAAA_7F34);
        assert!(!file.flag(Flag::Z));
        assert!(!file.flag(Flag::S));
    }

    #[test]
    fn add_sets_carry_and_zero_on_wrap() {
        let mut file = RegisterFile::new();
        file.write(Register::R0L, 0xFF);
        file.apply(&IlOp::SetRegister {
            dest: Register::R0L,
            value: Expr::add(1, Expr::Register(Register::R0L), Expr::constant(1, 1)),
            flags: FlagWrite::Oszc,
        });
        assert_eq!(file.read(Register::R0L), 0);
        assert!(file.flag(Flag::C));
        assert!(file.flag(Flag::Z));
        assert!(!file.flag(Flag::O));
    }

    #[test]
    fn compare_drives_conditions() {
        let mut file = RegisterFile::new();
        file.write(Register::R0, 5);
        file.apply(&IlOp::Eval {
            value: Expr::sub(2, Expr::Register(Register::R0), Expr::constant(2, 7)),
            flags: FlagWrite::Oszc,
        });
        let read = |flag: Flag| file.flag(flag);
        assert!(Condition::UnsignedLessThan.evaluate(read));
        assert!(Condition::SignedLessThan.evaluate(read));
        assert!(Condition::NotEqual.evaluate(read));
        assert!(!Condition::UnsignedGreaterThan.evaluate(read));
    }

    #[test]
    fn signed_overflow_on_subtract() {
        let mut file = RegisterFile::new();
        file.write(Register::R0L, 0x80);
        file.apply(&IlOp::Eval {
            value: Expr::sub(1, Expr::Register(Register::R0L), Expr::constant(1, 1)),
            flags: FlagWrite::Oszc,
        });
        assert!(file.flag(Flag::O));
        assert!(file.flag(Flag::C));
        assert!(!file.flag(Flag::S));
    }

    #[test]
    fn memory_effects_are_not_applied() {
        let mut file = RegisterFile::new();
        let before = file.clone();
        let applied = file.apply(&IlOp::SetRegister {
            dest: Register::R0,
            value: Expr::load(2, Expr::constant(2, 0x400)),
            flags: FlagWrite::Sz,
        });
        assert!(!applied);
        assert_eq!(file, before);
        assert!(!file.apply(&IlOp::Return));
    }
}
