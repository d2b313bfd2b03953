//! Low-level IL lifting.
//!
//! Register destinations name the exact view written, so byte moves into
//! `R0H` stay partial writes. Byte-sized `A0`/`A1` destinations are the one
//! exception: the address registers have no byte views, so the value is
//! zero-extended into the full register.

use super::operand::{GeneralOperand, Location, Size};
use super::{relative_target, Instruction};
use crate::il::{Expr, FlagWrite, IlOp, IlSink};
use crate::registers::Register;

fn is_address_register(register: Register) -> bool {
    matches!(register, Register::A0 | Register::A1)
}

fn read(operand: GeneralOperand, size: Size) -> Expr {
    match operand.location(size) {
        Location::Register(register) if size == Size::Byte && is_address_register(register) => {
            Expr::low_part(1, Expr::Register(register))
        }
        Location::Register(register) => Expr::Register(register),
        Location::Memory(address) => Expr::load(size.bytes(), address),
    }
}

fn write(operand: GeneralOperand, size: Size, value: Expr, flags: FlagWrite) -> IlOp {
    match operand.location(size) {
        Location::Register(dest) => {
            let value = if size == Size::Byte && is_address_register(dest) {
                Expr::zero_extend(2, value)
            } else {
                value
            };
            IlOp::SetRegister { dest, value, flags }
        }
        Location::Memory(address) => IlOp::Store {
            size: size.bytes(),
            address,
            value,
            flags,
        },
    }
}

fn quick_constant(size: Size, imm: i8) -> Expr {
    let extended = u32::from_le_bytes(i32::from(imm).to_le_bytes());
    Expr::constant(size.bytes(), extended & size.mask())
}

impl Instruction {
    /// Appends the IL for the instruction at `address` to `il`.
    pub fn lift<S: IlSink + ?Sized>(&self, address: u32, il: &mut S) {
        match *self {
            Self::Nop => il.append(IlOp::Nop),
            Self::Brk => il.append(IlOp::Breakpoint),
            Self::Und => il.append(IlOp::Undefined),
            Self::Rts | Self::Reit => il.append(IlOp::Return),
            Self::Wait => il.append(IlOp::Intrinsic("wait")),
            Self::Exitd => {
                il.append(IlOp::SetRegister {
                    dest: Register::SP,
                    value: Expr::Register(Register::FB),
                    flags: FlagWrite::None,
                });
                il.append(IlOp::SetRegister {
                    dest: Register::FB,
                    value: Expr::Pop { size: 2 },
                    flags: FlagWrite::None,
                });
                il.append(IlOp::Return);
            }
            Self::Enter { frame } => {
                il.append(IlOp::Push {
                    size: 2,
                    value: Expr::Register(Register::FB),
                });
                il.append(IlOp::SetRegister {
                    dest: Register::FB,
                    value: Expr::Register(Register::SP),
                    flags: FlagWrite::None,
                });
                il.append(IlOp::SetRegister {
                    dest: Register::SP,
                    value: Expr::sub(
                        2,
                        Expr::Register(Register::SP),
                        Expr::constant(2, u32::from(frame)),
                    ),
                    flags: FlagWrite::None,
                });
            }
            Self::Int { vector } => il.append(IlOp::Trap(vector)),
            Self::Fset(flag) => il.append(IlOp::SetFlag { flag, value: true }),
            Self::Fclr(flag) => il.append(IlOp::SetFlag { flag, value: false }),
            Self::Jmp { target, .. } => il.append(IlOp::Jump(Expr::constant(3, target))),
            Self::Jsr { target, .. } => il.append(IlOp::Call(Expr::constant(3, target))),
            Self::JCnd { condition, target } => {
                #[allow(clippy::cast_possible_truncation)]
                let not_taken = relative_target(address, self.length() as u32, 0);
                il.append(IlOp::If {
                    condition: condition.condition(),
                    taken: target,
                    not_taken,
                });
            }
            Self::MovG { size, src, dest } => {
                il.append(write(dest, size, read(src, size), FlagWrite::Sz));
            }
            Self::MovImm { size, imm, dest } => {
                let value = Expr::constant(size.bytes(), u32::from(imm) & size.mask());
                il.append(write(dest, size, value, FlagWrite::Sz));
            }
            Self::MovQ { size, imm, dest } => {
                il.append(write(dest, size, quick_constant(size, imm), FlagWrite::Sz));
            }
            Self::MovS { imm, dest } => {
                let value = Expr::constant(1, u32::from(imm));
                il.append(write(dest.general(), Size::Byte, value, FlagWrite::Sz));
            }
            Self::MovZ { dest } => {
                let value = Expr::constant(1, 0);
                il.append(write(dest.general(), Size::Byte, value, FlagWrite::Sz));
            }
            Self::AddQ { size, imm, dest } => {
                let sum = Expr::add(size.bytes(), read(dest, size), quick_constant(size, imm));
                il.append(write(dest, size, sum, FlagWrite::Oszc));
            }
            Self::CmpQ { size, imm, dest } => il.append(IlOp::Eval {
                value: Expr::sub(size.bytes(), read(dest, size), quick_constant(size, imm)),
                flags: FlagWrite::Oszc,
            }),
            Self::PushS(reg) => il.append(IlOp::Push {
                size: 1,
                value: Expr::Register(reg.register()),
            }),
            Self::PopS(reg) => il.append(IlOp::SetRegister {
                dest: reg.register(),
                value: Expr::Pop { size: 1 },
                flags: FlagWrite::None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::flags::{Condition, Flag};
    use crate::il::{Expr, FlagWrite, IlBuffer, IlOp};
    use crate::mc::decode;
    use crate::registers::{Register, RegisterFile};

    fn lift(bytes: &[u8], address: u32) -> Vec<IlOp> {
        let mut il = IlBuffer::new();
        decode(bytes, address)
            .expect("decodes")
            .lift(address, &mut il);
        il.into_ops()
    }

    #[test]
    fn byte_move_writes_the_named_view() {
        let mut file = RegisterFile::new();
        file.write(Register::R2R0, 0x1234_5678);
        for op in lift(&[0xD8, 0xF1], 0) {
            assert!(file.apply(&op));
        }
        assert_eq!(file.read(Register::R0H), 0xFF);
        assert_eq!(file.read(Register::R2R0), 0x1234_FF78);
        assert!(file.flag(Flag::S));
    }

    #[test]
    fn byte_move_into_address_register_zero_extends() {
        let mut file = RegisterFile::new();
        file.write(Register::A1A0, 0xAAAA_BBBB);
        file.write(Register::R0L, 0x80);
        let ops = lift(&[0x72, 0x04], 0);
        assert_eq!(
            ops,
            [IlOp::SetRegister {
                dest: Register::A0,
                value: Expr::zero_extend(2, Expr::Register(Register::R0L)),
                flags: FlagWrite::Sz,
            }]
        );
        assert!(file.apply(&ops[0]));
        assert_eq!(file.read(Register::A1A0), 0xAAAA_0080);
        assert!(file.flag(Flag::S));
        assert!(!file.flag(Flag::Z));
    }

    #[test]
    fn byte_add_into_address_register_flags_at_byte_size() {
        let mut file = RegisterFile::new();
        file.write(Register::A0, 0x12FF);
        for op in lift(&[0xC8, 0x14], 0) {
            assert!(file.apply(&op));
        }
        assert_eq!(file.read(Register::A0), 0);
        assert!(file.flag(Flag::C));
        assert!(file.flag(Flag::Z));
        assert!(!file.flag(Flag::S));
        assert!(!file.flag(Flag::O));
    }

    #[test]
    fn add_quick_updates_carry() {
        let mut file = RegisterFile::new();
        file.write(Register::R1, 0xFFFF);
        for op in lift(&[0xC9, 0x11], 0) {
            assert!(file.apply(&op));
        }
        assert_eq!(file.read(Register::R1), 0);
        assert!(file.flag(Flag::Z));
        assert!(file.flag(Flag::C));
    }

    #[test]
    fn memory_destination_becomes_store() {
        let ops = lift(&[0xB6, 0xFE], 0);
        assert_eq!(
            ops,
            [IlOp::Store {
                size: 1,
                address: Expr::add(2, Expr::Register(Register::FB), Expr::constant(2, 0xFFFE)),
                value: Expr::constant(1, 0),
                flags: FlagWrite::Sz,
            }]
        );
    }

    #[test]
    fn conditional_branch_lifts_to_if() {
        assert_eq!(
            lift(&[0x6A, 0x05], 0x100),
            [IlOp::If {
                condition: Condition::Equal,
                taken: 0x106,
                not_taken: 0x102,
            }]
        );
    }

    #[test]
    fn enter_then_exitd_restores_frame_registers() {
        let enter = lift(&[0x7C, 0xF2, 0x04], 0);
        assert_eq!(enter.len(), 3);
        assert_eq!(
            enter[0],
            IlOp::Push {
                size: 2,
                value: Expr::Register(Register::FB),
            }
        );
        let exitd = lift(&[0x7D, 0xF2], 0);
        assert_eq!(exitd.last(), Some(&IlOp::Return));
        assert_eq!(exitd.len(), 3);
    }

    #[test]
    fn flag_instructions_set_single_flags() {
        assert_eq!(
            lift(&[0xEB, 0x25], 0),
            [IlOp::SetFlag {
                flag: Flag::Z,
                value: false,
            }]
        );
        assert_eq!(lift(&[0x7D, 0xF3], 0), [IlOp::Intrinsic("wait")]);
    }
}
