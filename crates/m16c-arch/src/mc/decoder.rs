//! Byte-window decoder.

use super::operand::{BranchCondition, GeneralOperand, ShortDest, ShortRegister, Size};
use super::{relative_target, CallDistance, Instruction, JumpDistance};
use crate::error::DecodeError;
use crate::flags::Flag;

/// Cursor over the caller's window. Running off the end is a truncation,
/// never a panic.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        let byte = self
            .bytes
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::Truncated {
                needed: self.pos + 1,
                available: self.bytes.len(),
            })?;
        self.pos += 1;
        Ok(byte)
    }

    fn i8(&mut self) -> Result<i8, DecodeError> {
        Ok(i8::from_le_bytes([self.u8()?]))
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let lo = self.u8()?;
        let hi = self.u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    fn i16(&mut self) -> Result<i16, DecodeError> {
        let lo = self.u8()?;
        let hi = self.u8()?;
        Ok(i16::from_le_bytes([lo, hi]))
    }
}

/// Decodes the instruction at the start of `bytes`, located at `address`.
///
/// Only the leading bytes are consumed; trailing bytes are ignored. Branch
/// targets are resolved against `address` and masked to 20 bits.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidOpcode`] when the leading bytes are not an
/// instruction of the supported set, and [`DecodeError::Truncated`] when the
/// window ends mid-instruction.
pub fn decode(bytes: &[u8], address: u32) -> Result<Instruction, DecodeError> {
    let mut reader = Reader::new(bytes);
    let opcode = reader.u8()?;
    let invalid = DecodeError::InvalidOpcode { opcode, address };

    let instruction = match opcode {
        0x00 => Instruction::Brk,
        0x04 => Instruction::Nop,
        0xF3 => Instruction::Rts,
        0xFB => Instruction::Reit,
        0xFF => Instruction::Und,
        0x60..=0x67 => Instruction::Jmp {
            distance: JumpDistance::Short,
            target: relative_target(address, 2, i32::from(opcode & 0x7)),
        },
        0x68..=0x6F => {
            let condition = BranchCondition::from_code(opcode & 0x7).ok_or(invalid)?;
            let dsp = reader.i8()?;
            Instruction::JCnd {
                condition,
                target: relative_target(address, 1, i32::from(dsp)),
            }
        }
        0xFE => Instruction::Jmp {
            distance: JumpDistance::Byte,
            target: relative_target(address, 1, i32::from(reader.i8()?)),
        },
        0xF4 => Instruction::Jmp {
            distance: JumpDistance::Word,
            target: relative_target(address, 1, i32::from(reader.i16()?)),
        },
        0xF5 => Instruction::Jsr {
            distance: CallDistance::Word,
            target: relative_target(address, 1, i32::from(reader.i16()?)),
        },
        0xFC => Instruction::Jmp {
            distance: JumpDistance::Absolute,
            target: absolute_target(&mut reader, invalid)?,
        },
        0xFD => Instruction::Jsr {
            distance: CallDistance::Absolute,
            target: absolute_target(&mut reader, invalid)?,
        },
        0x7D => decode_7d(&mut reader, address, invalid)?,
        0x7C => {
            if reader.u8()? != 0xF2 {
                return Err(invalid);
            }
            Instruction::Enter {
                frame: reader.u8()?,
            }
        }
        0xEB => decode_eb(&mut reader, invalid)?,
        0x82 | 0x8A => Instruction::PushS(short_register(opcode)),
        0x92 | 0x9A => Instruction::PopS(short_register(opcode)),
        0x72 | 0x73 => {
            let size = Size::from_bit(opcode);
            let fields = reader.u8()?;
            let src = general_operand(fields >> 4, &mut reader)?;
            let dest = general_operand(fields & 0xF, &mut reader)?;
            Instruction::MovG { size, src, dest }
        }
        0x74 | 0x75 => {
            let size = Size::from_bit(opcode);
            let fields = reader.u8()?;
            if fields >> 4 != 0xC {
                return Err(invalid);
            }
            let dest = general_operand(fields & 0xF, &mut reader)?;
            let imm = match size {
                Size::Byte => u16::from(reader.u8()?),
                Size::Word => reader.u16()?,
            };
            Instruction::MovImm { size, imm, dest }
        }
        0xD8 | 0xD9 | 0xC8 | 0xC9 | 0xD0 | 0xD1 => {
            let size = Size::from_bit(opcode);
            let fields = reader.u8()?;
            let imm = quick_immediate(fields >> 4);
            let dest = general_operand(fields & 0xF, &mut reader)?;
            match opcode & 0xFE {
                0xD8 => Instruction::MovQ { size, imm, dest },
                0xC8 => Instruction::AddQ { size, imm, dest },
                _ => Instruction::CmpQ { size, imm, dest },
            }
        }
        0xC3..=0xC7 => {
            let imm = reader.u8()?;
            let dest = short_dest(opcode & 0x7, &mut reader, invalid)?;
            Instruction::MovS { imm, dest }
        }
        0xB3..=0xB7 => Instruction::MovZ {
            dest: short_dest(opcode & 0x7, &mut reader, invalid)?,
        },
        _ => return Err(invalid),
    };
    Ok(instruction)
}

fn decode_7d(
    reader: &mut Reader<'_>,
    address: u32,
    invalid: DecodeError,
) -> Result<Instruction, DecodeError> {
    match reader.u8()? {
        0xF3 => Ok(Instruction::Wait),
        0xF2 => Ok(Instruction::Exitd),
        second @ 0xC8..=0xCE => {
            let condition = BranchCondition::from_code(second & 0xF).ok_or(invalid)?;
            let dsp = reader.i8()?;
            Ok(Instruction::JCnd {
                condition,
                target: relative_target(address, 2, i32::from(dsp)),
            })
        }
        _ => Err(invalid),
    }
}

fn decode_eb(reader: &mut Reader<'_>, invalid: DecodeError) -> Result<Instruction, DecodeError> {
    let second = reader.u8()?;
    if second & 0xC0 == 0xC0 {
        return Ok(Instruction::Int {
            vector: second & 0x3F,
        });
    }
    if second & 0x80 != 0 {
        return Err(invalid);
    }
    let flag = Flag::from_u3((second >> 4) & 0x7).ok_or(invalid)?;
    match second & 0xF {
        0x4 => Ok(Instruction::Fset(flag)),
        0x5 => Ok(Instruction::Fclr(flag)),
        _ => Err(invalid),
    }
}

/// 20-bit absolute address; the top nibble of the third byte must be clear.
fn absolute_target(reader: &mut Reader<'_>, invalid: DecodeError) -> Result<u32, DecodeError> {
    let low = u32::from(reader.u16()?);
    let high = reader.u8()?;
    if high & 0xF0 != 0 {
        return Err(invalid);
    }
    Ok(low | (u32::from(high) << 16))
}

const fn short_register(opcode: u8) -> ShortRegister {
    if opcode & 0x08 == 0 {
        ShortRegister::R0L
    } else {
        ShortRegister::R0H
    }
}

/// Sign-extends the 4-bit immediate of the `:Q` formats.
const fn quick_immediate(nibble: u8) -> i8 {
    i8::from_le_bytes([nibble << 4]) >> 4
}

fn general_operand(code: u8, reader: &mut Reader<'_>) -> Result<GeneralOperand, DecodeError> {
    let index = code & 1;
    Ok(match code & 0xF {
        0x0..=0x3 => GeneralOperand::Data(code & 0x3),
        0x4 | 0x5 => GeneralOperand::Address(index),
        0x6 | 0x7 => GeneralOperand::Indirect(index),
        0x8 | 0x9 => GeneralOperand::Disp8Address {
            index,
            dsp: reader.u8()?,
        },
        0xA => GeneralOperand::Disp8Sb(reader.u8()?),
        0xB => GeneralOperand::Disp8Fb(reader.i8()?),
        0xC | 0xD => GeneralOperand::Disp16Address {
            index,
            dsp: reader.u16()?,
        },
        0xE => GeneralOperand::Disp16Sb(reader.u16()?),
        _ => GeneralOperand::Abs16(reader.u16()?),
    })
}

fn short_dest(
    code: u8,
    reader: &mut Reader<'_>,
    invalid: DecodeError,
) -> Result<ShortDest, DecodeError> {
    match code {
        3 => Ok(ShortDest::R0H),
        4 => Ok(ShortDest::R0L),
        5 => Ok(ShortDest::Disp8Sb(reader.u8()?)),
        6 => Ok(ShortDest::Disp8Fb(reader.i8()?)),
        7 => Ok(ShortDest::Abs16(reader.u16()?)),
        _ => Err(invalid),
    }
}
