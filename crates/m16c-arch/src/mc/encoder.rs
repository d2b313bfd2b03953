//! Re-encoder, the inverse of [`super::decode`].

use super::operand::{GeneralOperand, Size};
use super::{CallDistance, Instruction, JumpDistance, ADDRESS_MASK};
use crate::error::EncodeError;

/// Encodes `instruction` as if placed at `address`.
///
/// Relative branches re-derive their displacement from `address`, so the
/// result can differ from the bytes the instruction was decoded from when the
/// address differs.
///
/// # Errors
///
/// Returns [`EncodeError::DisplacementOutOfRange`] when a branch target is
/// unreachable with the instruction's encoding, and
/// [`EncodeError::ImmediateOutOfRange`] when an immediate overflows its field.
pub fn encode(instruction: &Instruction, address: u32) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(instruction.length());
    match *instruction {
        Instruction::Brk => out.push(0x00),
        Instruction::Nop => out.push(0x04),
        Instruction::Rts => out.push(0xF3),
        Instruction::Reit => out.push(0xFB),
        Instruction::Und => out.push(0xFF),
        Instruction::Wait => out.extend_from_slice(&[0x7D, 0xF3]),
        Instruction::Exitd => out.extend_from_slice(&[0x7D, 0xF2]),
        Instruction::Enter { frame } => out.extend_from_slice(&[0x7C, 0xF2, frame]),
        Instruction::Int { vector } => {
            if vector > 0x3F {
                return Err(EncodeError::ImmediateOutOfRange {
                    value: i32::from(vector),
                    bits: 6,
                });
            }
            out.extend_from_slice(&[0xEB, 0xC0 | vector]);
        }
        Instruction::Fset(flag) => out.extend_from_slice(&[0xEB, (flag.bit() << 4) | 0x4]),
        Instruction::Fclr(flag) => out.extend_from_slice(&[0xEB, (flag.bit() << 4) | 0x5]),
        Instruction::Jmp { distance, target } => match distance {
            JumpDistance::Short => {
                let dsp = displacement(target, address, 2);
                if !(0..=7).contains(&dsp) {
                    return Err(out_of_range(target, address));
                }
                out.push(0x60 | dsp.to_le_bytes()[0]);
            }
            JumpDistance::Byte => {
                out.push(0xFE);
                out.extend_from_slice(&byte_displacement(target, address, 1)?.to_le_bytes());
            }
            JumpDistance::Word => {
                out.push(0xF4);
                out.extend_from_slice(&word_displacement(target, address, 1)?.to_le_bytes());
            }
            JumpDistance::Absolute => {
                out.push(0xFC);
                out.extend_from_slice(&absolute(target, address)?);
            }
        },
        Instruction::Jsr { distance, target } => match distance {
            CallDistance::Word => {
                out.push(0xF5);
                out.extend_from_slice(&word_displacement(target, address, 1)?.to_le_bytes());
            }
            CallDistance::Absolute => {
                out.push(0xFD);
                out.extend_from_slice(&absolute(target, address)?);
            }
        },
        Instruction::JCnd { condition, target } => {
            if condition.is_short() {
                out.push(0x68 | condition.code());
                out.extend_from_slice(&byte_displacement(target, address, 1)?.to_le_bytes());
            } else {
                out.extend_from_slice(&[0x7D, 0xC0 | condition.code()]);
                out.extend_from_slice(&byte_displacement(target, address, 2)?.to_le_bytes());
            }
        }
        Instruction::MovG { size, src, dest } => {
            out.extend_from_slice(&[0x72 | size.bit(), (src.code() << 4) | dest.code()]);
            src.write_extension(&mut out);
            dest.write_extension(&mut out);
        }
        Instruction::MovImm { size, imm, dest } => {
            out.extend_from_slice(&[0x74 | size.bit(), 0xC0 | dest.code()]);
            dest.write_extension(&mut out);
            match size {
                Size::Byte => {
                    let byte = u8::try_from(imm).map_err(|_| EncodeError::ImmediateOutOfRange {
                        value: i32::from(imm),
                        bits: 8,
                    })?;
                    out.push(byte);
                }
                Size::Word => out.extend_from_slice(&imm.to_le_bytes()),
            }
        }
        Instruction::MovQ { size, imm, dest } => quick(&mut out, 0xD8, size, imm, dest)?,
        Instruction::AddQ { size, imm, dest } => quick(&mut out, 0xC8, size, imm, dest)?,
        Instruction::CmpQ { size, imm, dest } => quick(&mut out, 0xD0, size, imm, dest)?,
        Instruction::MovS { imm, dest } => {
            out.extend_from_slice(&[0xC0 | dest.code(), imm]);
            dest.general().write_extension(&mut out);
        }
        Instruction::MovZ { dest } => {
            out.push(0xB0 | dest.code());
            dest.general().write_extension(&mut out);
        }
        Instruction::PushS(reg) => out.push(0x82 | (reg.bit() << 3)),
        Instruction::PopS(reg) => out.push(0x92 | (reg.bit() << 3)),
    }
    Ok(out)
}

const fn out_of_range(target: u32, address: u32) -> EncodeError {
    EncodeError::DisplacementOutOfRange { target, address }
}

/// Signed distance from `address + base_offset` to `target`, taken modulo the
/// 20-bit address space.
const fn displacement(target: u32, address: u32, base_offset: u32) -> i32 {
    let diff = target.wrapping_sub(address.wrapping_add(base_offset)) & ADDRESS_MASK;
    i32::from_le_bytes((diff << 12).to_le_bytes()) >> 12
}

fn byte_displacement(target: u32, address: u32, base_offset: u32) -> Result<i8, EncodeError> {
    i8::try_from(displacement(target, address, base_offset))
        .map_err(|_| out_of_range(target, address))
}

fn word_displacement(target: u32, address: u32, base_offset: u32) -> Result<i16, EncodeError> {
    i16::try_from(displacement(target, address, base_offset))
        .map_err(|_| out_of_range(target, address))
}

fn absolute(target: u32, address: u32) -> Result<[u8; 3], EncodeError> {
    if target > ADDRESS_MASK {
        return Err(out_of_range(target, address));
    }
    let [lo, mid, hi, _] = target.to_le_bytes();
    Ok([lo, mid, hi])
}

fn quick(
    out: &mut Vec<u8>,
    base: u8,
    size: Size,
    imm: i8,
    dest: GeneralOperand,
) -> Result<(), EncodeError> {
    if !(-8..=7).contains(&imm) {
        return Err(EncodeError::ImmediateOutOfRange {
            value: i32::from(imm),
            bits: 4,
        });
    }
    let nibble = imm.to_le_bytes()[0] & 0xF;
    out.extend_from_slice(&[base | size.bit(), (nibble << 4) | dest.code()]);
    dest.write_extension(out);
    Ok(())
}
