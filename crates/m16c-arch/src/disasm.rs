//! Linear-sweep disassembly listing.
//!
//! This is the host-side driver of the gateways: it walks a flat image,
//! advancing by the length each instruction reports.

use crate::arch::M16cArchitecture;
use crate::config::DisplayConfig;
use crate::mc::{ADDRESS_MASK, MAX_INSTRUCTION_LENGTH};
use crate::token::tokens_to_string;
use crate::verify::DiagnosticSink;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Address of the first byte.
    pub address: u32,
    /// Length in bytes; 1 for invalid bytes.
    pub length: usize,
    /// Raw bytes of the instruction.
    pub bytes: Vec<u8>,
    /// Rendered text, or `.byte 0xNN` for invalid bytes.
    pub text: String,
    /// Whether the bytes at this address do not decode.
    pub is_invalid: bool,
}

/// Disassembles the instruction at the start of `data`, located at `address`.
///
/// Undecodable input yields a one-byte `.byte` row so a sweep always
/// advances. Returns `None` only for an empty window.
#[must_use]
pub fn disassemble_one<D: DiagnosticSink>(
    arch: &M16cArchitecture<D>,
    data: &[u8],
    address: u32,
    config: &DisplayConfig,
) -> Option<DisassemblyRow> {
    let first = *data.first()?;
    let window = &data[..data.len().min(MAX_INSTRUCTION_LENGTH)];
    let row = match arch.instruction_text(window, address, config) {
        Some((tokens, length)) => DisassemblyRow {
            address,
            length,
            bytes: window[..length].to_vec(),
            text: tokens_to_string(&tokens),
            is_invalid: false,
        },
        None => DisassemblyRow {
            address,
            length: 1,
            bytes: vec![first],
            text: format!(".byte {first:#04x}"),
            is_invalid: true,
        },
    };
    Some(row)
}

/// Disassembles all of `data`, loaded at `base`.
///
/// Addresses wrap inside the 20-bit address space.
#[must_use]
pub fn linear_sweep<D: DiagnosticSink>(
    arch: &M16cArchitecture<D>,
    data: &[u8],
    base: u32,
    config: &DisplayConfig,
) -> Vec<DisassemblyRow> {
    let mut rows = Vec::new();
    let mut offset = 0usize;
    let mut address = base & ADDRESS_MASK;
    while let Some(row) = data
        .get(offset..)
        .and_then(|rest| disassemble_one(arch, rest, address, config))
    {
        offset += row.length;
        #[allow(clippy::cast_possible_truncation)]
        let advance = row.length as u32;
        address = address.wrapping_add(advance) & ADDRESS_MASK;
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::{disassemble_one, linear_sweep};
    use crate::arch::M16cArchitecture;
    use crate::config::DisplayConfig;

    #[test]
    fn sweep_covers_every_byte_once() {
        let arch = M16cArchitecture::new();
        let image = [0x04, 0x01, 0x7C, 0xF2, 0x02, 0xF3];
        let rows = linear_sweep(&arch, &image, 0xF_0000, &DisplayConfig::default());
        let texts: Vec<&str> = rows.iter().map(|row| row.text.as_str()).collect();
        assert_eq!(texts, ["NOP", ".byte 0x01", "ENTER #0x2", "RTS"]);
        let addresses: Vec<u32> = rows.iter().map(|row| row.address).collect();
        assert_eq!(addresses, [0xF_0000, 0xF_0001, 0xF_0002, 0xF_0005]);
        assert_eq!(rows.iter().map(|row| row.length).sum::<usize>(), image.len());
        assert!(rows[1].is_invalid);
    }

    #[test]
    fn truncated_tail_is_emitted_as_bytes() {
        let arch = M16cArchitecture::new();
        let rows = linear_sweep(&arch, &[0xF4, 0x01], 0, &DisplayConfig::default());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.is_invalid));
        assert_eq!(rows[0].text, ".byte 0xf4");
        assert_eq!(rows[1].text, ".byte 0x01");
    }

    #[test]
    fn truncated_jump_resynchronises_on_the_next_byte() {
        let arch = M16cArchitecture::new();
        let rows = linear_sweep(&arch, &[0xF4, 0x00], 0, &DisplayConfig::default());
        let texts: Vec<&str> = rows.iter().map(|row| row.text.as_str()).collect();
        assert_eq!(texts, [".byte 0xf4", "BRK"]);
        assert!(!rows[1].is_invalid);
    }

    #[test]
    fn empty_input_has_no_rows() {
        let arch = M16cArchitecture::new();
        assert!(disassemble_one(&arch, &[], 0, &DisplayConfig::default()).is_none());
        assert!(linear_sweep(&arch, &[], 0, &DisplayConfig::default()).is_empty());
    }

    #[test]
    fn addresses_wrap_at_the_top_of_memory() {
        let arch = M16cArchitecture::new();
        let rows = linear_sweep(&arch, &[0x04, 0x04], 0xF_FFFF, &DisplayConfig::default());
        assert_eq!(rows[1].address, 0);
    }
}
