//! Linear-sweep listing for raw M16C images.

use std::fmt::Write as _;

use env_logger as _;
use m16c_arch::{
    linear_sweep, DiagnosticSink, DisassemblyRow, DisplayConfig, IlBuffer, M16cArchitecture,
};
#[cfg(test)]
use tempfile as _;

/// Column width of the raw-byte field, enough for the longest instruction.
const BYTES_COLUMN: usize = 3 * m16c_arch::MAX_INSTRUCTION_LENGTH;

/// What the listing prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingOptions {
    /// Load address of the first byte.
    pub base: u32,
    /// Renderer settings.
    pub display: DisplayConfig,
    /// Print lifted IL under each instruction.
    pub il: bool,
}

/// Parses an address given as `0x`-prefixed hex or decimal.
///
/// # Errors
///
/// Returns a message when the text is not a number or exceeds 20 bits.
pub fn parse_address(text: &str) -> Result<u32, String> {
    let parsed = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).map_or_else(
        || text.parse::<u32>(),
        |hex| u32::from_str_radix(hex, 16),
    );
    let address = parsed.map_err(|e| format!("invalid address {text:?}: {e}"))?;
    if address > m16c_arch::ADDRESS_MASK {
        return Err(format!("address {text} is outside the 20-bit address space"));
    }
    Ok(address)
}

/// Formats one row as `AAAAA: BB BB ..  TEXT`.
#[must_use]
pub fn format_row(row: &DisassemblyRow) -> String {
    let bytes = row
        .bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{:05X}: {bytes:<width$} {}",
        row.address,
        row.text,
        width = BYTES_COLUMN
    )
}

/// Disassembles `image` and returns the printable listing.
#[must_use]
pub fn render_listing<D: DiagnosticSink>(
    arch: &M16cArchitecture<D>,
    image: &[u8],
    options: &ListingOptions,
) -> String {
    let rows = linear_sweep(arch, image, options.base, &options.display);
    log::debug!("{} rows from {} bytes", rows.len(), image.len());

    let mut out = String::new();
    let mut offset = 0usize;
    for row in &rows {
        let _ = writeln!(out, "{}", format_row(row));
        if options.il && !row.is_invalid {
            let mut il = IlBuffer::new();
            arch.instruction_low_level_il(&image[offset..offset + row.length], row.address, &mut il);
            for op in il.ops() {
                let _ = writeln!(out, "    ; {op:?}");
            }
        }
        offset += row.length;
    }
    out
}

#[cfg(test)]
mod tests {
    use m16c_arch::{DisplayConfig, M16cArchitecture};

    use super::{parse_address, render_listing, ListingOptions};

    #[test]
    fn parses_hex_and_decimal_addresses() {
        assert_eq!(parse_address("0x8000"), Ok(0x8000));
        assert_eq!(parse_address("0XF0000"), Ok(0xF_0000));
        assert_eq!(parse_address("4096"), Ok(4096));
        assert!(parse_address("0x100000").is_err());
        assert!(parse_address("ten").is_err());
    }

    #[test]
    fn listing_prints_one_line_per_row() {
        let arch = M16cArchitecture::new();
        let options = ListingOptions {
            base: 0xF_0000,
            ..ListingOptions::default()
        };
        let listing = render_listing(&arch, &[0x04, 0xD9, 0x72, 0x01], &options);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("F0000: 04 "));
        assert!(lines[0].ends_with(" NOP"));
        assert!(lines[1].ends_with(" MOV.W:Q #7, R2"));
        assert!(lines[2].ends_with(" .byte 0x01"));
    }

    #[test]
    fn suffix_and_il_options_apply() {
        let arch = M16cArchitecture::new();
        let options = ListingOptions {
            display: DisplayConfig::default().with_suffix(false),
            il: true,
            ..ListingOptions::default()
        };
        let listing = render_listing(&arch, &[0xD9, 0x72], &options);
        let lines: Vec<&str> = listing.lines().collect();
        assert!(lines[0].ends_with(" MOV.W #7, R2"));
        assert!(lines[1].starts_with("    ; SetRegister"));
    }
}
