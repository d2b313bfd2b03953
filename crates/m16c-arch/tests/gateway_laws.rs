//! Property coverage for the decode, verify, render and lift gateways.

use log as _;
use m16c_arch::{
    decode, encode, linear_sweep, verify_roundtrip, DisplayConfig, IlBuffer, IlOp,
    M16cArchitecture, Register, RegisterFile, TokenKind, ADDRESS_MASK, MAX_INSTRUCTION_LENGTH,
};
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use serde_json as _;
use thiserror as _;

fn window() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=MAX_INSTRUCTION_LENGTH)
}

fn address() -> impl Strategy<Value = u32> {
    0..=ADDRESS_MASK
}

proptest! {
    #[test]
    fn decoded_instructions_re_encode_to_their_bytes(bytes in window(), address in address()) {
        if let Ok(instruction) = decode(&bytes, address) {
            let length = instruction.length();
            prop_assert!(length <= bytes.len());
            prop_assert_eq!(encode(&instruction, address), Ok(bytes[..length].to_vec()));
            prop_assert_eq!(verify_roundtrip(&instruction, &bytes, address, ""), Ok(()));
        }
    }

    #[test]
    fn decode_reads_no_further_than_the_length(bytes in window(), address in address()) {
        if let Ok(instruction) = decode(&bytes, address) {
            let length = instruction.length();
            prop_assert!(length <= MAX_INSTRUCTION_LENGTH);
            prop_assert_eq!(decode(&bytes[..length], address), Ok(instruction));
        }
    }

    #[test]
    fn info_text_and_il_report_the_same_length(bytes in window(), address in address()) {
        let arch = M16cArchitecture::new();
        let info = arch.instruction_info(&bytes, address).map(|info| info.length);
        let text = arch
            .instruction_text(&bytes, address, &DisplayConfig::default())
            .map(|(_, length)| length);
        let mut il = IlBuffer::new();
        let lifted = arch.instruction_low_level_il(&bytes, address, &mut il);
        prop_assert_eq!(info, text);
        prop_assert_eq!(info, lifted);
        prop_assert_eq!(lifted.is_some(), !il.ops().is_empty());
    }

    #[test]
    fn suffix_toggle_only_drops_suffix_tokens(bytes in window(), address in address()) {
        if let Ok(instruction) = decode(&bytes, address) {
            let shown = instruction.render(&DisplayConfig::default());
            let hidden = instruction.render(&DisplayConfig::default().with_suffix(false));
            let stripped: Vec<_> = shown
                .into_iter()
                .filter(|token| token.kind != TokenKind::Suffix)
                .collect();
            prop_assert_eq!(stripped, hidden);
        }
    }

    #[test]
    fn sweep_tiles_the_image(image in prop::collection::vec(any::<u8>(), 0..256), base in address()) {
        let arch = M16cArchitecture::new();
        let rows = linear_sweep(&arch, &image, base, &DisplayConfig::default());
        let mut expected = base;
        let mut covered = Vec::with_capacity(image.len());
        for row in &rows {
            prop_assert_eq!(row.address, expected);
            prop_assert_eq!(row.bytes.len(), row.length);
            covered.extend_from_slice(&row.bytes);
            expected = (expected + u32::try_from(row.length).expect("short row")) & ADDRESS_MASK;
        }
        prop_assert_eq!(covered, image);
    }

    #[test]
    fn lifted_register_writes_stay_inside_their_view(
        bytes in window(),
        seeds in prop::array::uniform8(any::<u32>()),
    ) {
        let Ok(instruction) = decode(&bytes, 0x1000) else {
            return Ok(());
        };
        let mut il = IlBuffer::new();
        instruction.lift(0x1000, &mut il);

        let mut file = RegisterFile::new();
        for (root, seed) in Register::ROOTS.iter().zip(seeds) {
            file.write(*root, seed);
        }
        for op in il.ops() {
            let IlOp::SetRegister { dest, .. } = op else {
                continue;
            };
            let before = file.clone();
            if !file.apply(op) {
                continue;
            }
            let view = dest.view();
            for root in Register::ROOTS {
                let changed = before.read(root) ^ file.read(root);
                if root == view.root {
                    prop_assert_eq!(changed & !view.mask(), 0, "{} wrote outside its view", dest);
                } else {
                    prop_assert_eq!(changed, 0, "{} touched {}", dest, root);
                }
            }
        }
    }
}
