#![no_main]

use libfuzzer_sys::fuzz_target;
use m16c_arch::{
    decode, encode, DisplayConfig, IlBuffer, M16cArchitecture, ADDRESS_MASK,
    MAX_INSTRUCTION_LENGTH,
};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let address = u32::from_le_bytes([data[0], data[1], data[2], 0]) & ADDRESS_MASK;
    let window = &data[3..data.len().min(3 + MAX_INSTRUCTION_LENGTH)];

    if let Ok(instruction) = decode(window, address) {
        let length = instruction.length();
        assert!(length <= window.len());
        assert_eq!(encode(&instruction, address).as_deref(), Ok(&window[..length]));
    }

    let arch = M16cArchitecture::new();
    let info = arch.instruction_info(window, address).map(|info| info.length);
    let mut il = IlBuffer::new();
    assert_eq!(info, arch.instruction_low_level_il(window, address, &mut il));
    let _ = arch.instruction_text(window, address, &DisplayConfig::default().with_suffix(false));
});
