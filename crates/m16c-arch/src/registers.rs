//! Register file layout and aliasing model.
//!
//! Every register is either a root storage location or a named view onto a
//! byte range of another register. Sub-register writes are partial writes into
//! the root slot; nothing outside the view's bytes is touched.

use crate::flags::Flag;

/// Number of registers exposed to the host, aliases included.
pub const REGISTER_COUNT: usize = 20;

/// Number of root storage slots backing the register file.
pub const STORAGE_SLOT_COUNT: usize = 8;

/// Canonical M16C register names as exposed to the host.
///
/// Hardware banking (register bank 0/1, `USP`/`ISP`) is not modelled: each
/// name is a single always-current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    R2R0,
    R2,
    R0,
    R0H,
    R0L,
    R3R1,
    R3,
    R1,
    R1H,
    R1L,
    A1A0,
    A1,
    A0,
    FB,
    PC,
    SP,
    SB,
    INTB,
    INTBH,
    INTBL,
}

/// Static description of one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterInfo {
    /// Canonical upper-case name.
    pub name: &'static str,
    /// Storage width in bytes.
    pub width: u8,
    /// Immediate parent register and byte offset, for aliased registers.
    pub alias: Option<(Register, u8)>,
}

impl RegisterInfo {
    const fn root(name: &'static str, width: u8) -> Self {
        Self {
            name,
            width,
            alias: None,
        }
    }

    const fn view(name: &'static str, width: u8, parent: Register, offset: u8) -> Self {
        Self {
            name,
            width,
            alias: Some((parent, offset)),
        }
    }
}

/// A register resolved down to its root storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterView {
    /// Root register owning the storage.
    pub root: Register,
    /// Byte offset of the view inside the root storage.
    pub offset: u8,
    /// Width of the view in bytes.
    pub width: u8,
}

impl RegisterView {
    /// Bit mask covering the view inside the root storage.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn mask(self) -> u32 {
        width_mask(self.width) << (self.offset as u32 * 8)
    }
}

#[allow(clippy::cast_lossless)]
const fn width_mask(width: u8) -> u32 {
    if width >= 4 {
        u32::MAX
    } else {
        (1u32 << (width as u32 * 8)) - 1
    }
}

impl Register {
    /// All registers in canonical declaration order.
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::R2R0,
        Self::R2,
        Self::R0,
        Self::R0H,
        Self::R0L,
        Self::R3R1,
        Self::R3,
        Self::R1,
        Self::R1H,
        Self::R1L,
        Self::A1A0,
        Self::A1,
        Self::A0,
        Self::FB,
        Self::PC,
        Self::SP,
        Self::SB,
        Self::INTB,
        Self::INTBH,
        Self::INTBL,
    ];

    /// Root registers, one per storage slot.
    pub const ROOTS: [Self; STORAGE_SLOT_COUNT] = [
        Self::R2R0,
        Self::R3R1,
        Self::A1A0,
        Self::FB,
        Self::PC,
        Self::SP,
        Self::SB,
        Self::INTB,
    ];

    /// Static width/alias description for this register.
    ///
    /// `INTB` splits unevenly: `INTBL` covers bytes 0..2 and `INTBH` only byte 2.
    #[must_use]
    pub const fn info(self) -> RegisterInfo {
        match self {
            Self::R2R0 => RegisterInfo::root("R2R0", 4),
            Self::R2 => RegisterInfo::view("R2", 2, Self::R2R0, 2),
            Self::R0 => RegisterInfo::view("R0", 2, Self::R2R0, 0),
            Self::R0H => RegisterInfo::view("R0H", 1, Self::R0, 1),
            Self::R0L => RegisterInfo::view("R0L", 1, Self::R0, 0),
            Self::R3R1 => RegisterInfo::root("R3R1", 4),
            Self::R3 => RegisterInfo::view("R3", 2, Self::R3R1, 2),
            Self::R1 => RegisterInfo::view("R1", 2, Self::R3R1, 0),
            Self::R1H => RegisterInfo::view("R1H", 1, Self::R1, 1),
            Self::R1L => RegisterInfo::view("R1L", 1, Self::R1, 0),
            Self::A1A0 => RegisterInfo::root("A1A0", 4),
            Self::A1 => RegisterInfo::view("A1", 2, Self::A1A0, 2),
            Self::A0 => RegisterInfo::view("A0", 2, Self::A1A0, 0),
            Self::FB => RegisterInfo::root("FB", 2),
            Self::PC => RegisterInfo::root("PC", 3),
            Self::SP => RegisterInfo::root("SP", 2),
            Self::SB => RegisterInfo::root("SB", 2),
            Self::INTB => RegisterInfo::root("INTB", 4),
            Self::INTBH => RegisterInfo::view("INTBH", 1, Self::INTB, 2),
            Self::INTBL => RegisterInfo::view("INTBL", 2, Self::INTB, 0),
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.info().name
    }

    /// Storage width in bytes.
    #[must_use]
    pub const fn width(self) -> u8 {
        self.info().width
    }

    /// Looks a register up by its canonical name (case-sensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|reg| reg.name() == name)
    }

    /// Resolves the alias chain down to the root storage slot.
    #[must_use]
    pub const fn view(self) -> RegisterView {
        let width = self.width();
        let mut current = self;
        let mut offset = 0u8;
        while let Some((parent, parent_offset)) = current.info().alias {
            offset += parent_offset;
            current = parent;
        }
        RegisterView {
            root: current,
            offset,
            width,
        }
    }

    /// Root register that owns this register's storage.
    #[must_use]
    pub const fn full_width(self) -> Self {
        self.view().root
    }

    const fn slot(self) -> Option<usize> {
        match self {
            Self::R2R0 => Some(0),
            Self::R3R1 => Some(1),
            Self::A1A0 => Some(2),
            Self::FB => Some(3),
            Self::PC => Some(4),
            Self::SP => Some(5),
            Self::SB => Some(6),
            Self::INTB => Some(7),
            _ => None,
        }
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Register storage arena: one slot per root register plus the `FLG` byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    slots: [u32; STORAGE_SLOT_COUNT],
    flg: u8,
}

impl RegisterFile {
    /// Creates a zeroed register file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register through its view.
    #[must_use]
    pub fn read(&self, reg: Register) -> u32 {
        let view = reg.view();
        let raw = self.root_slot(view.root);
        (raw & view.mask()) >> (u32::from(view.offset) * 8)
    }

    /// Writes a register through its view.
    ///
    /// Bits of `value` above the register width are discarded; bits of the root
    /// storage outside the view are preserved.
    pub fn write(&mut self, reg: Register, value: u32) {
        let view = reg.view();
        let mask = view.mask();
        let shifted = (value & width_mask(view.width)) << (u32::from(view.offset) * 8);
        if let Some(slot) = view.root.slot() {
            self.slots[slot] = (self.slots[slot] & !mask) | shifted;
        }
    }

    /// Reads one condition flag.
    #[must_use]
    pub const fn flag(&self, flag: Flag) -> bool {
        (self.flg & flag.mask()) != 0
    }

    /// Sets or clears one condition flag.
    pub fn set_flag(&mut self, flag: Flag, enabled: bool) {
        if enabled {
            self.flg |= flag.mask();
        } else {
            self.flg &= !flag.mask();
        }
    }

    /// Raw `FLG` byte.
    #[must_use]
    pub const fn flg(&self) -> u8 {
        self.flg
    }

    fn root_slot(&self, root: Register) -> u32 {
        root.slot().map_or(0, |slot| self.slots[slot])
    }
}
