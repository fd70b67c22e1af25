//! Cartridge mapping schemes and the 24-bit address decoder.

/// Size in bytes of work RAM (two full banks, `0x7E0000..=0x7FFFFF`).
pub const WORK_RAM_BYTES: usize = 0x2_0000;
/// Size in bytes of cartridge save RAM.
pub const SAVE_RAM_BYTES: usize = 0x2_0000;
/// Size of the low-bank work RAM mirror (`0x0000..=0x1FFF`).
pub const LOW_RAM_MIRROR_BYTES: u16 = 0x2000;

/// First bank (after masking the mirror bit) that maps to full work RAM.
pub const WORK_RAM_BANK: u8 = 0x7E;
/// Mask that folds banks `0x80..=0xFF` onto `0x00..=0x7F`.
pub const BANK_MIRROR_MASK: u8 = 0x7F;
/// First bank where the upper half of the system area ends.
pub const SYSTEM_BANK_END: u8 = 0x40;

/// Inclusive start of the low-bank I/O window.
pub const IO_START: u16 = 0x2000;
/// Inclusive end of the low-bank I/O window.
pub const IO_END: u16 = 0x5FFF;
/// Inclusive start of the expansion / save-RAM window in low banks.
pub const EXPANSION_START: u16 = 0x6000;
/// Inclusive end of the expansion / save-RAM window in low banks.
pub const EXPANSION_END: u16 = 0x7FFF;
/// First offset of the ROM half of a low bank.
pub const ROM_HALF_START: u16 = 0x8000;

/// First bank of the HiROM save-RAM window (`0x20..=0x3F`, `0x6000..=0x7FFF`).
pub const HIROM_SRAM_BANK: u8 = 0x20;
/// First bank of the LoROM save-RAM window (`0x70..=0x7D`, `0x0000..=0x7FFF`).
pub const LOROM_SRAM_BANK: u8 = 0x70;

/// Mask applied to every 24-bit bus address.
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

/// Cartridge address-mapping convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MappingScheme {
    /// 32 KiB ROM pages in the upper half of each bank (scheme A).
    #[default]
    LoRom,
    /// 64 KiB ROM banks, full-bank access from bank `0x40` (scheme B).
    HiRom,
}

impl MappingScheme {
    /// ROM image offset of the internal header for this scheme.
    #[must_use]
    pub const fn header_base(self) -> usize {
        match self {
            Self::LoRom => 0x7FC0,
            Self::HiRom => 0xFFC0,
        }
    }
}

/// Backing store selected by the address decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MemoryRegion {
    /// 128 KiB work RAM.
    WorkRam,
    /// Cartridge save RAM.
    SaveRam,
    /// Cartridge ROM image.
    Rom,
    /// Memory-mapped I/O register window.
    Io,
    /// Nothing drives the bus.
    OpenBus,
}

/// Result of decoding a 24-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappedAddress {
    /// Region the address resolves to.
    pub region: MemoryRegion,
    /// Offset inside the region (I/O offsets are the low 16 address bits).
    pub offset: u32,
}

impl MappedAddress {
    const fn new(region: MemoryRegion, offset: u32) -> Self {
        Self { region, offset }
    }

    const fn open_bus() -> Self {
        Self::new(MemoryRegion::OpenBus, 0)
    }
}

/// Decodes a 24-bit address under `scheme`.
///
/// Bits above 23 are ignored. The decoder is pure: it depends only on its
/// arguments, never on bus traffic.
#[must_use]
pub const fn map_address(scheme: MappingScheme, addr: u32) -> MappedAddress {
    let addr = addr & ADDRESS_MASK;
    let bank = ((addr >> 16) as u8) & BANK_MIRROR_MASK;
    let offset = (addr & 0xFFFF) as u16;

    if bank >= WORK_RAM_BANK {
        let wram = (((bank - WORK_RAM_BANK) as u32) << 16) | offset as u32;
        return MappedAddress::new(MemoryRegion::WorkRam, wram);
    }

    if bank < SYSTEM_BANK_END {
        return map_system_bank(scheme, bank, offset);
    }

    match scheme {
        MappingScheme::HiRom => MappedAddress::new(
            MemoryRegion::Rom,
            (((bank - SYSTEM_BANK_END) as u32) << 16) | offset as u32,
        ),
        MappingScheme::LoRom => {
            if offset >= ROM_HALF_START {
                MappedAddress::new(MemoryRegion::Rom, lorom_offset(bank, offset))
            } else if bank >= LOROM_SRAM_BANK {
                MappedAddress::new(
                    MemoryRegion::SaveRam,
                    (bank - LOROM_SRAM_BANK) as u32 * 0x8000 + offset as u32,
                )
            } else {
                MappedAddress::open_bus()
            }
        }
    }
}

const fn map_system_bank(scheme: MappingScheme, bank: u8, offset: u16) -> MappedAddress {
    match offset {
        0x0000..=0x1FFF => MappedAddress::new(MemoryRegion::WorkRam, offset as u32),
        IO_START..=IO_END => MappedAddress::new(MemoryRegion::Io, offset as u32),
        EXPANSION_START..=EXPANSION_END => match scheme {
            MappingScheme::HiRom if bank >= HIROM_SRAM_BANK => MappedAddress::new(
                MemoryRegion::SaveRam,
                (bank - HIROM_SRAM_BANK) as u32 * 0x2000 + (offset - EXPANSION_START) as u32,
            ),
            MappingScheme::HiRom | MappingScheme::LoRom => MappedAddress::open_bus(),
        },
        ROM_HALF_START..=0xFFFF => match scheme {
            MappingScheme::LoRom => {
                MappedAddress::new(MemoryRegion::Rom, lorom_offset(bank, offset))
            }
            MappingScheme::HiRom => {
                MappedAddress::new(MemoryRegion::Rom, ((bank as u32) << 16) | offset as u32)
            }
        },
    }
}

const fn lorom_offset(bank: u8, offset: u16) -> u32 {
    bank as u32 * 0x8000 + (offset - ROM_HALF_START) as u32
}
